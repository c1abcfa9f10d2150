use anyhow::Result;
use llamadesk::cli::run_app;
use llamadesk::ux;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run_app().await {
        ux::present_error(e);
        std::process::exit(1);
    }
    Ok(())
}
