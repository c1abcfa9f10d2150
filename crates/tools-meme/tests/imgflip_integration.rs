use llamadesk_tools_meme::{MemeTool, find_template};

/// This test is marked as `ignore` because it makes a network request to a public service.
/// It should be run manually when testing the imgflip provider integration.
/// To run this test: `cargo test --package llamadesk-tools-meme --test imgflip_integration -- --ignored`
#[tokio::test]
#[ignore]
async fn test_imgflip_public_templates() {
    let config_value: serde_yaml::Value = serde_yaml::from_str("provider: imgflip").unwrap();
    let tool = MemeTool::from_config(&config_value).expect("Failed to create meme tool");

    let templates = tool.templates().await;
    assert!(
        templates.is_ok(),
        "Template fetch failed: {:?}",
        templates.err()
    );

    let templates = templates.unwrap();
    assert!(!templates.is_empty(), "Imgflip should return templates");

    let first = &templates[0];
    assert!(!first.id.is_empty());
    assert!(first.url.starts_with("https://"));
    assert_eq!(find_template(&templates, &first.id), Some(first));
}
