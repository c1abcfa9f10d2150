use once_cell::sync::Lazy;
use std::path::PathBuf;

static DEFAULT_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .map(|p| p.join("llamadesk"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/llamadesk"))
});

// Fallback only, XDG_CONFIG_HOME wins when set
static DEFAULT_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .map(|p| p.join("llamadesk"))
        .unwrap_or_else(|| PathBuf::from("~/.config/llamadesk"))
});

pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home).join("llamadesk")
    } else {
        DEFAULT_CONFIG_DIR.clone()
    }
}

/// Directory for logs and other runtime artifacts. Created on demand.
pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let path = if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data_home).join("llamadesk")
    } else {
        DEFAULT_DATA_DIR.clone()
    };
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_default_config() -> String {
    include_str!("../data/config.yml").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify the environment
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_get_config_dir_with_xdg_set() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let tmp_dir = tempfile::tempdir().unwrap();
        let xdg_config_path = tmp_dir.path();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", xdg_config_path);
        }

        let config_dir = get_config_dir();
        assert_eq!(config_dir, xdg_config_path.join("llamadesk"));

        unsafe {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    fn test_get_config_dir_without_xdg_set() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            env::remove_var("XDG_CONFIG_HOME");
        }
        let config_dir = get_config_dir();
        let expected = dirs::config_dir()
            .map(|p| p.join("llamadesk"))
            .unwrap_or_else(|| PathBuf::from("~/.config/llamadesk"));
        assert_eq!(config_dir, expected);
    }

    #[test]
    fn test_get_default_config() {
        let config = get_default_config();
        assert!(config.contains("models:"));
        assert!(config.contains("chat:"));
        assert!(config.contains("meme:"));
    }

    #[test]
    fn test_get_data_dir_with_xdg_set() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let tmp_dir = tempfile::tempdir().unwrap();
        let xdg_data_path = tmp_dir.path();
        unsafe {
            env::set_var("XDG_DATA_HOME", xdg_data_path);
        }

        let data_dir = get_data_dir().unwrap();
        assert_eq!(data_dir, xdg_data_path.join("llamadesk"));
        assert!(data_dir.exists());

        unsafe {
            env::remove_var("XDG_DATA_HOME");
        }
    }
}
