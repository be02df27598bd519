use crate::core::error::{Result, VglError};
use std::path::PathBuf;

/// File name of the user-level state record inside the config directory
pub const STATE_FILE_NAME: &str = "state.json";

/// Environment variable overriding the state file location
pub const STATE_FILE_ENV: &str = "VGL_STATE";

pub fn get_config_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|dir| dir.join("vgl"))
        .ok_or(VglError::ConfigDirectoryNotFound)
}

/// Location of the user-level state file, honoring `VGL_STATE`
pub fn get_state_file() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(STATE_FILE_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(get_config_directory()?.join(STATE_FILE_NAME))
}
