use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "EARNINGS_CORE_HOME";

const DEFAULT_DIR_NAME: &str = ".earnings_core";
const DATA_DIR: &str = "data";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Application home, `$EARNINGS_CORE_HOME` or `~/.earnings_core`.
pub fn app_home() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Default directory for the collection CSV files.
pub fn data_dir_in(home: &std::path::Path) -> PathBuf {
    home.join(DATA_DIR)
}

pub fn config_file_in(home: &std::path::Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}
