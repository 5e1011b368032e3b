use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::core::services::{
    BonusSchedule, ScheduleMode, TripPolicy, DEFAULT_AIRPORT_SURCHARGE, DEFAULT_ALERT_LEAD_DAYS,
};
use crate::core::EarningsPolicy;
use crate::errors::{EarningsError, Result};
use crate::storage::{CachedRowStore, CsvRowStore};
use crate::utils::paths;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides where collection files live; defaults to `<home>/data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub airport_surcharge: f64,
    pub bonus_schedule: ScheduleMode,
    pub cache_ttl_secs: u64,
    pub alert_lead_days: i64,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            airport_surcharge: DEFAULT_AIRPORT_SURCHARGE,
            bonus_schedule: ScheduleMode::default(),
            cache_ttl_secs: 30,
            alert_lead_days: DEFAULT_ALERT_LEAD_DAYS,
            currency_symbol: "S/".into(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.airport_surcharge.is_finite() || self.airport_surcharge < 0.0 {
            return Err(EarningsError::Config(format!(
                "airport_surcharge must be a non-negative amount (got {})",
                self.airport_surcharge
            )));
        }
        if self.alert_lead_days < 0 {
            return Err(EarningsError::Config(format!(
                "alert_lead_days must not be negative (got {})",
                self.alert_lead_days
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> EarningsPolicy {
        EarningsPolicy {
            trip: TripPolicy {
                airport_surcharge: self.airport_surcharge,
            },
            bonus: BonusSchedule::standard(self.bonus_schedule),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Loads and saves `config/config.json` under the application home.
pub struct ConfigManager {
    home: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_home(paths::app_home())
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            path: paths::config_file_in(&home),
            home,
        }
    }

    /// Reads the config file, falling back to defaults when it is absent.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path).map_err(|err| io_error(&self.path, err))?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path).map_err(|err| io_error(&self.path, err))?;
        Ok(())
    }

    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| paths::data_dir_in(&self.home))
    }

    /// CSV-backed store for `config`, fronted by the read cache.
    pub fn open_store(&self, config: &Config) -> Result<CachedRowStore<CsvRowStore>> {
        let csv = CsvRowStore::new(self.data_dir(config))?;
        Ok(CachedRowStore::new(csv, config.cache_ttl()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }
    let mut file = File::create(path).map_err(|err| io_error(path, err))?;
    file.write_all(data.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|err| io_error(path, err))
}

fn io_error(path: &Path, err: std::io::Error) -> EarningsError {
    EarningsError::Config(format!("{}: {err}", path.display()))
}
