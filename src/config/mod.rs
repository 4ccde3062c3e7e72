use crate::core::clock::SchoolClock;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod migrate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// School time zone as a fixed offset, e.g. "+05:30".
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_settings_refresh")]
    pub settings_refresh_secs: u64,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    /// Scanner name appended to the record source; empty for none.
    #[serde(default = "default_device_label")]
    pub device_label: String,
}

pub(crate) fn default_utc_offset() -> String {
    "+05:30".to_string()
}
pub(crate) fn default_sweep_interval() -> u64 {
    60
}
pub(crate) fn default_settings_refresh() -> u64 {
    30
}
pub(crate) fn default_busy_timeout() -> u64 {
    2000
}
pub(crate) fn default_device_label() -> String {
    String::new()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            utc_offset: default_utc_offset(),
            sweep_interval_secs: default_sweep_interval(),
            settings_refresh_secs: default_settings_refresh(),
            busy_timeout_ms: default_busy_timeout(),
            device_label: default_device_label(),
        }
    }
}

impl Config {
    /// `<home>/.rattendance`, or the working directory when there is no home.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rattendance")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Read and parse `path`.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from file, or return defaults if not found or
    /// unreadable.
    pub fn load() -> Self {
        let path = Self::config_file();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warning(format!("{}; using default configuration", e));
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn clock(&self) -> AppResult<SchoolClock> {
        SchoolClock::from_offset_str(&self.utc_offset)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn settings_refresh(&self) -> Duration {
        Duration::from_secs(self.settings_refresh_secs)
    }

    /// Fatal configuration mistakes, checked before any command runs.
    pub fn validate(&self) -> AppResult<()> {
        self.clock()?;
        if self.sweep_interval_secs == 0 {
            return Err(AppError::Configuration(
                "sweep_interval_secs must be at least 1".into(),
            ));
        }
        if self.device_label.contains(char::is_whitespace) {
            return Err(AppError::Configuration(format!(
                "device_label '{}' must not contain spaces",
                self.device_label
            )));
        }
        Ok(())
    }

    /// Create the config directory, the config file (unless `is_test`) and
    /// an empty database file. Returns the database path.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            config.save_to(&Self::config_file())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
