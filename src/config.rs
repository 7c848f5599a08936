use crate::constants::config::{HEADERS_FILE, LOG_FILE, QUIET};
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Resolves filesystem locations for the chain manager.
pub trait PathProvider: Send + Sync {
    fn headers_file_path(&self) -> PathBuf;
}

#[derive(Clone)]
pub struct Config {
    headers_file: String,
    log_file: String,
    log_level: String,
}

impl Config {
    pub fn new(headers_file: String, log_file: String, log_level: String) -> Self {
        Self {
            headers_file,
            log_file,
            log_level,
        }
    }

    pub fn get_log_level(&self) -> String {
        self.log_level.clone()
    }

    pub fn get_log_file(&self) -> &str {
        &self.log_file
    }

    pub fn get_headers_file(&self) -> &str {
        &self.headers_file
    }

    /// One value per line: headers file, log file, log level. Missing
    /// trailing lines keep their defaults.
    pub fn from_file(path: PathBuf) -> Result<Config, io::Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut config = Config::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            match index {
                0 => config.headers_file = line,
                1 => config.log_file = line,
                2 => config.log_level = line,
                _ => break,
            }
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            HEADERS_FILE.to_string(),
            LOG_FILE.to_string(),
            QUIET.to_string(),
        )
    }
}

impl PathProvider for Config {
    fn headers_file_path(&self) -> PathBuf {
        PathBuf::from(&self.headers_file)
    }
}
