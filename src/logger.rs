use crate::config::Config;
use crate::constants::config::{PATH, VERBOSE};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

struct Logger {
    log_file: Option<Mutex<std::fs::File>>,
    mode: String,
}

impl Logger {
    fn new() -> Logger {
        let config = Config::from_file(PathBuf::from(PATH)).unwrap_or_default();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.get_log_file())
            .ok();
        Logger {
            log_file: file.map(Mutex::new),
            mode: config.get_log_level(),
        }
    }

    fn write_line(&self, message: &str) {
        let now = Local::now();
        let line = format!("{} - {}\n", now, message);
        eprintln!("{}", message);

        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Logs a message to stderr and to the log file selected by the logger mode.
/// Verbose messages are dropped from the file when the mode is quiet.
pub fn log(message: &str, level: &str) {
    let logger = LOGGER.get_or_init(Logger::new);
    if level == VERBOSE && logger.mode != VERBOSE {
        eprintln!("{}", message);
        return;
    }
    logger.write_line(message);
}
