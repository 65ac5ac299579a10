use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use log::Log;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

const LOG_SUB_DIR: &str = "logs";

/// Writes to a rotating file under the app's log directory and mirrors every
/// line to stderr so it also shows up in the platform console.
pub struct MainLogger {
    write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>,
}

impl MainLogger {
    fn new(write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>) -> Self {
        Self { write_logger }
    }
}

impl Log for MainLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.write_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_logger.log(record);
        eprintln!(
            "{}:{} -- {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        self.write_logger.flush();
    }
}

pub fn log_dir(base_dir: &str) -> PathBuf {
    Path::new(base_dir).join(LOG_SUB_DIR)
}

/// Only one logger can be installed per process, a second call fails.
pub fn init(base_dir: &str) -> Result<()> {
    let path = log_dir(base_dir).join("main.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let write_logger = WriteLogger::new(LevelFilter::Info, config, log);
    let main_logger = MainLogger::new(write_logger);
    log::set_boxed_logger(Box::new(main_logger))?;
    log::set_max_level(LevelFilter::Info);
    info!("logging initialized");
    Ok(())
}

/// Current and rotated log files, oldest first, so the shell can attach them
/// to a bug report.
pub fn recent_log_files(base_dir: &str) -> Result<Vec<PathBuf>> {
    let dir = log_dir(base_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in (fs::read_dir(&dir)?).flatten() {
        let path = entry.path();
        if path.is_file() {
            let modified = entry.metadata()?.modified()?;
            files.push((modified, path));
        }
    }
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}
