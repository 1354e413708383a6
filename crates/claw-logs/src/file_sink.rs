//! File sink with rotation and retention.
//!
//! This module provides:
//! - [`FileSink`] — Appends rendered entries to a log file, one per line
//! - [`FileSinkConfig`] — Location, naming and retention settings
//! - Size-based rotation into a freshly named file
//! - Count- and age-based deletion of old files recognized by the name template
//!
//! A sink never lets an I/O failure reach the application. Failures are
//! reported through the dispatcher with the sink itself suspended, so the
//! report cannot loop back into the failing sink.

use std::fs::{self, DirEntry, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Local;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::caller;
use crate::dispatcher::Dispatcher;
use crate::error::{LogError, Result};
use crate::sink::Sink;
use crate::template::NameTemplate;
use crate::types::{LogEntry, LogSeverity};

/// Default maximum number of log files kept by retention.
pub const DEFAULT_MAX_LOG_COUNT: usize = 50;

/// Default maximum age of a log file kept by retention (30 days).
pub const DEFAULT_MAX_LOG_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Default size at which the active file is rotated (10 MiB).
pub const DEFAULT_MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A retention sweep runs on the first write and then once per this many writes.
pub const RETENTION_INTERVAL: u64 = 100;

/// How many names are generated before settling for an existing file.
const CREATE_ATTEMPTS: usize = 8;

/// Configuration for a [`FileSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Directory the log files live in.
    pub location: PathBuf,
    /// File name template, see [`crate::template`].
    pub name_format: String,
    /// Create `location` if it does not exist.
    pub auto_create_directory: bool,
    /// Periodically delete old log files.
    pub auto_delete_logs: bool,
    /// Maximum number of log files kept.
    pub max_log_count: usize,
    /// Maximum age of a log file, by last write time.
    #[serde(rename = "max_log_age_secs", with = "duration_secs")]
    pub max_log_age: Duration,
    /// Size in bytes at which a new active file is started.
    pub max_log_file_size: u64,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        let product = product_name();
        let location = match &product {
            Some(product) => std::env::temp_dir().join(product),
            None => std::env::temp_dir(),
        };
        let prefix = product.unwrap_or_else(|| "%r".to_string());

        Self {
            location,
            name_format: format!("{prefix}@%t.%sr.log"),
            auto_create_directory: true,
            auto_delete_logs: false,
            max_log_count: DEFAULT_MAX_LOG_COUNT,
            max_log_age: DEFAULT_MAX_LOG_AGE,
            max_log_file_size: DEFAULT_MAX_LOG_FILE_SIZE,
        }
    }
}

impl FileSinkConfig {
    /// Creates a new config with the given location.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Sets the file name template.
    #[must_use]
    pub fn with_name_format(mut self, name_format: impl Into<String>) -> Self {
        self.name_format = name_format.into();
        self
    }

    /// Sets whether the directory is created on demand.
    #[must_use]
    pub const fn with_auto_create_directory(mut self, enabled: bool) -> Self {
        self.auto_create_directory = enabled;
        self
    }

    /// Sets whether old log files are deleted.
    #[must_use]
    pub const fn with_auto_delete_logs(mut self, enabled: bool) -> Self {
        self.auto_delete_logs = enabled;
        self
    }

    /// Sets the maximum number of log files kept.
    #[must_use]
    pub const fn with_max_log_count(mut self, count: usize) -> Self {
        self.max_log_count = count;
        self
    }

    /// Sets the maximum age of a log file.
    #[must_use]
    pub const fn with_max_log_age(mut self, age: Duration) -> Self {
        self.max_log_age = age;
        self
    }

    /// Sets the size at which the active file is rotated.
    #[must_use]
    pub const fn with_max_log_file_size(mut self, size: u64) -> Self {
        self.max_log_file_size = size;
        self
    }
}

/// Name of the running program, used to derive default locations.
fn product_name() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let stem = exe.file_stem()?.to_str()?.trim();
    (!stem.is_empty()).then(|| stem.to_string())
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files deleted because there were too many.
    pub by_count: usize,
    /// Files deleted because they were too old.
    pub by_age: usize,
    /// Files that could not be deleted.
    pub failed: usize,
}

impl SweepReport {
    /// Total number of files deleted.
    #[must_use]
    pub const fn deleted(&self) -> usize {
        self.by_count + self.by_age
    }
}

/// Mutable state, only touched with the sink's lock held.
#[derive(Debug, Default)]
struct FileState {
    /// Current active log file path.
    active_file: Option<PathBuf>,
    /// Writes since the last retention sweep.
    writes: u64,
}

/// Sink that appends entries to rotating log files.
///
/// Every operation runs under one lock per sink instance, so rotation,
/// retention and appends never interleave. Two sinks never contend.
#[derive(Debug)]
pub struct FileSink {
    config: FileSinkConfig,
    template: NameTemplate,
    state: Mutex<FileState>,
    /// Deletes one file during retention.
    remove: fn(&Path) -> io::Result<()>,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(FileSinkConfig::default())
    }
}

impl FileSink {
    /// Creates a file sink. No file is created until the first entry.
    #[must_use]
    pub fn new(config: FileSinkConfig) -> Self {
        let template = NameTemplate::compile(&config.name_format);
        Self {
            config,
            template,
            state: Mutex::new(FileState::default()),
            remove: remove_log_file,
        }
    }

    #[cfg(test)]
    fn with_remover(mut self, remove: fn(&Path) -> io::Result<()>) -> Self {
        self.remove = remove;
        self
    }

    /// Creates a file sink writing to `location` with default settings.
    #[must_use]
    pub fn with_location(location: impl Into<PathBuf>) -> Self {
        Self::new(FileSinkConfig::new(location))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    /// Returns the compiled file name template.
    #[must_use]
    pub const fn template(&self) -> &NameTemplate {
        &self.template
    }

    /// Returns the file currently being written, if any.
    #[must_use]
    pub fn active_file(&self) -> Option<PathBuf> {
        self.state.lock().active_file.clone()
    }

    /// Deletes log files exceeding the count or age limits.
    ///
    /// Only files whose names match the template are considered. Files that
    /// cannot be deleted are reported through `dispatcher` and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::RetentionDisabled`] if auto delete is off, or an
    /// I/O error if the directory cannot be listed.
    pub fn delete_logs(&self, dispatcher: &Dispatcher) -> Result<SweepReport> {
        let _state = self.state.lock();
        self.delete_logs_locked(dispatcher)
    }

    // ========== Internal Methods ==========

    fn write_locked(
        &self,
        state: &mut FileState,
        entry: &LogEntry,
        dispatcher: &Dispatcher,
    ) -> Result<()> {
        let path = self.active_file_locked(state)?;

        if self.config.auto_delete_logs {
            if state.writes == 0 {
                if let Err(err) = self.delete_logs_locked(dispatcher) {
                    self.report(dispatcher, &err, LogSeverity::Important);
                }
            }
            state.writes = (state.writes + 1) % RETENTION_INTERVAL;
        }

        let line = format!("{entry}\n");
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Returns the file to append to, creating or rotating as needed.
    fn active_file_locked(&self, state: &mut FileState) -> Result<PathBuf> {
        if let Some(path) = &state.active_file {
            match fs::metadata(path) {
                Ok(meta) if meta.len() < self.config.max_log_file_size => return Ok(path.clone()),
                Ok(meta) => {
                    debug!(path = %path.display(), size = meta.len(), "rotating log file");
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "active log file disappeared");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let path = self.create_log_file()?;
        state.active_file = Some(path.clone());
        Ok(path)
    }

    /// Creates a new, empty log file. Existing files are never truncated.
    fn create_log_file(&self) -> Result<PathBuf> {
        let location = &self.config.location;
        if !location.is_dir() {
            if !self.config.auto_create_directory {
                return Err(LogError::DirectoryNotFound(location.clone()));
            }
            fs::create_dir_all(location)?;
        }

        let now = Local::now().naive_local();
        let mut path = location.join(self.template.generate(now));
        for _ in 1..CREATE_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!(path = %path.display(), "created log file");
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    path = location.join(self.template.generate(now));
                }
                Err(err) => return Err(err.into()),
            }
        }

        // The template cannot produce a fresh name this second.
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(path)
    }

    fn delete_logs_locked(&self, dispatcher: &Dispatcher) -> Result<SweepReport> {
        if !self.config.auto_delete_logs {
            return Err(LogError::RetentionDisabled);
        }

        let now = SystemTime::now();
        let mut report = SweepReport::default();
        let mut files = self.matching_files(dispatcher, &mut report)?;
        files.sort_by(|a, b| b.1.cmp(&a.1));

        if files.len() > self.config.max_log_count {
            for (path, _) in files[self.config.max_log_count..].iter().rev() {
                match (self.remove)(path) {
                    Ok(()) => report.by_count += 1,
                    Err(err) => {
                        report.failed += 1;
                        self.report(dispatcher, &err, LogSeverity::Important);
                    }
                }
            }
        }

        for (path, modified) in &files {
            match path.try_exists() {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    report.failed += 1;
                    self.report(dispatcher, &err, LogSeverity::Important);
                    continue;
                }
            }

            let age = now.duration_since(*modified).unwrap_or_default();
            if age < self.config.max_log_age {
                continue;
            }
            match (self.remove)(path) {
                Ok(()) => report.by_age += 1,
                Err(err) => {
                    report.failed += 1;
                    self.report(dispatcher, &err, LogSeverity::Important);
                }
            }
        }

        debug!(
            location = %self.config.location.display(),
            by_count = report.by_count,
            by_age = report.by_age,
            failed = report.failed,
            "retention sweep finished"
        );
        Ok(report)
    }

    /// Lists files in the location whose names match the template, with
    /// their last write time.
    fn matching_files(
        &self,
        dispatcher: &Dispatcher,
        report: &mut SweepReport,
    ) -> Result<Vec<(PathBuf, SystemTime)>> {
        let entries = fs::read_dir(&self.config.location)?;
        Ok(self.collect_matching(entries, dispatcher, report))
    }

    /// Keeps the matching regular files among `entries`. Unreadable entries
    /// are reported, counted as failed and skipped.
    fn collect_matching(
        &self,
        entries: impl IntoIterator<Item = io::Result<DirEntry>>,
        dispatcher: &Dispatcher,
        report: &mut SweepReport,
    ) -> Vec<(PathBuf, SystemTime)> {
        let mut files = Vec::new();
        for dir_entry in entries {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(err) => {
                    report.failed += 1;
                    self.report(dispatcher, &err, LogSeverity::Important);
                    continue;
                }
            };
            let Some(name) = dir_entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !self.template.matches(&name) {
                continue;
            }
            // Entries may vanish between listing and stat.
            let Ok(meta) = dir_entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            match meta.modified() {
                Ok(modified) => files.push((dir_entry.path(), modified)),
                Err(err) => {
                    report.failed += 1;
                    self.report(dispatcher, &err, LogSeverity::Important);
                }
            }
        }
        files
    }

    /// Reports a failure through the dispatcher with this sink suspended.
    fn report<E: std::error::Error + 'static>(
        &self,
        dispatcher: &Dispatcher,
        err: &E,
        severity: LogSeverity,
    ) {
        let _suspended = dispatcher.suspend(self);
        dispatcher.log_failure(err, severity, &caller!());
    }
}

/// Deletes a file, clearing its read-only flag first.
#[allow(clippy::permissions_set_readonly_false)]
fn remove_log_file(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    fs::remove_file(path)
}

impl Sink for FileSink {
    fn handle(&self, entry: &LogEntry, dispatcher: &Dispatcher) {
        let mut state = self.state.lock();
        if let Err(err) = self.write_locked(&mut state, entry, dispatcher) {
            self.report(dispatcher, &err, LogSeverity::Critical);
        }
    }
}
