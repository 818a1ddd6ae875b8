use crate::config::EntriesConfig;
use crate::error::{EntryError, Result};
use crate::model::Entry;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod bin;
pub mod desktop;
pub mod qsrun;

pub trait Source {
    fn scan(&self) -> Result<Vec<Entry>>;
}

/// Loads the entry an `inherit` reference points to.
pub trait InheritLoader {
    fn load_inherited(&mut self, reference: &str) -> Result<Entry>;
}

/// Reads entry files from disk and follows their inheritance chain.
pub struct EntryReader<'a> {
    dirs: &'a EntriesConfig,
    // Files currently being read, outermost first.
    reading: Vec<PathBuf>,
}

impl<'a> EntryReader<'a> {
    pub fn new(dirs: &'a EntriesConfig) -> Self {
        Self { dirs, reading: Vec::new() }
    }

    /// Absolute references are taken as they are. Bare names are looked up
    /// in the user dirs first, so a user file shadows a system one.
    pub fn resolve_entry_path(&self, reference: &str) -> Option<PathBuf> {
        if reference.trim().is_empty() {
            return None;
        }
        if reference.starts_with('/') {
            return Some(PathBuf::from(reference));
        }
        self.dirs
            .user_dirs
            .iter()
            .chain(self.dirs.system_dirs.iter())
            .map(|dir| dir.join(reference))
            .find(|path| path.exists())
    }

    /// Returns `None` for files that are neither `.desktop` nor `.qsrun`.
    pub fn read_entry(&mut self, path: &Path) -> Result<Option<Entry>> {
        let extension = path.extension().and_then(|s| s.to_str());
        if !matches!(extension, Some("desktop") | Some("qsrun")) {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| EntryError::io(path, e))?;
        let entry = if extension == Some("desktop") {
            desktop::parse_desktop_entry(&content)
        } else {
            self.reading.push(canonical(path));
            let parsed = qsrun::parse_qsrun(&content, &mut *self);
            self.reading.pop();
            parsed
        };
        entry.map(Some).map_err(|e| e.in_file(path))
    }
}

impl InheritLoader for EntryReader<'_> {
    fn load_inherited(&mut self, reference: &str) -> Result<Entry> {
        let failed = |reason: &str| EntryError::InheritResolutionFailed {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let path = self
            .resolve_entry_path(reference)
            .filter(|path| path.is_file())
            .ok_or_else(|| failed("no such entry in the user or system directories"))?;
        if self.reading.contains(&canonical(&path)) {
            return Err(failed("inheritance cycle"));
        }

        debug!("{:?} inherits from {:?}", self.reading.last(), path);
        self.read_entry(&path)?
            .ok_or_else(|| failed("not a .desktop or .qsrun file"))
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// One group of entry directories, scanned recursively.
pub struct DirectorySource<'a> {
    label: &'static str,
    dirs: &'a [PathBuf],
    resolve_dirs: &'a EntriesConfig,
}

impl<'a> DirectorySource<'a> {
    pub fn user(config: &'a EntriesConfig) -> Self {
        Self { label: "user", dirs: &config.user_dirs, resolve_dirs: config }
    }

    pub fn system(config: &'a EntriesConfig) -> Self {
        Self { label: "system", dirs: &config.system_dirs, resolve_dirs: config }
    }
}

impl Source for DirectorySource<'_> {
    fn scan(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut reader = EntryReader::new(self.resolve_dirs);

        for dir in self.dirs {
            if !dir.exists() {
                debug!("{} directory {:?} does not exist, skipping", self.label, dir);
                continue;
            }
            debug!("Scanning {} entries in {:?}", self.label, dir);

            for item in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
                let item = item.map_err(|e| {
                    let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
                    EntryError::io(path, e.into())
                })?;
                if !item.file_type().is_file() {
                    continue;
                }

                let path = std::path::absolute(item.path()).map_err(|e| EntryError::io(item.path(), e))?;
                if let Some(mut entry) = reader.read_entry(&path)? {
                    if entry.hidden {
                        continue;
                    }
                    entry.entry_path = path;
                    entries.push(entry);
                }
            }
        }

        info!("{} entries: found {}", self.label, entries.len());
        Ok(entries)
    }
}
