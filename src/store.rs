use crate::config::Config;
use crate::error::{EntryError, Result};
use crate::grid::next_free_cell;
use crate::model::{Entry, EntryType};
use crate::persist;
use crate::sources::{DirectorySource, EntryReader, Source};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Owns the scanned user and system entries. Both lists are replaced
/// wholesale on every reload and never mixed.
pub struct EntryStore {
    config: Config,
    user: Vec<Entry>,
    system: Vec<Entry>,
}

impl EntryStore {
    pub fn new(config: Config) -> Self {
        Self { config, user: Vec::new(), system: Vec::new() }
    }

    /// Scans both directory groups. A single broken file fails the reload
    /// and leaves the previous lists untouched.
    pub fn reload(&mut self) -> Result<()> {
        let user = DirectorySource::user(&self.config.entries).scan()?;
        let system = DirectorySource::system(&self.config.entries).scan()?;
        self.user = user;
        self.system = system;
        Ok(())
    }

    pub fn user_entries(&self) -> &[Entry] {
        &self.user
    }

    pub fn system_entries(&self) -> &[Entry] {
        &self.system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn find_user_entry(&self, path: &Path) -> Option<&Entry> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.user.iter().find(|e| e.entry_path == path)
    }

    /// Writes the entry and rescans. A rescan failure after a successful
    /// write is reported as `RescanAfterWrite`, so callers can tell that the
    /// file on disk did change.
    pub fn save_user_entry(&mut self, entry: &Entry) -> Result<()> {
        persist::save_entry(entry)?;
        self.rescan_after_write(&entry.entry_path)
    }

    pub fn delete_user_entry(&mut self, entry: &Entry) -> Result<()> {
        persist::delete_entry(entry)?;
        self.rescan_after_write(&entry.entry_path)
    }

    fn rescan_after_write(&mut self, path: &Path) -> Result<()> {
        self.reload().map_err(|source| EntryError::RescanAfterWrite {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Pins `reference` to the user grid as an inherit entry in the first
    /// free cell. Returns the pinned entry as it was saved. The pin is removed
    /// again if the rescan rejects it.
    pub fn add_favorite(&mut self, reference: &str) -> Result<Entry> {
        let not_found = |reason: &str| EntryError::InheritResolutionFailed {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let mut reader = EntryReader::new(&self.config.entries);
        let target = reader
            .resolve_entry_path(reference)
            .filter(|path| path.is_file())
            .ok_or_else(|| not_found("no such entry in the user or system directories"))?;
        if reader.read_entry(&target)?.is_none() {
            return Err(not_found("not a .desktop or .qsrun file"));
        }

        let dir = self.config.entries.user_dirs.first().cloned().ok_or(EntryError::NotSavable)?;
        fs::create_dir_all(&dir).map_err(|e| EntryError::io(&dir, e))?;
        let stem = target.file_stem().and_then(|s| s.to_str()).unwrap_or("favorite");

        let (row, col) = next_free_cell(&self.user, self.config.general.max_columns);
        let mut entry = Entry::new("", "", EntryType::Inherit);
        entry.row = row;
        entry.col = col;
        entry.entry_path = unused_path(&dir, stem);
        // A pin named like its target would shadow it, and the reference
        // would then resolve to the pin itself.
        entry.inherit = if dir.join(reference) == entry.entry_path {
            let target = std::path::absolute(&target).map_err(|e| EntryError::io(&target, e))?;
            target.to_string_lossy().into_owned()
        } else {
            reference.to_string()
        };

        info!("Pinning {:?} at ({}, {}) as {:?}", entry.inherit, row, col, entry.entry_path);
        match self.save_user_entry(&entry) {
            Ok(()) => Ok(entry),
            Err(EntryError::RescanAfterWrite { source, .. }) => {
                warn!("Rescan rejected {:?}, removing it", entry.entry_path);
                if let Err(e) = persist::delete_entry(&entry) {
                    warn!("Failed to remove {:?}: {}", entry.entry_path, e);
                }
                Err(*source)
            }
            Err(e) => Err(e),
        }
    }
}

fn unused_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.qsrun", stem));
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{}-{}.qsrun", stem, n));
        n += 1;
    }
    path
}
