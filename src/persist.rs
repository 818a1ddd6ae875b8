use crate::error::{EntryError, Result};
use crate::model::{Entry, EntryType};
use crate::sources::qsrun::{join_arguments, split_arguments};
use log::{info, warn};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Renders the `.qsrun` form of a user-owned entry. Only fields that differ
/// from their defaults are written; launch fields are left out of inherit
/// entries because they come from the parent.
pub fn serialize_entry(entry: &Entry) -> String {
    let mut out = String::new();
    for (key, value) in written_fields(entry) {
        let _ = writeln!(out, "{} {}", key, value);
    }
    out
}

fn written_fields(entry: &Entry) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    let mut line = |key: &'static str, value: &str| fields.push((key, value.to_string()));

    if entry.entry_type == EntryType::Inherit {
        line("type", "inherit");
    }
    if !entry.inherit.is_empty() {
        line("inherit", &entry.inherit);
    }
    if entry.row != 0 {
        line("row", &entry.row.to_string());
    }
    if entry.col != 0 {
        line("col", &entry.col.to_string());
    }
    if entry.hidden {
        line("hidden", "true");
    }
    if entry.is_terminal_command {
        line("terminal", "true");
    }
    if !entry.key.is_empty() {
        line("key", &entry.key);
    }
    if entry.entry_type == EntryType::User {
        if !entry.name.is_empty() {
            line("name", &entry.name);
        }
        if !entry.command.is_empty() {
            line("command", &entry.command);
        }
        if !entry.icon.is_empty() {
            line("icon", &entry.icon);
        }
        if !entry.arguments.is_empty() {
            line("arguments", &join_arguments(&entry.arguments));
        }
    }
    fields
}

/// Rejects entries whose written form would not parse back to the same
/// values: every value must stay on its own line, and the argument list must
/// survive a join and split unchanged.
fn check_representable(entry: &Entry) -> Result<()> {
    for (field, value) in written_fields(entry) {
        if value.contains(['\n', '\r']) {
            return Err(EntryError::Unrepresentable { field });
        }
    }
    if entry.entry_type == EntryType::User
        && !entry.arguments.is_empty()
        && split_arguments(&join_arguments(&entry.arguments)).as_ref() != Some(&entry.arguments)
    {
        return Err(EntryError::Unrepresentable { field: "arguments" });
    }
    Ok(())
}

fn transit_path(entry: &Entry) -> PathBuf {
    let mut path = entry.entry_path.clone().into_os_string();
    path.push(".transit");
    PathBuf::from(path)
}

/// Writes the entry next to its file and renames it into place, so a failed
/// save never leaves a half-written entry behind.
pub fn save_entry(entry: &Entry) -> Result<()> {
    if !entry.is_savable() {
        return Err(EntryError::NotSavable);
    }
    check_representable(entry)?;

    let transit = transit_path(entry);
    let mut file = File::create(&transit).map_err(|e| EntryError::io(&transit, e))?;
    file.write_all(serialize_entry(entry).as_bytes())
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all())
        .map_err(|e| EntryError::io(&transit, e))?;
    drop(file);

    if let Err(e) = fs::rename(&transit, &entry.entry_path) {
        warn!("Failed to move {:?} over {:?}: {}", transit, entry.entry_path, e);
        return Err(EntryError::io(&entry.entry_path, e));
    }
    info!("Saved entry {:?}", entry.entry_path);
    Ok(())
}

pub fn delete_entry(entry: &Entry) -> Result<()> {
    if !entry.is_savable() {
        return Err(EntryError::NotSavable);
    }
    fs::remove_file(&entry.entry_path).map_err(|e| EntryError::io(&entry.entry_path, e))?;
    info!("Deleted entry {:?}", entry.entry_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::qsrun::parse_qsrun;
    use crate::sources::InheritLoader;

    struct NoParents;

    impl InheritLoader for NoParents {
        fn load_inherited(&mut self, reference: &str) -> Result<Entry> {
            Err(EntryError::InheritResolutionFailed {
                reference: reference.to_string(),
                reason: "no parents in this test".to_string(),
            })
        }
    }

    fn user_entry(dir: &std::path::Path) -> Entry {
        let mut entry = Entry::new("Shell Here", "bash", EntryType::User);
        entry.icon = "utilities-terminal".to_string();
        entry.arguments = vec!["-c".to_string(), "cd /tmp && exec bash".to_string()];
        entry.row = 1;
        entry.col = 3;
        entry.entry_path = dir.join("shell.qsrun");
        entry
    }

    #[test]
    fn writes_keys_in_fixed_order() {
        let mut entry = Entry::new("", "", EntryType::Inherit);
        entry.inherit = "firefox.desktop".to_string();
        entry.row = 2;
        entry.col = 1;
        entry.key = "f".to_string();
        entry.name = "Firefox".to_string();
        assert_eq!(serialize_entry(&entry), "type inherit\ninherit firefox.desktop\nrow 2\ncol 1\nkey f\n");
    }

    #[test]
    fn save_then_parse_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let entry = user_entry(dir.path());
        save_entry(&entry).unwrap();

        let content = fs::read_to_string(&entry.entry_path).unwrap();
        let parsed = parse_qsrun(&content, &mut NoParents).unwrap();
        assert_eq!(parsed.name, entry.name);
        assert_eq!(parsed.command, entry.command);
        assert_eq!(parsed.icon, entry.icon);
        assert_eq!(parsed.arguments, entry.arguments);
        assert_eq!((parsed.row, parsed.col), (1, 3));
        assert!(parsed.key.is_empty());
        assert!(!transit_path(&entry).exists());
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = user_entry(dir.path());
        fs::write(&entry.entry_path, "name Old\n").unwrap();
        entry.arguments.clear();
        save_entry(&entry).unwrap();
        let content = fs::read_to_string(&entry.entry_path).unwrap();
        assert!(content.contains("name Shell Here\n"));
        assert!(!content.contains("arguments"));
    }

    #[test]
    fn unsavable_entries_touch_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = Entry::new("Firefox", "firefox", EntryType::System);
        system.entry_path = dir.path().join("firefox.desktop");
        let dynamic = Entry::dynamic("ls", "ls", Vec::new(), "ls");
        let pathless = Entry::new("x", "x", EntryType::User);

        for entry in [&system, &dynamic, &pathless] {
            assert!(matches!(save_entry(entry), Err(EntryError::NotSavable)));
            assert!(matches!(delete_entry(entry), Err(EntryError::NotSavable)));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let entry = user_entry(dir.path());
        save_entry(&entry).unwrap();
        delete_entry(&entry).unwrap();
        assert!(!entry.entry_path.exists());
        assert!(matches!(delete_entry(&entry), Err(EntryError::Io { .. })));
    }

    #[test]
    fn failed_rename_leaves_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = user_entry(dir.path());
        // A non-empty directory cannot be replaced by a file.
        entry.entry_path = dir.path().join("occupied.qsrun");
        fs::create_dir(&entry.entry_path).unwrap();
        fs::write(entry.entry_path.join("keep"), "x").unwrap();

        assert!(matches!(save_entry(&entry), Err(EntryError::Io { .. })));
        assert!(entry.entry_path.join("keep").exists());
    }

    #[test]
    fn line_breaks_are_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = user_entry(dir.path());
        entry.name = "Shell\ncommand rm".to_string();
        assert!(matches!(save_entry(&entry), Err(EntryError::Unrepresentable { field: "name" })));

        entry = user_entry(dir.path());
        entry.arguments.push("two\r\nlines".to_string());
        assert!(matches!(save_entry(&entry), Err(EntryError::Unrepresentable { field: "arguments" })));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unsplittable_arguments_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = user_entry(dir.path());
        let cases: [&[&str]; 3] = [&["\"hi"], &["\"\""], &["\"a", "b\""]];
        for arguments in cases {
            entry.arguments = arguments.iter().map(|a| a.to_string()).collect();
            assert!(
                matches!(save_entry(&entry), Err(EntryError::Unrepresentable { field: "arguments" })),
                "{:?} should be rejected",
                arguments
            );
        }
        assert!(!entry.entry_path.exists());
        assert!(!transit_path(&entry).exists());
    }

    #[test]
    fn fields_not_written_are_not_checked() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = Entry::new("Inherited\nname", "", EntryType::Inherit);
        entry.inherit = "firefox.desktop".to_string();
        entry.arguments = vec!["\"x".to_string()];
        entry.entry_path = dir.path().join("pin.qsrun");
        save_entry(&entry).unwrap();
        assert_eq!(fs::read_to_string(&entry.entry_path).unwrap(), "type inherit\ninherit firefox.desktop\n");
    }
}
