use crate::model::Entry;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use log::debug;

const DEFAULT_PATH: &str = "/usr/bin/:/bin/:";

/// Executables on `$PATH` whose file name starts with `prefix`.
pub fn path_suggestions(prefix: &str) -> Vec<String> {
    let path_var = env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string());
    suggestions_in(&path_var, prefix)
}

pub fn suggestions_in(path_var: &str, prefix: &str) -> Vec<String> {
    let mut found = BTreeSet::new();
    for path_str in path_var.split(':').filter(|s| !s.is_empty()) {
        let path = Path::new(path_str);
        debug!("Looking for {:?}* in {:?}", prefix, path);
        let Ok(read_dir) = fs::read_dir(path) else { continue };
        for entry in read_dir.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else { continue };
            if !file_name.starts_with(prefix) {
                continue;
            }
            if let Ok(metadata) = fs::metadata(&path) {
                // Check if executable
                if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
                    found.insert(file_name.to_string());
                }
            }
        }
    }
    found.into_iter().collect()
}

/// Entry offered when exactly one executable matches the query.
pub fn suggestion_entry(command: &str) -> Entry {
    Entry::dynamic(command, command, Vec::new(), command)
}

/// Entry that runs the query text as typed.
pub fn adhoc_entry(text: &str) -> Entry {
    let mut parts = text.split(' ').filter(|s| !s.is_empty()).map(str::to_string);
    let command = parts.next().unwrap_or_default();
    Entry::dynamic(format!("Execute: {}", text), command, parts.collect(), "utilities-terminal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryType;

    fn touch(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn only_executables_with_prefix() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        touch(a.path(), "htop", 0o755);
        touch(a.path(), "hexdump", 0o755);
        touch(a.path(), "history.txt", 0o644);
        touch(b.path(), "htop", 0o755);
        touch(b.path(), "top", 0o755);

        let path_var = format!("{}:{}:/nonexistent", a.path().display(), b.path().display());
        assert_eq!(suggestions_in(&path_var, "h"), vec!["hexdump".to_string(), "htop".to_string()]);
        assert_eq!(suggestions_in(&path_var, "ht"), vec!["htop".to_string()]);
        assert!(suggestions_in(&path_var, "zz").is_empty());
    }

    #[test]
    fn adhoc_splits_command_line() {
        let entry = adhoc_entry("ping -c 3 example.org");
        assert_eq!(entry.name, "Execute: ping -c 3 example.org");
        assert_eq!(entry.command, "ping");
        assert_eq!(entry.arguments, vec!["-c", "3", "example.org"]);
        assert_eq!(entry.icon, "utilities-terminal");
        assert_eq!(entry.entry_type, EntryType::Dynamic);
        assert!(!entry.is_savable());
    }

    #[test]
    fn suggestion_uses_command_as_icon() {
        let entry = suggestion_entry("htop");
        assert_eq!((entry.name.as_str(), entry.command.as_str(), entry.icon.as_str()), ("htop", "htop", "htop"));
        assert!(entry.entry_path.as_os_str().is_empty());
    }
}
