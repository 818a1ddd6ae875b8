use crate::error::{EntryError, Result};
use crate::model::{Entry, EntryType};
use crate::sources::InheritLoader;
use std::collections::HashMap;
use std::path::PathBuf;

/// Parses the launcher's own `key value` format.
///
/// All lines are collected before anything is interpreted, so `inherit` can
/// appear anywhere in the file. When an entry inherits, the parent is loaded
/// through `loader` first and the fields of this file are laid on top of it.
pub fn parse_qsrun(content: &str, loader: &mut dyn InheritLoader) -> Result<Entry> {
    let mut fields: HashMap<&str, (usize, &str)> = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let (key, value) = line
            .split_once(' ')
            .ok_or(EntryError::MalformedLine { path: PathBuf::new(), line: line_no })?;
        if key.is_empty() || value.is_empty() {
            return Err(EntryError::EmptyKeyOrValue { path: PathBuf::new(), line: line_no });
        }
        fields.insert(key, (line_no, value));
    }
    let value = |key: &str| fields.get(key).map(|&(_, value)| value);

    let entry_type = match value("type") {
        None | Some("user") => EntryType::User,
        Some("inherit") => EntryType::Inherit,
        Some("system") => return Err(EntryError::ForbiddenSystemType { path: PathBuf::new() }),
        Some(other) => {
            return Err(EntryError::InvalidType { path: PathBuf::new(), value: other.to_string() });
        }
    };

    let mut entry = Entry::new("", "", entry_type);
    entry.row = value("row").map(parse_coordinate).unwrap_or(0);
    entry.col = value("col").map(parse_coordinate).unwrap_or(0);
    entry.hidden = value("hidden") == Some("true");
    entry.is_terminal_command = value("terminal") == Some("true");

    // Inherit files only place their parent; anything else they carry is stale.
    if entry_type == EntryType::User {
        entry.key = value("key").map(str::to_lowercase).unwrap_or_default();
        entry.name = value("name").unwrap_or_default().to_string();
        entry.command = value("command").unwrap_or_default().to_string();
        entry.icon = value("icon").unwrap_or_default().to_string();
        if let Some(&(line, arguments)) = fields.get("arguments") {
            entry.arguments = split_arguments(arguments)
                .ok_or(EntryError::UnterminatedQuote { path: PathBuf::new(), line })?;
        }
    }

    if let Some(reference) = value("inherit") {
        let parent = loader.load_inherited(reference)?;
        entry.update(&parent);
        entry.inherit = reference.to_string();
    }
    entry.entry_type = entry_type;

    Ok(entry)
}

fn parse_coordinate(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

/// Splits an `arguments` value on spaces. A token opening with `"` starts a
/// run that is joined with the following tokens until one ends with `"`.
/// Returns `None` if a run is still open at the end of the line.
pub fn split_arguments(value: &str) -> Option<Vec<String>> {
    let mut arguments = Vec::new();
    let mut open_run: Option<String> = None;

    for token in value.split(' ') {
        match open_run.as_mut() {
            Some(run) => {
                run.push(' ');
                match token.strip_suffix('"') {
                    Some(last) => {
                        run.push_str(last);
                        arguments.extend(open_run.take());
                    }
                    None => run.push_str(token),
                }
            }
            None => match token.strip_prefix('"') {
                Some(rest) => match rest.strip_suffix('"') {
                    Some(whole) => arguments.push(whole.to_string()),
                    None => open_run = Some(rest.to_string()),
                },
                None if token.is_empty() => {}
                None => arguments.push(token.to_string()),
            },
        }
    }

    match open_run {
        Some(_) => None,
        None => Some(arguments),
    }
}

/// Inverse of [`split_arguments`]: quotes every argument that contains a
/// space or is empty.
pub fn join_arguments(arguments: &[String]) -> String {
    arguments
        .iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves parents from memory and records what was asked for.
    #[derive(Default)]
    struct MapLoader {
        parents: HashMap<String, Entry>,
        requested: Vec<String>,
    }

    impl InheritLoader for MapLoader {
        fn load_inherited(&mut self, reference: &str) -> Result<Entry> {
            self.requested.push(reference.to_string());
            self.parents.get(reference).cloned().ok_or_else(|| EntryError::InheritResolutionFailed {
                reference: reference.to_string(),
                reason: "not found".to_string(),
            })
        }
    }

    fn firefox_loader() -> MapLoader {
        let mut parent = Entry::new("Firefox", "firefox", EntryType::System);
        parent.icon = "firefox".to_string();
        let mut loader = MapLoader::default();
        loader.parents.insert("base.desktop".to_string(), parent);
        loader
    }

    #[test]
    fn user_entry_fields() {
        let content = "name Midnight Commander\ncommand mc\nicon utilities-terminal\nkey M\nrow 2\ncol 3\nterminal true\narguments -b \"/home/user/my files\"";
        let entry = parse_qsrun(content, &mut MapLoader::default()).unwrap();
        assert_eq!(entry.name, "Midnight Commander");
        assert_eq!(entry.command, "mc");
        assert_eq!(entry.icon, "utilities-terminal");
        assert_eq!(entry.key, "m");
        assert_eq!((entry.row, entry.col), (2, 3));
        assert!(entry.is_terminal_command);
        assert_eq!(entry.arguments, vec!["-b".to_string(), "/home/user/my files".to_string()]);
        assert_eq!(entry.entry_type, EntryType::User);
    }

    #[test]
    fn quoted_arguments() {
        let entry = parse_qsrun("command ls\narguments \"-la\" \"/tmp\"", &mut MapLoader::default()).unwrap();
        assert_eq!(entry.arguments, vec!["-la".to_string(), "/tmp".to_string()]);
    }

    #[test]
    fn unterminated_quote() {
        let err = parse_qsrun("command ls\narguments \"abc", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::UnterminatedQuote { line: 2, .. }));
    }

    #[test]
    fn last_duplicate_key_wins() {
        let entry = parse_qsrun("name first\nname second", &mut MapLoader::default()).unwrap();
        assert_eq!(entry.name, "second");
    }

    #[test]
    fn malformed_lines() {
        let err = parse_qsrun("name ok\nnospace", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::MalformedLine { line: 2, .. }));

        let err = parse_qsrun("name ", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::EmptyKeyOrValue { line: 1, .. }));

        let err = parse_qsrun(" value", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::EmptyKeyOrValue { line: 1, .. }));
    }

    #[test]
    fn type_validation() {
        let err = parse_qsrun("type system", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::ForbiddenSystemType { .. }));

        let err = parse_qsrun("type favourite", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::InvalidType { ref value, .. } if value == "favourite"));

        let entry = parse_qsrun("type user\nname x", &mut MapLoader::default()).unwrap();
        assert_eq!(entry.entry_type, EntryType::User);
    }

    #[test]
    fn bad_coordinates_become_zero() {
        let entry = parse_qsrun("row two\ncol 4", &mut MapLoader::default()).unwrap();
        assert_eq!((entry.row, entry.col), (0, 4));
    }

    #[test]
    fn inherit_merges_parent_under_child() {
        let mut loader = firefox_loader();
        let entry = parse_qsrun("type inherit\ninherit base.desktop\nrow 2\ncol 1", &mut loader).unwrap();
        assert_eq!(entry.name, "Firefox");
        assert_eq!(entry.command, "firefox");
        assert_eq!(entry.icon, "firefox");
        assert_eq!((entry.row, entry.col), (2, 1));
        assert_eq!(entry.entry_type, EntryType::Inherit);
        assert_eq!(entry.inherit, "base.desktop");
        assert_eq!(loader.requested, vec!["base.desktop".to_string()]);
    }

    #[test]
    fn inherit_type_ignores_own_launch_fields() {
        let mut loader = firefox_loader();
        let content = "row 1\nname Stale\ncommand stale\narguments \"never closed\ninherit base.desktop\ntype inherit";
        let entry = parse_qsrun(content, &mut loader).unwrap();
        assert_eq!(entry.name, "Firefox");
        assert_eq!(entry.command, "firefox");
        assert!(entry.arguments.is_empty());
    }

    #[test]
    fn user_type_overrides_parent_fields() {
        let mut loader = firefox_loader();
        let entry = parse_qsrun("inherit base.desktop\nname Private Browsing\narguments --private-window", &mut loader).unwrap();
        assert_eq!(entry.name, "Private Browsing");
        assert_eq!(entry.command, "firefox");
        assert_eq!(entry.arguments, vec!["--private-window".to_string()]);
        assert_eq!(entry.entry_type, EntryType::User);
    }

    #[test]
    fn unresolved_parent_propagates() {
        let err = parse_qsrun("type inherit\ninherit missing.desktop", &mut MapLoader::default()).unwrap_err();
        assert!(matches!(err, EntryError::InheritResolutionFailed { .. }));
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_arguments("a  b").unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(split_arguments("\"one two three\" x").unwrap(), vec!["one two three".to_string(), "x".to_string()]);
        assert!(split_arguments("\"").is_none());

        let args = vec!["-c".to_string(), "echo hi".to_string()];
        assert_eq!(join_arguments(&args), "-c \"echo hi\"");
        assert_eq!(split_arguments(&join_arguments(&args)).unwrap(), args);
    }
}
