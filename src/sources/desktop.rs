use crate::error::{EntryError, Result};
use crate::model::{Entry, EntryType};
use std::path::PathBuf;

const GROUP_HEADER: &str = "[Desktop Entry]";

/// Field codes that only make sense to a file manager passing files along.
const IGNORED_FIELD_CODES: [&str; 4] = ["%f", "%F", "%u", "%U"];

/// Reads the handful of `[Desktop Entry]` keys a launcher needs. Anything
/// after the next group header is ignored.
pub fn parse_desktop_entry(content: &str) -> Result<Entry> {
    let mut lines = content.lines();

    // Only comments may precede the group header.
    let first_line = lines
        .by_ref()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();
    if first_line != GROUP_HEADER {
        return Err(EntryError::MissingSection { path: PathBuf::new() });
    }

    let mut entry = Entry::new("", "", EntryType::System);
    for line in lines {
        if line.starts_with('[') && line.ends_with(']') {
            break;
        }

        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        match key.to_lowercase().as_str() {
            "name" => {
                if entry.name.is_empty() {
                    entry.name = value.to_string();
                }
            }
            "icon" => entry.icon = value.to_string(),
            "exec" => {
                let mut parts = value.split(' ').filter(|s| !s.is_empty());
                entry.command = parts.next().unwrap_or_default().to_string();
                entry.arguments = parts
                    .filter(|arg| !IGNORED_FIELD_CODES.contains(arg))
                    .map(str::to_string)
                    .collect();
            }
            "nodisplay" => entry.hidden = value == "true",
            "terminal" => entry.is_terminal_command = value == "true",
            _ => {}
        }
    }

    Ok(entry)
}
