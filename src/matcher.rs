use crate::model::Entry;

/// An entry placed in the visible grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub entry: Entry,
    pub row: i32,
    pub col: i32,
    pub shortcut: Option<String>,
}

impl Placed {
    fn at_own_cell(entry: &Entry) -> Self {
        Self {
            entry: entry.clone(),
            row: entry.row,
            col: entry.col,
            shortcut: (!entry.key.is_empty()).then(|| entry.key.clone()),
        }
    }
}

/// Decides which entries are shown for a filter text and where.
pub struct RankedMatcher {
    max_columns: i32,
}

impl RankedMatcher {
    pub fn new(max_columns: i32) -> Self {
        Self { max_columns: max_columns.max(1) }
    }

    /// User entries whose name contains the filter win outright and keep
    /// their own cells. Only when none match are system entries ranked,
    /// numbered 1-9 and flowed row-major from `(0, 0)`.
    pub fn match_entries(&self, filter: &str, user: &[Entry], system: &[Entry]) -> Vec<Placed> {
        if filter.is_empty() {
            return user.iter().map(Placed::at_own_cell).collect();
        }
        let filter = filter.to_lowercase();

        let user_matches: Vec<Placed> = user
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&filter))
            .map(Placed::at_own_cell)
            .collect();
        if !user_matches.is_empty() {
            return user_matches;
        }

        let mut ranked: Vec<(u8, &Entry)> = system
            .iter()
            .filter_map(|e| rank(&filter, e).map(|r| (r, e)))
            .collect();
        // Stable, so equal ranks keep scan order.
        ranked.sort_by_key(|&(r, _)| r);

        ranked
            .into_iter()
            .enumerate()
            .map(|(i, (_, entry))| {
                let i = i as i32;
                Placed {
                    entry: entry.clone(),
                    row: i / self.max_columns,
                    col: i % self.max_columns,
                    shortcut: (i < 9).then(|| (i + 1).to_string()),
                }
            })
            .collect()
    }
}

/// Match strength of `entry` for an already lower-cased filter, best first:
/// name prefix, command prefix, name substring, command substring.
pub fn rank(filter: &str, entry: &Entry) -> Option<u8> {
    let name = entry.name.to_lowercase();
    let command = entry.command.to_lowercase();
    if name.starts_with(filter) {
        Some(0)
    } else if command.starts_with(filter) {
        Some(1)
    } else if name.contains(filter) {
        Some(2)
    } else if command.contains(filter) {
        Some(3)
    } else {
        None
    }
}
