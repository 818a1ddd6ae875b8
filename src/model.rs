use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Read from a `.desktop` file.
    #[default]
    System,
    /// A `.qsrun` file carrying its own name and command.
    User,
    /// A `.qsrun` file that only places another entry in the grid.
    Inherit,
    /// Synthesized from the query text, never written to disk.
    Dynamic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub key: String,            // Shortcut key, lower-cased
    pub name: String,           // Display name
    pub command: String,        // Executable name or path
    pub arguments: Vec<String>, // argv tail
    pub icon: String,           // Theme name or absolute path, empty for none
    pub row: i32,               // 1-based, 0 = unassigned
    pub col: i32,
    pub hidden: bool,
    pub is_terminal_command: bool,
    /// Not consulted by the generic merge: an unset child type defaults to
    /// `User` at parse time and `Inherit` files force their own type.
    pub entry_type: EntryType,
    pub inherit: String,        // Reference to the parent entry
    pub entry_path: PathBuf,    // Backing file, empty for dynamic entries
}

impl Entry {
    pub fn new(name: impl Into<String>, command: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            entry_type,
            ..Default::default()
        }
    }

    /// A synthesized entry for free text typed into the query line.
    pub fn dynamic(name: impl Into<String>, command: impl Into<String>, arguments: Vec<String>, icon: &str) -> Self {
        let mut entry = Self::new(name, command, EntryType::Dynamic);
        entry.arguments = arguments;
        entry.icon = icon.to_string();
        entry
    }

    pub fn is_savable(&self) -> bool {
        matches!(self.entry_type, EntryType::User | EntryType::Inherit)
            && !self.entry_path.as_os_str().is_empty()
    }

    /// Fills every field still at its default from `parent`. Fields set on
    /// `self` are never overwritten. `hidden` stays with the file that sets
    /// it, so pinning a `NoDisplay` application still shows the pin.
    pub fn update(&mut self, parent: &Entry) -> &mut Self {
        fill_if_default(&mut self.arguments, &parent.arguments);
        fill_if_default(&mut self.col, &parent.col);
        fill_if_default(&mut self.command, &parent.command);
        fill_if_default(&mut self.icon, &parent.icon);
        fill_if_default(&mut self.key, &parent.key);
        fill_if_default(&mut self.name, &parent.name);
        fill_if_default(&mut self.row, &parent.row);
        fill_if_default(&mut self.is_terminal_command, &parent.is_terminal_command);
        self
    }
}

fn fill_if_default<T: Default + PartialEq + Clone>(dest: &mut T, source: &T) {
    if *dest == T::default() {
        *dest = source.clone();
    }
}
