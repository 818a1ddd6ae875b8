use crate::error::Result;
use crate::matcher::{Placed, RankedMatcher};
use crate::model::Entry;
use crate::sources::bin;
use crate::store::EntryStore;

/// What the text in the query line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Reload,
    Calculation(String),
    FileSearch(String),
    ContentSearch(String),
    Filter(String),
}

impl Input {
    pub fn classify(text: &str) -> Input {
        if text == "/reload" {
            return Input::Reload;
        }
        let mut chars = text.chars();
        if let (Some(first), Some(_)) = (chars.next(), chars.clone().next()) {
            let rest = chars.as_str().to_string();
            match first {
                '=' => return Input::Calculation(rest),
                '/' => return Input::FileSearch(rest),
                '|' => return Input::ContentSearch(rest),
                _ => {}
            }
        }
        Input::Filter(text.to_string())
    }
}

pub struct AppState {
    pub store: EntryStore,
    pub matcher: RankedMatcher,
    pub query: String,
    pub visible: Vec<Placed>,
    pub selected_index: usize,
    path_suggestions: fn(&str) -> Vec<String>,
}

impl AppState {
    pub fn new(store: EntryStore) -> Self {
        let matcher = RankedMatcher::new(store.config().general.max_columns);
        let mut state = Self {
            store,
            matcher,
            query: String::new(),
            visible: Vec::new(),
            selected_index: 0,
            path_suggestions: bin::path_suggestions,
        };
        state.update_filter();
        state
    }

    /// Applies new query text. Searches and calculations are returned to the
    /// caller untouched; everything else updates `visible`.
    pub fn update_query(&mut self, query: &str) -> Result<Input> {
        let input = Input::classify(query);
        match &input {
            Input::Reload => {
                self.store.reload()?;
                self.query.clear();
                self.update_filter();
            }
            Input::Filter(text) => {
                self.query = text.clone();
                self.update_filter();
            }
            Input::Calculation(_) | Input::FileSearch(_) | Input::ContentSearch(_) => {
                self.query = query.to_string();
                self.visible.clear();
                self.selected_index = 0;
            }
        }
        Ok(input)
    }

    pub fn update_filter(&mut self) {
        self.visible = self.matcher.match_entries(
            &self.query,
            self.store.user_entries(),
            self.store.system_entries(),
        );

        if self.visible.is_empty() && !self.query.is_empty() {
            let suggestions = (self.path_suggestions)(&self.query);
            let fallback = match suggestions.as_slice() {
                [only] => bin::suggestion_entry(only),
                _ => bin::adhoc_entry(&self.query),
            };
            self.visible.push(Placed { entry: fallback, row: 0, col: 0, shortcut: None });
        }

        log::info!("AppState: query='{}', visible_count={}", self.query, self.visible.len());
        self.selected_index = 0;
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.visible.is_empty() {
            self.selected_index = 0;
            return;
        }

        let len = self.visible.len() as i32;
        let new_index = (self.selected_index as i32 + delta).rem_euclid(len);
        self.selected_index = new_index as usize;
    }

    pub fn get_selected(&self) -> Option<&Entry> {
        self.visible.get(self.selected_index).map(|p| &p.entry)
    }

    pub fn entry_for_shortcut(&self, key: &str) -> Option<&Entry> {
        let key = key.to_lowercase();
        self.visible
            .iter()
            .find(|p| p.shortcut.as_deref() == Some(key.as_str()) || p.entry.key == key)
            .map(|p| &p.entry)
    }
}
