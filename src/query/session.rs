//! Search box state for one UI session.
//!
//! Mirrors the advanced search box: the `+` key opens the keyword picker,
//! picked keywords are appended to the text, and the active/inactive toggle
//! rewrites an existing `active:` term instead of appending a second one.

use super::parser::{PICKER_SUFFIX, ParsedQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum number of characters before a query is sent
pub const DEFAULT_MIN_SUBMIT_CHARS: usize = 3;

/// What the caller should do with the current search text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Search(String),
    /// Reset to the unfiltered listing
    Clear,
    Skip,
}

impl SubmitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitAction::Search(_) => "search",
            SubmitAction::Clear => "clear",
            SubmitAction::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub search_string: String,
    pub expand_picker: bool,
    pub active_only: bool,
    min_submit_chars: usize,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl SearchSession {
    pub fn new(search_string: &str) -> Self {
        let mut session = Self {
            search_string: String::new(),
            expand_picker: false,
            active_only: true,
            min_submit_chars: DEFAULT_MIN_SUBMIT_CHARS,
        };
        session.on_change(search_string);
        session
    }

    pub fn with_min_submit_chars(mut self, min: usize) -> Self {
        self.min_submit_chars = min;
        self
    }

    /// Replace the text, picking up any `active:` value it contains
    pub fn on_change(&mut self, text: &str) {
        self.search_string = text.to_string();
        if let Some(active) = ParsedQuery::parse(text)
            .find("active")
            .and_then(|o| parse_bool(&o.value))
        {
            self.active_only = active;
        }
    }

    /// Track a typed character; `+` at the start or after a space opens the picker
    pub fn on_key(&mut self, ch: char) {
        self.expand_picker = ch == '+'
            && (self.search_string.is_empty() || self.search_string.ends_with(' '));
    }

    pub fn on_blur(&mut self) {
        if !self.search_string.ends_with(PICKER_SUFFIX) {
            self.expand_picker = false;
        }
    }

    /// Append a fragment chosen from the picker or the active toggle.
    ///
    /// A trailing `+` is dropped first. Active toggles rewrite an existing
    /// `active:` term and return the submit action for the new text.
    pub fn pick(&mut self, fragment: &str) -> Option<SubmitAction> {
        let trimmed = self
            .search_string
            .strip_suffix(PICKER_SUFFIX)
            .unwrap_or(&self.search_string)
            .to_string();
        let mut next = format!("{trimmed}{fragment}");
        let active = active_fragment(fragment);

        if let Some(active) = active {
            self.active_only = active;
            let mut parsed = ParsedQuery::parse(&trimmed);
            if parsed.find("active").is_some() {
                parsed.set_keyword("active", if active { "true" } else { "false" });
                next = parsed.to_search_string();
            }
        }

        self.search_string = next;
        self.expand_picker = false;

        active.map(|_| self.submit())
    }

    pub fn toggle_active(&mut self, active: bool) -> SubmitAction {
        let fragment = if active {
            " active:true"
        } else {
            " active:false"
        };
        self.pick(fragment).unwrap_or(SubmitAction::Skip)
    }

    /// Decide whether the current text should be searched.
    ///
    /// Short input is held back unless it contains a character outside the
    /// Basic Multilingual Plane (a single emoji is a meaningful query).
    pub fn submit(&self) -> SubmitAction {
        let text = &self.search_string;
        if text.is_empty() {
            SubmitAction::Clear
        } else if text.chars().count() >= self.min_submit_chars
            || text.chars().any(|c| c as u32 > 0xFFFF)
        {
            SubmitAction::Search(text.clone())
        } else {
            SubmitAction::Skip
        }
    }

    pub fn clear(&mut self) -> SubmitAction {
        self.search_string.clear();
        self.expand_picker = false;
        SubmitAction::Clear
    }

    pub fn save_view(
        &self,
        views: &mut SavedViews,
        parent_item: &str,
        link_text: &str,
        color: &str,
    ) {
        views.create(SavedView {
            link_text: link_text.to_string(),
            color: color.to_string(),
            search_string: self.search_string.clone(),
            parent_item: parent_item.to_string(),
        });
    }

    /// Whether the current text is a saved view for `parent_item`
    pub fn is_saved(&self, views: &SavedViews, parent_item: &str) -> bool {
        views.contains(parent_item, &self.search_string)
    }
}

fn active_fragment(fragment: &str) -> Option<bool> {
    match fragment.trim() {
        "active:true" => Some(true),
        "active:false" => Some(false),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// A named search string shown in the sidebar of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub link_text: String,
    pub color: String,
    pub search_string: String,
    pub parent_item: String,
}

/// Saved views grouped by the listing they belong to (`contacts`, `companies`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedViews {
    views: BTreeMap<String, Vec<SavedView>>,
}

impl SavedViews {
    /// Add a view, replacing one with the same search string
    pub fn create(&mut self, view: SavedView) {
        let views = self.views.entry(view.parent_item.clone()).or_default();
        views.retain(|v| v.search_string != view.search_string);
        views.push(view);
    }

    pub fn remove(&mut self, parent_item: &str, search_string: &str) -> bool {
        let Some(views) = self.views.get_mut(parent_item) else {
            return false;
        };
        let before = views.len();
        views.retain(|v| v.search_string != search_string);
        before != views.len()
    }

    pub fn contains(&self, parent_item: &str, search_string: &str) -> bool {
        self.for_parent(parent_item)
            .iter()
            .any(|v| v.search_string == search_string)
    }

    pub fn for_parent(&self, parent_item: &str) -> &[SavedView] {
        self.views
            .get(parent_item)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
