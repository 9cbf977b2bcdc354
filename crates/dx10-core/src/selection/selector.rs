//! Selector model
//!
//! The rows an editor renders in its preset drop-down, plus the selected id.
//! Pure data: choosing what happens on a change is the mediator's job.

use super::SelectorId;

const INDENT: &str = "    ";

/// One row of the preset drop-down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorItem {
    /// Selectable row
    Item {
        id: SelectorId,
        label: String,
        enabled: bool,
    },
    /// Folder heading: shown, never selectable
    Heading { label: String },
    /// Divider between factory and user presets
    Separator,
}

impl SelectorItem {
    /// Id of a selectable row, `None` for headings and separators
    pub fn id(&self) -> Option<SelectorId> {
        match self {
            SelectorItem::Item { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SelectorItem::Item { enabled: true, .. })
    }

    pub fn label(&self) -> &str {
        match self {
            SelectorItem::Item { label, .. } | SelectorItem::Heading { label } => label,
            SelectorItem::Separator => "",
        }
    }
}

/// Row label for a user preset at `depth`
pub(crate) fn preset_label(name: &str, depth: usize) -> String {
    format!("{}{}", INDENT.repeat(depth), name)
}

/// Row label for a folder heading at `depth`
pub(crate) fn heading_label(name: &str, depth: usize) -> String {
    format!("{}[{}]", INDENT.repeat(depth), name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetSelector {
    items: Vec<SelectorItem>,
    selected_id: SelectorId,
}

impl PresetSelector {
    pub fn items(&self) -> &[SelectorItem] {
        &self.items
    }

    /// Selected id, `0` if nothing is selected
    pub fn selected_id(&self) -> SelectorId {
        self.selected_id
    }

    pub(crate) fn set_selected_id(&mut self, id: SelectorId) {
        self.selected_id = id;
    }

    /// Drop all rows. The selected id is left alone.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn push(&mut self, item: SelectorItem) {
        self.items.push(item);
    }

    /// Row index of the selected id
    pub fn selected_index(&self) -> Option<usize> {
        if self.selected_id == 0 {
            return None;
        }
        self.items
            .iter()
            .position(|item| item.id() == Some(self.selected_id))
    }

    /// First selectable row id strictly before row `from`
    pub fn selectable_before(&self, from: usize) -> Option<SelectorId> {
        self.items[..from.min(self.items.len())]
            .iter()
            .rev()
            .find(|item| item.is_enabled())
            .and_then(SelectorItem::id)
    }

    /// First selectable row id strictly after row `from`
    pub fn selectable_after(&self, from: usize) -> Option<SelectorId> {
        self.items
            .iter()
            .skip(from + 1)
            .find(|item| item.is_enabled())
            .and_then(SelectorItem::id)
    }

    pub fn contains_id(&self, id: SelectorId) -> bool {
        self.items.iter().any(|item| item.id() == Some(id))
    }
}
