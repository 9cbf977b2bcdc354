//! Selection index mediator
//!
//! Owns the selector rows and the id→file map, turns selector changes into
//! something to activate, and keeps the selector in step with the host's
//! `PresetIndex` parameter.
//!
//! # Feedback guard
//!
//! ```text
//! PresetIndex changed ──▶ sync_from_parameter ──▶ selector set to id
//!        ▲                                             │ change notification
//!        │                                             ▼
//!   program switch ◀── Factory(i) ◀── on_selector_changed (ignored unless Idle)
//! ```
//!
//! While a parameter-driven update is being copied into the selector the
//! mediator sits in [`SyncState::PropagatingFromParameter`] and swallows the
//! selector's own change notification, so the update never writes back into
//! the parameter store. It returns to `Idle` before control leaves the
//! mediator. All of this assumes one thread; `&mut self` enforces that.

use std::path::{Path, PathBuf};

use super::selector::{heading_label, preset_label};
use super::{IdentifierMap, PresetSelector, SelectorId, SelectorItem, USER_ID_THRESHOLD};
use crate::scanner::PresetEntry;

/// Whether selector notifications are currently honored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Selector changes come from the user and are acted on
    #[default]
    Idle,
    /// The selector is being updated from the parameter; its notifications are dropped
    PropagatingFromParameter,
}

/// What a selector id refers to right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Factory program (0-based index)
    Factory(usize),
    /// User preset file that exists on disk
    File { id: SelectorId, path: PathBuf },
    /// Id not in the current map, or its file has gone
    Stale(SelectorId),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionMediator {
    selector: PresetSelector,
    ids: IdentifierMap,
    num_factory_presets: usize,
    sync: SyncState,
    /// Selection before the last user change, for rolling back a failed load
    previous_selection: SelectorId,
}

impl SelectionMediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate the selector rows and the id→file map from scratch.
    pub fn rebuild(&mut self, factory_names: &[String], entries: &[PresetEntry]) {
        self.selector.clear();
        self.num_factory_presets = factory_names.len();

        for (id, name) in (1..).zip(factory_names) {
            self.selector.push(SelectorItem::Item {
                id,
                label: name.clone(),
                enabled: true,
            });
        }

        self.ids = IdentifierMap::from_entries(entries);

        if !entries.is_empty() {
            self.selector.push(SelectorItem::Separator);

            let mut user_ids = self.ids.iter().map(|(id, _)| id);
            for entry in entries {
                if entry.is_folder {
                    self.selector.push(SelectorItem::Heading {
                        label: heading_label(&entry.display_name, entry.depth),
                    });
                } else if let Some(id) = user_ids.next() {
                    self.selector.push(SelectorItem::Item {
                        id,
                        label: preset_label(&entry.display_name, entry.depth),
                        enabled: true,
                    });
                }
            }
        }

        log::debug!(
            "[SELECTION] Rebuilt: {} factory, {} user presets, {} rows",
            self.num_factory_presets,
            self.ids.len(),
            self.selector.items().len()
        );
    }

    pub fn selector(&self) -> &PresetSelector {
        &self.selector
    }

    pub fn identifier_map(&self) -> &IdentifierMap {
        &self.ids
    }

    pub fn selected_id(&self) -> SelectorId {
        self.selector.selected_id()
    }

    pub fn num_factory_presets(&self) -> usize {
        self.num_factory_presets
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    /// What `id` currently refers to
    pub fn resolve(&self, id: SelectorId) -> Resolution {
        let id_usize = id as usize;
        if id_usize >= 1 && id_usize <= self.num_factory_presets {
            return Resolution::Factory(id_usize - 1);
        }
        if id > USER_ID_THRESHOLD {
            if let Some(path) = self.ids.get(id).filter(|p| p.is_file()) {
                return Resolution::File {
                    id,
                    path: path.to_path_buf(),
                };
            }
        }
        Resolution::Stale(id)
    }

    /// The selector now shows `id` and emits its change notification.
    ///
    /// Returns what to activate, or `None` while a parameter-driven update
    /// is being propagated.
    pub fn on_selector_changed(&mut self, id: SelectorId) -> Option<Resolution> {
        let previous = self.selector.selected_id();
        self.selector.set_selected_id(id);

        if self.sync != SyncState::Idle {
            log::debug!("[SELECTION] Suppressed selector notification for id {}", id);
            return None;
        }

        self.previous_selection = previous;
        Some(self.resolve(id))
    }

    /// Step to the nearest selectable row above the current one. No wrap.
    pub fn previous(&mut self) -> Option<Resolution> {
        let current = self.selector.selected_index()?;
        let target = self.selector.selectable_before(current)?;
        self.on_selector_changed(target)
    }

    /// Step to the nearest selectable row below the current one. No wrap.
    pub fn next(&mut self) -> Option<Resolution> {
        let current = self.selector.selected_index()?;
        let target = self.selector.selectable_after(current)?;
        self.on_selector_changed(target)
    }

    /// Reflect the normalized `PresetIndex` value into the selector.
    pub fn sync_from_parameter(&mut self, normalized: f32) {
        self.sync = SyncState::PropagatingFromParameter;

        if let Some(index) = self.program_index(normalized) {
            let notified = self.on_selector_changed(index as SelectorId + 1);
            debug_assert!(notified.is_none());
        }

        self.sync = SyncState::Idle;
    }

    /// Select `id` without anything being activated
    pub fn select_quietly(&mut self, id: SelectorId) {
        self.sync = SyncState::PropagatingFromParameter;
        let _ = self.on_selector_changed(id);
        self.sync = SyncState::Idle;
    }

    /// Quietly select the user preset stored at `path`, if it is listed
    pub fn select_path_quietly(&mut self, path: &Path) -> Option<SelectorId> {
        let id = self.ids.id_for_path(path)?;
        self.select_quietly(id);
        Some(id)
    }

    /// Put back the selection that preceded the last user change
    pub fn restore_previous_selection(&mut self) {
        self.select_quietly(self.previous_selection);
    }

    /// Factory program index for a normalized parameter value
    fn program_index(&self, normalized: f32) -> Option<usize> {
        let count = self.num_factory_presets;
        if count == 0 || !normalized.is_finite() {
            return None;
        }
        let scaled = normalized.clamp(0.0, 1.0) * (count - 1) as f32 + 0.5;
        let index = scaled as usize;
        (index < count).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Program {}", i)).collect()
    }

    /// Keys/Rhodes, Keys/Wurli, Init as real files under `root`
    fn user_entries(root: &Path) -> Vec<PresetEntry> {
        let keys = root.join("Keys");
        fs::create_dir_all(&keys).unwrap();
        for path in [keys.join("Rhodes.dx10"), keys.join("Wurli.dx10"), root.join("Init.dx10")] {
            fs::write(&path, "<Parameters/>").unwrap();
        }
        vec![
            PresetEntry {
                display_name: "Keys".into(),
                path: keys.clone(),
                is_folder: true,
                depth: 0,
            },
            PresetEntry {
                display_name: "Rhodes".into(),
                path: keys.join("Rhodes.dx10"),
                is_folder: false,
                depth: 1,
            },
            PresetEntry {
                display_name: "Wurli".into(),
                path: keys.join("Wurli.dx10"),
                is_folder: false,
                depth: 1,
            },
            PresetEntry {
                display_name: "Init".into(),
                path: root.join("Init.dx10"),
                is_folder: false,
                depth: 0,
            },
        ]
    }

    #[test]
    fn test_rebuild_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(2), &user_entries(dir.path()));

        let rows: Vec<(Option<SelectorId>, &str)> = mediator
            .selector()
            .items()
            .iter()
            .map(|item| (item.id(), item.label()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Some(1), "Program 1"),
                (Some(2), "Program 2"),
                (None, ""),
                (None, "[Keys]"),
                (Some(1001), "    Rhodes"),
                (Some(1002), "    Wurli"),
                (Some(1003), "Init"),
            ]
        );
    }

    #[test]
    fn test_no_separator_without_user_presets() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(3), &[]);
        assert_eq!(mediator.selector().items().len(), 3);
        assert!(mediator.identifier_map().is_empty());
    }

    #[test]
    fn test_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let entries = user_entries(dir.path());
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(2), &entries);

        assert_eq!(mediator.resolve(2), Resolution::Factory(1));
        assert_eq!(
            mediator.resolve(1002),
            Resolution::File {
                id: 1002,
                path: entries[2].path.clone()
            }
        );
        assert_eq!(mediator.resolve(3), Resolution::Stale(3));
        assert_eq!(mediator.resolve(1009), Resolution::Stale(1009));

        fs::remove_file(&entries[2].path).unwrap();
        assert_eq!(mediator.resolve(1002), Resolution::Stale(1002));
    }

    #[test]
    fn test_navigation_skips_separator_and_headings() {
        let dir = tempfile::tempdir().unwrap();
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(2), &user_entries(dir.path()));

        mediator.select_quietly(2);
        assert!(matches!(
            mediator.next(),
            Some(Resolution::File { id: 1001, .. })
        ));
        assert_eq!(mediator.selected_id(), 1001);

        assert_eq!(mediator.previous(), Some(Resolution::Factory(1)));
        assert_eq!(mediator.selected_id(), 2);
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(2), &user_entries(dir.path()));

        mediator.select_quietly(1);
        assert_eq!(mediator.previous(), None);
        assert_eq!(mediator.selected_id(), 1);

        mediator.select_quietly(1003);
        assert_eq!(mediator.next(), None);
        assert_eq!(mediator.selected_id(), 1003);
    }

    #[test]
    fn test_navigation_without_selection_does_nothing() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(2), &[]);
        assert_eq!(mediator.next(), None);
        assert_eq!(mediator.previous(), None);
        assert_eq!(mediator.selected_id(), 0);
    }

    #[test]
    fn test_parameter_sync_is_not_echoed() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(5), &[]);

        mediator.sync_from_parameter(0.5);
        assert_eq!(mediator.selected_id(), 3);
        assert_eq!(mediator.sync_state(), SyncState::Idle);

        mediator.sync_from_parameter(1.0);
        assert_eq!(mediator.selected_id(), 5);

        // A user change afterwards is honored again
        assert_eq!(mediator.on_selector_changed(1), Some(Resolution::Factory(0)));
    }

    #[test]
    fn test_parameter_sync_without_factory_presets() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&[], &[]);
        mediator.sync_from_parameter(0.7);
        assert_eq!(mediator.selected_id(), 0);
        assert_eq!(mediator.sync_state(), SyncState::Idle);
    }

    #[test]
    fn test_parameter_sync_ignores_non_finite_values() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(4), &[]);
        mediator.select_quietly(2);

        mediator.sync_from_parameter(f32::NAN);
        assert_eq!(mediator.selected_id(), 2);
        mediator.sync_from_parameter(f32::INFINITY);
        assert_eq!(mediator.selected_id(), 2);
        assert_eq!(mediator.sync_state(), SyncState::Idle);
    }

    #[test]
    fn test_restore_previous_selection() {
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(4), &[]);
        mediator.select_quietly(2);

        mediator.on_selector_changed(4);
        mediator.restore_previous_selection();
        assert_eq!(mediator.selected_id(), 2);
    }

    #[test]
    fn test_select_path_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let entries = user_entries(dir.path());
        let mut mediator = SelectionMediator::new();
        mediator.rebuild(&names(1), &entries);

        assert_eq!(mediator.select_path_quietly(&entries[3].path), Some(1003));
        assert_eq!(mediator.selected_id(), 1003);
        assert_eq!(mediator.select_path_quietly(&dir.path().join("x.dx10")), None);
        assert_eq!(mediator.selected_id(), 1003);
    }
}
