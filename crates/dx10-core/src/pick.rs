//! File dialog hand-off
//!
//! Opening a file dialog does not block: the host calls `begin_pick`, shows
//! its dialog however it likes, and later reports the outcome for that
//! handle exactly once. A `None` result means the user cancelled and
//! nothing changes.
//!
//! ```text
//! begin_pick(SavePreset) ──▶ PickHandle #7 ──▶ host dialog ...
//!                                               │
//! on_pick_complete(#7, Some(path)) ◀────────────┘   (second call → PickNotPending)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::preset::{PresetError, PRESET_EXTENSION};

/// What the dialog is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    /// Choose where to save the current state
    SavePreset,
    /// Choose a preset file to load
    LoadPreset,
    /// Choose a new preset folder
    PresetFolder,
}

impl PickKind {
    /// Dialog title
    pub fn title(&self) -> &'static str {
        match self {
            PickKind::SavePreset => "Save Preset",
            PickKind::LoadPreset => "Load Preset",
            PickKind::PresetFolder => "Select Preset Folder",
        }
    }

    /// File name filter, `None` for folder dialogs
    pub fn file_pattern(&self) -> Option<String> {
        match self {
            PickKind::SavePreset | PickKind::LoadPreset => Some(format!("*.{}", PRESET_EXTENSION)),
            PickKind::PresetFolder => None,
        }
    }
}

/// Ticket for one dialog interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickHandle(u64);

impl fmt::Display for PickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the host needs to show the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub handle: PickHandle,
    pub kind: PickKind,
    pub initial_directory: PathBuf,
}

/// Result of completing a pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// User dismissed the dialog
    Cancelled,
    /// Preset written to this path
    Saved(PathBuf),
    /// Preset loaded from this path
    Loaded(PathBuf),
    /// Preset folder switched to this directory
    FolderChanged(PathBuf),
    /// The chosen path was unusable for this kind of pick (nothing changed)
    Ignored(PathBuf),
}

/// Picks that have been started but not yet completed
#[derive(Debug, Default)]
pub struct PendingPicks {
    next_id: u64,
    pending: HashMap<PickHandle, PickRequest>,
}

impl PendingPicks {
    pub fn begin(&mut self, kind: PickKind, initial_directory: &Path) -> PickHandle {
        self.next_id += 1;
        let handle = PickHandle(self.next_id);
        self.pending.insert(
            handle,
            PickRequest {
                handle,
                kind,
                initial_directory: initial_directory.to_path_buf(),
            },
        );
        log::debug!("[PICK] Started {:?} pick {}", kind, handle);
        handle
    }

    pub fn get(&self, handle: PickHandle) -> Option<&PickRequest> {
        self.pending.get(&handle)
    }

    /// Take the request out of the pending set. Fails if it was never
    /// started or has already been completed.
    pub fn complete(&mut self, handle: PickHandle) -> Result<PickRequest, PresetError> {
        self.pending
            .remove(&handle)
            .ok_or(PresetError::PickNotPending { handle: handle.0 })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_pick_completes_once() {
        let mut picks = PendingPicks::default();
        let save = picks.begin(PickKind::SavePreset, Path::new("/presets"));
        let load = picks.begin(PickKind::LoadPreset, Path::new("/presets"));
        assert_ne!(save, load);
        assert_eq!(picks.len(), 2);

        let request = picks.complete(save).unwrap();
        assert_eq!(request.kind, PickKind::SavePreset);
        assert_eq!(request.initial_directory, PathBuf::from("/presets"));

        assert!(matches!(
            picks.complete(save),
            Err(PresetError::PickNotPending { .. })
        ));
        assert!(picks.get(load).is_some());
    }

    #[test]
    fn test_dialog_details() {
        assert_eq!(PickKind::LoadPreset.title(), "Load Preset");
        assert_eq!(PickKind::SavePreset.file_pattern().as_deref(), Some("*.dx10"));
        assert_eq!(PickKind::PresetFolder.file_pattern(), None);
    }
}
