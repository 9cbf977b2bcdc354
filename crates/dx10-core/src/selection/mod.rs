//! Selector ids and the id→file map
//!
//! The selector shows the factory programs first (ids `1..=N`), then, if the
//! preset folder holds anything, a separator followed by folder headings and
//! user presets. User presets are numbered from [`FIRST_USER_ID`] in listing
//! order; headings take a row but no id.
//!
//! The map is a derived view of one directory scan. It is thrown away and
//! recomputed whenever the tree may have changed, never patched, so an id
//! can only ever point at a file from the latest scan.

mod mediator;
mod selector;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use mediator::{Resolution, SelectionMediator, SyncState};
pub use selector::{PresetSelector, SelectorItem};

use crate::preset::PresetError;
use crate::scanner::PresetEntry;

/// Integer identifying one selectable row. `0` means "nothing selected".
pub type SelectorId = u32;

/// Id given to the first user preset file
pub const FIRST_USER_ID: SelectorId = 1001;

/// Ids above this value are user presets
pub const USER_ID_THRESHOLD: SelectorId = 1000;

/// Mapping from user preset ids to files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    files: BTreeMap<SelectorId, PathBuf>,
}

impl IdentifierMap {
    /// Number the file entries of a scan, skipping folders
    pub fn from_entries(entries: &[PresetEntry]) -> Self {
        let files = entries
            .iter()
            .filter(|e| !e.is_folder)
            .zip(FIRST_USER_ID..)
            .map(|(e, id)| (id, e.path.clone()))
            .collect();
        Self { files }
    }

    pub fn get(&self, id: SelectorId) -> Option<&Path> {
        self.files.get(&id).map(PathBuf::as_path)
    }

    /// Like [`get`](Self::get), but reports a missing id as an error
    pub fn resolve(&self, id: SelectorId) -> Result<&Path, PresetError> {
        self.get(id).ok_or(PresetError::StaleReference { id })
    }

    /// Id of the entry for `path`, if it was part of the scan
    pub fn id_for_path(&self, path: &Path) -> Option<SelectorId> {
        self.files
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectorId, &Path)> {
        self.files.iter().map(|(id, p)| (*id, p.as_path()))
    }
}
