//! Preset manager
//!
//! Facade the editor talks to. Every user action (pick from the list, step,
//! drop a file, save, load, change folder) goes through here, and every
//! action that may have changed the set of files rebuilds the selector
//! before returning, so the next action always sees the new list.
//!
//! The parameter store is never owned: each call borrows it.

use std::path::{Path, PathBuf};

use crate::config::{default_preset_directory, default_settings_path, SettingsStore};
use crate::params::{ParameterStore, PRESET_INDEX_PARAM};
use crate::pick::{PendingPicks, PickHandle, PickKind, PickOutcome, PickRequest};
use crate::preset::{
    has_preset_extension, is_valid_preset_file, preset_file, with_preset_extension,
    PresetDocument, PresetError,
};
use crate::scanner::{scan, PresetEntry, ScanOptions};
use crate::selection::{PresetSelector, Resolution, SelectionMediator, SelectorId};

/// What a selector action ended up activating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Factory program switched (0-based index)
    Factory(usize),
    /// User preset loaded from this file
    Preset(PathBuf),
    /// Nothing activated (stale id, no neighbour, or a suppressed notification)
    Ignored,
}

pub struct PresetManager {
    settings: SettingsStore,
    /// Folder currently scanned and offered to dialogs
    directory: PathBuf,
    scan_options: ScanOptions,
    /// Result of the latest scan
    entries: Vec<PresetEntry>,
    mediator: SelectionMediator,
    picks: PendingPicks,
}

impl PresetManager {
    /// Load settings from `settings_path` and resolve the preset folder.
    ///
    /// The list stays empty until [`startup`](Self::startup) or another
    /// rebuilding call.
    pub fn new(settings_path: PathBuf, default_directory: PathBuf, scan_options: ScanOptions) -> Self {
        let settings = SettingsStore::load(settings_path, default_directory);
        let directory = settings.effective_directory();
        log::info!("[PRESETS] Preset folder: {:?}", directory);

        Self {
            settings,
            directory,
            scan_options,
            entries: Vec::new(),
            mediator: SelectionMediator::new(),
            picks: PendingPicks::default(),
        }
    }

    /// Manager using the standard per-user settings file and preset folder
    pub fn with_default_locations() -> Self {
        Self::new(
            default_settings_path(),
            default_preset_directory(),
            ScanOptions::default(),
        )
    }

    /// Build the list, match the selector to the host's preset index, then
    /// try to reload the preset that was active last time.
    ///
    /// Returns whether the last preset was restored.
    pub fn startup<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> bool {
        self.rebuild(store);
        self.mediator.sync_from_parameter(store.preset_index());
        self.load_last_preset(store)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn preset_directory(&self) -> &Path {
        &self.directory
    }

    pub fn entries(&self) -> &[PresetEntry] {
        &self.entries
    }

    pub fn selector(&self) -> &PresetSelector {
        self.mediator.selector()
    }

    pub fn mediator(&self) -> &SelectionMediator {
        &self.mediator
    }

    pub fn selected_id(&self) -> SelectorId {
        self.mediator.selected_id()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Folder for the "Open Preset Folder" action, created if it went missing.
    /// Launching the file manager is left to the host.
    pub fn reveal_preset_directory(&self) -> Result<PathBuf, PresetError> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| PresetError::io(&self.directory, e))?;
        log::info!("[PRESETS] Revealing preset folder {:?}", self.directory);
        Ok(self.directory.clone())
    }

    /// Where a preset called `name` would be saved in the current folder
    pub fn preset_file(&self, name: &str) -> PathBuf {
        preset_file(&self.directory, name)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Folder management
    // ─────────────────────────────────────────────────────────────────────

    /// Rescan the preset folder and regenerate the selector and id map.
    pub fn rebuild<S: ParameterStore + ?Sized>(&mut self, store: &S) {
        let factory_names: Vec<String> = (0..store.num_factory_presets())
            .map(|i| store.factory_preset_name(i))
            .collect();
        self.entries = scan(&self.directory, &self.scan_options);
        self.mediator.rebuild(&factory_names, &self.entries);
    }

    /// Explicit "Refresh Preset List"
    pub fn refresh<S: ParameterStore + ?Sized>(&mut self, store: &S) {
        log::info!("[PRESETS] Refreshing preset list");
        self.rebuild(store);
    }

    /// Switch to `dir`. Returns `false` and changes nothing if it is not a directory.
    pub fn set_preset_directory<S: ParameterStore + ?Sized>(&mut self, dir: &Path, store: &S) -> bool {
        if !self.settings.set_custom_directory(dir) {
            return false;
        }
        self.directory = dir.to_path_buf();
        log::info!("[PRESETS] Preset folder changed to {:?}", self.directory);
        self.rebuild(store);
        true
    }

    pub fn reset_to_default_directory<S: ParameterStore + ?Sized>(&mut self, store: &S) {
        self.directory = self.settings.reset_to_default();
        log::info!("[PRESETS] Preset folder reset to {:?}", self.directory);
        self.rebuild(store);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Save / load
    // ─────────────────────────────────────────────────────────────────────

    /// Save the store's state to `path` (extension forced to `.dx10`).
    ///
    /// On success the list is rebuilt and the new file selected. On failure
    /// the list is left as it was.
    pub fn save_preset<S: ParameterStore + ?Sized>(
        &mut self,
        path: &Path,
        store: &S,
    ) -> Result<PathBuf, PresetError> {
        let path = with_preset_extension(path);
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        PresetDocument::capture(store, name).write(&path)?;

        self.rebuild(store);
        self.mediator.select_path_quietly(&path);
        Ok(path)
    }

    /// Read `path` and swap it into the store, then remember it as the last
    /// loaded preset. The list is not rebuilt.
    ///
    /// If reading fails the store is untouched.
    pub fn load_preset<S: ParameterStore + ?Sized>(
        &mut self,
        path: &Path,
        store: &mut S,
    ) -> Result<(), PresetError> {
        let document = PresetDocument::read(path, store.state_type())?;
        document.apply(store);
        self.settings.set_last_loaded(path);
        log::info!("[PRESETS] Loaded preset {:?}", path);
        Ok(())
    }

    /// Load from a file chosen outside the list (dialog or drop): load,
    /// rebuild, and select the file if it is inside the preset folder.
    pub fn load_preset_and_refresh<S: ParameterStore + ?Sized>(
        &mut self,
        path: &Path,
        store: &mut S,
    ) -> Result<(), PresetError> {
        self.load_preset(path, store)?;
        self.rebuild(store);
        self.mediator.select_path_quietly(path);
        Ok(())
    }

    /// Reload the preset recorded in the settings, if it still exists
    pub fn load_last_preset<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> bool {
        let Some(path) = self.settings.last_loaded_preset().map(Path::to_path_buf) else {
            return false;
        };
        if !path.is_file() {
            log::info!("[PRESETS] Last preset {:?} no longer exists", path);
            return false;
        }

        match self.load_preset(&path, store) {
            Ok(()) => {
                self.mediator.select_path_quietly(&path);
                true
            }
            Err(e) => {
                log::warn!("[PRESETS] Could not restore last preset: {}", e);
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selector
    // ─────────────────────────────────────────────────────────────────────

    /// The user picked `id` in the selector.
    ///
    /// Stale ids are ignored. If loading a user preset fails, the selector
    /// goes back to its previous id and the store is untouched.
    pub fn select<S: ParameterStore + ?Sized>(
        &mut self,
        id: SelectorId,
        store: &mut S,
    ) -> Result<Selection, PresetError> {
        match self.mediator.on_selector_changed(id) {
            Some(resolution) => self.activate(resolution, store),
            None => Ok(Selection::Ignored),
        }
    }

    /// "Previous preset" button
    pub fn previous<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> Result<Selection, PresetError> {
        match self.mediator.previous() {
            Some(resolution) => self.activate(resolution, store),
            None => Ok(Selection::Ignored),
        }
    }

    /// "Next preset" button
    pub fn next<S: ParameterStore + ?Sized>(&mut self, store: &mut S) -> Result<Selection, PresetError> {
        match self.mediator.next() {
            Some(resolution) => self.activate(resolution, store),
            None => Ok(Selection::Ignored),
        }
    }

    fn activate<S: ParameterStore + ?Sized>(
        &mut self,
        resolution: Resolution,
        store: &mut S,
    ) -> Result<Selection, PresetError> {
        match resolution {
            Resolution::Factory(index) => {
                store.set_current_program(index);
                Ok(Selection::Factory(index))
            }
            Resolution::File { path, .. } => match self.load_preset(&path, store) {
                Ok(()) => Ok(Selection::Preset(path)),
                Err(e) => {
                    self.mediator.restore_previous_selection();
                    Err(e)
                }
            },
            Resolution::Stale(id) => {
                log::debug!("[PRESETS] Ignoring stale selector id {}", id);
                Ok(Selection::Ignored)
            }
        }
    }

    /// Host notification that a parameter changed. Must be delivered on the
    /// thread that owns the manager.
    pub fn parameter_changed(&mut self, parameter_id: &str, normalized: f32) {
        if parameter_id == PRESET_INDEX_PARAM {
            self.mediator.sync_from_parameter(normalized);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Drag and drop
    // ─────────────────────────────────────────────────────────────────────

    /// Whether a drag carrying `paths` should be accepted
    pub fn is_interested_in_file_drag<P: AsRef<Path>>(&self, paths: &[P]) -> bool {
        paths.iter().any(|p| has_preset_extension(p.as_ref()))
    }

    /// Load the first dropped file that is a preset and loads cleanly.
    /// Everything else in the drop is ignored.
    pub fn files_dropped<S, P>(&mut self, paths: &[P], store: &mut S) -> Option<PathBuf>
    where
        S: ParameterStore + ?Sized,
        P: AsRef<Path>,
    {
        for path in paths.iter().map(AsRef::as_ref) {
            if !is_valid_preset_file(path) {
                log::debug!("[PRESETS] Skipping dropped file {:?}", path);
                continue;
            }
            match self.load_preset_and_refresh(path, store) {
                Ok(()) => return Some(path.to_path_buf()),
                Err(e) => log::warn!("[PRESETS] Dropped preset failed to load: {}", e),
            }
        }
        None
    }

    // ─────────────────────────────────────────────────────────────────────
    // File dialogs
    // ─────────────────────────────────────────────────────────────────────

    /// Start a dialog interaction rooted at the current preset folder
    pub fn begin_pick(&mut self, kind: PickKind) -> PickHandle {
        self.picks.begin(kind, &self.directory)
    }

    /// Details of a pick that has not completed yet
    pub fn pending_pick(&self, handle: PickHandle) -> Option<&PickRequest> {
        self.picks.get(handle)
    }

    /// Deliver the dialog result for `handle`. `None` means cancelled.
    pub fn on_pick_complete<S: ParameterStore + ?Sized>(
        &mut self,
        handle: PickHandle,
        chosen: Option<PathBuf>,
        store: &mut S,
    ) -> Result<PickOutcome, PresetError> {
        let request = self.picks.complete(handle)?;

        let Some(path) = chosen else {
            log::debug!("[PRESETS] Pick {} cancelled", handle);
            return Ok(PickOutcome::Cancelled);
        };

        match request.kind {
            PickKind::SavePreset => self.save_preset(&path, store).map(PickOutcome::Saved),
            PickKind::LoadPreset => {
                if !path.is_file() {
                    return Ok(PickOutcome::Ignored(path));
                }
                self.load_preset_and_refresh(&path, store)?;
                Ok(PickOutcome::Loaded(path))
            }
            PickKind::PresetFolder => {
                if self.set_preset_directory(&path, store) {
                    Ok(PickOutcome::FolderChanged(path))
                } else {
                    Ok(PickOutcome::Ignored(path))
                }
            }
        }
    }
}
