//! Parameter store boundary
//!
//! The parameter store is owned by the plugin host side. The preset core only
//! borrows it to copy or replace its whole state, to switch factory programs,
//! and to read the normalized preset index parameter.

use crate::state::ValueTree;

/// Root tag of the synth's parameter state
pub const STATE_TAG: &str = "Parameters";

/// Parameter holding the normalized factory program index
pub const PRESET_INDEX_PARAM: &str = "PresetIndex";

/// Tag and attribute names of one parameter node inside the state
pub const PARAM_TAG: &str = "PARAM";
const PARAM_ID: &str = "id";
const PARAM_VALUE: &str = "value";

/// Parameter ids exposed by the DX10 editor
pub const DX10_PARAMETER_IDS: [&str; 16] = [
    "Attack", "Decay", "Release", "Coarse", "Fine", "Mod Init", "Mod Dec", "Mod Sus", "Mod Rel",
    "Mod Vel", "Vibrato", "Octave", "FineTune", "Waveform", "Mod Thru", "LFO Rate",
];

/// What the preset core needs from the host's parameter state container
pub trait ParameterStore {
    /// Schema tag a state tree must carry to be accepted
    fn state_type(&self) -> &str;

    /// Snapshot of the complete state
    fn copy_state(&self) -> ValueTree;

    /// Swap in a complete new state. Never partially applied.
    fn replace_state(&mut self, state: ValueTree);

    /// Number of built-in programs
    fn num_factory_presets(&self) -> usize;

    fn factory_preset_name(&self, index: usize) -> String;

    /// Activate built-in program `index` (0-based)
    fn set_current_program(&mut self, index: usize);

    /// Current value of [`PRESET_INDEX_PARAM`], normalized to `0.0..=1.0`
    fn preset_index(&self) -> f32;
}

/// Read a parameter value out of a state tree
pub fn parameter_value(state: &ValueTree, id: &str) -> Option<f32> {
    state
        .find_child(PARAM_TAG, PARAM_ID, id)?
        .attribute(PARAM_VALUE)?
        .parse()
        .ok()
}

/// Set (or add) a parameter value in a state tree
pub fn set_parameter_value(state: &mut ValueTree, id: &str, value: f32) {
    match state.find_child_mut(PARAM_TAG, PARAM_ID, id) {
        Some(param) => param.set_attribute(PARAM_VALUE, value.to_string()),
        None => state.add_child(
            ValueTree::new(PARAM_TAG)
                .with_attribute(PARAM_ID, id)
                .with_attribute(PARAM_VALUE, value.to_string()),
        ),
    }
}

/// Initial DX10 state: every editor parameter plus the preset index
pub fn dx10_default_state() -> ValueTree {
    let mut state = ValueTree::new(STATE_TAG);
    for id in DX10_PARAMETER_IDS {
        set_parameter_value(&mut state, id, 0.5);
    }
    set_parameter_value(&mut state, PRESET_INDEX_PARAM, 0.0);
    state
}

/// In-memory parameter store used by the inspection tool and tests.
///
/// Counts every write so callers can check that a UI update did not write
/// back into the store.
#[derive(Debug, Clone)]
pub struct MemoryParameterStore {
    state: ValueTree,
    programs: Vec<(String, ValueTree)>,
    writes: usize,
}

impl Default for MemoryParameterStore {
    fn default() -> Self {
        Self::new(dx10_default_state(), Vec::new())
    }
}

impl MemoryParameterStore {
    /// Store starting at `state`, with `programs` as its factory presets
    pub fn new(state: ValueTree, programs: Vec<(String, ValueTree)>) -> Self {
        Self {
            state,
            programs,
            writes: 0,
        }
    }

    /// Store whose factory programs are copies of the default state that
    /// differ only in their preset index
    pub fn with_program_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let last = names.len().saturating_sub(1).max(1) as f32;
        let programs = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let mut state = dx10_default_state();
                set_parameter_value(&mut state, PRESET_INDEX_PARAM, i as f32 / last);
                (name, state)
            })
            .collect();
        Self::new(dx10_default_state(), programs)
    }

    pub fn state(&self) -> &ValueTree {
        &self.state
    }

    pub fn parameter(&self, id: &str) -> Option<f32> {
        parameter_value(&self.state, id)
    }

    /// Change one parameter, as automation or a knob would
    pub fn set_parameter(&mut self, id: &str, value: f32) {
        set_parameter_value(&mut self.state, id, value);
        self.writes += 1;
    }

    /// Number of writes since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl ParameterStore for MemoryParameterStore {
    fn state_type(&self) -> &str {
        STATE_TAG
    }

    fn copy_state(&self) -> ValueTree {
        self.state.clone()
    }

    fn replace_state(&mut self, state: ValueTree) {
        self.state = state;
        self.writes += 1;
    }

    fn num_factory_presets(&self) -> usize {
        self.programs.len()
    }

    fn factory_preset_name(&self, index: usize) -> String {
        self.programs
            .get(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }

    fn set_current_program(&mut self, index: usize) {
        if let Some((_, state)) = self.programs.get(index) {
            self.state = state.clone();
            self.writes += 1;
        }
    }

    fn preset_index(&self) -> f32 {
        self.parameter(PRESET_INDEX_PARAM).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_has_all_parameters() {
        let state = dx10_default_state();
        assert!(state.has_tag(STATE_TAG));
        for id in DX10_PARAMETER_IDS {
            assert_eq!(parameter_value(&state, id), Some(0.5));
        }
        assert_eq!(parameter_value(&state, PRESET_INDEX_PARAM), Some(0.0));
    }

    #[test]
    fn test_program_switch_moves_preset_index() {
        let mut store = MemoryParameterStore::with_program_names(["A", "B", "C"]);
        assert_eq!(store.num_factory_presets(), 3);
        assert_eq!(store.factory_preset_name(1), "B");

        store.set_current_program(2);
        assert_eq!(store.preset_index(), 1.0);
        assert_eq!(store.write_count(), 1);

        store.set_current_program(7);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_set_parameter_counts_writes() {
        let mut store = MemoryParameterStore::default();
        store.set_parameter("Attack", 0.25);
        assert_eq!(store.parameter("Attack"), Some(0.25));
        assert_eq!(store.write_count(), 1);
    }
}
