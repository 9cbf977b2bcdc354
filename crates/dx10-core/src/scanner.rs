//! Preset directory scanner
//!
//! Walks the preset folder and produces the flat, depth-annotated listing
//! the selector renders as an indented list. At each level every folder
//! that (transitively) holds a preset is listed first, each followed by its
//! own contents, and then the preset files of that level:
//!
//! ```text
//! root/
//! ├── A/a1.dx10          A      (folder, depth 0)
//! ├── B/                   a1   (file,   depth 1)
//! └── top.dx10           top    (file,   depth 0)
//! ```
//!
//! `B` is left out because nothing below it is a preset.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::preset::has_preset_extension;

/// Default nesting limit for listed entries
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// One folder or preset file found by [`scan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetEntry {
    /// Folder name, or file name without extension
    pub display_name: String,
    pub path: PathBuf,
    pub is_folder: bool,
    /// Nesting level below the scan root (root-level entries are 0)
    pub depth: usize,
}

/// How far the "does this folder hold any presets" probe looks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FolderProbe {
    /// Search the whole subtree, even below `max_depth`. A folder at the
    /// depth limit can then be listed as a heading with nothing under it.
    #[default]
    Unbounded,
    /// Only count presets that would themselves be listed
    WithinDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Deepest level at which entries are listed
    pub max_depth: usize,
    pub probe: FolderProbe,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            probe: FolderProbe::default(),
        }
    }
}

/// Scan `root` into a flat, ordered listing.
///
/// A missing or unreadable root gives an empty listing.
pub fn scan(root: &Path, options: &ScanOptions) -> Vec<PresetEntry> {
    let mut entries = Vec::new();
    scan_level(root, 0, options, &mut entries);
    log::debug!(
        "[SCANNER] {:?}: {} entries ({} presets)",
        root,
        entries.len(),
        entries.iter().filter(|e| !e.is_folder).count()
    );
    entries
}

fn scan_level(dir: &Path, depth: usize, options: &ScanOptions, out: &mut Vec<PresetEntry>) {
    if depth > options.max_depth {
        return;
    }

    let mut children: Vec<(String, PathBuf)> = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir
            .filter_map(|e| e.ok())
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .filter(|(name, _)| !is_hidden(name))
            .collect(),
        Err(e) => {
            log::warn!("[SCANNER] Cannot read {:?}: {}", dir, e);
            return;
        }
    };

    // Sort entries alphabetically for consistent ordering
    children.sort_by(|a, b| a.0.cmp(&b.0));

    // Folders that hold presets, each followed by its contents
    for (name, path) in children.iter().filter(|(_, p)| p.is_dir()) {
        let probe_depth = match options.probe {
            FolderProbe::Unbounded => None,
            FolderProbe::WithinDepth => Some(options.max_depth.saturating_sub(depth)),
        };
        if contains_presets(path, probe_depth) {
            out.push(PresetEntry {
                display_name: name.clone(),
                path: path.clone(),
                is_folder: true,
                depth,
            });
            scan_level(path, depth + 1, options, out);
        }
    }

    // Then the presets at this level
    for (_, path) in children
        .iter()
        .filter(|(_, p)| p.is_file() && has_preset_extension(p))
    {
        out.push(PresetEntry {
            display_name: file_stem(path),
            path: path.clone(),
            is_folder: false,
            depth,
        });
    }
}

/// Whether any non-hidden preset file lives below `dir`. `max_depth` limits
/// the search relative to `dir` (1 = direct children only, 0 = nothing).
///
/// Symlinks are followed, matching the listing pass. Link loops surface as
/// walk errors and are skipped.
fn contains_presets(dir: &Path, max_depth: Option<usize>) -> bool {
    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(true);
    match max_depth {
        // walkdir would raise a max_depth below min_depth back up to 1
        Some(0) => return false,
        Some(depth) => walker = walker.max_depth(depth),
        None => {}
    }

    walker
        .into_iter()
        .filter_entry(|e| !is_hidden(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file() && has_preset_extension(e.path()))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
