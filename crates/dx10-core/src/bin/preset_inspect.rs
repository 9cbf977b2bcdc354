//! preset-inspect - print the DX10 preset list for a folder
//!
//! Shows the selector rows exactly as the editor would build them, with the
//! id each selectable row gets.
//!
//! ## Usage
//!
//! ```text
//! preset-inspect [DIR] [--max-depth N] [--within-depth] [--validate]
//! ```
//!
//! - `DIR`: folder to scan (defaults to the configured preset folder)
//! - `--max-depth N`: deepest folder level listed (default 3)
//! - `--within-depth`: only list folders with presets inside the listed depth
//! - `--validate`: parse every listed file and report the ones that fail

use std::path::PathBuf;

use anyhow::{bail, Context};

use dx10_core::config::{default_preset_directory, default_settings_path, SettingsStore};
use dx10_core::params::STATE_TAG;
use dx10_core::scanner::scan;
use dx10_core::selection::{SelectionMediator, SelectorItem};
use dx10_core::{FolderProbe, PresetDocument, ScanOptions};

struct Args {
    directory: Option<PathBuf>,
    options: ScanOptions,
    validate: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        directory: None,
        options: ScanOptions::default(),
        validate: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-depth" => {
                let value = iter.next().context("--max-depth needs a value")?;
                args.options.max_depth = value
                    .parse()
                    .with_context(|| format!("Invalid --max-depth value: {}", value))?;
            }
            "--within-depth" => args.options.probe = FolderProbe::WithinDepth,
            "--validate" => args.validate = true,
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            path => {
                if args.directory.is_some() {
                    bail!("Only one directory may be given");
                }
                args.directory = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;

    let directory = match args.directory {
        Some(dir) => dir,
        None => SettingsStore::load(default_settings_path(), default_preset_directory())
            .effective_directory(),
    };
    if !directory.is_dir() {
        bail!("Not a directory: {}", directory.display());
    }

    log::info!("Scanning {:?} ({:?})", directory, args.options);
    let entries = scan(&directory, &args.options);

    let mut mediator = SelectionMediator::new();
    mediator.rebuild(&[], &entries);

    println!("{}", directory.display());
    for item in mediator.selector().items() {
        match item {
            SelectorItem::Item { id, label, .. } => println!("{:>6}  {}", id, label),
            SelectorItem::Heading { label } => println!("{:>6}  {}", "", label),
            SelectorItem::Separator => println!("{:>6}  {}", "", "-".repeat(24)),
        }
    }
    println!();
    println!("{} presets", mediator.identifier_map().len());

    if args.validate {
        let mut failures = 0;
        for (id, path) in mediator.identifier_map().iter() {
            if let Err(e) = PresetDocument::read(path, STATE_TAG) {
                failures += 1;
                println!("{:>6}  {}", id, e);
            }
        }
        if failures > 0 {
            bail!("{} preset(s) failed to parse", failures);
        }
        println!("All presets parsed");
    }

    Ok(())
}
