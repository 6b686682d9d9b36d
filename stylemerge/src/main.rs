//! stylemerge - merge documents under the styles of a main document
//!
//! A CLI tool that restyles and merges word-processing documents using the
//! paragraph styles and list numbering of one main document.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ModeArg};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use stylemerge::parser::parse_document;
use stylemerge::walker::{collect_inputs, read_input};
use stylemerge::{
    DocumentId, DocumentStyleMap, ElementKind, MergeConfig, MergeSettingsPatch, ParsedDocument,
    Session, SourceType, DEFAULT_CONFIG_FILE,
};

/// Main entry point for the stylemerge CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            inputs,
            main,
            mode,
            config,
            output_dir,
            page_breaks,
            verbose,
        } => {
            handle_merge_command(inputs, main, mode, config, output_dir, page_breaks, verbose)?;
        }

        Commands::Inspect { files, verbose } => {
            handle_inspect_command(files, verbose)?;
        }

        Commands::Scaffold { output, config } => {
            handle_scaffold_command(output, config)?;
        }
    }

    Ok(())
}

/// Initialize logging at info level
fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

/// Load the given configuration, or ./stylemerge.toml when it exists
fn load_config(path: Option<PathBuf>) -> Result<MergeConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(MergeConfig::default());
            }
            default
        }
    };

    println!("Config: {}", path.display());
    MergeConfig::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Handle the merge command
fn handle_merge_command(
    inputs: Vec<PathBuf>,
    main: Option<PathBuf>,
    mode: Option<ModeArg>,
    config: Option<PathBuf>,
    output_dir: PathBuf,
    page_breaks: bool,
    verbose: bool,
) -> Result<()> {
    if verbose {
        init_logging();
    }

    let config = load_config(config)?;

    // The main document goes first so the session promotes it
    let mut paths = Vec::new();
    if let Some(main) = &main {
        paths.push(main.clone());
    }
    paths.extend(inputs);
    let paths = collect_inputs(&paths).context("Failed to collect input files")?;
    if paths.is_empty() {
        anyhow::bail!("No .docx, .txt or .pdf files found in the given inputs");
    }

    println!("Merging documents...");
    println!("Main: {}", paths[0].display());
    println!("Output: {}", output_dir.display());

    // Stage 1: Parse inputs
    println!("\n[Stage 1/3] Parsing {} input files...", paths.len());
    let files = paths
        .iter()
        .map(|path| read_input(path).with_context(|| format!("Failed to read {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    // Settings first: the page-description policy applies while adding
    let session = Session::new().update_settings(&config.settings);
    let session = session.add_documents_with_progress(files, |percent| {
        if verbose {
            println!("  {}%", percent);
        }
    });
    let session = config
        .apply(session)
        .context("Invalid configuration")?
        .update_settings(&MergeSettingsPatch {
            mode: mode.map(Into::into),
            page_break_between_documents: page_breaks.then_some(true),
            ..MergeSettingsPatch::default()
        });

    for failure in session.file_errors() {
        println!("✗ Skipped {}: {}", failure.name, failure.error);
    }
    println!("✓ Parsed {} documents", session.documents().len());

    // Stage 2: Merge and assemble
    println!("\n[Stage 2/3] Merging ({})...", session.settings().mode);
    let (session, outputs) = session.process();
    if let Some(error) = session.error() {
        anyhow::bail!("Merge failed: {}", error);
    }
    println!("✓ Assembled {} documents", outputs.len());

    // Stage 3: Write outputs
    println!("\n[Stage 3/3] Writing output files...");
    for output in &outputs {
        let path = output
            .write_to(&output_dir)
            .with_context(|| format!("Failed to write {}", output.filename))?;
        println!("✓ Successfully wrote: {}", path.display());
    }

    println!("\n✓ Merge completed successfully!");

    Ok(())
}

/// Handle the inspect command
fn handle_inspect_command(files: Vec<PathBuf>, verbose: bool) -> Result<()> {
    if verbose {
        init_logging();
    }

    for (index, path) in files.iter().enumerate() {
        let input = read_input(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let source_type = SourceType::detect(&input.name, &input.bytes);
        let doc = parse_document(DocumentId(index as u64), &input.name, &input.bytes, source_type)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        print_document_summary(path, &doc);
    }

    Ok(())
}

/// Handle the scaffold command
fn handle_scaffold_command(output: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;

    let mut style_map = DocumentStyleMap::builtin();
    config
        .apply_to_style_map(&mut style_map)
        .context("Invalid configuration")?;

    stylemerge::scaffold::write_scaffold(&style_map, &output)
        .with_context(|| format!("Failed to write scaffold to {}", output.display()))?;

    println!("✓ Successfully wrote: {}", output.display());
    println!("\nNext steps:");
    println!("  1. Open the document and adjust its styles if needed");
    println!(
        "  2. Run 'stylemerge merge --main {} <INPUTS>'",
        output.display()
    );

    Ok(())
}

/// Print the classification and style map of one document
fn print_document_summary(path: &Path, doc: &ParsedDocument) {
    println!("\n{} ({})", path.display(), doc.source_type);
    if !doc.supported {
        println!("  Not parsed; merges as an empty document");
        return;
    }

    let counts = doc.elements.iter().map(|element| element.kind).counts();
    println!("  {} elements", doc.elements.len());
    for kind in ElementKind::ALL {
        if let Some(count) = counts.get(&kind) {
            println!("    {:<14} {}", kind.to_string(), count);
        }
    }

    let structure = &doc.structure;
    println!(
        "  Heading levels: {}",
        structure.heading_levels.iter().join(", ")
    );
    println!(
        "  Last ordinals: {:?}  last bullets: {:?}",
        structure.last_heading_numbers, structure.last_bullet_numbers
    );

    println!("  Styles:");
    for (kind, style) in doc.style_map.iter_resolved() {
        let source = if doc.style_map.is_explicit(kind) {
            ""
        } else {
            " (default)"
        };
        println!(
            "    {:<14} {} - {} {}pt{}{} #{} {:?}{}",
            kind.to_string(),
            style.style_id,
            style.font_family,
            f64::from(style.font_size) / 2.0,
            if style.bold { " bold" } else { "" },
            if style.italic { " italic" } else { "" },
            style.color,
            style.alignment,
            source
        );
    }

    let formats = (0..4u8)
        .map(|level| doc.style_map.numbering_format(level))
        .join(", ");
    println!("  Numbering formats: {}", formats);

    let margins = doc.style_map.page_margins;
    println!(
        "  Margins (twips): top {} right {} bottom {} left {}",
        margins.top, margins.right, margins.bottom, margins.left
    );
}
