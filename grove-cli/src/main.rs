//! # grove CLI
//!
//! Debug tooling for the grove preview engine: render a note the way
//! the preview pane would, list its scroll-sync anchors, or measure
//! anchor offsets under a given set of surface metrics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use grove_core::{
    extract_anchors, measure_line_offsets, EditorSession, MirrorMetrics, PreviewConfig, WrapMode,
};
use grove_types::ThemeVariant;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "grove")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "grove.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note to preview HTML on stdout
    Render {
        /// Markdown file to render
        file: PathBuf,

        /// Highlight palette variant
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        /// Vault-relative note path used for relative-asset resolution
        /// (defaults to the file name)
        #[arg(long)]
        note_path: Option<String>,
    },

    /// List the scroll-sync anchors found in a note
    Anchors {
        /// Markdown file to scan
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Measure anchor pixel offsets under the given surface metrics
    Offsets {
        /// Markdown file to measure
        file: PathBuf,

        /// Surface content width, pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Font advance width, pixels per column
        #[arg(long, default_value_t = 8.0)]
        char_width: f64,

        /// Row height, pixels
        #[arg(long, default_value_t = 20.0)]
        line_height: f64,

        /// Columns per tab stop
        #[arg(long, default_value_t = 4)]
        tab_size: usize,

        /// Disable soft wrapping
        #[arg(long)]
        no_wrap: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for ThemeVariant {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Dark => ThemeVariant::Dark,
            ThemeArg::Light => ThemeVariant::Light,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            file,
            theme,
            note_path,
        } => render(&cli.config, &file, theme, note_path),
        Commands::Anchors { file, json } => anchors(&file, json),
        Commands::Offsets {
            file,
            width,
            char_width,
            line_height,
            tab_size,
            no_wrap,
            json,
        } => {
            let metrics = MirrorMetrics {
                content_width: width,
                char_width,
                line_height,
                padding_top: 0.0,
                tab_size,
                wrap: if no_wrap {
                    WrapMode::None
                } else {
                    WrapMode::PreWrap
                },
            };
            offsets(&file, &metrics, json)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> PreviewConfig {
    if path.exists() {
        match PreviewConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring config {}: {err}", path.display());
                PreviewConfig::default()
            }
        }
    } else {
        PreviewConfig::default()
    }
}

fn read_note(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn render(
    config_path: &Path,
    file: &Path,
    theme: Option<ThemeArg>,
    note_path: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(theme) = theme {
        config.theme = theme.into();
    }

    let content = read_note(file)?;
    let note_path = note_path.unwrap_or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut session = EditorSession::new(config);
    session.open_note(note_path, content);

    let output = session.render_preview();
    if output.render_failed {
        tracing::warn!("renderer failed; emitting the error panel");
    }
    if !output.diagram_sources.is_empty() {
        tracing::info!(
            containers = output.diagram_sources.len(),
            "diagram containers await an external renderer"
        );
    }

    println!("{}", output.html);
    Ok(())
}

#[derive(Serialize)]
struct AnchorRow {
    line: usize,
    kind: grove_types::AnchorKind,
    sequence_index: usize,
}

fn anchors(file: &Path, json: bool) -> Result<()> {
    let content = read_note(file)?;
    let anchors = extract_anchors(&content);

    if json {
        let rows: Vec<AnchorRow> = anchors
            .iter()
            .map(|a| AnchorRow {
                line: a.line,
                kind: a.kind,
                sequence_index: a.sequence_index,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for anchor in &anchors {
            println!(
                "line {:>5}  {:?} #{}",
                anchor.line, anchor.kind, anchor.sequence_index
            );
        }
        println!("{} anchors", anchors.len());
    }

    Ok(())
}

#[derive(Serialize)]
struct OffsetRow {
    line: usize,
    kind: grove_types::AnchorKind,
    offset_px: f64,
}

fn offsets(file: &Path, metrics: &MirrorMetrics, json: bool) -> Result<()> {
    let content = read_note(file)?;
    let anchors = extract_anchors(&content);
    let lines: Vec<usize> = anchors.iter().map(|a| a.line).collect();
    let measured = measure_line_offsets(&content, &lines, metrics);

    let rows: Vec<OffsetRow> = anchors
        .iter()
        .zip(&measured)
        .map(|(a, &offset_px)| OffsetRow {
            line: a.line,
            kind: a.kind,
            offset_px,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("line {:>5}  {:>10.1}px  {:?}", row.line, row.offset_px, row.kind);
        }
    }

    Ok(())
}
