//! Capsort command-line front end
//!
//! Drives the engine over arguments and stdin. Machine-readable output goes
//! to stdout as JSON lines; reports and logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use capsort_core::{Engine, FileKind, FormatterConfig, MemoryStore, RequesterId, SearchFilter};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};

/// Config file looked up under the user config directory.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("capsort").join("config.json"))
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "capsort")]
#[command(about = "Parse, format and sequence episode captions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Formatter config file (JSON)
    #[arg(short, long, global = true, env = "CAPSORT_CONFIG")]
    config: Option<PathBuf>,

    /// Requester the calls are made on behalf of
    #[arg(short, long, global = true, default_value_t = 0)]
    requester: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Format captions given as arguments, or one per stdin line
    Format {
        text: Vec<String>,
        /// Fixed anime name; `reset` returns to auto-detection
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Parse a bulk listing from stdin and dry-run it into a memory store
    Bulk,
    /// Sequence files given as JSON lines on stdin
    Sequence,
    /// Parse link filenames, or search them with a filter
    Link {
        urls: Vec<String>,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long)]
        episode: Option<u32>,
        /// e.g. `480` or `480p`
        #[arg(long)]
        quality: Option<String>,
    },
    /// Show or edit the prefix rotation
    Prefixes {
        /// Append a prefix
        #[arg(long)]
        add: Option<String>,
        /// Remove the prefix at this 1-based position
        #[arg(long)]
        remove: Option<usize>,
        /// Write the resulting list back to the config file
        #[arg(long)]
        save: bool,
    },
}

/// One file of a `sequence` run.
#[derive(Debug, Deserialize)]
struct FileInput {
    file_id: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    kind: FileKind,
}

/// Resolves which config file to read: the explicit path (flag or env) must
/// exist, the default one is optional.
fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => bail!("config file not found: {}", path.display()),
        None => Ok(default_config_path().filter(|p| p.exists())),
    }
}

fn load_config(path: Option<&Path>) -> Result<FormatterConfig> {
    let Some(path) = path else {
        return Ok(FormatterConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: FormatterConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    config.validate()?;
    info!(path = %path.display(), prefixes = config.prefixes.len(), "config loaded");
    Ok(config)
}

async fn read_stdin_lines() -> Result<Vec<String>> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        out.push(line);
    }
    Ok(out)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn name_override(arg: &str) -> Option<String> {
    (!arg.trim().eq_ignore_ascii_case("reset")).then(|| arg.to_string())
}

fn link_filter(
    season: Option<u32>,
    episode: Option<u32>,
    quality: Option<String>,
) -> Option<SearchFilter> {
    (season.is_some() || episode.is_some() || quality.is_some()).then_some(SearchFilter {
        season,
        quality,
        episode,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = load_config(config_path.as_deref())?;
    let engine = Engine::new(config.clone())?;
    let requester = RequesterId(cli.requester);

    match cli.command {
        Commands::Format { text, name } => {
            if let Some(name) = name {
                engine.state().set_fixed_name(name_override(&name));
            }
            let inputs = if text.is_empty() {
                read_stdin_lines().await?
            } else {
                text
            };
            for input in inputs {
                let caption = engine.format_caption(&input, requester);
                if caption.is_empty() {
                    warn!("skipping blank input");
                    continue;
                }
                println!("{caption}");
            }
        }
        Commands::Bulk => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).await?;
            if !engine.looks_like_bulk(&text) {
                bail!("input does not look like a bulk listing (`<n>. <content> - <url>`)");
            }
            let entries = engine.parse_bulk_message(&text);
            if entries.is_empty() {
                bail!("could not parse any entries from the listing");
            }
            for entry in &entries {
                print_json(entry)?;
            }
            let report = capsort_core::store_entries(&MemoryStore::new(), &entries);
            eprintln!("{report}");
        }
        Commands::Sequence => {
            engine.begin_session(requester);
            for (n, line) in read_stdin_lines().await?.into_iter().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let file: FileInput = serde_json::from_str(&line)
                    .with_context(|| format!("line {}: expected a file object", n + 1))?;
                let meta = engine.ingest_file(
                    requester,
                    &file.file_id,
                    file.filename.as_deref(),
                    &file.caption,
                    file.kind,
                )?;
                info!(file = %meta.filename, status = %meta.status_line(), "file received");
            }

            let (plan, summary) = engine.end_session(requester)?;
            if plan.is_empty() {
                bail!(
                    "no valid files found; expected names like `[S01-E07] Show Name [1080P] [Single].mkv`"
                );
            }
            for group in &plan.groups {
                eprintln!("{}", group.header());
                for file in &group.files {
                    print_json(file)?;
                }
            }
            eprintln!("{summary}");
        }
        Commands::Link {
            urls,
            season,
            episode,
            quality,
        } => match link_filter(season, episode, quality) {
            Some(filter) => {
                for hit in engine.search_links(urls.iter().map(String::as_str), &filter) {
                    println!("{hit}");
                }
            }
            None => {
                for url in &urls {
                    print_json(&engine.parse_link(url))?;
                }
            }
        },
        Commands::Prefixes { add, remove, save } => {
            let rotation = &engine.state().rotation;
            if let Some(index) = remove {
                let removed = rotation.remove_prefix(index)?;
                eprintln!("removed {removed}");
            }
            if let Some(prefix) = add {
                rotation.add_prefix(&prefix)?;
            }
            for (i, prefix) in rotation.prefixes().iter().enumerate() {
                println!("{}. {prefix}", i + 1);
            }
            eprintln!(
                "next prefix: {} (rotates every {} messages)",
                rotation.upcoming_prefix(),
                rotation.period()
            );

            if save {
                let path = config_path
                    .or_else(default_config_path)
                    .context("no config directory available")?;
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                let updated = FormatterConfig {
                    prefixes: rotation.prefixes(),
                    ..config
                };
                std::fs::write(&path, serde_json::to_string_pretty(&updated)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "config saved");
            }
        }
    }

    Ok(())
}
