use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bibrank_core::{AppConfig, BibrankError, ExitCode, Quartile, Session};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bibrank",
    about = "Filter a BibTeX bibliography by journal quartile and subject category",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting BIBRANK_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the categories of the journals referenced by a bibliography.
    Categories {
        /// BibTeX file.
        bib: PathBuf,
        /// Ranking CSV export (e.g. SCImago).
        ranking: PathBuf,
    },

    /// Keep the articles whose journal ranks in the chosen quartiles and categories.
    Filter {
        bib: PathBuf,
        ranking: PathBuf,
        /// Quartile to keep (Q1..Q4 or 1..4). Repeatable.
        #[arg(short, long = "quartile", action = clap::ArgAction::Append)]
        quartile: Vec<Quartile>,
        /// Category to keep. Repeatable.
        #[arg(short, long = "category", action = clap::ArgAction::Append)]
        category: Vec<String>,
        /// Write the filtered bibliography to this file.
        #[arg(short, long, conflicts_with = "write")]
        output: Option<PathBuf>,
        /// Write the filtered bibliography to the configured export file name.
        #[arg(long)]
        write: bool,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Show the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();

    if let Err(err) = run() {
        let code = err
            .downcast_ref::<BibrankError>()
            .map(ExitCode::from)
            .unwrap_or(ExitCode::GeneralError);
        eprintln!("Error: {err:#}");
        std::process::exit(code as i32);
    }
}

fn run() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("BIBRANK_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)?;
    debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::Categories { bib, ranking } => {
            let mut session = Session::new(config);
            let bib_bytes = read_input(&bib)?;
            let ranking_bytes = read_input(&ranking)?;
            let upload =
                session.submit_files(Some(bib_bytes.as_slice()), Some(ranking_bytes.as_slice()))?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "entries": upload.bibliography.len(),
                        "matched_journals": upload.matched_journals,
                        "categories": upload.category_counts,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if upload.category_counts.is_empty() {
                println!("No ranked journals found for this bibliography.");
            } else {
                println!(
                    "{} entries, {} ranked journals:",
                    upload.bibliography.len(),
                    upload.matched_journals.len()
                );
                for count in &upload.category_counts {
                    println!("  {}", count.label());
                }
            }
        }

        Commands::Filter {
            bib,
            ranking,
            quartile,
            category,
            output,
            write,
        } => {
            let export_target = match (output, write) {
                (Some(path), _) => Some(path),
                (None, true) => Some(PathBuf::from(&config.export.file_name)),
                (None, false) => None,
            };

            let mut session = Session::new(config);
            let bib_bytes = read_input(&bib)?;
            let ranking_bytes = read_input(&ranking)?;
            session.submit_files(Some(bib_bytes.as_slice()), Some(ranking_bytes.as_slice()))?;

            for q in quartile {
                session.select_quartile(q)?;
            }
            for name in category {
                session.pick_category(name)?;
            }

            let winners = session.submit_selection()?.clone();
            let export = session.export()?;
            if let Some(path) = &export_target {
                std::fs::write(path, &export.content)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "journals": winners.journals,
                        "articles": winners.articles,
                        "export": {
                            "path": export_target.as_ref().map(|p| p.display().to_string()),
                            "mime_type": export.mime_type,
                            "content": export_target.is_none().then_some(&export.content),
                        },
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                // keep stdout clean for the bibliography when it goes there
                let summary = |line: String| {
                    if export_target.is_some() {
                        println!("{line}");
                    } else {
                        eprintln!("{line}");
                    }
                };
                summary(format!("Winning journals ({}):", winners.journals.len()));
                for journal in &winners.journals {
                    summary(format!("  {}  [{}]", journal.title, journal.categories));
                }
                summary(format!("Winning articles: {}", winners.articles.len()));

                match &export_target {
                    Some(path) => println!("Wrote {}", path.display()),
                    None => print!("{}", export.content),
                }
            }
        }

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config.key_values();
                    if json_output {
                        let data: serde_json::Map<String, serde_json::Value> = kv
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
                            .collect();
                        print_json(&serde_json::json!({"status":"ok","data":data,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Path => {
                    let exists = config_path.exists();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"path":config_path.display().to_string(),"exists":exists},"meta":{"duration_ms":dur}}))?;
                    } else if exists {
                        println!("{}", config_path.display());
                    } else {
                        println!("{} (not found, using defaults)", config_path.display());
                    }
                }
            }
        }

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("bibrank v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BIBRANK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(BibrankError::from)
        .with_context(|| format!("reading {}", path.display()))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
