use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use horary::cli::export::ExportFormat;
use horary::cli::save::SaveArgs;
use horary::cli::{annotate, export, list, note, render, save, setting, show, stats};
use horary::config::Config;
use horary::engine::ResultFileEngine;
use horary::store::ChartStore;

#[derive(Parser)]
#[command(name = "horary")]
#[command(about = "Horary chart journal: store judged charts, keep notes, draw chart wheels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "horary.yaml")]
    config: String,

    /// Database path (overrides the config file)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a judged chart from an engine result file (JSON)
    Save {
        /// Result file written by the judgment engine
        result: PathBuf,
        /// Question text (defaults to the one echoed in the result)
        #[arg(short, long)]
        question: Option<String>,
        /// Location (defaults to the one echoed in the result)
        #[arg(short, long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// List recent charts
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Substring of the question or location
        #[arg(short, long)]
        search: Option<String>,
        /// YES, NO, UNCLEAR, ...
        #[arg(short, long)]
        judgment: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a chart
    Show {
        id: i64,
        /// Include the aspect table
        #[arg(long)]
        aspects: bool,
    },

    /// List charts cast between two dates (inclusive)
    Range {
        /// Start date (YYYY-MM-DD or RFC 3339)
        from: String,
        /// End date (YYYY-MM-DD or RFC 3339)
        to: String,
    },

    /// Show statistics
    Stats,

    /// Draw a chart wheel as SVG
    Render {
        id: i64,
        /// Output file (default: chart-<id>.svg)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Side length in pixels (default from config)
        #[arg(long)]
        size: Option<u32>,
    },

    /// Change notes, tags or category of a chart
    Annotate {
        id: i64,
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a chart
    Delete { id: i64 },

    /// Delete every chart
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Export all charts
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Copy the database to a new file
    Backup { dest: PathBuf },

    /// Research notebook
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },

    /// Application settings stored in the database
    Setting {
        #[command(subcommand)]
        command: SettingCommands,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create a notebook entry
    Add {
        title: String,
        #[arg(default_value = "")]
        content: String,
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Chart this entry refers to
        #[arg(long)]
        chart: Option<i64>,
    },
    /// List notebook entries
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a notebook entry
    Show { id: i64 },
    /// Edit a notebook entry
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a notebook entry
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SettingCommands {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_default();

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Initialize store
    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    let store = ChartStore::open(&db_path)?;

    match cli.command {
        Commands::Save {
            result,
            question,
            location,
            notes,
            tags,
            category,
        } => {
            let engine = ResultFileEngine::new(result);
            save::run(
                &store,
                &engine,
                SaveArgs {
                    question,
                    location,
                    notes,
                    tags,
                    category,
                },
            )?;
        }
        Commands::List {
            limit,
            search,
            judgment,
            category,
        } => {
            list::run(&store, limit, search, judgment, category)?;
        }
        Commands::Show { id, aspects } => {
            show::run(&store, id, aspects)?;
        }
        Commands::Range { from, to } => {
            list::range(&store, &from, &to)?;
        }
        Commands::Stats => {
            stats::run(&store)?;
        }
        Commands::Render { id, out, size } => {
            let size = size
                .map(|s| s.max(100) as f64)
                .unwrap_or_else(|| config.wheel_size());
            render::run(&store, id, out, size)?;
        }
        Commands::Annotate {
            id,
            notes,
            tags,
            category,
        } => {
            annotate::annotate(&store, id, notes, tags, category)?;
        }
        Commands::Delete { id } => {
            annotate::delete(&store, id)?;
        }
        Commands::Clear { yes } => {
            annotate::clear(&store, yes)?;
        }
        Commands::Export { format, out } => {
            export::run(&store, format, out)?;
        }
        Commands::Backup { dest } => {
            export::backup(&store, &dest)?;
        }
        Commands::Note { command } => match command {
            NoteCommands::Add {
                title,
                content,
                category,
                tags,
                chart,
            } => {
                note::add(&store, title, content, category, tags, chart)?;
            }
            NoteCommands::List { category } => {
                note::list(&store, category)?;
            }
            NoteCommands::Show { id } => {
                note::show(&store, id)?;
            }
            NoteCommands::Edit {
                id,
                title,
                content,
                category,
                tags,
            } => {
                note::edit(&store, id, title, content, category, tags)?;
            }
            NoteCommands::Delete { id } => {
                note::delete(&store, id)?;
            }
        },
        Commands::Setting { command } => match command {
            SettingCommands::Get { key } => setting::get(&store, &key)?,
            SettingCommands::Set { key, value } => setting::set(&store, &key, &value)?,
            SettingCommands::Unset { key } => setting::unset(&store, &key)?,
            SettingCommands::List => setting::list(&store)?,
        },
    }

    Ok(())
}
