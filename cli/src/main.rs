use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tibiawiki_core::config::{MalformedFilePolicy, WikiConfig};
use tibiawiki_core::extract::extract_directory;
use tibiawiki_core::file_utils::write_json_file;
use tibiawiki_core::tasks::{DEFAULT_ROOM_FILES, TASKS_JSON_INDENT, extract_tasks};
use tibiawiki_core::{ItemPipeline, write_items};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "tibiawiki",
    version = "0.1.0",
    about = "CLI tool for TibiaWiki item and task data extraction",
    long_about = None
)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/tibiawiki-tools.log")]
    log_file: PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract item tables from saved .txt pages into intermediate JSON files
    ExtractItems {
        /// Directory searched recursively for saved pages
        #[arg(long, default_value = ".")]
        input_dir: PathBuf,
        /// Directory receiving one JSON file per page
        #[arg(long, default_value = "todos_os_jsons")]
        output_dir: PathBuf,
        /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Transform intermediate item JSON files into the V2 item database
    TransformItems {
        /// Directory with intermediate JSON files
        #[arg(long, default_value = "todos_os_jsons")]
        input_dir: PathBuf,
        /// Output JSON file
        #[arg(long, default_value = "banco_de_dados_itens.json")]
        output: PathBuf,
        /// Skip files that are not valid JSON instead of aborting
        #[arg(long, default_value_t = false)]
        skip_malformed: bool,
        /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Extract tasks from saved task room pages
    ExtractTasks {
        /// Room pages to read (defaults to the known task rooms)
        files: Vec<PathBuf>,
        /// Output JSON file
        #[arg(long, default_value = "tasks.json")]
        output: PathBuf,
        /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },
}

fn setup_logging(verbose: u8, log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("tibiawiki.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn load_config(path: Option<&Path>) -> Result<WikiConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {:?}", path);
            }
            WikiConfig::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => Ok(WikiConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ExtractItems { input_dir, output_dir, quiet } => {
            if !input_dir.exists() {
                anyhow::bail!("Input directory not found: {:?}", input_dir);
            }

            if quiet == 0 {
                info!("Searching for saved pages in {:?}", input_dir);
                info!("JSON files will be written to {:?}", output_dir);
            }

            let report = extract_directory(&input_dir, &output_dir, &config.extract, quiet)?;

            if quiet == 0 {
                info!("--- Summary ---");
                info!("Pages extracted: {} ({} rows)", report.written, report.rows);
                info!("Pages without item table: {}", report.without_table);
                info!("Pages replaced by a later page with the same output name: {}", report.shadowed);
                info!("Errors: {}", report.failed);
            }
        }
        Commands::TransformItems { input_dir, output, skip_malformed, quiet } => {
            if !input_dir.is_dir() {
                anyhow::bail!(
                    "Input directory {:?} not found. Run extract-items first or pass --input-dir.",
                    input_dir
                );
            }

            if quiet == 0 {
                info!("Transforming item files in {:?}", input_dir);
            }

            let mut pipeline = ItemPipeline::new(&config.items);
            if skip_malformed {
                pipeline = pipeline.with_policy(MalformedFilePolicy::Skip);
            }

            let outcome = pipeline.run(&input_dir, quiet)?;
            write_items(&output, &outcome.items)?;

            if quiet < 2 && !outcome.skipped.is_empty() {
                tracing::warn!("Skipped {} malformed files: {}", outcome.skipped.len(), outcome.skipped.join(", "));
            }
            if quiet == 0 {
                info!("--- Summary ---");
                for file in &outcome.files {
                    info!("{}: {} items as '{}'", file.file_name, file.items, file.tipo);
                }
                info!("Done! {} items were processed.", outcome.items.len());
                info!("Item database saved to {:?}", output);
            }
        }
        Commands::ExtractTasks { files, output, quiet } => {
            let files = if files.is_empty() {
                DEFAULT_ROOM_FILES.iter().map(PathBuf::from).collect()
            } else {
                files
            };

            let tasks = extract_tasks(&files, quiet)?;
            write_json_file(&output, &tasks, TASKS_JSON_INDENT)?;

            if quiet == 0 {
                info!("Extraction complete! {} tasks saved to {:?}", tasks.len(), output);
            }
        }
    }

    Ok(())
}
