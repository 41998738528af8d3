use std::path::PathBuf;
use std::time::Duration;

use chronicle_core::{EditorState, LogNotifier, MarkSet, RawSelection, SectionId, TokenId};
use chronicle_store::config::Saver;
use chronicle_store::telemetry::{self, TelemetryConfig};
use chronicle_store::{Config, FileStore, HttpStore, load_corpus, load_section};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};

#[derive(Parser)]
#[command(version, about = "Chronicle - inspect reading selections against an annotation store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file (.toml or .json)
    #[arg(long, env = "CHRONICLE_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the annotation store, overrides the config file
    #[arg(long, env = "CHRONICLE_ENDPOINT")]
    endpoint: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the store's sections
    Sections,
    /// List the annotation labels the store knows
    Labels,
    /// Select a span of readings and show the annotation state for it
    Inspect {
        /// First reading of the selection, e.g. r12
        from: String,

        /// Last reading of the selection; selections may run backwards
        to: String,

        /// Section to load, defaults to the configured one
        #[arg(long)]
        section: Option<String>,
    },
    /// Write a default config file
    InitConfig {
        /// Where to write it; the format follows the extension
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    telemetry::init(TelemetryConfig::from_env("chronicle").with_verbosity(cli.verbose));

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if let Commands::InitConfig { path } = &cli.command {
        let path = path.clone().unwrap_or(config_path);
        return init_config(path);
    }

    let config = load_config(&config_path, cli.endpoint)?;
    let store = build_store(&config)?;

    match cli.command {
        Commands::Sections => list_sections(&store).await,
        Commands::Labels => list_labels(&store).await,
        Commands::Inspect { from, to, section } => {
            let section = section
                .map(|s| SectionId::from(s.as_str()))
                .or(config.section.clone())
                .ok_or_else(|| miette!("No section given. Pass --section or set one in the config."))?;
            inspect(&store, section, &from, &to).await
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chronicle")
        .join("config.toml")
}

/// File config with the command-line endpoint on top. A missing file
/// means defaults.
fn load_config(path: &PathBuf, endpoint: Option<String>) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(&FileStore::new(path))?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Config::default()
    };
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    Ok(config)
}

fn init_config(path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    FileStore::new(&path).save(&Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn build_store(config: &Config) -> Result<HttpStore> {
    Ok(HttpStore::with_timeout(
        &config.endpoint,
        Duration::from_secs(config.timeout_secs),
    )?)
}

async fn list_sections(store: &HttpStore) -> Result<()> {
    use chronicle_store::AnnotationStore;

    let sections = store.sections().await?;
    for section in &sections {
        println!("{}\t{}", section.id, section.display_name());
    }
    Ok(())
}

async fn list_labels(store: &HttpStore) -> Result<()> {
    use chronicle_store::AnnotationStore;

    let specs = store.annotation_labels().await?;
    for spec in &specs {
        println!("{}", spec.name);
    }
    Ok(())
}

async fn inspect(store: &HttpStore, section: SectionId, from: &str, to: &str) -> Result<()> {
    let from = TokenId::parse(from).ok_or_else(|| miette!("Not a reading id: {from}"))?;
    let to = TokenId::parse(to).ok_or_else(|| miette!("Not a reading id: {to}"))?;

    let mut state = EditorState::new();
    let failures = load_corpus(store, &mut state, &LogNotifier).await;
    if failures > 0 {
        tracing::warn!(failures, "corpus incomplete, results may be missing annotations");
    }
    if !load_section(store, &mut state, section.clone(), &LogNotifier).await {
        return Err(miette!("Could not load the text of section {section}"));
    }

    let mut marks = MarkSet::default();
    let phase = state.select(&RawSelection::between(from, to), &mut marks);
    tracing::info!(?phase, "selection resolved");

    let report = serde_json::to_string_pretty(&state.report()).into_diagnostic()?;
    println!("{report}");
    Ok(())
}
