use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use qdi_ps_client::{CapabilityView, capabilities, cli};
use std::path::{Path, PathBuf};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// QDI - PS: submit Replicate task exports to the extraction service and collect the results
#[derive(Parser)]
#[command(name = "qdips", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source QDI_API_BASE_URL from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// Extraction service origin, overrides QDI_API_BASE_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload JSON task exports and a mapping file, then list the produced artifacts
    Run {
        /// Replicate task export JSON files
        json_files: Vec<PathBuf>,

        /// Delimited mapping file sent alongside the JSON files
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Also download every produced artifact into this directory
        #[arg(short, long)]
        download_dir: Option<PathBuf>,
    },

    /// List the source and target connectors the service supports
    Supported,

    /// Download artifacts by identifier
    Download {
        /// Artifact identifiers as returned by `run`
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Directory to save artifacts to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv_loaded = Path::new(&cli.env).exists();
    if dotenv_loaded {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if dotenv_loaded {
        log::debug!("Sourced environment from {}", cli.env.bright_black());
    }

    let gateway = cli::load_gateway(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Run {
            json_files,
            mapping,
            download_dir,
        } => {
            log::info!(
                "Running extraction on {} JSON file(s) against {}",
                json_files.len(),
                gateway.bright_black()
            );
            let references = cli::run_extraction(
                &gateway,
                &json_files,
                mapping.as_deref(),
                download_dir.as_deref(),
            )
            .await?;

            if references.is_empty() {
                log::warn!("Extraction finished without producing any artifacts");
            } else {
                println!("{}", "Download Outputs".bold());
                for reference in &references {
                    println!(
                        "  {} {}",
                        reference.identifier.cyan(),
                        reference.url.as_str().bright_black()
                    );
                }
            }
        }
        Commands::Supported => {
            let view = cli::show_capabilities(&gateway).await;
            print_capabilities(&view);
            if let CapabilityView::Error(message) = view {
                eyre::bail!("{}", message);
            }
        }
        Commands::Download {
            identifiers,
            output_dir,
        } => {
            log::info!(
                "Downloading {} artifact(s) to {}",
                identifiers.len(),
                output_dir.display().bright_black()
            );
            let written = cli::download_artifacts(
                &gateway,
                identifiers.iter().map(String::as_str),
                &output_dir,
            )
            .await?;
            log::info!("✓ Downloaded {} artifact(s)", written.len());
        }
    }

    Ok(())
}

fn print_capabilities(view: &CapabilityView) {
    for line in view.render() {
        let styled = match line.as_str() {
            capabilities::HEADING => line.bold().to_string(),
            capabilities::SOURCES_HEADING | capabilities::TARGETS_HEADING => {
                line.green().to_string()
            }
            capabilities::LOADING_NOTICE | capabilities::EMPTY_NOTICE => {
                line.bright_black().to_string()
            }
            _ if line.trim() == capabilities::NONE_CONFIGURED => line.bright_black().to_string(),
            _ if line.starts_with("Error:") => line.red().to_string(),
            _ => line.clone(),
        };
        println!("{}", styled);
    }
}
