//! gwalink CLI: drive the connector core over JSON-lines record files.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use gwalink_schema::Layer;
use tracing_subscriber::EnvFilter;

use manifest::GwalinkConfig;

#[derive(Parser)]
#[command(name = "gwalink", version, about = "GSA native record identity and ordering tools")]
struct Cli {
    /// Log cache decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a gwalink.toml in the given directory
    Init {
        /// Target directory (default: current directory)
        dir: Option<PathBuf>,
        /// Model layer (design, analysis, both)
        #[arg(long, default_value = "both")]
        layer: Layer,
    },
    /// Load native records from a JSON-lines file into a fresh session
    Hydrate {
        /// Input file, one record per line
        input: PathBuf,
        /// Model layer (design, analysis, both)
        #[arg(long)]
        layer: Option<Layer>,
        /// Report progress every N records
        #[arg(long)]
        progress_every: Option<usize>,
        /// Fail when any record is rejected
        #[arg(long)]
        strict: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the keyword processing order for a layer
    Generations {
        /// Model layer (design, analysis, both)
        #[arg(long)]
        layer: Option<Layer>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List keywords with set command, layers and references
    Keywords {
        /// Only keywords of this layer
        #[arg(long)]
        layer: Option<Layer>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { dir, layer } => {
            let dir = dir.unwrap_or(cwd);
            commands::init::run(&dir, layer)
        }

        Commands::Hydrate {
            input,
            layer,
            progress_every,
            strict,
            json,
        } => {
            let config = load_config(&cwd)?;
            commands::hydrate::run(
                &input,
                config.layer(layer),
                config.progress_every(progress_every),
                config.strict(strict),
                json,
            )
        }

        Commands::Generations { layer, json } => {
            let config = load_config(&cwd)?;
            commands::generations::run(config.layer(layer), json)
        }

        Commands::Keywords { layer } => commands::keywords::run(layer),
    }
}

/// Load `gwalink.toml` from the current directory upward, or defaults.
fn load_config(cwd: &Path) -> anyhow::Result<GwalinkConfig> {
    Ok(GwalinkConfig::find_and_load(cwd)?
        .map(|(config, _)| config)
        .unwrap_or_default())
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// init → hydrate using the generated config.
    #[test]
    fn init_then_hydrate_with_config() {
        let dir = tempfile::tempdir().unwrap();
        commands::init::create_config(dir.path(), Layer::Design).unwrap();
        let input = dir.path().join("model.jsonl");
        std::fs::write(
            &input,
            concat!(
                r#"{"keyword":"NODE","index":1,"application_id":"n1"}"#,
                "\n",
                r#"{"keyword":"MEMB","application_id":"m1"}"#,
                "\n",
            ),
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        let report =
            commands::hydrate::hydrate_file(&input, config.layer(None), config.progress_every(None)).unwrap();
        assert_eq!(report.layer, Layer::Design);
        assert_eq!(report.summary.inserted, 2);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn cli_parses_layer_flags() {
        let cli = Cli::try_parse_from(["gwalink", "generations", "--layer", "analysis", "--json"]).unwrap();
        match cli.command {
            Commands::Generations { layer, json } => {
                assert_eq!(layer, Some(Layer::Analysis));
                assert!(json);
            }
            _ => panic!("expected generations"),
        }
        assert!(Cli::try_parse_from(["gwalink", "keywords", "--layer", "sideways"]).is_err());
    }

    #[test]
    fn cli_parses_hydrate() {
        let cli = Cli::try_parse_from(["gwalink", "-v", "hydrate", "in.jsonl", "--progress-every", "50", "--strict"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Hydrate {
                input,
                progress_every,
                strict,
                layer,
                json,
            } => {
                assert_eq!(input, PathBuf::from("in.jsonl"));
                assert_eq!(progress_every, Some(50));
                assert!(strict);
                assert!(layer.is_none());
                assert!(!json);
            }
            _ => panic!("expected hydrate"),
        }
    }
}
