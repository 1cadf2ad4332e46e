//! `cafebot` command line: build the index, answer questions, recommend items.

mod app;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cafebot_core::config::Config;

#[derive(Parser, Debug)]
#[command(name = "cafebot", version, about = "Cafe assistant over menu items and FAQs")]
struct Cli {
    /// Directory holding config.toml; relative data paths resolve against it.
    #[arg(long, global = true, env = "CAFEBOT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dataset, embed every document and save the vector index.
    Index,
    /// Answer one question.
    Ask {
        question: String,
        /// Free-text preferences appended to the prompt.
        #[arg(long)]
        pref: Option<String>,
    },
    /// Recommend items for a free-text preference.
    Recommend {
        preference: String,
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Interactive session with feedback collection.
    Chat,
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config_dir {
        Some(dir) => {
            let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            Config::load_from(dir, &env_name)?
        }
        None => Config::load()?,
    };
    let settings = config.settings()?;

    match cli.command {
        Command::Index => app::index(&config, &settings),
        Command::Ask { question, pref } => {
            let app = app::App::open(&config, &settings)?;
            app.ask(&question, pref.as_deref())
        }
        Command::Recommend { preference, k } => {
            let app = app::App::open(&config, &settings)?;
            app.recommend(&preference, k.unwrap_or(settings.recommend.k))
        }
        Command::Chat => {
            let app = app::App::open(&config, &settings)?;
            app.chat()
        }
    }
}
