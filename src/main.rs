use anyhow::Result;
use candor::build::{build_site, related_for};
use candor::config::Config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Derives related-post suggestions and an Atom feed from a blog's posts.
#[derive(Parser)]
#[command(name = "candor", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Path to the project file. By default `candor.yaml` is searched for in
    /// the working directory and its ancestors.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Write the page descriptors and the feed to the output directory.
    Build {
        /// Overrides the project's output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a random selection of the posts related to the post at PATH.
    Related {
        /// The post's URL path, e.g. `/hello-world`.
        path: String,

        /// How many posts to pick. Defaults to the project's `related_limit`.
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Command::Build { output } => {
            let config = load_config(cli.config.as_deref(), output.as_deref())?;
            build_site(&config)?;
        }
        Command::Related { path, limit } => {
            let config = load_config(cli.config.as_deref(), None)?;
            let limit = limit.unwrap_or(config.related_limit);
            for post in related_for(&config, path, limit, &mut rand::rng())? {
                println!("{}\t{}", post.title, post.path);
            }
        }
    }
    Ok(())
}

fn load_config(project_file: Option<&Path>, output: Option<&Path>) -> Result<Config> {
    match project_file {
        Some(path) => Config::from_project_file(path, output),
        None => Config::from_directory(&std::env::current_dir()?, output),
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "candor=info",
        1 => "candor=debug",
        _ => "candor=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `related` output stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
