use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bcn")]
#[command(about = "Beacon proximity engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> platform -> site...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Classify one recorded batch against the shipped identity sets
    Classify {
        /// JSON array of native beacon records
        #[arg(long)]
        batch: String,
    },

    /// Replay a recorded session through the full scan controller
    Replay {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// JSON array of batches
        #[arg(long)]
        batches: String,

        /// Answer every permission request with a denial
        #[arg(long, default_value_t = false)]
        deny_permissions: bool,

        /// Fail instead of warning when the config has keys this platform never reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = bcn_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Classify { batch } => commands::classify::classify_batch(&batch)?,

        Commands::Replay {
            config_paths,
            batches,
            deny_permissions,
            strict_config,
        } => {
            commands::replay::replay(config_paths, &batches, deny_permissions, strict_config).await?
        }
    }

    Ok(())
}
