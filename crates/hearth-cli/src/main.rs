//! Operator CLI for Hearth
//!
//! Works directly on a JSON token file: mint secrets, look up token ids, walk a token's
//! delegation chain, grant root pseudo-capabilities to users and revoke tokens.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hearth_core::CoreConfig;
use std::path::{Path, PathBuf};

mod commands;
mod effects;

use commands::GrantKind;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth - persistent capability token tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".hearth/config.toml")]
    config: PathBuf,

    /// Token file
    #[arg(short, long, global = true, default_value = ".hearth/tokens.json")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh random secret
    NewSecret,

    /// Print the token id a secret is stored under
    TokenId {
        /// The secret, as handed to its holder
        secret: String,
    },

    /// Walk a token's delegation chain and print every link
    Inspect {
        /// The secret, as handed to its holder
        secret: String,
    },

    /// Grant a root pseudo-capability to a user and print its secret
    Grant {
        /// Capability to grant
        #[arg(value_enum)]
        kind: GrantKind,

        /// Receiving user
        #[arg(short, long)]
        user: String,

        /// Title the user sees the capability under
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Revoke a token; no later restore of it or its descendants succeeds
    Revoke {
        /// The secret, as handed to its holder
        secret: String,
    },

    /// Print the effective configuration
    Config,
}

/// Config file values, then `HEARTH_*` overrides, validated. A missing file means defaults.
fn load_config(path: &Path) -> Result<CoreConfig> {
    let mut config = if path.exists() {
        CoreConfig::load_from_file(path)?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        CoreConfig::default()
    };
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    hearth_effects::init_tracing(log_level)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::NewSecret => {
            println!("{}", commands::new_secret(&config).await);
        }
        Commands::TokenId { secret } => {
            println!("{}", commands::token_id(&secret));
        }
        Commands::Inspect { secret } => {
            let store = commands::open_store(&cli.store)?;
            for line in commands::inspect(&store, &config, &secret).await? {
                println!("{line}");
            }
        }
        Commands::Grant { kind, user, title } => {
            let store = commands::open_store(&cli.store)?;
            let secret = commands::grant(store, &config, kind, user, title).await?;
            println!("{secret}");
        }
        Commands::Revoke { secret } => {
            let store = commands::open_store(&cli.store)?;
            commands::revoke(store, &config, &secret).await?;
            println!("revoked {}", commands::token_id(&secret));
        }
        Commands::Config => {
            println!("secret_length = {}", config.secret_length);
            println!("max_chain_depth = {}", config.max_chain_depth);
            println!("max_requirement_depth = {}", config.max_requirement_depth);
        }
    }

    Ok(())
}
