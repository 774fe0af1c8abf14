//! Umbra Command Line Interface
//!
//! Name utilities and scripted deployment of the stealth key registry.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use umbra_cli::{execute, CliConfig, Registration};
use umbra_types::{namehash, Address, Contract, InterfaceId, KeyWord, StealthKeys};

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Umbra stealth key registry tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the namehash of a dotted name
    Namehash {
        /// Name such as alice.umbra.eth
        name: String,
    },
    /// Print the interface id of a function signature
    InterfaceId {
        /// Signature such as "addr(bytes32)"
        signature: String,
    },
    /// Deploy a registry in memory and record the deploy history
    Deploy(DeployCommand),
}

#[derive(Args)]
struct DeployCommand {
    /// Label to register under the parent name after deployment
    #[arg(long, requires = "owner")]
    register: Option<String>,
    /// Owner of the registered name
    #[arg(long, requires = "register")]
    owner: Option<Address>,
    #[arg(long, default_value_t = 2)]
    spending_prefix: u8,
    /// Spending public key x-coordinate, up to 32 bytes of hex (left-padded)
    #[arg(long, value_parser = KeyWord::from_hex, requires = "register")]
    spending_key: Option<KeyWord>,
    #[arg(long, default_value_t = 2)]
    viewing_prefix: u8,
    /// Viewing public key x-coordinate, up to 32 bytes of hex (left-padded)
    #[arg(long, value_parser = KeyWord::from_hex, requires = "register")]
    viewing_key: Option<KeyWord>,
}

impl DeployCommand {
    fn registration(&self) -> Result<Option<Registration>> {
        let (Some(label), Some(owner)) = (&self.register, self.owner) else {
            return Ok(None);
        };
        let (Some(spending), Some(viewing)) = (self.spending_key, self.viewing_key) else {
            bail!("--register needs both --spending-key and --viewing-key");
        };
        Ok(Some(Registration {
            label: label.clone(),
            owner,
            keys: StealthKeys::new(self.spending_prefix, spending, self.viewing_prefix, viewing),
        }))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Namehash { name } => {
            println!("{}", namehash(&name)?.to_hex());
            Ok(())
        }
        Commands::InterfaceId { signature } => {
            println!("{}", InterfaceId::from_signature(&signature).to_hex());
            Ok(())
        }
        Commands::Deploy(cmd) => {
            let mut config = CliConfig::load(cli.config.as_deref())?;
            if let Some(level) = cli.log_level {
                config.log_level = level;
            }
            init_logging(&config)?;
            handle_deploy(cmd, &config)
        }
    }
}

fn handle_deploy(cmd: DeployCommand, config: &CliConfig) -> Result<()> {
    let registration = cmd.registration()?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string();
    let deployment = execute(config, registration.as_ref(), &timestamp)?;

    println!("Directory:              {}", deployment.directory.address());
    println!("PublicResolver:         {}", deployment.public_resolver.address());
    println!("ForwardingKeyResolver:  {}", deployment.forwarding_resolver.address());
    println!("StandaloneKeyResolver:  {}", deployment.standalone_resolver.address());
    println!("FifsRegistrar:          {}", deployment.registrar.address());
    if let Some(node) = deployment.registered {
        println!("Registered node:        {node}");
    }
    Ok(())
}

fn init_logging(config: &CliConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
