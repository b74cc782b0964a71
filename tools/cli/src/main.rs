//! pinstore CLI - pin JSON documents to IPFS pinning services.
//!
//! Documents go to the configured provider; when it fails they are
//! addressed and held locally for the lifetime of the process. The `shell`
//! command keeps one process alive so locally held documents stay
//! retrievable between commands.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pinstore_common::{ContentId, Document, PinningConfig, ProviderKind};
use pinstore_storage::{create_default_registry, identify, PinningService, UploadOrigin};

#[derive(Parser)]
#[command(name = "pinstore")]
#[command(about = "pinstore - content-addressed JSON storage on IPFS pinning services")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (environment variables are used otherwise).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Provider override: local, web3storage, pinata or infura. Unknown names
    /// use the local daemon.
    #[arg(long, global = true)]
    provider: Option<String>,

    /// IPFS API URL override.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Retrieval gateway override.
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a JSON document.
    Upload {
        /// JSON file, or "-" for stdin.
        input: String,
    },

    /// Retrieve a document by identifier.
    Get {
        /// Content identifier.
        cid: String,
    },

    /// Print the local identifier of a document without uploading it.
    Cid {
        /// JSON file, or "-" for stdin.
        input: String,
    },

    /// List registered providers and show the active one.
    Providers,

    /// Start an interactive session.
    Shell,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Upload { input } => cmd_upload(&cli, input).await,

        Commands::Get { cid } => cmd_get(&cli, cid).await,

        Commands::Cid { input } => cmd_cid(input).await,

        Commands::Providers => cmd_providers(&cli),

        Commands::Shell => cmd_shell(&cli).await,

        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "pinstore", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Build the configuration from file or environment, then apply flags.
fn load_config(cli: &Cli) -> Result<PinningConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            PinningConfig::from_json(&json).context("Invalid config file")?
        }
        None => PinningConfig::from_env().context("Invalid environment configuration")?,
    };

    if let Some(provider) = &cli.provider {
        config.provider = ProviderKind::resolve(provider);
    }
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(gateway_url) = &cli.gateway_url {
        config.gateway_url = Some(gateway_url.clone());
    }
    config.validate()?;

    Ok(config)
}

fn build_service(cli: &Cli) -> Result<PinningService> {
    let config = load_config(cli)?;
    PinningService::from_config(&config).context("Failed to create pinning service")
}

/// Read a JSON document from a file or stdin.
async fn read_document(input: &str) -> Result<Document> {
    let text = if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        text
    } else {
        tokio::fs::read_to_string(Path::new(input))
            .await
            .with_context(|| format!("Failed to read {}", input))?
    };

    serde_json::from_str(&text).context("Input is not valid JSON")
}

fn origin_label(origin: &UploadOrigin) -> String {
    match origin {
        UploadOrigin::Provider { provider } => format!("pinned by {}", provider),
        UploadOrigin::Fallback { reason } => format!("stored locally ({})", reason),
    }
}

/// Upload a document.
async fn cmd_upload(cli: &Cli, input: &str) -> Result<()> {
    let document = read_document(input).await?;
    let service = build_service(cli)?;
    info!("Uploading via {}", service.provider_name());

    let receipt = service.upload_with_receipt(&document).await;

    println!("{}", receipt.cid);
    eprintln!("  {}", origin_label(&receipt.origin));
    if receipt.is_fallback() {
        eprintln!("  note: locally stored documents last only as long as this process");
    }

    Ok(())
}

/// Retrieve a document.
async fn cmd_get(cli: &Cli, cid: &str) -> Result<()> {
    let cid = ContentId::new(cid).context("Invalid content identifier")?;
    let service = build_service(cli)?;

    match service.retrieve(&cid).await {
        Some(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        None => anyhow::bail!("Not found: {}", cid),
    }
}

/// Print the local identifier of a document.
async fn cmd_cid(input: &str) -> Result<()> {
    let document = read_document(input).await?;
    println!("{}", identify(&document));
    Ok(())
}

/// List providers.
fn cmd_providers(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let service = PinningService::from_config(&config)?;

    println!("Registered providers:");
    for name in create_default_registry().providers() {
        let marker = if name == service.provider_name() { "*" } else { " " };
        println!("  {} {}", marker, name);
    }
    println!("Configured: {}", config.provider);
    println!("Active: {}", service.provider_name());

    Ok(())
}

/// One parsed shell line.
#[derive(Debug, PartialEq)]
enum ShellCommand {
    Put(Document),
    Get(ContentId),
    Cid(Document),
    List,
    Help,
    Quit,
    Empty,
}

fn parse_shell_line(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let document = |rest: &str| -> Result<Document> {
        serde_json::from_str(rest).context("Argument is not valid JSON")
    };

    match verb {
        "put" => Ok(ShellCommand::Put(document(rest)?)),
        "get" => Ok(ShellCommand::Get(
            ContentId::new(rest).context("Usage: get <cid>")?,
        )),
        "cid" => Ok(ShellCommand::Cid(document(rest)?)),
        "ls" => Ok(ShellCommand::List),
        "help" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => anyhow::bail!("Unknown command '{}', try 'help'", other),
    }
}

const SHELL_HELP: &str = "\
Commands:
  put <json>   upload a document
  get <cid>    retrieve a document
  cid <json>   print the local identifier of a document
  ls           list locally stored identifiers
  help         show this help
  quit         leave the shell";

/// Interactive session over one service instance.
async fn cmd_shell(cli: &Cli) -> Result<()> {
    let service = build_service(cli)?;
    println!("pinstore shell (provider: {}). Type 'help' for commands.", service.provider_name());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match parse_shell_line(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("error: {:#}", err);
                continue;
            }
        };

        match command {
            ShellCommand::Put(document) => {
                let receipt = service.upload_with_receipt(&document).await;
                println!("{} ({})", receipt.cid, origin_label(&receipt.origin));
            }
            ShellCommand::Get(cid) => match service.retrieve(&cid).await {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => println!("not found: {}", cid),
            },
            ShellCommand::Cid(document) => println!("{}", identify(&document)),
            ShellCommand::List => {
                let store = service.local_store();
                if store.is_empty() {
                    println!("Local store is empty.");
                } else {
                    for cid in store.ids() {
                        if let Some(entry) = store.entry(&cid) {
                            println!("  {}  {}", cid, entry.stored_at.to_rfc3339());
                        }
                    }
                }
            }
            ShellCommand::Help => println!("{}", SHELL_HELP),
            ShellCommand::Quit => break,
            ShellCommand::Empty => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["pinstore"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_file_with_flag_overrides() {
        let file = config_file(r#"{"provider": "pinata", "pinata_api_key": "k"}"#);
        let path = file.path().to_str().unwrap();

        let config = load_config(&cli(&["--config", path, "providers"])).unwrap();
        assert_eq!(config.provider, ProviderKind::Pinata);

        let config = load_config(&cli(&[
            "--config",
            path,
            "--provider",
            "infura",
            "--gateway-url",
            "https://gw.example.com/ipfs",
            "providers",
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Infura);
        assert_eq!(config.gateway_url(), "https://gw.example.com/ipfs");
    }

    #[tokio::test]
    async fn test_unknown_provider_flag_uploads_to_fallback() {
        let file = config_file(r#"{"api_url": "http://127.0.0.1:9/api/v0"}"#);
        let path = file.path().to_str().unwrap();
        let cli = cli(&["--config", path, "--provider", "s3", "providers"]);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.provider, ProviderKind::Local);

        let service = build_service(&cli).unwrap();
        assert_eq!(service.provider_name(), "local");
        let receipt = service.upload_with_receipt(&json!({"a": 1})).await;
        assert!(receipt.is_fallback());
        assert_eq!(receipt.cid.as_str(), "Qm015abd7f5cc57a2dd94b7590f04ad8084273905ee33e");
    }

    #[test]
    fn test_invalid_api_url_flag_is_rejected() {
        let file = config_file("{}");
        let path = file.path().to_str().unwrap();
        assert!(load_config(&cli(&["--config", path, "--api-url", "nope", "providers"])).is_err());
    }

    #[test]
    fn test_parse_shell_line() {
        assert_eq!(
            parse_shell_line(r#"put {"a": 1}"#).unwrap(),
            ShellCommand::Put(json!({"a": 1}))
        );
        assert_eq!(
            parse_shell_line("get QmAbc").unwrap(),
            ShellCommand::Get(ContentId::new("QmAbc").unwrap())
        );
        assert_eq!(parse_shell_line("  ").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_shell_line("ls").unwrap(), ShellCommand::List);
        assert_eq!(parse_shell_line("exit").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_shell_line_errors() {
        assert!(parse_shell_line("get").is_err());
        assert!(parse_shell_line("put {not json").is_err());
        assert!(parse_shell_line("frobnicate").is_err());
    }

    #[test]
    fn test_origin_label() {
        let label = origin_label(&UploadOrigin::Fallback {
            reason: "timeout".to_string(),
        });
        assert_eq!(label, "stored locally (timeout)");
    }
}
