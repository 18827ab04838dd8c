//! Main entry point for the retryable tracker.
//!
//! Looks up Arbitrum retryable tickets for an account by cross-referencing
//! the retryables and bridge subgraphs. Results are printed as text or JSON,
//! or served through a small HTTP server with a lookup page.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracker_config::{ApiConfig, Config, ExplorerConfig};
use tracker_core::{LatestKind, TicketTracker, TrackerBuilder};
use tracker_index::IndexFactory;
use tracker_types::AccountAddress;

mod apis;
mod render;
mod server;

/// Command-line arguments for the retryable tracker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file; built-in defaults are used when omitted
	#[arg(short, long, env = "TRACKER_CONFIG")]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Output format for lookup results
	#[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
	format: OutputFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
	Text,
	Json,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// Pending tickets created from the address
	Pending { address: String },
	/// Latest tickets created by bridge deposits from the address
	Deposits {
		address: String,
		/// Number of results, capped by `resolver.max_results`
		#[arg(long)]
		count: Option<u32>,
	},
	/// Latest tickets sent directly by the address
	Direct {
		address: String,
		/// Number of results, capped by `resolver.max_results`
		#[arg(long)]
		count: Option<u32>,
	},
	/// Pending tickets plus the latest direct (or deposit) tickets
	Lookup {
		address: String,
		#[arg(long)]
		only_deposits: bool,
	},
	/// Run the HTTP server
	Serve,
}

/// Main entry point for the retryable tracker.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration
/// 4. Builds the tracker with the configured index reader
/// 5. Runs the requested command
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// Logs go to stderr so stdout only carries results
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let config = load_config(args.config.as_ref()).await?;
	let tracker = Arc::new(build_tracker(config.clone())?);

	match args.command {
		Command::Serve => {
			let api_config = config.api.clone().unwrap_or_default();
			if !api_config.enabled {
				return Err("API server is disabled in the configuration".into());
			}
			serve(api_config, tracker, config.explorer).await
		},
		command => {
			let output = run_command(command, args.format, &tracker, &config.explorer).await?;
			print!("{}", output);
			Ok(())
		},
	}
}

async fn load_config(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
	match path {
		Some(path) => {
			let config = Config::from_file(path).await?;
			tracing::info!("Loaded configuration from {}", path.display());
			Ok(config)
		},
		None => {
			tracing::info!("No configuration file given, using defaults");
			Ok(Config::default())
		},
	}
}

/// Builds the tracker with every registered index implementation available.
fn build_tracker(config: Config) -> Result<TicketTracker, Box<dyn std::error::Error>> {
	let index_factories: HashMap<String, IndexFactory> = tracker_index::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();

	Ok(TrackerBuilder::new(config).build(&index_factories)?)
}

async fn serve(
	api_config: ApiConfig,
	tracker: Arc<TicketTracker>,
	explorer: ExplorerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
	let state = server::AppState { tracker, explorer };

	tokio::select! {
		result = server::start_server(api_config, state) => {
			result?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Stopped retryable tracker");
	Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
	Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// Runs a lookup command and renders its result.
async fn run_command(
	command: Command,
	format: OutputFormat,
	tracker: &TicketTracker,
	explorer: &ExplorerConfig,
) -> Result<String, Box<dyn std::error::Error>> {
	let tickets = match command {
		Command::Pending { address } => {
			let address = AccountAddress::parse(&address)?;
			tracker.pending_for_address(&address).await?
		},
		Command::Deposits { address, count } => {
			let address = AccountAddress::parse(&address)?;
			tracker.latest_deposits(&address, count).await?
		},
		Command::Direct { address, count } => {
			let address = AccountAddress::parse(&address)?;
			tracker.latest_direct(&address, count).await?
		},
		Command::Lookup {
			address,
			only_deposits,
		} => {
			let address = AccountAddress::parse(&address)?;
			let kind = if only_deposits {
				LatestKind::Deposits
			} else {
				LatestKind::Direct
			};
			let report = tracker.lookup(&address, kind).await?;
			return match format {
				OutputFormat::Text => Ok(render::report_text(&report, explorer)),
				OutputFormat::Json => to_json(&report),
			};
		},
		Command::Serve => return Err("serve is not a lookup command".into()),
	};

	match format {
		OutputFormat::Text => Ok(render::tickets_text(&tickets, explorer)),
		OutputFormat::Json => to_json(&tickets),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	const ADDRESS: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

	fn write_fixture(dir: &std::path::Path) -> PathBuf {
		let fixture = dir.join("fixture.json");
		let content = serde_json::json!({
			"tickets": [{
				"id": "0x1",
				"status": "Created",
				"timeoutTimestamp": "4102444800",
				"createdAtTimestamp": "1700000000",
				"createdAtTxHash": "0xcreate"
			}],
			"submissions": [{
				"id": "s1",
				"sender": ADDRESS,
				"retryableTicketID": "0xcreate",
				"timestamp": "1700000000",
				"transactionHash": "0xabc"
			}],
			"deposits": [{
				"id": "d1",
				"type": "EthDeposit",
				"sender": ADDRESS,
				"ethValue": "1000",
				"timestamp": "1700000000",
				"transactionHash": "0xabc"
			}]
		});
		fs::write(&fixture, content.to_string()).unwrap();
		fixture
	}

	async fn memory_tracker(dir: &std::path::Path) -> TicketTracker {
		let fixture = write_fixture(dir);
		let config_path = dir.join("tracker.toml");
		fs::write(
			&config_path,
			format!(
				"[index]\nprimary = \"memory\"\n[index.implementations.memory]\nfixture = \"{}\"\n",
				fixture.display()
			),
		)
		.unwrap();

		let config = load_config(Some(&config_path)).await.unwrap();
		build_tracker(config).unwrap()
	}

	#[test]
	fn test_parse_subcommands() {
		let args = Args::try_parse_from(["retryable-tracker", "deposits", ADDRESS, "--count", "3"])
			.unwrap();
		assert_eq!(args.format, OutputFormat::Text);
		assert_eq!(
			args.command,
			Command::Deposits {
				address: ADDRESS.to_string(),
				count: Some(3)
			}
		);

		let args = Args::try_parse_from([
			"retryable-tracker",
			"--format",
			"json",
			"lookup",
			ADDRESS,
			"--only-deposits",
		])
		.unwrap();
		assert_eq!(args.format, OutputFormat::Json);
		assert_eq!(
			args.command,
			Command::Lookup {
				address: ADDRESS.to_string(),
				only_deposits: true
			}
		);
	}

	#[tokio::test]
	async fn test_default_config_without_file() {
		let config = load_config(None).await.unwrap();
		assert_eq!(config.index.primary, "subgraph");
		assert!(build_tracker(config).is_ok());
	}

	#[tokio::test]
	async fn test_pending_text_output() {
		let dir = tempdir().unwrap();
		let tracker = memory_tracker(dir.path()).await;

		let output = run_command(
			Command::Pending {
				address: ADDRESS.to_string(),
			},
			OutputFormat::Text,
			&tracker,
			&ExplorerConfig::default(),
		)
		.await
		.unwrap();

		assert!(output.contains("Ticket 0x1 [Created]"));
		assert!(output.contains("https://etherscan.io/tx/0xabc"));
		assert!(output.contains("ETH (1000 wei)"));
	}

	#[tokio::test]
	async fn test_deposits_json_output() {
		let dir = tempdir().unwrap();
		let tracker = memory_tracker(dir.path()).await;

		let output = run_command(
			Command::Deposits {
				address: ADDRESS.to_string(),
				count: None,
			},
			OutputFormat::Json,
			&tracker,
			&ExplorerConfig::default(),
		)
		.await
		.unwrap();

		let tickets: serde_json::Value = serde_json::from_str(&output).unwrap();
		assert_eq!(tickets[0]["isDeposit"], true);
		assert_eq!(tickets[0]["deposit"]["type"], "EthDeposit");
	}

	#[tokio::test]
	async fn test_lookup_text_output() {
		let dir = tempdir().unwrap();
		let tracker = memory_tracker(dir.path()).await;

		let output = run_command(
			Command::Lookup {
				address: ADDRESS.to_string(),
				only_deposits: false,
			},
			OutputFormat::Text,
			&tracker,
			&ExplorerConfig::default(),
		)
		.await
		.unwrap();

		assert!(output.contains("Pending retryables"));
		assert!(output.contains("Latest direct retryables"));
	}

	#[tokio::test]
	async fn test_invalid_address_is_rejected() {
		let dir = tempdir().unwrap();
		let tracker = memory_tracker(dir.path()).await;

		let result = run_command(
			Command::Direct {
				address: "0xnothex".to_string(),
				count: None,
			},
			OutputFormat::Text,
			&tracker,
			&ExplorerConfig::default(),
		)
		.await;

		assert!(result.is_err());
	}
}
