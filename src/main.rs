use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;

use sdn_session_manager::api::controller_config_dto::ControllerConfigDto;
use sdn_session_manager::domain::controller::flow_controller::FlowController;
use sdn_session_manager::domain::controller::flow_controller_mock::MockFlowController;
use sdn_session_manager::domain::controller::onos::OnosFlowController;
use sdn_session_manager::domain::session::session::SessionKind;
use sdn_session_manager::domain::session::session_manager::SessionManager;
use sdn_session_manager::domain::utils::id::SwitchNumber;
use sdn_session_manager::error::Error;
use sdn_session_manager::loader::parser::parse_json_file;
use sdn_session_manager::{load_session_manager, logger};

#[derive(Debug, Parser)]
#[command(name = "sdn-session", about = "Bandwidth-aware session admission on an SDN controlled network")]
struct Cli {
    /// Topology description (nodes and links with delay, bandwidth and ports).
    #[arg(short, long, default_value = "data/network.json")]
    topology: PathBuf,

    /// JSON file with controller connection settings.
    #[arg(long)]
    controller_config: Option<PathBuf>,

    /// Controller base URL, overrides the config file.
    #[arg(long)]
    controller_url: Option<String>,

    /// Use an in-memory controller instead of talking to a real one.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the hosts of the topology.
    Hosts,
    /// Rank the distinct paths between two hosts by achievable bandwidth.
    Explore { host_a: String, host_b: String, kind: SessionKind },
    /// Admit a session and hold it until Ctrl-C.
    Connect {
        host_a: String,
        host_b: String,
        kind: SessionKind,
        /// Requested bandwidth in Mb/s, required for TCP and UDP.
        bandwidth: Option<f64>,
    },
}

fn controller_from(cli: &Cli) -> anyhow::Result<Arc<dyn FlowController>> {
    if cli.dry_run {
        log::info!("Dry run: flow rules are kept in memory.");
        return Ok(Arc::new(MockFlowController::new()));
    }

    let mut config = match &cli.controller_config {
        Some(path) => parse_json_file::<ControllerConfigDto>(path).with_context(|| format!("reading controller config '{}'", path.display()))?,
        None => ControllerConfigDto::default(),
    };
    if let Some(url) = &cli.controller_url {
        config.base_url = url.clone();
    }
    log::info!("Using flow controller at {}", config.base_url);

    Ok(Arc::new(OnosFlowController::new(&config)?))
}

fn resolve(manager: &SessionManager, name: &str) -> anyhow::Result<SwitchNumber> {
    manager.switch_by_name(name).map(|switch| switch.number).ok_or_else(|| Error::UnknownSwitch(name.to_string()).into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let controller = controller_from(&cli)?;
    let mut manager = load_session_manager(&cli.topology, controller).with_context(|| format!("loading topology '{}'", cli.topology.display()))?;

    match &cli.command {
        Command::Hosts => {
            let names: Vec<&str> = manager.topology().switches().iter().map(|switch| switch.name.as_str()).collect();
            println!("{}", names.join(", "));
        }
        Command::Explore { host_a, host_b, kind } => {
            let (a, b) = (resolve(&manager, host_a)?, resolve(&manager, host_b)?);
            for explored in manager.test_between(a, b, *kind)? {
                println!("Max: {} Mb/s, Path: {}", format!("{:.2}", explored.threshold).bold(), manager.describe_path(&explored.path));
            }
        }
        Command::Connect { host_a, host_b, kind, bandwidth } => {
            let (a, b) = (resolve(&manager, host_a)?, resolve(&manager, host_b)?);
            let bandwidth = kind.requested_bandwidth(*bandwidth)?;

            let id = match manager.add_path(a, b, *kind, bandwidth).await {
                Ok(id) => id,
                Err(Error::ControllerFailure { session: Some(id), reason }) => {
                    eprintln!("{} {}", "Controller did not confirm the rules:".yellow(), reason);
                    id
                }
                Err(e) => {
                    eprintln!("{} {}", "Could not create the session:".red(), e);
                    return Err(anyhow::Error::new(e).context(format!("connecting {} and {}", host_a, host_b)));
                }
            };

            println!("{}", "Created a new path:".green());
            println!("{}", manager.describe_session(id, 0)?);
            println!("Press Ctrl-C to remove the session.");

            tokio::signal::ctrl_c().await?;
            manager.remove_all_sessions().await?;
            println!("Removed all paths.");
        }
    }

    Ok(())
}
