use std::path::Path;
use std::sync::Arc;

use crate::domain::controller::flow_controller::FlowController;
use crate::domain::session::session_manager::SessionManager;
use crate::domain::topology::topology::NetworkTopology;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads the topology description at `file_path` and returns a session
/// manager that installs its rules through `controller`.
pub fn load_session_manager(file_path: impl AsRef<Path>, controller: Arc<dyn FlowController>) -> Result<SessionManager> {
    let file_path = file_path.as_ref();
    log::info!("Loading network topology from '{}'.", file_path.display());

    let topology = NetworkTopology::from_file(file_path)?;
    log::info!("Session manager ready with {} switches.", topology.switches().len());

    Ok(SessionManager::new(topology, controller))
}
