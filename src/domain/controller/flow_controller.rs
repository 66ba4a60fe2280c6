use async_trait::async_trait;

use crate::domain::flow::flow_rule::FlowRule;
use crate::domain::utils::id::{DeviceId, FlowId};
use crate::error::Result;

/// Identifies an installed rule on the controller, needed to delete it again.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowHandle {
    pub device_id: DeviceId,
    pub flow_id: FlowId,
}

/// Southbound controller that programs the switches.
#[async_trait]
pub trait FlowController: std::fmt::Debug + Send + Sync {
    /// Installs all rules as one batch.
    ///
    /// # Returns
    /// One handle per installed rule.
    async fn install_flows(&self, rules: &[FlowRule]) -> Result<Vec<FlowHandle>>;

    /// Deletes a single previously installed rule.
    async fn remove_flow(&self, handle: &FlowHandle) -> Result<()>;
}

/// What the session manager does with its local reservation when the
/// controller rejects a session's rules or confirms only part of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPolicy {
    /// Keep the reservation and the session; report a rejected batch with the
    /// session id and keep whatever handles a partial install returned.
    #[default]
    BestEffort,
    /// Release the reservation and report the failure. Rules confirmed by a
    /// partial install are retracted first.
    Strict,
}
