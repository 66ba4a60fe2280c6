use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::domain::controller::flow_controller::{FlowController, FlowHandle};
use crate::domain::flow::flow_rule::FlowRule;
use crate::domain::utils::id::FlowId;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct MockState {
    next_flow_id: u64,
    installed: BTreeMap<FlowHandle, FlowRule>,
    install_calls: usize,
    remove_calls: usize,
    fail_install: bool,
    fail_remove: bool,
    confirm_limit: Option<usize>,
}

/// In-memory controller that accepts every rule and hands out sequential flow ids.
///
/// Clones share state, so a test can keep one clone for inspection and pass
/// another to the session manager.
#[derive(Debug, Clone, Default)]
pub struct MockFlowController {
    state: Arc<Mutex<MockState>>,
}

impl MockFlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_install(&self, fail: bool) {
        self.state.lock().expect("Mutex poisoned").fail_install = fail;
    }

    pub fn set_fail_remove(&self, fail: bool) {
        self.state.lock().expect("Mutex poisoned").fail_remove = fail;
    }

    /// Installs and confirms at most `limit` rules of each batch.
    pub fn set_confirm_limit(&self, limit: Option<usize>) {
        self.state.lock().expect("Mutex poisoned").confirm_limit = limit;
    }

    pub fn installed_count(&self) -> usize {
        self.state.lock().expect("Mutex poisoned").installed.len()
    }

    pub fn installed_rules(&self) -> Vec<FlowRule> {
        self.state.lock().expect("Mutex poisoned").installed.values().cloned().collect()
    }

    pub fn is_installed(&self, handle: &FlowHandle) -> bool {
        self.state.lock().expect("Mutex poisoned").installed.contains_key(handle)
    }

    pub fn install_calls(&self) -> usize {
        self.state.lock().expect("Mutex poisoned").install_calls
    }

    pub fn remove_calls(&self) -> usize {
        self.state.lock().expect("Mutex poisoned").remove_calls
    }
}

#[async_trait]
impl FlowController for MockFlowController {
    async fn install_flows(&self, rules: &[FlowRule]) -> Result<Vec<FlowHandle>> {
        let mut state = self.state.lock().expect("Mutex poisoned");
        state.install_calls += 1;

        if state.fail_install {
            return Err(Error::controller("mock controller rejected the batch"));
        }

        let confirmed = state.confirm_limit.unwrap_or(rules.len()).min(rules.len());
        let mut handles = Vec::with_capacity(confirmed);
        for rule in &rules[..confirmed] {
            state.next_flow_id += 1;
            let handle = FlowHandle { device_id: rule.device.clone(), flow_id: FlowId::new(state.next_flow_id.to_string()) };
            state.installed.insert(handle.clone(), rule.clone());
            handles.push(handle);
        }

        log::debug!("MockFlowController installed {} rules", handles.len());
        Ok(handles)
    }

    async fn remove_flow(&self, handle: &FlowHandle) -> Result<()> {
        let mut state = self.state.lock().expect("Mutex poisoned");
        state.remove_calls += 1;

        if state.fail_remove {
            return Err(Error::controller(format!("mock controller refused to remove {}/{}", handle.device_id, handle.flow_id)));
        }

        match state.installed.remove(handle) {
            Some(_) => Ok(()),
            None => Err(Error::controller(format!("flow {}/{} is not installed", handle.device_id, handle.flow_id))),
        }
    }
}
