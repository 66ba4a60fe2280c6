use slotmap::SlotMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::controller::flow_controller::{ControllerPolicy, FlowController, FlowHandle};
use crate::domain::flow::flow_rule::derive_rules;
use crate::domain::routing::capacity_explorer::{self, ExploredPath};
use crate::domain::routing::path_finder::find_shortest;
use crate::domain::session::session::{Session, SessionId, SessionKind};
use crate::domain::topology::switch::Switch;
use crate::domain::topology::topology::NetworkTopology;
use crate::domain::utils::id::SwitchNumber;
use crate::error::{Error, Result};

/// Owns the topology and every active session, and is the only place where
/// link reservations change.
///
/// Admission and removal take `&mut self`, so they can never run concurrently
/// on the same instance. Hosts that share a manager between tasks wrap it in a
/// single `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct SessionManager {
    topology: NetworkTopology,
    sessions: SlotMap<SessionId, Session>,
    controller: Arc<dyn FlowController>,
    policy: ControllerPolicy,
}

impl SessionManager {
    pub fn new(topology: NetworkTopology, controller: Arc<dyn FlowController>) -> Self {
        Self { topology, sessions: SlotMap::with_key(), controller, policy: ControllerPolicy::default() }
    }

    pub fn with_policy(mut self, policy: ControllerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn policy(&self) -> ControllerPolicy {
        self.policy
    }

    /// Case-insensitive switch lookup.
    pub fn switch_by_name(&self, name: &str) -> Option<&Switch> {
        self.topology.switch_by_name(name)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = (SessionId, &Session)> {
        self.sessions.iter()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The session already occupying the unordered pair `{a, b}`, if any.
    ///
    /// A pair carries at most one session; a PING probe on the pair excludes
    /// every other class and is excluded by them.
    pub fn find_conflict(&self, a: SwitchNumber, b: SwitchNumber) -> Option<SessionId> {
        self.sessions.iter().find(|(_, session)| session.connects(a, b)).map(|(id, _)| id)
    }

    fn validate_endpoints(&self, a: SwitchNumber, b: SwitchNumber) -> Result<()> {
        for number in [a, b] {
            if self.topology.switch(number).is_none() {
                return Err(Error::UnknownSwitch(number.to_string()));
            }
        }
        if a == b {
            return Err(Error::InvalidRequest(format!("a session needs two different hosts, got {} twice", self.topology.switch_name(a))));
        }
        Ok(())
    }

    fn check_conflict(&self, a: SwitchNumber, b: SwitchNumber, kind: SessionKind) -> Result<()> {
        if let Some(existing) = self.find_conflict(a, b).and_then(|id| self.sessions.get(id)) {
            let (host_a, host_b) = (self.topology.switch_name(a), self.topology.switch_name(b));
            log::warn!("Conflict: {} session requested between {} and {}, but a {} session already exists.", kind, host_a, host_b, existing.kind);
            return Err(Error::Conflict { host_a, host_b });
        }
        Ok(())
    }

    /// Admits a session between `host_a` and `host_b`.
    ///
    /// Finds the lowest-delay path over links that can carry the request,
    /// reserves capacity on every link of it, and installs forwarding rules
    /// for both directions.
    ///
    /// # Returns
    /// The id of the new session. `Conflict` and `Unreachable` leave all state
    /// untouched. `ControllerFailure` under [`ControllerPolicy::BestEffort`]
    /// carries the id of the session, which stays registered with its capacity
    /// reserved.
    pub async fn add_path(&mut self, host_a: SwitchNumber, host_b: SwitchNumber, kind: SessionKind, bandwidth: f64) -> Result<SessionId> {
        self.validate_endpoints(host_a, host_b)?;
        if kind != SessionKind::Ping && (!bandwidth.is_finite() || bandwidth < 0.0) {
            return Err(Error::InvalidRequest(format!("requested bandwidth must be a non-negative number, got {}", bandwidth)));
        }
        self.check_conflict(host_a, host_b, kind)?;

        let bandwidth = if kind == SessionKind::Ping { 0.0 } else { bandwidth };

        let Some(path) = find_shortest(&self.topology, kind, bandwidth, host_a, host_b) else {
            let (host_a, host_b) = (self.topology.switch_name(host_a), self.topology.switch_name(host_b));
            log::info!("Unreachable: no admissible path for {} {:.2} Mb/s between {} and {}.", kind, bandwidth, host_a, host_b);
            return Err(Error::Unreachable { host_a, host_b });
        };

        let rules = derive_rules(&self.topology, &path, kind)?;

        let id = self.sessions.insert(Session::new(host_a, host_b, kind, bandwidth, path.clone()));
        self.reserve(id, &path, kind, bandwidth);
        log::info!("Admitted {} session {:?} ({:.2} Mb/s) on {}", kind, id, bandwidth, self.describe_path(&path));

        let installed = self.controller.install_flows(&rules).await;
        match installed {
            Ok(handles) if handles.len() < rules.len() && self.policy == ControllerPolicy::Strict => {
                log::error!("Controller confirmed {} of {} rules for session {:?}, rolling back.", handles.len(), rules.len(), id);
                for flow in &handles {
                    if let Err(e) = self.controller.remove_flow(flow).await {
                        log::warn!("Could not retract flow {}/{} of session {:?}: {}", flow.device_id, flow.flow_id, id, e);
                    }
                }
                if let Some(session) = self.sessions.remove(id) {
                    self.release(id, &session);
                }
                Err(Error::ControllerFailure { session: None, reason: format!("controller confirmed {} of {} rules", handles.len(), rules.len()) })
            }
            Ok(handles) => {
                if handles.len() != rules.len() {
                    log::warn!("Controller returned {} flow ids for {} rules of session {:?}.", handles.len(), rules.len(), id);
                }
                if let Some(session) = self.sessions.get_mut(id) {
                    session.add_flows(handles);
                }
                Ok(id)
            }
            Err(e) => match self.policy {
                ControllerPolicy::BestEffort => {
                    log::error!("Installing rules for session {:?} failed, keeping the local reservation: {}", id, e);
                    Err(Error::ControllerFailure { session: Some(id), reason: e.to_string() })
                }
                ControllerPolicy::Strict => {
                    log::error!("Installing rules for session {:?} failed, rolling back the reservation: {}", id, e);
                    if let Some(session) = self.sessions.remove(id) {
                        self.release(id, &session);
                    }
                    Err(Error::ControllerFailure { session: None, reason: e.to_string() })
                }
            },
        }
    }

    fn reserve(&mut self, id: SessionId, path: &[SwitchNumber], kind: SessionKind, bandwidth: f64) {
        for hop in path.windows(2) {
            match self.topology.link_index_between(hop[0], hop[1]).and_then(|index| self.topology.link_mut(index)) {
                Some(link) => link.add_session(id, kind, bandwidth),
                None => log::error!("Path hop {} -> {} of session {:?} has no link.", hop[0], hop[1], id),
            }
        }
    }

    fn release(&mut self, id: SessionId, session: &Session) {
        for hop in session.path().windows(2) {
            let released = self
                .topology
                .link_index_between(hop[0], hop[1])
                .and_then(|index| self.topology.link_mut(index))
                .is_some_and(|link| link.remove_session(id, session.kind));
            if !released {
                log::warn!("Session {:?} held no reservation on hop {} -> {}.", id, hop[0], hop[1]);
            }
        }
    }

    /// Removes a session: releases its capacity on every link, then retracts
    /// every rule installed for it.
    ///
    /// Local state is always cleaned up. If some rules could not be retracted
    /// the call still completes and reports them as a `ControllerFailure`.
    pub async fn remove_session(&mut self, id: SessionId) -> Result<()> {
        let mut session = self.sessions.remove(id).ok_or(Error::UnknownSession(id))?;
        self.release(id, &session);

        let flows: Vec<FlowHandle> = session.take_flows();
        let total = flows.len();
        let mut failures: Vec<String> = Vec::new();

        for flow in &flows {
            if let Err(e) = self.controller.remove_flow(flow).await {
                log::warn!("Could not retract flow {}/{} of session {:?}: {}", flow.device_id, flow.flow_id, id, e);
                failures.push(e.to_string());
            }
        }

        log::info!("Removed {} session {:?} between {} and {}", session.kind, id, self.topology.switch_name(session.host_a), self.topology.switch_name(session.host_b));

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::ControllerFailure {
                session: None,
                reason: format!("{} of {} rules could not be retracted, first error: {}", failures.len(), total, failures[0]),
            })
        }
    }

    /// Removes every active session. Keeps going after failures and reports the first one.
    pub async fn remove_all_sessions(&mut self) -> Result<()> {
        let ids: Vec<SessionId> = self.sessions.keys().collect();
        let mut first_error = None;

        for id in ids {
            if let Err(e) = self.remove_session(id).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Ranks the distinct routes between two hosts by the bandwidth ceiling at
    /// which each becomes the shortest path. Does not change any state.
    pub fn test_between(&self, host_a: SwitchNumber, host_b: SwitchNumber, kind: SessionKind) -> Result<Vec<ExploredPath>> {
        self.validate_endpoints(host_a, host_b)?;
        self.check_conflict(host_a, host_b, kind)?;

        capacity_explorer::explore(&self.topology, kind, host_a, host_b)
    }

    /// Current throughput estimate of a session: its bottleneck over the path.
    pub fn get_estimate(&self, id: SessionId) -> Result<f64> {
        let session = self.sessions.get(id).ok_or(Error::UnknownSession(id))?;

        let estimate = session
            .path()
            .windows(2)
            .filter_map(|hop| self.topology.link_between(hop[0], hop[1]))
            .map(|link| link.link.estimate_bandwidth(session))
            .fold(f64::INFINITY, f64::min);

        Ok(if estimate.is_finite() { estimate } else { 0.0 })
    }

    pub fn path_delay(&self, path: &[SwitchNumber]) -> f64 {
        self.topology.path_delay(path)
    }

    pub fn describe_path(&self, path: &[SwitchNumber]) -> String {
        let names: Vec<String> = path.iter().map(|number| self.topology.switch_name(*number)).collect();
        format!("[{}], Link delay: {:.2} ms", names.join(" -> "), self.path_delay(path))
    }

    pub fn describe_session(&self, id: SessionId, label: impl fmt::Display) -> Result<String> {
        let session = self.sessions.get(id).ok_or(Error::UnknownSession(id))?;

        Ok(format!(
            "[{}]: Type: {}, Requested: {:.2} Mb/s, Estimate: {:.2} Mb/s, Path: {}",
            label,
            session.kind,
            session.bandwidth,
            self.get_estimate(id)?,
            self.describe_path(session.path())
        ))
    }
}
