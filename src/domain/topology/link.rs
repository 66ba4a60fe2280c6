use std::collections::BTreeMap;

use crate::domain::session::session::{SessionId, SessionKind};
use crate::domain::utils::id::{PortNumber, SwitchNumber};

/// Undirected physical connection between two switches.
///
/// The endpoint order is the order of the topology description and carries no
/// meaning; paths that traverse the link from `switch_b` to `switch_a` use an
/// [`OrientedLink`] view instead.
#[derive(Debug, Clone)]
pub struct Link {
    /// Position in the topology description.
    pub index: usize,

    pub switch_a: SwitchNumber,
    pub port_a: PortNumber,
    pub switch_b: SwitchNumber,
    pub port_b: PortNumber,

    /// Propagation delay in milliseconds.
    pub delay: f64,

    /// Capacity in Mb/s.
    pub max_bandwidth: f64,

    /// Active sessions per class, mapped to their reserved bandwidth.
    tcp_sessions: BTreeMap<SessionId, f64>,
    udp_sessions: BTreeMap<SessionId, f64>,
    ping_sessions: BTreeMap<SessionId, f64>,
}

impl Link {
    pub fn new(index: usize, switch_a: SwitchNumber, port_a: PortNumber, switch_b: SwitchNumber, port_b: PortNumber, delay: f64, max_bandwidth: f64) -> Self {
        Self {
            index,
            switch_a,
            port_a,
            switch_b,
            port_b,
            delay,
            max_bandwidth,
            tcp_sessions: BTreeMap::new(),
            udp_sessions: BTreeMap::new(),
            ping_sessions: BTreeMap::new(),
        }
    }

    pub fn sessions(&self, kind: SessionKind) -> &BTreeMap<SessionId, f64> {
        match kind {
            SessionKind::Tcp => &self.tcp_sessions,
            SessionKind::Udp => &self.udp_sessions,
            SessionKind::Ping => &self.ping_sessions,
        }
    }

    fn sessions_mut(&mut self, kind: SessionKind) -> &mut BTreeMap<SessionId, f64> {
        match kind {
            SessionKind::Tcp => &mut self.tcp_sessions,
            SessionKind::Udp => &mut self.udp_sessions,
            SessionKind::Ping => &mut self.ping_sessions,
        }
    }

    /// Reserves capacity for a session by adding it to its class collection.
    pub fn add_session(&mut self, id: SessionId, kind: SessionKind, bandwidth: f64) {
        self.sessions_mut(kind).insert(id, bandwidth);
    }

    /// Releases the session's reservation. Returns `false` if it was not on this link.
    pub fn remove_session(&mut self, id: SessionId, kind: SessionKind) -> bool {
        self.sessions_mut(kind).remove(&id).is_some()
    }

    pub fn contains_session(&self, id: SessionId) -> bool {
        self.tcp_sessions.contains_key(&id) || self.udp_sessions.contains_key(&id) || self.ping_sessions.contains_key(&id)
    }

    pub fn active_session_count(&self) -> usize {
        self.tcp_sessions.len() + self.udp_sessions.len() + self.ping_sessions.len()
    }

    pub fn connects(&self, a: SwitchNumber, b: SwitchNumber) -> bool {
        (self.switch_a == a && self.switch_b == b) || (self.switch_a == b && self.switch_b == a)
    }

    /// Returns the view of this link that starts at `from`, or `None` if `from` is not an endpoint.
    pub fn oriented_from(&self, from: SwitchNumber) -> Option<OrientedLink<'_>> {
        if self.switch_a == from {
            Some(OrientedLink { link: self, flipped: false })
        } else if self.switch_b == from {
            Some(OrientedLink { link: self, flipped: true })
        } else {
            None
        }
    }
}

/// A link as seen when walking it in a specific direction.
#[derive(Debug, Clone, Copy)]
pub struct OrientedLink<'a> {
    pub link: &'a Link,
    pub flipped: bool,
}

impl<'a> OrientedLink<'a> {
    /// The same link walked the other way.
    pub fn flip(self) -> OrientedLink<'a> {
        OrientedLink { link: self.link, flipped: !self.flipped }
    }

    pub fn switch_a(&self) -> SwitchNumber {
        if self.flipped { self.link.switch_b } else { self.link.switch_a }
    }

    pub fn switch_b(&self) -> SwitchNumber {
        if self.flipped { self.link.switch_a } else { self.link.switch_b }
    }

    pub fn port_a(&self) -> PortNumber {
        if self.flipped { self.link.port_b } else { self.link.port_a }
    }

    pub fn port_b(&self) -> PortNumber {
        if self.flipped { self.link.port_a } else { self.link.port_b }
    }

    pub fn delay(&self) -> f64 {
        self.link.delay
    }
}
