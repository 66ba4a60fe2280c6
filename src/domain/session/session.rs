use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

use crate::domain::controller::flow_controller::FlowHandle;
use crate::domain::utils::id::SwitchNumber;
use crate::error::Error;

new_key_type! {
    pub struct SessionId;
}

/// Traffic class of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Zero-bandwidth connectivity probe.
    Ping,
    /// Shares residual link capacity fairly with other TCP sessions.
    Tcp,
    /// Holds a hard bandwidth reservation.
    Udp,
}

impl SessionKind {
    /// IP protocol number matched by forwarding rules, if any.
    pub fn ip_protocol(&self) -> Option<u8> {
        match self {
            SessionKind::Ping => None,
            SessionKind::Tcp => Some(6),
            SessionKind::Udp => Some(17),
        }
    }

    /// Bandwidth to request for this class. PING always uses 0; TCP and UDP
    /// need an explicit value.
    pub fn requested_bandwidth(&self, bandwidth: Option<f64>) -> Result<f64, Error> {
        match (self, bandwidth) {
            (SessionKind::Ping, _) => Ok(0.0),
            (_, Some(bandwidth)) => Ok(bandwidth),
            (_, None) => Err(Error::InvalidRequest(format!("{} sessions need a bandwidth", self))),
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionKind::Ping => "PING",
            SessionKind::Tcp => "TCP",
            SessionKind::Udp => "UDP",
        };
        f.write_str(name)
    }
}

impl FromStr for SessionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PING" => Ok(SessionKind::Ping),
            "TCP" => Ok(SessionKind::Tcp),
            "UDP" => Ok(SessionKind::Udp),
            _ => Err(Error::InvalidSessionKind(s.to_string())),
        }
    }
}

/// An admitted flow between two switches.
///
/// The path is fixed at admission and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    pub host_a: SwitchNumber,
    pub host_b: SwitchNumber,
    pub kind: SessionKind,

    /// Requested bandwidth in Mb/s, always 0 for PING sessions.
    pub bandwidth: f64,

    path: Vec<SwitchNumber>,

    /// Rules installed on the controller for this session.
    flows: Vec<FlowHandle>,
}

impl Session {
    pub fn new(host_a: SwitchNumber, host_b: SwitchNumber, kind: SessionKind, bandwidth: f64, path: Vec<SwitchNumber>) -> Self {
        let bandwidth = match kind {
            SessionKind::Ping => 0.0,
            SessionKind::Tcp | SessionKind::Udp => bandwidth,
        };
        Self { host_a, host_b, kind, bandwidth, path, flows: Vec::new() }
    }

    pub fn path(&self) -> &[SwitchNumber] {
        &self.path
    }

    pub fn flows(&self) -> &[FlowHandle] {
        &self.flows
    }

    pub fn add_flows(&mut self, flows: impl IntoIterator<Item = FlowHandle>) {
        self.flows.extend(flows);
    }

    pub(crate) fn take_flows(&mut self) -> Vec<FlowHandle> {
        std::mem::take(&mut self.flows)
    }

    /// True if this session runs between `a` and `b` in either direction.
    pub fn connects(&self, a: SwitchNumber, b: SwitchNumber) -> bool {
        (self.host_a == a && self.host_b == b) || (self.host_a == b && self.host_b == a)
    }
}
