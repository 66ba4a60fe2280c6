use crate::domain::session::session::{Session, SessionKind};
use crate::domain::topology::link::Link;

/// Additional bandwidth a link could grant to one more session of each class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Headroom {
    pub udp: f64,
    /// 0 when one more TCP session would push an existing one below its request.
    pub tcp: f64,
}

impl Headroom {
    /// Headroom for `kind`. PING sessions reserve nothing, so they see unlimited headroom.
    pub fn for_kind(&self, kind: SessionKind) -> f64 {
        match kind {
            SessionKind::Ping => f64::INFINITY,
            SessionKind::Tcp => self.tcp,
            SessionKind::Udp => self.udp,
        }
    }
}

impl Link {
    fn udp_reserved(&self) -> f64 {
        self.sessions(SessionKind::Udp).values().sum()
    }

    /// Capacity left for TCP once every UDP reservation is honoured.
    fn tcp_capacity(&self) -> f64 {
        self.max_bandwidth - self.udp_reserved()
    }

    /// Current throughput estimate of `session` on this link.
    ///
    /// TCP sessions split whatever UDP has not reserved equally among all
    /// TCP sessions on the link.
    pub fn estimate_bandwidth(&self, session: &Session) -> f64 {
        match session.kind {
            SessionKind::Ping => 0.0,
            SessionKind::Udp => session.bandwidth,
            SessionKind::Tcp => {
                let tcp_count = self.sessions(SessionKind::Tcp).len().max(1);
                self.tcp_capacity() / tcp_count as f64
            }
        }
    }

    /// Admission headroom per class.
    ///
    /// UDP gets what is left after the TCP floor (largest TCP request times the
    /// TCP session count) and existing UDP reservations. TCP gets the fair share
    /// with one more session, unless that share would starve an existing TCP
    /// session, in which case TCP admission is closed.
    pub fn max_possible(&self) -> Headroom {
        let tcp_sessions = self.sessions(SessionKind::Tcp);
        let tcp_count = tcp_sessions.len();

        let tcp_min = tcp_sessions.values().copied().fold(0.0, f64::max) * tcp_count as f64;
        let udp = self.max_bandwidth - tcp_min - self.udp_reserved();

        let tcp_part = self.tcp_capacity() / (tcp_count + 1) as f64;
        let tcp = if tcp_sessions.values().all(|bandwidth| tcp_part >= *bandwidth) { tcp_part } else { 0.0 };

        Headroom { udp, tcp }
    }

    /// Whether a new session of `kind` requesting `bandwidth` fits on this link.
    pub fn can_handle(&self, kind: SessionKind, bandwidth: f64) -> bool {
        match kind {
            SessionKind::Ping => true,
            SessionKind::Udp | SessionKind::Tcp => bandwidth <= self.max_possible().for_kind(kind),
        }
    }
}
