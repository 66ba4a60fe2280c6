use std::collections::HashSet;

use crate::domain::routing::delay_graph::DelayGraph;
use crate::domain::session::session::SessionKind;
use crate::domain::topology::topology::NetworkTopology;
use crate::domain::utils::id::SwitchNumber;
use crate::error::{Error, Result};

/// A route between two switches and the headroom threshold at which it
/// first becomes the shortest path.
#[derive(Debug, Clone, PartialEq)]
pub struct ExploredPath {
    pub path: Vec<SwitchNumber>,
    /// Smallest headroom (Mb/s) of the links available when the path appeared.
    pub threshold: f64,
}

/// Enumerates the distinct shortest paths between `host_a` and `host_b` as links
/// are revealed in descending order of their headroom for `kind`.
///
/// Links with equal headroom are revealed together. Each path is reported once,
/// with the threshold at which it first appeared; the result is sorted by
/// ascending threshold.
pub fn explore(topology: &NetworkTopology, kind: SessionKind, host_a: SwitchNumber, host_b: SwitchNumber) -> Result<Vec<ExploredPath>> {
    if kind == SessionKind::Ping {
        return Err(Error::InvalidRequest("capacity exploration needs a TCP or UDP traffic class".to_string()));
    }

    let mut links: Vec<(usize, f64)> = topology.links().iter().map(|link| (link.index, link.max_possible().for_kind(kind))).collect();
    links.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    let mut graph = DelayGraph::new();
    let mut seen: HashSet<Vec<SwitchNumber>> = HashSet::new();
    let mut found: Vec<ExploredPath> = Vec::new();

    let mut remaining = links.as_slice();
    while let Some(&(_, current)) = remaining.first() {
        let group_len = remaining.iter().take_while(|(_, headroom)| *headroom == current).count().max(1);
        let (group, rest) = remaining.split_at(group_len);

        for (index, _) in group {
            graph.add_link(&topology.links()[*index]);
        }
        remaining = rest;

        if let Some(path) = graph.shortest_path(host_a, host_b) {
            if seen.insert(path.clone()) {
                log::debug!("Explorer found path {:?} at threshold {:.2} Mb/s", path, current);
                found.push(ExploredPath { path, threshold: current });
            }
        }
    }

    found.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
    Ok(found)
}
