use crate::domain::routing::delay_graph::DelayGraph;
use crate::domain::session::session::SessionKind;
use crate::domain::topology::topology::NetworkTopology;
use crate::domain::utils::id::SwitchNumber;

/// Graph of every link that can admit a session of `kind` requesting `bandwidth`.
pub fn admissible_graph(topology: &NetworkTopology, kind: SessionKind, bandwidth: f64) -> DelayGraph {
    let mut graph = DelayGraph::new();

    for link in topology.links() {
        if link.can_handle(kind, bandwidth) {
            graph.add_link(link);
        } else {
            log::trace!("Link {} ({} <-> {}) cannot admit {} {:.2} Mb/s", link.index, link.switch_a, link.switch_b, kind, bandwidth);
        }
    }

    graph
}

/// Lowest-delay path between two switches over links admissible for the request.
///
/// # Returns
/// The switch sequence (endpoints inclusive), or `None` if no admissible path exists.
pub fn find_shortest(topology: &NetworkTopology, kind: SessionKind, bandwidth: f64, host_a: SwitchNumber, host_b: SwitchNumber) -> Option<Vec<SwitchNumber>> {
    let graph = admissible_graph(topology, kind, bandwidth);
    log::debug!("Admissible graph for {} {:.2} Mb/s: {} of {} links", kind, bandwidth, graph.edge_count(), topology.links().len());

    let path = graph.shortest_path(host_a, host_b);
    if path.is_none() {
        log::debug!("NoPathFound: {} => {} for {} {:.2} Mb/s", host_a, host_b, kind, bandwidth);
    }
    path
}
