use std::collections::HashSet;
use std::sync::Arc;

use sdn_session_manager::api::topology_dto::{LinkDto, NetworkDto};
use sdn_session_manager::domain::controller::flow_controller_mock::MockFlowController;
use sdn_session_manager::domain::routing::capacity_explorer::{ExploredPath, explore};
use sdn_session_manager::domain::session::session::SessionKind;
use sdn_session_manager::domain::session::session_manager::SessionManager;
use sdn_session_manager::domain::topology::topology::NetworkTopology;
use sdn_session_manager::domain::utils::id::SwitchNumber;
use sdn_session_manager::error::Error;

const A: SwitchNumber = SwitchNumber(1);
const B: SwitchNumber = SwitchNumber(2);
const C: SwitchNumber = SwitchNumber(3);
const D: SwitchNumber = SwitchNumber(4);

fn link(a: &str, b: &str, delay: f64, bandwidth: f64, port_a: u32, port_b: u32) -> LinkDto {
    LinkDto { node_a: a.to_string(), node_b: b.to_string(), delay, bandwidth, port_a, port_b }
}

/// Two parallel routes A -> D: a slow wide one over B and a fast narrow one over C.
fn parallel_topology() -> NetworkTopology {
    let dto = NetworkDto {
        nodes: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string(), "X".to_string(), "Y".to_string()],
        links: vec![
            link("A", "B", 5.0, 10.0, 2, 2),
            link("B", "D", 5.0, 10.0, 3, 2),
            link("A", "C", 1.0, 5.0, 3, 2),
            link("C", "D", 1.0, 5.0, 3, 3),
            // Unrelated narrow link, revealed last.
            link("X", "Y", 1.0, 1.0, 2, 2),
        ],
    };
    NetworkTopology::try_from(dto).unwrap()
}

fn assert_no_duplicate_paths(found: &[ExploredPath]) {
    let unique: HashSet<&Vec<SwitchNumber>> = found.iter().map(|explored| &explored.path).collect();
    assert_eq!(unique.len(), found.len(), "Duplicate paths in {:?}", found);
}

fn assert_ascending(found: &[ExploredPath]) {
    assert!(found.windows(2).all(|pair| pair[0].threshold <= pair[1].threshold), "Thresholds not ascending: {:?}", found);
}

#[test]
fn test_parallel_paths_ranked_by_threshold() {
    let topology = parallel_topology();

    let found = explore(&topology, SessionKind::Udp, A, D).unwrap();

    assert_eq!(
        found,
        vec![ExploredPath { path: vec![A, C, D], threshold: 5.0 }, ExploredPath { path: vec![A, B, D], threshold: 10.0 }]
    );
    assert_no_duplicate_paths(&found);
    assert_ascending(&found);
}

#[test]
fn test_unreachable_endpoints_yield_nothing() {
    let topology = parallel_topology();

    let found = explore(&topology, SessionKind::Tcp, A, SwitchNumber(5)).unwrap();

    assert!(found.is_empty());
}

#[test]
fn test_ping_exploration_is_rejected() {
    let topology = parallel_topology();

    assert!(matches!(explore(&topology, SessionKind::Ping, A, D), Err(Error::InvalidRequest(_))));
}

#[tokio::test]
async fn test_reservations_shift_thresholds_without_changing_state() {
    let mut manager = SessionManager::new(parallel_topology(), Arc::new(MockFlowController::new()));
    manager.add_path(B, D, SessionKind::Udp, 4.0).await.unwrap();
    let before: Vec<_> = manager.topology().links().iter().map(|link| link.max_possible()).collect();

    let found = manager.test_between(A, D, SessionKind::Udp).unwrap();

    assert_eq!(
        found,
        vec![ExploredPath { path: vec![A, C, D], threshold: 5.0 }, ExploredPath { path: vec![A, B, D], threshold: 6.0 }]
    );
    let after: Vec<_> = manager.topology().links().iter().map(|link| link.max_possible()).collect();
    assert_eq!(before, after);
    assert_eq!(manager.session_count(), 1);
}

#[tokio::test]
async fn test_tcp_exploration_uses_fair_share_headroom() {
    let mut manager = SessionManager::new(parallel_topology(), Arc::new(MockFlowController::new()));
    // Leaves 10 / 2 = 5 for another TCP session on A - B.
    manager.add_path(A, B, SessionKind::Tcp, 2.0).await.unwrap();

    let found = manager.test_between(A, D, SessionKind::Tcp).unwrap();

    assert_no_duplicate_paths(&found);
    assert_ascending(&found);
    // B - D (10) alone connects nothing; A - B, A - C and C - D all sit at 5,
    // revealing the fast route first.
    assert_eq!(found, vec![ExploredPath { path: vec![A, C, D], threshold: 5.0 }]);
}

#[test]
fn test_sample_network_with_uniform_capacity_has_one_route() {
    let path = format!("{}/data/network.json", env!("CARGO_MANIFEST_DIR"));
    let topology = NetworkTopology::from_file(&path).unwrap();
    let malmo = topology.switch_by_name("Malmo").unwrap().number;
    let graz = topology.switch_by_name("Graz").unwrap().number;

    let found = explore(&topology, SessionKind::Tcp, malmo, graz).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].threshold, 10.0);
    assert_eq!(found[0].path.first(), Some(&malmo));
    assert_eq!(found[0].path.last(), Some(&graz));
}
