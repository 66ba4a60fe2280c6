use sdn_session_manager::api::topology_dto::{LinkDto, NetworkDto};
use sdn_session_manager::domain::topology::topology::NetworkTopology;
use sdn_session_manager::domain::utils::id::{PortNumber, SwitchNumber};
use sdn_session_manager::error::Error;

fn link(a: &str, b: &str, delay: f64, bandwidth: f64, port_a: u32, port_b: u32) -> LinkDto {
    LinkDto { node_a: a.to_string(), node_b: b.to_string(), delay, bandwidth, port_a, port_b }
}

fn create_test_dto() -> NetworkDto {
    NetworkDto {
        nodes: vec!["Berlin".to_string(), "Praga".to_string(), "Wieden".to_string()],
        links: vec![link("Berlin", "Praga", 2.0, 10.0, 2, 2), link("Wieden", "Praga", 1.5, 5.0, 2, 3)],
    }
}

fn assert_construction_error(dto: NetworkDto, fragment: &str) {
    match NetworkTopology::try_from(dto) {
        Err(Error::TopologyConstructionError(message)) => {
            assert!(message.contains(fragment), "Expected error mentioning '{}', got '{}'", fragment, message)
        }
        other => panic!("Expected TopologyConstructionError, got {:?}", other.map(|t| t.links().len())),
    }
}

#[test]
fn test_setup_switches_in_load_order() {
    let topology = NetworkTopology::try_from(create_test_dto()).unwrap();

    let switches = topology.switches();
    assert_eq!(switches.len(), 3);
    assert_eq!(switches[0].name, "Berlin");
    assert_eq!(switches[0].number, SwitchNumber(1));
    assert_eq!(switches[2].number, SwitchNumber(3));
    assert_eq!(switches[2].ip, "10.0.0.3/32");
    assert_eq!(switches[2].device.as_str(), "of:0000000000000003");
}

#[test]
fn test_switch_lookup_is_case_insensitive() {
    let topology = NetworkTopology::try_from(create_test_dto()).unwrap();

    assert_eq!(topology.switch_by_name("praga").map(|s| s.number), Some(SwitchNumber(2)));
    assert_eq!(topology.switch_by_name("WIEDEN").map(|s| s.number), Some(SwitchNumber(3)));
    assert!(topology.switch_by_name("Graz").is_none());
    assert!(topology.switch(SwitchNumber(0)).is_none());
    assert!(topology.switch(SwitchNumber(4)).is_none());
}

#[test]
fn test_link_between_orients_stored_link() {
    let topology = NetworkTopology::try_from(create_test_dto()).unwrap();

    let forward = topology.link_between(SwitchNumber(3), SwitchNumber(2)).unwrap();
    assert!(!forward.flipped);
    assert_eq!((forward.port_a(), forward.port_b()), (PortNumber(2), PortNumber(3)));

    let backward = topology.link_between(SwitchNumber(2), SwitchNumber(3)).unwrap();
    assert!(backward.flipped);
    assert_eq!(backward.switch_a(), SwitchNumber(2));
    assert_eq!((backward.port_a(), backward.port_b()), (PortNumber(3), PortNumber(2)));
    assert_eq!(backward.link.index, forward.link.index);

    assert!(topology.link_between(SwitchNumber(1), SwitchNumber(3)).is_none());
}

#[test]
fn test_path_delay_sums_hops() {
    let topology = NetworkTopology::try_from(create_test_dto()).unwrap();

    let path = [SwitchNumber(1), SwitchNumber(2), SwitchNumber(3)];

    assert_eq!(topology.path_delay(&path), 3.5);
    assert_eq!(topology.links_along(&path).map(|links| links.len()), Some(2));
    assert!(topology.links_along(&[SwitchNumber(1), SwitchNumber(3)]).is_none());
}

#[test]
fn test_invalid_descriptions_are_rejected() {
    let mut dto = create_test_dto();
    dto.links.push(link("Berlin", "Graz", 1.0, 10.0, 3, 2));
    assert_construction_error(dto, "unknown node 'Graz'");

    let mut dto = create_test_dto();
    dto.nodes.push("berlin".to_string());
    assert_construction_error(dto, "duplicate node name");

    let mut dto = create_test_dto();
    dto.links.push(link("Praga", "Berlin", 1.0, 10.0, 4, 3));
    assert_construction_error(dto, "duplicate link");

    let mut dto = create_test_dto();
    dto.links.push(link("Praga", "Praga", 1.0, 10.0, 4, 5));
    assert_construction_error(dto, "to itself");

    let mut dto = create_test_dto();
    dto.links[0].delay = -1.0;
    assert_construction_error(dto, "invalid delay");

    let mut dto = create_test_dto();
    dto.links[1].bandwidth = f64::NAN;
    assert_construction_error(dto, "invalid bandwidth");

    let mut dto = create_test_dto();
    dto.links[1].port_b = 0;
    assert_construction_error(dto, "port 0");
}

#[test]
fn test_node_count_is_limited_by_host_addresses() {
    let nodes: Vec<String> = (1..=254).map(|n| format!("S{}", n)).collect();
    let topology = NetworkTopology::try_from(NetworkDto { nodes: nodes.clone(), links: vec![] }).unwrap();
    assert_eq!(topology.switches()[253].ip, "10.0.0.254/32");

    let mut nodes = nodes;
    nodes.push("S255".to_string());
    assert_construction_error(NetworkDto { nodes, links: vec![] }, "exceed the limit of 254");
}

#[test]
fn test_load_sample_network_file() {
    let path = format!("{}/data/network.json", env!("CARGO_MANIFEST_DIR"));

    let topology = NetworkTopology::from_file(&path).unwrap();

    assert_eq!(topology.switches().len(), 10);
    assert_eq!(topology.links().len(), 19);
    assert!(topology.links().iter().all(|link| link.max_bandwidth == 10.0));
    assert!(topology.switch_by_name("gdansk").is_some());
}

#[test]
fn test_missing_file_reports_io_error() {
    let result = NetworkTopology::from_file("does/not/exist.json");

    assert!(matches!(result, Err(Error::IoError(_))));
}
