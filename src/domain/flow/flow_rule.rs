use crate::api::flow_dto::{CriterionDto, FlowRuleDto, InstructionDto, SelectorDto, TreatmentDto};
use crate::domain::session::session::SessionKind;
use crate::domain::topology::link::OrientedLink;
use crate::domain::topology::topology::NetworkTopology;
use crate::domain::utils::id::{DeviceId, PortNumber, SwitchNumber};
use crate::error::{Error, Result};

pub const FLOW_PRIORITY: u32 = 40000;
pub const ETH_TYPE_IPV4: &str = "0x0800";

/// A permanent forwarding rule for one switch: traffic entering on `in_port`
/// from `src_ip` to `dst_ip` (and of `protocol`, if set) leaves on `out_port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRule {
    pub device: DeviceId,
    pub in_port: PortNumber,
    pub out_port: PortNumber,
    pub src_ip: String,
    pub dst_ip: String,
    pub protocol: Option<u8>,
}

impl From<&FlowRule> for FlowRuleDto {
    fn from(rule: &FlowRule) -> Self {
        let mut criteria = vec![
            CriterionDto::InPort { port: rule.in_port.to_string() },
            CriterionDto::EthType { eth_type: ETH_TYPE_IPV4.to_string() },
            CriterionDto::Ipv4Src { ip: rule.src_ip.clone() },
            CriterionDto::Ipv4Dst { ip: rule.dst_ip.clone() },
        ];
        if let Some(protocol) = rule.protocol {
            criteria.push(CriterionDto::IpProto { protocol: protocol.to_string() });
        }

        FlowRuleDto {
            priority: FLOW_PRIORITY,
            timeout: 0,
            is_permanent: true,
            device_id: rule.device.to_string(),
            treatment: TreatmentDto { instructions: vec![InstructionDto::Output { port: rule.out_port.to_string() }] },
            selector: SelectorDto { criteria },
        }
    }
}

/// Derives the rules that forward traffic both ways along `path`.
///
/// Each endpoint gets a rule delivering inbound traffic to its host port. Each
/// link gets one rule on its near end for the forward direction and one on its
/// far end for the reverse direction, so every switch on the path forwards in
/// both directions. A path of `k` links yields `2k + 2` rules.
pub fn derive_rules(topology: &NetworkTopology, path: &[SwitchNumber], kind: SessionKind) -> Result<Vec<FlowRule>> {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return Err(Error::InvalidRequest("cannot derive rules for an empty path".to_string()));
    };
    if path.len() < 2 {
        return Err(Error::InvalidRequest("a path needs at least two switches".to_string()));
    }

    let source = topology.switch(first).ok_or_else(|| Error::UnknownSwitch(first.to_string()))?;
    let target = topology.switch(last).ok_or_else(|| Error::UnknownSwitch(last.to_string()))?;
    let links: Vec<OrientedLink<'_>> = topology
        .links_along(path)
        .ok_or_else(|| Error::InvalidRequest(format!("path {:?} uses switches that are not directly linked", path)))?;

    let device_of = |number: SwitchNumber| topology.switch(number).map(|s| s.device.clone()).ok_or_else(|| Error::UnknownSwitch(number.to_string()));
    let protocol = kind.ip_protocol();
    let rule = |device: DeviceId, in_port: PortNumber, out_port: PortNumber, src_ip: &str, dst_ip: &str| FlowRule {
        device,
        in_port,
        out_port,
        src_ip: src_ip.to_string(),
        dst_ip: dst_ip.to_string(),
        protocol,
    };

    let mut rules = Vec::with_capacity(2 * links.len() + 2);

    rules.push(rule(source.device.clone(), links[0].port_a(), PortNumber::HOST, target.ip.as_str(), source.ip.as_str()));
    rules.push(rule(target.device.clone(), links[links.len() - 1].port_b(), PortNumber::HOST, source.ip.as_str(), target.ip.as_str()));

    for (i, link) in links.iter().enumerate() {
        let previous_port = if i == 0 { PortNumber::HOST } else { links[i - 1].port_b() };
        rules.push(rule(device_of(link.switch_a())?, previous_port, link.port_a(), source.ip.as_str(), target.ip.as_str()));

        let next_port = if i == links.len() - 1 { PortNumber::HOST } else { links[i + 1].port_a() };
        rules.push(rule(device_of(link.switch_b())?, next_port, link.port_b(), target.ip.as_str(), source.ip.as_str()));
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::topology_dto::{LinkDto, NetworkDto};

    fn link(a: &str, b: &str, port_a: u32, port_b: u32) -> LinkDto {
        LinkDto { node_a: a.to_string(), node_b: b.to_string(), delay: 1.0, bandwidth: 10.0, port_a, port_b }
    }

    /// A - B - C, with B-C stored in reverse orientation.
    fn topology() -> NetworkTopology {
        let dto = NetworkDto { nodes: vec!["A".into(), "B".into(), "C".into()], links: vec![link("A", "B", 2, 3), link("C", "B", 5, 4)] };
        NetworkTopology::try_from(dto).unwrap()
    }

    fn find<'a>(rules: &'a [FlowRule], device: &str, src: &str) -> Vec<&'a FlowRule> {
        rules.iter().filter(|r| r.device.as_str() == device && r.src_ip == src).collect()
    }

    #[test]
    fn three_switch_path_forwards_both_ways() {
        let topology = topology();
        let path = [SwitchNumber(1), SwitchNumber(2), SwitchNumber(3)];

        let rules = derive_rules(&topology, &path, SessionKind::Tcp).unwrap();

        assert_eq!(rules.len(), 6);
        assert!(rules.iter().all(|r| r.protocol == Some(6)));

        let (a, b, c) = ("of:0000000000000001", "of:0000000000000002", "of:0000000000000003");
        let (ip_a, ip_c) = ("10.0.0.1/32", "10.0.0.3/32");

        // Forward A -> C: host port on A, through B, delivered on C's host port.
        let on_a = find(&rules, a, ip_a);
        assert_eq!(on_a.len(), 1);
        assert_eq!((on_a[0].in_port, on_a[0].out_port), (PortNumber(1), PortNumber(2)));
        let on_b = find(&rules, b, ip_a);
        assert_eq!(on_b.len(), 1);
        assert_eq!((on_b[0].in_port, on_b[0].out_port), (PortNumber(3), PortNumber(4)));
        let on_c = find(&rules, c, ip_a);
        assert_eq!(on_c.len(), 1);
        assert_eq!((on_c[0].in_port, on_c[0].out_port), (PortNumber(5), PortNumber(1)));
        assert_eq!(on_c[0].dst_ip, ip_c);

        // Reverse C -> A.
        let on_c = find(&rules, c, ip_c);
        assert_eq!((on_c[0].in_port, on_c[0].out_port), (PortNumber(1), PortNumber(5)));
        let on_b = find(&rules, b, ip_c);
        assert_eq!((on_b[0].in_port, on_b[0].out_port), (PortNumber(4), PortNumber(3)));
        let on_a = find(&rules, a, ip_c);
        assert_eq!((on_a[0].in_port, on_a[0].out_port), (PortNumber(2), PortNumber(1)));
    }

    #[test]
    fn ping_rules_do_not_match_protocol() {
        let topology = topology();

        let rules = derive_rules(&topology, &[SwitchNumber(1), SwitchNumber(2)], SessionKind::Ping).unwrap();

        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| r.protocol.is_none()));
        let dto = FlowRuleDto::from(&rules[0]);
        assert_eq!(dto.selector.criteria.len(), 4);
        assert_eq!(dto.priority, FLOW_PRIORITY);
        assert!(dto.is_permanent);
    }

    #[test]
    fn rejects_paths_that_skip_links() {
        let topology = topology();

        assert!(derive_rules(&topology, &[SwitchNumber(1), SwitchNumber(3)], SessionKind::Udp).is_err());
        assert!(derive_rules(&topology, &[SwitchNumber(1)], SessionKind::Udp).is_err());
        assert!(derive_rules(&topology, &[], SessionKind::Udp).is_err());
    }
}
