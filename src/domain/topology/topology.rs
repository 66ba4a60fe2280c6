use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::api::topology_dto::{LinkDto, NetworkDto};
use crate::domain::topology::link::{Link, OrientedLink};
use crate::domain::topology::switch::{MAX_SWITCHES, Switch};
use crate::domain::utils::id::{PortNumber, SwitchNumber};
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Models the fixed network: switches and the links between them.
///
/// Switches never change after loading. Links only change through session
/// membership, which is managed by the session manager.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    /// Switches in load order; `switches[i].number == i + 1`.
    switches: Vec<Switch>,

    /// Links in description order; `links[i].index == i`.
    links: Vec<Link>,

    /// Lower-cased switch name to switch number.
    name_index: HashMap<String, SwitchNumber>,

    /// Unordered switch pair (smaller number first) to link index.
    pair_index: HashMap<(SwitchNumber, SwitchNumber), usize>,
}

impl TryFrom<NetworkDto> for NetworkTopology {
    type Error = Error;

    fn try_from(dto: NetworkDto) -> Result<Self> {
        // 1. Switches, numbered by position.
        let (switches, name_index) = NetworkTopology::setup_switches(&dto.nodes)?;

        // 2. Links between known switches.
        let (links, pair_index) = NetworkTopology::setup_links(&dto.links, &name_index)?;

        log::info!("Network topology loaded: {} switches, {} links.", switches.len(), links.len());

        Ok(NetworkTopology { switches, links, name_index, pair_index })
    }
}

impl NetworkTopology {
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let dto: NetworkDto = parse_json_file(file_path)?;
        NetworkTopology::try_from(dto)
    }

    pub fn setup_switches(nodes: &[String]) -> Result<(Vec<Switch>, HashMap<String, SwitchNumber>)> {
        if nodes.len() > MAX_SWITCHES {
            return Err(Error::TopologyConstructionError(format!("{} nodes exceed the limit of {} host addresses", nodes.len(), MAX_SWITCHES)));
        }

        let mut switches = Vec::with_capacity(nodes.len());
        let mut name_index = HashMap::new();

        for (index, name) in nodes.iter().enumerate() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::TopologyConstructionError(format!("node at position {} has an empty name", index)));
            }

            let switch = Switch::new(trimmed, index);
            if name_index.insert(trimmed.to_lowercase(), switch.number).is_some() {
                return Err(Error::TopologyConstructionError(format!("duplicate node name '{}'", trimmed)));
            }
            switches.push(switch);
        }

        Ok((switches, name_index))
    }

    pub fn setup_links(
        link_dtos: &[LinkDto],
        name_index: &HashMap<String, SwitchNumber>,
    ) -> Result<(Vec<Link>, HashMap<(SwitchNumber, SwitchNumber), usize>)> {
        let mut links = Vec::with_capacity(link_dtos.len());
        let mut pair_index = HashMap::new();
        let mut seen_ports: HashSet<(SwitchNumber, PortNumber)> = HashSet::new();

        for (index, dto) in link_dtos.iter().enumerate() {
            let lookup = |name: &str| {
                name_index
                    .get(&name.trim().to_lowercase())
                    .copied()
                    .ok_or_else(|| Error::TopologyConstructionError(format!("link {} references unknown node '{}'", index, name)))
            };
            let switch_a = lookup(&dto.node_a)?;
            let switch_b = lookup(&dto.node_b)?;

            if switch_a == switch_b {
                return Err(Error::TopologyConstructionError(format!("link {} connects '{}' to itself", index, dto.node_a)));
            }
            if !dto.delay.is_finite() || dto.delay < 0.0 {
                return Err(Error::TopologyConstructionError(format!("link {} has invalid delay {}", index, dto.delay)));
            }
            if !dto.bandwidth.is_finite() || dto.bandwidth < 0.0 {
                return Err(Error::TopologyConstructionError(format!("link {} has invalid bandwidth {}", index, dto.bandwidth)));
            }
            if dto.port_a == 0 || dto.port_b == 0 {
                return Err(Error::TopologyConstructionError(format!("link {} uses port 0", index)));
            }

            let (port_a, port_b) = (PortNumber(dto.port_a), PortNumber(dto.port_b));
            for (switch, port) in [(switch_a, port_a), (switch_b, port_b)] {
                if port == PortNumber::HOST {
                    log::warn!("Link {} uses port {} on switch {}, which is the host port.", index, port, switch);
                }
                if !seen_ports.insert((switch, port)) {
                    log::warn!("Port {} on switch {} is used by more than one link.", port, switch);
                }
            }

            if pair_index.insert(pair_key(switch_a, switch_b), index).is_some() {
                return Err(Error::TopologyConstructionError(format!("duplicate link between '{}' and '{}'", dto.node_a, dto.node_b)));
            }

            links.push(Link::new(index, switch_a, port_a, switch_b, port_b, dto.delay, dto.bandwidth));
        }

        if links.is_empty() {
            log::info!("Empty network: the topology contains no links, every session request will be unreachable.");
        }

        Ok((links, pair_index))
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn link_mut(&mut self, index: usize) -> Option<&mut Link> {
        self.links.get_mut(index)
    }

    pub fn switch(&self, number: SwitchNumber) -> Option<&Switch> {
        (number.0 as usize).checked_sub(1).and_then(|i| self.switches.get(i))
    }

    /// Case-insensitive lookup by name.
    pub fn switch_by_name(&self, name: &str) -> Option<&Switch> {
        self.name_index.get(&name.trim().to_lowercase()).and_then(|number| self.switch(*number))
    }

    pub fn switch_name(&self, number: SwitchNumber) -> String {
        self.switch(number).map(|s| s.name.clone()).unwrap_or_else(|| format!("#{}", number))
    }

    pub fn link_index_between(&self, a: SwitchNumber, b: SwitchNumber) -> Option<usize> {
        self.pair_index.get(&pair_key(a, b)).copied()
    }

    /// The link between `a` and `b`, oriented so that it starts at `a`.
    pub fn link_between(&self, a: SwitchNumber, b: SwitchNumber) -> Option<OrientedLink<'_>> {
        self.link_index_between(a, b).and_then(|index| self.links[index].oriented_from(a))
    }

    /// Oriented links along a path of consecutive switches.
    ///
    /// # Returns
    /// `None` if two consecutive switches are not directly linked.
    pub fn links_along(&self, path: &[SwitchNumber]) -> Option<Vec<OrientedLink<'_>>> {
        path.windows(2).map(|hop| self.link_between(hop[0], hop[1])).collect()
    }

    /// Sum of the link delays along a path, in milliseconds.
    pub fn path_delay(&self, path: &[SwitchNumber]) -> f64 {
        path.windows(2).filter_map(|hop| self.link_between(hop[0], hop[1])).map(|link| link.delay()).sum()
    }
}

fn pair_key(a: SwitchNumber, b: SwitchNumber) -> (SwitchNumber, SwitchNumber) {
    if a <= b { (a, b) } else { (b, a) }
}
