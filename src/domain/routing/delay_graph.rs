use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::domain::topology::link::Link;
use crate::domain::utils::id::SwitchNumber;

/// Undirected graph of switches weighted by link delay.
#[derive(Debug, Clone, Default)]
pub struct DelayGraph {
    adjacency: BTreeMap<SwitchNumber, Vec<(SwitchNumber, f64)>>,
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest delay first,
/// and the lower switch number on equal delay.
#[derive(Debug, PartialEq)]
struct Candidate {
    delay: f64,
    switch: SwitchNumber,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.delay.total_cmp(&self.delay).then_with(|| other.switch.cmp(&self.switch))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl DelayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, link: &Link) {
        self.add_edge(link.switch_a, link.switch_b, link.delay);
    }

    pub fn add_edge(&mut self, a: SwitchNumber, b: SwitchNumber, delay: f64) {
        self.adjacency.entry(a).or_default().push((b, delay));
        self.adjacency.entry(b).or_default().push((a, delay));
    }

    pub fn contains(&self, switch: SwitchNumber) -> bool {
        self.adjacency.contains_key(&switch)
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Minimum-delay path from `source` to `target`, endpoints inclusive.
    ///
    /// # Returns
    /// `None` if either endpoint has no edge in the graph or the two are not connected.
    pub fn shortest_path(&self, source: SwitchNumber, target: SwitchNumber) -> Option<Vec<SwitchNumber>> {
        if !self.contains(source) || !self.contains(target) {
            return None;
        }
        if source == target {
            return Some(vec![source]);
        }

        let mut distance: HashMap<SwitchNumber, f64> = HashMap::new();
        let mut previous: HashMap<SwitchNumber, SwitchNumber> = HashMap::new();
        let mut heap = BinaryHeap::new();

        distance.insert(source, 0.0);
        heap.push(Candidate { delay: 0.0, switch: source });

        while let Some(Candidate { delay, switch }) = heap.pop() {
            if switch == target {
                break;
            }
            if delay > distance.get(&switch).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            for &(neighbour, weight) in self.adjacency.get(&switch).into_iter().flatten() {
                let next = delay + weight;
                if next < distance.get(&neighbour).copied().unwrap_or(f64::INFINITY) {
                    distance.insert(neighbour, next);
                    previous.insert(neighbour, switch);
                    heap.push(Candidate { delay: next, switch: neighbour });
                }
            }
        }

        if !previous.contains_key(&target) {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(&hop) = previous.get(&current) {
            path.push(hop);
            current = hop;
        }
        path.reverse();

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(n: u32) -> SwitchNumber {
        SwitchNumber(n)
    }

    #[test]
    fn prefers_lower_total_delay_over_fewer_hops() {
        let mut graph = DelayGraph::new();
        graph.add_edge(s(1), s(4), 10.0);
        graph.add_edge(s(1), s(2), 1.0);
        graph.add_edge(s(2), s(3), 1.0);
        graph.add_edge(s(3), s(4), 1.0);

        assert_eq!(graph.shortest_path(s(1), s(4)), Some(vec![s(1), s(2), s(3), s(4)]));
        assert_eq!(graph.shortest_path(s(4), s(1)), Some(vec![s(4), s(3), s(2), s(1)]));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn missing_endpoint_or_disconnected_yields_none() {
        let mut graph = DelayGraph::new();
        graph.add_edge(s(1), s(2), 1.0);
        graph.add_edge(s(3), s(4), 1.0);

        assert_eq!(graph.shortest_path(s(1), s(9)), None);
        assert_eq!(graph.shortest_path(s(1), s(4)), None);
        assert_eq!(DelayGraph::new().shortest_path(s(1), s(2)), None);
    }

    #[test]
    fn equal_cost_paths_resolve_the_same_way_every_time() {
        let mut graph = DelayGraph::new();
        graph.add_edge(s(1), s(2), 1.0);
        graph.add_edge(s(1), s(3), 1.0);
        graph.add_edge(s(2), s(4), 1.0);
        graph.add_edge(s(3), s(4), 1.0);

        let first = graph.shortest_path(s(1), s(4));
        for _ in 0..10 {
            assert_eq!(graph.shortest_path(s(1), s(4)), first);
        }
        assert_eq!(first, Some(vec![s(1), s(2), s(4)]));
    }
}
