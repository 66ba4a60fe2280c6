pub mod capacity_explorer;
pub mod delay_graph;
pub mod path_finder;
