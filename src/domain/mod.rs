pub mod capacity;
pub mod controller;
pub mod flow;
pub mod routing;
pub mod session;
pub mod topology;
pub mod utils;
