pub mod flow_controller;
pub mod flow_controller_mock;
pub mod onos;
