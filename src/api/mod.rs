pub mod controller_config_dto;
pub mod flow_dto;
pub mod topology_dto;
