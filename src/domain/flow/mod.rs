pub mod flow_rule;
