pub mod link;
pub mod switch;
pub mod topology;
