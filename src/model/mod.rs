pub mod attendance;
pub mod config;
pub mod employee;
pub mod summary;
