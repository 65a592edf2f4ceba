pub mod commands;
pub mod config;
pub mod constants;
pub mod container;
pub mod robot;
pub mod subsystems;
