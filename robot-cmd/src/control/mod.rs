pub mod edge_detect;
pub mod pid;
