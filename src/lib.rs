pub mod cli;
pub mod detection_gateway;
pub mod logging;
pub mod nutrition;
pub mod report;
pub mod session;
