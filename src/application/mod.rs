pub mod assessment;
pub mod detector;
pub mod dto;
pub mod ports;
pub mod services;
