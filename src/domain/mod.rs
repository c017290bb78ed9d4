pub mod analysis;
pub mod behavior;
pub mod detection;
pub mod errors;
pub mod image;
pub mod lane;
pub mod model;
