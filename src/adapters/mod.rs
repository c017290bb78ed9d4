pub mod http;
pub mod image;
pub mod onnx;
pub mod telemetry;
pub mod vision;
