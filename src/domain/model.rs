use serde::{Deserialize, Serialize};
use std::fmt;

/// Modelo ONNX de detección tal como se referencia en la configuración.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "yolo11n"
    pub onnx_path: String,  // filesystem path
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.onnx_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoloParams {
    pub input_size: u32,        // square side fed to the network
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1, NMS
    pub max_detections: usize,
}

impl YoloParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.input_size == 0 {
            return Err("input_size must be positive".into());
        }
        for (name, value) in [("conf_threshold", self.conf_threshold), ("iou_threshold", self.iou_threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(YoloParams::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_invalid() {
        let params = YoloParams { iou_threshold: 1.5, ..YoloParams::default() };
        assert!(params.validate().unwrap_err().contains("iou_threshold"));
    }
}
