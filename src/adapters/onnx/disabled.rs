use crate::application::ports::ObjectDetectorPort;
use crate::domain::{detection::DetectedObject, errors::DomainResult, image::Image};

/// Se usa cuando no hay modelo ONNX configurado: el servicio sigue
/// respondiendo, con la lista de objetos vacía.
pub struct DisabledObjectDetector;

impl ObjectDetectorPort for DisabledObjectDetector {
    fn detect_objects(&self, _image: &Image) -> DomainResult<Vec<DetectedObject>> {
        Ok(Vec::new())
    }
}
