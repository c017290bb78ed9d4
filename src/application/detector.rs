use std::sync::Arc;

use crate::application::ports::{LaneDetectorPort, ObjectDetectorPort};
use crate::domain::{
    detection::DetectedObject,
    errors::DomainResult,
    image::Image,
    lane::{self, DetectedLane},
};

/// Detector de conducción: combina el detector de objetos y el de carriles.
/// Inmutable tras su construcción, se comparte entre peticiones.
#[derive(Clone)]
pub struct DrivingDetector {
    objects: Arc<dyn ObjectDetectorPort>,
    lanes: Arc<dyn LaneDetectorPort>,
    departure_threshold: f32,
}

impl DrivingDetector {
    pub fn new(
        objects: Arc<dyn ObjectDetectorPort>,
        lanes: Arc<dyn LaneDetectorPort>,
        departure_threshold: f32,
    ) -> Self {
        Self { objects, lanes, departure_threshold }
    }

    pub fn detect_objects(&self, image: &Image) -> DomainResult<Vec<DetectedObject>> {
        self.objects.detect_objects(image)
    }

    pub fn detect_lanes(&self, image: &Image) -> DomainResult<Vec<DetectedLane>> {
        self.lanes.detect_lanes(image)
    }

    /// Recibe explícitamente las líneas de la imagen actual; el detector no
    /// guarda nada entre llamadas.
    pub fn check_lane_departure(&self, lanes: &[DetectedLane], center_x: u32) -> bool {
        lane::check_lane_departure(lanes, center_x, self.departure_threshold)
    }
}
