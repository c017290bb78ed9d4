//! Fixtures compartidos por los tests unitarios.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::adapters::image::decoder::ImageCrateDecoder;
use crate::adapters::telemetry::static_source::StaticTelemetry;
use crate::adapters::vision::lane_detector::PaintLaneDetector;
use crate::application::assessment::DrivingAssessment;
use crate::application::detector::DrivingDetector;
use crate::application::ports::{ObjectDetectorPort, TelemetrySource};
use crate::application::services::AnalysisService;
use crate::config::{AppConfig, TelemetryConfig};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const YELLOW: Rgb<u8> = Rgb([230, 200, 40]);
const ASPHALT: Rgb<u8> = Rgb([70, 70, 70]);
const MARKING_WIDTH: u32 = 6;

/// Asfalto gris con marcas verticales de altura completa que empiezan en cada x indicada.
pub fn road_image(width: u32, height: u32, markings: &[(u32, Rgb<u8>)]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        markings
            .iter()
            .find(|(start, _)| (*start..start + MARKING_WIDTH).contains(&x))
            .map(|(_, color)| *color)
            .unwrap_or(ASPHALT)
    })
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    encode(&DynamicImage::ImageRgb8(img.clone()), ImageFormat::Png)
}

pub fn analysis_service(
    objects: Arc<dyn ObjectDetectorPort>,
    telemetry: Arc<dyn TelemetrySource>,
) -> AnalysisService {
    let cfg = AppConfig::default();
    let detector = DrivingDetector::new(
        objects,
        Arc::new(PaintLaneDetector::new(cfg.lanes.clone())),
        cfg.departure.threshold,
    );
    AnalysisService::new(
        Arc::new(ImageCrateDecoder::new(cfg.decoder.clone())),
        Arc::new(detector),
        Arc::new(DrivingAssessment::new(cfg.assessment.rules.clone())),
        telemetry,
    )
}

/// Servicio con la configuración por defecto y la telemetría simulada (velocidad 75, sin giro brusco).
pub fn service_with(objects: Arc<dyn ObjectDetectorPort>) -> AnalysisService {
    analysis_service(objects, Arc::new(StaticTelemetry::new(&TelemetryConfig::default())))
}
