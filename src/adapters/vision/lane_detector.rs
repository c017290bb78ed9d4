use image::Rgb;
use tracing::debug;

use crate::application::ports::LaneDetectorPort;
use crate::config::LaneDetectorConfig;
use crate::domain::errors::DomainResult;
use crate::domain::image::Image;
use crate::domain::lane::{DetectedLane, LanePoint};

/// Detector clásico de marcas viales.
///
/// Recorre filas de la parte inferior de la imagen buscando tramos de pintura
/// blanca o amarilla. En cada fila se queda con la marca más cercana al centro
/// a cada lado; cada lado con suficientes puntos produce una línea de carril
/// (primero la izquierda). Es determinista y no guarda estado.
pub struct PaintLaneDetector {
    cfg: LaneDetectorConfig,
}

impl PaintLaneDetector {
    pub fn new(cfg: LaneDetectorConfig) -> Self { Self { cfg } }

    fn is_paint(&self, px: &Rgb<u8>) -> bool {
        let [r, g, b] = px.0;
        let t = self.cfg.white_threshold;
        if r >= t && g >= t && b >= t {
            return true;
        }
        let (h, s, v) = rgb_to_hsv(r as f32, g as f32, b as f32);
        (35.0..=65.0).contains(&h) && s >= 35.0 && v >= 120.0
    }

    /// Centros de los tramos de pintura de la fila `y` con anchura plausible de marca vial.
    fn paint_runs(&self, image: &Image, y: u32) -> Vec<f32> {
        let mut centers = Vec::new();
        let mut start: Option<u32> = None;

        for x in 0..=image.width() {
            let paint = x < image.width() && self.is_paint(&image.pixel(x, y));
            match (paint, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    let len = x - s;
                    if (self.cfg.min_run..=self.cfg.max_run).contains(&len) {
                        centers.push(s as f32 + (len as f32 - 1.0) / 2.0);
                    }
                    start = None;
                }
                _ => {}
            }
        }
        centers
    }
}

impl LaneDetectorPort for PaintLaneDetector {
    fn detect_lanes(&self, image: &Image) -> DomainResult<Vec<DetectedLane>> {
        let height = image.height();
        let top = (height as f32 * self.cfg.roi_top) as u32;
        let center = image.width() as f32 / 2.0;

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut rows = 0usize;

        for y in (top..height).step_by(self.cfg.row_step.max(1) as usize) {
            rows += 1;
            let runs = self.paint_runs(image, y);
            if let Some(x) = runs.iter().copied().filter(|&x| x < center).max_by(f32::total_cmp) {
                left.push(LanePoint { x, y: y as f32 });
            }
            if let Some(x) = runs.iter().copied().filter(|&x| x >= center).min_by(f32::total_cmp) {
                right.push(LanePoint { x, y: y as f32 });
            }
        }

        let lanes: Vec<DetectedLane> = [left, right]
            .into_iter()
            .filter(|points| rows > 0 && points.len() >= self.cfg.min_points)
            .map(|points| DetectedLane {
                confidence: points.len() as f32 / rows as f32,
                points,
            })
            .collect();

        debug!(rows, lanes = lanes.len(), "Líneas de carril detectadas");
        Ok(lanes)
    }
}

/// RGB → HSV (H: 0-360, S: 0-100, V: 0-255).
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };
    let s = if max < 1e-6 { 0.0 } else { delta / max * 100.0 };

    (h, s, max)
}
