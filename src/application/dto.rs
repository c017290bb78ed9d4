use serde::{Deserialize, Serialize};

use crate::domain::{
    analysis::AnalysisReport,
    behavior::{Abnormality, BehaviorSignals, Severity},
    detection::DetectedObject,
    lane::DetectedLane,
};

/// Versión del esquema JSON de `/api/analyze-image`.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub schema_version: u32,
    pub image: ImageDto,
    pub signals: SignalsDto,
    pub abnormalities: Vec<AbnormalityDto>,
    pub objects: Vec<ObjectDto>,
    /// Una entrada por línea de carril, cada una con sus puntos `[x, y]`.
    pub lanes: Vec<Vec<[f32; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDto {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsDto {
    pub lane_departure: bool,
    pub speed: f64,
    pub aggressive_turn: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbnormalityDto {
    pub kind: String,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDto {
    pub label: String,
    pub class_id: usize,
    pub score: f32,
    /// `[x, y, width, height]`
    pub bbox: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<&BehaviorSignals> for SignalsDto {
    fn from(s: &BehaviorSignals) -> Self {
        Self { lane_departure: s.lane_departure, speed: s.speed, aggressive_turn: s.aggressive_turn }
    }
}

impl From<Abnormality> for AbnormalityDto {
    fn from(a: Abnormality) -> Self {
        Self { kind: a.kind, severity: a.severity, description: a.description }
    }
}

impl From<DetectedObject> for ObjectDto {
    fn from(o: DetectedObject) -> Self {
        Self {
            label: o.label,
            class_id: o.class_id,
            score: o.score,
            bbox: [o.bbox.x, o.bbox.y, o.bbox.width, o.bbox.height],
        }
    }
}

fn lane_points(lane: DetectedLane) -> Vec<[f32; 2]> {
    lane.points.into_iter().map(|p| [p.x, p.y]).collect()
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(r: AnalysisReport) -> Self {
        Self {
            status: "success".into(),
            schema_version: SCHEMA_VERSION,
            image: ImageDto { width: r.width, height: r.height },
            signals: SignalsDto::from(&r.signals),
            abnormalities: r.abnormalities.into_iter().map(Into::into).collect(),
            objects: r.objects.into_iter().map(Into::into).collect(),
            lanes: r.lanes.into_iter().map(lane_points).collect(),
        }
    }
}
