use std::fmt;

use super::behavior::{Abnormality, BehaviorSignals};
use super::detection::DetectedObject;
use super::lane::DetectedLane;

/// Etapas del análisis de una petición.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Decoded,
    Analyzed,
    Responded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Decoded => "decoded",
            PipelineStage::Analyzed => "analyzed",
            PipelineStage::Responded => "responded",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Resultado completo de analizar una imagen. Se crea por petición y se
/// descarta tras serializar la respuesta.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub width: u32,
    pub height: u32,
    pub signals: BehaviorSignals,
    pub abnormalities: Vec<Abnormality>,
    pub objects: Vec<DetectedObject>,
    pub lanes: Vec<DetectedLane>,
}
