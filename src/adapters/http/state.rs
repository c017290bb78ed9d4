use std::sync::Arc;
use crate::application::services::AnalysisService;

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Servicio que orquesta decodificación, detección y evaluación de una imagen.
    pub analysis: Arc<AnalysisService>,
}
