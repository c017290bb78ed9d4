use async_trait::async_trait;

use crate::domain::{
    behavior::TelemetrySnapshot,
    detection::DetectedObject,
    errors::DomainResult,
    image::Image,
    lane::DetectedLane,
    model::ModelId,
};

// Los puertos de visión son síncronos: trabajo de CPU que el servicio ejecuta
// dentro de `spawn_blocking`. Todas las implementaciones se comparten entre
// peticiones concurrentes.

pub trait ImageDecoderPort: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> DomainResult<Image>;
}

pub trait ObjectDetectorPort: Send + Sync {
    fn detect_objects(&self, image: &Image) -> DomainResult<Vec<DetectedObject>>;
}

pub trait LaneDetectorPort: Send + Sync {
    fn detect_lanes(&self, image: &Image) -> DomainResult<Vec<DetectedLane>>;
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn snapshot(&self) -> DomainResult<TelemetrySnapshot>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
