use async_trait::async_trait;

use crate::application::ports::TelemetrySource;
use crate::config::TelemetryConfig;
use crate::domain::behavior::TelemetrySnapshot;
use crate::domain::errors::DomainResult;

/// Fuente de telemetría con valores fijos tomados de la configuración.
/// Sustituye a la integración real con el vehículo, que no forma parte del servicio.
pub struct StaticTelemetry {
    snapshot: TelemetrySnapshot,
}

impl StaticTelemetry {
    pub fn new(cfg: &TelemetryConfig) -> Self {
        Self {
            snapshot: TelemetrySnapshot { speed: cfg.speed, aggressive_turn: cfg.aggressive_turn },
        }
    }
}

#[async_trait]
impl TelemetrySource for StaticTelemetry {
    async fn snapshot(&self) -> DomainResult<TelemetrySnapshot> {
        Ok(self.snapshot)
    }
}
