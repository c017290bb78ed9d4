mod adapters;
mod application;
mod args;
mod config;
mod domain;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    http::{router, state::HttpState},
    image::decoder::ImageCrateDecoder,
    onnx::{disabled::DisabledObjectDetector, model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
    telemetry::static_source::StaticTelemetry,
    vision::lane_detector::PaintLaneDetector,
};
use crate::application::{
    assessment::DrivingAssessment,
    detector::DrivingDetector,
    ports::{ModelCatalogPort, ObjectDetectorPort},
    services::AnalysisService,
};
use crate::args::Args;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut cfg = AppConfig::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }

    // 1. Inicializar logs (RUST_LOG tiene prioridad sobre logging.level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.config.exists() {
        tracing::info!("✓ Configuración cargada desde {}", args.config.display());
    } else {
        tracing::info!("Sin fichero {}, usando configuración por defecto", args.config.display());
    }

    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Instanciar Adaptadores (Capa de Infraestructura)
    let decoder = Arc::new(ImageCrateDecoder::new(cfg.decoder.clone()));
    let lanes = Arc::new(PaintLaneDetector::new(cfg.lanes.clone()));
    let telemetry = Arc::new(StaticTelemetry::new(&cfg.telemetry));

    let objects: Arc<dyn ObjectDetectorPort> = match &cfg.objects.model {
        Some(model) => {
            OnnxModelCatalog::new().validate_model(model).await?;
            let engine = OnnxYoloEngine::load(&model.onnx_path, cfg.objects.params.clone())
                .with_context(|| format!("Failed to load model {model}"))?;
            Arc::new(engine)
        }
        None => {
            tracing::warn!("⚠️ Sin modelo ONNX configurado: no se detectarán objetos");
            Arc::new(DisabledObjectDetector)
        }
    };

    // 3. Instanciar Servicios (Capa de Aplicación - Casos de Uso)
    let detector = Arc::new(DrivingDetector::new(objects, lanes, cfg.departure.threshold));
    let assessor = Arc::new(DrivingAssessment::new(cfg.assessment.rules.clone()));
    tracing::info!("✓ {} reglas de comportamiento activas", assessor.rules().len());
    let analysis = AnalysisService::new(decoder, detector, assessor, telemetry)
        .with_timeout(cfg.server.analysis_timeout_ms.map(Duration::from_millis));

    // 4. Configurar el Estado de la API
    let state = HttpState { analysis: Arc::new(analysis) };

    // 5. Configurar el Router de Axum y Archivos Estáticos
    let app = router(state, cfg.server.max_upload_bytes)
        .nest_service("/static", ServeDir::new(&cfg.server.static_dir));

    // 6. Lanzar el Servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.bind))?;

    tracing::info!("🚀 Servidor iniciado en http://{}", cfg.server.bind);
    tracing::info!("📂 Archivos estáticos servidos desde '{}' en /static", cfg.server.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Servidor detenido");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("No se pudo escuchar Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
