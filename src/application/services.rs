use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    application::{
        assessment::DrivingAssessment,
        detector::DrivingDetector,
        ports::{ImageDecoderPort, TelemetrySource},
    },
    domain::{
        analysis::{AnalysisReport, PipelineStage},
        behavior::BehaviorSignals,
        detection::summarize_detections,
        errors::{DomainError, DomainResult},
        image::Image,
    },
};

/// Orquestador del análisis de una imagen:
/// decodificación → detección → señales → reglas → informe.
///
/// Se construye una vez al arrancar y se comparte entre peticiones; no guarda
/// estado mutable. Cualquier fallo tras la decodificación descarta los
/// resultados parciales.
pub struct AnalysisService {
    decoder: Arc<dyn ImageDecoderPort>,
    detector: Arc<DrivingDetector>,
    assessor: Arc<DrivingAssessment>,
    telemetry: Arc<dyn TelemetrySource>,
    timeout: Option<Duration>,
}

impl AnalysisService {
    pub fn new(
        decoder: Arc<dyn ImageDecoderPort>,
        detector: Arc<DrivingDetector>,
        assessor: Arc<DrivingAssessment>,
        telemetry: Arc<dyn TelemetrySource>,
    ) -> Self {
        Self { decoder, detector, assessor, telemetry, timeout: None }
    }

    /// Limita el tiempo de detección + evaluación. La tarea bloqueante en curso
    /// no se cancela, solo deja de esperarse.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn analyze(&self, bytes: Vec<u8>) -> DomainResult<AnalysisReport> {
        debug!(stage = %PipelineStage::Received, bytes = bytes.len(), "Imagen recibida");

        let result = self.run_stages(bytes).await;
        match &result {
            Ok(report) => info!(
                stage = %PipelineStage::Responded,
                width = report.width,
                height = report.height,
                lanes = report.lanes.len(),
                abnormalities = report.abnormalities.len(),
                "✅ Análisis completado: [{}]",
                summarize_detections(&report.objects)
            ),
            Err(e) => warn!(stage = %PipelineStage::Failed, error = %e, "Análisis fallido"),
        }
        result
    }

    async fn run_stages(&self, bytes: Vec<u8>) -> DomainResult<AnalysisReport> {
        let decoder = self.decoder.clone();
        let image = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| DomainError::Analysis(format!("decode task failed: {e}")))??;
        debug!(
            stage = %PipelineStage::Decoded,
            width = image.width(),
            height = image.height(),
            "Imagen decodificada"
        );

        let analysis = self.analyze_image(image);
        let report = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, analysis).await.map_err(|_| {
                DomainError::Analysis(format!("analysis timed out after {} ms", limit.as_millis()))
            })?,
            None => analysis.await,
        }
        .map_err(DomainError::into_analysis)?;

        debug!(stage = %PipelineStage::Analyzed, signals = ?report.signals, "Imagen analizada");
        Ok(report)
    }

    async fn analyze_image(&self, image: Image) -> DomainResult<AnalysisReport> {
        let (width, height) = (image.width(), image.height());

        let detector = self.detector.clone();
        let (objects, lanes, lane_departure) = tokio::task::spawn_blocking(move || {
            let objects = detector.detect_objects(&image)?;
            let lanes = detector.detect_lanes(&image)?;
            let lane_departure = detector.check_lane_departure(&lanes, image.center_x());
            Ok::<_, DomainError>((objects, lanes, lane_departure))
        })
        .await
        .map_err(|e| DomainError::Analysis(format!("detection task failed: {e}")))??;

        let telemetry = self.telemetry.snapshot().await?;
        if !telemetry.speed.is_finite() || telemetry.speed < 0.0 {
            return Err(DomainError::Analysis(format!(
                "telemetry reported invalid speed {}",
                telemetry.speed
            )));
        }

        let signals = BehaviorSignals {
            lane_departure,
            speed: telemetry.speed,
            aggressive_turn: telemetry.aggressive_turn,
        };
        let abnormalities = self.assessor.assess_behavior(&signals);

        Ok(AnalysisReport { width, height, signals, abnormalities, objects, lanes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::onnx::disabled::DisabledObjectDetector;
    use crate::application::ports::{ObjectDetectorPort, TelemetrySource};
    use crate::config::TelemetryConfig;
    use crate::domain::behavior::TelemetrySnapshot;
    use crate::domain::detection::{BoundingBox, DetectedObject};
    use crate::test_support::{analysis_service, encode_png, road_image, service_with, WHITE};
    use async_trait::async_trait;

    struct FixedObjects;

    impl ObjectDetectorPort for FixedObjects {
        fn detect_objects(&self, image: &Image) -> DomainResult<Vec<DetectedObject>> {
            Ok(vec![DetectedObject {
                label: "coche".into(),
                class_id: 2,
                score: 0.8,
                bbox: BoundingBox { x: 0.0, y: 0.0, width: image.width() as f32 / 2.0, height: 10.0 },
            }])
        }
    }

    struct FailingObjects;

    impl ObjectDetectorPort for FailingObjects {
        fn detect_objects(&self, _image: &Image) -> DomainResult<Vec<DetectedObject>> {
            Err(DomainError::InvalidInput("tensor shape mismatch".into()))
        }
    }

    struct SlowObjects;

    impl ObjectDetectorPort for SlowObjects {
        fn detect_objects(&self, _image: &Image) -> DomainResult<Vec<DetectedObject>> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Vec::new())
        }
    }

    struct BrokenTelemetry;

    #[async_trait]
    impl TelemetrySource for BrokenTelemetry {
        async fn snapshot(&self) -> DomainResult<TelemetrySnapshot> {
            Ok(TelemetrySnapshot { speed: f64::NAN, aggressive_turn: false })
        }
    }

    fn kinds(report: &AnalysisReport) -> Vec<&str> {
        report.abnormalities.iter().map(|a| a.kind.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_upload_fails_to_decode() {
        let service = service_with(Arc::new(DisabledObjectDetector));
        let err = service.analyze(Vec::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[tokio::test]
    async fn blank_image_reports_only_telemetry_rules() {
        let service = service_with(Arc::new(DisabledObjectDetector));
        let bytes = encode_png(&road_image(160, 90, &[]));
        let report = service.analyze(bytes).await.unwrap();

        assert!(report.objects.is_empty());
        assert!(report.lanes.is_empty());
        assert!(!report.signals.lane_departure);
        assert_eq!(report.signals.speed, 75.0);
        assert_eq!(kinds(&report), vec!["speeding"]);
        assert_eq!((report.width, report.height), (160, 90));
    }

    #[tokio::test]
    async fn off_center_lanes_trigger_departure() {
        let service = service_with(Arc::new(FixedObjects));
        let bytes = encode_png(&road_image(200, 120, &[(90, WHITE), (190, WHITE)]));
        let report = service.analyze(bytes).await.unwrap();

        assert_eq!(report.lanes.len(), 2);
        assert!(report.signals.lane_departure);
        assert_eq!(kinds(&report), vec!["lane_departure", "speeding"]);
        assert_eq!(report.objects.len(), 1);
    }

    #[tokio::test]
    async fn centred_lanes_do_not_trigger_departure() {
        let service = service_with(Arc::new(DisabledObjectDetector));
        let bytes = encode_png(&road_image(200, 120, &[(40, WHITE), (150, WHITE)]));
        let report = service.analyze(bytes).await.unwrap();

        assert_eq!(report.lanes.len(), 2);
        assert!(!report.signals.lane_departure);
    }

    #[tokio::test]
    async fn same_bytes_give_same_detections() {
        let service = service_with(Arc::new(FixedObjects));
        let bytes = encode_png(&road_image(240, 160, &[(50, WHITE), (180, WHITE)]));
        let first = service.analyze(bytes.clone()).await.unwrap();
        let second = service.analyze(bytes).await.unwrap();

        assert_eq!(first.objects, second.objects);
        assert_eq!(first.lanes, second.lanes);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_the_service_without_interference() {
        let service = service_with(Arc::new(FixedObjects));
        let bytes = encode_png(&road_image(240, 160, &[(50, WHITE), (180, WHITE)]));

        let (a, b, c, d) = tokio::join!(
            service.analyze(bytes.clone()),
            service.analyze(bytes.clone()),
            service.analyze(bytes.clone()),
            service.analyze(bytes.clone()),
        );
        let reports = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];

        assert_eq!(reports[0].lanes.len(), 2);
        assert_eq!(reports[0].objects.len(), 1);
        for report in &reports[1..] {
            assert_eq!(report, &reports[0]);
        }
    }

    #[tokio::test]
    async fn detector_failure_becomes_analysis_error_with_original_message() {
        let service = service_with(Arc::new(FailingObjects));
        let err = service.analyze(encode_png(&road_image(64, 64, &[]))).await.unwrap_err();

        match err {
            DomainError::Analysis(msg) => assert!(msg.contains("tensor shape mismatch")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_telemetry_is_an_analysis_error() {
        let service = analysis_service(Arc::new(DisabledObjectDetector), Arc::new(BrokenTelemetry));
        let err = service.analyze(encode_png(&road_image(64, 64, &[]))).await.unwrap_err();
        assert!(matches!(err, DomainError::Analysis(ref m) if m.contains("invalid speed")));
    }

    #[tokio::test]
    async fn slow_analysis_times_out() {
        let service = service_with(Arc::new(SlowObjects)).with_timeout(Some(Duration::from_millis(20)));
        let err = service.analyze(encode_png(&road_image(64, 64, &[]))).await.unwrap_err();
        assert!(matches!(err, DomainError::Analysis(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn aggressive_turn_from_telemetry_is_reported() {
        let telemetry = crate::adapters::telemetry::static_source::StaticTelemetry::new(&TelemetryConfig {
            speed: 30.0,
            aggressive_turn: true,
        });
        let service = analysis_service(Arc::new(DisabledObjectDetector), Arc::new(telemetry));
        let report = service.analyze(encode_png(&road_image(64, 64, &[]))).await.unwrap();
        assert_eq!(kinds(&report), vec!["aggressive_turn"]);
    }
}
