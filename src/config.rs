use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::behavior::{default_rules, BehaviorRule};
use crate::domain::model::{ModelId, YoloParams};

/// Configuración completa del servicio, cargada desde YAML.
/// Cada sección tiene valores por defecto, de modo que un fichero parcial es válido.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub decoder: DecoderConfig,
    pub objects: ObjectsConfig,
    pub lanes: LaneDetectorConfig,
    pub departure: DepartureConfig,
    pub telemetry: TelemetryConfig,
    pub assessment: AssessmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub static_dir: String,
    pub max_upload_bytes: usize,
    /// Límite opcional para detección + evaluación de una imagen.
    pub analysis_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8090".into(),
            static_dir: "static".into(),
            max_upload_bytes: 20 * 1024 * 1024,
            analysis_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { max_width: 8192, max_height: 8192 }
    }
}

/// Sin modelo el servicio sigue respondiendo, sin objetos detectados.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectsConfig {
    pub model: Option<ModelId>,
    pub params: YoloParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneDetectorConfig {
    /// Fracción de la altura donde empieza la región de interés.
    pub roi_top: f32,
    pub row_step: u32,
    pub white_threshold: u8,
    pub min_run: u32,
    pub max_run: u32,
    pub min_points: usize,
}

impl Default for LaneDetectorConfig {
    fn default() -> Self {
        Self {
            roi_top: 0.55,
            row_step: 8,
            white_threshold: 200,
            min_run: 2,
            max_run: 40,
            min_points: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartureConfig {
    /// Desplazamiento lateral normalizado en (0, 1] a partir del cual hay salida de carril.
    pub threshold: f32,
}

impl Default for DepartureConfig {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

/// Valores fijos de telemetría mientras no haya una fuente real integrada.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub speed: f64,
    pub aggressive_turn: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { speed: 75.0, aggressive_turn: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub rules: Vec<BehaviorRule>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self { rules: default_rules() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

impl AppConfig {
    /// Carga la configuración; si el fichero no existe se usan los valores por defecto.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.departure.threshold > 0.0 && self.departure.threshold <= 1.0,
            "departure.threshold must be in (0, 1], got {}",
            self.departure.threshold
        );
        ensure!(
            (0.0..1.0).contains(&self.lanes.roi_top),
            "lanes.roi_top must be in [0, 1), got {}",
            self.lanes.roi_top
        );
        ensure!(self.lanes.row_step > 0, "lanes.row_step must be positive");
        ensure!(
            self.lanes.min_run <= self.lanes.max_run,
            "lanes.min_run ({}) exceeds lanes.max_run ({})",
            self.lanes.min_run,
            self.lanes.max_run
        );
        if let Err(e) = self.objects.params.validate() {
            bail!("objects.params: {e}");
        }
        ensure!(
            self.decoder.max_width > 0 && self.decoder.max_height > 0,
            "decoder limits must be positive"
        );
        ensure!(self.server.max_upload_bytes > 0, "server.max_upload_bytes must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behavior::RuleCondition;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8090");
        assert_eq!(cfg.telemetry.speed, 75.0);
        assert_eq!(cfg.assessment.rules, default_rules());
        assert!(cfg.objects.model.is_none());
    }

    #[test]
    fn partial_file_overrides_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  bind: "127.0.0.1:9000"
  analysis_timeout_ms: 1500
telemetry:
  speed: 42
objects:
  model:
    name: yolo11n
    onnx_path: models/yolo11n.onnx
  params:
    conf_threshold: 0.4
assessment:
  rules:
    - kind: speeding
      condition: {{ type: speed_above, threshold: 30 }}
      severity: critical
      description: "over {{threshold}}"
"#
        )
        .unwrap();

        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.server.analysis_timeout_ms, Some(1500));
        assert_eq!(cfg.server.static_dir, "static");
        assert_eq!(cfg.telemetry.speed, 42.0);
        assert!(!cfg.telemetry.aggressive_turn);
        assert_eq!(cfg.objects.model.unwrap().name, "yolo11n");
        assert_eq!(cfg.objects.params.conf_threshold, 0.4);
        assert_eq!(cfg.objects.params.input_size, 640);
        assert_eq!(cfg.assessment.rules.len(), 1);
        assert_eq!(cfg.assessment.rules[0].condition, RuleCondition::SpeedAbove(30.0));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "departure:\n  threshold: 1.5").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("departure.threshold"));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
