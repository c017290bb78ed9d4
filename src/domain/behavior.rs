use serde::{Deserialize, Serialize};

/// Instantánea de señales de conducción que recibe el evaluador de reglas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorSignals {
    pub lane_departure: bool,
    pub speed: f64,
    pub aggressive_turn: bool,
}

/// Lectura de telemetría del vehículo en el instante del análisis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub speed: f64,
    pub aggressive_turn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Abnormality {
    pub kind: String,
    pub severity: Severity,
    pub description: String,
}

/// Condición que dispara una regla. Los umbrales de velocidad van en la
/// misma unidad que reporte la telemetría.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "threshold", rename_all = "snake_case")]
pub enum RuleCondition {
    LaneDeparture,
    AggressiveTurn,
    SpeedAbove(f64),
    SpeedBelow(f64),
}

impl RuleCondition {
    pub fn matches(&self, signals: &BehaviorSignals) -> bool {
        match *self {
            RuleCondition::LaneDeparture => signals.lane_departure,
            RuleCondition::AggressiveTurn => signals.aggressive_turn,
            RuleCondition::SpeedAbove(limit) => signals.speed > limit,
            RuleCondition::SpeedBelow(limit) => signals.speed < limit,
        }
    }

    fn threshold(&self) -> Option<f64> {
        match *self {
            RuleCondition::SpeedAbove(limit) | RuleCondition::SpeedBelow(limit) => Some(limit),
            _ => None,
        }
    }
}

/// Regla definida por datos. `description` puede usar `{speed}` y
/// `{threshold}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRule {
    pub kind: String,
    pub condition: RuleCondition,
    pub severity: Severity,
    pub description: String,
}

impl BehaviorRule {
    pub fn new(kind: &str, condition: RuleCondition, severity: Severity, description: &str) -> Self {
        Self {
            kind: kind.to_string(),
            condition,
            severity,
            description: description.to_string(),
        }
    }

    pub fn evaluate(&self, signals: &BehaviorSignals) -> Option<Abnormality> {
        if !self.condition.matches(signals) {
            return None;
        }
        Some(Abnormality {
            kind: self.kind.clone(),
            severity: self.severity,
            description: self.render_description(signals),
        })
    }

    fn render_description(&self, signals: &BehaviorSignals) -> String {
        let mut text = self.description.replace("{speed}", &format!("{:.0}", signals.speed));
        if let Some(threshold) = self.condition.threshold() {
            text = text.replace("{threshold}", &format!("{:.0}", threshold));
        }
        text
    }
}

pub fn default_rules() -> Vec<BehaviorRule> {
    vec![
        BehaviorRule::new(
            "lane_departure",
            RuleCondition::LaneDeparture,
            Severity::Warning,
            "Vehicle is leaving its lane",
        ),
        BehaviorRule::new(
            "speeding",
            RuleCondition::SpeedAbove(60.0),
            Severity::Warning,
            "Speed {speed} exceeds limit of {threshold}",
        ),
        BehaviorRule::new(
            "excessive_speed",
            RuleCondition::SpeedAbove(100.0),
            Severity::Critical,
            "Speed {speed} is far above safe limit of {threshold}",
        ),
        BehaviorRule::new(
            "aggressive_turn",
            RuleCondition::AggressiveTurn,
            Severity::Warning,
            "Aggressive turning maneuver detected",
        ),
    ]
}
