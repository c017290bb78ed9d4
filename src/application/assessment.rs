use tracing::debug;

use crate::domain::behavior::{default_rules, Abnormality, BehaviorRule, BehaviorSignals};

/// Evaluador de comportamiento basado en reglas.
///
/// Todas las reglas se evalúan de forma independiente y en el orden
/// configurado; cada regla disparada produce exactamente una anomalía.
#[derive(Debug, Clone)]
pub struct DrivingAssessment {
    rules: Vec<BehaviorRule>,
}

impl DrivingAssessment {
    pub fn new(rules: Vec<BehaviorRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[BehaviorRule] {
        &self.rules
    }

    pub fn assess_behavior(&self, signals: &BehaviorSignals) -> Vec<Abnormality> {
        let abnormalities: Vec<Abnormality> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(signals))
            .collect();
        debug!(
            ?signals,
            triggered = abnormalities.len(),
            rules = self.rules.len(),
            "Reglas de comportamiento evaluadas"
        );
        abnormalities
    }
}

impl Default for DrivingAssessment {
    fn default() -> Self {
        Self::new(default_rules())
    }
}
