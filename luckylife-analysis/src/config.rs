use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Nombre de tirages comptés dans la fréquence récente.
    pub recent_window: usize,
    /// Un numéro est « en retard » au-delà de `multiplier × écart moyen`.
    pub min_gap_multiplier: f64,
    pub confidence_level: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recent_window: 50,
            min_gap_multiplier: 1.5,
            confidence_level: 0.95,
        }
    }
}

impl AnalysisConfig {
    /// Remplace les valeurs hors bornes par les valeurs par défaut.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;

        if config.recent_window == 0 {
            warn!("Fenêtre récente nulle, retour à {}", defaults.recent_window);
            config.recent_window = defaults.recent_window;
        }
        if !config.min_gap_multiplier.is_finite() || config.min_gap_multiplier < 0.0 {
            warn!(
                "Multiplicateur d'écart invalide ({}), retour à {}",
                config.min_gap_multiplier, defaults.min_gap_multiplier
            );
            config.min_gap_multiplier = defaults.min_gap_multiplier;
        }
        if !(config.confidence_level > 0.0 && config.confidence_level <= 1.0) {
            warn!(
                "Niveau de confiance invalide ({}), retour à {}",
                config.confidence_level, defaults.confidence_level
            );
            config.confidence_level = defaults.confidence_level;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.recent_window, 50);
        assert!((config.min_gap_multiplier - 1.5).abs() < 1e-10);
        assert!((config.confidence_level - 0.95).abs() < 1e-10);
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_sanitized_restores_defaults() {
        let config = AnalysisConfig {
            recent_window: 0,
            min_gap_multiplier: -2.0,
            confidence_level: 1.5,
        }
        .sanitized();
        assert_eq!(config, AnalysisConfig::default());

        let nan = AnalysisConfig {
            recent_window: 10,
            min_gap_multiplier: f64::NAN,
            confidence_level: f64::NAN,
        }
        .sanitized();
        assert_eq!(nan.recent_window, 10);
        assert!((nan.min_gap_multiplier - 1.5).abs() < 1e-10);
        assert!((nan.confidence_level - 0.95).abs() < 1e-10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"recent_window": 20}"#).unwrap();
        assert_eq!(config.recent_window, 20);
        assert!((config.min_gap_multiplier - 1.5).abs() < 1e-10);
    }
}
