use std::cmp::Ordering;
use std::str::FromStr;

use chrono::Datelike;
use serde::Serialize;
use thiserror::Error;

use crate::cosmic::CosmicData;
use crate::patterns::PatternDetector;
use crate::stats::{NumberInfo, NumberStatsTracker};

/// Poids de confiance pour une stratégie inconnue (ou la sélection cosmique).
pub const DEFAULT_STRATEGY_WEIGHT: f64 = 0.70;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("stratégie inconnue : {0} (attendu : balanced, hot, overdue, pattern, frequency)")]
pub struct UnknownStrategy(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Balanced,
    Hot,
    Overdue,
    Pattern,
    Frequency,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Balanced,
        Strategy::Hot,
        Strategy::Overdue,
        Strategy::Pattern,
        Strategy::Frequency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Hot => "hot",
            Strategy::Overdue => "overdue",
            Strategy::Pattern => "pattern",
            Strategy::Frequency => "frequency",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Strategy::Balanced => 0.95,
            Strategy::Hot => 0.85,
            Strategy::Overdue => 0.80,
            Strategy::Pattern => 0.75,
            Strategy::Frequency => 0.90,
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Strategy::Balanced => {
                "Combine numéros chauds, numéros en retard et fréquence globale pour une sélection équilibrée"
            }
            Strategy::Hot => "Privilégie les numéros les plus sortis sur les tirages récents",
            Strategy::Overdue => "Retient les numéros absents depuis plus longtemps que leur écart moyen",
            Strategy::Pattern => "S'appuie sur les numéros qui sortent souvent ensemble",
            Strategy::Frequency => "Retient les numéros les plus tirés sur tout l'historique",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Poids de confiance d'une stratégie désignée par son nom.
pub fn strategy_weight(name: &str) -> f64 {
    name.parse::<Strategy>()
        .map(|s| s.weight())
        .unwrap_or(DEFAULT_STRATEGY_WEIGHT)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredNumber {
    pub number: u8,
    pub score: f64,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedSet {
    pub strategy: String,
    pub numbers: [u8; 5],
    pub lucky_ball: Option<u8>,
    pub confidence: f64,
    pub explanation: String,
}

/// Classement des numéros à partir de l'état accumulé par l'analyse.
pub struct RecommendationScorer<'a> {
    main: &'a NumberStatsTracker,
    lucky: &'a NumberStatsTracker,
    patterns: &'a PatternDetector,
    total_drawings: usize,
    randomness_score: f64,
}

impl<'a> RecommendationScorer<'a> {
    pub fn new(
        main: &'a NumberStatsTracker,
        lucky: &'a NumberStatsTracker,
        patterns: &'a PatternDetector,
        total_drawings: usize,
        randomness_score: f64,
    ) -> Self {
        Self {
            main,
            lucky,
            patterns,
            total_drawings,
            randomness_score,
        }
    }

    /// Un score par numéro principal, trié par score décroissant puis numéro croissant.
    pub fn score(&self, strategy: Strategy) -> Vec<ScoredNumber> {
        let mut scored: Vec<ScoredNumber> = self
            .main
            .iter()
            .map(|info| self.score_number(info, strategy))
            .collect();
        sort_scores(&mut scored);
        scored
    }

    fn score_number(&self, info: &NumberInfo, strategy: Strategy) -> ScoredNumber {
        let mut factors = Vec::new();
        let score = match strategy {
            Strategy::Balanced => {
                let mut score = if self.total_drawings > 0 {
                    100.0 * info.total_frequency as f64 / self.total_drawings as f64
                } else {
                    0.0
                };
                if info.recent_frequency > 3 {
                    score += 10.0 * info.recent_frequency as f64;
                    factors.push(format!("Hot-{}", info.recent_frequency));
                }
                if let Some(ratio) = info.overdue_ratio() {
                    if ratio > 1.3 {
                        score += 20.0 * ratio;
                        factors.push(format!("Overdue-{:.1}x", ratio));
                    }
                }
                score
            }
            Strategy::Hot => {
                factors.push(format!("Recent-{}", info.recent_frequency));
                100.0 * info.recent_frequency as f64
            }
            Strategy::Overdue => match info.overdue_ratio() {
                Some(ratio) => {
                    factors.push(format!("Gap-{}", info.current_gap));
                    100.0 * ratio
                }
                None => 0.0,
            },
            Strategy::Pattern => {
                let weight = self.patterns.pair_weight(info.number) as f64;
                if weight > 50.0 {
                    factors.push("StrongPairs".to_string());
                }
                weight
            }
            Strategy::Frequency => {
                factors.push(format!("Freq-{}", info.total_frequency));
                info.total_frequency as f64
            }
        };

        ScoredNumber {
            number: info.number,
            score,
            factors,
        }
    }

    /// Numéros Lucky Ball classés par `total + 5 × récent`.
    pub fn score_lucky_balls(&self) -> Vec<ScoredNumber> {
        let mut scored: Vec<ScoredNumber> = self
            .lucky
            .iter()
            .map(|info| ScoredNumber {
                number: info.number,
                score: info.total_frequency as f64 + 5.0 * info.recent_frequency as f64,
                factors: vec![
                    format!("Total-{}", info.total_frequency),
                    format!("Recent-{}", info.recent_frequency),
                ],
            })
            .collect();
        sort_scores(&mut scored);
        scored
    }

    pub fn confidence(&self, weight: f64) -> f64 {
        (self.randomness_score / 100.0 * weight).clamp(0.0, 1.0)
    }

    pub fn select_set(&self, strategy: Strategy) -> RecommendedSet {
        let scored = self.score(strategy);
        let mut numbers = [0u8; 5];
        for (slot, candidate) in numbers.iter_mut().zip(&scored) {
            *slot = candidate.number;
        }
        numbers.sort_unstable();

        RecommendedSet {
            strategy: strategy.name().to_string(),
            numbers,
            lucky_ball: self.score_lucky_balls().first().map(|s| s.number),
            confidence: self.confidence(strategy.weight()),
            explanation: strategy.explanation().to_string(),
        }
    }

    /// Une grille par stratégie, dans l'ordre de `Strategy::ALL`, au plus `count`.
    pub fn recommendations(&self, count: usize) -> Vec<RecommendedSet> {
        Strategy::ALL
            .iter()
            .take(count)
            .map(|&strategy| self.select_set(strategy))
            .collect()
    }

    /// Grille « cosmique » : aucune valeur statistique, seulement la date.
    pub fn cosmic_set(&self, cosmic: &CosmicData) -> RecommendedSet {
        let mut numbers = cosmic_numbers(cosmic);
        numbers.sort_unstable();
        RecommendedSet {
            strategy: "cosmic".to_string(),
            numbers,
            lucky_ball: None,
            confidence: self.confidence(strategy_weight("cosmic")),
            explanation: format!(
                "Dérivée de la lune ({}), du signe ({}) et de la météo du {}",
                cosmic.moon_phase_name,
                cosmic.zodiac_sign,
                cosmic.date.format("%d/%m/%Y")
            ),
        }
    }
}

fn sort_scores(scored: &mut [ScoredNumber]) {
    // tri stable : à score égal, l'ordre croissant des numéros est conservé
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

fn to_pool_number(value: f64) -> u8 {
    let floored = if value.is_finite() { value.floor() as i64 } else { 0 };
    (floored.rem_euclid(48) + 1) as u8
}

/// Cinq numéros distincts dans [1, 48], dans l'ordre des sources
/// (lune, jour, signe, F10.7, température).
pub fn cosmic_numbers(cosmic: &CosmicData) -> [u8; 5] {
    let weekday = cosmic.date.weekday().num_days_from_sunday() as usize;
    let mut numbers = [
        to_pool_number(cosmic.moon_phase * 48.0),
        ((weekday * 7) % 48 + 1) as u8,
        ((cosmic.zodiac_sign.name().len() * 3) % 48 + 1) as u8,
        to_pool_number(cosmic.solar_activity.f107_index),
        to_pool_number(cosmic.weather.temperature),
    ];

    let mut used = [false; 49];
    for slot in numbers.iter_mut() {
        let mut n = *slot;
        while used[n as usize] {
            n = n % 48 + 1;
        }
        used[n as usize] = true;
        *slot = n;
    }
    numbers
}
