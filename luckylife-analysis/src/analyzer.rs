use chrono::NaiveDate;
use log::info;

use luckylife_db::models::Pool;
use luckylife_db::store::DrawingStore;

use crate::cancel::CancelFlag;
use crate::config::AnalysisConfig;
use crate::correlation::{CorrelationEngine, CorrelationResult, EnrichError, EnrichSummary};
use crate::patterns::PatternDetector;
use crate::recommend::{RecommendationScorer, RecommendedSet};
use crate::stats::{ChiSquareSummary, NumberInfo, NumberStatsTracker};

/// Agrégat d'une analyse complète : une passe sur les tirages, puis requêtes.
///
/// Toutes les statistiques sont recalculées à la construction ; le cache
/// cosmique n'est rempli que sur demande (`enrich_cosmic`).
#[derive(Debug, Clone)]
pub struct Analyzer {
    store: DrawingStore,
    config: AnalysisConfig,
    main: NumberStatsTracker,
    lucky: NumberStatsTracker,
    patterns: PatternDetector,
    chi_square: ChiSquareSummary,
    correlations: CorrelationEngine,
}

impl Analyzer {
    pub fn new(store: DrawingStore, config: AnalysisConfig) -> Self {
        let config = config.sanitized();
        let mut main = NumberStatsTracker::new(Pool::Main, config.recent_window);
        let mut lucky = NumberStatsTracker::new(Pool::LuckyBall, config.recent_window);
        let mut patterns = PatternDetector::new();

        for drawing in &store {
            for &n in Pool::Main.numbers_from(drawing) {
                main.record_appearance(n, drawing.index, drawing.date);
            }
            for &n in Pool::LuckyBall.numbers_from(drawing) {
                lucky.record_appearance(n, drawing.index, drawing.date);
            }
            patterns.record_combinations(&drawing.numbers, drawing.index);
            patterns.record_patterns(drawing);
        }

        main.finalize(store.len());
        lucky.finalize(store.len());
        let chi_square = ChiSquareSummary::from_partials(main.chi_square(), lucky.chi_square());

        info!(
            "{} tirages analysés : χ²={:.2}, score de hasard {:.1}/100",
            store.len(),
            chi_square.total,
            chi_square.randomness_score
        );

        Self {
            store,
            config,
            main,
            lucky,
            patterns,
            chi_square,
            correlations: CorrelationEngine::new(),
        }
    }

    pub fn store(&self) -> &DrawingStore {
        &self.store
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn total_drawings(&self) -> usize {
        self.store.len()
    }

    pub fn main_stats(&self) -> &NumberStatsTracker {
        &self.main
    }

    pub fn lucky_stats(&self) -> &NumberStatsTracker {
        &self.lucky
    }

    pub fn stats(&self, pool: Pool) -> &NumberStatsTracker {
        match pool {
            Pool::Main => &self.main,
            Pool::LuckyBall => &self.lucky,
        }
    }

    pub fn patterns(&self) -> &PatternDetector {
        &self.patterns
    }

    pub fn chi_square(&self) -> ChiSquareSummary {
        self.chi_square
    }

    pub fn randomness_score(&self) -> f64 {
        self.chi_square.randomness_score
    }

    pub fn top_numbers(&self, pool: Pool, count: usize, recent: bool) -> Vec<&NumberInfo> {
        self.stats(pool).top_numbers(count, recent)
    }

    /// Numéros en retard selon le multiplicateur configuré.
    pub fn overdue_numbers(&self, pool: Pool, count: usize) -> Vec<&NumberInfo> {
        self.stats(pool).overdue_numbers(count, self.config.min_gap_multiplier)
    }

    pub fn scorer(&self) -> RecommendationScorer<'_> {
        RecommendationScorer::new(
            &self.main,
            &self.lucky,
            &self.patterns,
            self.store.len(),
            self.chi_square.randomness_score,
        )
    }

    pub fn enrich_cosmic(&mut self, cancel: &CancelFlag) -> Result<EnrichSummary, EnrichError> {
        self.correlations.enrich(self.store.drawings(), cancel)
    }

    pub fn analyze_correlations(&mut self) -> &[CorrelationResult] {
        self.correlations.analyze(self.store.drawings())
    }

    pub fn correlations(&self) -> &CorrelationEngine {
        &self.correlations
    }

    /// Grille cosmique du jour donné (cache si disponible).
    pub fn cosmic_pick(&self, date: NaiveDate) -> RecommendedSet {
        let cosmic = self.correlations.snapshot(date);
        self.scorer().cosmic_set(&cosmic)
    }
}
