use chrono::NaiveDate;
use serde::Serialize;

use luckylife_db::models::Pool;

/// Statistiques complètes d'un numéro d'un pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberInfo {
    pub number: u8,
    pub total_frequency: u32,
    pub recent_frequency: u32,
    pub last_seen_index: Option<usize>,
    pub last_seen_date: Option<NaiveDate>,
    pub gaps: Vec<usize>,
    pub average_gap: f64,
    pub gap_std_dev: f64,
    pub current_gap: usize,
    pub expected_frequency: f64,
    pub chi_square_component: f64,
}

impl NumberInfo {
    fn new(number: u8) -> Self {
        Self {
            number,
            total_frequency: 0,
            recent_frequency: 0,
            last_seen_index: None,
            last_seen_date: None,
            gaps: Vec::new(),
            average_gap: 0.0,
            gap_std_dev: 0.0,
            current_gap: 0,
            expected_frequency: 0.0,
            chi_square_component: 0.0,
        }
    }

    /// Écart courant rapporté à l'écart moyen, `None` sans historique d'écarts.
    pub fn overdue_ratio(&self) -> Option<f64> {
        if self.average_gap > 0.0 {
            Some(self.current_gap as f64 / self.average_gap)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapSummary {
    pub count: usize,
    pub min: Option<usize>,
    pub max: Option<usize>,
    /// Nombre moyen d'écarts enregistrés par numéro.
    pub mean_per_number: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencySpread {
    pub expected: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub outside_two_sigma: usize,
}

/// Suivi fréquence / écarts d'un pool sur une passe unique.
#[derive(Debug, Clone)]
pub struct NumberStatsTracker {
    pool: Pool,
    recent_window: usize,
    numbers: Vec<NumberInfo>,
}

impl NumberStatsTracker {
    pub fn new(pool: Pool, recent_window: usize) -> Self {
        let numbers = (1..=pool.size() as u8).map(NumberInfo::new).collect();
        Self {
            pool,
            recent_window,
            numbers,
        }
    }

    pub fn pool(&self) -> Pool {
        self.pool
    }

    /// Les appels doivent suivre l'ordre croissant de `drawing_index`.
    pub fn record_appearance(&mut self, number: u8, drawing_index: usize, date: NaiveDate) {
        let idx = (number as usize).wrapping_sub(1);
        let Some(info) = self.numbers.get_mut(idx) else {
            return;
        };

        info.total_frequency += 1;
        if let Some(last) = info.last_seen_index {
            info.gaps.push(drawing_index - last);
        }
        info.last_seen_index = Some(drawing_index);
        info.last_seen_date = Some(date);

        if drawing_index < self.recent_window {
            info.recent_frequency += 1;
        }
    }

    pub fn finalize(&mut self, total_drawings: usize) {
        let expected = self.pool.expected_frequency(total_drawings);

        for info in &mut self.numbers {
            if info.gaps.is_empty() {
                info.average_gap = 0.0;
                info.gap_std_dev = 0.0;
            } else {
                let n = info.gaps.len() as f64;
                let mean = info.gaps.iter().sum::<usize>() as f64 / n;
                let variance = info
                    .gaps
                    .iter()
                    .map(|&g| (g as f64 - mean).powi(2))
                    .sum::<f64>()
                    / n;
                info.average_gap = mean;
                info.gap_std_dev = variance.sqrt();
            }
            info.current_gap = info.last_seen_index.unwrap_or(0);
            info.expected_frequency = expected;
        }
    }

    /// Calcule les composantes du χ² et renvoie leur somme pour ce pool.
    pub fn chi_square(&mut self) -> f64 {
        let mut total = 0.0;
        for info in &mut self.numbers {
            if info.expected_frequency > 0.0 {
                let diff = info.total_frequency as f64 - info.expected_frequency;
                info.chi_square_component = diff * diff / info.expected_frequency;
                total += info.chi_square_component;
            } else {
                info.chi_square_component = 0.0;
            }
        }
        total
    }

    pub fn get(&self, number: u8) -> Option<&NumberInfo> {
        self.numbers.get((number as usize).wrapping_sub(1))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NumberInfo> {
        self.numbers.iter()
    }

    pub fn numbers(&self) -> &[NumberInfo] {
        &self.numbers
    }

    /// Numéros les plus fréquents (historique complet ou fenêtre récente).
    pub fn top_numbers(&self, count: usize, recent: bool) -> Vec<&NumberInfo> {
        let mut sorted: Vec<&NumberInfo> = self.numbers.iter().collect();
        if recent {
            sorted.sort_by(|a, b| b.recent_frequency.cmp(&a.recent_frequency));
        } else {
            sorted.sort_by(|a, b| b.total_frequency.cmp(&a.total_frequency));
        }
        sorted.truncate(count);
        sorted
    }

    /// Numéros dont l'écart courant dépasse `multiplier` fois l'écart moyen,
    /// du plus en retard au moins en retard.
    pub fn overdue_numbers(&self, count: usize, multiplier: f64) -> Vec<&NumberInfo> {
        let mut overdue: Vec<(&NumberInfo, f64)> = self
            .numbers
            .iter()
            .filter(|info| {
                info.average_gap > 0.0 && info.current_gap as f64 > info.average_gap * multiplier
            })
            .filter_map(|info| info.overdue_ratio().map(|r| (info, r)))
            .collect();
        overdue.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        overdue.into_iter().take(count).map(|(info, _)| info).collect()
    }

    pub fn gap_summary(&self) -> GapSummary {
        let all = self.numbers.iter().flat_map(|info| info.gaps.iter().copied());
        let count = self.numbers.iter().map(|info| info.gaps.len()).sum::<usize>();
        GapSummary {
            count,
            min: all.clone().min(),
            max: all.max(),
            mean_per_number: count as f64 / self.numbers.len() as f64,
        }
    }

    /// Dispersion des fréquences totales autour de l'espérance uniforme.
    pub fn frequency_spread(&self, total_drawings: usize) -> FrequencySpread {
        let expected = self.pool.expected_frequency(total_drawings);
        let n = self.numbers.len() as f64;
        let variance = self
            .numbers
            .iter()
            .map(|info| (info.total_frequency as f64 - expected).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();
        let outside_two_sigma = self
            .numbers
            .iter()
            .filter(|info| (info.total_frequency as f64 - expected).abs() > 2.0 * std_dev)
            .count();

        FrequencySpread {
            expected,
            std_dev,
            coefficient_of_variation: if expected > 0.0 { std_dev / expected * 100.0 } else { 0.0 },
            outside_two_sigma,
        }
    }
}

/// Résultat du test du χ² sur les deux pools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareSummary {
    pub main: f64,
    pub lucky_ball: f64,
    pub total: f64,
    /// 0-100, 100 = parfaitement uniforme.
    pub randomness_score: f64,
}

impl ChiSquareSummary {
    pub fn from_partials(main: f64, lucky_ball: f64) -> Self {
        let randomness_score = (randomness_percent(main, Pool::Main)
            + randomness_percent(lucky_ball, Pool::LuckyBall))
            / 2.0;
        Self {
            main,
            lucky_ball,
            total: main + lucky_ball,
            randomness_score,
        }
    }
}

impl Default for ChiSquareSummary {
    fn default() -> Self {
        Self::from_partials(0.0, 0.0)
    }
}

pub fn randomness_percent(partial: f64, pool: Pool) -> f64 {
    let ratio = partial / pool.chi_square_critical();
    if ratio.is_nan() {
        return 0.0;
    }
    (100.0 * (1.0 - ratio.min(1.0))).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckylife_db::store::{make_test_drawings, sample_drawings};

    fn run(pool: Pool, window: usize) -> NumberStatsTracker {
        let store = sample_drawings();
        let mut tracker = NumberStatsTracker::new(pool, window);
        for d in &store {
            for &n in pool.numbers_from(d) {
                tracker.record_appearance(n, d.index, d.date);
            }
        }
        tracker.finalize(store.len());
        tracker
    }

    #[test]
    fn test_reference_frequencies() {
        let main = run(Pool::Main, 3);
        assert_eq!(main.get(23).unwrap().total_frequency, 3);
        assert_eq!(main.get(5).unwrap().total_frequency, 2);
        assert_eq!(main.get(1).unwrap().total_frequency, 0);

        let lucky = run(Pool::LuckyBall, 3);
        assert_eq!(lucky.get(7).unwrap().total_frequency, 2);
    }

    #[test]
    fn test_recent_window() {
        let main = run(Pool::Main, 3);
        assert_eq!(main.get(23).unwrap().recent_frequency, 2);
        assert_eq!(main.get(2).unwrap().recent_frequency, 1);
        assert_eq!(main.get(45).unwrap().recent_frequency, 0);
    }

    #[test]
    fn test_gaps_and_current_gap() {
        let main = run(Pool::Main, 50);
        let five = main.get(5).unwrap();
        assert_eq!(five.gaps, vec![2]);
        assert_eq!(five.current_gap, 4);
        assert!((five.average_gap - 2.0).abs() < 1e-10);
        assert_eq!(five.gap_std_dev, 0.0);

        let twenty_three = main.get(23).unwrap();
        assert_eq!(twenty_three.gaps, vec![2, 2]);
        assert_eq!(twenty_three.last_seen_date, NaiveDate::from_ymd_opt(2024, 1, 15));

        let never = main.get(1).unwrap();
        assert!(never.gaps.is_empty());
        assert_eq!(never.average_gap, 0.0);
        assert_eq!(never.last_seen_index, None);
        assert_eq!(never.overdue_ratio(), None);
    }

    #[test]
    fn test_population_std_dev() {
        let mut tracker = NumberStatsTracker::new(Pool::Main, 50);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for idx in [0, 1, 4, 5] {
            tracker.record_appearance(9, idx, date);
        }
        tracker.finalize(6);
        let info = tracker.get(9).unwrap();
        // écarts [1, 3, 1] : moyenne 5/3, variance 8/9
        assert!((info.average_gap - 5.0 / 3.0).abs() < 1e-10);
        assert!((info.gap_std_dev - (8.0f64 / 9.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_expected_frequency() {
        let main = run(Pool::Main, 50);
        let lucky = run(Pool::LuckyBall, 50);
        assert!((main.get(10).unwrap().expected_frequency - 5.0 * 5.0 / 48.0).abs() < 1e-10);
        assert!((lucky.get(10).unwrap().expected_frequency - 5.0 / 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_pool_ignored() {
        let mut tracker = NumberStatsTracker::new(Pool::LuckyBall, 50);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        tracker.record_appearance(0, 0, date);
        tracker.record_appearance(19, 0, date);
        assert!(tracker.iter().all(|info| info.total_frequency == 0));
    }

    #[test]
    fn test_chi_square_zero_drawings() {
        let mut main = NumberStatsTracker::new(Pool::Main, 50);
        let mut lucky = NumberStatsTracker::new(Pool::LuckyBall, 50);
        main.finalize(0);
        lucky.finalize(0);
        let summary = ChiSquareSummary::from_partials(main.chi_square(), lucky.chi_square());
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.randomness_score, 100.0);
    }

    #[test]
    fn test_chi_square_reference() {
        let mut main = run(Pool::Main, 50);
        let chi = main.chi_square();
        assert!(chi > 0.0);
        let sum: f64 = main.iter().map(|i| i.chi_square_component).sum();
        assert!((sum - chi).abs() < 1e-9);
    }

    #[test]
    fn test_randomness_percent_clamped() {
        assert_eq!(randomness_percent(0.0, Pool::Main), 100.0);
        assert_eq!(randomness_percent(1e9, Pool::Main), 0.0);
        assert_eq!(randomness_percent(f64::INFINITY, Pool::LuckyBall), 0.0);
        assert_eq!(randomness_percent(f64::NAN, Pool::LuckyBall), 0.0);
        let half = randomness_percent(Pool::Main.chi_square_critical() / 2.0, Pool::Main);
        assert!((half - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_numbers_sorted() {
        let main = run(Pool::Main, 3);
        let top = main.top_numbers(5, false);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].number, 23);
        for pair in top.windows(2) {
            assert!(pair[0].total_frequency >= pair[1].total_frequency);
        }
        let recent = main.top_numbers(100, true);
        assert_eq!(recent.len(), 48);
        for pair in recent.windows(2) {
            assert!(pair[0].recent_frequency >= pair[1].recent_frequency);
        }
    }

    #[test]
    fn test_overdue_sorted_by_ratio() {
        let store = make_test_drawings(300, 7);
        let mut main = NumberStatsTracker::new(Pool::Main, 50);
        for d in &store {
            for &n in &d.numbers {
                main.record_appearance(n, d.index, d.date);
            }
        }
        main.finalize(store.len());
        let overdue = main.overdue_numbers(48, 1.5);
        for info in &overdue {
            assert!(info.current_gap as f64 > info.average_gap * 1.5);
        }
        for pair in overdue.windows(2) {
            assert!(pair[0].overdue_ratio().unwrap() >= pair[1].overdue_ratio().unwrap());
        }
    }

    #[test]
    fn test_gap_summary_and_spread() {
        let main = run(Pool::Main, 50);
        let gaps = main.gap_summary();
        // 23 : deux écarts, 5, 12 et 34 : un écart chacun
        assert_eq!(gaps.count, 5);
        assert_eq!(gaps.min, Some(2));
        assert_eq!(gaps.max, Some(4));

        let spread = main.frequency_spread(5);
        assert!((spread.expected - 25.0 / 48.0).abs() < 1e-10);
        assert!(spread.std_dev > 0.0);

        let empty = NumberStatsTracker::new(Pool::Main, 50);
        assert_eq!(empty.gap_summary().min, None);
        assert_eq!(empty.frequency_spread(0).coefficient_of_variation, 0.0);
    }
}
