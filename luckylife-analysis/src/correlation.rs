use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use luckylife_db::models::Drawing;

use crate::astro::{weekday_name, MoonPhaseName, Season};
use crate::cancel::CancelFlag;
use crate::cosmic::CosmicData;

/// Nombre minimal d'occurrences pour rapporter un « numéro chanceux » temporel.
pub const LUCKY_NUMBER_MIN_COUNT: usize = 10;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("enrichissement interrompu ({cached} dates en cache conservées)")]
    Aborted { cached: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    pub years: usize,
    pub computed: usize,
    pub cached: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Factor {
    #[serde(rename = "Moon Phase")]
    MoonPhase,
    #[serde(rename = "Solar Activity")]
    SolarActivity,
    Weather,
    Temporal,
    Planetary,
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Factor::MoonPhase => write!(f, "Moon Phase"),
            Factor::SolarActivity => write!(f, "Solar Activity"),
            Factor::Weather => write!(f, "Weather"),
            Factor::Temporal => write!(f, "Temporal"),
            Factor::Planetary => write!(f, "Planetary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    High,
    Moderate,
    Low,
    None,
}

impl Significance {
    pub fn from_p_value(p_value: f64) -> Self {
        match p_value {
            p if p < 0.01 => Significance::High,
            p if p < 0.05 => Significance::Moderate,
            p if p < 0.1 => Significance::Low,
            _ => Significance::None,
        }
    }
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::High => write!(f, "High"),
            Significance::Moderate => write!(f, "Moderate"),
            Significance::Low => write!(f, "Low"),
            Significance::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub factor: Factor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_factor: Option<String>,
    pub correlation: f64,
    pub p_value: f64,
    pub sample_size: usize,
    pub significance: Significance,
    pub interpretation: String,
}

/// Corrélation de Pearson et p-value simplifiée.
///
/// Renvoie `(0, 1)` pour des séries vides, de longueurs différentes, constantes
/// ou produisant un résultat non fini. La p-value `1 - |t| / (|t| + 10)` n'est
/// pas celle de Student ; les seuils de significativité sont calibrés dessus.
pub fn pearson(x: &[f64], y: &[f64]) -> (f64, f64) {
    if x.len() != y.len() || x.is_empty() {
        return (0.0, 1.0);
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return (0.0, 1.0);
    }

    let r = num / (denom_x * denom_y).sqrt();
    if !r.is_finite() {
        return (0.0, 1.0);
    }
    let r = r.clamp(-1.0, 1.0);

    let residual = 1.0 - r * r;
    let p_value = if n <= 2.0 {
        1.0
    } else if residual <= 0.0 {
        0.0
    } else {
        let t = (r * ((n - 2.0) / residual).sqrt()).abs();
        1.0 - t / (t + 10.0)
    };

    (r, p_value)
}

fn is_significant(correlation: f64, p_value: f64) -> bool {
    correlation.is_finite() && p_value.is_finite() && p_value <= 0.1
}

pub fn interpret_moon(correlation: f64, p_value: f64) -> String {
    if !is_significant(correlation, p_value) {
        return "Aucune corrélation significative entre la phase lunaire et les numéros tirés".into();
    }
    if correlation > 0.0 {
        format!("Légère corrélation positive (r={:.3}) : numéros plus élevés en lune croissante", correlation)
    } else {
        format!("Légère corrélation négative (r={:.3}) : numéros plus bas en lune croissante", correlation)
    }
}

pub fn interpret_solar(correlation: f64, p_value: f64) -> String {
    if !is_significant(correlation, p_value) {
        return "L'activité solaire n'a aucun effet significatif sur les numéros tirés".into();
    }
    format!(
        "Corrélation détectée (r={:.3}) : le vent solaire accompagnerait la fréquence des numéros élevés",
        correlation
    )
}

pub fn interpret_weather(correlation: f64, p_value: f64) -> String {
    if !is_significant(correlation, p_value) {
        return "La météo ne montre aucune corrélation avec la parité des numéros".into();
    }
    format!(
        "Corrélation météo (r={:.3}) : la température suivrait légèrement la part de numéros pairs",
        correlation
    )
}

/// Numéro le plus fréquent d'un groupe (le plus petit en cas d'égalité) et son nombre d'occurrences.
fn lucky_number(numbers: &[u8]) -> Option<(u8, usize)> {
    let mut counts = [0usize; 49];
    for &n in numbers {
        if let Some(c) = counts.get_mut(n as usize) {
            *c += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, &c)| c > 0)
        .fold(None, |best: Option<(u8, usize)>, (n, &c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((n as u8, c)),
        })
}

/// Enrichissement cosmique des dates de tirage et tests de corrélation.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    cosmic: BTreeMap<NaiveDate, CosmicData>,
    results: Vec<CorrelationResult>,
}

impl CorrelationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calcule les données cosmiques de chaque jour de chaque année touchée par un tirage.
    ///
    /// Les dates déjà en cache sont réutilisées. En cas d'annulation, les dates
    /// calculées jusque-là restent en cache et `EnrichError::Aborted` est renvoyé.
    pub fn enrich(&mut self, drawings: &[Drawing], cancel: &CancelFlag) -> Result<EnrichSummary, EnrichError> {
        let years: BTreeSet<i32> = drawings.iter().map(|d| d.date.year()).collect();
        let mut computed = 0;

        for &year in &years {
            if cancel.is_cancelled() {
                warn!("Enrichissement annulé avant l'année {}", year);
                return Err(EnrichError::Aborted { cached: self.cosmic.len() });
            }

            let Some(first) = NaiveDate::from_yo_opt(year, 1) else {
                continue;
            };
            let days: Vec<NaiveDate> = first
                .iter_days()
                .take_while(|d| d.year() == year)
                .filter(|d| !self.cosmic.contains_key(d))
                .collect();

            let records: Vec<Option<CosmicData>> = days
                .par_iter()
                .map(|&day| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(CosmicData::compute(day))
                    }
                })
                .collect();

            let expected = records.len();
            let mut inserted = 0;
            for record in records.into_iter().flatten() {
                self.cosmic.insert(record.date, record);
                inserted += 1;
            }
            computed += inserted;
            debug!("Année {} : {} dates calculées", year, inserted);

            if inserted < expected {
                warn!("Enrichissement annulé pendant l'année {} ({}/{} dates)", year, inserted, expected);
                return Err(EnrichError::Aborted { cached: self.cosmic.len() });
            }
        }

        info!(
            "Données cosmiques : {} années, {} dates calculées, {} en cache",
            years.len(),
            computed,
            self.cosmic.len()
        );
        Ok(EnrichSummary {
            years: years.len(),
            computed,
            cached: self.cosmic.len(),
        })
    }

    pub fn cosmic_data(&self) -> &BTreeMap<NaiveDate, CosmicData> {
        &self.cosmic
    }

    pub fn cosmic_for(&self, date: NaiveDate) -> Option<&CosmicData> {
        self.cosmic.get(&date)
    }

    /// Données du cache, ou calculées à la volée sans modifier le cache.
    pub fn snapshot(&self, date: NaiveDate) -> CosmicData {
        self.cosmic
            .get(&date)
            .cloned()
            .unwrap_or_else(|| CosmicData::compute(date))
    }

    pub fn results(&self) -> &[CorrelationResult] {
        &self.results
    }

    /// Remplace les résultats par une nouvelle série d'analyses.
    pub fn analyze(&mut self, drawings: &[Drawing]) -> &[CorrelationResult] {
        let enriched: Vec<(&Drawing, &CosmicData)> = drawings
            .iter()
            .filter_map(|d| self.cosmic.get(&d.date).map(|c| (d, c)))
            .collect();

        let mut results = Vec::new();
        results.push(moon_phase_correlation(&enriched));
        results.extend(moon_phase_lucky_numbers(&enriched));
        results.push(solar_correlation(&enriched));
        results.push(weather_correlation(&enriched));
        results.extend(temporal_lucky_numbers(&enriched));
        results.extend(mercury_retrograde(&enriched));

        info!("{} analyses de corrélation sur {} tirages", results.len(), enriched.len());
        self.results = results;
        &self.results
    }
}

fn moon_phase_correlation(enriched: &[(&Drawing, &CosmicData)]) -> CorrelationResult {
    let phases: Vec<f64> = enriched.iter().map(|(_, c)| c.moon_phase).collect();
    let averages: Vec<f64> = enriched.iter().map(|(d, _)| d.average()).collect();
    let (correlation, p_value) = pearson(&phases, &averages);

    CorrelationResult {
        factor: Factor::MoonPhase,
        sub_factor: Some("Average Number Value".into()),
        correlation,
        p_value,
        sample_size: phases.len(),
        significance: Significance::from_p_value(p_value),
        interpretation: interpret_moon(correlation, p_value),
    }
}

fn moon_phase_lucky_numbers(enriched: &[(&Drawing, &CosmicData)]) -> Vec<CorrelationResult> {
    let mut groups: BTreeMap<MoonPhaseName, Vec<u8>> = BTreeMap::new();
    for (drawing, cosmic) in enriched {
        groups
            .entry(cosmic.moon_phase_name)
            .or_default()
            .extend_from_slice(&drawing.numbers);
    }

    MoonPhaseName::ALL
        .iter()
        .filter_map(|phase| {
            let numbers = groups.get(phase)?;
            let (number, count) = lucky_number(numbers)?;
            let ratio = count as f64 / numbers.len() as f64;
            Some(CorrelationResult {
                factor: Factor::MoonPhase,
                sub_factor: Some(format!("{} Lucky Numbers", phase)),
                correlation: ratio,
                p_value: 0.05,
                sample_size: numbers.len(),
                significance: Significance::Moderate,
                interpretation: format!(
                    "Le numéro {} représente {:.1} % des numéros tirés en {}",
                    number,
                    ratio * 100.0,
                    phase
                ),
            })
        })
        .collect()
}

fn solar_correlation(enriched: &[(&Drawing, &CosmicData)]) -> CorrelationResult {
    let speeds: Vec<f64> = enriched.iter().map(|(_, c)| c.solar_activity.solar_wind_speed).collect();
    let highs: Vec<f64> = enriched.iter().map(|(d, _)| d.high_count() as f64).collect();
    let (correlation, p_value) = pearson(&speeds, &highs);

    CorrelationResult {
        factor: Factor::SolarActivity,
        sub_factor: Some("Solar Wind vs High Numbers".into()),
        correlation,
        p_value,
        sample_size: speeds.len(),
        significance: Significance::from_p_value(p_value),
        interpretation: interpret_solar(correlation, p_value),
    }
}

fn weather_correlation(enriched: &[(&Drawing, &CosmicData)]) -> CorrelationResult {
    let temperatures: Vec<f64> = enriched.iter().map(|(_, c)| c.weather.temperature).collect();
    let even_ratios: Vec<f64> = enriched
        .iter()
        .map(|(d, _)| d.even_count() as f64 / d.numbers.len() as f64)
        .collect();
    let (correlation, p_value) = pearson(&temperatures, &even_ratios);

    CorrelationResult {
        factor: Factor::Weather,
        sub_factor: Some("Temperature vs Even/Odd Ratio".into()),
        correlation,
        p_value,
        sample_size: temperatures.len(),
        significance: Significance::from_p_value(p_value),
        interpretation: interpret_weather(correlation, p_value),
    }
}

fn temporal_lucky_numbers(enriched: &[(&Drawing, &CosmicData)]) -> Vec<CorrelationResult> {
    let mut by_day: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
    let mut by_season: BTreeMap<Season, Vec<u8>> = BTreeMap::new();
    for (drawing, cosmic) in enriched {
        by_day.entry(cosmic.day_of_week).or_default().extend_from_slice(&drawing.numbers);
        by_season
            .entry(cosmic.seasonal_phase)
            .or_default()
            .extend_from_slice(&drawing.numbers);
    }

    let days = WEEKDAYS.iter().filter_map(|&weekday| {
        let day = weekday_name(weekday);
        by_day.get(day).map(|n| (day.to_string(), n))
    });
    let seasons = Season::ALL
        .iter()
        .filter_map(|season| by_season.get(season).map(|n| (season.to_string(), n)));

    days.chain(seasons)
        .filter_map(|(label, numbers)| {
            let (number, count) = lucky_number(numbers)?;
            if count <= LUCKY_NUMBER_MIN_COUNT {
                return None;
            }
            Some(CorrelationResult {
                factor: Factor::Temporal,
                sub_factor: Some(format!("{} Lucky Number", label)),
                correlation: count as f64 / numbers.len() as f64,
                p_value: 0.1,
                sample_size: numbers.len(),
                significance: Significance::Low,
                interpretation: format!("Le numéro {} sort {} fois ({})", number, count, label),
            })
        })
        .collect()
}

fn mercury_retrograde(enriched: &[(&Drawing, &CosmicData)]) -> Option<CorrelationResult> {
    let (retrograde, normal): (Vec<_>, Vec<_>) = enriched
        .iter()
        .partition(|(_, cosmic)| cosmic.is_mercury_retrograde());

    if retrograde.is_empty() || normal.is_empty() {
        return None;
    }

    let mean_high = |group: &[&(&Drawing, &CosmicData)]| {
        group.iter().map(|(d, _)| d.high_count() as f64).sum::<f64>() / group.len() as f64
    };
    let retrograde_avg = mean_high(retrograde.as_slice());
    let normal_avg = mean_high(normal.as_slice());

    Some(CorrelationResult {
        factor: Factor::Planetary,
        sub_factor: Some("Mercury Retrograde Effect".into()),
        // écart de part de numéros > 30, ramené dans [-1, 1]
        correlation: (retrograde_avg - normal_avg) / 5.0,
        p_value: 0.15,
        sample_size: retrograde.len() + normal.len(),
        significance: Significance::Low,
        interpretation: format!(
            "Numéros élevés en moyenne : rétrograde={:.2}, normal={:.2}",
            retrograde_avg, normal_avg
        ),
    })
}
