use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::astro::{self, MoonPhaseName, Planet, Season, ZodiacSign};
use crate::environment::{self, SolarData, WeatherData};

/// Données astronomiques et environnementales d'une date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CosmicData {
    pub date: NaiveDate,
    pub moon_phase: f64,
    pub moon_illumination: f64,
    pub moon_phase_name: MoonPhaseName,
    pub zodiac_sign: ZodiacSign,
    pub seasonal_phase: Season,
    pub day_of_week: &'static str,
    pub planetary_positions: BTreeMap<Planet, f64>,
    pub solar_activity: SolarData,
    pub weather: WeatherData,
    pub geomagnetic_index: f64,
}

impl CosmicData {
    /// Fonction pure de la date (évaluée à minuit UTC).
    pub fn compute(date: NaiveDate) -> Self {
        let at = astro::midnight_utc(date);
        let timestamp = at.timestamp();
        let (moon_phase, moon_illumination) = astro::moon_phase(at);

        Self {
            date,
            moon_phase,
            moon_illumination,
            moon_phase_name: MoonPhaseName::from_phase(moon_phase),
            zodiac_sign: ZodiacSign::for_date(date),
            seasonal_phase: Season::for_date(date),
            day_of_week: astro::weekday_name(date.weekday()),
            planetary_positions: astro::planetary_positions(at).into_iter().collect(),
            solar_activity: environment::solar_activity(timestamp),
            weather: environment::weather(timestamp, date.ordinal()),
            geomagnetic_index: environment::geomagnetic_index(timestamp),
        }
    }

    pub fn planet(&self, planet: Planet) -> f64 {
        self.planetary_positions.get(&planet).copied().unwrap_or(0.0)
    }

    /// Heuristique grossière : `floor(mercure) mod 120 < 20`.
    pub fn is_mercury_retrograde(&self) -> bool {
        (self.planet(Planet::Mercury).floor() as i64).rem_euclid(120) < 20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_idempotent() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(CosmicData::compute(date), CosmicData::compute(date));
    }

    #[test]
    fn test_compute_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let cosmic = CosmicData::compute(date);
        assert_eq!(cosmic.zodiac_sign, ZodiacSign::Capricorn);
        assert_eq!(cosmic.seasonal_phase, Season::Winter);
        assert_eq!(cosmic.day_of_week, "Monday");
        assert_eq!(cosmic.planetary_positions.len(), 5);
        assert!((0.0..1.0).contains(&cosmic.moon_phase));
        assert!(cosmic.geomagnetic_index >= 0.0);
    }

    #[test]
    fn test_serializes_with_names() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 23).unwrap();
        let json = serde_json::to_string(&CosmicData::compute(date)).unwrap();
        assert!(json.contains("\"zodiac_sign\":\"Leo\""));
        assert!(json.contains("\"Mercury\""));
        assert!(json.contains("\"seasonal_phase\":\"Summer\""));
    }
}
