//! Données solaires et météo de démonstration.
//!
//! Ce ne sont pas des mesures : chaque valeur est une sinusoïde de l'horodatage
//! Unix, donc la même date donne toujours les mêmes valeurs.

use std::f64::consts::PI;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarData {
    /// km/s
    pub solar_wind_speed: f64,
    /// particules/cm³
    pub solar_wind_density: f64,
    /// nT
    pub bz_component: f64,
    pub proton_flux: f64,
    pub electron_flux: f64,
    /// unités de flux solaire
    pub f107_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherData {
    /// °C
    pub temperature: f64,
    /// hPa
    pub pressure: f64,
    /// %
    pub humidity: f64,
    /// m/s
    pub wind_speed: f64,
    /// mm
    pub precipitation: f64,
    /// %
    pub cloud_cover: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherCondition::Clear => write!(f, "clear"),
            WeatherCondition::Cloudy => write!(f, "cloudy"),
            WeatherCondition::Rain => write!(f, "rain"),
        }
    }
}

fn wave(timestamp: i64, period_seconds: f64) -> f64 {
    (timestamp as f64 / period_seconds).sin()
}

pub fn solar_activity(timestamp: i64) -> SolarData {
    let t = timestamp as f64;
    SolarData {
        solar_wind_speed: 350.0 + wave(timestamp, 86_400.0) * 50.0,
        solar_wind_density: 5.0 + (t / 86_400.0).cos() * 2.0,
        bz_component: -2.0 + wave(timestamp, 172_800.0) * 5.0,
        proton_flux: 0.1 + wave(timestamp, 259_200.0).abs() * 10.0,
        electron_flux: 1000.0 + wave(timestamp, 345_600.0) * 500.0,
        f107_index: 70.0 + wave(timestamp, 432_000.0) * 30.0,
    }
}

/// `day_of_year` commence à 1.
pub fn weather(timestamp: i64, day_of_year: u32) -> WeatherData {
    let seasonal = (2.0 * PI * day_of_year as f64 / 365.0).sin();
    let precipitation = (wave(timestamp, 259_200.0) * 10.0).max(0.0);
    let cloud_cover = 50.0 + wave(timestamp, 172_800.0) * 40.0;

    let condition = if precipitation > 2.0 {
        WeatherCondition::Rain
    } else if cloud_cover > 70.0 {
        WeatherCondition::Cloudy
    } else {
        WeatherCondition::Clear
    };

    WeatherData {
        temperature: 15.0 + 10.0 * seasonal + wave(timestamp, 86_400.0) * 5.0,
        pressure: 1013.0 + wave(timestamp, 172_800.0) * 10.0,
        humidity: 60.0 + wave(timestamp, 86_400.0) * 20.0,
        wind_speed: 5.0 + wave(timestamp, 86_400.0).abs() * 10.0,
        precipitation,
        cloud_cover,
        condition,
    }
}

/// Indice Kp simulé, dans [2, 7].
pub fn geomagnetic_index(timestamp: i64) -> f64 {
    2.0 + wave(timestamp, 432_000.0).abs() * 5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let ts = 1_704_240_000; // 2024-01-03
        assert_eq!(solar_activity(ts), solar_activity(ts));
        assert_eq!(weather(ts, 3), weather(ts, 3));
        assert_eq!(geomagnetic_index(ts), geomagnetic_index(ts));
    }

    #[test]
    fn test_value_envelopes() {
        for day in 0..2000i64 {
            let ts = 946_684_800 + day * 86_400;
            let solar = solar_activity(ts);
            assert!((300.0..=400.0).contains(&solar.solar_wind_speed));
            assert!((40.0..=100.0).contains(&solar.f107_index));
            assert!(solar.proton_flux >= 0.1);

            let w = weather(ts, (day % 365) as u32 + 1);
            assert!((-0.001..=30.001).contains(&w.temperature), "{}", w.temperature);
            assert!(w.precipitation >= 0.0);
            assert!((10.0..=90.0).contains(&w.cloud_cover));

            let kp = geomagnetic_index(ts);
            assert!((2.0..=7.0).contains(&kp));
        }
    }

    #[test]
    fn test_zero_timestamp() {
        let solar = solar_activity(0);
        assert!((solar.solar_wind_speed - 350.0).abs() < 1e-12);
        assert!((solar.solar_wind_density - 7.0).abs() < 1e-12);
        let w = weather(0, 1);
        assert_eq!(w.precipitation, 0.0);
        assert_eq!(w.condition, WeatherCondition::Clear);
    }
}
