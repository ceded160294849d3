//! Calculs astronomiques simplifiés, fonctions pures de la date.
//!
//! Aucune éphéméride : phase lunaire par mois synodique moyen, positions
//! planétaires par période orbitale moyenne depuis J2000.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

pub const SYNODIC_MONTH: f64 = 29.53059;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// 2000-01-06T18:14:00Z
const REFERENCE_NEW_MOON_UNIX: i64 = 947_182_440;
/// 2000-01-01T12:00:00Z
const J2000_UNIX: i64 = 946_728_000;

/// Minuit UTC du jour donné.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn days_since(at: DateTime<Utc>, epoch_unix: i64) -> f64 {
    (at.timestamp() - epoch_unix) as f64 / SECONDS_PER_DAY
        + at.timestamp_subsec_nanos() as f64 / 1e9 / SECONDS_PER_DAY
}

/// Partie fractionnaire ramenée dans [0, 1).
fn fraction(x: f64) -> f64 {
    let f = x - x.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// (phase, illumination) ; phase 0 = nouvelle lune, 0.5 = pleine lune.
pub fn moon_phase(at: DateTime<Utc>) -> (f64, f64) {
    let cycles = days_since(at, REFERENCE_NEW_MOON_UNIX) / SYNODIC_MONTH;
    let phase = fraction(cycles);
    let illumination = 0.5 * (1.0 - (2.0 * PI * phase).cos());
    (phase, illumination.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoonPhaseName {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

impl MoonPhaseName {
    pub const ALL: [MoonPhaseName; 8] = [
        MoonPhaseName::NewMoon,
        MoonPhaseName::WaxingCrescent,
        MoonPhaseName::FirstQuarter,
        MoonPhaseName::WaxingGibbous,
        MoonPhaseName::FullMoon,
        MoonPhaseName::WaningGibbous,
        MoonPhaseName::LastQuarter,
        MoonPhaseName::WaningCrescent,
    ];

    /// Découpage en huitièmes centrés ; les deux extrémités donnent la nouvelle lune.
    pub fn from_phase(phase: f64) -> Self {
        match phase {
            p if p < 0.0625 => MoonPhaseName::NewMoon,
            p if p < 0.1875 => MoonPhaseName::WaxingCrescent,
            p if p < 0.3125 => MoonPhaseName::FirstQuarter,
            p if p < 0.4375 => MoonPhaseName::WaxingGibbous,
            p if p < 0.5625 => MoonPhaseName::FullMoon,
            p if p < 0.6875 => MoonPhaseName::WaningGibbous,
            p if p < 0.8125 => MoonPhaseName::LastQuarter,
            p if p < 0.9375 => MoonPhaseName::WaningCrescent,
            _ => MoonPhaseName::NewMoon,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl std::fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub fn for_date(date: NaiveDate) -> Self {
        use ZodiacSign::*;

        // (jour de changement de signe, signe avant, signe après)
        let (cusp, before, after) = match date.month() {
            1 => (20, Capricorn, Aquarius),
            2 => (19, Aquarius, Pisces),
            3 => (21, Pisces, Aries),
            4 => (20, Aries, Taurus),
            5 => (21, Taurus, Gemini),
            6 => (21, Gemini, Cancer),
            7 => (23, Cancer, Leo),
            8 => (23, Leo, Virgo),
            9 => (23, Virgo, Libra),
            10 => (23, Libra, Scorpio),
            11 => (22, Scorpio, Sagittarius),
            _ => (22, Sagittarius, Capricorn),
        };
        if date.day() < cusp {
            before
        } else {
            after
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Saisons de l'hémisphère nord.
    pub fn for_date(date: NaiveDate) -> Self {
        match (date.month(), date.day()) {
            (3, d) if d >= 20 => Season::Spring,
            (4 | 5, _) => Season::Spring,
            (6, d) if d < 21 => Season::Spring,
            (6, _) | (7 | 8, _) => Season::Summer,
            (9, d) if d < 23 => Season::Summer,
            (9, _) | (10 | 11, _) => Season::Autumn,
            (12, d) if d < 21 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Planet {
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Planet {
    pub const ALL: [Planet; 5] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
    ];

    /// Période orbitale sidérale, en jours.
    pub fn orbital_period(&self) -> f64 {
        match self {
            Planet::Mercury => 87.97,
            Planet::Venus => 224.70,
            Planet::Mars => 686.98,
            Planet::Jupiter => 4332.59,
            Planet::Saturn => 10759.22,
        }
    }

    /// Angle moyen en degrés dans [0, 360).
    pub fn angle(&self, at: DateTime<Utc>) -> f64 {
        let degrees = days_since(at, J2000_UNIX) * 360.0 / self.orbital_period();
        let angle = degrees.rem_euclid(360.0);
        if angle >= 360.0 {
            0.0
        } else {
            angle
        }
    }
}

pub fn planetary_positions(at: DateTime<Utc>) -> Vec<(Planet, f64)> {
    Planet::ALL.iter().map(|&p| (p, p.angle(at))).collect()
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_moon_phase_ranges() {
        let mut day = date(1950, 1, 1);
        let end = date(2060, 1, 1);
        while day < end {
            let (phase, illumination) = moon_phase(midnight_utc(day));
            assert!((0.0..1.0).contains(&phase), "{} -> {}", day, phase);
            assert!((0.0..=1.0).contains(&illumination), "{} -> {}", day, illumination);
            day += Duration::days(17);
        }
    }

    #[test]
    fn test_moon_phase_reference() {
        let epoch = DateTime::from_timestamp(REFERENCE_NEW_MOON_UNIX, 0).unwrap();
        let (phase, illumination) = moon_phase(epoch);
        assert!(phase < 1e-9);
        assert!(illumination < 1e-9);

        let half = epoch + Duration::seconds((SYNODIC_MONTH / 2.0 * SECONDS_PER_DAY) as i64);
        let (phase, illumination) = moon_phase(half);
        assert!((phase - 0.5).abs() < 1e-4);
        assert!(illumination > 0.999);
        assert_eq!(MoonPhaseName::from_phase(phase), MoonPhaseName::FullMoon);
    }

    #[test]
    fn test_moon_phase_name_buckets() {
        assert_eq!(MoonPhaseName::from_phase(0.0), MoonPhaseName::NewMoon);
        assert_eq!(MoonPhaseName::from_phase(0.0625), MoonPhaseName::WaxingCrescent);
        assert_eq!(MoonPhaseName::from_phase(0.25), MoonPhaseName::FirstQuarter);
        assert_eq!(MoonPhaseName::from_phase(0.4), MoonPhaseName::WaxingGibbous);
        assert_eq!(MoonPhaseName::from_phase(0.6), MoonPhaseName::WaningGibbous);
        assert_eq!(MoonPhaseName::from_phase(0.75), MoonPhaseName::LastQuarter);
        assert_eq!(MoonPhaseName::from_phase(0.9), MoonPhaseName::WaningCrescent);
        assert_eq!(MoonPhaseName::from_phase(0.9375), MoonPhaseName::NewMoon);
        assert_eq!(MoonPhaseName::from_phase(0.999), MoonPhaseName::NewMoon);
        assert_eq!(MoonPhaseName::FullMoon.to_string(), "Full Moon");
    }

    #[test]
    fn test_zodiac_known_dates() {
        assert_eq!(ZodiacSign::for_date(date(2024, 1, 15)), ZodiacSign::Capricorn);
        assert_eq!(ZodiacSign::for_date(date(2024, 6, 15)), ZodiacSign::Gemini);
        assert_eq!(ZodiacSign::for_date(date(2024, 12, 15)), ZodiacSign::Sagittarius);
    }

    #[test]
    fn test_zodiac_boundaries() {
        assert_eq!(ZodiacSign::for_date(date(2024, 1, 19)), ZodiacSign::Capricorn);
        assert_eq!(ZodiacSign::for_date(date(2024, 1, 20)), ZodiacSign::Aquarius);
        assert_eq!(ZodiacSign::for_date(date(2024, 2, 18)), ZodiacSign::Aquarius);
        assert_eq!(ZodiacSign::for_date(date(2024, 2, 19)), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::for_date(date(2024, 7, 22)), ZodiacSign::Cancer);
        assert_eq!(ZodiacSign::for_date(date(2024, 7, 23)), ZodiacSign::Leo);
        assert_eq!(ZodiacSign::for_date(date(2024, 12, 21)), ZodiacSign::Sagittarius);
        assert_eq!(ZodiacSign::for_date(date(2024, 12, 22)), ZodiacSign::Capricorn);
        assert_eq!(ZodiacSign::for_date(date(2023, 12, 31)), ZodiacSign::Capricorn);
    }

    #[test]
    fn test_zodiac_covers_every_day() {
        let mut seen = std::collections::HashSet::new();
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            seen.insert(ZodiacSign::for_date(day));
            day += Duration::days(1);
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(Season::for_date(date(2024, 3, 19)), Season::Winter);
        assert_eq!(Season::for_date(date(2024, 3, 20)), Season::Spring);
        assert_eq!(Season::for_date(date(2024, 3, 25)), Season::Spring);
        assert_eq!(Season::for_date(date(2024, 6, 20)), Season::Spring);
        assert_eq!(Season::for_date(date(2024, 6, 21)), Season::Summer);
        assert_eq!(Season::for_date(date(2024, 7, 15)), Season::Summer);
        assert_eq!(Season::for_date(date(2024, 9, 22)), Season::Summer);
        assert_eq!(Season::for_date(date(2024, 9, 23)), Season::Autumn);
        assert_eq!(Season::for_date(date(2024, 10, 15)), Season::Autumn);
        assert_eq!(Season::for_date(date(2024, 12, 20)), Season::Autumn);
        assert_eq!(Season::for_date(date(2024, 12, 21)), Season::Winter);
        assert_eq!(Season::for_date(date(2024, 1, 15)), Season::Winter);
    }

    #[test]
    fn test_planet_angles_in_range() {
        for day in [date(1900, 1, 1), date(1999, 12, 31), date(2000, 1, 1), date(2024, 1, 1), date(2150, 6, 30)] {
            for (planet, angle) in planetary_positions(midnight_utc(day)) {
                assert!((0.0..360.0).contains(&angle), "{:?} {} -> {}", planet, day, angle);
            }
        }
    }

    #[test]
    fn test_planet_angle_at_j2000() {
        let j2000 = DateTime::from_timestamp(J2000_UNIX, 0).unwrap();
        for planet in Planet::ALL {
            assert!(planet.angle(j2000).abs() < 1e-9);
        }
        let one_orbit = j2000 + Duration::seconds((87.97 * SECONDS_PER_DAY / 4.0) as i64);
        assert!((Planet::Mercury.angle(one_orbit) - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(date(2024, 1, 15).weekday()), "Monday");
        assert_eq!(weekday_name(date(2024, 1, 14).weekday()), "Sunday");
    }
}
