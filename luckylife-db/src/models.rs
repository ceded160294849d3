use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub date: NaiveDate,
    pub numbers: [u8; 5],
    pub lucky_ball: u8,
    /// Position dans la séquence du `DrawingStore`.
    pub index: usize,
}

impl Drawing {
    pub fn sorted_numbers(&self) -> [u8; 5] {
        let mut sorted = self.numbers;
        sorted.sort_unstable();
        sorted
    }

    /// Nombre de numéros principaux strictement supérieurs à 30.
    pub fn high_count(&self) -> usize {
        self.numbers.iter().filter(|&&n| n > 30).count()
    }

    pub fn even_count(&self) -> usize {
        self.numbers.iter().filter(|&&n| n % 2 == 0).count()
    }

    pub fn average(&self) -> f64 {
        self.numbers.iter().map(|&n| n as f64).sum::<f64>() / self.numbers.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    Main,
    LuckyBall,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Main => 48,
            Pool::LuckyBall => 18,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Pool::Main => 5,
            Pool::LuckyBall => 1,
        }
    }

    pub fn numbers_from<'a>(&self, drawing: &'a Drawing) -> &'a [u8] {
        match self {
            Pool::Main => &drawing.numbers,
            Pool::LuckyBall => std::slice::from_ref(&drawing.lucky_ball),
        }
    }

    /// Fréquence attendue d'un numéro sous une loi uniforme.
    pub fn expected_frequency(&self, total_drawings: usize) -> f64 {
        total_drawings as f64 * self.pick_count() as f64 / self.size() as f64
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.size() - 1
    }

    /// Valeur critique du χ² à 95 % pour `degrees_of_freedom()`.
    pub fn chi_square_critical(&self) -> f64 {
        match self {
            Pool::Main => 64.001,
            Pool::LuckyBall => 27.587,
        }
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Main => write!(f, "Numéros (1-48)"),
            Pool::LuckyBall => write!(f, "Lucky Ball (1-18)"),
        }
    }
}

pub fn validate_drawing(numbers: &[u8; 5], lucky_ball: u8) -> Result<()> {
    for &n in numbers {
        if !(1..=48).contains(&n) {
            bail!("Numéro {} hors limites (1-48)", n);
        }
    }
    if !(1..=18).contains(&lucky_ball) {
        bail!("Lucky Ball {} hors limites (1-18)", lucky_ball);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}
