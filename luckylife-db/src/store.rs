use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Drawing;

/// Séquence ordonnée et immuable des tirages historiques.
///
/// L'ordre de la séquence est celui de l'analyse : `drawings[i].index == i`.
#[derive(Debug, Clone, Default)]
pub struct DrawingStore {
    drawings: Vec<Drawing>,
}

impl DrawingStore {
    /// Construit le store en réattribuant les indices dans l'ordre fourni.
    pub fn new(mut drawings: Vec<Drawing>) -> Self {
        for (i, drawing) in drawings.iter_mut().enumerate() {
            drawing.index = i;
        }
        Self { drawings }
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Drawing> {
        self.drawings.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Drawing> {
        self.drawings.get(index)
    }

    /// (plus ancienne, plus récente) date de la séquence.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.drawings.iter().map(|d| d.date).min()?;
        let max = self.drawings.iter().map(|d| d.date).max()?;
        Some((min, max))
    }

    /// Années calendaires couvertes par au moins un tirage.
    pub fn years(&self) -> BTreeSet<i32> {
        self.drawings.iter().map(|d| d.date.year()).collect()
    }
}

impl<'a> IntoIterator for &'a DrawingStore {
    type Item = &'a Drawing;
    type IntoIter = std::slice::Iter<'a, Drawing>;

    fn into_iter(self) -> Self::IntoIter {
        self.drawings.iter()
    }
}

/// Jeu de référence : cinq tirages de janvier 2024, du plus ancien (index 0)
/// au plus récent (index 4).
pub fn sample_drawings() -> DrawingStore {
    let rows: [(u32, [u8; 5], u8); 5] = [
        (3, [2, 11, 23, 34, 41], 3),
        (6, [7, 12, 25, 33, 48], 15),
        (9, [5, 18, 23, 35, 42], 7),
        (12, [3, 15, 22, 38, 44], 12),
        (15, [5, 12, 23, 34, 45], 7),
    ];
    let drawings = rows
        .iter()
        .filter_map(|&(day, numbers, lucky_ball)| {
            NaiveDate::from_ymd_opt(2024, 1, day).map(|date| Drawing {
                date,
                numbers,
                lucky_ball,
                index: 0,
            })
        })
        .collect();
    DrawingStore::new(drawings)
}

/// Génère `n` tirages valides, un tous les trois jours à partir du 01/01/2019.
pub fn make_test_drawings(n: usize, seed: u64) -> DrawingStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default();

    let drawings = (0..n)
        .map(|i| {
            let mut numbers = [0u8; 5];
            for (slot, idx) in rand::seq::index::sample(&mut rng, 48, 5).into_iter().enumerate() {
                numbers[slot] = idx as u8 + 1;
            }
            Drawing {
                date: start + Duration::days(3 * i as i64),
                numbers,
                lucky_ball: rng.random_range(1..=18),
                index: 0,
            }
        })
        .collect();
    DrawingStore::new(drawings)
}
