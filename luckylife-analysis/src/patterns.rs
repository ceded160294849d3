use std::collections::BTreeMap;

use serde::Serialize;

use luckylife_db::models::Drawing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationPattern {
    pub numbers: Vec<u8>,
    pub frequency: u32,
    pub last_seen: usize,
}

impl CombinationPattern {
    /// Clé lisible, ex. `5-23`.
    pub fn label(&self) -> String {
        self.numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternStats {
    pub odd_even: BTreeMap<String, u32>,
    pub sum_ranges: BTreeMap<u32, u32>,
    pub consecutive_count: u32,
    pub decades: BTreeMap<u8, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    pairs: BTreeMap<[u8; 2], CombinationPattern>,
    triples: BTreeMap<[u8; 3], CombinationPattern>,
    quads: BTreeMap<[u8; 4], CombinationPattern>,
    stats: PatternStats,
}

fn bump<const N: usize>(
    map: &mut BTreeMap<[u8; N], CombinationPattern>,
    key: [u8; N],
    drawing_index: usize,
) {
    let pattern = map.entry(key).or_insert_with(|| CombinationPattern {
        numbers: key.to_vec(),
        frequency: 0,
        last_seen: drawing_index,
    });
    pattern.frequency += 1;
    pattern.last_seen = drawing_index;
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre toutes les paires, triplets et quadruplets du tirage.
    pub fn record_combinations(&mut self, numbers: &[u8; 5], drawing_index: usize) {
        let mut s = *numbers;
        s.sort_unstable();
        let len = s.len();

        for i in 0..len - 1 {
            for j in (i + 1)..len {
                bump(&mut self.pairs, [s[i], s[j]], drawing_index);
            }
        }

        for i in 0..len - 2 {
            for j in (i + 1)..len - 1 {
                for k in (j + 1)..len {
                    bump(&mut self.triples, [s[i], s[j], s[k]], drawing_index);
                }
            }
        }

        for i in 0..len - 3 {
            for j in (i + 1)..len - 2 {
                for k in (j + 1)..len - 1 {
                    for l in (k + 1)..len {
                        bump(&mut self.quads, [s[i], s[j], s[k], s[l]], drawing_index);
                    }
                }
            }
        }
    }

    pub fn record_patterns(&mut self, drawing: &Drawing) {
        let sorted = drawing.sorted_numbers();
        let mut odd = 0;
        let mut even = 0;
        let mut sum = 0u32;
        let mut has_consecutive = false;

        for (i, &n) in sorted.iter().enumerate() {
            sum += n as u32;
            if n % 2 == 1 {
                odd += 1;
            } else {
                even += 1;
            }
            *self.stats.decades.entry((n.saturating_sub(1)) / 10).or_insert(0) += 1;
            if i > 0 && sorted[i] - sorted[i - 1] == 1 {
                has_consecutive = true;
            }
        }

        *self
            .stats
            .odd_even
            .entry(format!("{}O-{}E", odd, even))
            .or_insert(0) += 1;
        *self.stats.sum_ranges.entry(sum / 20 * 20).or_insert(0) += 1;

        // une fois par tirage, quel que soit le nombre de paires adjacentes
        if has_consecutive {
            self.stats.consecutive_count += 1;
        }
    }

    pub fn stats(&self) -> &PatternStats {
        &self.stats
    }

    pub fn pairs(&self) -> impl Iterator<Item = &CombinationPattern> {
        self.pairs.values()
    }

    pub fn triples(&self) -> impl Iterator<Item = &CombinationPattern> {
        self.triples.values()
    }

    pub fn quads(&self) -> impl Iterator<Item = &CombinationPattern> {
        self.quads.values()
    }

    pub fn pair(&self, a: u8, b: u8) -> Option<&CombinationPattern> {
        self.pairs.get(&[a.min(b), a.max(b)])
    }

    /// Somme des fréquences des paires contenant `number`.
    pub fn pair_weight(&self, number: u8) -> u32 {
        self.pairs
            .values()
            .filter(|p| p.contains(number))
            .map(|p| p.frequency)
            .sum()
    }

    pub fn top_pairs(&self, count: usize) -> Vec<&CombinationPattern> {
        top_of(self.pairs.values(), count)
    }

    pub fn top_triples(&self, count: usize) -> Vec<&CombinationPattern> {
        top_of(self.triples.values(), count)
    }
}

fn top_of<'a>(
    patterns: impl Iterator<Item = &'a CombinationPattern>,
    count: usize,
) -> Vec<&'a CombinationPattern> {
    let mut sorted: Vec<&CombinationPattern> = patterns.collect();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    sorted.truncate(count);
    sorted
}
