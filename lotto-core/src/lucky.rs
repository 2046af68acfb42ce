//! Numéros chanceux : sous-ensembles apparus ensemble dans plusieurs tirages.

use std::collections::HashMap;

use crate::combination::{collect_matches, BallMask, Subset};
use crate::error::{LottoError, Result};
use crate::models::{Ball, Draw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuckyEntry {
    pub subset: Subset,
    /// Nombre de paires de tirages partageant ce sous-ensemble.
    pub count: u32,
}

impl LuckyEntry {
    /// Nombre de tirages contenant le sous-ensemble : plus petit n tel que n(n-1)/2 >= count.
    pub fn draws_sharing(&self) -> u32 {
        let mut n = 0u32;
        let mut remaining = self.count as i64;
        while remaining > 0 {
            remaining -= (n + 1) as i64;
            n += 1;
        }
        n + 1
    }
}

/// Table d'occurrences conservant l'ordre de découverte.
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceTable {
    comb: usize,
    entries: Vec<LuckyEntry>,
    index: HashMap<BallMask, usize>,
}

impl CoOccurrenceTable {
    pub fn new(comb: usize) -> Self {
        Self { comb, entries: Vec::new(), index: HashMap::new() }
    }

    pub fn comb(&self) -> usize {
        self.comb
    }

    /// Insère avec un compte de 1 ou incrémente.
    pub fn record(&mut self, subset: &Subset) {
        match self.index.get(&subset.mask()) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(subset.mask(), self.entries.len());
                self.entries.push(LuckyEntry { subset: subset.clone(), count: 1 });
            }
        }
    }

    pub fn count(&self, subset: &Subset) -> u32 {
        self.index
            .get(&subset.mask())
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[LuckyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64).sum()
    }

    /// Tri décroissant par compte ; le tri stable garde l'ordre de découverte à égalité.
    pub fn ranked(&self) -> Vec<LuckyEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    /// Paires contenant `ball` dont le compte atteint `floor`.
    pub fn partners_of(&self, ball: Ball, floor: u32) -> impl Iterator<Item = &LuckyEntry> {
        self.entries
            .iter()
            .filter(move |e| e.count >= floor && e.subset.contains(ball))
    }
}

pub fn mine_lucky(draws: &[Draw], comb: usize) -> Result<CoOccurrenceTable> {
    if !(2..=4).contains(&comb) {
        return Err(LottoError::InvalidCombination(comb));
    }
    let mut table = CoOccurrenceTable::new(comb);
    for i in 0..draws.len() {
        for j in (i + 1)..draws.len() {
            collect_matches(&draws[i], comb, &draws[j], Some(&mut table));
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::subsets;
    use crate::models::make_test_history;

    #[test]
    fn test_pair_totals_match_brute_force() {
        let history = make_test_history(50, 30, 21);
        let table = mine_lucky(&history.draws, 2).unwrap();

        let mut expected = 0u64;
        for i in 0..history.len() {
            for j in (i + 1)..history.len() {
                let a = &history.draws[i].balls;
                let b = &history.draws[j].balls;
                let shared = a.iter().filter(|x| b.contains(x)).count() as u64;
                expected += shared * shared.saturating_sub(1) / 2;
            }
        }
        assert_eq!(table.total(), expected);
    }

    #[test]
    fn test_counts_per_subset() {
        let draws = vec![
            Draw::new(vec![1, 2, 3, 4, 5, 6]),
            Draw::new(vec![1, 2, 7, 8, 9, 10]),
            Draw::new(vec![1, 2, 3, 11, 12, 13]),
        ];
        let table = mine_lucky(&draws, 2).unwrap();
        // {1,2} est commun aux 3 paires, {1,3} et {2,3} à la paire (0,2).
        assert_eq!(table.count(&Subset::new(vec![1, 2])), 3);
        assert_eq!(table.count(&Subset::new(vec![1, 3])), 1);
        assert_eq!(table.len(), 3);

        let ranked = table.ranked();
        assert_eq!(ranked[0].subset.balls(), &[1, 2]);
        assert_eq!(ranked[0].draws_sharing(), 3);
    }

    #[test]
    fn test_ranked_ties_keep_discovery_order() {
        let draws = vec![
            Draw::new(vec![5, 6, 20, 21, 22, 23]),
            Draw::new(vec![5, 6, 30, 31, 1, 2]),
            Draw::new(vec![1, 2, 40, 41, 42, 43]),
        ];
        let table = mine_lucky(&draws, 2).unwrap();
        let ranked = table.ranked();
        assert_eq!(ranked[0].subset.balls(), &[5, 6]);
        assert_eq!(ranked[1].subset.balls(), &[1, 2]);
    }

    #[test]
    fn test_triples() {
        let draws = vec![
            Draw::new(vec![1, 2, 3, 4, 5, 6]),
            Draw::new(vec![1, 2, 3, 4, 9, 10]),
        ];
        let table = mine_lucky(&draws, 3).unwrap();
        assert_eq!(table.len(), subsets(&[1, 2, 3, 4], 3).count());
        assert!(table.entries().iter().all(|e| e.count == 1 && e.subset.len() == 3));
    }

    #[test]
    fn test_invalid_comb() {
        assert!(mine_lucky(&[], 5).is_err());
        assert!(mine_lucky(&[], 1).is_err());
        assert!(mine_lucky(&[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_draws_sharing() {
        let entry = |count| LuckyEntry { subset: Subset::new(vec![1, 2]), count };
        assert_eq!(entry(1).draws_sharing(), 2);
        assert_eq!(entry(3).draws_sharing(), 3);
        assert_eq!(entry(6).draws_sharing(), 4);
    }

    #[test]
    fn test_partners_of() {
        let draws = vec![
            Draw::new(vec![1, 2, 3, 4, 5, 6]),
            Draw::new(vec![1, 2, 7, 8, 9, 10]),
            Draw::new(vec![1, 2, 3, 11, 12, 13]),
        ];
        let table = mine_lucky(&draws, 2).unwrap();
        let strong: Vec<_> = table.partners_of(1, 2).collect();
        assert_eq!(strong.len(), 1);
        assert_eq!(table.partners_of(3, 1).count(), 2);
    }
}
