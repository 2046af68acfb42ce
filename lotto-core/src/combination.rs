//! Moteur de combinaisons : énumération des k-sous-ensembles d'un tirage et
//! test d'inclusion par masque de bits.

use std::fmt;

use crate::error::{LottoError, Result};
use crate::lucky::CoOccurrenceTable;
use crate::models::{Ball, Draw};

/// Ensemble de boules sous forme de masque : le bit `b - 1` est levé si la boule `b` est présente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BallMask(pub u128);

impl BallMask {
    pub fn from_balls(balls: &[Ball]) -> Self {
        let bits = balls
            .iter()
            .filter(|&&b| b >= 1 && (b as u32) <= u128::BITS)
            .fold(0u128, |acc, &b| acc | (1u128 << (b - 1)));
        Self(bits)
    }

    pub fn contains_all(self, subset: BallMask) -> bool {
        self.0 & subset.0 == subset.0
    }

    pub fn intersects(self, other: BallMask) -> bool {
        self.0 & other.0 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subset {
    balls: Vec<Ball>,
    mask: BallMask,
}

impl Subset {
    pub fn new(mut balls: Vec<Ball>) -> Self {
        balls.sort_unstable();
        let mask = BallMask::from_balls(&balls);
        Self { balls, mask }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn mask(&self) -> BallMask {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn contains(&self, ball: Ball) -> bool {
        self.balls.contains(&ball)
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, b) in self.balls.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{:2}", b)?;
        }
        write!(f, ")")
    }
}

/// Itère sur les C(n, k) sous-ensembles d'indices en ordre lexicographique.
pub struct Subsets<'a> {
    balls: &'a [Ball],
    indices: Vec<usize>,
    done: bool,
}

pub fn subsets(balls: &[Ball], k: usize) -> Subsets<'_> {
    Subsets {
        balls,
        indices: (0..k).collect(),
        done: k == 0 || k > balls.len(),
    }
}

impl Iterator for Subsets<'_> {
    type Item = Subset;

    fn next(&mut self) -> Option<Subset> {
        if self.done {
            return None;
        }
        let subset = Subset::new(self.indices.iter().map(|&i| self.balls[i]).collect());

        let n = self.balls.len();
        let k = self.indices.len();
        // Avance vers la combinaison suivante : le dernier indice qui peut encore monter.
        match (0..k).rev().find(|&i| self.indices[i] < n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(subset)
    }
}

/// Vrai s'il existe un tirage de `reference` partageant un k-sous-ensemble avec `candidate`.
/// Une référence vide ne correspond jamais.
pub fn has_match(candidate: &Draw, k: usize, reference: &[Draw]) -> bool {
    if reference.is_empty() {
        return false;
    }
    let masks: Vec<BallMask> = reference.iter().map(Draw::mask).collect();
    subsets(&candidate.balls, k).any(|s| masks.iter().any(|m| m.contains_all(s.mask())))
}

/// Vrai si au moins une boule du candidat figure dans un tirage de `reference`.
pub fn has_any_ball(candidate: &Draw, reference: &[Draw]) -> bool {
    let mask = candidate.mask();
    reference.iter().any(|d| d.mask().intersects(mask))
}

pub fn shares_subset(candidate: &Draw, k: usize, other: &Draw) -> bool {
    let mask = other.mask();
    subsets(&candidate.balls, k).any(|s| mask.contains_all(s.mask()))
}

/// Mode collecteur : tous les k-sous-ensembles du candidat contenus dans `other`,
/// en ordre lexicographique, chacun reporté dans `table` si fournie.
pub fn collect_matches(
    candidate: &Draw,
    k: usize,
    other: &Draw,
    mut table: Option<&mut CoOccurrenceTable>,
) -> Vec<Subset> {
    let mask = other.mask();
    let mut found = Vec::new();
    for subset in subsets(&candidate.balls, k) {
        if mask.contains_all(subset.mask()) {
            if let Some(table) = table.as_deref_mut() {
                table.record(&subset);
            }
            found.push(subset);
        }
    }
    found
}

pub fn format_subsets(subsets: &[Subset]) -> String {
    subsets
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Nombre de paires de tirages (i < j) partageant au moins un k-sous-ensemble, pour k = 2..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchCounts {
    counts: [u32; 7],
}

impl MatchCounts {
    pub fn get(&self, k: usize) -> u32 {
        if (2..=6).contains(&k) {
            self.counts[k]
        } else {
            0
        }
    }
}

pub fn match_counts(draws: &[Draw]) -> MatchCounts {
    let mut result = MatchCounts::default();
    for i in 0..draws.len() {
        for j in (i + 1)..draws.len() {
            for k in 2..=6 {
                if shares_subset(&draws[i], k, &draws[j]) {
                    result.counts[k] += 1;
                } else {
                    // Pas de k-sous-ensemble commun : aucun de taille supérieure non plus.
                    break;
                }
            }
        }
    }
    result
}

#[derive(Debug, Clone)]
pub struct MatchPair {
    pub first: usize,
    pub second: usize,
    pub days_between: Option<i64>,
    pub subsets: Vec<Subset>,
}

/// Détail des paires de l'historique partageant au moins un k-sous-ensemble.
pub fn match_report(draws: &[Draw], k: usize) -> Result<Vec<MatchPair>> {
    if !(2..=6).contains(&k) {
        return Err(LottoError::InvalidCombination(k));
    }
    let mut pairs = Vec::new();
    for i in 0..draws.len() {
        for j in (i + 1)..draws.len() {
            let shared = collect_matches(&draws[i], k, &draws[j], None);
            if shared.is_empty() {
                continue;
            }
            let days_between = match (draws[i].parsed_date(), draws[j].parsed_date()) {
                (Some(a), Some(b)) => Some((b - a).num_days().abs()),
                _ => None,
            };
            pairs.push(MatchPair { first: i, second: j, days_between, subsets: shared });
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_test_history;
    use proptest::prelude::*;

    fn scenario_history() -> Vec<Draw> {
        vec![
            Draw::dated("01.01.2020", vec![1, 2, 3, 4, 5, 6]),
            Draw::dated("08.01.2020", vec![1, 2, 7, 8, 9, 10]),
        ]
    }

    /// Référence naïve : comparaison élément par élément de chaque sous-ensemble.
    fn brute_force_match(candidate: &[Ball], k: usize, reference: &[Vec<Ball>]) -> bool {
        let n = candidate.len();
        if k == 0 || k > n {
            return false;
        }
        for bits in 0u32..(1 << n) {
            if bits.count_ones() as usize != k {
                continue;
            }
            let chosen: Vec<Ball> = (0..n).filter(|i| bits & (1 << i) != 0).map(|i| candidate[i]).collect();
            if reference.iter().any(|d| chosen.iter().all(|b| d.contains(b))) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_subset_counts() {
        let balls = [1, 2, 3, 4, 5, 6];
        let expected = [(2, 15), (3, 20), (4, 15), (5, 6), (6, 1)];
        for (k, count) in expected {
            assert_eq!(subsets(&balls, k).count(), count, "C(6,{k})");
        }
        assert_eq!(subsets(&balls, 0).count(), 0);
        assert_eq!(subsets(&balls, 7).count(), 0);
    }

    #[test]
    fn test_subsets_lexicographic() {
        let all: Vec<Vec<Ball>> = subsets(&[1, 2, 3, 4], 2).map(|s| s.balls().to_vec()).collect();
        assert_eq!(all, vec![vec![1, 2], vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4], vec![3, 4]]);
    }

    #[test]
    fn test_scenario_pair_match() {
        let history = scenario_history();
        assert!(has_match(&Draw::new(vec![1, 2, 11, 12, 13, 14]), 2, &history));
        assert!(!has_match(&Draw::new(vec![20, 21, 22, 23, 24, 25]), 2, &history));
    }

    #[test]
    fn test_six_is_equality() {
        let history = scenario_history();
        assert!(has_match(&Draw::new(vec![6, 5, 4, 3, 2, 1]), 6, &history));
        assert!(!has_match(&Draw::new(vec![1, 2, 3, 4, 5, 7]), 6, &history));
    }

    #[test]
    fn test_empty_reference_never_matches() {
        assert!(!has_match(&Draw::new(vec![1, 2, 3, 4, 5, 6]), 2, &[]));
        assert!(!has_any_ball(&Draw::new(vec![1, 2, 3, 4, 5, 6]), &[]));
    }

    #[test]
    fn test_has_any_ball() {
        let history = scenario_history();
        assert!(has_any_ball(&Draw::new(vec![10, 20, 30, 40, 50, 60]), &history));
        assert!(!has_any_ball(&Draw::new(vec![11, 20, 30, 40, 50, 60]), &history));
    }

    #[test]
    fn test_collect_matches_format() {
        let history = scenario_history();
        let found = collect_matches(&Draw::new(vec![1, 2, 3, 7, 8, 40]), 2, &history[1], None);
        assert_eq!(format_subsets(&found), "( 1, 2), ( 1, 7), ( 1, 8), ( 2, 7), ( 2, 8), ( 7, 8)");
    }

    #[test]
    fn test_collect_matches_feeds_table() {
        let history = scenario_history();
        let mut table = CoOccurrenceTable::new(2);
        collect_matches(&history[0], 2, &history[1], Some(&mut table));
        collect_matches(&history[0], 2, &history[1], Some(&mut table));
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(&Subset::new(vec![2, 1])), 2);
    }

    #[test]
    fn test_match_counts_scenario() {
        let mut history = scenario_history();
        history.push(Draw::dated("15.01.2020", vec![1, 2, 3, 4, 5, 6]));
        let counts = match_counts(&history);
        // (0,1) partage {1,2} ; (0,2) identiques ; (1,2) partage {1,2}.
        assert_eq!(counts.get(2), 3);
        assert_eq!(counts.get(3), 1);
        assert_eq!(counts.get(6), 1);
        assert_eq!(counts.get(7), 0);
    }

    #[test]
    fn test_match_report_days() {
        let report = match_report(&scenario_history(), 2).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].first, 0);
        assert_eq!(report[0].second, 1);
        assert_eq!(report[0].days_between, Some(7));
        assert_eq!(report[0].subsets.len(), 1);
        assert!(match_report(&scenario_history(), 1).is_err());
    }

    #[test]
    fn test_agrees_with_brute_force_on_history() {
        let history = make_test_history(60, 20, 5);
        let reference: Vec<Vec<Ball>> = history.draws[1..].iter().map(|d| d.balls.clone()).collect();
        for k in 2..=6 {
            let candidate = &history.draws[0];
            assert_eq!(
                has_match(candidate, k, &history.draws[1..]),
                brute_force_match(&candidate.balls, k, &reference),
                "k = {k}"
            );
        }
    }

    fn draw_strategy() -> impl Strategy<Value = Vec<Ball>> {
        proptest::sample::subsequence((1u8..=15).collect::<Vec<_>>(), 6)
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            candidate in draw_strategy(),
            reference in proptest::collection::vec(draw_strategy(), 0..8),
            k in 2usize..=6,
        ) {
            let ref_draws: Vec<Draw> = reference.iter().cloned().map(Draw::new).collect();
            prop_assert_eq!(
                has_match(&Draw::new(candidate.clone()), k, &ref_draws),
                brute_force_match(&candidate, k, &reference)
            );
        }
    }
}
