use crate::models::{Ball, Draw};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallCount {
    pub ball: Ball,
    pub frequency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Nombre d'apparitions de chaque boule 1..=N sur un historique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallStats {
    counts: Vec<BallCount>,
}

impl BallStats {
    pub fn pool_size(&self) -> usize {
        self.counts.len()
    }

    pub fn frequency(&self, ball: Ball) -> u32 {
        self.counts
            .get((ball as usize).wrapping_sub(1))
            .map(|c| c.frequency)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|c| c.frequency).sum()
    }

    /// Boules triées par fréquence ; à égalité, par numéro croissant.
    pub fn ranked(&self, order: Order) -> Vec<Ball> {
        let mut sorted = self.counts.clone();
        match order {
            Order::Ascending => sorted.sort_by(|a, b| a.frequency.cmp(&b.frequency).then(a.ball.cmp(&b.ball))),
            Order::Descending => sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.ball.cmp(&b.ball))),
        }
        sorted.into_iter().map(|c| c.ball).collect()
    }

    pub fn from_counts(frequencies: &[u32]) -> Self {
        let counts = frequencies
            .iter()
            .enumerate()
            .map(|(i, &frequency)| BallCount { ball: (i + 1) as Ball, frequency })
            .collect();
        Self { counts }
    }
}

pub fn compute_stats(draws: &[Draw], pool_size: u8) -> BallStats {
    let mut frequencies = vec![0u32; pool_size as usize];

    for draw in draws {
        for &n in &draw.balls {
            let idx = (n as usize).wrapping_sub(1);
            if idx < frequencies.len() {
                frequencies[idx] += 1;
            }
        }
    }

    BallStats::from_counts(&frequencies)
}
