//! Échantillonneur « planche de Galton » : une bille descend n-1 niveaux et
//! tombe dans l'une des n cases, selon une loi proche de Binomiale(n-1, 1/2).

use rand::Rng;

use crate::config::Config;
use crate::error::{LottoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaussParams {
    pub left_base: u32,
    pub left_jitter: u32,
}

impl Default for GaussParams {
    fn default() -> Self {
        Self { left_base: 49, left_jitter: 2 }
    }
}

impl From<&Config> for GaussParams {
    fn from(config: &Config) -> Self {
        Self {
            left_base: config.gauss_left_base,
            left_jitter: config.gauss_left_jitter,
        }
    }
}

/// Index aléatoire dans [1, n], concentré autour de (n+1)/2.
pub fn gauss_index<R: Rng + ?Sized>(n: usize, rng: &mut R, params: GaussParams) -> Result<usize> {
    if n == 0 {
        return Err(LottoError::InvalidDomain(n));
    }

    let jitter = params.left_jitter.max(1);
    let mut node = 0usize;
    let mut left_node = 0usize;

    for level in 1..n {
        let threshold = params.left_base + rng.random_range(0..jitter);
        if rng.random_range(0..100) < threshold {
            node += level;
        } else {
            node += level + 1;
        }
        left_node += level;
    }

    Ok(node + 1 - left_node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_is_invalid() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gauss_index(0, &mut rng, GaussParams::default()), Err(LottoError::InvalidDomain(0)));
    }

    #[test]
    fn test_one_is_always_one() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(gauss_index(1, &mut rng, GaussParams::default()).unwrap(), 1);
        }
    }

    #[test]
    fn test_always_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..=90 {
            for _ in 0..200 {
                let idx = gauss_index(n, &mut rng, GaussParams::default()).unwrap();
                assert!((1..=n).contains(&idx), "index {idx} hors de [1,{n}]");
            }
        }
    }

    #[test]
    fn test_distribution_centered_and_unimodal() {
        let n = 60;
        let trials = 200_000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hist = vec![0u32; n + 1];
        let mut sum = 0f64;
        for _ in 0..trials {
            let idx = gauss_index(n, &mut rng, GaussParams::default()).unwrap();
            hist[idx] += 1;
            sum += idx as f64;
        }

        let mean = sum / trials as f64;
        let center = (n as f64 + 1.0) / 2.0;
        assert!((mean - center).abs() < 1.0, "moyenne {mean} loin du centre {center}");

        // Binomiale(59, 1/2) : écart-type ~3.84, quasiment rien au-delà de ±15.
        let tails: u32 = hist[1..=10].iter().chain(hist[51..=n].iter()).sum();
        assert!(tails < trials / 1000, "queues trop lourdes : {tails}");

        // Unimodale : croissante jusqu'au mode puis décroissante (lissage par fenêtres de 3).
        let smooth: Vec<u32> = (2..n).map(|i| hist[i - 1] + hist[i] + hist[i + 1]).collect();
        let mode = smooth
            .iter()
            .enumerate()
            .max_by_key(|(_, &v)| v)
            .map(|(i, _)| i + 2)
            .unwrap();
        assert!((mode as f64 - center).abs() <= 2.0, "mode {mode}");

        // Symétrie approximative : la probabilité gauche moyenne de 49,5 % décale légèrement à droite.
        let left: u32 = hist[1..=30].iter().sum();
        let right: u32 = hist[31..=n].iter().sum();
        let ratio = left as f64 / right as f64;
        assert!((ratio - 1.0).abs() < 0.2, "ratio gauche/droite {ratio}");
    }

    #[test]
    fn test_deterministic_with_seed() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| gauss_index(60, &mut rng, GaussParams::default()).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(9), draw(9));
    }
}
