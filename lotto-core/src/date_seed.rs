//! Deux tirages dérivés de la date du jour : un nombre de référence est
//! découpé en paires de chiffres, additionnées deux à deux modulo la taille de la sphère.

use chrono::NaiveDate;
use rand::Rng;

use crate::config::Config;
use crate::error::Result;
use crate::gauss::GaussParams;
use crate::globe::{build_globe, Arrangement};
use crate::models::{Ball, Draw};
use crate::stats::BallStats;
use crate::strategy::pick_distinct;

pub const DATE_LABEL_1: &str = "(date 1)";
pub const DATE_LABEL_2: &str = "(date 2)";

/// base + ⌈jours écoulés × multiplicateur⌉
pub fn seed_number(reference: NaiveDate, today: NaiveDate, base: u64, multiplier: f64) -> u64 {
    let days = (today - reference).num_days();
    let offset = (days as f64 * multiplier).ceil() as i64;
    (base as i64).saturating_add(offset).max(0) as u64
}

/// Les douze numéros bruts (avant résolution des doublons) des deux tirages.
pub fn seed_balls(number: u64, total_ball: u8) -> ([Ball; 6], [Ball; 6]) {
    let n = total_ball as u32;
    let text = number.to_string();
    let eight: Vec<u32> = if text.len() < 8 {
        format!("{:08}", number).bytes().map(digit).collect()
    } else {
        text.bytes().take(8).map(digit).collect()
    };
    // Même chiffres, décalés d'un cran vers la droite.
    let rotated: Vec<u32> = std::iter::once(eight[7]).chain(eight[..7].iter().copied()).collect();

    let pair = |d: &[u32], i: usize| d[i] * 10 + d[i + 1];
    let (s1, s2, s3, s4) = (pair(&eight, 0), pair(&eight, 2), pair(&eight, 4), pair(&eight, 6));
    let (s5, s6, s7, s8) = (pair(&rotated, 0), pair(&rotated, 2), pair(&rotated, 4), pair(&rotated, 6));

    let first = [s2 + s5, s1 + s6, s3 + s6, s2 + s7, s4 + s7, s3 + s8].map(|v| wrap(v, n));

    let joined: Vec<u32> = first
        .iter()
        .flat_map(|b| format!("{:02}", b).bytes().map(digit).collect::<Vec<_>>())
        .collect();
    let j = |a: usize, b: usize| joined[a] * 10 + joined[b];
    let second = [j(11, 0), j(1, 2), j(3, 4), j(5, 6), j(7, 8), j(9, 10)].map(|v| wrap(v, n));

    (first, second)
}

fn digit(b: u8) -> u32 {
    (b - b'0') as u32
}

/// Réduit dans [1, n] : un reste nul devient n.
fn wrap(value: u32, n: u32) -> Ball {
    match value % n {
        0 => n as Ball,
        r => r as Ball,
    }
}

/// Les deux tirages « date ». Un numéro déjà présent dans son tirage est remplacé par
/// une position tirée dans une sphère mélangée (mélange 1 ou 2 au hasard).
pub fn date_seed_draws<R: Rng + ?Sized>(
    today: NaiveDate,
    stats: &BallStats,
    config: &Config,
    rng: &mut R,
) -> Result<(Draw, Draw)> {
    let number = seed_number(
        config.date_reference,
        today,
        config.date_seed_base,
        config.date_seed_multiplier,
    );
    let (first, second) = seed_balls(number, config.total_ball);

    let arrangement = if rng.random_bool(0.5) { Arrangement::Blend1 } else { Arrangement::Blend2 };
    let globe = build_globe(arrangement, stats);
    let params = GaussParams::from(config);

    let mut resolve = |raw: &[Ball]| -> Result<Vec<Ball>> {
        let mut balls = Vec::with_capacity(raw.len());
        for &ball in raw.iter().take(config.draw_ball) {
            if balls.contains(&ball) {
                let replacement = pick_distinct(&globe, &balls, rng, params)?;
                balls.push(replacement);
            } else {
                balls.push(ball);
            }
        }
        while balls.len() < config.draw_ball {
            let extra = pick_distinct(&globe, &balls, rng, params)?;
            balls.push(extra);
        }
        Ok(balls)
    };

    let draw1 = Draw::new(resolve(&first)?).sorted().with_label(DATE_LABEL_1);
    let draw2 = Draw::new(resolve(&second)?).sorted().with_label(DATE_LABEL_2);
    tracing::debug!(number, date = %today, "tirages de la date");
    Ok((draw1, draw2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_draw;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 12).unwrap()
    }

    #[test]
    fn test_seed_number() {
        assert_eq!(seed_number(reference(), reference(), 4_532_632, 106.5), 4_532_632);
        let later = NaiveDate::from_ymd_opt(2021, 7, 22).unwrap();
        assert_eq!(seed_number(reference(), later, 4_532_632, 106.5), 4_533_697);
        // 3 jours × 106,5 = 319,5 arrondi vers le haut.
        let odd = NaiveDate::from_ymd_opt(2021, 7, 15).unwrap();
        assert_eq!(seed_number(reference(), odd, 4_532_632, 106.5), 4_532_952);
    }

    #[test]
    fn test_seed_balls_reference_day() {
        // "04532632" puis "20453263".
        let (first, second) = seed_balls(4_532_632, 60);
        assert_eq!(first, [13, 49, 11, 25, 4, 29]);
        // "134911250429"
        assert_eq!(second, [31, 34, 31, 12, 50, 42]);
    }

    #[test]
    fn test_zero_remainder_maps_to_n() {
        assert_eq!(wrap(60, 60), 60);
        assert_eq!(wrap(120, 60), 60);
        assert_eq!(wrap(61, 60), 1);
    }

    #[test]
    fn test_long_numbers_use_first_eight_digits() {
        assert_eq!(seed_balls(123_456_789, 90), seed_balls(12_345_678, 90));
    }

    #[test]
    fn test_date_seed_draws_resolve_duplicates() {
        let config = Config::default();
        let stats = BallStats::from_counts(&[1; 60]);
        let mut rng = StdRng::seed_from_u64(12);
        let (d1, d2) = date_seed_draws(reference(), &stats, &config, &mut rng).unwrap();

        assert_eq!(d1.balls, vec![4, 11, 13, 25, 29, 49]);
        assert_eq!(d1.label.as_deref(), Some(DATE_LABEL_1));

        assert!(validate_draw(&d2.balls, 60, 6).is_ok(), "{:?}", d2.balls);
        for ball in [31, 34, 12, 50, 42] {
            assert!(d2.contains(ball), "boule {ball} absente de {:?}", d2.balls);
        }
        assert_eq!(d2.label.as_deref(), Some(DATE_LABEL_2));
    }

    #[test]
    fn test_first_draw_independent_of_rng_without_duplicates() {
        let config = Config::sayisal();
        let stats = BallStats::from_counts(&[0; 90]);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let number = seed_number(config.date_reference, today, config.date_seed_base, config.date_seed_multiplier);
        let (raw, _) = seed_balls(number, config.total_ball);

        let a = date_seed_draws(today, &stats, &config, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = date_seed_draws(today, &stats, &config, &mut StdRng::seed_from_u64(99)).unwrap();
        if validate_draw(&raw, 90, 6).is_ok() {
            let mut expected = raw.to_vec();
            expected.sort_unstable();
            assert_eq!(a.0.balls, expected);
            assert_eq!(b.0.balls, expected);
        } else {
            assert!(validate_draw(&a.0.balls, 90, 6).is_ok());
        }
    }
}
