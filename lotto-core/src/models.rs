use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::combination::BallMask;
use crate::error::{LottoError, Result};

pub type Ball = u8;

/// Format des dates de l'historique (ex: 08.01.2020).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub balls: Vec<Ball>,
    pub date: Option<String>,
    pub label: Option<String>,
}

impl Draw {
    pub fn new(balls: Vec<Ball>) -> Self {
        Self { balls, date: None, label: None }
    }

    pub fn dated(date: &str, balls: Vec<Ball>) -> Self {
        Self { balls, date: Some(date.to_string()), label: None }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn mask(&self) -> BallMask {
        BallMask::from_balls(&self.balls)
    }

    pub fn contains(&self, ball: Ball) -> bool {
        self.balls.contains(&ball)
    }

    pub fn sorted(mut self) -> Self {
        self.balls.sort_unstable();
        self
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
    }
}

/// Historique chronologique des tirages, plus l'historique parallèle des boules
/// supplémentaires (une boule par tirage, vide si le jeu n'en a pas).
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    pub draws: Vec<Draw>,
    pub supplementary: Vec<Draw>,
}

impl DrawHistory {
    pub fn new(draws: Vec<Draw>) -> Self {
        Self { draws, supplementary: Vec::new() }
    }

    pub fn with_supplementary(draws: Vec<Draw>, supplementary: Vec<Draw>) -> Self {
        Self { draws, supplementary }
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDraw {
    pub draw: Draw,
    /// Accepté en dernier recours, sans satisfaire toutes les contraintes.
    pub relaxed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Coupon {
    pub draws: Vec<GeneratedDraw>,
}

impl Coupon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, draw: Draw, relaxed: bool) {
        self.draws.push(GeneratedDraw { draw, relaxed });
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Vue sur les tirages seuls, pour le moteur de combinaisons.
    pub fn plain_draws(&self) -> Vec<Draw> {
        self.draws.iter().map(|g| g.draw.clone()).collect()
    }

    pub fn relaxed_count(&self) -> usize {
        self.draws.iter().filter(|g| g.relaxed).count()
    }
}

pub fn validate_draw(balls: &[Ball], total_ball: u8, draw_ball: usize) -> Result<()> {
    if balls.len() != draw_ball {
        return Err(LottoError::InvalidDraw(format!(
            "{} boules au lieu de {}",
            balls.len(),
            draw_ball
        )));
    }
    for &b in balls {
        if b < 1 || b > total_ball {
            return Err(LottoError::InvalidDraw(format!(
                "Boule {} hors limites (1-{})",
                b, total_ball
            )));
        }
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                return Err(LottoError::InvalidDraw(format!("Boule en double : {}", balls[i])));
            }
        }
    }
    Ok(())
}

/// Historique synthétique reproductible pour les tests.
pub fn make_test_history(n: usize, total_ball: u8, seed: u64) -> DrawHistory {
    let mut rng = StdRng::seed_from_u64(seed);
    let draws = (0..n)
        .map(|i| {
            let mut balls: Vec<Ball> = Vec::with_capacity(6);
            while balls.len() < 6 {
                let b = rng.random_range(1..=total_ball);
                if !balls.contains(&b) {
                    balls.push(b);
                }
            }
            balls.sort_unstable();
            let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
                + chrono::Duration::days(7 * i as i64);
            Draw::dated(&day.format(DATE_FORMAT).to_string(), balls)
        })
        .collect();
    DrawHistory::new(draws)
}
