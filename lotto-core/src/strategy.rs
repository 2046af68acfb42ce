use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, warn};

use crate::combination::has_match;
use crate::config::Config;
use crate::error::{LottoError, Result};
use crate::gauss::{gauss_index, GaussParams};
use crate::globe::{build_globe, Arrangement};
use crate::models::{Ball, Draw};
use crate::stats::BallStats;

/// Au-delà, une collision est résolue par la boule libre la plus proche du centre.
const MAX_COLLISION_RETRIES: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Normal,
    Blend1,
    Blend2,
    LeftStacked,
    SideStacked,
    Random,
}

impl Strategy {
    /// Ordre d'appel par l'assembleur de grilles.
    pub const SEQUENCE: [Strategy; 6] = [
        Strategy::Normal,
        Strategy::Blend1,
        Strategy::Blend2,
        Strategy::LeftStacked,
        Strategy::SideStacked,
        Strategy::Random,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Normal => "(distribution normale)",
            Strategy::Blend1 => "(mélange 1)",
            Strategy::Blend2 => "(mélange 2)",
            Strategy::LeftStacked => "(empilé à gauche)",
            Strategy::SideStacked => "(empilé sur les côtés)",
            Strategy::Random => "(aléatoire)",
        }
    }

    fn arrangement(&self) -> Option<Arrangement> {
        match self {
            Strategy::Normal => Some(Arrangement::Normal),
            Strategy::Blend1 => Some(Arrangement::Blend1),
            Strategy::Blend2 => Some(Arrangement::Blend2),
            Strategy::LeftStacked => Some(Arrangement::LeftStacked),
            Strategy::SideStacked => Some(Arrangement::SideStacked),
            Strategy::Random => None,
        }
    }
}

/// `match_comb > 0` : le tirage doit partager un sous-ensemble de cette taille avec l'historique.
/// `elim_comb > 0` : il ne doit partager aucun sous-ensemble de cette taille.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceptancePolicy {
    pub match_comb: usize,
    pub elim_comb: usize,
}

impl AcceptancePolicy {
    pub const NONE: AcceptancePolicy = AcceptancePolicy { match_comb: 0, elim_comb: 0 };

    pub fn new(match_comb: usize, elim_comb: usize) -> Self {
        Self { match_comb, elim_comb }
    }

    pub fn accepts(&self, draw: &Draw, history: &[Draw]) -> bool {
        let no_match = self.match_comb > 0 && !has_match(draw, self.match_comb, history);
        let no_elim = self.elim_comb > 0 && has_match(draw, self.elim_comb, history);
        !(no_match || no_elim)
    }
}

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    /// Trié par numéro croissant.
    pub draw: Draw,
    pub accepted: bool,
    pub attempts: usize,
}

pub struct DrawEngine<'a> {
    history: &'a [Draw],
    config: &'a Config,
}

impl<'a> DrawEngine<'a> {
    pub fn new(history: &'a [Draw], config: &'a Config) -> Self {
        Self { history, config }
    }

    /// Un tirage de `draw_ball` boules distinctes parmi `stats.pool_size()`. Ne boucle jamais
    /// indéfiniment : une fois les tentatives épuisées, le dernier tirage est rendu non accepté.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        strategy: Strategy,
        stats: &BallStats,
        draw_ball: usize,
        policy: AcceptancePolicy,
        rng: &mut R,
    ) -> Result<StrategyOutcome> {
        let pool = stats.pool_size();
        if draw_ball == 0 || draw_ball > pool {
            return Err(LottoError::InvalidConfig(format!(
                "{} boules à tirer parmi {}",
                draw_ball, pool
            )));
        }

        let outcome = match strategy.arrangement() {
            Some(arrangement) => {
                let globe = build_globe(arrangement, stats);
                self.draw_from_globe(&globe, draw_ball, policy, rng)?
            }
            None => self.draw_shuffled(stats, draw_ball, policy, rng)?,
        };

        if outcome.accepted {
            debug!(?strategy, attempts = outcome.attempts, balls = ?outcome.draw.balls, "tirage accepté");
        } else {
            warn!(
                ?strategy,
                attempts = outcome.attempts,
                match_comb = policy.match_comb,
                elim_comb = policy.elim_comb,
                "tentatives épuisées, dernier tirage conservé"
            );
        }
        Ok(outcome)
    }

    fn draw_from_globe<R: Rng + ?Sized>(
        &self,
        globe: &[Ball],
        draw_ball: usize,
        policy: AcceptancePolicy,
        rng: &mut R,
    ) -> Result<StrategyOutcome> {
        let params = GaussParams::from(self.config);
        let max_attempts = globe.len();
        let mut last = Draw::new(Vec::new());

        for attempt in 1..=max_attempts {
            let mut balls = Vec::with_capacity(draw_ball);
            for _ in 0..draw_ball {
                let ball = pick_distinct(globe, &balls, rng, params)?;
                balls.push(ball);
            }
            let draw = Draw::new(balls).sorted();
            if policy.accepts(&draw, self.history) {
                return Ok(StrategyOutcome { draw, accepted: true, attempts: attempt });
            }
            last = draw;
        }

        Ok(StrategyOutcome { draw: last, accepted: false, attempts: max_attempts })
    }

    /// Sphère brassée : avant chaque extraction, de nombreuses boules sont déplacées
    /// vers les bords, puis la boule du milieu est retirée directement.
    fn draw_shuffled<R: Rng + ?Sized>(
        &self,
        stats: &BallStats,
        draw_ball: usize,
        policy: AcceptancePolicy,
        rng: &mut R,
    ) -> Result<StrategyOutcome> {
        let arrangement = if rng.random_bool(0.5) { Arrangement::Blend1 } else { Arrangement::Blend2 };
        let mut globe: VecDeque<Ball> = build_globe(arrangement, stats).into();
        let n = globe.len();
        let max_attempts = draw_ball * 3;
        let mut last = Draw::new(Vec::new());

        for attempt in 1..=max_attempts {
            let mut drawn = Vec::with_capacity(draw_ball);
            for j in 0..draw_ball {
                self.shuffle_globe(&mut globe, n, j, rng);
                let ball = globe
                    .remove((n - j) / 2)
                    .ok_or_else(|| LottoError::InvalidConfig("sphère vide".to_string()))?;
                drawn.push(ball);
            }

            // Les boules retournent dans la sphère, alternativement en tête et en queue.
            let (mut front, mut back) = (0usize, drawn.len());
            for z in 0..drawn.len() {
                if z % 2 == 1 {
                    back -= 1;
                    globe.push_back(drawn[back]);
                } else {
                    globe.push_front(drawn[front]);
                    front += 1;
                }
            }

            let draw = Draw::new(drawn).sorted();
            if policy.accepts(&draw, self.history) {
                return Ok(StrategyOutcome { draw, accepted: true, attempts: attempt });
            }
            last = draw;
        }

        Ok(StrategyOutcome { draw: last, accepted: false, attempts: max_attempts })
    }

    fn shuffle_globe<R: Rng + ?Sized>(&self, globe: &mut VecDeque<Ball>, n: usize, drawn: usize, rng: &mut R) {
        let moves = shuffle_moves(n, rng.random_range(1..=3), self.config.shuffle_scale);
        let remaining = n - drawn;
        let mid = (n / 2) as isize;

        for _ in 0..moves {
            let index = rng.random_range(0..remaining);
            let signed = index as isize;
            if signed == mid - 1 || signed == mid {
                continue;
            }
            if let Some(ball) = globe.remove(index) {
                if signed < mid - 1 {
                    globe.push_front(ball);
                } else {
                    globe.push_back(ball);
                }
            }
        }
    }
}

/// Nombre de déplacements avant une extraction : n³ × factor / (n / 3).
fn shuffle_moves(n: usize, factor: usize, scale: f64) -> usize {
    let divisor = (n / 3).max(1);
    let base = (n * n * n * factor) / divisor;
    (base as f64 * scale).ceil() as usize
}

/// Tire une position de la sphère par l'échantillonneur de Galton jusqu'à obtenir une boule libre.
pub(crate) fn pick_distinct<R: Rng + ?Sized>(
    globe: &[Ball],
    drawn: &[Ball],
    rng: &mut R,
    params: GaussParams,
) -> Result<Ball> {
    for _ in 0..MAX_COLLISION_RETRIES {
        let index = gauss_index(globe.len(), rng, params)?;
        let ball = globe[index - 1];
        if !drawn.contains(&ball) {
            return Ok(ball);
        }
    }

    let center = globe.len() / 2;
    let mut free: Vec<(usize, Ball)> = globe
        .iter()
        .enumerate()
        .filter(|(_, b)| !drawn.contains(b))
        .map(|(i, &b)| (i.abs_diff(center), b))
        .collect();
    free.sort_unstable();
    free.first()
        .map(|&(_, b)| b)
        .ok_or_else(|| LottoError::InvalidConfig("plus aucune boule libre dans la sphère".to_string()))
}
