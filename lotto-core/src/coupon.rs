//! Assemblage d'une grille complète : stratégies de sphère avec échelle d'escalade,
//! tirages de la date, numéros chanceux et boules super star.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::combination::{has_any_ball, has_match};
use crate::config::Config;
use crate::date_seed::date_seed_draws;
use crate::error::Result;
use crate::gauss::GaussParams;
use crate::globe::{build_globe, Arrangement};
use crate::lucky::{mine_lucky, CoOccurrenceTable, LuckyEntry};
use crate::models::{Ball, Coupon, Draw, DrawHistory};
use crate::stats::{compute_stats, BallStats};
use crate::strategy::{pick_distinct, AcceptancePolicy, DrawEngine, Strategy};

pub const LUCKY_3_LABEL: &str = "(chanceux 3)";
pub const LUCKY_2_OF_3_LABEL: &str = "(2 des chanceux 3)";
pub const LUCKY_2_LABEL: &str = "(chanceux 2)";
pub const SUPER_STAR_LABEL: &str = "super star";

/// Tirages par passe de stratégies (date comprise) et par passe chanceuse.
pub const STRATEGY_BATCH: usize = 6;
pub const STRATEGY_BATCH_WITH_DATE: usize = 8;
pub const LUCKY_BATCH: usize = 3;

/// Essais par stratégie pour une boule super star.
const SUPER_STAR_TRIES: usize = 6;
const SUPER_STAR_SEQUENCE: [Strategy; 5] = [
    Strategy::Normal,
    Strategy::Random,
    Strategy::Blend1,
    Strategy::Blend2,
    Strategy::Normal,
];

/// Pas maximum de la marche sur le graphe des paires chanceuses.
const MAX_LUCKY_WALK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Strict,
    Pairs,
    Triples,
    Open,
}

/// Un palier de l'échelle : contraintes vis-à-vis de l'historique et de la grille en cours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRule {
    pub stage: Stage,
    pub policy: AcceptancePolicy,
    /// Taille des sous-ensembles interdits en commun avec la grille (1 = toute boule).
    pub coupon_comb: usize,
}

pub const LADDER: [StageRule; 4] = [
    StageRule { stage: Stage::Strict, policy: AcceptancePolicy { match_comb: 0, elim_comb: 2 }, coupon_comb: 1 },
    StageRule { stage: Stage::Pairs, policy: AcceptancePolicy { match_comb: 0, elim_comb: 3 }, coupon_comb: 2 },
    StageRule { stage: Stage::Triples, policy: AcceptancePolicy { match_comb: 3, elim_comb: 4 }, coupon_comb: 3 },
    StageRule { stage: Stage::Open, policy: AcceptancePolicy { match_comb: 0, elim_comb: 0 }, coupon_comb: 4 },
];

impl StageRule {
    /// Palier de la tentative `attempt` sur `total` : quatre tranches égales.
    pub fn for_attempt(attempt: usize, total: usize) -> &'static StageRule {
        let band = (total / LADDER.len()).max(1);
        &LADDER[(attempt / band).min(LADDER.len() - 1)]
    }

    pub fn overlaps_coupon(&self, draw: &Draw, coupon: &[Draw]) -> bool {
        if self.coupon_comb <= 1 {
            has_any_ball(draw, coupon)
        } else {
            has_match(draw, self.coupon_comb, coupon)
        }
    }
}

pub struct CouponAssembler<'a, R: Rng> {
    config: &'a Config,
    history: &'a DrawHistory,
    stats: BallStats,
    ss_stats: BallStats,
    today: NaiveDate,
    rng: R,
}

impl<'a, R: Rng> CouponAssembler<'a, R> {
    pub fn new(config: &'a Config, history: &'a DrawHistory, today: NaiveDate, rng: R) -> Result<Self> {
        config.validate()?;
        let stats = compute_stats(&history.draws, config.total_ball);
        let ss_stats = compute_stats(&history.supplementary, config.total_ball_ss);
        Ok(Self { config, history, stats, ss_stats, today, rng })
    }

    /// Grille de `count` tirages : une passe de stratégies avec la date, puis alternance
    /// de passes chanceuses et de passes de stratégies jusqu'au compte demandé.
    pub fn generate(&mut self, count: usize) -> Result<Coupon> {
        let mut coupon = Coupon::new();
        if count == 0 {
            return Ok(coupon);
        }

        self.draw_by_strategies(&mut coupon, count.min(STRATEGY_BATCH_WITH_DATE), true)?;
        let mut lucky_turn = true;
        while coupon.len() < count {
            let remaining = count - coupon.len();
            if lucky_turn {
                self.draw_by_lucky(&mut coupon, remaining.min(LUCKY_BATCH), count)?;
            } else {
                self.draw_by_strategies(&mut coupon, remaining.min(STRATEGY_BATCH), false)?;
            }
            lucky_turn = !lucky_turn;
        }

        info!(
            draws = coupon.len(),
            relaxed = coupon.relaxed_count(),
            "grille générée"
        );
        Ok(coupon)
    }

    /// Ajoute jusqu'à `count` tirages (8 au plus avec la date, 6 sinon). Retourne le nombre ajouté.
    pub fn draw_by_strategies(&mut self, coupon: &mut Coupon, count: usize, with_date: bool) -> Result<usize> {
        let mut added = 0;

        if with_date && count > 0 {
            let (first, second) = date_seed_draws(self.today, &self.stats, self.config, &mut self.rng)?;
            for draw in [first, second] {
                if added < count {
                    coupon.push(draw, false);
                    added += 1;
                }
            }
        }

        for strategy in Strategy::SEQUENCE {
            if added >= count {
                break;
            }
            let (draw, relaxed) = self.escalate(strategy, coupon)?;
            coupon.push(draw.with_label(strategy.label()), relaxed);
            added += 1;
        }
        Ok(added)
    }

    /// Parcourt l'échelle jusqu'au premier tirage accepté ; sinon garde le dernier, marqué relâché.
    fn escalate(&mut self, strategy: Strategy, coupon: &Coupon) -> Result<(Draw, bool)> {
        let engine = DrawEngine::new(&self.history.draws, self.config);
        let previous = coupon.plain_draws();
        let total = self.config.escalation_attempts;
        let mut last = None;
        let mut current_stage = None;

        for attempt in 0..total {
            let rule = StageRule::for_attempt(attempt, total);
            if current_stage != Some(rule.stage) {
                debug!(?strategy, stage = ?rule.stage, attempt, "palier d'escalade");
                current_stage = Some(rule.stage);
            }

            let outcome = engine.draw(strategy, &self.stats, self.config.draw_ball, rule.policy, &mut self.rng)?;
            if outcome.accepted && !rule.overlaps_coupon(&outcome.draw, &previous) {
                return Ok((outcome.draw, false));
            }
            last = Some(outcome.draw);
        }

        warn!(?strategy, attempts = total, "échelle épuisée, tirage relâché");
        let draw = match last {
            Some(draw) => draw,
            None => {
                engine
                    .draw(strategy, &self.stats, self.config.draw_ball, AcceptancePolicy::NONE, &mut self.rng)?
                    .draw
            }
        };
        Ok((draw, true))
    }

    /// Ajoute exactement `count` tirages construits à partir des combinaisons les plus fréquentes.
    /// `total_requested` fixe les seuils de nouveauté vis-à-vis de la grille.
    pub fn draw_by_lucky(&mut self, coupon: &mut Coupon, count: usize, total_requested: usize) -> Result<usize> {
        let pairs = mine_lucky(&self.history.draws, 2)?;
        if pairs.is_empty() {
            warn!("aucune paire chanceuse, repli sur la distribution normale");
            for _ in 0..count {
                let (draw, relaxed) = self.escalate(Strategy::Normal, coupon)?;
                coupon.push(draw.with_label(Strategy::Normal.label()), relaxed);
            }
            return Ok(count);
        }
        let triples = mine_lucky(&self.history.draws, 3)?;
        let ranked_pairs = pairs.ranked();
        let ranked_triples = triples.ranked();
        let normal_globe = build_globe(Arrangement::Normal, &self.stats);
        let third = total_requested / 3;

        for i in 0..count {
            let novelty = if coupon.len() < third {
                2
            } else if coupon.len() < 2 * third {
                3
            } else {
                4
            };
            let previous = coupon.plain_draws();
            let mut attempts = 0;
            let (draw, relaxed) = loop {
                let draw = self.lucky_candidate(i, &pairs, &ranked_pairs, &ranked_triples, &normal_globe)?;
                attempts += 1;
                if !has_match(&draw, novelty, &previous) {
                    break (draw, false);
                }
                if attempts >= self.config.lucky_attempts {
                    warn!(novelty, attempts, "tirage chanceux relâché");
                    break (draw, true);
                }
            };
            coupon.push(draw, relaxed);
        }
        Ok(count)
    }

    fn lucky_candidate(
        &mut self,
        index: usize,
        pairs: &CoOccurrenceTable,
        ranked_pairs: &[LuckyEntry],
        ranked_triples: &[LuckyEntry],
        normal_globe: &[Ball],
    ) -> Result<Draw> {
        let floor = self.config.lucky_floor();
        let draw_ball = self.config.draw_ball;
        let mut balls: Vec<Ball> = Vec::with_capacity(draw_ball);
        let label;
        let mut anchor;

        if index < 2 && !ranked_triples.is_empty() {
            let top = ranked_triples.len().min(self.config.lucky_top);
            let mut seed = ranked_triples[self.rng.random_range(0..top)].subset.balls().to_vec();
            seed.shuffle(&mut self.rng);
            anchor = seed[1];
            if index == 0 {
                balls.extend_from_slice(&seed);
                label = LUCKY_3_LABEL;
            } else {
                // La boule du milieu sert d'ancre sans entrer dans le tirage.
                balls.push(seed[0]);
                balls.push(seed[2]);
                label = LUCKY_2_OF_3_LABEL;
            }
        } else {
            let eligible: Vec<&LuckyEntry> = pairs.entries().iter().filter(|e| e.count >= floor).collect();
            let entry = if eligible.is_empty() {
                let top = ranked_pairs.len().min(self.config.lucky_top);
                &ranked_pairs[self.rng.random_range(0..top)]
            } else {
                eligible[self.rng.random_range(0..eligible.len())]
            };
            let mut seed = entry.subset.balls().to_vec();
            seed.shuffle(&mut self.rng);
            anchor = seed[1];
            balls.extend_from_slice(&seed);
            label = LUCKY_2_LABEL;
        }
        balls.truncate(draw_ball);

        let params = GaussParams::from(self.config);
        while balls.len() < draw_ball {
            let next = match self.walk_partners(pairs, anchor, floor, &balls) {
                Some(ball) => ball,
                None => pick_distinct(normal_globe, &balls, &mut self.rng, params)?,
            };
            balls.push(next);
            anchor = next;
        }

        Ok(Draw::new(balls).sorted().with_label(label))
    }

    /// Marche aléatoire sur les paires dont le compte atteint `floor`, jusqu'à une boule libre.
    fn walk_partners(&mut self, pairs: &CoOccurrenceTable, start: Ball, floor: u32, taken: &[Ball]) -> Option<Ball> {
        let mut current = start;
        for _ in 0..MAX_LUCKY_WALK {
            let options: Vec<Ball> = pairs
                .partners_of(current, floor)
                .filter_map(|e| e.subset.balls().iter().copied().find(|&b| b != current))
                .collect();
            if options.is_empty() {
                return None;
            }
            current = options[self.rng.random_range(0..options.len())];
            if !taken.contains(&current) {
                return Some(current);
            }
        }
        None
    }

    /// `count` boules super star distinctes si possible, une par tirage.
    pub fn draw_supplementary(&mut self, count: usize) -> Result<Coupon> {
        let mut coupon = Coupon::new();
        if self.config.total_ball_ss == 0 {
            return Ok(coupon);
        }
        let engine = DrawEngine::new(&self.history.supplementary, self.config);

        for _ in 0..count {
            let previous = coupon.plain_draws();
            let mut last = None;
            let mut fresh = None;

            'search: for strategy in SUPER_STAR_SEQUENCE {
                for _ in 0..SUPER_STAR_TRIES {
                    let outcome = engine.draw(strategy, &self.ss_stats, 1, AcceptancePolicy::NONE, &mut self.rng)?;
                    if !has_any_ball(&outcome.draw, &previous) {
                        fresh = Some(outcome.draw);
                        break 'search;
                    }
                    last = Some(outcome.draw);
                }
            }

            match (fresh, last) {
                (Some(draw), _) => coupon.push(draw.with_label(SUPER_STAR_LABEL), false),
                (None, Some(draw)) => coupon.push(draw.with_label(SUPER_STAR_LABEL), true),
                (None, None) => {}
            }
        }
        Ok(coupon)
    }
}
