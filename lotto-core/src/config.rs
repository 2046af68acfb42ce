use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LottoError, Result};

/// Largeur du masque de bits utilisé par le moteur de combinaisons.
pub const MAX_BALL: u8 = 128;

/// Borne haute de `shuffle_scale` ; au-delà le mélange aléatoire ne termine plus en pratique.
pub const MAX_SHUFFLE_SCALE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nombre total de boules dans la sphère.
    pub total_ball: u8,
    /// Nombre de boules « super star » (0 si le jeu n'en a pas).
    pub total_ball_ss: u8,
    /// Nombre de boules par tirage.
    pub draw_ball: usize,
    /// Pourcentage de base pour choisir la gauche à chaque niveau de la planche de Galton.
    pub gauss_left_base: u32,
    /// Amplitude du tirage ajouté au pourcentage de base (0..jitter).
    pub gauss_left_jitter: u32,
    /// Nombre de tentatives de l'échelle d'escalade (4 paliers égaux).
    pub escalation_attempts: usize,
    /// Tentatives par tirage en mode numéros chanceux.
    pub lucky_attempts: usize,
    /// Nombre de combinaisons de tête dans lesquelles on choisit la graine chanceuse.
    pub lucky_top: usize,
    /// Facteur appliqué au nombre de déplacements du mélange aléatoire.
    pub shuffle_scale: f64,
    pub date_reference: NaiveDate,
    pub date_seed_base: u64,
    pub date_seed_multiplier: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::super_lotto()
    }
}

impl Config {
    pub fn super_lotto() -> Self {
        Self {
            total_ball: 60,
            total_ball_ss: 0,
            draw_ball: 6,
            gauss_left_base: 49,
            gauss_left_jitter: 2,
            escalation_attempts: 40,
            lucky_attempts: 40,
            lucky_top: 10,
            shuffle_scale: 1.0,
            date_reference: NaiveDate::from_ymd_opt(2021, 7, 12).unwrap_or_default(),
            date_seed_base: 4_532_632,
            date_seed_multiplier: 106.5,
        }
    }

    pub fn sayisal() -> Self {
        Self {
            total_ball: 90,
            total_ball_ss: 90,
            ..Self::super_lotto()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| LottoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_ball == 0 || self.total_ball > MAX_BALL {
            return Err(LottoError::InvalidConfig(format!(
                "total_ball = {} (attendu 1-{})",
                self.total_ball, MAX_BALL
            )));
        }
        if self.total_ball_ss > MAX_BALL {
            return Err(LottoError::InvalidConfig(format!(
                "total_ball_ss = {} (maximum {})",
                self.total_ball_ss, MAX_BALL
            )));
        }
        if self.draw_ball < 2 || self.draw_ball > self.total_ball as usize {
            return Err(LottoError::InvalidConfig(format!(
                "draw_ball = {} pour {} boules",
                self.draw_ball, self.total_ball
            )));
        }
        let left_max = self.gauss_left_base.checked_add(self.gauss_left_jitter);
        if left_max.map_or(true, |p| p > 100) || self.gauss_left_jitter == 0 {
            return Err(LottoError::InvalidConfig(format!(
                "probabilité gauche {}+[0,{}) hors de [0,100]",
                self.gauss_left_base, self.gauss_left_jitter
            )));
        }
        if self.escalation_attempts == 0 || self.lucky_attempts == 0 || self.lucky_top == 0 {
            return Err(LottoError::InvalidConfig(
                "les compteurs de tentatives doivent être > 0".to_string(),
            ));
        }
        if !(self.shuffle_scale > 0.0 && self.shuffle_scale <= MAX_SHUFFLE_SCALE) {
            return Err(LottoError::InvalidConfig(format!(
                "shuffle_scale = {} hors de ]0,{}]",
                self.shuffle_scale, MAX_SHUFFLE_SCALE
            )));
        }
        Ok(())
    }

    /// Seuil minimal de co-occurrence pour qu'une paire serve au remplissage chanceux.
    pub fn lucky_floor(&self) -> u32 {
        let n = self.total_ball as u32;
        (180 + n - 1) / n + 1
    }
}
