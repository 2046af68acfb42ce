use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LottoError {
    #[error("Domaine invalide pour l'échantillonneur : {0} (doit être > 0)")]
    InvalidDomain(usize),

    #[error("Taille de combinaison non supportée : {0}")]
    InvalidCombination(usize),

    #[error("Tirage invalide : {0}")]
    InvalidDraw(String),

    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LottoError>;
