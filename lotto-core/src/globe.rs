use std::collections::VecDeque;

use crate::models::Ball;
use crate::stats::{BallStats, Order};

/// Ordre de toutes les boules dans la sphère ; l'échantillonneur favorise le centre.
pub type Globe = Vec<Ball>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// Les moins et les plus fréquentes se rejoignent au centre, les moyennes aux bords.
    Blend1,
    /// Alternance moins/plus fréquente depuis le bord gauche : extrêmes aux bords.
    Blend2,
    /// Fréquence croissante, la moins fréquente en premier.
    LeftStacked,
    /// Plus fréquentes aux deux bords, moins fréquentes au centre.
    SideStacked,
    /// Plus fréquentes au centre, moins fréquentes aux bords.
    Normal,
}

pub fn build_globe(arrangement: Arrangement, stats: &BallStats) -> Globe {
    match arrangement {
        Arrangement::Blend1 => blend_center(&stats.ranked(Order::Ascending)),
        Arrangement::Blend2 => blend_edges(&stats.ranked(Order::Ascending)),
        Arrangement::LeftStacked => stats.ranked(Order::Ascending),
        Arrangement::SideStacked => spread_from_center(&stats.ranked(Order::Ascending)),
        Arrangement::Normal => spread_from_center(&stats.ranked(Order::Descending)),
    }
}

/// Ajoute alternativement en tête le suivant du début et en queue le suivant de la fin.
pub(crate) fn blend_center(sorted: &[Ball]) -> Globe {
    let mut globe = VecDeque::with_capacity(sorted.len());
    let (mut front, mut back) = (0usize, sorted.len());
    for k in 0..sorted.len() {
        if k % 2 == 1 {
            back -= 1;
            globe.push_back(sorted[back]);
        } else {
            globe.push_front(sorted[front]);
            front += 1;
        }
    }
    globe.into()
}

fn blend_edges(sorted: &[Ball]) -> Globe {
    let mut globe = Vec::with_capacity(sorted.len());
    let (mut front, mut back) = (0usize, sorted.len());
    while front < back {
        globe.push(sorted[front]);
        front += 1;
        if front < back {
            back -= 1;
            globe.push(sorted[back]);
        }
    }
    globe
}

/// Le premier au centre, puis alternativement en tête et en queue.
fn spread_from_center(sorted: &[Ball]) -> Globe {
    let mut globe = VecDeque::with_capacity(sorted.len());
    for (k, &ball) in sorted.iter().enumerate() {
        if k % 2 == 1 {
            globe.push_front(ball);
        } else {
            globe.push_back(ball);
        }
    }
    globe.into()
}
