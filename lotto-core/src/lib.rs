pub mod combination;
pub mod config;
pub mod coupon;
pub mod date_seed;
pub mod error;
pub mod gauss;
pub mod globe;
pub mod lucky;
pub mod models;
pub mod stats;
pub mod strategy;
