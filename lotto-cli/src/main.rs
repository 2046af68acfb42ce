mod display;
mod import;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lotto_core::combination::{match_counts, match_report};
use lotto_core::config::Config;
use lotto_core::coupon::CouponAssembler;
use lotto_core::lucky::mine_lucky;
use lotto_core::models::DrawHistory;
use lotto_core::stats::compute_stats;

use crate::display::{
    coupon_text, display_coupon, display_import_summary, display_lucky, display_match_counts,
    display_match_report, display_stats,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Game {
    /// 6 numéros parmi 60
    #[default]
    Super,
    /// 6 numéros parmi 90, plus une super star parmi 90
    Sayisal,
}

#[derive(Parser)]
#[command(name = "lotto", about = "Statistiques et génération de grilles de loto")]
struct Cli {
    /// Fichier d'historique (date puis numéros, séparés par des tabulations)
    #[arg(long, global = true, default_value = "super.txt")]
    history: PathBuf,

    /// Fichier de configuration JSON (remplace le préréglage du jeu)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Préréglage du jeu
    #[arg(long, global = true, default_value = "super")]
    game: Game,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fréquence de chaque numéro dans l'historique
    Stats,

    /// Combinaisons communes entre tirages passés
    Matches {
        /// Taille des combinaisons détaillées (2-6) ; sans valeur, seulement les totaux
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=6))]
        comb: Option<u8>,
    },

    /// Combinaisons les plus souvent sorties ensemble
    Lucky {
        /// Taille des combinaisons (2-4)
        #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(2..=4))]
        comb: u8,

        /// Nombre de lignes affichées
        #[arg(short, long, default_value = "30")]
        top: usize,
    },

    /// Générer une grille
    Draw {
        /// Nombre de tirages (1-50)
        #[arg(short, long, default_value = "8", value_parser = clap::value_parser!(u8).range(1..=50))]
        count: u8,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Écrire aussi la grille dans ce fichier
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.game)?;
    let history = load_history(&cli.history, &config)?;

    match cli.command {
        Command::Stats => cmd_stats(&history, &config),
        Command::Matches { comb } => cmd_matches(&history, comb.map(usize::from)),
        Command::Lucky { comb, top } => cmd_lucky(&history, comb as usize, top),
        Command::Draw { count, seed, output } => {
            cmd_draw(&history, &config, count as usize, seed, output.as_deref())
        }
    }
}

fn load_config(path: Option<&Path>, game: Game) -> Result<Config> {
    let Some(path) = path else {
        return Ok(match game {
            Game::Super => Config::super_lotto(),
            Game::Sayisal => Config::sayisal(),
        });
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config = Config::from_json(&json)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    info!(total_ball = config.total_ball, draw_ball = config.draw_ball, "configuration chargée");
    Ok(config)
}

fn load_history(path: &Path, config: &Config) -> Result<DrawHistory> {
    let result = import::import_history(path, config)?;
    display_import_summary(&result);
    if result.history.is_empty() {
        warn!(?path, "aucun tirage valide, statistiques vides");
    }
    Ok(result.history)
}

fn cmd_stats(history: &DrawHistory, config: &Config) -> Result<()> {
    let stats = compute_stats(&history.draws, config.total_ball);
    display_stats(&stats, &format!("Numéros (1-{})", config.total_ball), history.len());

    if config.total_ball_ss > 0 && !history.supplementary.is_empty() {
        let ss_stats = compute_stats(&history.supplementary, config.total_ball_ss);
        display_stats(
            &ss_stats,
            &format!("Super star (1-{})", config.total_ball_ss),
            history.supplementary.len(),
        );
    }
    Ok(())
}

fn cmd_matches(history: &DrawHistory, comb: Option<usize>) -> Result<()> {
    let spinner = spinner("Comparaison des tirages...");
    let counts = match_counts(&history.draws);
    let report = comb.map(|k| match_report(&history.draws, k)).transpose()?;
    spinner.finish_and_clear();

    display_match_counts(&counts);
    if let (Some(k), Some(pairs)) = (comb, report) {
        display_match_report(&history.draws, &pairs, k);
    }
    Ok(())
}

fn cmd_lucky(history: &DrawHistory, comb: usize, top: usize) -> Result<()> {
    let spinner = spinner("Recherche des combinaisons chanceuses...");
    let table = mine_lucky(&history.draws, comb)?;
    spinner.finish_and_clear();

    display_lucky(&table, top);
    Ok(())
}

fn cmd_draw(
    history: &DrawHistory,
    config: &Config,
    count: usize,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let today = chrono::Local::now().date_naive();

    let spinner = spinner("Génération de la grille...");
    let mut assembler = CouponAssembler::new(config, history, today, rng)?;
    let coupon = assembler.generate(count)?;
    let super_stars = assembler.draw_supplementary(count)?;
    spinner.finish_and_clear();

    display_coupon(&coupon, &super_stars);

    if let Some(path) = output {
        std::fs::write(path, coupon_text(&coupon, &super_stars))
            .with_context(|| format!("Impossible d'écrire {:?}", path))?;
        println!("\nGrille écrite dans {}", path.display());
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
