use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::warn;

use lotto_core::config::Config;
use lotto_core::models::{Ball, DATE_FORMAT, Draw, DrawHistory, validate_draw};

/// Une ligne de l'historique ; le joker éventuel est vérifié puis ignoré.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub draw: Draw,
    pub super_star: Option<Ball>,
}

fn parse_record(record: &csv::StringRecord, config: &Config) -> Result<HistoryRow> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_ball = |idx: usize| -> Result<Ball> {
        let s = get(idx)?;
        s.parse::<Ball>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let date = parse_date(get(0)?)?;

    let draw_ball = config.draw_ball;
    let balls = (1..=draw_ball).map(|i| get_ball(i)).collect::<Result<Vec<Ball>>>()?;
    validate_draw(&balls, config.total_ball, draw_ball)?;

    let extra = |idx: usize| -> Result<Option<Ball>> {
        match record.get(idx).map(str::trim) {
            None | Some("") => Ok(None),
            Some(_) => get_ball(idx).map(Some),
        }
    };
    extra(draw_ball + 1)?;
    let super_star = extra(draw_ball + 2)?;

    if let Some(ss) = super_star {
        if ss < 1 || ss > config.total_ball_ss {
            bail!("Super star {} hors limites (1-{})", ss, config.total_ball_ss);
        }
    }

    Ok(HistoryRow { draw: Draw::dated(&date, balls), super_star })
}

/// Normalise "1.2.2020" en "01.02.2020".
pub fn parse_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format(DATE_FORMAT).to_string())
}

pub struct ImportResult {
    pub history: DrawHistory,
    pub total_records: u32,
    pub errors: u32,
}

pub fn import_history(path: &Path, config: &Config) -> Result<ImportResult> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    Ok(read_history(reader, config))
}

fn read_history<R: std::io::Read>(mut reader: csv::Reader<R>, config: &Config) -> ImportResult {
    let mut draws = Vec::new();
    let mut supplementary = Vec::new();
    let mut total_records = 0u32;
    let mut errors = 0u32;

    for record_result in reader.records() {
        total_records += 1;
        match record_result {
            Ok(record) => {
                if record.iter().all(|f| f.trim().is_empty()) {
                    total_records -= 1;
                    continue;
                }
                match parse_record(&record, config) {
                    Ok(row) => {
                        if config.total_ball_ss > 0 {
                            if let Some(ss) = row.super_star {
                                let mut ss_draw = Draw::new(vec![ss]);
                                ss_draw.date = row.draw.date.clone();
                                supplementary.push(ss_draw);
                            }
                        }
                        draws.push(row.draw);
                    }
                    Err(e) => {
                        warn!(ligne = total_records, "Erreur parsing : {:#}", e);
                        errors += 1;
                    }
                }
            }
            Err(e) => {
                warn!(ligne = total_records, "Erreur lecture : {}", e);
                errors += 1;
            }
        }
    }

    ImportResult {
        history: DrawHistory::with_supplementary(draws, supplementary),
        total_records,
        errors,
    }
}
