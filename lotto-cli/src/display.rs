use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use lotto_core::combination::{MatchCounts, MatchPair, format_subsets};
use lotto_core::lucky::CoOccurrenceTable;
use lotto_core::models::{Ball, Coupon, Draw};
use lotto_core::stats::{BallStats, Order};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_balls(balls: &[Ball]) -> String {
    balls
        .iter()
        .map(|b| format!("{:2}", b))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_draw(draw: &Draw) -> String {
    match &draw.date {
        Some(date) => format!("{}  {}", date, format_balls(&draw.balls)),
        None => format_balls(&draw.balls),
    }
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Historique chargé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Tirages valides   : {}", result.history.len());
    if !result.history.supplementary.is_empty() {
        println!("  Super stars       : {}", result.history.supplementary.len());
    }
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(stats: &BallStats, title: &str, draws: usize) {
    println!("\n📊 {} sur {} tirages\n", title, draws);

    let mut table = new_table(vec!["Rang", "Numéro", "Fréquence"]);
    for (rank, ball) in stats.ranked(Order::Descending).iter().enumerate() {
        table.add_row(vec![
            &(rank + 1).to_string(),
            &format!("{:2}", ball),
            &stats.frequency(*ball).to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_match_counts(counts: &MatchCounts) {
    println!("\n🔗 Combinaisons communes aux tirages passés\n");

    let mut table = new_table(vec!["Taille", "Paires de tirages"]);
    for k in 2..=6 {
        table.add_row(vec![k.to_string(), counts.get(k).to_string()]);
    }
    println!("{table}");
}

pub fn display_match_report(draws: &[Draw], pairs: &[MatchPair], k: usize) {
    println!("\n🔗 Tirages partageant au moins {} numéros : {}\n", k, pairs.len());
    if pairs.is_empty() {
        return;
    }

    let mut header = vec!["Tirage", "Tirage", "Jours"];
    // Au-delà de 4, la liste des sous-ensembles n'apporte rien de plus que les tirages.
    let with_subsets = k < 5;
    if with_subsets {
        header.push("Combinaisons");
    }
    let mut table = new_table(header);

    for pair in pairs {
        let days = pair.days_between.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string());
        let mut row = vec![
            format_draw(&draws[pair.first]),
            format_draw(&draws[pair.second]),
            days,
        ];
        if with_subsets {
            row.push(format_subsets(&pair.subsets));
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_lucky(table_data: &CoOccurrenceTable, limit: usize) {
    println!(
        "\n🍀 Numéros chanceux par {} ({} combinaisons)\n",
        table_data.comb(),
        table_data.len()
    );

    let mut table = new_table(vec!["#", "Combinaison", "Paires", "Tirages"]);
    for (i, entry) in table_data.ranked().iter().take(limit).enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            entry.subset.to_string(),
            entry.count.to_string(),
            format!("{} fois", entry.draws_sharing()),
        ]);
    }
    println!("{table}");
}

pub fn display_coupon(coupon: &Coupon, super_stars: &Coupon) {
    println!("\n🎲 Grille générée\n");

    let with_ss = !super_stars.is_empty();
    let mut header = vec!["#", "Boules"];
    if with_ss {
        header.push("Super star");
    }
    header.push("Stratégie");
    let mut table = new_table(header);

    for (i, generated) in coupon.draws.iter().enumerate() {
        let mut row = vec![
            Cell::new(format!("{:2}", i + 1)),
            Cell::new(format_balls(&generated.draw.balls)),
        ];
        if with_ss {
            let ss = super_stars
                .draws
                .get(i)
                .map(|g| format_balls(&g.draw.balls))
                .unwrap_or_default();
            row.push(Cell::new(ss));
        }
        let label = generated.draw.label.clone().unwrap_or_default();
        if generated.relaxed {
            row.push(Cell::new(format!("{} *", label)).fg(Color::Yellow));
        } else {
            row.push(Cell::new(label));
        }
        table.add_row(row);
    }
    println!("{table}");

    let relaxed = coupon.relaxed_count() + super_stars.relaxed_count();
    if relaxed > 0 {
        println!("* {} tirage(s) accepté(s) sans satisfaire toutes les contraintes", relaxed);
    }
}

/// Version texte de la grille, pour le fichier de sortie.
pub fn coupon_text(coupon: &Coupon, super_stars: &Coupon) -> String {
    let header = if super_stars.is_empty() {
        "     Numéros"
    } else {
        "     Numéros                 Super star"
    };
    let mut lines = vec![header.to_string(), String::new()];

    for (i, generated) in coupon.draws.iter().enumerate() {
        let mut line = format!("{:2} - {}", i + 1, format_balls(&generated.draw.balls));
        if let Some(ss) = super_stars.draws.get(i) {
            line.push_str(&format!("     {}", format_balls(&ss.draw.balls)));
        }
        if let Some(label) = &generated.draw.label {
            line.push_str(&format!("     {}", label));
        }
        lines.push(line);
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balls() {
        assert_eq!(format_balls(&[1, 12, 40]), " 1 - 12 - 40");
    }

    #[test]
    fn test_coupon_text() {
        let mut coupon = Coupon::new();
        coupon.push(Draw::new(vec![1, 2, 3, 4, 5, 6]).with_label("(date 1)"), false);
        coupon.push(Draw::new(vec![10, 20, 30, 40, 50, 60]), true);
        let text = coupon_text(&coupon, &Coupon::new());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "     Numéros");
        assert_eq!(lines[2], " 1 -  1 -  2 -  3 -  4 -  5 -  6     (date 1)");
        assert_eq!(lines[3], " 2 - 10 - 20 - 30 - 40 - 50 - 60");
        assert_eq!(lines.len(), 4);
        assert!(text.ends_with("60\n"));
    }

    #[test]
    fn test_coupon_text_empty_coupon() {
        assert_eq!(coupon_text(&Coupon::new(), &Coupon::new()), "     Numéros\n\n");
    }

    #[test]
    fn test_coupon_text_with_super_star() {
        let mut coupon = Coupon::new();
        coupon.push(Draw::new(vec![1, 2, 3, 4, 5, 6]), false);
        let mut ss = Coupon::new();
        ss.push(Draw::new(vec![7]).with_label("super star"), false);
        let text = coupon_text(&coupon, &ss);
        assert!(text.contains(" 1 -  1 -  2 -  3 -  4 -  5 -  6      7"));
    }
}
