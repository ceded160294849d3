use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use luckylife_analysis::analyzer::Analyzer;
use luckylife_analysis::correlation::{CorrelationResult, Factor, Significance};
use luckylife_analysis::cosmic::CosmicData;
use luckylife_analysis::recommend::{RecommendedSet, Strategy};
use luckylife_analysis::stats::NumberInfo;
use luckylife_db::models::Pool;

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn format_ratio(info: &NumberInfo) -> String {
    info.overdue_ratio()
        .map(|r| format!("{:.2}x", r))
        .unwrap_or_else(|| "—".to_string())
}

fn significance_color(significance: Significance) -> Color {
    match significance {
        Significance::High => Color::Green,
        Significance::Moderate => Color::Cyan,
        Significance::Low => Color::Yellow,
        Significance::None => Color::White,
    }
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Importés          : {}", result.imported);
    if result.skipped > 0 {
        println!("  Lignes ignorées   : {}", result.skipped);
    }
}

fn frequency_table(infos: &[&NumberInfo]) -> Table {
    let mut table = new_table(vec!["Numéro", "Fréquence", "Récents", "Écart moyen", "Écart courant", "Dernière sortie"]);
    for info in infos {
        table.add_row(vec![
            format!("{:2}", info.number),
            info.total_frequency.to_string(),
            info.recent_frequency.to_string(),
            format!("{:.1}", info.average_gap),
            info.current_gap.to_string(),
            format_date(info.last_seen_date),
        ]);
    }
    table
}

fn overdue_table(infos: &[&NumberInfo]) -> Table {
    let mut table = new_table(vec!["Numéro", "Écart courant", "Écart moyen", "Ratio"]);
    for info in infos {
        table.add_row(vec![
            format!("{:2}", info.number),
            info.current_gap.to_string(),
            format!("{:.1}", info.average_gap),
            format_ratio(info),
        ]);
    }
    table
}

pub fn display_recommendations(sets: &[RecommendedSet]) {
    let mut table = new_table(vec!["Stratégie", "Numéros", "Lucky Ball", "Confiance", "Explication"]);
    for set in sets {
        table.add_row(vec![
            set.strategy.clone(),
            format_numbers(&set.numbers),
            set.lucky_ball.map(|b| format!("{:2}", b)).unwrap_or_else(|| "—".to_string()),
            format!("{:.1} %", set.confidence * 100.0),
            set.explanation.clone(),
        ]);
    }
    println!("{table}");
}

pub fn display_strategy_scores(analyzer: &Analyzer, strategy: Strategy, top: usize) {
    println!("\n── Scores « {} » ──", strategy);
    let mut table = new_table(vec!["Numéro", "Score", "Facteurs"]);
    for scored in analyzer.scorer().score(strategy).iter().take(top) {
        table.add_row(vec![
            format!("{:2}", scored.number),
            format!("{:.1}", scored.score),
            scored.factors.join(", "),
        ]);
    }
    println!("{table}");
}

pub fn display_summary(analyzer: &Analyzer) {
    let Some((start, end)) = analyzer.store().date_range() else {
        println!("Aucun tirage à analyser.");
        return;
    };
    println!(
        "\n🍀 {} tirages du {} au {}\n",
        analyzer.total_drawings(),
        start.format("%d/%m/%Y"),
        end.format("%d/%m/%Y")
    );

    println!("── Numéros les plus fréquents ──");
    println!("{}", frequency_table(&analyzer.top_numbers(Pool::Main, 10, false)));

    println!("\n── Numéros chauds (fenêtre de {} tirages) ──", analyzer.config().recent_window);
    println!("{}", frequency_table(&analyzer.top_numbers(Pool::Main, 5, true)));

    println!("\n── Numéros en retard ──");
    let overdue = analyzer.overdue_numbers(Pool::Main, 10);
    if overdue.is_empty() {
        println!("Aucun numéro au-delà de {:.1}x son écart moyen.", analyzer.config().min_gap_multiplier);
    } else {
        println!("{}", overdue_table(&overdue));
    }

    println!("\n── Lucky Ball ──");
    println!("{}", frequency_table(&analyzer.top_numbers(Pool::LuckyBall, 5, false)));

    println!("\n── Recommandation ──");
    display_recommendations(&[analyzer.scorer().select_set(Strategy::Balanced)]);
    println!("\nScore de hasard : {:.1}/100", analyzer.randomness_score());
}

fn display_patterns(analyzer: &Analyzer) {
    let stats = analyzer.patterns().stats();
    let total = analyzer.total_drawings().max(1) as f64;

    println!("\n── Pair / impair ──");
    let mut table = new_table(vec!["Répartition", "Tirages", "%"]);
    for (label, count) in &stats.odd_even {
        table.add_row(vec![
            label.clone(),
            count.to_string(),
            format!("{:.1}", *count as f64 / total * 100.0),
        ]);
    }
    println!("{table}");

    println!("\n── Sommes ──");
    let mut table = new_table(vec!["Tranche", "Tirages", "%"]);
    for (bucket, count) in &stats.sum_ranges {
        table.add_row(vec![
            format!("{}-{}", bucket, bucket + 19),
            count.to_string(),
            format!("{:.1}", *count as f64 / total * 100.0),
        ]);
    }
    println!("{table}");

    println!("\n── Dizaines ──");
    let mut table = new_table(vec!["Dizaine", "Numéros tirés"]);
    for (decade, count) in &stats.decades {
        let low = decade * 10 + 1;
        let high = (low + 9).min(48);
        table.add_row(vec![format!("{}-{}", low, high), count.to_string()]);
    }
    println!("{table}");

    println!(
        "Tirages avec numéros consécutifs : {} ({:.1} %)",
        stats.consecutive_count,
        stats.consecutive_count as f64 / total * 100.0
    );

    println!("\n── Combinaisons fréquentes ──");
    let mut table = new_table(vec!["Combinaison", "Sorties", "Dernier index"]);
    let patterns = analyzer.patterns();
    for pattern in patterns.top_pairs(10).into_iter().chain(patterns.top_triples(5)) {
        table.add_row(vec![
            pattern.label(),
            pattern.frequency.to_string(),
            pattern.last_seen.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_detailed(analyzer: &Analyzer) {
    if analyzer.total_drawings() == 0 {
        println!("Aucun tirage à analyser.");
        return;
    }
    println!("\n📊 Rapport détaillé ({} tirages)\n", analyzer.total_drawings());

    for pool in [Pool::Main, Pool::LuckyBall] {
        println!("── {} ──", pool);
        let all = analyzer.top_numbers(pool, pool.size(), false);
        println!("{}", frequency_table(&all));

        let overdue = analyzer.overdue_numbers(pool, 10);
        if !overdue.is_empty() {
            println!("\nEn retard :");
            println!("{}", overdue_table(&overdue));
        }
        println!();
    }

    display_patterns(analyzer);

    println!("\n── Recommandations ──");
    display_recommendations(&analyzer.scorer().recommendations(Strategy::ALL.len()));

    let notable: Vec<&CorrelationResult> = analyzer
        .correlations()
        .results()
        .iter()
        .filter(|r| r.significance != Significance::None)
        .collect();
    if !notable.is_empty() {
        println!("\n── Corrélations cosmiques notables ──");
        display_correlation_table(&notable);
    }

    let score = analyzer.randomness_score();
    println!("\nScore de hasard : {:.1}/100", score);
    if score > 90.0 {
        println!("⚠️  Les tirages sont statistiquement indiscernables du hasard : aucune stratégie n'améliore les chances.");
    } else if score > 70.0 {
        println!("⚠️  Léger écart à l'uniformité, compatible avec une fluctuation aléatoire.");
    } else {
        println!("⚠️  Écart notable à l'uniformité : vérifier l'historique importé avant toute conclusion.");
    }
}

pub fn display_statistical(analyzer: &Analyzer) {
    let chi = analyzer.chi_square();
    println!("\n📐 Analyse statistique ({} tirages)\n", analyzer.total_drawings());

    println!("── Test du χ² ──");
    let mut table = new_table(vec!["Pool", "χ²", "ddl", "Valeur critique (95 %)", "Uniforme ?"]);
    for (pool, value) in [(Pool::Main, chi.main), (Pool::LuckyBall, chi.lucky_ball)] {
        let uniform = value <= pool.chi_square_critical();
        table.add_row(vec![
            Cell::new(pool.to_string()),
            Cell::new(format!("{:.3}", value)),
            Cell::new(pool.degrees_of_freedom().to_string()),
            Cell::new(format!("{:.3}", pool.chi_square_critical())),
            Cell::new(if uniform { "oui" } else { "non" }).fg(if uniform { Color::Green } else { Color::Red }),
        ]);
    }
    println!("{table}");
    println!(
        "χ² total : {:.3} (ddl {}), score de hasard {:.1}/100",
        chi.total,
        Pool::Main.degrees_of_freedom() + Pool::LuckyBall.degrees_of_freedom(),
        chi.randomness_score
    );

    println!("\n── Dispersion des fréquences ──");
    let mut table = new_table(vec!["Pool", "Attendue", "Écart-type", "CV (%)", "Hors 2σ"]);
    for pool in [Pool::Main, Pool::LuckyBall] {
        let spread = analyzer.stats(pool).frequency_spread(analyzer.total_drawings());
        table.add_row(vec![
            pool.to_string(),
            format!("{:.2}", spread.expected),
            format!("{:.2}", spread.std_dev),
            format!("{:.1}", spread.coefficient_of_variation),
            spread.outside_two_sigma.to_string(),
        ]);
    }
    println!("{table}");

    println!("\n── Écarts ──");
    let mut table = new_table(vec!["Pool", "Écarts", "Min", "Max", "Moyenne par numéro"]);
    for pool in [Pool::Main, Pool::LuckyBall] {
        let gaps = analyzer.stats(pool).gap_summary();
        let fmt = |v: Option<usize>| v.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
        table.add_row(vec![
            pool.to_string(),
            gaps.count.to_string(),
            fmt(gaps.min),
            fmt(gaps.max),
            format!("{:.1}", gaps.mean_per_number),
        ]);
    }
    println!("{table}");
}

fn display_correlation_table(results: &[&CorrelationResult]) {
    let mut table = new_table(vec!["Facteur", "Détail", "r", "p", "n", "Signif.", "Interprétation"]);
    for r in results {
        table.add_row(vec![
            Cell::new(r.factor.to_string()),
            Cell::new(r.sub_factor.as_deref().unwrap_or("—")),
            Cell::new(format!("{:.3}", r.correlation)),
            Cell::new(format!("{:.3}", r.p_value)),
            Cell::new(r.sample_size.to_string()),
            Cell::new(r.significance.to_string()).fg(significance_color(r.significance)),
            Cell::new(&r.interpretation),
        ]);
    }
    println!("{table}");
}

fn display_conditions(cosmic: &CosmicData) {
    let mut table = new_table(vec!["Condition", "Valeur"]);
    table.add_row(vec![
        "Lune".to_string(),
        format!(
            "{} (phase {:.2}, {:.0} % éclairée)",
            cosmic.moon_phase_name,
            cosmic.moon_phase,
            cosmic.moon_illumination * 100.0
        ),
    ]);
    table.add_row(vec!["Signe".to_string(), cosmic.zodiac_sign.to_string()]);
    table.add_row(vec!["Saison".to_string(), cosmic.seasonal_phase.to_string()]);
    table.add_row(vec!["Jour".to_string(), cosmic.day_of_week.to_string()]);
    table.add_row(vec![
        "Vent solaire".to_string(),
        format!(
            "{:.0} km/s, F10.7 = {:.1}",
            cosmic.solar_activity.solar_wind_speed, cosmic.solar_activity.f107_index
        ),
    ]);
    table.add_row(vec![
        "Météo".to_string(),
        format!(
            "{:.1} °C, {:.0} hPa, {}",
            cosmic.weather.temperature, cosmic.weather.pressure, cosmic.weather.condition
        ),
    ]);
    table.add_row(vec!["Indice Kp".to_string(), format!("{:.1}", cosmic.geomagnetic_index)]);
    table.add_row(vec![
        "Mercure".to_string(),
        if cosmic.is_mercury_retrograde() { "rétrograde" } else { "direct" }.to_string(),
    ]);
    for (planet, angle) in &cosmic.planetary_positions {
        table.add_row(vec![format!("{:?}", planet), format!("{:.1}°", angle)]);
    }
    println!("{table}");
}

pub fn display_cosmic(analyzer: &Analyzer, today: NaiveDate) {
    println!("\n🌌 Rapport cosmique\n");

    let results = analyzer.correlations().results();
    if results.is_empty() {
        println!("Aucune corrélation calculée.");
    }
    for factor in [
        Factor::MoonPhase,
        Factor::SolarActivity,
        Factor::Weather,
        Factor::Temporal,
        Factor::Planetary,
    ] {
        let group: Vec<&CorrelationResult> = results.iter().filter(|r| r.factor == factor).collect();
        if group.is_empty() {
            continue;
        }
        println!("── {} ──", factor);
        display_correlation_table(&group);
        println!();
    }

    println!("── Conditions du {} ──", today.format("%d/%m/%Y"));
    display_conditions(&analyzer.correlations().snapshot(today));

    println!("\n── Grille cosmique ──");
    display_recommendations(&[analyzer.cosmic_pick(today)]);
    println!("\nCes corrélations restent dans la variation aléatoire attendue : chaque tirage a exactement les mêmes chances.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_numbers(&[5, 12, 23]), " 5 - 12 - 23");
        assert_eq!(format_numbers(&[]), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 3)), "03/01/2024");
        assert_eq!(format_date(None), "—");
    }
}
