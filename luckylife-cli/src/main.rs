mod display;
mod export;
mod import;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use luckylife_analysis::analyzer::Analyzer;
use luckylife_analysis::cancel::CancelFlag;
use luckylife_analysis::config::AnalysisConfig;
use luckylife_analysis::recommend::Strategy;

use crate::export::ExportFormat;

#[derive(Parser)]
#[command(name = "luckylife", about = "Analyse statistique et cosmique des tirages Lucky for Life")]
struct Cli {
    /// Historique CSV (Date MM/JJ/AAAA, 5 numéros, Lucky Ball ; le plus récent en premier)
    #[arg(short, long, global = true, default_value = "data/lucky-numbers-history.csv")]
    file: PathBuf,

    /// Taille de la fenêtre « récente » (nombre de tirages)
    #[arg(short, long, global = true, default_value = "50")]
    recent: usize,

    /// Multiplicateur d'écart moyen au-delà duquel un numéro est en retard
    #[arg(short, long, global = true, default_value = "1.5")]
    gap_multiplier: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Résumé : numéros fréquents, chauds, en retard et une recommandation
    Summary,

    /// Rapport détaillé (fréquences, motifs, recommandations)
    Report {
        /// Inclure les corrélations cosmiques notables
        #[arg(long)]
        cosmic: bool,
    },

    /// Test du χ², dispersion des fréquences et écarts
    Statistical,

    /// Corrélations cosmiques et grille du jour
    Cosmic,

    /// Recommandations par stratégie
    Recommend {
        /// Stratégie (balanced, hot, overdue, pattern, frequency) ; toutes si absent
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Nombre de grilles (une par stratégie)
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Exporter l'analyse en JSON ou CSV
    Export {
        /// Format de sortie
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Fichier de sortie (sortie standard si absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Inclure les corrélations cosmiques (JSON)
        #[arg(long)]
        cosmic: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AnalysisConfig {
        recent_window: cli.recent,
        min_gap_multiplier: cli.gap_multiplier,
        ..AnalysisConfig::default()
    };

    let (store, result) = import::import_csv(&cli.file)?;
    if result.skipped > 0 {
        display::display_import_summary(&result);
    }
    let mut analyzer = Analyzer::new(store, config);

    match cli.command {
        Command::Summary => display::display_summary(&analyzer),
        Command::Report { cosmic } => {
            if cosmic {
                run_cosmic(&mut analyzer)?;
            }
            display::display_detailed(&analyzer);
        }
        Command::Statistical => display::display_statistical(&analyzer),
        Command::Cosmic => {
            run_cosmic(&mut analyzer)?;
            let today = chrono::Local::now().date_naive();
            display::display_cosmic(&analyzer, today);
        }
        Command::Recommend { strategy, count } => cmd_recommend(&analyzer, strategy, count),
        Command::Export { format, output, cosmic } => {
            if cosmic {
                run_cosmic(&mut analyzer)?;
            }
            export::export(&analyzer, format, output.as_deref())?;
            if let Some(path) = output {
                println!("Export écrit dans {}", path.display());
            }
        }
    }

    Ok(())
}

fn run_cosmic(analyzer: &mut Analyzer) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Gabarit de progression invalide")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Calcul des données cosmiques...");

    let summary = analyzer
        .enrich_cosmic(&CancelFlag::new())
        .context("Enrichissement cosmique interrompu")?;
    pb.set_message("Calcul des corrélations...");
    let count = analyzer.analyze_correlations().len();
    pb.finish_and_clear();

    info!(
        "{} dates enrichies ({} années), {} corrélations",
        summary.cached, summary.years, count
    );
    Ok(())
}

fn cmd_recommend(analyzer: &Analyzer, strategy: Option<Strategy>, count: usize) {
    let scorer = analyzer.scorer();
    match strategy {
        Some(strategy) => {
            display::display_recommendations(&[scorer.select_set(strategy)]);
            display::display_strategy_scores(analyzer, strategy, 10);
        }
        None => display::display_recommendations(&scorer.recommendations(count)),
    }
}
