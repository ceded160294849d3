use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use luckylife_analysis::analyzer::Analyzer;
use luckylife_analysis::correlation::CorrelationResult;
use luckylife_analysis::patterns::CombinationPattern;
use luckylife_analysis::recommend::RecommendedSet;
use luckylife_analysis::stats::{ChiSquareSummary, NumberInfo};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct DateRange {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct Metadata {
    total_drawings: usize,
    date_range: Option<DateRange>,
    randomness_score: f64,
    chi_square: ChiSquareSummary,
}

#[derive(Debug, Serialize)]
struct PatternSection<'a> {
    odd_even: &'a BTreeMap<String, u32>,
    sum_ranges: &'a BTreeMap<u32, u32>,
    consecutive: u32,
    top_pairs: Vec<&'a CombinationPattern>,
}

#[derive(Debug, Serialize)]
struct ExportReport<'a> {
    metadata: Metadata,
    main_numbers: &'a [NumberInfo],
    lucky_balls: &'a [NumberInfo],
    patterns: PatternSection<'a>,
    recommendations: Vec<RecommendedSet>,
    #[serde(skip_serializing_if = "no_results")]
    correlations: &'a [CorrelationResult],
}

fn no_results(results: &&[CorrelationResult]) -> bool {
    results.is_empty()
}

fn build_report(analyzer: &Analyzer) -> ExportReport<'_> {
    let chi_square = analyzer.chi_square();
    let stats = analyzer.patterns().stats();

    ExportReport {
        metadata: Metadata {
            total_drawings: analyzer.total_drawings(),
            date_range: analyzer.store().date_range().map(|(start, end)| DateRange {
                start: start.format("%m/%d/%Y").to_string(),
                end: end.format("%m/%d/%Y").to_string(),
            }),
            randomness_score: chi_square.randomness_score,
            chi_square,
        },
        main_numbers: analyzer.main_stats().numbers(),
        lucky_balls: analyzer.lucky_stats().numbers(),
        patterns: PatternSection {
            odd_even: &stats.odd_even,
            sum_ranges: &stats.sum_ranges,
            consecutive: stats.consecutive_count,
            top_pairs: analyzer.patterns().top_pairs(10),
        },
        recommendations: analyzer.scorer().recommendations(5),
        correlations: analyzer.correlations().results(),
    }
}

pub fn write_json<W: Write>(analyzer: &Analyzer, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &build_report(analyzer))
        .context("Échec de la sérialisation JSON")
}

/// Une ligne par numéro principal.
pub fn write_csv<W: Write>(analyzer: &Analyzer, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "Number",
        "Total Frequency",
        "Recent Frequency",
        "Average Gap",
        "Current Gap",
        "Last Drawn",
        "Chi-Square Component",
    ])?;

    for info in analyzer.main_stats().iter() {
        let last_drawn = info
            .last_seen_date
            .map(|d| d.format("%m/%d/%Y").to_string())
            .unwrap_or_default();
        wtr.write_record([
            info.number.to_string(),
            info.total_frequency.to_string(),
            info.recent_frequency.to_string(),
            format!("{:.2}", info.average_gap),
            info.current_gap.to_string(),
            last_drawn,
            format!("{:.4}", info.chi_square_component),
        ])?;
    }

    wtr.flush().context("Échec de l'écriture CSV")?;
    Ok(())
}

/// Exporte vers `output`, ou sur la sortie standard si aucun chemin n'est donné.
pub fn export(analyzer: &Analyzer, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Impossible de créer {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Json => write_json(analyzer, &mut writer)?,
        ExportFormat::Csv => write_csv(analyzer, &mut writer)?,
    }
    writer.flush().context("Échec de l'écriture de l'export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckylife_analysis::config::AnalysisConfig;
    use luckylife_db::store::{sample_drawings, DrawingStore};

    fn analyzer() -> Analyzer {
        Analyzer::new(sample_drawings(), AnalysisConfig::default())
    }

    #[test]
    fn test_json_structure() {
        let mut buf = Vec::new();
        write_json(&analyzer(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["metadata"]["total_drawings"], 5);
        assert_eq!(value["metadata"]["date_range"]["start"], "01/03/2024");
        assert_eq!(value["metadata"]["date_range"]["end"], "01/15/2024");
        assert_eq!(value["main_numbers"].as_array().unwrap().len(), 48);
        assert_eq!(value["lucky_balls"].as_array().unwrap().len(), 18);
        assert_eq!(value["main_numbers"][22]["total_frequency"], 3);
        assert_eq!(value["patterns"]["consecutive"], 0);
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 5);
        assert!(value.get("correlations").is_none());
    }

    #[test]
    fn test_json_empty_history() {
        let empty = Analyzer::new(DrawingStore::default(), AnalysisConfig::default());
        let mut buf = Vec::new();
        write_json(&empty, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["metadata"]["date_range"].is_null());
        assert_eq!(value["metadata"]["randomness_score"], 100.0);
    }

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        write_csv(&analyzer(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 49);
        assert_eq!(
            lines[0],
            "Number,Total Frequency,Recent Frequency,Average Gap,Current Gap,Last Drawn,Chi-Square Component"
        );
        // 5 : indices 2 et 4, dernier tirage le 15/01
        assert!(lines[5].starts_with("5,2,2,2.00,4,01/15/2024,"));
        // 1 : jamais tiré
        assert!(lines[1].starts_with("1,0,0,0.00,0,,"));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("luckylife_export_{}.csv", std::process::id()));
        export(&analyzer(), ExportFormat::Csv, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text.lines().count(), 49);
    }
}
