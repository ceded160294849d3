use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};

use luckylife_db::models::{validate_drawing, Drawing};
use luckylife_db::store::DrawingStore;

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y")
        .with_context(|| format!("Date invalide (attendu MM/JJ/AAAA) : '{}'", raw))
}

fn parse_record(record: &csv::StringRecord) -> Result<Drawing> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let date = parse_date(get(0)?)?;
    let numbers: [u8; 5] = [get_u8(1)?, get_u8(2)?, get_u8(3)?, get_u8(4)?, get_u8(5)?];
    let lucky_ball = get_u8(6)?;
    validate_drawing(&numbers, lucky_ball)?;

    Ok(Drawing {
        date,
        numbers,
        lucky_ball,
        index: 0,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_records: u32,
    pub imported: u32,
    pub skipped: u32,
}

/// Lit un historique CSV (le plus récent en premier) et renvoie les tirages
/// du plus ancien au plus récent. Les lignes invalides sont ignorées.
pub fn read_drawings<R: Read>(input: R) -> (DrawingStore, ImportResult) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut result = ImportResult::default();
    let mut drawings = Vec::new();

    for record_result in reader.records() {
        result.total_records += 1;
        let parsed = record_result
            .context("Ligne CSV illisible")
            .and_then(|record| parse_record(&record));
        match parsed {
            Ok(drawing) => {
                drawings.push(drawing);
                result.imported += 1;
            }
            Err(e) => {
                warn!("Ligne {} ignorée : {:#}", result.total_records + 1, e);
                result.skipped += 1;
            }
        }
    }

    drawings.reverse();
    (DrawingStore::new(drawings), result)
}

pub fn import_csv(path: &Path) -> Result<(DrawingStore, ImportResult)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let (store, result) = read_drawings(file);
    info!(
        "{:?} : {} lignes, {} tirages importés, {} ignorés",
        path, result.total_records, result.imported, result.skipped
    );
    Ok((store, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = "\
Date,Number 1,Number 2,Number 3,Number 4,Number 5,Lucky Ball
01/15/2024,5,12,23,34,45,7
01/12/2024,3,15,22,38,44,12
01/09/2024,5,18,23,35,42,7
01/06/2024,7,12,25,33,48,15
01/03/2024,2,11,23,34,41,3
";

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("01/15/2024").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parse_date(" 12/31/2023 ").unwrap(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(parse_date("2024-01-15").is_err());
        assert!(parse_date("13/01/2024").is_err());
    }

    #[test]
    fn test_read_reverses_to_oldest_first() {
        let (store, result) = read_drawings(HISTORY.as_bytes());
        assert_eq!(result, ImportResult { total_records: 5, imported: 5, skipped: 0 });
        assert_eq!(store.len(), 5);

        let first = store.get(0).unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(first.numbers, [2, 11, 23, 34, 41]);
        assert_eq!(first.index, 0);
        assert_eq!(store.get(4).unwrap().lucky_ball, 7);
        assert_eq!(store.drawings(), luckylife_db::store::sample_drawings().drawings());
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let input = "\
Date,Number 1,Number 2,Number 3,Number 4,Number 5,Lucky Ball
01/15/2024,5,12,23,34,45,7
not a date,1,2,3,4,5,6
01/12/2024,3,15,22,38
01/11/2024,3,3,22,38,44,12
01/10/2024,3,15,22,38,49,12
01/09/2024,3,15,22,38,44,19
01/08/2024,x,15,22,38,44,1
01/06/2024,7,12,25,33,48,15
";
        let (store, result) = read_drawings(input.as_bytes());
        assert_eq!(result.total_records, 8);
        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 6);
        assert_eq!(store.get(0).unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    }

    #[test]
    fn test_header_only() {
        let (store, result) = read_drawings("Date,N1,N2,N3,N4,N5,LB\n".as_bytes());
        assert!(store.is_empty());
        assert_eq!(result, ImportResult::default());
    }

    #[test]
    fn test_import_csv_from_file() {
        let path = std::env::temp_dir().join(format!("luckylife_import_{}.csv", std::process::id()));
        std::fs::write(&path, HISTORY).unwrap();
        let (store, result) = import_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(result.imported, 5);
        assert_eq!(store.len(), 5);

        assert!(import_csv(Path::new("/nonexistent/luckylife.csv")).is_err());
    }
}
