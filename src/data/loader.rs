use crate::data::bar::{validate_series, Bar};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    amount: Option<f64>,
}

//loads a daily bar series from a csv file
//columns: date (iso-8601), open, high, low, close, volume, amount (optional)
//the series is validated, not repaired: out-of-order dates or bad prices abort the load
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            record.date,
            index + 2
        ))?;

        let bar = Bar::new(
            date,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            record.amount,
        )
        .context(format!("Invalid bar at line {}", index + 2))?;

        bars.push(bar);
    }

    validate_series(&bars).context(format!("Invalid bar series in {:?}", path))?;

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_well_formed_csv() {
        let file = write_csv(
            "date,open,high,low,close,volume,amount\n\
             2024-01-02,10.0,10.5,9.8,10.2,120000,1224000\n\
             2024-01-03,10.2,10.8,10.1,10.6,150000,1590000\n",
        );

        let bars = load_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.2);
        assert_eq!(bars[1].amount, Some(1_590_000.0));
    }

    #[test]
    fn amount_column_is_optional() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-02,10.0,10.5,9.8,10.2,120000\n",
        );

        let bars = load_csv(file.path()).unwrap();
        assert_eq!(bars[0].amount, None);
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-03,10.0,10.5,9.8,10.2,120000\n\
             2024-01-02,10.2,10.8,10.1,10.6,150000\n",
        );

        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn rejects_non_positive_price() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-02,10.0,10.5,-9.8,10.2,120000\n",
        );

        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn rejects_unparseable_date() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             01/02/2024,10.0,10.5,9.8,10.2,120000\n",
        );

        assert!(load_csv(file.path()).is_err());
    }
}
