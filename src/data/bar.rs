use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Invalid OHLC values on {date}: high ({high}) < low ({low})")]
    InvalidHighLow { date: NaiveDate, high: f64, low: f64 },
    #[error("Invalid OHLC values on {date}: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose {
        date: NaiveDate,
        close: f64,
        high: f64,
        low: f64,
    },
    #[error("Invalid OHLC values on {date}: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen {
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
    },
    #[error("Non-positive price on {date}: {field} = {value}")]
    NonPositivePrice {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },
    #[error("Negative volume on {date}: {volume}")]
    NegativeVolume { date: NaiveDate, volume: f64 },
    #[error("Bar dates not strictly increasing: {prev} followed by {next}")]
    OutOfOrder { prev: NaiveDate, next: NaiveDate },
    #[error("Empty bar series")]
    EmptySeries,
    #[error("Insufficient history for {strategy}: need more than {required} bars, got {actual}")]
    InsufficientHistory {
        strategy: String,
        required: usize,
        actual: usize,
    },
}

//one daily ohlcv bar, immutable once produced by the data provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: Option<f64>,
}

impl Bar {
    //creates a new bar with validation
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        amount: Option<f64>,
    ) -> Result<Self, DataError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if value <= 0.0 || !value.is_finite() {
                return Err(DataError::NonPositivePrice { date, field, value });
            }
        }

        if high < low {
            return Err(DataError::InvalidHighLow { date, high, low });
        }

        if close < low || close > high {
            return Err(DataError::InvalidClose { date, close, high, low });
        }

        if open < low || open > high {
            return Err(DataError::InvalidOpen { date, open, high, low });
        }

        if volume < 0.0 || !volume.is_finite() {
            return Err(DataError::NegativeVolume { date, volume });
        }

        Ok(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
            amount,
        })
    }

    //creates a bar without validation
    pub fn new_unchecked(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        amount: Option<f64>,
    ) -> Self {
        Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
            amount,
        }
    }

    //range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

//validates a full series before a run starts: non-empty, strictly increasing
//dates, positive finite prices, non-negative volume
//malformed input is an error here, never silently repaired
pub fn validate_series(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptySeries);
    }

    for bar in bars {
        //re-run the field checks so bars built unchecked still get caught
        Bar::new(
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.amount,
        )?;
    }

    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(DataError::OutOfOrder {
                prev: pair[0].date,
                next: pair[1].date,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bar(s: &str, close: f64) -> Bar {
        Bar::new_unchecked(date(s), close, close, close, close, 1000.0, None)
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = Bar::new(date("2024-01-02"), 10.0, 10.0, 10.0, 10.0, 100.0, None).and_then(|_| {
            Bar::new(date("2024-01-02"), 10.0, 10.0, 0.0, 10.0, 100.0, None)
        });
        assert!(matches!(err, Err(DataError::NonPositivePrice { .. })));
    }

    #[test]
    fn rejects_high_below_low() {
        let err = Bar::new(date("2024-01-02"), 9.5, 9.0, 9.2, 9.1, 100.0, None);
        assert!(matches!(err, Err(DataError::InvalidHighLow { .. })));
    }

    #[test]
    fn rejects_negative_volume() {
        let err = Bar::new(date("2024-01-02"), 10.0, 10.0, 10.0, 10.0, -1.0, None);
        assert!(matches!(err, Err(DataError::NegativeVolume { .. })));
    }

    #[test]
    fn series_must_be_strictly_increasing() {
        let bars = vec![bar("2024-01-03", 10.0), bar("2024-01-02", 11.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(DataError::OutOfOrder { .. })
        ));

        let dup = vec![bar("2024-01-03", 10.0), bar("2024-01-03", 11.0)];
        assert!(matches!(
            validate_series(&dup),
            Err(DataError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn series_rejects_empty() {
        assert!(matches!(validate_series(&[]), Err(DataError::EmptySeries)));
    }

    #[test]
    fn valid_series_passes() {
        let bars = vec![bar("2024-01-02", 10.0), bar("2024-01-03", 10.5)];
        assert!(validate_series(&bars).is_ok());
    }
}
