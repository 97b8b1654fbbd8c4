use crate::data::bar::Bar;
use indexmap::IndexMap;

//a bar plus the indicator values a strategy computed for it
//a missing key means the indicator is still inside its warm-up window
//or hit a numeric edge case; the signal layer must hold on missing inputs
#[derive(Debug, Clone)]
pub struct EnrichedBar {
    pub bar: Bar,
    values: IndexMap<String, f64>,
}

impl EnrichedBar {
    pub fn new(bar: Bar) -> Self {
        EnrichedBar {
            bar,
            values: IndexMap::new(),
        }
    }

    //returns the named indicator value, or none while undefined
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn volume(&self) -> f64 {
        self.bar.volume
    }

    pub fn date(&self) -> chrono::NaiveDate {
        self.bar.date
    }

    //indicator names in enrichment order
    pub fn indicator_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

//builder that zips aligned indicator series onto a bar sequence
//every attached series must have exactly one slot per bar
pub struct EnrichedSeries {
    bars: Vec<EnrichedBar>,
}

impl EnrichedSeries {
    pub fn new(bars: &[Bar]) -> Self {
        EnrichedSeries {
            bars: bars.iter().cloned().map(EnrichedBar::new).collect(),
        }
    }

    //attaches an aligned series under the given name
    //undefined (none) and non-finite slots are left absent from the bar's map
    pub fn attach(&mut self, name: &str, series: &[Option<f64>]) -> &mut Self {
        assert_eq!(
            series.len(),
            self.bars.len(),
            "indicator series '{}' is not aligned with the bar series",
            name
        );

        for (bar, slot) in self.bars.iter_mut().zip(series) {
            if let Some(value) = slot {
                if value.is_finite() {
                    bar.set(name, *value);
                }
            }
        }

        self
    }

    pub fn into_bars(self) -> Vec<EnrichedBar> {
        self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar::new_unchecked(
                    NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                    close,
                    close,
                    close,
                    close,
                    1000.0,
                    None,
                )
            })
            .collect()
    }

    #[test]
    fn attach_skips_undefined_slots() {
        let raw = bars(3);
        let mut series = EnrichedSeries::new(&raw);
        series.attach("sma", &[None, Some(100.5), Some(101.5)]);

        let enriched = series.into_bars();
        assert_eq!(enriched[0].value("sma"), None);
        assert_eq!(enriched[1].value("sma"), Some(100.5));
        assert_eq!(enriched[2].value("sma"), Some(101.5));
    }

    #[test]
    fn attach_skips_nan() {
        let raw = bars(2);
        let mut series = EnrichedSeries::new(&raw);
        series.attach("x", &[Some(f64::NAN), Some(1.0)]);

        let enriched = series.into_bars();
        assert_eq!(enriched[0].value("x"), None);
        assert_eq!(enriched[1].value("x"), Some(1.0));
    }

    #[test]
    #[should_panic]
    fn attach_rejects_misaligned_series() {
        let raw = bars(3);
        let mut series = EnrichedSeries::new(&raw);
        series.attach("x", &[None, None]);
    }

    #[test]
    fn names_keep_enrichment_order() {
        let raw = bars(1);
        let mut series = EnrichedSeries::new(&raw);
        series
            .attach("zulu", &[Some(1.0)])
            .attach("alpha", &[Some(2.0)]);

        let enriched = series.into_bars();
        let names: Vec<&str> = enriched[0].indicator_names().collect();
        assert_eq!(names, vec!["zulu", "alpha"]);
    }
}
