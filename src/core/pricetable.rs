use crate::models::domain::PriceSample;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

const CSV_HEADER: &str = "date,type,price,stop";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed row at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// The accumulated result of one sweep run.
///
/// Owned exclusively by the orchestrator; day tasks hand their local sample
/// vectors back for a central fan-in merge.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    samples: Vec<PriceSample>,
}

/// One row of the min-price report: a group minimum and every date on which
/// it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinPriceRow {
    pub price: i64,
    pub fare_class: String,
    pub stop_count: u32,
    pub dates: Vec<NaiveDate>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, samples: Vec<PriceSample>) {
        self.samples.extend(samples);
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sort on (date, type, price, stop) and drop exact duplicates.
    /// Idempotent: applying it to an already-normalized table is a no-op.
    pub fn dedupe_sort(&mut self) {
        self.samples.sort();
        self.samples.dedup();
    }

    /// Overwrite `path` with the full table as `date,type,price,stop` rows.
    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        let mut out = std::fs::File::create(path)?;
        writeln!(out, "{CSV_HEADER}")?;
        for s in &self.samples {
            writeln!(out, "{},{},{},{}", s.date, s.fare_class, s.price, s.stop_count)?;
        }
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path)?;
        let mut samples = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if idx == 0 || line.is_empty() {
                continue;
            }
            samples.push(parse_row(line).map_err(|reason| TableError::Parse {
                line: idx + 1,
                reason,
            })?);
        }
        Ok(Self { samples })
    }

    /// Group by (fare class, stop count), take the minimum price per group,
    /// and join back every date on which that minimum was observed.
    pub fn min_prices(&self) -> Vec<MinPriceRow> {
        let mut mins: BTreeMap<(String, u32), i64> = BTreeMap::new();
        for s in &self.samples {
            mins.entry((s.fare_class.clone(), s.stop_count))
                .and_modify(|m| *m = (*m).min(s.price))
                .or_insert(s.price);
        }

        let mut dates: BTreeMap<(String, u32), BTreeSet<NaiveDate>> = BTreeMap::new();
        for s in &self.samples {
            let key = (s.fare_class.clone(), s.stop_count);
            if mins.get(&key) == Some(&s.price) {
                dates.entry(key).or_default().insert(s.date);
            }
        }

        let mut rows: Vec<MinPriceRow> = mins
            .into_iter()
            .map(|((fare_class, stop_count), price)| {
                let dates = dates
                    .remove(&(fare_class.clone(), stop_count))
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                MinPriceRow {
                    price,
                    fare_class,
                    stop_count,
                    dates,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.fare_class, a.price, a.stop_count).cmp(&(&b.fare_class, b.price, b.stop_count))
        });
        rows
    }
}

fn parse_row(line: &str) -> Result<PriceSample, String> {
    let mut fields = line.splitn(4, ',');
    let date = fields
        .next()
        .and_then(|f| f.parse::<NaiveDate>().ok())
        .ok_or("invalid date")?;
    let fare_class = fields.next().ok_or("missing type")?.to_string();
    let price = fields
        .next()
        .and_then(|f| f.parse::<i64>().ok())
        .ok_or("invalid price")?;
    let stop_count = fields
        .next()
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or("invalid stop count")?;
    Ok(PriceSample {
        date,
        fare_class,
        price,
        stop_count,
    })
}
