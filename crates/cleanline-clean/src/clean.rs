//! Price-range filter and `last_review` date cast

use anyhow::Result;

use crate::dataset::{Cell, Columns, Dataset};
use crate::error::CleanError;

/// Row counts from one cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanStats {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dates_parsed: usize,
    pub dates_null: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    columns: Columns,
}

impl Cleaner {
    pub fn new(columns: Columns) -> Self {
        Self { columns }
    }

    /// Keep rows with `min_price <= price <= max_price` and parse the review
    /// column into dates.
    ///
    /// Rows with a missing price (empty, `NA`, `null`, ...) never match. A
    /// bound pair with `min_price > max_price` matches nothing.
    pub fn clean(&self, dataset: &Dataset, min_price: f64, max_price: f64) -> Result<Dataset> {
        self.clean_with_stats(dataset, min_price, max_price)
            .map(|(ds, _)| ds)
    }

    pub fn clean_with_stats(
        &self,
        dataset: &Dataset,
        min_price: f64,
        max_price: f64,
    ) -> Result<(Dataset, CleanStats)> {
        let price_col = dataset
            .column_position(&self.columns.price)
            .ok_or_else(|| CleanError::MissingColumn(self.columns.price.clone()))?;
        let date_col = dataset
            .column_position(&self.columns.last_review)
            .ok_or_else(|| CleanError::MissingColumn(self.columns.last_review.clone()))?;

        if min_price > max_price {
            log::warn!("min_price {min_price} > max_price {max_price}: no row can match");
        }

        let mut keep = Vec::with_capacity(dataset.len());
        for (r, row) in dataset.rows().iter().enumerate() {
            let price = match &row[price_col] {
                Cell::Text(s) => parse_price(s).ok_or_else(|| CleanError::InvalidPrice {
                    id: dataset.id(r).to_string(),
                    value: s.clone(),
                })?,
                Cell::Date(_) => None,
            };
            keep.push(price.is_some_and(|p| min_price <= p && p <= max_price));
        }

        let mut cleaned = dataset.select_rows(&keep);
        log::info!(
            "Dataset price outliers removal outside range: {min_price}-{max_price} ({} of {} rows kept)",
            cleaned.len(),
            dataset.len()
        );

        let (dates_parsed, dates_null) = cleaned.cast_to_date(date_col);
        log::info!(
            "Fixing {} column type ({dates_parsed} parsed, {dates_null} null)",
            self.columns.last_review
        );

        let stats = CleanStats {
            rows_in: dataset.len(),
            rows_out: cleaned.len(),
            dates_parsed,
            dates_null,
        };
        Ok((cleaned, stats))
    }
}

/// Cell texts read as a missing value rather than a malformed number.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// `Some(None)` for a missing value, `None` when the text is not a number.
fn parse_price(s: &str) -> Option<Option<f64>> {
    let s = s.trim();
    if NA_VALUES.contains(&s) {
        return Some(None);
    }
    s.parse::<f64>().ok().map(Some)
}

/// Clean with the default `id` / `price` / `last_review` columns.
pub fn clean(dataset: &Dataset, min_price: f64, max_price: f64) -> Result<Dataset> {
    Cleaner::default().clean(dataset, min_price, max_price)
}
