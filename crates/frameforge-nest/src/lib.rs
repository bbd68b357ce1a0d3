#![warn(missing_docs)]

//! One-dimensional stock nesting for cut lists.
//!
//! [`nest`] assigns cut parts to stock bars of a fixed length with the
//! best-fit-decreasing heuristic: longest parts first, each into the open bar
//! it fills most tightly.
//!
//! # Example
//!
//! ```
//! use frameforge_nest::{nest, CutPart};
//!
//! let parts = [1000.0, 600.0, 500.0, 400.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, l)| CutPart::new(format!("P{i}"), *l, 0.0))
//!     .collect::<Vec<_>>();
//! let bars = nest(&parts, 1500.0).unwrap();
//! assert_eq!(bars.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Slack allowed when comparing lengths (mm).
const FIT_EPSILON: f64 = 1e-9;

/// Errors from nesting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NestError {
    /// A part is longer than a whole stock bar.
    #[error("part {part} needs {cut_size} mm but stock bars are {stock_length} mm")]
    Capacity {
        /// Part name.
        part: String,
        /// Part length plus kerf.
        cut_size: f64,
        /// Stock bar length.
        stock_length: f64,
    },

    /// The stock length or a part dimension is not a positive finite number.
    #[error("invalid {0}: {1}")]
    InvalidStock(&'static str, f64),
}

/// A part to cut from stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPart {
    /// Part name or label.
    pub name: String,
    /// Nominal length (mm).
    pub length: f64,
    /// Saw blade width consumed by the cut (mm).
    pub kerf: f64,
}

impl CutPart {
    /// Create a part.
    pub fn new(name: impl Into<String>, length: f64, kerf: f64) -> Self {
        Self {
            name: name.into(),
            length,
            kerf,
        }
    }

    /// Stock consumed by this part: length plus kerf.
    pub fn cut_size(&self) -> f64 {
        self.length + self.kerf
    }
}

/// A stock bar and the parts assigned to it, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    /// Bar length (mm).
    pub length: f64,
    parts: Vec<CutPart>,
}

impl Stock {
    /// An empty bar.
    pub fn new(length: f64) -> Self {
        Self {
            length,
            parts: Vec::new(),
        }
    }

    /// Parts in placement order.
    pub fn parts(&self) -> &[CutPart] {
        &self.parts
    }

    /// Length consumed by the parts.
    pub fn used(&self) -> f64 {
        self.parts.iter().map(CutPart::cut_size).sum()
    }

    /// Length still available.
    pub fn left(&self) -> f64 {
        self.length - self.used()
    }

    /// Place a part at the end of the bar.
    pub fn add_part(&mut self, part: CutPart) -> Result<(), NestError> {
        if part.cut_size() > self.left() + FIT_EPSILON {
            return Err(NestError::Capacity {
                cut_size: part.cut_size(),
                part: part.name,
                stock_length: self.length,
            });
        }
        self.parts.push(part);
        Ok(())
    }
}

/// Assign `parts` to bars of `stock_length`.
///
/// Parts are taken longest first (ties keep input order) and each goes to
/// the open bar whose remaining length exceeds its cut size by the least;
/// ties go to the bar opened first. A new bar is opened when nothing fits.
/// Fails before placing anything if a part cannot fit an empty bar.
pub fn nest(parts: &[CutPart], stock_length: f64) -> Result<Vec<Stock>, NestError> {
    if !(stock_length > 0.0 && stock_length.is_finite()) {
        return Err(NestError::InvalidStock("stock length", stock_length));
    }
    for part in parts {
        let size = part.cut_size();
        if !(part.length > 0.0 && part.kerf >= 0.0 && size.is_finite()) {
            return Err(NestError::InvalidStock("part length", part.length));
        }
        if size > stock_length + FIT_EPSILON {
            return Err(NestError::Capacity {
                part: part.name.clone(),
                cut_size: size,
                stock_length,
            });
        }
    }

    let mut order: Vec<&CutPart> = parts.iter().collect();
    order.sort_by(|a, b| b.cut_size().total_cmp(&a.cut_size()));

    let mut stocks: Vec<Stock> = Vec::new();
    for part in order {
        let size = part.cut_size();
        let best = stocks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.left() - size >= -FIT_EPSILON)
            .min_by(|(i, a), (j, b)| {
                (a.left() - size)
                    .total_cmp(&(b.left() - size))
                    .then(i.cmp(j))
            })
            .map(|(i, _)| i);
        let index = match best {
            Some(i) => i,
            None => {
                stocks.push(Stock::new(stock_length));
                stocks.len() - 1
            }
        };
        stocks[index].add_part(part.clone())?;
    }

    let summary = NestSummary::from_stocks(&stocks);
    info!(
        bars = summary.bars,
        parts = summary.parts,
        waste = summary.waste,
        utilization = %summary.utilization_percent(),
        "nested cut list"
    );
    Ok(stocks)
}

/// Totals over a nesting result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestSummary {
    /// Bars used.
    pub bars: usize,
    /// Parts placed.
    pub parts: usize,
    /// Stock left over on all bars (mm).
    pub waste: f64,
    /// Used length over total stock length (0.0 - 1.0).
    pub utilization: f64,
}

impl NestSummary {
    /// Summarize bars.
    pub fn from_stocks(stocks: &[Stock]) -> Self {
        let total: f64 = stocks.iter().map(|s| s.length).sum();
        let used: f64 = stocks.iter().map(Stock::used).sum();
        Self {
            bars: stocks.len(),
            parts: stocks.iter().map(|s| s.parts().len()).sum(),
            waste: total - used,
            utilization: if total > 0.0 { used / total } else { 0.0 },
        }
    }

    /// Utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(lengths: &[f64], kerf: f64) -> Vec<CutPart> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, l)| CutPart::new(format!("P{i}"), *l, kerf))
            .collect()
    }

    fn lengths(stock: &Stock) -> Vec<f64> {
        stock.parts().iter().map(|p| p.length).collect()
    }

    #[test]
    fn test_best_fit_pairs_parts() {
        let bars = nest(&parts(&[1000.0, 600.0, 500.0, 400.0], 0.0), 1500.0).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(lengths(&bars[0]), vec![1000.0, 500.0]);
        assert_eq!(bars[0].left(), 0.0);
        assert_eq!(lengths(&bars[1]), vec![600.0, 400.0]);
        assert_eq!(bars[1].left(), 500.0);
    }

    #[test]
    fn test_oversize_part_fails_before_placing() {
        let result = nest(&parts(&[100.0, 1600.0], 0.0), 1500.0);
        assert!(matches!(result, Err(NestError::Capacity { ref part, .. }) if part == "P1"));
    }

    #[test]
    fn test_kerf_counts_against_capacity() {
        assert!(matches!(
            nest(&parts(&[1500.0], 3.0), 1500.0),
            Err(NestError::Capacity { .. })
        ));
        let bars = nest(&parts(&[747.0, 747.0], 3.0), 1500.0).unwrap();
        assert_eq!(bars.len(), 1);
        assert!(bars[0].left().abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let bars = nest(&parts(&[300.0, 300.0, 300.0], 0.0), 1000.0).unwrap();
        let names: Vec<&str> = bars[0].parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P0", "P1", "P2"]);
    }

    #[test]
    fn test_tightest_bar_wins() {
        // bars left with 500 and 200; a 150 part goes to the 200 one
        let bars = nest(&parts(&[1000.0, 1300.0, 150.0], 0.0), 1500.0).unwrap();
        assert_eq!(lengths(&bars[0]), vec![1300.0, 150.0]);
        assert_eq!(lengths(&bars[1]), vec![1000.0]);
    }

    #[test]
    fn test_invalid_stock_length() {
        assert!(matches!(
            nest(&parts(&[100.0], 0.0), 0.0),
            Err(NestError::InvalidStock(..))
        ));
        assert!(matches!(
            nest(&parts(&[-5.0], 0.0), 100.0),
            Err(NestError::InvalidStock(..))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(nest(&[], 6000.0).unwrap().is_empty());
    }

    #[test]
    fn test_summary() {
        let bars = nest(&parts(&[1000.0, 600.0, 500.0, 400.0], 0.0), 1500.0).unwrap();
        let summary = NestSummary::from_stocks(&bars);
        assert_eq!(summary.bars, 2);
        assert_eq!(summary.parts, 4);
        assert!((summary.waste - 500.0).abs() < 1e-9);
        assert!((summary.utilization - 2500.0 / 3000.0).abs() < 1e-12);
        assert_eq!(summary.utilization_percent(), "83.3%");
    }

    #[test]
    fn test_add_part_refuses_overflow() {
        let mut stock = Stock::new(1000.0);
        stock.add_part(CutPart::new("a", 800.0, 0.0)).unwrap();
        assert!(stock.add_part(CutPart::new("b", 300.0, 0.0)).is_err());
        assert_eq!(stock.parts().len(), 1);
    }

    #[test]
    fn test_stock_serializes_parts() {
        let bars = nest(&parts(&[400.0], 2.0), 1000.0).unwrap();
        let json = serde_json::to_value(&bars[0]).unwrap();
        assert_eq!(json["length"], 1000.0);
        assert_eq!(json["parts"][0]["kerf"], 2.0);
    }
}
