//! Results table, per-metric ranking and top-5 reporting.

use std::cmp::Ordering;

use crate::metrics::{MetricKind, MetricVector};

/// Averaged metric vectors per snapshot, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct ResultsTable {
    rows: Vec<(String, MetricVector)>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: String, metrics: MetricVector) {
        self.rows.push((snapshot, metrics));
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[(String, MetricVector)] {
        &self.rows
    }

    /// Snapshots ordered best-first for the given metric: ascending for
    /// error metrics, descending for the thresholded accuracies.
    pub fn ranked(&self, kind: MetricKind) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .rows
            .iter()
            .map(|(name, metrics)| (name.as_str(), metrics.get(kind)))
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        if kind.higher_is_better() {
            ranked.reverse();
        }
        ranked
    }

    /// Prints the top five snapshots per metric.
    pub fn print_top5(&self) {
        for kind in MetricKind::ALL {
            println!("{}", kind.title());
            for (place, (name, value)) in self.ranked(kind).iter().take(5).enumerate() {
                println!("  {}. {name}: {value:.6}", place + 1);
            }
        }
    }
}
