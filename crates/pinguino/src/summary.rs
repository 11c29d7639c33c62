//! Summary builder: turns a filtered view into a compact textual digest
//!
//! The digest is what the generation prompts embed as data context: species
//! counts, rounded descriptive statistics per measurement column and, for
//! views with more than [`CORRELATION_MIN_ROWS`] rows, a correlation matrix.

use std::fmt;

use crate::dataset::NumericColumn;
use crate::filter::FilteredView;
use crate::stats;

/// Correlations are only reported for views with strictly more rows than this
pub const CORRELATION_MIN_ROWS: usize = 5;

const PLACEHOLDER: &str = "NaN";

/// Descriptive statistics of one numeric column, rounded to two decimals
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
  pub column: NumericColumn,
  pub count: usize,
  pub mean: f64,
  pub std: f64,
  pub min: f64,
  pub q25: f64,
  pub median: f64,
  pub q75: f64,
  pub max: f64,
}

impl ColumnSummary {
  pub fn of(column: NumericColumn, values: &[f64]) -> Self {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Self {
      column,
      count: values.len(),
      mean: stats::round2(stats::mean(values)),
      std: stats::round2(stats::std_dev(values)),
      min: stats::round2(stats::min(values)),
      q25: stats::round2(stats::quantile_sorted(&sorted, 0.25)),
      median: stats::round2(stats::quantile_sorted(&sorted, 0.5)),
      q75: stats::round2(stats::quantile_sorted(&sorted, 0.75)),
      max: stats::round2(stats::max(values)),
    }
  }

  fn rows(&self) -> [(&'static str, String); 8] {
    [
      ("count", self.count.to_string()),
      ("mean", number(self.mean)),
      ("std", number(self.std)),
      ("min", number(self.min)),
      ("25%", number(self.q25)),
      ("50%", number(self.median)),
      ("75%", number(self.q75)),
      ("max", number(self.max)),
    ]
  }
}

/// Pairwise Pearson correlations, rounded to two decimals
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
  pub columns: Vec<NumericColumn>,
  pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
  pub fn of(view: &FilteredView<'_>) -> Self {
    let columns = NumericColumn::ALL.to_vec();
    let series: Vec<Vec<f64>> = columns.iter().map(|c| view.column(*c)).collect();
    let values = series
      .iter()
      .map(|xs| series.iter().map(|ys| stats::round2(stats::pearson(xs, ys))).collect())
      .collect();
    Self { columns, values }
  }

  pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
    let i = self.columns.iter().position(|c| *c == a)?;
    let j = self.columns.iter().position(|c| *c == b)?;
    Some(self.values[i][j])
  }
}

/// Textual context about a filtered view
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
  pub row_count: usize,
  pub species_counts: Vec<(String, usize)>,
  pub statistics: Vec<ColumnSummary>,
  pub correlations: Option<CorrelationMatrix>,
}

/// Build the digest of a view; works for any row count including zero
pub fn summarize(view: &FilteredView<'_>) -> Digest {
  let statistics =
    NumericColumn::ALL.iter().map(|c| ColumnSummary::of(*c, &view.column(*c))).collect();

  let correlations =
    if view.len() > CORRELATION_MIN_ROWS { Some(CorrelationMatrix::of(view)) } else { None };

  Digest { row_count: view.len(), species_counts: species_counts(view), statistics, correlations }
}

/// Counts per species, most frequent first; ties keep first-appearance order
fn species_counts(view: &FilteredView<'_>) -> Vec<(String, usize)> {
  let mut counts: Vec<(String, usize)> =
    view.species().into_iter().map(|s| (s.to_string(), 0)).collect();
  for row in view.rows() {
    if let Some(entry) = counts.iter_mut().find(|(name, _)| *name == row.species) {
      entry.1 += 1;
    }
  }
  counts.sort_by(|a, b| b.1.cmp(&a.1));
  counts
}

impl Digest {
  /// Species count segment
  pub fn counts_text(&self) -> String {
    if self.species_counts.is_empty() {
      return "species\n(no rows)".to_string();
    }
    let width = self.species_counts.iter().map(|(s, _)| s.len()).max().unwrap_or(0).max(7);
    let mut out = String::from("species");
    for (species, count) in &self.species_counts {
      out.push_str(&format!("\n{species:<width$}  {count}"));
    }
    out
  }

  /// Descriptive statistics segment, one column per measurement
  pub fn statistics_text(&self) -> String {
    let labels: Vec<&str> = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"].to_vec();
    let headers: Vec<&str> = self.statistics.iter().map(|s| s.column.name()).collect();
    let columns: Vec<[(&str, String); 8]> = self.statistics.iter().map(|s| s.rows()).collect();
    let cells: Vec<Vec<String>> = (0..labels.len())
      .map(|row| columns.iter().map(|col| col[row].1.clone()).collect())
      .collect();
    format_table(&labels, &headers, &cells)
  }

  /// Correlation segment, empty when the view is too small to correlate
  pub fn correlation_text(&self) -> String {
    let Some(matrix) = &self.correlations else {
      return String::new();
    };
    let names: Vec<&str> = matrix.columns.iter().map(|c| c.name()).collect();
    let cells: Vec<Vec<String>> =
      matrix.values.iter().map(|row| row.iter().map(|v| number(*v)).collect()).collect();
    format_table(&names, &names, &cells)
  }

  pub fn has_correlations(&self) -> bool {
    self.correlations.is_some()
  }
}

impl fmt::Display for Digest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}\n\n{}", self.counts_text(), self.statistics_text())?;
    if self.has_correlations() {
      write!(f, "\n\n{}", self.correlation_text())?;
    }
    Ok(())
  }
}

fn number(value: f64) -> String {
  if value.is_finite() {
    format!("{value:.2}")
  } else {
    PLACEHOLDER.to_string()
  }
}

/// Right-aligned table with a left label column
fn format_table(row_labels: &[&str], headers: &[&str], cells: &[Vec<String>]) -> String {
  let label_width = row_labels.iter().map(|l| l.len()).max().unwrap_or(0);
  let widths: Vec<usize> = headers
    .iter()
    .enumerate()
    .map(|(j, h)| {
      cells.iter().filter_map(|row| row.get(j)).map(|c| c.len()).fold(h.len(), usize::max)
    })
    .collect();

  let mut lines = Vec::with_capacity(row_labels.len() + 1);
  let mut header_line = " ".repeat(label_width);
  for (h, &w) in headers.iter().zip(&widths) {
    header_line.push_str(&format!("  {h:>w$}"));
  }
  lines.push(header_line);

  for (label, row) in row_labels.iter().zip(cells) {
    let mut line = format!("{label:<label_width$}");
    for (cell, &w) in row.iter().zip(&widths) {
      line.push_str(&format!("  {cell:>w$}"));
    }
    lines.push(line);
  }
  lines.join("\n")
}
