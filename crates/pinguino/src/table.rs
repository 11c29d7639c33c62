//! Head-of-view table

use crate::dataset::{Record, REQUIRED_COLUMNS};
use crate::filter::FilteredView;

pub const TABLE_ROWS: usize = 10;

fn cells(record: &Record) -> [String; 7] {
  [
    record.species.clone(),
    record.island.clone(),
    format!("{:.1}", record.bill_length_mm),
    format!("{:.1}", record.bill_depth_mm),
    format!("{:.1}", record.flipper_length_mm),
    format!("{:.1}", record.body_mass_g),
    record.sex.clone(),
  ]
}

/// The first [`TABLE_ROWS`] rows of the view as aligned text, or `None` when empty
pub fn format_head(view: &FilteredView<'_>) -> Option<String> {
  if view.is_empty() {
    return None;
  }

  let rows: Vec<[String; 7]> = view.rows().iter().take(TABLE_ROWS).map(|r| cells(r)).collect();
  let widths: Vec<usize> = REQUIRED_COLUMNS
    .iter()
    .enumerate()
    .map(|(j, h)| rows.iter().map(|r| r[j].len()).fold(h.len(), usize::max))
    .collect();
  let index_width = rows.len().saturating_sub(1).to_string().len();

  let mut lines = Vec::with_capacity(rows.len() + 1);
  let mut header = " ".repeat(index_width);
  for (h, &w) in REQUIRED_COLUMNS.iter().zip(&widths) {
    header.push_str(&format!("  {h:>w$}"));
  }
  lines.push(header);

  for (i, row) in rows.iter().enumerate() {
    let mut line = format!("{i:<index_width$}");
    for (cell, &w) in row.iter().zip(&widths) {
      line.push_str(&format!("  {cell:>w$}"));
    }
    lines.push(line);
  }

  if view.len() > TABLE_ROWS {
    lines.push(format!("... {} more rows", view.len() - TABLE_ROWS));
  }
  Some(lines.join("\n"))
}
