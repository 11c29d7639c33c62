//! Filter engine: species/island selection over the clean dataset

use tracing::debug;

use crate::dataset::{Dataset, NumericColumn, Record};

/// Effective selection after empty axes have been widened to every value present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
  pub species: Vec<String>,
  pub islands: Vec<String>,
  /// Chosen values that do not occur in the dataset; they select no rows
  pub unknown: Vec<String>,
}

impl FilterSelection {
  /// Resolve user choices against `dataset`; an empty choice selects everything on that axis
  pub fn resolve(dataset: &Dataset, species: &[String], islands: &[String]) -> Self {
    let species = or_all(species, || dataset.species());
    let islands = or_all(islands, || dataset.islands());
    let mut unknown = missing(&species, &dataset.species());
    unknown.extend(missing(&islands, &dataset.islands()));
    Self { species, islands, unknown }
  }

  pub fn matches(&self, record: &Record) -> bool {
    self.species.iter().any(|s| *s == record.species)
      && self.islands.iter().any(|i| *i == record.island)
  }

  /// The only selected species, if exactly one is selected and it exists in the dataset
  pub fn single_species(&self) -> Option<&str> {
    match self.species.as_slice() {
      [only] if !self.unknown.contains(only) => Some(only.as_str()),
      _ => None,
    }
  }
}

fn missing(chosen: &[String], present: &[String]) -> Vec<String> {
  chosen.iter().filter(|v| !present.contains(v)).cloned().collect()
}

fn or_all(choice: &[String], all: impl FnOnce() -> Vec<String>) -> Vec<String> {
  if choice.is_empty() {
    return all();
  }
  let mut unique: Vec<String> = Vec::with_capacity(choice.len());
  for value in choice {
    if !unique.contains(value) {
      unique.push(value.clone());
    }
  }
  unique
}

/// Ordered subset of clean rows matching a selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
  rows: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
  pub fn from_rows(rows: Vec<&'a Record>) -> Self {
    Self { rows }
  }

  pub fn rows(&self) -> &[&'a Record] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Values of one numeric column, in row order
  pub fn column(&self, column: NumericColumn) -> Vec<f64> {
    self.rows.iter().map(|r| column.value(r)).collect()
  }

  /// Distinct species in the view, in order of first appearance
  pub fn species(&self) -> Vec<&'a str> {
    let mut seen: Vec<&'a str> = Vec::new();
    for row in &self.rows {
      if !seen.contains(&row.species.as_str()) {
        seen.push(row.species.as_str());
      }
    }
    seen
  }
}

/// Apply an already resolved selection
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
  let rows: Vec<&Record> = dataset.clean().iter().filter(|r| selection.matches(r)).collect();
  debug!(
    species = ?selection.species,
    islands = ?selection.islands,
    rows = rows.len(),
    "filtered dataset"
  );
  FilteredView { rows }
}

/// Rows whose species and island are both selected; empty selections mean "all"
pub fn filter<'a>(
  dataset: &'a Dataset,
  species: &[String],
  islands: &[String],
) -> FilteredView<'a> {
  apply(dataset, &FilterSelection::resolve(dataset, species, islands))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(species: &str, island: &str, mass: f64) -> Record {
    Record {
      species: species.to_string(),
      island: island.to_string(),
      bill_length_mm: 40.0,
      bill_depth_mm: 18.0,
      flipper_length_mm: 190.0,
      body_mass_g: mass,
      sex: "Female".to_string(),
    }
  }

  fn sample() -> Dataset {
    Dataset::from_records(vec![
      record("Adelie", "Torgersen", 3700.0),
      record("Gentoo", "Biscoe", 5000.0),
      record("Adelie", "Dream", 3600.0),
      record("Chinstrap", "Dream", 3650.0),
      record("Adelie", "Biscoe", 3800.0),
    ])
  }

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn test_filter_keeps_order_and_matches_both_axes() {
    let data = sample();
    let view = filter(&data, &strings(&["Adelie"]), &strings(&["Dream", "Biscoe"]));
    let masses: Vec<f64> = view.rows().iter().map(|r| r.body_mass_g).collect();
    assert_eq!(masses, vec![3600.0, 3800.0]);
  }

  #[test]
  fn test_empty_species_selection_means_all_species() {
    let data = sample();
    let implicit = filter(&data, &[], &strings(&["Dream"]));
    let explicit = filter(&data, &data.species(), &strings(&["Dream"]));
    assert_eq!(implicit, explicit);
    assert_eq!(implicit.len(), 2);
  }

  #[test]
  fn test_both_empty_selects_everything() {
    let data = sample();
    assert_eq!(filter(&data, &[], &[]).len(), data.len());
  }

  #[test]
  fn test_unknown_value_yields_empty_view() {
    let data = sample();
    let view = filter(&data, &strings(&["Emperor"]), &[]);
    assert!(view.is_empty());
    assert!(view.species().is_empty());
  }

  #[test]
  fn test_resolve_reports_values_missing_from_dataset() {
    let data = sample();
    let selection =
      FilterSelection::resolve(&data, &strings(&["adelie", "Gentoo"]), &strings(&["Atlantis"]));
    assert_eq!(selection.unknown, strings(&["adelie", "Atlantis"]));

    let emperor = FilterSelection::resolve(&data, &strings(&["Emperor"]), &[]);
    assert_eq!(emperor.unknown, strings(&["Emperor"]));
    assert_eq!(emperor.single_species(), None);

    assert!(FilterSelection::resolve(&data, &[], &[]).unknown.is_empty());
  }

  #[test]
  fn test_single_species_detection() {
    let data = sample();
    let one = FilterSelection::resolve(&data, &strings(&["Gentoo", "Gentoo"]), &[]);
    assert_eq!(one.single_species(), Some("Gentoo"));
    let all = FilterSelection::resolve(&data, &[], &[]);
    assert_eq!(all.single_species(), None);
  }
}
