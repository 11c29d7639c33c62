pub mod commands;
pub mod display;
pub mod explore;

use clap::Args;

use crate::dataset::Dataset;
use crate::filter::{self, FilterSelection, FilteredView};

/// Species and island selection shared by every subcommand
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
  /// Species to include (repeatable; all species when omitted)
  #[arg(long = "species", value_name = "SPECIES", global = true)]
  pub species: Vec<String>,
  /// Islands to include (repeatable; all islands when omitted)
  #[arg(long = "island", value_name = "ISLAND", global = true)]
  pub islands: Vec<String>,
}

impl Filters {
  pub fn selection(&self, dataset: &Dataset) -> FilterSelection {
    FilterSelection::resolve(dataset, &self.species, &self.islands)
  }

  pub fn apply<'a>(&self, dataset: &'a Dataset) -> FilteredView<'a> {
    filter::apply(dataset, &self.selection(dataset))
  }
}
