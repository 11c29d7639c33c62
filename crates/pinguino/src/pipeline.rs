//! One dashboard interaction, start to finish
//!
//! Each call re-runs the whole chain for the current controls: load (memoized),
//! filter, chart, generated narrative and table. Cross-interaction state lives
//! only in the [`DataStore`] and [`SessionCache`] passed in.

use panels::Tone;
use tracing::{debug, info};

use crate::charts::{draw_chart, ChartKind, ChartOutcome, ChartRenderer};
use crate::dataset::DataStore;
use crate::error::Result;
use crate::filter::{self, FilterSelection, FilteredView};
use crate::generation::{GenerationClient, GenerationFailure, GenerationParams};
use crate::insights::extract_insights;
use crate::prompts;
use crate::session::SessionCache;
use crate::summary::summarize;
use crate::table;

pub const DESCRIPTION_HEADING_PREFIX: &str = "About the";
pub const INSIGHTS_HEADING: &str = "Generated insights";
pub const QUESTION_HEADING: &str = "Ask about the data";
pub const TABLE_HEADING: &str = "Filtered data";

/// Controls for one interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardRequest {
  pub species: Vec<String>,
  pub islands: Vec<String>,
  pub chart: Option<ChartKind>,
  pub insights: bool,
  pub question: Option<String>,
  pub table: bool,
}

impl DashboardRequest {
  /// Full dashboard: chart and table, no generated extras
  pub fn dashboard(chart: ChartKind) -> Self {
    Self { chart: Some(chart), table: true, ..Self::default() }
  }

  pub fn with_filters(mut self, species: Vec<String>, islands: Vec<String>) -> Self {
    self.species = species;
    self.islands = islands;
    self
  }

  pub fn with_insights(mut self, insights: bool) -> Self {
    self.insights = insights;
    self
  }

  pub fn with_question(mut self, question: Option<String>) -> Self {
    self.question = question.filter(|q| !q.trim().is_empty());
    self
  }
}

/// A toned message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub tone: Tone,
  pub text: String,
}

impl Notice {
  pub fn new(tone: Tone, text: impl Into<String>) -> Self {
    Self { tone, text: text.into() }
  }
}

/// One piece of rendered dashboard output, in display order
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
  Heading(String),
  Notice(Notice),
  /// Preformatted text (charts, tables)
  Preformatted(String),
  /// Free text to be wrapped to the terminal
  Paragraph(String),
  Insights(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
  pub row_count: usize,
  pub blocks: Vec<Block>,
}

impl DashboardView {
  pub fn push(&mut self, block: Block) {
    self.blocks.push(block);
  }

  pub fn notice(&mut self, tone: Tone, text: impl Into<String>) {
    self.push(Block::Notice(Notice::new(tone, text)));
  }

  /// Every notice of the given tone, in order
  pub fn notices(&self, tone: Tone) -> Vec<&str> {
    self
      .blocks
      .iter()
      .filter_map(|b| match b {
        Block::Notice(n) if n.tone == tone => Some(n.text.as_str()),
        _ => None,
      })
      .collect()
  }

  pub fn insights(&self) -> Option<&[String]> {
    self.blocks.iter().find_map(|b| match b {
      Block::Insights(items) => Some(items.as_slice()),
      _ => None,
    })
  }

  pub fn has_heading(&self, title: &str) -> bool {
    self.blocks.iter().any(|b| matches!(b, Block::Heading(h) if h == title))
  }

  pub fn new(row_count: usize) -> Self {
    let mut view = Self { row_count, blocks: Vec::new() };
    view.notice(Tone::Info, format!("Showing data for {row_count} penguins"));
    view
  }

  pub fn add_chart(
    &mut self,
    kind: ChartKind,
    rows: &FilteredView<'_>,
    renderer: &mut dyn ChartRenderer,
  ) {
    self.push(Block::Heading(kind.label().to_string()));
    match draw_chart(kind, rows, renderer) {
      ChartOutcome::Drawn(text) => self.push(Block::Preformatted(text)),
      ChartOutcome::Skipped(warning) => self.notice(Tone::Warning, warning),
      ChartOutcome::Failed(message) => self.notice(Tone::Error, message),
    }
  }

  /// Warn about chosen values the dataset does not contain
  pub fn add_unknown_values(&mut self, selection: &FilterSelection) {
    if !selection.unknown.is_empty() {
      self.notice(
        Tone::Warning,
        format!("Not present in the dataset: {}", selection.unknown.join(", ")),
      );
    }
  }

  /// Warn once when generated content is unavailable
  pub fn add_configuration_warning(&mut self, client: &GenerationClient) {
    if !client.is_configured() {
      self.notice(Tone::Warning, GenerationFailure::NotConfigured.display_message());
    }
  }

  pub async fn add_description(
    &mut self,
    species: &str,
    cache: &mut SessionCache,
    client: &GenerationClient,
  ) {
    self.push(Block::Heading(format!("{DESCRIPTION_HEADING_PREFIX} {species} penguin")));
    match cache.get_or_generate(species, client).await {
      Ok(text) => self.push(Block::Paragraph(text)),
      Err(GenerationFailure::NotConfigured) => self.notice(
        Tone::Info,
        format!("Configure the API key to see a generated description of the {species} penguin."),
      ),
      Err(failure) => self.notice(Tone::Error, failure.display_message()),
    }
  }

  /// Insights are skipped entirely without an API key
  pub async fn add_insights(&mut self, rows: &FilteredView<'_>, client: &GenerationClient) {
    if !client.is_configured() {
      debug!("insights requested without an API key, skipped");
      return;
    }
    self.push(Block::Heading(INSIGHTS_HEADING.to_string()));
    if rows.is_empty() {
      self.notice(Tone::Warning, "Not enough data to generate insights.");
      return;
    }
    let prompt = prompts::insight_prompt(&summarize(rows));
    match client.generate(&prompt, GenerationParams::DEFAULT).await {
      Ok(raw) => self.push(Block::Insights(extract_insights(&raw))),
      Err(failure) => self.notice(Tone::Error, failure.display_message()),
    }
  }

  pub async fn add_answer(
    &mut self,
    question: &str,
    rows: &FilteredView<'_>,
    client: &GenerationClient,
  ) {
    self.push(Block::Heading(QUESTION_HEADING.to_string()));
    if rows.is_empty() {
      self.notice(Tone::Warning, "No data available to answer the question.");
    } else if !client.is_configured() {
      self.notice(Tone::Info, "Configure the API key to ask questions about the data.");
    } else {
      let prompt = prompts::question_prompt(question, &summarize(rows));
      match client.generate(&prompt, GenerationParams::QUESTION).await {
        Ok(answer) => self.notice(Tone::Success, answer),
        Err(failure) => self.notice(Tone::Error, failure.display_message()),
      }
    }
  }

  pub fn add_table(&mut self, rows: &FilteredView<'_>) {
    self.push(Block::Heading(TABLE_HEADING.to_string()));
    match table::format_head(rows) {
      Some(text) => self.push(Block::Preformatted(text)),
      None => self.notice(Tone::Info, "No rows match the current filters."),
    }
  }
}

/// Run the pipeline for `request`
///
/// Only a dataset load failure is an error; every later failure is rendered
/// into the view as a panel.
pub async fn run(
  request: &DashboardRequest,
  store: &DataStore,
  cache: &mut SessionCache,
  client: &GenerationClient,
  renderer: &mut dyn ChartRenderer,
) -> Result<DashboardView> {
  let dataset = store.load().await?;
  let selection = FilterSelection::resolve(&dataset, &request.species, &request.islands);
  let rows = filter::apply(&dataset, &selection);

  let mut view = DashboardView::new(rows.len());
  view.add_unknown_values(&selection);
  if let Some(kind) = request.chart {
    view.add_chart(kind, &rows, renderer);
  }
  view.add_configuration_warning(client);
  if let Some(species) = selection.single_species() {
    view.add_description(species, cache, client).await;
  }
  if request.insights {
    view.add_insights(&rows, client).await;
  }
  if let Some(question) = &request.question {
    view.add_answer(question, &rows, client).await;
  }
  if request.table {
    view.add_table(&rows);
  }

  info!(rows = view.row_count, blocks = view.blocks.len(), "dashboard rendered");
  Ok(view)
}
