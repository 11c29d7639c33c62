//! Subcommand handlers

use anyhow::Result;
use panels::Tone;

use super::display;
use super::Filters;
use crate::charts::{ChartKind, ChartRenderer, TerminalRenderer};
use crate::config::Settings;
use crate::dataset::DataStore;
use crate::error::PinguinoError;
use crate::generation::GenerationClient;
use crate::pipeline::{self, Block, DashboardRequest, DashboardView};
use crate::session::SessionCache;
use crate::summary::summarize;

/// Everything that outlives a single command: dataset, credentials, cached descriptions
pub struct App {
  pub store: DataStore,
  pub client: GenerationClient,
  pub cache: SessionCache,
  pub renderer: Box<dyn ChartRenderer>,
}

impl App {
  pub fn new(store: DataStore, client: GenerationClient) -> Self {
    Self {
      store,
      client,
      cache: SessionCache::new(),
      renderer: Box::new(TerminalRenderer::for_terminal_width(panels::terminal_width())),
    }
  }

  pub fn from_settings(settings: &Settings) -> Self {
    Self::new(settings.data_store(), settings.generation_client())
  }
}

/// Full dashboard: chart, description, optional insights and answer, table
pub async fn dashboard(
  app: &mut App,
  filters: &Filters,
  chart: ChartKind,
  insights: bool,
  question: Option<String>,
) -> Result<DashboardView> {
  let request = DashboardRequest::dashboard(chart)
    .with_filters(filters.species.clone(), filters.islands.clone())
    .with_insights(insights)
    .with_question(question);
  let view =
    pipeline::run(&request, &app.store, &mut app.cache, &app.client, app.renderer.as_mut()).await?;
  display::render(&view);
  Ok(view)
}

pub async fn summary(app: &mut App, filters: &Filters) -> Result<DashboardView> {
  let dataset = app.store.load().await?;
  let rows = filters.apply(&dataset);

  let mut view = DashboardView::new(rows.len());
  view.push(Block::Heading("Summary".to_string()));
  view.push(Block::Preformatted(summarize(&rows).to_string()));
  display::render(&view);
  Ok(view)
}

pub async fn chart(app: &mut App, filters: &Filters, kind: ChartKind) -> Result<DashboardView> {
  let dataset = app.store.load().await?;
  let rows = filters.apply(&dataset);

  let mut view = DashboardView::new(rows.len());
  view.add_chart(kind, &rows, app.renderer.as_mut());
  display::render(&view);
  Ok(view)
}

pub async fn table(app: &mut App, filters: &Filters) -> Result<DashboardView> {
  let dataset = app.store.load().await?;
  let rows = filters.apply(&dataset);

  let mut view = DashboardView::new(rows.len());
  view.add_table(&rows);
  display::render(&view);
  Ok(view)
}

/// Description of one species, which must exist in the dataset
pub async fn describe(app: &mut App, species: &str) -> Result<DashboardView> {
  let dataset = app.store.load().await?;
  let known = dataset.species();
  let Some(species) = known.iter().find(|s| s.eq_ignore_ascii_case(species.trim())) else {
    return Err(
      PinguinoError::invalid_parameter(
        "species",
        format!("unknown species '{species}' (available: {})", known.join(", ")),
      )
      .into(),
    );
  };

  let mut view = DashboardView::default();
  view.add_configuration_warning(&app.client);
  view.add_description(species, &mut app.cache, &app.client).await;
  display::render(&view);
  Ok(view)
}

pub async fn insights(app: &mut App, filters: &Filters) -> Result<DashboardView> {
  let dataset = app.store.load().await?;
  let rows = filters.apply(&dataset);

  let mut view = DashboardView::new(rows.len());
  view.add_configuration_warning(&app.client);
  view.add_insights(&rows, &app.client).await;
  display::render(&view);
  Ok(view)
}

pub async fn ask(app: &mut App, filters: &Filters, question: &str) -> Result<DashboardView> {
  if question.trim().is_empty() {
    return Err(PinguinoError::invalid_parameter("question", "must not be empty").into());
  }
  let dataset = app.store.load().await?;
  let rows = filters.apply(&dataset);

  let mut view = DashboardView::new(rows.len());
  view.add_configuration_warning(&app.client);
  view.add_answer(question, &rows, &app.client).await;
  display::render(&view);
  Ok(view)
}

/// Print a single warning panel through the same path as views
pub fn warn(message: &str) {
  let mut view = DashboardView::default();
  view.notice(Tone::Warning, message);
  display::render(&view);
}
