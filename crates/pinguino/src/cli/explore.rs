//! Line-oriented interactive session
//!
//! Every command that changes the controls re-runs the dashboard for the new
//! selection, the way a widget change would. One [`App`] lives for the whole
//! session, so descriptions generated once are served from its cache after.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use super::commands::{self, App};
use super::Filters;
use crate::charts::ChartKind;

pub const HELP: &str = "\
Commands:
  species [NAME ...]   select species (none = all)
  island [NAME ...]    select islands (none = all)
  chart KIND           switch chart: scatter, box, violin, pair
  show                 redraw the dashboard
  summary              print the summary digest
  table                print the first rows
  describe             description of the selected species
  insights             generate insights for the current selection
  ask QUESTION         ask a question about the current selection
  help                 show this help
  quit                 leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreCommand {
  Species(Vec<String>),
  Island(Vec<String>),
  Chart(ChartKind),
  Show,
  Summary,
  Table,
  Describe,
  Insights,
  Ask(String),
  Help,
  Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> std::result::Result<Option<ExploreCommand>, String> {
  let line = line.trim();
  if line.is_empty() {
    return Ok(None);
  }
  let (word, rest) = match line.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, rest.trim()),
    None => (line, ""),
  };
  let values = || -> Vec<String> {
    rest
      .split(|c: char| c == ',' || c.is_whitespace())
      .filter(|v| !v.is_empty())
      .map(str::to_string)
      .collect()
  };

  let command = match word.to_lowercase().as_str() {
    "species" => ExploreCommand::Species(values()),
    "island" | "islands" => ExploreCommand::Island(values()),
    "chart" => ExploreCommand::Chart(rest.parse().map_err(|e| format!("{e}"))?),
    "show" => ExploreCommand::Show,
    "summary" => ExploreCommand::Summary,
    "table" => ExploreCommand::Table,
    "describe" => ExploreCommand::Describe,
    "insights" => ExploreCommand::Insights,
    "ask" if rest.is_empty() => return Err("Usage: ask QUESTION".to_string()),
    "ask" => ExploreCommand::Ask(rest.to_string()),
    "help" | "?" => ExploreCommand::Help,
    "quit" | "exit" | "q" => ExploreCommand::Quit,
    other => return Err(format!("Unknown command '{other}'. Type 'help' for the list.")),
  };
  Ok(Some(command))
}

/// Controls carried from one command to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreState {
  pub filters: Filters,
  pub chart: ChartKind,
}

impl ExploreState {
  pub fn new(filters: Filters, chart: ChartKind) -> Self {
    Self { filters, chart }
  }

  /// Run one command; returns `false` once the session should end
  pub async fn execute(&mut self, app: &mut App, command: ExploreCommand) -> Result<bool> {
    debug!(?command, "explore command");
    match command {
      ExploreCommand::Species(species) => {
        self.filters.species = species;
        self.show(app).await?;
      }
      ExploreCommand::Island(islands) => {
        self.filters.islands = islands;
        self.show(app).await?;
      }
      ExploreCommand::Chart(kind) => {
        self.chart = kind;
        commands::chart(app, &self.filters, kind).await?;
      }
      ExploreCommand::Show => self.show(app).await?,
      ExploreCommand::Summary => {
        commands::summary(app, &self.filters).await?;
      }
      ExploreCommand::Table => {
        commands::table(app, &self.filters).await?;
      }
      ExploreCommand::Describe => self.describe(app).await?,
      ExploreCommand::Insights => {
        commands::insights(app, &self.filters).await?;
      }
      ExploreCommand::Ask(question) => {
        commands::ask(app, &self.filters, &question).await?;
      }
      ExploreCommand::Help => panels::plain(HELP),
      ExploreCommand::Quit => return Ok(false),
    }
    Ok(true)
  }

  /// Describe the resolved single species; an unusable selection only warns
  async fn describe(&self, app: &mut App) -> Result<()> {
    let dataset = app.store.load().await?;
    let selection = self.filters.selection(&dataset);
    if !selection.unknown.is_empty() {
      commands::warn(&format!("Not present in the dataset: {}", selection.unknown.join(", ")));
      return Ok(());
    }
    match selection.single_species() {
      Some(species) => {
        commands::describe(app, species).await?;
      }
      None => commands::warn("Select exactly one species to see its description."),
    }
    Ok(())
  }

  async fn show(&self, app: &mut App) -> Result<()> {
    commands::dashboard(app, &self.filters, self.chart, false, None).await?;
    Ok(())
  }
}

/// Read commands from `input` until `quit` or end of input
///
/// The prompt is printed only when `interactive` is set.
pub async fn run<R>(
  app: &mut App,
  state: &mut ExploreState,
  input: R,
  interactive: bool,
) -> Result<()>
where
  R: AsyncBufRead + Unpin,
{
  panels::title("Palmer penguins explorer");
  panels::plain(HELP);
  state.show(app).await?;

  let mut lines = input.lines();
  loop {
    if interactive {
      print!("pinguino> ");
      std::io::stdout().flush()?;
    }
    let Some(line) = lines.next_line().await? else {
      break;
    };
    match parse_command(&line) {
      Ok(None) => continue,
      Ok(Some(command)) => {
        if !state.execute(app, command).await? {
          break;
        }
      }
      Err(message) => commands::warn(&message),
    }
  }
  Ok(())
}
