use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use pinguino::charts::ChartKind;
use pinguino::cli::commands::{self, App};
use pinguino::cli::explore::{self, ExploreState};
use pinguino::cli::Filters;
use pinguino::config::Settings;

#[derive(Parser)]
#[command(name = "pinguino")]
#[command(
  about = "Pinguino - Palmer penguins explorer\nFilter, chart and summarize the penguin morphology dataset, with generated descriptions, insights and answers"
)]
#[command(version)]
struct Cli {
  #[command(flatten)]
  source: Source,

  #[command(flatten)]
  filters: Filters,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

/// Dataset and generation backend options
#[derive(Args)]
struct Source {
  /// Local CSV file with the penguin dataset
  #[arg(long, env = "PINGUINO_DATA", global = true)]
  data: Option<PathBuf>,
  /// URL of the penguin dataset CSV
  #[arg(long, env = "PINGUINO_DATA_URL", global = true)]
  data_url: Option<String>,
  /// API key for the text generation service
  #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
  api_key: Option<String>,
  /// Model used for generated content
  #[arg(long, env = "PINGUINO_MODEL", global = true)]
  model: Option<String>,
  /// Base URL of the chat-completions API
  #[arg(long, env = "PINGUINO_API_BASE", global = true)]
  api_base: Option<String>,
}

#[derive(Subcommand)]
enum Command {
  /// Show the full dashboard for the current filters (default)
  Dashboard {
    /// Chart to draw
    #[arg(short, long, value_enum, default_value = "scatter")]
    chart: ChartKind,
    /// Also generate three insights about the filtered data
    #[arg(short, long)]
    insights: bool,
    /// Ask a question about the filtered data
    #[arg(short, long)]
    question: Option<String>,
  },
  /// Print counts, descriptive statistics and correlations
  Summary,
  /// Draw one chart
  Chart {
    #[arg(value_enum)]
    kind: ChartKind,
  },
  /// Print the first rows of the filtered data
  Table,
  /// Generated description of one species
  Describe {
    species: String,
  },
  /// Generate three insights about the filtered data
  Insights,
  /// Ask a question about the filtered data
  Ask {
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Interactive session reading commands from stdin
  Explore {
    /// Initial chart
    #[arg(short, long, value_enum, default_value = "scatter")]
    chart: ChartKind,
  },
}

fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("pinguino=debug")
    } else {
      EnvFilter::new("pinguino=warn")
    }
  });

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .init();
}

async fn handle(cli: Cli) -> Result<()> {
  let Source { data, data_url, api_key, model, api_base } = cli.source;
  let settings = Settings::resolve(data, data_url.as_deref(), api_key, model, api_base)?;
  let mut app = App::from_settings(&settings);
  let filters = cli.filters;

  let command = cli.command.unwrap_or(Command::Dashboard {
    chart: ChartKind::Scatter,
    insights: false,
    question: None,
  });

  match command {
    Command::Dashboard { chart, insights, question } => {
      commands::dashboard(&mut app, &filters, chart, insights, question).await?;
    }
    Command::Summary => {
      commands::summary(&mut app, &filters).await?;
    }
    Command::Chart { kind } => {
      commands::chart(&mut app, &filters, kind).await?;
    }
    Command::Table => {
      commands::table(&mut app, &filters).await?;
    }
    Command::Describe { species } => {
      commands::describe(&mut app, &species).await?;
    }
    Command::Insights => {
      commands::insights(&mut app, &filters).await?;
    }
    Command::Ask { question } => {
      commands::ask(&mut app, &filters, &question.join(" ")).await?;
    }
    Command::Explore { chart } => {
      let mut state = ExploreState::new(filters, chart);
      let input = tokio::io::BufReader::new(tokio::io::stdin());
      let interactive = std::io::stdin().is_terminal();
      explore::run(&mut app, &mut state, input, interactive).await?;
    }
  }
  Ok(())
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(e) = handle(cli).await {
    panels::fail(&format!("{e:#}"));
    std::process::exit(1);
  }
}
