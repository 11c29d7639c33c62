//! Chart specifications and a plain-text terminal renderer
//!
//! Building a [`ChartSpec`] is pure; drawing goes through the
//! [`ChartRenderer`] seam so the "never call the plotting step on an empty
//! view" rule can be observed from tests.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;

use crate::dataset::NumericColumn;
use crate::error::PinguinoError;
use crate::filter::FilteredView;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChartKind {
  Scatter,
  Box,
  Violin,
  Pair,
}

impl ChartKind {
  pub const ALL: [ChartKind; 4] =
    [ChartKind::Scatter, ChartKind::Box, ChartKind::Violin, ChartKind::Pair];

  pub fn label(&self) -> &'static str {
    match self {
      ChartKind::Scatter => "Scatter Plot",
      ChartKind::Box => "Box Plot",
      ChartKind::Violin => "Violin Plot",
      ChartKind::Pair => "Pair Plot",
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      ChartKind::Scatter => "Flipper length vs. body mass",
      ChartKind::Box => "Body mass distribution by species",
      ChartKind::Violin => "Flipper length distribution by species",
      ChartKind::Pair => "Relationships between measurements by species",
    }
  }
}

impl FromStr for ChartKind {
  type Err = PinguinoError;

  /// Accepts short names ("box") and display labels ("Box Plot"), case-insensitively
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let normalized = s.trim().to_lowercase();
    let normalized = normalized.strip_suffix(" plot").unwrap_or(&normalized);
    match normalized {
      "scatter" => Ok(ChartKind::Scatter),
      "box" => Ok(ChartKind::Box),
      "violin" => Ok(ChartKind::Violin),
      "pair" => Ok(ChartKind::Pair),
      _ => Err(PinguinoError::unknown_chart_kind(s.trim())),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
  pub x: f64,
  pub y: f64,
  pub size: f64,
  pub group: String,
}

/// Values of one column for one species
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValues {
  pub group: String,
  pub values: Vec<f64>,
}

/// Every numeric column for one species, column-major
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedColumns {
  pub group: String,
  pub columns: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
  Scatter { x: NumericColumn, y: NumericColumn, size: NumericColumn, points: Vec<ScatterPoint> },
  ByGroup { value: NumericColumn, groups: Vec<GroupedValues> },
  Pair { columns: Vec<NumericColumn>, groups: Vec<GroupedColumns> },
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
  pub kind: ChartKind,
  pub title: &'static str,
  pub data: ChartData,
}

impl ChartSpec {
  pub fn build(kind: ChartKind, view: &FilteredView<'_>) -> Self {
    let data = match kind {
      ChartKind::Scatter => ChartData::Scatter {
        x: NumericColumn::FlipperLength,
        y: NumericColumn::BodyMass,
        size: NumericColumn::BillLength,
        points: view
          .rows()
          .iter()
          .map(|r| ScatterPoint {
            x: r.flipper_length_mm,
            y: r.body_mass_g,
            size: r.bill_length_mm,
            group: r.species.clone(),
          })
          .collect(),
      },
      ChartKind::Box => by_group(view, NumericColumn::BodyMass),
      ChartKind::Violin => by_group(view, NumericColumn::FlipperLength),
      ChartKind::Pair => ChartData::Pair {
        columns: NumericColumn::ALL.to_vec(),
        groups: view
          .species()
          .into_iter()
          .map(|group| GroupedColumns {
            group: group.to_string(),
            columns: NumericColumn::ALL
              .iter()
              .map(|c| {
                view.rows().iter().filter(|r| r.species == group).map(|r| c.value(r)).collect()
              })
              .collect(),
          })
          .collect(),
      },
    };
    Self { kind, title: kind.title(), data }
  }
}

fn by_group(view: &FilteredView<'_>, value: NumericColumn) -> ChartData {
  let groups = view
    .species()
    .into_iter()
    .map(|group| GroupedValues {
      group: group.to_string(),
      values: view.rows().iter().filter(|r| r.species == group).map(|r| value.value(r)).collect(),
    })
    .collect();
  ChartData::ByGroup { value, groups }
}

/// The plotting step
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer {
  fn render(&mut self, spec: &ChartSpec) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
  /// Rendered chart text
  Drawn(String),
  /// Nothing to draw; carries the warning to show instead
  Skipped(String),
  /// The renderer failed; carries the error to show instead
  Failed(String),
}

/// Build and render a chart; an empty view short-circuits before the renderer
pub fn draw_chart(
  kind: ChartKind,
  view: &FilteredView<'_>,
  renderer: &mut dyn ChartRenderer,
) -> ChartOutcome {
  if view.is_empty() {
    debug!(chart = kind.label(), "empty view, chart skipped");
    return ChartOutcome::Skipped(format!("Not enough data to draw a {}.", kind.label()));
  }

  let spec = ChartSpec::build(kind, view);
  match renderer.render(&spec) {
    Ok(text) => ChartOutcome::Drawn(text),
    Err(e) => ChartOutcome::Failed(format!("Error generating the chart: {e}")),
  }
}

const SCATTER_GLYPHS: [(char, char); 6] =
  [('o', 'O'), ('x', 'X'), ('+', '#'), ('s', 'S'), ('v', 'V'), ('e', 'E')];
const DENSITY_LEVELS: [char; 8] = [' ', '.', ':', '-', '=', '+', '*', '#'];
const VIOLIN_BINS: usize = 24;

/// Draws charts with ASCII characters sized to a text grid
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
  width: usize,
  height: usize,
}

impl TerminalRenderer {
  pub fn new(width: usize, height: usize) -> Self {
    Self { width: width.max(10), height: height.max(4) }
  }

  /// Size the plot area to the available terminal width
  pub fn for_terminal_width(columns: usize) -> Self {
    Self::new(columns.saturating_sub(24).min(72), 16)
  }
}

impl Default for TerminalRenderer {
  fn default() -> Self {
    Self::new(56, 16)
  }
}

/// Maps a value range onto `cells` integer positions
struct Scale {
  min: f64,
  span: f64,
  cells: usize,
}

impl Scale {
  fn of(values: impl Iterator<Item = f64>, cells: usize) -> Option<Self> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
      lo = lo.min(v);
      hi = hi.max(v);
    }
    if lo > hi {
      return None;
    }
    Some(Self { min: lo, span: hi - lo, cells })
  }

  fn position(&self, value: f64) -> usize {
    if self.span <= 0.0 {
      return self.cells / 2;
    }
    let ratio = ((value - self.min) / self.span).clamp(0.0, 1.0);
    ((ratio * (self.cells - 1) as f64).round() as usize).min(self.cells - 1)
  }

  fn max(&self) -> f64 {
    self.min + self.span
  }
}

fn fmt_num(value: f64) -> String {
  if value.is_finite() {
    format!("{value:.2}")
  } else {
    "NaN".to_string()
  }
}

impl ChartRenderer for TerminalRenderer {
  fn render(&mut self, spec: &ChartSpec) -> Result<String> {
    let body = match &spec.data {
      ChartData::Scatter { x, y, size, points } => self.scatter(*x, *y, *size, points),
      ChartData::ByGroup { value, groups } => match spec.kind {
        ChartKind::Violin => self.violin(*value, groups),
        _ => self.boxes(*value, groups),
      },
      ChartData::Pair { columns, groups } => pair(columns, groups),
    };
    Ok(format!("{}\n{}", spec.title, body))
  }
}

impl TerminalRenderer {
  fn scatter(
    &self,
    x: NumericColumn,
    y: NumericColumn,
    size: NumericColumn,
    points: &[ScatterPoint],
  ) -> String {
    let (Some(xs), Some(ys)) = (
      Scale::of(points.iter().map(|p| p.x), self.width),
      Scale::of(points.iter().map(|p| p.y), self.height),
    ) else {
      return "(no data)".to_string();
    };
    let sizes: Vec<f64> = points.iter().map(|p| p.size).collect();
    let size_cut = stats::quantile(&sizes, 0.5);

    let mut groups: Vec<&str> = Vec::new();
    let mut grid = vec![vec![' '; self.width]; self.height];
    for point in points {
      let index = match groups.iter().position(|g| *g == point.group) {
        Some(i) => i,
        None => {
          groups.push(&point.group);
          groups.len() - 1
        }
      };
      let (small, large) = SCATTER_GLYPHS[index % SCATTER_GLYPHS.len()];
      let glyph = if point.size > size_cut { large } else { small };
      let row = self.height - 1 - ys.position(point.y);
      grid[row][xs.position(point.x)] = glyph;
    }

    let top = fmt_num(ys.max());
    let bottom = fmt_num(ys.min);
    let label_width = top.len().max(bottom.len());
    let mut out = format!("{} (y) vs. {} (x)\n", y.name(), x.name());
    for (i, row) in grid.iter().enumerate() {
      let label = match i {
        0 => top.as_str(),
        i if i == self.height - 1 => bottom.as_str(),
        _ => "",
      };
      let _ = writeln!(out, "{label:>label_width$} |{}", row.iter().collect::<String>());
    }
    let _ = writeln!(out, "{:>label_width$} +{}", "", "-".repeat(self.width));
    let left = fmt_num(xs.min);
    let right = fmt_num(xs.max());
    let gap = self.width.saturating_sub(left.len() + right.len());
    let _ = writeln!(out, "{:>label_width$}  {left}{}{right}", "", " ".repeat(gap));

    let legend: Vec<String> = groups
      .iter()
      .enumerate()
      .map(|(i, g)| {
        let (small, large) = SCATTER_GLYPHS[i % SCATTER_GLYPHS.len()];
        format!("{small}/{large} {g}")
      })
      .collect();
    let _ = write!(out, "{}  (upper case: {} above median)", legend.join("  "), size.name());
    out
  }

  fn boxes(&self, value: NumericColumn, groups: &[GroupedValues]) -> String {
    let Some(scale) = Scale::of(groups.iter().flat_map(|g| g.values.iter().copied()), self.width)
    else {
      return "(no data)".to_string();
    };
    let label_width = groups.iter().map(|g| g.group.len()).max().unwrap_or(0);

    let mut out = format!("{} by species\n", value.name());
    for group in groups {
      let mut sorted = group.values.clone();
      sorted.sort_by(|a, b| a.total_cmp(b));
      let lo = scale.position(stats::quantile_sorted(&sorted, 0.0));
      let q1 = scale.position(stats::quantile_sorted(&sorted, 0.25));
      let median = stats::quantile_sorted(&sorted, 0.5);
      let q3 = scale.position(stats::quantile_sorted(&sorted, 0.75));
      let hi = scale.position(stats::quantile_sorted(&sorted, 1.0));

      let line: String = (0..self.width)
        .map(|i| match i {
          i if i == scale.position(median) => '|',
          i if i >= q1 && i <= q3 => '=',
          i if i >= lo && i <= hi => '-',
          _ => ' ',
        })
        .collect();
      let _ = writeln!(
        out,
        "{:<label_width$} [{line}] median {} (n={})",
        group.group,
        fmt_num(median),
        sorted.len()
      );
    }
    let range = format!("range {} .. {}", fmt_num(scale.min), fmt_num(scale.max()));
    let _ = write!(out, "{:<label_width$}  {range}", "");
    out
  }

  fn violin(&self, value: NumericColumn, groups: &[GroupedValues]) -> String {
    let bins = VIOLIN_BINS.min(self.width);
    let Some(scale) = Scale::of(groups.iter().flat_map(|g| g.values.iter().copied()), bins) else {
      return "(no data)".to_string();
    };
    let label_width = groups.iter().map(|g| g.group.len()).max().unwrap_or(0);

    let mut out = format!("{} density by species\n", value.name());
    for group in groups {
      let mut counts = vec![0usize; bins];
      for v in &group.values {
        counts[scale.position(*v)] += 1;
      }
      let peak = counts.iter().copied().max().unwrap_or(0).max(1);
      let top = DENSITY_LEVELS.len() - 1;
      let strip: String = counts
        .iter()
        .map(|&c| {
          let level = if c == 0 { 0 } else { 1 + (c * (top - 1)) / peak };
          DENSITY_LEVELS[level.min(top)]
        })
        .collect();
      let _ = writeln!(
        out,
        "{:<label_width$} [{strip}] mean {} (n={})",
        group.group,
        fmt_num(stats::mean(&group.values)),
        group.values.len()
      );
    }
    let range = format!("range {} .. {}", fmt_num(scale.min), fmt_num(scale.max()));
    let _ = write!(out, "{:<label_width$}  {range}", "");
    out
  }
}

/// Per-species lower-triangle matrices: means on the diagonal, correlations below
fn pair(columns: &[NumericColumn], groups: &[GroupedColumns]) -> String {
  if groups.is_empty() {
    return "(no data)".to_string();
  }
  let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
  let label_width = names.iter().map(|n| n.len()).max().unwrap_or(0);
  let cell_width = 10;

  let mut out = String::new();
  for group in groups {
    let n = group.columns.first().map(Vec::len).unwrap_or(0);
    let _ = writeln!(out, "{} (n={n})", group.group);
    for (i, name) in names.iter().enumerate() {
      let _ = write!(out, "  {name:<label_width$}");
      for j in 0..=i {
        let cell = if i == j {
          format!("~{}", fmt_num(stats::mean(&group.columns[i])))
        } else {
          fmt_num(stats::pearson(&group.columns[i], &group.columns[j]))
        };
        let _ = write!(out, " {cell:>cell_width$}");
      }
      out.push('\n');
    }
  }
  out.push_str("(~ column mean, others Pearson r)");
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Record;

  fn record(species: &str, mass: f64) -> Record {
    Record {
      species: species.to_string(),
      island: "Dream".to_string(),
      bill_length_mm: mass / 100.0,
      bill_depth_mm: 18.0,
      flipper_length_mm: 180.0 + mass / 200.0,
      body_mass_g: mass,
      sex: "Male".to_string(),
    }
  }

  #[test]
  fn test_parse_chart_kind_labels() {
    assert_eq!("Box Plot".parse::<ChartKind>().unwrap(), ChartKind::Box);
    assert_eq!("pair".parse::<ChartKind>().unwrap(), ChartKind::Pair);
    assert_eq!(" SCATTER plot ".parse::<ChartKind>().unwrap(), ChartKind::Scatter);
    assert!(matches!("pie".parse::<ChartKind>(), Err(PinguinoError::UnknownChartKind { .. })));
  }

  #[test]
  fn test_empty_view_never_reaches_renderer() {
    for kind in ChartKind::ALL {
      let mut renderer = MockChartRenderer::new();
      renderer.expect_render().times(0);
      let outcome = draw_chart(kind, &FilteredView::default(), &mut renderer);
      let warning = format!("Not enough data to draw a {}.", kind.label());
      assert_eq!(outcome, ChartOutcome::Skipped(warning));
    }
  }

  #[test]
  fn test_renderer_failure_becomes_message() {
    let records = vec![record("Adelie", 3500.0)];
    let view = FilteredView::from_rows(records.iter().collect());
    let mut renderer = MockChartRenderer::new();
    renderer.expect_render().times(1).returning(|_| Err(anyhow::anyhow!("backend exploded")));

    match draw_chart(ChartKind::Violin, &view, &mut renderer) {
      ChartOutcome::Failed(message) => assert!(message.contains("backend exploded")),
      other => panic!("Expected failure, got: {other:?}"),
    }
  }

  #[test]
  fn test_box_spec_groups_body_mass_by_species() {
    let records =
      vec![record("Adelie", 3500.0), record("Gentoo", 5000.0), record("Adelie", 3600.0)];
    let view = FilteredView::from_rows(records.iter().collect());
    let spec = ChartSpec::build(ChartKind::Box, &view);
    assert_eq!(
      spec.data,
      ChartData::ByGroup {
        value: NumericColumn::BodyMass,
        groups: vec![
          GroupedValues { group: "Adelie".to_string(), values: vec![3500.0, 3600.0] },
          GroupedValues { group: "Gentoo".to_string(), values: vec![5000.0] },
        ],
      }
    );
  }

  #[test]
  fn test_terminal_renderer_handles_single_row_for_every_kind() {
    let records = vec![record("Chinstrap", 3700.0)];
    let view = FilteredView::from_rows(records.iter().collect());
    let mut renderer = TerminalRenderer::default();
    for kind in ChartKind::ALL {
      match draw_chart(kind, &view, &mut renderer) {
        ChartOutcome::Drawn(text) => {
          assert!(text.starts_with(kind.title()));
          assert!(text.contains("Chinstrap") || kind == ChartKind::Scatter);
        }
        other => panic!("Expected a drawn {}, got: {other:?}", kind.label()),
      }
    }
  }

  #[test]
  fn test_scatter_legend_lists_groups() {
    let records =
      vec![record("Adelie", 3500.0), record("Gentoo", 5200.0), record("Gentoo", 5600.0)];
    let view = FilteredView::from_rows(records.iter().collect());
    let spec = ChartSpec::build(ChartKind::Scatter, &view);
    let text = TerminalRenderer::new(30, 8).render(&spec).unwrap();
    assert!(text.contains("o/O Adelie"));
    assert!(text.contains("x/X Gentoo"));
    assert!(text.contains("5600.00"));
  }

  #[test]
  fn test_box_marks_median() {
    let records =
      vec![record("Adelie", 3000.0), record("Adelie", 4000.0), record("Adelie", 5000.0)];
    let view = FilteredView::from_rows(records.iter().collect());
    let spec = ChartSpec::build(ChartKind::Box, &view);
    let text = TerminalRenderer::new(21, 8).render(&spec).unwrap();
    let line = text.lines().find(|l| l.starts_with("Adelie")).unwrap();
    assert!(line.contains("[-----=====|=====-----]"));
    assert!(line.contains("median 4000.00 (n=3)"));
  }
}
