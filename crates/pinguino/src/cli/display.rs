//! Rendering dashboard views through panels

use crate::pipeline::{Block, DashboardView};

/// Insight items as bullet lines
pub fn format_insights(items: &[String]) -> String {
  items.iter().map(|item| format!("- {item}")).collect::<Vec<_>>().join("\n")
}

/// Print every block of `view` in order
pub fn render(view: &DashboardView) {
  for block in &view.blocks {
    match block {
      Block::Heading(title) => panels::header(title),
      Block::Notice(notice) => panels::panel(notice.tone, &notice.text),
      Block::Preformatted(text) => panels::emit(text),
      Block::Paragraph(text) => panels::plain(text),
      Block::Insights(items) => panels::plain(&format_insights(items)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_insights_bullets_each_item() {
    let items = vec!["Gentoo are heaviest.".to_string(), "Dream hosts two species.".to_string()];
    assert_eq!(format_insights(&items), "- Gentoo are heaviest.\n- Dream hosts two species.");
  }
}
