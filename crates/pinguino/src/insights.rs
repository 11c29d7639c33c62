//! Post-processing of insight responses
//!
//! The model is asked for exactly three insights but nothing enforces a
//! format on its answer. Lines are taken as insights, label lines are dropped,
//! and at least one string always comes back.

pub const MAX_INSIGHTS: usize = 3;
pub const FALLBACK_INSIGHT: &str = "No insights could be generated from the filtered data.";

const LABEL_PREFIX: &str = "Insight";

/// Split a raw response into at most [`MAX_INSIGHTS`] insight strings
pub fn extract_insights(raw: &str) -> Vec<String> {
  let insights: Vec<String> = raw
    .lines()
    .filter(|line| !line.trim().is_empty() && !line.starts_with(LABEL_PREFIX))
    .map(|line| line.trim().to_string())
    .take(MAX_INSIGHTS)
    .collect();

  if insights.is_empty() {
    vec![FALLBACK_INSIGHT.to_string()]
  } else {
    insights
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_five_lines_yield_first_three() {
    let raw = "alpha\nbeta\ngamma\ndelta\nepsilon";
    assert_eq!(extract_insights(raw), vec!["alpha", "beta", "gamma"]);
  }

  #[test]
  fn test_label_lines_and_blanks_are_skipped() {
    let raw = "Insights:\n\n1. Gentoo are heaviest.\nInsight 2\n  2. Adelie live everywhere.  \n";
    assert_eq!(
      extract_insights(raw),
      vec!["1. Gentoo are heaviest.", "2. Adelie live everywhere."]
    );
  }

  #[test]
  fn test_indented_label_is_kept() {
    // Only a label at the very start of the line is dropped
    let raw = "  Insight one: flippers grow with mass";
    assert_eq!(extract_insights(raw), vec!["Insight one: flippers grow with mass"]);
  }

  #[test]
  fn test_empty_and_whitespace_fall_back() {
    assert_eq!(extract_insights(""), vec![FALLBACK_INSIGHT]);
    assert_eq!(extract_insights("  \n\t\n   "), vec![FALLBACK_INSIGHT]);
  }

  #[test]
  fn test_only_labels_fall_back() {
    assert_eq!(extract_insights("Insight 1\nInsight 2"), vec![FALLBACK_INSIGHT]);
  }

  #[test]
  fn test_windows_line_endings() {
    assert_eq!(extract_insights("one\r\ntwo\r\n"), vec!["one", "two"]);
  }
}
