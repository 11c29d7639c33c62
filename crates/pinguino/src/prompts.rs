//! Prompt templates for the text generation backend
//!
//! Interpolated content is passed through verbatim: no truncation, no
//! escaping. Large digests make large prompts.

use crate::summary::Digest;

/// Species description: traits, range, behaviour, conservation; one short paragraph
pub fn species_prompt(species: &str) -> String {
  format!(
    r#"Write a detailed description of the {species} penguin that covers:
1. Main physical characteristics
2. Habitat and geographic distribution
3. Behavior and diet
4. Conservation status

Format: a single concise paragraph of 100-150 words."#
  )
}

/// Ask for exactly three insights grounded in the digest
pub fn insight_prompt(digest: &Digest) -> String {
  let correlations = digest.correlation_text();
  format!(
    r#"Analyze this penguin data and provide 3 interesting insights:

Species counts:
{counts}

Descriptive statistics:
{statistics}

{correlations}

Provide exactly 3 brief, specific insights based on this data."#,
    counts = digest.counts_text(),
    statistics = digest.statistics_text(),
  )
}

/// Ask for a brief answer to a free-form question about the data
pub fn question_prompt(question: &str, digest: &Digest) -> String {
  format!(
    r#"Based on this penguin data:

Species counts:
{counts}

Descriptive statistics:
{statistics}

Answer the following question briefly and clearly:
{question}"#,
    counts = digest.counts_text(),
    statistics = digest.statistics_text(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Record;
  use crate::filter::FilteredView;
  use crate::summary::summarize;

  fn records(n: usize) -> Vec<Record> {
    (0..n)
      .map(|i| Record {
        species: "Chinstrap".to_string(),
        island: "Dream".to_string(),
        bill_length_mm: 48.0 + i as f64,
        bill_depth_mm: 18.0 + (i % 2) as f64,
        flipper_length_mm: 195.0 + 2.0 * i as f64,
        body_mass_g: 3700.0 + 50.0 * (i % 3) as f64,
        sex: "Female".to_string(),
      })
      .collect()
  }

  #[test]
  fn test_species_prompt_names_species_and_length() {
    let prompt = species_prompt("Gentoo");
    assert!(prompt.contains("Gentoo penguin"));
    assert!(prompt.contains("Conservation status"));
    assert!(prompt.contains("100-150 words"));
  }

  #[test]
  fn test_insight_prompt_embeds_digest_and_correlations() {
    let data = records(8);
    let digest = summarize(&FilteredView::from_rows(data.iter().collect()));
    let prompt = insight_prompt(&digest);
    assert!(prompt.contains(&digest.counts_text()));
    assert!(prompt.contains(&digest.statistics_text()));
    assert!(prompt.contains(&digest.correlation_text()));
    assert!(prompt.contains("exactly 3"));
  }

  #[test]
  fn test_question_prompt_leaves_out_correlations() {
    let data = records(8);
    let digest = summarize(&FilteredView::from_rows(data.iter().collect()));
    let prompt = question_prompt("Which island is largest?", &digest);
    assert!(prompt.ends_with("Which island is largest?"));
    assert!(!prompt.contains(&digest.correlation_text()));
  }

  #[test]
  fn test_question_is_not_sanitized() {
    let digest = summarize(&FilteredView::default());
    let question = "a\n\n{weird} \"quoted\" ".repeat(100);
    assert!(question_prompt(&question, &digest).contains(&question));
  }
}
