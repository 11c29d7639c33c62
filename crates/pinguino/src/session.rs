//! Session-scoped cache of generated species descriptions

use std::collections::HashMap;
use tracing::debug;

use crate::generation::{Generated, GenerationClient, GenerationFailure, GenerationParams};
use crate::prompts;

/// Species label -> generation outcome, for the lifetime of one session
#[derive(Debug, Default)]
pub struct SessionCache {
  descriptions: HashMap<String, Generated>,
}

impl SessionCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Cached description, generating it on the first request for `species`
  ///
  /// Failures are stored too and replayed without another call. The one
  /// exception is `NotConfigured`, where no call was made.
  pub async fn get_or_generate(&mut self, species: &str, client: &GenerationClient) -> Generated {
    if let Some(outcome) = self.descriptions.get(species) {
      debug!(species, "description served from session cache");
      return outcome.clone();
    }

    let prompt = prompts::species_prompt(species);
    let outcome = client.generate(&prompt, GenerationParams::DEFAULT).await;
    if outcome != Err(GenerationFailure::NotConfigured) {
      self.descriptions.insert(species.to_string(), outcome.clone());
    }
    outcome
  }

  /// Cached description text, if one was generated successfully
  pub fn get(&self, species: &str) -> Option<&str> {
    self.descriptions.get(species).and_then(|outcome| outcome.as_deref().ok())
  }

  pub fn len(&self) -> usize {
    self.descriptions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.descriptions.is_empty()
  }
}
