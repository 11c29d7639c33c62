//! Palmer penguins explorer
//!
//! Filters the morphology dataset by species and island, draws charts and
//! tables in the terminal, and asks a chat-completion backend for species
//! descriptions, data-grounded insights and answers to free-form questions.

pub mod charts;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod generation;
pub mod insights;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod stats;
pub mod summary;
pub mod table;

pub use error::{PinguinoError, Result};
