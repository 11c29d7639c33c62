//! ## Features
//!
//! - Toned message panels (info, warning, error, success, plain)
//! - Multi-line message support with a consistent prefix on every line
//! - Section headers and banners for dashboard layouts
//! - Paragraph wrapping that respects the terminal width
//!
//! ## Usage
//!
//! Printing: `info()`, `warning()`, `error()`, `success()`, `plain()`, `header()`, `subheader()`
//!
//! Formatting without printing: `format_panel()`, `format_header()`, `wrap_text()`
//!
//! Panels go to stdout since they are the dashboard itself. `fail()` is the one
//! exception and writes to stderr for fatal conditions.

use colored::*;
use console::Term;

const DEFAULT_WIDTH: usize = 80;
const MAX_WIDTH: usize = 100;

/// Visual tone of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
  Info,
  Warning,
  Error,
  Success,
  Plain,
}

impl Tone {
  fn label(&self) -> &'static str {
    match self {
      Tone::Info => "info",
      Tone::Warning => "warn",
      Tone::Error => "error",
      Tone::Success => "ok",
      Tone::Plain => "",
    }
  }

  fn color(&self) -> Color {
    match self {
      Tone::Info => Color::Blue,
      Tone::Warning => Color::Yellow,
      Tone::Error => Color::Red,
      Tone::Success => Color::Green,
      Tone::Plain => Color::White,
    }
  }
}

/// Width available for output, clamped so wide terminals still read well
pub fn terminal_width() -> usize {
  let (_, cols) = Term::stdout().size();
  let cols = cols as usize;
  if cols == 0 {
    DEFAULT_WIDTH
  } else {
    cols.min(MAX_WIDTH)
  }
}

/// Core output function, one `println!` per line
pub fn emit(message: &str) {
  for line in message.lines() {
    println!("{line}");
  }
}

/// Format a colored prefix for panel lines
fn format_prefix(tone: Tone) -> String {
  let label = tone.label();
  if label.is_empty() {
    return String::new();
  }
  let pad = 7usize.saturating_sub(label.len() + 2);
  format!("[{}]{:<pad$} ", label.color(tone.color()).bold(), "")
}

/// Format a message as a panel, prefixing every line with the tone label
pub fn format_panel(tone: Tone, message: &str) -> String {
  let prefix = format_prefix(tone);
  if message.is_empty() {
    return prefix.trim_end().to_string();
  }
  message.lines().map(|line| format!("{prefix}{line}")).collect::<Vec<_>>().join("\n")
}

/// Print a panel with the given tone
pub fn panel(tone: Tone, message: &str) {
  emit(&format_panel(tone, message));
}

/// Informational panel - something the user should know
pub fn info(message: &str) {
  panel(Tone::Info, message);
}

/// Warning panel - the requested view cannot be produced as asked
pub fn warning(message: &str) {
  panel(Tone::Warning, message);
}

/// Error panel - something went wrong but the dashboard goes on
pub fn error(message: &str) {
  panel(Tone::Error, message);
}

/// Success panel - a generated answer or completed action
pub fn success(message: &str) {
  panel(Tone::Success, message);
}

/// Unadorned text, wrapped to the terminal width
pub fn plain(message: &str) {
  emit(&wrap_text(message, terminal_width()).join("\n"));
}

/// Fatal condition, written to stderr
pub fn fail(message: &str) {
  let prefix = format!("[{}]", "fail".bright_red().bold());
  for line in message.lines() {
    eprintln!("{prefix} {line}");
  }
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Display a message with a banner around it
pub fn as_banner<F>(log_fn: F, message: &str, width: Option<usize>, border_char: Option<char>)
where
  F: Fn(&str),
{
  let width = width.unwrap_or(50);
  let border_char = border_char.unwrap_or('=');

  let banner = banner_line(width, border_char);

  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

/// Format a section header: title followed by an underline of matching length
pub fn format_header(title: &str, underline: char) -> String {
  let width = title.chars().count().max(1);
  format!("{}\n{}", title.bold(), banner_line(width, underline))
}

/// Top-level title, framed by banners
pub fn title(message: &str) {
  let width = message.chars().count().clamp(20, terminal_width());
  as_banner(|msg| emit(&msg.cyan().bold().to_string()), message, Some(width), Some('='));
}

/// Section header
pub fn header(title: &str) {
  emit("");
  emit(&format_header(title, '='));
}

/// Sub-section header
pub fn subheader(title: &str) {
  emit("");
  emit(&format_header(title, '-'));
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let words: Vec<&str> = paragraph.split_whitespace().collect();
    let mut current_line = String::new();

    for word in words {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plain_panel_has_no_prefix() {
    assert_eq!(format_panel(Tone::Plain, "hello"), "hello");
  }

  #[test]
  fn test_panel_prefixes_every_line() {
    colored::control::set_override(false);
    let formatted = format_panel(Tone::Warning, "one\ntwo");
    let lines: Vec<&str> = formatted.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("[warn]")));
    assert!(lines[1].ends_with("two"));
  }

  #[test]
  fn test_wrap_text_respects_width() {
    let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
    assert!(lines.iter().all(|l| l.chars().count() <= 10));
    assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
  }

  #[test]
  fn test_wrap_text_keeps_blank_paragraphs() {
    let lines = wrap_text("a\n\nb", 80);
    assert_eq!(lines, vec!["a".to_string(), String::new(), "b".to_string()]);
  }
}
