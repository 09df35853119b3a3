//! Shared diagnostics model and rendering utilities.
//!
//! The data structures here are deliberately small and deterministic so the
//! type checker, its tests and any host tool can exchange diagnostics without
//! agreeing on anything beyond this crate.
//!
//! ```
//! use diagnostics::files::SimpleFiles;
//! use diagnostics::render::render_diagnostic;
//! use diagnostics::{Diagnostic, Span, TextRange};
//!
//! let mut files = SimpleFiles::new();
//! let file = files.add("example.vdmsl", "values x = 1;");
//! let diag = Diagnostic::error(3001, "an example error", Span {
//!   file,
//!   range: TextRange::new(7, 8),
//! })
//! .with_detail("Expected", "nat");
//!
//! let rendered = render_diagnostic(&files, &diag);
//! assert!(rendered.contains("error[3001]"));
//! assert!(rendered.contains("--> example.vdmsl:1:8"));
//! assert!(rendered.contains("= Expected: nat"));
//! ```

pub mod files;
pub mod render;

use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use syntax_vdm::loc::Loc;

/// A stable identifier for a source file in a program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl Display for FileId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A byte range in a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
  pub start: u32,
  pub end: u32,
}

impl TextRange {
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  pub fn len(&self) -> u32 {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }
}

impl From<Loc> for TextRange {
  /// Converts a `Loc` by saturating its offsets to `u32`.
  fn from(value: Loc) -> Self {
    Self {
      start: saturating_to_u32(value.0),
      end: saturating_to_u32(value.1),
    }
  }
}

/// A span across a specific file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
  pub file: FileId,
  pub range: TextRange,
}

impl Span {
  pub const fn new(file: FileId, range: TextRange) -> Self {
    Self { file, range }
  }

  /// Span of `loc` inside `file`.
  pub fn at(file: FileId, loc: Loc) -> Self {
    Self {
      file,
      range: loc.into(),
    }
  }
}

/// Diagnostic severity. The checker only ever classifies problems as errors or
/// warnings; there is no fatal category.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
  Error,
  Warning,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A label attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
  pub span: Span,
  pub message: String,
  pub is_primary: bool,
}

impl Label {
  pub fn new(span: Span, message: impl Into<String>, is_primary: bool) -> Self {
    Self {
      span,
      message: message.into(),
      is_primary,
    }
  }

  pub fn primary(span: Span, message: impl Into<String>) -> Self {
    Self::new(span, message, true)
  }

  pub fn secondary(span: Span, message: impl Into<String>) -> Self {
    Self::new(span, message, false)
  }
}

/// Supplementary `(tag, value)` context, e.g. `("Expected", "nat")`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Detail {
  pub tag: String,
  pub value: String,
}

/// A user-facing diagnostic with a numeric code, optional secondary labels,
/// free-form notes and tagged details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub code: u32,
  pub severity: Severity,
  pub message: String,
  pub primary: Span,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
  pub details: Vec<Detail>,
}

impl Diagnostic {
  pub fn new(severity: Severity, code: u32, message: impl Into<String>, primary: Span) -> Self {
    Self {
      code,
      severity,
      message: message.into(),
      primary,
      labels: Vec::new(),
      notes: Vec::new(),
      details: Vec::new(),
    }
  }

  pub fn error(code: u32, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Error, code, message, primary)
  }

  pub fn warning(code: u32, message: impl Into<String>, primary: Span) -> Self {
    Self::new(Severity::Warning, code, message, primary)
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }

  pub fn is_warning(&self) -> bool {
    self.severity == Severity::Warning
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn with_detail(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
    self.push_detail(tag, value);
    self
  }

  pub fn push_note(&mut self, note: impl Into<String>) {
    self.notes.push(note.into());
  }

  pub fn push_detail(&mut self, tag: impl Into<String>, value: impl Into<String>) {
    self.details.push(Detail {
      tag: tag.into(),
      value: value.into(),
    });
  }

  pub fn merge_related<I>(mut self, labels: I) -> Self
  where
    I: IntoIterator<Item = Label>,
  {
    self.labels.extend(labels);
    self
  }

  /// Value of the first detail with the given tag.
  pub fn detail(&self, tag: &str) -> Option<&str> {
    self
      .details
      .iter()
      .find(|d| d.tag == tag)
      .map(|d| d.value.as_str())
  }
}

/// Order labels by file, then offset, then message.
pub fn sort_labels(labels: &mut [Label]) {
  labels.sort_by(|a, b| {
    b.is_primary
      .cmp(&a.is_primary)
      .then(a.span.cmp(&b.span))
      .then(a.message.cmp(&b.message))
  });
}

/// Sort diagnostics by primary location, then code, then message. The sort is
/// stable, so diagnostics reported at the same place keep their report order.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
  diagnostics.sort_by(|a, b| {
    a.primary
      .file
      .cmp(&b.primary.file)
      .then(a.primary.range.start.cmp(&b.primary.range.start))
      .then(a.primary.range.end.cmp(&b.primary.range.end))
      .then(a.code.cmp(&b.code))
      .then(a.message.cmp(&b.message))
  });
}

fn saturating_to_u32(value: usize) -> u32 {
  u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn span(start: u32, end: u32) -> Span {
    Span::new(FileId(0), TextRange::new(start, end))
  }

  #[test]
  fn loc_conversion_is_lossless_when_fitting() {
    let range: TextRange = Loc(10, 20).into();
    assert_eq!(range, TextRange::new(10, 20));
  }

  #[test]
  fn loc_conversion_saturates() {
    let range: TextRange = Loc(usize::MAX - 1, usize::MAX).into();
    assert_eq!(range, TextRange::new(u32::MAX, u32::MAX));
  }

  #[test]
  fn details_are_kept_in_report_order() {
    let diag = Diagnostic::error(3061, "Inappropriate type for argument 1", span(0, 1))
      .with_detail("Expect", "nat")
      .with_detail("Actual", "bool");
    assert_eq!(diag.detail("Expect"), Some("nat"));
    assert_eq!(diag.detail("Actual"), Some("bool"));
    assert_eq!(diag.details[0].tag, "Expect");
    assert_eq!(diag.detail("Missing"), None);
  }

  #[test]
  fn sort_is_by_location_then_code() {
    let mut diags = vec![
      Diagnostic::error(3002, "b", span(5, 6)),
      Diagnostic::warning(5000, "a", span(1, 2)),
      Diagnostic::error(3001, "c", span(5, 6)),
    ];
    sort_diagnostics(&mut diags);
    let codes: Vec<u32> = diags.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![5000, 3001, 3002]);
  }

  #[test]
  fn primary_labels_sort_first() {
    let mut labels = vec![
      Label::secondary(span(0, 1), "earlier"),
      Label::primary(span(9, 10), "main"),
    ];
    sort_labels(&mut labels);
    assert!(labels[0].is_primary);
  }
}
