use crate::codes;
use diagnostics::Diagnostic;
use tracing::debug;

/// Collects diagnostics in report order.
///
/// Once `max_errors` errors have been recorded, later errors are dropped and
/// a single warning marks where recording stopped. Warnings are always kept.
#[derive(Debug)]
pub struct Sink {
  diagnostics: Vec<Diagnostic>,
  errors: usize,
  max_errors: usize,
  truncated: bool,
}

impl Sink {
  pub fn new(max_errors: usize) -> Sink {
    Sink {
      diagnostics: Vec::new(),
      errors: 0,
      max_errors,
      truncated: false,
    }
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    if diagnostic.is_error() {
      if self.errors >= self.max_errors {
        if !self.truncated {
          debug!(limit = self.max_errors, "error limit reached");
          self.truncated = true;
          self
            .diagnostics
            .push(codes::TOO_MANY_ERRORS.at(diagnostic.primary));
        }
        return;
      }
      self.errors += 1;
    }
    self.diagnostics.push(diagnostic);
  }

  pub fn error_count(&self) -> usize {
    self.errors
  }

  pub fn is_truncated(&self) -> bool {
    self.truncated
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }
}

#[cfg(test)]
mod tests {
  use super::Sink;
  use crate::codes;
  use diagnostics::FileId;
  use diagnostics::Span;
  use diagnostics::TextRange;

  fn span(start: u32) -> Span {
    Span::new(FileId(0), TextRange::new(start, start + 1))
  }

  #[test]
  fn truncates_once_after_limit() {
    let mut sink = Sink::new(2);
    for i in 0..5 {
      sink.push(codes::UNKNOWN_NAME.at(span(i)));
    }
    sink.push(codes::UNUSED.at(span(9)));
    assert_eq!(sink.error_count(), 2);
    assert!(sink.is_truncated());
    let ids: Vec<u32> = sink.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(
      ids,
      vec![
        codes::UNKNOWN_NAME.id,
        codes::UNKNOWN_NAME.id,
        codes::TOO_MANY_ERRORS.id,
        codes::UNUSED.id
      ]
    );
  }
}
