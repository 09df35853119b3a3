use crate::Diagnostic;
use crate::FileId;
use crate::Label;
use crate::Severity;
use crate::TextRange;
use std::fmt::Write;

const ANSI_RESET: &str = "\u{1b}[0m";
const ANSI_BOLD_RED: &str = "\u{1b}[1;31m";
const ANSI_BOLD_YELLOW: &str = "\u{1b}[1;33m";
const ANSI_BOLD_BLUE: &str = "\u{1b}[1;34m";

/// Provides access to source text for rendering diagnostics.
pub trait SourceProvider {
  fn file_name(&self, file: FileId) -> Option<&str>;
  fn file_text(&self, file: FileId) -> Option<&str>;
}

/// Options to control diagnostic rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
  pub color: bool,
  /// Skip secondary labels that live in a different file from the primary span.
  pub primary_file_only: bool,
}

/// Render a diagnostic into a human-readable string with caret highlighting.
pub fn render_diagnostic(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  render_diagnostic_with_options(provider, diagnostic, RenderOptions::default())
}

/// Render a diagnostic with explicit options.
pub fn render_diagnostic_with_options(
  provider: &dyn SourceProvider,
  diagnostic: &Diagnostic,
  options: RenderOptions,
) -> String {
  let mut output = String::new();
  write_severity(&mut output, diagnostic.severity, options.color);
  let _ = writeln!(output, "[{}]: {}", diagnostic.code, diagnostic.message);

  let mut labels = Vec::with_capacity(diagnostic.labels.len() + 1);
  labels.push(Label::primary(diagnostic.primary, ""));
  labels.extend(diagnostic.labels.iter().cloned());
  crate::sort_labels(&mut labels);
  if options.primary_file_only {
    labels.retain(|label| label.span.file == diagnostic.primary.file);
  }

  for label in &labels {
    render_label(provider, &mut output, label, options);
  }

  for detail in &diagnostic.details {
    let _ = writeln!(output, "  = {}: {}", detail.tag, detail.value);
  }
  for note in &diagnostic.notes {
    let _ = writeln!(output, "  = note: {}", note);
  }
  output
}

/// Render the one-line form `Error 3059: Too many arguments in 'a.vdmsl' at line 3:5`,
/// followed by one indented line per detail.
pub fn render_compact(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  let mut output = String::new();
  let kind = match diagnostic.severity {
    Severity::Error => "Error",
    Severity::Warning => "Warning",
  };
  let name = provider
    .file_name(diagnostic.primary.file)
    .unwrap_or("<unknown file>");
  let position = provider
    .file_text(diagnostic.primary.file)
    .map(|text| line_and_column(text, diagnostic.primary.range.start as usize));
  match position {
    Some((line, col)) => {
      let _ = write!(
        output,
        "{kind} {}: {} in '{name}' at line {line}:{col}",
        diagnostic.code, diagnostic.message
      );
    }
    None => {
      let _ = write!(
        output,
        "{kind} {}: {} in '{name}'",
        diagnostic.code, diagnostic.message
      );
    }
  }
  for detail in &diagnostic.details {
    let _ = write!(output, "\n{}: {}", detail.tag, detail.value);
  }
  output
}

fn render_label(
  provider: &dyn SourceProvider,
  output: &mut String,
  label: &Label,
  options: RenderOptions,
) {
  let name = provider.file_name(label.span.file).unwrap_or("<unknown file>");
  let Some(text) = provider.file_text(label.span.file) else {
    let _ = writeln!(output, " --> {name}:?:?");
    if !label.message.is_empty() {
      let _ = writeln!(output, "  = label: {}", label.message);
    }
    return;
  };

  let (start, end) = clamp_range(text, label.span.range);
  let (line, col) = line_and_column(text, start);
  let _ = writeln!(output, " --> {name}:{line}:{col}");

  let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
  let line_end = text[start..]
    .find('\n')
    .map(|i| start + i)
    .unwrap_or(text.len());
  let source_line = &text[line_start..line_end];
  let gutter = line.to_string().len();

  let _ = writeln!(output, "{:>gutter$} |", "");
  let _ = writeln!(output, "{line} | {source_line}");

  let underline_start = text[line_start..start].chars().count();
  let underline_len = text[start..end.min(line_end).max(start)]
    .chars()
    .count()
    .max(1);
  let marker = if label.is_primary { '^' } else { '-' };
  let run: String = std::iter::repeat(marker).take(underline_len).collect();
  let _ = write!(output, "{:>gutter$} | {}", "", " ".repeat(underline_start));
  if options.color {
    output.push_str(if label.is_primary {
      ANSI_BOLD_RED
    } else {
      ANSI_BOLD_BLUE
    });
    output.push_str(&run);
    output.push_str(ANSI_RESET);
  } else {
    output.push_str(&run);
  }
  if !label.message.is_empty() {
    output.push(' ');
    output.push_str(&label.message);
  }
  output.push('\n');
}

fn write_severity(output: &mut String, severity: Severity, color: bool) {
  if !color {
    let _ = write!(output, "{severity}");
    return;
  }
  output.push_str(match severity {
    Severity::Error => ANSI_BOLD_RED,
    Severity::Warning => ANSI_BOLD_YELLOW,
  });
  let _ = write!(output, "{severity}");
  output.push_str(ANSI_RESET);
}

fn clamp_range(text: &str, range: TextRange) -> (usize, usize) {
  let start = clamp_to_char_boundary(text, range.start as usize);
  let end = clamp_to_char_boundary(text, range.end as usize).max(start);
  (start, end)
}

fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
  let mut offset = offset.min(text.len());
  while offset > 0 && !text.is_char_boundary(offset) {
    offset -= 1;
  }
  offset
}

/// One-based line and column of a byte offset. Columns count characters.
pub fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
  let offset = clamp_to_char_boundary(text, offset);
  let before = &text[..offset];
  let line = before.matches('\n').count() + 1;
  let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
  let col = text[line_start..offset].chars().count() + 1;
  (line, col)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::files::SimpleFiles;
  use crate::Span;

  #[test]
  fn line_and_column_counts_from_one() {
    assert_eq!(line_and_column("abc\ndef", 0), (1, 1));
    assert_eq!(line_and_column("abc\ndef", 5), (2, 2));
    assert_eq!(line_and_column("abc", 99), (1, 4));
  }

  #[test]
  fn render_single_line_span() {
    let mut files = SimpleFiles::new();
    let file = files.add("test.vdmsl", "values x = 1;");
    let diagnostic = Diagnostic::error(3001, "unused value", Span::new(file, TextRange::new(7, 8)));
    let rendered = render_diagnostic(&files, &diagnostic);
    let expected = concat!(
      "error[3001]: unused value\n",
      " --> test.vdmsl:1:8\n",
      "  |\n",
      "1 | values x = 1;\n",
      "  |        ^\n",
    );
    assert_eq!(rendered, expected);
  }

  #[test]
  fn render_compact_with_details() {
    let mut files = SimpleFiles::new();
    let file = files.add("a.vdmsl", "functions\n  f: nat -> nat\n");
    let diagnostic = Diagnostic::error(
      3059,
      "Too many arguments",
      Span::new(file, TextRange::new(12, 13)),
    )
    .with_detail("Args", "(1, 2)")
    .with_detail("Params", "(nat)");
    assert_eq!(
      render_compact(&files, &diagnostic),
      "Error 3059: Too many arguments in 'a.vdmsl' at line 2:3\nArgs: (1, 2)\nParams: (nat)"
    );
  }

  #[test]
  fn missing_source_still_renders_header() {
    let files = SimpleFiles::new();
    let diagnostic = Diagnostic::warning(5000, "unused", Span::new(FileId(7), TextRange::new(0, 1)));
    let rendered = render_diagnostic(&files, &diagnostic);
    assert!(rendered.starts_with("warning[5000]: unused\n"));
    assert!(rendered.contains(" --> <unknown file>:?:?"));
  }
}
