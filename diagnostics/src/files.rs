use crate::render::SourceProvider;
use crate::FileId;
use std::sync::Arc;

/// A minimal in-memory store of file names and source text for rendering
/// diagnostics in tests and small hosts without needing a custom
/// [`SourceProvider`] implementation.
///
/// `FileId`s are allocated deterministically in insertion order starting from
/// zero. Source text is stored in `Arc<str>` to make cloning cheap.
#[derive(Clone, Debug, Default)]
pub struct SimpleFiles {
  files: Vec<SimpleFile>,
}

#[derive(Clone, Debug)]
struct SimpleFile {
  name: Arc<str>,
  text: Arc<str>,
}

impl SimpleFiles {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a new file and returns its [`FileId`]. The id is monotonically
  /// increasing and stable for the lifetime of the `SimpleFiles` instance.
  pub fn add(&mut self, name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> FileId {
    assert!(self.files.len() < u32::MAX as usize, "file count overflow");
    let file = FileId(self.files.len() as u32);
    self.files.push(SimpleFile {
      name: name.into(),
      text: text.into(),
    });
    file
  }

  /// Replaces the text for an existing file, returning the previous text if the
  /// file existed.
  pub fn set_text(&mut self, file: FileId, text: impl Into<Arc<str>>) -> Option<Arc<str>> {
    self
      .files
      .get_mut(file.0 as usize)
      .map(|file| std::mem::replace(&mut file.text, text.into()))
  }
}

impl SourceProvider for SimpleFiles {
  fn file_name(&self, file: FileId) -> Option<&str> {
    self.files.get(file.0 as usize).map(|file| file.name.as_ref())
  }

  fn file_text(&self, file: FileId) -> Option<&str> {
    self.files.get(file.0 as usize).map(|file| file.text.as_ref())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::render::render_diagnostic;
  use crate::Diagnostic;
  use crate::Label;
  use crate::Span;
  use crate::TextRange;

  #[test]
  fn allocates_ids_and_renders_multiple_files() {
    let mut files = SimpleFiles::new();
    let first = files.add("A.vdmpp", "class A end A");
    let second = files.add("B.vdmpp", "class B is subclass of A end B");
    assert_ne!(first, second);

    let diagnostic = Diagnostic::error(
      3001,
      "primary",
      Span::new(second, TextRange::new(6, 7)),
    )
    .with_label(Label::secondary(
      Span::new(first, TextRange::new(6, 7)),
      "secondary",
    ));

    let rendered = render_diagnostic(&files, &diagnostic);
    assert!(rendered.contains(" --> B.vdmpp:1:7"));
    assert!(rendered.contains(" --> A.vdmpp:1:7"));
    assert!(rendered.contains("- secondary"));
  }

  #[test]
  fn set_text_replaces_source() {
    let mut files = SimpleFiles::new();
    let file = files.add("a.vdmsl", "old");
    let previous = files.set_text(file, "new");
    assert_eq!(previous.as_deref(), Some("old"));
    assert_eq!(files.file_text(file), Some("new"));
    assert!(files.set_text(FileId(9), "x").is_none());
  }
}
