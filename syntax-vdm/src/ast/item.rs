use super::decl::Decl;
use super::node::Node;
use super::type_expr::TypeExpr;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// Every file handed to the checker.
#[derive(Debug, Default, Drive, DriveMut, Serialize)]
pub struct Program {
  pub files: Vec<SourceFile>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SourceFile {
  /// Matches the id the host uses for the file in its diagnostics provider.
  #[drive(skip)]
  pub id: u32,
  #[drive(skip)]
  pub name: String,
  pub items: Vec<Node<Item>>,
}

#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
pub enum Item {
  Module(ModuleDecl),
  Class(ClassDecl),
  /// A definition outside any module or class; these form the `DEFAULT` module.
  Decl(Node<Decl>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ModuleDecl {
  #[drive(skip)]
  pub name: String,
  pub imports: Vec<Node<ImportFrom>>,
  pub exports: Exports,
  pub decls: Vec<Node<Decl>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportFrom {
  #[drive(skip)]
  pub module: String,
  pub items: ImportItems,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ImportItems {
  All,
  Named(Vec<Node<ImportItem>>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ImportKind {
  Type,
  Value,
  Function,
  Operation,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportItem {
  #[drive(skip)]
  pub kind: ImportKind,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub renamed: Option<String>,
  /// Optional signature or type repeated at the import site.
  pub ty: Option<Node<TypeExpr>>,
}

#[derive(Debug, Default, Drive, DriveMut, Serialize)]
pub enum Exports {
  #[default]
  All,
  Named(Vec<Node<ExportItem>>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportItem {
  #[drive(skip)]
  pub kind: ImportKind,
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassDecl {
  #[drive(skip)]
  pub name: String,
  pub supers: Vec<Node<ClassRef>>,
  pub decls: Vec<Node<Decl>>,
  /// `system` rather than `class` (VDM-RT).
  #[drive(skip)]
  pub is_system: bool,
}

/// A superclass named in `is subclass of`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassRef {
  #[drive(skip)]
  pub name: String,
}
