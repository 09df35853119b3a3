//! Checking bodies against the resolved definitions.
//!
//! The [`Checker`] owns everything the checking passes read and write: the
//! definition table, the type store and the diagnostic sink. Expressions and
//! statements are checked by methods spread over the submodules; each returns
//! the type it computed and records it on the syntax node as a
//! [`ResolvedType`], and names record the definition they resolved to as a
//! [`ResolvedDef`].

pub(crate) mod apply;
pub(crate) mod defs;
pub(crate) mod exit;
pub(crate) mod expr;
pub(crate) mod ops;
pub(crate) mod pattern;
pub(crate) mod recursion;
pub(crate) mod stmt;

use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::DefTable;
use crate::def::Definition;
use crate::def::LocalRole;
use crate::env::Env;
use crate::env::Frame;
use crate::name::Name;
use crate::name::NameScope;
use crate::options::CheckOptions;
use crate::sink::Sink;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use diagnostics::Label;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::loc::Loc;
use types_vdm::RelateCtx;
use types_vdm::TypeId;
use types_vdm::TypeStore;

/// The type computed for an expression, statement or type expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedType(pub TypeId);

/// The definition a name resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedDef(pub DefId);

pub(crate) struct Checker<'a> {
  pub(crate) options: CheckOptions,
  pub(crate) table: DefTable<'a>,
  pub(crate) store: TypeStore,
  pub(crate) sink: Sink,
  /// File of the definition being checked.
  pub(crate) file: FileId,
  /// Type parameters of the polymorphic function being checked.
  pub(crate) type_params: Vec<String>,
  pub(crate) global: Rc<Env>,
}

impl<'a> Checker<'a> {
  pub(crate) fn new(
    options: CheckOptions,
    table: DefTable<'a>,
    store: TypeStore,
    sink: Sink,
  ) -> Checker<'a> {
    Checker {
      options,
      table,
      store,
      sink,
      file: FileId(0),
      type_params: Vec::new(),
      global: Env::global(),
    }
  }

  pub(crate) fn span(&self, loc: Loc) -> Span {
    Span::at(self.file, loc)
  }

  pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
    self.sink.push(diagnostic);
  }

  /// Makes later spans point into the file that declares `def`.
  pub(crate) fn enter(&mut self, def: DefId) {
    self.file = self.table.get(def).span.file;
  }

  pub(crate) fn display(&self, ty: TypeId) -> String {
    self.store.display(ty).to_string()
  }

  pub(crate) fn unknown(&self) -> TypeId {
    self.store.unknown()
  }

  pub(crate) fn compatible(&self, expected: TypeId, actual: TypeId) -> bool {
    RelateCtx::new(&self.store).compatible(expected, actual)
  }

  pub(crate) fn is_sub_type(&self, sub: TypeId, sup: TypeId) -> bool {
    RelateCtx::new(&self.store).is_sub_type(sub, sup, false)
  }

  /// Reports `diagnostic` with the two types attached unless `actual` fits
  /// `expected`. In strict mode a value that only fits because of a union
  /// or an optional is flagged too. Returns whether the value fits.
  pub(crate) fn check_assignable(
    &mut self,
    diagnostic: impl FnOnce() -> Diagnostic,
    span: Span,
    expected: TypeId,
    actual: TypeId,
  ) -> bool {
    if !self.compatible(expected, actual) {
      let d = diagnostic()
        .with_detail("Expected", self.display(expected))
        .with_detail("Actual", self.display(actual));
      self.report(d);
      return false;
    }
    if self.options.strict && !self.is_sub_type(actual, expected) {
      let d = codes::MAY_NOT_MATCH
        .at(span)
        .with_detail("Expected", self.display(expected))
        .with_detail("Actual", self.display(actual));
      self.report(d);
    }
    true
  }

  /// The environment of the module or class that declares `def`.
  pub(crate) fn container_env(&self, def: DefId) -> Rc<Env> {
    let def = self.table.get(def);
    if let Some(class) = def.class {
      return Env::new(Frame::Class(class)).within(&self.global).build();
    }
    match def.module {
      Some(module) => Env::new(Frame::Module(module))
        .within(&self.global)
        .build(),
      None => Rc::clone(&self.global),
    }
  }

  /// Binds a local name. `let` and `dcl` names that hide another local
  /// or a state name are flagged.
  pub(crate) fn local(
    &mut self,
    env: &Env,
    name: &str,
    loc: Loc,
    role: LocalRole,
    ty: TypeId,
  ) -> DefId {
    let container = env.container_name(&self.table);
    let name = Name::new(container, name);
    let span = self.span(loc);
    if matches!(role, LocalRole::Let | LocalRole::Dcl) {
      if let Some(hidden) = env.peek_name(&self.table, &name, NameScope::LOCAL | NameScope::STATE) {
        let hidden_span = self.table.get(hidden).span;
        let d = codes::HIDES_OUTER
          .at(span)
          .with_label(Label::secondary(hidden_span, "hidden definition"))
          .with_detail("Name", name.name.clone());
        self.report(d);
      }
    }
    let class = env.find_class_definition();
    let module = env.find_module();
    self.table.alloc(
      Definition::new(name, span, NameScope::LOCAL, DefKind::Local { role }, ty)
        .with_class(class)
        .with_module(module),
    )
  }

  /// Flags `let` and `dcl` names that were never read.
  pub(crate) fn finish_scope(&mut self, defs: &[DefId]) {
    if !self.options.warn_unused {
      return;
    }
    for id in defs {
      let def = self.table.get(*id);
      let flagged = matches!(
        def.kind,
        DefKind::Local {
          role: LocalRole::Let | LocalRole::Dcl
        }
      );
      if flagged && !def.is_used() {
        let d = codes::UNUSED
          .at(def.span)
          .with_detail("Name", def.name.name.clone());
        self.report(d);
      }
    }
  }
}
