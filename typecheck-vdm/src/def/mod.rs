//! The definition arena.
//!
//! Every declared name of the program, and every name the checker binds
//! while walking bodies, becomes a [`Definition`] in the [`DefTable`] and is
//! referred to by its [`DefId`]. Definitions point back into the syntax tree
//! they were built from, and to each other only through ids, so classes can
//! refer to their superclasses and members to their class without shared
//! ownership. Flags that change during checking (the type, the used flag,
//! memoised analyses) live in cells in the slot.

pub(crate) mod build;

use crate::name::Name;
use crate::name::NameScope;
use diagnostics::Span;
use serde::Serialize;
use std::cell::Cell;
use std::cell::RefCell;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::ClassInvariantDecl;
use syntax_vdm::ast::decl::ExplicitFunctionDecl;
use syntax_vdm::ast::decl::ExplicitOperationDecl;
use syntax_vdm::ast::decl::ImplicitFunctionDecl;
use syntax_vdm::ast::decl::ImplicitOperationDecl;
use syntax_vdm::ast::decl::InstanceVariableDecl;
use syntax_vdm::ast::decl::Measure;
use syntax_vdm::ast::decl::MutexDecl;
use syntax_vdm::ast::decl::PerDecl;
use syntax_vdm::ast::decl::StateDecl;
use syntax_vdm::ast::decl::TraceDecl;
use syntax_vdm::ast::decl::TypeDecl;
use syntax_vdm::ast::decl::ValueDecl;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::expr::EqualsDef;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::item::ClassDecl;
use syntax_vdm::ast::item::ModuleDecl;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::stmt::Stmt;
use types_vdm::ClassId;
use types_vdm::NamedId;
use types_vdm::TypeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefId(pub u32);

/// Index of a module in [`DefTable::modules`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleIdx(pub u32);

/// The checking pass in which a definition is checked. Passes run in this
/// order over every module and class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Pass {
  Types,
  Values,
  Defs,
  Final,
}

impl Pass {
  pub const ALL: [Pass; 4] = [Pass::Types, Pass::Values, Pass::Defs, Pass::Final];
}

/// Progress marker for class hierarchy linking and inheritance collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LinkState {
  #[default]
  Unset,
  InProgress,
  Done,
}

/// A lazily computed property that may be asked for again while it is being
/// computed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Memo<T> {
  #[default]
  NotStarted,
  InProgress,
  Done(T),
}

/// The exception values a statement or operation may `exit` with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exits {
  pub types: Vec<TypeId>,
  /// Something may exit with a value of any type.
  pub any: bool,
}

impl Exits {
  pub fn anything() -> Exits {
    Exits {
      types: Vec::new(),
      any: true,
    }
  }

  pub fn is_empty(&self) -> bool {
    !self.any && self.types.is_empty()
  }

  pub fn add(&mut self, ty: TypeId) {
    if !self.types.contains(&ty) {
      self.types.push(ty);
    }
  }

  pub fn merge(&mut self, other: &Exits) {
    self.any |= other.any;
    for ty in &other.types {
      self.add(*ty);
    }
  }
}

/// What bound a local name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocalRole {
  Parameter,
  /// Quantifiers, comprehensions, binds and patterns of `cases`.
  Bound,
  /// `let` and `def`.
  Let,
  /// `dcl`; assignable.
  Dcl,
  Loop,
  /// The result identifier of an implicit function or operation, and
  /// `RESULT` in postconditions.
  Result,
  /// A name bound by the pattern of a module or class level value.
  Value(DefId),
  /// A field of a VDM-SL state definition.
  StateField,
  /// A name bound by a `trap` or `tixe` pattern.
  Handler,
}

/// Which synthesized function a [`DefKind::Derived`] stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DerivedRole {
  Pre,
  Post,
  Inv,
  Eq,
  Ord,
  Min,
  Max,
  Init,
  ClassInv,
}

#[derive(Debug)]
pub struct FunctionInfo {
  pub pre: Option<DefId>,
  pub post: Option<DefId>,
  /// The result type of the measure, once checked.
  pub measure: Cell<Option<TypeId>>,
  pub recursive: Cell<bool>,
}

impl FunctionInfo {
  pub(crate) fn new(pre: Option<DefId>, post: Option<DefId>) -> FunctionInfo {
    FunctionInfo {
      pre,
      post,
      measure: Cell::new(None),
      recursive: Cell::new(false),
    }
  }
}

#[derive(Debug)]
pub struct OperationInfo {
  pub pre: Option<DefId>,
  pub post: Option<DefId>,
  pub is_constructor: bool,
  pub exits: RefCell<Memo<Exits>>,
}

#[derive(Debug)]
pub struct ClassInfo<'a> {
  pub decl: &'a ClassDecl,
  pub id: ClassId,
  pub locals: Vec<DefId>,
  pub supers: RefCell<Vec<DefId>>,
  pub link: Cell<LinkState>,
  pub collect: Cell<LinkState>,
  /// Proxies for every non-private member of every ancestor.
  pub all_inherited: RefCell<Vec<DefId>>,
  /// The subset of `all_inherited` not overridden or hidden locally; this is
  /// what name lookup in the class sees.
  pub local_inherited: RefCell<Vec<DefId>>,
  /// Class invariants of the class and its ancestors, ancestors first.
  pub invariants: RefCell<Vec<DefId>>,
  pub inv_operation: Cell<Option<DefId>>,
}

#[derive(Debug)]
pub enum DefKind<'a> {
  /// A module or class level value. Its pattern's names are separate
  /// [`LocalRole::Value`] definitions.
  Value {
    decl: &'a ValueDecl,
    names: Vec<DefId>,
  },
  InstanceVariable {
    decl: &'a InstanceVariableDecl,
    initialized: Cell<bool>,
  },
  Local {
    role: LocalRole,
  },
  ExplicitFunction {
    decl: &'a ExplicitFunctionDecl,
    info: FunctionInfo,
  },
  ImplicitFunction {
    decl: &'a ImplicitFunctionDecl,
    info: FunctionInfo,
  },
  ExplicitOperation {
    decl: &'a ExplicitOperationDecl,
    info: OperationInfo,
  },
  ImplicitOperation {
    decl: &'a ImplicitOperationDecl,
    info: OperationInfo,
  },
  Type {
    decl: &'a TypeDecl,
    named: NamedId,
    derived: Vec<DefId>,
  },
  State {
    decl: &'a StateDecl,
    named: NamedId,
    fields: Vec<DefId>,
    derived: Vec<DefId>,
  },
  Class(ClassInfo<'a>),
  Imported {
    target: DefId,
  },
  Inherited {
    target: DefId,
  },
  Renamed {
    target: DefId,
  },
  /// A name narrowed to a more specific type by a type test.
  Qualified {
    target: DefId,
  },
  Equals {
    decl: &'a EqualsDef,
    names: Vec<DefId>,
  },
  MultiBindList {
    names: Vec<DefId>,
  },
  MutexSync {
    decl: &'a MutexDecl,
  },
  PerSync {
    decl: &'a PerDecl,
  },
  NamedTrace {
    decl: &'a TraceDecl,
  },
  ClassInvariant {
    decl: &'a ClassInvariantDecl,
  },
  Derived {
    origin: DefId,
    role: DerivedRole,
  },
  /// A name whose type is never known, such as a failed import.
  Untyped,
}

impl<'a> DefKind<'a> {
  pub fn name(&self) -> &'static str {
    match self {
      DefKind::Value { .. } => "value",
      DefKind::InstanceVariable { .. } => "instance variable",
      DefKind::Local { .. } => "local",
      DefKind::ExplicitFunction { .. } => "explicit function",
      DefKind::ImplicitFunction { .. } => "implicit function",
      DefKind::ExplicitOperation { .. } => "explicit operation",
      DefKind::ImplicitOperation { .. } => "implicit operation",
      DefKind::Type { .. } => "type",
      DefKind::State { .. } => "state",
      DefKind::Class(_) => "class",
      DefKind::Imported { .. } => "imported",
      DefKind::Inherited { .. } => "inherited",
      DefKind::Renamed { .. } => "renamed",
      DefKind::Qualified { .. } => "qualified",
      DefKind::Equals { .. } => "equals",
      DefKind::MultiBindList { .. } => "multiple bind",
      DefKind::MutexSync { .. } => "mutex",
      DefKind::PerSync { .. } => "permission",
      DefKind::NamedTrace { .. } => "trace",
      DefKind::ClassInvariant { .. } => "class invariant",
      DefKind::Derived { .. } => "derived",
      DefKind::Untyped => "untyped",
    }
  }

  /// The definition this one stands in for, if it is a proxy.
  pub fn proxy_target(&self) -> Option<DefId> {
    match self {
      DefKind::Imported { target }
      | DefKind::Inherited { target }
      | DefKind::Renamed { target }
      | DefKind::Qualified { target } => Some(*target),
      _ => None,
    }
  }

  pub fn function_info(&self) -> Option<&FunctionInfo> {
    match self {
      DefKind::ExplicitFunction { info, .. } | DefKind::ImplicitFunction { info, .. } => Some(info),
      _ => None,
    }
  }

  pub fn operation_info(&self) -> Option<&OperationInfo> {
    match self {
      DefKind::ExplicitOperation { info, .. } | DefKind::ImplicitOperation { info, .. } => {
        Some(info)
      }
      _ => None,
    }
  }

  pub fn measure(&self) -> Option<&'a Measure> {
    match self {
      DefKind::ExplicitFunction { decl, .. } => decl.measure.as_ref(),
      DefKind::ImplicitFunction { decl, .. } => decl.measure.as_ref(),
      _ => None,
    }
  }

  pub fn type_params(&self) -> &'a [String] {
    match self {
      DefKind::ExplicitFunction { decl, .. } => &decl.type_params,
      DefKind::ImplicitFunction { decl, .. } => &decl.type_params,
      _ => &[],
    }
  }

  /// The body of a function, if it has an expression body.
  pub fn function_body(&self) -> Option<&'a Node<Expr>> {
    use syntax_vdm::ast::decl::FunctionBody;
    let body = match self {
      DefKind::ExplicitFunction { decl, .. } => Some(&decl.body),
      DefKind::ImplicitFunction { decl, .. } => decl.body.as_ref(),
      _ => None,
    };
    match body {
      Some(FunctionBody::Expr(e)) => Some(e),
      _ => None,
    }
  }

  pub fn operation_body(&self) -> Option<&'a Node<Stmt>> {
    match self {
      DefKind::ExplicitOperation { decl, .. } => Some(&decl.body),
      DefKind::ImplicitOperation { decl, .. } => decl.body.as_ref(),
      _ => None,
    }
  }
}

/// One declared or bound name.
#[derive(Debug)]
pub struct Definition<'a> {
  pub name: Name,
  pub span: Span,
  pub pass: Pass,
  pub access: Access,
  pub scope: NameScope,
  /// The class declaring the definition.
  pub class: Option<DefId>,
  /// The module declaring the definition.
  pub module: Option<ModuleIdx>,
  pub kind: DefKind<'a>,
  ty: Cell<TypeId>,
  used: Cell<bool>,
}

impl<'a> Definition<'a> {
  pub fn new(name: Name, span: Span, scope: NameScope, kind: DefKind<'a>, ty: TypeId) -> Self {
    Definition {
      name,
      span,
      pass: Pass::Defs,
      access: Access::default(),
      scope,
      class: None,
      module: None,
      kind,
      ty: Cell::new(ty),
      used: Cell::new(false),
    }
  }

  pub fn with_pass(mut self, pass: Pass) -> Self {
    self.pass = pass;
    self
  }

  pub fn with_access(mut self, access: Access) -> Self {
    self.access = access;
    self
  }

  pub fn with_class(mut self, class: Option<DefId>) -> Self {
    self.class = class;
    self
  }

  pub fn with_module(mut self, module: Option<ModuleIdx>) -> Self {
    self.module = module;
    self
  }

  /// The definition's own type. Proxies should be asked through
  /// [`DefTable::ty`].
  pub fn ty(&self) -> TypeId {
    self.ty.get()
  }

  pub fn set_ty(&self, ty: TypeId) {
    self.ty.set(ty);
  }

  pub fn is_used(&self) -> bool {
    self.used.get()
  }

  pub fn is_function(&self) -> bool {
    matches!(
      self.kind,
      DefKind::ExplicitFunction { .. } | DefKind::ImplicitFunction { .. } | DefKind::Derived { .. }
    )
  }

  pub fn is_operation(&self) -> bool {
    matches!(
      self.kind,
      DefKind::ExplicitOperation { .. } | DefKind::ImplicitOperation { .. }
    ) || matches!(
      self.kind,
      DefKind::Derived {
        role: DerivedRole::ClassInv,
        ..
      }
    )
  }

  pub fn is_callable(&self) -> bool {
    self.is_function() || self.is_operation()
  }

  pub fn is_type_definition(&self) -> bool {
    matches!(self.kind, DefKind::Type { .. } | DefKind::State { .. })
  }

  pub fn is_static(&self) -> bool {
    self.access.is_static
  }

  pub fn visibility(&self) -> Visibility {
    self.access.visibility
  }

  pub fn is_constructor(&self) -> bool {
    self
      .kind
      .operation_info()
      .map(|info| info.is_constructor)
      .unwrap_or(false)
  }

  /// Whether the definition is part of an object's state.
  pub fn is_instance_member(&self) -> bool {
    self.class.is_some()
      && !self.access.is_static
      && matches!(
        self.kind,
        DefKind::InstanceVariable { .. }
          | DefKind::ExplicitFunction { .. }
          | DefKind::ImplicitFunction { .. }
          | DefKind::ExplicitOperation { .. }
          | DefKind::ImplicitOperation { .. }
      )
  }
}

#[derive(Debug)]
pub struct ModuleInfo<'a> {
  pub name: String,
  pub decl: Option<&'a ModuleDecl>,
  pub span: Span,
  pub defs: Vec<DefId>,
  pub imports: Vec<DefId>,
  pub state: Option<DefId>,
  pub exports_all: bool,
  pub exported: Vec<DefId>,
}

/// The arena of every definition in the program.
#[derive(Debug, Default)]
pub struct DefTable<'a> {
  defs: Vec<Definition<'a>>,
  pub(crate) modules: Vec<ModuleInfo<'a>>,
  classes: Vec<DefId>,
}

impl<'a> DefTable<'a> {
  pub fn new() -> Self {
    DefTable::default()
  }

  pub fn alloc(&mut self, def: Definition<'a>) -> DefId {
    let id = DefId(self.defs.len() as u32);
    let is_class = matches!(def.kind, DefKind::Class(_));
    self.defs.push(def);
    if is_class {
      self.classes.push(id);
    }
    id
  }

  pub fn get(&self, id: DefId) -> &Definition<'a> {
    match self.defs.get(id.0 as usize) {
      Some(def) => def,
      None => panic!("no definition {id:?} in table of {}", self.defs.len()),
    }
  }

  pub(crate) fn get_mut(&mut self, id: DefId) -> &mut Definition<'a> {
    &mut self.defs[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.defs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.defs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition<'a>)> {
    self
      .defs
      .iter()
      .enumerate()
      .map(|(i, d)| (DefId(i as u32), d))
  }

  pub fn modules(&self) -> &[ModuleInfo<'a>] {
    &self.modules
  }

  pub fn module(&self, idx: ModuleIdx) -> &ModuleInfo<'a> {
    &self.modules[idx.0 as usize]
  }

  pub fn find_module(&self, name: &str) -> Option<ModuleIdx> {
    self
      .modules
      .iter()
      .position(|m| m.name == name)
      .map(|i| ModuleIdx(i as u32))
  }

  pub fn classes(&self) -> &[DefId] {
    &self.classes
  }

  pub fn find_class(&self, name: &str) -> Option<DefId> {
    self
      .classes
      .iter()
      .copied()
      .find(|id| self.get(*id).name.name == name)
  }

  pub fn class_by_type(&self, class: ClassId) -> Option<DefId> {
    self
      .classes
      .iter()
      .copied()
      .find(|id| self.class_info(*id).id == class)
  }

  pub fn class_info(&self, id: DefId) -> &ClassInfo<'a> {
    match &self.get(id).kind {
      DefKind::Class(info) => info,
      other => panic!("definition {id:?} is a {}, not a class", other.name()),
    }
  }

  /// Follows proxies to the definition they stand for.
  pub fn origin(&self, id: DefId) -> DefId {
    let mut current = id;
    while let Some(target) = self.get(current).kind.proxy_target() {
      current = target;
    }
    current
  }

  /// Kind queries that see through imports, renames and inheritance.
  pub fn is_function(&self, id: DefId) -> bool {
    self.get(self.origin(id)).is_function()
  }

  pub fn is_operation(&self, id: DefId) -> bool {
    self.get(self.origin(id)).is_operation()
  }

  pub fn is_callable(&self, id: DefId) -> bool {
    self.get(self.origin(id)).is_callable()
  }

  /// Follows imports, renames and inheritance, but not narrowing: a
  /// qualified definition has its own type.
  pub fn ty(&self, id: DefId) -> TypeId {
    let mut current = id;
    loop {
      let def = self.get(current);
      match def.kind {
        DefKind::Imported { target } | DefKind::Inherited { target } | DefKind::Renamed { target } => {
          current = target
        }
        _ => return def.ty(),
      }
    }
  }

  /// Sets the used flag of a definition and of everything it stands for.
  pub fn mark_used(&self, id: DefId) {
    let mut current = id;
    loop {
      let def = self.get(current);
      def.used.set(true);
      match def.kind.proxy_target() {
        Some(target) => current = target,
        None => return,
      }
    }
  }

  /// Every definition visible as a member of a class: its own, then the
  /// inherited ones it does not override.
  pub fn class_members(&self, class: DefId) -> Vec<DefId> {
    let info = self.class_info(class);
    let mut members = info.locals.clone();
    members.extend(info.local_inherited.borrow().iter().copied());
    members
  }

  /// The name of the module or class declaring a definition.
  pub fn container_name(&self, id: DefId) -> String {
    let def = self.get(id);
    if let Some(class) = def.class {
      return self.get(class).name.name.clone();
    }
    if let Some(module) = def.module {
      return self.module(module).name.clone();
    }
    def.name.module.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use diagnostics::FileId;
  use diagnostics::TextRange;

  fn span() -> Span {
    Span::new(FileId(0), TextRange::new(0, 1))
  }

  #[test]
  fn proxies_forward_type_and_used_flag() {
    let mut table = DefTable::new();
    let origin = table.alloc(Definition::new(
      Name::new("A", "x"),
      span(),
      NameScope::GLOBAL,
      DefKind::Untyped,
      TypeId(7),
    ));
    let imported = table.alloc(Definition::new(
      Name::explicit("A", "x"),
      span(),
      NameScope::GLOBAL,
      DefKind::Imported { target: origin },
      TypeId(0),
    ));
    let renamed = table.alloc(Definition::new(
      Name::new("B", "y"),
      span(),
      NameScope::GLOBAL,
      DefKind::Renamed { target: imported },
      TypeId(0),
    ));
    assert_eq!(table.ty(renamed), TypeId(7));
    assert_eq!(table.origin(renamed), origin);
    assert!(!table.get(origin).is_used());
    table.mark_used(renamed);
    assert!(table.get(origin).is_used());
    assert!(table.get(imported).is_used());
  }

  #[test]
  fn qualified_definitions_keep_their_own_type() {
    let mut table = DefTable::new();
    let origin = table.alloc(Definition::new(
      Name::new("A", "x"),
      span(),
      NameScope::LOCAL,
      DefKind::Local {
        role: LocalRole::Parameter,
      },
      TypeId(7),
    ));
    let narrowed = table.alloc(Definition::new(
      Name::new("A", "x"),
      span(),
      NameScope::LOCAL,
      DefKind::Qualified { target: origin },
      TypeId(9),
    ));
    assert_eq!(table.ty(narrowed), TypeId(9));
    assert_eq!(table.origin(narrowed), origin);
  }

  #[test]
  fn exits_merge_without_duplicates() {
    let mut a = Exits::default();
    a.add(TypeId(1));
    let mut b = Exits::default();
    b.add(TypeId(1));
    b.add(TypeId(2));
    a.merge(&b);
    assert_eq!(a.types, vec![TypeId(1), TypeId(2)]);
    assert!(!a.any);
    a.merge(&Exits::anything());
    assert!(a.any);
  }
}
