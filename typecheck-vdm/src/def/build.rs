//! Building the definition table from the syntax tree.
//!
//! Every named declaration becomes a definition, together with the
//! functions it implies (`pre_f`, `inv_T`, ...). Every named type gets a slot
//! in the type store before anything is resolved, so types may be used ahead
//! of their declaration. Imports are bound once every module is known.

use super::ClassInfo;
use super::DefId;
use super::DefKind;
use super::DefTable;
use super::Definition;
use super::DerivedRole;
use super::FunctionInfo;
use super::LinkState;
use super::LocalRole;
use super::Memo;
use super::ModuleIdx;
use super::ModuleInfo;
use super::OperationInfo;
use super::Pass;
use crate::check::pattern::pattern_names;
use crate::codes;
use crate::name::Name;
use crate::name::NameScope;
use crate::options::CheckOptions;
use crate::options::Release;
use crate::sink::Sink;
use ahash::AHashMap;
use diagnostics::FileId;
use diagnostics::Label;
use diagnostics::Span;
use std::cell::Cell;
use std::cell::RefCell;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::TypeShape;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::item::ClassDecl;
use syntax_vdm::ast::item::Exports;
use syntax_vdm::ast::item::ImportItems;
use syntax_vdm::ast::item::ImportKind;
use syntax_vdm::ast::item::Item;
use syntax_vdm::ast::item::ModuleDecl;
use syntax_vdm::ast::item::Program;
use syntax_vdm::ast::node::Node;
use syntax_vdm::loc::Loc;
use tracing::debug;
use types_vdm::TypeName;
use types_vdm::TypeStore;

pub const DEFAULT_MODULE: &str = "DEFAULT";

/// Where a declaration is being added.
#[derive(Clone, Copy)]
enum Owner {
  Module(ModuleIdx),
  Class(DefId),
}

struct TableBuilder<'a, 's> {
  table: DefTable<'a>,
  store: &'s mut TypeStore,
  sink: &'s mut Sink,
  options: &'s CheckOptions,
  file: FileId,
  default_module: Option<ModuleIdx>,
}

pub(crate) fn build_definitions<'a>(
  program: &'a Program,
  store: &mut TypeStore,
  sink: &mut Sink,
  options: &CheckOptions,
) -> DefTable<'a> {
  let mut builder = TableBuilder {
    table: DefTable::new(),
    store,
    sink,
    options,
    file: FileId(0),
    default_module: None,
  };
  for file in &program.files {
    builder.file = FileId(file.id);
    for item in &file.items {
      match &*item.stx {
        Item::Module(module) => builder.module(module, item.loc),
        Item::Class(class) => builder.class(class, item.loc),
        Item::Decl(decl) => {
          let module = builder.default_module(item.loc);
          builder.member(decl, Owner::Module(module));
        }
      }
    }
  }
  for i in 0..builder.table.modules.len() {
    builder.exports(ModuleIdx(i as u32));
  }
  for i in 0..builder.table.modules.len() {
    builder.imports(ModuleIdx(i as u32));
  }
  debug!(
    definitions = builder.table.len(),
    modules = builder.table.modules.len(),
    classes = builder.table.classes().len(),
    "built definitions"
  );
  builder.table
}

impl<'a, 's> TableBuilder<'a, 's> {
  fn span(&self, loc: Loc) -> Span {
    Span::at(self.file, loc)
  }

  fn owner_name(&self, owner: Owner) -> String {
    match owner {
      Owner::Module(m) => self.table.module(m).name.clone(),
      Owner::Class(c) => self.table.get(c).name.name.clone(),
    }
  }

  fn default_module(&mut self, loc: Loc) -> ModuleIdx {
    if let Some(module) = self.default_module {
      return module;
    }
    let span = self.span(loc);
    self.table.modules.push(ModuleInfo {
      name: DEFAULT_MODULE.to_string(),
      decl: None,
      span,
      defs: Vec::new(),
      imports: Vec::new(),
      state: None,
      exports_all: true,
      exported: Vec::new(),
    });
    let idx = ModuleIdx(self.table.modules.len() as u32 - 1);
    self.default_module = Some(idx);
    idx
  }

  fn module(&mut self, decl: &'a ModuleDecl, loc: Loc) {
    let span = self.span(loc);
    if self.options.dialect.has_classes() {
      self
        .sink
        .push(codes::WRONG_DIALECT.at(span).with_detail("Name", &decl.name));
    }
    if let Some(existing) = self.table.find_module(&decl.name) {
      let first = self.table.module(existing).span;
      self.sink.push(
        codes::DUPLICATE_DEFINITION
          .at(span)
          .with_label(Label::secondary(first, "first defined here"))
          .with_detail("Name", &decl.name),
      );
    }
    self.table.modules.push(ModuleInfo {
      name: decl.name.clone(),
      decl: Some(decl),
      span,
      defs: Vec::new(),
      imports: Vec::new(),
      state: None,
      exports_all: matches!(decl.exports, Exports::All),
      exported: Vec::new(),
    });
    let idx = ModuleIdx(self.table.modules.len() as u32 - 1);
    for d in &decl.decls {
      self.member(d, Owner::Module(idx));
    }
    let defs = self.table.module(idx).defs.clone();
    self.report_duplicates(&defs, false);
  }

  fn class(&mut self, decl: &'a ClassDecl, loc: Loc) {
    let span = self.span(loc);
    if !self.options.dialect.has_classes() {
      self
        .sink
        .push(codes::WRONG_DIALECT.at(span).with_detail("Name", &decl.name));
    }
    if let Some(existing) = self.table.find_class(&decl.name) {
      let first = self.table.get(existing).span;
      self.sink.push(
        codes::DUPLICATE_DEFINITION
          .at(span)
          .with_label(Label::secondary(first, "first defined here"))
          .with_detail("Name", &decl.name),
      );
    }
    let id = self.store.declare_class(&decl.name);
    let ty = self.store.class_type(id);
    let class = self.table.alloc(
      Definition::new(
        Name::new(decl.name.clone(), decl.name.clone()),
        span,
        NameScope::CLASSNAME,
        DefKind::Class(ClassInfo {
          decl,
          id,
          locals: Vec::new(),
          supers: RefCell::new(Vec::new()),
          link: Cell::new(LinkState::Unset),
          collect: Cell::new(LinkState::Unset),
          all_inherited: RefCell::new(Vec::new()),
          local_inherited: RefCell::new(Vec::new()),
          invariants: RefCell::new(Vec::new()),
          inv_operation: Cell::new(None),
        }),
        ty,
      )
      .with_pass(Pass::Types)
      .with_access(Access::public()),
    );
    let mut locals = Vec::new();
    for d in &decl.decls {
      locals.extend(self.member(d, Owner::Class(class)));
    }
    self.report_duplicates(&locals, true);
    if let DefKind::Class(info) = &mut self.table.get_mut(class).kind {
      info.locals = locals;
    }
  }

  /// Adds one declaration and everything it implies to its owner, returning
  /// the new definitions.
  fn member(&mut self, decl: &'a Node<Decl>, owner: Owner) -> Vec<DefId> {
    let container = self.owner_name(owner);
    let span = self.span(decl.loc);
    let unknown = self.store.unknown();
    let class = match owner {
      Owner::Class(c) => Some(c),
      Owner::Module(_) => None,
    };
    let module = match owner {
      Owner::Module(m) => Some(m),
      Owner::Class(_) => None,
    };
    let mut new = Vec::new();
    let mut alloc = |table: &mut DefTable<'a>, def: Definition<'a>| -> DefId {
      let id = table.alloc(def.with_class(class).with_module(module));
      new.push(id);
      id
    };

    match &*decl.stx {
      Decl::Type(t) => {
        if (t.eq.is_some() || t.ord.is_some()) && self.options.release == Release::Classic {
          self
            .sink
            .push(codes::WRONG_DIALECT.at(span).with_detail("Name", &t.name));
        }
        let is_record = matches!(t.shape, TypeShape::Record(_));
        let named = self.store.declare_named(
          TypeName::new(container.clone(), t.name.clone()),
          is_record,
          t.access.visibility,
        );
        {
          let slot = self.store.named_mut(named);
          slot.has_inv = t.inv.is_some();
          slot.has_eq = t.eq.is_some();
          slot.has_ord = t.ord.is_some();
        }
        let ty = self.store.named_type(named);
        let name = Name::new(container.clone(), t.name.clone());
        let id = alloc(
          &mut self.table,
          Definition::new(
            name.clone(),
            span,
            NameScope::TYPENAME,
            DefKind::Type {
              decl: t,
              named,
              derived: Vec::new(),
            },
            ty,
          )
          .with_pass(Pass::Types)
          .with_access(t.access),
        );
        let mut roles = Vec::new();
        if t.inv.is_some() {
          roles.push((name.inv_name(), DerivedRole::Inv));
        }
        if t.eq.is_some() {
          roles.push((name.eq_name(), DerivedRole::Eq));
        }
        if t.ord.is_some() {
          roles.push((name.ord_name(), DerivedRole::Ord));
          roles.push((name.min_name(), DerivedRole::Min));
          roles.push((name.max_name(), DerivedRole::Max));
        }
        let mut derived = Vec::new();
        for (derived_name, role) in roles {
          derived.push(alloc(
            &mut self.table,
            derived_def(derived_name, span, id, role, t.access, unknown),
          ));
        }
        if let DefKind::Type { derived: slot, .. } = &mut self.table.get_mut(id).kind {
          *slot = derived;
        }
      }
      Decl::Value(v) => {
        let access = if class.is_some() {
          v.access.with_static()
        } else {
          v.access
        };
        let value = alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), ""),
            span,
            NameScope::empty(),
            DefKind::Value {
              decl: v,
              names: Vec::new(),
            },
            unknown,
          )
          .with_pass(Pass::Values)
          .with_access(access),
        );
        let mut names = Vec::new();
        for (name, loc) in pattern_names(&v.pattern) {
          let name_span = self.span(loc);
          names.push(alloc(
            &mut self.table,
            Definition::new(
              Name::new(container.clone(), name),
              name_span,
              NameScope::GLOBAL,
              DefKind::Local {
                role: LocalRole::Value(value),
              },
              unknown,
            )
            .with_pass(Pass::Values)
            .with_access(access),
          ));
        }
        if let DefKind::Value { names: slot, .. } = &mut self.table.get_mut(value).kind {
          *slot = names;
        }
      }
      Decl::ExplicitFunction(f) => {
        let name = Name::new(container.clone(), f.name.clone());
        let id = alloc(
          &mut self.table,
          Definition::new(
            name.clone(),
            span,
            NameScope::GLOBAL,
            DefKind::ExplicitFunction {
              decl: f,
              info: FunctionInfo::new(None, None),
            },
            unknown,
          )
          .with_access(f.access),
        );
        let pre = f.pre.as_ref().map(|_| {
          alloc(
            &mut self.table,
            derived_def(name.pre_name(), span, id, DerivedRole::Pre, f.access, unknown),
          )
        });
        let post = f.post.as_ref().map(|_| {
          alloc(
            &mut self.table,
            derived_def(name.post_name(), span, id, DerivedRole::Post, f.access, unknown),
          )
        });
        if let DefKind::ExplicitFunction { info, .. } = &mut self.table.get_mut(id).kind {
          info.pre = pre;
          info.post = post;
        }
      }
      Decl::ImplicitFunction(f) => {
        let name = Name::new(container.clone(), f.name.clone());
        let id = alloc(
          &mut self.table,
          Definition::new(
            name.clone(),
            span,
            NameScope::GLOBAL,
            DefKind::ImplicitFunction {
              decl: f,
              info: FunctionInfo::new(None, None),
            },
            unknown,
          )
          .with_access(f.access),
        );
        let pre = f.pre.as_ref().map(|_| {
          alloc(
            &mut self.table,
            derived_def(name.pre_name(), span, id, DerivedRole::Pre, f.access, unknown),
          )
        });
        let post = f.post.as_ref().map(|_| {
          alloc(
            &mut self.table,
            derived_def(name.post_name(), span, id, DerivedRole::Post, f.access, unknown),
          )
        });
        if let DefKind::ImplicitFunction { info, .. } = &mut self.table.get_mut(id).kind {
          info.pre = pre;
          info.post = post;
        }
      }
      Decl::ExplicitOperation(op) => {
        let is_constructor = class.is_some() && op.name == container;
        let id = self.operation(
          &mut alloc,
          &container,
          &op.name,
          span,
          op.access,
          (op.pre.is_some(), op.post.is_some()),
          |info| DefKind::ExplicitOperation { decl: op, info },
          is_constructor,
          module.is_some(),
        );
        debug!(operation = %op.name, id = id.0, "declared operation");
      }
      Decl::ImplicitOperation(op) => {
        let is_constructor = class.is_some() && op.name == container;
        self.operation(
          &mut alloc,
          &container,
          &op.name,
          span,
          op.access,
          (op.pre.is_some(), op.post.is_some()),
          |info| DefKind::ImplicitOperation { decl: op, info },
          is_constructor,
          module.is_some(),
        );
      }
      Decl::InstanceVariable(iv) => {
        if class.is_none() {
          self
            .sink
            .push(codes::WRONG_DIALECT.at(span).with_detail("Name", &iv.name));
        }
        alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), iv.name.clone()),
            span,
            NameScope::STATE,
            DefKind::InstanceVariable {
              decl: iv,
              initialized: Cell::new(iv.init.is_some()),
            },
            unknown,
          )
          .with_access(iv.access),
        );
      }
      Decl::State(s) => {
        let Some(module) = module else {
          self
            .sink
            .push(codes::WRONG_DIALECT.at(span).with_detail("Name", &s.name));
          return new;
        };
        if let Some(existing) = self.table.module(module).state {
          let first = self.table.get(existing).span;
          self.sink.push(
            codes::DUPLICATE_DEFINITION
              .at(span)
              .with_label(Label::secondary(first, "first defined here"))
              .with_detail("Name", &s.name),
          );
        }
        let named = self.store.declare_named(
          TypeName::new(container.clone(), s.name.clone()),
          true,
          Visibility::Public,
        );
        self.store.named_mut(named).has_inv = s.inv.is_some();
        let ty = self.store.named_type(named);
        let name = Name::new(container.clone(), s.name.clone());
        let state = alloc(
          &mut self.table,
          Definition::new(
            name.clone(),
            span,
            NameScope::TYPENAME,
            DefKind::State {
              decl: s,
              named,
              fields: Vec::new(),
              derived: Vec::new(),
            },
            ty,
          )
          .with_pass(Pass::Types),
        );
        let mut fields = Vec::new();
        for field in &s.fields {
          let Some(tag) = &field.stx.tag else {
            continue;
          };
          let field_span = self.span(field.loc);
          fields.push(alloc(
            &mut self.table,
            Definition::new(
              Name::new(container.clone(), tag.clone()),
              field_span,
              NameScope::STATE,
              DefKind::Local {
                role: LocalRole::StateField,
              },
              unknown,
            )
            .with_pass(Pass::Types),
          ));
        }
        let mut derived = Vec::new();
        if s.inv.is_some() {
          derived.push(alloc(
            &mut self.table,
            derived_def(name.inv_name(), span, state, DerivedRole::Inv, Access::default(), unknown),
          ));
        }
        if s.init.is_some() {
          derived.push(alloc(
            &mut self.table,
            derived_def(name.init_name(), span, state, DerivedRole::Init, Access::default(), unknown),
          ));
        }
        if let DefKind::State {
          fields: f,
          derived: d,
          ..
        } = &mut self.table.get_mut(state).kind
        {
          *f = fields;
          *d = derived;
        }
        self.table.modules[module.0 as usize].state = Some(state);
      }
      Decl::ClassInvariant(inv) => {
        alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), ""),
            span,
            NameScope::empty(),
            DefKind::ClassInvariant { decl: inv },
            unknown,
          ),
        );
      }
      Decl::Mutex(mutex) => {
        alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), ""),
            span,
            NameScope::empty(),
            DefKind::MutexSync { decl: mutex },
            unknown,
          )
          .with_pass(Pass::Final),
        );
      }
      Decl::Per(per) => {
        alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), ""),
            span,
            NameScope::empty(),
            DefKind::PerSync { decl: per },
            unknown,
          )
          .with_pass(Pass::Final),
        );
      }
      Decl::Trace(trace) => {
        alloc(
          &mut self.table,
          Definition::new(
            Name::new(container.clone(), trace.name.clone()),
            span,
            NameScope::empty(),
            DefKind::NamedTrace { decl: trace },
            unknown,
          )
          .with_pass(Pass::Final)
          .with_access(Access::public()),
        );
      }
    }

    if let Owner::Module(m) = owner {
      self.table.modules[m.0 as usize].defs.extend(new.iter().copied());
    }
    new
  }

  #[allow(clippy::too_many_arguments)]
  fn operation(
    &mut self,
    alloc: &mut impl FnMut(&mut DefTable<'a>, Definition<'a>) -> DefId,
    container: &str,
    name: &str,
    span: Span,
    access: Access,
    (has_pre, has_post): (bool, bool),
    kind: impl FnOnce(OperationInfo) -> DefKind<'a>,
    is_constructor: bool,
    in_module: bool,
  ) -> DefId {
    let unknown = self.store.unknown();
    let name = Name::new(container, name);
    let id = alloc(
      &mut self.table,
      Definition::new(
        name.clone(),
        span,
        NameScope::GLOBAL,
        kind(OperationInfo {
          pre: None,
          post: None,
          is_constructor,
          exits: RefCell::new(Memo::NotStarted),
        }),
        unknown,
      )
      .with_access(access),
    );
    // Only VDM-SL operations get callable pre and post functions.
    if !in_module {
      return id;
    }
    let pre = has_pre.then(|| {
      alloc(
        &mut self.table,
        derived_def(name.pre_name(), span, id, DerivedRole::Pre, access, unknown),
      )
    });
    let post = has_post.then(|| {
      alloc(
        &mut self.table,
        derived_def(name.post_name(), span, id, DerivedRole::Post, access, unknown),
      )
    });
    match &mut self.table.get_mut(id).kind {
      DefKind::ExplicitOperation { info, .. } | DefKind::ImplicitOperation { info, .. } => {
        info.pre = pre;
        info.post = post;
      }
      _ => unreachable!(),
    }
    id
  }

  /// Reports later definitions of a name already defined in the same
  /// container. Callables of a class may share a name if their signatures
  /// differ; that is checked once types are known.
  fn report_duplicates(&mut self, defs: &[DefId], overloading: bool) {
    let mut first: AHashMap<(String, bool), DefId> = AHashMap::new();
    for id in defs.iter().copied() {
      let def = self.table.get(id);
      if def.scope.is_empty() || def.name.name.is_empty() {
        continue;
      }
      let is_type = def.scope.contains(NameScope::TYPENAME);
      let key = (def.name.name.clone(), is_type);
      let Some(existing) = first.get(&key).copied() else {
        first.insert(key, id);
        continue;
      };
      let prev = self.table.get(existing);
      if overloading && self.table.is_callable(existing) && self.table.is_callable(id) {
        continue;
      }
      let diagnostic = codes::DUPLICATE_DEFINITION
        .at(def.span)
        .with_label(Label::secondary(prev.span, "first defined here"))
        .with_detail("Name", def.name.name.clone());
      self.sink.push(diagnostic);
    }
  }

  fn exports(&mut self, idx: ModuleIdx) {
    let module = self.table.module(idx);
    let Some(decl) = module.decl else {
      let all: Vec<DefId> = module.defs.clone();
      self.table.modules[idx.0 as usize].exported = exportable(&self.table, &all);
      return;
    };
    let mut exported = Vec::new();
    match &decl.exports {
      Exports::All => exported = exportable(&self.table, &module.defs),
      Exports::Named(items) => {
        let defs = module.defs.clone();
        for item in items {
          let found = defs
            .iter()
            .copied()
            .find(|d| kind_matches(&self.table, *d, item.stx.kind, &item.stx.name));
          match found {
            Some(id) => {
              exported.push(id);
              exported.extend(derived_of(&self.table, id));
            }
            None => {
              let span = self.span_of_module(idx, item.loc);
              self.sink.push(
                codes::EXPORT_UNDEFINED
                  .at(span)
                  .with_detail("Name", item.stx.name.clone()),
              );
            }
          }
        }
      }
    }
    self.table.modules[idx.0 as usize].exported = exported;
  }

  fn span_of_module(&self, idx: ModuleIdx, loc: Loc) -> Span {
    Span::at(self.table.module(idx).span.file, loc)
  }

  fn imports(&mut self, idx: ModuleIdx) {
    let Some(decl) = self.table.module(idx).decl else {
      return;
    };
    let importer = decl.name.clone();
    let mut proxies = Vec::new();
    for import in &decl.imports {
      let span = self.span_of_module(idx, import.loc);
      let Some(from) = self.table.find_module(&import.stx.module) else {
        self.sink.push(
          codes::UNKNOWN_MODULE
            .at(span)
            .with_detail("Name", import.stx.module.clone()),
        );
        continue;
      };
      let exported = self.table.module(from).exported.clone();
      match &import.stx.items {
        ImportItems::All => {
          for target in exported {
            let def = self.table.get(target);
            let proxy = Definition::new(
              Name::new(import.stx.module.clone(), def.name.name.clone()),
              span,
              def.scope,
              DefKind::Imported { target },
              def.ty(),
            )
            .with_pass(def.pass)
            .with_access(def.access)
            .with_module(Some(idx));
            proxies.push(self.table.alloc(proxy));
          }
        }
        ImportItems::Named(items) => {
          for item in items {
            let item_span = self.span_of_module(idx, item.loc);
            let found = exported
              .iter()
              .copied()
              .find(|d| kind_matches(&self.table, *d, item.stx.kind, &item.stx.name));
            let Some(target) = found else {
              self.sink.push(
                codes::NOT_EXPORTED
                  .at(item_span)
                  .with_detail("Name", item.stx.name.clone())
                  .with_detail("Module", import.stx.module.clone()),
              );
              continue;
            };
            let def = self.table.get(target);
            let (name, kind) = match &item.stx.renamed {
              Some(renamed) => (
                Name::new(importer.clone(), renamed.clone()),
                DefKind::Renamed { target },
              ),
              None => (
                Name::new(import.stx.module.clone(), item.stx.name.clone()),
                DefKind::Imported { target },
              ),
            };
            let proxy = Definition::new(name, item_span, def.scope, kind, def.ty())
              .with_pass(def.pass)
              .with_access(def.access)
              .with_module(Some(idx));
            proxies.push(self.table.alloc(proxy));
          }
        }
      }
    }
    self.table.modules[idx.0 as usize].imports = proxies;
  }
}

fn derived_def<'a>(
  name: Name,
  span: Span,
  origin: DefId,
  role: DerivedRole,
  access: Access,
  ty: types_vdm::TypeId,
) -> Definition<'a> {
  Definition::new(name, span, NameScope::GLOBAL, DefKind::Derived { origin, role }, ty)
    .with_access(access)
}

/// What `exports all` exports: every nameable definition except state.
fn exportable(table: &DefTable, defs: &[DefId]) -> Vec<DefId> {
  defs
    .iter()
    .copied()
    .filter(|d| {
      let def = table.get(*d);
      def.scope.intersects(NameScope::GLOBAL | NameScope::TYPENAME)
        && !matches!(def.kind, DefKind::State { .. })
    })
    .collect()
}

fn kind_matches(table: &DefTable, id: DefId, kind: ImportKind, name: &str) -> bool {
  let def = table.get(id);
  if def.name.name != name {
    return false;
  }
  match kind {
    ImportKind::Type => def.is_type_definition(),
    ImportKind::Value => matches!(
      def.kind,
      DefKind::Local {
        role: LocalRole::Value(_)
      }
    ),
    ImportKind::Function => table.is_function(id),
    ImportKind::Operation => table.is_operation(id),
  }
}

/// The synthesized functions that travel with an exported definition.
fn derived_of(table: &DefTable, id: DefId) -> Vec<DefId> {
  let def = table.get(id);
  match &def.kind {
    DefKind::Type { derived, .. } => derived.clone(),
    DefKind::ExplicitFunction { info, .. } | DefKind::ImplicitFunction { info, .. } => {
      info.pre.into_iter().chain(info.post).collect()
    }
    DefKind::ExplicitOperation { info, .. } | DefKind::ImplicitOperation { info, .. } => {
      info.pre.into_iter().chain(info.post).collect()
    }
    _ => Vec::new(),
  }
}
