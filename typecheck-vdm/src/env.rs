use crate::def::DefId;
use crate::def::DefKind;
use crate::def::DefTable;
use crate::def::ModuleIdx;
use crate::name::Name;
use crate::name::NameScope;
use std::borrow::Cow;
use std::rc::Rc;

/// What one environment level contributes to lookups.
#[derive(Clone, Debug)]
pub enum Frame {
  /// Class names, and explicitly qualified members of any class.
  Global,
  /// A module's own definitions, then its imports.
  Module(ModuleIdx),
  /// A class's own members, then the inherited ones it does not override.
  Class(DefId),
  /// Locally bound names.
  Flat(Vec<DefId>),
}

/// What kind of body the environment checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Context {
  /// No operation calls, no state changes.
  Function,
  /// Calls to pure operations only, no state changes.
  PureOperation,
  Operation,
}

impl Context {
  pub fn is_functional(self) -> bool {
    !matches!(self, Context::Operation)
  }
}

/// A lookup context. Environments are built once and then only read; the
/// only effect of a lookup is to set the used flag of what it finds.
///
/// Settings left unset on a level are inherited from the parent.
#[derive(Debug)]
pub struct Env {
  parent: Option<Rc<Env>>,
  frame: Frame,
  is_static: Option<bool>,
  context: Option<Context>,
  enclosing: Option<DefId>,
  precondition: bool,
  limit_state_scope: bool,
}

impl Env {
  pub fn new(frame: Frame) -> Env {
    Env {
      parent: None,
      frame,
      is_static: None,
      context: None,
      enclosing: None,
      precondition: false,
      limit_state_scope: false,
    }
  }

  pub fn global() -> Rc<Env> {
    Env::new(Frame::Global).build()
  }

  pub fn flat(defs: Vec<DefId>, parent: &Rc<Env>) -> Rc<Env> {
    Env::new(Frame::Flat(defs)).within(parent).build()
  }

  pub fn within(mut self, parent: &Rc<Env>) -> Env {
    self.parent = Some(Rc::clone(parent));
    self
  }

  pub fn with_static(mut self, is_static: bool) -> Env {
    self.is_static = Some(is_static);
    self
  }

  pub fn with_context(mut self, context: Context) -> Env {
    self.context = Some(context);
    self
  }

  pub fn with_enclosing(mut self, def: DefId) -> Env {
    self.enclosing = Some(def);
    self
  }

  /// Marks the environment of a precondition; the enclosing definition may
  /// not be referenced from it.
  pub fn in_precondition(mut self) -> Env {
    self.precondition = true;
    self
  }

  /// State names outside this level are not visible through it.
  pub fn limit_state_scope(mut self) -> Env {
    self.limit_state_scope = true;
    self
  }

  pub fn build(self) -> Rc<Env> {
    Rc::new(self)
  }

  pub fn frame(&self) -> &Frame {
    &self.frame
  }

  pub fn parent(&self) -> Option<&Rc<Env>> {
    self.parent.as_ref()
  }

  fn levels(&self) -> impl Iterator<Item = &Env> {
    std::iter::successors(Some(self), |e| e.parent.as_deref())
  }

  pub fn is_static(&self) -> bool {
    self
      .levels()
      .find_map(|e| e.is_static)
      .unwrap_or(false)
  }

  pub fn context(&self) -> Context {
    self
      .levels()
      .find_map(|e| e.context)
      .unwrap_or(Context::Operation)
  }

  pub fn is_functional(&self) -> bool {
    self.context().is_functional()
  }

  pub fn enclosing(&self) -> Option<DefId> {
    self.levels().find_map(|e| e.enclosing)
  }

  pub fn is_precondition(&self) -> bool {
    self.levels().any(|e| e.precondition)
  }

  pub fn find_class_definition(&self) -> Option<DefId> {
    self.levels().find_map(|e| match e.frame {
      Frame::Class(class) => Some(class),
      _ => None,
    })
  }

  pub fn find_module(&self) -> Option<ModuleIdx> {
    self.levels().find_map(|e| match e.frame {
      Frame::Module(module) => Some(module),
      _ => None,
    })
  }

  pub fn find_state_definition(&self, table: &DefTable) -> Option<DefId> {
    self.find_module().and_then(|m| table.module(m).state)
  }

  /// The module or class that unqualified names are looked up in.
  pub fn container_name(&self, table: &DefTable) -> String {
    if let Some(class) = self.find_class_definition() {
      return table.get(class).name.name.clone();
    }
    match self.find_module() {
      Some(module) => table.module(module).name.clone(),
      None => "DEFAULT".to_string(),
    }
  }

  /// Finds the definition a name refers to and marks it used.
  pub fn find_name(&self, table: &DefTable, name: &Name, scope: NameScope) -> Option<DefId> {
    let found = self.peek_name(table, name, scope)?;
    table.mark_used(found);
    Some(found)
  }

  /// As [`Self::find_name`], without marking anything used.
  pub fn peek_name(&self, table: &DefTable, name: &Name, scope: NameScope) -> Option<DefId> {
    self.find_matches(table, name, scope).into_iter().next()
  }

  pub fn find_type(&self, table: &DefTable, name: &Name) -> Option<DefId> {
    self.find_name(table, name, NameScope::TYPENAME | NameScope::CLASSNAME)
  }

  /// Every definition the name may refer to at the innermost level that has
  /// any. More than one result means the name is overloaded there. Nothing
  /// is marked used.
  pub fn find_matches(&self, table: &DefTable, name: &Name, scope: NameScope) -> Vec<DefId> {
    let mut scope = scope;
    for level in self.levels() {
      let found = level.frame_matches(table, name, scope);
      if !found.is_empty() {
        return found;
      }
      if level.limit_state_scope {
        scope.remove(NameScope::STATE | NameScope::OLDSTATE);
      }
    }
    Vec::new()
  }

  fn frame_matches(&self, table: &DefTable, name: &Name, scope: NameScope) -> Vec<DefId> {
    let visible = |defs: &[DefId], lookup: &Name| -> Vec<DefId> {
      defs
        .iter()
        .copied()
        .filter(|d| admits(table, *d, lookup, scope))
        .collect()
    };
    match &self.frame {
      Frame::Flat(defs) => visible(defs, name),
      Frame::Module(idx) => {
        let module = table.module(*idx);
        let own = visible(&module.defs, name);
        if !own.is_empty() {
          return own;
        }
        module
          .imports
          .iter()
          .copied()
          .filter(|d| import_admits(table, *d, name) && admits(table, *d, name, scope))
          .collect()
      }
      Frame::Class(class) => {
        let lookup = own_member_lookup(table, *class, name);
        let info = table.class_info(*class);
        let mut own = visible(&info.locals, &lookup);
        let inherited = visible(&info.local_inherited.borrow(), &lookup);
        if own.is_empty() {
          return inherited;
        }
        // Inherited overloads that are not overridden stay callable.
        if own.iter().all(|d| table.is_callable(*d)) {
          own.extend(inherited.into_iter().filter(|d| table.is_callable(*d)));
        }
        own
      }
      Frame::Global => {
        if name.explicit {
          return match table.find_class(&name.module) {
            Some(class) => {
              let lookup = own_member_lookup(table, class, name);
              visible(&table.class_members(class), &lookup)
            }
            None => Vec::new(),
          };
        }
        if !scope.intersects(NameScope::CLASSNAME | NameScope::TYPENAME) {
          return Vec::new();
        }
        table.find_class(&name.name).into_iter().collect()
      }
    }
  }
}

/// `C`x` looked up among the members of `C` itself matches inherited members
/// too, which carry the name of the class that declared them.
fn own_member_lookup<'n>(table: &DefTable, class: DefId, name: &'n Name) -> Cow<'n, Name> {
  if name.explicit && table.get(class).name.name == name.module {
    let mut unqualified = name.clone();
    unqualified.explicit = false;
    Cow::Owned(unqualified)
  } else {
    Cow::Borrowed(name)
  }
}

fn admits(table: &DefTable, id: DefId, name: &Name, scope: NameScope) -> bool {
  let def = table.get(id);
  if !def.name.matches(name) {
    return false;
  }
  if name.old {
    scope.contains(NameScope::OLDSTATE) && def.scope.contains(NameScope::STATE)
  } else {
    scope.admits(def.scope)
  }
}

/// Plain imports are only visible qualified with the exporting module;
/// renamed ones under their new name.
fn import_admits(table: &DefTable, id: DefId, name: &Name) -> bool {
  match table.get(id).kind {
    DefKind::Imported { .. } => name.explicit,
    _ => true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::def::DefKind;
  use crate::def::Definition;
  use crate::def::LocalRole;
  use crate::def::ModuleInfo;
  use diagnostics::FileId;
  use diagnostics::Span;
  use diagnostics::TextRange;
  use types_vdm::TypeId;

  fn span() -> Span {
    Span::new(FileId(0), TextRange::new(0, 1))
  }

  fn local(table: &mut DefTable<'static>, module: &str, name: &str, scope: NameScope) -> DefId {
    table.alloc(Definition::new(
      Name::new(module, name),
      span(),
      scope,
      DefKind::Local {
        role: LocalRole::Let,
      },
      TypeId(1),
    ))
  }

  fn module(table: &mut DefTable<'static>, name: &str, defs: Vec<DefId>, imports: Vec<DefId>) -> ModuleIdx {
    table.modules.push(ModuleInfo {
      name: name.to_string(),
      decl: None,
      span: span(),
      defs,
      imports,
      state: None,
      exports_all: true,
      exported: Vec::new(),
    });
    ModuleIdx(table.modules.len() as u32 - 1)
  }

  #[test]
  fn inner_frames_shadow_and_lookups_mark_used() {
    let mut table = DefTable::new();
    let outer = local(&mut table, "M", "x", NameScope::GLOBAL);
    let inner = local(&mut table, "M", "x", NameScope::LOCAL);
    let m = module(&mut table, "M", vec![outer], vec![]);
    let menv = Env::new(Frame::Module(m)).within(&Env::global()).build();
    let env = Env::flat(vec![inner], &menv);

    let found = env.find_name(&table, &Name::new("M", "x"), NameScope::NAMES);
    assert_eq!(found, Some(inner));
    assert!(table.get(inner).is_used());
    assert!(!table.get(outer).is_used());
    assert_eq!(
      menv.peek_name(&table, &Name::new("M", "x"), NameScope::NAMES),
      Some(outer)
    );
  }

  #[test]
  fn scope_hides_state_from_functions() {
    let mut table = DefTable::new();
    let s = local(&mut table, "M", "counter", NameScope::STATE);
    let m = module(&mut table, "M", vec![s], vec![]);
    let env = Env::new(Frame::Module(m)).within(&Env::global()).build();
    let name = Name::new("M", "counter");
    assert_eq!(env.peek_name(&table, &name, NameScope::NAMES), None);
    assert_eq!(env.peek_name(&table, &name, NameScope::NAMESANDSTATE), Some(s));
    let old = name.clone().with_old(true);
    assert_eq!(env.peek_name(&table, &old, NameScope::NAMESANDSTATE), None);
    assert_eq!(env.peek_name(&table, &old, NameScope::NAMESANDANYSTATE), Some(s));
  }

  #[test]
  fn limited_frames_hide_outer_state() {
    let mut table = DefTable::new();
    let a = local(&mut table, "M", "a", NameScope::STATE);
    let b = local(&mut table, "M", "b", NameScope::STATE);
    let m = module(&mut table, "M", vec![a, b], vec![]);
    let menv = Env::new(Frame::Module(m)).within(&Env::global()).build();
    let ext = Env::new(Frame::Flat(vec![a]))
      .within(&menv)
      .limit_state_scope()
      .build();
    let scope = NameScope::NAMESANDSTATE;
    assert_eq!(ext.peek_name(&table, &Name::new("M", "a"), scope), Some(a));
    assert_eq!(ext.peek_name(&table, &Name::new("M", "b"), scope), None);
  }

  #[test]
  fn plain_imports_need_qualification() {
    let mut table = DefTable::new();
    let origin = local(&mut table, "A", "f", NameScope::GLOBAL);
    let imported = table.alloc(Definition::new(
      Name::new("A", "f"),
      span(),
      NameScope::GLOBAL,
      DefKind::Imported { target: origin },
      TypeId(1),
    ));
    let renamed = table.alloc(Definition::new(
      Name::new("B", "g"),
      span(),
      NameScope::GLOBAL,
      DefKind::Renamed { target: origin },
      TypeId(1),
    ));
    let b = module(&mut table, "B", vec![], vec![imported, renamed]);
    let env = Env::new(Frame::Module(b)).within(&Env::global()).build();
    let scope = NameScope::NAMES;
    assert_eq!(env.peek_name(&table, &Name::new("B", "f"), scope), None);
    assert_eq!(env.peek_name(&table, &Name::explicit("A", "f"), scope), Some(imported));
    assert_eq!(env.find_name(&table, &Name::new("B", "g"), scope), Some(renamed));
    assert!(table.get(origin).is_used());
  }

  #[test]
  fn settings_are_inherited() {
    let global = Env::global();
    let outer = Env::new(Frame::Flat(vec![]))
      .within(&global)
      .with_static(true)
      .with_context(Context::Function)
      .with_enclosing(DefId(3))
      .build();
    let inner = Env::flat(vec![], &outer);
    assert!(inner.is_static());
    assert!(inner.is_functional());
    assert_eq!(inner.enclosing(), Some(DefId(3)));
    assert!(!inner.is_precondition());
    assert!(!global.is_functional());
  }
}
