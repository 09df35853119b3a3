use bitflags::bitflags;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use types_vdm::TypeId;

bitflags! {
  /// The kinds of names a lookup may see.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct NameScope: u8 {
    /// Parameters and locally bound names.
    const LOCAL = 1 << 0;
    /// Module or class level values, functions and operations.
    const GLOBAL = 1 << 1;
    /// State fields and instance variables.
    const STATE = 1 << 2;
    /// `x~` in postconditions.
    const OLDSTATE = 1 << 3;
    const TYPENAME = 1 << 4;
    const CLASSNAME = 1 << 5;

    const NAMES = Self::LOCAL.bits() | Self::GLOBAL.bits();
    const NAMESANDSTATE = Self::NAMES.bits() | Self::STATE.bits();
    const NAMESANDANYSTATE = Self::NAMESANDSTATE.bits() | Self::OLDSTATE.bits();
    const ANYTHING = Self::NAMESANDANYSTATE.bits() | Self::TYPENAME.bits() | Self::CLASSNAME.bits();
  }
}

impl NameScope {
  /// Whether a lookup in `self` may see a definition declared with `declared`.
  pub fn admits(self, declared: NameScope) -> bool {
    self.intersects(declared)
  }
}

/// A possibly qualified name.
///
/// `module` is the module or class that owns the name. A name written with
/// an explicit qualifier (`M`x`) only matches definitions of that module; an
/// unqualified one matches by its simple name. The type qualifier, when set,
/// selects one overload by its parameter types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
  pub module: String,
  pub name: String,
  pub explicit: bool,
  pub old: bool,
  pub qualifier: Option<Vec<TypeId>>,
}

impl Name {
  pub fn new(module: impl Into<String>, name: impl Into<String>) -> Name {
    Name {
      module: module.into(),
      name: name.into(),
      explicit: false,
      old: false,
      qualifier: None,
    }
  }

  pub fn explicit(module: impl Into<String>, name: impl Into<String>) -> Name {
    Name {
      explicit: true,
      ..Name::new(module, name)
    }
  }

  /// Builds the name a reference in `current` refers to.
  pub fn reference(current: &str, module: Option<&str>, name: &str) -> Name {
    match module {
      Some(m) => Name::explicit(m, name),
      None => Name::new(current, name),
    }
  }

  pub fn with_old(mut self, old: bool) -> Name {
    self.old = old;
    self
  }

  pub fn with_qualifier(mut self, qualifier: Vec<TypeId>) -> Name {
    self.qualifier = Some(qualifier);
    self
  }

  /// The same name in another module, as an import sees it.
  pub fn in_module(&self, module: impl Into<String>) -> Name {
    Name {
      module: module.into(),
      ..self.clone()
    }
  }

  fn prefixed(&self, prefix: &str) -> Name {
    Name::new(self.module.clone(), format!("{prefix}{}", self.name))
  }

  pub fn pre_name(&self) -> Name {
    self.prefixed("pre_")
  }

  pub fn post_name(&self) -> Name {
    self.prefixed("post_")
  }

  pub fn inv_name(&self) -> Name {
    self.prefixed("inv_")
  }

  pub fn init_name(&self) -> Name {
    self.prefixed("init_")
  }

  pub fn eq_name(&self) -> Name {
    self.prefixed("eq_")
  }

  pub fn ord_name(&self) -> Name {
    self.prefixed("ord_")
  }

  pub fn min_name(&self) -> Name {
    self.prefixed("min_")
  }

  pub fn max_name(&self) -> Name {
    self.prefixed("max_")
  }

  /// Whether a definition named `self` answers a lookup of `lookup`. The
  /// lookup's type qualifier is compared later, against the parameter types
  /// of each candidate, by overload selection.
  pub fn matches(&self, lookup: &Name) -> bool {
    self.name == lookup.name && (!lookup.explicit || self.module == lookup.module)
  }
}

impl Display for Name {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    if self.explicit {
      write!(f, "{}`", self.module)?;
    }
    f.write_str(&self.name)?;
    if self.old {
      f.write_str("~")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_names_match_only_their_module() {
    let def = Name::new("A", "f");
    assert!(def.matches(&Name::new("B", "f")));
    assert!(def.matches(&Name::explicit("A", "f")));
    assert!(!def.matches(&Name::explicit("B", "f")));
    assert!(!def.matches(&Name::new("A", "g")));
  }

  #[test]
  fn equality_is_qualifier_sensitive() {
    let plain = Name::new("A", "f");
    let q1 = plain.clone().with_qualifier(vec![TypeId(1)]);
    let q2 = plain.clone().with_qualifier(vec![TypeId(2)]);
    assert_ne!(plain, q1);
    assert_ne!(q1, q2);
    assert_eq!(q1, plain.with_qualifier(vec![TypeId(1)]));
  }

  #[test]
  fn derived_names_and_display() {
    let n = Name::new("M", "f");
    assert_eq!(n.pre_name().name, "pre_f");
    assert_eq!(n.inv_name().to_string(), "inv_f");
    assert_eq!(Name::explicit("M", "x").with_old(true).to_string(), "M`x~");
  }

  #[test]
  fn scopes_compose() {
    assert!(NameScope::NAMESANDSTATE.admits(NameScope::STATE));
    assert!(!NameScope::NAMES.admits(NameScope::STATE));
    assert!(NameScope::ANYTHING.contains(NameScope::TYPENAME));
  }
}
