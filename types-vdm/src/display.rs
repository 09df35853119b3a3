use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// Formats a type in VDM notation, e.g. `seq of (nat * bool)`.
pub struct TypeDisplay<'a> {
  store: &'a TypeStore,
  ty: TypeId,
}

impl TypeStore {
  pub fn display(&self, ty: TypeId) -> TypeDisplay<'_> {
    TypeDisplay { store: self, ty }
  }

  /// A parenthesised, comma separated list of types, as used in argument
  /// mismatch details.
  pub fn display_list(&self, types: &[TypeId]) -> String {
    let items: Vec<String> = types.iter().map(|t| self.display(*t).to_string()).collect();
    format!("({})", items.join(", "))
  }
}

impl<'a> TypeDisplay<'a> {
  fn child(&self, ty: TypeId) -> TypeDisplay<'a> {
    TypeDisplay {
      store: self.store,
      ty,
    }
  }

  fn write_joined(&self, f: &mut Formatter<'_>, items: &[TypeId], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
      if i > 0 {
        f.write_str(sep)?;
      }
      write!(f, "{}", self.child(*item))?;
    }
    Ok(())
  }

  fn write_params(&self, f: &mut Formatter<'_>, params: &[TypeId]) -> fmt::Result {
    if params.is_empty() {
      f.write_str("()")
    } else {
      self.write_joined(f, params, " * ")
    }
  }
}

impl Display for TypeDisplay<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let store = self.store;
    match store.get(self.ty) {
      TypeKind::Void => f.write_str("()"),
      TypeKind::Unknown => f.write_str("?"),
      TypeKind::Bool => f.write_str("bool"),
      TypeKind::Numeric(kind) => f.write_str(kind.name()),
      TypeKind::Char => f.write_str("char"),
      TypeKind::Token => f.write_str("token"),
      TypeKind::Quote(q) => write!(f, "<{q}>"),
      TypeKind::Optional(inner) if *inner == store.unknown() => f.write_str("nil"),
      TypeKind::Optional(inner) => write!(f, "[{}]", self.child(*inner)),
      TypeKind::Named(id) | TypeKind::Record(id) => f.write_str(&store.named(*id).name.name),
      TypeKind::Union(members) => {
        f.write_str("(")?;
        self.write_joined(f, members, " | ")?;
        f.write_str(")")
      }
      TypeKind::Product(members) => {
        f.write_str("(")?;
        self.write_joined(f, members, " * ")?;
        f.write_str(")")
      }
      TypeKind::Function(func) => {
        f.write_str("(")?;
        self.write_params(f, &func.params)?;
        f.write_str(if func.partial { " -> " } else { " +> " })?;
        write!(f, "{})", self.child(func.result))
      }
      TypeKind::Operation(op) => {
        f.write_str("(")?;
        self.write_params(f, &op.params)?;
        write!(f, " ==> {})", self.child(op.result))
      }
      TypeKind::Set(s) if s.empty => f.write_str("set of ?"),
      TypeKind::Set(s) => write!(
        f,
        "{} of {}",
        if s.non_empty { "set1" } else { "set" },
        self.child(s.elem)
      ),
      TypeKind::Seq(s) if s.empty => f.write_str("seq of ?"),
      TypeKind::Seq(s) => write!(
        f,
        "{} of {}",
        if s.non_empty { "seq1" } else { "seq" },
        self.child(s.elem)
      ),
      TypeKind::Map(m) => write!(
        f,
        "{} {} to {}",
        if m.injective { "inmap" } else { "map" },
        self.child(m.dom),
        self.child(m.rng)
      ),
      TypeKind::Class(id) => f.write_str(&store.class(*id).name),
      TypeKind::Parameter(name) => write!(f, "@{name}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::types::FunctionType;
  use crate::types::OperationType;
  use crate::types::TypeStore;

  #[test]
  fn displays_in_vdm_notation() {
    let mut store = TypeStore::new();
    let nat = store.nat();
    let b = store.bool();
    let pair = store.product(vec![nat, b]);
    let s = store.seq(pair);
    assert_eq!(store.display(s).to_string(), "seq of (nat * bool)");

    let f = store.function(FunctionType::new(vec![nat, nat], b).total());
    assert_eq!(store.display(f).to_string(), "(nat * nat +> bool)");

    let void = store.void();
    let op = store.operation(OperationType {
      params: vec![],
      result: void,
      pure: false,
    });
    assert_eq!(store.display(op).to_string(), "(() ==> ())");

    let m = store.inmap(nat, b);
    assert_eq!(store.display(m).to_string(), "inmap nat to bool");
    assert_eq!(store.display(store.nil()).to_string(), "nil");
    let opt = store.optional(nat);
    assert_eq!(store.display(opt).to_string(), "[nat]");
    assert_eq!(store.display_list(&[nat, b]), "(nat, bool)");
  }
}
