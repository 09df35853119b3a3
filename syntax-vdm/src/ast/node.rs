use crate::loc::Loc;
use ahash::HashMap;
use ahash::HashMapExt;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;
use serde::Serializer;
use std::any::Any;
use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// Per-node annotations keyed by their Rust type.
///
/// The map sits behind a `RefCell` so annotations can be recorded while the
/// tree itself is only borrowed immutably.
#[derive(Default)]
pub struct NodeAssocData {
  map: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl NodeAssocData {
  pub fn get<T: Any + Clone>(&self) -> Option<T> {
    let t = TypeId::of::<T>();
    self
      .map
      .borrow()
      .get(&t)
      .and_then(|v| v.downcast_ref::<T>())
      .cloned()
  }

  pub fn has<T: Any>(&self) -> bool {
    self.map.borrow().contains_key(&TypeId::of::<T>())
  }

  pub fn set<T: Any>(&self, v: T) {
    let t = TypeId::of::<T>();
    self.map.borrow_mut().insert(t, Box::new(v));
  }

  pub fn clear(&self) {
    *self.map.borrow_mut() = HashMap::new();
  }
}

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
  #[drive(skip)]
  pub assoc: NodeAssocData,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
      assoc: NodeAssocData::default(),
    }
  }

  /// Maps the syntax, keeping the location and associated data.
  pub fn map_stx<T: Drive + DriveMut, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
      assoc: self.assoc,
    }
  }

  /// Wraps the node inside another node with the same loc.
  pub fn wrap<T: Drive + DriveMut, F: FnOnce(Node<S>) -> T>(self, f: F) -> Node<T> {
    let loc = self.loc;
    let stx = f(self);
    Node::new(loc, stx)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize + Drive + DriveMut> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.serialize(serializer)
  }
}

#[cfg(test)]
mod tests {
  use super::NodeAssocData;

  #[derive(Clone, Debug, PartialEq)]
  struct Annotation(u32);

  #[test]
  fn annotations_are_set_through_shared_reference() {
    let assoc = NodeAssocData::default();
    assert!(!assoc.has::<Annotation>());
    assoc.set(Annotation(32));
    assert_eq!(assoc.get::<Annotation>(), Some(Annotation(32)));
    assoc.set(Annotation(7));
    assert_eq!(assoc.get::<Annotation>(), Some(Annotation(7)));
    assoc.clear();
    assert_eq!(assoc.get::<Annotation>(), None);
  }
}
