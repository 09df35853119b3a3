use ahash::AHashMap;
use ahash::AHashSet;
use serde::Serialize;
use syntax_vdm::ast::decl::Visibility;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

/// Slot of a named or record type in the [`TypeStore`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NamedId(pub u32);

/// Slot of a class in the [`TypeStore`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassId(pub u32);

/// Numeric types, ordered so that each is a subtype of every later one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NumericKind {
  Nat1,
  Nat,
  Int,
  Rat,
  Real,
}

impl NumericKind {
  pub fn name(self) -> &'static str {
    match self {
      NumericKind::Nat1 => "nat1",
      NumericKind::Nat => "nat",
      NumericKind::Int => "int",
      NumericKind::Rat => "rat",
      NumericKind::Real => "real",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
  Void,
  /// Placeholder produced after an error; relates to everything.
  Unknown,
  Bool,
  Numeric(NumericKind),
  Char,
  Token,
  Quote(String),
  /// `[T]`. The type of `nil` is `Optional(Unknown)`.
  Optional(TypeId),
  Named(NamedId),
  Record(NamedId),
  Union(Vec<TypeId>),
  Product(Vec<TypeId>),
  Function(FunctionType),
  Operation(OperationType),
  Set(SetType),
  Seq(SeqType),
  Map(MapType),
  Class(ClassId),
  /// `@T` inside a polymorphic definition.
  Parameter(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
  pub params: Vec<TypeId>,
  pub result: TypeId,
  pub partial: bool,
  pub pure: bool,
  /// `None` for monomorphic functions, `Some(false)` for a polymorphic
  /// function whose type parameters are still unbound.
  pub instantiated: Option<bool>,
}

impl FunctionType {
  pub fn new(params: Vec<TypeId>, result: TypeId) -> FunctionType {
    FunctionType {
      params,
      result,
      partial: true,
      pure: true,
      instantiated: None,
    }
  }

  pub fn total(mut self) -> FunctionType {
    self.partial = false;
    self
  }

  pub fn is_uninstantiated(&self) -> bool {
    self.instantiated == Some(false)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationType {
  pub params: Vec<TypeId>,
  pub result: TypeId,
  pub pure: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SetType {
  pub elem: TypeId,
  /// `set1 of`.
  pub non_empty: bool,
  /// The type of `{}`.
  pub empty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeqType {
  pub elem: TypeId,
  pub non_empty: bool,
  pub empty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapType {
  pub dom: TypeId,
  pub rng: TypeId,
  pub injective: bool,
  pub empty: bool,
}

/// The module or class qualified name of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeName {
  pub module: String,
  pub name: String,
}

impl TypeName {
  pub fn new(module: impl Into<String>, name: impl Into<String>) -> TypeName {
    TypeName {
      module: module.into(),
      name: name.into(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordField {
  pub tag: String,
  pub ty: TypeId,
  pub equality_abstraction: bool,
}

#[derive(Clone, Debug)]
pub struct NamedSlot {
  pub name: TypeName,
  pub is_record: bool,
  /// `None` until the declaration's type has been resolved.
  pub underlying: Option<TypeId>,
  pub fields: Vec<RecordField>,
  pub has_inv: bool,
  pub has_eq: bool,
  pub has_ord: bool,
  pub visibility: Visibility,
}

impl NamedSlot {
  pub fn field(&self, tag: &str) -> Option<&RecordField> {
    self.fields.iter().find(|f| f.tag == tag)
  }
}

#[derive(Clone, Debug)]
pub struct ClassSlot {
  pub name: String,
  pub supers: Vec<ClassId>,
}

pub struct TypeStore {
  types: Vec<TypeKind>,
  interner: AHashMap<TypeKind, TypeId>,
  named: Vec<NamedSlot>,
  classes: Vec<ClassSlot>,
  void: TypeId,
  unknown: TypeId,
  bool: TypeId,
  char: TypeId,
  token: TypeId,
  nil: TypeId,
  numerics: [TypeId; 5],
}

impl Default for TypeStore {
  fn default() -> Self {
    TypeStore::new()
  }
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = TypeStore {
      types: Vec::new(),
      interner: AHashMap::new(),
      named: Vec::new(),
      classes: Vec::new(),
      void: TypeId(0),
      unknown: TypeId(0),
      bool: TypeId(0),
      char: TypeId(0),
      token: TypeId(0),
      nil: TypeId(0),
      numerics: [TypeId(0); 5],
    };
    store.void = store.intern_raw(TypeKind::Void);
    store.unknown = store.intern_raw(TypeKind::Unknown);
    store.bool = store.intern_raw(TypeKind::Bool);
    store.char = store.intern_raw(TypeKind::Char);
    store.token = store.intern_raw(TypeKind::Token);
    store.nil = store.intern_raw(TypeKind::Optional(store.unknown));
    for (i, kind) in [
      NumericKind::Nat1,
      NumericKind::Nat,
      NumericKind::Int,
      NumericKind::Rat,
      NumericKind::Real,
    ]
    .into_iter()
    .enumerate()
    {
      store.numerics[i] = store.intern_raw(TypeKind::Numeric(kind));
    }
    store
  }

  fn intern_raw(&mut self, kind: TypeKind) -> TypeId {
    if let Some(id) = self.interner.get(&kind) {
      return *id;
    }
    let id = TypeId(self.types.len() as u32);
    self.types.push(kind.clone());
    self.interner.insert(kind, id);
    id
  }

  pub fn intern(&mut self, kind: TypeKind) -> TypeId {
    match kind {
      TypeKind::Union(members) => self.normalize_union(members),
      TypeKind::Optional(inner) => self.normalize_optional(inner),
      other => self.intern_raw(other),
    }
  }

  fn normalize_union(&mut self, members: Vec<TypeId>) -> TypeId {
    let mut flat: Vec<TypeId> = Vec::new();
    for m in members {
      match self.get(m) {
        TypeKind::Union(inner) => flat.extend(inner.iter().copied()),
        _ => flat.push(m),
      }
    }
    if flat.iter().any(|m| *m == self.unknown) {
      return self.unknown;
    }
    // An optional member makes the whole union optional.
    let mut optional = false;
    let mut set: Vec<TypeId> = Vec::new();
    for id in flat {
      let id = match self.get(id) {
        TypeKind::Optional(inner) => {
          optional = true;
          if *inner == self.unknown {
            continue;
          }
          *inner
        }
        _ => id,
      };
      if !set.contains(&id) {
        set.push(id);
      }
    }
    set.sort();
    let body = match set.len() {
      0 => return if optional { self.nil } else { self.unknown },
      1 => set[0],
      _ => self.intern_raw(TypeKind::Union(set)),
    };
    if optional {
      self.normalize_optional(body)
    } else {
      body
    }
  }

  fn normalize_optional(&mut self, inner: TypeId) -> TypeId {
    match self.get(inner) {
      TypeKind::Optional(_) => inner,
      _ => self.intern_raw(TypeKind::Optional(inner)),
    }
  }

  pub fn get(&self, id: TypeId) -> &TypeKind {
    &self.types[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  pub fn void(&self) -> TypeId {
    self.void
  }

  pub fn unknown(&self) -> TypeId {
    self.unknown
  }

  pub fn bool(&self) -> TypeId {
    self.bool
  }

  pub fn char(&self) -> TypeId {
    self.char
  }

  pub fn token(&self) -> TypeId {
    self.token
  }

  /// The type of `nil`.
  pub fn nil(&self) -> TypeId {
    self.nil
  }

  pub fn numeric(&self, kind: NumericKind) -> TypeId {
    self.numerics[kind as usize]
  }

  pub fn nat(&self) -> TypeId {
    self.numeric(NumericKind::Nat)
  }

  pub fn nat1(&self) -> TypeId {
    self.numeric(NumericKind::Nat1)
  }

  pub fn int(&self) -> TypeId {
    self.numeric(NumericKind::Int)
  }

  pub fn rat(&self) -> TypeId {
    self.numeric(NumericKind::Rat)
  }

  pub fn real(&self) -> TypeId {
    self.numeric(NumericKind::Real)
  }

  pub fn quote(&mut self, value: impl Into<String>) -> TypeId {
    self.intern(TypeKind::Quote(value.into()))
  }

  pub fn optional(&mut self, inner: TypeId) -> TypeId {
    self.intern(TypeKind::Optional(inner))
  }

  pub fn union(&mut self, members: Vec<TypeId>) -> TypeId {
    self.intern(TypeKind::Union(members))
  }

  pub fn product(&mut self, members: Vec<TypeId>) -> TypeId {
    self.intern(TypeKind::Product(members))
  }

  pub fn set(&mut self, elem: TypeId) -> TypeId {
    self.intern(TypeKind::Set(SetType {
      elem,
      non_empty: false,
      empty: false,
    }))
  }

  pub fn set1(&mut self, elem: TypeId) -> TypeId {
    self.intern(TypeKind::Set(SetType {
      elem,
      non_empty: true,
      empty: false,
    }))
  }

  /// The type of `{}`.
  pub fn empty_set(&mut self) -> TypeId {
    let elem = self.unknown;
    self.intern(TypeKind::Set(SetType {
      elem,
      non_empty: false,
      empty: true,
    }))
  }

  pub fn seq(&mut self, elem: TypeId) -> TypeId {
    self.intern(TypeKind::Seq(SeqType {
      elem,
      non_empty: false,
      empty: false,
    }))
  }

  pub fn seq1(&mut self, elem: TypeId) -> TypeId {
    self.intern(TypeKind::Seq(SeqType {
      elem,
      non_empty: true,
      empty: false,
    }))
  }

  /// The type of `[]`.
  pub fn empty_seq(&mut self) -> TypeId {
    let elem = self.unknown;
    self.intern(TypeKind::Seq(SeqType {
      elem,
      non_empty: false,
      empty: true,
    }))
  }

  /// `seq of char`.
  pub fn string(&mut self) -> TypeId {
    let c = self.char;
    self.seq(c)
  }

  pub fn map(&mut self, dom: TypeId, rng: TypeId) -> TypeId {
    self.intern(TypeKind::Map(MapType {
      dom,
      rng,
      injective: false,
      empty: false,
    }))
  }

  pub fn inmap(&mut self, dom: TypeId, rng: TypeId) -> TypeId {
    self.intern(TypeKind::Map(MapType {
      dom,
      rng,
      injective: true,
      empty: false,
    }))
  }

  /// The type of `{|->}`.
  pub fn empty_map(&mut self) -> TypeId {
    let unknown = self.unknown;
    self.intern(TypeKind::Map(MapType {
      dom: unknown,
      rng: unknown,
      injective: false,
      empty: true,
    }))
  }

  pub fn function(&mut self, func: FunctionType) -> TypeId {
    self.intern(TypeKind::Function(func))
  }

  pub fn operation(&mut self, op: OperationType) -> TypeId {
    self.intern(TypeKind::Operation(op))
  }

  pub fn parameter(&mut self, name: impl Into<String>) -> TypeId {
    self.intern(TypeKind::Parameter(name.into()))
  }

  // Named and record types.

  pub fn declare_named(&mut self, name: TypeName, is_record: bool, visibility: Visibility) -> NamedId {
    let id = NamedId(self.named.len() as u32);
    self.named.push(NamedSlot {
      name,
      is_record,
      underlying: None,
      fields: Vec::new(),
      has_inv: false,
      has_eq: false,
      has_ord: false,
      visibility,
    });
    id
  }

  pub fn named(&self, id: NamedId) -> &NamedSlot {
    &self.named[id.0 as usize]
  }

  pub fn named_mut(&mut self, id: NamedId) -> &mut NamedSlot {
    &mut self.named[id.0 as usize]
  }

  pub fn find_named(&self, name: &TypeName) -> Option<NamedId> {
    self
      .named
      .iter()
      .position(|slot| &slot.name == name)
      .map(|i| NamedId(i as u32))
  }

  /// The `TypeId` referring to a declared type.
  pub fn named_type(&mut self, id: NamedId) -> TypeId {
    if self.named(id).is_record {
      self.intern(TypeKind::Record(id))
    } else {
      self.intern(TypeKind::Named(id))
    }
  }

  /// Records the resolved type of an alias, or the fields of a record. The
  /// underlying type of a record is its product of field types.
  pub fn define_named(&mut self, id: NamedId, underlying: TypeId) {
    self.named_mut(id).underlying = Some(underlying);
  }

  pub fn define_record(&mut self, id: NamedId, fields: Vec<RecordField>) {
    let product = self.product(fields.iter().map(|f| f.ty).collect());
    let slot = self.named_mut(id);
    slot.fields = fields;
    slot.underlying = Some(product);
  }

  // Classes.

  pub fn declare_class(&mut self, name: impl Into<String>) -> ClassId {
    let id = ClassId(self.classes.len() as u32);
    self.classes.push(ClassSlot {
      name: name.into(),
      supers: Vec::new(),
    });
    id
  }

  pub fn class(&self, id: ClassId) -> &ClassSlot {
    &self.classes[id.0 as usize]
  }

  pub fn set_supers(&mut self, id: ClassId, supers: Vec<ClassId>) {
    self.classes[id.0 as usize].supers = supers;
  }

  pub fn class_type(&mut self, id: ClassId) -> TypeId {
    self.intern(TypeKind::Class(id))
  }

  /// Whether `sub` is `sup` or inherits from it, directly or transitively.
  pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
    let mut seen = AHashSet::new();
    let mut stack = vec![sub];
    while let Some(c) = stack.pop() {
      if c == sup {
        return true;
      }
      if seen.insert(c) {
        stack.extend(self.class(c).supers.iter().copied());
      }
    }
    false
  }

  // Structural queries.

  /// Follows named aliases to the type they stand for. Records and classes are
  /// left alone; an unresolved or cyclic alias derefs to `Unknown`.
  pub fn deref(&self, id: TypeId) -> TypeId {
    let mut current = id;
    let mut seen = AHashSet::new();
    loop {
      match self.get(current) {
        TypeKind::Named(named) => {
          if !seen.insert(*named) {
            return self.unknown;
          }
          current = self.named(*named).underlying.unwrap_or(self.unknown);
        }
        _ => return current,
      }
    }
  }

  /// The members of a union after dereferencing, or the type itself.
  pub fn members(&self, id: TypeId) -> Vec<TypeId> {
    let id = self.deref(id);
    match self.get(id) {
      TypeKind::Union(members) => members.iter().map(|m| self.deref(*m)).collect(),
      _ => vec![id],
    }
  }

  fn any_member(&self, id: TypeId, f: impl Fn(&TypeKind) -> bool) -> bool {
    let id = self.deref(id);
    match self.get(id) {
      TypeKind::Union(members) => members.iter().any(|m| f(self.get(self.deref(*m)))),
      TypeKind::Optional(inner) => f(self.get(self.deref(*inner))),
      other => f(other),
    }
  }

  pub fn is_unknown(&self, id: TypeId) -> bool {
    matches!(self.get(self.deref(id)), TypeKind::Unknown)
  }

  pub fn is_void(&self, id: TypeId) -> bool {
    matches!(self.get(self.deref(id)), TypeKind::Void)
  }

  /// Whether `id` is, or may be, of the given shape. Unknown satisfies every
  /// shape so that one error does not cascade.
  pub fn is_bool(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Bool | TypeKind::Unknown))
  }

  pub fn is_numeric(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Numeric(_) | TypeKind::Unknown))
  }

  pub fn is_set(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Set(_) | TypeKind::Unknown))
  }

  pub fn is_seq(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Seq(_) | TypeKind::Unknown))
  }

  pub fn is_map(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Map(_) | TypeKind::Unknown))
  }

  pub fn is_function(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Function(_) | TypeKind::Unknown))
  }

  pub fn is_operation(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Operation(_) | TypeKind::Unknown))
  }

  pub fn is_record(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Record(_) | TypeKind::Unknown))
  }

  pub fn is_class(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Class(_) | TypeKind::Unknown))
  }

  pub fn is_product(&self, id: TypeId) -> bool {
    self.any_member(id, |k| matches!(k, TypeKind::Product(_) | TypeKind::Unknown))
  }

  /// Whether the type admits `nil`.
  pub fn is_optional(&self, id: TypeId) -> bool {
    matches!(self.get(self.deref(id)), TypeKind::Optional(_))
  }

  pub fn is_parameter(&self, id: TypeId) -> bool {
    matches!(self.get(self.deref(id)), TypeKind::Parameter(_))
  }

  /// The widest numeric kind the type may take.
  pub fn numeric_kind(&self, id: TypeId) -> Option<NumericKind> {
    self
      .members(self.strip_optional(id))
      .into_iter()
      .filter_map(|m| match self.get(m) {
        TypeKind::Numeric(k) => Some(*k),
        _ => None,
      })
      .max()
  }

  /// `[T]` as `T`; anything else unchanged.
  pub fn strip_optional(&self, id: TypeId) -> TypeId {
    let id = self.deref(id);
    match self.get(id) {
      TypeKind::Optional(inner) => self.deref(*inner),
      _ => id,
    }
  }

  fn collect_members<T>(&self, id: TypeId, f: impl Fn(&TypeKind) -> Option<T>) -> Vec<T> {
    self
      .members(self.strip_optional(id))
      .into_iter()
      .filter_map(|m| f(self.get(m)))
      .collect()
  }

  /// The set view of a type; unions of sets merge their element types.
  pub fn as_set(&mut self, id: TypeId) -> Option<SetType> {
    if self.is_unknown(id) {
      return Some(SetType {
        elem: self.unknown,
        non_empty: false,
        empty: false,
      });
    }
    let sets = self.collect_members(id, |k| match k {
      TypeKind::Set(s) => Some(*s),
      _ => None,
    });
    match sets.len() {
      0 => None,
      1 => Some(sets[0]),
      _ => {
        let elem = self.union(sets.iter().filter(|s| !s.empty).map(|s| s.elem).collect());
        Some(SetType {
          elem,
          non_empty: sets.iter().all(|s| s.non_empty),
          empty: sets.iter().all(|s| s.empty),
        })
      }
    }
  }

  pub fn as_seq(&mut self, id: TypeId) -> Option<SeqType> {
    if self.is_unknown(id) {
      return Some(SeqType {
        elem: self.unknown,
        non_empty: false,
        empty: false,
      });
    }
    let seqs = self.collect_members(id, |k| match k {
      TypeKind::Seq(s) => Some(*s),
      _ => None,
    });
    match seqs.len() {
      0 => None,
      1 => Some(seqs[0]),
      _ => {
        let elem = self.union(seqs.iter().filter(|s| !s.empty).map(|s| s.elem).collect());
        Some(SeqType {
          elem,
          non_empty: seqs.iter().all(|s| s.non_empty),
          empty: seqs.iter().all(|s| s.empty),
        })
      }
    }
  }

  pub fn as_map(&mut self, id: TypeId) -> Option<MapType> {
    if self.is_unknown(id) {
      return Some(MapType {
        dom: self.unknown,
        rng: self.unknown,
        injective: false,
        empty: false,
      });
    }
    let maps = self.collect_members(id, |k| match k {
      TypeKind::Map(m) => Some(*m),
      _ => None,
    });
    match maps.len() {
      0 => None,
      1 => Some(maps[0]),
      _ => {
        let live: Vec<&MapType> = maps.iter().filter(|m| !m.empty).collect();
        let dom = self.union(live.iter().map(|m| m.dom).collect());
        let rng = self.union(live.iter().map(|m| m.rng).collect());
        Some(MapType {
          dom,
          rng,
          injective: maps.iter().all(|m| m.injective),
          empty: live.is_empty(),
        })
      }
    }
  }

  /// The function view of a type. A union of functions with the same arity
  /// merges parameter types pairwise and unions results.
  pub fn as_function(&mut self, id: TypeId) -> Option<FunctionType> {
    let funcs = self.collect_members(id, |k| match k {
      TypeKind::Function(f) => Some(f.clone()),
      _ => None,
    });
    match funcs.len() {
      0 => None,
      1 => funcs.into_iter().next(),
      _ => {
        let arity = funcs[0].params.len();
        if funcs.iter().any(|f| f.params.len() != arity) {
          return None;
        }
        let params = (0..arity)
          .map(|i| funcs.iter().map(|f| f.params[i]).collect::<Vec<_>>())
          .collect::<Vec<_>>()
          .into_iter()
          .map(|ps| self.union(ps))
          .collect();
        let result = self.union(funcs.iter().map(|f| f.result).collect());
        Some(FunctionType {
          params,
          result,
          partial: funcs.iter().any(|f| f.partial),
          pure: funcs.iter().all(|f| f.pure),
          instantiated: None,
        })
      }
    }
  }

  pub fn as_operation(&mut self, id: TypeId) -> Option<OperationType> {
    let ops = self.collect_members(id, |k| match k {
      TypeKind::Operation(o) => Some(o.clone()),
      _ => None,
    });
    match ops.len() {
      0 => None,
      1 => ops.into_iter().next(),
      _ => {
        let arity = ops[0].params.len();
        if ops.iter().any(|o| o.params.len() != arity) {
          return None;
        }
        let params = (0..arity)
          .map(|i| ops.iter().map(|o| o.params[i]).collect::<Vec<_>>())
          .collect::<Vec<_>>()
          .into_iter()
          .map(|ps| self.union(ps))
          .collect();
        let result = self.union(ops.iter().map(|o| o.result).collect());
        Some(OperationType {
          params,
          result,
          pure: ops.iter().all(|o| o.pure),
        })
      }
    }
  }

  /// The product view of a type. Unions of products of the same size merge
  /// member-wise.
  pub fn as_product(&mut self, id: TypeId) -> Option<Vec<TypeId>> {
    let products = self.collect_members(id, |k| match k {
      TypeKind::Product(p) => Some(p.clone()),
      _ => None,
    });
    match products.len() {
      0 => None,
      1 => products.into_iter().next(),
      _ => {
        let size = products[0].len();
        if products.iter().any(|p| p.len() != size) {
          return None;
        }
        let columns: Vec<Vec<TypeId>> = (0..size)
          .map(|i| products.iter().map(|p| p[i]).collect())
          .collect();
        Some(columns.into_iter().map(|c| self.union(c)).collect())
      }
    }
  }

  /// Every record type the value may have.
  pub fn records(&self, id: TypeId) -> Vec<NamedId> {
    self.collect_members(id, |k| match k {
      TypeKind::Record(r) => Some(*r),
      _ => None,
    })
  }

  /// Every class the value may be an instance of.
  pub fn classes(&self, id: TypeId) -> Vec<ClassId> {
    self.collect_members(id, |k| match k {
      TypeKind::Class(c) => Some(*c),
      _ => None,
    })
  }

  /// Whether any named component of `id` is less visible than `visibility`,
  /// e.g. a private type in the signature of a public function.
  pub fn narrower_than(&self, id: TypeId, visibility: Visibility) -> bool {
    let mut seen = AHashSet::new();
    self.narrower_than_inner(id, visibility, &mut seen)
  }

  fn narrower_than_inner(
    &self,
    id: TypeId,
    visibility: Visibility,
    seen: &mut AHashSet<TypeId>,
  ) -> bool {
    if !seen.insert(id) {
      return false;
    }
    match self.get(id) {
      TypeKind::Named(n) | TypeKind::Record(n) => {
        let slot = self.named(*n);
        if slot.visibility < visibility {
          return true;
        }
        if slot
          .fields
          .iter()
          .any(|f| self.narrower_than_inner(f.ty, visibility, seen))
        {
          return true;
        }
        if let Some(u) = slot.underlying {
          return self.narrower_than_inner(u, visibility, seen);
        }
        false
      }
      TypeKind::Optional(inner) => self.narrower_than_inner(*inner, visibility, seen),
      TypeKind::Union(members) | TypeKind::Product(members) => members
        .iter()
        .any(|m| self.narrower_than_inner(*m, visibility, seen)),
      TypeKind::Function(f) => {
        f.params
          .iter()
          .any(|p| self.narrower_than_inner(*p, visibility, seen))
          || self.narrower_than_inner(f.result, visibility, seen)
      }
      TypeKind::Operation(o) => {
        o.params
          .iter()
          .any(|p| self.narrower_than_inner(*p, visibility, seen))
          || self.narrower_than_inner(o.result, visibility, seen)
      }
      TypeKind::Set(s) => self.narrower_than_inner(s.elem, visibility, seen),
      TypeKind::Seq(s) => self.narrower_than_inner(s.elem, visibility, seen),
      TypeKind::Map(m) => {
        self.narrower_than_inner(m.dom, visibility, seen)
          || self.narrower_than_inner(m.rng, visibility, seen)
      }
      _ => false,
    }
  }

  /// Replaces type parameters according to `bindings`.
  pub fn substitute(&mut self, id: TypeId, bindings: &AHashMap<String, TypeId>) -> TypeId {
    if bindings.is_empty() {
      return id;
    }
    let kind = self.get(id).clone();
    match kind {
      TypeKind::Parameter(name) => bindings.get(&name).copied().unwrap_or(id),
      TypeKind::Optional(inner) => {
        let inner = self.substitute(inner, bindings);
        self.optional(inner)
      }
      TypeKind::Union(members) => {
        let members = members
          .into_iter()
          .map(|m| self.substitute(m, bindings))
          .collect();
        self.union(members)
      }
      TypeKind::Product(members) => {
        let members = members
          .into_iter()
          .map(|m| self.substitute(m, bindings))
          .collect();
        self.product(members)
      }
      TypeKind::Function(mut f) => {
        f.params = f
          .params
          .into_iter()
          .map(|p| self.substitute(p, bindings))
          .collect();
        f.result = self.substitute(f.result, bindings);
        self.function(f)
      }
      TypeKind::Operation(mut o) => {
        o.params = o
          .params
          .into_iter()
          .map(|p| self.substitute(p, bindings))
          .collect();
        o.result = self.substitute(o.result, bindings);
        self.operation(o)
      }
      TypeKind::Set(mut s) => {
        s.elem = self.substitute(s.elem, bindings);
        self.intern(TypeKind::Set(s))
      }
      TypeKind::Seq(mut s) => {
        s.elem = self.substitute(s.elem, bindings);
        self.intern(TypeKind::Seq(s))
      }
      TypeKind::Map(mut m) => {
        m.dom = self.substitute(m.dom, bindings);
        m.rng = self.substitute(m.rng, bindings);
        self.intern(TypeKind::Map(m))
      }
      _ => id,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unions_flatten_and_dedupe() {
    let mut store = TypeStore::new();
    let nat = store.nat();
    let b = store.bool();
    let inner = store.union(vec![nat, b]);
    let outer = store.union(vec![b, inner, nat]);
    assert_eq!(inner, outer);
    assert_eq!(store.union(vec![nat, nat]), nat);
  }

  #[test]
  fn optional_members_lift_to_optional_union() {
    let mut store = TypeStore::new();
    let nat = store.nat();
    let nil = store.nil();
    let u = store.union(vec![nat, nil]);
    assert_eq!(u, store.optional(nat));
    let opt = store.optional(nat);
    assert_eq!(store.optional(opt), opt);
  }

  #[test]
  fn deref_guards_alias_cycles() {
    let mut store = TypeStore::new();
    let a = store.declare_named(TypeName::new("M", "A"), false, Visibility::Public);
    let b = store.declare_named(TypeName::new("M", "B"), false, Visibility::Public);
    let ta = store.named_type(a);
    let tb = store.named_type(b);
    store.define_named(a, tb);
    store.define_named(b, ta);
    assert!(store.is_unknown(ta));
  }

  #[test]
  fn union_of_sets_merges_elements() {
    let mut store = TypeStore::new();
    let nat = store.nat();
    let c = store.char();
    let sn = store.set(nat);
    let sc = store.set1(c);
    let u = store.union(vec![sn, sc]);
    let set = store.as_set(u).unwrap();
    assert_eq!(set.elem, store.union(vec![nat, c]));
    assert!(!set.non_empty);
    assert!(store.as_seq(u).is_none());
  }

  #[test]
  fn subclass_is_transitive() {
    let mut store = TypeStore::new();
    let a = store.declare_class("A");
    let b = store.declare_class("B");
    let c = store.declare_class("C");
    store.set_supers(b, vec![a]);
    store.set_supers(c, vec![b]);
    assert!(store.is_subclass(c, a));
    assert!(!store.is_subclass(a, c));
  }

  #[test]
  fn private_component_is_narrower() {
    let mut store = TypeStore::new();
    let hidden = store.declare_named(TypeName::new("C", "Hidden"), false, Visibility::Private);
    let nat = store.nat();
    store.define_named(hidden, nat);
    let th = store.named_type(hidden);
    let s = store.seq(th);
    assert!(store.narrower_than(s, Visibility::Public));
    assert!(!store.narrower_than(s, Visibility::Private));
  }

  #[test]
  fn record_field_of_private_type_is_narrower() {
    let mut store = TypeStore::new();
    let hidden = store.declare_named(TypeName::new("C", "Hidden"), false, Visibility::Private);
    let nat = store.nat();
    store.define_named(hidden, nat);
    let th = store.named_type(hidden);
    let rec = store.declare_named(TypeName::new("C", "Rec"), true, Visibility::Public);
    store.named_mut(rec).fields = vec![RecordField {
      tag: "h".to_string(),
      ty: th,
      equality_abstraction: false,
    }];
    let tr = store.named_type(rec);
    assert!(store.named(rec).underlying.is_none());
    assert!(store.narrower_than(tr, Visibility::Public));
    assert!(!store.narrower_than(tr, Visibility::Private));
  }
}
