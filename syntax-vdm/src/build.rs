//! Programmatic construction of syntax trees.
//!
//! Every node gets a fresh location that is strictly after all earlier ones,
//! so two nodes built by the same [`Builder`] never share a location.

use crate::ast::decl::Access;
use crate::ast::decl::ClassInvariantDecl;
use crate::ast::decl::Decl;
use crate::ast::decl::ExplicitFunctionDecl;
use crate::ast::decl::ExplicitOperationDecl;
use crate::ast::decl::FieldDecl;
use crate::ast::decl::FunctionBody;
use crate::ast::decl::ImplicitFunctionDecl;
use crate::ast::decl::ImplicitOperationDecl;
use crate::ast::decl::InstanceVariableDecl;
use crate::ast::decl::Measure;
use crate::ast::decl::MeasureName;
use crate::ast::decl::StateDecl;
use crate::ast::decl::TypeDecl;
use crate::ast::decl::TypeShape;
use crate::ast::decl::ValueDecl;
use crate::ast::expr::ApplyExpr;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CaseAlternative;
use crate::ast::expr::CasesExpr;
use crate::ast::expr::EnumExpr;
use crate::ast::expr::EqualsDef;
use crate::ast::expr::Expr;
use crate::ast::expr::FieldExpr;
use crate::ast::expr::IfExpr;
use crate::ast::expr::IsTypeExpr;
use crate::ast::expr::LambdaExpr;
use crate::ast::expr::LetDefExpr;
use crate::ast::expr::Literal;
use crate::ast::expr::LiteralExpr;
use crate::ast::expr::MapEnumExpr;
use crate::ast::expr::Maplet;
use crate::ast::expr::NewExpr;
use crate::ast::expr::QuantifierExpr;
use crate::ast::expr::RecordExpr;
use crate::ast::expr::SetCompExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::VariableExpr;
use crate::ast::item::ClassDecl;
use crate::ast::item::ClassRef;
use crate::ast::item::Exports;
use crate::ast::item::ImportFrom;
use crate::ast::item::ImportItems;
use crate::ast::item::Item;
use crate::ast::item::ModuleDecl;
use crate::ast::item::Program;
use crate::ast::item::SourceFile;
use crate::ast::node::Node;
use crate::ast::op::BinaryOp;
use crate::ast::op::UnaryOp;
use crate::ast::pat::BindSource;
use crate::ast::pat::IdPattern;
use crate::ast::pat::IdentTypePair;
use crate::ast::pat::MultipleBind;
use crate::ast::pat::Pattern;
use crate::ast::pat::PatternTypePair;
use crate::ast::stmt::AssignStmt;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::CallObjectStmt;
use crate::ast::stmt::CallStmt;
use crate::ast::stmt::DclStmt;
use crate::ast::stmt::ExitStmt;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::NameDesignator;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::StateDesignator;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::TixeStmt;
use crate::ast::stmt::TixeTrap;
use crate::ast::stmt::TrapStmt;
use crate::ast::type_expr::FunctionTypeExpr;
use crate::ast::type_expr::MapTypeExpr;
use crate::ast::type_expr::NamedTypeExpr;
use crate::ast::type_expr::OperationTypeExpr;
use crate::ast::type_expr::OptionalTypeExpr;
use crate::ast::type_expr::ProductTypeExpr;
use crate::ast::type_expr::QuoteTypeExpr;
use crate::ast::type_expr::SeqTypeExpr;
use crate::ast::type_expr::SetTypeExpr;
use crate::ast::type_expr::TypeExpr;
use crate::ast::type_expr::TypeParamExpr;
use crate::ast::type_expr::UnionTypeExpr;
use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use std::cell::Cell;

#[derive(Debug, Default)]
pub struct Builder {
  next: Cell<usize>,
}

impl Builder {
  pub fn new() -> Builder {
    Builder::default()
  }

  /// A fresh location after every location handed out so far.
  pub fn loc(&self) -> Loc {
    let start = self.next.get();
    self.next.set(start + 2);
    Loc(start, start + 1)
  }

  pub fn node<S: Drive + DriveMut>(&self, stx: S) -> Node<S> {
    Node::new(self.loc(), stx)
  }

  // Types.

  pub fn t_bool(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Bool)
  }

  pub fn t_nat(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Nat)
  }

  pub fn t_nat1(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Nat1)
  }

  pub fn t_int(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Int)
  }

  pub fn t_real(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Real)
  }

  pub fn t_char(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Char)
  }

  pub fn t_token(&self) -> Node<TypeExpr> {
    self.node(TypeExpr::Token)
  }

  pub fn t_quote(&self, value: &str) -> Node<TypeExpr> {
    self.node(TypeExpr::Quote(QuoteTypeExpr {
      value: value.to_string(),
    }))
  }

  pub fn t_named(&self, name: &str) -> Node<TypeExpr> {
    self.node(TypeExpr::Named(NamedTypeExpr {
      module: None,
      name: name.to_string(),
    }))
  }

  pub fn t_qualified(&self, module: &str, name: &str) -> Node<TypeExpr> {
    self.node(TypeExpr::Named(NamedTypeExpr {
      module: Some(module.to_string()),
      name: name.to_string(),
    }))
  }

  pub fn t_set(&self, elem: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Set(SetTypeExpr {
      elem,
      non_empty: false,
    }))
  }

  pub fn t_set1(&self, elem: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Set(SetTypeExpr {
      elem,
      non_empty: true,
    }))
  }

  pub fn t_seq(&self, elem: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Seq(SeqTypeExpr {
      elem,
      non_empty: false,
    }))
  }

  pub fn t_seq1(&self, elem: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Seq(SeqTypeExpr {
      elem,
      non_empty: true,
    }))
  }

  pub fn t_map(&self, dom: Node<TypeExpr>, rng: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Map(MapTypeExpr {
      dom,
      rng,
      injective: false,
    }))
  }

  pub fn t_inmap(&self, dom: Node<TypeExpr>, rng: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Map(MapTypeExpr {
      dom,
      rng,
      injective: true,
    }))
  }

  pub fn t_product(&self, members: Vec<Node<TypeExpr>>) -> Node<TypeExpr> {
    self.node(TypeExpr::Product(ProductTypeExpr { members }))
  }

  pub fn t_union(&self, members: Vec<Node<TypeExpr>>) -> Node<TypeExpr> {
    self.node(TypeExpr::Union(UnionTypeExpr { members }))
  }

  pub fn t_optional(&self, inner: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Optional(OptionalTypeExpr { inner }))
  }

  /// Total function type `params +> result`.
  pub fn t_fn(&self, params: Vec<Node<TypeExpr>>, result: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Function(FunctionTypeExpr {
      params,
      result,
      partial: false,
    }))
  }

  /// Partial function type `params -> result`.
  pub fn t_pfn(&self, params: Vec<Node<TypeExpr>>, result: Node<TypeExpr>) -> Node<TypeExpr> {
    self.node(TypeExpr::Function(FunctionTypeExpr {
      params,
      result,
      partial: true,
    }))
  }

  pub fn t_op(&self, params: Vec<Node<TypeExpr>>, result: Option<Node<TypeExpr>>) -> Node<TypeExpr> {
    self.node(TypeExpr::Operation(OperationTypeExpr { params, result }))
  }

  pub fn t_param(&self, name: &str) -> Node<TypeExpr> {
    self.node(TypeExpr::Parameter(TypeParamExpr {
      name: name.to_string(),
    }))
  }

  // Expressions.

  pub fn lit(&self, value: Literal) -> Node<Expr> {
    self.node(Expr::Literal(LiteralExpr { value }))
  }

  pub fn nat(&self, value: u64) -> Node<Expr> {
    self.lit(Literal::Nat(value))
  }

  pub fn real(&self, value: f64) -> Node<Expr> {
    self.lit(Literal::Real(value))
  }

  pub fn boolean(&self, value: bool) -> Node<Expr> {
    self.lit(Literal::Bool(value))
  }

  pub fn char(&self, value: char) -> Node<Expr> {
    self.lit(Literal::Char(value))
  }

  pub fn string(&self, value: &str) -> Node<Expr> {
    self.lit(Literal::Str(value.to_string()))
  }

  pub fn quote(&self, value: &str) -> Node<Expr> {
    self.lit(Literal::Quote(value.to_string()))
  }

  pub fn nil(&self) -> Node<Expr> {
    self.lit(Literal::Nil)
  }

  pub fn var(&self, name: &str) -> Node<Expr> {
    self.node(Expr::Variable(VariableExpr {
      module: None,
      name: name.to_string(),
      old: false,
    }))
  }

  pub fn qvar(&self, module: &str, name: &str) -> Node<Expr> {
    self.node(Expr::Variable(VariableExpr {
      module: Some(module.to_string()),
      name: name.to_string(),
      old: false,
    }))
  }

  /// `name~`
  pub fn old(&self, name: &str) -> Node<Expr> {
    self.node(Expr::Variable(VariableExpr {
      module: None,
      name: name.to_string(),
      old: true,
    }))
  }

  pub fn self_ref(&self) -> Node<Expr> {
    self.node(Expr::SelfRef)
  }

  pub fn apply(&self, root: Node<Expr>, args: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::Apply(ApplyExpr { root, args }))
  }

  /// `name(args)`
  pub fn call(&self, name: &str, args: Vec<Node<Expr>>) -> Node<Expr> {
    let root = self.var(name);
    self.apply(root, args)
  }

  pub fn field(&self, object: Node<Expr>, field: &str) -> Node<Expr> {
    self.node(Expr::Field(FieldExpr {
      object,
      field: field.to_string(),
    }))
  }

  pub fn unary(&self, op: UnaryOp, operand: Node<Expr>) -> Node<Expr> {
    self.node(Expr::Unary(UnaryExpr { op, operand }))
  }

  pub fn binary(&self, op: BinaryOp, left: Node<Expr>, right: Node<Expr>) -> Node<Expr> {
    self.node(Expr::Binary(BinaryExpr { op, left, right }))
  }

  pub fn if_expr(&self, test: Node<Expr>, consequent: Node<Expr>, alternate: Node<Expr>) -> Node<Expr> {
    self.node(Expr::If(IfExpr {
      test,
      consequent,
      elseifs: Vec::new(),
      alternate,
    }))
  }

  pub fn cases(
    &self,
    subject: Node<Expr>,
    alternatives: Vec<(Vec<Node<Pattern>>, Node<Expr>)>,
    others: Option<Node<Expr>>,
  ) -> Node<Expr> {
    let alternatives = alternatives
      .into_iter()
      .map(|(patterns, result)| self.node(CaseAlternative { patterns, result }))
      .collect();
    self.node(Expr::Cases(CasesExpr {
      subject,
      alternatives,
      others,
    }))
  }

  pub fn let_in(&self, defs: Vec<Node<Decl>>, body: Node<Expr>) -> Node<Expr> {
    self.node(Expr::LetDef(LetDefExpr { defs, body }))
  }

  pub fn equals_def(&self, pattern: Node<Pattern>, value: Node<Expr>) -> Node<EqualsDef> {
    self.node(EqualsDef {
      pattern,
      ty: None,
      value,
    })
  }

  pub fn forall(&self, binds: Vec<Node<MultipleBind>>, predicate: Node<Expr>) -> Node<Expr> {
    self.node(Expr::Forall(QuantifierExpr { binds, predicate }))
  }

  pub fn exists(&self, binds: Vec<Node<MultipleBind>>, predicate: Node<Expr>) -> Node<Expr> {
    self.node(Expr::Exists(QuantifierExpr { binds, predicate }))
  }

  pub fn lambda(&self, params: Vec<(&str, Node<TypeExpr>)>, body: Node<Expr>) -> Node<Expr> {
    let params = params
      .into_iter()
      .map(|(name, ty)| {
        let pattern = self.pid(name);
        self.node(PatternTypePair { pattern, ty })
      })
      .collect();
    self.node(Expr::Lambda(LambdaExpr { params, body }))
  }

  pub fn set_enum(&self, members: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::SetEnum(EnumExpr { members }))
  }

  pub fn seq_enum(&self, members: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::SeqEnum(EnumExpr { members }))
  }

  pub fn tuple(&self, members: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::Tuple(EnumExpr { members }))
  }

  pub fn map_enum(&self, maplets: Vec<(Node<Expr>, Node<Expr>)>) -> Node<Expr> {
    let maplets = maplets
      .into_iter()
      .map(|(from, to)| self.node(Maplet { from, to }))
      .collect();
    self.node(Expr::MapEnum(MapEnumExpr { maplets }))
  }

  pub fn set_comp(
    &self,
    element: Node<Expr>,
    binds: Vec<Node<MultipleBind>>,
    predicate: Option<Node<Expr>>,
  ) -> Node<Expr> {
    self.node(Expr::SetComp(SetCompExpr {
      element,
      binds,
      predicate,
    }))
  }

  /// `mk_name(args)`
  pub fn mk(&self, name: &str, args: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::Record(RecordExpr {
      module: None,
      name: name.to_string(),
      args,
    }))
  }

  pub fn is_type(&self, test_type: Node<TypeExpr>, operand: Node<Expr>) -> Node<Expr> {
    self.node(Expr::IsType(IsTypeExpr { test_type, operand }))
  }

  pub fn new_obj(&self, class: &str, args: Vec<Node<Expr>>) -> Node<Expr> {
    self.node(Expr::New(NewExpr {
      class: class.to_string(),
      args,
    }))
  }

  // Patterns and binds.

  pub fn pid(&self, name: &str) -> Node<Pattern> {
    self.node(Pattern::Identifier(IdPattern {
      name: name.to_string(),
    }))
  }

  pub fn pignore(&self) -> Node<Pattern> {
    self.node(Pattern::Ignore)
  }

  pub fn set_bind(&self, names: &[&str], set: Node<Expr>) -> Node<MultipleBind> {
    let patterns = names.iter().map(|n| self.pid(n)).collect();
    self.node(MultipleBind {
      patterns,
      source: BindSource::Set(set),
    })
  }

  pub fn type_bind(&self, names: &[&str], ty: Node<TypeExpr>) -> Node<MultipleBind> {
    let patterns = names.iter().map(|n| self.pid(n)).collect();
    self.node(MultipleBind {
      patterns,
      source: BindSource::Type(ty),
    })
  }

  // Statements.

  pub fn assign(&self, name: &str, value: Node<Expr>) -> Node<Stmt> {
    let target = self.node(StateDesignator::Name(NameDesignator {
      module: None,
      name: name.to_string(),
    }));
    self.node(Stmt::Assign(AssignStmt { target, value }))
  }

  pub fn dcl(&self, name: &str, ty: Node<TypeExpr>, init: Option<Node<Expr>>) -> Node<DclStmt> {
    self.node(DclStmt {
      name: name.to_string(),
      ty,
      init,
    })
  }

  pub fn block(&self, dcls: Vec<Node<DclStmt>>, stmts: Vec<Node<Stmt>>) -> Node<Stmt> {
    self.node(Stmt::Block(BlockStmt { dcls, stmts }))
  }

  pub fn ret(&self, value: Option<Node<Expr>>) -> Node<Stmt> {
    self.node(Stmt::Return(ReturnStmt { value }))
  }

  pub fn call_stmt(&self, name: &str, args: Vec<Node<Expr>>) -> Node<Stmt> {
    self.node(Stmt::Call(CallStmt {
      module: None,
      name: name.to_string(),
      args,
    }))
  }

  pub fn call_object(&self, object: Node<Expr>, field: &str, args: Vec<Node<Expr>>) -> Node<Stmt> {
    self.node(Stmt::CallObject(CallObjectStmt {
      object,
      field: field.to_string(),
      args,
    }))
  }

  pub fn if_stmt(
    &self,
    test: Node<Expr>,
    consequent: Node<Stmt>,
    alternate: Option<Node<Stmt>>,
  ) -> Node<Stmt> {
    self.node(Stmt::If(IfStmt {
      test,
      consequent,
      elseifs: Vec::new(),
      alternate,
    }))
  }

  pub fn exit(&self, value: Option<Node<Expr>>) -> Node<Stmt> {
    self.node(Stmt::Exit(ExitStmt { value }))
  }

  pub fn trap(&self, pattern: Node<Pattern>, handler: Node<Stmt>, body: Node<Stmt>) -> Node<Stmt> {
    self.node(Stmt::Trap(TrapStmt {
      pattern,
      handler,
      body,
    }))
  }

  pub fn tixe(&self, traps: Vec<(Node<Pattern>, Node<Stmt>)>, body: Node<Stmt>) -> Node<Stmt> {
    let traps = traps
      .into_iter()
      .map(|(pattern, handler)| self.node(TixeTrap { pattern, handler }))
      .collect();
    self.node(Stmt::Tixe(TixeStmt { traps, body }))
  }

  pub fn skip(&self) -> Node<Stmt> {
    self.node(Stmt::Skip)
  }

  // Definitions.

  pub fn decl(&self, decl: Decl) -> Node<Decl> {
    self.node(decl)
  }

  pub fn type_alias(&self, name: &str, ty: Node<TypeExpr>) -> TypeDecl {
    TypeDecl {
      access: Access::default(),
      name: name.to_string(),
      shape: TypeShape::Alias(ty),
      inv: None,
      eq: None,
      ord: None,
    }
  }

  pub fn field_decl(&self, tag: &str, ty: Node<TypeExpr>) -> Node<FieldDecl> {
    self.node(FieldDecl {
      tag: Some(tag.to_string()),
      ty,
      equality_abstraction: false,
    })
  }

  pub fn record(&self, name: &str, fields: Vec<(&str, Node<TypeExpr>)>) -> TypeDecl {
    let fields = fields
      .into_iter()
      .map(|(tag, ty)| self.field_decl(tag, ty))
      .collect();
    TypeDecl {
      access: Access::default(),
      name: name.to_string(),
      shape: TypeShape::Record(fields),
      inv: None,
      eq: None,
      ord: None,
    }
  }

  pub fn value(&self, name: &str, ty: Option<Node<TypeExpr>>, value: Node<Expr>) -> ValueDecl {
    ValueDecl {
      access: Access::default(),
      pattern: self.pid(name),
      ty,
      value,
    }
  }

  /// An explicit function with a single, uncurried parameter list.
  pub fn function(
    &self,
    name: &str,
    ty: Node<TypeExpr>,
    params: &[&str],
    body: Node<Expr>,
  ) -> ExplicitFunctionDecl {
    ExplicitFunctionDecl {
      access: Access::default(),
      name: name.to_string(),
      type_params: Vec::new(),
      ty,
      params: vec![params.iter().map(|p| self.pid(p)).collect()],
      body: FunctionBody::Expr(body),
      pre: None,
      post: None,
      measure: None,
    }
  }

  pub fn measure_name(&self, name: &str) -> Measure {
    self
      .node(MeasureName {
        name: name.to_string(),
      })
      .into()
  }

  pub fn implicit_function(
    &self,
    name: &str,
    params: Vec<(&str, Node<TypeExpr>)>,
    result: (&str, Node<TypeExpr>),
    post: Node<Expr>,
  ) -> ImplicitFunctionDecl {
    let params = params
      .into_iter()
      .map(|(n, ty)| {
        let pattern = self.pid(n);
        self.node(PatternTypePair { pattern, ty })
      })
      .collect();
    let result = self.node(IdentTypePair {
      name: result.0.to_string(),
      ty: result.1,
    });
    ImplicitFunctionDecl {
      access: Access::default(),
      name: name.to_string(),
      type_params: Vec::new(),
      params,
      result,
      body: None,
      pre: None,
      post: Some(post),
      measure: None,
    }
  }

  pub fn operation(
    &self,
    name: &str,
    ty: Node<TypeExpr>,
    params: &[&str],
    body: Node<Stmt>,
  ) -> ExplicitOperationDecl {
    ExplicitOperationDecl {
      access: Access::default(),
      name: name.to_string(),
      ty,
      params: params.iter().map(|p| self.pid(p)).collect(),
      body,
      pre: None,
      post: None,
    }
  }

  pub fn implicit_operation(
    &self,
    name: &str,
    params: Vec<(&str, Node<TypeExpr>)>,
    result: Option<(&str, Node<TypeExpr>)>,
  ) -> ImplicitOperationDecl {
    let params = params
      .into_iter()
      .map(|(n, ty)| {
        let pattern = self.pid(n);
        self.node(PatternTypePair { pattern, ty })
      })
      .collect();
    let result = result.map(|(n, ty)| {
      self.node(IdentTypePair {
        name: n.to_string(),
        ty,
      })
    });
    ImplicitOperationDecl {
      access: Access::default(),
      name: name.to_string(),
      params,
      result,
      externals: Vec::new(),
      body: None,
      pre: None,
      post: None,
      errors: Vec::new(),
    }
  }

  pub fn instance_variable(
    &self,
    name: &str,
    ty: Node<TypeExpr>,
    init: Option<Node<Expr>>,
  ) -> InstanceVariableDecl {
    InstanceVariableDecl {
      access: Access::default(),
      name: name.to_string(),
      ty,
      init,
    }
  }

  pub fn state(&self, name: &str, fields: Vec<(&str, Node<TypeExpr>)>) -> StateDecl {
    let fields = fields
      .into_iter()
      .map(|(tag, ty)| self.field_decl(tag, ty))
      .collect();
    StateDecl {
      name: name.to_string(),
      fields,
      inv: None,
      init: None,
    }
  }

  pub fn class_invariant(&self, predicate: Node<Expr>) -> Node<Decl> {
    self.decl(Decl::ClassInvariant(ClassInvariantDecl { predicate }))
  }

  // Items.

  pub fn class(&self, name: &str, supers: &[&str], decls: Vec<Node<Decl>>) -> Node<Item> {
    let supers = supers
      .iter()
      .map(|s| {
        self.node(ClassRef {
          name: s.to_string(),
        })
      })
      .collect();
    self.node(
      ClassDecl {
        name: name.to_string(),
        supers,
        decls,
        is_system: false,
      }
      .into(),
    )
  }

  pub fn module(
    &self,
    name: &str,
    imports: Vec<Node<ImportFrom>>,
    decls: Vec<Node<Decl>>,
  ) -> Node<Item> {
    self.node(
      ModuleDecl {
        name: name.to_string(),
        imports,
        exports: Exports::All,
        decls,
      }
      .into(),
    )
  }

  pub fn import_all(&self, module: &str) -> Node<ImportFrom> {
    self.node(ImportFrom {
      module: module.to_string(),
      items: ImportItems::All,
    })
  }

  /// Wraps loose definitions as items of the flat `DEFAULT` module.
  pub fn flat(&self, decls: Vec<Node<Decl>>) -> Vec<Node<Item>> {
    decls
      .into_iter()
      .map(|d| d.wrap(Item::from))
      .collect()
  }

  pub fn file(&self, id: u32, name: &str, items: Vec<Node<Item>>) -> SourceFile {
    SourceFile {
      id,
      name: name.to_string(),
      items,
    }
  }

  /// A program of one file.
  pub fn program(&self, items: Vec<Node<Item>>) -> Program {
    Program {
      files: vec![self.file(0, "test.vdm", items)],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Builder;
  use crate::ast::expr::Expr;
  use crate::ast::item::Item;

  #[test]
  fn locations_strictly_increase() {
    let b = Builder::new();
    let first = b.nat(1);
    let second = b.nat(1);
    assert!(first.loc.1 <= second.loc.0);
    assert_ne!(first.loc, second.loc);
  }

  #[test]
  fn call_wraps_variable_root() {
    let b = Builder::new();
    let call = b.call("f", vec![b.nat(1)]);
    match &*call.stx {
      Expr::Apply(apply) => {
        assert!(matches!(&*apply.root.stx, Expr::Variable(v) if v.name == "f"));
        assert_eq!(apply.args.len(), 1);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn flat_decls_keep_their_locations() {
    let b = Builder::new();
    let value = b.value("x", None, b.nat(1));
    let decl = b.decl(syntax_decl(value));
    let loc = decl.loc;
    let items = b.flat(vec![decl]);
    assert_eq!(items[0].loc, loc);
    assert!(matches!(&*items[0].stx, Item::Decl(d) if d.loc == loc));
  }

  fn syntax_decl(value: crate::ast::decl::ValueDecl) -> crate::ast::decl::Decl {
    crate::ast::decl::Decl::Value(value)
  }
}
