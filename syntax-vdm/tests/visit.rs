use derive_visitor::Drive;
use derive_visitor::Visitor;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::expr::VariableExpr;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::build::Builder;

#[derive(Default, Visitor)]
#[visitor(VariableExpr(enter))]
struct VariableCollector {
  names: Vec<String>,
}

impl VariableCollector {
  fn enter_variable_expr(&mut self, node: &VariableExpr) {
    self.names.push(node.name.clone());
  }
}

#[test]
fn visitor_reaches_variables_inside_function_bodies() {
  let b = Builder::new();
  let body = b.binary(
    BinaryOp::Add,
    b.call("g", vec![b.var("n")]),
    b.if_expr(b.boolean(true), b.var("m"), b.nat(0)),
  );
  let f = b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], body);
  let program = b.program(b.flat(vec![b.decl(Decl::ExplicitFunction(f))]));

  let mut collector = VariableCollector::default();
  program.drive(&mut collector);
  assert_eq!(collector.names, vec!["g", "n", "m"]);
}

#[test]
fn nodes_serialize_as_their_syntax() {
  let b = Builder::new();
  let expr = b.binary(BinaryOp::Add, b.nat(1), b.var("x"));
  let json = serde_json::to_value(&expr).unwrap();
  assert_eq!(json["Binary"]["op"], "Add");
  assert_eq!(json["Binary"]["left"]["Literal"]["value"]["Nat"], 1);
  assert_eq!(json["Binary"]["right"]["Variable"]["name"], "x");
}
