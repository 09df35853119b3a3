//! Recursion analysis.
//!
//! The call graph is built from the free names of every function body
//! before any body is checked. Its strongly connected components are the
//! recursive cycles; after checking, every cycle is tested for measures.

use super::pattern::pattern_names;
use super::Checker;
use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::free_vars::free_variables;
use crate::name::Name;
use crate::name::NameScope;
use crate::options::Release;
use ahash::HashMap;
use diagnostics::Label;
use itertools::Itertools;
use tracing::debug;

/// Which functions each function body may call.
#[derive(Debug, Default)]
pub(crate) struct CallGraph {
  nodes: Vec<DefId>,
  index: HashMap<DefId, usize>,
  edges: Vec<Vec<usize>>,
}

impl CallGraph {
  fn node(&mut self, def: DefId) -> usize {
    if let Some(idx) = self.index.get(&def) {
      return *idx;
    }
    let idx = self.nodes.len();
    self.nodes.push(def);
    self.edges.push(Vec::new());
    self.index.insert(def, idx);
    idx
  }

  fn add_edge(&mut self, from: DefId, to: DefId) {
    let from = self.node(from);
    let to = self.node(to);
    if !self.edges[from].contains(&to) {
      self.edges[from].push(to);
    }
  }

  /// Recursive cycles: components of more than one function, and functions
  /// that call themselves.
  pub(crate) fn cycles(&self) -> Vec<Vec<DefId>> {
    strongly_connected(&self.edges)
      .into_iter()
      .filter(|c| c.len() > 1 || self.edges[c[0]].contains(&c[0]))
      .map(|c| c.into_iter().map(|i| self.nodes[i]).collect())
      .collect()
  }
}

/// Tarjan's algorithm. Components come out in reverse topological order.
pub(crate) fn strongly_connected(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
  struct State<'e> {
    edges: &'e [Vec<usize>],
    next: usize,
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
  }

  fn visit(s: &mut State, v: usize) {
    s.index[v] = Some(s.next);
    s.low[v] = s.next;
    s.next += 1;
    s.stack.push(v);
    s.on_stack[v] = true;
    for &w in &s.edges[v] {
      match s.index[w] {
        None => {
          visit(s, w);
          s.low[v] = s.low[v].min(s.low[w]);
        }
        Some(w_index) if s.on_stack[w] => s.low[v] = s.low[v].min(w_index),
        Some(_) => {}
      }
    }
    if Some(s.low[v]) == s.index[v] {
      let mut component = Vec::new();
      while let Some(w) = s.stack.pop() {
        s.on_stack[w] = false;
        component.push(w);
        if w == v {
          break;
        }
      }
      component.sort_unstable();
      s.components.push(component);
    }
  }

  let n = edges.len();
  let mut state = State {
    edges,
    next: 0,
    index: vec![None; n],
    low: vec![0; n],
    on_stack: vec![false; n],
    stack: Vec::new(),
    components: Vec::new(),
  };
  for v in 0..n {
    if state.index[v].is_none() {
      visit(&mut state, v);
    }
  }
  state.components
}

impl<'a> Checker<'a> {
  /// Builds the call graph of every module and class function, and marks
  /// the functions that take part in a cycle as recursive.
  pub(crate) fn build_call_graph(&mut self) -> CallGraph {
    let mut graph = CallGraph::default();
    let functions: Vec<DefId> = self
      .table
      .iter()
      .filter(|(_, def)| def.kind.function_info().is_some() && def.scope.contains(NameScope::GLOBAL))
      .map(|(id, _)| id)
      .collect();
    for id in functions {
      let def = self.table.get(id);
      let Some(body) = def.kind.function_body() else {
        continue;
      };
      let mut bound: Vec<String> = match &def.kind {
        DefKind::ExplicitFunction { decl, .. } => decl
          .params
          .iter()
          .flatten()
          .flat_map(pattern_names)
          .map(|(name, _)| name.to_string())
          .collect(),
        DefKind::ImplicitFunction { decl, .. } => decl
          .params
          .iter()
          .flat_map(|p| pattern_names(&p.stx.pattern))
          .map(|(name, _)| name.to_string())
          .collect(),
        _ => Vec::new(),
      };
      if let DefKind::ImplicitFunction { decl, .. } = &def.kind {
        bound.push(decl.result.stx.name.clone());
      }
      let env = self.container_env(id);
      let current = self.table.container_name(id);
      graph.node(id);
      for (module, name) in free_variables(body, &bound) {
        let lookup = Name::reference(&current, module.as_deref(), &name);
        for candidate in env.find_matches(&self.table, &lookup, NameScope::NAMES) {
          let target = self.table.origin(candidate);
          if self.table.get(target).kind.function_info().is_some() {
            graph.add_edge(id, target);
          }
        }
      }
    }
    for cycle in graph.cycles() {
      for member in cycle {
        if let Some(info) = self.table.get(member).kind.function_info() {
          info.recursive.set(true);
        }
      }
    }
    debug!(functions = graph.nodes.len(), "built call graph");
    graph
  }

  /// Reports recursive functions without measures, and cycles whose
  /// measures disagree.
  pub(crate) fn check_measures(&mut self, graph: &CallGraph) {
    for mut cycle in graph.cycles() {
      cycle.sort_by_key(|id| self.table.get(*id).span);
      if let [single] = cycle.as_slice() {
        self.require_measure(*single);
        continue;
      }
      let with_measure: Vec<DefId> = cycle
        .iter()
        .copied()
        .filter(|id| self.table.get(*id).kind.measure().is_some())
        .collect();
      if with_measure.is_empty() && self.options.release == Release::Vdm10 {
        self.report_unmeasured_cycle(&cycle);
      } else {
        for member in &cycle {
          self.require_measure(*member);
        }
      }
      self.check_cycle_measures(&cycle);
    }
  }

  fn require_measure(&mut self, function: DefId) {
    let def = self.table.get(function);
    if def.kind.measure().is_some() {
      return;
    }
    let d = codes::NO_MEASURE
      .at(def.span)
      .with_detail("Name", def.name.name.clone());
    self.report(d);
  }

  fn report_unmeasured_cycle(&mut self, cycle: &[DefId]) {
    let names = cycle
      .iter()
      .map(|id| self.table.get(*id).name.name.clone())
      .join(", ");
    let first = self.table.get(cycle[0]).span;
    let mut d = codes::NO_MEASURE_CYCLE.at(first).with_detail("Cycle", names);
    for other in &cycle[1..] {
      d = d.with_label(Label::secondary(self.table.get(*other).span, "also in the cycle"));
    }
    self.report(d);
  }

  /// Measures of one cycle must return types compatible both ways.
  fn check_cycle_measures(&mut self, cycle: &[DefId]) {
    let measured: Vec<_> = cycle
      .iter()
      .filter_map(|id| {
        let info = self.table.get(*id).kind.function_info()?;
        info.measure.get().map(|ty| (*id, ty))
      })
      .collect();
    let Some(&(_, expected)) = measured.first() else {
      return;
    };
    for &(member, actual) in &measured[1..] {
      if self.compatible(expected, actual) && self.compatible(actual, expected) {
        continue;
      }
      let mut d = codes::MEASURE_INCOMPATIBLE
        .at(self.table.get(member).span)
        .with_detail("Expected", self.display(expected))
        .with_detail("Actual", self.display(actual));
      for other in cycle.iter().filter(|o| **o != member) {
        d = d.with_label(Label::secondary(self.table.get(*other).span, "also in the cycle"));
      }
      self.report(d);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::strongly_connected;

  #[test]
  fn finds_cycles_and_singletons() {
    // 0 -> 1 -> 2 -> 0, 2 -> 3, 3 -> 3, 4
    let edges = vec![vec![1], vec![2], vec![0, 3], vec![3], vec![]];
    let mut components = strongly_connected(&edges);
    components.sort();
    assert_eq!(components, vec![vec![0, 1, 2], vec![3], vec![4]]);
  }

  #[test]
  fn callees_finish_before_callers() {
    let edges = vec![vec![1], vec![2], vec![]];
    let components = strongly_connected(&edges);
    assert_eq!(components, vec![vec![2], vec![1], vec![0]]);
  }
}
