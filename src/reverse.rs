use std::fmt;
use std::ops::Index;

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

use crate::node::{Node, NodeId};

/// Strategy used to order a reverse pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
  /// Visit nodes in reverse topological order, so every node propagates once
  /// with its sensitivity fully accumulated
  #[default]
  Topological,
  /// Pop nodes off a stack, propagating the first time each is popped and
  /// pushing its parents every time.
  ///
  /// A node reached along paths of different depth may propagate before all
  /// of its contributions have arrived, so the result depends on pop order for
  /// diamond-shaped graphs. Kept for comparison only.
  Worklist,
}

impl Traversal {
  pub(crate) fn run(self, root: &Node) -> Deltas {
    debug!("reverse pass from {:?} using {:?}", root.id(), self);
    let deltas = match self {
      Traversal::Topological => topological_pass(root),
      Traversal::Worklist => worklist_pass(root),
    };
    debug!(
      "reverse pass from {:?} reached {} nodes",
      root.id(),
      deltas.len()
    );
    Deltas { deltas }
  }
}

/// Contributions a node pushes into each of its parents given its own
/// accumulated sensitivity
#[inline]
fn pullback(node: &Node, upstream: f64) -> SmallVec<[(NodeId, f64); 2]> {
  let op = node.operation();
  match node.parents() {
    [] => SmallVec::new(),
    [a] => smallvec![(a.id(), op.apply_a(a.value(), 0.0, upstream))],
    [a, b] => {
      let (va, vb) = (a.value(), b.value());
      smallvec![
        (a.id(), op.apply_a(va, vb, upstream)),
        (b.id(), op.apply_b(va, vb, upstream)),
      ]
    }
    _ => unreachable!("a node holds at most two parents"),
  }
}

#[inline]
fn accumulate(deltas: &mut FxHashMap<NodeId, f64>, node: &Node, upstream: f64) {
  for (parent, grad) in pullback(node, upstream) {
    trace!("{:?} -[{}]-> {:?}: {}", node.id(), node.operation(), parent, grad);
    *deltas.entry(parent).or_insert(0.0) += grad;
  }
}

fn topological_pass(root: &Node) -> FxHashMap<NodeId, f64> {
  let subgraph = topological_subgraph(root);
  let mut deltas = FxHashMap::with_capacity_and_hasher(subgraph.len(), Default::default());
  // seed dr/dr
  deltas.insert(root.id(), 1.0);

  // children come after their parents in postorder, so walking it backwards
  // reaches each node only after everything that feeds into it
  for node in subgraph.into_iter().rev() {
    let upstream = match deltas.get(&node.id()) {
      Some(v) => *v,
      None => continue,
    };
    accumulate(&mut deltas, node, upstream);
  }

  deltas
}

/// Topologically sort the subgraph behind `root`, parents before children
fn topological_subgraph(root: &Node) -> Vec<&Node> {
  let mut stack = Vec::with_capacity(64);
  let mut result = Vec::with_capacity(64);
  let mut visited = FxHashSet::default();

  stack.push((root, false));

  while let Some((node, parents_processed)) = stack.pop() {
    if parents_processed {
      // add to result in postorder
      result.push(node);
    } else if visited.insert(node.id()) {
      // marker to add node after its parents
      stack.push((node, true));
      // process parents[0] first, order matters for reproducible traces
      for parent in node.parents().iter().rev() {
        if !visited.contains(&parent.id()) {
          stack.push((parent, false));
        }
      }
    }
  }

  result
}

fn worklist_pass(root: &Node) -> FxHashMap<NodeId, f64> {
  let mut deltas = FxHashMap::default();
  deltas.insert(root.id(), 1.0);

  let mut stack = vec![root];
  let mut visited = FxHashSet::default();

  while let Some(node) = stack.pop() {
    if !visited.insert(node.id()) {
      continue;
    }
    let upstream = deltas.get(&node.id()).copied().unwrap_or(0.0);
    accumulate(&mut deltas, node, upstream);
    stack.extend(node.parents().iter());
  }

  deltas
}

/// Sensitivities of the root of one reverse pass with respect to every node
/// it reached
pub struct Deltas {
  deltas: FxHashMap<NodeId, f64>,
}

impl Deltas {
  /// The accumulated sensitivity of `node`, `None` if the pass never reached it
  pub fn get(&self, node: &Node) -> Option<f64> {
    self.deltas.get(&node.id()).copied()
  }

  /// The partial derivative of the root with respect to `node`; zero for nodes
  /// the root does not depend on
  pub fn reverse_gradient(&self, node: &Node) -> f64 {
    self.get(node).unwrap_or(0.0)
  }

  /// Number of nodes the pass reached, the root included
  pub fn len(&self) -> usize {
    self.deltas.len()
  }

  /// Always false, a pass reaches at least its root
  pub fn is_empty(&self) -> bool {
    self.deltas.is_empty()
  }
}

impl Index<&Node> for Deltas {
  type Output = f64;

  #[inline]
  fn index(&self, node: &Node) -> &Self::Output {
    self.deltas.get(&node.id()).unwrap_or(&0.0)
  }
}

impl fmt::Debug for Deltas {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Deltas")
      .field("count", &self.deltas.len())
      .finish()
  }
}
