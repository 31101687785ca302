use std::fmt;
use std::mem;
use std::ops::{Add, Div, Mul, Sub};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;
use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};
use crate::op::Operation;
use crate::reverse::{Deltas, Traversal};

/// Atomic so ids stay unique across threads, even though a graph itself never
/// leaves the thread that built it
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a node; two nodes holding equal values are
/// still distinct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
  #[inline]
  fn next() -> Self {
    Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
  }
}

struct NodeInner {
  id: NodeId,
  value: f64,
  operation: Operation,
  parents: SmallVec<[Node; 2]>,
  forward_gradient: f64,
}

impl Drop for NodeInner {
  fn drop(&mut self) {
    // release ancestors with an explicit stack, dropping a long chain through
    // nested Rc drops would recurse once per level
    let mut stack: Vec<Node> = mem::take(&mut self.parents).into_vec();
    while let Some(node) = stack.pop() {
      if let Ok(mut inner) = Rc::try_unwrap(node.0) {
        stack.extend(mem::take(&mut inner.parents));
      }
    }
  }
}

/// A value in the computational graph.
///
/// A `Node` is a cheap, shared handle; cloning it clones the reference, not
/// the subgraph. Nodes are immutable once created, so the graph only ever
/// grows by building new nodes on top of existing ones, which keeps it acyclic.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
  /// Create a leaf with a zero seed gradient
  #[inline]
  pub fn new(value: f64) -> Self {
    Self::with_gradient(value, 0.0)
  }

  /// Create a leaf seeded with `gradient`, marking it as the variable of
  /// differentiation for forward mode
  #[inline]
  pub fn with_gradient(value: f64, gradient: f64) -> Self {
    Self(Rc::new(NodeInner {
      id: NodeId::next(),
      value,
      operation: Operation::Leaf,
      parents: SmallVec::new(),
      forward_gradient: gradient,
    }))
  }

  #[inline]
  fn unary(&self, operation: Operation) -> Self {
    debug_assert!(operation.is_unary());
    let a = self.value();
    let da = self.forward();
    Self(Rc::new(NodeInner {
      id: NodeId::next(),
      value: operation.eval(a, 0.0),
      operation,
      parents: smallvec![self.clone()],
      forward_gradient: operation.tangent(a, da, 0.0, 0.0),
    }))
  }

  #[inline]
  fn binary(&self, other: &Self, operation: Operation) -> Self {
    debug_assert!(operation.is_binary());
    let (a, da) = (self.value(), self.forward());
    let (b, db) = (other.value(), other.forward());
    Self(Rc::new(NodeInner {
      id: NodeId::next(),
      value: operation.eval(a, b),
      operation,
      parents: smallvec![self.clone(), other.clone()],
      forward_gradient: operation.tangent(a, da, b, db),
    }))
  }

  #[inline]
  pub fn id(&self) -> NodeId {
    self.0.id
  }

  #[inline]
  pub fn value(&self) -> f64 {
    self.0.value
  }

  #[inline]
  pub fn operation(&self) -> Operation {
    self.0.operation
  }

  /// Operands in the order they were combined; order matters for `-` and `/`
  #[inline]
  pub fn parents(&self) -> &[Node] {
    &self.0.parents
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.0.parents.is_empty()
  }

  /// Forward mode: the derivative with respect to the seeded leaves, computed
  /// when this node was built
  #[inline]
  pub fn forward(&self) -> f64 {
    self.0.forward_gradient
  }

  /// Reverse mode rooted at this node, using the default traversal
  pub fn reverse(&self) -> Deltas {
    self.reverse_with(Traversal::default())
  }

  pub fn reverse_with(&self, traversal: Traversal) -> Deltas {
    traversal.run(self)
  }

  #[inline]
  pub fn exp(&self) -> Self {
    self.unary(Operation::Exp)
  }

  /// Natural logarithm; a non-positive value yields NaN or -inf
  #[inline]
  pub fn ln(&self) -> Self {
    self.unary(Operation::Ln)
  }

  #[inline]
  pub fn sin(&self) -> Self {
    self.unary(Operation::Sin)
  }

  #[inline]
  pub fn cos(&self) -> Self {
    self.unary(Operation::Cos)
  }

  /// Tangent; the derivative is taken as `1 / cos(v)^2`
  #[inline]
  pub fn tan(&self) -> Self {
    self.unary(Operation::Tan)
  }

  /// Every ancestor in recursive pre-order, parents[0] subtree first.
  ///
  /// Nodes reachable along several paths appear once per path.
  pub fn lineage(&self) -> Vec<Node> {
    let mut result = Vec::new();
    let mut stack: Vec<&Node> = self.parents().iter().rev().collect();
    while let Some(node) = stack.pop() {
      result.push(node.clone());
      stack.extend(node.parents().iter().rev());
    }
    result
  }

  /// Log the debug representation of every ancestor at info level
  pub fn log_lineage(&self) {
    for node in self.lineage() {
      info!("{:?}", node);
    }
  }

  /// Walk this node and its ancestors and report the first one whose value or
  /// forward gradient is NaN or infinite.
  ///
  /// Construction never checks this itself; domain errors travel through the
  /// graph as IEEE values until asked for.
  pub fn check_finite(&self) -> Result<()> {
    let mut stack = vec![self];
    let mut visited = FxHashSet::default();
    while let Some(node) = stack.pop() {
      if !visited.insert(node.id()) {
        continue;
      }
      if !node.value().is_finite() {
        return Err(Error::NonFiniteValue {
          operation: node.operation(),
          value: node.value(),
        });
      }
      if !node.forward().is_finite() {
        return Err(Error::NonFiniteGradient {
          operation: node.operation(),
          gradient: node.forward(),
        });
      }
      stack.extend(node.parents().iter());
    }
    Ok(())
  }
}

impl PartialEq for Node {
  fn eq(&self, other: &Self) -> bool {
    self.id() == other.id()
  }
}

impl Eq for Node {}

impl fmt::Display for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Node(value={})", self.value())
  }
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parents: SmallVec<[f64; 2]> = self.parents().iter().map(Node::value).collect();
    write!(
      f,
      "Node(value={}, operation={}, gradient={}, parents={:?})",
      self.value(),
      self.operation(),
      self.forward(),
      parents.as_slice()
    )
  }
}

// Each operator is provided for every borrowed/owned pairing, the owned forms
// forward to the borrowed one
macro_rules! binary_op {
  ($trait:ident, $method:ident, $variant:ident) => {
    impl $trait for &Node {
      type Output = Node;

      #[inline]
      fn $method(self, other: Self) -> Self::Output {
        self.binary(other, Operation::$variant)
      }
    }

    impl $trait<Node> for &Node {
      type Output = Node;

      #[inline(always)]
      fn $method(self, other: Node) -> Self::Output {
        self.$method(&other)
      }
    }

    impl $trait for Node {
      type Output = Node;

      #[inline(always)]
      fn $method(self, other: Self) -> Self::Output {
        (&self).$method(&other)
      }
    }

    impl $trait<&Node> for Node {
      type Output = Node;

      #[inline(always)]
      fn $method(self, other: &Node) -> Self::Output {
        (&self).$method(other)
      }
    }
  };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);
