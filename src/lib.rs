//!
//! # auto-node
//!
//! Scalar automatic differentiation over a graph recorded at evaluation time.
//!
//! Every operation on a [`Node`] builds a new node that remembers its operands
//! and the rule that combined them. Derivatives are available two ways:
//!
//! - forward mode, [`Node::forward`]: the derivative with respect to whichever
//!   leaves were seeded through [`Node::with_gradient`], carried alongside the
//!   value as the graph is built
//! - reverse mode, [`Node::reverse`]: a pass from any node back over its
//!   ancestors, yielding [`Deltas`] holding the partial derivative of that node
//!   with respect to everything it depends on
//!
//! ```
//! use auto_node::Node;
//!
//! let x = Node::with_gradient(2.0, 1.0);
//! let y = Node::new(5.0);
//! let z = x.tan().cos().sin();
//!
//! let dz = z.reverse();
//! assert!((dz[&x] - z.forward()).abs() < 1e-9);
//! assert_eq!(dz[&y], 0.0);
//! ```
//!
//! Domain errors (`ln` of a non-positive value, division by zero, `tan` at a
//! pole) are not intercepted; they travel through values and derivatives as
//! NaN or infinities. [`Node::check_finite`] reports them after the fact.
//!

mod error;
mod node;
mod op;
mod reverse;

pub use error::{Error, Result};
pub use node::{Node, NodeId};
pub use op::Operation;
pub use reverse::{Deltas, Traversal};
