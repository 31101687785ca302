use thiserror::Error;

use crate::op::Operation;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`Node::check_finite`](crate::Node::check_finite)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  /// A node evaluated to NaN or an infinity, e.g. `ln` of a non-positive
  /// value or division by zero
  #[error("non-finite value {value} produced by {operation}")]
  NonFiniteValue { operation: Operation, value: f64 },

  /// A node's forward gradient is NaN or an infinity
  #[error("non-finite forward gradient {gradient} produced by {operation}")]
  NonFiniteGradient { operation: Operation, gradient: f64 },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn message() {
    let err = Error::NonFiniteValue {
      operation: Operation::Ln,
      value: f64::NEG_INFINITY,
    };
    assert_eq!(err.to_string(), "non-finite value -inf produced by NLOG");
  }
}
