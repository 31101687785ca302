use std::fmt;

/// Tag recording which rule produced a node from its parents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  /// User-created input, no parents
  Leaf,
  Add,
  Sub,
  Mul,
  Div,
  Exp,
  /// Natural logarithm
  Ln,
  Sin,
  Cos,
  Tan,
}

impl Operation {
  /// Number of parents a node tagged with this operation holds
  #[inline]
  pub fn arity(self) -> usize {
    match self {
      Operation::Leaf => 0,
      Operation::Exp | Operation::Ln | Operation::Sin | Operation::Cos | Operation::Tan => 1,
      Operation::Add | Operation::Sub | Operation::Mul | Operation::Div => 2,
    }
  }

  #[inline]
  pub fn is_unary(self) -> bool {
    self.arity() == 1
  }

  #[inline]
  pub fn is_binary(self) -> bool {
    self.arity() == 2
  }

  /// Evaluate the operation on parent values; `b` is ignored by unary ops
  #[inline]
  pub(crate) fn eval(self, a: f64, b: f64) -> f64 {
    match self {
      // leaves are never built through eval
      Operation::Leaf => a,
      Operation::Add => a + b,
      Operation::Sub => a - b,
      Operation::Mul => a * b,
      Operation::Div => a / b,
      Operation::Exp => a.exp(),
      Operation::Ln => a.ln(),
      Operation::Sin => a.sin(),
      Operation::Cos => a.cos(),
      Operation::Tan => a.tan(),
    }
  }

  /// Forward-mode chain rule: the tangent of the output given parent values
  /// `a`, `b` and their tangents `da`, `db`
  #[inline]
  pub(crate) fn tangent(self, a: f64, da: f64, b: f64, db: f64) -> f64 {
    match self {
      // leaves carry their seed, never built through tangent
      Operation::Leaf => da,
      Operation::Add => da + db,
      Operation::Sub => da - db,
      Operation::Mul => da * b + db * a,
      Operation::Div => (da * b - db * a) / (b * b),
      Operation::Exp => a.exp() * da,
      Operation::Ln => da / a,
      Operation::Sin => a.cos() * da,
      Operation::Cos => -a.sin() * da,
      Operation::Tan => da / (a.cos() * a.cos()),
    }
  }

  /// Pullback onto the first operand: the contribution `upstream` pushes into
  /// `parents[0]`
  #[inline]
  pub(crate) fn apply_a(self, a: f64, b: f64, upstream: f64) -> f64 {
    match self {
      Operation::Leaf => 0.0,
      Operation::Add => upstream,
      Operation::Sub => upstream,
      Operation::Mul => upstream * b,
      Operation::Div => upstream / b,
      Operation::Exp => upstream * a.exp(),
      Operation::Ln => upstream / a,
      Operation::Sin => upstream * a.cos(),
      Operation::Cos => -upstream * a.sin(),
      Operation::Tan => upstream / (a.cos() * a.cos()),
    }
  }

  /// Pullback onto the second operand, `parents[1]`
  #[inline]
  pub(crate) fn apply_b(self, a: f64, b: f64, upstream: f64) -> f64 {
    match self {
      Operation::Add => upstream,
      Operation::Sub => -upstream,
      Operation::Mul => upstream * a,
      Operation::Div => upstream * a * -1.0 / (b * b),
      // unary operations never have a b branch
      Operation::Leaf
      | Operation::Exp
      | Operation::Ln
      | Operation::Sin
      | Operation::Cos
      | Operation::Tan => 0.0,
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tag = match self {
      Operation::Leaf => "NONE",
      Operation::Add => "ADD",
      Operation::Sub => "SUB",
      Operation::Mul => "MUL",
      Operation::Div => "DIV",
      Operation::Exp => "EXP",
      Operation::Ln => "NLOG",
      Operation::Sin => "SIN",
      Operation::Cos => "COS",
      Operation::Tan => "TAN",
    };
    f.write_str(tag)
  }
}
