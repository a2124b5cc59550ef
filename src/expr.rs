use crate::ast::{ArithOp, CmpOp};
use crate::builder::{CaseBuilder, ExprBuilder};
use crate::error::FormulaError;
use crate::lexer::Number;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl BinaryOp {
    /// SQL spelling of the operator.
    pub fn sql(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
        }
    }

    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }
}

impl From<ArithOp> for BinaryOp {
    fn from(op: ArithOp) -> Self {
        match op {
            ArithOp::Add => BinaryOp::Add,
            ArithOp::Sub => BinaryOp::Sub,
            ArithOp::Mul => BinaryOp::Mul,
            ArithOp::Div => BinaryOp::Div,
        }
    }
}

impl From<CmpOp> for BinaryOp {
    fn from(op: CmpOp) -> Self {
        match op {
            CmpOp::Gt => BinaryOp::Gt,
            CmpOp::Lt => BinaryOp::Lt,
            CmpOp::Ge => BinaryOp::Ge,
            CmpOp::Le => BinaryOp::Le,
            CmpOp::Eq => BinaryOp::Eq,
            CmpOp::Ne => BinaryOp::Ne,
        }
    }
}

/// A composable query expression: the default output of the compiler.
///
/// Arithmetic composes with the usual operators and comparisons with the
/// named methods, so hand-built expressions read like the formula:
///
/// ```
/// use formulary::{Expr, compile};
///
/// let built = Expr::field("sales") + Expr::field("tax") * Expr::int(2);
/// assert_eq!(compile("[sales] + [tax] * 2").unwrap(), built);
/// ```
///
/// `Display` renders SQL.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Number(Number),
    Field(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Case(CaseExpr),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseExpr {
    /// `(condition, value)` pairs in declaration order.
    pub branches: Vec<(Expr, Expr)>,
    pub otherwise: Option<Box<Expr>>,
}

impl Expr {
    pub fn number(n: Number) -> Expr {
        Expr::Number(n)
    }

    pub fn int(v: i64) -> Expr {
        Expr::Number(Number::Int(v))
    }

    pub fn float(v: f64) -> Expr {
        Expr::Number(Number::Float(v))
    }

    pub fn field(name: impl Into<String>) -> Expr {
        Expr::Field(name.into())
    }

    pub fn binary(op: impl Into<BinaryOp>, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn gt(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Gt, self, rhs)
    }
    pub fn lt(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Lt, self, rhs)
    }
    pub fn ge(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Ge, self, rhs)
    }
    pub fn le(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Le, self, rhs)
    }
    pub fn equal(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, self, rhs)
    }
    pub fn not_equal(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Ne, self, rhs)
    }
}

impl From<Number> for Expr {
    fn from(n: Number) -> Self {
        Expr::Number(n)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Field(name) => write!(f, "\"{}\"", name.replace('"', "\"\"")),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.sql()),
            Expr::Case(case) => {
                f.write_str("CASE")?;
                for (cond, value) in &case.branches {
                    write!(f, " WHEN {cond} THEN {value}")?;
                }
                if let Some(e) = &case.otherwise {
                    write!(f, " ELSE {e}")?;
                }
                f.write_str(" END")
            }
        }
    }
}

/// Conditional builder for [`Expr`].
///
/// ```
/// use formulary::{Case, Expr};
///
/// let e = Case::new()
///     .when(Expr::field("x").gt(Expr::int(1)), Expr::int(10))
///     .otherwise(Expr::int(0));
/// assert_eq!(e.to_string(), "CASE WHEN (\"x\" > 1) THEN 10 ELSE 0 END");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Case {
    branches: Vec<(Expr, Expr)>,
}

impl Case {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, condition: Expr, value: Expr) -> Self {
        self.branches.push((condition, value));
        self
    }

    pub fn otherwise(self, value: Expr) -> Expr {
        Expr::Case(CaseExpr {
            branches: self.branches,
            otherwise: Some(Box::new(value)),
        })
    }

    pub fn end(self) -> Expr {
        Expr::Case(CaseExpr {
            branches: self.branches,
            otherwise: None,
        })
    }
}

impl CaseBuilder for Case {
    type Expr = Expr;

    fn when(self, condition: Expr, value: Expr) -> Self {
        Case::when(self, condition, value)
    }
    fn otherwise(self, value: Expr) -> Expr {
        Case::otherwise(self, value)
    }
    fn end(self) -> Expr {
        Case::end(self)
    }
}

/// Builds [`Expr`] trees. This is the builder behind [`crate::compile`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilder;

impl ExprBuilder for TreeBuilder {
    type Expr = Expr;
    type Case = Case;

    fn number(&self, value: Number) -> Result<Expr, FormulaError> {
        Ok(Expr::Number(value))
    }
    fn field(&self, name: &str) -> Result<Expr, FormulaError> {
        Ok(Expr::field(name))
    }
    fn arith(&self, op: ArithOp, lhs: Expr, rhs: Expr) -> Result<Expr, FormulaError> {
        Ok(match op {
            ArithOp::Add => lhs + rhs,
            ArithOp::Sub => lhs - rhs,
            ArithOp::Mul => lhs * rhs,
            ArithOp::Div => lhs / rhs,
        })
    }
    fn compare(&self, op: CmpOp, lhs: Expr, rhs: Expr) -> Result<Expr, FormulaError> {
        Ok(match op {
            CmpOp::Gt => lhs.gt(rhs),
            CmpOp::Lt => lhs.lt(rhs),
            CmpOp::Ge => lhs.ge(rhs),
            CmpOp::Le => lhs.le(rhs),
            CmpOp::Eq => lhs.equal(rhs),
            CmpOp::Ne => lhs.not_equal(rhs),
        })
    }
    fn case(&self) -> Result<Case, FormulaError> {
        Ok(Case::new())
    }
}
