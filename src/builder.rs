use crate::ast::{ArithOp, CmpOp};
use crate::error::FormulaError;
use crate::lexer::Number;
use std::convert::Infallible;
use std::marker::PhantomData;

/// The host-side construction layer the interpreter composes against.
///
/// Implement this trait to turn parsed formulas into your own query
/// expression type: a SQL builder's column expressions, a dataframe
/// expression, a string, etc. Leaves and arithmetic are mandatory. Comparison
/// and CASE support are optional; the default methods reject those node kinds
/// with [`FormulaError::UnsupportedNodeKind`].
pub trait ExprBuilder {
    /// The expression type produced for every node.
    type Expr: Clone;
    /// The conditional builder used to assemble CASE expressions.
    type Case: CaseBuilder<Expr = Self::Expr>;

    fn number(&self, value: Number) -> Result<Self::Expr, FormulaError>;

    /// Called with the field name, brackets stripped.
    fn field(&self, name: &str) -> Result<Self::Expr, FormulaError>;

    fn arith(
        &self,
        op: ArithOp,
        lhs: Self::Expr,
        rhs: Self::Expr,
    ) -> Result<Self::Expr, FormulaError>;

    fn compare(
        &self,
        op: CmpOp,
        lhs: Self::Expr,
        rhs: Self::Expr,
    ) -> Result<Self::Expr, FormulaError> {
        let _ = (lhs, rhs);
        Err(FormulaError::UnsupportedNodeKind(format!(
            "comparison '{}'",
            op.symbol()
        )))
    }

    /// Starts a new, empty conditional.
    fn case(&self) -> Result<Self::Case, FormulaError> {
        Err(FormulaError::UnsupportedNodeKind("CASE".into()))
    }
}

/// Accumulates `WHEN condition THEN value` branches in call order.
pub trait CaseBuilder: Sized {
    type Expr;

    fn when(self, condition: Self::Expr, value: Self::Expr) -> Self;

    /// Finishes the conditional with a default value.
    fn otherwise(self, value: Self::Expr) -> Self::Expr;

    /// Finishes the conditional without a default value.
    fn end(self) -> Self::Expr;
}

/// Case builder for hosts without conditional support. It has no values, so
/// [`ExprBuilder::case`] can never hand one out.
pub enum NoCase<E> {
    #[doc(hidden)]
    Never(Infallible, PhantomData<E>),
}

impl<E> CaseBuilder for NoCase<E> {
    type Expr = E;

    fn when(self, _condition: E, _value: E) -> Self {
        match self {
            NoCase::Never(never, _) => match never {},
        }
    }
    fn otherwise(self, _value: E) -> E {
        match self {
            NoCase::Never(never, _) => match never {},
        }
    }
    fn end(self) -> E {
        match self {
            NoCase::Never(never, _) => match never {},
        }
    }
}
