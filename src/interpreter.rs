use crate::ast::Ast;
use crate::builder::{CaseBuilder, ExprBuilder};
use crate::error::FormulaError;
use crate::expr::{Expr, TreeBuilder};
use crate::parser::parse;

/// Walks an [`Ast`] and composes the host expression through an
/// [`ExprBuilder`].
///
/// Children are visited left to right. For CASE, every branch condition is
/// interpreted before its value, branches in declaration order, the ELSE
/// value last; the host conditional is then assembled in one go from that
/// ordered branch list, so no builder state is shared between calls.
pub struct Interpreter<'b, B> {
    builder: &'b B,
}

impl<'b, B: ExprBuilder> Interpreter<'b, B> {
    pub fn new(builder: &'b B) -> Self {
        Self { builder }
    }

    pub fn interpret(&self, ast: &Ast) -> Result<B::Expr, FormulaError> {
        match ast {
            Ast::Num(n) => self.builder.number(*n),
            Ast::Field(name) => self.builder.field(name),
            Ast::Arith(op, a, b) => {
                let lhs = self.interpret(a)?;
                let rhs = self.interpret(b)?;
                self.builder.arith(*op, lhs, rhs)
            }
            Ast::Cmp(op, a, b) => {
                let lhs = self.interpret(a)?;
                let rhs = self.interpret(b)?;
                self.builder.compare(*op, lhs, rhs)
            }
            Ast::Case {
                branches,
                otherwise,
            } => {
                let case = self.builder.case()?;
                let mut arms = Vec::with_capacity(branches.len());
                for branch in branches {
                    let cond = self.interpret(&branch.condition)?;
                    let value = self.interpret(&branch.value)?;
                    arms.push((cond, value));
                }
                let otherwise = match otherwise {
                    Some(e) => Some(self.interpret(e)?),
                    None => None,
                };
                let case = arms
                    .into_iter()
                    .fold(case, |case, (cond, value)| case.when(cond, value));
                Ok(match otherwise {
                    Some(e) => case.otherwise(e),
                    None => case.end(),
                })
            }
        }
    }
}

/// Compiles a formula into an [`Expr`] tree.
///
/// ```
/// use formulary::compile;
///
/// let e = compile("CASE WHEN [x] > 10 THEN [y] ELSE 0").unwrap();
/// assert_eq!(e.to_string(), "CASE WHEN (\"x\" > 10) THEN \"y\" ELSE 0 END");
/// ```
pub fn compile(formula: &str) -> Result<Expr, FormulaError> {
    compile_with(formula, &TreeBuilder)
}

/// Compiles a formula against a host builder.
pub fn compile_with<B: ExprBuilder>(formula: &str, builder: &B) -> Result<B::Expr, FormulaError> {
    let ast = parse(formula)?;
    Interpreter::new(builder).interpret(&ast)
}
