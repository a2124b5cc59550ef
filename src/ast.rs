use crate::lexer::Number;
use std::fmt;

/// Arithmetic operators (`+ - * /`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

/// Comparison operators (`> < >= <= == !=`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

/// One `WHEN condition THEN value` pair of a CASE expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Branch {
    pub condition: Ast,
    pub value: Ast,
}

/// Parsed formula.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ast {
    /// Numeric literal (e.g. 1, 2.5)
    Num(Number),
    /// Field reference, brackets stripped (e.g. `[sales]` -> "sales")
    Field(String),
    Arith(ArithOp, Box<Ast>, Box<Ast>),
    Cmp(CmpOp, Box<Ast>, Box<Ast>),
    /// `CASE WHEN .. THEN .. [CASE WHEN .. THEN ..]* [ELSE ..]`.
    /// `branches` is never empty and keeps declaration order.
    Case {
        branches: Vec<Branch>,
        otherwise: Option<Box<Ast>>,
    },
}

impl Ast {
    pub fn arith(op: ArithOp, lhs: Ast, rhs: Ast) -> Ast {
        Ast::Arith(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn cmp(op: CmpOp, lhs: Ast, rhs: Ast) -> Ast {
        Ast::Cmp(op, Box::new(lhs), Box::new(rhs))
    }
}

// Fully parenthesized, so the printed form shows how the formula grouped.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Num(n) => write!(f, "{n}"),
            Ast::Field(name) => write!(f, "[{name}]"),
            Ast::Arith(op, a, b) => write!(f, "({a} {} {b})", op.symbol()),
            Ast::Cmp(op, a, b) => write!(f, "({a} {} {b})", op.symbol()),
            Ast::Case {
                branches,
                otherwise,
            } => {
                for (i, b) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "CASE WHEN {} THEN {}", b.condition, b.value)?;
                }
                if let Some(e) = otherwise {
                    write!(f, " ELSE {e}")?;
                }
                Ok(())
            }
        }
    }
}
