mod ast;
mod builder;
mod cache;
mod collect;
mod config;
mod engine;
mod error;
mod expr;
mod interpreter;
mod lexer;
mod parser;
mod prepared;

pub use ast::{ArithOp, Ast, Branch, CmpOp};
pub use builder::{CaseBuilder, ExprBuilder, NoCase};
pub use config::{
    CompilerOptions, DEFAULT_CACHE_CAPACITY, ENV_CACHE_CAPACITY, ENV_MAX_DEPTH, ENV_MAX_LEN,
    ENV_MAX_TOKENS,
};
pub use engine::Compiler;
pub use error::{ErrorKind, FormulaError};
pub use expr::{BinaryOp, Case, CaseExpr, Expr, TreeBuilder};
pub use interpreter::{Interpreter, compile, compile_with};
pub use lexer::{Lexer, Number, Token, tokenize};
pub use parser::{DEFAULT_MAX_DEPTH, Parser, parse};
pub use prepared::PreparedFormula;
