use crate::ast::{ArithOp, Ast, Branch, CmpOp};
use crate::error::FormulaError;
use crate::lexer::{Token, tokenize};

/// Default bound on both parenthesis nesting and tree height.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// a parsed subtree with its height
type Node = (Ast, usize);

/// One-token lookahead recursive-descent parser.
///
/// Grammar, loosest to tightest:
///
/// ```text
/// formula  := (case | expr) EOF
/// case     := CASE when_then (CASE when_then)* (ELSE expr)?
/// when_then:= WHEN expr THEN expr
/// expr     := term ((+|-) term)*
/// term     := factor ((*|/|>|<|>=|<=|==|!=) factor)*
/// factor   := NUMBER | FIELD | '(' expr ')'
/// ```
///
/// Comparisons share the `term` level with `*` and `/`, so they bind tighter
/// than `+` and `-`: `1 + 2 > 3` is `1 + (2 > 3)`.
///
/// Parenthesis nesting and the height of the produced tree are both capped by
/// `max_depth` ([`DEFAULT_MAX_DEPTH`] unless set), so every later walk over
/// the tree has bounded recursion. Exceeding it is [`FormulaError::TooDeep`].
pub struct Parser {
    tokens: std::vec::IntoIter<Token>,
    look: Token,
    max_depth: usize,
    parens: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens.into_iter();
        let look = tokens.next().unwrap_or(Token::Eof);
        Self {
            tokens,
            look,
            max_depth: DEFAULT_MAX_DEPTH,
            parens: 0,
        }
    }

    /// Tokenizes `formula` up front; a lex error anywhere in the text wins over
    /// any syntax error.
    pub fn from_formula(formula: &str) -> Result<Self, FormulaError> {
        Ok(Self::new(tokenize(formula)?))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn bump(&mut self) -> Token {
        let next = self.tokens.next().unwrap_or(Token::Eof);
        std::mem::replace(&mut self.look, next)
    }
    fn expect(&mut self, t: &Token) -> Result<(), FormulaError> {
        if std::mem::discriminant(&self.look) == std::mem::discriminant(t) {
            self.bump();
            Ok(())
        } else {
            Err(FormulaError::syntax(t.to_string(), &self.look))
        }
    }
    fn check_depth(&self, depth: usize) -> Result<usize, FormulaError> {
        if depth > self.max_depth {
            Err(FormulaError::TooDeep {
                max: self.max_depth,
            })
        } else {
            Ok(depth)
        }
    }

    pub fn parse(mut self) -> Result<Ast, FormulaError> {
        let ast = if matches!(self.look, Token::Case) {
            self.case_expr()?
        } else {
            self.expr()?.0
        };
        if !matches!(self.look, Token::Eof) {
            return Err(FormulaError::syntax("end of input", &self.look));
        }
        Ok(ast)
    }

    fn case_expr(&mut self) -> Result<Ast, FormulaError> {
        self.expect(&Token::Case)?;
        let (first, mut depth) = self.when_then()?;
        let mut branches = vec![first];
        while matches!(self.look, Token::Case) {
            self.bump();
            let (branch, d) = self.when_then()?;
            depth = depth.max(d);
            branches.push(branch);
        }
        let otherwise = if matches!(self.look, Token::Else) {
            self.bump();
            let (e, d) = self.expr()?;
            depth = depth.max(d);
            Some(Box::new(e))
        } else {
            None
        };
        self.check_depth(depth + 1)?;
        Ok(Ast::Case {
            branches,
            otherwise,
        })
    }

    fn when_then(&mut self) -> Result<(Branch, usize), FormulaError> {
        self.expect(&Token::When)?;
        let (condition, dc) = self.expr()?;
        self.expect(&Token::Then)?;
        let (value, dv) = self.expr()?;
        Ok((Branch { condition, value }, dc.max(dv)))
    }

    fn expr(&mut self) -> Result<Node, FormulaError> {
        let (mut node, mut depth) = self.term()?;
        loop {
            let op = match self.look {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                _ => break,
            };
            self.bump();
            let (rhs, rd) = self.term()?;
            depth = self.check_depth(depth.max(rd) + 1)?;
            node = Ast::arith(op, node, rhs);
        }
        Ok((node, depth))
    }

    fn term(&mut self) -> Result<Node, FormulaError> {
        let mut node = self.factor()?;
        loop {
            node = match self.look {
                Token::Mul => self.arith_rhs(ArithOp::Mul, node)?,
                Token::Div => self.arith_rhs(ArithOp::Div, node)?,
                Token::Gt => self.cmp_rhs(CmpOp::Gt, node)?,
                Token::Lt => self.cmp_rhs(CmpOp::Lt, node)?,
                Token::Ge => self.cmp_rhs(CmpOp::Ge, node)?,
                Token::Le => self.cmp_rhs(CmpOp::Le, node)?,
                Token::Eq => self.cmp_rhs(CmpOp::Eq, node)?,
                Token::Ne => self.cmp_rhs(CmpOp::Ne, node)?,
                _ => break,
            };
        }
        Ok(node)
    }
    fn arith_rhs(&mut self, op: ArithOp, (lhs, ld): Node) -> Result<Node, FormulaError> {
        self.bump();
        let (rhs, rd) = self.factor()?;
        let depth = self.check_depth(ld.max(rd) + 1)?;
        Ok((Ast::arith(op, lhs, rhs), depth))
    }
    fn cmp_rhs(&mut self, op: CmpOp, (lhs, ld): Node) -> Result<Node, FormulaError> {
        self.bump();
        let (rhs, rd) = self.factor()?;
        let depth = self.check_depth(ld.max(rd) + 1)?;
        Ok((Ast::cmp(op, lhs, rhs), depth))
    }

    fn factor(&mut self) -> Result<Node, FormulaError> {
        match &mut self.look {
            Token::Number(n) => {
                let n = *n;
                self.bump();
                Ok((Ast::Num(n), 1))
            }
            Token::Field(name) => {
                let name = std::mem::take(name);
                self.bump();
                Ok((Ast::Field(name), 1))
            }
            Token::LParen => {
                self.parens += 1;
                self.check_depth(self.parens)?;
                self.bump();
                let e = self.expr()?;
                self.expect(&Token::RParen)?;
                self.parens -= 1;
                Ok(e)
            }
            _ => Err(FormulaError::syntax("number, field or '('", &self.look)),
        }
    }
}

/// Tokenizes and parses a formula into its AST.
pub fn parse(formula: &str) -> Result<Ast, FormulaError> {
    Parser::from_formula(formula)?.parse()
}
