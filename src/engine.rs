use crate::builder::ExprBuilder;
use crate::cache::FormulaCache;
use crate::config::CompilerOptions;
use crate::error::FormulaError;
use crate::expr::TreeBuilder;
use crate::interpreter::Interpreter;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::prepared::PreparedFormula;
use log::{debug, trace};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Formula compiler bound to a host builder.
///
/// Interpreted expressions are memoized per [`PreparedFormula`] identity in a
/// bounded LRU cache owned by the compiler, so a host that keeps prepared
/// formulas around (e.g. one per registered measure) pays for interpretation
/// once. The API takes `&self`; share a compiler across threads with `Arc`.
///
/// ```
/// use formulary::Compiler;
///
/// let compiler = Compiler::new();
/// let margin = compiler.prepare("([revenue] - [cost]) / [revenue]").unwrap();
/// assert_eq!(margin.fields(), ["revenue", "cost"]);
///
/// let first = compiler.interpret(&margin).unwrap();
/// let again = compiler.interpret(&margin).unwrap();
/// assert_eq!(first, again);
/// assert_eq!(compiler.cache_len(), 1);
/// ```
pub struct Compiler<B: ExprBuilder = TreeBuilder> {
    builder: B,
    options: CompilerOptions,
    cache: Mutex<FormulaCache<B::Expr>>,
}

impl Default for Compiler<TreeBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler<TreeBuilder> {
    pub fn new() -> Self {
        Self::with_options(TreeBuilder, CompilerOptions::default())
    }
}

impl<B: ExprBuilder> Compiler<B> {
    pub fn with_builder(builder: B) -> Self {
        Self::with_options(builder, CompilerOptions::default())
    }

    pub fn with_options(builder: B, options: CompilerOptions) -> Self {
        let cache = Mutex::new(FormulaCache::new(options.cache_capacity));
        Self {
            builder,
            options,
            cache,
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Checks the length and token limits, tokenizes and parses `formula` with
    /// the configured depth limit.
    pub fn prepare(&self, formula: &str) -> Result<PreparedFormula, FormulaError> {
        self.options.check_len(formula)?;
        let tokens = tokenize(formula)?;
        // the trailing Eof does not count
        self.options.check_tokens(tokens.len().saturating_sub(1))?;
        let ast = Parser::new(tokens)
            .with_max_depth(self.options.max_depth)
            .parse()?;
        let prepared = PreparedFormula::from_ast(ast);
        trace!(
            "prepared formula {} ({} field(s))",
            prepared.id(),
            prepared.fields().len()
        );
        Ok(prepared)
    }

    /// Interprets a prepared formula, reusing the cached expression when this
    /// same preparation was interpreted before.
    pub fn interpret(&self, prepared: &PreparedFormula) -> Result<B::Expr, FormulaError> {
        let id = prepared.id();
        let cached = self.lock_cache().get(&id);
        if let Some(expr) = cached {
            debug!("formula cache hit for {id}");
            return Ok(expr);
        }
        debug!("formula cache miss for {id}");
        let expr = Interpreter::new(&self.builder).interpret(prepared.ast())?;
        let evicted = self.lock_cache().insert(id, expr.clone());
        if evicted > 0 {
            debug!("formula cache evicted {evicted} entr(ies)");
        }
        Ok(expr)
    }

    /// Prepares and interprets in one step. The result is not cached: the
    /// preparation is dropped, so its identity could never be looked up again.
    pub fn compile(&self, formula: &str) -> Result<B::Expr, FormulaError> {
        let prepared = self.prepare(formula)?;
        Interpreter::new(&self.builder).interpret(prepared.ast())
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Drops every memoized expression.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, FormulaCache<B::Expr>> {
        // the cache holds plain clones, so a poisoned lock is still consistent
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
