use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use formulary::{
    ArithOp, Case, CmpOp, Compiler, CompilerOptions, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DEPTH,
    ENV_CACHE_CAPACITY, ENV_MAX_DEPTH, ENV_MAX_LEN, ENV_MAX_TOKENS, ErrorKind, Expr, ExprBuilder,
    FormulaError, Number, TreeBuilder,
};

// Delegates to TreeBuilder and counts leaf constructions.
#[derive(Default)]
struct Counting {
    leaves: AtomicUsize,
}

impl Counting {
    fn leaves(&self) -> usize {
        self.leaves.load(Ordering::Relaxed)
    }
}

impl ExprBuilder for Counting {
    type Expr = Expr;
    type Case = Case;

    fn number(&self, value: Number) -> Result<Expr, FormulaError> {
        self.leaves.fetch_add(1, Ordering::Relaxed);
        TreeBuilder.number(value)
    }
    fn field(&self, name: &str) -> Result<Expr, FormulaError> {
        self.leaves.fetch_add(1, Ordering::Relaxed);
        TreeBuilder.field(name)
    }
    fn arith(&self, op: ArithOp, lhs: Expr, rhs: Expr) -> Result<Expr, FormulaError> {
        TreeBuilder.arith(op, lhs, rhs)
    }
    fn compare(&self, op: CmpOp, lhs: Expr, rhs: Expr) -> Result<Expr, FormulaError> {
        TreeBuilder.compare(op, lhs, rhs)
    }
    fn case(&self) -> Result<Case, FormulaError> {
        TreeBuilder.case()
    }
}

#[test]
fn prepare_collects_fields_in_first_appearance_order() {
    let compiler = Compiler::new();
    let p = compiler.prepare("[a] + [b] * [a] - [c]").unwrap();
    assert_eq!(p.fields(), ["a", "b", "c"]);

    let p = compiler
        .prepare("CASE WHEN [x] > 1 THEN [y] ELSE [z] + [x]")
        .unwrap();
    assert_eq!(p.fields(), ["x", "y", "z"]);

    let p = compiler.prepare("1 + 2").unwrap();
    assert!(p.fields().is_empty());
}

#[test]
fn reinterpreting_a_prepared_formula_hits_the_cache() {
    let compiler = Compiler::with_builder(Counting::default());
    let p = compiler.prepare("[a] + [b]").unwrap();

    let first = compiler.interpret(&p).unwrap();
    assert_eq!(compiler.builder().leaves(), 2);
    let second = compiler.interpret(&p).unwrap();
    assert_eq!(compiler.builder().leaves(), 2);
    assert_eq!(first, second);
    assert_eq!(compiler.cache_len(), 1);

    // clones keep the identity
    let cloned = p.clone();
    assert_eq!(cloned.id(), p.id());
    compiler.interpret(&cloned).unwrap();
    assert_eq!(compiler.builder().leaves(), 2);
}

#[test]
fn preparing_the_same_text_twice_yields_distinct_entries() {
    let compiler = Compiler::with_builder(Counting::default());
    let p1 = compiler.prepare("[a] * 2").unwrap();
    let p2 = compiler.prepare("[a] * 2").unwrap();
    assert_ne!(p1.id(), p2.id());
    assert_eq!(p1.ast(), p2.ast());

    let e1 = compiler.interpret(&p1).unwrap();
    let e2 = compiler.interpret(&p2).unwrap();
    assert_eq!(e1, e2);
    assert_eq!(compiler.cache_len(), 2);
    assert_eq!(compiler.builder().leaves(), 4);
}

#[test]
fn cache_is_bounded() {
    let options = CompilerOptions::default().with_cache_capacity(1);
    let compiler = Compiler::with_options(Counting::default(), options);
    let p1 = compiler.prepare("[a]").unwrap();
    let p2 = compiler.prepare("[b]").unwrap();

    compiler.interpret(&p1).unwrap();
    compiler.interpret(&p2).unwrap();
    assert_eq!(compiler.cache_len(), 1);
    assert_eq!(compiler.builder().leaves(), 2);

    // p1 was evicted by p2
    compiler.interpret(&p1).unwrap();
    assert_eq!(compiler.builder().leaves(), 3);
}

#[test]
fn zero_capacity_disables_caching() {
    let options = CompilerOptions::default().with_cache_capacity(0);
    let compiler = Compiler::with_options(Counting::default(), options);
    let p = compiler.prepare("[a]").unwrap();
    compiler.interpret(&p).unwrap();
    compiler.interpret(&p).unwrap();
    assert_eq!(compiler.cache_len(), 0);
    assert_eq!(compiler.builder().leaves(), 2);
}

#[test]
fn clear_cache_forgets_everything() {
    let compiler = Compiler::new();
    let p = compiler.prepare("[a] > 1").unwrap();
    compiler.interpret(&p).unwrap();
    assert_eq!(compiler.cache_len(), 1);
    compiler.clear_cache();
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn compile_does_not_fill_the_cache() {
    let compiler = Compiler::new();
    let e = compiler.compile("CASE WHEN [x] > 1 THEN 10 ELSE 0").unwrap();
    assert_eq!(e, formulary::compile("CASE WHEN [x] > 1 THEN 10 ELSE 0").unwrap());
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn errors_are_not_cached() {
    let compiler = Compiler::new();
    assert!(compiler.prepare("1 +").is_err());
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn length_limit_is_checked_before_lexing() {
    let options = CompilerOptions::default().with_max_formula_len(5);
    let compiler = Compiler::with_options(TreeBuilder, options);
    // would be a lex error, but the length check comes first
    let err = compiler.prepare("[abc] $ 1").unwrap_err();
    assert_eq!(err, FormulaError::TooLong { len: 9, max: 5 });
    assert_eq!(err.kind(), ErrorKind::Limit);
    assert!(compiler.prepare("[a]+1").is_ok());
}

#[test]
fn token_limit_excludes_end_marker() {
    let options = CompilerOptions::default().with_max_tokens(3);
    let compiler = Compiler::with_options(TreeBuilder, options);
    assert!(compiler.compile("1 + 2").is_ok());
    let err = compiler.compile("1 + 2 + 3").unwrap_err();
    assert_eq!(err, FormulaError::TooManyTokens { count: 5, max: 3 });
}

#[test]
fn default_options() {
    let options = CompilerOptions::default();
    assert_eq!(options.cache_capacity, DEFAULT_CACHE_CAPACITY);
    assert_eq!(options.max_formula_len, None);
    assert_eq!(options.max_tokens, None);
    assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(Compiler::new().options(), &options);
}

#[test]
fn options_from_lookup() {
    let mut vars = HashMap::new();
    vars.insert(ENV_CACHE_CAPACITY, "8".to_string());
    vars.insert(ENV_MAX_LEN, " 100 ".to_string());
    vars.insert(ENV_MAX_TOKENS, "lots".to_string());
    vars.insert(ENV_MAX_DEPTH, "32".to_string());
    let options = CompilerOptions::from_lookup(|k| vars.get(k).cloned());
    assert_eq!(
        options,
        CompilerOptions {
            cache_capacity: 8,
            max_formula_len: Some(100),
            max_tokens: None,
            max_depth: 32,
        }
    );
}

#[test]
fn zero_from_lookup_lifts_limits_but_not_depth() {
    let options = CompilerOptions::from_lookup(|_| Some("0".to_string()));
    assert_eq!(options.max_formula_len, None);
    assert_eq!(options.max_tokens, None);
    assert_eq!(options.cache_capacity, 0);
    assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);

    let compiler = Compiler::with_options(TreeBuilder, options);
    assert!(compiler.compile(&"[a] + ".repeat(100)).is_err());
    assert!(compiler.compile(&format!("{}1", "[a] + ".repeat(100))).is_ok());
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn depth_limit_comes_from_options() {
    let options = CompilerOptions::default().with_max_depth(3);
    let compiler = Compiler::with_options(TreeBuilder, options);
    assert!(compiler.compile("((1))").is_ok());
    assert!(compiler.compile("1 + 2 + 3").is_ok());

    let err = compiler.compile("(((1)))").unwrap_err();
    assert_eq!(err, FormulaError::TooDeep { max: 3 });
    let err = compiler.prepare("1 + 2 + 3 + 4").unwrap_err();
    assert_eq!(err, FormulaError::TooDeep { max: 3 });
    assert_eq!(err.kind(), ErrorKind::Limit);

    assert_eq!(CompilerOptions::default().with_max_depth(0).max_depth, 1);
}
