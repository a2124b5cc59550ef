use crate::error::FormulaError;
use crate::parser::DEFAULT_MAX_DEPTH;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

pub const ENV_CACHE_CAPACITY: &str = "FORMULARY_CACHE_CAPACITY";
pub const ENV_MAX_LEN: &str = "FORMULARY_MAX_LEN";
pub const ENV_MAX_TOKENS: &str = "FORMULARY_MAX_TOKENS";
pub const ENV_MAX_DEPTH: &str = "FORMULARY_MAX_DEPTH";

/// Settings for a [`crate::Compiler`].
///
/// The limits are checked before parsing so a host can bound compile latency
/// on untrusted formula text. `None` means unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CompilerOptions {
    /// Maximum number of interpreted formulas kept; 0 disables the cache.
    pub cache_capacity: usize,
    /// Maximum formula length in bytes.
    pub max_formula_len: Option<usize>,
    /// Maximum number of tokens, not counting the end-of-input marker.
    pub max_tokens: Option<usize>,
    /// Maximum parenthesis nesting and tree height. Always bounded, since the
    /// parser and interpreter recurse once per level.
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_formula_len: None,
            max_tokens: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompilerOptions {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_max_formula_len(mut self, max: usize) -> Self {
        self.max_formula_len = Some(max);
        self
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Clamped to at least 1; a formula is at least one level deep.
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max.max(1);
        self
    }

    /// Reads `FORMULARY_CACHE_CAPACITY`, `FORMULARY_MAX_LEN`,
    /// `FORMULARY_MAX_TOKENS` and `FORMULARY_MAX_DEPTH`. Unset or unparsable
    /// values keep the default.
    ///
    /// `0` means unlimited for the length and token limits, and disables the
    /// cache for the capacity. The depth limit cannot be lifted, so `0` keeps
    /// the default there.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`CompilerOptions::from_env`] with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        let defaults = Self::default();
        Self {
            cache_capacity: read(ENV_CACHE_CAPACITY).unwrap_or(defaults.cache_capacity),
            max_formula_len: read(ENV_MAX_LEN).filter(|&n| n > 0).or(defaults.max_formula_len),
            max_tokens: read(ENV_MAX_TOKENS).filter(|&n| n > 0).or(defaults.max_tokens),
            max_depth: read(ENV_MAX_DEPTH).filter(|&n| n > 0).unwrap_or(defaults.max_depth),
        }
    }

    pub(crate) fn check_len(&self, formula: &str) -> Result<(), FormulaError> {
        match self.max_formula_len {
            Some(max) if formula.len() > max => Err(FormulaError::TooLong {
                len: formula.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_tokens(&self, count: usize) -> Result<(), FormulaError> {
        match self.max_tokens {
            Some(max) if count > max => Err(FormulaError::TooManyTokens { count, max }),
            _ => Ok(()),
        }
    }
}
