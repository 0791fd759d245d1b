// ABOUTME: Error types spanning parse, shape, resolution, and mapping failures

use thiserror::Error;

// ===== Arity constant strings (mirrors error-path wording used throughout builtins) =====
pub const ARITY_EXACTLY_ONE: &str = "exactly 1";
pub const ARITY_EXACTLY_TWO: &str = "exactly 2";
pub const ARITY_EXACTLY_THREE: &str = "exactly 3";
pub const ARITY_VARIADIC: &str = "any number of";

/// Every error the engine can surface. All variants are non-retryable: a
/// `Query` that fails aborts immediately and returns `{ error: message }`,
/// never a partial result.
#[allow(dead_code)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== Parse errors =====
    #[error("unterminated string literal at {line}:{col}: {partial:?}")]
    UnterminatedString {
        partial: String,
        line: usize,
        col: usize,
    },

    #[error("unexpected token {found:?} at {line}:{col}")]
    UnexpectedToken {
        found: String,
        line: usize,
        col: usize,
    },

    #[error("expected `{expected}` at {line}:{col}, found {found:?}")]
    MissingDelimiter {
        expected: String,
        found: String,
        line: usize,
        col: usize,
    },

    #[error("expected lambda param to be variable; found {found}")]
    LambdaParamNotVariable { found: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected trailing input at {line}:{col}: {found:?}")]
    TrailingInput {
        found: String,
        line: usize,
        col: usize,
    },

    // ===== Shape errors =====
    #[error("attempt to call non-callable: {kind}")]
    NotCallable { kind: String },

    #[error("{builtin}: expected {expected} argument(s), found {found}")]
    Arity {
        builtin: String,
        expected: String,
        found: usize,
    },

    #[error("{builtin}: argument {index} is not a {expected}: {actual}")]
    BadArgumentType {
        builtin: String,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("incomplete var set provided. missing: {missing:?}")]
    IncompleteVarSet { missing: Vec<String> },

    #[error("tuple not handled")]
    UnsupportedTuple,

    #[error("value is not a {kind}")]
    WrongValueKind { kind: String },

    #[error("{left} and {right} cannot be compared for equality")]
    NotComparable { left: String, right: String },

    // ===== Resolution errors =====
    #[error("variable `{name}` is not defined")]
    UndefinedVariable { name: String },

    #[error("variable cycle detected: {name}")]
    VariableCycle { name: String },

    #[error("pageId must be provided")]
    MissingPageId,

    #[error("variable store lookup failed: {message}")]
    StoreLookupFailed { message: String },

    #[error("maximum recursion depth ({limit}) exceeded")]
    RecursionDepthExceeded { limit: usize },

    #[error("maximum variable history length ({limit}) exceeded")]
    HistoryLengthExceeded { limit: usize },

    // ===== Mapping errors =====
    #[error("unexpected result type: {kind}")]
    UnmappableResult { kind: String },
}

impl EngineError {
    pub fn arity(builtin: &str, expected: impl Into<String>, found: usize) -> Self {
        EngineError::Arity {
            builtin: builtin.to_string(),
            expected: expected.into(),
            found,
        }
    }

    pub fn bad_argument_type(builtin: &str, index: usize, expected: &str, actual: &str) -> Self {
        EngineError::BadArgumentType {
            builtin: builtin.to_string(),
            index,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn not_callable(kind: &str) -> Self {
        EngineError::NotCallable {
            kind: kind.to_string(),
        }
    }

    pub fn wrong_value_kind(kind: &str) -> Self {
        EngineError::WrongValueKind {
            kind: kind.to_string(),
        }
    }
}
