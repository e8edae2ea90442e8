// ABOUTME: Error taxonomy for read-time and eval-time failures

use thiserror::Error;

/// A source position for diagnostics, carried by every read-time error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn start() -> Self {
        Position { line: 1, col: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Tokenizer and reader failures: unterminated strings, malformed numbers,
/// mismatched parens. Every instance carries a position for diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {position}")]
pub struct ReadError {
    pub message: String,
    pub position: Position,
}

impl ReadError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ReadError {
            message: message.into(),
            position,
        }
    }
}

/// Eval-time error taxonomy — one variant per kind in the error handling
/// design, each carrying the context it needs to print a diagnostic.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("{0}")]
    Read(#[from] ReadError),

    #[error("{0}")]
    UnboundSymbol(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    Type {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Arithmetic(String),

    #[error("set! on unbound symbol {0}")]
    Assign(String),

    #[error("{0}")]
    Macro(String),

    #[error("promise forces itself")]
    CircularForce,

    #[error("{0}")]
    Internal(String),
}

impl EvalError {
    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn type_error(function: &str, expected: &str, actual: &crate::value::Value) -> Self {
        EvalError::Type {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }
}

/// Maps each variant to the error-kind name from the taxonomy, for the
/// `Error: <kind>: <message>` one-line diagnostic the REPL prints.
fn kind_name(err: &EvalError) -> &'static str {
    match err {
        EvalError::Read(_) => "ReadError",
        EvalError::UnboundSymbol(_) => "UnboundSymbol",
        EvalError::Arity { .. } => "ArityError",
        EvalError::Type { .. } => "TypeError",
        EvalError::Arithmetic(_) => "ArithmeticError",
        EvalError::Assign(_) => "AssignError",
        EvalError::Macro(_) => "MacroError",
        EvalError::CircularForce => "CircularForce",
        EvalError::Internal(_) => "InternalError",
    }
}

pub fn format_diagnostic(err: &EvalError) -> String {
    format!("Error: {}: {}", kind_name(err), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_has_kind_prefix() {
        let err = EvalError::UnboundSymbol("foo".to_string());
        assert_eq!(format_diagnostic(&err), "Error: UnboundSymbol: foo");
    }

    #[test]
    fn read_error_carries_position() {
        let err = ReadError::new("unterminated string", Position { line: 2, col: 5 });
        assert_eq!(err.to_string(), "unterminated string at 2:5");
    }
}
