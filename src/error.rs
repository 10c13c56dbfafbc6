use std::fmt;

/// User-visible failure categories.
///
/// The `Display` form is the name printed in front of every error message,
/// e.g. `VariableError on line 3: ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed block or parenthesis structure.
    Syntax,
    /// Malformed loop or condition shape.
    Expression,
    /// The expression evaluator rejected an expression.
    Evaluation,
    /// Wrong value kind, e.g. non-integer loop bounds.
    Type,
    /// Value outside an operation's accepted domain.
    Value,
    /// Duplicate declaration or missing reassignment target.
    Variable,
    /// Arity mismatch or a native function's internal failure.
    Func,
    /// Jump target outside the program or a self-jump.
    OutOfIndex,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Expression => "ExpressionError",
            ErrorKind::Evaluation => "EvaluationError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Variable => "VariableError",
            ErrorKind::Func => "FuncError",
            ErrorKind::OutOfIndex => "OutOfIndexError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported to the user, tied to a 1-based source line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} on line {line}: {details}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub details: String,
    pub line: usize,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, details: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            details: details.into(),
            line,
        }
    }

    pub fn syntax(details: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Syntax, details, line)
    }

    pub fn func(details: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Func, details, line)
    }

    pub fn value(details: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Value, details, line)
    }
}
