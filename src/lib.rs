//! CatScript: a line-oriented scripting language interpreter.
//!
//! A program is a list of statement lines. Control flow (conditional chains,
//! counted loops, function calls and `goto`) is resolved by scanning brace
//! nesting over those lines at run time rather than by building a syntax tree.
//! Expressions are delegated to an [`ExpressionEvaluator`]; the crate ships
//! [`StandardEvaluator`].
//!
//! | Module | Role |
//! |---|---|
//! | [`blocks`] | brace-nesting lookups |
//! | `statement` | classifies and evaluates one line |
//! | [`interpreter`] | execution loop, frames, run API |
//! | [`func`] | native and user-defined callables |
//! | [`functions`] | the native built-ins |
//! | [`expression`] | the expression evaluator collaborator |
//! | [`shell`] | interactive shell commands and script loading |

pub mod ast;
pub mod blocks;
pub mod config;
pub mod error;
pub mod expression;
pub mod func;
pub mod functions;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod shell;
pub mod signal;
pub mod source;
mod statement;
pub mod value;

pub use config::{InputSource, Options};
pub use error::{ErrorKind, ScriptError};
pub use expression::{EvalError, ExpressionEvaluator, StandardEvaluator};
pub use func::{Arity, NativeFunction};
pub use interpreter::{Frame, Interpreter, RunOutcome};
pub use signal::{Completion, Signal};
pub use source::{Literal, Program};
pub use value::{Scope, Value};
