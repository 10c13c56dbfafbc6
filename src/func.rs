//! Callables: native built-ins and user-defined `fn` functions.
//!
//! A user function runs in a copy of its caller's frame with the bound
//! parameters added. When it finishes (and did not fail) every name the
//! caller already had is written back, except those its parameters shadow;
//! names the function created are dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ScriptError;
use crate::host::Host;
use crate::interpreter::{Block, Frame, Interpreter};
use crate::signal::{Completion, Signal};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Native functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

/// Implement this trait to add a built-in CatScript function.
///
/// `line` is the 1-based line of the call, for error messages. Arity is
/// checked by the caller before `call` runs, so a `Fixed(n)` function always
/// receives exactly `n` arguments.
pub trait NativeFunction: Send + Sync {
    fn arity(&self) -> Arity;

    fn call(&self, host: &mut Host, line: usize, args: Vec<Value>) -> Result<Value, Signal>;
}

/// One entry of a frame's function table.
#[derive(Clone)]
pub enum Callable {
    Native(Arc<dyn NativeFunction>),
    User(Arc<Func>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "Native({:?})", native.arity()),
            Callable::User(func) => write!(f, "User({})", func.name),
        }
    }
}

pub type FuncTable = HashMap<String, Callable>;

// ---------------------------------------------------------------------------
// User functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// Evaluated once, when the `fn` line ran.
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<String>,
    /// Number of source lines above the first body line.
    pub offset: usize,
}

impl Func {
    /// Pair positional `args` with the parameters, filling the rest from
    /// defaults.
    pub fn bind(&self, args: Vec<Value>, line: usize) -> Result<Vec<(String, Value)>, ScriptError> {
        if args.len() > self.params.len() {
            return Err(ScriptError::func(
                format!(
                    "`{}` expected at most {} argument(s), got {}",
                    self.name,
                    self.params.len(),
                    args.len()
                ),
                line,
            ));
        }

        let mut args = args.into_iter();
        let mut bound = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(ScriptError::func(
                        format!("`{}` missing argument '{}'", self.name, param.name),
                        line,
                    ));
                }
            };
            bound.push((param.name.clone(), value));
        }
        Ok(bound)
    }

    /// Run the body on behalf of `caller`, called from source line `line`.
    pub(crate) fn invoke(
        &self,
        interp: &mut Interpreter,
        caller: &mut Frame,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, Signal> {
        let bound = self.bind(args, line)?;

        let mut frame = caller.clone();
        frame.scope.extend(bound);

        tracing::debug!(function = %self.name, line, "invoking function");
        interp.host_mut().enter(&self.name);
        let completion = interp.execute(&mut frame, Block::new(&self.body, self.offset));
        interp.host_mut().leave();

        if !completion.is_failure() {
            let params: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
            caller.merge_from(&frame, &params);
        }

        match completion {
            Completion::Finished => Ok(Value::Null),
            Completion::Returned(value) => Ok(value),
            Completion::Exited => Err(Signal::Exit { line }),
            Completion::Failed => Err(Signal::NoPrint { line }),
        }
    }
}
