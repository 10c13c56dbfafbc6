//! Native built-in functions.
//!
//! Every family lives in its own file and exposes a `register(frame)`
//! function; [`register_all`] installs them all into a fresh frame. To add a
//! built-in, implement [`NativeFunction`] and register it here.

pub use crate::func::{Arity, NativeFunction};

use crate::error::ScriptError;
use crate::interpreter::Frame;
use crate::value::Value;

pub mod casefold; // Casefold
pub mod control;  // Return, Exit
pub mod input;    // GetText
pub mod is_main;  // IsMain
pub mod print;    // Print, Println, Printf
pub mod random;   // Rand
pub mod sleep;    // Sleep

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register every native built-in with `frame`.
pub fn register_all(frame: &mut Frame) {
    casefold::register(frame);
    control::register(frame);
    input::register(frame);
    is_main::register(frame);
    print::register(frame);
    random::register(frame);
    sleep::register(frame);
}

/// Display forms of `args` joined by single spaces.
pub(crate) fn join_display(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn expect_str<'a>(name: &str, value: &'a Value, line: usize) -> Result<&'a str, ScriptError> {
    value.as_str().ok_or_else(|| {
        ScriptError::value(
            format!("invalid value for {} '{}', expected string", name, value),
            line,
        )
    })
}
