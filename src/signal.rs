//! The single return channel shared by errors and control flow.
//!
//! Evaluating one statement line yields `Result<Value, Signal>`: `Ok` is a
//! plain value, `Err` is either a user-visible error or an instruction for the
//! execution loop that invoked the evaluation. Line indices inside jump
//! variants are 0-based positions in the executing block; `line` fields are
//! 1-based source line numbers.

use crate::error::ScriptError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A genuine failure; printed once by the frame it terminates.
    Error(ScriptError),
    /// Move the cursor now.
    LineJump { from: usize, to: usize },
    /// Move the cursor to `target` once it reaches `trigger`.
    ScheduledLineJump {
        from: usize,
        trigger: usize,
        target: usize,
    },
    /// Stop the whole run.
    Exit { line: usize },
    /// Stop the current frame, handing `value` to its caller.
    Return { line: usize, value: Value },
    /// A nested frame already printed its error; stop without printing.
    NoPrint { line: usize },
}

impl From<ScriptError> for Signal {
    fn from(err: ScriptError) -> Self {
        Signal::Error(err)
    }
}

/// How one execution frame finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Ran off the end of its lines.
    Finished,
    /// An `Exit` was reached.
    Exited,
    /// A `Return` was reached.
    Returned(Value),
    /// An error terminated the frame; the message was printed or suppressed.
    Failed,
}

impl Completion {
    /// The numeric completion code: 0, 1, 2 or -1.
    pub fn code(&self) -> i32 {
        match self {
            Completion::Finished => 0,
            Completion::Exited => 1,
            Completion::Returned(_) => 2,
            Completion::Failed => -1,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Failed)
    }

    /// Re-raise a nested frame's completion inside its caller at `line`.
    ///
    /// A normal finish produces `value`; the other outcomes become the
    /// signal the caller's loop has to act on.
    pub(crate) fn into_signal(self, line: usize, value: Value) -> Result<Value, Signal> {
        match self {
            Completion::Finished => Ok(value),
            Completion::Exited => Err(Signal::Exit { line }),
            Completion::Returned(value) => Err(Signal::Return { line, value }),
            Completion::Failed => Err(Signal::NoPrint { line }),
        }
    }
}
