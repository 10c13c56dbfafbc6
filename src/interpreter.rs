//! The execution loop and the public run API.
//!
//! ```
//! use catscript::{Interpreter, InputSource, Options};
//!
//! let mut interp = Interpreter::new(&Options::captured(InputSource::default()));
//! let outcome = interp.run_source("lt x = 0\nlt y = 3\nfor i = x, y {\nPrintln(i)\n}");
//! assert_eq!(outcome.code(), 0);
//! assert_eq!(interp.host().output(), "0\n1\n2\n");
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::blocks;
use crate::config::Options;
use crate::error::ScriptError;
use crate::expression::{ExpressionEvaluator, StandardEvaluator};
use crate::func::{Callable, FuncTable, NativeFunction};
use crate::functions;
use crate::host::Host;
use crate::signal::{Completion, Signal};
use crate::source::Program;
use crate::statement::{self, LineContext};
use crate::value::{Scope, Value};

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// The variables and functions visible to one running block.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub scope: Scope,
    pub funcs: FuncTable,
}

impl Frame {
    /// An empty frame with every native built-in registered.
    pub fn with_builtins() -> Self {
        let mut frame = Self::default();
        functions::register_all(&mut frame);
        frame
    }

    pub fn register<F: NativeFunction + 'static>(&mut self, name: &str, func: F) {
        self.funcs.insert(name.to_string(), Callable::Native(Arc::new(func)));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Copy back every binding this frame already has from a finished nested
    /// frame. Names that only exist in `child` are left behind, and so are
    /// the `shadowed` names the child bound for itself (parameters, loop
    /// variables).
    pub fn merge_from(&mut self, child: &Frame, shadowed: &[&str]) {
        for (name, value) in self.scope.iter_mut() {
            if shadowed.contains(&name.as_str()) {
                continue;
            }
            if let Some(updated) = child.scope.get(name) {
                *value = updated.clone();
            }
        }
        for (name, callable) in self.funcs.iter_mut() {
            if let Some(updated) = child.funcs.get(name) {
                *callable = updated.clone();
            }
        }
    }
}

/// A window of program lines being executed. `offset` is the number of
/// source lines above `lines[0]`, so reported line numbers stay absolute.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Block<'a> {
    pub lines: &'a [String],
    pub offset: usize,
}

impl<'a> Block<'a> {
    pub fn new(lines: &'a [String], offset: usize) -> Self {
        Self { lines, offset }
    }

    /// 1-based source line number of `lines[index]`.
    pub fn line_no(&self, index: usize) -> usize {
        self.offset + index + 1
    }

    /// The nested block `lines[start..end]`.
    pub fn slice(&self, start: usize, end: usize) -> Block<'a> {
        Block::new(&self.lines[start..end], self.offset + start)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingJump {
    trigger: usize,
    target: usize,
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// How a whole run ended. `frame` is the final top-level frame, kept unless
/// the run failed.
#[derive(Debug)]
pub struct RunOutcome {
    pub completion: Completion,
    pub frame: Option<Frame>,
}

impl RunOutcome {
    pub fn code(&self) -> i32 {
        self.completion.code()
    }

    /// The value handed to a top-level `Return`, if any.
    pub fn returned(&self) -> Option<&Value> {
        match &self.completion {
            Completion::Returned(value) => Some(value),
            _ => None,
        }
    }
}

pub struct Interpreter {
    evaluator: Box<dyn ExpressionEvaluator>,
    host: Host,
}

impl Interpreter {
    pub fn new(options: &Options) -> Self {
        Self::with_evaluator(options, StandardEvaluator)
    }

    pub fn with_evaluator<E: ExpressionEvaluator + 'static>(options: &Options, evaluator: E) -> Self {
        Self {
            evaluator: Box::new(evaluator),
            host: Host::new(options),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator.as_ref()
    }

    /// Clean `source` and respell its literal keywords for this evaluator.
    pub fn prepare(&self, source: &str) -> Program {
        self.respell(Program::from_source(source))
    }

    fn respell(&self, program: Program) -> Program {
        program.map_literals(|literal| self.evaluator.native_literal(literal))
    }

    /// Run `source` in a fresh frame holding only the built-ins.
    pub fn run_source(&mut self, source: &str) -> RunOutcome {
        let program = Program::from_source(source);
        self.run(&program, Frame::with_builtins())
    }

    /// Run `program` starting from `frame`.
    pub fn run(&mut self, program: &Program, mut frame: Frame) -> RunOutcome {
        let program = self.respell(program.clone());
        let completion = match blocks::check_closers(program.lines()) {
            Ok(()) => self.execute(&mut frame, Block::new(program.lines(), 0)),
            Err(err) => {
                self.host.report(&ScriptError::syntax(err.to_string(), err.index() + 1));
                Completion::Failed
            }
        };
        debug!(code = completion.code(), "run finished");
        let frame = (!completion.is_failure()).then_some(frame);
        RunOutcome { completion, frame }
    }

    /// The execution loop: one cursor, one pending-jump slot, run until the
    /// block ends or a signal stops it.
    pub(crate) fn execute(&mut self, frame: &mut Frame, block: Block<'_>) -> Completion {
        debug!(
            first_line = block.offset + 1,
            lines = block.lines.len(),
            depth = self.host.call_depth(),
            "entering frame"
        );

        let mut cursor = 0;
        let mut pending: Option<PendingJump> = None;
        let mut arrived_from: Option<usize> = None;

        let completion = loop {
            if cursor >= block.lines.len() {
                break Completion::Finished;
            }

            if let Some(jump) = pending.filter(|jump| jump.trigger == cursor) {
                trace!(line = block.line_no(cursor), target = jump.target, "scheduled jump fired");
                cursor = jump.target;
                pending = None;
                arrived_from = None;
                continue;
            }

            let ctx = LineContext {
                index: cursor,
                jumped_from: arrived_from.take(),
            };
            if block.lines[cursor].is_empty() {
                cursor += 1;
                continue;
            }

            match statement::evaluate_line(self, frame, block, ctx) {
                Ok(_) => cursor += 1,
                Err(Signal::LineJump { from, to }) => {
                    trace!(from = block.line_no(from), to, "line jump");
                    arrived_from = Some(from);
                    cursor = to;
                }
                Err(Signal::ScheduledLineJump { from, trigger, target }) => {
                    if pending.is_some() {
                        trace!("pending jump overwritten");
                    }
                    trace!(from = block.line_no(from), trigger, target, "jump scheduled");
                    pending = Some(PendingJump { trigger, target });
                    cursor += 1;
                }
                Err(Signal::Exit { .. }) => break Completion::Exited,
                Err(Signal::Return { value, .. }) => break Completion::Returned(value),
                Err(Signal::NoPrint { .. }) => break Completion::Failed,
                Err(Signal::Error(err)) => {
                    self.host.report(&err);
                    break Completion::Failed;
                }
            }
        };

        debug!(code = completion.code(), first_line = block.offset + 1, "leaving frame");
        completion
    }
}
