//! Statement classifier and evaluator.
//!
//! Each cleaned line is classified by its shape, first match wins:
//!
//! | Shape | Example |
//! |---|---|
//! | call of a known function | `Println(x, y)` |
//! | declaration | `lt x = 1` |
//! | reassignment | `x = x + 1` |
//! | function definition | `fn Add(a, b = 1) {` |
//! | counted loop | `for i = 0, 10 {` |
//! | conditional head | `if x == 1 {` |
//! | chain continuation | `} elseif x == 2 {`, `} else {`, `}` |
//! | jump | `goto 4` |
//! | anything else | handed to the expression evaluator |
//!
//! Evaluation never prints. Control flow leaves through the `Err` side as a
//! [`Signal`] for the execution loop.

use std::sync::Arc;

use tracing::debug;

use crate::blocks::{self, Branch, ScanError, Shape};
use crate::error::{ErrorKind, ScriptError};
use crate::func::{Arity, Callable, Func, Param};
use crate::interpreter::{Block, Frame, Interpreter};
use crate::signal::Signal;
use crate::source::{find_unquoted, has_stray_single_quote, is_identifier, split_top_level};
use crate::value::{Scope, Value};

type Outcome = Result<Value, Signal>;

/// Where the line being evaluated sits and how control got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineContext {
    pub index: usize,
    /// Set when the previous step was a `LineJump` issued by that line.
    pub jumped_from: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement<'a> {
    Call { name: &'a str, args: &'a str },
    Declare { name: &'a str, expr: &'a str },
    Assign { name: &'a str, expr: &'a str },
    Define { header: &'a str },
    For { header: &'a str },
    If { cond: &'a str },
    ElseIf { cond: &'a str },
    Else,
    Close,
    Goto { target: &'a str },
    Expr(&'a str),
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// `Name(args)` where `Name` is in the function table and the text ends with
/// the call's `)`.
fn split_call<'a>(text: &'a str, frame: &Frame) -> Option<(&'a str, &'a str)> {
    let open = text.find('(')?;
    let name = &text[..open];
    if !frame.has_function(name) || !text.ends_with(')') {
        return None;
    }
    let args = &text[open + 1..text.len() - 1];
    if closes_early(args) {
        return None;
    }
    Some((name, args))
}

/// True when a `)` in `args` would close the call's own `(`, as in
/// `F(1) + G(2)`.
fn closes_early(args: &str) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in args.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' if depth == 0 => return true,
            ')' => depth -= 1,
            _ => {}
        }
    }
    false
}

/// `name = expr` with a single `=` that is not part of a comparison.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let eq = find_unquoted(line, '=')?;
    let name = line[..eq].trim();
    let rest = &line[eq + 1..];
    if !is_identifier(name) || rest.starts_with('=') {
        return None;
    }
    Some((name, rest.trim()))
}

fn classify<'a>(line: &'a str, frame: &Frame) -> Statement<'a> {
    if let Some((name, args)) = split_call(line, frame) {
        return Statement::Call { name, args };
    }
    if let Some(rest) = line.strip_prefix("lt ") {
        let (name, expr) = match find_unquoted(rest, '=') {
            Some(eq) => (rest[..eq].trim(), rest[eq + 1..].trim()),
            None => (rest.trim(), ""),
        };
        return Statement::Declare { name, expr };
    }
    if let Some((name, expr)) = split_assignment(line) {
        return Statement::Assign { name, expr };
    }
    if let Some(header) = line.strip_prefix("fn ").and_then(|h| h.strip_suffix('{')) {
        return Statement::Define { header: header.trim() };
    }
    if let Some(header) = line.strip_prefix("for ").and_then(|h| h.strip_suffix('{')) {
        return Statement::For { header: header.trim() };
    }
    if let Some(cond) = line.strip_prefix("if ").and_then(|h| h.strip_suffix('{')) {
        return Statement::If { cond: cond.trim() };
    }
    match blocks::shape(line) {
        Shape::ElseIf(cond) => return Statement::ElseIf { cond },
        Shape::Else => return Statement::Else,
        Shape::Close => return Statement::Close,
        Shape::Opener | Shape::Plain => {}
    }
    if let Some(target) = line.strip_prefix("goto ") {
        return Statement::Goto { target: target.trim() };
    }
    Statement::Expr(line)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `block.lines[ctx.index]` against `frame`.
pub(crate) fn evaluate_line(
    interp: &mut Interpreter,
    frame: &mut Frame,
    block: Block<'_>,
    ctx: LineContext,
) -> Outcome {
    let idx = ctx.index;
    let line = block.lines[idx].as_str();
    let line_no = block.line_no(idx);

    if has_stray_single_quote(line) {
        return Err(ScriptError::syntax("single quotes are reserved, use double quotes", line_no).into());
    }

    match classify(line, frame) {
        Statement::Call { name, args } => call_function(interp, frame, name, args, line_no),
        Statement::Declare { name, expr } => declare(interp, frame, name, expr, line_no),
        Statement::Assign { name, expr } => assign(interp, frame, name, expr, line_no),
        Statement::Define { header } => define_function(interp, frame, block, idx, header),
        Statement::For { header } => run_for(interp, frame, block, idx, header),
        Statement::If { cond } => enter_branch(interp, frame, block, idx, cond),
        Statement::ElseIf { cond } => {
            if is_branch_entry(block, idx, ctx.jumped_from) {
                enter_branch(interp, frame, block, idx, cond)
            } else {
                skip_rest_of_chain(block, idx)
            }
        }
        Statement::Else => {
            if is_branch_entry(block, idx, ctx.jumped_from) {
                Ok(Value::Null)
            } else {
                skip_rest_of_chain(block, idx)
            }
        }
        Statement::Close => Ok(Value::Null),
        Statement::Goto { target } => goto(interp, frame, block, idx, target),
        Statement::Expr(expr) => evaluate_external(interp, &frame.scope, expr, line_no),
    }
}

fn scan_error(block: Block<'_>, err: ScanError) -> Signal {
    ScriptError::syntax(err.to_string(), block.line_no(err.index())).into()
}

/// Hand `expr` to the expression evaluator.
fn evaluate_external(interp: &Interpreter, scope: &Scope, expr: &str, line_no: usize) -> Outcome {
    interp
        .evaluator()
        .evaluate(scope, expr)
        .map_err(|err| ScriptError::new(ErrorKind::Evaluation, err.to_string(), line_no).into())
}

/// Like [`evaluate_external`], but a whole-text call of a known function is
/// performed by the engine.
fn eval_expression(interp: &mut Interpreter, frame: &mut Frame, expr: &str, line_no: usize) -> Outcome {
    match split_call(expr, frame) {
        Some((name, args)) => call_function(interp, frame, name, args, line_no),
        None => evaluate_external(interp, &frame.scope, expr, line_no),
    }
}

// ---------------------------------------------------------------------------
// Calls and bindings
// ---------------------------------------------------------------------------

/// Pad unmatched parentheses (outside strings) so the argument text parses.
fn balance_parens(args: &str) -> String {
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in args.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => opened += 1,
            ')' => closed += 1,
            _ => {}
        }
    }
    if opened > closed {
        format!("{}{}", args, ")".repeat(opened - closed))
    } else {
        format!("{}{}", "(".repeat(closed - opened), args)
    }
}

fn call_function(
    interp: &mut Interpreter,
    frame: &mut Frame,
    name: &str,
    args: &str,
    line_no: usize,
) -> Outcome {
    let Some(callable) = frame.funcs.get(name).cloned() else {
        return Err(ScriptError::func(format!("unknown function `{}`", name), line_no).into());
    };

    let args = args.trim();
    let args = if args.is_empty() {
        Vec::new()
    } else {
        eval_expression(interp, frame, &balance_parens(args), line_no)?.into_args()
    };

    match callable {
        Callable::Native(native) => {
            if let Arity::Fixed(expected) = native.arity() {
                if expected != args.len() {
                    return Err(ScriptError::func(
                        format!("`{}` expected {} argument(s), got {}", name, expected, args.len()),
                        line_no,
                    )
                    .into());
                }
            }
            native.call(interp.host_mut(), line_no, args)
        }
        Callable::User(func) => func.invoke(interp, frame, args, line_no),
    }
}

fn declare(interp: &mut Interpreter, frame: &mut Frame, name: &str, expr: &str, line_no: usize) -> Outcome {
    if !is_identifier(name) {
        return Err(ScriptError::syntax(format!("invalid variable name '{}'", name), line_no).into());
    }
    if frame.scope.contains_key(name) {
        return Err(ScriptError::new(
            ErrorKind::Variable,
            format!("cannot create variable '{}', already exists", name),
            line_no,
        )
        .into());
    }
    let value = eval_expression(interp, frame, expr, line_no)?;
    frame.scope.insert(name.to_string(), value);
    Ok(Value::Null)
}

fn assign(interp: &mut Interpreter, frame: &mut Frame, name: &str, expr: &str, line_no: usize) -> Outcome {
    if !frame.scope.contains_key(name) {
        return Err(ScriptError::new(
            ErrorKind::Variable,
            format!("cannot reassign variable '{}', it doesn't exist", name),
            line_no,
        )
        .into());
    }
    let value = eval_expression(interp, frame, expr, line_no)?;
    frame.scope.insert(name.to_string(), value);
    Ok(Value::Null)
}

/// `fn Name(params) {`: bind the function and continue past its body.
fn define_function(
    interp: &mut Interpreter,
    frame: &mut Frame,
    block: Block<'_>,
    idx: usize,
    header: &str,
) -> Outcome {
    let line_no = block.line_no(idx);
    let (name, params) = match header.find('(') {
        Some(open) if header.ends_with(')') => (header[..open].trim(), &header[open + 1..header.len() - 1]),
        _ => {
            return Err(ScriptError::syntax("expected `fn <name>(<params>) {`", line_no).into());
        }
    };
    if !is_identifier(name) {
        return Err(ScriptError::syntax(format!("invalid function name '{}'", name), line_no).into());
    }

    let mut parsed: Vec<Param> = Vec::new();
    if !params.trim().is_empty() {
        for piece in split_top_level(params, ',') {
            let (param, default) = match find_unquoted(piece, '=') {
                Some(eq) => {
                    let default = eval_expression(interp, frame, piece[eq + 1..].trim(), line_no)?;
                    (piece[..eq].trim(), Some(default))
                }
                None => (piece, None),
            };
            if !is_identifier(param) {
                return Err(ScriptError::syntax(format!("invalid parameter name '{}'", param), line_no).into());
            }
            if parsed.iter().any(|p| p.name == param) {
                return Err(ScriptError::syntax(format!("duplicate parameter '{}'", param), line_no).into());
            }
            parsed.push(Param {
                name: param.to_string(),
                default,
            });
        }
    }

    let (body, end) = blocks::collect_block_body(block.lines, idx).map_err(|e| scan_error(block, e))?;
    let func = Func {
        name: name.to_string(),
        params: parsed,
        body: body.to_vec(),
        offset: block.offset + idx + 1,
    };
    let replaced = frame
        .funcs
        .insert(name.to_string(), Callable::User(Arc::new(func)))
        .is_some();
    debug!(function = name, line = line_no, replaced, "function defined");

    Err(Signal::LineJump { from: idx, to: end + 1 })
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

fn loop_bound(
    interp: &mut Interpreter,
    frame: &mut Frame,
    expr: &str,
    which: &str,
    line_no: usize,
) -> Result<i64, Signal> {
    match eval_expression(interp, frame, expr, line_no)? {
        Value::Int(i) => Ok(i),
        other => Err(ScriptError::new(
            ErrorKind::Type,
            format!("for loop {} must be int, got '{}'", which, other.type_name()),
            line_no,
        )
        .into()),
    }
}

/// `for name = start, end {`: run the body once per integer in
/// `[start, end)`, then skip past the block.
fn run_for(interp: &mut Interpreter, frame: &mut Frame, block: Block<'_>, idx: usize, header: &str) -> Outcome {
    let line_no = block.line_no(idx);
    let shape_error = || -> Signal {
        ScriptError::new(
            ErrorKind::Expression,
            "expected `for <name> = <start>, <end> {`",
            line_no,
        )
        .into()
    };

    let eq = find_unquoted(header, '=').ok_or_else(shape_error)?;
    let name = header[..eq].trim();
    let bounds = split_top_level(&header[eq + 1..], ',');
    let [start, end] = bounds.as_slice() else {
        return Err(shape_error());
    };
    if !is_identifier(name) {
        return Err(ScriptError::new(
            ErrorKind::Expression,
            format!("invalid loop variable '{}'", name),
            line_no,
        )
        .into());
    }
    let start = loop_bound(interp, frame, start, "start", line_no)?;
    let end = loop_bound(interp, frame, end, "end", line_no)?;

    let (_, close) = blocks::collect_block_body(block.lines, idx).map_err(|e| scan_error(block, e))?;
    let body = block.slice(idx + 1, close);
    debug!(line = line_no, start, end, "for loop");

    for i in start..end {
        let completion = if name == "_" {
            interp.execute(frame, body)
        } else {
            let mut child = frame.clone();
            child.scope.insert(name.to_string(), Value::Int(i));
            let completion = interp.execute(&mut child, body);
            if !completion.is_failure() {
                frame.merge_from(&child, &[name]);
            }
            completion
        };
        completion.into_signal(line_no, Value::Null)?;
    }

    Err(Signal::ScheduledLineJump {
        from: idx,
        trigger: idx + 1,
        target: close + 1,
    })
}

// ---------------------------------------------------------------------------
// Conditionals
// ---------------------------------------------------------------------------

fn condition(interp: &mut Interpreter, frame: &mut Frame, cond: &str, line_no: usize) -> Result<bool, Signal> {
    if cond.is_empty() {
        return Err(ScriptError::new(ErrorKind::Expression, "missing condition", line_no).into());
    }
    Ok(eval_expression(interp, frame, cond, line_no)?.is_truthy())
}

/// Evaluate the condition of the `if`/`elseif` at `idx`. A true branch runs
/// to its end and then skips the rest of the chain; a false one jumps to the
/// next sibling, or past the chain when there is none.
fn enter_branch(interp: &mut Interpreter, frame: &mut Frame, block: Block<'_>, idx: usize, cond: &str) -> Outcome {
    let line_no = block.line_no(idx);
    let truth = condition(interp, frame, cond, line_no)?;

    let scan = |e| scan_error(block, e);
    let close = blocks::find_matching_close(block.lines, idx).map_err(scan)?;
    let (next, kind) = blocks::next_boundary(block.lines, idx).map_err(scan)?;

    if truth {
        Err(Signal::ScheduledLineJump {
            from: idx,
            trigger: next,
            target: close + 1,
        })
    } else {
        let to = if kind == Branch::Close { close + 1 } else { next };
        Err(Signal::LineJump { from: idx, to })
    }
}

/// True when the previous step was the false branch directly above `idx`
/// jumping here.
fn is_branch_entry(block: Block<'_>, idx: usize, jumped_from: Option<usize>) -> bool {
    let Some(from) = jumped_from else {
        return false;
    };
    let from_line = block.lines[from].as_str();
    let is_head = from_line.starts_with("if ") && from_line.ends_with('{');
    if !is_head && !matches!(blocks::shape(from_line), Shape::ElseIf(_)) {
        return false;
    }
    matches!(blocks::next_boundary(block.lines, from), Ok((next, _)) if next == idx)
}

/// A continuation line reached without being selected: the branch above it
/// ran, so leave the chain.
fn skip_rest_of_chain(block: Block<'_>, idx: usize) -> Outcome {
    let close = blocks::find_matching_close(block.lines, idx).map_err(|e| scan_error(block, e))?;
    Err(Signal::ScheduledLineJump {
        from: idx,
        trigger: idx + 1,
        target: close + 1,
    })
}

// ---------------------------------------------------------------------------
// Jumps
// ---------------------------------------------------------------------------

/// `goto n`: jump to source line `n`, which must lie in this block or be the
/// line just past it.
fn goto(interp: &mut Interpreter, frame: &mut Frame, block: Block<'_>, idx: usize, target: &str) -> Outcome {
    let line_no = block.line_no(idx);
    let n = match eval_expression(interp, frame, target, line_no)? {
        Value::Int(n) => n,
        other => {
            return Err(ScriptError::value(
                format!("goto target must be int, got '{}'", other.type_name()),
                line_no,
            )
            .into());
        }
    };

    let first = block.offset as i64 + 1;
    let last = (block.offset + block.lines.len()) as i64 + 1;
    if n == line_no as i64 {
        return Err(ScriptError::new(ErrorKind::OutOfIndex, "cannot goto the current line", line_no).into());
    }
    if n < first || n > last {
        return Err(ScriptError::new(
            ErrorKind::OutOfIndex,
            format!("goto target {} is outside lines {}..{}", n, first, last),
            line_no,
        )
        .into());
    }

    Err(Signal::LineJump {
        from: idx,
        to: (n - first) as usize,
    })
}
