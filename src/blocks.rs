//! Block scanner: brace-nesting lookups over a window of statement lines.
//!
//! A line ending in `{` opens a block, a bare `}` closes one, and
//! `} else {` / `} elseif <cond> {` close one branch of a conditional chain
//! while opening the next. The scanner never evaluates anything; it only
//! counts nesting so the statement evaluator can compute jump targets.

/// Structural shape of one cleaned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    Opener,
    ElseIf(&'a str),
    Else,
    Close,
    Plain,
}

pub fn shape(line: &str) -> Shape<'_> {
    let line = line.trim();
    if line == "}" {
        return Shape::Close;
    }
    if let Some(rest) = line.strip_prefix('}') {
        let rest = rest.trim_start();
        if let Some(body) = rest.strip_suffix('{') {
            let body = body.trim_end();
            if body == "else" {
                return Shape::Else;
            }
            if let Some(cond) = body.strip_prefix("elseif") {
                if cond.is_empty() || cond.starts_with(char::is_whitespace) {
                    return Shape::ElseIf(cond.trim());
                }
            }
        }
    }
    if line.ends_with('{') {
        Shape::Opener
    } else {
        Shape::Plain
    }
}

/// Which kind of chain boundary a caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    ElseIf,
    Else,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("block opened here is never closed")]
    Unclosed { index: usize },
    #[error("unexpected '{keyword}'")]
    Unexpected { index: usize, keyword: &'static str },
}

impl ScanError {
    /// Index of the line the error should be reported against.
    pub fn index(&self) -> usize {
        match self {
            ScanError::Unclosed { index } | ScanError::Unexpected { index, .. } => *index,
        }
    }
}

/// First line after `from` that ends the block opened at `from`: a bare `}`
/// or a chain continuation at depth 0.
pub fn next_boundary(lines: &[String], from: usize) -> Result<(usize, Branch), ScanError> {
    let mut depth = 0usize;
    for (i, line) in lines.iter().enumerate().skip(from + 1) {
        match shape(line) {
            Shape::Opener => depth += 1,
            Shape::Close if depth == 0 => return Ok((i, Branch::Close)),
            Shape::Close => depth -= 1,
            Shape::ElseIf(_) if depth == 0 => return Ok((i, Branch::ElseIf)),
            Shape::Else if depth == 0 => return Ok((i, Branch::Else)),
            Shape::ElseIf(_) | Shape::Else | Shape::Plain => {}
        }
    }
    Err(ScanError::Unclosed { index: from })
}

/// Next sibling of kind `want` in the chain that contains `from`.
///
/// Returns `Ok(None)` when the chain's final `}` comes first. An `else`
/// followed by another `else` or `elseif` is a [`ScanError::Unexpected`].
pub fn find_next_branch(
    lines: &[String],
    from: usize,
    want: Branch,
) -> Result<Option<usize>, ScanError> {
    let mut pos = from;
    let mut seen_else = matches!(lines.get(from).map(|l| shape(l)), Some(Shape::Else));
    loop {
        let (index, kind) = next_boundary(lines, pos)?;
        match kind {
            Branch::Close => {
                return Ok((want == Branch::Close).then_some(index));
            }
            Branch::Else | Branch::ElseIf if seen_else => {
                let keyword = if kind == Branch::Else { "else" } else { "elseif" };
                return Err(ScanError::Unexpected { index, keyword });
            }
            Branch::Else => seen_else = true,
            Branch::ElseIf => {}
        }
        if kind == want {
            return Ok(Some(index));
        }
        pos = index;
    }
}

/// Index of the `}` that ends the whole chain (or plain block) opened at
/// `from`.
pub fn find_matching_close(lines: &[String], from: usize) -> Result<usize, ScanError> {
    find_next_branch(lines, from, Branch::Close)?.ok_or(ScanError::Unclosed { index: from })
}

/// The lines strictly between the opener at `from` and its `}`, plus the
/// index of that `}`. Nested blocks are kept verbatim.
///
/// Only plain blocks qualify: a depth-0 `else`/`elseif` is an error.
pub fn collect_block_body(lines: &[String], from: usize) -> Result<(&[String], usize), ScanError> {
    match next_boundary(lines, from)? {
        (end, Branch::Close) => Ok((&lines[from + 1..end], end)),
        (index, Branch::Else) => Err(ScanError::Unexpected { index, keyword: "else" }),
        (index, Branch::ElseIf) => Err(ScanError::Unexpected { index, keyword: "elseif" }),
    }
}

/// Whole-program check that every `}`, `} else {` and `} elseif {` has an
/// open block to close. Unclosed openers are left to the lookups above,
/// which report them when execution reaches them.
pub fn check_closers(lines: &[String]) -> Result<(), ScanError> {
    let mut depth = 0usize;
    for (index, line) in lines.iter().enumerate() {
        let keyword = match shape(line) {
            Shape::Opener => {
                depth += 1;
                continue;
            }
            Shape::Plain => continue,
            Shape::Close if depth > 0 => {
                depth -= 1;
                continue;
            }
            Shape::ElseIf(_) | Shape::Else if depth > 0 => continue,
            Shape::Close => "}",
            Shape::ElseIf(_) => "elseif",
            Shape::Else => "else",
        };
        return Err(ScanError::Unexpected { index, keyword });
    }
    Ok(())
}
