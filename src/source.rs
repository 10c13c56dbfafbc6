//! Source pre-pass and quote-aware text helpers.
//!
//! Lines are cleaned once before execution: comments are stripped and the
//! literal keywords are respelled for the active expression evaluator. Blank
//! and comment-only lines stay in place as empty strings so that line numbers
//! never shift.

/// An immutable, 0-indexed sequence of cleaned statement lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    /// Clean every line of `source`.
    pub fn from_source(source: &str) -> Self {
        Self {
            lines: source.lines().map(clean_line).collect(),
        }
    }

    /// Respell `null`/`true`/`false` on every line.
    pub fn map_literals<'a, F>(self, spell: F) -> Self
    where
        F: Fn(Literal) -> &'a str,
    {
        Self {
            lines: self
                .lines
                .iter()
                .map(|l| substitute_literals(l, &spell))
                .collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Trim a raw line and drop a trailing `// ...` comment.
///
/// `//` inside a double-quoted string is kept; a backslash inside a string
/// escapes the next character.
pub fn clean_line(raw: &str) -> String {
    let line = raw.trim();
    if !line.contains("//") {
        return line.to_string();
    }
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_slash = false;
    for (i, c) in line.char_indices() {
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
            '"' => {
                in_string = true;
                prev_slash = false;
            }
            '/' if prev_slash => return line[..i - 1].trim_end().to_string(),
            '/' => prev_slash = true,
            _ => prev_slash = false,
        }
    }
    line.to_string()
}

/// The literal keywords recognised by the pre-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    True,
    False,
}

impl Literal {
    pub fn keyword(self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::True => "true",
            Literal::False => "false",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "null" => Some(Literal::Null),
            "true" => Some(Literal::True),
            "false" => Some(Literal::False),
            _ => None,
        }
    }
}

/// Replace whole-word, unquoted `null`/`true`/`false` with `spell(literal)`.
pub fn substitute_literals<'a, F>(line: &str, spell: F) -> String
where
    F: Fn(Literal) -> &'a str,
{
    let mut out = String::with_capacity(line.len());
    let mut word = String::new();
    let mut in_string = false;
    let mut escaped = false;

    let flush = |word: &mut String, out: &mut String| {
        match Literal::from_word(word) {
            Some(lit) => out.push_str(spell(lit)),
            None => out.push_str(word),
        }
        word.clear();
    };

    for c in line.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        flush(&mut word, &mut out);
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    flush(&mut word, &mut out);
    out
}

/// True when `line` holds a single quote outside of a string literal that
/// is not preceded by a backslash.
pub fn has_stray_single_quote(line: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            '\'' if !in_string => return true,
            _ => {}
        }
    }
    false
}

/// Byte index of the first `target` outside a double-quoted string.
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

/// Split on `sep` where it is outside strings and outside any `()`, `[]` or
/// `{}` nesting. Pieces are trimmed.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
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
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
