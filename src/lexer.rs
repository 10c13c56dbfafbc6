use crate::expression::EvalError;

/// A single token of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    /// `"..."`, escape sequences already resolved.
    Str(String),
    /// Names, including the word operators `and`, `or`, `not` and the
    /// literal keywords.
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Int(i) => i.to_string(),
            Token::Float(x) => x.to_string(),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::SlashSlash => "//".into(),
            Token::Percent => "%".into(),
            Token::EqEq => "==".into(),
            Token::NotEq => "!=".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Le => "<=".into(),
            Token::Ge => ">=".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBracket => "[".into(),
            Token::RBracket => "]".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::Comma => ",".into(),
            Token::Colon => ":".into(),
        }
    }
}

/// Tokenize one expression.
pub fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() {
            let mut num = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '_' {
                    if d != '_' {
                        num.push(d);
                    }
                    chars.next();
                } else {
                    break;
                }
            }
            let mut is_float = false;
            if chars.peek() == Some(&'.') {
                chars.next();
                is_float = true;
                num.push('.');
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    num.push(d);
                    chars.next();
                }
            }
            let token = if is_float {
                Token::Float(num.parse().map_err(|_| {
                    EvalError::Syntax(format!("invalid number literal '{}'", num))
                })?)
            } else {
                Token::Int(num.parse().map_err(|_| {
                    EvalError::Syntax(format!("integer literal '{}' is too large", num))
                })?)
            };
            tokens.push(token);
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Ident(word));
            continue;
        }

        if c == '"' {
            chars.next(); // consume opening '"'
            let mut s = String::new();
            loop {
                match chars.next() {
                    None => {
                        return Err(EvalError::Syntax("unterminated string literal".into()));
                    }
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('"') => s.push('"'),
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some('\\') => s.push('\\'),
                        Some('\'') => s.push('\''),
                        Some(nc) => {
                            s.push('\\');
                            s.push(nc);
                        }
                        None => {
                            return Err(EvalError::Syntax("unterminated string literal".into()));
                        }
                    },
                    Some(ch) => s.push(ch),
                }
            }
            tokens.push(Token::Str(s));
            continue;
        }

        chars.next();
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '%' => Token::Percent,
            '/' => {
                if chars.peek() == Some(&'/') {
                    chars.next();
                    Token::SlashSlash
                } else {
                    Token::Slash
                }
            }
            '=' if chars.peek() == Some(&'=') => {
                chars.next();
                Token::EqEq
            }
            '!' if chars.peek() == Some(&'=') => {
                chars.next();
                Token::NotEq
            }
            '<' => {
                if chars.peek() == Some(&'=') {
                    chars.next();
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if chars.peek() == Some(&'=') {
                    chars.next();
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            ':' => Token::Colon,
            other => {
                return Err(EvalError::Syntax(format!("unexpected character '{}'", other)));
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}
