use crate::ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use crate::expression::EvalError;
use crate::lexer::{self, Token};
use crate::value::Value;

type Result<T> = std::result::Result<T, EvalError>;

/// Parse one expression. A bare top-level comma list becomes a tuple.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = lexer::tokenize(source)?;
    if tokens.is_empty() {
        return Err(EvalError::Syntax("empty expression".into()));
    }
    let mut p = Parser { tokens, cursor: 0 };
    let expr = p.parse_tuple()?;
    match p.peek() {
        None => Ok(expr),
        Some(tok) => Err(EvalError::Syntax(format!("unexpected '{}'", tok.describe()))),
    }
}

// ---------------------------------------------------------------------------
// Internal parser state
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn eat(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(w)) if w == word) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        match self.next() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(EvalError::Syntax(format!(
                "expected '{}', got '{}'",
                want.describe(),
                tok.describe()
            ))),
            None => Err(EvalError::Syntax(format!(
                "expected '{}', got end of expression",
                want.describe()
            ))),
        }
    }

    /// Comma-separated items up to `close`, allowing a trailing comma.
    fn parse_items(&mut self, close: &Token) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.parse_or()?);
            if !self.eat(&Token::Comma) {
                self.expect(close.clone())?;
                break;
            }
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // Precedence levels, loosest first
    // -----------------------------------------------------------------------

    fn parse_tuple(&mut self) -> Result<Expr> {
        let first = self.parse_or()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.peek().is_none() {
                break;
            }
            items.push(self.parse_or()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_word("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_word("and") {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.eat_word("not") {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => CompareOp::Eq,
                Some(Token::NotEq) => CompareOp::NotEq,
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::Le) => CompareOp::Le,
                Some(Token::Ge) => CompareOp::Ge,
                _ => break,
            };
            self.cursor += 1;
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.cursor += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::SlashSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.cursor += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Pos,
            _ => return self.parse_postfix(),
        };
        self.cursor += 1;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::LBracket) {
            let index = self.parse_or()?;
            self.expect(Token::RBracket)?;
            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let tok = self
            .next()
            .ok_or_else(|| EvalError::Syntax("unexpected end of expression".into()))?;
        match tok {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Ident(word) => match word.as_str() {
                "null" => Ok(Expr::Literal(Value::Null)),
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "and" | "or" | "not" => {
                    Err(EvalError::Syntax(format!("unexpected '{}'", word)))
                }
                _ if self.eat(&Token::LParen) => {
                    let args = self.parse_items(&Token::RParen)?;
                    Ok(Expr::Call { name: word, args })
                }
                _ => Ok(Expr::Name(word)),
            },
            Token::LParen => {
                if self.eat(&Token::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.parse_or()?;
                if self.eat(&Token::RParen) {
                    return Ok(first);
                }
                self.expect(Token::Comma)?;
                let mut items = vec![first];
                items.extend(self.parse_items(&Token::RParen)?);
                Ok(Expr::Tuple(items))
            }
            Token::LBracket => Ok(Expr::List(self.parse_items(&Token::RBracket)?)),
            Token::LBrace => {
                let mut pairs = Vec::new();
                while !self.eat(&Token::RBrace) {
                    let key = self.parse_or()?;
                    self.expect(Token::Colon)?;
                    let value = self.parse_or()?;
                    pairs.push((key, value));
                    if !self.eat(&Token::Comma) {
                        self.expect(Token::RBrace)?;
                        break;
                    }
                }
                Ok(Expr::Map(pairs))
            }
            other => Err(EvalError::Syntax(format!("unexpected '{}'", other.describe()))),
        }
    }
}
