use super::{
    err::{ParseError, Result},
    lexer::{Lexer, Tok},
    syntax::Datum,
};
use crate::span::Span;
use roux_syntax::{char_by_name, unescape_string};

/// Read every top-level form in `source`.
pub fn parse(source: &str) -> Result<Vec<Datum>> {
    Reader::new(source).read_all()
}

pub struct Reader<'src> {
    tokens: Lexer<'src>,
    eof: Span,
}

impl<'src> Reader<'src> {
    pub fn new(source: &'src str) -> Self {
        Reader { tokens: Lexer::new(source), eof: Span::new(source.len(), source.len()) }
    }

    pub fn read_all(mut self) -> Result<Vec<Datum>> {
        let mut forms = Vec::new();
        while let Some(form) = self.read()? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Read the next form, or `None` at end of input.
    pub fn read(&mut self) -> Result<Option<Datum>> {
        match self.tokens.next() {
            | None => Ok(None),
            | Some(tok) => {
                let (span, tok) = tok?;
                self.datum(span, tok).map(Some)
            }
        }
    }

    fn expect_datum(&mut self, expected: &str) -> Result<Datum> {
        match self.tokens.next() {
            | None => Err(ParseError::UnexpectedEof { expected: expected.to_string(), span: self.eof }),
            | Some(tok) => {
                let (span, tok) = tok?;
                self.datum(span, tok)
            }
        }
    }

    fn datum(&mut self, span: Span, tok: Tok<'src>) -> Result<Datum> {
        match tok {
            | Tok::True => Ok(Datum::Bool(true)),
            | Tok::False => Ok(Datum::Bool(false)),
            | Tok::NumLit(s) => s
                .parse::<f64>()
                .map(Datum::Number)
                .map_err(|e| ParseError::BadLiteral { msg: e.to_string(), span }),
            | Tok::StrLit(s) => unescape_string(&s[1..s.len() - 1])
                .map(Datum::String)
                .map_err(|msg| ParseError::BadLiteral { msg, span }),
            | Tok::CharLit(s) => char_literal(&s[2..], span).map(Datum::Char),
            | Tok::Ident(s) => Ok(Datum::Symbol(s.to_string())),
            | Tok::Quote => Ok(self.expect_datum("a datum after `'`")?.quoted()),
            | Tok::ParenOpen => self.list(Tok::ParenClose),
            | Tok::BracketOpen => self.list(Tok::BracketClose),
            | Tok::VectorOpen => self.vector(),
            | tok @ (Tok::ParenClose
            | Tok::BracketClose
            | Tok::Dot
            | Tok::CommentStart
            | Tok::CommentEnd) => Err(ParseError::Unexpected { found: tok.to_string(), span }),
        }
    }

    fn list(&mut self, close: Tok<'src>) -> Result<Datum> {
        let mut items = Vec::new();
        loop {
            let Some(next) = self.tokens.next() else {
                return Err(ParseError::UnexpectedEof {
                    expected: format!("`{}`", close),
                    span: self.eof,
                });
            };
            let (span, tok) = next?;
            if tok == close {
                return Ok(Datum::List(items, None));
            }
            if tok == Tok::Dot {
                if items.is_empty() {
                    return Err(ParseError::Unexpected { found: ".".to_string(), span });
                }
                let tail = self.expect_datum("a datum after `.`")?;
                return match self.tokens.next() {
                    | Some(Ok((_, tok))) if tok == close => Ok(Datum::List(items, Some(Box::new(tail)))),
                    | Some(Ok((span, tok))) => {
                        Err(ParseError::Unexpected { found: tok.to_string(), span })
                    }
                    | Some(Err(err)) => Err(err),
                    | None => Err(ParseError::UnexpectedEof {
                        expected: format!("`{}`", close),
                        span: self.eof,
                    }),
                };
            }
            items.push(self.datum(span, tok)?);
        }
    }

    fn vector(&mut self) -> Result<Datum> {
        let mut items = Vec::new();
        loop {
            let Some(next) = self.tokens.next() else {
                return Err(ParseError::UnexpectedEof { expected: "`)`".to_string(), span: self.eof });
            };
            match next? {
                | (_, Tok::ParenClose) => return Ok(Datum::Vector(items)),
                | (span, tok) => items.push(self.datum(span, tok)?),
            }
        }
    }
}

fn char_literal(body: &str, span: Span) -> Result<char> {
    let mut chars = body.chars();
    match (chars.next(), chars.next()) {
        | (Some(c), None) => Ok(c),
        | _ => {
            if let Some(c) = char_by_name(body) {
                return Ok(c);
            }
            body.strip_prefix('x')
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| ParseError::BadLiteral {
                    msg: format!("unknown character name `{}`", body),
                    span,
                })
        }
    }
}
