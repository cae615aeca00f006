use super::err::ParseError;
use crate::span::Span;
use logos::{Logos, SpannedIter};
use std::fmt::{Debug, Display};

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
pub enum Tok<'input> {
    #[regex(r#"[^\s()\[\]'";#|]+"#, priority = 1)]
    Ident(&'input str),
    #[regex(r"[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", priority = 3)]
    NumLit(&'input str),
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    StrLit(&'input str),
    #[regex(r"#\\([a-zA-Z0-9]+|.)")]
    CharLit(&'input str),

    #[token("#t")]
    #[token("#true")]
    True,
    #[token("#f")]
    #[token("#false")]
    False,

    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("#(")]
    VectorOpen,
    #[token("'")]
    Quote,
    #[token(".")]
    Dot,

    #[token("#|")]
    CommentStart,
    #[token("|#")]
    CommentEnd,
}

impl Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            | Tok::Ident(s) => write!(f, "{}", s),
            | Tok::NumLit(s) => write!(f, "{}", s),
            | Tok::StrLit(s) => write!(f, "{}", s),
            | Tok::CharLit(s) => write!(f, "{}", s),
            | Tok::True => write!(f, "#t"),
            | Tok::False => write!(f, "#f"),
            | Tok::ParenOpen => write!(f, "("),
            | Tok::ParenClose => write!(f, ")"),
            | Tok::BracketOpen => write!(f, "["),
            | Tok::BracketClose => write!(f, "]"),
            | Tok::VectorOpen => write!(f, "#("),
            | Tok::Quote => write!(f, "'"),
            | Tok::Dot => write!(f, "."),
            | Tok::CommentStart => write!(f, "#|"),
            | Tok::CommentEnd => write!(f, "|#"),
        }
    }
}

/// Token stream with nested `#| ... |#` comments removed.
pub struct Lexer<'source> {
    inner: SpannedIter<'source, Tok<'source>>,
    comment_depth: usize,
    comment_start: usize,
    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Tok::lexer(source).spanned(),
            comment_depth: 0,
            comment_start: 0,
            finished: false,
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<(Span, Tok<'source>), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.inner.next() {
                | Some((Ok(Tok::CommentStart), range)) => {
                    if self.comment_depth == 0 {
                        self.comment_start = range.start;
                    }
                    self.comment_depth += 1;
                }
                | Some((Ok(Tok::CommentEnd), range)) => {
                    if self.comment_depth == 0 {
                        self.finished = true;
                        break Some(Err(ParseError::Unexpected {
                            found: "|#".to_string(),
                            span: Span::new(range.start, range.end),
                        }));
                    }
                    self.comment_depth -= 1;
                }
                // anything goes inside a comment, including text the lexer rejects
                | Some(_) if self.comment_depth > 0 => continue,
                | Some((Ok(tok), range)) => break Some(Ok((Span::new(range.start, range.end), tok))),
                | Some((Err(()), range)) => {
                    self.finished = true;
                    break Some(Err(ParseError::InvalidToken {
                        span: Span::new(range.start, range.end),
                    }));
                }
                | None if self.comment_depth > 0 => {
                    self.finished = true;
                    break Some(Err(ParseError::UnterminatedComment {
                        span: Span::new(self.comment_start, self.comment_start + 2),
                    }));
                }
                | None => {
                    self.finished = true;
                    break None;
                }
            }
        }
    }
}
