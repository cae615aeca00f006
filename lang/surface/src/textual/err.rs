use crate::span::{FileInfo, Span};
use ariadne::{Label, Report, ReportKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid token at {span}")]
    InvalidToken { span: Span },
    #[error("Unexpected `{found}` at {span}")]
    Unexpected { found: String, span: Span },
    #[error("Unexpected end of input; expected {expected}")]
    UnexpectedEof { expected: String, span: Span },
    #[error("Unterminated block comment starting at {span}")]
    UnterminatedComment { span: Span },
    #[error("Bad literal at {span}: {msg}")]
    BadLiteral { msg: String, span: Span },
}

pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            | ParseError::InvalidToken { span }
            | ParseError::Unexpected { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::UnterminatedComment { span }
            | ParseError::BadLiteral { span, .. } => *span,
        }
    }

    /// Create an Ariadne report for this parse error.
    pub fn to_report(&self, info: &FileInfo) -> Report<'static, (String, std::ops::Range<usize>)> {
        let file = info.name();
        let span = self.span();
        let at = info.line_col(span.start);
        let label = match self {
            | ParseError::InvalidToken { .. } => format!("invalid token at {}", at),
            | ParseError::Unexpected { found, .. } => format!("`{}` is not expected here", found),
            | ParseError::UnexpectedEof { expected, .. } => {
                format!("input ends here; expected {}", expected)
            }
            | ParseError::UnterminatedComment { .. } => "comment opened here".to_string(),
            | ParseError::BadLiteral { msg, .. } => msg.clone(),
        };
        Report::build(ReportKind::Error, file.clone(), span.start)
            .with_message("Parse error")
            .with_label(Label::new((file, span.range())).with_message(label))
            .finish()
    }
}
