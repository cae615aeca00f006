use ariadne::Source;
use roux_dynamics::EvalError;
use roux_surface::{ParseError, span::FileInfo};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{}: {error}", info.name())]
    ParseError { info: FileInfo, text: String, error: ParseError },
    #[error("{0}")]
    EvalError(#[from] EvalError),
    #[error("Unknown host library `{0}`")]
    UnknownLibrary(String),
    #[error("Test failed:\n\t{0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl DriverError {
    /// The error as shown to a user; parse errors get a source excerpt.
    pub fn render(&self) -> String {
        match self {
            | DriverError::ParseError { info, text, error } => {
                let mut buf = Vec::new();
                let report = error.to_report(info);
                match report.write((info.name(), Source::from(text.as_str())), &mut buf) {
                    | Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
                    | Err(_) => self.to_string(),
                }
            }
            | _ => self.to_string(),
        }
    }
}
