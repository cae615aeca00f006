use crate::{
    conf::Conf,
    err::{DriverError, Result},
};
use roux_dynamics::{
    Environment, Link, World,
    syntax::{Sourceify, Value},
};
use roux_host::Host;
use roux_surface::{Datum, span::FileInfo};
use std::{
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

/// Parse without evaluating.
pub fn check_source(path: Option<PathBuf>, text: &str) -> Result<Vec<Datum>> {
    roux_surface::parse(text).map_err(|error| DriverError::ParseError {
        info: FileInfo::new(text, path.map(Arc::new)),
        text: text.to_string(),
        error,
    })
}

pub struct Session {
    pub conf: Conf,
    pub host: Host,
    pub env: Environment,
}

impl Session {
    pub fn new(conf: Conf, output: Box<dyn Write>) -> Result<Self> {
        let host = Host::new(conf.window_title.clone());
        let world = World::new(Rc::new(host.registry()), output);
        let env = match conf.prelude {
            | true => Environment::new(world)?,
            | false => Environment::bare(world),
        };
        for name in &conf.libraries {
            let library = host.library(name).ok_or_else(|| DriverError::UnknownLibrary(name.clone()))?;
            env.import_library(&library);
        }
        let session = Session { conf, host, env };
        for path in &session.conf.preload {
            session.run_file(path)?;
        }
        Ok(session)
    }

    /// A session printing to stdout.
    pub fn stdout(conf: Conf) -> Result<Self> {
        Session::new(conf, Box::new(std::io::stdout()))
    }

    /// Run every form of `text`, reporting each value to `on_value` with
    /// whether it is the last. Returns the last value.
    pub fn run_source(
        &self, path: Option<PathBuf>, text: &str, mut on_value: impl FnMut(&Value, bool),
    ) -> Result<Value> {
        let forms = check_source(path, text)?;
        let forms = forms.link(&self.env.world().symbols);
        let mut last = Value::Unspecified;
        let mut failure = None;
        self.env.eval_program(
            forms,
            |v, is_final| {
                on_value(&v, is_final);
                last = v;
            },
            |err| failure = Some(err),
        );
        match failure {
            | Some(err) => Err(err)?,
            | None => Ok(last),
        }
    }

    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        self.run_file_with(path, |_, _| {})
    }

    /// [`Session::run_file`], reporting each top-level value as in
    /// [`Session::run_source`].
    pub fn run_file_with(
        &self, path: impl AsRef<Path>, on_value: impl FnMut(&Value, bool),
    ) -> Result<Value> {
        let path = path.as_ref();
        log::info!("loading `{}`", path.display());
        let text = std::fs::read_to_string(path)?;
        self.run_source(Some(path.to_path_buf()), &text, on_value)
    }

    /// A test program passes when its last value is `#t`.
    pub fn test_file(&self, name: &str, path: impl AsRef<Path>, aloud: bool) -> Result<()> {
        match self.run_file(path)? {
            | Value::Bool(true) => {
                if aloud {
                    use colored::Colorize;
                    let mut out = std::io::stdout();
                    writeln!(out, "test {} ... {}", name, "ok".green())?;
                }
                Ok(())
            }
            | other => {
                let err = format!("expected #t, got {}", other.sourceify());
                Err(DriverError::TestFailed(err))?
            }
        }
    }
}
