use crate::{
    env::Environment,
    err::{EvalError, Result},
    link::Link,
    syntax::Value,
};

pub const PRELUDE: &str = include_str!("prelude.scm");

impl Environment {
    /// Parse and evaluate source text here, returning the last value.
    pub fn eval_source(&self, source: &str) -> Result<Value> {
        let forms = roux_surface::parse(source)
            .map_err(|err| EvalError::malformed("read", err.to_string()))?;
        let forms = forms.link(&self.world().symbols);
        let mut last = Value::Unspecified;
        let mut failure = None;
        self.eval_program(forms, |v, _| last = v, |err| failure = Some(err));
        match failure {
            | Some(err) => Err(err),
            | None => Ok(last),
        }
    }

    pub(crate) fn load_prelude(&self) -> Result<()> {
        log::debug!("loading prelude");
        self.eval_source(PRELUDE).map(|_| ())
    }
}
