use crate::{
    env::{Binding, Environment, Ident},
    err::{EvalError, Result},
    syntax::*,
};
use std::rc::Rc;

/* ------------------------------- Trampoline ------------------------------- */

/// One bounce of the evaluator. Nothing in the evaluator calls a continuation
/// directly; it hands back a [`Step::Next`] for the driver loop to run, so the
/// native stack stays flat however deep the program recurses.
pub enum Step {
    Done(Value),
    Next(Thunk),
}

pub struct Thunk(Box<dyn FnOnce() -> Result<Step>>);

impl Thunk {
    pub fn new(f: impl FnOnce() -> Result<Step> + 'static) -> Self {
        Thunk(Box::new(f))
    }
}

impl Step {
    pub fn next(f: impl FnOnce() -> Result<Step> + 'static) -> Self {
        Step::Next(Thunk::new(f))
    }
    /// Run the trampoline to completion.
    pub fn drain(self) -> Result<Value> {
        let mut res = self;
        let mut steps: u64 = 0;
        loop {
            match res {
                | Step::Done(out) => {
                    log::trace!("drained after {} steps", steps);
                    break Ok(out);
                }
                | Step::Next(Thunk(f)) => {
                    steps += 1;
                    res = f()?;
                }
            }
        }
    }
}

/// The rest of a computation, waiting for one value.
#[derive(Clone)]
pub struct Kont(Rc<dyn Fn(Value) -> Result<Step>>);

impl Kont {
    pub fn new(f: impl Fn(Value) -> Result<Step> + 'static) -> Self {
        Kont(Rc::new(f))
    }
    /// The final continuation: stop the trampoline with the value.
    pub fn done() -> Self {
        Kont::new(|v| Ok(Step::Done(v)))
    }
    /// Invoke now. Only the driver loop and its thunks should do this.
    pub fn resume(&self, v: Value) -> Result<Step> {
        (self.0)(v)
    }
    /// Schedule the invocation as the next step.
    pub fn bounce(&self, v: Value) -> Step {
        let k = self.clone();
        Step::next(move || k.resume(v))
    }
}

/* --------------------------------- Compile -------------------------------- */

impl Value {
    /// Expand macros and resolve identifiers. Keyword-headed forms are run
    /// through their transformer and the output compiled again until no
    /// keyword is left at the head.
    pub fn compile(&self, env: &Environment) -> Result<Value> {
        match self {
            | Value::Symbol(_) | Value::Alias(_) => match Ident::from_value(self) {
                | Some(ident) => compile_ident(env, &ident),
                | None => Ok(self.clone()),
            },
            | Value::Pair(pair) => {
                if let Some(ident) = Ident::from_value(&pair.car()) {
                    if let Binding::Syntax(transformer) = env.resolve(&ident) {
                        log::trace!("expanding `{}`", transformer.name);
                        let expanded = (transformer.transform)(env, self)?;
                        return expanded.compile(env);
                    }
                }
                let items = self.list_to_vec().ok_or_else(|| {
                    EvalError::malformed("application", "operands must form a proper list")
                })?;
                let items = items.iter().map(|form| form.compile(env)).collect::<Result<Vec<_>>>()?;
                Ok(Value::list(items))
            }
            | _ => Ok(self.clone()),
        }
    }
}

fn compile_ident(env: &Environment, ident: &Ident) -> Result<Value> {
    match env.resolve(ident) {
        | Binding::Lexical(binding) => Ok(Value::Lexical(binding)),
        | Binding::Syntax(transformer) => {
            Err(EvalError::malformed(transformer.name.clone(), "syntax keyword used as a variable"))
        }
        | Binding::Global(name, env) => Ok(match env.lookup_global(&name) {
            | Some(loc) => Value::Location(loc),
            | None => Value::Symbol(name),
        }),
    }
}

/* ---------------------------------- Eval ---------------------------------- */

impl Value {
    /// Evaluate a compiled form, delivering its value to `k`.
    pub fn eval(&self, env: &Environment, k: Kont) -> Result<Step> {
        match self {
            | Value::Symbol(name) => {
                let loc = env
                    .lookup_global(name)
                    .ok_or_else(|| EvalError::UnboundReference(name.to_string()))?;
                Ok(k.bounce(loc.get()))
            }
            | Value::Alias(alias) => Value::Symbol(alias.ident.symbol()).eval(env, k),
            | Value::Location(loc) => Ok(k.bounce(loc.get())),
            | Value::Lexical(binding) => Ok(k.bounce(env.lookup_local(binding)?.get())),
            | Value::Pair(_) => {
                let forms = self.list_to_vec().ok_or_else(|| {
                    EvalError::malformed("application", "operands must form a proper list")
                })?;
                let env = env.clone();
                Ok(Step::next(move || eval_application(env, forms.into_iter().collect(), k)))
            }
            | Value::Special(special) => special.eval(env, k),
            | _ => Ok(k.bounce(self.clone())),
        }
    }

    /// Call a procedure value with evaluated arguments.
    pub fn apply(&self, env: &Environment, k: Kont, args: Vec<Value>) -> Result<Step> {
        match self {
            | Value::Native(native) => (native.imp)(env, k, args),
            | Value::Procedure(proc) => proc.call(k, args),
            | Value::Continuation(cont) => match <[Value; 1]>::try_from(args) {
                | Ok([v]) => Ok(cont.kont.bounce(v)),
                | Err(args) => Err(EvalError::ArityError {
                    prim: "continuation".to_string(),
                    expected: "1".to_string(),
                    got: args.len(),
                }),
            },
            | other => Err(EvalError::mismatch(
                "apply",
                format!("{} is not a procedure", other.sourceify()),
            )),
        }
    }
}

type Collect = Rc<dyn Fn(im::Vector<Value>) -> Result<Step>>;

fn eval_application(env: Environment, forms: im::Vector<Value>, k: Kont) -> Result<Step> {
    let caller = env.clone();
    let then: Collect = Rc::new(move |mut values| {
        let Some(head) = values.pop_front() else {
            return Ok(k.bounce(Value::Nil));
        };
        head.apply(&caller, k.clone(), values.into_iter().collect())
    });
    eval_operands(env, forms, im::Vector::new(), then)
}

/// Evaluate `pending` left to right. The partial results are persistent
/// vectors, so re-entering one of these continuations never disturbs the
/// values another entry has collected.
fn eval_operands(
    env: Environment, mut pending: im::Vector<Value>, done: im::Vector<Value>, then: Collect,
) -> Result<Step> {
    let Some(form) = pending.pop_front() else {
        return then(done);
    };
    let next_env = env.clone();
    form.eval(
        &env,
        Kont::new(move |v| {
            let mut done = done.clone();
            done.push_back(v);
            eval_operands(next_env.clone(), pending.clone(), done, then.clone())
        }),
    )
}

/// Evaluate a sequence, the last form in tail position.
pub fn eval_body(env: &Environment, mut body: im::Vector<Value>, k: Kont) -> Result<Step> {
    match body.pop_front() {
        | None => Ok(k.bounce(Value::Unspecified)),
        | Some(form) if body.is_empty() => form.eval(env, k),
        | Some(form) => {
            let rest_env = env.clone();
            form.eval(env, Kont::new(move |_| eval_body(&rest_env, body.clone(), k.clone())))
        }
    }
}

impl Procedure {
    pub fn name(&self) -> Option<&Symbol> {
        self.lambda.name.as_ref()
    }
    pub fn call(&self, k: Kont, args: Vec<Value>) -> Result<Step> {
        let lambda = &self.lambda;
        let required = lambda.params.len();
        let arity_ok = match lambda.rest {
            | Some(_) => args.len() >= required,
            | None => args.len() == required,
        };
        if !arity_ok {
            return Err(EvalError::ArityError {
                prim: self.name().map(|n| n.to_string()).unwrap_or_else(|| "lambda".to_string()),
                expected: match lambda.rest {
                    | Some(_) => format!("at least {}", required),
                    | None => required.to_string(),
                },
                got: args.len(),
            });
        }
        let frame = self.env.child();
        let mut args = args.into_iter();
        for param in &lambda.params {
            let arg = args.next().unwrap_or(Value::Unspecified);
            frame.define_local(param, arg);
        }
        if let Some(rest) = &lambda.rest {
            frame.define_local(rest, Value::list(args.collect::<Vec<_>>()));
        }
        eval_body(&frame, lambda.body.clone(), k)
    }
}

impl Special {
    pub fn eval(&self, env: &Environment, k: Kont) -> Result<Step> {
        match self {
            | Special::If(If { test, then, otherwise }) => {
                let (then, otherwise, branch_env) = (then.clone(), otherwise.clone(), env.clone());
                test.eval(
                    env,
                    Kont::new(move |v| match v.is_truthy() {
                        | true => then.eval(&branch_env, k.clone()),
                        | false => otherwise.eval(&branch_env, k.clone()),
                    }),
                )
            }
            | Special::Define(Define { target, value }) => {
                let (target, def_env) = (target.clone(), env.clone());
                value.eval(
                    env,
                    Kont::new(move |v| {
                        match &target {
                            | Target::Global(name) => def_env.define_global(name.clone(), v),
                            | Target::Local(binding) => def_env.define_local(binding, v),
                        }
                        k.resume(Value::Unspecified)
                    }),
                )
            }
            | Special::Assign(Assign { target, value }) => {
                let (target, set_env) = (target.clone(), env.clone());
                value.eval(
                    env,
                    Kont::new(move |v| {
                        let loc = match &target {
                            | Target::Global(name) => set_env
                                .lookup_global(name)
                                .ok_or_else(|| EvalError::UnboundReference(name.to_string()))?,
                            | Target::Local(binding) => set_env.lookup_local(binding)?,
                        };
                        loc.set(v);
                        k.resume(Value::Unspecified)
                    }),
                )
            }
            | Special::Lambda(lambda) => {
                let proc = Procedure { lambda: lambda.clone(), env: env.clone() };
                Ok(k.bounce(Value::Procedure(Rc::new(proc))))
            }
            | Special::Begin(Begin(body)) => eval_body(env, body.clone(), k),
        }
    }
}

/* --------------------------------- Program -------------------------------- */

impl Environment {
    /// Compile and run `forms` one after another, each to completion.
    /// `on_value` sees every result, flagged when it is the last one; the
    /// first failure goes to `on_error` and stops the program.
    pub fn eval_program(
        &self, forms: impl IntoIterator<Item = Value>, mut on_value: impl FnMut(Value, bool),
        on_error: impl FnOnce(EvalError),
    ) {
        let mut forms = forms.into_iter().peekable();
        while let Some(form) = forms.next() {
            let is_final = forms.peek().is_none();
            match self.run(&form) {
                | Ok(v) => on_value(v, is_final),
                | Err(err) => {
                    log::debug!("program stopped: {}", err);
                    on_error(err);
                    return;
                }
            }
        }
    }

    /// Compile and evaluate one form to completion.
    pub fn run(&self, form: &Value) -> Result<Value> {
        let compiled = form.compile(self)?;
        compiled.eval(self, Kont::done())?.drain()
    }

    /// Compile `form` here and evaluate it as part of the current
    /// computation, delivering its value to `k`.
    pub fn eval_nested(&self, form: &Value, k: Kont) -> Result<Step> {
        let compiled = form.compile(self)?;
        compiled.eval(self, k)
    }

    /// Resume the current computation with the outcome of a self-contained
    /// program that was drained on its own, e.g. in a fresh environment:
    /// a value goes to `k`, an error propagates.
    pub fn continue_program(&self, outcome: Result<Value>, k: Kont) -> Result<Step> {
        outcome.map(|v| k.bounce(v))
    }
}
