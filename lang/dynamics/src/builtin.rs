//! The primitive transformers bound as syntax in every fresh environment.

use crate::{
    env::{Environment, Ident},
    err::{EvalError, Result},
    interop::{from_host, to_host},
    rules::SyntaxRules,
    special::{self, operands},
    syntax::*,
};
use std::rc::Rc;

pub fn primitives() -> Vec<Transformer> {
    vec![
        Transformer::new("quote", quote),
        Transformer::new("define-syntax", define_syntax),
        Transformer::new("let-syntax", let_syntax),
        Transformer::new("syntax-rules", syntax_rules),
        Transformer::new("native-apply", native_apply),
        Transformer::new("define", special::define),
        Transformer::new("lambda", special::lambda),
        Transformer::new("if", special::if_),
        Transformer::new("set!", special::set),
        Transformer::new("begin", special::begin),
    ]
}

/// `(quote datum)` becomes a call to a procedure that hands back the very
/// same datum object every time.
fn quote(_: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("quote", form)?;
    let [datum] = ops.as_slice() else {
        return Err(EvalError::malformed("quote", "Bad form"));
    };
    let datum = datum.strip_aliases().unwrap_or_else(|| datum.clone());
    let literal = NativeFunction::new("quote", move |_, k, _| Ok(k.bounce(datum.clone())));
    Ok(Value::list([Value::Native(Rc::new(literal))]))
}

fn compile_transformer(keyword: &str, env: &Environment, expr: &Value) -> Result<Rc<Transformer>> {
    match expr.compile(env)? {
        | Value::Transformer(t) => Ok(t),
        | other => Err(EvalError::malformed(
            keyword,
            format!("{} is not a transformer", other.sourceify()),
        )),
    }
}

fn define_syntax(env: &Environment, form: &Value) -> Result<Value> {
    if !env.is_top_level() {
        return Err(EvalError::malformed("define-syntax", "invalid outside top-level"));
    }
    let ops = operands("define-syntax", form)?;
    let [name, expr] = ops.as_slice() else {
        return Err(EvalError::malformed("define-syntax", "Bad form"));
    };
    let name = Ident::from_value(name).ok_or_else(|| {
        EvalError::malformed("define-syntax", format!("{} is not an identifier", name.sourceify()))
    })?;
    let t = compile_transformer("define-syntax", env, expr)?;
    let name = name.symbol();
    env.bind_syntax(name.clone(), Rc::new(t.renamed(name.name())))?;
    Ok(Value::Unspecified)
}

fn let_syntax(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("let-syntax", form)?;
    let Some((bindings, body)) = ops.split_first() else {
        return Err(EvalError::malformed("let-syntax", "Bad form"));
    };
    let bindings = bindings
        .list_to_vec()
        .ok_or_else(|| EvalError::malformed("let-syntax", "bindings must be a list"))?;
    let scope = env.child();
    for binding in bindings {
        let (name, expr) = match binding.list_to_vec().as_deref() {
            | Some([name, expr]) => (name.clone(), expr.clone()),
            | _ => {
                return Err(EvalError::malformed(
                    "let-syntax",
                    format!("bad binding {}", binding.sourceify()),
                ));
            }
        };
        let name = Ident::from_value(&name).ok_or_else(|| {
            EvalError::malformed("let-syntax", format!("{} is not an identifier", name.sourceify()))
        })?;
        let t = compile_transformer("let-syntax", env, &expr)?;
        let keyword = name.symbol();
        scope.scope_syntax(name, Rc::new(t.renamed(keyword.name())));
    }
    let body = special::compile_body(&scope, body)?;
    Ok(Value::special(Begin(body)))
}

fn syntax_rules(env: &Environment, form: &Value) -> Result<Value> {
    let rules = SyntaxRules::parse(env, form)?;
    let t = Transformer::new("syntax-rules", move |use_env, form| rules.expand(use_env, form));
    Ok(Value::Transformer(Rc::new(t)))
}

/// `(native-apply Math.max a b)` or `(native-apply (Math max) a b)`. The
/// path is resolved now; arguments are marshalled on every call.
fn native_apply(env: &Environment, form: &Value) -> Result<Value> {
    let ops = operands("native-apply", form)?;
    let Some((path, args)) = ops.split_first() else {
        return Err(EvalError::malformed("native-apply", "Bad form"));
    };
    let path: Vec<String> = match path {
        | Value::Symbol(s) => s.name().split('.').map(str::to_string).collect(),
        | Value::Alias(a) => a.ident.symbol().name().split('.').map(str::to_string).collect(),
        | list => list
            .list_to_vec()
            .and_then(|items| {
                items.iter().map(|v| Ident::from_value(v).map(|i| i.symbol().name().to_string())).collect()
            })
            .ok_or_else(|| {
                EvalError::malformed("native-apply", format!("bad path {}", list.sourceify()))
            })?,
    };
    let callee = env.world().host.resolve(&path)?;
    let name = path.join(".");
    log::debug!("native-apply resolved `{}`", name);
    let native = NativeFunction::new(name.clone(), move |_, k, args| {
        let args = args.iter().map(|arg| to_host(&name, arg)).collect::<std::result::Result<Vec<_>, _>>()?;
        let out = callee(args)?;
        Ok(k.bounce(from_host(out)))
    });
    Ok(Value::list(std::iter::once(Value::Native(Rc::new(native))).chain(args.iter().cloned()).collect::<Vec<_>>()))
}
