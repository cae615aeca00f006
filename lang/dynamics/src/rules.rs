//! `syntax-rules`: pattern matching over forms and hygienic template
//! instantiation.

use crate::{
    capture::{Capture, Expansion},
    env::{Environment, Ident},
    err::{EvalError, Result},
    syntax::*,
};
use std::{collections::HashMap, rc::Rc};

const KEYWORD: &str = "syntax-rules";

type Bindings = im::HashMap<Ident, Capture>;

fn bad(reason: impl Into<String>) -> EvalError {
    EvalError::malformed(KEYWORD, reason)
}

/* --------------------------------- Pattern -------------------------------- */

#[derive(Debug)]
enum Pattern {
    Underscore,
    Literal(Ident),
    Variable(Ident),
    Constant(Value),
    List { items: Vec<Elem<Pattern>>, tail: Option<Box<Pattern>> },
    Vector(Vec<Elem<Pattern>>),
}

/// A sequence element, possibly followed by ellipses.
#[derive(Debug)]
struct Elem<T> {
    item: T,
    ellipses: usize,
}

/* -------------------------------- Template -------------------------------- */

#[derive(Debug)]
enum Template {
    Variable(Ident),
    /// An identifier the template introduces; renamed on every expansion.
    Free(Ident),
    Constant(Value),
    List { items: Vec<Elem<Template>>, tail: Option<Box<Template>> },
    Vector(Vec<Elem<Template>>),
}

/* ---------------------------------- Rules --------------------------------- */

pub struct SyntaxRules {
    env: Environment,
    ellipsis: Symbol,
    literals: Vec<Symbol>,
    rules: Vec<(Pattern, Template)>,
}

impl SyntaxRules {
    /// Parse `(syntax-rules [ellipsis] (literal ...) (pattern template) ...)`
    /// in its defining environment.
    pub fn parse(env: &Environment, form: &Value) -> Result<Self> {
        let items = form.list_to_vec().ok_or_else(|| bad("Bad form"))?;
        let mut rest = items.into_iter().skip(1).peekable();
        let ellipsis = match rest.peek().and_then(Ident::from_value) {
            | Some(custom) => {
                rest.next();
                custom.symbol()
            }
            | None => env.intern("..."),
        };
        let literals = rest.next().ok_or_else(|| bad("missing literal list"))?;
        let literals = literals
            .list_to_vec()
            .ok_or_else(|| bad("literals must be a list of identifiers"))?
            .iter()
            .map(|lit| Ident::from_value(lit).map(|i| i.symbol()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| bad("literals must be a list of identifiers"))?;
        let mut this = SyntaxRules { env: env.clone(), ellipsis, literals, rules: Vec::new() };
        for rule in rest {
            let (pattern, template) = match rule.list_to_vec().as_deref() {
                | Some([pattern, template]) => (pattern.clone(), template.clone()),
                | _ => return Err(bad(format!("bad rule {}", rule.sourceify()))),
            };
            // the keyword position is never matched
            let Value::Pair(pattern) = pattern else {
                return Err(bad(format!("pattern {} is not a list", pattern.sourceify())));
            };
            let mut pattern = this.pattern(&Value::Pair(pattern))?;
            if let Pattern::List { items, .. } = &mut pattern {
                if let Some(first) = items.first_mut() {
                    first.item = Pattern::Underscore;
                }
            }
            let mut vars = Vec::new();
            pattern.vars(0, &mut vars);
            let vars: HashMap<Ident, usize> = vars.into_iter().collect();
            let template = this.template(&template, &vars, false)?;
            this.rules.push((pattern, template));
        }
        Ok(this)
    }

    fn is_ellipsis(&self, v: &Value) -> bool {
        Ident::from_value(v).is_some_and(|i| i.symbol() == self.ellipsis)
    }

    fn pattern(&self, v: &Value) -> Result<Pattern> {
        if let Some(ident) = Ident::from_value(v) {
            let sym = ident.symbol();
            return Ok(if self.literals.contains(&sym) {
                Pattern::Literal(ident)
            } else if sym.name() == "_" {
                Pattern::Underscore
            } else if sym == self.ellipsis {
                return Err(bad("misplaced ellipsis in pattern"));
            } else {
                Pattern::Variable(ident)
            });
        }
        match v {
            | Value::Pair(_) => {
                let (items, tail) = v.split_list();
                let items = self.pattern_elems(&items)?;
                let tail = match tail {
                    | Value::Nil => None,
                    | tail => Some(Box::new(self.pattern(&tail)?)),
                };
                Ok(Pattern::List { items, tail })
            }
            | Value::Vector(items) => Ok(Pattern::Vector(self.pattern_elems(&items.borrow())?)),
            | other => Ok(Pattern::Constant(other.clone())),
        }
    }

    fn pattern_elems(&self, items: &[Value]) -> Result<Vec<Elem<Pattern>>> {
        let mut elems: Vec<Elem<Pattern>> = Vec::new();
        for item in items {
            if self.is_ellipsis(item) {
                match elems.last_mut() {
                    | Some(last) if last.ellipses == 0 => last.ellipses = 1,
                    | _ => return Err(bad("misplaced ellipsis in pattern")),
                }
                continue;
            }
            elems.push(Elem { item: self.pattern(item)?, ellipses: 0 });
        }
        if elems.iter().filter(|e| e.ellipses > 0).count() > 1 {
            return Err(bad("more than one ellipsis in a pattern sequence"));
        }
        Ok(elems)
    }

    fn template(&self, v: &Value, vars: &HashMap<Ident, usize>, escaped: bool) -> Result<Template> {
        if let Some(ident) = Ident::from_value(v) {
            return Ok(match vars.contains_key(&ident) {
                | true => Template::Variable(ident),
                | false => Template::Free(ident),
            });
        }
        match v {
            | Value::Pair(pair) => {
                let (items, tail) = v.split_list();
                // `(... template)` writes the ellipsis literally
                if !escaped && self.is_ellipsis(&pair.car()) {
                    return match (items.as_slice(), &tail) {
                        | ([_, inner], Value::Nil) => self.template(inner, vars, true),
                        | _ => Err(bad("bad ellipsis escape")),
                    };
                }
                let items = self.template_elems(&items, vars, escaped)?;
                let tail = match tail {
                    | Value::Nil => None,
                    | tail => Some(Box::new(self.template(&tail, vars, escaped)?)),
                };
                Ok(Template::List { items, tail })
            }
            | Value::Vector(items) => {
                Ok(Template::Vector(self.template_elems(&items.borrow(), vars, escaped)?))
            }
            | other => Ok(Template::Constant(other.clone())),
        }
    }

    fn template_elems(
        &self, items: &[Value], vars: &HashMap<Ident, usize>, escaped: bool,
    ) -> Result<Vec<Elem<Template>>> {
        let mut elems: Vec<Elem<Template>> = Vec::new();
        for item in items {
            if !escaped && self.is_ellipsis(item) {
                match elems.last_mut() {
                    | Some(last) => last.ellipses += 1,
                    | None => return Err(bad("template sequence starts with an ellipsis")),
                }
                continue;
            }
            elems.push(Elem { item: self.template(item, vars, escaped)?, ellipses: 0 });
        }
        Ok(elems)
    }

    /* -------------------------------- expand -------------------------------- */

    /// Rewrite a use of the macro with the first rule that matches it.
    pub fn expand(&self, use_env: &Environment, form: &Value) -> Result<Value> {
        for (pattern, template) in &self.rules {
            let mut binds = Bindings::new();
            if self.matches(pattern, form, use_env, &mut binds)? {
                let mut renames = Renames::default();
                let expanded = self.instantiate(template, &binds, &mut renames)?;
                log::debug!("{} => {}", form.sourceify(), expanded.sourceify());
                return Ok(expanded);
            }
        }
        Err(bad("no matching syntax rule"))
    }

    fn matches(
        &self, pattern: &Pattern, input: &Value, use_env: &Environment, binds: &mut Bindings,
    ) -> Result<bool> {
        match pattern {
            | Pattern::Underscore => Ok(true),
            | Pattern::Variable(ident) => {
                binds.insert(ident.clone(), Capture::new(input.clone()));
                Ok(true)
            }
            | Pattern::Literal(lit) => Ok(match Ident::from_value(input) {
                | Some(input) => self.env.resolve(lit).same(&use_env.resolve(&input)),
                | None => false,
            }),
            | Pattern::Constant(c) => Ok(c.is_equal(input)),
            | Pattern::List { items, tail } => {
                if !matches!(input, Value::Pair(_) | Value::Nil) {
                    return Ok(false);
                }
                let (inputs, input_tail) = input.split_list();
                self.matches_seq(items, tail.as_deref(), &inputs, input_tail, use_env, binds)
            }
            | Pattern::Vector(items) => match input {
                | Value::Vector(inputs) => {
                    let inputs = inputs.borrow().clone();
                    self.matches_seq(items, None, &inputs, Value::Nil, use_env, binds)
                }
                | _ => Ok(false),
            },
        }
    }

    fn matches_seq(
        &self, items: &[Elem<Pattern>], tail: Option<&Pattern>, inputs: &[Value], input_tail: Value,
        use_env: &Environment, binds: &mut Bindings,
    ) -> Result<bool> {
        let Some(at) = items.iter().position(|e| e.ellipses > 0) else {
            // no ellipsis: element-wise, any surplus goes to the tail pattern
            if inputs.len() < items.len() {
                return Ok(false);
            }
            for (elem, input) in items.iter().zip(inputs) {
                if !self.matches(&elem.item, input, use_env, binds)? {
                    return Ok(false);
                }
            }
            let rest = Value::list_with_tail(inputs[items.len()..].to_vec(), input_tail);
            return match tail {
                | None => Ok(matches!(rest, Value::Nil)),
                | Some(tail) => self.matches(tail, &rest, use_env, binds),
            };
        };
        let after = items.len() - at - 1;
        if inputs.len() < items.len() - 1 {
            return Ok(false);
        }
        match tail {
            | None if !matches!(input_tail, Value::Nil) => return Ok(false),
            | None => {}
            | Some(tail) => {
                if !self.matches(tail, &input_tail, use_env, binds)? {
                    return Ok(false);
                }
            }
        }
        let reps_end = inputs.len() - after;
        for (elem, input) in items[..at].iter().zip(&inputs[..at]) {
            if !self.matches(&elem.item, input, use_env, binds)? {
                return Ok(false);
            }
        }
        for (elem, input) in items[at + 1..].iter().zip(&inputs[reps_end..]) {
            if !self.matches(&elem.item, input, use_env, binds)? {
                return Ok(false);
            }
        }
        let repeated = &items[at].item;
        let mut acc = Bindings::new();
        for input in &inputs[at..reps_end] {
            let mut one = Bindings::new();
            if !self.matches(repeated, input, use_env, &mut one)? {
                return Ok(false);
            }
            for (ident, mut cap) in one {
                match acc.get_mut(&ident) {
                    | Some(seq) => seq.append(cap)?,
                    | None => {
                        cap.promote();
                        acc.insert(ident, cap);
                    }
                }
            }
        }
        // variables of a sub-pattern that matched nothing still get bound
        let mut vars = Vec::new();
        repeated.vars(0, &mut vars);
        for (ident, depth) in vars {
            if !acc.contains_key(&ident) {
                acc.insert(ident, Capture::empty(depth + 2));
            }
        }
        binds.extend(acc);
        Ok(true)
    }

    fn instantiate(&self, template: &Template, binds: &Bindings, renames: &mut Renames) -> Result<Value> {
        match template {
            | Template::Variable(ident) => match binds.get(ident).map(Capture::expand) {
                | Some(Expansion::Datum(v)) => Ok(v),
                | Some(Expansion::Each(_)) => {
                    Err(bad(format!("pattern variable {} used without ellipsis", ident.symbol())))
                }
                | None => Err(bad(format!("pattern variable {} is unbound", ident.symbol()))),
            },
            | Template::Free(ident) => Ok(renames.alias(ident, &self.env)),
            | Template::Constant(v) => Ok(v.clone()),
            | Template::List { items, tail } => {
                let items = self.instantiate_elems(items, binds, renames)?;
                let tail = match tail {
                    | Some(tail) => self.instantiate(tail, binds, renames)?,
                    | None => Value::Nil,
                };
                Ok(Value::list_with_tail(items, tail))
            }
            | Template::Vector(items) => Ok(Value::vector(self.instantiate_elems(items, binds, renames)?)),
        }
    }

    fn instantiate_elems(
        &self, items: &[Elem<Template>], binds: &Bindings, renames: &mut Renames,
    ) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for Elem { item, ellipses } in items {
            match ellipses {
                | 0 => out.push(self.instantiate(item, binds, renames)?),
                | depth => self.repeat(item, *depth, binds, renames, &mut out)?,
            }
        }
        Ok(out)
    }

    /// Instantiate `template` once per repetition of the captures it uses,
    /// `depth` ellipses deep.
    fn repeat(
        &self, template: &Template, depth: usize, binds: &Bindings, renames: &mut Renames,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        let mut uses = Vec::new();
        template.vars(0, &mut uses);
        let mut driving = Vec::new();
        for (ident, inner) in uses {
            let Some(cap) = binds.get(&ident) else { continue };
            // iterate only captures that still have a level left after the
            // ellipses nested inside the template itself
            if cap.rank() > inner + 1 && !driving.iter().any(|(i, _)| i == &ident) {
                if let Expansion::Each(each) = cap.expand() {
                    driving.push((ident, each));
                }
            }
        }
        if driving.is_empty() {
            return Err(bad("ellipsis follows a template without pattern variables"));
        }
        loop {
            let live = driving.iter().filter(|(_, each)| each.has_more()).count();
            if live == 0 {
                return Ok(());
            }
            if live != driving.len() {
                return Err(bad("ellipsis repetitions of different lengths"));
            }
            let mut inner = binds.clone();
            for (ident, each) in driving.iter_mut() {
                inner.insert(ident.clone(), each.get_next()?);
            }
            match depth {
                | 1 => out.push(self.instantiate(template, &inner, renames)?),
                | _ => self.repeat(template, depth - 1, &inner, renames, out)?,
            }
        }
    }
}

impl Pattern {
    /// Pattern variables with the number of ellipses above them.
    fn vars(&self, depth: usize, out: &mut Vec<(Ident, usize)>) {
        match self {
            | Pattern::Variable(ident) => out.push((ident.clone(), depth)),
            | Pattern::Underscore | Pattern::Literal(_) | Pattern::Constant(_) => {}
            | Pattern::List { items, tail } => {
                for Elem { item, ellipses } in items {
                    item.vars(depth + ellipses, out);
                }
                if let Some(tail) = tail {
                    tail.vars(depth, out);
                }
            }
            | Pattern::Vector(items) => {
                for Elem { item, ellipses } in items {
                    item.vars(depth + ellipses, out);
                }
            }
        }
    }
}

impl Template {
    /// Pattern variables used, with the number of ellipses above each use.
    fn vars(&self, depth: usize, out: &mut Vec<(Ident, usize)>) {
        match self {
            | Template::Variable(ident) => out.push((ident.clone(), depth)),
            | Template::Free(_) | Template::Constant(_) => {}
            | Template::List { items, tail } => {
                for Elem { item, ellipses } in items {
                    item.vars(depth + ellipses, out);
                }
                if let Some(tail) = tail {
                    tail.vars(depth, out);
                }
            }
            | Template::Vector(items) => {
                for Elem { item, ellipses } in items {
                    item.vars(depth + ellipses, out);
                }
            }
        }
    }
}

/// Fresh aliases for one expansion: every occurrence of a free template
/// identifier maps to the same alias.
#[derive(Default)]
struct Renames(HashMap<Ident, Rc<Alias>>);

impl Renames {
    fn alias(&mut self, ident: &Ident, env: &Environment) -> Value {
        let alias = self
            .0
            .entry(ident.clone())
            .or_insert_with(|| Rc::new(Alias { ident: ident.clone(), env: env.clone() }));
        Value::Alias(alias.clone())
    }
}
