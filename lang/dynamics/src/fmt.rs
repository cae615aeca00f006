use crate::syntax::*;
use pretty::RcDoc;
use std::fmt;

impl Stringify for Value {
    fn stringify(&self) -> String {
        match self {
            | Value::String(s) => s.borrow().clone(),
            | Value::Char(c) => c.to_string(),
            | Value::Pair(_) => render_list(self, |v| v.stringify()),
            | Value::Vector(items) => {
                let items = items.borrow();
                format!("#({})", items.iter().map(|v| v.stringify()).collect::<Vec<_>>().join(" "))
            }
            | _ => self.sourceify(),
        }
    }
}

impl Sourceify for Value {
    fn sourceify(&self) -> String {
        match self {
            | Value::Unspecified => "#<unspecified>".to_string(),
            | Value::Nil => "()".to_string(),
            | Value::Bool(true) => "#t".to_string(),
            | Value::Bool(false) => "#f".to_string(),
            | Value::Char(c) => char_source(*c),
            | Value::Number(n) => number_source(*n),
            | Value::String(s) => escape_string(&s.borrow()),
            | Value::Symbol(s) => s.name().to_string(),
            | Value::Pair(_) => render_list(self, |v| v.sourceify()),
            | Value::Vector(items) => {
                let items = items.borrow();
                format!("#({})", items.iter().map(|v| v.sourceify()).collect::<Vec<_>>().join(" "))
            }
            | Value::Location(loc) => loc.name.name().to_string(),
            | Value::Lexical(binding) => binding.name.name().to_string(),
            | Value::Native(native) => format!("#<native {}>", native.name),
            | Value::Procedure(proc) => match proc.name() {
                | Some(name) => format!("#<procedure {}>", name),
                | None => "#<procedure>".to_string(),
            },
            | Value::Continuation(_) => "#<continuation>".to_string(),
            | Value::Transformer(t) => format!("#<syntax {}>", t.name),
            | Value::Special(special) => format!("#<special {}>", special.keyword()),
            | Value::Alias(alias) => alias.ident.symbol().name().to_string(),
            | Value::Object(obj) => format!("#<{}>", obj.type_name),
        }
    }
}

/// `(a b . c)`, walking the spine without recursion.
fn render_list(v: &Value, item: impl Fn(&Value) -> String) -> String {
    let (items, tail) = v.split_list();
    let mut s = String::from("(");
    s += &items.iter().map(&item).collect::<Vec<_>>().join(" ");
    match tail {
        | Value::Nil => {}
        | Value::Pair(_) => s += " ...",
        | tail => {
            s += " . ";
            s += &item(&tail);
        }
    }
    s.push(')');
    s
}

impl Special {
    pub fn keyword(&self) -> &'static str {
        match self {
            | Special::If(_) => "if",
            | Special::Define(_) => "define",
            | Special::Assign(_) => "set!",
            | Special::Lambda(_) => "lambda",
            | Special::Begin(_) => "begin",
        }
    }
}

impl<'a> Pretty<'a> for Value {
    fn pretty(&self) -> RcDoc<'a> {
        match self {
            | Value::Pair(_) => {
                let (items, tail) = self.split_list();
                let mut docs: Vec<RcDoc<'a>> = items.iter().map(|v| v.pretty()).collect();
                match tail {
                    | Value::Nil => {}
                    | Value::Pair(_) => docs.push(RcDoc::text("...")),
                    | tail => {
                        docs.push(RcDoc::text("."));
                        docs.push(tail.pretty());
                    }
                }
                RcDoc::text("(")
                    .append(RcDoc::intersperse(docs, RcDoc::line()).nest(1).group())
                    .append(RcDoc::text(")"))
            }
            | Value::Vector(items) => {
                let docs: Vec<RcDoc<'a>> = items.borrow().iter().map(|v| v.pretty()).collect();
                RcDoc::text("#(")
                    .append(RcDoc::intersperse(docs, RcDoc::line()).nest(2).group())
                    .append(RcDoc::text(")"))
            }
            | _ => RcDoc::text(self.sourceify()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sourceify())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}
