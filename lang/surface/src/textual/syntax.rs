use roux_syntax::{Sourceify, char_source, escape_string, number_source};

/// A form tree as written in the source text.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Bool(bool),
    Char(char),
    Number(f64),
    String(String),
    Symbol(String),
    /// `(a b . c)`; the tail is `None` for a proper list
    List(Vec<Datum>, Option<Box<Datum>>),
    /// `#(a b)`
    Vector(Vec<Datum>),
}

impl Datum {
    pub fn nil() -> Self {
        Datum::List(Vec::new(), None)
    }
    pub fn list(items: impl IntoIterator<Item = Datum>) -> Self {
        Datum::List(items.into_iter().collect(), None)
    }
    pub fn symbol(name: impl Into<String>) -> Self {
        Datum::Symbol(name.into())
    }
    /// `'x` reads as `(quote x)`
    pub fn quoted(self) -> Self {
        Datum::list([Datum::symbol("quote"), self])
    }
}

impl Sourceify for Datum {
    fn sourceify(&self) -> String {
        match self {
            | Datum::Bool(true) => "#t".to_string(),
            | Datum::Bool(false) => "#f".to_string(),
            | Datum::Char(c) => char_source(*c),
            | Datum::Number(n) => number_source(*n),
            | Datum::String(s) => escape_string(s),
            | Datum::Symbol(s) => s.clone(),
            | Datum::List(items, tail) => {
                let mut s = String::from("(");
                s += &items.iter().map(|d| d.sourceify()).collect::<Vec<_>>().join(" ");
                if let Some(tail) = tail {
                    s += " . ";
                    s += &tail.sourceify();
                }
                s += ")";
                s
            }
            | Datum::Vector(items) => {
                format!("#({})", items.iter().map(|d| d.sourceify()).collect::<Vec<_>>().join(" "))
            }
        }
    }
}
