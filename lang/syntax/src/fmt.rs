//! The formatter traits.

use pretty::RcDoc;

/// Human-facing rendering: strings and characters appear raw, opaque
/// objects as `#<...>`.
#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Stringify {
    fn stringify(&self) -> String;
}

/// Re-readable rendering: feeding the output back to the reader yields an
/// `equal?` datum whenever the value has a written form.
#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Sourceify {
    fn sourceify(&self) -> String;
}

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>)]
pub trait Pretty<'a> {
    fn pretty(&self) -> RcDoc<'a>;
}

/// Render a document to a string at the given line width.
pub fn render<'a>(doc: RcDoc<'a>, width: usize) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = doc.render_fmt(width, &mut out);
    out
}

/// Source form of a number: integral values print without a fraction.
pub fn number_source(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "+nan.0".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "+inf.0".to_string() } else { "-inf.0".to_string() }
    } else {
        format!("{}", n)
    }
}
