//! What a pattern variable matched. A variable under no ellipsis holds a
//! single value (rank 1); each enclosing ellipsis adds a level of sequence.

use crate::{err::CaptureError, syntax::Value};

#[derive(Clone, Debug)]
pub enum Capture {
    Leaf(Value),
    Seq { rank: usize, items: im::Vector<Capture> },
}

/// How a capture is used inside a template.
pub enum Expansion {
    Datum(Value),
    Each(Enumerator),
}

impl Capture {
    pub fn new(v: Value) -> Self {
        Capture::Leaf(v)
    }
    /// A sequence of `rank` that matched zero repetitions.
    pub fn empty(rank: usize) -> Self {
        Capture::Seq { rank: rank.max(2), items: im::Vector::new() }
    }
    pub fn rank(&self) -> usize {
        match self {
            | Capture::Leaf(_) => 1,
            | Capture::Seq { rank, .. } => *rank,
        }
    }
    pub fn len(&self) -> usize {
        match self {
            | Capture::Leaf(_) => 1,
            | Capture::Seq { items, .. } => items.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Wrap into a one-element sequence, one rank higher.
    pub fn promote(&mut self) {
        let inner = std::mem::replace(self, Capture::empty(2));
        let rank = inner.rank() + 1;
        *self = Capture::Seq { rank, items: im::vector![inner] };
    }
    /// Add the next repetition to a sequence.
    pub fn append(&mut self, next: Capture) -> Result<(), CaptureError> {
        match self {
            | Capture::Leaf(_) => Err(CaptureError::AppendToLeaf),
            | Capture::Seq { rank, items } => {
                if next.rank() + 1 != *rank {
                    return Err(CaptureError::RankMismatch { expected: *rank - 1, found: next.rank() });
                }
                items.push_back(next);
                Ok(())
            }
        }
    }
    pub fn expand(&self) -> Expansion {
        match self {
            | Capture::Leaf(v) => Expansion::Datum(v.clone()),
            | Capture::Seq { items, .. } => Expansion::Each(Enumerator::new(items.clone())),
        }
    }
}

/// Walks the repetitions of a sequence capture, front to back, once.
pub struct Enumerator {
    values: im::Vector<Capture>,
    cursor: usize,
}

impl Enumerator {
    fn new(values: im::Vector<Capture>) -> Self {
        Enumerator { values, cursor: 0 }
    }
    pub fn has_more(&self) -> bool {
        self.cursor < self.values.len()
    }
    pub fn get_next(&mut self) -> Result<Capture, CaptureError> {
        let next = self.values.get(self.cursor).cloned().ok_or(CaptureError::Exhausted)?;
        self.cursor += 1;
        Ok(next)
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Iterator for Enumerator {
    type Item = Capture;
    fn next(&mut self) -> Option<Capture> {
        self.get_next().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Capture {
        Capture::new(Value::Number(n))
    }
    fn numbers(cap: &Capture) -> Vec<String> {
        match cap.expand() {
            | Expansion::Datum(v) => vec![format!("{:?}", v)],
            | Expansion::Each(e) => e.flat_map(|c| numbers(&c)).collect(),
        }
    }

    #[test]
    fn leaf_expands_to_datum() {
        let cap = num(1.0);
        assert_eq!(cap.rank(), 1);
        assert!(matches!(cap.expand(), Expansion::Datum(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn promote_then_append() {
        let mut cap = num(1.0);
        cap.promote();
        assert_eq!(cap.rank(), 2);
        cap.append(num(2.0)).unwrap();
        cap.append(num(3.0)).unwrap();
        assert_eq!(cap.len(), 3);
        assert_eq!(numbers(&cap), vec!["1", "2", "3"]);
    }

    #[test]
    fn append_to_leaf_fails() {
        let mut cap = num(1.0);
        assert_eq!(cap.append(num(2.0)), Err(CaptureError::AppendToLeaf));
    }

    #[test]
    fn append_checks_rank() {
        let mut inner = num(1.0);
        inner.promote();
        let mut outer = inner.clone();
        outer.promote();
        assert_eq!(outer.rank(), 3);
        assert!(outer.append(num(2.0)).is_err());
        outer.append(inner).unwrap();
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn empty_enumerates_nothing() {
        let cap = Capture::empty(2);
        match cap.expand() {
            | Expansion::Each(mut e) => {
                assert!(!e.has_more());
                assert!(e.get_next().is_err());
            }
            | Expansion::Datum(_) => panic!("expected a sequence"),
        }
    }

    #[test]
    fn enumerator_is_one_shot() {
        let mut cap = num(1.0);
        cap.promote();
        cap.append(num(2.0)).unwrap();
        let Expansion::Each(mut e) = cap.expand() else { panic!("expected a sequence") };
        assert_eq!(e.len(), 2);
        assert!(e.get_next().is_ok());
        assert!(e.get_next().is_ok());
        assert!(!e.has_more());
        assert_eq!(e.get_next().unwrap_err(), CaptureError::Exhausted);
    }
}
