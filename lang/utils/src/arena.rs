use std::{cell::Cell, marker::PhantomData};

/* ---------------------------------- Index --------------------------------- */

pub use crate::new_key_type;

/// # Safety
///
/// `index` must return exactly the index the key was created with.
pub unsafe trait IndexLike: Clone + Copy + Eq + std::hash::Hash {
    type Meta;
    fn new(meta: Self::Meta, idx: usize) -> Self;
    fn index(&self) -> usize;
}

/* --------------------------------- Minting -------------------------------- */

/// Mints fresh keys through a shared reference.
///
/// Keys minted by one `Minter` are unique for its whole lifetime; two minters
/// may hand out equal keys.
pub struct Minter<Id> {
    next: Cell<usize>,
    _marker: PhantomData<Id>,
}

impl<Id> Minter<Id>
where
    Id: IndexLike<Meta = ()>,
{
    pub fn new() -> Self {
        Minter { next: Cell::new(0), _marker: PhantomData }
    }
    pub fn mint(&self) -> Id {
        let idx = self.next.get();
        self.next.set(idx + 1);
        Id::new((), idx)
    }
    /// How many keys have been handed out so far.
    pub fn minted(&self) -> usize {
        self.next.get()
    }
}

impl<Id> Default for Minter<Id>
where
    Id: IndexLike<Meta = ()>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! new_key_type {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident < $meta:ty > ; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $vis struct $name($meta, usize);

        unsafe impl $crate::arena::IndexLike for $name {
            type Meta = $meta;
            fn new(meta: Self::Meta, idx: usize) -> Self {
                Self(meta, idx)
            }
            fn index(&self) -> usize {
                self.1
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?}, {})", stringify!($name), self.0, self.1)
            }
        }

        impl $name {
            pub fn concise(&self) -> String {
                format!("#{}", self.1)
            }
        }

        $crate::new_key_type!($($rest)*);
    };

    ( $(#[$outer:meta])* $vis:vis struct $name:ident ; $($rest:tt)* ) => {
        $crate::new_key_type!( $(#[$outer])* $vis struct $name<()> ; $($rest)* );
    };

    () => {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    new_key_type! {
        struct TestId;
    }

    #[test]
    fn minter_hands_out_distinct_keys() {
        let minter: Minter<TestId> = Minter::new();
        let a = minter.mint();
        let b = minter.mint();
        assert_ne!(a, b);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(minter.minted(), 2);
        assert_eq!(b.concise(), "#1");
    }
}
