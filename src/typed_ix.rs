use std::{
    cmp::Ordering,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use petgraph::adj::{DefaultIx, IndexType};

/// An arena handle tagged with the element type it indexes.
///
/// The search structure, the trapezoid arena and the segment list all hand out
/// plain indices; tagging them keeps a node handle from being used to look up
/// a trapezoid and vice versa. Implements petgraph's [`IndexType`] so the same
/// handles can index graph snapshots.
pub struct TypedIx<T, Ix = DefaultIx>(Ix, PhantomData<T>);

impl<T: 'static> TypedIx<T> {
    pub fn from_usize(ix: usize) -> Self {
        <Self as IndexType>::new(ix)
    }

    pub fn get(self) -> usize {
        self.index()
    }
}

impl<T, Ix: Clone> Clone for TypedIx<T, Ix> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), self.1)
    }
}

impl<T, Ix: Copy> Copy for TypedIx<T, Ix> {}

impl<T, Ix: Default> Default for TypedIx<T, Ix> {
    fn default() -> Self {
        Self(Ix::default(), Default::default())
    }
}

impl<T, Ix: Hash> Hash for TypedIx<T, Ix> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T, Ix: Ord> Ord for TypedIx<T, Ix> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T, Ix: PartialOrd> PartialOrd for TypedIx<T, Ix> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<T, Ix: PartialEq> PartialEq for TypedIx<T, Ix> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T, Ix: Eq> Eq for TypedIx<T, Ix> {}

impl<T, Ix: Debug> Debug for TypedIx<T, Ix> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypedIx<{}>({:?})", std::any::type_name::<T>(), self.0)
    }
}

unsafe impl<Ix: IndexType, T: 'static> IndexType for TypedIx<T, Ix> {
    fn new(x: usize) -> Self {
        Self(Ix::new(x), Default::default())
    }

    fn index(&self) -> usize {
        self.0.index()
    }

    fn max() -> Self {
        Self(<Ix as IndexType>::max(), Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct_types() {
        struct A;
        let ix: TypedIx<A> = TypedIx::from_usize(7);
        assert_eq!(ix.get(), 7);
        assert_eq!(ix, TypedIx::from_usize(7));
    }
}
