use crate::ground::types::{LIST_LINK, SET_LINK};
use crate::ground::Term;

/// How a map's input is dispatched and its output reassembled.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CollectionShape {
    /// Anything that is not a collection: mapped as one element.
    Singleton,
    /// A `ListLink`: output order follows input order.
    OrderedSequence,
    /// A `SetLink`.
    UnorderedCollection,
}

impl CollectionShape {
    #[must_use]
    pub fn of(term: &Term) -> Self {
        if !term.is_link() {
            CollectionShape::Singleton
        } else if *term.ty() == SET_LINK {
            CollectionShape::UnorderedCollection
        } else if *term.ty() == LIST_LINK {
            CollectionShape::OrderedSequence
        } else {
            CollectionShape::Singleton
        }
    }

    #[must_use]
    pub fn is_collection(self) -> bool {
        self != CollectionShape::Singleton
    }
}

#[test]
fn test_classify() {
    assert_eq!(
        CollectionShape::of(&Term::list(vec![Term::number(1)])),
        CollectionShape::OrderedSequence
    );
    assert_eq!(
        CollectionShape::of(&Term::set(vec![])),
        CollectionShape::UnorderedCollection
    );
    assert_eq!(
        CollectionShape::of(&Term::link("f", vec![Term::number(1)])),
        CollectionShape::Singleton
    );
    assert_eq!(
        CollectionShape::of(&Term::node("ListLink", "not a link")),
        CollectionShape::Singleton
    );
    assert!(!CollectionShape::Singleton.is_collection());
    assert!(CollectionShape::OrderedSequence.is_collection());
}
