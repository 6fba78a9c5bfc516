use crate::ground::Type;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors are only reported while building declarations or wiring
/// dataflow stages.  Match failures are not errors: they are routine,
/// and surface as `false` or `None`.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("expecting a {expected}, got {actual}")]
    UnexpectedType { expected: Type, actual: Type },

    #[error("{ty} is expected to be arity-{expected} only, got {actual}")]
    Arity {
        ty: Type,
        expected: usize,
        actual: usize,
    },

    #[error("expecting {ty} of at least size {expected}, got {actual}")]
    TooShort {
        ty: Type,
        expected: usize,
        actual: usize,
    },

    #[error("malformed variable declaration: {0}")]
    VariableDeclaration(String),

    #[error("variable {0} is declared more than once")]
    DuplicateVariable(String),

    #[error("grounding collection shape does not match the rewriter's variables")]
    ShapeMismatch,
}

#[test]
fn test_messages() {
    use crate::ground::types::{MAP_LINK, SCOPE_LINK};

    assert_eq!(
        Error::UnexpectedType {
            expected: SCOPE_LINK,
            actual: Type::new("ListLink"),
        }
        .to_string(),
        "expecting a ScopeLink, got ListLink"
    );
    assert_eq!(
        Error::Arity {
            ty: MAP_LINK,
            expected: 2,
            actual: 3,
        }
        .to_string(),
        "MapLink is expected to be arity-2 only, got 3"
    );
}
