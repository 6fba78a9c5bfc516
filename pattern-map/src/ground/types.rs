//! Every term carries a type tag.  Tags are opaque names; the only
//! structure we know about them is a subtype relation, and we only
//! consult that relation while compiling declarations, never while
//! matching ground data.
use std::borrow::Cow;
use std::collections::HashMap;

/// A type tag, identified by its name.  The standard tags are
/// `const`s below; any other tag may be created with `Type::new`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Type(Cow<'static, str>);

impl Type {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Type {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Type {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const NODE: Type = Type::from_static("Node");
pub const LINK: Type = Type::from_static("Link");

pub const CONCEPT_NODE: Type = Type::from_static("ConceptNode");
pub const NUMBER_NODE: Type = Type::from_static("NumberNode");
pub const PREDICATE_NODE: Type = Type::from_static("PredicateNode");
pub const TYPE_NODE: Type = Type::from_static("TypeNode");
pub const VARIABLE_NODE: Type = Type::from_static("VariableNode");

pub const LIST_LINK: Type = Type::from_static("ListLink");
pub const SET_LINK: Type = Type::from_static("SetLink");
pub const CHOICE_LINK: Type = Type::from_static("ChoiceLink");
pub const EVALUATION_LINK: Type = Type::from_static("EvaluationLink");

pub const VARIABLE_LIST: Type = Type::from_static("VariableList");
pub const TYPED_VARIABLE_LINK: Type = Type::from_static("TypedVariableLink");
pub const TYPE_CHOICE: Type = Type::from_static("TypeChoice");

pub const SCOPE_LINK: Type = Type::from_static("ScopeLink");
pub const LAMBDA_LINK: Type = Type::from_static("LambdaLink");
pub const IMPLICATION_SCOPE_LINK: Type = Type::from_static("ImplicationScopeLink");

pub const FUNCTION_LINK: Type = Type::from_static("FunctionLink");
pub const MAP_LINK: Type = Type::from_static("MapLink");

/// A `TypeHierarchy` records `child -> parent` edges.  A type may
/// have several parents; unknown types are only related to
/// themselves.
#[derive(Clone, Debug, Default)]
pub struct TypeHierarchy {
    parents: HashMap<Type, Vec<Type>>,
}

impl TypeHierarchy {
    /// Returns a hierarchy without any edge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a hierarchy populated with the standard tags.
    #[must_use]
    pub fn standard() -> Self {
        let mut ret = Self::new();

        for node in [
            CONCEPT_NODE,
            NUMBER_NODE,
            PREDICATE_NODE,
            TYPE_NODE,
            VARIABLE_NODE,
        ]
        .iter()
        {
            ret.add(node.clone(), NODE);
        }

        for link in [
            LIST_LINK,
            SET_LINK,
            CHOICE_LINK,
            EVALUATION_LINK,
            VARIABLE_LIST,
            TYPED_VARIABLE_LINK,
            TYPE_CHOICE,
            SCOPE_LINK,
            FUNCTION_LINK,
        ]
        .iter()
        {
            ret.add(link.clone(), LINK);
        }

        ret.add(LAMBDA_LINK, SCOPE_LINK);
        ret.add(IMPLICATION_SCOPE_LINK, SCOPE_LINK);
        ret.add(MAP_LINK, FUNCTION_LINK);
        ret
    }

    /// Declares `parent` as a direct supertype of `child`.
    pub fn add(&mut self, child: Type, parent: Type) -> &mut Self {
        let parents = self.parents.entry(child).or_insert_with(Vec::new);
        if !parents.contains(&parent) {
            parents.push(parent);
        }

        self
    }

    /// Returns true iff `ty` is `ancestor` or one of its (transitive)
    /// subtypes.
    #[must_use]
    pub fn is_a(&self, ty: &Type, ancestor: &Type) -> bool {
        let mut stack = vec![ty];
        let mut seen = Vec::new();

        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }

            if seen.contains(&current) {
                continue;
            }

            seen.push(current);
            if let Some(parents) = self.parents.get(current) {
                stack.extend(parents.iter());
            }
        }

        false
    }
}

#[test]
fn test_type_identity() {
    assert_eq!(Type::new("ListLink"), LIST_LINK);
    assert_eq!(Type::from("ListLink"), LIST_LINK);
    assert_ne!(Type::new("pair"), LIST_LINK);
    assert_eq!(MAP_LINK.to_string(), "MapLink");
}

#[test]
fn test_standard_hierarchy() {
    let hierarchy = TypeHierarchy::standard();

    assert!(hierarchy.is_a(&LAMBDA_LINK, &SCOPE_LINK));
    assert!(hierarchy.is_a(&IMPLICATION_SCOPE_LINK, &SCOPE_LINK));
    assert!(hierarchy.is_a(&IMPLICATION_SCOPE_LINK, &LINK));
    assert!(hierarchy.is_a(&MAP_LINK, &FUNCTION_LINK));
    assert!(hierarchy.is_a(&VARIABLE_NODE, &NODE));
    assert!(!hierarchy.is_a(&SCOPE_LINK, &IMPLICATION_SCOPE_LINK));
    assert!(!hierarchy.is_a(&LIST_LINK, &NODE));
}

#[test]
fn test_unknown_types() {
    let mut hierarchy = TypeHierarchy::standard();
    let either = Type::new("EitherLink");

    assert!(hierarchy.is_a(&either, &either));
    assert!(!hierarchy.is_a(&either, &CHOICE_LINK));

    hierarchy.add(either.clone(), CHOICE_LINK);
    assert!(hierarchy.is_a(&either, &CHOICE_LINK));
    assert!(hierarchy.is_a(&either, &LINK));
}

#[test]
fn test_cycles_terminate() {
    let a = Type::new("a");
    let b = Type::new("b");
    let mut hierarchy = TypeHierarchy::new();

    hierarchy.add(a.clone(), b.clone()).add(b.clone(), a.clone());
    assert!(hierarchy.is_a(&a, &b));
    assert!(!hierarchy.is_a(&a, &LINK));
}
