//! A grounding maps declared variables to the ground terms they
//! matched.  Variables are identified by their index in the scope's
//! `varseq`, so a grounding is simply one optional slot per declared
//! variable, and reading it in slot order yields the result tuple.
use crate::ground::Term;

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Grounding {
    values: Vec<Option<Term>>,
}

impl Grounding {
    /// Returns an empty grounding for `width` variables.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![None; width],
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Returns the value bound to the `index`th variable, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Term> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Binds the `index`th variable to `value`.  A variable is never
    /// rebound: if it already has a value, this only checks that the
    /// value is the same.
    ///
    /// Returns false on inconsistent bindings.
    pub fn bind(&mut self, index: usize, value: Term) -> bool {
        if let Some(prev) = &self.values[index] {
            return *prev == value;
        }

        self.values[index] = Some(value);
        true
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn bound(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Returns true iff every variable is bound.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Option<Term>] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Option<Term>> {
        self.values
    }
}

impl From<Vec<Option<Term>>> for Grounding {
    fn from(values: Vec<Option<Term>>) -> Self {
        Self { values }
    }
}

#[test]
fn test_bind_once() {
    let mut grounding = Grounding::new(2);

    assert_eq!(grounding.width(), 2);
    assert_eq!(grounding.bound(), 0);
    assert!(!grounding.is_complete());

    assert!(grounding.bind(0, Term::number(7)));
    assert_eq!(grounding.get(0), Some(&Term::number(7)));
    assert_eq!(grounding.get(1), None);

    // Rebinding to the same value is fine...
    assert!(grounding.bind(0, Term::number(7)));
    // ... but a different value is a conflict, and leaves the
    // original binding alone.
    assert!(!grounding.bind(0, Term::number(8)));
    assert_eq!(grounding.get(0), Some(&Term::number(7)));

    assert!(grounding.bind(1, Term::number(8)));
    assert!(grounding.is_complete());
    assert_eq!(
        grounding.into_values(),
        vec![Some(Term::number(7)), Some(Term::number(8))]
    );
}

#[test]
fn test_empty() {
    let grounding = Grounding::new(0);

    assert!(grounding.is_complete());
    assert_eq!(grounding.get(0), None);
    assert_eq!(grounding, Grounding::default());
}
