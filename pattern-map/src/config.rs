//! Knobs for mapping over collections.  None of them changes results,
//! only how they are computed.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapOptions {
    /// Collections with at least this many elements are rewritten on
    /// the rayon thread pool.  `None` always rewrites sequentially.
    pub parallel_threshold: Option<usize>,
}

impl MapOptions {
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parallel(threshold: usize) -> Self {
        Self {
            parallel_threshold: Some(threshold),
        }
    }

    /// Returns true iff a collection of `len` elements should be
    /// rewritten in parallel.
    #[inline]
    #[must_use]
    pub fn parallelize(&self, len: usize) -> bool {
        matches!(self.parallel_threshold, Some(threshold) if len >= threshold)
    }
}

#[test]
fn test_parallelize() {
    assert!(!MapOptions::sequential().parallelize(1_000_000));
    assert!(MapOptions::parallel(0).parallelize(0));
    assert!(!MapOptions::parallel(10).parallelize(9));
    assert!(MapOptions::parallel(10).parallelize(10));
}

#[test]
fn test_deserialize() {
    let empty: MapOptions = serde_json::from_str("{}").expect("ok");
    assert_eq!(empty, MapOptions::sequential());

    let parallel: MapOptions = serde_json::from_str(r#"{"parallel_threshold": 64}"#).expect("ok");
    assert_eq!(parallel, MapOptions::parallel(64));

    assert!(serde_json::from_str::<MapOptions>(r#"{"threads": 4}"#).is_err());
}
