//! Differential Dataflow collections are closer to pipes that
//! describe a computation's dataflow than to concrete collections.
//! In order to get rewritten terms out of a DD computation, we must
//! listen to a collection's change stream, and reify the result into
//! the collection we want.
//!
//! The sink interface looks a bit weird, with the write end fully
//! decoupled from the read (snapshot) end; that's because we want
//! to write from a worker thread, so must pass ownership of the
//! write end to a closure.
use crate::ground::Term;
use crate::unification::Grounding;
use differential_dataflow::Collection;
use differential_dataflow::Data;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use timely::dataflow::Scope;

pub type TermSink = Sink<Term>;
pub type TermWriter = SinkWriter<Term>;
pub type GroundingSink = Sink<Grounding>;
pub type GroundingWriter = SinkWriter<Grounding>;

/// A Sink accepts data of a certain type, and exposes a running
/// multiplicity snapshot for all the data it has received (so far)
/// from differential dataflow collections.
///
/// In order to hook up a collection to a Sink, one must first gain
/// ownership of a `SinkWriter`, by calling `Sink::writer()`.
#[derive(Clone, Debug)]
pub struct Sink<D: Data + Eq + Hash> {
    inner: Arc<SinkImpl<D>>,
}

impl<D: Data + Eq + Hash> Sink<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SinkImpl {
                counts: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns a fresh writer for the sink.
    #[must_use]
    pub fn writer(&self) -> SinkWriter<D> {
        SinkWriter {
            inner: self.inner.clone(),
        }
    }

    /// Collects all the values with non-zero multiplicities.
    pub fn values<Ret: std::iter::FromIterator<D>>(&self) -> Ret {
        self.with_snapshot(|map| map.keys().cloned().collect())
    }

    /// Calls `handler` with a snapshot of the data in the sink.  The
    /// key in the map is the data, and the value its multiplicity.
    /// There will never be a zero-valued entry, so it is safe to, e.g.,
    /// only look at the map's keys.
    pub fn with_snapshot<F, Ret>(&self, handler: F) -> Ret
    where
        F: FnOnce(&HashMap<D, isize>) -> Ret,
    {
        handler(&self.inner.counts())
    }
}

impl<D: Data + Eq + Hash> Default for Sink<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct SinkWriter<D: Data + Eq + Hash> {
    inner: Arc<SinkImpl<D>>,
}

impl<D: Data + Eq + Hash> SinkWriter<D> {
    /// Attaches an `inspect`or closure to the collection; the `Sink`'s
    /// state will be updated to reflect the multiplicity of the data
    /// in that collection.
    ///
    /// If the same sink is attached to multiple collections, it is
    /// equivalent to attaching it to the concatenation of these
    /// collections.
    pub fn attach<G: Scope>(&self, collection: &Collection<G, D>) {
        let inner = self.inner.clone();

        collection.inspect(move |(data, _time, diff)| {
            let mut counts = inner.counts();
            let count = counts.entry(data.clone()).or_insert(0);

            *count += *diff;
            if *count == 0 {
                counts.remove(data);
            }
        });
    }
}

#[derive(Debug)]
struct SinkImpl<D: Data + Eq + Hash> {
    counts: Mutex<HashMap<D, isize>>,
}

impl<D: Data + Eq + Hash> SinkImpl<D> {
    /// A panic in a worker only ever interrupts one update; the
    /// counts are still usable.
    fn counts(&self) -> MutexGuard<'_, HashMap<D, isize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[test]
fn test_happy_path() {
    use differential_dataflow::input::InputSession;
    use std::collections::HashSet;

    let sink = TermSink::new();
    let writer = sink.writer();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        writer.attach(&terms.to_collection(scope));

        terms.advance_to(0);
        for i in 1..10 {
            terms.insert(Term::number(i));
        }

        terms.flush();
        terms.advance_to(1);
    });

    assert_eq!(
        sink.values::<HashSet<_>>(),
        (1..10).map(Term::number).collect()
    );
}

#[test]
fn test_multi_counts() {
    use differential_dataflow::input::InputSession;

    let sink = TermSink::new();
    let writer = sink.writer();

    timely::execute::example(move |scope| {
        let mut terms = InputSession::new();

        writer.attach(&terms.to_collection(scope));

        terms.advance_to(0);
        terms.insert(Term::number(1));
        terms.insert(Term::number(2));
        terms.insert(Term::number(3));
        terms.flush();
        terms.advance_to(1);
        terms.insert(Term::number(1));
        terms.remove(Term::number(3));
        terms.remove(Term::number(4));
        terms.flush();
        terms.advance_to(2);
    });

    assert_eq!(
        sink.with_snapshot(|map| map.clone()),
        [
            (Term::number(1), 2),
            (Term::number(2), 1),
            (Term::number(4), -1),
        ]
        .iter()
        .cloned()
        .collect()
    );
}
