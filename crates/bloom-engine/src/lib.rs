//! # Bloom-wrapped engine
//!
//! A generic decorator: `BloomEngine<E>` wraps any [`Engine<K, V>`] and
//! consults a [`BloomFilter`] before delegating a point lookup, turning a
//! definite miss into a zero-I/O `Ok(None)` instead of a wasted index probe
//! or file read.
//!
//! Static generics rather than a trait object keep this a zero-cost wrapper
//! — the inner engine's concrete type is known at compile time, so calls
//! through `BloomEngine` monomorphize the same as calling the inner engine
//! directly plus one filter check.

use bloom::BloomFilter;
use engine_api::Engine;
use store_error::Result;

/// Wraps `inner` with a Bloom filter pre-check on every read path.
///
/// `K` must be convertible to bytes ([`AsRef<[u8]>`]) since the filter only
/// ever sees a key's byte representation, never its typed value.
pub struct BloomEngine<E, K, V> {
    inner: E,
    filter: BloomFilter,
    _marker: std::marker::PhantomData<(K, V)>,
}

impl<E, K, V> BloomEngine<E, K, V>
where
    E: Engine<K, V>,
    K: AsRef<[u8]> + Clone,
{
    /// Wraps `inner` with a freshly sized filter for `expected_items` at
    /// `false_positive_rate`.
    #[must_use]
    pub fn new(inner: E, expected_items: usize, false_positive_rate: f64) -> Self {
        Self::with_filter(inner, BloomFilter::new(expected_items, false_positive_rate))
    }

    /// Wraps `inner` with an already-constructed filter, e.g. one sized via
    /// [`BloomFilter::with_dimensions`].
    #[must_use]
    pub fn with_filter(inner: E, filter: BloomFilter) -> Self {
        Self {
            inner,
            filter,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        self.inner
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Rebuilds the filter from every key currently in `inner`, discarding
    /// any bits contributed by keys that have since been compacted or
    /// removed. The filter only ever grows bits set, never clears them on a
    /// single `remove`, so this is the one operation that actually shrinks
    /// its false-positive rate back down over time.
    fn rebuild_filter(&mut self) -> Result<()> {
        self.filter.clear();
        for (key, _) in self.inner.get_all()? {
            self.filter.insert(key.as_ref());
        }
        Ok(())
    }
}

impl<E, K, V> Engine<K, V> for BloomEngine<E, K, V>
where
    E: Engine<K, V>,
    K: AsRef<[u8]> + Clone,
{
    fn set(&mut self, key: K, value: V) -> Result<()> {
        self.filter.insert(key.as_ref());
        self.inner.set(key, value)
    }

    fn try_get(&self, key: &K) -> Result<Option<V>> {
        if !self.filter.may_contain(key.as_ref()) {
            return Ok(None);
        }
        self.inner.try_get(key)
    }

    fn contains(&self, key: &K) -> Result<bool> {
        if !self.filter.may_contain(key.as_ref()) {
            return Ok(false);
        }
        self.inner.contains(key)
    }

    fn remove(&mut self, key: &K) -> Result<()> {
        self.inner.remove(key)
    }

    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        self.filter.clear();
        Ok(())
    }

    fn set_bulk(&mut self, items: Vec<(K, V)>) -> Result<()> {
        for (key, _) in &items {
            self.filter.insert(key.as_ref());
        }
        self.inner.set_bulk(items)
    }

    fn get_all(&self) -> Result<Vec<(K, V)>> {
        self.inner.get_all()
    }

    fn compact(&mut self) -> Result<()> {
        self.inner.compact()?;
        self.rebuild_filter()
    }
}
