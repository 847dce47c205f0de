//! Injectable memoization for batch drivers.
//!
//! The measurement stages are pure functions of their inputs, so a driver
//! that revisits the same image can wrap any stage call in
//! [`Memo::get_or_compute`]. Nothing inside the stages knows about caching.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use lepimetry_core::BinaryMask;

use crate::pipeline::{PipelineParams, SpecimenInputs};

/// Key/value memoization interface.
pub trait Memo<K, V> {
    /// Return the cached value for `key`, or run `compute` and cache its
    /// successful result. Errors are never cached.
    fn get_or_compute<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>;
}

/// Pass-through memo that always recomputes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMemo;

impl<K, V> Memo<K, V> for NoMemo {
    fn get_or_compute<E, F>(&self, _key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        compute()
    }
}

/// In-memory memo shared between threads.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K, V> Memo<K, V> for MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get_or_compute<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.lock().get(&key) {
            return Ok(hit.clone());
        }
        // Computed without the lock; a concurrent miss on the same key
        // computes the same value twice.
        let value = compute()?;
        self.lock().insert(key, value.clone());
        Ok(value)
    }
}

/// Content hash of a mask, including its shape.
pub fn mask_fingerprint(mask: &BinaryMask) -> u64 {
    let mut hasher = DefaultHasher::new();
    mask.hash(&mut hasher);
    hasher.finish()
}

/// Content hash of a full pipeline call: all inputs plus the parameters.
pub fn specimen_fingerprint(inputs: &SpecimenInputs<'_>, params: &PipelineParams) -> u64 {
    let mut hasher = DefaultHasher::new();
    (inputs.rgb.width, inputs.rgb.height).hash(&mut hasher);
    inputs.rgb.data.hash(&mut hasher);
    inputs.ruler.hash(&mut hasher);
    inputs.specimen.hash(&mut hasher);
    inputs.tags.hash(&mut hasher);
    format!("{:?}", params).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn cache_computes_once_per_key() {
        let cache: MemoCache<u64, usize> = MemoCache::new();
        let calls = Cell::new(0);
        let compute = || -> Result<usize, ()> {
            calls.set(calls.get() + 1);
            Ok(42)
        };

        assert_eq!(cache.get_or_compute(1, compute), Ok(42));
        assert_eq!(cache.get_or_compute(1, compute), Ok(42));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: MemoCache<&str, u8> = MemoCache::new();
        assert_eq!(cache.get_or_compute("a", || Err::<u8, _>("boom")), Err("boom"));
        assert_eq!(cache.get_or_compute("a", || Ok::<_, &str>(7)), Ok(7));
    }

    #[test]
    fn no_memo_always_recomputes() {
        let calls = Cell::new(0);
        for _ in 0..3 {
            let _ = NoMemo.get_or_compute((), || -> Result<(), ()> {
                calls.set(calls.get() + 1);
                Ok(())
            });
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn fingerprint_tracks_content_and_shape() {
        let a = BinaryMask::new(4, 4);
        let mut b = a.clone();
        assert_eq!(mask_fingerprint(&a), mask_fingerprint(&b));
        b.set(2, 2, true);
        assert_ne!(mask_fingerprint(&a), mask_fingerprint(&b));
        assert_ne!(mask_fingerprint(&a), mask_fingerprint(&BinaryMask::new(2, 8)));
    }
}
