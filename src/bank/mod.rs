//! Lazily resized leaf sprites shared across worker threads.
//!
//! A leaf template is needed at every cell size the quadtree produces, and the
//! same handful of sizes repeat across every tile and every frame rendered by
//! an engine. `SpriteCache` resizes the template once per size and hands out
//! shared `Arc`s. Lookups take a read lock; a miss resizes outside any lock and
//! then inserts under the write lock, keeping whichever entry landed first so
//! a key never maps to two different surfaces. Entries are never evicted.

mod key;

pub use key::SpriteKey;

use crate::image::PixelSurface;
use crate::template::LeafTemplate;
use crate::util::MosaicResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Per-size cache of resized leaf sprites.
#[derive(Debug)]
pub struct SpriteCache {
    template: LeafTemplate,
    entries: RwLock<HashMap<SpriteKey, Arc<PixelSurface>>>,
    resizes: AtomicUsize,
}

impl SpriteCache {
    /// Creates an empty cache over `template`.
    pub fn new(template: LeafTemplate) -> Self {
        Self {
            template,
            entries: RwLock::new(HashMap::new()),
            resizes: AtomicUsize::new(0),
        }
    }

    /// Returns the unresized template.
    pub fn template(&self) -> &LeafTemplate {
        &self.template
    }

    /// Returns the template resized to `width x height`, computing it on first use.
    pub fn get(&self, width: usize, height: usize) -> MosaicResult<Arc<PixelSurface>> {
        let key = SpriteKey::new(width, height)?;
        {
            // Entries are immutable once inserted, so a poisoned map is still valid.
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(sprite) = entries.get(&key) {
                return Ok(Arc::clone(sprite));
            }
        }

        let resized = Arc::new(self.template.surface().resize_nearest(width, height)?);
        self.resizes.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(resized)))
    }

    /// Number of distinct sizes cached.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no size has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of resizes performed, including ones discarded after losing an
    /// insertion race.
    pub fn resize_count(&self) -> usize {
        self.resizes.load(Ordering::Relaxed)
    }
}
