//! Flattened results kept per terminating layer.

use std::collections::HashMap;

use uuid::Uuid;

use super::{DetailId, LayerId, ObjectInstance, SplatId, TreeInstance};
use crate::grid::Grid2D;

/// Identifies one flattening: every enabled layer up to `terminating`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CompoundKey {
    pub terminating: Option<LayerId>,
    pub include_terminating: bool,
}

/// Full-canvas flattened channels below (and optionally including) a layer.
///
/// Channels fill in lazily as they are first resolved.
#[derive(Clone, Debug, Default)]
pub(crate) struct CompoundView {
    pub heights: Option<Grid2D<f32>>,
    pub splats: HashMap<SplatId, Grid2D<u8>>,
    pub details: HashMap<DetailId, Grid2D<u8>>,
    pub trees: Option<HashMap<Uuid, TreeInstance>>,
    pub objects: Option<HashMap<Uuid, ObjectInstance>>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CompoundCache {
    views: HashMap<CompoundKey, CompoundView>,
}

impl CompoundCache {
    pub fn view_mut(&mut self, key: CompoundKey) -> &mut CompoundView {
        self.views.entry(key).or_default()
    }

    /// Drops every view terminating at `layer`. Returns `true` if any existed.
    pub fn invalidate(&mut self, layer: Option<LayerId>) -> bool {
        let before = self.views.len();
        self.views.retain(|key, _| key.terminating != layer);
        self.views.len() != before
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: Option<u64>, include: bool) -> CompoundKey {
        CompoundKey {
            terminating: id.map(LayerId),
            include_terminating: include,
        }
    }

    #[test]
    fn test_invalidate_drops_both_variants() {
        let mut cache = CompoundCache::default();
        cache.view_mut(key(Some(1), true));
        cache.view_mut(key(Some(1), false));
        cache.view_mut(key(Some(2), true));
        cache.view_mut(key(None, true));
        assert_eq!(cache.len(), 4);

        assert!(cache.invalidate(Some(LayerId(1))));
        assert_eq!(cache.len(), 2);
        assert!(!cache.invalidate(Some(LayerId(1))));

        assert!(cache.invalidate(None));
        assert_eq!(cache.len(), 1);
    }
}
