use crate::models::{FeatureRef, LayerId, ObjectId};
use crate::session::lock;
use crate::traits::HighlightRenderer;
use indexmap::IndexSet;
use std::sync::{Arc, Mutex};

/// Mirrors hovered or selected features onto the view as highlights.
pub struct HighlightProjector {
    renderer: Arc<dyn HighlightRenderer>,
    active: Mutex<IndexSet<(LayerId, ObjectId)>>,
}

impl HighlightProjector {
    pub fn new(renderer: Arc<dyn HighlightRenderer>) -> Self {
        HighlightProjector {
            renderer,
            active: Mutex::new(IndexSet::new()),
        }
    }

    pub fn add(&self, feature: &FeatureRef) {
        let inserted = lock(&self.active).insert((feature.layer.clone(), feature.object_id));
        if inserted {
            self.renderer.highlight(feature);
        }
    }

    /// Always forwarded to the renderer, even when nothing is tracked.
    pub fn remove_all(&self) {
        lock(&self.active).clear();
        self.renderer.clear_highlights();
    }

    pub fn is_highlighted(&self, feature: &FeatureRef) -> bool {
        lock(&self.active).contains(&(feature.layer.clone(), feature.object_id))
    }

    pub fn len(&self) -> usize {
        lock(&self.active).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
