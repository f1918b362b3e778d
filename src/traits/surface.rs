use crate::models::{FeatureRef, Graphic};

/// Draws emphasis on features in the view.
pub trait HighlightRenderer: Send + Sync {
    fn highlight(&self, feature: &FeatureRef);
    fn clear_highlights(&self);
}

/// Graphics layer behind the basemap used for the park cut-out effect.
pub trait EffectLayer: Send + Sync {
    fn remove_all(&self);
    fn add(&self, graphic: Graphic);
    /// Alpha of the world mask fill, 1.0 opaque
    fn set_mask_opacity(&self, opacity: f32);
}

/// Interactive drawing tool bound to a transient graphics layer.
pub trait SketchTool: Send + Sync {
    fn create_freehand_polygon(&self);
    fn remove(&self, graphic_id: u64);
}

/// Static page controls around the map.
pub trait Chrome: Send + Sync {
    fn set_sheet_open(&self, open: bool);
    fn set_reset_visible(&self, visible: bool);
    fn set_park_chip(&self, text: &str);
    fn set_clear_enabled(&self, enabled: bool);
    fn open_url(&self, url: &str);
}
