use super::feature::FeatureRef;
use geo::Polygon;

/// Pointer position already resolved to map coordinates by the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        PointerEvent { x, y }
    }
}

/// One graphic found under the pointer, topmost first.
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub graphic: FeatureRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchState {
    Start,
    Active,
    Complete,
    Cancel,
}

/// `create` event emitted by the draw tool.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchEvent {
    pub state: SketchState,
    pub graphic_id: u64,
    pub geometry: Option<Polygon<f64>>,
}
