pub mod layer;
pub mod surface;
pub mod view;

pub use layer::FeatureLayer;
pub use surface::{Chrome, EffectLayer, HighlightRenderer, SketchTool};
pub use view::MapView;
