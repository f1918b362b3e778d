pub mod event;
pub mod feature;
pub mod geometry;
pub mod graphic;
pub mod layer;
pub mod query;

pub use event::{HitResult, PointerEvent, SketchEvent, SketchState};
pub use feature::{FeatureRef, ObjectId};
pub use geometry::Extent;
pub use graphic::{Blend, Graphic, Rgba};
pub use layer::{LayerId, LayerInfo};
pub use query::{FeatureSet, Query, WhereClause};
