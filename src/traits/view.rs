use crate::error::QueryError;
use crate::models::{Extent, HitResult, LayerId, PointerEvent};
use async_trait::async_trait;
use geo::Geometry;

#[async_trait]
pub trait MapView: Send + Sync {
    /// Graphics under the pointer, topmost first.
    async fn hit_test(&self, event: &PointerEvent) -> Result<Vec<HitResult>, QueryError>;

    async fn go_to(&self, target: Extent) -> Result<(), QueryError>;

    fn extent(&self) -> Extent;

    /// Display filter on a layer view; `None` lifts it.
    fn set_layer_filter(&self, layer: &LayerId, geometry: Option<Geometry<f64>>);
}
