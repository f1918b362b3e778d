use crate::models::{ObjectId, SketchEvent, SketchState};
use crate::session::{Session, lock};
use crate::table::TableBinder;
use crate::traits::SketchTool;
use geo::Polygon;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Idle,
    Drawing,
    Complete,
}

/// Freehand lasso selection over the table's layer.
pub struct GeometrySelector {
    session: Arc<Session>,
    sketch: Arc<dyn SketchTool>,
    binder: Arc<TableBinder>,
    state: Mutex<SelectorState>,
}

impl GeometrySelector {
    pub fn new(session: Arc<Session>, sketch: Arc<dyn SketchTool>, binder: Arc<TableBinder>) -> Self {
        GeometrySelector {
            session,
            sketch,
            binder,
            state: Mutex::new(SelectorState::Idle),
        }
    }

    pub fn state(&self) -> SelectorState {
        *lock(&self.state)
    }

    pub fn start(&self) {
        *lock(&self.state) = SelectorState::Drawing;
        self.sketch.create_freehand_polygon();
    }

    /// Handles a `create` event from the draw tool. On completion the drawn
    /// shape is discarded and every feature it covers that is not yet selected
    /// is bulk-added. Returns the number of newly selected ids.
    pub async fn on_create(&self, event: SketchEvent) -> usize {
        match event.state {
            SketchState::Complete => {}
            SketchState::Cancel => {
                *lock(&self.state) = SelectorState::Idle;
                return 0;
            }
            SketchState::Start | SketchState::Active => return 0,
        }

        *lock(&self.state) = SelectorState::Complete;
        self.sketch.remove(event.graphic_id);

        let ids = match event.geometry {
            Some(polygon) => self.query_ids(polygon).await,
            None => Vec::new(),
        };
        let added = self.session.with_selection(|selection| {
            let fresh: Vec<ObjectId> = ids.into_iter().filter(|id| !selection.contains(*id)).collect();
            selection.add_many(fresh)
        });
        debug!(added, "lasso selection applied");

        *lock(&self.state) = SelectorState::Idle;
        added
    }

    async fn query_ids(&self, polygon: Polygon<f64>) -> Vec<ObjectId> {
        let Some(layer) = self.binder.bound_layer() else {
            return Vec::new();
        };
        let query = layer
            .create_query()
            .geometry(polygon.into())
            .out_fields([layer.info().object_id_field.clone()]);

        match layer.query_features(&query).await {
            Ok(set) => set.object_ids().collect(),
            Err(e) => {
                warn!(layer = %layer.info().title, error = %e, "lasso query failed");
                Vec::new()
            }
        }
    }
}
