use crate::config::Config;
use crate::error::InitError;
use crate::highlight::HighlightProjector;
use crate::hit_test::{HitOutcome, HitTester};
use crate::models::{FeatureRef, ObjectId, PointerEvent, SketchEvent};
use crate::park::{FocusOutcome, ParkFocusController};
use crate::provider::memory::MemoryMap;
use crate::session::Session;
use crate::share::share_url;
use crate::sketch::GeometrySelector;
use crate::table::TableBinder;
use crate::traits::{Chrome, EffectLayer, FeatureLayer, HighlightRenderer, MapView, SketchTool};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capabilities of the mapping platform a session is wired to.
pub struct Platform {
    pub view: Arc<dyn MapView>,
    pub renderer: Arc<dyn HighlightRenderer>,
    pub effects: Arc<dyn EffectLayer>,
    pub sketch: Arc<dyn SketchTool>,
    pub chrome: Arc<dyn Chrome>,
    pub layers: Vec<Arc<dyn FeatureLayer>>,
}

impl Platform {
    pub fn from_memory(map: Arc<MemoryMap>) -> Self {
        let layers = map
            .layers()
            .iter()
            .map(|layer| layer.clone() as Arc<dyn FeatureLayer>)
            .collect();
        Platform {
            view: map.clone(),
            renderer: map.clone(),
            effects: map.clone(),
            sketch: map.clone(),
            chrome: map,
            layers,
        }
    }
}

/// One interactive park map session. Event handlers of the host page call
/// straight into these methods.
pub struct ParkMap {
    session: Arc<Session>,
    layers: Vec<Arc<dyn FeatureLayer>>,
    chrome: Arc<dyn Chrome>,
    highlights: Arc<HighlightProjector>,
    binder: Arc<TableBinder>,
    hit_tester: HitTester,
    selector: GeometrySelector,
    parks: ParkFocusController,
    clear_sync: JoinHandle<()>,
}

fn find_layer(
    layers: &[Arc<dyn FeatureLayer>],
    title: &str,
) -> Result<Arc<dyn FeatureLayer>, InitError> {
    layers
        .iter()
        .find(|layer| layer.info().title == title)
        .cloned()
        .ok_or_else(|| InitError::MissingLayer(title.to_string()))
}

impl ParkMap {
    /// Wires every controller to `platform`. Must run inside a tokio runtime.
    pub fn new(config: Config, platform: Platform) -> Result<Self, InitError> {
        let boundaries = find_layer(&platform.layers, &config.boundary_layer_title)?;
        let trails = find_layer(&platform.layers, &config.trails_layer_title)?;

        let session = Session::new(config);
        let highlights = Arc::new(HighlightProjector::new(platform.renderer));
        let binder = Arc::new(TableBinder::new(
            session.clone(),
            highlights.clone(),
            platform.view.clone(),
        ));
        binder.bind_layer(trails.clone());

        let hit_tester = HitTester::new(
            session.clone(),
            platform.view.clone(),
            binder.clone(),
            highlights.clone(),
        );
        let selector = GeometrySelector::new(session.clone(), platform.sketch, binder.clone());
        let parks = ParkFocusController::new(
            session.clone(),
            boundaries,
            trails.info().id.clone(),
            platform.view,
            platform.effects,
            platform.chrome.clone(),
            binder.clone(),
        );
        parks.show_world();
        let clear_sync = session.spawn_clear_button_sync(platform.chrome.clone());

        info!(
            layers = platform.layers.len(),
            trails = %trails.info().title,
            "park map ready"
        );
        Ok(ParkMap {
            session,
            layers: platform.layers,
            chrome: platform.chrome,
            highlights,
            binder,
            hit_tester,
            selector,
            parks,
            clear_sync,
        })
    }

    pub fn from_memory(config: Config, map: Arc<MemoryMap>) -> Result<Self, InitError> {
        ParkMap::new(config, Platform::from_memory(map))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn table(&self) -> &Arc<TableBinder> {
        &self.binder
    }

    pub fn highlights(&self) -> &Arc<HighlightProjector> {
        &self.highlights
    }

    pub fn selector(&self) -> &GeometrySelector {
        &self.selector
    }

    pub fn bind_layer(&self, title: &str) -> Result<(), InitError> {
        let layer = find_layer(&self.layers, title)?;
        self.binder.bind_layer(layer);
        Ok(())
    }

    pub async fn focus_park(&self, park: &str) -> FocusOutcome {
        let outcome = self.parks.focus(park).await;
        self.binder.refresh().await;
        outcome
    }

    pub async fn reset_parks(&self) {
        self.parks.reset();
        self.binder.refresh().await;
    }

    pub fn open_sheet(&self) {
        self.parks.open_sheet();
    }

    pub fn close_sheet(&self) {
        self.parks.close_sheet();
    }

    pub fn start_selection(&self) {
        self.selector.start();
    }

    pub async fn complete_sketch(&self, event: SketchEvent) -> usize {
        let added = self.selector.on_create(event).await;
        self.binder.refresh().await;
        added
    }

    pub async fn pointer_move(&self, event: &PointerEvent) -> HitOutcome {
        self.hit_tester.test(event).await
    }

    pub async fn click(&self, event: &PointerEvent) -> Vec<ObjectId> {
        let toggled = self.binder.click(event).await;
        self.binder.refresh().await;
        toggled
    }

    pub async fn clear_selection(&self) -> usize {
        let cleared = self.binder.clear_selection();
        self.binder.refresh().await;
        cleared
    }

    pub async fn select_row(&self, feature: &FeatureRef) {
        self.binder.select_row(feature);
        self.binder.refresh().await;
    }

    /// Opens the instant app for the current selection. `None` while nothing
    /// is selected, matching the hidden menu entry.
    pub fn share(&self) -> serde_json::Result<Option<String>> {
        let ids = self.session.selected_ids();
        if ids.is_empty() {
            return Ok(None);
        }
        let url = share_url(&self.session.config.share, &ids)?;
        self.chrome.open_url(&url);
        info!(count = ids.len(), "selection shared");
        Ok(Some(url))
    }

    /// Looks up a row of the bound layer with its geometry.
    pub async fn find_feature(&self, object_id: ObjectId) -> Option<FeatureRef> {
        let layer = self.binder.bound_layer()?;
        let query = layer
            .create_query()
            .object_ids(vec![object_id])
            .return_geometry(true);
        match layer.query_features(&query).await {
            Ok(set) => set.features.into_iter().next(),
            Err(e) => {
                warn!(object_id, error = %e, "feature lookup failed");
                None
            }
        }
    }

    pub async fn go_to_feature(&self, feature: &FeatureRef) {
        self.binder.go_to_feature(feature).await;
    }
}

impl Drop for ParkMap {
    fn drop(&mut self) {
        self.clear_sync.abort();
    }
}
