//! Park focus: resolves a park's boundary once, then filters the trails to
//! it, reveals it through the world mask and zooms the view onto it.
//!
//! Every `focus` and `reset` bumps an epoch. A focus that resumes from its
//! boundary lookup under a newer epoch applies nothing, so a reset issued
//! while the lookup is in flight cannot be undone by the late result.

use crate::error::QueryError;
use crate::fade::FadeAnimation;
use crate::models::{Extent, FeatureRef, Graphic, LayerId};
use crate::session::{Session, lock};
use crate::table::TableBinder;
use crate::traits::{Chrome, EffectLayer, FeatureLayer, MapView};
use geo::Geometry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_CHIP: &str = "Featured Parks";

#[derive(Debug, Clone, PartialEq)]
pub enum FocusOutcome {
    Focused(FeatureRef),
    /// A later focus or reset took over while the boundary was resolving
    Superseded,
    /// Lookup failed or found nothing; the UI is left as it was
    NotFound,
}

pub struct ParkFocusController {
    session: Arc<Session>,
    boundaries: Arc<dyn FeatureLayer>,
    trails: LayerId,
    view: Arc<dyn MapView>,
    effects: Arc<dyn EffectLayer>,
    chrome: Arc<dyn Chrome>,
    binder: Arc<TableBinder>,
    epoch: AtomicU64,
    fade: Mutex<Option<CancellationToken>>,
}

impl ParkFocusController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Arc<Session>,
        boundaries: Arc<dyn FeatureLayer>,
        trails: LayerId,
        view: Arc<dyn MapView>,
        effects: Arc<dyn EffectLayer>,
        chrome: Arc<dyn Chrome>,
        binder: Arc<TableBinder>,
    ) -> Self {
        ParkFocusController {
            session,
            boundaries,
            trails,
            view,
            effects,
            chrome,
            binder,
            epoch: AtomicU64::new(0),
            fade: Mutex::new(None),
        }
    }

    /// Draws the opaque world mask with nothing revealed.
    pub fn show_world(&self) {
        self.effects.remove_all();
        self.effects.add(Graphic::world_mask());
    }

    pub async fn focus(&self, park: &str) -> FocusOutcome {
        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let boundary = match self.resolve(park).await {
            Ok(feature) => feature,
            Err(e) => {
                warn!(park, error = %e, "park lookup failed");
                return FocusOutcome::NotFound;
            }
        };
        if self.epoch.load(Ordering::SeqCst) != ticket {
            debug!(park, "park focus superseded");
            return FocusOutcome::Superseded;
        }
        let Some(geometry) = boundary.geometry.clone() else {
            warn!(park, "park boundary has no geometry");
            return FocusOutcome::NotFound;
        };

        self.view
            .set_layer_filter(&self.trails, Some(geometry.clone()));
        self.binder.set_filter_geometry(Some(geometry.clone()));
        self.apply_effects(geometry.clone());

        let name = boundary
            .attribute_text(&self.session.config.park_name_field)
            .unwrap_or_else(|| park.to_string());
        self.chrome.set_park_chip(&format!("{} National Park", name));
        self.chrome.set_sheet_open(false);
        self.chrome.set_reset_visible(true);
        info!(park = %name, "park focused");

        if let Some(extent) = Extent::of(&geometry) {
            if let Err(e) = self.view.go_to(extent).await {
                warn!(park, error = %e, "go to park failed");
            }
        }
        FocusOutcome::Focused(boundary)
    }

    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel_fade();

        self.view.set_layer_filter(&self.trails, None);
        self.binder.set_filter_geometry(None);
        self.show_world();
        self.effects.set_mask_opacity(1.0);

        self.chrome.set_park_chip(DEFAULT_CHIP);
        self.chrome.set_reset_visible(false);
        info!("park focus reset");
    }

    pub fn open_sheet(&self) {
        self.chrome.set_sheet_open(true);
    }

    pub fn close_sheet(&self) {
        self.chrome.set_sheet_open(false);
    }

    async fn resolve(&self, park: &str) -> Result<FeatureRef, Arc<QueryError>> {
        let boundaries = self.boundaries.clone();
        let field = self.session.config.park_name_field.clone();
        let name = park.to_string();
        self.session
            .parks()
            .try_get_with(park.to_string(), async move {
                debug!(park = %name, "querying park boundary");
                let query = boundaries
                    .create_query()
                    .where_eq(&field, name.clone())
                    .return_geometry(true);
                let set = boundaries.query_features(&query).await?;
                set.features
                    .into_iter()
                    .next()
                    .ok_or(QueryError::NotFound { field, value: name })
            })
            .await
    }

    fn apply_effects(&self, boundary: Geometry<f64>) {
        self.cancel_fade();
        self.show_world();
        self.effects.set_mask_opacity(1.0);
        self.effects.add(Graphic::cut_out(boundary));

        let token = CancellationToken::new();
        *lock(&self.fade) = Some(token.clone());
        let fade = &self.session.config.fade;
        tokio::spawn(FadeAnimation::new(fade.step).play(self.effects.clone(), fade.frame, token));
    }

    fn cancel_fade(&self) {
        if let Some(token) = lock(&self.fade).take() {
            token.cancel();
        }
    }
}
