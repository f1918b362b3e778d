//! In-memory stand-in for the mapping platform, backed by GeoJSON feature
//! collections. Implements every capability trait so a whole session can run
//! without a browser, and records what it was asked to draw.

use crate::error::{InitError, QueryError};
use crate::models::{
    Extent, FeatureRef, FeatureSet, Graphic, HitResult, LayerId, LayerInfo, ObjectId, PointerEvent,
    Query, SketchEvent, SketchState,
};
use crate::session::lock;
use crate::traits::{Chrome, EffectLayer, FeatureLayer, HighlightRenderer, MapView, SketchTool};
use async_trait::async_trait;
use geo::{Geometry, Intersects, Polygon};
use geojson::GeoJson;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MemoryLayer {
    info: LayerInfo,
    features: Vec<FeatureRef>,
    queries: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryLayer {
    pub fn new(info: LayerInfo, features: Vec<FeatureRef>) -> Self {
        MemoryLayer {
            info,
            features,
            queries: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Object ids come from the `object_id_field` property. Features without
    /// one are numbered after the largest explicit id; a repeated explicit id
    /// is rejected.
    pub fn from_geojson(info: LayerInfo, raw: &str) -> Result<Self, InitError> {
        let invalid = |message: String| InitError::GeoJson {
            path: info.title.clone(),
            message,
        };
        let parsed: GeoJson = raw.parse().map_err(|e: geojson::Error| invalid(e.to_string()))?;
        let GeoJson::FeatureCollection(fc) = parsed else {
            return Err(invalid("expected a FeatureCollection".to_string()));
        };

        let explicit: Vec<Option<ObjectId>> = fc
            .features
            .iter()
            .map(|feature| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|props| props.get(&info.object_id_field))
                    .and_then(Value::as_i64)
            })
            .collect();
        let mut seen = HashSet::new();
        for id in explicit.iter().flatten() {
            if !seen.insert(*id) {
                return Err(invalid(format!("duplicate {} {}", info.object_id_field, id)));
            }
        }
        let mut next_id = seen.iter().copied().max().unwrap_or(0);

        let mut features = Vec::with_capacity(fc.features.len());
        for (feature, id) in fc.features.into_iter().zip(explicit) {
            let object_id = id.unwrap_or_else(|| {
                next_id += 1;
                next_id
            });
            let geometry = match feature.geometry {
                Some(gj) => {
                    let geom: Geometry<f64> = gj
                        .value
                        .try_into()
                        .map_err(|e: geojson::Error| invalid(e.to_string()))?;
                    Some(geom)
                }
                None => None,
            };
            features.push(FeatureRef {
                object_id,
                layer: info.id.clone(),
                geometry,
                attributes: feature.properties.unwrap_or_default(),
            });
        }

        Ok(MemoryLayer::new(info, features))
    }

    pub fn from_path<P: AsRef<Path>>(info: LayerInfo, path: P) -> Result<Self, InitError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| InitError::Io {
            path: path.display().to_string(),
            source,
        })?;
        MemoryLayer::from_geojson(info, &raw).map_err(|e| match e {
            InitError::GeoJson { message, .. } => InitError::GeoJson {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn features(&self) -> &[FeatureRef] {
        &self.features
    }

    /// Number of `query_features` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Makes every following query fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn matches(&self, feature: &FeatureRef, query: &Query) -> bool {
        if let Some(ids) = &query.object_ids {
            if !ids.contains(&feature.object_id) {
                return false;
            }
        }
        if let Some(clause) = &query.where_clause {
            if !clause.matches(feature) {
                return false;
            }
        }
        match (&query.geometry, &feature.geometry) {
            (Some(filter), Some(geom)) => filter.intersects(geom),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn project(&self, feature: &FeatureRef, query: &Query) -> FeatureRef {
        let mut out = feature.clone();
        if !query.out_fields.is_empty() && !query.out_fields.iter().any(|f| f == "*") {
            out.attributes
                .retain(|key, _| query.out_fields.iter().any(|f| f == key));
        }
        if !query.return_geometry {
            out.geometry = None;
        }
        out
    }
}

#[async_trait]
impl FeatureLayer for MemoryLayer {
    fn info(&self) -> &LayerInfo {
        &self.info
    }

    async fn query_features(&self, query: &Query) -> Result<FeatureSet, QueryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::Provider(format!(
                "layer '{}' is unavailable",
                self.info.title
            )));
        }
        let features = self
            .features
            .iter()
            .filter(|f| self.matches(f, query))
            .map(|f| self.project(f, query))
            .collect();
        Ok(FeatureSet { features })
    }

    async fn query_feature_count(&self, query: &Query) -> Result<usize, QueryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::Provider(format!(
                "layer '{}' is unavailable",
                self.info.title
            )));
        }
        Ok(self.features.iter().filter(|f| self.matches(f, query)).count())
    }
}

/// Everything the in-memory view has been told to show.
#[derive(Debug, Clone)]
pub struct MapState {
    pub extent: Extent,
    pub goto_count: usize,
    pub layer_filters: HashMap<LayerId, Geometry<f64>>,
    pub highlights: Vec<(LayerId, ObjectId)>,
    pub effects: Vec<Graphic>,
    pub mask_opacity: f32,
    pub sketch_active: bool,
    pub next_graphic_id: u64,
    pub sketch_graphics: Vec<u64>,
    pub sheet_open: bool,
    pub reset_visible: bool,
    pub park_chip: String,
    pub clear_enabled: bool,
    pub opened_urls: Vec<String>,
}

impl Default for MapState {
    fn default() -> Self {
        MapState {
            extent: Extent::WORLD,
            goto_count: 0,
            layer_filters: HashMap::new(),
            highlights: Vec::new(),
            effects: Vec::new(),
            mask_opacity: 1.0,
            sketch_active: false,
            next_graphic_id: 0,
            sketch_graphics: Vec::new(),
            sheet_open: false,
            reset_visible: false,
            park_chip: "Featured Parks".to_string(),
            clear_enabled: false,
            opened_urls: Vec::new(),
        }
    }
}

/// Map view over a stack of [`MemoryLayer`]s, drawn bottom to top.
pub struct MemoryMap {
    layers: Vec<Arc<MemoryLayer>>,
    tolerance: f64,
    state: Mutex<MapState>,
}

impl MemoryMap {
    pub fn new(layers: Vec<Arc<MemoryLayer>>) -> Self {
        MemoryMap {
            layers,
            tolerance: 0.0005,
            state: Mutex::new(MapState::default()),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn layers(&self) -> &[Arc<MemoryLayer>] {
        &self.layers
    }

    pub fn snapshot(&self) -> MapState {
        lock(&self.state).clone()
    }

    /// Finishes the active freehand drawing and returns the `create` event the tool emits.
    pub fn finish_sketch(&self, polygon: Polygon<f64>) -> SketchEvent {
        let mut state = lock(&self.state);
        state.sketch_active = false;
        state.next_graphic_id += 1;
        let graphic_id = state.next_graphic_id;
        state.sketch_graphics.push(graphic_id);
        SketchEvent {
            state: SketchState::Complete,
            graphic_id,
            geometry: Some(polygon),
        }
    }

    fn probe(&self, event: &PointerEvent) -> Geometry<f64> {
        Extent::from((
            event.x - self.tolerance,
            event.y - self.tolerance,
            event.x + self.tolerance,
            event.y + self.tolerance,
        ))
        .into()
    }
}

#[async_trait]
impl MapView for MemoryMap {
    async fn hit_test(&self, event: &PointerEvent) -> Result<Vec<HitResult>, QueryError> {
        let probe = self.probe(event);
        let filters = lock(&self.state).layer_filters.clone();

        let mut results = Vec::new();
        for layer in self.layers.iter().rev() {
            if layer.info().is_table {
                continue;
            }
            let filter = filters.get(&layer.info().id);
            for feature in layer.features() {
                let Some(geom) = &feature.geometry else {
                    continue;
                };
                if filter.is_some_and(|f| !f.intersects(geom)) {
                    continue;
                }
                if probe.intersects(geom) {
                    results.push(HitResult {
                        graphic: feature.clone(),
                    });
                }
            }
        }
        Ok(results)
    }

    async fn go_to(&self, target: Extent) -> Result<(), QueryError> {
        let mut state = lock(&self.state);
        state.extent = target;
        state.goto_count += 1;
        Ok(())
    }

    fn extent(&self) -> Extent {
        lock(&self.state).extent
    }

    fn set_layer_filter(&self, layer: &LayerId, geometry: Option<Geometry<f64>>) {
        let mut state = lock(&self.state);
        match geometry {
            Some(g) => {
                state.layer_filters.insert(layer.clone(), g);
            }
            None => {
                state.layer_filters.remove(layer);
            }
        }
    }
}

impl HighlightRenderer for MemoryMap {
    fn highlight(&self, feature: &FeatureRef) {
        lock(&self.state)
            .highlights
            .push((feature.layer.clone(), feature.object_id));
    }

    fn clear_highlights(&self) {
        lock(&self.state).highlights.clear();
    }
}

impl EffectLayer for MemoryMap {
    fn remove_all(&self) {
        let mut state = lock(&self.state);
        state.effects.clear();
        state.mask_opacity = 1.0;
    }

    fn add(&self, graphic: Graphic) {
        lock(&self.state).effects.push(graphic);
    }

    fn set_mask_opacity(&self, opacity: f32) {
        lock(&self.state).mask_opacity = opacity;
    }
}

impl SketchTool for MemoryMap {
    fn create_freehand_polygon(&self) {
        lock(&self.state).sketch_active = true;
    }

    fn remove(&self, graphic_id: u64) {
        lock(&self.state).sketch_graphics.retain(|id| *id != graphic_id);
    }
}

impl Chrome for MemoryMap {
    fn set_sheet_open(&self, open: bool) {
        lock(&self.state).sheet_open = open;
    }

    fn set_reset_visible(&self, visible: bool) {
        lock(&self.state).reset_visible = visible;
    }

    fn set_park_chip(&self, text: &str) {
        lock(&self.state).park_chip = text.to_string();
    }

    fn set_clear_enabled(&self, enabled: bool) {
        lock(&self.state).clear_enabled = enabled;
    }

    fn open_url(&self, url: &str) {
        lock(&self.state).opened_urls.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    const PARKS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"OBJECTID": 11, "Name": "Parc Ela"},
             "geometry": {"type": "Polygon", "coordinates": [[[9.5,46.5],[9.8,46.5],[9.8,46.7],[9.5,46.7],[9.5,46.5]]]}},
            {"type": "Feature", "properties": {"Name": "Beverin"},
             "geometry": {"type": "Polygon", "coordinates": [[[9.2,46.5],[9.4,46.5],[9.4,46.7],[9.2,46.7],[9.2,46.5]]]}}
        ]
    }"#;

    #[test]
    fn test_from_geojson_assigns_object_ids() {
        let layer = MemoryLayer::from_geojson(LayerInfo::new("parks", "Swiss National Parks"), PARKS)
            .unwrap();
        let ids: Vec<ObjectId> = layer.features().iter().map(|f| f.object_id).collect();
        assert_eq!(ids, vec![11, 12]);
        assert!(matches!(layer.features()[0].geometry, Some(Geometry::Polygon(_))));
    }

    #[test]
    fn test_missing_ids_never_collide_with_explicit_ones() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OBJECTID": 2}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": null, "geometry": null},
                {"type": "Feature", "properties": {"OBJECTID": 1}, "geometry": null}
            ]
        }"#;
        let layer = MemoryLayer::from_geojson(LayerInfo::new("trails", "Hiking trails"), raw).unwrap();
        let ids: Vec<ObjectId> = layer.features().iter().map(|f| f.object_id).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_duplicate_object_id_is_rejected() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OBJECTID": 7}, "geometry": null},
                {"type": "Feature", "properties": {"OBJECTID": 7}, "geometry": null}
            ]
        }"#;
        let err = MemoryLayer::from_geojson(LayerInfo::new("trails", "Hiking trails"), raw).err();
        assert!(matches!(err, Some(InitError::GeoJson { message, .. }) if message.contains("duplicate")));
    }

    #[test]
    fn test_from_geojson_rejects_single_feature() {
        let raw = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let err = MemoryLayer::from_geojson(LayerInfo::new("x", "X"), raw).err();
        assert!(matches!(err, Some(InitError::GeoJson { .. })));
    }

    #[tokio::test]
    async fn test_query_where_and_geometry() {
        let layer = MemoryLayer::from_geojson(LayerInfo::new("parks", "Swiss National Parks"), PARKS)
            .unwrap();

        let by_name = layer
            .query_features(&Query::new().where_eq("Name", "Beverin").return_geometry(true))
            .await
            .unwrap();
        assert_eq!(by_name.object_ids().collect::<Vec<_>>(), vec![12]);
        assert!(by_name.features[0].geometry.is_some());

        let area = polygon![(x: 9.6, y: 46.55), (x: 9.7, y: 46.55), (x: 9.7, y: 46.6), (x: 9.6, y: 46.55)];
        let by_area = layer
            .query_features(&Query::new().geometry(area.into()).out_fields(["OBJECTID"]))
            .await
            .unwrap();
        assert_eq!(by_area.object_ids().collect::<Vec<_>>(), vec![11]);
        assert!(by_area.features[0].geometry.is_none());
        assert!(by_area.features[0].attributes.get("Name").is_none());
        assert_eq!(layer.query_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_layer_reports_provider_error() {
        let layer = MemoryLayer::new(LayerInfo::new("t", "T"), Vec::new());
        layer.set_failing(true);
        let err = layer.query_features(&Query::new()).await.unwrap_err();
        assert!(matches!(err, QueryError::Provider(_)));
    }

    #[tokio::test]
    async fn test_hit_test_topmost_first_and_respects_filter() {
        let parks = Arc::new(MemoryLayer::new(
            LayerInfo::new("parks", "Parks"),
            vec![FeatureRef::new("parks", 1).with_geometry(
                polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)],
            )],
        ));
        let trails = Arc::new(MemoryLayer::new(
            LayerInfo::new("trails", "Route"),
            vec![FeatureRef::new("trails", 5)
                .with_geometry(line_string![(x: 0.0, y: 1.0), (x: 2.0, y: 1.0)])],
        ));
        let map = MemoryMap::new(vec![parks, trails]).with_tolerance(0.01);

        let hits = map.hit_test(&PointerEvent::at(1.0, 1.0)).await.unwrap();
        let layers: Vec<&str> = hits.iter().map(|h| h.graphic.layer.as_str()).collect();
        assert_eq!(layers, vec!["trails", "parks"]);

        let elsewhere: Geometry<f64> = Extent::from((5.0, 5.0, 6.0, 6.0)).into();
        map.set_layer_filter(&"trails".to_string(), Some(elsewhere));
        let hits = map.hit_test(&PointerEvent::at(1.0, 1.0)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].graphic.layer, "parks");
    }
}
