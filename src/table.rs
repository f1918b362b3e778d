//! Feature table binding: which layer the table shows, how its columns are
//! rendered, which filters apply, and how row and map interactions feed the
//! selection and highlight state.

use crate::highlight::HighlightProjector;
use crate::models::{FeatureRef, LayerId, ObjectId, PointerEvent, Query};
use crate::session::{Session, lock};
use crate::traits::{FeatureLayer, MapView};
use crate::utils::geometry::planar_length_km;
use geo::Geometry;
use indexmap::IndexSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub enum Column {
    Field {
        field_name: String,
        label: String,
    },
    Computed {
        label: String,
        format: fn(&FeatureRef) -> String,
    },
}

impl Column {
    pub fn label(&self) -> &str {
        match self {
            Column::Field { label, .. } | Column::Computed { label, .. } => label,
        }
    }

    pub fn render(&self, feature: &FeatureRef) -> String {
        match self {
            Column::Field { field_name, .. } => {
                feature.attribute_text(field_name).unwrap_or_default()
            }
            Column::Computed { format, .. } => format(feature),
        }
    }
}

pub enum TableTemplate {
    Columns(Vec<Column>),
    /// Every attribute of the layer, in source order
    AllFields,
}

impl TableTemplate {
    pub fn trails() -> Self {
        TableTemplate::Columns(vec![
            Column::Field {
                field_name: "TourNameR".to_string(),
                label: "Route name".to_string(),
            },
            Column::Computed {
                label: "Trail distance (km)".to_string(),
                format: trail_distance,
            },
            Column::Field {
                field_name: "TourInfo".to_string(),
                label: "Route information".to_string(),
            },
        ])
    }

    pub fn is_trails(&self) -> bool {
        matches!(self, TableTemplate::Columns(_))
    }
}

fn trail_distance(feature: &FeatureRef) -> String {
    let km = feature
        .geometry
        .as_ref()
        .and_then(planar_length_km)
        .unwrap_or(0.0);
    format!("{:.2} kilometers", km)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    FilterByExtent,
    RemoveExtentFilter,
    ShowSelectedOnly,
    ShowAll,
    Share,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::FilterByExtent => "Filter by extent",
            MenuItem::RemoveExtentFilter => "Remove extent filter",
            MenuItem::ShowSelectedOnly => "Show selected rows only",
            MenuItem::ShowAll => "Show all",
            MenuItem::Share => "Share my trails",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub object_id: ObjectId,
    pub selected: bool,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRows {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

struct TableState {
    layer: Option<Arc<dyn FeatureLayer>>,
    template: TableTemplate,
    filter_geometry: Option<Geometry<f64>>,
    filter_by_selection: bool,
    /// Rows pinned into the table from a popup
    pinned: IndexSet<ObjectId>,
    load: LoadState,
    size: usize,
}

pub struct TableBinder {
    session: Arc<Session>,
    highlights: Arc<HighlightProjector>,
    view: Arc<dyn MapView>,
    state: Mutex<TableState>,
}

impl TableBinder {
    pub fn new(
        session: Arc<Session>,
        highlights: Arc<HighlightProjector>,
        view: Arc<dyn MapView>,
    ) -> Self {
        TableBinder {
            session,
            highlights,
            view,
            state: Mutex::new(TableState {
                layer: None,
                template: TableTemplate::AllFields,
                filter_geometry: None,
                filter_by_selection: false,
                pinned: IndexSet::new(),
                load: LoadState::Loading,
                size: 0,
            }),
        }
    }

    /// Swaps the table's layer. Highlights are dropped and the template follows
    /// the layer: the trail columns for the hiking trails layer, all fields otherwise.
    pub fn bind_layer(&self, layer: Arc<dyn FeatureLayer>) {
        let mut state = lock(&self.state);
        if state
            .layer
            .as_ref()
            .is_some_and(|current| current.info().id == layer.info().id)
        {
            return;
        }
        self.highlights.remove_all();
        state.template = if layer.info().title == self.session.config.hiking_trails_title {
            TableTemplate::trails()
        } else {
            TableTemplate::AllFields
        };
        debug!(layer = %layer.info().title, trails = state.template.is_trails(), "table layer bound");
        state.layer = Some(layer);
        state.pinned.clear();
        state.load = LoadState::Loading;
        state.size = 0;
    }

    pub fn bound_layer(&self) -> Option<Arc<dyn FeatureLayer>> {
        lock(&self.state).layer.clone()
    }

    pub fn bound_layer_id(&self) -> Option<LayerId> {
        lock(&self.state)
            .layer
            .as_ref()
            .map(|layer| layer.info().id.clone())
    }

    pub fn uses_trails_template(&self) -> bool {
        lock(&self.state).template.is_trails()
    }

    fn row_query(&self, state: &TableState) -> Option<(Arc<dyn FeatureLayer>, Query)> {
        let layer = state.layer.clone()?;
        let mut query = layer.create_query();
        query.geometry = state.filter_geometry.clone();
        if state.filter_by_selection {
            query.object_ids = Some(self.session.selected_ids());
        } else if !state.pinned.is_empty() {
            query.object_ids = Some(state.pinned.iter().copied().collect());
        }
        Some((layer, query))
    }

    /// Recounts the rows under the current filters. Provider failures count as zero rows.
    pub async fn refresh(&self) {
        let Some((layer, query)) = self.row_query(&lock(&self.state)) else {
            return;
        };
        let size = match layer.query_feature_count(&query).await {
            Ok(size) => size,
            Err(e) => {
                warn!(layer = %layer.info().title, error = %e, "row count failed");
                0
            }
        };

        let mut state = lock(&self.state);
        // layer swapped while counting
        if state.layer.as_ref().map(|l| &l.info().id) != Some(&layer.info().id) {
            return;
        }
        state.size = size;
        state.load = LoadState::Loaded;
    }

    pub fn title(&self) -> String {
        lock(&self.state)
            .layer
            .as_ref()
            .map(|layer| layer.info().title.clone())
            .unwrap_or_else(|| "Provide a layer.".to_string())
    }

    pub fn description(&self) -> String {
        let state = lock(&self.state);
        match (state.load, &state.layer) {
            (LoadState::Loaded, Some(layer)) => {
                let kind = if layer.info().is_table { "Records" } else { "Features" };
                format!(
                    "{}: {}; Selection: {}",
                    kind,
                    state.size,
                    self.session.selection_count()
                )
            }
            _ => "Loading...".to_string(),
        }
    }

    pub fn filter_geometry(&self) -> Option<Geometry<f64>> {
        lock(&self.state).filter_geometry.clone()
    }

    pub fn set_filter_geometry(&self, geometry: Option<Geometry<f64>>) {
        lock(&self.state).filter_geometry = geometry;
    }

    pub fn filter_by_extent(&self) {
        self.set_filter_geometry(Some(self.view.extent().into()));
    }

    pub fn filter_by_selection(&self) -> bool {
        lock(&self.state).filter_by_selection
    }

    pub fn set_filter_by_selection(&self, enabled: bool) {
        lock(&self.state).filter_by_selection = enabled;
    }

    /// Menu entries currently visible, in display order.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let state = lock(&self.state);
        let mut items = vec![MenuItem::FilterByExtent];
        if state.filter_geometry.is_some() {
            items.push(MenuItem::RemoveExtentFilter);
        }
        items.push(if state.filter_by_selection {
            MenuItem::ShowAll
        } else {
            MenuItem::ShowSelectedOnly
        });
        if self.session.selection_count() > 0 {
            items.push(MenuItem::Share);
        }
        items
    }

    pub fn row_hover(&self, feature: &FeatureRef) {
        self.highlights.add(feature);
    }

    pub fn row_hover_out(&self) {
        self.highlights.remove_all();
    }

    /// Toggles selection of every hit on the bound layer under the pointer.
    pub async fn click(&self, event: &PointerEvent) -> Vec<ObjectId> {
        let results = match self.view.hit_test(event).await {
            Ok(results) => results,
            Err(e) if e.is_abort() => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "click hit test failed");
                return Vec::new();
            }
        };
        let Some(target) = self.bound_layer_id() else {
            return Vec::new();
        };

        let toggled: Vec<ObjectId> = results
            .iter()
            .filter(|hit| hit.graphic.layer == target)
            .map(|hit| hit.graphic.object_id)
            .collect();
        self.session.with_selection(|selection| {
            for id in &toggled {
                selection.toggle(*id);
            }
        });
        toggled
    }

    /// Popup action: select the feature and pin its row into the table.
    pub fn select_row(&self, feature: &FeatureRef) {
        self.session.with_selection(|selection| selection.add(feature.object_id));
        lock(&self.state).pinned.insert(feature.object_id);
    }

    pub fn clear_selection(&self) -> usize {
        self.session.with_selection(|selection| selection.remove_all())
    }

    /// Action column: zoom the view to a row's feature.
    pub async fn go_to_feature(&self, feature: &FeatureRef) {
        let Some(extent) = feature.geometry.as_ref().and_then(crate::models::Extent::of) else {
            return;
        };
        if let Err(e) = self.view.go_to(extent).await {
            warn!(error = %e, object_id = feature.object_id, "go to feature failed");
        }
    }

    /// Rows under the current filters rendered through the active template.
    pub async fn rows(&self) -> TableRows {
        let Some((layer, mut query)) = self.row_query(&lock(&self.state)) else {
            return TableRows::default();
        };
        query.return_geometry = true;
        let features = match layer.query_features(&query).await {
            Ok(set) => set.features,
            Err(e) => {
                warn!(layer = %layer.info().title, error = %e, "row query failed");
                Vec::new()
            }
        };

        let state = lock(&self.state);
        let selected = |id| self.session.is_selected(id);
        match &state.template {
            TableTemplate::Columns(columns) => TableRows {
                headers: columns.iter().map(|c| c.label().to_string()).collect(),
                rows: features
                    .iter()
                    .map(|f| TableRow {
                        object_id: f.object_id,
                        selected: selected(f.object_id),
                        values: columns.iter().map(|c| c.render(f)).collect(),
                    })
                    .collect(),
            },
            TableTemplate::AllFields => {
                let mut headers: IndexSet<String> = IndexSet::new();
                for f in &features {
                    headers.extend(f.attributes.keys().cloned());
                }
                TableRows {
                    rows: features
                        .iter()
                        .map(|f| TableRow {
                            object_id: f.object_id,
                            selected: selected(f.object_id),
                            values: headers
                                .iter()
                                .map(|h| f.attribute_text(h).unwrap_or_default())
                                .collect(),
                        })
                        .collect(),
                    headers: headers.into_iter().collect(),
                }
            }
        }
    }
}
