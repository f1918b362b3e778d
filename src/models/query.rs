use super::feature::{FeatureRef, ObjectId};
use geo::Geometry;
use serde_json::Value;

/// Attribute filter evaluated by the provider. Values are never spliced into
/// a query string, so free-text park names cannot alter the clause.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Equals { field: String, value: Value },
}

impl WhereClause {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        WhereClause::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, feature: &FeatureRef) -> bool {
        match self {
            WhereClause::Equals { field, value } => feature.attributes.get(field) == Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub where_clause: Option<WhereClause>,
    /// Spatial filter; features must intersect it
    pub geometry: Option<Geometry<f64>>,
    /// Empty means every field
    pub out_fields: Vec<String>,
    pub return_geometry: bool,
    pub object_ids: Option<Vec<ObjectId>>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.where_clause = Some(WhereClause::equals(field, value));
        self
    }

    pub fn geometry(mut self, geometry: Geometry<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn out_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.out_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn return_geometry(mut self, enabled: bool) -> Self {
        self.return_geometry = enabled;
        self
    }

    pub fn object_ids(mut self, ids: Vec<ObjectId>) -> Self {
        self.object_ids = Some(ids);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub features: Vec<FeatureRef>,
}

impl FeatureSet {
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.features.iter().map(|f| f.object_id)
    }
}
