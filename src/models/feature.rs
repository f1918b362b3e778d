use super::layer::LayerId;
use geo::Geometry;
use serde_json::{Map, Value};

/// Object id as issued by the owning layer.
pub type ObjectId = i64;

/// A single mapped entity borrowed from a layer for one query or render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRef {
    pub object_id: ObjectId,
    pub layer: LayerId,
    pub geometry: Option<Geometry<f64>>,
    pub attributes: Map<String, Value>,
}

impl FeatureRef {
    pub fn new(layer: impl Into<LayerId>, object_id: ObjectId) -> Self {
        FeatureRef {
            object_id,
            layer: layer.into(),
            geometry: None,
            attributes: Map::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<Geometry<f64>>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Attribute rendered for display; strings lose their JSON quotes.
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.attributes.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    #[test]
    fn test_attribute_text_strips_quotes() {
        let feature = FeatureRef::new("trails", 7)
            .with_attribute("TourNameR", "Via Engiadina")
            .with_attribute("Stage", 3)
            .with_attribute("Info", Value::Null);

        assert_eq!(feature.attribute_text("TourNameR").as_deref(), Some("Via Engiadina"));
        assert_eq!(feature.attribute_text("Stage").as_deref(), Some("3"));
        assert_eq!(feature.attribute_text("Info").as_deref(), Some(""));
        assert_eq!(feature.attribute_text("missing"), None);
    }

    #[test]
    fn test_with_geometry_wraps_into_geometry_enum() {
        let feature = FeatureRef::new("parks", 1).with_geometry(point!(x: 9.8, y: 46.6));
        assert!(matches!(feature.geometry, Some(Geometry::Point(_))));
    }
}
