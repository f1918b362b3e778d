use serde::Serialize;

pub type LayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub id: LayerId,
    pub title: String,
    /// Geometryless tables count "Records" instead of "Features"
    pub is_table: bool,
    pub object_id_field: String,
}

impl LayerInfo {
    pub fn new(id: impl Into<LayerId>, title: impl Into<String>) -> Self {
        LayerInfo {
            id: id.into(),
            title: title.into(),
            is_table: false,
            object_id_field: "OBJECTID".to_string(),
        }
    }

    pub fn table(mut self) -> Self {
        self.is_table = true;
        self
    }
}
