use crate::error::QueryError;
use crate::models::{FeatureSet, LayerInfo, Query};
use async_trait::async_trait;

#[async_trait]
pub trait FeatureLayer: Send + Sync {
    fn info(&self) -> &LayerInfo;

    fn create_query(&self) -> Query {
        Query::new()
    }

    async fn query_features(&self, query: &Query) -> Result<FeatureSet, QueryError>;

    async fn query_feature_count(&self, query: &Query) -> Result<usize, QueryError> {
        self.query_features(query).await.map(|set| set.features.len())
    }
}
