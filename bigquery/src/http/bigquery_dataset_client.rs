use std::sync::Arc;

use crate::http::bigquery_client::{send_empty, Transport};
use crate::http::dataset;
use crate::http::dataset::list::ListDatasetsRequest;
use crate::http::dataset::{Dataset, DatasetField, DatasetReference};
use crate::http::error::Error;
use crate::http::update::Precondition;
use crate::iterator::PageIterator;

#[derive(Clone, Debug)]
pub struct BigqueryDatasetClient {
    inner: Arc<dyn Transport>,
}

impl BigqueryDatasetClient {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create(&self, metadata: &Dataset) -> Result<Dataset, Error> {
        let request = dataset::insert::build(metadata)?;
        Dataset::from_resource(self.inner.request(request).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get(&self, reference: &DatasetReference) -> Result<Dataset, Error> {
        let request = dataset::get::build(reference);
        Dataset::from_resource(self.inner.request(request).await?)
    }

    /// Fetches the dataset again and replaces every property of `metadata` with the server's state.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn reload(&self, metadata: &mut Dataset) -> Result<(), Error> {
        *metadata = self.get(&metadata.dataset_reference).await?;
        Ok(())
    }

    /// Sends the `fields` of `metadata` as a partial update and returns the updated dataset.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn update(
        &self,
        metadata: &Dataset,
        fields: &[DatasetField],
        precondition: &Precondition,
    ) -> Result<Dataset, Error> {
        let request = dataset::patch::build(metadata, fields, precondition)?;
        Dataset::from_resource(self.inner.request(request).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete(&self, reference: &DatasetReference) -> Result<(), Error> {
        send_empty(self.inner.as_ref(), dataset::delete::build(reference)).await
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn list(&self, project_id: &str, req: &ListDatasetsRequest) -> PageIterator<Dataset> {
        let request = dataset::list::build(project_id, req);
        PageIterator::new(self.inner.clone(), request, "datasets", Dataset::from_resource)
            .with_page_token(req.page_token.clone())
            .with_max_results(req.max_results)
    }
}
