use std::sync::Arc;
use std::time::Duration;

use crate::http::bigquery_client::{send_empty, Transport};
use crate::http::bigquery_job_client::BigqueryJobClient;
use crate::http::dataset::DatasetReference;
use crate::http::error::Error;
use crate::http::job::get_query_results::CellValue;
use crate::http::job::JobConfigurationQuery;
use crate::http::table;
use crate::http::table::list::ListTablesRequest;
use crate::http::table::{Table, TableField, TableReference};
use crate::http::update::Precondition;
use crate::iterator::PageIterator;

#[derive(Clone, Debug)]
pub struct BigqueryTableClient {
    inner: Arc<dyn Transport>,
}

impl BigqueryTableClient {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create(&self, metadata: &Table) -> Result<Table, Error> {
        let request = table::insert::build(metadata)?;
        Table::from_resource(self.inner.request(request).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get(&self, reference: &TableReference) -> Result<Table, Error> {
        Table::from_resource(self.inner.request(table::get::build(reference)).await?)
    }

    /// Fetches the table again and replaces every property of `metadata` with the server's state.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn reload(&self, metadata: &mut Table) -> Result<(), Error> {
        *metadata = self.get(&metadata.table_reference).await?;
        Ok(())
    }

    /// Sends the `fields` of `metadata` as a partial update and returns the updated table.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn update(&self, metadata: &Table, fields: &[TableField], precondition: &Precondition) -> Result<Table, Error> {
        let request = table::patch::build(metadata, fields, precondition)?;
        Table::from_resource(self.inner.request(request).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete(&self, reference: &TableReference) -> Result<(), Error> {
        send_empty(self.inner.as_ref(), table::delete::build(reference)).await
    }

    /// Lists the tables of a dataset. Listed tables only carry a subset of their properties.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn list(&self, dataset: &DatasetReference, req: &ListTablesRequest) -> PageIterator<Table> {
        PageIterator::new(self.inner.clone(), table::list::build(dataset), "tables", Table::from_resource)
            .with_page_token(req.page_token.clone())
            .with_max_results(req.max_results)
    }

    /// Returns the partition ids of a partitioned table.
    ///
    /// Runs a legacy SQL query against the partitions summary in the table's project and waits for it.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn list_partitions(&self, reference: &TableReference, timeout: Option<Duration>) -> Result<Vec<String>, Error> {
        let config = JobConfigurationQuery {
            query: format!(
                "SELECT partition_id from [{}.{}$__PARTITIONS_SUMMARY__]",
                reference.dataset_id, reference.table_id
            ),
            use_legacy_sql: Some(true),
            ..Default::default()
        };
        let rows = BigqueryJobClient::new(self.inner.clone())
            .query_rows(&reference.project_id, None, config, timeout)
            .await?
            .collect()
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.f.into_iter().next().map(|cell| cell.v) {
                Some(CellValue::String(id)) => Some(id),
                _ => None,
            })
            .collect())
    }
}
