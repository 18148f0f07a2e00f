use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;
use token_source::TokenSourceProvider;

use crate::http::bigquery_client::{BigqueryClient, Transport};
use crate::http::bigquery_dataset_client::BigqueryDatasetClient;
use crate::http::bigquery_job_client::BigqueryJobClient;
use crate::http::bigquery_project_client::BigqueryProjectClient;
use crate::http::bigquery_table_client::BigqueryTableClient;
use crate::http::bigquery_tabledata_client::BigqueryTabledataClient;
use crate::http::dataset::list::ListDatasetsRequest;
use crate::http::dataset::{Dataset, DatasetReference};
use crate::http::error::Error;
use crate::http::job::JobReference;
use crate::iterator::PageIterator;

#[derive(Debug)]
pub struct ClientConfig {
    /// HTTP client used for every request. A plain reqwest client is used when `None`.
    pub http: Option<ClientWithMiddleware>,
    pub endpoint: String,
    /// Requests are sent without credentials when `None`.
    pub token_source_provider: Option<Box<dyn TokenSourceProvider>>,
    /// Default project of [`Client::project_id`].
    pub project_id: Option<String>,
    /// Logs every response body at trace level.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http: None,
            endpoint: "https://bigquery.googleapis.com".to_string(),
            token_source_provider: None,
            project_id: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn anonymous(mut self) -> Self {
        self.token_source_provider = None;
        self
    }

    /// Sends requests to `endpoint` instead of the public service, e.g. an emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_http_client(mut self, http: ClientWithMiddleware) -> Self {
        self.http = Some(http);
        self
    }
}

#[cfg(feature = "auth")]
pub use google_cloud_auth;

#[cfg(feature = "auth")]
impl ClientConfig {
    /// Uses Application Default Credentials.
    pub async fn with_auth(self) -> Result<Self, google_cloud_auth::error::Error> {
        let ts = google_cloud_auth::token::DefaultTokenSourceProvider::new(Self::auth_config()).await?;
        Ok(self.with_token_source(ts))
    }

    pub async fn with_credentials(
        self,
        credentials: google_cloud_auth::credentials::CredentialsFile,
    ) -> Result<Self, google_cloud_auth::error::Error> {
        let ts = google_cloud_auth::token::DefaultTokenSourceProvider::new_with_credentials(
            Self::auth_config(),
            Box::new(credentials),
        )
        .await?;
        Ok(self.with_token_source(ts))
    }

    fn with_token_source(mut self, ts: google_cloud_auth::token::DefaultTokenSourceProvider) -> Self {
        if self.project_id.is_none() {
            self.project_id = ts.project_id.clone();
        }
        self.token_source_provider = Some(Box::new(ts));
        self
    }

    fn auth_config() -> google_cloud_auth::project::Config<'static> {
        google_cloud_auth::project::Config::default().with_scopes(&crate::http::bigquery_client::SCOPES)
    }
}

/// Entry point to the BigQuery resource clients. Every resource client shares one transport.
#[derive(Clone, Debug)]
pub struct Client {
    project_client: BigqueryProjectClient,
    dataset_client: BigqueryDatasetClient,
    table_client: BigqueryTableClient,
    tabledata_client: BigqueryTabledataClient,
    job_client: BigqueryJobClient,
    project_id: Option<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let ts = match &config.token_source_provider {
            Some(tsp) => Some(tsp.token_source()),
            None => {
                tracing::trace!("Use anonymous access due to lack of token");
                None
            }
        };
        let http = config
            .http
            .unwrap_or_else(|| reqwest_middleware::ClientBuilder::new(reqwest::Client::default()).build());
        let transport = BigqueryClient::new(ts, config.endpoint.as_str(), http, config.debug);
        Self::with_transport(Arc::new(transport), config.project_id)
    }

    /// Builds the clients on top of any [`Transport`].
    pub fn with_transport(transport: Arc<dyn Transport>, project_id: Option<String>) -> Self {
        Self {
            project_client: BigqueryProjectClient::new(transport.clone()),
            dataset_client: BigqueryDatasetClient::new(transport.clone()),
            table_client: BigqueryTableClient::new(transport.clone()),
            tabledata_client: BigqueryTabledataClient::new(transport.clone()),
            job_client: BigqueryJobClient::new(transport),
            project_id,
        }
    }

    /// The project configured in [`ClientConfig`] or found in the credentials.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn default_project(&self) -> Result<&str, Error> {
        self.project_id.as_deref().ok_or(Error::MissingIdentity("project_id"))
    }

    /// Reference to a dataset of the default project.
    pub fn dataset_reference(&self, dataset_id: impl Into<String>) -> Result<DatasetReference, Error> {
        Ok(DatasetReference::new(self.default_project()?, dataset_id))
    }

    /// Reference to a job of the default project, for [`BigqueryJobClient::get`] and the query result calls.
    pub fn job_reference(&self, job_id: impl Into<String>) -> Result<JobReference, Error> {
        Ok(JobReference::new(self.default_project()?, job_id))
    }

    /// Lists the datasets of the default project.
    pub fn list_datasets(&self, req: &ListDatasetsRequest) -> Result<PageIterator<Dataset>, Error> {
        Ok(self.dataset_client.list(self.default_project()?, req))
    }

    pub fn project(&self) -> &BigqueryProjectClient {
        &self.project_client
    }

    pub fn dataset(&self) -> &BigqueryDatasetClient {
        &self.dataset_client
    }

    pub fn table(&self) -> &BigqueryTableClient {
        &self.table_client
    }

    pub fn tabledata(&self) -> &BigqueryTabledataClient {
        &self.tabledata_client
    }

    pub fn job(&self) -> &BigqueryJobClient {
        &self.job_client
    }
}
