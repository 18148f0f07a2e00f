use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::http::bigquery_client::{send, Transport};
use crate::http::error::Error;
use crate::http::job;
use crate::http::job::cancel::CancelJobResponse;
use crate::http::job::get_query_results::{GetQueryResultsRequest, QueryResults, Tuple};
use crate::http::job::list::ListJobsRequest;
use crate::http::job::{
    make_job_id, Job, JobConfigurationExtract, JobConfigurationLoad, JobConfigurationQuery,
    JobConfigurationTableCopy, JobReference, JobType,
};
use crate::iterator::{from_value, PageIterator};

#[derive(Clone, Debug)]
pub struct BigqueryJobClient {
    inner: Arc<dyn Transport>,
}

impl BigqueryJobClient {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    /// Starts a job.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn insert(&self, metadata: &Job) -> Result<Job, Error> {
        let request = job::insert::build(metadata)?;
        Job::from_resource(self.inner.request(request).await?)
    }

    /// Starts loading `source_uris` into a table. A job id is generated when `job_id` is `None`.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn load(&self, project_id: &str, job_id: Option<&str>, config: JobConfigurationLoad) -> Result<Job, Error> {
        self.insert_new(project_id, job_id, JobType::Load(config)).await
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn copy(
        &self,
        project_id: &str,
        job_id: Option<&str>,
        config: JobConfigurationTableCopy,
    ) -> Result<Job, Error> {
        self.insert_new(project_id, job_id, JobType::Copy(config)).await
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn extract(
        &self,
        project_id: &str,
        job_id: Option<&str>,
        config: JobConfigurationExtract,
    ) -> Result<Job, Error> {
        self.insert_new(project_id, job_id, JobType::Extract(config)).await
    }

    /// Starts a query job. Unless `use_legacy_sql` is set, the query runs as standard SQL.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn query(
        &self,
        project_id: &str,
        job_id: Option<&str>,
        mut config: JobConfigurationQuery,
    ) -> Result<Job, Error> {
        config.use_legacy_sql = Some(config.use_legacy_sql.unwrap_or(false));
        self.insert_new(project_id, job_id, JobType::Query(config)).await
    }

    async fn insert_new(&self, project_id: &str, job_id: Option<&str>, job: JobType) -> Result<Job, Error> {
        let reference = JobReference::new(project_id, make_job_id(job_id));
        self.insert(&Job::new(reference, job)).await
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get(&self, reference: &JobReference) -> Result<Job, Error> {
        Job::from_resource(self.inner.request(job::get::build(reference)).await?)
    }

    /// Fetches the job again and replaces `metadata` with the server's state.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn reload(&self, metadata: &mut Job) -> Result<(), Error> {
        *metadata = self.get(&metadata.job_reference).await?;
        Ok(())
    }

    /// Requests cancellation of a job and returns its state at that time.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn cancel(&self, reference: &JobReference) -> Result<Job, Error> {
        let response: CancelJobResponse = send(self.inner.as_ref(), job::cancel::build(reference)).await?;
        Job::from_resource(response.job)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn list(&self, project_id: &str, req: &ListJobsRequest) -> PageIterator<Job> {
        PageIterator::new(self.inner.clone(), job::list::build(project_id, req), "jobs", Job::from_resource)
            .with_page_token(req.page_token.clone())
            .with_max_results(req.max_results)
    }

    /// Waits up to `timeout_ms` for a query job and returns its completion state and schema, without rows.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get_query_results(&self, reference: &JobReference, timeout_ms: Option<u64>) -> Result<QueryResults, Error> {
        let req = GetQueryResultsRequest {
            max_results: Some(0),
            timeout_ms,
            ..Default::default()
        };
        send(self.inner.as_ref(), job::get_query_results::build(reference, &req)).await
    }

    /// Pages through the result rows of a completed query job.
    ///
    /// A page fetched while the job is still running fails with [`Error::JobIncomplete`].
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn query_results(&self, reference: &JobReference, req: &GetQueryResultsRequest) -> PageIterator<Tuple> {
        let request = job::get_query_results::build(
            reference,
            &GetQueryResultsRequest {
                max_results: None,
                page_token: None,
                timeout_ms: req.timeout_ms,
            },
        );
        PageIterator::new(self.inner.clone(), request, "rows", from_value)
            .with_token_key("pageToken")
            .with_complete_key("jobComplete")
            .with_page_token(req.page_token.clone())
            .with_max_results(req.max_results)
    }

    /// Starts a query job, waits for it to finish and returns its rows.
    ///
    /// Fails with [`Error::JobFailed`] when the job finished with an error and with [`Error::Timeout`]
    /// when it is still running after `timeout`. Without a timeout it waits until the job is done.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn query_rows(
        &self,
        project_id: &str,
        job_id: Option<&str>,
        config: JobConfigurationQuery,
        timeout: Option<Duration>,
    ) -> Result<PageIterator<Tuple>, Error> {
        let job = self.query(project_id, job_id, config).await?;
        if let Some(e) = job.error_result() {
            return Err(Error::JobFailed(e.clone()));
        }
        let job = self.wait(&job.job_reference, timeout).await?;
        Ok(self.query_results(&job.job_reference, &GetQueryResultsRequest::default()))
    }

    async fn wait(&self, reference: &JobReference, timeout: Option<Duration>) -> Result<Job, Error> {
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        loop {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            let wait_ms = match remaining {
                Some(remaining) => remaining.as_millis().min(POLL_TIMEOUT_MS as u128) as u64,
                None => POLL_TIMEOUT_MS,
            };
            let results = self.get_query_results(reference, Some(wait_ms)).await?;
            if results.job_complete {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(Error::Timeout(reference.job_id.clone()));
            }
            tracing::debug!(job_id = reference.job_id.as_str(), "query job still running");
        }
        let job = self.get(reference).await?;
        match job.error_result() {
            Some(e) => Err(Error::JobFailed(e.clone())),
            None => Ok(job),
        }
    }
}

/// Longest time a single getQueryResults call asks the server to wait for completion.
const POLL_TIMEOUT_MS: u64 = 10_000;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Method;
    use serde_json::{json, Value};

    use crate::http::bigquery_client::test::RecordingTransport;
    use crate::http::bigquery_job_client::BigqueryJobClient;
    use crate::http::error::Error;
    use crate::http::job::get_query_results::{CellValue, GetQueryResultsRequest};
    use crate::http::job::list::ListJobsRequest;
    use crate::http::job::{
        JobConfigurationExtract, JobConfigurationLoad, JobConfigurationQuery, JobConfigurationTableCopy,
        JobReference, JobState, JobType,
    };
    use crate::http::table::TableReference;

    fn job_resource(job_id: &str, configuration: Value, state: &str) -> Value {
        json!({
            "kind": "bigquery#job",
            "id": format!("p:{job_id}"),
            "jobReference": {"projectId": "p", "jobId": job_id, "location": "US"},
            "configuration": configuration,
            "status": {"state": state}
        })
    }

    #[tokio::test]
    async fn test_query() {
        let transport = RecordingTransport::new();
        transport.reply(job_resource("q1", json!({"query": {"query": "SELECT 1", "useLegacySql": false}}), "RUNNING"));
        let client = BigqueryJobClient::new(transport.clone());

        let config = JobConfigurationQuery {
            query: "SELECT 1".to_string(),
            ..Default::default()
        };
        let job = client.query("p", Some("q1"), config).await.unwrap();
        assert_eq!(job.state(), Some(&JobState::Running));
        assert!(matches!(job.job_type(), JobType::Query(_)));

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/projects/p/jobs");
        assert_eq!(
            request.body,
            Some(json!({
                "jobReference": {"projectId": "p", "jobId": "q1"},
                "configuration": {"query": {"query": "SELECT 1", "useLegacySql": false}}
            }))
        );
    }

    #[tokio::test]
    async fn test_query_keeps_legacy_sql() {
        let transport = RecordingTransport::new();
        transport.reply(job_resource("q2", json!({"query": {"query": "SELECT 1", "useLegacySql": true}}), "DONE"));
        let client = BigqueryJobClient::new(transport.clone());

        let config = JobConfigurationQuery {
            query: "SELECT 1".to_string(),
            use_legacy_sql: Some(true),
            ..Default::default()
        };
        client.query("p", None, config).await.unwrap();
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["configuration"]["query"]["useLegacySql"], json!(true));
        assert_eq!(body["jobReference"]["jobId"].as_str().map(str::len), Some(36));
    }

    #[tokio::test]
    async fn test_load_copy_extract() {
        let transport = RecordingTransport::new();
        transport
            .reply(job_resource(
                "l",
                json!({"load": {"sourceUris": ["gs://b/f.csv"], "destinationTable": {"projectId": "p", "datasetId": "d", "tableId": "t"}}}),
                "PENDING",
            ))
            .reply(job_resource(
                "c",
                json!({"copy": {"sourceTables": [{"projectId": "p", "datasetId": "d", "tableId": "t"}], "destinationTable": {"projectId": "p", "datasetId": "d", "tableId": "t2"}}}),
                "PENDING",
            ))
            .reply(job_resource(
                "e",
                json!({"extract": {"sourceTable": {"projectId": "p", "datasetId": "d", "tableId": "t"}, "destinationUris": ["gs://b/out.csv"]}}),
                "PENDING",
            ));
        let client = BigqueryJobClient::new(transport.clone());
        let table = TableReference::new("p", "d", "t");

        let load = client
            .load(
                "p",
                Some("l"),
                JobConfigurationLoad {
                    source_uris: vec!["gs://b/f.csv".to_string()],
                    destination_table: table.clone(),
                    skip_leading_rows: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(load.job_type(), JobType::Load(_)));

        let copy = client
            .copy(
                "p",
                Some("c"),
                JobConfigurationTableCopy {
                    source_tables: vec![table.clone()],
                    destination_table: TableReference::new("p", "d", "t2"),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(copy.job_type(), JobType::Copy(_)));

        let extract = client
            .extract(
                "p",
                Some("e"),
                JobConfigurationExtract {
                    source_table: table,
                    destination_uris: vec!["gs://b/out.csv".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(extract.job_type(), JobType::Extract(_)));

        let requests = transport.requests();
        assert_eq!(requests[0].body.as_ref().unwrap()["configuration"]["load"]["skipLeadingRows"], json!(1));
        assert!(requests[1].body.as_ref().unwrap()["configuration"]["copy"].is_object());
        assert!(requests[2].body.as_ref().unwrap()["configuration"]["extract"].is_object());
    }

    #[tokio::test]
    async fn test_get_cancel_and_reload() {
        let transport = RecordingTransport::new();
        let configuration = json!({"query": {"query": "SELECT 1"}});
        transport
            .reply(job_resource("j", configuration.clone(), "RUNNING"))
            .reply(json!({"kind": "bigquery#jobCancelResponse", "job": job_resource("j", configuration.clone(), "RUNNING")}))
            .reply(job_resource("j", configuration, "DONE"));
        let client = BigqueryJobClient::new(transport.clone());

        let mut reference = JobReference::new("p", "j");
        reference.location = Some("US".to_string());
        let mut job = client.get(&reference).await.unwrap();
        let cancelled = client.cancel(&reference).await.unwrap();
        assert_eq!(cancelled.job_reference, job.job_reference);
        client.reload(&mut job).await.unwrap();
        assert!(job.is_done());

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "/projects/p/jobs/j");
        assert_eq!(requests[0].query_value("projection"), Some("full"));
        assert_eq!(requests[0].query_value("location"), Some("US"));
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].path, "/projects/p/jobs/j/cancel");
    }

    #[tokio::test]
    async fn test_unknown_job_type() {
        let transport = RecordingTransport::new();
        transport.reply(job_resource("j", json!({"jobType": "UNKNOWN"}), "DONE"));
        let client = BigqueryJobClient::new(transport.clone());

        let err = client.get(&JobReference::new("p", "j")).await.unwrap_err();
        assert!(matches!(err, Error::UnknownJobType), "{err:?}");
    }

    #[tokio::test]
    async fn test_list() {
        let transport = RecordingTransport::new();
        transport
            .reply(json!({
                "jobs": [job_resource("a", json!({"query": {"query": "SELECT 1"}}), "DONE")],
                "nextPageToken": "t"
            }))
            .reply(json!({
                "jobs": [job_resource("b", json!({"extract": {"sourceTable": {"projectId": "p", "datasetId": "d", "tableId": "t"}, "destinationUris": []}}), "DONE")]
            }));
        let client = BigqueryJobClient::new(transport.clone());

        let req = ListJobsRequest {
            all_users: true,
            state_filter: Some(JobState::Done),
            ..Default::default()
        };
        let jobs = client.list("p", &req).collect().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].job_reference.job_id, "b");

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/projects/p/jobs");
        assert_eq!(requests[0].query_value("projection"), Some("full"));
        assert_eq!(requests[0].query_value("allUsers"), Some("true"));
        assert_eq!(requests[0].query_value("stateFilter"), Some("done"));
        assert_eq!(requests[1].query_value("pageToken"), Some("t"));
    }

    #[tokio::test]
    async fn test_get_query_results() {
        let transport = RecordingTransport::new();
        transport.reply(json!({
            "jobReference": {"projectId": "p", "jobId": "q"},
            "jobComplete": true,
            "schema": {"fields": [{"name": "n", "type": "INTEGER"}]},
            "totalRows": "3"
        }));
        let client = BigqueryJobClient::new(transport.clone());

        let results = client
            .get_query_results(&JobReference::new("p", "q"), Some(500))
            .await
            .unwrap();
        assert!(results.job_complete);
        assert_eq!(results.total_rows, Some(3));
        assert!(results.rows.is_empty());

        let request = &transport.requests()[0];
        assert_eq!(request.path, "/projects/p/queries/q");
        assert_eq!(request.query_value("maxResults"), Some("0"));
        assert_eq!(request.query_value("timeoutMs"), Some("500"));
    }

    #[tokio::test]
    async fn test_query_results_paging() {
        let transport = RecordingTransport::new();
        transport
            .reply(json!({
                "jobComplete": true,
                "rows": [{"f": [{"v": "1"}]}, {"f": [{"v": "2"}]}],
                "pageToken": "next"
            }))
            .reply(json!({
                "jobComplete": true,
                "rows": [{"f": [{"v": null}]}]
            }));
        let client = BigqueryJobClient::new(transport.clone());

        let rows = client
            .query_results(&JobReference::new("p", "q"), &GetQueryResultsRequest::default())
            .collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].f[0].v, CellValue::String("1".to_string()));
        assert_eq!(rows[2].f[0].v, CellValue::Null);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].query_value("maxResults"), None);
        assert_eq!(requests[1].query_value("pageToken"), Some("next"));
    }

    #[tokio::test]
    async fn test_query_results_before_completion() {
        let transport = RecordingTransport::new();
        transport.reply(json!({"jobReference": {"projectId": "p", "jobId": "q"}, "jobComplete": false}));
        let client = BigqueryJobClient::new(transport.clone());

        let err = client
            .query_results(&JobReference::new("p", "q"), &GetQueryResultsRequest::default())
            .collect()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::JobIncomplete), "{err:?}");
    }

    #[tokio::test]
    async fn test_query_rows_waits_for_completion() {
        let transport = RecordingTransport::new();
        let configuration = json!({"query": {"query": "SELECT 1", "useLegacySql": false}});
        transport
            .reply(job_resource("q", configuration.clone(), "RUNNING"))
            .reply(json!({"jobComplete": false}))
            .reply(json!({"jobComplete": true, "totalRows": "1"}))
            .reply(job_resource("q", configuration, "DONE"))
            .reply(json!({"jobComplete": true, "rows": [{"f": [{"v": "1"}]}]}));
        let client = BigqueryJobClient::new(transport.clone());

        let config = JobConfigurationQuery {
            query: "SELECT 1".to_string(),
            ..Default::default()
        };
        let rows = client
            .query_rows("p", Some("q"), config, None)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].f[0].v, CellValue::String("1".to_string()));

        let requests = transport.requests();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[1].path, "/projects/p/queries/q");
        assert_eq!(requests[1].query_value("maxResults"), Some("0"));
        assert_eq!(requests[1].query_value("timeoutMs"), Some("10000"));
        assert_eq!(requests[1].query_value("location"), Some("US"));
        assert_eq!(requests[3].path, "/projects/p/jobs/q");
        assert_eq!(requests[4].query_value("maxResults"), None);
    }

    #[tokio::test]
    async fn test_query_rows_job_failed() {
        let transport = RecordingTransport::new();
        let configuration = json!({"query": {"query": "SELECT x"}});
        let mut failed = job_resource("q", configuration.clone(), "DONE");
        failed["status"]["errorResult"] = json!({"reason": "invalidQuery", "message": "Unrecognized name: x"});
        transport
            .reply(job_resource("q", configuration, "RUNNING"))
            .reply(json!({"jobComplete": true}))
            .reply(failed);
        let client = BigqueryJobClient::new(transport.clone());

        let config = JobConfigurationQuery {
            query: "SELECT x".to_string(),
            ..Default::default()
        };
        let err = client.query_rows("p", Some("q"), config, None).await.err().unwrap();
        match err {
            Error::JobFailed(e) => assert_eq!(e.reason, "invalidQuery"),
            _ => panic!("unexpected {err:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_rows_timeout() {
        let transport = RecordingTransport::new();
        transport
            .reply(job_resource("q", json!({"query": {"query": "SELECT 1"}}), "RUNNING"))
            .reply(json!({"jobComplete": false}));
        let client = BigqueryJobClient::new(transport.clone());

        let config = JobConfigurationQuery {
            query: "SELECT 1".to_string(),
            ..Default::default()
        };
        let err = client
            .query_rows("p", Some("q"), config, Some(Duration::ZERO))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Timeout(ref id) if id == "q"), "{err:?}");
        assert_eq!(transport.requests()[1].query_value("timeoutMs"), Some("0"));
    }
}
