pub mod cancel;
pub mod get;
pub mod get_query_results;
pub mod insert;
pub mod list;

use std::collections::HashMap;

use serde_json::Value;
use time::OffsetDateTime;

use crate::http::dataset::DatasetReference;
use crate::http::error::Error;
use crate::http::table::external::ExternalDataConfiguration;
use crate::http::table::TableReference;
use crate::schema::SchemaField;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateDisposition {
    /// If the table does not exist, BigQuery creates the table.
    #[default]
    CreateIfNeeded,
    /// The table must already exist. If it does not, a 'notFound' error is returned in the job result.
    CreateNever,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// If the table already exists, BigQuery overwrites the table data and uses the schema from the query result.
    WriteTruncate,
    /// If the table already exists, BigQuery appends the data to the table.
    WriteAppend,
    /// If the table already exists and contains data, a 'duplicate' error is returned in the job result.
    #[default]
    WriteEmpty,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Interactive,
    Batch,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationLoad {
    /// [Required] The fully-qualified URIs that point to your data in Google Cloud.
    pub source_uris: Vec<String>,
    /// [Required] The destination table to load the data into.
    pub destination_table: TableReference,
    /// Optional. The schema for the destination table.
    #[serde(default, with = "crate::schema::option_table_schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<SchemaField>>,
    /// Optional. The format of the data files. CSV, DATASTORE_BACKUP, NEWLINE_DELIMITED_JSON, AVRO, PARQUET or ORC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
    /// Optional. The separator character for fields in a CSV file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
    /// Optional. The number of rows at the top of a CSV file that BigQuery will skip when loading the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_leading_rows: Option<i64>,
    /// Optional. The maximum number of bad records that BigQuery can ignore when running the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bad_records: Option<i32>,
    /// Optional. Indicates if we should automatically infer the options and schema for CSV and JSON sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autodetect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unknown_values: Option<bool>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationTableCopy {
    /// [Pick one] Source tables to copy.
    pub source_tables: Vec<TableReference>,
    /// [Required] The destination table.
    pub destination_table: TableReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationExtract {
    /// A reference to the table being exported.
    pub source_table: TableReference,
    /// [Pick one] A list of fully-qualified Google Cloud Storage URIs where the extracted table should be written.
    pub destination_uris: Vec<String>,
    /// Optional. The exported file format. CSV, NEWLINE_DELIMITED_JSON, PARQUET or AVRO.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_format: Option<String>,
    /// Optional. The compression type to use for exported files. GZIP, DEFLATE, SNAPPY or NONE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
    /// Optional. Whether to print out a header row in the results. Default is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_header: Option<bool>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationQuery {
    /// [Required] SQL query text to execute.
    pub query: String,
    /// Optional. Describes the table where the query results should be stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_table: Option<TableReference>,
    /// Optional. External table definitions, keyed by the table identifier used in the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_definitions: Option<HashMap<String, ExternalDataConfiguration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
    /// Optional. Specifies the default dataset to use for unqualified table names in the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dataset: Option<DatasetReference>,
    /// Optional. Specifies a priority for the query. The default value is INTERACTIVE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Optional. Whether to look for the result in the query cache. The default value is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_query_cache: Option<bool>,
    /// Specifies whether to use BigQuery's legacy SQL dialect for this query.
    /// [`BigqueryJobClient::query`](crate::http::bigquery_job_client::BigqueryJobClient::query) defaults it to false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
    /// Limits the bytes billed for this job. Queries that will have bytes billed beyond this limit will fail.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub maximum_bytes_billed: Option<i64>,
}

/// The kind of work a job does. Exactly one is present in a job configuration.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum JobType {
    Load(JobConfigurationLoad),
    Copy(JobConfigurationTableCopy),
    Extract(JobConfigurationExtract),
    Query(JobConfigurationQuery),
}

impl JobType {
    /// Configuration keys in the order they are looked up when parsing a job.
    pub const KEYS: [&'static str; 4] = ["load", "copy", "extract", "query"];
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    #[serde(flatten)]
    pub job: JobType,
    /// Optional. If set, don't actually run this job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    /// The labels associated with this job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

impl From<JobType> for JobConfiguration {
    fn from(job: JobType) -> Self {
        Self {
            job,
            dry_run: None,
            labels: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    /// Required. The ID of the project containing this job.
    pub project_id: String,
    /// Required. The ID of the job. The ID must contain only letters (a-z, A-Z), numbers (0-9), underscores (_), or dashes (-). The maximum length is 1,024 characters.
    pub job_id: String,
    /// Optional. The geographic location of the job. The default value is US.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl JobReference {
    pub fn new(project_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            job_id: job_id.into(),
            location: None,
        }
    }

    /// URL path for the job's APIs.
    pub fn path(&self) -> String {
        format!("/projects/{}/jobs/{}", self.project_id, self.job_id)
    }
}

/// Returns `job_id`, or a fresh UUID when none is given.
pub fn make_job_id(job_id: Option<&str>) -> String {
    match job_id {
        Some(job_id) => job_id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Done,
}

impl JobState {
    /// The value of the `stateFilter` list parameter.
    pub fn as_filter(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Done => "done",
        }
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorProto {
    /// A short error code that summarizes the error.
    pub reason: String,
    /// Specifies where the error occurred, if present.
    pub location: String,
    /// Debugging information. This property is internal to Google and should not be used.
    pub debug_info: String,
    /// A human-readable description of the error.
    pub message: String,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Output only. Final error result of the job. If present, indicates that the job has completed and was unsuccessful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_result: Option<ErrorProto>,
    /// Output only. The first errors encountered during the running of the job.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto>,
    /// Output only. Running state of the job.
    #[serde(default)]
    pub state: JobState,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    /// Output only. Creation time of this job.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<OffsetDateTime>,
    /// Output only. Start time of this job. Present once the job left the PENDING state.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<OffsetDateTime>,
    /// Output only. End time of this job. Present once the job is DONE.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<OffsetDateTime>,
    /// Output only. Total bytes processed for the job.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub total_bytes_processed: Option<i64>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Output only. The resource type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Output only. A hash of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Output only. Opaque ID field of the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Output only. A URL that can be used to access the resource again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Output only. Email address of the user who ran the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Reference describing the unique-per-user name of the job.
    pub job_reference: JobReference,
    /// Required. Describes the job configuration.
    pub configuration: JobConfiguration,
    /// Output only. The status of this job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Output only. Information about the job, including starting time and ending time of the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatistics>,
}

impl Job {
    pub fn new(job_reference: JobReference, job: JobType) -> Self {
        Self {
            kind: String::new(),
            etag: None,
            id: None,
            self_link: None,
            user_email: None,
            job_reference,
            configuration: job.into(),
            status: None,
            statistics: None,
        }
    }

    /// Parses a job resource returned by the API, dispatching on its configuration key.
    ///
    /// When several job keys are present, the first of [`JobType::KEYS`] wins.
    pub fn from_resource(mut resource: Value) -> Result<Self, Error> {
        let configuration = resource
            .get_mut("configuration")
            .and_then(Value::as_object_mut)
            .ok_or(Error::UnknownJobType)?;
        let job_key = JobType::KEYS
            .into_iter()
            .find(|key| configuration.contains_key(*key))
            .ok_or(Error::UnknownJobType)?;
        configuration.retain(|key, _| key.as_str() == job_key || !JobType::KEYS.contains(&key.as_str()));
        if resource.pointer("/jobReference/jobId").is_none() {
            return Err(Error::MissingIdentity("jobReference.jobId"));
        }
        Ok(serde_json::from_value(resource)?)
    }

    pub fn job_type(&self) -> &JobType {
        &self.configuration.job
    }

    pub fn path(&self) -> String {
        self.job_reference.path()
    }

    pub fn state(&self) -> Option<&JobState> {
        self.status.as_ref().map(|s| &s.state)
    }

    pub fn is_done(&self) -> bool {
        self.state() == Some(&JobState::Done)
    }

    /// The error the job failed with, if it did.
    pub fn error_result(&self) -> Option<&ErrorProto> {
        self.status.as_ref().and_then(|s| s.error_result.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::http::error::Error;
    use crate::http::job::{make_job_id, Job, JobConfigurationQuery, JobReference, JobState, JobType};
    use crate::http::table::TableReference;

    fn resource(configuration: Value) -> Value {
        json!({
            "kind": "bigquery#job",
            "etag": "etag",
            "id": "p:job-1",
            "jobReference": {"projectId": "p", "jobId": "job-1", "location": "US"},
            "configuration": configuration,
            "status": {"state": "DONE"},
            "statistics": {"creationTime": "1437767599006", "totalBytesProcessed": "100"}
        })
    }

    #[test]
    fn test_dispatch() {
        let job = Job::from_resource(resource(json!({
            "load": {
                "sourceUris": ["gs://bucket/file.csv"],
                "destinationTable": {"projectId": "p", "datasetId": "d", "tableId": "t"},
                "skipLeadingRows": 1
            }
        })))
        .unwrap();
        match job.job_type() {
            JobType::Load(load) => {
                assert_eq!(load.destination_table, TableReference::new("p", "d", "t"));
                assert_eq!(load.skip_leading_rows, Some(1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(job.is_done());
        assert_eq!(job.statistics.unwrap().total_bytes_processed, Some(100));

        let job = Job::from_resource(resource(json!({
            "copy": {
                "sourceTables": [{"projectId": "p", "datasetId": "d", "tableId": "a"}],
                "destinationTable": {"projectId": "p", "datasetId": "d", "tableId": "b"}
            }
        })))
        .unwrap();
        assert!(matches!(job.job_type(), JobType::Copy(_)));

        let job = Job::from_resource(resource(json!({
            "extract": {
                "sourceTable": {"projectId": "p", "datasetId": "d", "tableId": "a"},
                "destinationUris": ["gs://bucket/out-*.csv"]
            }
        })))
        .unwrap();
        assert!(matches!(job.job_type(), JobType::Extract(_)));

        let job = Job::from_resource(resource(json!({
            "query": {"query": "SELECT 1", "useLegacySql": false},
            "dryRun": true,
            "jobType": "QUERY"
        })))
        .unwrap();
        assert!(matches!(job.job_type(), JobType::Query(q) if q.query == "SELECT 1"));
        assert_eq!(job.configuration.dry_run, Some(true));
    }

    #[test]
    fn test_dispatch_key_order() {
        let job = Job::from_resource(resource(json!({
            "query": {"query": "SELECT 1"},
            "extract": {
                "sourceTable": {"projectId": "p", "datasetId": "d", "tableId": "a"},
                "destinationUris": ["gs://bucket/out.csv"]
            },
            "dryRun": false
        })))
        .unwrap();
        assert!(matches!(job.job_type(), JobType::Extract(_)), "{:?}", job.job_type());
        assert_eq!(job.configuration.dry_run, Some(false));
    }

    #[test]
    fn test_unknown_job_type() {
        let err = Job::from_resource(resource(json!({"jobType": "UNKNOWN"}))).unwrap_err();
        assert!(matches!(err, Error::UnknownJobType));
        let err = Job::from_resource(json!({"jobReference": {"projectId": "p", "jobId": "j"}})).unwrap_err();
        assert!(matches!(err, Error::UnknownJobType));

        let err = Job::from_resource(json!({"configuration": {"query": {"query": "SELECT 1"}}})).unwrap_err();
        assert!(matches!(err, Error::MissingIdentity(_)));
    }

    #[test]
    fn test_serialize_new_job() {
        let job = Job::new(
            JobReference::new("p", "job-1"),
            JobType::Query(JobConfigurationQuery {
                query: "SELECT 1".to_string(),
                use_legacy_sql: Some(false),
                ..Default::default()
            }),
        );
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({
                "jobReference": {"projectId": "p", "jobId": "job-1"},
                "configuration": {"query": {"query": "SELECT 1", "useLegacySql": false}}
            })
        );
        assert_eq!(job.path(), "/projects/p/jobs/job-1");
        assert_eq!(job.state(), None);
    }

    #[test]
    fn test_make_job_id() {
        assert_eq!(make_job_id(Some("mine")), "mine");
        let generated = make_job_id(None);
        assert_eq!(generated.len(), 36);
        assert_ne!(generated, make_job_id(None));
        assert_eq!(JobState::Running.as_filter(), "running");
    }
}
