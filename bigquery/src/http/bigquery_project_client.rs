use std::sync::Arc;

use crate::http::bigquery_client::Transport;
use crate::http::project;
use crate::http::project::list::ListProjectsRequest;
use crate::http::project::Project;
use crate::iterator::{from_value, PageIterator};

#[derive(Clone, Debug)]
pub struct BigqueryProjectClient {
    inner: Arc<dyn Transport>,
}

impl BigqueryProjectClient {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    /// Lists the projects the caller has access to.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub fn list(&self, req: &ListProjectsRequest) -> PageIterator<Project> {
        PageIterator::new(self.inner.clone(), project::list::build(), "projects", from_value)
            .with_page_token(req.page_token.clone())
            .with_max_results(req.max_results)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::http::bigquery_client::test::RecordingTransport;
    use crate::http::bigquery_project_client::BigqueryProjectClient;
    use crate::http::project::list::ListProjectsRequest;

    #[tokio::test]
    async fn test_list() {
        let transport = RecordingTransport::new();
        transport
            .reply(json!({
                "projects": [{"id": "p1", "numericId": "1", "friendlyName": "one", "projectReference": {"projectId": "p1"}}],
                "nextPageToken": "t"
            }))
            .reply(json!({
                "projects": [{"id": "p2", "numericId": "2", "projectReference": {"projectId": "p2"}}]
            }));
        let client = BigqueryProjectClient::new(transport.clone());

        let projects = client.list(&ListProjectsRequest::default()).collect().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].numeric_id, 1);
        assert_eq!(projects[1].project_reference.project_id, "p2");

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/projects");
        assert_eq!(requests[0].query_value("pageToken"), None);
        assert_eq!(requests[1].query_value("pageToken"), Some("t"));
    }
}
