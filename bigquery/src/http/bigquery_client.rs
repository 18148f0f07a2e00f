use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Response};
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use token_source::TokenSource;

use crate::http::error::{Error, ErrorWrapper};

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/bigquery",
    "https://www.googleapis.com/auth/bigquery.insertdata",
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/cloud-platform.read-only",
];

/// A single call against the BigQuery REST surface.
///
/// `path` is relative to the `bigquery/v2` root, e.g. `/projects/p/datasets/d`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            body: None,
            headers: vec![],
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Replaces an existing query parameter, or appends it.
    pub fn set_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query(key, value)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// The HTTP/JSON collaborator every resource client talks through.
///
/// Implementations return the parsed JSON body of a 2xx response (`Value::Null` for an empty body)
/// and map any other status onto [`Error::Response`] / [`Error::PreconditionFailed`].
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn request(&self, request: ApiRequest) -> Result<Value, Error>;
}

pub(crate) async fn send<T>(transport: &dyn Transport, request: ApiRequest) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let value = transport.request(request).await?;
    Ok(serde_json::from_value(value)?)
}

pub(crate) async fn send_empty(transport: &dyn Transport, request: ApiRequest) -> Result<(), Error> {
    transport.request(request).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BigqueryClient {
    ts: Option<Arc<dyn TokenSource>>,
    endpoint: String,
    http: Client,
    debug: bool,
}

impl BigqueryClient {
    pub fn new(ts: Option<Arc<dyn TokenSource>>, endpoint: &str, http: Client, debug: bool) -> Self {
        Self {
            ts,
            endpoint: format!("{}/bigquery/v2", endpoint.trim_end_matches('/')),
            http,
            debug,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn with_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        let builder = builder
            .header("X-Goog-Api-Client", "rust")
            .header(reqwest::header::USER_AGENT, "google-cloud-bigquery");
        match &self.ts {
            Some(ts) => {
                let token = ts.token().await.map_err(Error::TokenSource)?;
                Ok(builder.header(reqwest::header::AUTHORIZATION, token))
            }
            None => Ok(builder),
        }
    }

    fn build(&self, request: &ApiRequest) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }

    /// Checks whether an HTTP response is successful and returns it, or returns an error.
    async fn check_response_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        let error = match response.error_for_status_ref() {
            Ok(_) => return Ok(response),
            Err(error) => error,
        };

        // try to extract a response error, falling back to the status error if it can not be parsed.
        Err(response
            .json::<ErrorWrapper>()
            .await
            .map(|wrapper| Error::from_status(status.as_u16(), wrapper.error))
            .unwrap_or(Error::HttpClient(error)))
    }
}

#[async_trait]
impl Transport for BigqueryClient {
    async fn request(&self, request: ApiRequest) -> Result<Value, Error> {
        tracing::debug!(method = %request.method, path = %request.path, "bigquery request");
        let builder = self.with_headers(self.build(&request)).await?;
        let response = builder.send().await?;
        let response = Self::check_response_status(response).await?;
        let text = response.text().await?;
        if self.debug {
            tracing::trace!("{}", text);
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(text.as_str())?)
    }
}
