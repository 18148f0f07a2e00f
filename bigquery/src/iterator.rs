use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::bigquery_client::{ApiRequest, Transport};
use crate::http::error::Error;

/// Item conversion for list endpoints returning plain resources.
pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    Ok(serde_json::from_value(value)?)
}

/// Lazily pages through a list endpoint.
///
/// Pages are requested on demand, a failed request is returned as is and the iterator can not be rewound.
/// When `max_results` is set, no more than that many items are yielded in total.
pub struct PageIterator<T> {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) request: ApiRequest,
    pub(crate) items_key: &'static str,
    pub(crate) token_key: &'static str,
    pub(crate) complete_key: Option<&'static str>,
    pub(crate) item_to_value: fn(Value) -> Result<T, Error>,
    pub(crate) next_page_token: Option<String>,
    pub(crate) max_results: Option<usize>,
    pub(crate) num_results: usize,
    pub(crate) started: bool,
    pub(crate) chunk: VecDeque<T>,
}

impl<T> PageIterator<T> {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        request: ApiRequest,
        items_key: &'static str,
        item_to_value: fn(Value) -> Result<T, Error>,
    ) -> Self {
        Self {
            transport,
            request,
            items_key,
            token_key: "nextPageToken",
            complete_key: None,
            item_to_value,
            next_page_token: None,
            max_results: None,
            num_results: 0,
            started: false,
            chunk: VecDeque::new(),
        }
    }

    pub(crate) fn with_page_token(mut self, page_token: Option<String>) -> Self {
        self.next_page_token = page_token;
        self
    }

    pub(crate) fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Name of the response property holding the next page token.
    pub(crate) fn with_token_key(mut self, token_key: &'static str) -> Self {
        self.token_key = token_key;
        self
    }

    /// Name of a response property that is `false` while the results are not ready yet.
    /// Such a page fails with [`Error::JobIncomplete`].
    pub(crate) fn with_complete_key(mut self, complete_key: &'static str) -> Self {
        self.complete_key = Some(complete_key);
        self
    }

    /// Token of the page the next request will ask for.
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Number of items received so far.
    pub fn num_results(&self) -> usize {
        self.num_results
    }

    fn remaining(&self) -> Option<usize> {
        self.max_results.map(|max| max.saturating_sub(self.num_results))
    }

    fn has_next_page(&self) -> bool {
        if self.remaining() == Some(0) {
            return false;
        }
        !self.started || self.next_page_token.is_some()
    }

    /// Returns the next page of items, or `None` once every page was read.
    ///
    /// Items buffered by [`PageIterator::next`] are returned first.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, Error> {
        if !self.chunk.is_empty() {
            return Ok(Some(self.chunk.drain(..).collect()));
        }
        if !self.has_next_page() {
            return Ok(None);
        }
        let mut request = self.request.clone();
        if let Some(token) = &self.next_page_token {
            request = request.set_query("pageToken", token);
        }
        if let Some(remaining) = self.remaining() {
            request = request.set_query("maxResults", remaining);
        }

        let response = self.transport.request(request).await?;
        if let Some(key) = self.complete_key {
            if response.get(key) == Some(&Value::Bool(false)) {
                return Err(Error::JobIncomplete);
            }
        }
        self.started = true;
        let (items, token) = match response {
            Value::Object(mut body) => (body.remove(self.items_key), body.remove(self.token_key)),
            _ => (None, None),
        };
        self.next_page_token = match token {
            Some(Value::String(token)) if !token.is_empty() => Some(token),
            _ => None,
        };
        let items = match items {
            Some(Value::Array(items)) => items,
            _ => vec![],
        };
        let mut page = items
            .into_iter()
            .map(self.item_to_value)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(remaining) = self.remaining() {
            page.truncate(remaining);
        }
        self.num_results += page.len();
        tracing::trace!(items = page.len(), more = self.next_page_token.is_some(), "page received");
        Ok(Some(page))
    }

    /// Returns the next item, fetching a new page when the current one is used up.
    pub async fn next(&mut self) -> Result<Option<T>, Error> {
        loop {
            if let Some(item) = self.chunk.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.chunk.extend(page),
                None => return Ok(None),
            }
        }
    }

    /// Reads every remaining item.
    pub async fn collect(mut self) -> Result<Vec<T>, Error> {
        let mut items = vec![];
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    pub fn into_stream(mut self) -> impl Stream<Item = Result<T, Error>> {
        async_stream::try_stream! {
            while let Some(item) = self.next().await? {
                yield item;
            }
        }
    }
}
