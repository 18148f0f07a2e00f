use crate::http::bigquery_client::ApiRequest;
use crate::http::dataset::DatasetReference;

pub fn build(dataset: &DatasetReference) -> ApiRequest {
    ApiRequest::get(dataset.path())
}
