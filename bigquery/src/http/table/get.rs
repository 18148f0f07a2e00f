use crate::http::bigquery_client::ApiRequest;
use crate::http::table::TableReference;

pub fn build(table: &TableReference) -> ApiRequest {
    ApiRequest::get(table.path())
}
