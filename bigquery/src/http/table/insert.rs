use crate::http::bigquery_client::ApiRequest;
use crate::http::error::Error;
use crate::http::table::Table;

pub fn build(table: &Table) -> Result<ApiRequest, Error> {
    let path = format!("{}/tables", table.table_reference.dataset().path());
    Ok(ApiRequest::post(path).json(serde_json::to_value(table)?))
}
