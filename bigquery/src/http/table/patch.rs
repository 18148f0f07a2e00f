use crate::http::bigquery_client::ApiRequest;
use crate::http::error::Error;
use crate::http::table::{Table, TableField};
use crate::http::update::{self, Precondition};

pub fn build(table: &Table, fields: &[TableField], precondition: &Precondition) -> Result<ApiRequest, Error> {
    Ok(update::build(table, fields, precondition)?.into_request(table.path()))
}
