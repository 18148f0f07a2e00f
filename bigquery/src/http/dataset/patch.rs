use crate::http::bigquery_client::ApiRequest;
use crate::http::dataset::{Dataset, DatasetField};
use crate::http::error::Error;
use crate::http::update::{self, Precondition};

pub fn build(dataset: &Dataset, fields: &[DatasetField], precondition: &Precondition) -> Result<ApiRequest, Error> {
    Ok(update::build(dataset, fields, precondition)?.into_request(dataset.path()))
}
