use futures_util::StreamExt;
use reqwest::Response;
use serde_json::{Map, Value};

use crate::error::HttpError;

/// Largest response body kept in memory; the rest is discarded.
pub const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;
/// Longest response excerpt copied into a log line.
const LOG_BODY_PREVIEW: usize = 1024;

pub(crate) type BodyTemplate = Map<String, Value>;

/// Parses the request-body template. Any JSON object is accepted; values
/// that look like placeholders are kept verbatim.
pub(crate) fn parse_template(text: &str) -> Result<BodyTemplate, HttpError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(template)) => Ok(template),
        Ok(_) => Err(HttpError::TemplateNotObject),
        Err(err) => Err(HttpError::TemplateInvalid { source: err }),
    }
}

pub(crate) struct InjectedFields<'fields> {
    pub(crate) endpoint_field: &'fields str,
    pub(crate) endpoint: &'fields str,
    pub(crate) params_field: &'fields str,
    pub(crate) params: &'fields str,
}

/// Shallow-copies the template and overwrites the endpoint and params
/// fields. Params go in as a JSON string, not as nested JSON.
pub(crate) fn build_body(
    template: &BodyTemplate,
    fields: &InjectedFields<'_>,
) -> Result<Vec<u8>, HttpError> {
    let mut data = template.clone();
    data.insert(
        fields.endpoint_field.to_owned(),
        Value::String(fields.endpoint.to_owned()),
    );
    data.insert(
        fields.params_field.to_owned(),
        Value::String(fields.params.to_owned()),
    );
    serde_json::to_vec(&data).map_err(|err| HttpError::SerializeBody { source: err })
}

/// Reads at most `limit` bytes of the body and stops there.
pub(crate) async fn read_capped(
    response: Response,
    limit: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        let take = limit.saturating_sub(body.len()).min(bytes.len());
        if let Some(slice) = bytes.get(..take) {
            body.extend_from_slice(slice);
        }
        if body.len() >= limit {
            break;
        }
    }
    Ok(body)
}

pub(crate) fn log_preview(body: &str) -> &str {
    if body.len() <= LOG_BODY_PREVIEW {
        return body;
    }
    let mut end = LOG_BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    body.get(..end).unwrap_or(body)
}
