use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Body template is not valid JSON: {source}")]
    TemplateInvalid {
        #[source]
        source: serde_json::Error,
    },
    #[error("Body template must be a JSON object.")]
    TemplateNotObject,
    #[error("Failed to serialize request body: {source}")]
    SerializeBody {
        #[source]
        source: serde_json::Error,
    },
}
