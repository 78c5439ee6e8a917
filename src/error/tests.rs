use super::{AppError, ConfigError, HttpError, RunError, ValidationError};

#[test]
fn each_concern_wraps_into_its_own_variant() -> Result<(), String> {
    let cases = [
        (
            AppError::validation(ValidationError::EndpointsEmpty),
            "Validation error: Endpoint list is empty.",
        ),
        (
            AppError::config(ConfigError::MissingExtension),
            "Configuration error: Config file must have .toml or .json extension.",
        ),
        (
            AppError::http(HttpError::TemplateNotObject),
            "HTTP error: Body template must be a JSON object.",
        ),
        (
            AppError::run(RunError::AlreadyActive),
            "Run error: Another run is already active.",
        ),
    ];
    for (err, expected) in cases {
        if err.to_string() != expected {
            return Err(format!("expected {:?}, got {:?}", expected, err.to_string()));
        }
    }
    Ok(())
}

#[test]
fn io_failures_convert_with_question_mark() -> Result<(), String> {
    fn read_missing() -> super::AppResult<String> {
        Ok(std::fs::read_to_string("/nonexistent/rowburst/input.csv")?)
    }
    match read_missing() {
        Err(AppError::Io { .. }) => Ok(()),
        Err(err) => Err(format!("unexpected error: {}", err)),
        Ok(_) => Err("expected an I/O error".to_owned()),
    }
}
