use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON does not match `T`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;
    log::debug!("Read {} byte(s) from '{}'", data.len(), file_path);

    parse_json_str(&data)
}

pub fn parse_json_str<T: DeserializeOwned>(data: &str) -> Result<T> {
    let parsed_data: T = serde_json::from_str(data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

/// Pretty-printed JSON of a document or net.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::DeserializationError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::pnml_dto::PnmlNetDto;

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_json_file::<PnmlNetDto>("tests/data/does_not_exist.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_wrong_shape_is_deserialization_error() {
        let result = parse_json_str::<PnmlNetDto>(r#"{ "id": "n", "places": 3 }"#);
        assert!(matches!(result, Err(Error::DeserializationError(_))));
    }
}
