use std::collections::HashMap;
use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EvaluationError, EvaluationResult};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// One evaluated expression as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub expr: String,
    pub result: String,
    #[serde(default)]
    pub assign: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRequest {
    pub image: String,
    pub dict_of_vars: HashMap<String, String>,
}

impl EvaluationRequest {
    pub fn from_surface(
        surface: &RgbaImage,
        bindings: HashMap<String, String>,
    ) -> EvaluationResult<Self> {
        Ok(Self {
            image: encode_png_data_url(surface)?,
            dict_of_vars: bindings,
        })
    }
}

pub fn encode_png_data_url(surface: &RgbaImage) -> EvaluationResult<String> {
    let mut png = Cursor::new(Vec::new());
    surface
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| EvaluationError::Encode {
            message: err.to_string(),
        })?;
    let encoded = general_purpose::STANDARD.encode(png.into_inner());
    Ok(format!("{PNG_DATA_URL_PREFIX}{encoded}"))
}

/// Extracts the record list from a response body.
///
/// The body must be a JSON object. A missing or `null` `data` field means no
/// records; any other non-array `data` is malformed.
pub fn parse_response_body(body: &str) -> EvaluationResult<Vec<EvaluationRecord>> {
    let value: Value = serde_json::from_str(body).map_err(|err| {
        EvaluationError::MalformedResponse {
            message: format!("response is not valid JSON: {err}"),
        }
    })?;
    let Value::Object(mut wrapper) = value else {
        return Err(EvaluationError::MalformedResponse {
            message: "response body is not an object".to_string(),
        });
    };

    match wrapper.remove("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data @ Value::Array(_)) => {
            serde_json::from_value(data).map_err(|err| EvaluationError::MalformedResponse {
                message: format!("invalid evaluation record: {err}"),
            })
        }
        Some(other) => Err(EvaluationError::MalformedResponse {
            message: format!("expected array of calculations but got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn parses_records_and_defaults_assign() {
        let body = r#"{
            "message": "Image processed",
            "status": "success",
            "data": [
                {"expr": "x=5", "result": "5", "assign": true},
                {"expr": "2+2", "result": "4"}
            ]
        }"#;
        let records = parse_response_body(body).expect("records should parse");
        assert_eq!(
            records,
            vec![
                EvaluationRecord {
                    expr: "x=5".to_string(),
                    result: "5".to_string(),
                    assign: true,
                },
                EvaluationRecord {
                    expr: "2+2".to_string(),
                    result: "4".to_string(),
                    assign: false,
                },
            ]
        );
    }

    #[test]
    fn missing_or_null_data_yields_no_records() {
        assert!(parse_response_body(r#"{"status": "ok"}"#).unwrap().is_empty());
        assert!(parse_response_body(r#"{"data": null}"#).unwrap().is_empty());
        assert!(parse_response_body(r#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn non_array_data_is_malformed() {
        let err = parse_response_body(r#"{"data": {"expr": "1"}}"#).unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse { .. }));
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn non_object_and_invalid_bodies_are_malformed() {
        for body in ["[1, 2]", "\"text\"", "not json"] {
            let err = parse_response_body(body).unwrap_err();
            assert!(matches!(err, EvaluationError::MalformedResponse { .. }), "{body}");
        }
    }

    #[test]
    fn record_with_wrong_field_types_is_malformed() {
        let err = parse_response_body(r#"{"data": [{"expr": 1, "result": "2"}]}"#).unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse { .. }));
    }

    #[test]
    fn request_serializes_image_and_bindings() {
        let surface = RgbaImage::new(4, 3);
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), "5".to_string());
        let request = EvaluationRequest::from_surface(&surface, bindings).unwrap();

        assert!(request.image.starts_with(PNG_DATA_URL_PREFIX));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dict_of_vars"], serde_json::json!({ "x": "5" }));

        let encoded = &request.image[PNG_DATA_URL_PREFIX.len()..];
        let png = general_purpose::STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
    }
}
