use crate::domain::coerce::{coerce_amount, coerce_count, coerce_id, coerce_text};
use crate::domain::model::{ExtractionResult, RelaySuccess, FALLBACK_FILENAME};
use crate::relay::error::RelayError;
use serde_json::Value;

/// 將工作流程回應 `{"data": {"outputs": {...}}}` 攤平成中繼端點的成功回應
pub fn normalize(payload: &Value, filename: &str) -> Result<RelaySuccess, RelayError> {
    let data = payload.get("data").filter(|v| v.is_object());
    let outputs = data
        .and_then(|d| d.get("outputs"))
        .filter(|v| v.is_object());

    let (Some(data), Some(outputs)) = (data, outputs) else {
        return Err(RelayError::UnexpectedShape {
            payload: payload.to_string(),
        });
    };

    let mut renamed_filename = text_field(outputs, "renamed_filename");
    if renamed_filename.is_empty() {
        renamed_filename = FALLBACK_FILENAME.to_string();
    }

    Ok(RelaySuccess {
        success: true,
        filename: filename.to_string(),
        result: ExtractionResult {
            renamed_filename,
            company: text_field(outputs, "company"),
            date: text_field(outputs, "date"),
            amount: coerce_amount(outputs.get("amount")),
            description: text_field(outputs, "description"),
            workflow_run_id: coerce_id(data.get("workflow_run_id")),
            elapsed_time: data
                .get("elapsed_time")
                .and_then(|v| v.as_f64())
                .filter(|f| f.is_finite()),
            total_tokens: coerce_count(data.get("total_tokens")),
        },
    })
}

fn text_field(outputs: &Value, key: &str) -> String {
    coerce_text(outputs.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_payload() {
        let payload = json!({
            "data": {
                "workflow_run_id": "run-1",
                "elapsed_time": 3.2,
                "total_tokens": 812,
                "outputs": {
                    "renamed_filename": "acme_2024-01-05.pdf",
                    "company": "Acme",
                    "date": "2024-01-05",
                    "amount": "120.50",
                    "description": "consulting"
                }
            }
        });

        let success = normalize(&payload, "scan.pdf").unwrap();
        assert!(success.success);
        assert_eq!(success.filename, "scan.pdf");
        assert_eq!(success.result.renamed_filename, "acme_2024-01-05.pdf");
        assert_eq!(success.result.amount, 120.5);
        assert_eq!(success.result.workflow_run_id.as_deref(), Some("run-1"));
        assert_eq!(success.result.elapsed_time, Some(3.2));
        assert_eq!(success.result.total_tokens, Some(812));
    }

    #[test]
    fn test_normalize_defaults_missing_fields() {
        let payload = json!({"data": {"outputs": {}}});
        let success = normalize(&payload, "scan.pdf").unwrap();

        assert_eq!(success.result.renamed_filename, FALLBACK_FILENAME);
        assert_eq!(success.result.company, "");
        assert_eq!(success.result.date, "");
        assert_eq!(success.result.description, "");
        assert_eq!(success.result.amount, 0.0);
        assert!(success.result.workflow_run_id.is_none());
    }

    #[test]
    fn test_normalize_empty_filename_uses_fallback() {
        let payload = json!({"data": {"outputs": {"renamed_filename": ""}}});
        let success = normalize(&payload, "scan.pdf").unwrap();
        assert_eq!(success.result.renamed_filename, FALLBACK_FILENAME);
    }

    #[test]
    fn test_normalize_rejects_unexpected_shape() {
        for payload in [
            json!({"outputs": {}}),
            json!({"data": {}}),
            json!({"data": {"outputs": "text"}}),
            json!({"data": null}),
            json!([1, 2, 3]),
        ] {
            let err = normalize(&payload, "scan.pdf").unwrap_err();
            match err {
                RelayError::UnexpectedShape { payload: serialized } => {
                    assert_eq!(serialized, payload.to_string());
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_numeric_text_fields_are_stringified() {
        let payload = json!({"data": {"outputs": {"date": 20240105, "company": null}}});
        let success = normalize(&payload, "scan.pdf").unwrap();
        assert_eq!(success.result.date, "20240105");
        assert_eq!(success.result.company, "");
    }

    #[test]
    fn test_zero_text_outputs_count_as_missing() {
        let payload = json!({"data": {"outputs": {"renamed_filename": 0, "company": 0, "amount": 0}}});
        let success = normalize(&payload, "scan.pdf").unwrap();
        assert_eq!(success.result.renamed_filename, FALLBACK_FILENAME);
        assert_eq!(success.result.company, "");
        assert_eq!(success.result.amount, 0.0);
    }

    #[test]
    fn test_metadata_accepts_numeric_run_id() {
        let payload = json!({
            "data": {
                "workflow_run_id": 98765,
                "elapsed_time": 0.8,
                "total_tokens": 812.0,
                "outputs": {}
            }
        });
        let success = normalize(&payload, "scan.pdf").unwrap();
        assert_eq!(success.result.workflow_run_id.as_deref(), Some("98765"));
        assert_eq!(success.result.elapsed_time, Some(0.8));
        assert_eq!(success.result.total_tokens, Some(812));
    }
}
