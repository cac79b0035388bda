//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;

    fn sample_values() -> [f64; FEATURE_COUNT] {
        [7.0, 150.0, 0.0, 5.0, 250.0, 400.0, 10.0, 60.0, 3.0]
    }

    #[test]
    fn test_feature_names_order() {
        assert_eq!(FEATURE_COUNT, 9);
        assert_eq!(FEATURE_NAMES[0], "ph");
        assert_eq!(FEATURE_NAMES[2], SOLIDS_FIELD);
        assert_eq!(FEATURE_NAMES[8], "Turbidity");
    }

    #[test]
    fn test_feature_vector_accepts_finite() {
        let vector = FeatureVector::new(sample_values()).unwrap();
        assert_eq!(vector.as_slice(), &sample_values());
        assert_eq!(vector.get("Sulfate"), Some(250.0));
        assert_eq!(vector.solids(), 0.0);
        assert_eq!(vector.get("Lead"), None);
    }

    #[test]
    fn test_feature_vector_rejects_non_finite() {
        let mut values = sample_values();
        values[4] = f64::NAN;
        assert_eq!(FeatureVector::new(values), Err("Sulfate"));

        values[4] = f64::INFINITY;
        values[0] = f64::NEG_INFINITY;
        assert_eq!(FeatureVector::new(values), Err("ph"));
    }

    #[test]
    fn test_fallback_reading() {
        let reading = TelemetryReading::fallback();
        assert_eq!(reading.value, 0.0);
        assert!(reading.is_fallback());
        assert!(reading.created_at.is_none());
    }

    #[test]
    fn test_prediction_response_serialization() {
        let result = PredictionResult {
            decision_tree: ModelLabel {
                model: "decision_tree".to_string(),
                label: 1,
            },
            knn: ModelLabel {
                model: "knn".to_string(),
                label: 0,
            },
        };

        let json = serde_json::to_value(PredictionResponse::from(&result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Decision_Tree_Prediction": 1, "KNN_Prediction": 0})
        );
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: "No data received".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"No data received"}"#
        );
    }

    #[test]
    fn test_reading_source_serialization() {
        assert_eq!(
            serde_json::to_string(&ReadingSource::Fallback).unwrap(),
            "\"fallback\""
        );
        assert_eq!(
            serde_json::to_string(&ReadingSource::Provider).unwrap(),
            "\"provider\""
        );
    }
}
