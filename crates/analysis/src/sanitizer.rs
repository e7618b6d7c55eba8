use serde_json::Value;

/// Clamps and rounds raw model-produced scores to their declared ranges.
/// Any field that fails to coerce to a number is simply dropped rather
/// than defaulted to zero, so a caller can tell "absent" from "measured as
/// zero".
pub fn sanitize_scores(raw: &Value) -> Value {
    let Some(scores) = raw.as_object() else {
        return serde_json::json!({});
    };

    let mut sanitized = serde_json::Map::new();

    if let Some(sentiment) = as_f64(scores.get("sentiment")) {
        sanitized.insert("sentiment".into(), round2(sentiment.clamp(-1.0, 1.0)).into());
    }

    if let Some(emotion_raw) = scores.get("emotion").and_then(Value::as_object) {
        let mut emotion = serde_json::Map::new();
        for key in ["joy", "sadness", "anger", "fear", "neutral"] {
            if let Some(value) = as_f64(emotion_raw.get(key)) {
                emotion.insert(key.into(), round2(value.clamp(0.0, 1.0)).into());
            }
        }
        if !emotion.is_empty() {
            sanitized.insert("emotion".into(), Value::Object(emotion));
        }
    }

    for key in ["relevance_to_question", "relevance_to_category", "toxicity"] {
        if let Some(value) = as_f64(scores.get(key)) {
            sanitized.insert(key.into(), round2(value.clamp(0.0, 1.0)).into());
        }
    }

    if let Some(length) = scores.get("length").and_then(as_i64) {
        sanitized.insert("length".into(), length.max(0).into());
    }

    if let Some(keywords) = scores.get("keywords") {
        sanitized.insert("keywords".into(), keywords.clone());
    }

    Value::Object(sanitized)
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clamps_and_rounds_every_field() {
        let raw = json!({
            "sentiment": 1.456,
            "emotion": {"joy": 1.5, "sadness": -0.2, "anger": 0.333},
            "relevance_to_question": 1.2,
            "toxicity": -0.1,
            "length": -5,
            "keywords": ["가족", "행복"],
        });

        let sanitized = sanitize_scores(&raw);
        assert_eq!(sanitized["sentiment"], 1.0);
        assert_eq!(sanitized["emotion"]["joy"], 1.0);
        assert_eq!(sanitized["emotion"]["sadness"], 0.0);
        assert_eq!(sanitized["emotion"]["anger"], 0.33);
        assert_eq!(sanitized["relevance_to_question"], 1.0);
        assert_eq!(sanitized["toxicity"], 0.0);
        assert_eq!(sanitized["length"], 0);
        assert_eq!(sanitized["keywords"], json!(["가족", "행복"]));
    }

    #[test]
    fn non_object_input_yields_empty_object() {
        let sanitized = sanitize_scores(&json!("not an object"));
        assert_eq!(sanitized, json!({}));
    }

    #[test]
    fn unparseable_fields_are_dropped_not_defaulted() {
        let raw = json!({"sentiment": "not a number"});
        let sanitized = sanitize_scores(&raw);
        assert!(sanitized.get("sentiment").is_none());
    }
}
