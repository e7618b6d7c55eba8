use crate::error::DomainError;

/// Question difficulty, clamped to `[1, 4]`.
///
/// Immutable once constructed. `new` rejects anything outside the range;
/// `from_any` is the safe factory used wherever an LLM or a malformed
/// request hands back a level that cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionLevel(u8);

const DEFAULT_LEVEL: u8 = 2;
const MIN_LEVEL: i64 = 1;
const MAX_LEVEL: i64 = 4;

impl QuestionLevel {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::InvalidInput(format!(
                "question level out of range [1,4]: {value}"
            )))
        }
    }

    /// Clamp/default to 2 on any parse failure or out-of-range value.
    pub fn from_any(value: i64) -> Self {
        Self::new(value).unwrap_or(Self(DEFAULT_LEVEL))
    }

    /// Parses a JSON value returned by an LLM. The generation contract asks
    /// for `level` as a plain integer in `[1, 4]`, so the common case is the
    /// `Number` branch; the `String` branch only covers a model quoting the
    /// digit (e.g. `"3"`). Anything else (unparseable string, float with a
    /// fractional part, boolean, null) defaults to level 2 rather than being
    /// treated as a contract violation — only a *missing* `level` key is
    /// fatal to the generation attempt.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::from_any)
                .unwrap_or(Self(DEFAULT_LEVEL)),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Self::from_any)
                .unwrap_or(Self(DEFAULT_LEVEL)),
            _ => Self(DEFAULT_LEVEL),
        }
    }

    pub fn get(self) -> i64 {
        self.0 as i64
    }
}

impl Default for QuestionLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_full_range() {
        for v in 1..=4 {
            assert_eq!(QuestionLevel::new(v).unwrap().get(), v);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(QuestionLevel::new(0).is_err());
        assert!(QuestionLevel::new(5).is_err());
    }

    #[test]
    fn from_any_round_trips_for_valid_levels() {
        for v in 1..=4 {
            let level = QuestionLevel::from_any(v);
            assert_eq!(QuestionLevel::from_any(level.get()), level);
        }
    }

    #[test]
    fn from_any_defaults_to_two_on_bad_input() {
        assert_eq!(QuestionLevel::from_any(0).get(), 2);
        assert_eq!(QuestionLevel::from_any(99).get(), 2);
        assert_eq!(QuestionLevel::from_any(-3).get(), 2);
    }

    #[test]
    fn from_json_handles_strings_and_missing_numbers() {
        assert_eq!(QuestionLevel::from_json(&serde_json::json!("3")).get(), 3);
        assert_eq!(QuestionLevel::from_json(&serde_json::json!("not a number")).get(), 2);
        assert_eq!(QuestionLevel::from_json(&serde_json::Value::Null).get(), 2);
    }

    #[test]
    fn from_json_parses_the_integer_levels_the_generation_contract_actually_sends() {
        for v in 1..=4 {
            assert_eq!(QuestionLevel::from_json(&serde_json::json!(v)).get(), v);
        }
    }

    #[test]
    fn total_order_holds() {
        assert!(QuestionLevel::new(1).unwrap() < QuestionLevel::new(2).unwrap());
        assert!(QuestionLevel::new(4).unwrap() > QuestionLevel::new(3).unwrap());
    }
}
