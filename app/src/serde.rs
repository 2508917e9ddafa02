use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber<T> {
    String(String),
    Number(T),
}

/// Tolerant numeric deserializer for tool payloads: accepts a bare number,
/// a stringified number ("42.5", as the SonarQube measures API emits), or
/// nothing at all. Unparseable input maps to `None` so a single bad field
/// never fails the whole submission.
pub fn deserialize_lenient_number<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr + Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber<T>>::deserialize(deserializer) {
        Ok(Some(StringOrNumber::String(s))) => Ok(s.trim().parse::<T>().ok()),
        Ok(Some(StringOrNumber::Number(n))) => Ok(Some(n)),
        Ok(None) => Ok(None),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::deserialize_lenient_number")]
        value: Option<f64>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let p: Probe = serde_json::from_value(serde_json::json!({ "value": 42.5 })).unwrap();
        assert_eq!(p.value, Some(42.5));

        let p: Probe = serde_json::from_value(serde_json::json!({ "value": "42.5" })).unwrap();
        assert_eq!(p.value, Some(42.5));
    }

    #[test]
    fn degrades_to_none_instead_of_failing() {
        let p: Probe = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(p.value, None);

        let p: Probe = serde_json::from_value(serde_json::json!({ "value": null })).unwrap();
        assert_eq!(p.value, None);

        let p: Probe =
            serde_json::from_value(serde_json::json!({ "value": "not-a-number" })).unwrap();
        assert_eq!(p.value, None);
    }
}
