use serde::Deserialize;

// the front end sends select values as strings and typed inputs as numbers,
// and a field it left out has to look like an empty one
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Number(i64),
    Text(String),
}

impl Default for IntField {
    fn default() -> Self {
        IntField::Text(String::new())
    }
}

impl IntField {
    pub fn is_empty(&self) -> bool {
        matches!(self, IntField::Text(value) if value.is_empty())
    }

    pub fn to_i64(&self) -> Result<i64, String> {
        match self {
            IntField::Number(value) => Ok(*value),
            IntField::Text(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Wrong value {value}, can not parse to i64")),
        }
    }
}

/// `?page=` falls back to the first page when absent or not an integer.
pub fn page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        value: IntField,
    }

    fn parse(json: &str) -> IntField {
        serde_json::from_str::<Body>(json).unwrap().value
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"value": 3}"#).to_i64(), Ok(3));
        assert_eq!(parse(r#"{"value": "4"}"#).to_i64(), Ok(4));
    }

    #[test]
    fn missing_field_is_empty() {
        let value = parse("{}");
        assert!(value.is_empty());
        assert!(value.to_i64().is_err());
    }

    #[test]
    fn non_numeric_string_does_not_coerce() {
        let value = parse(r#"{"value": "hard"}"#);
        assert!(!value.is_empty());
        assert!(value.to_i64().is_err());
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some("abc")), 1);
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some("0")), 0);
    }
}
