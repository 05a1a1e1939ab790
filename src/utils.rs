use serde::Serialize;

/// Serialize a serde-backed enum into its string name (e.g. `heat-cool`).
pub fn serde_enum_name<T: Serialize>(val: &T) -> Option<String> {
    serde_json::to_value(val).ok()?.as_str().map(|s| s.to_string())
}

/// True for names safe to splice into DDL: ASCII letters, digits and `_`, not
/// starting with a digit.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Double-quote an identifier already checked with `is_sql_identifier`.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{HvacMode, TemperatureScale};

    #[test]
    fn enum_names_follow_serde_renames() {
        assert_eq!(serde_enum_name(&HvacMode::HeatCool).as_deref(), Some("heat-cool"));
        assert_eq!(serde_enum_name(&TemperatureScale::C).as_deref(), Some("C"));
        assert_eq!(serde_enum_name(&42), None);
    }

    #[test]
    fn identifiers() {
        assert!(is_sql_identifier("thermostat"));
        assert!(is_sql_identifier("V_Thermostat"));
        assert!(is_sql_identifier("_t2"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("2fast"));
        assert!(!is_sql_identifier("thermostat; DROP TABLE x"));
        assert!(!is_sql_identifier("a\"b"));
    }
}
