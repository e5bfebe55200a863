use std::fmt;

use serde_json::Value;

use super::RecordFields;

/// Filter formula understood by the record store. Only equality and existence
/// predicates combined with AND/OR are ever issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Field compared as text, so numeric columns match their rendered digits.
    TextEquals { field: String, value: String },
    NumberEquals { field: String, value: i64 },
    IsTrue { field: String },
    NotEmpty { field: String },
    Positive { field: String },
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn text_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn number_eq(field: impl Into<String>, value: i64) -> Self {
        Self::NumberEquals {
            field: field.into(),
            value,
        }
    }

    pub fn is_true(field: impl Into<String>) -> Self {
        Self::IsTrue {
            field: field.into(),
        }
    }

    pub fn not_empty(field: impl Into<String>) -> Self {
        Self::NotEmpty {
            field: field.into(),
        }
    }

    pub fn positive(field: impl Into<String>) -> Self {
        Self::Positive {
            field: field.into(),
        }
    }

    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Self {
        Self::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Self {
        Self::Or(parts.into_iter().collect())
    }

    /// Evaluates the formula against a field map the way the store would.
    pub fn matches(&self, fields: &RecordFields) -> bool {
        match self {
            Formula::TextEquals { field, value } => {
                rendered(fields.get(field)).as_deref() == Some(value.as_str())
            }
            Formula::NumberEquals { field, value } => {
                numeric(fields.get(field)) == Some(*value as f64)
            }
            Formula::IsTrue { field } => matches!(fields.get(field), Some(Value::Bool(true))),
            Formula::NotEmpty { field } => rendered(fields.get(field))
                .is_some_and(|text| !text.is_empty()),
            Formula::Positive { field } => numeric(fields.get(field)).is_some_and(|n| n > 0.0),
            Formula::And(parts) => parts.iter().all(|part| part.matches(fields)),
            Formula::Or(parts) => parts.iter().any(|part| part.matches(fields)),
        }
    }

    fn write_group(f: &mut fmt::Formatter<'_>, name: &str, parts: &[Formula]) -> fmt::Result {
        write!(f, "{name}(")?;
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::TextEquals { field, value } => write!(
                f,
                "({{{}}} & \"\") = \"{}\"",
                escape_field(field),
                escape_literal(value)
            ),
            Formula::NumberEquals { field, value } => {
                write!(f, "{{{}}}={}", escape_field(field), value)
            }
            Formula::IsTrue { field } => write!(f, "{{{}}}=TRUE()", escape_field(field)),
            Formula::NotEmpty { field } => write!(f, "{{{}}}!=''", escape_field(field)),
            Formula::Positive { field } => write!(f, "{{{}}}>0", escape_field(field)),
            Formula::And(parts) => Self::write_group(f, "AND", parts),
            Formula::Or(parts) => Self::write_group(f, "OR", parts),
        }
    }
}

fn rendered(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_field(field: &str) -> String {
    field.replace('}', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_text_comparison_against_rendered_value() {
        let formula = Formula::text_eq("DNI", "30111222");
        assert_eq!(formula.to_string(), r#"({DNI} & "") = "30111222""#);
    }

    #[test]
    fn escapes_quotes_in_literals() {
        let formula = Formula::text_eq("Slug", r#"x" & "y"#);
        assert_eq!(formula.to_string(), r#"({Slug} & "") = "x\" & \"y""#);
    }

    #[test]
    fn renders_nested_groups() {
        let formula = Formula::and([
            Formula::is_true("VISIBLE"),
            Formula::is_true("AUTORIZA_PUBLICAR"),
            Formula::not_empty("COMENTARIO"),
        ]);
        assert_eq!(
            formula.to_string(),
            "AND({VISIBLE}=TRUE(), {AUTORIZA_PUBLICAR}=TRUE(), {COMENTARIO}!='')"
        );

        let either = Formula::or([Formula::number_eq("DNI", 5), Formula::positive("ESTRELLAS")]);
        assert_eq!(either.to_string(), "OR({DNI}=5, {ESTRELLAS}>0)");
    }

    #[test]
    fn evaluates_against_field_maps() {
        let fields = serde_json::json!({
            "DNI": 30111222,
            "VISIBLE": true,
            "COMENTARIO": "",
            "ESTRELLAS": 4
        });
        let fields = fields.as_object().cloned().expect("object");

        assert!(Formula::text_eq("DNI", "30111222").matches(&fields));
        assert!(Formula::number_eq("DNI", 30111222).matches(&fields));
        assert!(Formula::and([Formula::is_true("VISIBLE"), Formula::positive("ESTRELLAS")])
            .matches(&fields));
        assert!(!Formula::not_empty("COMENTARIO").matches(&fields));
        assert!(!Formula::is_true("AUTORIZA_PUBLICAR").matches(&fields));
        assert!(Formula::or([Formula::not_empty("COMENTARIO"), Formula::is_true("VISIBLE")])
            .matches(&fields));
    }
}
