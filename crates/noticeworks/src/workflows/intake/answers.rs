//! Turns raw JSON answers into validated [`FactValue`]s according to the
//! question's kind. Nothing reaches the fact store without passing here.

use crate::facts::{FactValue, DATE_FORMAT};
use crate::workflows::intake::definition::QuestionKind;
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("question '{0}' is not part of this question set")]
    UnknownQuestion(String),
    #[error("question '{0}' is not applicable right now")]
    NotApplicable(String),
    #[error("expected a yes/no answer, got {found}")]
    ExpectedBoolean { found: &'static str },
    #[error("expected a number, got {found}")]
    ExpectedNumber { found: &'static str },
    #[error("expected text, got {found}")]
    ExpectedText { found: &'static str },
    #[error("expected a list of selected options, got {found}")]
    ExpectedList { found: &'static str },
    #[error("answer must not be empty")]
    Empty,
    #[error("number must be finite")]
    NotFinite,
    #[error("{value} is below the minimum of {min}")]
    BelowMinimum { value: f64, min: f64 },
    #[error("{value} is above the maximum of {max}")]
    AboveMaximum { value: f64, max: f64 },
    #[error("answer is {length} characters long, limit is {max_length}")]
    TooLong { length: usize, max_length: usize },
    #[error("'{value}' is not a valid date, expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("date {value} is before the earliest allowed {earliest}")]
    DateTooEarly { value: NaiveDate, earliest: NaiveDate },
    #[error("date {value} is after the latest allowed {latest}")]
    DateTooLate { value: NaiveDate, latest: NaiveDate },
    #[error("'{value}' is not one of the allowed options")]
    NotAnOption { value: String },
    #[error("option '{0}' was selected more than once")]
    DuplicateOption(String),
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Validates a raw answer against the question kind and produces the value
/// to store. Date answers are canonicalised to `YYYY-MM-DD` text.
pub(crate) fn validate_answer(
    kind: &QuestionKind,
    raw: &serde_json::Value,
) -> Result<FactValue, AnswerError> {
    match kind {
        QuestionKind::Boolean => raw
            .as_bool()
            .map(FactValue::Bool)
            .ok_or(AnswerError::ExpectedBoolean {
                found: json_type_name(raw),
            }),
        QuestionKind::Number { min, max } => {
            let number = raw.as_f64().ok_or(AnswerError::ExpectedNumber {
                found: json_type_name(raw),
            })?;
            if !number.is_finite() {
                return Err(AnswerError::NotFinite);
            }
            if let Some(min) = min {
                if number < *min {
                    return Err(AnswerError::BelowMinimum {
                        value: number,
                        min: *min,
                    });
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Err(AnswerError::AboveMaximum {
                        value: number,
                        max: *max,
                    });
                }
            }
            Ok(FactValue::Number(number))
        }
        QuestionKind::Text { max_length } => {
            let text = raw.as_str().ok_or(AnswerError::ExpectedText {
                found: json_type_name(raw),
            })?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(AnswerError::Empty);
            }
            if let Some(max_length) = max_length {
                let length = trimmed.chars().count();
                if length > *max_length {
                    return Err(AnswerError::TooLong {
                        length,
                        max_length: *max_length,
                    });
                }
            }
            Ok(FactValue::Text(trimmed.to_string()))
        }
        QuestionKind::Date { earliest, latest } => {
            let text = raw.as_str().ok_or(AnswerError::ExpectedText {
                found: json_type_name(raw),
            })?;
            let trimmed = text.trim();
            let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
                AnswerError::InvalidDate {
                    value: trimmed.to_string(),
                }
            })?;
            if let Some(earliest) = earliest {
                if date < *earliest {
                    return Err(AnswerError::DateTooEarly {
                        value: date,
                        earliest: *earliest,
                    });
                }
            }
            if let Some(latest) = latest {
                if date > *latest {
                    return Err(AnswerError::DateTooLate {
                        value: date,
                        latest: *latest,
                    });
                }
            }
            Ok(FactValue::Text(date.format(DATE_FORMAT).to_string()))
        }
        QuestionKind::SingleChoice { options } => {
            let text = raw.as_str().ok_or(AnswerError::ExpectedText {
                found: json_type_name(raw),
            })?;
            if !options.iter().any(|option| option == text) {
                return Err(AnswerError::NotAnOption {
                    value: text.to_string(),
                });
            }
            Ok(FactValue::Text(text.to_string()))
        }
        QuestionKind::MultiChoice { options } => {
            let items = raw.as_array().ok_or(AnswerError::ExpectedList {
                found: json_type_name(raw),
            })?;
            if items.is_empty() {
                return Err(AnswerError::Empty);
            }
            let mut selected: Vec<String> = Vec::with_capacity(items.len());
            for item in items {
                let text = item.as_str().ok_or(AnswerError::ExpectedText {
                    found: json_type_name(item),
                })?;
                if !options.iter().any(|option| option == text) {
                    return Err(AnswerError::NotAnOption {
                        value: text.to_string(),
                    });
                }
                if selected.iter().any(|existing| existing == text) {
                    return Err(AnswerError::DuplicateOption(text.to_string()));
                }
                selected.push(text.to_string());
            }
            Ok(FactValue::List(selected))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_answers() {
        assert_eq!(
            validate_answer(&QuestionKind::Boolean, &json!(true)).unwrap(),
            FactValue::Bool(true)
        );
        assert!(matches!(
            validate_answer(&QuestionKind::Boolean, &json!("yes")),
            Err(AnswerError::ExpectedBoolean { found: "a string" })
        ));
    }

    #[test]
    fn number_respects_bounds() {
        let kind = QuestionKind::Number {
            min: Some(0.0),
            max: Some(12.0),
        };
        assert_eq!(
            validate_answer(&kind, &json!(2.5)).unwrap(),
            FactValue::Number(2.5)
        );
        assert!(matches!(
            validate_answer(&kind, &json!(-1)),
            Err(AnswerError::BelowMinimum { .. })
        ));
        assert!(matches!(
            validate_answer(&kind, &json!(13)),
            Err(AnswerError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn text_is_trimmed_and_length_checked() {
        let kind = QuestionKind::Text {
            max_length: Some(5),
        };
        assert_eq!(
            validate_answer(&kind, &json!("  abc ")).unwrap(),
            FactValue::Text("abc".into())
        );
        assert!(matches!(
            validate_answer(&kind, &json!("   ")),
            Err(AnswerError::Empty)
        ));
        assert!(matches!(
            validate_answer(&kind, &json!("toolong")),
            Err(AnswerError::TooLong { .. })
        ));
    }

    #[test]
    fn date_is_canonicalised_and_bounded() {
        let kind = QuestionKind::Date {
            earliest: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            latest: None,
        };
        assert_eq!(
            validate_answer(&kind, &json!(" 2023-04-01 ")).unwrap(),
            FactValue::Text("2023-04-01".into())
        );
        assert!(matches!(
            validate_answer(&kind, &json!("01/04/2023")),
            Err(AnswerError::InvalidDate { .. })
        ));
        assert!(matches!(
            validate_answer(&kind, &json!("2019-12-31")),
            Err(AnswerError::DateTooEarly { .. })
        ));
    }

    #[test]
    fn single_choice_must_match_an_option() {
        let kind = QuestionKind::SingleChoice {
            options: vec!["monthly".into(), "weekly".into()],
        };
        assert_eq!(
            validate_answer(&kind, &json!("monthly")).unwrap(),
            FactValue::Text("monthly".into())
        );
        assert!(matches!(
            validate_answer(&kind, &json!("fortnightly")),
            Err(AnswerError::NotAnOption { .. })
        ));
    }

    #[test]
    fn multi_choice_rejects_duplicates_and_unknowns() {
        let kind = QuestionKind::MultiChoice {
            options: vec!["noise".into(), "damage".into(), "threats".into()],
        };
        assert_eq!(
            validate_answer(&kind, &json!(["noise", "damage"])).unwrap(),
            FactValue::List(vec!["noise".into(), "damage".into()])
        );
        assert!(matches!(
            validate_answer(&kind, &json!([])),
            Err(AnswerError::Empty)
        ));
        assert!(matches!(
            validate_answer(&kind, &json!(["noise", "noise"])),
            Err(AnswerError::DuplicateOption(_))
        ));
        assert!(matches!(
            validate_answer(&kind, &json!(["arson"])),
            Err(AnswerError::NotAnOption { .. })
        ));
    }
}
