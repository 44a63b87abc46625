//! Rule compilation and evaluation
//!
//! A `ValidationRule` is compiled once per check into an `Evaluator`, with
//! relative date bounds resolved against the evaluation day. Evaluation is a
//! pure predicate: blank cells always pass, coercion failures are `false`.

use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::schema::{CompareOp, FieldRegistry, FieldSpec, ValidationRule};

use super::errors::{ValidatorError, ValidatorResult};
use super::numeric::normalize_number;
use super::value::CellValue;

/// Today's date on the local wall clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone)]
enum NumberTest {
    Compare { op: CompareOp, threshold: f64 },
    Between { min: f64, max: f64 },
}

#[derive(Debug, Clone)]
enum CompiledRule {
    Any,
    List(BTreeSet<String>),
    Length { op: CompareOp, length: usize },
    Number { test: NumberTest, integer: bool },
    Time { min: NaiveTime, max: NaiveTime },
    Date { min: NaiveDate, max: NaiveDate },
}

/// Executable form of one field's rule
#[derive(Debug, Clone)]
pub struct Evaluator {
    rule: CompiledRule,
    identifier: bool,
}

impl Evaluator {
    /// Compile the rule of a field spec
    pub fn compile(spec: &FieldSpec, today: NaiveDate) -> ValidatorResult<Self> {
        let mut evaluator = Self::for_rule(&spec.rule, today).map_err(|e| match e {
            ValidatorError::InvalidRule { reason, .. } => ValidatorError::InvalidRule {
                field: spec.name.clone(),
                reason,
            },
            other => other,
        })?;
        evaluator.identifier = spec.is_identifier();
        Ok(evaluator)
    }

    /// Compile a bare rule (no identifier semantics)
    pub fn for_rule(rule: &ValidationRule, today: NaiveDate) -> ValidatorResult<Self> {
        rule.check_structure()
            .map_err(|reason| ValidatorError::InvalidRule {
                field: String::new(),
                reason,
            })?;

        let compiled = match rule {
            ValidationRule::FreeText => CompiledRule::Any,
            ValidationRule::List { allowed } => CompiledRule::List(allowed.clone()),
            ValidationRule::LengthEquals { length } => CompiledRule::Length {
                op: CompareOp::Eq,
                length: *length,
            },
            ValidationRule::LengthCompare { op, length } => CompiledRule::Length {
                op: *op,
                length: *length,
            },
            ValidationRule::NumberCompare {
                op,
                threshold,
                integer,
            } => CompiledRule::Number {
                test: NumberTest::Compare {
                    op: *op,
                    threshold: *threshold,
                },
                integer: *integer,
            },
            ValidationRule::NumberBetween { min, max, integer } => CompiledRule::Number {
                test: NumberTest::Between {
                    min: *min,
                    max: *max,
                },
                integer: *integer,
            },
            ValidationRule::TimeBetween { min, max } => CompiledRule::Time {
                min: min.to_time(),
                max: max.to_time(),
            },
            ValidationRule::DateBetween { min, max } => CompiledRule::Date {
                min: min.resolve(today),
                max: max.resolve(today),
            },
        };

        Ok(Self {
            rule: compiled,
            identifier: false,
        })
    }

    /// Whether the value satisfies the rule
    pub fn evaluate(&self, value: &CellValue) -> bool {
        if value.is_blank() {
            return true;
        }

        match &self.rule {
            CompiledRule::Any => true,
            CompiledRule::List(allowed) => allowed.contains(&value.as_text()),
            CompiledRule::Length { op, length } => {
                let text = value.as_text();
                op.apply(text.chars().count(), *length) && (!self.identifier || is_canonical_uuid(&text))
            }
            CompiledRule::Number { test, integer } => {
                let number = match normalize_number(value) {
                    Ok(n) => n,
                    Err(_) => return false,
                };
                if *integer && !number.is_integral() {
                    return false;
                }
                let n = number.as_f64();
                match test {
                    NumberTest::Compare { op, threshold } => op.apply(n, *threshold),
                    NumberTest::Between { min, max } => *min <= n && n <= *max,
                }
            }
            CompiledRule::Time { min, max } => match value.as_time() {
                Some(t) => *min <= t && t <= *max,
                None => false,
            },
            CompiledRule::Date { min, max } => match value.as_date() {
                Some(d) => *min <= d && d <= *max,
                None => false,
            },
        }
    }
}

/// Hyphenated 36 character UUID
pub fn is_canonical_uuid(text: &str) -> bool {
    text.len() == 36 && Uuid::try_parse(text).is_ok()
}

/// Evaluators for every field of a registry, compiled against one day
pub struct CompiledSchema<'a> {
    registry: &'a FieldRegistry,
    evaluators: HashMap<&'a str, Evaluator>,
    today: NaiveDate,
}

impl<'a> CompiledSchema<'a> {
    pub fn compile(registry: &'a FieldRegistry, today: NaiveDate) -> ValidatorResult<Self> {
        let mut evaluators = HashMap::with_capacity(registry.len());
        for spec in registry.all_specs() {
            evaluators.insert(spec.name.as_str(), Evaluator::compile(spec, today)?);
        }
        Ok(Self {
            registry,
            evaluators,
            today,
        })
    }

    pub fn registry(&self) -> &'a FieldRegistry {
        self.registry
    }

    /// Day relative date bounds were resolved against
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn evaluator(&self, field: &str) -> Option<&Evaluator> {
        self.evaluators.get(field)
    }

    /// Evaluate a value for a named field; `None` if the field is unknown
    pub fn evaluate(&self, field: &str, value: &CellValue) -> Option<bool> {
        self.evaluator(field).map(|e| e.evaluate(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DateBound, TimeBound};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn rule(rule: ValidationRule) -> Evaluator {
        Evaluator::for_rule(&rule, day()).unwrap()
    }

    #[test]
    fn test_blank_always_passes() {
        let e = rule(ValidationRule::NumberCompare {
            op: CompareOp::Gt,
            threshold: 0.0,
            integer: true,
        });
        assert!(e.evaluate(&CellValue::Empty));
        assert!(e.evaluate(&CellValue::Text("nan".into())));
        assert!(e.evaluate(&CellValue::Float(f64::NAN)));
    }

    #[test]
    fn test_free_text_accepts_numbers() {
        let e = rule(ValidationRule::FreeText);
        assert!(e.evaluate(&CellValue::Int(3)));
        assert!(e.evaluate(&CellValue::Text("anything".into())));
    }

    #[test]
    fn test_list_is_exact() {
        let e = rule(ValidationRule::List {
            allowed: ["Male", "Female"].iter().map(|s| s.to_string()).collect(),
        });
        assert!(e.evaluate(&CellValue::Text("Male".into())));
        assert!(!e.evaluate(&CellValue::Text("male".into())));
        assert!(!e.evaluate(&CellValue::Text("Male ".into())));
    }

    #[test]
    fn test_list_matches_numeric_cells_by_string_form() {
        let e = rule(ValidationRule::List {
            allowed: ["2018616".to_string()].into_iter().collect(),
        });
        assert!(e.evaluate(&CellValue::Int(2018616)));
        assert!(!e.evaluate(&CellValue::Int(2018617)));
    }

    #[test]
    fn test_identifier_length_requires_uuid() {
        let spec = FieldSpec::new(
            "eventID",
            "ID",
            ValidationRule::LengthCompare {
                op: CompareOp::Eq,
                length: 36,
            },
        );
        let e = Evaluator::compile(&spec, day()).unwrap();
        assert!(e.evaluate(&CellValue::Text("11111111-1111-1111-1111-111111111111".into())));
        assert!(!e.evaluate(&CellValue::Text("zzzzzzzz-1111-1111-1111-111111111111".into())));
        assert!(!e.evaluate(&CellValue::Text("11111111111111111111111111111111".into())));

        let plain = FieldSpec::new("code", "Code", spec.rule.clone());
        let e = Evaluator::compile(&plain, day()).unwrap();
        assert!(e.evaluate(&CellValue::Text("zzzzzzzz-1111-1111-1111-111111111111".into())));
    }

    #[test]
    fn test_number_between_with_normalization() {
        let e = rule(ValidationRule::NumberBetween {
            min: -90.0,
            max: 90.0,
            integer: false,
        });
        assert!(e.evaluate(&CellValue::Text("78,1500".into())));
        assert!(e.evaluate(&CellValue::Float(90.0)));
        assert!(!e.evaluate(&CellValue::Float(90.0001)));
        assert!(!e.evaluate(&CellValue::Text("north".into())));
    }

    #[test]
    fn test_integer_rules_reject_fractions() {
        let e = rule(ValidationRule::NumberCompare {
            op: CompareOp::Gt,
            threshold: 0.0,
            integer: true,
        });
        assert!(e.evaluate(&CellValue::Text("'5".into())));
        assert!(e.evaluate(&CellValue::Float(5.0)));
        assert!(!e.evaluate(&CellValue::Float(5.5)));
        assert!(!e.evaluate(&CellValue::Int(0)));
    }

    #[test]
    fn test_time_between_day_fractions() {
        let e = rule(ValidationRule::TimeBetween {
            min: TimeBound::DayFraction(0.25),
            max: TimeBound::Clock(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
        });
        assert!(e.evaluate(&CellValue::Text("12:30".into())));
        assert!(e.evaluate(&CellValue::Float(0.5)));
        assert!(!e.evaluate(&CellValue::Text("05:59".into())));
        assert!(!e.evaluate(&CellValue::Text("19:00:00".into())));
        assert!(!e.evaluate(&CellValue::Text("later".into())));
    }

    #[test]
    fn test_relative_date_upper_bound() {
        let e = rule(ValidationRule::DateBetween {
            min: DateBound::Fixed(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            max: DateBound::Today { offset_days: 2 },
        });
        assert!(e.evaluate(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap())));
        assert!(!e.evaluate(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 13).unwrap())));
        assert!(!e.evaluate(&CellValue::Text("1999-12-31".into())));
    }

    #[test]
    fn test_misconfigured_rule_is_error() {
        let spec = FieldSpec::new(
            "depth",
            "Depth",
            ValidationRule::NumberBetween {
                min: 10.0,
                max: 0.0,
                integer: false,
            },
        );
        match Evaluator::compile(&spec, day()) {
            Err(ValidatorError::InvalidRule { field, .. }) => assert_eq!(field, "depth"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compiled_schema_lookup() {
        let registry = FieldRegistry::builtin().unwrap();
        let compiled = CompiledSchema::compile(&registry, day()).unwrap();
        assert_eq!(compiled.evaluate("bottleNumber", &CellValue::Int(3)), Some(true));
        assert_eq!(compiled.evaluate("bottleNumber", &CellValue::Int(-3)), Some(false));
        assert_eq!(compiled.evaluate("unknownColumn", &CellValue::Int(3)), None);
    }
}
