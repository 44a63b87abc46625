//! Field and rule definitions
//!
//! A `FieldSpec` is the immutable descriptor of one recognised column. Its
//! `rule` is drawn from a small closed vocabulary; absence means free text.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::bounds::{DateBound, TimeBound};

/// Comparison operator used by length and number rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
}

impl CompareOp {
    /// Evaluate `value <op> threshold`
    pub fn apply<T: PartialOrd>(&self, value: T, threshold: T) -> bool {
        match self {
            CompareOp::Lt => value < threshold,
            CompareOp::Le => value <= threshold,
            CompareOp::Gt => value > threshold,
            CompareOp::Ge => value >= threshold,
            CompareOp::Eq => value == threshold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation rule attached to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Anything representable as text
    #[default]
    FreeText,
    /// Exact, case-sensitive membership in a vocabulary
    List { allowed: BTreeSet<String> },
    /// Text length equals `length`
    LengthEquals { length: usize },
    /// Text length compared against `length`
    LengthCompare { op: CompareOp, length: usize },
    /// Numeric value compared against `threshold`
    NumberCompare {
        op: CompareOp,
        threshold: f64,
        #[serde(default)]
        integer: bool,
    },
    /// Numeric value within `[min, max]`
    NumberBetween {
        min: f64,
        max: f64,
        #[serde(default)]
        integer: bool,
    },
    /// Time of day within `[min, max]`
    TimeBetween { min: TimeBound, max: TimeBound },
    /// Calendar date within `[min, max]`
    DateBetween { min: DateBound, max: DateBound },
}

impl ValidationRule {
    /// Returns the rule kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValidationRule::FreeText => "free_text",
            ValidationRule::List { .. } => "list",
            ValidationRule::LengthEquals { .. } => "length_equals",
            ValidationRule::LengthCompare { .. } => "length_compare",
            ValidationRule::NumberCompare { .. } => "number_compare",
            ValidationRule::NumberBetween { .. } => "number_between",
            ValidationRule::TimeBetween { .. } => "time_between",
            ValidationRule::DateBetween { .. } => "date_between",
        }
    }

    /// Human description of what the rule accepts, used in error listings
    pub fn describe(&self) -> String {
        let kind = |integer: bool| if integer { "an integer" } else { "a number" };
        match self {
            ValidationRule::FreeText => "any text".to_string(),
            ValidationRule::List { allowed } if allowed.len() <= 8 => {
                let values: Vec<&str> = allowed.iter().map(String::as_str).collect();
                format!("one of [{}]", values.join(", "))
            }
            ValidationRule::List { allowed } => {
                format!("a value from the {}-entry vocabulary", allowed.len())
            }
            ValidationRule::LengthEquals { length } => format!("exactly {} characters", length),
            ValidationRule::LengthCompare { op, length } => {
                format!("a length {} {} characters", op, length)
            }
            ValidationRule::NumberCompare {
                op,
                threshold,
                integer,
            } => format!("{} {} {}", kind(*integer), op, threshold),
            ValidationRule::NumberBetween { min, max, integer } => {
                format!("{} between {} and {}", kind(*integer), min, max)
            }
            ValidationRule::TimeBetween { min, max } => {
                format!("a time between {} and {}", min, max)
            }
            ValidationRule::DateBetween { min, max } => {
                format!("a date between {} and {}", min, max)
            }
        }
    }

    /// Structural check performed when a registry is built
    pub fn check_structure(&self) -> Result<(), String> {
        match self {
            ValidationRule::FreeText
            | ValidationRule::LengthEquals { .. }
            | ValidationRule::LengthCompare { .. } => Ok(()),
            ValidationRule::List { allowed } => {
                if allowed.is_empty() {
                    Err("list rule has no allowed values".to_string())
                } else {
                    Ok(())
                }
            }
            ValidationRule::NumberCompare { threshold, .. } => {
                if threshold.is_finite() {
                    Ok(())
                } else {
                    Err("number threshold must be finite".to_string())
                }
            }
            ValidationRule::NumberBetween { min, max, .. } => {
                if !min.is_finite() || !max.is_finite() {
                    Err("number bounds must be finite".to_string())
                } else if min > max {
                    Err(format!("minimum {} exceeds maximum {}", min, max))
                } else {
                    Ok(())
                }
            }
            ValidationRule::TimeBetween { min, max } => {
                min.check()?;
                max.check()?;
                if min.to_time() > max.to_time() {
                    Err(format!("minimum time {} is after maximum {}", min, max))
                } else {
                    Ok(())
                }
            }
            ValidationRule::DateBetween { min, max } => match (min, max) {
                (DateBound::Fixed(lo), DateBound::Fixed(hi)) if lo > hi => {
                    Err(format!("minimum date {} is after maximum {}", lo, hi))
                }
                (
                    DateBound::Today { offset_days: lo },
                    DateBound::Today { offset_days: hi },
                ) if lo > hi => Err(format!("minimum date {} is after maximum {}", min, max)),
                _ => Ok(()),
            },
        }
    }
}

/// Descriptor of one recognised field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable identifier, also the column header in submissions
    pub name: String,
    /// Human label shown in templates
    pub display_name: String,
    #[serde(default)]
    pub rule: ValidationRule,
    /// Presentation format (`yyyy-mm-dd`, `0.0000`, ...), no semantic effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Darwin Core term URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwc_id: Option<String>,
    /// Input hint shown by the template generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Value may propagate from parent to child
    #[serde(default)]
    pub inherit: bool,
    /// When inherited, only fill an empty child value
    #[serde(default)]
    pub inherit_weak: bool,
    /// Column must be present in every submission
    #[serde(default)]
    pub required: bool,
    /// Vocabulary is large enough to be rendered on a separate sheet
    #[serde(default)]
    pub long_list: bool,
}

impl FieldSpec {
    /// Create an optional, non-inheritable field
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            rule,
            format_hint: None,
            units: None,
            dwc_id: None,
            description: None,
            width: None,
            inherit: false,
            inherit_weak: false,
            required: false,
            long_list: false,
        }
    }

    /// Mark the field as inheritable with overwrite semantics
    pub fn inheritable(mut self) -> Self {
        self.inherit = true;
        self
    }

    /// Mark the field as weakly inheritable (fill empty children only)
    pub fn weak(mut self) -> Self {
        self.inherit = true;
        self.inherit_weak = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn long_list(mut self) -> Self {
        self.long_list = true;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format_hint = Some(format.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_dwc_id(mut self, dwc_id: impl Into<String>) -> Self {
        self.dwc_id = Some(dwc_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Whether values of this field are event identifiers
    ///
    /// Matches names that, lowercased with spaces and underscores removed,
    /// contain `eventid` or `uuid`.
    pub fn is_identifier(&self) -> bool {
        is_identifier_name(&self.name)
    }

    /// Validates the field definition
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("field name must not be empty".to_string());
        }
        if self.name.trim() != self.name {
            return Err("field name must not carry surrounding whitespace".to_string());
        }
        if self.inherit_weak && !self.inherit {
            return Err("inherit_weak requires inherit".to_string());
        }
        self.rule.check_structure()
    }
}

/// Whether a column name denotes event identifiers (see `FieldSpec::is_identifier`)
pub fn is_identifier_name(name: &str) -> bool {
    let folded: String = name
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    folded.contains("eventid") || folded.contains("uuid")
}
