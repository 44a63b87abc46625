//! Sheet checker
//!
//! Applies the field rules across a whole submission and collects every
//! problem into one report. Only a missing required column stops the check
//! early; everything else accumulates.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::schema::{FieldRegistry, FieldSpec, EVENT_ID, GEAR_TYPE, PARENT_EVENT_ID, SAMPLE_LOCATION, SAMPLE_TYPE};
use crate::validator::{today, CompiledSchema, ValidatorResult};

use super::ranges::compact_rows;
use super::report::{CheckReport, Finding, FindingKind};
use super::submission::{PreparedRow, PreparedSheet, Submission};

/// Required fields a root row may leave empty when it names a gear type.
///
/// Gear records describe the instrument deployment, not a stored sample, so
/// they have no sample type or on-shore location.
pub const GEAR_EXEMPT_FIELDS: [&str; 2] = [SAMPLE_TYPE, SAMPLE_LOCATION];

fn label(spec: &FieldSpec) -> String {
    format!("'{}' ({})", spec.name, spec.display_name)
}

/// Checks submissions against a field registry
pub struct SheetChecker<'a> {
    registry: &'a FieldRegistry,
    today: NaiveDate,
}

impl<'a> SheetChecker<'a> {
    /// Checker evaluating relative dates against the local date
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self::with_today(registry, today())
    }

    /// Checker evaluating relative dates against a fixed day
    pub fn with_today(registry: &'a FieldRegistry, today: NaiveDate) -> Self {
        Self { registry, today }
    }

    /// Pre-process and check a submission.
    ///
    /// # Errors
    ///
    /// Only a field whose rule cannot be compiled is an error; problems in
    /// the data are findings in the report.
    pub fn check(&self, submission: &Submission) -> ValidatorResult<CheckReport> {
        self.check_prepared(&submission.prepare())
    }

    /// Check an already pre-processed sheet
    pub fn check_prepared(&self, sheet: &PreparedSheet) -> ValidatorResult<CheckReport> {
        let schema = CompiledSchema::compile(self.registry, self.today)?;
        let mut report = CheckReport::new(sheet.source.clone());

        if self.check_required_columns(sheet, &mut report) {
            return Ok(report);
        }

        self.check_self_parent(sheet, &mut report);
        self.check_contents(sheet, &schema, &mut report);
        self.check_missing_values(sheet, &mut report);
        self.check_duplicate_ids(sheet, &mut report);
        self.check_metadata(sheet, &schema, &mut report);

        Ok(report)
    }

    /// Returns true when at least one required column is absent
    fn check_required_columns(&self, sheet: &PreparedSheet, report: &mut CheckReport) -> bool {
        let mut missing = false;
        for spec in self.registry.required() {
            if !sheet.has_column(&spec.name) {
                missing = true;
                report.push(
                    Finding::new(
                        FindingKind::MissingColumn,
                        format!("Missing required column {}", label(spec)),
                    )
                    .with_field(&spec.name),
                );
            }
        }
        missing
    }

    fn check_self_parent(&self, sheet: &PreparedSheet, report: &mut CheckReport) {
        let (Some(id_col), Some(parent_col)) = (sheet.column(EVENT_ID), sheet.column(PARENT_EVENT_ID)) else {
            return;
        };

        let rows: Vec<usize> = sheet
            .rows
            .iter()
            .filter(|row| {
                let id = row.cell(id_col);
                !id.is_blank() && id.as_text() == row.cell(parent_col).as_text()
            })
            .map(|row| row.number)
            .collect();

        if !rows.is_empty() {
            report.push(
                Finding::new(
                    FindingKind::SelfParent,
                    format!("{} equals {} on rows {}", EVENT_ID, PARENT_EVENT_ID, compact_rows(&rows)),
                )
                .with_field(EVENT_ID)
                .with_rows(rows),
            );
        }
    }

    fn check_contents(&self, sheet: &PreparedSheet, schema: &CompiledSchema<'_>, report: &mut CheckReport) {
        for (col, name) in sheet.columns.iter().enumerate() {
            let (Some(spec), Some(evaluator)) = (self.registry.get(name), schema.evaluator(name)) else {
                report.push(
                    Finding::new(
                        FindingKind::UnknownColumn,
                        format!("Unknown column '{}' is not a recognised field", name),
                    )
                    .with_field(name),
                );
                continue;
            };

            let rows: Vec<usize> = sheet
                .rows
                .iter()
                .filter(|row| !evaluator.evaluate(row.cell(col)))
                .map(|row| row.number)
                .collect();

            if !rows.is_empty() {
                report.push(
                    Finding::new(
                        FindingKind::Content,
                        format!(
                            "Content error in column {} on rows {}: expected {}",
                            label(spec),
                            compact_rows(&rows),
                            spec.rule.describe()
                        ),
                    )
                    .with_field(name)
                    .with_rows(rows),
                );
            }
        }
    }

    fn check_missing_values(&self, sheet: &PreparedSheet, report: &mut CheckReport) {
        for spec in self.registry.required() {
            let Some(col) = sheet.column(&spec.name) else {
                continue;
            };

            let rows: Vec<usize> = sheet
                .rows
                .iter()
                .filter(|row| row.cell(col).is_blank() && self.value_missing(sheet, row, spec))
                .map(|row| row.number)
                .collect();

            if !rows.is_empty() {
                report.push(
                    Finding::new(
                        FindingKind::MissingValue,
                        format!(
                            "Missing value in required column {} on rows {}",
                            label(spec),
                            compact_rows(&rows)
                        ),
                    )
                    .with_field(&spec.name)
                    .with_rows(rows),
                );
            }
        }
    }

    /// Whether a blank required cell counts as missing
    fn value_missing(&self, sheet: &PreparedSheet, row: &PreparedRow, spec: &FieldSpec) -> bool {
        if spec.name == EVENT_ID {
            return true;
        }
        // An empty parent marks a root
        if spec.name == PARENT_EVENT_ID {
            return false;
        }
        // Values of child rows are filled by inheritance
        if !sheet.value(row, PARENT_EVENT_ID).is_blank() {
            return false;
        }
        if GEAR_EXEMPT_FIELDS.contains(&spec.name.as_str()) && !sheet.value(row, GEAR_TYPE).is_blank() {
            return false;
        }
        true
    }

    fn check_duplicate_ids(&self, sheet: &PreparedSheet, report: &mut CheckReport) {
        let Some(id_col) = sheet.column(EVENT_ID) else {
            return;
        };

        let mut order: Vec<String> = Vec::new();
        let mut rows_by_id: HashMap<String, Vec<usize>> = HashMap::new();
        for row in &sheet.rows {
            let id = row.cell(id_col);
            if id.is_blank() {
                continue;
            }
            let id = id.as_text();
            let rows = rows_by_id.entry(id.clone()).or_default();
            if rows.is_empty() {
                order.push(id);
            }
            rows.push(row.number);
        }

        for id in order {
            let rows = &rows_by_id[&id];
            if rows.len() > 1 {
                report.push(
                    Finding::new(
                        FindingKind::DuplicateId,
                        format!("Duplicate {} '{}' on rows {}", EVENT_ID, id, compact_rows(rows)),
                    )
                    .with_field(EVENT_ID)
                    .with_rows(rows.clone()),
                );
            }
        }
    }

    fn check_metadata(&self, sheet: &PreparedSheet, schema: &CompiledSchema<'_>, report: &mut CheckReport) {
        for entry in &sheet.metadata {
            let key = entry.key.trim();
            let Some(spec) = self.registry.get(key) else {
                report.push(
                    Finding::new(
                        FindingKind::UnknownMetadataKey,
                        format!("Unknown metadata key '{}' on row {}", key, entry.row),
                    )
                    .with_field(key)
                    .with_rows(vec![entry.row]),
                );
                continue;
            };

            if entry.value.is_blank() {
                report.push(
                    Finding::new(
                        FindingKind::MissingValue,
                        format!("Missing value for metadata field {} on row {}", label(spec), entry.row),
                    )
                    .with_field(key)
                    .with_rows(vec![entry.row]),
                );
                continue;
            }

            if schema.evaluate(key, &entry.value) == Some(false) {
                report.push(
                    Finding::new(
                        FindingKind::Content,
                        format!(
                            "Content error in metadata field {} on row {}: expected {}",
                            label(spec),
                            entry.row,
                            spec.rule.describe()
                        ),
                    )
                    .with_field(key)
                    .with_rows(vec![entry.row]),
                );
            }
        }
    }
}
