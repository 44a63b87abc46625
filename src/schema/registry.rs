//! Field registry
//!
//! The registry is built once (from the built-in catalogue or a JSON schema
//! file) and is read-only afterwards. It is passed explicitly to every
//! component that needs it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalogue::{self, EVENT_ID};
use super::errors::{SchemaError, SchemaResult};
use super::types::FieldSpec;

/// On-disk shape of a schema file
#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    fields: Vec<FieldSpec>,
}

/// Ordered, indexed set of field definitions
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    specs: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Builds a registry, rejecting duplicate names and malformed fields.
    ///
    /// The event identifier field must be present and required.
    pub fn new(specs: Vec<FieldSpec>) -> SchemaResult<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            spec.validate_structure()
                .map_err(|reason| SchemaError::invalid_field(&spec.name, reason))?;
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(SchemaError::duplicate_field(&spec.name));
            }
        }

        match index.get(EVENT_ID).map(|&i| &specs[i]) {
            None => {
                return Err(SchemaError::invalid_field(
                    EVENT_ID,
                    "the event identifier field must be defined",
                ))
            }
            Some(spec) if !spec.required => {
                return Err(SchemaError::invalid_field(
                    EVENT_ID,
                    "the event identifier field must be required",
                ))
            }
            Some(_) => {}
        }

        Ok(Self { specs, index })
    }

    /// Registry over the built-in marine catalogue
    pub fn builtin() -> SchemaResult<Self> {
        Self::new(catalogue::builtin_fields())
    }

    /// Loads a registry from a `{"fields": [...]}` JSON file
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses a registry from schema-file JSON
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        Self::parse(content, "<in-memory>")
    }

    fn parse(content: &str, origin: &str) -> SchemaResult<Self> {
        let file: SchemaFile = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed_file(origin, format!("Invalid JSON: {}", e)))?;
        Self::new(file.fields)
    }

    /// Serializes the registry to schema-file JSON
    pub fn to_json(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(&SchemaFileRef { fields: &self.specs }).map_err(|e| {
            SchemaError::malformed_file("<in-memory>", format!("Failed to serialize schema: {}", e))
        })
    }

    /// Writes the registry to disk in the same shape `load` reads
    pub fn save(&self, path: &Path) -> SchemaResult<()> {
        let content = self.to_json()?;
        fs::write(path, content).map_err(|e| {
            SchemaError::malformed_file(path.display().to_string(), format!("Failed to write file: {}", e))
        })
    }

    /// All field specs in catalogue order
    pub fn all_specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Looks up a field, failing with `UnknownField`
    pub fn by_name(&self, name: &str) -> SchemaResult<&FieldSpec> {
        self.get(name).ok_or_else(|| SchemaError::unknown_field(name))
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields every submission must carry as columns
    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter().filter(|s| s.required)
    }

    /// Fields that propagate from parent to child
    pub fn inheritable(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter().filter(|s| s.inherit)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Column list for a template: required fields first, then the requested ones.
    ///
    /// Unknown names are rejected; duplicates are emitted once.
    pub fn template(&self, names: &[&str]) -> SchemaResult<Vec<&FieldSpec>> {
        let mut columns: Vec<&FieldSpec> = self.required().collect();
        for name in names {
            let spec = self.by_name(name)?;
            if !columns.iter().any(|c| c.name == spec.name) {
                columns.push(spec);
            }
        }
        Ok(columns)
    }
}

#[derive(Serialize)]
struct SchemaFileRef<'a> {
    fields: &'a [FieldSpec],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaErrorCode, ValidationRule};
    use tempfile::TempDir;

    fn minimal() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(EVENT_ID, "Sample ID", ValidationRule::FreeText).required(),
            FieldSpec::new("stationName", "Station", ValidationRule::FreeText).inheritable(),
        ]
    }

    #[test]
    fn test_builtin_loads() {
        let registry = FieldRegistry::builtin().unwrap();
        assert!(registry.contains("eventDate"));
        assert!(registry.by_name(EVENT_ID).unwrap().required);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut specs = minimal();
        specs.push(FieldSpec::new("stationName", "Again", ValidationRule::FreeText));
        let err = FieldRegistry::new(specs).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateField);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_event_id_must_be_required() {
        let specs = vec![FieldSpec::new(EVENT_ID, "Sample ID", ValidationRule::FreeText)];
        let err = FieldRegistry::new(specs).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidField);

        let specs = vec![FieldSpec::new("x", "X", ValidationRule::FreeText)];
        assert!(FieldRegistry::new(specs).is_err());
    }

    #[test]
    fn test_unknown_lookup() {
        let registry = FieldRegistry::new(minimal()).unwrap();
        let err = registry.by_name("nope").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownField);
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fields.json");

        let registry = FieldRegistry::builtin().unwrap();
        registry.save(&path).unwrap();

        let loaded = FieldRegistry::load(&path).unwrap();
        assert_eq!(loaded.all_specs(), registry.all_specs());
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fields.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FieldRegistry::load(&path).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedFile);
        assert!(err.message().contains("fields.json"));
    }

    #[test]
    fn test_unknown_rule_kind_is_configuration_error() {
        let json = r#"{"fields":[
            {"name":"eventID","display_name":"ID","required":true},
            {"name":"x","display_name":"X","rule":{"kind":"regex"}}
        ]}"#;
        let err = FieldRegistry::from_json(json).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_out_of_range_date_offset_fails_at_load() {
        let json = r#"{"fields":[
            {"name":"eventID","display_name":"ID","required":true},
            {"name":"eventDate","display_name":"Date",
             "rule":{"kind":"date_between","min":"2000-01-01","max":"=TODAY()+999999999999"}}
        ]}"#;
        let err = FieldRegistry::from_json(json).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_template_orders_required_first() {
        let registry = FieldRegistry::builtin().unwrap();
        let columns = registry.template(&["bottleNumber", EVENT_ID]).unwrap();
        let required = registry.required().count();

        assert_eq!(columns.len(), required + 1);
        assert_eq!(columns[0].name, EVENT_ID);
        assert_eq!(columns.last().unwrap().name, "bottleNumber");
        assert!(registry.template(&["notAField"]).is_err());
    }
}
