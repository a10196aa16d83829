//! Schema-driven decoding of untyped TOML values into typed records.
//!
//! Each record type declares a static table of field descriptors. [`check`]
//! walks a parsed [`toml::Value`] against that table, validating required
//! fields and runtime shapes before the record constructor runs. Container
//! fields are checked by their outer kind only; their elements are decoded
//! by the constructors that need them. The pass never mutates its input.

use std::collections::BTreeMap;

use toml::value::Table;
use toml::Value;

use keel_core::KeelError;

use crate::ConfigResult;

/// Statically declared schema for one record type
#[derive(Debug)]
pub struct RecordSchema {
    /// Record name used in error messages
    pub name: &'static str,
    /// Field descriptors, in declared order
    pub fields: &'static [FieldSpec],
}

/// Declared shape of a single record field
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Required fields have no default; their absence is an error
    pub required: bool,
}

/// Declared runtime shape for a field value
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    /// A table; element values are not checked here
    Table,
    /// An array; element values are not checked here
    Array,
    /// A nested record, validated against its own schema
    Record(&'static RecordSchema),
}

/// A record type decodable from a parsed TOML value
pub trait Decode: Sized {
    /// The declared field schema for this record
    fn schema() -> &'static RecordSchema;

    /// Construct the record from a table already validated by [`check`].
    ///
    /// Constructor-time invariants (for example the dependency
    /// source/selector exclusivity) run here and propagate unchanged.
    fn build(table: &Table) -> ConfigResult<Self>;

    /// Validate `value` against the schema and construct the record
    fn decode(value: &Value) -> ConfigResult<Self> {
        let table = check(Self::schema(), value)?;
        Self::build(table)
    }
}

/// Validate `value` against `schema` and hand back the underlying table.
pub fn check<'a>(schema: &'static RecordSchema, value: &'a Value) -> ConfigResult<&'a Table> {
    let table = value.as_table().ok_or_else(|| KeelError::NotATable {
        record: schema.name,
        found: value.type_str(),
    })?;

    for field in schema.fields {
        match table.get(field.name) {
            Some(value) => check_field(schema, field, value)?,
            None if field.required => {
                return Err(KeelError::MissingField {
                    record: schema.name,
                    field: field.name,
                });
            }
            None => {}
        }
    }

    Ok(table)
}

fn check_field(schema: &'static RecordSchema, field: &FieldSpec, value: &Value) -> ConfigResult<()> {
    let matches = match field.kind {
        FieldKind::Str => value.is_str(),
        FieldKind::Int => value.is_integer(),
        FieldKind::Bool => value.is_bool(),
        FieldKind::Table => value.is_table(),
        FieldKind::Array => value.is_array(),
        FieldKind::Record(nested) => {
            if !value.is_table() {
                return Err(KeelError::FieldType {
                    record: schema.name,
                    field: field.name.to_string(),
                    expected: "a table",
                    found: render(value),
                });
            }
            check(nested, value)?;
            true
        }
    };

    if !matches {
        return Err(KeelError::FieldType {
            record: schema.name,
            field: field.name.to_string(),
            expected: expected_kind(field.kind),
            found: render(value),
        });
    }

    Ok(())
}

fn expected_kind(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Str => "a string",
        FieldKind::Int => "an integer",
        FieldKind::Bool => "a boolean",
        FieldKind::Table | FieldKind::Record(_) => "a table",
        FieldKind::Array => "an array",
    }
}

/// Render a value for error messages; containers render as their kind
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Integer(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Table(_) => "a table".to_string(),
    }
}

/// Typed accessors over a validated record table
pub struct Fields<'a> {
    record: &'static str,
    table: &'a Table,
}

impl<'a> Fields<'a> {
    pub fn new(record: &'static str, table: &'a Table) -> Self {
        Self { record, table }
    }

    fn type_error(&self, field: &str, expected: &'static str, value: &Value) -> KeelError {
        KeelError::FieldType {
            record: self.record,
            field: field.to_string(),
            expected,
            found: render(value),
        }
    }

    fn missing(&self, field: &'static str) -> KeelError {
        KeelError::MissingField {
            record: self.record,
            field,
        }
    }

    pub fn str(&self, name: &'static str) -> ConfigResult<&'a str> {
        match self.table.get(name) {
            Some(value) => value
                .as_str()
                .ok_or_else(|| self.type_error(name, "a string", value)),
            None => Err(self.missing(name)),
        }
    }

    pub fn opt_str(&self, name: &'static str) -> ConfigResult<Option<&'a str>> {
        match self.table.get(name) {
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "a string", value)),
            None => Ok(None),
        }
    }

    pub fn opt_bool(&self, name: &'static str) -> ConfigResult<Option<bool>> {
        match self.table.get(name) {
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "a boolean", value)),
            None => Ok(None),
        }
    }

    pub fn opt_int(&self, name: &'static str) -> ConfigResult<Option<i64>> {
        match self.table.get(name) {
            Some(value) => value
                .as_integer()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "an integer", value)),
            None => Ok(None),
        }
    }

    pub fn table(&self, name: &'static str) -> ConfigResult<&'a Table> {
        match self.table.get(name) {
            Some(value) => value
                .as_table()
                .ok_or_else(|| self.type_error(name, "a table", value)),
            None => Err(self.missing(name)),
        }
    }

    pub fn opt_table(&self, name: &'static str) -> ConfigResult<Option<&'a Table>> {
        match self.table.get(name) {
            Some(value) => value
                .as_table()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "a table", value)),
            None => Ok(None),
        }
    }

    pub fn array(&self, name: &'static str) -> ConfigResult<&'a [Value]> {
        match self.table.get(name) {
            Some(value) => value
                .as_array()
                .map(Vec::as_slice)
                .ok_or_else(|| self.type_error(name, "an array", value)),
            None => Err(self.missing(name)),
        }
    }

    pub fn opt_array(&self, name: &'static str) -> ConfigResult<Option<&'a [Value]>> {
        match self.table.get(name) {
            Some(value) => value
                .as_array()
                .map(|array| Some(array.as_slice()))
                .ok_or_else(|| self.type_error(name, "an array", value)),
            None => Ok(None),
        }
    }

    /// Decode an optional table of string values
    pub fn string_map(&self, name: &'static str) -> ConfigResult<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        if let Some(table) = self.opt_table(name)? {
            for (key, value) in table {
                let value = value.as_str().ok_or_else(|| {
                    self.type_error(&format!("{name}.{key}"), "a string", value)
                })?;
                out.insert(key.clone(), value.to_string());
            }
        }
        Ok(out)
    }

    /// Decode an optional table of string arrays
    pub fn string_list_map(
        &self,
        name: &'static str,
    ) -> ConfigResult<BTreeMap<String, Vec<String>>> {
        let mut out = BTreeMap::new();
        if let Some(table) = self.opt_table(name)? {
            for (key, value) in table {
                let field = format!("{name}.{key}");
                let items = value
                    .as_array()
                    .ok_or_else(|| self.type_error(&field, "an array", value))?;
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    let item = item
                        .as_str()
                        .ok_or_else(|| self.type_error(&field, "an array of strings", item))?;
                    list.push(item.to_string());
                }
                out.insert(key.clone(), list);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INNER_SCHEMA: RecordSchema = RecordSchema {
        name: "inner",
        fields: &[FieldSpec {
            name: "label",
            kind: FieldKind::Str,
            required: true,
        }],
    };

    static OUTER_SCHEMA: RecordSchema = RecordSchema {
        name: "outer",
        fields: &[
            FieldSpec {
                name: "count",
                kind: FieldKind::Int,
                required: true,
            },
            FieldSpec {
                name: "enabled",
                kind: FieldKind::Bool,
                required: false,
            },
            FieldSpec {
                name: "inner",
                kind: FieldKind::Record(&INNER_SCHEMA),
                required: false,
            },
            FieldSpec {
                name: "tags",
                kind: FieldKind::Array,
                required: false,
            },
        ],
    };

    fn value(s: &str) -> Value {
        s.parse().unwrap()
    }

    #[test]
    fn test_check_accepts_valid_table() {
        let v = value("count = 3\nenabled = true\ntags = [1, 'two']");
        let table = check(&OUTER_SCHEMA, &v).unwrap();
        assert!(table.contains_key("count"));
    }

    #[test]
    fn test_check_rejects_non_table() {
        let v = Value::String("not a table".to_string());
        let err = check(&OUTER_SCHEMA, &v).unwrap_err();
        assert!(matches!(
            err,
            KeelError::NotATable { record: "outer", found: "string" }
        ));
    }

    #[test]
    fn test_check_names_missing_field() {
        let v = value("enabled = false");
        let err = check(&OUTER_SCHEMA, &v).unwrap_err();
        assert!(matches!(
            err,
            KeelError::MissingField { record: "outer", field: "count" }
        ));
    }

    #[test]
    fn test_check_names_mismatched_field() {
        let v = value("count = 'three'");
        match check(&OUTER_SCHEMA, &v).unwrap_err() {
            KeelError::FieldType { record, field, expected, found } => {
                assert_eq!(record, "outer");
                assert_eq!(field, "count");
                assert_eq!(expected, "an integer");
                assert_eq!(found, "'three'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_recurses_into_records() {
        let v = value("count = 1\n[inner]\nlabel = 7");
        match check(&OUTER_SCHEMA, &v).unwrap_err() {
            KeelError::FieldType { record, field, .. } => {
                assert_eq!(record, "inner");
                assert_eq!(field, "label");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_record_field_must_be_table() {
        let v = value("count = 1\ninner = 'nope'");
        match check(&OUTER_SCHEMA, &v).unwrap_err() {
            KeelError::FieldType { record, field, expected, .. } => {
                assert_eq!(record, "outer");
                assert_eq!(field, "inner");
                assert_eq!(expected, "a table");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_container_elements_not_checked() {
        // Outer kind only: a mixed array still passes the schema walk
        let v = value("count = 1\ntags = [1, 'two', true]");
        assert!(check(&OUTER_SCHEMA, &v).is_ok());
    }

    #[test]
    fn test_string_map_accessor() {
        let v = value("[defines]\nWIDTH = '8'\nDEPTH = '32'");
        let fields = Fields::new("outer", v.as_table().unwrap());
        let map = fields.string_map("defines").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["WIDTH"], "8");

        let v = value("[defines]\nWIDTH = 8");
        let fields = Fields::new("outer", v.as_table().unwrap());
        match fields.string_map("defines").unwrap_err() {
            KeelError::FieldType { field, .. } => assert_eq!(field, "defines.WIDTH"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_string_list_map_accessor() {
        let v = value("[features]\ndefault = ['a', 'b']\nextra = []");
        let fields = Fields::new("outer", v.as_table().unwrap());
        let map = fields.string_list_map("features").unwrap();
        assert_eq!(map["default"], vec!["a".to_string(), "b".to_string()]);
        assert!(map["extra"].is_empty());

        let v = value("[features]\ndefault = ['a', 3]");
        let fields = Fields::new("outer", v.as_table().unwrap());
        assert!(fields.string_list_map("features").is_err());
    }
}
