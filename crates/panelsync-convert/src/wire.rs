//! Wire read/write helpers
//!
//! [`Fields`] reads typed fields out of a JSON object and reports every
//! failure with the entry-local path of the field. [`ObjectBuilder`] writes
//! the inverse, skipping unset optional fields.
//!
//! A JSON `null` is treated as an absent key on read.

use panelsync_classify::shapes::{GROUPING, OPERATION};
use panelsync_model::charts::{EsqlColumn, EsqlDataset, Query, DEFAULT_QUERY_LANGUAGE};
use panelsync_model::OpaqueRole;
use panelsync_value::OpaqueValue;
use serde_json::{Map, Value};

use crate::error::ConvertError;

/// JSON type name used in error messages
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Path of `key` below `parent`
#[must_use]
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ConvertError {
    ConvertError::conversion(
        path,
        format!("expected {expected}, found {}", type_name(found)),
    )
}

/// Typed reader over one JSON object
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    value: &'a Value,
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Fields<'a> {
    /// Read `value` as an object located at `path`
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if `value` is not an object
    pub fn new(value: &'a Value, path: &'a str) -> Result<Self, ConvertError> {
        match value.as_object() {
            Some(map) => Ok(Self { value, map, path }),
            None => Err(mismatch(display_path(path), "object", value)),
        }
    }

    /// The underlying JSON value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Path of this object
    #[inline]
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Path of a key of this object
    #[inline]
    #[must_use]
    pub fn key_path(&self, key: &str) -> String {
        join_path(self.path, key)
    }

    /// Raw value of a key, `None` if absent or null
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn missing(&self, key: &str) -> ConvertError {
        ConvertError::conversion(self.key_path(key), "required field is missing")
    }

    /// Optional string
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] on a type mismatch
    pub fn opt_str(&self, key: &str) -> Result<Option<String>, ConvertError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(mismatch(&self.key_path(key), "string", other)),
        }
    }

    /// Required string
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if missing or not a string
    pub fn req_str(&self, key: &str) -> Result<String, ConvertError> {
        self.opt_str(key)?.ok_or_else(|| self.missing(key))
    }

    /// Optional number
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] on a type mismatch
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>, ConvertError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| mismatch(&self.key_path(key), "number", v)),
        }
    }

    /// Optional integer
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] on a type mismatch
    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ConvertError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| mismatch(&self.key_path(key), "integer", v)),
        }
    }

    /// Required integer
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if missing or not an integer
    pub fn req_i64(&self, key: &str) -> Result<i64, ConvertError> {
        self.opt_i64(key)?.ok_or_else(|| self.missing(key))
    }

    /// Optional boolean
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] on a type mismatch
    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>, ConvertError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(&self.key_path(key), "boolean", other)),
        }
    }

    /// Optional opaque sub-object, wrapped with the role's defaults
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if present but not an object
    pub fn opt_opaque(
        &self,
        key: &str,
        role: OpaqueRole,
    ) -> Result<Option<OpaqueValue>, ConvertError> {
        match self.get(key) {
            None => Ok(None),
            Some(v @ Value::Object(_)) => Ok(Some(role.attach(v.clone()))),
            Some(other) => Err(mismatch(&self.key_path(key), "object", other)),
        }
    }

    /// Required opaque sub-object
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if missing or not an object
    pub fn req_opaque(&self, key: &str, role: OpaqueRole) -> Result<OpaqueValue, ConvertError> {
        self.opt_opaque(key, role)?.ok_or_else(|| self.missing(key))
    }

    /// Elements of an optional array, each with its path
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if present but not an array
    pub fn list(&self, key: &str) -> Result<Vec<(String, &'a Value)>, ConvertError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => {
                let base = self.key_path(key);
                Ok(items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (format!("{base}[{i}]"), item))
                    .collect())
            }
            Some(other) => Err(mismatch(&self.key_path(key), "array", other)),
        }
    }

    /// Array of opaque objects
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if an element is not an object
    pub fn opaque_list(
        &self,
        key: &str,
        role: OpaqueRole,
    ) -> Result<Vec<OpaqueValue>, ConvertError> {
        self.list(key)?
            .into_iter()
            .map(|(path, item)| match item {
                Value::Object(_) => Ok(role.attach(item.clone())),
                other => Err(mismatch(&path, "object", other)),
            })
            .collect()
    }

    /// Required nested object
    ///
    /// The returned reader borrows `path` from the caller.
    ///
    /// # Errors
    /// Returns [`ConvertError::Conversion`] if missing or not an object
    pub fn req_object<'p>(&self, key: &str, path: &'p str) -> Result<Fields<'p>, ConvertError>
    where
        'a: 'p,
    {
        let value = self.get(key).ok_or_else(|| self.missing(key))?;
        Fields::new(value, path)
    }

    /// Required metric column
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_metric`] errors
    pub fn metric<T: ColumnDef>(&self, key: &str) -> Result<T, ConvertError> {
        let value = self.get(key).ok_or_else(|| self.missing(key))?;
        T::read_metric(value, &self.key_path(key))
    }

    /// Optional metric column
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_metric`] errors
    pub fn opt_metric<T: ColumnDef>(&self, key: &str) -> Result<Option<T>, ConvertError> {
        self.get(key)
            .map(|value| T::read_metric(value, &self.key_path(key)))
            .transpose()
    }

    /// Array of metric columns
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_metric`] errors
    pub fn metrics<T: ColumnDef>(&self, key: &str) -> Result<Vec<T>, ConvertError> {
        self.list(key)?
            .into_iter()
            .map(|(path, item)| T::read_metric(item, &path))
            .collect()
    }

    /// Required grouping column
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_grouping`] errors
    pub fn grouping<T: ColumnDef>(&self, key: &str) -> Result<T, ConvertError> {
        let value = self.get(key).ok_or_else(|| self.missing(key))?;
        T::read_grouping(value, &self.key_path(key))
    }

    /// Optional grouping column
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_grouping`] errors
    pub fn opt_grouping<T: ColumnDef>(&self, key: &str) -> Result<Option<T>, ConvertError> {
        self.get(key)
            .map(|value| T::read_grouping(value, &self.key_path(key)))
            .transpose()
    }

    /// Array of grouping columns
    ///
    /// # Errors
    /// Propagates [`ColumnDef::read_grouping`] errors
    pub fn groupings<T: ColumnDef>(&self, key: &str) -> Result<Vec<T>, ConvertError> {
        self.list(key)?
            .into_iter()
            .map(|(path, item)| T::read_grouping(item, &path))
            .collect()
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "config"
    } else {
        path
    }
}

/// Writer for one JSON object
#[derive(Debug, Clone, Default)]
pub struct ObjectBuilder {
    map: Map<String, Value>,
}

impl ObjectBuilder {
    /// Create empty object
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field
    #[inline]
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    /// Set a field if present
    #[inline]
    #[must_use]
    pub fn set_opt<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Set an opaque field if present, with defaults applied
    #[inline]
    #[must_use]
    pub fn set_opaque(self, key: &str, value: Option<&OpaqueValue>) -> Self {
        self.set_opt(key, value.map(OpaqueValue::to_wire))
    }

    /// Set an array field, even when empty
    #[inline]
    #[must_use]
    pub fn set_list(self, key: &str, items: Vec<Value>) -> Self {
        self.set(key, Value::Array(items))
    }

    /// Set an array field unless empty
    #[inline]
    #[must_use]
    pub fn set_nonempty(self, key: &str, items: Vec<Value>) -> Self {
        if items.is_empty() {
            self
        } else {
            self.set_list(key, items)
        }
    }

    /// Set a column field if present
    #[inline]
    #[must_use]
    pub fn set_column<T: ColumnDef>(self, key: &str, column: Option<&T>) -> Self {
        self.set_opt(key, column.map(ColumnDef::write))
    }

    /// Set an array of columns, even when empty
    #[inline]
    #[must_use]
    pub fn set_columns<T: ColumnDef>(self, key: &str, columns: &[T]) -> Self {
        self.set_list(key, columns.iter().map(ColumnDef::write).collect())
    }

    /// Merge every field of another builder
    #[inline]
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.map.extend(other.map);
        self
    }

    /// Finish as a JSON object
    #[inline]
    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}

/// An element of a chart body: an operation definition or an ES|QL column
pub trait ColumnDef: Sized {
    /// Read a metric position
    ///
    /// # Errors
    /// Returns [`ConvertError`] if the element cannot be read
    fn read_metric(value: &Value, path: &str) -> Result<Self, ConvertError>;

    /// Read a grouping position
    ///
    /// # Errors
    /// Returns [`ConvertError`] if the element cannot be read
    fn read_grouping(value: &Value, path: &str) -> Result<Self, ConvertError>;

    /// Write back to wire form
    fn write(&self) -> Value;
}

impl ColumnDef for OpaqueValue {
    fn read_metric(value: &Value, path: &str) -> Result<Self, ConvertError> {
        OPERATION
            .classify(value)
            .map_err(|e| ConvertError::classification(path, e))?;
        Ok(OpaqueRole::Operation.attach(value.clone()))
    }

    fn read_grouping(value: &Value, path: &str) -> Result<Self, ConvertError> {
        GROUPING
            .classify(value)
            .map_err(|e| ConvertError::classification(path, e))?;
        Ok(OpaqueRole::Grouping.attach(value.clone()))
    }

    fn write(&self) -> Value {
        self.to_wire()
    }
}

impl ColumnDef for EsqlColumn {
    fn read_metric(value: &Value, path: &str) -> Result<Self, ConvertError> {
        let fields = Fields::new(value, path)?;
        Ok(Self {
            column: fields.req_str("column")?,
            operation: fields.opt_str("operation")?,
            label: fields.opt_str("label")?,
            format: fields.opt_opaque("format", OpaqueRole::Plain)?,
        })
    }

    fn read_grouping(value: &Value, path: &str) -> Result<Self, ConvertError> {
        Self::read_metric(value, path)
    }

    fn write(&self) -> Value {
        ObjectBuilder::new()
            .set("column", self.column.as_str())
            .set_opt("operation", self.operation.as_deref())
            .set_opt("label", self.label.as_deref())
            .set_opaque("format", self.format.as_ref())
            .build()
    }
}

/// Read a text query block
///
/// # Errors
/// Returns [`ConvertError::Conversion`] if the block is malformed
pub fn read_query(fields: &Fields<'_>) -> Result<Query, ConvertError> {
    Ok(Query {
        language: fields
            .opt_str("language")?
            .unwrap_or_else(|| DEFAULT_QUERY_LANGUAGE.to_string()),
        expression: fields.req_str("query")?,
    })
}

/// Write a text query block
#[must_use]
pub fn write_query(query: &Query) -> Value {
    ObjectBuilder::new()
        .set("language", query.language.as_str())
        .set("query", query.expression.as_str())
        .build()
}

/// Dataset type tag of computed ES|QL datasets
pub const ESQL_DATASET_TYPE: &str = "esql";

/// Read an ES|QL dataset block
///
/// # Errors
/// Returns [`ConvertError::Conversion`] if the block has no query text
pub fn read_esql_dataset(fields: &Fields<'_>) -> Result<EsqlDataset, ConvertError> {
    Ok(EsqlDataset::new(fields.req_str("query")?))
}

/// Write an ES|QL dataset block
#[must_use]
pub fn write_esql_dataset(dataset: &EsqlDataset) -> Value {
    ObjectBuilder::new()
        .set("type", ESQL_DATASET_TYPE)
        .set("query", dataset.query.as_str())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fields_reports_paths() {
        let value = json!({"title": 3, "layers": [{"y": "x"}]});
        let fields = Fields::new(&value, "attributes").unwrap();
        let err = fields.opt_str("title").unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.title: expected string, found number"
        );

        let layers = fields.list("layers").unwrap();
        assert_eq!(layers[0].0, "attributes.layers[0]");
        let layer = Fields::new(layers[0].1, &layers[0].0).unwrap();
        let err = layer.metrics::<EsqlColumn>("y").unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at attributes.layers[0].y: expected array, found string"
        );
    }

    #[test]
    fn null_is_absent() {
        let value = json!({"title": null});
        let fields = Fields::new(&value, "").unwrap();
        assert_eq!(fields.opt_str("title").unwrap(), None);
        assert!(fields.req_str("title").is_err());
    }

    #[test]
    fn root_object_mismatch_names_config() {
        let value = json!("not an object");
        let err = Fields::new(&value, "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "conversion failed at config: expected object, found string"
        );
    }

    #[test]
    fn builder_skips_unset() {
        let value = ObjectBuilder::new()
            .set("a", 1)
            .set_opt::<String>("b", None)
            .set_nonempty("c", vec![])
            .set_list("d", vec![])
            .build();
        assert_eq!(value, json!({"a": 1, "d": []}));
    }

    #[test]
    fn esql_column_round_trip() {
        let wire = json!({"column": "avg_bytes", "label": "Bytes", "format": {"type": "bytes"}});
        let column = EsqlColumn::read_metric(&wire, "metrics[0]").unwrap();
        assert_eq!(column.column, "avg_bytes");
        assert_eq!(column.write(), wire);
    }

    #[test]
    fn opaque_metric_attaches_operation_defaults() {
        let wire = json!({"operation": "count"});
        let metric = OpaqueValue::read_metric(&wire, "metrics[0]").unwrap();
        assert!(metric.has_defaults());
        assert_eq!(
            metric.write(),
            json!({"operation": "count", "format": {"type": "number"}})
        );
    }

    #[test]
    fn unclassifiable_grouping_is_classification_error() {
        let wire = json!({"operation": "mystery"});
        let err = OpaqueValue::read_grouping(&wire, "group_by[0]").unwrap_err();
        assert!(matches!(err, ConvertError::Classification { ref path, .. } if path == "group_by[0]"));
    }

    #[test]
    fn query_language_defaults_to_kuery() {
        let value = json!({"query": "status:500"});
        let query = read_query(&Fields::new(&value, "query").unwrap()).unwrap();
        assert_eq!(query, Query::kuery("status:500"));
    }
}
