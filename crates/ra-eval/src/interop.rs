//! Conversion between [`Table`] and Arrow record batches

use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use ra_core::{Column, Table, Value};
use std::sync::Arc;

use crate::error::{EvalError, EvalResult};

/// Read a record batch into a table
///
/// Signed and unsigned integers widen to `Int`, floats to `Float`, and UTF-8
/// variants to `Str`. Other Arrow types are rejected.
pub fn table_from_record_batch(batch: &RecordBatch) -> EvalResult<Table> {
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        columns.push(Column {
            name: field.name().clone(),
            values: array_values(field.name(), array)?,
        });
    }
    Ok(Table::new(columns)?)
}

fn array_values(name: &str, array: &ArrayRef) -> EvalResult<Vec<Value>> {
    let n = array.len();
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; n],
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => cast(array, &DataType::Int64)?
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Int))
            .collect(),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            cast(array, &DataType::Float64)?
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map_or(Value::Null, Value::Float))
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => cast(array, &DataType::Utf8)?
            .as_string::<i32>()
            .iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Str(s.to_string())))
            .collect(),
        other => {
            return Err(EvalError::NotImplemented(format!(
                "Arrow type {other} in column '{name}'"
            )))
        }
    };
    Ok(values)
}

/// Arrow type that holds every value of a column
fn column_type(column: &Column) -> EvalResult<DataType> {
    let mut found = DataType::Null;
    for v in &column.values {
        let t = match v {
            Value::Null => continue,
            Value::Bool(_) => DataType::Boolean,
            Value::Int(_) => DataType::Int64,
            Value::Float(_) => DataType::Float64,
            Value::Str(_) => DataType::Utf8,
        };
        found = match (&found, &t) {
            (DataType::Null, _) => t.clone(),
            (a, b) if a == b => t.clone(),
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            (a, b) => {
                return Err(EvalError::TypeMismatch {
                    op: format!("Arrow column '{}'", column.name),
                    left: type_label(a),
                    right: type_label(b),
                })
            }
        };
    }
    Ok(found)
}

fn type_label(t: &DataType) -> &'static str {
    match t {
        DataType::Boolean => "bool",
        DataType::Int64 => "int",
        DataType::Float64 => "float",
        DataType::Utf8 => "str",
        _ => "null",
    }
}

/// Write a table as a record batch with nullable columns
pub fn table_to_record_batch(table: &Table) -> EvalResult<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());
    for column in table.columns() {
        let data_type = column_type(column)?;
        let values = &column.values;
        let array: ArrayRef = match data_type {
            DataType::Boolean => Arc::new(
                values
                    .iter()
                    .map(Value::as_bool)
                    .collect::<BooleanArray>(),
            ),
            DataType::Int64 => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect::<Int64Array>(),
            ),
            DataType::Float64 => Arc::new(
                values
                    .iter()
                    .map(Value::as_f64)
                    .collect::<Float64Array>(),
            ),
            DataType::Utf8 => Arc::new(values.iter().map(Value::as_str).collect::<StringArray>()),
            _ => new_null_array(&DataType::Null, values.len()),
        };
        fields.push(Field::new(&column.name, array.data_type().clone(), true));
        arrays.push(array);
    }
    log::trace!(
        "converted {} rows x {} columns to a record batch",
        table.num_rows(),
        table.num_columns()
    );
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[cfg(test)]
#[path = "interop_test.rs"]
mod tests;
