//! Delimited-text loaders for distance matrices and sample groupings.
//!
//! Both readers go through Arrow's CSV reader. A distance matrix file has a
//! header row of sample ids (the first header cell is ignored) and one row per
//! sample: `id, d(id, s1), d(id, s2), ...`. A grouping file has a header row
//! whose first column holds sample ids; the grouping is taken from a named
//! column.

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use hashbrown::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use crate::distance::SymmetricDistanceMatrix;
use crate::error::{PermanovaError, Result};

/// Read a distance matrix from a delimited text file.
pub fn read_distance_matrix<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<SymmetricDistanceMatrix> {
    let path = path.as_ref();
    let inferred = infer_header(path, delimiter)?;
    if inferred.fields().len() < 2 {
        return Err(PermanovaError::format(format!(
            "{}: distance matrix needs an id column and at least one sample column",
            path.display()
        )));
    }

    let mut fields = Vec::with_capacity(inferred.fields().len());
    fields.push(Field::new("id", DataType::Utf8, false));
    for field in inferred.fields().iter().skip(1) {
        fields.push(Field::new(field.name().as_str(), DataType::Float64, true));
    }

    let batch = read_all(path, Arc::new(Schema::new(fields)), delimiter)?;
    log::debug!(
        "Read {} x {} distance table from {}",
        batch.num_rows(),
        batch.num_columns() - 1,
        path.display()
    );

    SymmetricDistanceMatrix::from_record_batch(&batch)
}

/// Read the `column` of a grouping file, keyed by sample id.
pub fn read_grouping<P: AsRef<Path>>(
    path: P,
    column: &str,
    delimiter: u8,
) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let inferred = infer_header(path, delimiter)?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| Field::new(field.name().as_str(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let column_idx = schema
        .fields()
        .iter()
        .skip(1)
        .position(|field| field.name() == column)
        .map(|idx| idx + 1)
        .ok_or_else(|| {
            PermanovaError::format(format!(
                "{}: grouping column '{}' not found",
                path.display(),
                column
            ))
        })?;

    let batch = read_all(path, schema, delimiter)?;
    let ids = string_column(&batch, 0)?;
    let labels = string_column(&batch, column_idx)?;

    let mut grouping = HashMap::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        if ids.is_null(row) || labels.is_null(row) {
            return Err(PermanovaError::format(format!(
                "{}: missing value in row {}",
                path.display(),
                row + 1
            )));
        }
        let id = ids.value(row).to_string();
        if grouping.insert(id.clone(), labels.value(row).to_string()).is_some() {
            return Err(PermanovaError::format(format!(
                "{}: duplicate sample id '{}'",
                path.display(),
                id
            )));
        }
    }

    Ok(grouping)
}

/// Order a sample→label map by the matrix's sample ids.
pub fn grouping_for(
    dm: &SymmetricDistanceMatrix,
    grouping: &HashMap<String, String>,
) -> Result<Vec<String>> {
    dm.ids()
        .iter()
        .map(|id| {
            grouping
                .get(id)
                .cloned()
                .ok_or_else(|| PermanovaError::missing_sample(id.clone()))
        })
        .collect()
}

fn infer_header(path: &Path, delimiter: u8) -> Result<Schema> {
    let file = File::open(path)?;
    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(file, Some(1))?;
    Ok(schema)
}

fn read_all(path: &Path, schema: SchemaRef, delimiter: u8) -> Result<RecordBatch> {
    let file = File::open(path)?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .build(file)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn string_column(batch: &RecordBatch, idx: usize) -> Result<&StringArray> {
    let column: &ArrayRef = batch.column(idx);
    column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PermanovaError::format(format!("column {} must be String", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_distance_matrix() {
        let file = write_file(
            "id\ta\tb\tc\n\
             a\t0\t1\t2.5\n\
             b\t1\t0\t3\n\
             c\t2.5\t3\t0\n",
        );

        let dm = read_distance_matrix(file.path(), b'\t').unwrap();
        assert_eq!(dm.ids(), &["a", "b", "c"]);
        assert_eq!(dm.condensed_form(), vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn test_read_distance_matrix_rejects_asymmetric() {
        let file = write_file("id,a,b\na,0,1\nb,2,0\n");

        let result = read_distance_matrix(file.path(), b',');
        assert!(matches!(result, Err(PermanovaError::InvalidDistanceMatrix(_))));
    }

    #[test]
    fn test_read_grouping_and_align() {
        let dm_file = write_file("id,s1,s2,s3,s4\ns1,0,1,1,1\ns2,1,0,1,1\ns3,1,1,0,1\ns4,1,1,1,0\n");
        let map_file = write_file(
            "sample,treatment,site\n\
             s3,control,north\n\
             s1,drug,north\n\
             s4,control,south\n\
             s2,drug,south\n",
        );

        let dm = read_distance_matrix(dm_file.path(), b',').unwrap();
        let mapping = read_grouping(map_file.path(), "treatment", b',').unwrap();
        assert_eq!(mapping.len(), 4);

        let grouping = grouping_for(&dm, &mapping).unwrap();
        assert_eq!(grouping, vec!["drug", "drug", "control", "control"]);
    }

    #[test]
    fn test_read_grouping_unknown_column() {
        let file = write_file("sample,treatment\ns1,a\n");

        let result = read_grouping(file.path(), "dose", b',');
        assert!(matches!(result, Err(PermanovaError::Format(_))));
    }

    #[test]
    fn test_grouping_for_missing_sample() {
        let dm = SymmetricDistanceMatrix::from_condensed(vec!["a", "b"], &[1.0]).unwrap();
        let mut mapping = HashMap::new();
        mapping.insert("a".to_string(), "g1".to_string());

        let result = grouping_for(&dm, &mapping);
        assert!(matches!(result, Err(PermanovaError::MissingSample(id)) if id == "b"));
    }
}
