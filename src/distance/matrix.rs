use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use hashbrown::HashMap;
use std::sync::Arc;
use crate::error::{PermanovaError, Result};

/// Square, symmetric, hollow matrix of pairwise dissimilarities.
///
/// Values are stored densely in row-major order. Construction validates every
/// invariant, so downstream code can index freely.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricDistanceMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f64>,
}

impl SymmetricDistanceMatrix {
    /// Build a matrix from row-major data of length `ids.len()²`.
    pub fn new<S: Into<String>>(ids: Vec<S>, data: Vec<f64>) -> Result<Self> {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let n = ids.len();

        if data.len() != n * n {
            return Err(PermanovaError::invalid_distance_matrix(format!(
                "expected {} values for {} samples, got {}",
                n * n,
                n,
                data.len()
            )));
        }

        let mut index = HashMap::with_capacity(n);
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(PermanovaError::invalid_distance_matrix(format!(
                    "duplicate sample id '{}'",
                    id
                )));
            }
        }

        for i in 0..n {
            if data[i * n + i] != 0.0 {
                return Err(PermanovaError::invalid_distance_matrix(format!(
                    "diagonal entry for '{}' is {}, expected 0",
                    ids[i],
                    data[i * n + i]
                )));
            }
            for j in (i + 1)..n {
                let upper = data[i * n + j];
                let lower = data[j * n + i];
                if !upper.is_finite() || upper < 0.0 {
                    return Err(PermanovaError::invalid_distance_matrix(format!(
                        "distance between '{}' and '{}' must be finite and nonnegative, got {}",
                        ids[i], ids[j], upper
                    )));
                }
                if upper != lower {
                    return Err(PermanovaError::invalid_distance_matrix(format!(
                        "not symmetric: d('{}', '{}') = {} but d('{}', '{}') = {}",
                        ids[i], ids[j], upper, ids[j], ids[i], lower
                    )));
                }
            }
        }

        Ok(Self { ids, index, data })
    }

    /// Build a matrix from one row per sample.
    pub fn from_rows<S: Into<String>>(ids: Vec<S>, rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != n) {
            return Err(PermanovaError::invalid_distance_matrix(format!(
                "matrix must be square: {} rows but a row of length {}",
                n,
                row.len()
            )));
        }
        Self::new(ids, rows.concat())
    }

    /// Build a matrix from its condensed upper triangle (row-major, i < j).
    pub fn from_condensed<S: Into<String>>(ids: Vec<S>, condensed: &[f64]) -> Result<Self> {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let n = ids.len();
        let expected = n * n.saturating_sub(1) / 2;
        if condensed.len() != expected {
            return Err(PermanovaError::invalid_distance_matrix(format!(
                "condensed form for {} samples needs {} values, got {}",
                n,
                expected,
                condensed.len()
            )));
        }

        let mut data = vec![0.0; n * n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                data[i * n + j] = condensed[k];
                data[j * n + i] = condensed[k];
                k += 1;
            }
        }
        Self::new(ids, data)
    }

    /// Build a matrix from a RecordBatch with a Utf8 id column followed by
    /// one Float64 column per sample, in row order.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        if batch.num_columns() == 0 {
            return Err(PermanovaError::invalid_distance_matrix(
                "distance table has no columns",
            ));
        }

        let id_array = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                PermanovaError::invalid_distance_matrix(
                    "first column of the distance table must be String (sample id)",
                )
            })?;

        let n = batch.num_rows();
        if batch.num_columns() != n + 1 {
            return Err(PermanovaError::invalid_distance_matrix(format!(
                "distance table has {} rows but {} distance columns",
                n,
                batch.num_columns() - 1
            )));
        }

        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            if id_array.is_null(i) {
                return Err(PermanovaError::invalid_distance_matrix(format!(
                    "sample id in row {} is null",
                    i
                )));
            }
            ids.push(id_array.value(i).to_string());
        }

        let schema = batch.schema();
        let mut columns = Vec::with_capacity(n);
        for (j, id) in ids.iter().enumerate() {
            let field = schema.field(j + 1);
            if field.name() != id {
                return Err(PermanovaError::invalid_distance_matrix(format!(
                    "column {} is named '{}' but row {} is '{}'",
                    j + 1,
                    field.name(),
                    j,
                    id
                )));
            }
            let values = batch
                .column(j + 1)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    PermanovaError::invalid_distance_matrix(format!(
                        "distance column '{}' must be Float64",
                        field.name()
                    ))
                })?;
            if values.null_count() > 0 {
                return Err(PermanovaError::invalid_distance_matrix(format!(
                    "distance column '{}' contains nulls",
                    field.name()
                )));
            }
            columns.push(values);
        }

        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for column in &columns {
                data.push(column.value(i));
            }
        }

        Self::new(ids, data)
    }

    /// Inverse of [`from_record_batch`](Self::from_record_batch).
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let n = self.num_samples();
        let mut fields = Vec::with_capacity(n + 1);
        fields.push(Field::new("id", DataType::Utf8, false));
        for id in &self.ids {
            fields.push(Field::new(id.as_str(), DataType::Float64, false));
        }

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(n + 1);
        columns.push(Arc::new(StringArray::from(self.ids.clone())));
        for j in 0..n {
            let column: Vec<f64> = (0..n).map(|i| self.data[i * n + j]).collect();
            columns.push(Arc::new(Float64Array::from(column)));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }

    pub fn num_samples(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Row-major `n×n` values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.num_samples();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.num_samples() + j]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get_by_id(&self, a: &str, b: &str) -> Result<f64> {
        let i = self
            .index_of(a)
            .ok_or_else(|| PermanovaError::missing_sample(a))?;
        let j = self
            .index_of(b)
            .ok_or_else(|| PermanovaError::missing_sample(b))?;
        Ok(self.get(i, j))
    }

    /// Upper triangle, row-major, `i < j`; length `n(n-1)/2`.
    pub fn condensed_form(&self) -> Vec<f64> {
        let n = self.num_samples();
        let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            condensed.extend_from_slice(&self.row(i)[i + 1..]);
        }
        condensed
    }
}
