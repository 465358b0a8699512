//! Loading point sets from keyed CSV files.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use ndarray::Array2;

use crate::error::{KMeansError, Result};

/// A CSV row split into its leading key and the remaining coordinates.
pub type KeyedRow = (f64, Vec<f64>);

/// Packs ragged rows into a `(N, D)` point array, with D taken from the first row.
pub fn points_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let Some(first) = rows.first() else {
        return Err(KMeansError::InvalidShape("point set is empty".into()));
    };
    let dim = first.len();
    if dim == 0 {
        return Err(KMeansError::InvalidShape(
            "points must have at least one coordinate".into(),
        ));
    }

    let mut data = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(KMeansError::InvalidShape(format!(
                "row {i} has {} coordinates, expected {dim}",
                row.len()
            )));
        }
        data.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), dim), data)
        .map_err(|e| KMeansError::InvalidShape(e.to_string()))
}

/// Reads header-less numeric CSV whose first column is a row key.
pub fn read_keyed_csv<R: Read>(reader: R) -> Result<Vec<KeyedRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut fields = record.iter();
        let Some(key) = fields.next() else {
            continue;
        };
        let key: f64 = key.parse()?;
        let values = fields
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.push((key, values));
    }
    Ok(rows)
}

/// Inner-joins two keyed tables and returns the joined rows sorted by key.
///
/// Each output row is the left coordinates followed by the right ones; the
/// key itself is dropped. Rows with equal keys keep their left-table order.
pub fn join_on_key(left: &[KeyedRow], right: &[KeyedRow]) -> Vec<Vec<f64>> {
    let mut by_key: HashMap<u64, Vec<&[f64]>> = HashMap::new();
    for (key, values) in right {
        by_key.entry(key_bits(*key)).or_default().push(values.as_slice());
    }

    let mut joined: Vec<(f64, Vec<f64>)> = Vec::new();
    for (key, values) in left {
        let Some(matches) = by_key.get(&key_bits(*key)) else {
            continue;
        };
        for other in matches {
            let mut row = Vec::with_capacity(values.len() + other.len());
            row.extend_from_slice(values);
            row.extend_from_slice(other);
            joined.push((*key, row));
        }
    }

    joined.sort_by(|a, b| a.0.total_cmp(&b.0));
    joined.into_iter().map(|(_, row)| row).collect()
}

/// Loads both files, joins them on their key column and packs the result.
pub fn load_joined<P: AsRef<Path>, Q: AsRef<Path>>(left: P, right: Q) -> Result<Array2<f64>> {
    let left_rows = read_keyed_csv(std::fs::File::open(left.as_ref())?)?;
    let right_rows = read_keyed_csv(std::fs::File::open(right.as_ref())?)?;
    tracing::debug!(
        left = left_rows.len(),
        right = right_rows.len(),
        "read keyed csv inputs"
    );

    let joined = join_on_key(&left_rows, &right_rows);
    tracing::debug!(rows = joined.len(), "joined inputs on key column");
    points_from_rows(&joined)
}

// -0.0 and 0.0 must land on the same key.
fn key_bits(key: f64) -> u64 {
    if key == 0.0 {
        0.0f64.to_bits()
    } else {
        key.to_bits()
    }
}
