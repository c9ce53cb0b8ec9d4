//! Square connectivity matrices and their label sequences.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

use crate::{Error, Result};

/// A square numeric matrix, row-major. Entry (i,j) is the connectivity
/// strength between entities i and j. Squareness is the only structural
/// invariant; symmetry is the caller's business.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(dim: usize) -> Self {
        Matrix {
            dim,
            data: vec![0.0; dim * dim],
        }
    }

    /// Build from row vectors. Returns `None` unless every row has exactly
    /// as many entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let dim = rows.len();
        if rows.iter().any(|r| r.len() != dim) {
            return None;
        }
        let mut data = Vec::with_capacity(dim * dim);
        for row in rows {
            data.extend_from_slice(&row);
        }
        Some(Matrix { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.dim + j] = value;
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.dim + j]
    }
}

/// Capability for matrix types that carry their own axis labels. Callers
/// whose matrix lacks this capability must pass labels explicitly.
pub trait Labeled {
    fn matrix(&self) -> &Matrix;
    fn labels(&self) -> &[String];
}

/// A matrix together with one label per row/column (row and column labels
/// are the same, as in a correlation table).
#[derive(Debug, Clone)]
pub struct Table {
    matrix: Matrix,
    labels: Vec<String>,
}

impl Table {
    /// Returns `None` when the label count does not match the matrix
    /// dimension.
    pub fn new(matrix: Matrix, labels: Vec<String>) -> Option<Self> {
        if labels.len() != matrix.dim() {
            return None;
        }
        Some(Table { matrix, labels })
    }
}

impl Labeled for Table {
    fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_err(path: &Path, line: usize, reason: impl Into<String>) -> Error {
    Error::MatrixParse {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// Read non-empty, non-comment lines from a TSV file.
fn read_rows(path: &Path) -> Result<Vec<(usize, Vec<String>)>> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(path, e))?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();
        rows.push((lineno + 1, fields));
    }

    Ok(rows)
}

fn parse_numeric_row(path: &Path, lineno: usize, fields: &[String]) -> Result<Vec<f64>> {
    fields
        .iter()
        .map(|f| {
            f.parse::<f64>()
                .map_err(|_| parse_err(path, lineno, format!("expected a number, got {:?}", f)))
        })
        .collect()
}

/// Load a plain numeric TSV matrix (no header, no row labels).
pub fn load_matrix(path: &Path) -> Result<Matrix> {
    let rows = read_rows(path)?;
    let mut numeric = Vec::with_capacity(rows.len());
    for (lineno, fields) in &rows {
        numeric.push(parse_numeric_row(path, *lineno, fields)?);
    }
    let last_line = rows.last().map(|(l, _)| *l).unwrap_or(0);
    Matrix::from_rows(numeric).ok_or_else(|| parse_err(path, last_line, "matrix is not square"))
}

/// Load a labeled correlation table: a header row of N labels followed by N
/// numeric rows. Data rows may carry a leading row label, which is ignored.
pub fn load_table(path: &Path) -> Result<Table> {
    let rows = read_rows(path)?;
    let (header_line, header) = rows
        .first()
        .ok_or_else(|| parse_err(path, 0, "empty file"))?;
    if header.iter().all(|f| f.parse::<f64>().is_ok()) {
        return Err(parse_err(
            path,
            *header_line,
            "first row is numeric; expected a header of labels (or pass labels separately)",
        ));
    }

    let labels: Vec<String> = header.clone();
    let dim = labels.len();
    let mut numeric = Vec::with_capacity(dim);
    for (lineno, fields) in rows.iter().skip(1) {
        let fields = if fields.len() == dim + 1 {
            &fields[1..]
        } else {
            &fields[..]
        };
        numeric.push(parse_numeric_row(path, *lineno, fields)?);
    }

    let last_line = rows.last().map(|(l, _)| *l).unwrap_or(0);
    let matrix = Matrix::from_rows(numeric)
        .ok_or_else(|| parse_err(path, last_line, "matrix is not square"))?;
    Table::new(matrix, labels)
        .ok_or_else(|| parse_err(path, *header_line, "label count does not match matrix size"))
}

/// Load one label per line.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(file);
    let mut labels = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| io_err(path, e))?;
        let line = line.trim();
        if !line.is_empty() {
            labels.push(line.to_string());
        }
    }

    Ok(labels)
}
