//! Coordinate-format ingestion of base problem data.
//!
//! Matrix files are plain text: `%`-prefixed comment lines, then a size line
//! `rows cols nnz`, then one `col row value` entry per line, one-indexed, with
//! a symmetric pattern that gets mirrored on load. Right-hand-side files carry
//! one value per line with the same comment convention.

use crate::error::Pod2gError;
use crate::matrix::CsrMatrix;
use crate::model::PerturbedSystemProvider;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;

fn parse_err(line: usize, reason: impl Into<String>) -> Pod2gError {
    Pod2gError::Parse { line, reason: reason.into() }
}

/// Loads a symmetric sparse matrix in coordinate text form.
pub fn load_matrix_market(path: impl AsRef<Path>) -> Result<CsrMatrix<f64>, Pod2gError> {
    let text = fs::read_to_string(path)?;
    let mut data_lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim_start().starts_with('%') && !l.trim().is_empty());

    let (header_no, header) = data_lines
        .next()
        .ok_or_else(|| parse_err(0, "file contains no data lines"))?;
    let dims: Vec<usize> = header
        .split_whitespace()
        .map(|t| t.parse().map_err(|_| parse_err(header_no + 1, format!("bad size token {t:?}"))))
        .collect::<Result<_, _>>()?;
    let &[rows, cols, nnz] = dims.as_slice() else {
        return Err(parse_err(header_no + 1, "size line must read `rows cols nnz`"));
    };
    if rows != cols {
        return Err(Pod2gError::InvalidInput(format!(
            "coordinate file describes a {rows}x{cols} matrix, expected square"
        )));
    }

    let mut triplets = Vec::with_capacity(2 * nnz);
    let mut entries = 0usize;
    for (no, line) in data_lines {
        let mut tokens = line.split_whitespace();
        let (Some(c), Some(r), Some(v)) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(parse_err(no + 1, "entry line must read `col row value`"));
        };
        let c: usize = c.parse().map_err(|_| parse_err(no + 1, format!("bad column index {c:?}")))?;
        let r: usize = r.parse().map_err(|_| parse_err(no + 1, format!("bad row index {r:?}")))?;
        let v: f64 = v.parse().map_err(|_| parse_err(no + 1, format!("bad value {v:?}")))?;
        if c == 0 || r == 0 || c > cols || r > rows {
            return Err(parse_err(no + 1, format!("index ({r}, {c}) outside 1..={rows}")));
        }
        triplets.push((r - 1, c - 1, v));
        if r != c {
            triplets.push((c - 1, r - 1, v));
        }
        entries += 1;
    }
    if entries != nnz {
        return Err(Pod2gError::InvalidInput(format!(
            "size line announces {nnz} entries, file contains {entries}"
        )));
    }
    CsrMatrix::from_triplets(rows, cols, triplets)
}

/// Loads a dense right-hand side, one value per line.
pub fn load_rhs(path: impl AsRef<Path>) -> Result<Vec<f64>, Pod2gError> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim_start().starts_with('%') && !l.trim().is_empty())
        .map(|(no, l)| {
            l.trim()
                .parse()
                .map_err(|_| parse_err(no + 1, format!("bad value {:?}", l.trim())))
        })
        .collect()
}

impl PerturbedSystemProvider {
    /// Convenience constructor reading the base system from disk.
    pub fn from_files(
        matrix_path: impl AsRef<Path>,
        rhs_path: Option<&Path>,
        noise: f64,
        rhs_randomness: f64,
        rng: StdRng,
    ) -> Result<Self, Pod2gError> {
        let matrix = load_matrix_market(matrix_path)?;
        let rhs = rhs_path.map(load_rhs).transpose()?;
        Self::new(matrix, rhs, noise, rhs_randomness, rng)
    }
}
