use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use evoked_linalg::{LinalgError, Matrix};

/// Error types for the CSV loader.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// Error reading the file
    #[error("error reading file")]
    IoError(#[from] std::io::Error),

    /// A cell is not a number
    #[error("Parse error at line {line}: {value:?} is not a number")]
    ParseError {
        /// One-based line number.
        line: usize,
        /// The offending cell.
        value: String,
    },

    /// A row has a different number of cells than the first row
    #[error("Line {line} has {got} values, expected {expected}")]
    RaggedRow {
        /// One-based line number.
        line: usize,
        /// Cells in the first row.
        expected: usize,
        /// Cells in this row.
        got: usize,
    },

    /// The input holds no rows
    #[error("No rows found")]
    Empty,

    /// The parsed values do not form a valid matrix
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Read a comma separated file into a matrix, one matrix row per line.
///
/// # Arguments
///
/// * `path` - The path to the file.
///
/// # Returns
///
/// The matrix with one row per non-blank line.
pub fn read_matrix_csv(path: impl AsRef<Path>) -> Result<Matrix, CsvError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let matrix = parse_matrix_csv(BufReader::new(file))?;
    log::debug!(
        "loaded {}x{} matrix from {}",
        matrix.rows(),
        matrix.cols(),
        path.display()
    );
    Ok(matrix)
}

/// Parse comma separated rows of numbers from a reader.
///
/// Blank lines are skipped and cells are trimmed. Every row must have the
/// same number of cells.
pub fn parse_matrix_csv(reader: impl BufRead) -> Result<Matrix, CsvError> {
    let mut data = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row = parse_row(line, idx + 1)?;
        match cols {
            None => cols = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(CsvError::RaggedRow {
                    line: idx + 1,
                    expected,
                    got: row.len(),
                });
            }
            Some(_) => {}
        }

        data.extend(row);
        rows += 1;
    }

    let Some(cols) = cols else {
        return Err(CsvError::Empty);
    };

    Ok(Matrix::from_row_major(data, rows, cols)?)
}

fn parse_row(line: &str, line_number: usize) -> Result<Vec<f64>, CsvError> {
    line.split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.parse::<f64>().map_err(|_| CsvError::ParseError {
                line: line_number,
                value: cell.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix() -> Result<(), CsvError> {
        let text = "1, 2, 3\n\n4,5,6\n  7 ,8, 9.5  \n";
        let m = parse_matrix_csv(text.as_bytes())?;
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m.row(2), &[7.0, 8.0, 9.5]);
        Ok(())
    }

    #[test]
    fn test_single_column() -> Result<(), CsvError> {
        let m = parse_matrix_csv("1\n2\n3".as_bytes())?;
        assert_eq!(m.shape(), (3, 1));
        assert_eq!(m.column(0), vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_ragged_row() {
        let res = parse_matrix_csv("1,2\n3,4\n5\n".as_bytes());
        assert!(matches!(
            res,
            Err(CsvError::RaggedRow {
                line: 3,
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_non_numeric_cell() {
        let res = parse_matrix_csv("1,2\n3,abc\n".as_bytes());
        match res {
            Err(CsvError::ParseError { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_trailing_comma_is_an_empty_cell() {
        let res = parse_matrix_csv("1,2,\n".as_bytes());
        assert!(matches!(res, Err(CsvError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_matrix_csv("\n  \n".as_bytes()),
            Err(CsvError::Empty)
        ));
    }
}
