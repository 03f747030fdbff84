//! Dataset loading from an ordered list of candidate locations.

use crate::error::{ProcessingError, Result, ResultExt};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads the dataset from the first candidate path that exists.
#[derive(Debug, Clone)]
pub struct DataLoader {
    candidates: Vec<PathBuf>,
}

impl DataLoader {
    /// Create a loader over the given locations, searched in order.
    pub fn new(candidates: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// The locations this loader searches.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Return the first candidate that exists on disk.
    pub fn resolve(&self) -> Result<&Path> {
        self.candidates
            .iter()
            .find(|path| path.exists())
            .map(PathBuf::as_path)
            .ok_or_else(|| ProcessingError::NotFound {
                attempted: self.candidates.clone(),
            })
    }

    /// Load the table from the first existing candidate.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::NotFound`] listing every attempted path when none
    /// exists, or a parse error from the CSV reader.
    pub fn load(&self) -> Result<DataFrame> {
        let path = self.resolve()?;
        info!("Loading data from: {}", path.display());

        let df = read_csv(path).context(format!("Failed to read {}", path.display()))?;
        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }
}

/// Load the dataset from the first existing path in `candidates`.
pub fn load_data(candidates: &[PathBuf]) -> Result<DataFrame> {
    DataLoader::new(candidates.iter().cloned()).load()
}

/// Read a CSV file with a header row.
///
/// Strict quote handling is tried first; if that fails the file is re-read
/// without a quote character.
fn read_csv(path: &Path) -> Result<DataFrame> {
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_everywhere_lists_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("nested/b.csv");

        let err = DataLoader::new(vec![a.clone(), b.clone()]).load().unwrap_err();
        match err {
            ProcessingError::NotFound { attempted } => assert_eq!(attempted, vec![a, b]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, "x,y\n1,0\n2,1\n").unwrap();
        fs::write(&second, "x,y\n1,0\n").unwrap();

        let loader = DataLoader::new(vec![missing, first.clone(), second]);
        assert_eq!(loader.resolve().unwrap(), first.as_path());

        let df = loader.load().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_load_data_reads_quoted_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ads.csv");
        fs::write(
            &path,
            "Age,Ad Topic Line,Clicked on Ad\n35,\"Cloned, 5thgeneration orchestration\",0\n",
        )
        .unwrap();

        let df = load_data(&[path]).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 3);
    }
}
