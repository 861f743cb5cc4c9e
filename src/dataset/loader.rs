//! CSV loading against an explicit [`Schema`].

use super::{Column, ColumnData, ColumnKind, Dataset, Schema};
use crate::error::{PipelineError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Tokens read as an absent value.
const MISSING_TOKENS: [&str; 4] = ["", "NA", "?", "nan"];

fn is_missing_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

impl Dataset {
    /// Load a dataset from a CSV file with a header row.
    ///
    /// See [`from_csv_reader`](Self::from_csv_reader).
    pub fn from_csv_path<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file), schema)
    }

    /// Load a dataset from CSV text with a header row.
    ///
    /// Only the columns declared in `schema` are read, in schema order; other
    /// columns in the file are skipped. Empty cells and the tokens `NA`, `?`
    /// and `nan` are absent values.
    ///
    /// # Errors
    /// - [`PipelineError::Configuration`] if a schema column is not in the
    ///   header, or a numeric cell does not parse.
    /// - [`PipelineError::Io`] on malformed CSV.
    pub fn from_csv_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut positions = Vec::with_capacity(schema.len());
        for (name, _) in schema.fields() {
            let pos = headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::configuration(
                    "csv",
                    format!("schema column '{}' not found in header", name),
                )
            })?;
            positions.push(pos);
        }

        let mut storage: Vec<ColumnData> = schema
            .fields()
            .iter()
            .map(|(_, kind)| match kind {
                ColumnKind::Numeric => ColumnData::Numeric(Vec::new()),
                ColumnKind::Categorical => ColumnData::Categorical(Vec::new()),
            })
            .collect();

        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            for ((field, &pos), data) in schema
                .fields()
                .iter()
                .zip(positions.iter())
                .zip(storage.iter_mut())
            {
                let raw = record.get(pos).unwrap_or("");
                let missing = is_missing_token(raw);
                match data {
                    ColumnData::Numeric(values) => {
                        if missing {
                            values.push(None);
                        } else {
                            let parsed: f64 = raw.trim().parse().map_err(|_| {
                                PipelineError::configuration(
                                    "csv",
                                    format!(
                                        "cannot parse '{}' as a number in column '{}', row {}",
                                        raw, field.0, row
                                    ),
                                )
                            })?;
                            values.push(Some(parsed));
                        }
                    }
                    ColumnData::Categorical(values) => {
                        values.push(if missing {
                            None
                        } else {
                            Some(raw.trim().to_string())
                        });
                    }
                }
            }
        }

        let columns = schema
            .fields()
            .iter()
            .zip(storage)
            .map(|((name, _), data)| Column::from_data(name.as_str(), data))
            .collect();
        Dataset::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
PassengerId,Name,Age,Cabin,Fare
1,\"Braund, Mr. Owen Harris\",22,,7.25
2,\"Cumings, Mrs. John Bradley\",38,C85,71.2833
3,\"Heikkinen, Miss. Laina\",?,NA,7.925
";

    fn schema() -> Schema {
        Schema::new()
            .with_categorical("Name")
            .with_numeric("Age")
            .with_categorical("Cabin")
            .with_numeric("Fare")
    }

    #[test]
    fn test_load_from_reader() {
        let data = Dataset::from_csv_reader(CSV.as_bytes(), &schema()).unwrap();
        assert_eq!(data.n_rows(), 3);
        assert_eq!(data.column_names(), vec!["Name", "Age", "Cabin", "Fare"]);
        assert_eq!(
            data.column("Age").unwrap().as_numeric().unwrap(),
            &[Some(22.0), Some(38.0), None]
        );
        let cabin = data.column("Cabin").unwrap().as_categorical().unwrap();
        assert_eq!(cabin[0], None);
        assert_eq!(cabin[1].as_deref(), Some("C85"));
        assert_eq!(cabin[2], None);
        assert!(!data.contains("PassengerId"));
    }

    #[test]
    fn test_missing_schema_column() {
        let bad = Schema::new().with_numeric("Pclass");
        let result = Dataset::from_csv_reader(CSV.as_bytes(), &bad);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_unparseable_number() {
        let bad = Schema::new().with_numeric("Cabin");
        let result = Dataset::from_csv_reader(CSV.as_bytes(), &bad);
        assert!(matches!(result, Err(PipelineError::Configuration { .. })));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let data = Dataset::from_csv_path(file.path(), &schema()).unwrap();
        assert_eq!(data.n_rows(), 3);
    }
}
