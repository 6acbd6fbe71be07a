//! In-memory tabular data, indexed by a designated unique identifier
//! column, with CSV in both directions.
use std::collections::HashSet;

use crate::errors::PipelineError;

/// A single attribute slot. CSV carries no type information, so parsing
/// infers integer, then float, and falls back to string; the empty field
/// is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn parse(raw: &str) -> Cell {
        if raw.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Str(raw.to_string())
    }

    /// String form used for CSV output and the key-value sink. Integral
    /// floats keep one decimal ("39.0") so serialized output matches what
    /// was read in.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Str(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
            Cell::Float(f) => f.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// An ordered sequence of rows, each uniquely identified by the index
/// column. Index values are kept verbatim (never type-inferred) and their
/// order is preserved through every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index_name: String,
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_csv(bytes: &[u8], index_column: &str) -> Result<Table, PipelineError> {
        Self::from_csv_with_string_columns(bytes, index_column, &[])
    }

    /// Like [`Table::from_csv`], but the named columns are read as plain
    /// strings with no type inference (the dtype override of the original
    /// fixture tests).
    pub fn from_csv_with_string_columns(
        bytes: &[u8],
        index_column: &str,
        string_columns: &[&str],
    ) -> Result<Table, PipelineError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| PipelineError::Parse(e.to_string()))?
            .clone();

        let index_pos = headers
            .iter()
            .position(|h| h == index_column)
            .ok_or_else(|| {
                PipelineError::Parse(format!("index column {} not found in header", index_column))
            })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index_pos)
            .map(|(_, h)| h.to_string())
            .collect();
        let string_positions: HashSet<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| string_columns.contains(&name.as_str()))
            .map(|(i, _)| i)
            .collect();

        let mut index = Vec::new();
        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineError::Parse(e.to_string()))?;
            let id = record
                .get(index_pos)
                .ok_or_else(|| PipelineError::Parse("row is missing its index field".to_string()))?
                .to_string();
            if !seen.insert(id.clone()) {
                return Err(PipelineError::Parse(format!(
                    "duplicate index value: {}",
                    id
                )));
            }
            let cells: Vec<Cell> = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index_pos)
                .enumerate()
                .map(|(col, (_, raw))| {
                    if string_positions.contains(&col) && !raw.is_empty() {
                        Cell::Str(raw.to_string())
                    } else {
                        Cell::parse(raw)
                    }
                })
                .collect();
            index.push(id);
            rows.push(cells);
        }

        Ok(Table {
            index_name: index_column.to_string(),
            columns,
            index,
            rows,
        })
    }

    /// Serialize to CSV, re-emitting the index column first under its
    /// original header name.
    pub fn to_csv(&self) -> Result<Vec<u8>, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(self.index_name.as_str());
        header.extend(self.columns.iter().map(|c| c.as_str()));
        writer
            .write_record(&header)
            .map_err(|e| PipelineError::Write(e.into()))?;

        for (id, cells) in self.index.iter().zip(self.rows.iter()) {
            let mut record = Vec::with_capacity(cells.len() + 1);
            record.push(id.clone());
            record.extend(cells.iter().map(Cell::render));
            writer
                .write_record(&record)
                .map_err(|e| PipelineError::Write(e.into()))?;
        }

        writer
            .into_inner()
            .map_err(|e| PipelineError::Write(e.into()))
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let pos = self.column_position(column)?;
        self.rows.get(row)?.get(pos)
    }

    /// Append a derived column. The cell count must match the row count and
    /// the name must be new.
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<(), PipelineError> {
        if cells.len() != self.len() {
            return Err(PipelineError::Transform(format!(
                "column {} has {} cells for {} rows",
                name,
                cells.len(),
                self.len()
            )));
        }
        if self.column_position(name).is_some() {
            return Err(PipelineError::Transform(format!(
                "column {} already exists",
                name
            )));
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
PassengerId,HomePlanet,Cabin,Age,Name
0001_01,Europa,B/0/P,39.0,Maham Ofracculy
0002_01,Earth,F/0/S,24.0,Juanna Vines
0003_01,Europa,A/0/S,58.0,Altark Susent
";

    #[test]
    fn parses_headered_csv_with_index() {
        let table = Table::from_csv(FIXTURE.as_bytes(), "PassengerId").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.index(), &["0001_01", "0002_01", "0003_01"]);
        assert_eq!(table.columns(), &["HomePlanet", "Cabin", "Age", "Name"]);
        assert_eq!(
            table.cell(0, "HomePlanet"),
            Some(&Cell::Str("Europa".to_string()))
        );
        assert_eq!(table.cell(1, "Age"), Some(&Cell::Float(24.0)));
    }

    #[test]
    fn missing_index_column_is_a_parse_error() {
        let err = Table::from_csv(b"a,b\n1,2\n", "PassengerId").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn duplicate_index_is_a_parse_error() {
        let data = "PassengerId,Age\n0001_01,39.0\n0001_01,40.0\n";
        let err = Table::from_csv(data.as_bytes(), "PassengerId").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn empty_fields_are_null() {
        let data = "PassengerId,Cabin\n0001_01,\n";
        let table = Table::from_csv(data.as_bytes(), "PassengerId").unwrap();
        assert_eq!(table.cell(0, "Cabin"), Some(&Cell::Null));
    }

    #[test]
    fn cell_inference_and_rendering() {
        assert_eq!(Cell::parse("7"), Cell::Int(7));
        assert_eq!(Cell::parse("39.0"), Cell::Float(39.0));
        assert_eq!(Cell::parse("B/0/P"), Cell::Str("B/0/P".to_string()));
        assert_eq!(Cell::parse(""), Cell::Null);
        // the index form never parses as a number
        assert_eq!(Cell::parse("7_1"), Cell::Str("7_1".to_string()));

        assert_eq!(Cell::Int(7).render(), "7");
        assert_eq!(Cell::Float(39.0).render(), "39.0");
        assert_eq!(Cell::Float(39.5).render(), "39.5");
        assert_eq!(Cell::Null.render(), "");
    }

    #[test]
    fn csv_round_trip_preserves_rows_and_order() {
        let table = Table::from_csv(FIXTURE.as_bytes(), "PassengerId").unwrap();
        let bytes = table.to_csv().unwrap();
        let reread = Table::from_csv(&bytes, "PassengerId").unwrap();
        assert_eq!(reread, table);
    }

    #[test]
    fn string_column_override_disables_inference() {
        let data = "PassengerId,CabinNum\n0001_01,123\n";
        let table =
            Table::from_csv_with_string_columns(data.as_bytes(), "PassengerId", &["CabinNum"])
                .unwrap();
        assert_eq!(table.cell(0, "CabinNum"), Some(&Cell::Str("123".to_string())));
    }

    #[test]
    fn push_column_rejects_bad_shapes() {
        let mut table = Table::from_csv(FIXTURE.as_bytes(), "PassengerId").unwrap();
        let err = table.push_column("Extra", vec![Cell::Null]).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(_)));
        let err = table
            .push_column("Age", vec![Cell::Null, Cell::Null, Cell::Null])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transform(_)));
    }
}
