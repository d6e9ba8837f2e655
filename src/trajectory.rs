use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::error::RxError;

pub const LOG_FILE: &str = "log.csv";

pub const TIME: &str = "time";
pub const POS_EAST: &str = "Pos_East";
pub const POS_NORTH: &str = "Pos_North";
pub const POS_UP: &str = "Pos_Up";

const REQUIRED_COLUMNS: [&str; 4] = [TIME, POS_EAST, POS_NORTH, POS_UP];

/// Simulator position in the launch site's ENU frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time: f64,  // seconds
    pub east: f64,  // meters
    pub north: f64, // meters
    pub up: f64,    // meters
}

/// The flight log held as text so that columns this tool does not touch are
/// written back exactly as the simulator produced them.
#[derive(Debug, Clone)]
pub struct LogTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LogTable {
    /// Load `<result_dir>/log.csv`.
    pub fn load(result_dir: &Path) -> Result<Self, RxError> {
        let path = result_dir.join(LOG_FILE);
        if !path.is_file() {
            return Err(RxError::MissingFile(path));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_path(&path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| match e.kind() {
                csv::ErrorKind::UnequalLengths { .. } => RxError::malformed(&path, e.to_string()),
                _ => RxError::Csv(e),
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let table = Self {
            path,
            headers,
            rows,
        };
        table.check_required_columns()?;
        Ok(table)
    }

    fn check_required_columns(&self) -> Result<(), RxError> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| self.column_index(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RxError::malformed(
                &self.path,
                format!("missing column(s): {}", missing.join(", ")),
            ))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Parse a column as numbers. Row numbers in errors are 1-based data rows.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, RxError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| RxError::malformed(&self.path, format!("missing column: {}", name)))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = row[idx].trim();
                cell.parse::<f64>().map_err(|_| {
                    RxError::malformed(
                        &self.path,
                        format!("row {}: {} is not a number: {:?}", i + 1, name, cell),
                    )
                })
            })
            .collect()
    }

    pub fn samples(&self) -> Result<Vec<TrajectorySample>, RxError> {
        let time = self.numeric_column(TIME)?;
        let east = self.numeric_column(POS_EAST)?;
        let north = self.numeric_column(POS_NORTH)?;
        let up = self.numeric_column(POS_UP)?;

        Ok((0..self.len())
            .map(|i| TrajectorySample {
                time: time[i],
                east: east[i],
                north: north[i],
                up: up[i],
            })
            .collect())
    }

    /// Append a column, or overwrite it in place if the header already exists.
    pub fn set_column(&mut self, name: &str, values: &[f64]) -> Result<(), RxError> {
        if values.len() != self.rows.len() {
            return Err(RxError::malformed(
                &self.path,
                format!(
                    "column {} has {} values for {} rows",
                    name,
                    values.len(),
                    self.rows.len()
                ),
            ));
        }

        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                for row in self.rows.iter_mut() {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value.to_string();
        }
        Ok(())
    }

    /// Overwrite the file the table was loaded from.
    pub fn save(&self) -> Result<(), RxError> {
        let mut writer = WriterBuilder::new().from_path(&self.path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| RxError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh directory under the system temp dir, unique per call.
    pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("rxlook-{}-{}-{}", tag, std::process::id(), n));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_log(dir: &Path, contents: &str) {
        fs::write(dir.join(LOG_FILE), contents).unwrap();
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = scratch_dir("load");
        write_log(
            &dir,
            "time,Mass,Pos_East,Pos_North,Pos_Up\n0.0,10.5,0,0,0\n0.1,10.4,1.5,2.5,3.5\n",
        );

        let table = LogTable::load(&dir).unwrap();
        assert_eq!(table.headers(), ["time", "Mass", "Pos_East", "Pos_North", "Pos_Up"]);
        assert_eq!(table.len(), 2);

        let samples = table.samples().unwrap();
        assert_eq!(
            samples[1],
            TrajectorySample {
                time: 0.1,
                east: 1.5,
                north: 2.5,
                up: 3.5
            }
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = scratch_dir("missing");
        match LogTable::load(&dir) {
            Err(RxError::MissingFile(path)) => assert_eq!(path, dir.join(LOG_FILE)),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns() {
        let dir = scratch_dir("columns");
        write_log(&dir, "time,Pos_East\n0,0\n");

        let err = LogTable::load(&dir).unwrap_err();
        match err {
            RxError::MalformedLog { reason, .. } => {
                assert!(reason.contains("Pos_North"));
                assert!(reason.contains("Pos_Up"));
            }
            other => panic!("expected MalformedLog, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let dir = scratch_dir("ragged");
        write_log(&dir, "time,Pos_East,Pos_North,Pos_Up\n0,0,0\n");
        assert!(matches!(
            LogTable::load(&dir),
            Err(RxError::MalformedLog { .. })
        ));
    }

    #[test]
    fn test_non_numeric_cell() {
        let dir = scratch_dir("nan");
        write_log(&dir, "time,Pos_East,Pos_North,Pos_Up\n0,0,0,0\n1,abc,0,0\n");

        let table = LogTable::load(&dir).unwrap();
        match table.samples() {
            Err(RxError::MalformedLog { reason, .. }) => assert!(reason.contains("row 2")),
            other => panic!("expected MalformedLog, got {:?}", other),
        }
    }

    #[test]
    fn test_bom_and_padded_headers() {
        let dir = scratch_dir("bom");
        write_log(&dir, "\u{feff}time, Pos_East ,Pos_North,Pos_Up\n0,1,2,3\n");

        let table = LogTable::load(&dir).unwrap();
        assert_eq!(table.samples().unwrap()[0].east, 1.0);
    }

    #[test]
    fn test_set_column_appends_then_replaces() {
        let dir = scratch_dir("set");
        write_log(&dir, "time,Pos_East,Pos_North,Pos_Up\n0,0,0,0\n1,0,0,0\n");

        let mut table = LogTable::load(&dir).unwrap();
        table.set_column("dist_Receive", &[1.0, 2.0]).unwrap();
        table.set_column("dist_Receive", &[3.0, 4.5]).unwrap();
        assert_eq!(table.headers().len(), 5);
        assert_eq!(table.numeric_column("dist_Receive").unwrap(), vec![3.0, 4.5]);

        assert!(table.set_column("azi_Receive", &[1.0]).is_err());
    }

    #[test]
    fn test_save_round_trips_untouched_columns() {
        let dir = scratch_dir("save");
        write_log(
            &dir,
            "time,Pos_East,Pos_North,Pos_Up,Phase\n0.000,0,0,0,\"on pad\"\n0.010,0.5,0,1e-3,boost\n",
        );

        let mut table = LogTable::load(&dir).unwrap();
        table.set_column("elv_Receive", &[0.25, -1.5]).unwrap();
        table.save().unwrap();

        let written = fs::read_to_string(dir.join(LOG_FILE)).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "time,Pos_East,Pos_North,Pos_Up,Phase,elv_Receive");
        assert_eq!(lines[1], "0.000,0,0,0,on pad,0.25");
        assert_eq!(lines[2], "0.010,0.5,0,1e-3,boost,-1.5");
    }

    #[test]
    fn test_empty_log() {
        let dir = scratch_dir("empty");
        write_log(&dir, "time,Pos_East,Pos_North,Pos_Up\n");

        let table = LogTable::load(&dir).unwrap();
        assert!(table.is_empty());
        assert!(table.samples().unwrap().is_empty());
    }
}
