use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{Result, TrackerError};
use crate::storage::file_backend::tmp_path;

pub fn default_category_file_name(date: NaiveDate) -> String {
    format!("categorias_financeiro_{}.json", date.format("%Y-%m-%d"))
}

pub fn default_backup_file_name(date: NaiveDate) -> String {
    format!("backup_financeiro_{}.json", date.format("%Y-%m-%d"))
}

/// Writes `document` as pretty JSON through a staged temp file.
pub fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|err| TrackerError::InvalidFormat(err.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp).map_err(io_error)?;
    file.write_all(json.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    fs::rename(&tmp, path).map_err(io_error)?;
    Ok(())
}

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(io_error)
}

fn io_error(err: std::io::Error) -> TrackerError {
    TrackerError::Storage(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(
            default_category_file_name(date),
            "categorias_financeiro_2025-07-04.json"
        );
        assert_eq!(default_backup_file_name(date), "backup_financeiro_2025-07-04.json");
    }

    #[test]
    fn writes_pretty_json_without_leftover_tmp() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("doc.json");
        write_document(&path, &serde_json::json!({"contas": []})).expect("write");
        let text = read_document(&path).expect("read");
        assert!(text.contains("\n"));
        assert!(!dir.path().join("nested").join("doc.json.tmp").exists());
    }
}
