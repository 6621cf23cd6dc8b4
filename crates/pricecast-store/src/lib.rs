//! Save and load run artifacts as pretty-printed JSON. Anything serde can
//! handle goes through here: fitted recipes, models, reports, configs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn save<T: Serialize>(value: &T, path: impl AsRef<Path>) -> StoreResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> StoreResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        name: String,
        values: Vec<f64>,
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("pricecast-store-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blob.json");

        let blob = Blob {
            name: "fit".into(),
            values: vec![1.5, -2.0, 0.0],
        };
        save(&blob, &path).unwrap();
        let back: Blob = load(&path).unwrap();
        assert_eq!(blob, back);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load::<Blob>("/nonexistent/blob.json").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
