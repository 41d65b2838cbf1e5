use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::ChurnRecord;

pub fn load_dataset(csv_path: &Path) -> Result<Vec<ChurnRecord>, ConfigError> {
    let wrap = |source: csv::Error| ConfigError::Dataset {
        path: csv_path.to_path_buf(),
        source,
    };

    let file = File::open(csv_path).map_err(|err| wrap(err.into()))?;
    read_dataset(file).map_err(wrap)
}

pub fn read_dataset<R: Read>(input: R) -> Result<Vec<ChurnRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(input);
    let mut records = Vec::new();

    for result in reader.deserialize::<ChurnRecord>() {
        records.push(result?);
    }

    Ok(records)
}
