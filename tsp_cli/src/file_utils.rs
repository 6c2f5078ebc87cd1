use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::Serialize;
use tsp_instance::location_table::{LocationRow, LocationTable, prepare_addresses};

/// Addresses from the first column of a CSV file with a header row. Blank
/// and repeated addresses are dropped.
pub fn read_addresses(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut addresses = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(address) = record.get(0) {
            addresses.push(address.to_string());
        }
    }

    Ok(prepare_addresses(addresses))
}

pub fn read_location_table(path: &Path) -> anyhow::Result<LocationTable> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let rows: Vec<LocationRow> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid location table {}", path.display()))?;

    Ok(LocationTable::new(rows))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    Ok(())
}
