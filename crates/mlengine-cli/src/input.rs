//! Loading prediction instances from disk.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use arrow::array::{Array, ArrayRef};
use arrow::ipc::reader::FileReader;
use clap::ValueEnum;
use mlengine_core::Instances;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `{"instances": [...]}` or a bare array of instances.
    Json,
    /// Arrow IPC file; the first column holds one numeric instance per row.
    Arrow,
}

pub fn load(path: &Path, format: Format) -> anyhow::Result<Instances> {
    match format {
        Format::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(Instances::try_from(value)?)
        }
        Format::Arrow => read_arrow(path),
    }
}

fn read_arrow(path: &Path) -> anyhow::Result<Instances> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = FileReader::try_new(file, None).context("reading Arrow IPC header")?;

    let mut columns: Vec<ArrayRef> = Vec::new();
    for batch in reader {
        let batch = batch.context("reading record batch")?;
        anyhow::ensure!(batch.num_columns() > 0, "{} has no columns", path.display());
        columns.push(batch.column(0).clone());
    }
    if columns.is_empty() {
        return Ok(Instances::Sequence(Vec::new()));
    }

    let refs: Vec<&dyn Array> = columns.iter().map(|c| c.as_ref()).collect();
    let array = arrow::compute::concat(&refs).context("concatenating record batches")?;
    Ok(Instances::Array(array))
}
