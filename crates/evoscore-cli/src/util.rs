use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use evoscore_scoring::ScorerConfig;
use serde::{Serialize, de::DeserializeOwned};

use crate::schema::dataset::Dataset;

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    let (mut writer, target): (Box<dyn Write>, String) = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to finish writing {target}"))?;
    if path.is_some() {
        tracing::info!(%target, "saved output");
    }
    Ok(())
}

fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

pub fn read_dataset_file(path: &Path) -> anyhow::Result<Dataset> {
    read_json_file("dataset", path)
}

pub fn read_scorer_config_file(path: &Path) -> anyhow::Result<ScorerConfig> {
    read_json_file("scorer configuration", path)
}

/// Reads a candidate program.
pub fn read_candidate_file(path: &Path) -> anyhow::Result<evoscore_table::Expr> {
    read_json_file("candidate", path)
}
