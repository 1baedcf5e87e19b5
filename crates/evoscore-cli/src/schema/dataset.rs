use evoscore_table::{CTable, TableError, Value};
use serde::{Deserialize, Serialize};

/// Raw observations as read from a dataset file.
///
/// ```json
/// {
///   "labels": ["x", "y"],
///   "rows": [
///     { "inputs": [true, false], "output": true },
///     { "inputs": [true, false], "output": false }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Dataset {
    /// Input column names, may be empty
    #[serde(default)]
    pub labels: Vec<String>,
    pub rows: Vec<Observation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Observation {
    pub inputs: Vec<Value>,
    pub output: Value,
}

impl Dataset {
    /// Merges observations with identical inputs into a compressed table.
    pub fn into_table(self) -> Result<CTable, TableError> {
        CTable::from_observations(
            self.labels,
            self.rows.into_iter().map(|obs| (obs.inputs, obs.output)),
        )
    }
}
