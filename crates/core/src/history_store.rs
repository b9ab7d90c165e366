use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use crate::error::CoreWarning;
use crate::models::{HistoryRecord, LastPlan};

/// Loads `workout_history.json`, degrading to a fresh empty record with a
/// warning when the file is missing or unreadable (§5: "History updates
/// happen exactly once per successful run"; a corrupt/missing file must not
/// block that run).
pub fn load_history(path: &Path) -> (HistoryRecord, Option<CoreWarning>) {
    match File::open(path) {
        Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
            Ok(record) => (record, None),
            Err(e) => (
                HistoryRecord::default(),
                Some(CoreWarning::HistoryIoWarning(format!(
                    "malformed {}: {e}; starting a fresh history",
                    path.display()
                ))),
            ),
        },
        Err(_) => (HistoryRecord::default(), None),
    }
}

/// Atomically rewrites `workout_history.json`: serialize to a sibling temp
/// file, then rename over the target (§5 "rewritten atomically").
pub fn save_history(path: &Path, record: &HistoryRecord) -> Result<(), CoreWarning> {
    atomic_write_json(path, record)
        .map_err(|e| CoreWarning::HistoryIoWarning(format!("failed to persist history: {e}")))
}

pub fn load_last_plan(path: &Path) -> Option<LastPlan> {
    let file = File::open(path).ok()?;
    serde_json::from_reader(BufReader::new(file)).ok()
}

pub fn save_last_plan(path: &Path, last_plan: &LastPlan) -> Result<(), CoreWarning> {
    atomic_write_json(path, last_plan)
        .map_err(|e| CoreWarning::HistoryIoWarning(format!("failed to persist last plan: {e}")))
}

fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
