use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::CoreWarning;
use crate::models::{ActiveRestSetting, Area, EquipmentReq, Timing};

/// Untrusted, field-by-field-merged plan configuration. Still needs A2
/// validation before it becomes a [`crate::models::PlanConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanConfig {
    pub stations: u32,
    #[serde(default = "default_steps_per_station")]
    pub steps_per_station: u32,
    pub rounds: u32,
    pub timing: Timing,
    pub balance_order: Vec<String>,
    #[serde(default = "default_people")]
    pub people: u32,
    pub active_rest: String,
    #[serde(default = "default_active_rest_count")]
    pub active_rest_count: u32,
    #[serde(default)]
    pub must_use: Vec<String>,
    #[serde(default)]
    pub crossfit_path: bool,
    #[serde(default)]
    pub crossfit_path_count: u32,
    #[serde(default = "default_true")]
    pub use_workout_history: bool,
    #[serde(default)]
    pub edit_mode: bool,
    #[serde(default)]
    pub equipment: EquipmentReq,
    #[serde(default)]
    pub max_id: i64,
    #[serde(default)]
    pub title: String,
}

fn default_steps_per_station() -> u32 {
    2
}
fn default_active_rest_count() -> u32 {
    4
}
fn default_people() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

/// Defaults documented in §3, carried over verbatim from `config.py::DEFAULT_PLAN`.
fn default_plan_json() -> Value {
    serde_json::json!({
        "stations": 6,
        "steps_per_station": 2,
        "rounds": 3,
        "timing": {"work": 45, "rest": 15},
        "balance_order": ["upper", "lower", "core"],
        "people": 1,
        "title": "40-Minute Swim-Strength Block",
        "active_rest": "auto",
        "active_rest_count": 4,
        "must_use": [],
        "crossfit_path": false,
        "crossfit_path_count": 0,
        "use_workout_history": true,
        "edit_mode": false,
        "equipment": {},
        "max_id": 0
    })
}

/// A1: reads `config/plan.json` if present and merges it field-by-field over
/// the documented defaults (supplied fields win, missing fields fall back).
/// A legacy `"<work>/<rest>"` timing string is split and normalized first.
/// Absence of the file is reported as `ConfigFileMissing`, never fatal.
pub fn load_plan_config(config_path: &Path) -> (RawPlanConfig, Option<CoreWarning>) {
    let mut merged = default_plan_json();
    let warning = match File::open(config_path) {
        Ok(file) => {
            match serde_json::from_reader::<_, Value>(BufReader::new(file)) {
                Ok(Value::Object(user_fields)) => {
                    let base = merged.as_object_mut().unwrap();
                    for (key, value) in user_fields {
                        base.insert(key, value);
                    }
                    None
                }
                _ => None,
            }
        }
        Err(_) => Some(CoreWarning::ConfigFileMissing),
    };

    normalize_legacy_timing(&mut merged);

    let raw: RawPlanConfig = serde_json::from_value(merged)
        .expect("merged plan config always satisfies RawPlanConfig's defaulted shape");
    (raw, warning)
}

/// Splits a `"work/rest"` string timing value into `{"work": w, "rest": r}`.
fn normalize_legacy_timing(merged: &mut Value) {
    let Some(obj) = merged.as_object_mut() else {
        return;
    };
    let Some(Value::String(raw)) = obj.get("timing").cloned() else {
        return;
    };
    if let Some((work, rest)) = raw.split_once('/') {
        if let (Ok(work), Ok(rest)) = (work.trim().parse::<u32>(), rest.trim().parse::<u32>()) {
            obj.insert(
                "timing".to_string(),
                serde_json::json!({"work": work, "rest": rest}),
            );
        }
    }
}

pub fn parse_area(s: &str) -> Option<Area> {
    Area::parse(s)
}

pub fn parse_active_rest(s: &str) -> Option<ActiveRestSetting> {
    match s.to_ascii_lowercase().as_str() {
        "auto" => Some(ActiveRestSetting::Auto),
        "mix" => Some(ActiveRestSetting::Mix),
        "true" => Some(ActiveRestSetting::True),
        "false" => Some(ActiveRestSetting::False),
        _ => None,
    }
}
