use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body-region tag assigned to every exercise and station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Upper,
    Lower,
    Core,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Upper => "upper",
            Area::Lower => "lower",
            Area::Core => "core",
        }
    }

    pub fn parse(s: &str) -> Option<Area> {
        match s.to_ascii_lowercase().as_str() {
            "upper" => Some(Area::Upper),
            "lower" => Some(Area::Lower),
            "core" => Some(Area::Core),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    Youtube,
    Mp4,
    None,
}

/// A single equipment requirement: `{"count": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCount {
    pub count: u32,
}

/// Equipment requirements keyed by equipment-type tag (e.g. "kettlebells_16kg").
pub type EquipmentReq = BTreeMap<String, EquipmentCount>;

/// Normalized, post-load exercise record. This is the single closed shape C1
/// produces; the legacy string-vs-object duality in the source catalog files
/// never escapes the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub base_name: String,
    pub area: Area,
    pub muscles: Vec<String>,
    pub equipment_req: EquipmentReq,
    pub unilateral: bool,
    pub video_link: Option<String>,
    pub video_kind: VideoKind,
    pub skip: bool,
    pub category: String,
}

impl Exercise {
    /// Strip a trailing "(Left)"/"(Right)" runtime suffix, case-insensitively.
    pub fn strip_side_suffix(name: &str) -> String {
        static SUFFIX_RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        let re = SUFFIX_RE
            .get_or_init(|| regex::Regex::new(r"(?i)\s*\((?:left|right)\)\s*$").expect("valid regex"));
        re.replace(name, "").into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRestActivity {
    pub id: i64,
    pub name: String,
    pub video_link: Option<String>,
    pub video_kind: VideoKind,
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossFitPathActivity {
    pub id: i64,
    pub name: String,
    pub video_link: Option<String>,
    pub video_kind: VideoKind,
    pub skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveRestSetting {
    Auto,
    Mix,
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveRestMode {
    AllActive,
    AllRest,
    Mix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub work: u32,
    pub rest: u32,
}

/// Validated, immutable-per-run plan configuration. Produced by A1 + A2;
/// the core components only ever see this shape, never the raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub stations: u32,
    #[serde(default = "default_steps_per_station")]
    pub steps_per_station: u32,
    pub rounds: u32,
    pub timing: Timing,
    pub balance_order: Vec<Area>,
    pub people: u32,
    pub active_rest: ActiveRestSetting,
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
    pub equipment: Inventory,
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
fn default_true() -> bool {
    true
}

impl PlanConfig {
    /// `people_per_station = min(2, floor(people/stations))`, floored at 1.
    pub fn people_per_station(&self) -> u32 {
        if self.stations == 0 {
            return 1;
        }
        std::cmp::min(2, self.people / self.stations).max(1)
    }
}

/// Equipment-type → available count. Read-only for the whole run.
pub type Inventory = BTreeMap<String, EquipmentCount>;

/// One filled slot within a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub link: Option<String>,
    pub equipment: EquipmentReq,
    pub muscles: Vec<String>,
    pub id: i64,
    pub video_kind: VideoKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub area: Area,
    pub equipment_label: String,
    pub steps: Vec<Step>,
}

impl Station {
    pub fn used_exercise_ids(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRequirement {
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub stations: Vec<Station>,
    pub equipment_requirements: BTreeMap<String, EquipmentRequirement>,
    pub global_active_rest_schedule: Vec<String>,
    pub selected_active_rest_exercises: Vec<ActiveRestActivity>,
    pub selected_crossfit_path_exercises: Vec<CrossFitPathActivity>,
    pub used_exercise_ids: Vec<i64>,
    pub seed: u64,
}

/// One recorded past session, as persisted in `workout_history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub date: String,
    pub title: String,
    pub used_exercise_ids: Vec<i64>,
    pub exercise_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub created: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub workout_sessions: Vec<WorkoutSession>,
    pub exercise_usage_count: BTreeMap<String, u32>,
    pub last_session_date: Option<String>,
    pub total_workouts_generated: u64,
    pub metadata: HistoryMetadata,
}

impl Default for HistoryRecord {
    fn default() -> Self {
        HistoryRecord {
            workout_sessions: Vec::new(),
            exercise_usage_count: BTreeMap::new(),
            last_session_date: None,
            total_workouts_generated: 0,
            metadata: HistoryMetadata {
                created: String::new(),
                description: "Exercise usage history for workout variety optimization"
                    .to_string(),
                version: "1.0".to_string(),
            },
        }
    }
}

/// Shape of `workout_store/LAST_WORKOUT_PLAN.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPlanStation {
    pub station: String,
    pub used_exercise_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPlan {
    pub seed: u64,
    pub stations: Vec<LastPlanStation>,
    #[serde(default)]
    pub global_active_rest_schedule: Vec<String>,
    #[serde(default)]
    pub selected_active_rest_exercises: Vec<ActiveRestActivity>,
    #[serde(default)]
    pub selected_crossfit_path_exercises: Vec<CrossFitPathActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_side_suffix_case_insensitively() {
        assert_eq!(
            Exercise::strip_side_suffix("Bulgarian Split Squat (Left)"),
            "Bulgarian Split Squat"
        );
        assert_eq!(Exercise::strip_side_suffix("Lunge (right)"), "Lunge");
        assert_eq!(Exercise::strip_side_suffix("Push-up"), "Push-up");
    }

    #[test]
    fn people_per_station_is_clamped() {
        let mut cfg = base_config();
        cfg.people = 2;
        cfg.stations = 2;
        assert_eq!(cfg.people_per_station(), 1);
        cfg.people = 6;
        cfg.stations = 2;
        assert_eq!(cfg.people_per_station(), 2);
    }

    fn base_config() -> PlanConfig {
        PlanConfig {
            stations: 1,
            steps_per_station: 2,
            rounds: 1,
            timing: Timing { work: 45, rest: 15 },
            balance_order: vec![Area::Upper],
            people: 1,
            active_rest: ActiveRestSetting::False,
            active_rest_count: 4,
            must_use: vec![],
            crossfit_path: false,
            crossfit_path_count: 0,
            use_workout_history: true,
            edit_mode: false,
            equipment: Inventory::new(),
            max_id: 0,
            title: String::new(),
        }
    }
}
