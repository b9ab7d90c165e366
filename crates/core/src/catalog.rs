use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult, CoreWarning};
use crate::models::{
    ActiveRestActivity, Area, CrossFitPathActivity, EquipmentReq, Exercise, VideoKind,
};

const ACTIVE_REST_FILE: &str = "active_rest.json";
const CROSSFIT_PATH_FILE: &str = "crossfit_path.json";

/// Raw on-disk exercise record, matching §6's `equipment/*.json` shape. A
/// legacy entry is just a bare string with no metadata (`RawExercise::Legacy`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExercise {
    Structured {
        #[serde(default = "default_id")]
        id: i64,
        name: String,
        #[serde(default)]
        link: String,
        area: String,
        #[serde(default)]
        muscles: RawMuscles,
        #[serde(default)]
        equipment: EquipmentReq,
        #[serde(default)]
        unilateral: bool,
        #[serde(default)]
        skip: bool,
        #[serde(default)]
        video_type: String,
    },
    Legacy(String),
}

fn default_id() -> i64 {
    -1
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum RawMuscles {
    #[default]
    Empty,
    Single(String),
    Many(Vec<String>),
}

impl RawMuscles {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawMuscles::Empty => Vec::new(),
            RawMuscles::Single(s) => vec![s.to_ascii_lowercase()],
            RawMuscles::Many(v) => v.into_iter().map(|m| m.to_ascii_lowercase()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EquipmentFile {
    lifts: HashMap<String, Vec<RawExercise>>,
}

#[derive(Debug, Deserialize)]
struct ActiveRestFile {
    rest: Vec<RawActivity>,
}

#[derive(Debug, Deserialize)]
struct CrossFitPathFile {
    lifts: CrossFitLifts,
}

#[derive(Debug, Deserialize)]
struct CrossFitLifts {
    power: Vec<RawActivity>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawActivity {
    Structured {
        #[serde(default = "default_id")]
        id: i64,
        name: String,
        #[serde(default)]
        link: String,
        #[serde(default)]
        skip: bool,
    },
    Legacy(String),
}

fn infer_video_kind(link: &str, explicit: &str) -> VideoKind {
    match explicit {
        "youtube" => return VideoKind::Youtube,
        "mp4" => return VideoKind::Mp4,
        _ => {}
    }
    if link.is_empty() {
        return VideoKind::None;
    }
    if link.contains("youtube.com") || link.contains("youtu.be") {
        VideoKind::Youtube
    } else if link.ends_with(".mp4") || link.contains("/videos/") {
        VideoKind::Mp4
    } else {
        VideoKind::None
    }
}

/// C1: Catalog Loader. Walks `catalog_dir` for `*.json` files (excluding the
/// two reserved pool files), flattens `lifts.<category>` arrays, normalizes
/// legacy string records, drops `skip=true` entries, and deduplicates ids by
/// `base_name` (first-seen wins; later mismatches become warnings).
pub fn load_catalog(
    catalog_dir: &Path,
) -> CoreResult<(Vec<Exercise>, Vec<ActiveRestActivity>, Vec<CrossFitPathActivity>, Vec<CoreWarning>)> {
    let mut warnings = Vec::new();
    let mut exercises = Vec::new();
    let mut base_name_to_id: HashMap<String, i64> = HashMap::new();

    let entries = std::fs::read_dir(catalog_dir)
        .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", catalog_dir.display(), e)))?;

    let mut any_file = false;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::CatalogInvalid(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if file_name == ACTIVE_REST_FILE || file_name == CROSSFIT_PATH_FILE {
            continue;
        }
        any_file = true;

        let category_label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let text = std::fs::read_to_string(&path)
            .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;
        let file: EquipmentFile = serde_json::from_str(&text)
            .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;

        for (category, raw_list) in file.lifts {
            for raw in raw_list {
                let (id, name, link, area_str, muscles, equipment, unilateral, skip, video_type) =
                    match raw {
                        RawExercise::Structured {
                            id,
                            name,
                            link,
                            area,
                            muscles,
                            equipment,
                            unilateral,
                            skip,
                            video_type,
                        } => (
                            id,
                            name,
                            link,
                            area,
                            muscles.into_vec(),
                            equipment,
                            unilateral,
                            skip,
                            video_type,
                        ),
                        RawExercise::Legacy(name) => (
                            -1,
                            name,
                            String::new(),
                            "core".to_string(),
                            Vec::new(),
                            EquipmentReq::new(),
                            false,
                            false,
                            String::new(),
                        ),
                    };

                if skip {
                    continue;
                }

                let base_name = Exercise::strip_side_suffix(&name);
                let base_name_key = base_name.to_ascii_lowercase();
                let resolved_id = match base_name_to_id.get(&base_name_key) {
                    Some(&existing) => {
                        if existing != id {
                            warnings.push(CoreWarning::DuplicateBaseName {
                                base_name: base_name.clone(),
                                first: existing,
                                other: id,
                            });
                        }
                        existing
                    }
                    None => {
                        base_name_to_id.insert(base_name_key, id);
                        id
                    }
                };

                let area = Area::parse(&area_str).unwrap_or(Area::Core);
                let video_kind = infer_video_kind(&link, &video_type);

                exercises.push(Exercise {
                    id: resolved_id,
                    name,
                    base_name,
                    area,
                    muscles,
                    equipment_req: equipment,
                    unilateral,
                    video_link: if link.is_empty() { None } else { Some(link) },
                    video_kind,
                    skip: false,
                    category: category.clone(),
                });
            }
        }
        let _ = category_label;
    }

    if !any_file {
        return Err(CoreError::CatalogEmpty);
    }
    if exercises.is_empty() {
        return Err(CoreError::CatalogEmpty);
    }

    let active_rest = load_active_rest(catalog_dir, &mut warnings)?;
    let crossfit_path = load_crossfit_path(catalog_dir, &mut warnings)?;

    Ok((exercises, active_rest, crossfit_path, warnings))
}

fn load_active_rest(
    catalog_dir: &Path,
    warnings: &mut Vec<CoreWarning>,
) -> CoreResult<Vec<ActiveRestActivity>> {
    let path = catalog_dir.join(ACTIVE_REST_FILE);
    if !path.exists() {
        warnings.push(CoreWarning::ActiveRestMissing);
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path)
        .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;
    let file: ActiveRestFile = serde_json::from_str(&text)
        .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;

    let mut out = Vec::new();
    for (idx, raw) in file.rest.into_iter().enumerate() {
        let (id, name, link, skip) = match raw {
            RawActivity::Structured { id, name, link, skip } => (id, name, link, skip),
            RawActivity::Legacy(name) => (-(idx as i64) - 1, name, String::new(), false),
        };
        if skip {
            continue;
        }
        out.push(ActiveRestActivity {
            id,
            name,
            video_kind: infer_video_kind(&link, ""),
            video_link: if link.is_empty() { None } else { Some(link) },
            skip: false,
        });
    }
    Ok(out)
}

fn load_crossfit_path(
    catalog_dir: &Path,
    warnings: &mut Vec<CoreWarning>,
) -> CoreResult<Vec<CrossFitPathActivity>> {
    let path = catalog_dir.join(CROSSFIT_PATH_FILE);
    if !path.exists() {
        warnings.push(CoreWarning::CrossFitPathMissing);
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path)
        .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;
    let file: CrossFitPathFile = serde_json::from_str(&text)
        .map_err(|e| CoreError::CatalogInvalid(format!("{}: {}", path.display(), e)))?;

    let mut out = Vec::new();
    for (idx, raw) in file.lifts.power.into_iter().enumerate() {
        let (id, name, link, skip) = match raw {
            RawActivity::Structured { id, name, link, skip } => (id, name, link, skip),
            RawActivity::Legacy(name) => (-(idx as i64) - 1, name, String::new(), false),
        };
        if skip {
            continue;
        }
        out.push(CrossFitPathActivity {
            id,
            name,
            video_kind: infer_video_kind(&link, ""),
            video_link: if link.is_empty() { None } else { Some(link) },
            skip: false,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_structured_and_legacy_exercises_and_dedups_by_base_name() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "kettlebells.json",
            r#"{
                "lifts": {
                    "upper_body": [
                        {"id": 1, "name": "KB Press", "area": "upper", "muscles": "shoulders",
                         "equipment": {"kettlebells_16kg": {"count": 1}}, "unilateral": false},
                        {"id": 7, "name": "Split Squat (Left)", "area": "lower", "unilateral": true},
                        {"id": 7, "name": "Split Squat (Right)", "area": "lower", "unilateral": true},
                        "Legacy Jump"
                    ]
                }
            }"#,
        );
        let (exercises, _, _, warnings) = load_catalog(dir.path()).unwrap();
        assert_eq!(exercises.len(), 4);
        assert!(warnings.is_empty());
        let legacy = exercises.iter().find(|e| e.name == "Legacy Jump").unwrap();
        assert_eq!(legacy.id, -1);
        assert_eq!(legacy.area, Area::Core);
    }

    #[test]
    fn reports_base_name_id_mismatch_as_warning_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gear.json",
            r#"{"lifts": {"cat": [
                {"id": 1, "name": "Row (Left)", "area": "upper"},
                {"id": 2, "name": "Row (Right)", "area": "upper"}
            ]}}"#,
        );
        let (exercises, _, _, warnings) = load_catalog(dir.path()).unwrap();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].id, exercises[1].id);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn skip_true_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gear.json",
            r#"{"lifts": {"cat": [
                {"id": 1, "name": "Kept", "area": "upper", "skip": false},
                {"id": 2, "name": "Dropped", "area": "upper", "skip": true}
            ]}}"#,
        );
        let (exercises, _, _, _) = load_catalog(dir.path()).unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].name, "Kept");
    }

    #[test]
    fn empty_directory_fails_with_catalog_empty() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::CatalogEmpty));
    }

    #[test]
    fn missing_active_rest_file_degrades_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gear.json",
            r#"{"lifts": {"cat": [{"id": 1, "name": "X", "area": "upper"}]}}"#,
        );
        let (_, active_rest, _, warnings) = load_catalog(dir.path()).unwrap();
        assert!(active_rest.is_empty());
        assert!(warnings
            .iter()
            .any(|w| matches!(w, CoreWarning::ActiveRestMissing)));
    }

    #[test]
    fn infers_video_kind_from_link() {
        assert_eq!(
            infer_video_kind("https://youtu.be/abc", ""),
            VideoKind::Youtube
        );
        assert_eq!(
            infer_video_kind("https://cdn.example.com/videos/x.mov", ""),
            VideoKind::Mp4
        );
        assert_eq!(infer_video_kind("https://example.com/x.mp4", ""), VideoKind::Mp4);
        assert_eq!(infer_video_kind("", ""), VideoKind::None);
    }
}
