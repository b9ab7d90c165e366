use serde_json::Value;

use workout_core::{parse_active_rest, parse_area, PlanConfig, RawPlanConfig};

use crate::error::{ValidationError, ValidationErrorInfo};

const KNOWN_AREAS: &[&str] = &["upper", "lower", "core"];

/// A2: turns an untrusted, defaulted [`RawPlanConfig`] into a validated
/// [`PlanConfig`], or a non-empty list of `E1xx` errors. Mirrors the
/// teacher's `PlanValidator::validate_semantic` shape: collect every
/// violation rather than failing on the first.
pub fn validate_plan_config(raw: &RawPlanConfig) -> Result<PlanConfig, Vec<ValidationErrorInfo>> {
    let mut errors = Vec::new();

    if raw.stations < 1 {
        errors.push(ValidationErrorInfo::new(ValidationError::E100StationsInvalid, "/stations"));
    }
    if raw.steps_per_station < 1 {
        errors.push(ValidationErrorInfo::new(
            ValidationError::E101StepsPerStationInvalid,
            "/steps_per_station",
        ));
    }
    if raw.balance_order.is_empty() {
        errors.push(ValidationErrorInfo::new(ValidationError::E102BalanceOrderEmpty, "/balance_order"));
    }
    let mut balance_order = Vec::new();
    for (idx, tag) in raw.balance_order.iter().enumerate() {
        match parse_area(tag) {
            Some(area) => balance_order.push(area),
            None => errors.push(ValidationErrorInfo::new(
                ValidationError::E103BalanceOrderUnknownArea(tag.clone()),
                &format!("/balance_order/{idx}"),
            )),
        }
    }
    let active_rest = parse_active_rest(&raw.active_rest);
    if active_rest.is_none() {
        errors.push(ValidationErrorInfo::new(
            ValidationError::E104ActiveRestInvalid(raw.active_rest.clone()),
            "/active_rest",
        ));
    }
    if raw.crossfit_path && raw.crossfit_path_count < 1 {
        errors.push(ValidationErrorInfo::new(
            ValidationError::E105CrossfitPathCountInvalid,
            "/crossfit_path_count",
        ));
    }
    if raw.people < 1 {
        errors.push(ValidationErrorInfo::new(ValidationError::E106PeopleInvalid, "/people"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(PlanConfig {
        stations: raw.stations,
        steps_per_station: raw.steps_per_station,
        rounds: raw.rounds,
        timing: raw.timing,
        balance_order,
        people: raw.people,
        active_rest: active_rest.expect("checked above"),
        active_rest_count: raw.active_rest_count,
        must_use: raw.must_use.clone(),
        crossfit_path: raw.crossfit_path,
        crossfit_path_count: raw.crossfit_path_count,
        use_workout_history: raw.use_workout_history,
        edit_mode: raw.edit_mode,
        equipment: raw.equipment.clone(),
        max_id: raw.max_id,
        title: raw.title.clone(),
    })
}

/// A2: validates one `equipment/*.json` catalog file against the `lifts`
/// shape from §6, without constructing `Exercise` values (that's C1's job).
pub fn validate_catalog_file(path: &str, json: &Value) -> Result<(), Vec<ValidationErrorInfo>> {
    let mut errors = Vec::new();

    let Some(obj) = json.as_object() else {
        return Err(vec![ValidationErrorInfo::new(
            ValidationError::E204MalformedCatalogFile,
            path,
        )]);
    };
    let Some(lifts) = obj.get("lifts").and_then(|v| v.as_object()) else {
        return Err(vec![ValidationErrorInfo::new(
            ValidationError::E201MissingField("lifts".to_string()),
            path,
        )]);
    };

    for (category, entries) in lifts {
        let Some(list) = entries.as_array() else {
            errors.push(ValidationErrorInfo::new(
                ValidationError::E200InvalidType(category.clone()),
                &format!("{path}#/lifts/{category}"),
            ));
            continue;
        };
        for (idx, entry) in list.iter().enumerate() {
            let entry_path = format!("{path}#/lifts/{category}/{idx}");
            match entry {
                Value::String(_) => {}
                Value::Object(fields) => {
                    if !fields.contains_key("name") {
                        errors.push(ValidationErrorInfo::new(
                            ValidationError::E201MissingField("name".to_string()),
                            &entry_path,
                        ));
                    }
                    match fields.get("area").and_then(|v| v.as_str()) {
                        Some(area) if KNOWN_AREAS.contains(&area) => {}
                        Some(area) => errors.push(ValidationErrorInfo::new(
                            ValidationError::E202UnknownArea(area.to_string()),
                            &entry_path,
                        )),
                        None => errors.push(ValidationErrorInfo::new(
                            ValidationError::E201MissingField("area".to_string()),
                            &entry_path,
                        )),
                    }
                    if let Some(video_type) = fields.get("video_type").and_then(|v| v.as_str()) {
                        if !matches!(video_type, "youtube" | "mp4" | "") {
                            errors.push(ValidationErrorInfo::new(
                                ValidationError::E203InvalidVideoType(video_type.to_string()),
                                &entry_path,
                            ));
                        }
                    }
                }
                _ => errors.push(ValidationErrorInfo::new(
                    ValidationError::E200InvalidType(entry.to_string()),
                    &entry_path,
                )),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_core::{EquipmentReq, Timing};

    fn raw(stations: u32, balance_order: Vec<&str>) -> RawPlanConfig {
        RawPlanConfig {
            stations,
            steps_per_station: 2,
            rounds: 3,
            timing: Timing { work: 45, rest: 15 },
            balance_order: balance_order.into_iter().map(String::from).collect(),
            people: 1,
            active_rest: "auto".to_string(),
            active_rest_count: 4,
            must_use: vec![],
            crossfit_path: false,
            crossfit_path_count: 0,
            use_workout_history: true,
            edit_mode: false,
            equipment: EquipmentReq::new(),
            max_id: 0,
            title: String::new(),
        }
    }

    #[test]
    fn rejects_zero_stations() {
        let errors = validate_plan_config(&raw(0, vec!["upper"])).unwrap_err();
        assert!(errors.iter().any(|e| e.code == "E100"));
    }

    #[test]
    fn rejects_unknown_balance_order_area() {
        let errors = validate_plan_config(&raw(1, vec!["diagonal"])).unwrap_err();
        assert!(errors.iter().any(|e| e.code == "E103"));
    }

    #[test]
    fn accepts_well_formed_plan() {
        let plan = validate_plan_config(&raw(2, vec!["upper", "lower"])).unwrap();
        assert_eq!(plan.stations, 2);
        assert_eq!(plan.balance_order.len(), 2);
    }

    #[test]
    fn catalog_validation_flags_unknown_area_and_missing_name() {
        let json = serde_json::json!({
            "lifts": {
                "upper_body": [
                    {"name": "Press", "area": "upper"},
                    {"area": "sideways"}
                ]
            }
        });
        let errors = validate_catalog_file("gear.json", &json).unwrap_err();
        assert!(errors.iter().any(|e| e.code == "E201"));
        assert!(errors.iter().any(|e| e.code == "E202"));
    }

    #[test]
    fn catalog_validation_accepts_legacy_strings() {
        let json = serde_json::json!({"lifts": {"cat": ["Jump Rope"]}});
        assert!(validate_catalog_file("gear.json", &json).is_ok());
    }
}
