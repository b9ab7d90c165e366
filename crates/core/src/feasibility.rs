use crate::error::{CoreError, CoreResult};
use crate::models::{Exercise, Inventory};

/// C2: drop an exercise iff any required equipment type is absent from
/// `inventory` or its required count exceeds the inventory count. An
/// empty/unspecified inventory disables filtering entirely.
pub fn filter_feasible(exercises: Vec<Exercise>, inventory: &Inventory) -> CoreResult<Vec<Exercise>> {
    if inventory.is_empty() {
        return Ok(exercises);
    }
    let filtered: Vec<Exercise> = exercises
        .into_iter()
        .filter(|ex| can_be_performed(&ex.equipment_req, inventory))
        .collect();
    if filtered.is_empty() {
        return Err(CoreError::NoFeasibleExercises);
    }
    Ok(filtered)
}

pub fn can_be_performed(req: &crate::models::EquipmentReq, inventory: &Inventory) -> bool {
    for (eq_type, need) in req {
        match inventory.get(eq_type) {
            None => return false,
            Some(have) if have.count < need.count => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, EquipmentCount, EquipmentReq, VideoKind};
    use std::collections::BTreeMap;

    fn exercise(name: &str, req: EquipmentReq) -> Exercise {
        Exercise {
            id: 1,
            name: name.to_string(),
            base_name: name.to_string(),
            area: Area::Upper,
            muscles: vec![],
            equipment_req: req,
            unilateral: false,
            video_link: None,
            video_kind: VideoKind::None,
            skip: false,
            category: "cat".to_string(),
        }
    }

    #[test]
    fn drops_exercises_exceeding_inventory() {
        let mut inv = Inventory::new();
        inv.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 1 });

        let mut req_ok = BTreeMap::new();
        req_ok.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 1 });
        let mut req_too_many = BTreeMap::new();
        req_too_many.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 2 });
        let mut req_missing_type = BTreeMap::new();
        req_missing_type.insert("barbells".to_string(), EquipmentCount { count: 1 });

        let pool = vec![
            exercise("OK", req_ok),
            exercise("TooMany", req_too_many),
            exercise("Missing", req_missing_type),
        ];
        let filtered = filter_feasible(pool, &inv).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "OK");
    }

    #[test]
    fn empty_inventory_skips_filtering() {
        let pool = vec![exercise("Anything", {
            let mut m = BTreeMap::new();
            m.insert("barbells".to_string(), EquipmentCount { count: 99 });
            m
        })];
        let inv = Inventory::new();
        let filtered = filter_feasible(pool, &inv).unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn empty_result_after_filtering_is_fatal() {
        let mut inv = Inventory::new();
        inv.insert("barbells".to_string(), EquipmentCount { count: 1 });
        let mut req = BTreeMap::new();
        req.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 1 });
        let pool = vec![exercise("X", req)];
        let err = filter_feasible(pool, &inv).unwrap_err();
        assert!(matches!(err, CoreError::NoFeasibleExercises));
    }
}
