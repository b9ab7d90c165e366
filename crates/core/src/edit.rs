use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::equipment::{add_station_usage, can_admit_station, merge_requirements};
use crate::error::{CoreError, CoreResult, CoreWarning};
use crate::models::{
    Area, EquipmentRequirement, Exercise, Inventory, LastPlan, LastPlanStation, PlanConfig, Step,
};
use crate::station_builder::expand_to_steps;

struct CatalogIndex {
    by_id: BTreeMap<i64, Exercise>,
}

impl CatalogIndex {
    fn new(catalog: &[Exercise]) -> Self {
        CatalogIndex {
            by_id: catalog.iter().map(|ex| (ex.id, ex.clone())).collect(),
        }
    }

    fn get(&self, id: i64) -> Option<&Exercise> {
        self.by_id.get(&id)
    }
}

/// C9: replaces the requested exercise ids in `last_plan` with fresh
/// candidates, preserving unilateral pairing and area balance, and rebuilds
/// the full station records from ids alone. Returns the updated `LastPlan`
/// (with its original `seed` untouched) plus the rebuilt stations and
/// recomputed equipment totals.
pub fn edit_plan(
    plan: &PlanConfig,
    catalog: &[Exercise],
    mut last_plan: LastPlan,
    edit_ids: &[i64],
    fresh_seed_source: u32,
) -> CoreResult<(LastPlan, Vec<crate::models::Station>, BTreeMap<String, EquipmentRequirement>, Vec<CoreWarning>)>
{
    let mut warnings = Vec::new();
    let index = CatalogIndex::new(catalog);

    let present_ids: HashSet<i64> = last_plan
        .stations
        .iter()
        .flat_map(|s| s.used_exercise_ids.iter().copied())
        .collect();

    let mut requested: Vec<i64> = edit_ids.iter().copied().filter(|id| present_ids.contains(id)).collect();
    if requested.len() != edit_ids.len() {
        warnings.push(CoreWarning::HistoryIoWarning(
            "some requested edit ids were not present in the last plan and were dropped".to_string(),
        ));
    }
    if requested.is_empty() {
        return Err(CoreError::NothingToEdit);
    }

    expand_unilateral_set(&mut requested, &last_plan, &index);
    let edit_set: HashSet<i64> = requested.iter().copied().collect();

    let mut already_used: HashSet<String> = last_plan
        .stations
        .iter()
        .flat_map(|s| s.used_exercise_ids.iter())
        .filter(|id| !edit_set.contains(id))
        .filter_map(|id| index.get(*id))
        .map(|ex| ex.base_name.clone())
        .collect();

    let mut rng = StdRng::seed_from_u64(fresh_seed_source as u64);

    let mut assignments: Vec<(usize, usize, i64)> = Vec::new();
    for old_id in ordered_unique(&requested) {
        let positions = positions_of(&last_plan, old_id);
        let station_idx = positions[0].0;
        let intended_area = plan.balance_order[station_idx % plan.balance_order.len()];
        let orig = index.get(old_id);
        let orig_unilateral = orig.map(|ex| ex.unilateral).unwrap_or(false);

        let new_ids = if orig_unilateral && positions.len() == 2 {
            replace_unilateral_pair(catalog, intended_area, &already_used, &edit_set, &mut rng)
        } else if !orig_unilateral && positions.len() == 1 {
            replace_bilateral_single(catalog, intended_area, &already_used, &edit_set, &mut rng)
        } else {
            replace_fallback(catalog, intended_area, &already_used, &edit_set, &mut rng, positions.len())
        }
        .ok_or_else(|| CoreError::NoReplacement(old_id, intended_area.as_str().to_string()))?;

        for (id, (station_idx, pos_idx)) in new_ids.iter().zip(positions.iter()) {
            if let Some(ex) = index.get(*id) {
                already_used.insert(ex.base_name.clone());
            }
            assignments.push((*station_idx, *pos_idx, *id));
        }
    }

    for (station_idx, pos_idx, new_id) in assignments {
        last_plan.stations[station_idx].used_exercise_ids[pos_idx] = new_id;
    }

    let people_per_station = plan.people_per_station();
    let mut rebuilt_stations = Vec::with_capacity(last_plan.stations.len());
    let mut totals: BTreeMap<String, EquipmentRequirement> = BTreeMap::new();
    let mut cumulative = crate::models::EquipmentReq::new();

    for (idx, station) in last_plan.stations.iter().enumerate() {
        let area = plan.balance_order[idx % plan.balance_order.len()];
        let steps = reconstruct_station_steps(station, &index, &plan.equipment);
        let step_equipments: Vec<_> = steps.iter().map(|s| s.equipment.clone()).collect();
        let station_req =
            crate::equipment::station_equipment_requirement(&step_equipments, people_per_station);
        if !can_admit_station(&cumulative, &station_req, &plan.equipment) {
            return Err(CoreError::NoReplacement(
                station.used_exercise_ids.first().copied().unwrap_or(-1),
                area.as_str().to_string(),
            ));
        }
        add_station_usage(&mut cumulative, &station_req);
        merge_requirements(&mut totals, &station_req);
        let equipment_label = station_req.keys().cloned().collect::<Vec<_>>().join(", ");
        rebuilt_stations.push(crate::models::Station {
            area,
            equipment_label,
            steps,
        });
    }

    Ok((last_plan, rebuilt_stations, totals, warnings))
}

fn ordered_unique(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in ids {
        if seen.insert(*id) {
            out.push(*id);
        }
    }
    out
}

fn positions_of(last_plan: &LastPlan, id: i64) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (si, station) in last_plan.stations.iter().enumerate() {
        for (pi, used_id) in station.used_exercise_ids.iter().enumerate() {
            if *used_id == id {
                out.push((si, pi));
            }
        }
    }
    out
}

/// Expands `edit_ids` so that, within each station, if any position's
/// exercise shares a `base_name` with an id already in the set, every
/// matching position's id joins the set too (§4.9).
fn expand_unilateral_set(edit_ids: &mut Vec<i64>, last_plan: &LastPlan, index: &CatalogIndex) {
    let mut base_names: HashSet<String> = edit_ids
        .iter()
        .filter_map(|id| index.get(*id))
        .map(|ex| ex.base_name.clone())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for station in &last_plan.stations {
            for used_id in &station.used_exercise_ids {
                if let Some(ex) = index.get(*used_id) {
                    if base_names.contains(&ex.base_name) && !edit_ids.contains(used_id) {
                        edit_ids.push(*used_id);
                        base_names.insert(ex.base_name.clone());
                        changed = true;
                    }
                }
            }
        }
    }
}

fn candidate_pool<'a>(
    catalog: &'a [Exercise],
    area: Area,
    already_used: &HashSet<String>,
    edit_set: &HashSet<i64>,
    unilateral: bool,
) -> Vec<&'a Exercise> {
    catalog
        .iter()
        .filter(|ex| ex.area == area)
        .filter(|ex| ex.unilateral == unilateral)
        .filter(|ex| !already_used.contains(&ex.base_name))
        .filter(|ex| !edit_set.contains(&ex.id))
        .collect()
}

fn replace_unilateral_pair(
    catalog: &[Exercise],
    area: Area,
    already_used: &HashSet<String>,
    edit_set: &HashSet<i64>,
    rng: &mut StdRng,
) -> Option<Vec<i64>> {
    let mut unilateral_candidates = candidate_pool(catalog, area, already_used, edit_set, true);
    unilateral_candidates.shuffle(rng);
    if let Some(choice) = unilateral_candidates.first() {
        return Some(vec![choice.id, choice.id]);
    }

    let mut bilateral_candidates = candidate_pool(catalog, area, already_used, edit_set, false);
    bilateral_candidates.shuffle(rng);
    if bilateral_candidates.len() >= 2 {
        return Some(vec![bilateral_candidates[0].id, bilateral_candidates[1].id]);
    }
    None
}

fn replace_bilateral_single(
    catalog: &[Exercise],
    area: Area,
    already_used: &HashSet<String>,
    edit_set: &HashSet<i64>,
    rng: &mut StdRng,
) -> Option<Vec<i64>> {
    let mut candidates = candidate_pool(catalog, area, already_used, edit_set, false);
    candidates.shuffle(rng);
    candidates.first().map(|ex| vec![ex.id])
}

fn replace_fallback(
    catalog: &[Exercise],
    area: Area,
    already_used: &HashSet<String>,
    edit_set: &HashSet<i64>,
    rng: &mut StdRng,
    positions: usize,
) -> Option<Vec<i64>> {
    let mut candidates: Vec<&Exercise> = catalog
        .iter()
        .filter(|ex| ex.area == area)
        .filter(|ex| !already_used.contains(&ex.base_name))
        .filter(|ex| !edit_set.contains(&ex.id))
        .collect();
    candidates.shuffle(rng);
    candidates.first().map(|ex| vec![ex.id; positions])
}

/// Terminal step of §4.9: rebuild the step list from `used_exercise_ids`
/// alone. Two consecutive identical ids are a unilateral pair; otherwise a
/// single slot. Names are canonicalized by `base_name` lookup.
fn reconstruct_station_steps(
    station: &LastPlanStation,
    index: &CatalogIndex,
    inventory: &Inventory,
) -> Vec<Step> {
    let ids = &station.used_exercise_ids;
    let mut steps = Vec::with_capacity(ids.len());
    let mut i = 0;
    while i < ids.len() {
        let id = ids[i];
        let is_pair = i + 1 < ids.len() && ids[i + 1] == id;
        match index.get(id) {
            Some(ex) => {
                let selected = [ex.clone()];
                let mut rendered = expand_to_steps(&selected, inventory);
                if is_pair {
                    steps.append(&mut rendered);
                    i += 2;
                } else if ex.unilateral {
                    // A lone half of a unilateral exercise (shouldn't normally
                    // happen post-edit, but rendered defensively as one slot).
                    steps.push(rendered.remove(0));
                    i += 1;
                } else {
                    steps.append(&mut rendered);
                    i += 1;
                }
            }
            None => {
                steps.push(Step {
                    name: format!("Unknown exercise #{id}"),
                    link: None,
                    equipment: crate::models::EquipmentReq::new(),
                    muscles: Vec::new(),
                    id,
                    video_kind: crate::models::VideoKind::None,
                });
                i += 1;
            }
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentReq, Timing, VideoKind};

    fn ex(id: i64, name: &str, area: Area, unilateral: bool) -> Exercise {
        Exercise {
            id,
            name: name.to_string(),
            base_name: name.to_string(),
            area,
            muscles: vec![],
            equipment_req: EquipmentReq::new(),
            unilateral,
            video_link: None,
            video_kind: VideoKind::None,
            skip: false,
            category: "cat".to_string(),
        }
    }

    fn plan() -> PlanConfig {
        PlanConfig {
            stations: 1,
            steps_per_station: 2,
            rounds: 1,
            timing: Timing { work: 45, rest: 15 },
            balance_order: vec![Area::Upper],
            people: 1,
            active_rest: crate::models::ActiveRestSetting::False,
            active_rest_count: 4,
            must_use: vec![],
            crossfit_path: false,
            crossfit_path_count: 0,
            use_workout_history: true,
            edit_mode: true,
            equipment: Inventory::new(),
            max_id: 0,
            title: String::new(),
        }
    }

    #[test]
    fn unrequested_ids_absent_from_plan_fails_nothing_to_edit() {
        let catalog = vec![ex(1, "Push-up", Area::Upper, false)];
        let last_plan = LastPlan {
            seed: 42,
            stations: vec![LastPlanStation {
                station: "A".to_string(),
                used_exercise_ids: vec![1],
                area: Some(Area::Upper),
            }],
            global_active_rest_schedule: vec![],
            selected_active_rest_exercises: vec![],
            selected_crossfit_path_exercises: vec![],
        };
        let err = edit_plan(&plan(), &catalog, last_plan, &[999], 7).unwrap_err();
        assert!(matches!(err, CoreError::NothingToEdit));
    }

    #[test]
    fn unilateral_pair_replaced_together_preserves_seed() {
        let catalog = vec![
            ex(7, "Split Squat", Area::Upper, true),
            ex(8, "Filler", Area::Upper, false),
            ex(9, "Lunge", Area::Upper, true),
        ];
        let last_plan = LastPlan {
            seed: 42,
            stations: vec![LastPlanStation {
                station: "A".to_string(),
                used_exercise_ids: vec![7, 7, 8],
                area: Some(Area::Upper),
            }],
            global_active_rest_schedule: vec![],
            selected_active_rest_exercises: vec![],
            selected_crossfit_path_exercises: vec![],
        };
        let (updated, stations, _totals, _warnings) =
            edit_plan(&plan(), &catalog, last_plan, &[7], 99).unwrap();
        assert_eq!(updated.seed, 42);
        assert_eq!(stations[0].area, Area::Upper);
        let ids = &updated.stations[0].used_exercise_ids;
        assert_eq!(ids[2], 8);
        assert_ne!(ids[0], 7);
        assert_eq!(ids[0], ids[1]);
    }
}
