use std::collections::HashSet;

use crate::equipment::{
    can_admit_station, resolve_equipment_alternatives, station_equipment_requirement,
};
use crate::history::{prioritize_by_variety, variety_score, HistoryManager};
use crate::models::{Area, EquipmentReq, Exercise, Inventory};

/// Steps consumed by one exercise: 2 for unilateral (Left + Right), else 1.
fn steps_consumed(ex: &Exercise) -> i32 {
    if ex.unilateral {
        2
    } else {
        1
    }
}

fn uses_any_must_use(ex: &Exercise, must_use_subset: &[String]) -> bool {
    must_use_subset.iter().any(|t| ex.equipment_req.contains_key(t))
}

/// Step-equipment maps for one exercise, with weight-family alternatives
/// resolved against the remaining inventory, duplicated once per slot a
/// unilateral exercise occupies (§4.6).
fn exercise_step_equipments(ex: &Exercise, inventory: &Inventory) -> Vec<EquipmentReq> {
    let resolved = resolve_equipment_alternatives(&ex.equipment_req, inventory);
    if ex.unilateral {
        vec![resolved.clone(), resolved]
    } else {
        vec![resolved]
    }
}

fn station_requirement_for_selection(
    selected: &[Exercise],
    inventory: &Inventory,
    people_per_station: u32,
) -> EquipmentReq {
    let step_equipments: Vec<EquipmentReq> = selected
        .iter()
        .flat_map(|ex| exercise_step_equipments(ex, inventory))
        .collect();
    station_equipment_requirement(&step_equipments, people_per_station)
}

struct AdmissionCtx<'a> {
    cumulative_usage: &'a EquipmentReq,
    inventory: &'a Inventory,
    people_per_station: u32,
}

fn admits(selected: &[Exercise], ctx: &AdmissionCtx) -> bool {
    let req = station_requirement_for_selection(selected, ctx.inventory, ctx.people_per_station);
    can_admit_station(ctx.cumulative_usage, &req, ctx.inventory)
}

/// Bounded backtracking recursion: branching factor `|candidates|`, depth
/// `steps_per_station` (§9). Tries to land *exactly* on a zero remaining
/// budget while respecting station- and plan-wide name uniqueness.
fn try_exact_combination(
    candidates: &[Exercise],
    selected: Vec<Exercise>,
    remaining: i32,
    used_names: &HashSet<String>,
    ctx: &AdmissionCtx,
) -> Option<Vec<Exercise>> {
    if remaining <= 0 {
        return if admits(&selected, ctx) {
            Some(selected)
        } else {
            None
        };
    }
    for (i, candidate) in candidates.iter().enumerate() {
        if used_names.contains(&candidate.name) {
            continue;
        }
        if selected.iter().any(|e| e.name == candidate.name) {
            continue;
        }
        let consumed = steps_consumed(candidate);
        if consumed > remaining {
            continue;
        }
        let mut next_selected = selected.clone();
        next_selected.push(candidate.clone());
        let rest = &candidates[i + 1..];
        if let Some(found) = try_exact_combination(
            rest,
            next_selected,
            remaining - consumed,
            used_names,
            ctx,
        ) {
            return Some(found);
        }
    }
    None
}

/// Greedy fallback when no exact-fit combination exists: walk the candidate
/// order once, admitting whatever fits, and accept an under-budget result.
/// The Plan Scheduler pads the resulting step list up to `steps_per_station`
/// (§4.6); padding never inflates cumulative usage.
fn try_greedy_combination(
    candidates: &[Exercise],
    remaining: i32,
    used_names: &HashSet<String>,
    ctx: &AdmissionCtx,
) -> Option<Vec<Exercise>> {
    let mut selected: Vec<Exercise> = Vec::new();
    let mut budget = remaining;
    for candidate in candidates {
        if budget <= 0 {
            break;
        }
        if used_names.contains(&candidate.name) {
            continue;
        }
        if selected.iter().any(|e| e.name == candidate.name) {
            continue;
        }
        let consumed = steps_consumed(candidate);
        if consumed > budget {
            continue;
        }
        let mut trial = selected.clone();
        trial.push(candidate.clone());
        if admits(&trial, ctx) {
            selected = trial;
            budget -= consumed;
        }
    }
    if selected.is_empty() {
        None
    } else {
        Some(selected)
    }
}

fn fill_combination(
    candidates: &[Exercise],
    remaining: i32,
    used_names: &HashSet<String>,
    ctx: &AdmissionCtx,
) -> Option<Vec<Exercise>> {
    try_exact_combination(candidates, Vec::new(), remaining, used_names, ctx)
        .or_else(|| try_greedy_combination(candidates, remaining, used_names, ctx))
}

fn mixed_order(sorted_by_variety: &[Exercise], area_target: Area) -> Vec<Exercise> {
    let mut target: Vec<Exercise> = Vec::new();
    let mut other: Vec<Exercise> = Vec::new();
    for ex in sorted_by_variety {
        if ex.area == area_target {
            target.push(ex.clone());
        } else {
            other.push(ex.clone());
        }
    }
    target.extend(other);
    target
}

/// `-include` bias: stable-partition a variety-sorted pool so exercises
/// whose id was explicitly requested come first, ahead of the usual variety
/// order. Empty `include_ids` is a no-op.
fn bias_toward_included(sorted: Vec<Exercise>, include_ids: &HashSet<i64>) -> Vec<Exercise> {
    if include_ids.is_empty() {
        return sorted;
    }
    let mut included: Vec<Exercise> = Vec::new();
    let mut rest: Vec<Exercise> = Vec::new();
    for ex in sorted {
        if include_ids.contains(&ex.id) {
            included.push(ex);
        } else {
            rest.push(ex);
        }
    }
    included.extend(rest);
    included
}

/// C6: selects the exercises for one station. Returns the ordered exercise
/// list (not yet expanded into Left/Right steps); `None` only when no
/// candidate at all could be placed.
#[allow(clippy::too_many_arguments)]
pub fn build_station(
    pool: &[Exercise],
    area_target: Area,
    steps_per_station: u32,
    cumulative_usage: &EquipmentReq,
    inventory: &Inventory,
    people_per_station: u32,
    used_names: &HashSet<String>,
    must_use_subset: &[String],
    include_ids: &HashSet<i64>,
    history: Option<&HistoryManager>,
) -> Option<Vec<Exercise>> {
    let ctx = AdmissionCtx {
        cumulative_usage,
        inventory,
        people_per_station,
    };
    let remaining_budget = steps_per_station as i32;

    let available: Vec<Exercise> = pool
        .iter()
        .filter(|ex| !used_names.contains(&ex.name))
        .cloned()
        .collect();
    let sorted = match history {
        Some(h) => prioritize_by_variety(available, h),
        None => {
            let mut v = available;
            v.sort_by(|a, b| {
                variety_score(b, None)
                    .partial_cmp(&variety_score(a, None))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            v
        }
    };
    let sorted = bias_toward_included(sorted, include_ids);

    // Strategy 1: must-use-first.
    if !must_use_subset.is_empty() {
        let must_use_candidates: Vec<Exercise> = sorted
            .iter()
            .filter(|ex| uses_any_must_use(ex, must_use_subset))
            .cloned()
            .collect();
        let target_area_must_use: Vec<Exercise> = must_use_candidates
            .iter()
            .filter(|ex| ex.area == area_target)
            .cloned()
            .collect();
        let best_target_score = target_area_must_use
            .first()
            .map(|ex| variety_score(ex, history))
            .unwrap_or(0.0);

        let anchors: &[Exercise] = if best_target_score >= 0.8 && !target_area_must_use.is_empty() {
            &target_area_must_use
        } else {
            &must_use_candidates
        };

        for anchor in anchors {
            let consumed = steps_consumed(anchor);
            if consumed > remaining_budget {
                continue;
            }
            let fill_pool = mixed_order(&sorted, area_target);
            let seed = vec![anchor.clone()];
            if let Some(combo) = fill_combination_seeded(
                &fill_pool,
                seed,
                remaining_budget - consumed,
                used_names,
                &ctx,
            ) {
                if combo.iter().any(|ex| uses_any_must_use(ex, must_use_subset)) {
                    return Some(combo);
                }
            }
        }
    }

    // Strategy 2: area-preferred.
    let area_only: Vec<Exercise> = sorted
        .iter()
        .filter(|ex| ex.area == area_target)
        .cloned()
        .collect();
    if let Some(combo) = fill_combination(&area_only, remaining_budget, used_names, &ctx) {
        return Some(combo);
    }

    // Strategy 3: mixed (target area first, then any other area).
    let mixed = mixed_order(&sorted, area_target);
    fill_combination(&mixed, remaining_budget, used_names, &ctx)
}

fn fill_combination_seeded(
    candidates: &[Exercise],
    seed: Vec<Exercise>,
    remaining: i32,
    used_names: &HashSet<String>,
    ctx: &AdmissionCtx,
) -> Option<Vec<Exercise>> {
    let seed_names: HashSet<String> = seed.iter().map(|e| e.name.clone()).collect();
    let rest_candidates: Vec<Exercise> = candidates
        .iter()
        .filter(|ex| !seed_names.contains(&ex.name))
        .cloned()
        .collect();
    if let Some(found) =
        try_exact_combination(&rest_candidates, seed.clone(), remaining, used_names, ctx)
    {
        return Some(found);
    }
    // Greedy fallback, anchored on the must-use seed.
    let mut selected = seed;
    let mut budget = remaining;
    for candidate in &rest_candidates {
        if budget <= 0 {
            break;
        }
        if used_names.contains(&candidate.name) || selected.iter().any(|e| e.name == candidate.name) {
            continue;
        }
        let consumed = steps_consumed(candidate);
        if consumed > budget {
            continue;
        }
        let mut trial = selected.clone();
        trial.push(candidate.clone());
        if admits(&trial, ctx) {
            selected = trial;
            budget -= consumed;
        }
    }
    if selected.len() <= 1 && remaining > 0 {
        // Only the anchor placed and it alone doesn't satisfy admission: still
        // return it if it admits on its own, matching the "uses a must-use type" floor.
        if admits(&selected, ctx) {
            return Some(selected);
        }
        return None;
    }
    if admits(&selected, ctx) {
        Some(selected)
    } else {
        None
    }
}

/// Expand a selected exercise list into step slots, turning each unilateral
/// exercise into "(Left)"/"(Right)" pairs with identical id/equipment/muscles.
pub fn expand_to_steps(
    selected: &[Exercise],
    inventory: &Inventory,
) -> Vec<crate::models::Step> {
    let mut steps = Vec::new();
    for ex in selected {
        let resolved = resolve_equipment_alternatives(&ex.equipment_req, inventory);
        if ex.unilateral {
            steps.push(crate::models::Step {
                name: format!("{} (Left)", ex.base_name),
                link: ex.video_link.clone(),
                equipment: resolved.clone(),
                muscles: ex.muscles.clone(),
                id: ex.id,
                video_kind: ex.video_kind,
            });
            steps.push(crate::models::Step {
                name: format!("{} (Right)", ex.base_name),
                link: ex.video_link.clone(),
                equipment: resolved,
                muscles: ex.muscles.clone(),
                id: ex.id,
                video_kind: ex.video_kind,
            });
        } else {
            steps.push(crate::models::Step {
                name: ex.name.clone(),
                link: ex.video_link.clone(),
                equipment: resolved,
                muscles: ex.muscles.clone(),
                id: ex.id,
                video_kind: ex.video_kind,
            });
        }
    }
    steps
}

/// §4.6 padding: replicate the last filled step until `target_len` is
/// reached. Padding never contributes new equipment usage (the caller
/// recomputes the station requirement from the step list as a whole, and
/// a duplicated step does not add a distinct equipment *event* beyond what
/// was already accounted for the original step).
pub fn pad_station(steps: &mut Vec<crate::models::Step>, target_len: usize) -> bool {
    if steps.is_empty() || steps.len() >= target_len {
        return false;
    }
    let last = steps.last().unwrap().clone();
    while steps.len() < target_len {
        steps.push(last.clone());
    }
    true
}
