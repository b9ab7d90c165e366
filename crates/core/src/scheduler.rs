use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::equipment::{
    add_station_usage, can_admit_station, merge_requirements, remaining_inventory,
};
use crate::error::{CoreError, CoreResult, CoreWarning};
use crate::history::HistoryManager;
use crate::models::{
    ActiveRestActivity, ActiveRestMode, CrossFitPathActivity, EquipmentRequirement, Exercise,
    Inventory, PlanConfig, PlanResult, Station,
};
use crate::station_builder::{build_station, expand_to_steps, pad_station};

/// Fixed must-use priority table from §4.7; unknown types sort after all of
/// these, in catalog order.
const MUST_USE_PRIORITY: &[&str] = &[
    "plyo_box",
    "bench",
    "dip_parallel_bars",
    "barbells",
    "slam_balls_5kg",
    "dumbbells_3kg",
    "dumbbells_5kg",
];

fn must_use_rank(eq_type: &str) -> usize {
    MUST_USE_PRIORITY
        .iter()
        .position(|t| *t == eq_type)
        .unwrap_or(MUST_USE_PRIORITY.len())
}

fn unused_must_use(plan: &PlanConfig, cumulative: &crate::models::EquipmentReq) -> Vec<String> {
    let mut types: Vec<String> = plan
        .must_use
        .iter()
        .filter(|t| {
            let have = plan.equipment.get(*t).map(|c| c.count).unwrap_or(0);
            let used = cumulative.get(*t).map(|c| c.count).unwrap_or(0);
            used < have
        })
        .cloned()
        .collect();
    types.sort_by_key(|t| must_use_rank(t));
    types
}

/// C7: builds one full attempt's stations, the global active-rest schedule
/// and the equipment requirement summary. One call corresponds to one
/// reseed-and-shuffle attempt inside the Retry Driver (§4.8).
#[allow(clippy::too_many_arguments)]
pub fn schedule_attempt(
    plan: &PlanConfig,
    pool: &[Exercise],
    active_rest_mode: ActiveRestMode,
    active_rest_pool: Vec<ActiveRestActivity>,
    crossfit_pool: Vec<CrossFitPathActivity>,
    include_ids: &HashSet<i64>,
    history: Option<&HistoryManager>,
    rng: &mut StdRng,
) -> CoreResult<(PlanResult, Vec<CoreWarning>)> {
    let mut warnings = Vec::new();

    if plan.crossfit_path {
        return Ok(schedule_crossfit_path(plan, crossfit_pool));
    }

    let people_per_station = plan.people_per_station();
    let mut cumulative = crate::models::EquipmentReq::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut used_exercise_ids: Vec<i64> = Vec::new();
    let mut stations: Vec<Station> = Vec::new();
    let mut totals: std::collections::BTreeMap<String, EquipmentRequirement> =
        std::collections::BTreeMap::new();

    let mut live_pool: Vec<Exercise> = pool.to_vec();

    for s in 0..plan.stations as usize {
        let area_target = plan.balance_order[s % plan.balance_order.len()];
        let remaining_inv = remaining_inventory(&plan.equipment, &cumulative);

        let candidates = unused_must_use(plan, &cumulative);
        let mut selection: Option<Vec<Exercise>> = None;
        for must_use_type in &candidates {
            if let Some(combo) = build_station(
                &live_pool,
                area_target,
                plan.steps_per_station,
                &cumulative,
                &plan.equipment,
                people_per_station,
                &used_names,
                std::slice::from_ref(must_use_type),
                include_ids,
                history,
            ) {
                selection = Some(combo);
                break;
            }
        }
        if selection.is_none() {
            selection = build_station(
                &live_pool,
                area_target,
                plan.steps_per_station,
                &cumulative,
                &plan.equipment,
                people_per_station,
                &used_names,
                &[],
                include_ids,
                history,
            );
        }

        let selected = selection.ok_or(CoreError::NoCompatibleStation(s))?;

        let mut steps = expand_to_steps(&selected, &remaining_inv);
        if pad_station(&mut steps, plan.steps_per_station as usize) {
            warnings.push(CoreWarning::StationPadded);
        }

        let step_equipments: Vec<_> = steps.iter().map(|st| st.equipment.clone()).collect();
        let station_req = crate::equipment::station_equipment_requirement(
            &step_equipments,
            people_per_station,
        );
        if !can_admit_station(&cumulative, &station_req, &plan.equipment) {
            return Err(CoreError::NoCompatibleStation(s));
        }
        add_station_usage(&mut cumulative, &station_req);
        merge_requirements(&mut totals, &station_req);

        for step in &steps {
            used_names.insert(Exercise::strip_side_suffix(&step.name));
            used_exercise_ids.push(step.id);
        }
        let equipment_label = station_req
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        stations.push(Station {
            area: area_target,
            equipment_label,
            steps,
        });

        let remaining_after = remaining_inventory(&plan.equipment, &cumulative);
        live_pool.retain(|ex| crate::feasibility::can_be_performed(&ex.equipment_req, &remaining_after));
    }

    let (schedule, selected_active_rest, ar_warning) = build_active_rest_schedule(
        plan.steps_per_station as usize,
        plan.active_rest_count as usize,
        active_rest_mode,
        active_rest_pool,
        rng,
    );
    if let Some(w) = ar_warning {
        warnings.push(w);
    }

    let result = PlanResult {
        stations,
        equipment_requirements: totals,
        global_active_rest_schedule: schedule,
        selected_active_rest_exercises: selected_active_rest,
        selected_crossfit_path_exercises: Vec::new(),
        used_exercise_ids,
        seed: 0,
    };
    Ok((result, warnings))
}

fn schedule_crossfit_path(
    plan: &PlanConfig,
    crossfit_pool: Vec<CrossFitPathActivity>,
) -> (PlanResult, Vec<CoreWarning>) {
    let mut warnings = Vec::new();
    let selected: Vec<CrossFitPathActivity> = crossfit_pool
        .into_iter()
        .take(plan.crossfit_path_count as usize)
        .collect();
    if selected.len() < plan.crossfit_path_count as usize {
        warnings.push(CoreWarning::CrossFitPathMissing);
    }

    let steps: Vec<crate::models::Step> = selected
        .iter()
        .map(|activity| crate::models::Step {
            name: activity.name.clone(),
            link: activity.video_link.clone(),
            equipment: crate::models::EquipmentReq::new(),
            muscles: Vec::new(),
            id: activity.id,
            video_kind: activity.video_kind,
        })
        .collect();
    let used_exercise_ids = steps.iter().map(|s| s.id).collect();
    let station = Station {
        area: plan.balance_order[0],
        equipment_label: String::new(),
        steps,
    };

    let result = PlanResult {
        stations: vec![station],
        equipment_requirements: std::collections::BTreeMap::new(),
        global_active_rest_schedule: Vec::new(),
        selected_active_rest_exercises: Vec::new(),
        selected_crossfit_path_exercises: selected,
        used_exercise_ids,
        seed: 0,
    };
    (result, warnings)
}

/// Cycles `selected_active_rest_exercises` (capped at `active_rest_count`,
/// padded with "Rest" labels if the pool is smaller) out to
/// `steps_per_station` entries. Under `mix`, each step independently flips.
fn build_active_rest_schedule(
    steps_per_station: usize,
    active_rest_count: usize,
    mode: ActiveRestMode,
    pool: Vec<ActiveRestActivity>,
    rng: &mut StdRng,
) -> (Vec<String>, Vec<ActiveRestActivity>, Option<CoreWarning>) {
    if matches!(mode, ActiveRestMode::AllRest) {
        return (vec!["Rest".to_string(); steps_per_station], Vec::new(), None);
    }

    let cap = active_rest_count.min(pool.len()).max(1);
    let selected: Vec<ActiveRestActivity> = pool.into_iter().take(cap).collect();
    if selected.is_empty() {
        return (
            vec!["Rest".to_string(); steps_per_station],
            Vec::new(),
            Some(CoreWarning::ActiveRestMissing),
        );
    }

    let mut schedule = Vec::with_capacity(steps_per_station);
    for i in 0..steps_per_station {
        let entry = &selected[i % selected.len()];
        let label = match mode {
            ActiveRestMode::AllActive => entry.name.clone(),
            ActiveRestMode::Mix => {
                if rng.gen_bool(0.5) {
                    entry.name.clone()
                } else {
                    "Rest".to_string()
                }
            }
            ActiveRestMode::AllRest => "Rest".to_string(),
        };
        schedule.push(label);
    }
    (schedule, selected, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, EquipmentCount, Timing, VideoKind};
    use rand::SeedableRng;

    fn ex(id: i64, name: &str, area: Area) -> Exercise {
        Exercise {
            id,
            name: name.to_string(),
            base_name: name.to_string(),
            area,
            muscles: vec![],
            equipment_req: crate::models::EquipmentReq::new(),
            unilateral: false,
            video_link: None,
            video_kind: VideoKind::None,
            skip: false,
            category: "cat".to_string(),
        }
    }

    fn plan() -> PlanConfig {
        PlanConfig {
            stations: 2,
            steps_per_station: 1,
            rounds: 1,
            timing: Timing { work: 45, rest: 15 },
            balance_order: vec![Area::Upper, Area::Lower],
            people: 1,
            active_rest: crate::models::ActiveRestSetting::False,
            active_rest_count: 4,
            must_use: vec![],
            crossfit_path: false,
            crossfit_path_count: 0,
            use_workout_history: true,
            edit_mode: false,
            equipment: Inventory::new(),
            max_id: 0,
            title: "T".to_string(),
        }
    }

    #[test]
    fn schedules_stations_in_balance_order() {
        let p = plan();
        let pool = vec![
            ex(1, "Push-up", Area::Upper),
            ex(2, "Squat", Area::Lower),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let (result, _warnings) =
            schedule_attempt(&p, &pool, ActiveRestMode::AllRest, vec![], vec![], &HashSet::new(), None, &mut rng)
                .unwrap();
        assert_eq!(result.stations.len(), 2);
        assert_eq!(result.stations[0].area, Area::Upper);
        assert_eq!(result.stations[1].area, Area::Lower);
    }

    #[test]
    fn fails_with_no_compatible_station_when_pool_cannot_fill_area() {
        let p = plan();
        let pool = vec![ex(1, "Push-up", Area::Upper)];
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            schedule_attempt(&p, &pool, ActiveRestMode::AllRest, vec![], vec![], &HashSet::new(), None, &mut rng)
                .unwrap_err();
        assert!(matches!(err, CoreError::NoCompatibleStation(1)));
    }

    #[test]
    fn admits_second_station_against_cumulative_plus_full_inventory() {
        // Two stations each needing one kettlebell, inventory has two total.
        // Admission must compare cumulative-after-station-1 (1) against the
        // full inventory (2), not against an already-net-of-cumulative figure.
        let mut p = plan();
        p.equipment.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 2 });

        let mut kb_upper = ex(1, "KB Press", Area::Upper);
        kb_upper.equipment_req.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 1 });
        let mut kb_lower = ex(2, "KB Swing", Area::Lower);
        kb_lower.equipment_req.insert("kettlebells_16kg".to_string(), EquipmentCount { count: 1 });

        let pool = vec![kb_upper, kb_lower];
        let mut rng = StdRng::seed_from_u64(1);
        let (result, _warnings) = schedule_attempt(
            &p,
            &pool,
            ActiveRestMode::AllRest,
            vec![],
            vec![],
            &HashSet::new(),
            None,
            &mut rng,
        )
        .unwrap();
        assert_eq!(result.stations.len(), 2);
    }

    #[test]
    fn must_use_priority_table_orders_known_types_first() {
        let mut p = plan();
        p.must_use = vec!["dumbbells_5kg".to_string(), "barbells".to_string()];
        p.equipment.insert("dumbbells_5kg".to_string(), EquipmentCount { count: 1 });
        p.equipment.insert("barbells".to_string(), EquipmentCount { count: 1 });
        let order = unused_must_use(&p, &crate::models::EquipmentReq::new());
        assert_eq!(order, vec!["barbells".to_string(), "dumbbells_5kg".to_string()]);
    }

    #[test]
    fn all_active_mode_cycles_selected_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = vec![ActiveRestActivity {
            id: 1,
            name: "Jumping Jacks".to_string(),
            video_link: None,
            video_kind: VideoKind::None,
            skip: false,
        }];
        let (schedule, selected, warning) =
            build_active_rest_schedule(3, 4, ActiveRestMode::AllActive, pool, &mut rng);
        assert_eq!(schedule, vec!["Jumping Jacks"; 3]);
        assert_eq!(selected.len(), 1);
        assert!(warning.is_none());
    }
}
