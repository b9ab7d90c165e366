use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CoreWarning;
use crate::models::{
    ActiveRestActivity, ActiveRestMode, ActiveRestSetting, CrossFitPathActivity, PlanConfig,
};

/// C3: resolves `active_rest_mode` and builds the shuffled shared rest pool.
/// `auto` flips a coin once per *attempt* (not per step); `mix` defers the
/// per-step coin flip to the scheduler (§4.7). Degrades to `all_rest` with a
/// warning if active content is required but the pool is empty.
pub fn setup_active_rest(
    plan: &PlanConfig,
    pool: Vec<ActiveRestActivity>,
    rng: &mut StdRng,
) -> (ActiveRestMode, Vec<ActiveRestActivity>, Option<CoreWarning>) {
    let mut mode = match plan.active_rest {
        ActiveRestSetting::Auto => {
            if rng.gen_bool(0.5) {
                ActiveRestMode::AllActive
            } else {
                ActiveRestMode::AllRest
            }
        }
        ActiveRestSetting::Mix => ActiveRestMode::Mix,
        ActiveRestSetting::True => ActiveRestMode::AllActive,
        ActiveRestSetting::False => ActiveRestMode::AllRest,
    };

    let mut warning = None;
    let needs_active = matches!(mode, ActiveRestMode::AllActive | ActiveRestMode::Mix);
    if needs_active && pool.is_empty() {
        mode = ActiveRestMode::AllRest;
        warning = Some(CoreWarning::ActiveRestMissing);
    }

    let mut shuffled = pool;
    if needs_active {
        shuffled.shuffle(rng);
    }

    (mode, shuffled, warning)
}

/// C3: takes the first `count` non-skipped entries of the ordered CrossFit
/// pool, preserving order (already filtered of `skip=true` by the loader).
pub fn setup_crossfit_path(
    pool: Vec<CrossFitPathActivity>,
    count: usize,
) -> Vec<CrossFitPathActivity> {
    pool.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoKind;
    use rand::SeedableRng;

    fn activity(id: i64, name: &str) -> ActiveRestActivity {
        ActiveRestActivity {
            id,
            name: name.to_string(),
            video_link: None,
            video_kind: VideoKind::None,
            skip: false,
        }
    }

    #[test]
    fn mix_mode_is_resolved_directly() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan_cfg = test_plan(ActiveRestSetting::Mix);
        let (mode, _, warning) =
            setup_active_rest(&plan_cfg, vec![activity(1, "Jumping Jacks")], &mut rng);
        assert_eq!(mode, ActiveRestMode::Mix);
        assert!(warning.is_none());
    }

    #[test]
    fn missing_pool_degrades_to_all_rest() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan_cfg = test_plan(ActiveRestSetting::True);
        let (mode, pool, warning) = setup_active_rest(&plan_cfg, vec![], &mut rng);
        assert_eq!(mode, ActiveRestMode::AllRest);
        assert!(pool.is_empty());
        assert!(warning.is_some());
    }

    #[test]
    fn crossfit_path_preserves_order_and_truncates() {
        let pool = vec![
            CrossFitPathActivity {
                id: 1,
                name: "A".into(),
                video_link: None,
                video_kind: VideoKind::None,
                skip: false,
            },
            CrossFitPathActivity {
                id: 2,
                name: "B".into(),
                video_link: None,
                video_kind: VideoKind::None,
                skip: false,
            },
            CrossFitPathActivity {
                id: 3,
                name: "C".into(),
                video_link: None,
                video_kind: VideoKind::None,
                skip: false,
            },
        ];
        let taken = setup_crossfit_path(pool, 2);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].name, "A");
        assert_eq!(taken[1].name, "B");
    }

    fn test_plan(active_rest: ActiveRestSetting) -> PlanConfig {
        use crate::models::{Area, Inventory, Timing};
        PlanConfig {
            stations: 1,
            steps_per_station: 2,
            rounds: 1,
            timing: Timing { work: 45, rest: 15 },
            balance_order: vec![Area::Upper],
            people: 1,
            active_rest,
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
