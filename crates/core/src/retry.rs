use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{CoreError, CoreResult, CoreWarning};
use crate::feasibility::filter_feasible;
use crate::history::HistoryManager;
use crate::models::{ActiveRestActivity, CrossFitPathActivity, Exercise, PlanConfig, PlanResult};
use crate::pools::{setup_active_rest, setup_crossfit_path};
use crate::scheduler::schedule_attempt;

const MAX_RETRIES_NORMAL: u32 = 30;
const MAX_RETRIES_EDIT_MODE: u32 = 15;

/// §4.8 seed selection: edit-mode reuses a persisted seed (default 42);
/// otherwise derive from the caller-supplied wall-clock milliseconds.
/// Wall-clock is never read inside core (kept pure/testable), mirroring the
/// date-injection pattern already used by [`HistoryManager::record_session`].
pub fn derive_seed(plan: &PlanConfig, persisted_seed: Option<u64>, wall_clock_millis: u64) -> u64 {
    if plan.edit_mode {
        persisted_seed.unwrap_or(42)
    } else {
        wall_clock_millis % 2_147_483_647
    }
}

/// C8: the Retry Driver. Filters the catalog for feasibility once, then
/// attempts the Plan Scheduler up to `max_retries` times, reseeding and
/// reshuffling the pool on each attempt (deterministically derived from the
/// base seed so the whole run stays reproducible from `seed` alone). On the
/// first success, records the session in `history` (when enabled) using the
/// caller-supplied `session_date` and returns the populated `PlanResult`.
#[allow(clippy::too_many_arguments)]
pub fn generate_workout(
    plan: &PlanConfig,
    catalog: Vec<Exercise>,
    active_rest_pool: Vec<ActiveRestActivity>,
    crossfit_pool: Vec<CrossFitPathActivity>,
    include_ids: &[i64],
    mut history: Option<&mut HistoryManager>,
    persisted_seed: Option<u64>,
    wall_clock_millis: u64,
    session_date: String,
    session_title: String,
) -> CoreResult<(PlanResult, Vec<CoreWarning>)> {
    let seed = derive_seed(plan, persisted_seed, wall_clock_millis);
    let max_retries = if plan.edit_mode {
        MAX_RETRIES_EDIT_MODE
    } else {
        MAX_RETRIES_NORMAL
    };

    let mut warnings = Vec::new();

    let catalog_ids: HashSet<i64> = catalog.iter().map(|ex| ex.id).collect();
    let mut valid_include_ids: HashSet<i64> = HashSet::new();
    for id in include_ids {
        if catalog_ids.contains(id) {
            valid_include_ids.insert(*id);
        } else {
            warnings.push(CoreWarning::InvalidIncludeId(*id));
        }
    }

    let filtered = filter_feasible(catalog, &plan.equipment)?;

    for attempt in 0..max_retries {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(attempt as u64));
        let mut pool = filtered.clone();
        pool.shuffle(&mut rng);

        let (ar_mode, ar_pool, ar_warning) =
            setup_active_rest(plan, active_rest_pool.clone(), &mut rng);
        let cf_pool = setup_crossfit_path(crossfit_pool.clone(), plan.crossfit_path_count as usize);

        match schedule_attempt(
            plan,
            &pool,
            ar_mode,
            ar_pool,
            cf_pool,
            &valid_include_ids,
            history.as_ref().map(|h| &**h),
            &mut rng,
        ) {
            Ok((mut result, mut attempt_warnings)) => {
                result.seed = seed;
                warnings.extend(ar_warning);
                warnings.append(&mut attempt_warnings);
                if plan.use_workout_history {
                    if let Some(h) = history.as_mut() {
                        h.record_session(session_date, session_title, result.used_exercise_ids.clone());
                    }
                }
                return Ok((result, warnings));
            }
            Err(_) => continue,
        }
    }

    Err(CoreError::ExhaustedRetries(max_retries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_mode_reuses_persisted_seed() {
        let plan = base_plan(true);
        assert_eq!(derive_seed(&plan, Some(777), 123456), 777);
        assert_eq!(derive_seed(&plan, None, 123456), 42);
    }

    #[test]
    fn normal_mode_derives_seed_from_wall_clock() {
        let plan = base_plan(false);
        assert_eq!(derive_seed(&plan, Some(777), 5_000_000_000), 5_000_000_000 % 2_147_483_647);
    }

    fn base_plan(edit_mode: bool) -> PlanConfig {
        use crate::models::{Area, Inventory, Timing};
        PlanConfig {
            stations: 1,
            steps_per_station: 1,
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
            edit_mode,
            equipment: Inventory::new(),
            max_id: 0,
            title: String::new(),
        }
    }
}
