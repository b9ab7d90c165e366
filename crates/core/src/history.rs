use std::collections::{BTreeMap, HashSet};

use crate::models::{Exercise, HistoryRecord, WorkoutSession};

/// C4: History Manager. Wraps a `HistoryRecord` with the variety-scoring
/// contract; persistence is delegated to `history_store` so this type stays
/// a pure value-level model, per §9's "pass a HistoryStore handle explicitly"
/// re-architecture note.
pub struct HistoryManager {
    record: HistoryRecord,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub total_workouts: u64,
    pub sessions_tracked: usize,
    pub unique_exercises_used: usize,
}

impl HistoryManager {
    pub fn new(record: HistoryRecord) -> Self {
        HistoryManager { record }
    }

    pub fn record(&self) -> &HistoryRecord {
        &self.record
    }

    pub fn into_record(self) -> HistoryRecord {
        self.record
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            total_workouts: self.record.total_workouts_generated,
            sessions_tracked: self.record.workout_sessions.len(),
            unique_exercises_used: self.record.exercise_usage_count.len(),
        }
    }

    pub fn last_workout_date(&self) -> Option<&str> {
        self.record
            .workout_sessions
            .last()
            .map(|s| s.date.as_str())
    }

    pub fn last_workout_exercise_count(&self) -> usize {
        self.record
            .workout_sessions
            .last()
            .map(|s| s.used_exercise_ids.len())
            .unwrap_or(0)
    }

    pub fn recently_used(&self, last_n_sessions: usize) -> HashSet<i64> {
        let start = self.record.workout_sessions.len().saturating_sub(last_n_sessions);
        self.record.workout_sessions[start..]
            .iter()
            .flat_map(|s| s.used_exercise_ids.iter().copied())
            .collect()
    }

    pub fn usage_count(&self, exercise_id: i64) -> u32 {
        self.record
            .exercise_usage_count
            .get(&exercise_id.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Exact schedule from §4.4.
    pub fn priority(&self, exercise_id: i64, base_priority: f64) -> f64 {
        if self.recently_used(2).contains(&exercise_id) {
            return base_priority * 0.1;
        }
        if self.recently_used(5).contains(&exercise_id) {
            return base_priority * 0.5;
        }
        match self.usage_count(exercise_id) {
            0 => base_priority * 1.5,
            1 => base_priority * 1.2,
            _ => base_priority,
        }
    }

    /// Append a completed session, update usage counts, truncate to the
    /// last 10 sessions. `date` is injected by the caller (the core never
    /// reads the wall clock directly) so this stays pure and testable.
    pub fn record_session(&mut self, date: String, title: String, used_exercise_ids: Vec<i64>) {
        let session = WorkoutSession {
            date: date.clone(),
            title,
            exercise_count: used_exercise_ids.len(),
            used_exercise_ids: used_exercise_ids.clone(),
        };
        self.record.workout_sessions.push(session);
        self.record.last_session_date = Some(date);
        self.record.total_workouts_generated += 1;

        for id in used_exercise_ids {
            *self
                .record
                .exercise_usage_count
                .entry(id.to_string())
                .or_insert(0) += 1;
        }

        let sessions = &mut self.record.workout_sessions;
        if sessions.len() > 10 {
            let drop = sessions.len() - 10;
            sessions.drain(0..drop);
        }
    }
}

/// Stable descending sort by variety priority; exercises with id == -1 get
/// a neutral priority of 1.0 (no history concept applies to legacy entries).
pub fn prioritize_by_variety(pool: Vec<Exercise>, history: &HistoryManager) -> Vec<Exercise> {
    let mut scored: Vec<(f64, Exercise)> = pool
        .into_iter()
        .map(|ex| {
            let score = if ex.id == -1 {
                1.0
            } else {
                history.priority(ex.id, 1.0)
            };
            (score, ex)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, ex)| ex).collect()
}

/// Priority-ordered lookup used by the Station Builder to score a single
/// exercise without re-sorting the whole pool.
pub fn variety_score(exercise: &Exercise, history: Option<&HistoryManager>) -> f64 {
    if exercise.id == -1 {
        return 1.0;
    }
    match history {
        None => 1.0,
        Some(h) => h.priority(exercise.id, 1.0),
    }
}

pub type UsageCounts = BTreeMap<String, u32>;
