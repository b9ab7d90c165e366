pub mod catalog;
pub mod config;
pub mod edit;
pub mod equipment;
pub mod error;
pub mod feasibility;
pub mod history;
pub mod history_store;
pub mod models;
pub mod paths;
pub mod pools;
pub mod retry;
pub mod scheduler;
pub mod station_builder;

pub use catalog::load_catalog;
pub use config::{load_plan_config, parse_active_rest, parse_area, RawPlanConfig};
pub use edit::edit_plan;
pub use equipment::{
    can_admit_station, resolve_equipment_alternatives, station_equipment_requirement,
};
pub use error::{CoreError, CoreResult, CoreWarning};
pub use feasibility::filter_feasible;
pub use history::{prioritize_by_variety, variety_score, HistoryManager, HistorySummary};
pub use history_store::{load_history, load_last_plan, save_history, save_last_plan};
pub use models::*;
pub use paths::AppPaths;
pub use pools::{setup_active_rest, setup_crossfit_path};
pub use retry::{derive_seed, generate_workout};
pub use scheduler::schedule_attempt;
pub use station_builder::{build_station, expand_to_steps, pad_station};
