use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use workout_core::{
    edit_plan, generate_workout, load_catalog, load_history, load_last_plan, load_plan_config,
    save_history, save_last_plan, AppPaths, CoreError, HistoryManager, LastPlan, LastPlanStation,
};
use workout_validate::validate_plan_config;

/// Builds balanced multi-station circuit workouts from an exercise catalog,
/// equipment inventory, and plan configuration.
#[derive(Parser)]
#[command(name = "circuit")]
#[command(about = "Circuit workout scheduler")]
#[command(version)]
struct Cli {
    /// Replace the listed exercise ids from the last generated plan.
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["include", "add"])]
    edit: Option<Vec<i64>>,

    /// Bias station construction toward including these exercise ids.
    #[arg(long, value_delimiter = ',', conflicts_with = "add")]
    include: Option<Vec<i64>>,

    /// Hand off to the external add-exercise collaborator (out of scope here).
    #[arg(long)]
    add: bool,

    /// Project root containing equipment/, config/, workout_store/. Defaults
    /// to XDG data/state directories when omitted.
    #[arg(long)]
    project_root: Option<PathBuf>,
}

/// The scheduler's own work is synchronous blocking I/O (file reads, the
/// backtracking search); it runs on a blocking-pool thread via
/// `spawn_blocking` so a Ctrl-C during a long search still lands on the
/// `ctrl_c()` branch below instead of being queued up behind it (§7: exit
/// code 1 on user cancellation).
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.add {
        println!("🛠 -add is handled by the separate add-exercise tool; nothing to do here.");
        return ExitCode::SUCCESS;
    }

    let work = tokio::task::spawn_blocking(move || run(cli));
    tokio::pin!(work);

    tokio::select! {
        result = &mut work => match result {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(err)) => {
                eprintln!("✖ {err}");
                ExitCode::from(2)
            }
            Err(join_err) => {
                eprintln!("✖ internal task failed: {join_err}");
                ExitCode::from(2)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("✖ cancelled by user");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), CoreError> {
    let paths = AppPaths::new(cli.project_root)
        .map_err(|e| CoreError::InvalidArgs(format!("could not resolve application paths: {e}")))?;

    let (raw_config, config_warning) = load_plan_config(&paths.plan_config_path());
    if let Some(w) = config_warning {
        eprintln!("⚠ {w}");
    }
    let plan = validate_plan_config(&raw_config).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| format!("[{}] {} ({})", e.code, e.message, e.path))
            .collect::<Vec<_>>()
            .join("; ");
        CoreError::InvalidArgs(format!("invalid plan configuration: {joined}"))
    })?;

    let (catalog, active_rest_pool, crossfit_pool, catalog_warnings) =
        load_catalog(paths.catalog_dir())?;
    for w in &catalog_warnings {
        eprintln!("⚠ {w}");
    }

    if let Some(edit_ids) = cli.edit {
        return run_edit(&paths, &plan, &catalog, edit_ids);
    }

    run_generate(&paths, &plan, catalog, active_rest_pool, crossfit_pool, cli.include.unwrap_or_default())
}

fn run_generate(
    paths: &AppPaths,
    plan: &workout_core::PlanConfig,
    catalog: Vec<workout_core::Exercise>,
    active_rest_pool: Vec<workout_core::ActiveRestActivity>,
    crossfit_pool: Vec<workout_core::CrossFitPathActivity>,
    include_ids: Vec<i64>,
) -> Result<(), CoreError> {
    if !include_ids.is_empty() && plan.crossfit_path {
        eprintln!("⚠ -include is ignored when crossfit_path is enabled.");
    }

    let (history_record, history_warning) = load_history(&paths.history_path());
    if let Some(w) = history_warning {
        eprintln!("⚠ {w}");
    }
    let mut history = HistoryManager::new(history_record);

    let persisted_seed = load_last_plan(&paths.last_plan_path()).map(|p| p.seed);
    let wall_clock_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let now = chrono::Local::now();
    let session_date = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let title = plan.title.clone();

    let (result, warnings) = generate_workout(
        plan,
        catalog,
        active_rest_pool,
        crossfit_pool,
        &include_ids,
        Some(&mut history),
        persisted_seed,
        wall_clock_millis,
        session_date,
        title,
    )?;
    for w in &warnings {
        eprintln!("⚠ {w}");
    }

    let last_plan = LastPlan {
        seed: result.seed,
        stations: result
            .stations
            .iter()
            .enumerate()
            .map(|(idx, station)| LastPlanStation {
                station: station_letter(idx),
                used_exercise_ids: station.used_exercise_ids(),
                area: Some(station.area),
            })
            .collect(),
        global_active_rest_schedule: result.global_active_rest_schedule.clone(),
        selected_active_rest_exercises: result.selected_active_rest_exercises.clone(),
        selected_crossfit_path_exercises: result.selected_crossfit_path_exercises.clone(),
    };
    save_last_plan(&paths.last_plan_path(), &last_plan)
        .map_err(|w| CoreError::InvalidArgs(w.to_string()))?;
    save_history(&paths.history_path(), history.record())
        .map_err(|w| CoreError::InvalidArgs(w.to_string()))?;

    println!("✔ Generated {} stations (seed {}).", result.stations.len(), result.seed);
    for (idx, station) in result.stations.iter().enumerate() {
        println!(
            "  Station {}: {} — {} steps [{}]",
            station_letter(idx),
            station.area.as_str(),
            station.steps.len(),
            station.equipment_label
        );
    }
    Ok(())
}

fn run_edit(
    paths: &AppPaths,
    plan: &workout_core::PlanConfig,
    catalog: &[workout_core::Exercise],
    edit_ids: Vec<i64>,
) -> Result<(), CoreError> {
    let last_plan = load_last_plan(&paths.last_plan_path())
        .ok_or_else(|| CoreError::InvalidArgs("no last generated plan found to edit".to_string()))?;

    let fresh_seed_source: u32 = (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
        % u32::MAX as u128) as u32;

    let (updated_last_plan, stations, totals, warnings) =
        edit_plan(plan, catalog, last_plan, &edit_ids, fresh_seed_source)?;
    for w in &warnings {
        eprintln!("⚠ {w}");
    }

    save_last_plan(&paths.last_plan_path(), &updated_last_plan)
        .map_err(|w| CoreError::InvalidArgs(w.to_string()))?;

    println!("✔ Replaced {} exercise id(s); seed unchanged ({}).", edit_ids.len(), updated_last_plan.seed);
    for (idx, station) in stations.iter().enumerate() {
        println!(
            "  Station {}: {} — {} steps",
            station_letter(idx),
            station.area.as_str(),
            station.steps.len()
        );
    }
    for (eq_type, count) in &totals {
        println!("  {eq_type}: {}", count.count);
    }
    Ok(())
}

fn station_letter(idx: usize) -> String {
    let letter = (b'A' + (idx % 26) as u8) as char;
    letter.to_string()
}
