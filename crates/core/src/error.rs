use thiserror::Error;

/// Fatal and recoverable error kinds raised by the scheduler core (§7).
///
/// Fatal variants propagate to the CLI boundary and map to exit code 2
/// (except `InvalidArgs`, which the CLI itself constructs for exit code 2).
/// Cancellation is not modeled as a `CoreError` at all: the CLI binary runs
/// this crate's work on a blocking-pool task and races it against
/// `tokio::signal::ctrl_c()`, mapping an interrupt straight to exit code 1
/// without ever constructing one of these variants. `NoCompatibleStation`
/// is caught by the Retry Driver and never escapes a single attempt; only
/// `ExhaustedRetries` reaches the caller.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("no equipment JSON files found in catalog directory")]
    CatalogEmpty,
    #[error("malformed catalog file: {0}")]
    CatalogInvalid(String),
    #[error("no exercises can be performed with the available equipment inventory")]
    NoFeasibleExercises,
    #[error("station {0} could not be filled under the current constraints")]
    NoCompatibleStation(usize),
    #[error("exhausted {0} attempts without producing a valid plan; try reducing stations, adding equipment, or adding exercise variety")]
    ExhaustedRetries(u32),
    #[error("no valid replacement exists for exercise {0} in area '{1}'")]
    NoReplacement(i64, String),
    #[error("none of the requested edit ids are present in the last generated plan")]
    NothingToEdit,
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::CatalogEmpty => "CatalogEmpty",
            CoreError::CatalogInvalid(_) => "CatalogInvalid",
            CoreError::NoFeasibleExercises => "NoFeasibleExercises",
            CoreError::NoCompatibleStation(_) => "NoCompatibleStation",
            CoreError::ExhaustedRetries(_) => "ExhaustedRetries",
            CoreError::NoReplacement(_, _) => "NoReplacement",
            CoreError::NothingToEdit => "NothingToEdit",
            CoreError::InvalidArgs(_) => "InvalidArgs",
        }
    }

    /// Every `CoreError` variant is fatal by definition (§7); recoverable
    /// conditions are reported as `Warning` values instead, never as `Err`.
    pub fn is_warning(&self) -> bool {
        false
    }
}

/// Recoverable conditions (§7): reported to stderr, execution continues
/// with degraded behavior. Never wrapped in `Result::Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreWarning {
    #[error("history I/O warning: {0}")]
    HistoryIoWarning(String),
    #[error("active_rest.json not found; falling back to plain rest")]
    ActiveRestMissing,
    #[error("crossfit_path.json not found; skipping crossfit path")]
    CrossFitPathMissing,
    #[error("duplicate base_name '{base_name}' maps to ids {first} and {other}; keeping {first}")]
    DuplicateBaseName {
        base_name: String,
        first: i64,
        other: i64,
    },
    #[error("station ran out of candidates; padded with a repeated step")]
    StationPadded,
    #[error("plan.json not found; using defaults")]
    ConfigFileMissing,
    #[error("-include id {0} is not present in the catalog; ignoring it")]
    InvalidIncludeId(i64),
}

pub type CoreResult<T> = Result<T, CoreError>;
