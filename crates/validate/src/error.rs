use thiserror::Error;

/// PlanConfig shape errors (`E1xx`) and catalog shape errors (`E2xx`),
/// following the teacher's `ValidationError::code()` numbering style.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("stations must be at least 1")]
    E100StationsInvalid,
    #[error("steps_per_station must be at least 1")]
    E101StepsPerStationInvalid,
    #[error("balance_order must not be empty")]
    E102BalanceOrderEmpty,
    #[error("balance_order contains unknown area: {0}")]
    E103BalanceOrderUnknownArea(String),
    #[error("active_rest must be one of true|false|\"auto\"|\"mix\", got: {0}")]
    E104ActiveRestInvalid(String),
    #[error("crossfit_path_count must be at least 1 when crossfit_path is true")]
    E105CrossfitPathCountInvalid,
    #[error("people must be at least 1")]
    E106PeopleInvalid,

    #[error("catalog entry has invalid type: {0}")]
    E200InvalidType(String),
    #[error("catalog entry missing required field: {0}")]
    E201MissingField(String),
    #[error("catalog entry has unknown area: {0}")]
    E202UnknownArea(String),
    #[error("catalog entry has invalid video_type: {0}")]
    E203InvalidVideoType(String),
    #[error("catalog top-level shape must be an object keyed by \"lifts\"")]
    E204MalformedCatalogFile,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::E100StationsInvalid => "E100",
            Self::E101StepsPerStationInvalid => "E101",
            Self::E102BalanceOrderEmpty => "E102",
            Self::E103BalanceOrderUnknownArea(_) => "E103",
            Self::E104ActiveRestInvalid(_) => "E104",
            Self::E105CrossfitPathCountInvalid => "E105",
            Self::E106PeopleInvalid => "E106",
            Self::E200InvalidType(_) => "E200",
            Self::E201MissingField(_) => "E201",
            Self::E202UnknownArea(_) => "E202",
            Self::E203InvalidVideoType(_) => "E203",
            Self::E204MalformedCatalogFile => "E204",
        }
    }

    pub fn is_warning(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrorInfo {
    pub code: String,
    pub message: String,
    pub path: String,
}

impl ValidationErrorInfo {
    pub fn new(error: ValidationError, path: &str) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            path: path.to_string(),
        }
    }
}
