pub mod error;
pub mod validator;

pub use error::{ValidationError, ValidationErrorInfo};
pub use validator::{validate_catalog_file, validate_plan_config};
