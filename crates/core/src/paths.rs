use std::fs;
use std::path::PathBuf;

use dirs::{data_dir, state_dir};

const APP_NAME: &str = "circuit-trainer";

/// A3: resolves every on-disk artifact location. When `project_root` points
/// at a project checkout carrying `equipment/`, `config/`, `workout_store/`
/// directly (the original source's layout), those are used as-is. Otherwise
/// falls back to XDG data/state dirs so the binary behaves correctly when
/// installed standalone, mirroring the teacher's `AppPaths` data/state split.
pub struct AppPaths {
    root_dir: PathBuf,
    catalog_dir: PathBuf,
    config_dir: PathBuf,
    workout_store_dir: PathBuf,
}

impl AppPaths {
    pub fn new(project_root: Option<PathBuf>) -> Result<Self, std::io::Error> {
        let paths = match project_root {
            Some(root) => AppPaths {
                catalog_dir: root.join("equipment"),
                config_dir: root.join("config"),
                workout_store_dir: root.join("workout_store"),
                root_dir: root,
            },
            None => {
                let data = data_dir()
                    .ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "could not determine data directory",
                        )
                    })?
                    .join(APP_NAME);
                let state = state_dir()
                    .ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "could not determine state directory",
                        )
                    })?
                    .join(APP_NAME);
                AppPaths {
                    catalog_dir: data.join("equipment"),
                    config_dir: data.join("config"),
                    workout_store_dir: state.join("workout_store"),
                    root_dir: data,
                }
            }
        };
        fs::create_dir_all(&paths.root_dir)?;
        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.workout_store_dir)?;
        Ok(paths)
    }

    pub fn catalog_dir(&self) -> &std::path::Path {
        &self.catalog_dir
    }

    pub fn config_dir(&self) -> &std::path::Path {
        &self.config_dir
    }

    pub fn workout_store_dir(&self) -> &std::path::Path {
        &self.workout_store_dir
    }

    /// Bare project-root-relative path, unlike the other produced artifacts:
    /// the original source's `workout_history.py` defaults `history_file` to
    /// `"workout_history.json"` with no `workout_store/` nesting.
    pub fn history_path(&self) -> PathBuf {
        self.root_dir.join("workout_history.json")
    }

    pub fn last_plan_path(&self) -> PathBuf {
        self.workout_store_dir.join("LAST_WORKOUT_PLAN.json")
    }

    pub fn active_rest_path(&self) -> PathBuf {
        self.catalog_dir.join("active_rest.json")
    }

    pub fn crossfit_path_path(&self) -> PathBuf {
        self.catalog_dir.join("crossfit_path.json")
    }

    pub fn plan_config_path(&self) -> PathBuf {
        self.config_dir.join("plan.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_root_layout_nests_under_given_root() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.catalog_dir(), dir.path().join("equipment"));
        assert_eq!(paths.history_path(), dir.path().join("workout_history.json"));
    }
}
