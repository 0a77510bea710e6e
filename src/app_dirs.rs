use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn best_score_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("plop");
            Some(state_dir.join("best_score.json"))
        } else {
            ProjectDirs::from("", "", "plop")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("best_score.json"))
        }
    }
}
