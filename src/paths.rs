use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

const CONFIG_FILE: &str = "config.json";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the bundled tesseract directory: `<exe_dir>/tesseract/`
pub fn get_tesseract_dir() -> PathBuf {
    get_exe_dir().join("tesseract")
}

/// Config file locations, in lookup order: next to the executable, then
/// `<user config dir>/codeshot/config.json`.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![get_exe_dir().join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("codeshot").join(CONFIG_FILE));
    }
    candidates
}
