/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::sim::world::MAX_MINES;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub leaderboard_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: LevelFilter,
    /// Fixed session seed; `None` = OS entropy.
    pub seed: Option<u64>,
    pub max_placement_attempts: u32,
}

#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub rows: i32,
    pub cols: i32,
    pub initial_mines: usize,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub start_delay: Duration,
    pub min_delay: Duration,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_rows")]
    rows: i32,
    #[serde(default = "default_cols")]
    cols: i32,
    #[serde(default = "default_initial_mines")]
    initial_mines: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_start_delay")]
    start_delay_ms: u64,
    #[serde(default = "default_min_delay")]
    min_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_leaderboard")]
    leaderboard: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_max_attempts")]
    max_placement_attempts: u32,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

const MIN_BOARD_ROWS: i32 = 8;
const MIN_BOARD_COLS: i32 = 8;

fn default_rows() -> i32 { 20 }
fn default_cols() -> i32 { 100 }
fn default_initial_mines() -> usize { 5 }
fn default_start_delay() -> u64 { 250 }
fn default_min_delay() -> u64 { 5 }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_leaderboard() -> String { "leaderboard.txt".into() }
fn default_max_attempts() -> u32 { 10_000 }
fn default_log_file() -> String { "roborescue.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            rows: default_rows(),
            cols: default_cols(),
            initial_mines: default_initial_mines(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            start_delay_ms: default_start_delay(),
            min_delay_ms: default_min_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            leaderboard: default_leaderboard(),
            seed: None,
            max_placement_attempts: default_max_attempts(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &data_dir())
    }

    /// Parse a config document. Relative paths resolve against `base`.
    #[cfg(test)]
    fn from_toml_str(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg, base))
    }

    fn from_toml(cfg: TomlConfig, base: &Path) -> Self {
        let mut rows = cfg.board.rows;
        let mut cols = cfg.board.cols;
        if rows < MIN_BOARD_ROWS || cols < MIN_BOARD_COLS {
            eprintln!("Warning: board {}x{} too small, using {}x{}",
                cols, rows, default_cols(), default_rows());
            rows = default_rows();
            cols = default_cols();
        }

        let initial_mines = cfg.board.initial_mines.min(MAX_MINES);

        let start_delay = Duration::from_millis(cfg.speed.start_delay_ms);
        let min_delay = Duration::from_millis(cfg.speed.min_delay_ms.min(cfg.speed.start_delay_ms));

        let log_level = cfg.general.log_level.parse::<LevelFilter>().unwrap_or_else(|_| {
            eprintln!("Warning: unknown log_level '{}', using info", cfg.general.log_level);
            LevelFilter::INFO
        });

        GameConfig {
            board: BoardConfig { rows, cols, initial_mines },
            speed: SpeedConfig { start_delay, min_delay },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                quit: cfg.gamepad.quit,
            },
            leaderboard_path: resolve(base, &cfg.general.leaderboard),
            log_path: resolve(base, &cfg.general.log_file),
            log_level,
            seed: cfg.general.seed,
            max_placement_attempts: cfg.general.max_placement_attempts,
        }
    }
}

fn resolve(base: &Path, s: &str) -> PathBuf {
    let p = PathBuf::from(s);
    if p.is_absolute() { p } else { base.join(p) }
}

/// Where the leaderboard and log live.
fn data_dir() -> PathBuf {
    // 1. Exe directory (local/portable installs), if writable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_roborescue");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/roborescue) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/roborescue");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/roborescue");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/roborescue");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before the logger exists and before raw mode, so warnings go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
