/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: TuningConfig,
    pub assets_dir: PathBuf,
    pub leaderboard_file: String,
}

#[derive(Clone, Debug)]
pub struct TuningConfig {
    pub tick_rate_ms: u64,
    pub character_speed: i32,
    pub mushroom_speed: i32,
    pub invincible_ticks: u32,     // mercy window after a hit
    pub death_fade_ticks: u32,     // enemy fade-out length
    pub brain_lifetime_ticks: u32, // pickup despawn
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_character_speed")]
    character_speed: i32,
    #[serde(default = "default_mushroom_speed")]
    mushroom_speed: i32,
    #[serde(default = "default_invincible")]
    invincible_ticks: u32,
    #[serde(default = "default_death_fade")]
    death_fade_ticks: u32,
    #[serde(default = "default_brain_lifetime")]
    brain_lifetime_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_leaderboard_file")]
    leaderboard_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }         // ~60 fps
fn default_character_speed() -> i32 { 5 }
fn default_mushroom_speed() -> i32 { 2 }
fn default_invincible() -> u32 { 180 }       // 3 s at the default tick rate
fn default_death_fade() -> u32 { 20 }
fn default_brain_lifetime() -> u32 { 180 }

fn default_assets_dir() -> String { "assets".into() }
fn default_leaderboard_file() -> String { "leaderboard.json".into() }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            tick_rate_ms: default_tick_rate(),
            character_speed: default_character_speed(),
            mushroom_speed: default_mushroom_speed(),
            invincible_ticks: default_invincible(),
            death_fade_ticks: default_death_fade(),
            brain_lifetime_ticks: default_brain_lifetime(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            assets_dir: default_assets_dir(),
            leaderboard_file: default_leaderboard_file(),
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        let t = TomlTuning::default();
        TuningConfig {
            tick_rate_ms: t.tick_rate_ms,
            character_speed: t.character_speed,
            mushroom_speed: t.mushroom_speed,
            invincible_ticks: t.invincible_ticks,
            death_fade_ticks: t.death_fade_ticks,
            brain_lifetime_ticks: t.brain_lifetime_ticks,
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

        // Resolve the assets directory the same way: first match wins.
        let assets_str = &toml_cfg.general.assets_dir;
        let assets_dir = if PathBuf::from(assets_str).is_absolute() {
            PathBuf::from(assets_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(assets_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(assets_str))
        };

        GameConfig {
            tuning: TuningConfig {
                tick_rate_ms: toml_cfg.tuning.tick_rate_ms,
                character_speed: toml_cfg.tuning.character_speed,
                mushroom_speed: toml_cfg.tuning.mushroom_speed,
                invincible_ticks: toml_cfg.tuning.invincible_ticks,
                death_fade_ticks: toml_cfg.tuning.death_fade_ticks,
                brain_lifetime_ticks: toml_cfg.tuning.brain_lifetime_ticks,
            },
            assets_dir,
            leaderboard_file: toml_cfg.general.leaderboard_file,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a packaged binary still finds data next to
        // the real executable.
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
        let xdg = PathBuf::from(&home).join(".local/share/sporefall");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/sporefall");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
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
