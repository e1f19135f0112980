/// High-score persistence — a flat JSON array, best score first, top 10.
///
/// ## File format
///   `[{"name": "...", "score": 123, "character": "Elf"}, ...]`
///
/// ## Failure policy
///   Missing file  → start empty and write a fresh empty file.
///   Corrupt file  → start empty (the file is replaced on the next save).
///   Failed write  → the score of that run is lost, nothing else; the
///                   caller surfaces a transient message.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub character: String,
}

#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    path: PathBuf,
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Load the table from disk, tolerating absence and corruption.
    pub fn load(path: PathBuf) -> Self {
        if !path.exists() {
            let board = Leaderboard { path, entries: vec![] };
            let _ = board.save(); // best effort: a fresh empty file
            return board;
        }
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<Vec<ScoreEntry>>(&text).ok())
            .unwrap_or_default();
        Leaderboard { path, entries }
    }

    /// Record a finished run. Keeps the list sorted best-first and capped
    /// at MAX_ENTRIES, then rewrites the whole file.
    pub fn add(&mut self, name: &str, score: u32, character: &str) -> Result<(), String> {
        let name = if name.is_empty() { "Unknown" } else { name };
        self.entries.push(ScoreEntry {
            name: name.to_string(),
            score,
            character: character.to_string(),
        });
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
        self.save()
    }

    fn save(&self) -> Result<(), String> {
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Leaderboard encode failed: {e}"))?;
        std::fs::write(&self.path, text)
            .map_err(|e| format!("Leaderboard write failed: {e}"))
    }
}

// ── Path resolution ──

/// Resolve the on-disk location for a leaderboard file name.
/// Absolute names are used as-is. Otherwise: the executable's directory if
/// writable (portable installs), then XDG data home, then the CWD.
pub fn resolve_path(file_name: &str) -> PathBuf {
    let name = Path::new(file_name);
    if name.is_absolute() {
        return name.to_path_buf();
    }
    data_dir().join(file_name)
}

fn data_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs (/usr/games/...) won't be writable
            let probe = parent.join(".write_test_sporefall");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/sporefall");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_starts_empty_and_writes_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaderboard.json");

        let board = Leaderboard::load(path.clone());
        assert!(board.entries.is_empty());
        assert_eq!(std::fs::read_to_string(&path).expect("fresh file").trim(), "[]");
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaderboard.json");
        std::fs::write(&path, "{ not json ]").expect("write");

        let board = Leaderboard::load(path);
        assert!(board.entries.is_empty());
    }

    #[test]
    fn add_keeps_descending_order_and_cap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut board = Leaderboard::load(dir.path().join("leaderboard.json"));

        for score in [30, 120, 5, 80, 80, 200, 1, 15, 64, 99, 42, 7] {
            board.add("player", score, "Witch").expect("save");
            assert!(board.entries.len() <= MAX_ENTRIES);
            assert!(board
                .entries
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score));
        }
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries[0].score, 200);
        // The two lowest scores fell off the table.
        assert!(board.entries.iter().all(|e| e.score > 5));
    }

    #[test]
    fn blank_name_becomes_unknown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut board = Leaderboard::load(dir.path().join("leaderboard.json"));
        board.add("", 10, "Elf").expect("save");
        assert_eq!(board.entries[0].name, "Unknown");
    }

    #[test]
    fn table_survives_a_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leaderboard.json");

        let mut board = Leaderboard::load(path.clone());
        board.add("runa", 77, "Healer").expect("save");
        board.add("iris", 140, "Bard").expect("save");

        let reloaded = Leaderboard::load(path);
        assert_eq!(reloaded.entries, board.entries);
        assert_eq!(reloaded.entries[0].name, "iris");
    }
}
