/// Sprite store: text-art sprites loaded by naming convention, with a
/// solid-rectangle fallback when a file is missing or unreadable.
///
/// A sprite named `elf` lives at `<assets_dir>/elf.txt`: plain text, one
/// row per line, spaces transparent. Backgrounds are just very wide
/// sprites. Missing art is never fatal — entities render as colored
/// blocks of their nominal size instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::style::Color;

#[derive(Clone, Debug)]
pub struct Sprite {
    pub rows: Vec<Vec<char>>,
    pub color: Color,
}

impl Sprite {
    pub fn from_text(text: &str, color: Color) -> Self {
        let rows = text
            .lines()
            .map(|line| line.chars().collect())
            .collect::<Vec<Vec<char>>>();
        Sprite { rows, color }
    }

    /// Fallback: a filled rectangle of the given cell size.
    pub fn solid(w: usize, h: usize, color: Color) -> Self {
        Sprite {
            rows: vec![vec!['█'; w.max(1)]; h.max(1)],
            color,
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

pub struct SpriteStore {
    dir: PathBuf,
    cache: HashMap<String, Sprite>,
}

impl SpriteStore {
    pub fn new(dir: &Path) -> Self {
        SpriteStore {
            dir: dir.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    /// Fetch a sprite by key, loading it on first use. `fallback_cells`
    /// sizes the placeholder rectangle when no art file exists.
    pub fn get(&mut self, key: &str, fallback_cells: (usize, usize), color: Color) -> &Sprite {
        let dir = &self.dir;
        self.cache.entry(key.to_owned()).or_insert_with(|| {
            load_sprite_file(dir, key, color)
                .unwrap_or_else(|| Sprite::solid(fallback_cells.0, fallback_cells.1, color))
        })
    }

    /// Fetch optional art (backgrounds): None when no file exists, so the
    /// caller can paint a procedural backdrop instead.
    pub fn try_get(&mut self, key: &str, color: Color) -> Option<&Sprite> {
        if !self.cache.contains_key(key) {
            let sprite = load_sprite_file(&self.dir, key, color)?;
            self.cache.insert(key.to_owned(), sprite);
        }
        self.cache.get(key)
    }
}

fn load_sprite_file(dir: &Path, key: &str, color: Color) -> Option<Sprite> {
    let path = dir.join(format!("{key}.txt"));
    let text = std::fs::read_to_string(path).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(Sprite::from_text(&text, color))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::Rgb { r: 255, g: 255, b: 255 };

    #[test]
    fn missing_art_falls_back_to_rectangle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SpriteStore::new(dir.path());

        let sprite = store.get("elf", (7, 4), WHITE);
        assert_eq!(sprite.width(), 7);
        assert_eq!(sprite.height(), 4);
        assert!(sprite.rows.iter().all(|r| r.iter().all(|&c| c == '█')));
    }

    #[test]
    fn art_file_wins_over_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("brain.txt"), " __ \n(@@)\n").expect("write");
        let mut store = SpriteStore::new(dir.path());

        let sprite = store.get("brain", (5, 2), WHITE);
        assert_eq!(sprite.height(), 2);
        assert_eq!(sprite.rows[1], vec!['(', '@', '@', ')']);
    }

    #[test]
    fn backgrounds_are_optional() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SpriteStore::new(dir.path());
        assert!(store.try_get("forest", WHITE).is_none());

        std::fs::write(dir.path().join("forest.txt"), "♣ ♣ ♣\n").expect("write");
        assert!(store.try_get("forest", WHITE).is_some());
    }
}
