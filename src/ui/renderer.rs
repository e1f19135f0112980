/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (an array of Cell)
///   2. Compare each cell with `back` (the previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. Batch everything with `queue!`, flush once, swap buffers
///
/// The simulation's 800×600 virtual-pixel world maps onto a fixed 100×30
/// cell view, centered in the terminal. Entity alpha is rendered by
/// blending sprite colors toward the base background.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Body, Facing, GROUND_Y, SCREEN_H, SCREEN_W};
use crate::sim::leaderboard::ScoreEntry;
use crate::sim::world::{GameWorld, Phase, LOADING_HINTS};
use super::assets::{Sprite, SpriteStore};

// ── Virtual view ──

const VIEW_COLS: usize = 100;
const VIEW_ROWS: usize = 30;
const SCALE_X: i32 = SCREEN_W / VIEW_COLS as i32; // 8 px per column
const SCALE_Y: i32 = SCREEN_H / VIEW_ROWS as i32; // 20 px per row
const GROUND_ROW: usize = (GROUND_Y / SCALE_Y) as usize;

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 16, g: 20, b: 24 };
const WHITE: Color = Color::Rgb { r: 235, g: 235, b: 235 };
const YELLOW: Color = Color::Rgb { r: 240, g: 210, b: 80 };
const GRAY: Color = Color::Rgb { r: 130, g: 130, b: 130 };

const FOREST_SKY: Color = Color::Rgb { r: 24, g: 44, b: 30 };
const FOREST_TREE: Color = Color::Rgb { r: 40, g: 90, b: 48 };
const FOREST_GROUND: Color = Color::Rgb { r: 28, g: 24, b: 20 };
const LOADING_BG: Color = Color::Rgb { r: 52, g: 18, b: 56 };
const BOARD_BG: Color = Color::Rgb { r: 18, g: 26, b: 58 };
const MENU_GROUND: Color = Color::Rgb { r: 55, g: 55, b: 55 };
const OVERLAY_BG: Color = Color::Rgb { r: 10, g: 10, b: 12 };

const CHARACTER_COLOR: Color = Color::Rgb { r: 240, g: 220, b: 150 };
const MUSHROOM_COLOR: Color = Color::Rgb { r: 205, g: 92, b: 92 };
const BIG_MUSHROOM_COLOR: Color = Color::Rgb { r: 225, g: 70, b: 150 };
const BRAIN_COLOR: Color = Color::Rgb { r: 240, g: 150, b: 190 };
const WEAPON_COLOR: Color = Color::Rgb { r: 180, g: 190, b: 210 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: WHITE, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets diff'd on the next flush.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }
}

// ── Color helpers ──

fn rgb(c: Color) -> (u8, u8, u8) {
    match c {
        Color::Rgb { r, g, b } => (r, g, b),
        _ => (255, 255, 255),
    }
}

/// Blend a color toward the backdrop by entity alpha (255 = opaque).
fn dim(color: Color, alpha: u8, backdrop: Color) -> Color {
    let (r, g, b) = rgb(color);
    let (br, bg_, bb) = rgb(backdrop);
    let a = alpha as u32;
    let blend = |c: u8, base: u8| ((c as u32 * a + base as u32 * (255 - a)) / 255) as u8;
    Color::Rgb { r: blend(r, br), g: blend(g, bg_), b: blend(b, bb) }
}

/// Cheap column hash for the procedural forest backdrop.
fn column_hash(n: i32) -> u32 {
    (n as u32).wrapping_mul(2654435761)
}

// ── Sprite drawing (free functions keep the borrows simple) ──

struct View {
    origin_x: usize,
    origin_y: usize,
}

impl View {
    fn set(&self, fb: &mut FrameBuffer, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x >= VIEW_COLS as i32 || y >= VIEW_ROWS as i32 {
            return;
        }
        fb.set(self.origin_x + x as usize, self.origin_y + y as usize, cell);
    }

    fn put_str(&self, fb: &mut FrameBuffer, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(fb, x + i as i32, y, Cell { ch, fg, bg });
        }
    }

    fn center_str(&self, fb: &mut FrameBuffer, y: i32, s: &str, fg: Color, bg: Color) {
        let x = (VIEW_COLS as i32 - s.chars().count() as i32) / 2;
        self.put_str(fb, x, y, s, fg, bg);
    }

    fn fill_rows(&self, fb: &mut FrameBuffer, rows: std::ops::Range<usize>, bg: Color) {
        for y in rows {
            for x in 0..VIEW_COLS {
                self.set(fb, x as i32, y as i32, Cell { ch: ' ', fg: WHITE, bg });
            }
        }
    }
}

/// Blit a sprite centered on the body's world position, alpha-blended.
/// Fully transparent bodies draw nothing.
fn draw_sprite(fb: &mut FrameBuffer, view: &View, sprite: &Sprite, body: &Body) {
    if body.alpha == 0 {
        return;
    }
    let col0 = body.x / SCALE_X - sprite.width() as i32 / 2;
    let row0 = body.y / SCALE_Y - sprite.height() as i32 / 2;
    for (dy, row) in sprite.rows.iter().enumerate() {
        for (dx, &ch) in row.iter().enumerate() {
            if ch == ' ' {
                continue;
            }
            let x = col0 + dx as i32;
            let y = row0 + dy as i32;
            let bg = fb_bg(fb, view, x, y);
            let fg = dim(sprite.color, body.alpha, bg);
            view.set(fb, x, y, Cell { ch, fg, bg });
        }
    }
}

/// Background color already composed at a view position (for blending).
fn fb_bg(fb: &FrameBuffer, view: &View, x: i32, y: i32) -> Color {
    if x < 0 || y < 0 {
        return BASE_BG;
    }
    fb.get(view.origin_x + x as usize, view.origin_y + y as usize).bg
}

/// Placeholder cell size for an entity with no art: its nominal world size.
fn cells_for(body: &Body) -> (usize, usize) {
    (
        (body.w / SCALE_X).max(1) as usize,
        (body.h / SCALE_Y).max(1) as usize,
    )
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    sprites: SpriteStore,
    // Backgrounds load once at startup and survive restarts.
    forest_bg: Option<Sprite>,
    loading_bg: Option<Sprite>,
    board_bg: Option<Sprite>,
}

impl Renderer {
    pub fn new(assets_dir: &Path) -> Self {
        let mut sprites = SpriteStore::new(assets_dir);
        let forest_bg = sprites.try_get("forest", FOREST_TREE).cloned();
        let loading_bg = sprites.try_get("loading", LOADING_BG).cloned();
        let board_bg = sprites.try_get("leaderboard", BOARD_BG).cloned();
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            sprites,
            forest_bg,
            loading_bg,
            board_bg,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((100, 30));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force a full repaint on the first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &GameWorld) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((100, 30));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        let view = View {
            origin_x: self.term_w.saturating_sub(VIEW_COLS) / 2,
            origin_y: self.term_h.saturating_sub(VIEW_ROWS) / 2,
        };

        self.front.clear();
        match world.phase {
            Phase::Loading => self.compose_loading(&view, world),
            Phase::CharacterSelect => self.compose_character_select(&view, world),
            Phase::Playing | Phase::MovingForward => self.compose_game(&view, world),
            Phase::GameOver => self.compose_game_over(&view, world),
            Phase::Leaderboard => self.compose_leaderboard(&view, world),
        }
        self.compose_message(&view, world);

        self.flush_diff()
    }

    // ── Screens ──

    fn compose_loading(&mut self, view: &View, world: &GameWorld) {
        match &self.loading_bg {
            Some(bg) => draw_backdrop(&mut self.front, view, bg, 0),
            None => {
                view.fill_rows(&mut self.front, 0..GROUND_ROW + 1, LOADING_BG);
                view.fill_rows(&mut self.front, GROUND_ROW + 1..VIEW_ROWS, MENU_GROUND);
            }
        }

        let gy = GROUND_ROW as i32;
        view.center_str(&mut self.front, gy - 4, "Loading...", WHITE, LOADING_BG);

        let progress = world.loading_progress.min(100.0);
        let width = 32usize;
        let filled = (progress / 100.0 * width as f32) as usize;
        let mut bar = String::with_capacity(width + 2);
        bar.push('[');
        for i in 0..width {
            bar.push(if i < filled { '#' } else { ' ' });
        }
        bar.push(']');
        view.center_str(&mut self.front, gy - 2, &bar, YELLOW, LOADING_BG);
        view.center_str(&mut self.front, gy, &format!("{progress:.0}%"), WHITE, LOADING_BG);

        let hint = LOADING_HINTS[world.hint_index % LOADING_HINTS.len()];
        view.center_str(&mut self.front, gy + 2, hint, GRAY, MENU_GROUND);
    }

    fn compose_character_select(&mut self, view: &View, world: &GameWorld) {
        self.compose_backdrop(view, world.scroll);
        view.fill_rows(&mut self.front, GROUND_ROW + 1..VIEW_ROWS, MENU_GROUND);

        view.center_str(&mut self.front, 3, "Choose your character", WHITE, FOREST_SKY);
        for (i, kind) in crate::domain::entity::ARCHETYPES.iter().enumerate() {
            let line = format!("{}. {}", i + 1, kind.name());
            view.center_str(&mut self.front, 6 + 2 * i as i32, &line, YELLOW, FOREST_SKY);
        }
        view.center_str(
            &mut self.front,
            VIEW_ROWS as i32 - 2,
            "Press 1-6 to choose",
            GRAY,
            MENU_GROUND,
        );
    }

    fn compose_game(&mut self, view: &View, world: &GameWorld) {
        self.compose_backdrop(view, world.scroll);

        for brain in &world.brains {
            let sprite = self.sprites.get(brain.body.sprite, cells_for(&brain.body), BRAIN_COLOR);
            draw_sprite(&mut self.front, view, sprite, &brain.body);
        }

        for m in &world.mushrooms {
            let color = if m.is_big { BIG_MUSHROOM_COLOR } else { MUSHROOM_COLOR };
            let sprite = self.sprites.get(m.body.sprite, cells_for(&m.body), color);
            draw_sprite(&mut self.front, view, sprite, &m.body);
        }

        if let Some(c) = &world.character {
            let sprite = self.sprites.get(c.body.sprite, cells_for(&c.body), CHARACTER_COLOR);
            draw_sprite(&mut self.front, view, sprite, &c.body);

            // Held weapon beside the character
            let weapon = c.weapon();
            let mut held = Body::new(c.body.x + c.facing.sign() * 40, c.body.y - 20, (16, 20), weapon.sprite);
            held.alpha = c.body.alpha;
            let sprite = self.sprites.get(weapon.sprite, (2, 1), WEAPON_COLOR);
            draw_sprite(&mut self.front, view, sprite, &held);

            // Strike flash for the opening ticks of a swing
            if c.attack_cooldown > weapon.cooldown.saturating_sub(10) {
                let fx = (c.body.x + c.facing.sign() * weapon.range) / SCALE_X;
                let fy = c.body.y / SCALE_Y;
                let bg = fb_bg(&self.front, view, fx, fy);
                view.set(&mut self.front, fx, fy, Cell { ch: '✦', fg: WHITE, bg });
            }
        }

        self.compose_arrows(view, world);
        self.compose_hud(view, world);
    }

    fn compose_arrows(&mut self, view: &View, world: &GameWorld) {
        for arrow in [&world.left_arrow, &world.right_arrow] {
            let ch = match arrow.facing {
                Facing::Left => '◀',
                Facing::Right => '▶',
            };
            let fg = if arrow.pressed { WHITE } else { GRAY };
            let x = arrow.body.x / SCALE_X;
            let y = arrow.body.y / SCALE_Y;
            let bg = fb_bg(&self.front, view, x, y);
            view.set(&mut self.front, x, y, Cell { ch, fg, bg });
        }
    }

    fn compose_hud(&mut self, view: &View, world: &GameWorld) {
        let health = world.character.as_ref().map(|c| c.health).unwrap_or(0);
        let status = format!(
            "Score: {}   Health: {}   Wave: {}",
            world.score, health, world.wave
        );
        view.put_str(&mut self.front, 1, 0, &status, WHITE, FOREST_SKY);

        if let Some(c) = &world.character {
            let w = c.weapon();
            let line = format!("{} (dmg {}, range {})", w.name, w.damage, w.range);
            view.center_str(&mut self.front, 1, &line, GRAY, FOREST_SKY);
        }

        view.center_str(
            &mut self.front,
            VIEW_ROWS as i32 - 1,
            "1-4 switch weapon   SPACE attack   ESC give up",
            GRAY,
            FOREST_GROUND,
        );
    }

    fn compose_game_over(&mut self, view: &View, world: &GameWorld) {
        view.fill_rows(&mut self.front, 0..VIEW_ROWS, OVERLAY_BG);

        let survived = world.character.as_ref().map_or(false, |c| c.health > 0);
        let headline = if survived { "Victory!" } else { "Game over!" };
        let mid = VIEW_ROWS as i32 / 2;

        view.center_str(&mut self.front, mid - 3, headline, WHITE, OVERLAY_BG);
        view.center_str(
            &mut self.front,
            mid - 1,
            &format!("Your score: {}", world.score),
            YELLOW,
            OVERLAY_BG,
        );
        view.center_str(&mut self.front, mid + 2, "Press ENTER to restart", GRAY, OVERLAY_BG);
        view.center_str(&mut self.front, mid + 3, "Press L for the leaderboard", GRAY, OVERLAY_BG);
        view.center_str(&mut self.front, mid + 4, "Press Q to quit", GRAY, OVERLAY_BG);
    }

    fn compose_leaderboard(&mut self, view: &View, world: &GameWorld) {
        match &self.board_bg {
            Some(bg) => draw_backdrop(&mut self.front, view, bg, 0),
            None => view.fill_rows(&mut self.front, 0..VIEW_ROWS, BOARD_BG),
        }

        view.center_str(&mut self.front, 3, "Leaderboard", WHITE, BOARD_BG);

        let entries: &[ScoreEntry] = &world.leaderboard.entries;
        if entries.is_empty() {
            view.center_str(&mut self.front, 6, "No scores yet", GRAY, BOARD_BG);
        } else {
            for (i, e) in entries.iter().enumerate() {
                let line = format!("{}. {} ({}): {}", i + 1, e.name, e.character, e.score);
                view.center_str(&mut self.front, 6 + 2 * i as i32, &line, YELLOW, BOARD_BG);
            }
        }

        view.center_str(
            &mut self.front,
            VIEW_ROWS as i32 - 2,
            "Press ESC to go back",
            GRAY,
            BOARD_BG,
        );
    }

    fn compose_message(&mut self, view: &View, world: &GameWorld) {
        if world.message_timer == 0 || world.message.is_empty() {
            return;
        }
        let y = 2;
        let x = (VIEW_COLS as i32 - world.message.chars().count() as i32) / 2;
        for (i, ch) in world.message.chars().enumerate() {
            let cx = x + i as i32;
            let bg = fb_bg(&self.front, view, cx, y);
            view.set(&mut self.front, cx, y, Cell { ch, fg: YELLOW, bg });
        }
    }

    // ── Backdrop ──

    /// Scrolling forest: art file when present, procedural strip otherwise.
    fn compose_backdrop(&mut self, view: &View, scroll: i32) {
        if let Some(bg) = &self.forest_bg {
            draw_backdrop(&mut self.front, view, bg, scroll / SCALE_X);
            return;
        }

        view.fill_rows(&mut self.front, 0..GROUND_ROW + 1, FOREST_SKY);
        view.fill_rows(&mut self.front, GROUND_ROW + 1..VIEW_ROWS, FOREST_GROUND);

        // Sparse tree line, anchored to world columns so it scrolls.
        for col in 0..VIEW_COLS as i32 {
            let wcol = col + scroll / SCALE_X;
            let h = column_hash(wcol);
            if h % 7 == 0 {
                let height = 2 + (h >> 8) % 3;
                for dy in 0..height {
                    let y = GROUND_ROW as i32 - dy as i32;
                    view.set(&mut self.front, col, y, Cell { ch: '♠', fg: FOREST_TREE, bg: FOREST_SKY });
                }
            }
        }
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg: Option<Color> = None;
        let mut last_bg: Option<Color> = None;
        let mut cursor_at: Option<(usize, usize)> = None;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

/// Blit a wide background sprite with a horizontal column offset.
fn draw_backdrop(fb: &mut FrameBuffer, view: &View, bg: &Sprite, col_offset: i32) {
    for y in 0..VIEW_ROWS {
        let row = bg.rows.get(y);
        for x in 0..VIEW_COLS {
            let src = (x as i32 + col_offset).max(0) as usize;
            let ch = row.and_then(|r| r.get(src)).copied().unwrap_or(' ');
            let cell = if ch == ' ' {
                Cell { ch: ' ', fg: WHITE, bg: BASE_BG }
            } else {
                Cell { ch, fg: bg.color, bg: BASE_BG }
            };
            view.set(fb, x as i32, y as i32, cell);
        }
    }
}
