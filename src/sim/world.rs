/// GameWorld: the complete snapshot of a running game.
///
/// ## Phase machine
///
///   Loading → CharacterSelect → Playing ⇄ MovingForward → GameOver ⇄ Leaderboard
///                    ↑                                        │
///                    └──────────────── restart ───────────────┘
///
/// Playing and MovingForward are the two simulated phases (see `sim::step`);
/// every other phase only reacts to key presses in the shell.
///
/// ## Coordinates
///
/// Simulation runs in virtual pixels (800×600 screen, ground line at y=500).
/// The renderer owns the mapping to terminal cells; nothing here knows about
/// the terminal.

use crate::config::TuningConfig;
use crate::domain::entity::{
    ArrowButton, Brain, Character, Facing, Mushroom, SCREEN_H, SCREEN_W,
};
use crate::sim::leaderboard::Leaderboard;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Loading,
    CharacterSelect,
    Playing,
    MovingForward,
    GameOver,
    Leaderboard,
}

/// Rotating gameplay hints shown on the loading screen.
pub const LOADING_HINTS: [&str; 6] = [
    "Use the left/right arrows to move",
    "Press SPACE to attack",
    "Switch weapons with 1-4",
    "Clear every wave of mushrooms to advance",
    "Brains are worth 100 points",
    "After a hit you are invincible for 3 seconds",
];

/// Ticks between hint rotations.
pub const HINT_ROTATE_TICKS: u32 = 180;

/// Loading bar progress gained per tick (out of 100).
pub const LOADING_STEP: f32 = 0.5;

pub struct GameWorld {
    // ── Entities ──
    pub character: Option<Character>,
    pub mushrooms: Vec<Mushroom>,
    pub brains: Vec<Brain>,
    pub left_arrow: ArrowButton,
    pub right_arrow: ArrowButton,

    // ── Run tracking ──
    pub phase: Phase,
    pub score: u32,
    /// Waves spawned so far this run.
    pub wave: u32,
    /// Set when a wave has been cleared and the next one may spawn.
    pub wave_defeated: bool,
    /// Background scroll offset, grows during MovingForward.
    pub scroll: i32,
    pub player_name: String,
    pub tick: u64,

    // ── Loading screen ──
    pub loading_progress: f32,
    pub hint_index: usize,
    pub hint_timer: u32,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    // ── Tuning ──
    pub tuning: TuningConfig,

    // ── Persistence ──
    pub leaderboard: Leaderboard,
}

impl GameWorld {
    pub fn new(tuning: TuningConfig, leaderboard: Leaderboard) -> Self {
        let arrow_y = SCREEN_H / 2;
        GameWorld {
            character: None,
            mushrooms: vec![],
            brains: vec![],
            left_arrow: ArrowButton::new(50, arrow_y, Facing::Left),
            right_arrow: ArrowButton::new(SCREEN_W - 50, arrow_y, Facing::Right),
            phase: Phase::Loading,
            score: 0,
            wave: 0,
            wave_defeated: true,
            scroll: 0,
            player_name: String::new(),
            tick: 0,
            loading_progress: 0.0,
            hint_index: 0,
            hint_timer: 0,
            message: String::new(),
            message_timer: 0,
            tuning,
            leaderboard,
        }
    }

    /// Full run reset, preserving the tuning and the loaded leaderboard.
    /// Cached sprites live in the renderer and survive untouched.
    pub fn reset(&mut self) {
        let tuning = self.tuning.clone();
        let board = std::mem::take(&mut self.leaderboard);
        *self = GameWorld::new(tuning, board);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Mushrooms still standing: alive and not mid-fade.
    pub fn active_mushrooms(&self) -> usize {
        self.mushrooms.iter().filter(|m| m.is_active()).count()
    }

    /// Record the finished run on the leaderboard. Returns false when the
    /// write failed (the score for this run is lost, nothing else).
    pub fn record_score(&mut self) -> bool {
        let character = self
            .character
            .as_ref()
            .map(|c| c.kind.name())
            .unwrap_or("Unknown");
        let name = self.player_name.clone();
        match self.leaderboard.add(&name, self.score, character) {
            Ok(()) => true,
            Err(_) => {
                self.set_message("Could not save your score!", 90);
                false
            }
        }
    }
}
