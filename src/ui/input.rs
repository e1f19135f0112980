/// Input state tracker.
///
/// Distinguishes held keys (continuous movement, weapon digits) from fresh
/// presses (attack, menu actions). Terminals that report key Release events
/// get exact holds; the rest fall back to a repeat timeout — a key counts
/// as held until it stops auto-repeating.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::domain::entity::Facing;

/// After this long without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of the last Press/Repeat for each key.
    held_since: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held_since: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the tick.
    pub fn drain_events(&mut self) {
        self.fresh.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                _ => continue,
            };

            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.ctrl_c = true;
            }

            match key.kind {
                KeyEventKind::Release => {
                    self.held_since.remove(&key.code);
                }
                _ => {
                    let was_held = self.held(key.code);
                    self.held_since.insert(key.code, Instant::now());
                    if !was_held {
                        self.fresh.push(key.code);
                    }
                }
            }
        }

        // Expire keys that stopped repeating (terminals without Release events).
        let now = Instant::now();
        self.held_since.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held? Used for continuous actions.
    pub fn held(&self, code: KeyCode) -> bool {
        self.held_since
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? Used for one-shot actions.
    pub fn pressed(&self, code: KeyCode) -> bool {
        self.fresh.contains(&code)
    }

    /// Did any key at all go down this frame?
    pub fn any_pressed(&self) -> bool {
        !self.fresh.is_empty()
    }

    pub fn ctrl_c(&self) -> bool {
        self.ctrl_c
    }

    // ── Game-specific readings ──

    /// Held movement direction; left wins a tie, matching the render order
    /// of the arrow indicators.
    pub fn movement(&self) -> Option<Facing> {
        if self.held(KeyCode::Left) {
            Some(Facing::Left)
        } else if self.held(KeyCode::Right) {
            Some(Facing::Right)
        } else {
            None
        }
    }

    /// Held weapon digit 1–4, as a slot index.
    pub fn weapon_digit(&self) -> Option<usize> {
        for (i, c) in ['1', '2', '3', '4'].iter().enumerate() {
            if self.held(KeyCode::Char(*c)) {
                return Some(i);
            }
        }
        None
    }

    /// Freshly pressed digit 1–6, as an archetype index.
    pub fn archetype_digit(&self) -> Option<usize> {
        for (i, c) in ['1', '2', '3', '4', '5', '6'].iter().enumerate() {
            if self.pressed(KeyCode::Char(*c)) {
                return Some(i);
            }
        }
        None
    }
}
