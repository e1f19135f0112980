/// Entities: Body (shared sprite core), Character, Mushroom, Brain, ArrowButton.
/// State machines are minimal: mushrooms have 3 states plus a death fade.

use rand::Rng;

use super::weapon::{Weapon, ARSENAL};

// ── World geometry (virtual pixels, mapped to terminal cells by the renderer) ──

pub const SCREEN_W: i32 = 800;
pub const SCREEN_H: i32 = 600;
pub const GROUND_Y: i32 = 500;
/// Total scrollable background width. The run ends when the scroll offset
/// reaches `MAX_SCROLL - SCREEN_W`.
pub const MAX_SCROLL: i32 = 2400;

// ── Entity sizes ──

pub const CHARACTER_SIZE: (i32, i32) = (60, 90);
pub const MUSHROOM_SIZE: (i32, i32) = (50, 70);
pub const BIG_MUSHROOM_SIZE: (i32, i32) = (70, 100);
pub const BRAIN_SIZE: (i32, i32) = (40, 40);
pub const ARROW_SIZE: (i32, i32) = (50, 50);

// ── Combat windows ──

/// Length of a mushroom's attacking state, in ticks.
pub const ATTACK_WINDOW: u32 = 30;
/// The strike only connects while more than `ATTACK_WINDOW - ATTACK_ACTIVE_FRAMES`
/// ticks remain on the countdown.
pub const ATTACK_ACTIVE_FRAMES: u32 = 5;
/// Alpha lost per tick during the death fade.
pub const FADE_STEP: u8 = 15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// One frame of player input. Movement is continuous (held key), attack is
/// edge-triggered, weapon select is a held digit; all three can fire in one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<Facing>,
    pub attack: bool,
    pub weapon_select: Option<usize>,
}

// ── Body: the shared entity core ──

/// Position, size, sprite key, and transparency. `(x, y)` is the center,
/// matching the collision and render math throughout.
#[derive(Clone, Debug)]
pub struct Body {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub sprite: &'static str,
    pub alpha: u8,
}

impl Body {
    pub fn new(x: i32, y: i32, (w, h): (i32, i32), sprite: &'static str) -> Self {
        Body { x, y, w, h, sprite, alpha: 255 }
    }

    /// Center-rect overlap test.
    pub fn overlaps(&self, other: &Body) -> bool {
        (self.x - other.x).abs() * 2 < self.w + other.w
            && (self.y - other.y).abs() * 2 < self.h + other.h
    }

    /// Stand on the ground line (feet at GROUND_Y).
    pub fn pin_to_ground(&mut self) {
        self.y = GROUND_Y - self.h / 2;
    }
}

// ── Character ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Archetype {
    Elf,
    Witch,
    Warrior,
    Bard,
    Healer,
    Student,
}

pub const ARCHETYPES: [Archetype; 6] = [
    Archetype::Elf,
    Archetype::Witch,
    Archetype::Warrior,
    Archetype::Bard,
    Archetype::Healer,
    Archetype::Student,
];

impl Archetype {
    pub fn name(self) -> &'static str {
        match self {
            Archetype::Elf => "Elf",
            Archetype::Witch => "Witch",
            Archetype::Warrior => "Warrior",
            Archetype::Bard => "Bard",
            Archetype::Healer => "Healer",
            Archetype::Student => "Student",
        }
    }

    pub fn sprite_key(self) -> &'static str {
        match self {
            Archetype::Elf => "elf",
            Archetype::Witch => "witch",
            Archetype::Warrior => "warrior",
            Archetype::Bard => "bard",
            Archetype::Healer => "healer",
            Archetype::Student => "student",
        }
    }
}

/// Alpha toggles every this many ticks while invincible.
const BLINK_INTERVAL: u32 = 10;
const MAX_HEALTH: i32 = 5;

#[derive(Clone, Debug)]
pub struct Character {
    pub body: Body,
    pub kind: Archetype,
    pub speed: i32,
    pub max_health: i32,
    pub health: i32,
    pub facing: Facing,
    pub current_weapon: usize,
    pub attack_cooldown: u32,
    pub invincible_timer: u32,
    blink_timer: u32,
}

impl Character {
    pub fn new(x: i32, kind: Archetype, speed: i32) -> Self {
        let mut body = Body::new(x, 0, CHARACTER_SIZE, kind.sprite_key());
        body.pin_to_ground();
        Character {
            body,
            kind,
            speed,
            max_health: MAX_HEALTH,
            health: MAX_HEALTH,
            facing: Facing::Right,
            current_weapon: 0,
            attack_cooldown: 0,
            invincible_timer: 0,
            blink_timer: 0,
        }
    }

    pub fn weapon(&self) -> &'static Weapon {
        &ARSENAL[self.current_weapon]
    }

    /// Swing the active weapon. Only usable at cooldown 0; arms the cooldown
    /// and returns the weapon whose damage/range apply to this swing.
    pub fn attack(&mut self) -> Option<&'static Weapon> {
        if self.attack_cooldown > 0 {
            return None;
        }
        let weapon = self.weapon();
        self.attack_cooldown = weapon.cooldown;
        Some(weapon)
    }

    /// Take one point of damage. Ignored (returns false) while invincible;
    /// otherwise decrements health and arms the invincibility timer.
    pub fn take_damage(&mut self, invincible_ticks: u32) -> bool {
        if self.invincible_timer > 0 {
            return false;
        }
        self.health -= 1;
        self.invincible_timer = invincible_ticks;
        self.blink_timer = 0;
        true
    }

    /// Advance cooldown and invincibility countdowns; drives the alpha blink.
    pub fn tick_timers(&mut self) {
        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }
        if self.invincible_timer > 0 {
            self.invincible_timer -= 1;
            self.blink_timer += 1;
            if self.blink_timer % BLINK_INTERVAL == 0 {
                self.body.alpha = if self.body.alpha == 255 { 128 } else { 255 };
            }
        } else {
            self.body.alpha = 255;
        }
    }
}

// ── Mushroom ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MushroomState {
    Idle,
    Moving,
    Attacking,
}

#[derive(Clone, Debug)]
pub struct Mushroom {
    pub body: Body,
    pub is_big: bool,
    pub health: i32,
    pub points: u32,
    pub drop_chance: f64,
    pub speed: i32,
    pub state: MushroomState,
    pub state_timer: u32,
    /// Remaining death-fade ticks; 0 when alive or fully faded.
    pub death_timer: u32,
}

impl Mushroom {
    pub fn new(x: i32, is_big: bool, speed: i32) -> Self {
        let (size, sprite, health, points, drop_chance) = if is_big {
            (BIG_MUSHROOM_SIZE, "big_mushroom", 4, 10, 0.3)
        } else {
            (MUSHROOM_SIZE, "small_mushroom", 2, 5, 0.0)
        };
        let mut body = Body::new(x, 0, size, sprite);
        body.pin_to_ground();
        Mushroom {
            body,
            is_big,
            health,
            points,
            drop_chance,
            speed,
            state: MushroomState::Idle,
            state_timer: 0,
            death_timer: 0,
        }
    }

    /// Apply weapon damage. Returns (destroyed, dropped_pickup).
    /// A kill starts the death fade; only big variants roll for a drop.
    pub fn take_damage(&mut self, damage: i32, fade_ticks: u32, rng: &mut impl Rng) -> (bool, bool) {
        if !self.is_active() {
            return (false, false);
        }
        self.health -= damage;
        if self.health <= 0 {
            self.death_timer = fade_ticks;
            let drop = self.is_big && rng.gen_bool(self.drop_chance);
            return (true, drop);
        }
        (false, false)
    }

    /// Alive and not mid-fade: still counts toward the wave.
    pub fn is_active(&self) -> bool {
        self.health > 0 && self.death_timer == 0
    }

    /// Damage-capable window: the opening ticks of the attacking state.
    pub fn is_attacking(&self) -> bool {
        self.state == MushroomState::Attacking
            && self.state_timer > ATTACK_WINDOW - ATTACK_ACTIVE_FRAMES
    }

    /// Removable: the death fade ran its full course and nothing is left to draw.
    pub fn is_dead(&self) -> bool {
        self.health <= 0 && self.death_timer == 0 && self.body.alpha == 0
    }
}

// ── Brain (pickup) ──

#[derive(Clone, Debug)]
pub struct Brain {
    pub body: Body,
    pub lifetime: u32,
}

impl Brain {
    pub fn new(x: i32, y: i32, lifetime: u32) -> Self {
        Brain { body: Body::new(x, y, BRAIN_SIZE, "brain"), lifetime }
    }

    /// Advance one tick. Returns true when the pickup has expired.
    pub fn tick(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}

// ── ArrowButton (decorative input indicator) ──

#[derive(Clone, Debug)]
pub struct ArrowButton {
    pub body: Body,
    pub facing: Facing,
    pub pressed: bool,
}

impl ArrowButton {
    pub fn new(x: i32, y: i32, facing: Facing) -> Self {
        ArrowButton { body: Body::new(x, y, ARROW_SIZE, "arrow"), facing, pressed: false }
    }
}
