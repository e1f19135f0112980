/// The fixed four-slot arsenal. Damage, reach, and cooldown scale together:
/// slower weapons hit harder and further.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weapon {
    pub name: &'static str,
    pub damage: i32,
    pub range: i32,
    pub cooldown: u32,
    pub sprite: &'static str,
}

pub static ARSENAL: [Weapon; 4] = [
    Weapon { name: "Ballpoint Pen", damage: 1, range: 60, cooldown: 20, sprite: "pen" },
    Weapon { name: "Utility Knife", damage: 2, range: 70, cooldown: 30, sprite: "knife" },
    Weapon { name: "Broom", damage: 3, range: 80, cooldown: 40, sprite: "broom" },
    Weapon { name: "Sword", damage: 4, range: 90, cooldown: 50, sprite: "sword" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arsenal_scales_monotonically() {
        for pair in ARSENAL.windows(2) {
            assert!(pair[0].damage < pair[1].damage);
            assert!(pair[0].range < pair[1].range);
            assert!(pair[0].cooldown < pair[1].cooldown);
        }
    }
}
