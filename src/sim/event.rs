/// Events emitted during a simulation step.
/// The shell consumes these for transient HUD messages.

#[derive(Clone, Debug)]
pub enum GameEvent {
    WaveSpawned { size: usize },
    WaveCleared { wave: u32 },
    MushroomSlain { points: u32 },
    BrainDropped { x: i32, y: i32 },
    BrainPicked { bonus: u32 },
    CharacterHurt { health_left: i32 },
    RunFailed,
    RunCompleted,
    ScoreRecorded,
}
