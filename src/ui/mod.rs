pub mod assets;
pub mod input;
pub mod renderer;
