// Built-in behaviours and input sources

pub mod hud;
pub mod input;

pub use hud::{Location, ViewObject};
pub use input::{
    ChannelInput, InputBackend, InputManager, KeyCode, ScriptedInput, MAX_KEYS_PER_FRAME,
};
