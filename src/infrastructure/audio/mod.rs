mod driver;
mod scripted_driver;
mod simulated_driver;

pub use driver::*;
pub use scripted_driver::{AudioCall, ScriptedAudioDriver};
pub use simulated_driver::SimulatedAudioDriver;
