mod party_code;
mod playback;

pub use party_code::*;
pub use playback::*;
