mod member;
mod party;
mod song;

pub use member::*;
pub use party::*;
pub use song::*;
