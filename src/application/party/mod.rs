mod create_party;
mod join_party;
mod leave_party;

pub use create_party::*;
pub use join_party::*;
pub use leave_party::*;
