pub mod commands;
mod props;
pub mod session;

pub use commands::{
    ArrayAction, Command, CommandError, MoveEntry, PriorValue, RemovedControl,
};
pub use session::EditorSession;
