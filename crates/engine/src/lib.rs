// ghostwrite-engine: documents, collaborators and the simulated-activity
// scheduler behind the Ghostwrite editor.

pub mod clock;
pub mod config;
pub mod events;
pub mod random;
pub mod roster;
pub mod runtime;
pub mod scheduler;
pub mod security;
pub mod session;
pub mod store;
