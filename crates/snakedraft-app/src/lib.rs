// Session runtime: league data collaborators, bootstrap and the event loop
// that drives the draft engine.

pub mod bootstrap;
pub mod collaborator;
pub mod protocol;
pub mod session;
