// Draft engine: data model, pick order, state mirror and event dispatch.

pub mod arbiter;
pub mod dispatcher;
pub mod history;
pub mod model;
pub mod order;
pub mod pending;
pub mod state;
