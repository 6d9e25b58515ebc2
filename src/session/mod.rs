//! Session state and the flow controller that owns its transitions.

pub mod flow;
pub mod state;

pub use flow::{FlowController, FlowError, ValidationError};
pub use state::{ResultCache, Role, SessionState, Stage, Turn};
