//! Access-code session gate: signed-cookie sessions and the request filter
//! that protects the forwarding routes.

pub mod middleware;
pub mod session;

pub use middleware::{access_gate, AppState, GateDecision};
pub use session::{clear_session, establish_session, session_code, session_key};
