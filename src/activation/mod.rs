//! Everything concerning mock sessions: installing the mock transport, putting the real one back,
//! and making sure only one session is open at any given time.
//!
//! `controller::ActivationController` owns the state machine; `gate::AdmissionGate` queues
//! concurrent activations; `session::MockSession` ties a session to a scope.
mod controller;
mod gate;
mod session;

pub use controller::ActivationController;
pub use session::MockSession;
