//! Session lifecycle engine and supervisor for dev-peace: the component that
//! turns classified activity events into work sessions, worklogs, and
//! status transitions.

pub mod errors;
pub mod manager;
pub mod shutdown;
pub mod supervisor;
pub mod worklog;

pub use errors::SessionError;
pub use manager::SessionManager;
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{Supervisor, SupervisorStats};
