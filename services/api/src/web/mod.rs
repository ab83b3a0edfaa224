pub mod envelope;
pub mod middleware;
pub mod pipeline;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the pieces the binaries and tests build the server from.
pub use envelope::{Envelope, ErrorKind, RelayError};
pub use rest::{chat_handler, health_handler, process_handler};
pub use router::build_router;
pub use state::AppState;
