// HTTP surface: routes, handlers and the listener.

pub mod console;
pub mod handlers;
pub mod router;
pub mod server;

pub use router::{build_router, SharedEngine};
pub use server::serve;
