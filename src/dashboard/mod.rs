//! Dashboard HTTP API and the overview it serves.

mod server;
pub mod summary;

pub use server::{DashboardServer, build_router, start_server};
pub use summary::DashboardSummary;
