mod backend;
mod fixtures;
mod server;

pub use backend::{Gate, MockBackend};
pub use fixtures::{enveloped, numbered, paginated};
pub use server::TestServer;
