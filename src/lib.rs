//! Reversi network server (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, the
//! integration tests and the benches share a single import path.

pub use reversi_net_core as core;
pub use reversi_net_server as server;
pub use reversi_net_types as types;
