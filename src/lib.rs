//! Book catalog web application.
//!
//! Project modules live in [`modules`]; [`app`] wires them into the kernel,
//! database and HTTP server.

pub mod app;
pub mod modules;
