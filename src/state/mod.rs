//! Observable view state consumed by presentation layers.
//!
//! DESIGN
//! ======
//! Each state holder owns a `tokio::sync::watch` cell: one writer, any
//! number of readers, and every published value is a whole snapshot.

pub mod auth;
