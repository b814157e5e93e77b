//! Authentication core for the quiz app.
//!
//! ARCHITECTURE
//! ============
//! - `backend`: identity provider adapters (Firebase REST, in-memory)
//! - `session`: the explicitly owned provider session cell
//! - `services::auth`: the gateway mapping provider results to `User`/`AuthError`
//! - `state::auth`: observable login/registration view state
//! - `model`: plain records shared with the quiz screens

pub mod backend;
pub mod model;
pub mod services;
pub mod session;
pub mod state;
