//! Domain services used by the view-state layer.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the conversation with external providers so the
//! state layer can stay focused on translating UI events into requests.

pub mod auth;
