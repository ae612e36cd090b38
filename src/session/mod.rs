// src/session/mod.rs

pub mod state;

pub use state::{AppliedSnapshot, SessionState, SessionStore};
