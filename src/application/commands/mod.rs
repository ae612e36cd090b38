// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the CLI and Services
// - Commands return DTOs
// - Commands handle error conversion (ErrorResponse)
// - Commands NEVER contain business logic

pub mod catalog_commands;
pub mod list_commands;
pub mod session_commands;
pub mod showtime_commands;

pub use catalog_commands::*;
pub use list_commands::*;
pub use session_commands::*;
pub use showtime_commands::*;
