//! API Request and Response Types
//!
//! This module defines all request and response types for the Rolodex API.

// Contact CRUD, listing and edit-session types
mod contact;
pub use contact::*;

// Spreadsheet import/export types
mod transfer;
pub use transfer::*;
