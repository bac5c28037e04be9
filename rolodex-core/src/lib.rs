//! Rolodex Core - Contact Types
//!
//! Plain data structures shared by the store implementations and the API
//! layer: the contact record, its creation/patch payloads, the edit-lock
//! fields, the field model used for filtering, sorting and export, and the
//! store error taxonomy.
//!
//! The only behavior kept here is the write-path contract checks, so every
//! store enforces the same required-field rules.

pub mod contact;
pub mod error;
pub mod field;
pub mod identity;
pub mod selector;

pub use contact::{Contact, ContactPatch, EditLock, NewContact};
pub use error::{StoreError, StoreResult};
pub use field::{ContactField, UnknownFieldError};
pub use identity::{ContactId, ContactIdParseError, Timestamp};
pub use selector::{ContactSelector, FieldFilter, FilterValue, SelectorError, SortOrder};
