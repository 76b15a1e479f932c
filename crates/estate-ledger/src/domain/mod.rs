//! # Domain Module
//!
//! Records, policies, invariants and pure transitions of the estate ledger.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod policy;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use policy::*;
pub use services::*;
pub use value_objects::*;
