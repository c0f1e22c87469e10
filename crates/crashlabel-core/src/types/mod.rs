//! # Types
//!
//! Small value types shared by the crash log model and the resolver.

pub mod id;
pub mod symbols;

// Re-export all public types
pub use id::{AddressId, ParseAddressIdError};
pub use symbols::{SymbolName, SymbolTable};
