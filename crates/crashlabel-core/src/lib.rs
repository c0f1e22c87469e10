//! # crashlabel-core
//!
//! Crash log parsing and address labeling for crashlabel.
//!
//! Crash reports written by game script extenders list the call stack as raw
//! addresses, each tagged with a stable address id:
//!
//! ```text
//! PROBABLE CALL STACK:
//! 	[ 0] 0x7FF6ABCDEF00 SkyrimSE.exe+01ABCDEF -> 12345+0x10
//! ```
//!
//! This crate looks those ids up in a sorted, externally maintained symbol
//! database and rewrites the call stack in place with the names it finds:
//!
//! ```text
//! PROBABLE CALL STACK:
//! 	[ 0] 0x7FF6ABCDEF00 SkyrimSE.exe+01ABCDEF   SomeFunction
//! ```
//!
//! Everything outside the call stack is written back byte-for-byte.
//!
//! ## Modules
//!
//! - [`document`]: splits a log into preamble, call stack, and trailer
//! - [`frame`]: recognizes frame lines and extracts their address ids
//! - [`resolver`]: single-pass lookup against the sorted database, line rewriting
//! - [`processor`]: per-log orchestration and safe file replacement
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use crashlabel_core::{CrashLogProcessor, KeepOriginal};
//!
//! fn main() -> crashlabel_core::Result<()>
//! {
//!     let processor = CrashLogProcessor::new("SkyrimSE/database.txt", KeepOriginal);
//!     let outcome = processor.process_log(Path::new("crash-2024-01-01-12-00-00.log"))?;
//!     println!("modified: {}", outcome.is_modified());
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod error;
pub mod frame;
pub mod processor;
pub mod resolver;
pub mod types;

pub use document::CrashLogDocument;
// Re-export commonly used types
pub use error::{CrashLabelError, Result};
pub use frame::StackFrameMatch;
pub use processor::{CrashLogProcessor, KeepOriginal, MoveToDirectory, ProcessOutcome, Trash};
pub use resolver::{FrameScan, IdScanner};
pub use types::{AddressId, SymbolName, SymbolTable};
