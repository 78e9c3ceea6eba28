//! Filesystem side of the library: placing imported files under the library
//! root, finding free file names, and inspecting files before import.

pub mod error;
mod inspect;
mod path;
mod place;

pub use crate::inspect::{FileStat, inspect};
pub use crate::path::validate as validate_path;
pub use crate::place::{Mode, Placement, move_or_copy, unique_name};
