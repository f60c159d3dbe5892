//! The execution engine: selection-set walking, resolver dispatch and value
//! completion.

mod container;
mod field;
mod input;
mod list;

pub use container::{resolve_container, resolve_container_serial};
pub use input::{resolve_input, InputResolveMode};
