//! Pure data structures for the registry: resources, their types and the
//! index fields derived from their payloads.

pub mod indexed_field;
pub mod resource;
pub mod resource_type;

pub use indexed_field::*;
pub use resource::*;
pub use resource_type::*;
