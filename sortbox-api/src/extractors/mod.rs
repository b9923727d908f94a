//! Custom Axum extractors.

mod array_id;

pub use array_id::ArrayIdParam;
