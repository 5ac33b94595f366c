//! rusty-blog/crates/rb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Blog.

pub mod models;
pub mod forms;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use forms::*;
pub use traits::*;
pub use error::*;
pub use uuid::Uuid;
