/*!
 * Memory Module
 * Arena allocation and segment bookkeeping
 */

pub mod arena;
pub mod codec;
pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use arena::Arena;
pub use codec::{ArenaHandle, SegmentHeader};
pub use table::SegmentTable;
pub use traits::*;
pub use types::*;
