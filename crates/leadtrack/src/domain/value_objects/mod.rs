//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod call_result;
mod date_range;
mod interest_policy;
mod pagination;
mod tag_type;
mod task_status;

pub use call_result::*;
pub use date_range::*;
pub use interest_policy::*;
pub use pagination::*;
pub use tag_type::*;
pub use task_status::*;
