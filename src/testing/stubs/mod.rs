pub mod counting_source;
pub mod regaining_source;

pub use counting_source::CountingSource;
pub use regaining_source::RegainingSource;
