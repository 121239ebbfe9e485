pub mod allocator;
pub mod partition;

pub use allocator::{AllocError, Placement};
pub use partition::{Partition, PartitionSpec, PartitionTable};
