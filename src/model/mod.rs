pub mod deps;
pub mod normalize;
pub mod rows;
pub mod task;

pub use deps::DependencyMap;
pub use normalize::{IdGenerator, SequentialIdGenerator, TaskNormalizer, UuidIdGenerator};
pub use rows::{RowPlan, SubRow, SwimlaneGroup};
pub use task::{DependencyList, RawTask, Task, TaskColors};
