//! Clock and filesystem metadata adapters.

pub mod clock;
pub mod file_stat;
pub mod mock;

pub use clock::SystemClock;
pub use file_stat::FsFileStat;
pub use mock::{ManualClock, MemoryFileStat};
