//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod door_rx;
pub mod edges;
pub mod storage;

pub use control::{control_task, ControlPeripherals};
pub use door_rx::door_rx_task;
pub use edges::{edge_task, EdgeSensor};
pub use storage::{load_mode, storage_task};
