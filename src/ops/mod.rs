pub mod calendar;
pub mod flow_ops;
pub mod item_ops;
pub mod thread_ops;
