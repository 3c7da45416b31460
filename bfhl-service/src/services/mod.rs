pub mod ai;
pub mod dispatcher;
pub mod math;
pub mod metrics;
pub mod providers;

pub use ai::AiDelegate;
pub use dispatcher::{Dispatcher, Operation};
