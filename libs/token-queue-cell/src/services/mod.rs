pub mod store;
pub mod sequencer;
pub mod scheduler;
pub mod estimator;
pub mod broadcast;
pub mod notify;

pub use store::*;
pub use scheduler::*;
pub use estimator::*;
pub use broadcast::*;
pub use notify::*;
