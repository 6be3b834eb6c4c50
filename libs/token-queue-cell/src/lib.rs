pub mod models;
pub mod services;
pub mod error;
pub mod state;
pub mod handlers;
pub mod router;

pub use models::*;
pub use error::*;
pub use services::*;
pub use state::QueueState;
pub use router::create_token_queue_router;
