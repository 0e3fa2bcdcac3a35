pub mod comments;
pub mod error;
pub mod identity;
pub mod invalidation;
pub mod likes;
pub mod notifications;
pub mod posts;
pub mod profiles;

pub use error::ActionError;
