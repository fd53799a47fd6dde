pub mod bridge;
pub mod publisher;
