pub mod health;
pub mod receive;
pub mod send;
pub mod serve;
pub mod version;

pub use health::Health;
pub use receive::ReceivePayload;
pub use send::SendPayload;
pub use serve::Serve;
pub use version::Version;
