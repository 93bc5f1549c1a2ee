mod chat;
mod health;
mod metrics;

pub use chat::proxy_chat;
pub use health::health_check;
pub use metrics::metrics;
