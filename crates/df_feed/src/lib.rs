pub mod rss;
pub mod writer;

pub use rss::render;
pub use writer::{publish, write_atomic, OutputTarget};
