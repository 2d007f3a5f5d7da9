pub mod chat_stream;
pub mod decode;

pub use chat_stream::{ChatBackend, StreamClient};
