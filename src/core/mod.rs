pub mod chat;
pub mod chunking;
pub mod completion;
pub mod config;
pub mod message;
pub mod prompt;
pub mod stream;
pub mod training;
