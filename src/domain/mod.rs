pub mod credential;
pub mod message;
pub mod payload;
pub mod push;
