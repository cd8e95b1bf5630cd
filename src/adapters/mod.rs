pub mod certificate;
pub mod push;
