pub mod guidelines;
pub mod session;
