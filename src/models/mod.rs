//! Data models

mod chat;
mod fpo;
mod membership;
mod message;
mod profile;

pub use chat::*;
pub use fpo::*;
pub use membership::*;
pub use message::*;
pub use profile::*;
