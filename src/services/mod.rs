//! Business logic services
//!
//! One service per community component. Services own a clone of the pool and
//! translate repository failures into [`AppError`].

pub mod access;
pub mod fpo;
pub mod identity;
pub mod membership;
pub mod messages;
pub mod read_state;

pub use access::ChatAccessGate;
pub use fpo::FpoService;
pub use identity::IdentityResolver;
pub use membership::MembershipService;
pub use messages::MessageService;
pub use read_state::ReadStateService;

use crate::utils::AppError;

pub(crate) fn store_error(err: anyhow::Error) -> AppError {
    AppError::Database(format!("{:#}", err))
}
