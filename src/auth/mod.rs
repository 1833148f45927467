//! Authentication for the external API
//!
//! Two mechanisms coexist:
//! - query-parameter credentials (`key` / `token`) parsed from the host's
//!   connection string, used by every regular endpoint;
//! - a one-time signed `Authorization: OAuth ...` header, required only by
//!   the attachment-download endpoint family.

mod credentials;
mod signer;

pub use credentials::Credentials;
pub use signer::RequestSigner;

#[cfg(test)]
mod tests;
