//! Provider catalog for promptbench.
//!
//! Knows every supported backend via [`ProviderKind`], where and how to reach
//! it ([`ProviderRegistry`]), which credentials are on hand
//! ([`Credentials`]), and which provider/model a command should target
//! ([`resolve_model`]). Nothing here performs I/O except model listing.

mod credentials;
mod kind;
mod listing;
mod registry;
mod resolve;

pub use credentials::Credentials;
pub use kind::ProviderKind;
pub use listing::list_models;
pub use registry::{Endpoint, Locality, ProviderRegistry};
pub use resolve::{resolve_model, split_shorthand, ModelSelection};
