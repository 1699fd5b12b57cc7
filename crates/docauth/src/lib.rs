// docauth: authentication persistence adapter.
//
// `AuthAdapter` implements the protocol-facing `Adapter` contract on top of
// any set of entity accessors; `policy` holds the token/session callbacks and
// the rolling-expiry configuration.

pub mod adapter;
pub mod policy;

pub use adapter::AuthAdapter;
pub use docauth_core::{Adapter, AdapterError, AdapterResult, Stores};
pub use policy::{SessionPolicy, SessionView, TokenClaims};
