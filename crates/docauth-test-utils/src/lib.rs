// docauth-test-utils: adapter conformance testing.
//
// Provides:
// - `conformance` checks that any `Adapter` implementation must pass
// - `generators` producing unique, store-safe test records

pub mod conformance;
pub mod generators;

pub use conformance::{run_all, ConformanceError, ConformanceReport};
pub use generators::{
    generate_test_account, generate_test_session, generate_test_user,
    generate_test_verification_token,
};
