//! newmusic-session - Session store for the New Music API client.
//!
//! [`AuthStore`] owns the signed-in user and the token pair. It is the
//! credential holder installed into the client factory: the client reads
//! tokens from it, hands renewed tokens back and logs it out when renewal
//! fails.
//!
//! A session opened with "remember me" is written to `session.json` in the
//! store directory and restored on the next [`AuthStore::open`]; otherwise
//! it lives in memory only.

mod file;
mod store;

pub use file::SESSION_FILE;
pub use store::AuthStore;
