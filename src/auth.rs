//! Auth-domain identifiers, scope sets, secrets, and credential bundles.

pub mod bundle;
pub mod id;
pub mod scope;
pub mod secret;

pub use bundle::*;
pub use id::*;
pub use scope::*;
pub use secret::*;
