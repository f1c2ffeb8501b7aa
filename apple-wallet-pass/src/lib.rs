//! [Doc](https://developer.apple.com/documentation/walletpasses)

pub use chrono;
pub use openssl;
pub use serde_json;

//
pub mod credentials;
pub mod generator;
pub mod model;
pub mod pass;
pub mod props;

pub use credentials::{Credentials, CredentialsError, SigningIdentity};
pub use generator::{generate, GenerateError, GeneratorConfig};
pub use model::{ModelError, PassModel};
pub use pass::{Pass, PassError};
pub use props::PassProps;

#[cfg(test)]
pub(crate) mod test_helpers;
