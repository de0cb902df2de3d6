use thiserror::Error;

/// Errors raised by the IBE engine and the timelock facade.
///
/// Every variant corresponds 1:1 to a taxonomy entry from the failure model:
/// callers match on the variant, never on the `Display` string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The scheme name does not resolve to a registered scheme.
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    /// The master public key is the identity element of its group.
    #[error("public key is the identity element")]
    InvalidPublicKey,

    /// A ciphertext's `U ∥ V ∥ W` encoding has the wrong length, or `U`
    /// fails to decompress / is not in the correct subgroup.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// The Fujisaki–Okamoto re-encryption check failed: `U' != U`.
    #[error("decryption failed: ciphertext was tampered with")]
    DecryptionFailed,

    /// A beacon signature does not verify against the round identity under
    /// the configured public key.
    #[error("beacon signature does not verify")]
    InvalidBeacon,
}
