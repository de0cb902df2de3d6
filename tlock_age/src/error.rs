use thiserror::Error;

/// Errors raised by the age-stanza adaptor, envelope driver, and metadata
/// reader. Mirrors the taxonomy in §7: every fatal kind is its own variant
/// and [`Error::TooEarly`] is the one kind callers should treat as
/// retriable, matched on directly rather than by string.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The referenced beacon round has not been signed yet. Non-fatal:
    /// callers may retry after waiting.
    #[error("round {0} has not been signed yet")]
    TooEarly(u64),

    /// The envelope's stanza names a chain the configured network doesn't
    /// serve and can't switch to.
    #[error("envelope targets a different chain than the configured network")]
    WrongChainHash,

    /// No well-formed `tlock` stanza was found; lets age try other
    /// identities registered against the same file.
    #[error("no tlock stanza found")]
    IncorrectIdentity,

    /// Opaque wrapper around a `Network` failure that isn't `TooEarly`.
    #[error("beacon network error: {0}")]
    Transport(String),

    /// Bubbled up from the IBE layer (scheme resolution, ciphertext
    /// decoding, CCA check, beacon verification, invalid public key).
    #[error(transparent)]
    Ibe(#[from] tlock::Error),

    /// The underlying age stream failed independently of the tlock stanza
    /// (truncated input, bad MAC, malformed header).
    #[error("age stream error: {0}")]
    Age(String),
}
