use binjava_signature::MalformedSignature;
use thiserror::Error;

/// Failures that make a whole class unusable.
///
/// Problems confined to a single member (a malformed member signature) are
/// not reported here; the member is kept with erroneous types instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("class content ended without a header")]
    MissingHeader,
    #[error("duplicate class header for `{name}`")]
    DuplicateHeader { name: String },
    #[error("`{event}` event delivered before the class header")]
    EventBeforeHeader { event: &'static str },
    #[error("`{event}` event delivered after the end of class `{name}`")]
    EventAfterEnd { name: String, event: &'static str },
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// Why a member's declared types could not be used.
#[derive(Debug, Error)]
pub(crate) enum MemberTypeError {
    #[error(transparent)]
    Malformed(#[from] MalformedSignature),
    #[error("`void` is only valid as a method return type")]
    VoidOutsideReturn,
}
