//! Parsers that turn encoded Java types into [`binjava_model::JavaType`]s.
//!
//! Three grammars share one output model:
//! - JVM generic signatures (`<T:Ljava/lang/Object;>(TT;)TT;`),
//! - plain descriptors (`(Ljava/lang/String;)V`),
//! - canonical type text (`java.util.List<? extends java.lang.Number>[]`).
//!
//! Names are resolved through a [`ClassifierResolver`], which scopes type
//! parameter bindings and defers class lookups to an external callback.

#![forbid(unsafe_code)]

mod canonical;
mod descriptor;
mod error;
mod resolver;
mod signature;

pub use crate::canonical::{
    parse_canonical_classifier_type, parse_canonical_text, parse_canonical_text_in,
};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::error::{MalformedSignature, Result};
pub use crate::resolver::ClassifierResolver;
pub use crate::signature::{
    parse_class_signature, parse_method_signature, parse_signature, ClassSignature,
    MethodSignature, SignatureParser,
};
