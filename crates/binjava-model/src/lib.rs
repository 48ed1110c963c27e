//! Structural model of Java classes loaded from compiled class files.
//!
//! This crate is intentionally small and dependency-free. It only describes the
//! shapes produced by `binjava-signature` and `binjava-classfiles`; nothing in
//! here parses or resolves anything on its own.
//!
//! Cross-class links are expressed as [`ClassifierRef`]s (a name plus an
//! on-demand lookup) rather than direct object links, so cyclic class graphs
//! never turn into ownership cycles.

#![forbid(unsafe_code)]

mod annotation;
mod class;
mod classifier;
mod flags;
mod member;
mod types;

pub use crate::annotation::{descriptor_to_internal_name, Annotations, ClassId, JavaAnnotation};
pub use crate::class::{InnerClassLoader, JavaClass};
pub use crate::classifier::{ClassLookup, ClassifierRef, JavaClassifier};
pub use crate::flags::{AccessFlags, Visibility};
pub use crate::member::{
    ConstantValue, JavaConstructor, JavaField, JavaMethod, JavaValueParameter, NO_NAME_PROVIDED,
};
pub use crate::types::{
    JavaClassifierType, JavaType, JavaTypeParameter, JavaWildcardType, PrimitiveType,
    JAVA_LANG_OBJECT,
};
