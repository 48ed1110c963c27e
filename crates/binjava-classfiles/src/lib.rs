//! Structural loading of compiled Java classes.
//!
//! A class's decoded content is delivered as [`ClassVisitor`] events (see
//! [`ClassContent`] for a recorded stream). [`BinaryClassBuilder`] turns those
//! events into a [`binjava_model::JavaClass`], parsing signatures and
//! descriptors with `binjava-signature`. [`BinaryClassLoader`] ties a content
//! provider to the builder and loads inner classes on demand.

mod builder;
mod content;
mod error;
mod loader;
mod visitor;

pub use crate::builder::BinaryClassBuilder;
pub use crate::content::{
    ClassContent, ClassContentBuilder, ClassContentProvider, ClassEvent, FieldRecord,
    InMemoryClassContents, MethodRecord,
};
pub use crate::error::{LoadError, Result};
pub use crate::loader::BinaryClassLoader;
pub use crate::visitor::{
    AnnotationEvent, ClassHeader, ClassVisitor, FieldEvent, InnerClassEvent, MemberSlot,
    MethodEvent, ParameterAnnotationEvent,
};
