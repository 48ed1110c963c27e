//! Push-style event vocabulary for walking a class's binary content.
//!
//! The shapes mirror what a class file carries once the constant pool has been
//! resolved: names are internal names (`java/util/Map$Entry`), types are raw
//! descriptors and optional generic signatures.

use binjava_model::{AccessFlags, ConstantValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub access: AccessFlags,
    /// Internal name of the class being visited.
    pub name: String,
    pub signature: Option<String>,
    /// `None` only for `java/lang/Object` and module descriptors.
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
}

impl ClassHeader {
    /// A Java 8 class file header with no supertypes.
    pub fn new(access: AccessFlags, name: impl Into<String>) -> Self {
        Self {
            minor_version: 0,
            major_version: 52,
            access,
            name: name.into(),
            signature: None,
            super_name: None,
            interfaces: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_super_name(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEvent {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute.
    pub exceptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEvent {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub value: Option<ConstantValue>,
}

/// One entry of the `InnerClasses` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEvent {
    pub name: String,
    /// `None` for local and anonymous classes.
    pub outer_name: Option<String>,
    /// `None` for anonymous classes.
    pub inner_name: Option<String>,
    pub access: AccessFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEvent {
    /// Field descriptor of the annotation type, e.g. `Ljava/lang/Deprecated;`.
    pub descriptor: String,
    /// `false` for `RuntimeInvisible*Annotations` entries.
    pub visible: bool,
}

impl AnnotationEvent {
    pub fn new(descriptor: impl Into<String>, visible: bool) -> Self {
        Self {
            descriptor: descriptor.into(),
            visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAnnotationEvent {
    /// Index into the parameters as they appear in the descriptor.
    pub parameter: usize,
    pub annotation: AnnotationEvent,
}

/// Handle for a member accepted by a visitor. Member-scoped events
/// (annotations, annotation defaults) are addressed through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSlot {
    Method(usize),
    Constructor(usize),
    Field(usize),
}

/// Receives the events of one class.
///
/// Sources deliver exactly one [`visit`](ClassVisitor::visit) first, then any
/// mix of the other events, then [`visit_end`](ClassVisitor::visit_end).
/// Returning `None` from `visit_method`/`visit_field` drops the member; a
/// source must not deliver member-scoped events for a dropped member.
pub trait ClassVisitor {
    fn visit(&mut self, header: &ClassHeader);

    fn visit_annotation(&mut self, _annotation: &AnnotationEvent) {}

    fn visit_inner_class(&mut self, _inner: &InnerClassEvent) {}

    fn visit_field(&mut self, _field: &FieldEvent) -> Option<MemberSlot> {
        None
    }

    fn visit_method(&mut self, _method: &MethodEvent) -> Option<MemberSlot> {
        None
    }

    fn visit_member_annotation(&mut self, _slot: MemberSlot, _annotation: &AnnotationEvent) {}

    fn visit_parameter_annotation(
        &mut self,
        _slot: MemberSlot,
        _annotation: &ParameterAnnotationEvent,
    ) {
    }

    /// The method carries an `AnnotationDefault` attribute.
    fn visit_annotation_default(&mut self, _slot: MemberSlot) {}

    fn visit_end(&mut self) {}
}
