use std::sync::Arc;

use crate::annotation::Annotations;
use crate::flags::{AccessFlags, Visibility};
use crate::types::{JavaType, JavaTypeParameter};

/// Name reported for constructors, which have no source-level name.
pub const NO_NAME_PROVIDED: &str = "<no name provided>";

#[derive(Debug, Clone)]
pub struct JavaValueParameter {
    pub ty: JavaType,
    /// Only ever set on the last parameter of a varargs method.
    pub is_vararg: bool,
    pub annotations: Annotations,
}

impl JavaValueParameter {
    pub fn new(ty: JavaType, is_vararg: bool) -> Self {
        Self {
            ty,
            is_vararg,
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JavaMethod {
    pub name: String,
    pub access: AccessFlags,
    pub type_parameters: Vec<Arc<JavaTypeParameter>>,
    pub value_parameters: Vec<JavaValueParameter>,
    pub return_type: JavaType,
    pub annotations: Annotations,
    /// Set for annotation type elements that declare a `default` value.
    pub has_annotation_parameter_default_value: bool,
}

impl JavaMethod {
    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    pub fn visibility(&self) -> Visibility {
        self.access.visibility()
    }
}

#[derive(Debug, Clone)]
pub struct JavaConstructor {
    pub access: AccessFlags,
    pub type_parameters: Vec<Arc<JavaTypeParameter>>,
    pub value_parameters: Vec<JavaValueParameter>,
    pub annotations: Annotations,
}

impl JavaConstructor {
    pub fn name(&self) -> &'static str {
        NO_NAME_PROVIDED
    }

    pub fn visibility(&self) -> Visibility {
        self.access.visibility()
    }
}

/// Compile-time constant attached to a field (`ConstantValue` attribute).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct JavaField {
    pub name: String,
    pub access: AccessFlags,
    pub ty: JavaType,
    pub annotations: Annotations,
    pub is_enum_entry: bool,
    pub initializer_value: Option<ConstantValue>,
}

impl JavaField {
    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_final(&self) -> bool {
        self.access.is_final()
    }

    pub fn visibility(&self) -> Visibility {
        self.access.visibility()
    }
}
