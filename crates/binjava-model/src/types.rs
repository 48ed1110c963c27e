use std::fmt;
use std::sync::Arc;

use crate::classifier::{ClassifierRef, JavaClassifier};

/// Qualified name of the root object type.
pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Boolean,
    Short,
}

impl PrimitiveType {
    /// The single-letter JVM descriptor code.
    pub fn descriptor_code(self) -> char {
        match self {
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Double => 'D',
            PrimitiveType::Float => 'F',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Short => 'S',
        }
    }

    pub fn from_descriptor_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => PrimitiveType::Byte,
            'C' => PrimitiveType::Char,
            'D' => PrimitiveType::Double,
            'F' => PrimitiveType::Float,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'Z' => PrimitiveType::Boolean,
            'S' => PrimitiveType::Short,
            _ => return None,
        })
    }

    /// The Java keyword spelling (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Double => "double",
            PrimitiveType::Float => "float",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Short => "short",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "byte" => PrimitiveType::Byte,
            "char" => PrimitiveType::Char,
            "double" => PrimitiveType::Double,
            "float" => PrimitiveType::Float,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "boolean" => PrimitiveType::Boolean,
            "short" => PrimitiveType::Short,
            _ => return None,
        })
    }
}

/// A Java type as seen by consumers of loaded classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    /// A primitive type, or `void` when `None`.
    Primitive(Option<PrimitiveType>),
    Array(Box<JavaType>),
    Classifier(Arc<JavaClassifierType>),
    Wildcard(JavaWildcardType),
    /// Placeholder for a type whose encoded form could not be parsed.
    Error,
}

impl JavaType {
    pub const VOID: JavaType = JavaType::Primitive(None);

    pub fn primitive(kind: PrimitiveType) -> Self {
        JavaType::Primitive(Some(kind))
    }

    pub fn array(component: JavaType) -> Self {
        JavaType::Array(Box::new(component))
    }

    pub fn classifier(classifier: ClassifierRef, type_arguments: Vec<JavaType>) -> Self {
        JavaType::Classifier(Arc::new(JavaClassifierType::new(classifier, type_arguments)))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Primitive(None))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JavaType::Error)
    }

    pub fn as_classifier_type(&self) -> Option<&Arc<JavaClassifierType>> {
        match self {
            JavaType::Classifier(ty) => Some(ty),
            _ => None,
        }
    }

    /// Number of array dimensions wrapped around the innermost element type.
    pub fn array_dimensions(&self) -> usize {
        let mut dims = 0;
        let mut ty = self;
        while let JavaType::Array(component) = ty {
            dims += 1;
            ty = component;
        }
        dims
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(Some(kind)) => f.write_str(kind.keyword()),
            JavaType::Primitive(None) => f.write_str("void"),
            JavaType::Array(component) => write!(f, "{component}[]"),
            JavaType::Classifier(ty) => fmt::Display::fmt(ty, f),
            JavaType::Wildcard(wildcard) => fmt::Display::fmt(wildcard, f),
            JavaType::Error => f.write_str("<error>"),
        }
    }
}

/// `?`, `? extends T` or `? super T`.
///
/// The unbounded wildcard is `bound = None, is_extends = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaWildcardType {
    pub bound: Option<Box<JavaType>>,
    pub is_extends: bool,
}

impl JavaWildcardType {
    pub fn unbounded() -> Self {
        Self {
            bound: None,
            is_extends: true,
        }
    }

    pub fn extends(bound: JavaType) -> Self {
        Self {
            bound: Some(Box::new(bound)),
            is_extends: true,
        }
    }

    pub fn super_of(bound: JavaType) -> Self {
        Self {
            bound: Some(Box::new(bound)),
            is_extends: false,
        }
    }
}

impl fmt::Display for JavaWildcardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bound {
            None => f.write_str("?"),
            Some(bound) if self.is_extends => write!(f, "? extends {bound}"),
            Some(bound) => write!(f, "? super {bound}"),
        }
    }
}

/// A reference to a class or type variable, with its type arguments.
///
/// Arguments of enclosing generic classes are flattened into one list, inner
/// class arguments first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaClassifierType {
    pub classifier: ClassifierRef,
    pub type_arguments: Vec<JavaType>,
}

impl JavaClassifierType {
    pub fn new(classifier: ClassifierRef, type_arguments: Vec<JavaType>) -> Self {
        Self {
            classifier,
            type_arguments,
        }
    }

    pub fn classifier(&self) -> Option<JavaClassifier> {
        self.classifier.resolve()
    }

    pub fn classifier_qualified_name(&self) -> &str {
        self.classifier.name()
    }

    /// A generic class used without any type arguments.
    ///
    /// Unresolved classifiers are never raw: without the declaration there is
    /// no way to know whether type parameters exist.
    pub fn is_raw(&self) -> bool {
        if !self.type_arguments.is_empty() {
            return false;
        }
        self.classifier
            .resolve_class()
            .is_some_and(|class| !class.type_parameters.is_empty())
    }

    pub fn presentable_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JavaClassifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.classifier.name())?;
        if self.type_arguments.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (idx, arg) in self.type_arguments.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

/// A declared type parameter.
///
/// An empty `bounds` list means the implicit `java.lang.Object` bound; the
/// sole-object bound is never materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaTypeParameter {
    pub name: String,
    pub bounds: Vec<Arc<JavaClassifierType>>,
}

impl JavaTypeParameter {
    pub fn new(name: impl Into<String>, bounds: Vec<Arc<JavaClassifierType>>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    pub fn has_implicit_object_bound(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_matches_canonical_text() {
        let list = JavaType::classifier(
            ClassifierRef::detached("java.util.List"),
            vec![JavaType::Wildcard(JavaWildcardType::super_of(
                JavaType::classifier(ClassifierRef::detached("java.lang.Number"), vec![]),
            ))],
        );
        assert_eq!(
            JavaType::array(list).to_string(),
            "java.util.List<? super java.lang.Number>[]"
        );
        assert_eq!(JavaType::VOID.to_string(), "void");
    }

    #[test]
    fn array_dimensions_counts_nesting() {
        let ty = JavaType::array(JavaType::array(JavaType::primitive(PrimitiveType::Int)));
        assert_eq!(ty.array_dimensions(), 2);
        assert_eq!(JavaType::primitive(PrimitiveType::Int).array_dimensions(), 0);
    }

    #[test]
    fn detached_classifier_is_never_raw() {
        let ty = JavaClassifierType::new(ClassifierRef::detached("java.util.List"), vec![]);
        assert!(!ty.is_raw());
        assert!(ty.classifier().is_none());
    }
}
