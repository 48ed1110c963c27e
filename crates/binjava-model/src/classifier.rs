use std::fmt;
use std::sync::{Arc, Weak};

use crate::class::JavaClass;
use crate::types::JavaTypeParameter;

/// External classifier lookup by qualified name.
///
/// Implementations must be read-only (or internally synchronized): a single
/// lookup is shared by every scope forked from the same resolver, and may be
/// invoked from any thread that reads a completed class graph.
pub type ClassLookup = Arc<dyn Fn(&str) -> Option<Arc<JavaClass>> + Send + Sync>;

/// Something a classifier type can point at.
#[derive(Debug, Clone)]
pub enum JavaClassifier {
    Class(Arc<JavaClass>),
    TypeParameter(Arc<JavaTypeParameter>),
}

impl JavaClassifier {
    pub fn as_class(&self) -> Option<&Arc<JavaClass>> {
        match self {
            JavaClassifier::Class(class) => Some(class),
            JavaClassifier::TypeParameter(_) => None,
        }
    }

    pub fn as_type_parameter(&self) -> Option<&Arc<JavaTypeParameter>> {
        match self {
            JavaClassifier::TypeParameter(tp) => Some(tp),
            JavaClassifier::Class(_) => None,
        }
    }
}

/// A deferred `(classifier, name)` pair.
///
/// Type parameters are bound at the point the reference was created. A
/// parameter referenced from its own bounds (`<T:Ljava/lang/Comparable<TT;>;>`)
/// is held weakly, so the parameter does not own itself. Class
/// references keep the external lookup and consult it on every query; caching
/// is the lookup's business. A reference that resolves to nothing is an
/// "unknown type", never an error, and still carries its best-effort name.
#[derive(Clone)]
pub struct ClassifierRef {
    name: String,
    target: RefTarget,
}

#[derive(Clone)]
enum RefTarget {
    TypeParameter(Arc<JavaTypeParameter>),
    Declaring(Weak<JavaTypeParameter>),
    Lookup(ClassLookup),
    Detached,
}

impl ClassifierRef {
    pub fn type_parameter(name: impl Into<String>, tp: Arc<JavaTypeParameter>) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::TypeParameter(tp),
        }
    }

    /// A reference to a type parameter from inside its own declaration. It
    /// resolves for as long as the parameter is alive.
    pub fn declaring_type_parameter(
        name: impl Into<String>,
        tp: Weak<JavaTypeParameter>,
    ) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::Declaring(tp),
        }
    }

    pub fn deferred(name: impl Into<String>, lookup: ClassLookup) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::Lookup(lookup),
        }
    }

    /// A reference with no way to resolve itself (e.g. parsed from free-standing
    /// canonical text). It always resolves to `None`.
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::Detached,
        }
    }

    /// The qualified name (or type parameter name) this reference was created for.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self) -> Option<JavaClassifier> {
        match &self.target {
            RefTarget::TypeParameter(tp) => Some(JavaClassifier::TypeParameter(tp.clone())),
            RefTarget::Declaring(tp) => tp.upgrade().map(JavaClassifier::TypeParameter),
            RefTarget::Lookup(lookup) => lookup(&self.name).map(JavaClassifier::Class),
            RefTarget::Detached => None,
        }
    }

    pub fn resolve_class(&self) -> Option<Arc<JavaClass>> {
        match &self.target {
            RefTarget::Lookup(lookup) => lookup(&self.name),
            RefTarget::TypeParameter(_) | RefTarget::Declaring(_) | RefTarget::Detached => None,
        }
    }

    /// The type parameter this reference was bound to, if any.
    pub fn bound_type_parameter(&self) -> Option<Arc<JavaTypeParameter>> {
        match &self.target {
            RefTarget::TypeParameter(tp) => Some(tp.clone()),
            RefTarget::Declaring(tp) => tp.upgrade(),
            RefTarget::Lookup(_) | RefTarget::Detached => None,
        }
    }
}

/// Two references are equal when they name the same classifier; resolution
/// state is not compared.
impl PartialEq for ClassifierRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassifierRef {}

impl fmt::Debug for ClassifierRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            RefTarget::TypeParameter(_) | RefTarget::Declaring(_) => "type-parameter",
            RefTarget::Lookup(_) => "lookup",
            RefTarget::Detached => "detached",
        };
        f.debug_struct("ClassifierRef")
            .field("name", &self.name)
            .field("target", &target)
            .finish()
    }
}
