use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::annotation::{Annotations, JavaAnnotation};
use crate::flags::{AccessFlags, Visibility};
use crate::member::{JavaConstructor, JavaField, JavaMethod};
use crate::types::{JavaClassifierType, JavaTypeParameter};

/// Loads an inner class of an already built class on demand.
///
/// Implementations decide where the inner class content comes from. Results
/// are not cached by the model.
pub trait InnerClassLoader: Send + Sync {
    fn load_inner_class(
        &self,
        outer: &Arc<JavaClass>,
        name: &str,
        access: AccessFlags,
    ) -> Option<Arc<JavaClass>>;
}

/// A class, interface, enum, or annotation type loaded from its binary form.
///
/// Built in a single visitation pass and immutable afterwards; the only lazy
/// parts are the annotation index and [`JavaClass::find_inner_class`].
pub struct JavaClass {
    pub fq_name: String,
    pub internal_name: String,
    pub access: AccessFlags,
    pub type_parameters: Vec<Arc<JavaTypeParameter>>,
    /// Superclass first (when present), then interfaces, in declaration order.
    pub supertypes: Vec<Arc<JavaClassifierType>>,
    pub methods: Vec<JavaMethod>,
    pub fields: Vec<JavaField>,
    pub constructors: Vec<JavaConstructor>,
    pub annotations: Annotations,
    /// Simple inner class name -> access flags from the `InnerClasses` entry.
    pub inner_classes: BTreeMap<String, AccessFlags>,
    outer: Weak<JavaClass>,
    inner_loader: Option<Arc<dyn InnerClassLoader>>,
}

impl JavaClass {
    pub fn new(fq_name: impl Into<String>, internal_name: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            fq_name: fq_name.into(),
            internal_name: internal_name.into(),
            access,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            annotations: Annotations::new(),
            inner_classes: BTreeMap::new(),
            outer: Weak::new(),
            inner_loader: None,
        }
    }

    /// Records the enclosing class. The outer class is not kept alive by this link.
    pub fn set_outer_class(&mut self, outer: &Arc<JavaClass>) {
        self.outer = Arc::downgrade(outer);
    }

    pub fn set_inner_class_loader(&mut self, loader: Arc<dyn InnerClassLoader>) {
        self.inner_loader = Some(loader);
    }

    /// Simple name (last segment of the qualified name).
    pub fn name(&self) -> &str {
        self.fq_name
            .rsplit_once('.')
            .map_or(self.fq_name.as_str(), |(_, name)| name)
    }

    pub fn outer_class(&self) -> Option<Arc<JavaClass>> {
        self.outer.upgrade()
    }

    pub fn inner_class_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner_classes.keys().map(String::as_str)
    }

    /// Builds the named inner class on demand. Returns `None` for names not
    /// recorded from the `InnerClasses` attribute, or when the content cannot
    /// be located.
    pub fn find_inner_class(self: &Arc<Self>, name: &str) -> Option<Arc<JavaClass>> {
        let access = *self.inner_classes.get(name)?;
        let loader = self.inner_loader.as_ref()?;
        loader.load_inner_class(self, name, access)
    }

    pub fn find_annotation(&self, fq_name: &str) -> Option<&JavaAnnotation> {
        self.annotations.find(fq_name)
    }

    pub fn is_interface(&self) -> bool {
        self.access.contains(AccessFlags::INTERFACE)
    }

    pub fn is_annotation_type(&self) -> bool {
        self.access.contains(AccessFlags::ANNOTATION)
    }

    pub fn is_enum(&self) -> bool {
        self.access.contains(AccessFlags::ENUM)
    }

    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    pub fn is_final(&self) -> bool {
        self.access.is_final()
    }

    pub fn visibility(&self) -> Visibility {
        self.access.visibility()
    }
}

impl fmt::Debug for JavaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JavaClass")
            .field("fq_name", &self.fq_name)
            .field("access", &self.access)
            .field("type_parameters", &self.type_parameters)
            .field("supertypes", &self.supertypes)
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .field("inner_classes", &self.inner_classes)
            .finish_non_exhaustive()
    }
}
