use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::class::JavaClass;
use crate::classifier::ClassifierRef;

/// An annotation occurrence on a class, member, or value parameter.
///
/// Only the raw type descriptor and a reference created from the resolver
/// scope at visitation time are recorded. The annotation class itself is looked
/// up on first query. Argument values are not decoded.
#[derive(Debug, Clone)]
pub struct JavaAnnotation {
    descriptor: String,
    classifier: ClassifierRef,
}

impl JavaAnnotation {
    pub fn new(descriptor: impl Into<String>, classifier: ClassifierRef) -> Self {
        Self {
            descriptor: descriptor.into(),
            classifier,
        }
    }

    /// The raw type descriptor, e.g. `Ljava/lang/Deprecated;`.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn classifier_ref(&self) -> &ClassifierRef {
        &self.classifier
    }

    pub fn resolve(&self) -> Option<Arc<JavaClass>> {
        self.classifier.resolve_class()
    }

    /// Qualified name of the annotation class, preferring the resolved class.
    pub fn fq_name(&self) -> String {
        match self.resolve() {
            Some(class) => class.fq_name.clone(),
            None => self.classifier.name().to_string(),
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.resolve()
            .and_then(|class| ClassId::of_class(&class))
            .unwrap_or_else(|| ClassId::top_level(self.classifier.name()))
    }
}

/// Package + relative class name split of a qualified class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId {
    pub package_fq_name: String,
    pub relative_class_name: String,
}

impl ClassId {
    pub fn top_level(fq_name: &str) -> Self {
        match fq_name.rsplit_once('.') {
            Some((package, name)) => Self {
                package_fq_name: package.to_string(),
                relative_class_name: name.to_string(),
            },
            None => Self {
                package_fq_name: String::new(),
                relative_class_name: fq_name.to_string(),
            },
        }
    }

    /// Builds the id by walking the outer-class chain, so nested classes keep
    /// their enclosing class names in the relative part.
    pub fn of_class(class: &JavaClass) -> Option<Self> {
        let Some(outer) = class.outer_class() else {
            return Some(Self::top_level(&class.fq_name));
        };
        let outer_id = Self::of_class(&outer)?;
        Some(Self {
            package_fq_name: outer_id.package_fq_name,
            relative_class_name: format!("{}.{}", outer_id.relative_class_name, class.name()),
        })
    }

    pub fn as_fq_name(&self) -> String {
        if self.package_fq_name.is_empty() {
            self.relative_class_name.clone()
        } else {
            format!("{}.{}", self.package_fq_name, self.relative_class_name)
        }
    }
}

/// Annotations collected during visitation plus a lazily built name index.
///
/// The collection is append-only while the owner is being built; the index is
/// computed on the first [`Annotations::find`] and never invalidated.
#[derive(Default)]
pub struct Annotations {
    items: Vec<JavaAnnotation>,
    by_fq_name: OnceLock<HashMap<String, usize>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: JavaAnnotation) {
        debug_assert!(
            self.by_fq_name.get().is_none(),
            "annotations must not change after they have been queried"
        );
        self.items.push(annotation);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JavaAnnotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds the first annotation whose class has the given qualified name.
    pub fn find(&self, fq_name: &str) -> Option<&JavaAnnotation> {
        let index = self.by_fq_name.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.items.len());
            for (idx, annotation) in self.items.iter().enumerate() {
                map.entry(annotation.fq_name()).or_insert(idx);
            }
            map
        });
        index.get(fq_name).map(|&idx| &self.items[idx])
    }
}

impl Clone for Annotations {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            by_fq_name: OnceLock::new(),
        }
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a JavaAnnotation;
    type IntoIter = std::slice::Iter<'a, JavaAnnotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// `Lcom/example/Ann;` -> `com/example/Ann`.
pub fn descriptor_to_internal_name(desc: &str) -> Option<&str> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_uses_best_effort_names_for_unresolved_annotations() {
        let mut annotations = Annotations::new();
        annotations.push(JavaAnnotation::new(
            "Ljava/lang/Deprecated;",
            ClassifierRef::detached("java.lang.Deprecated"),
        ));
        annotations.push(JavaAnnotation::new(
            "Lorg/jetbrains/annotations/NotNull;",
            ClassifierRef::detached("org.jetbrains.annotations.NotNull"),
        ));

        let found = annotations
            .find("org.jetbrains.annotations.NotNull")
            .expect("NotNull annotation");
        assert_eq!(found.descriptor(), "Lorg/jetbrains/annotations/NotNull;");
        assert!(annotations.find("java.lang.Override").is_none());
    }

    #[test]
    fn top_level_class_id_splits_package() {
        let id = ClassId::top_level("java.lang.Deprecated");
        assert_eq!(id.package_fq_name, "java.lang");
        assert_eq!(id.relative_class_name, "Deprecated");
        assert_eq!(ClassId::top_level("Foo").as_fq_name(), "Foo");
    }

    #[test]
    fn descriptor_to_internal_name_strips_wrapper() {
        assert_eq!(
            descriptor_to_internal_name("Ljava/lang/Deprecated;"),
            Some("java/lang/Deprecated")
        );
        assert_eq!(descriptor_to_internal_name("I"), None);
    }
}
