use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use binjava_model::{ClassLookup, ClassifierRef, JavaTypeParameter};

/// Scoped name environment used while parsing one class.
///
/// Type parameter bindings live in a map owned by this value. [`fork`] copies
/// the map and shares the external lookup, so bindings added to a fork (a
/// method's own type parameters, an inner class being loaded) never leak back
/// into the scope it was forked from.
///
/// [`fork`]: ClassifierResolver::fork
#[derive(Clone)]
pub struct ClassifierResolver {
    type_parameters: HashMap<String, Arc<JavaTypeParameter>>,
    /// The type parameter whose bounds are being parsed.
    declaring: Option<(String, Weak<JavaTypeParameter>)>,
    classes: ClassLookup,
}

impl ClassifierResolver {
    pub fn new(classes: ClassLookup) -> Self {
        Self {
            type_parameters: HashMap::new(),
            declaring: None,
            classes,
        }
    }

    /// A resolver whose external lookup never finds anything.
    pub fn detached() -> Self {
        Self::new(Arc::new(|_: &str| None))
    }

    /// Resolves a name against the type parameters in scope, falling back to
    /// the external lookup. Never fails: an unknown name yields a reference
    /// that resolves to `None`.
    pub fn resolve(&self, name: &str) -> ClassifierRef {
        if let Some((declaring, tp)) = &self.declaring {
            if declaring == name {
                return ClassifierRef::declaring_type_parameter(name, tp.clone());
            }
        }
        match self.type_parameters.get(name) {
            Some(tp) => ClassifierRef::type_parameter(name, tp.clone()),
            None => self.resolve_class(name),
        }
    }

    /// Resolves a qualified class name through the external lookup only.
    pub fn resolve_class(&self, qualified_name: &str) -> ClassifierRef {
        ClassifierRef::deferred(qualified_name, self.classes.clone())
    }

    pub fn resolve_by_internal_name(&self, internal_name: &str) -> ClassifierRef {
        self.resolve(&Self::map_internal_name_to_qualified_name(internal_name))
    }

    /// Class-only variant of [`Self::resolve_by_internal_name`]; type
    /// parameters in scope are ignored.
    pub fn resolve_class_by_internal_name(&self, internal_name: &str) -> ClassifierRef {
        self.resolve_class(&Self::map_internal_name_to_qualified_name(internal_name))
    }

    pub fn bind(&mut self, type_parameter: Arc<JavaTypeParameter>) {
        self.type_parameters
            .insert(type_parameter.name.clone(), type_parameter);
    }

    /// Makes `name` resolve to the parameter under construction until
    /// [`Self::end_declaration`], shadowing any binding of the same name.
    pub(crate) fn begin_declaration(&mut self, name: &str, tp: Weak<JavaTypeParameter>) {
        self.declaring = Some((name.to_owned(), tp));
    }

    pub(crate) fn end_declaration(&mut self) {
        self.declaring = None;
    }

    pub fn type_parameter(&self, name: &str) -> Option<&Arc<JavaTypeParameter>> {
        self.type_parameters.get(name)
    }

    pub fn lookup(&self) -> &ClassLookup {
        &self.classes
    }

    /// Independent copy of the current bindings sharing the same lookup.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Converts `a/b/Outer$Inner` into `a.b.Outer.Inner`.
    ///
    /// A `$` becomes a nested-class separator only when it is not the first
    /// character, does not follow `/`, is not the last character, and is not
    /// part of a `$$` run. This guesses wrong for classes whose own simple
    /// name contains `$` (e.g. `Foo$Bar` declared as a top-level class); the
    /// same guess is made by other binary-class tooling, so it is kept as is.
    /// Unlike the common conversion, which only checks the next character and
    /// maps `a/b$$c$d` to `a.b$.c.d`, both `$` of a `$$` run are kept here,
    /// giving `a.b$$c.d`.
    pub fn map_internal_name_to_qualified_name(internal_name: &str) -> String {
        if !internal_name.contains('$') {
            return internal_name.replace('/', ".");
        }

        let chars: Vec<char> = internal_name.chars().collect();
        let mut out = String::with_capacity(internal_name.len());
        for (idx, &c) in chars.iter().enumerate() {
            let mapped = match c {
                '/' => '.',
                '$' if idx > 0
                    && chars[idx - 1] != '/'
                    && chars[idx - 1] != '$'
                    && idx + 1 < chars.len()
                    && chars[idx + 1] != '$' =>
                {
                    '.'
                }
                other => other,
            };
            out.push(mapped);
        }
        out
    }
}

impl fmt::Debug for ClassifierResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.type_parameters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ClassifierResolver")
            .field("type_parameters", &names)
            .finish_non_exhaustive()
    }
}
