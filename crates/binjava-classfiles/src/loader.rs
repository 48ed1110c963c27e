use std::fmt;
use std::sync::Arc;

use binjava_config::LoaderConfig;
use binjava_model::{AccessFlags, InnerClassLoader, JavaClass};
use binjava_signature::{ClassifierResolver, SignatureParser};

use crate::builder::BinaryClassBuilder;
use crate::content::{ClassContent, ClassContentProvider};
use crate::error::Result;

/// Shared by a loader and every inner class loader it hands out.
struct LoadContext {
    provider: Arc<dyn ClassContentProvider>,
    parser: SignatureParser,
    config: LoaderConfig,
}

/// Loads classes from a [`ClassContentProvider`].
///
/// Every loaded class gets an [`InnerClassLoader`] so
/// [`JavaClass::find_inner_class`] can build its inner classes on demand, in
/// a fork of the enclosing class's scope. Nothing is cached.
pub struct BinaryClassLoader {
    context: Arc<LoadContext>,
    resolver: ClassifierResolver,
}

impl BinaryClassLoader {
    pub fn new(
        provider: Arc<dyn ClassContentProvider>,
        resolver: ClassifierResolver,
        config: LoaderConfig,
    ) -> Self {
        let parser = SignatureParser::new(&resolver);
        Self {
            context: Arc::new(LoadContext {
                provider,
                parser,
                config,
            }),
            resolver,
        }
    }

    /// Parser shared by every class this loader builds; its
    /// [`object_type`](SignatureParser::object_type) identifies the root type
    /// in their supertypes and bounds.
    pub fn parser(&self) -> &SignatureParser {
        &self.context.parser
    }

    /// Returns `Ok(None)` when the provider has no content for `internal_name`.
    pub fn load_class(&self, internal_name: &str) -> Result<Option<Arc<JavaClass>>> {
        let Some(content) = self.context.provider.class_content(internal_name) else {
            tracing::debug!(
                target: "binjava.classfiles",
                class = %internal_name,
                "class content not found"
            );
            return Ok(None);
        };
        self.load_content(&content).map(Some)
    }

    /// Builds a top-level class from already available content.
    pub fn load_content(&self, content: &ClassContent) -> Result<Arc<JavaClass>> {
        build_class(&self.context, content, self.resolver.fork(), None)
    }
}

impl fmt::Debug for BinaryClassLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryClassLoader")
            .field("config", &self.context.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

fn build_class(
    context: &Arc<LoadContext>,
    content: &ClassContent,
    resolver: ClassifierResolver,
    outer: Option<(&Arc<JavaClass>, AccessFlags)>,
) -> Result<Arc<JavaClass>> {
    let mut builder = BinaryClassBuilder::new(&context.parser, &context.config, resolver);
    if let Some((outer, access)) = outer {
        builder = builder.with_outer(outer, access);
    }
    content.accept(&mut builder);

    let (mut class, scope) = builder.finish_with_scope()?;
    class.set_inner_class_loader(Arc::new(ScopedInnerClassLoader {
        context: context.clone(),
        resolver: scope,
    }));
    Ok(Arc::new(class))
}

/// Finds `Outer$Name` through the provider and builds it with the outer
/// class's type parameters in scope.
struct ScopedInnerClassLoader {
    context: Arc<LoadContext>,
    resolver: ClassifierResolver,
}

impl InnerClassLoader for ScopedInnerClassLoader {
    fn load_inner_class(
        &self,
        outer: &Arc<JavaClass>,
        name: &str,
        access: AccessFlags,
    ) -> Option<Arc<JavaClass>> {
        let internal_name = format!("{}${}", outer.internal_name, name);
        let Some(content) = self.context.provider.class_content(&internal_name) else {
            tracing::debug!(
                target: "binjava.classfiles",
                outer = %outer.fq_name,
                inner = %name,
                "inner class content not found"
            );
            return None;
        };

        tracing::trace!(
            target: "binjava.classfiles",
            class = %internal_name,
            "loading inner class"
        );
        match build_class(
            &self.context,
            &content,
            self.resolver.fork(),
            Some((outer, access)),
        ) {
            Ok(class) => Some(class),
            Err(err) => {
                tracing::debug!(
                    target: "binjava.classfiles",
                    class = %internal_name,
                    error = %err,
                    "failed to load inner class"
                );
                None
            }
        }
    }
}
