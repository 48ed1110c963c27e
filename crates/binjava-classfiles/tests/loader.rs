use std::collections::HashMap;
use std::sync::Arc;

use binjava_classfiles::{
    BinaryClassLoader, ClassContent, ClassHeader, FieldRecord, InMemoryClassContents, LoadError,
    MethodRecord,
};
use binjava_config::LoaderConfig;
use binjava_model::{AccessFlags, ClassLookup, JavaClass, JavaType, PrimitiveType};
use binjava_signature::ClassifierResolver;
use pretty_assertions::assert_eq;

const PUBLIC: AccessFlags = AccessFlags::PUBLIC;

fn outer_content() -> ClassContent {
    ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC | AccessFlags::SUPER, "com/example/Outer")
                .with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
                .with_super_name("java/lang/Object"),
        )
        .inner_class(
            "com/example/Outer$Inner",
            Some("com/example/Outer"),
            Some("Inner"),
            PUBLIC,
        )
        .inner_class(
            "com/example/Outer$Nested",
            Some("com/example/Outer"),
            Some("Nested"),
            PUBLIC | AccessFlags::STATIC,
        )
        .inner_class(
            "com/example/Outer$Generic",
            Some("com/example/Outer"),
            Some("Generic"),
            PUBLIC,
        )
        .inner_class(
            "com/example/Outer$Missing",
            Some("com/example/Outer"),
            Some("Missing"),
            PUBLIC,
        )
        .build()
}

fn inner_content() -> ClassContent {
    ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC | AccessFlags::SUPER, "com/example/Outer$Inner")
                .with_signature("Ljava/lang/Object;")
                .with_super_name("java/lang/Object"),
        )
        .field(FieldRecord::new(PUBLIC, "value", "Ljava/lang/Object;").signature("TT;"))
        .method(
            MethodRecord::new(PUBLIC, "<init>", "(Lcom/example/Outer;I)V")
                .parameter_annotation(0, "Lcom/example/Synthetic;", true)
                .parameter_annotation(1, "Lcom/example/Positive;", true),
        )
        .build()
}

fn nested_content() -> ClassContent {
    ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC | AccessFlags::SUPER, "com/example/Outer$Nested")
                .with_super_name("java/lang/Object"),
        )
        .method(MethodRecord::new(PUBLIC, "<init>", "(I)V"))
        .build()
}

fn generic_content() -> ClassContent {
    ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC | AccessFlags::SUPER, "com/example/Outer$Generic")
                .with_super_name("java/lang/Object"),
        )
        .method(
            MethodRecord::new(PUBLIC, "<init>", "(Lcom/example/Outer;Ljava/util/List;)V")
                .signature("(Ljava/util/List<Ljava/lang/String;>;)V"),
        )
        .build()
}

fn loader_with(lookup: ClassLookup) -> BinaryClassLoader {
    let contents = InMemoryClassContents::new()
        .with(outer_content())
        .with(inner_content())
        .with(nested_content())
        .with(generic_content());
    BinaryClassLoader::new(
        Arc::new(contents),
        ClassifierResolver::new(lookup),
        LoaderConfig::default(),
    )
}

fn loader() -> BinaryClassLoader {
    loader_with(Arc::new(|_: &str| None))
}

fn load_outer(loader: &BinaryClassLoader) -> Arc<JavaClass> {
    loader
        .load_class("com/example/Outer")
        .unwrap()
        .expect("outer class content")
}

#[test]
fn unknown_classes_load_as_none() {
    assert!(loader().load_class("com/example/Nowhere").unwrap().is_none());
}

#[test]
fn inner_classes_are_built_on_demand_with_outer_scope() {
    let loader = loader();
    let outer = load_outer(&loader);
    assert_eq!(
        outer.inner_class_names().collect::<Vec<_>>(),
        vec!["Generic", "Inner", "Missing", "Nested"]
    );

    let inner = outer.find_inner_class("Inner").expect("inner class");
    assert_eq!(inner.fq_name, "com.example.Outer.Inner");
    assert!(Arc::ptr_eq(&inner.outer_class().unwrap(), &outer));

    // `T` comes from the enclosing class's scope.
    let value = inner.fields[0].ty.as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(
        &value.classifier.bound_type_parameter().unwrap(),
        &outer.type_parameters[0]
    ));

    // Inner classes are not cached.
    let again = outer.find_inner_class("Inner").unwrap();
    assert!(!Arc::ptr_eq(&inner, &again));
}

#[test]
fn outer_instance_parameter_is_suppressed_on_the_descriptor_path() {
    let loader = loader();
    let outer = load_outer(&loader);
    let inner = outer.find_inner_class("Inner").unwrap();

    let constructor = &inner.constructors[0];
    assert_eq!(constructor.value_parameters.len(), 1);
    assert_eq!(
        constructor.value_parameters[0].ty,
        JavaType::primitive(PrimitiveType::Int)
    );

    // Descriptor parameter 1 is declared parameter 0; the annotation on the
    // enclosing instance has nowhere to go.
    let annotations = &constructor.value_parameters[0].annotations;
    assert_eq!(annotations.len(), 1);
    assert!(annotations.find("com.example.Positive").is_some());
}

#[test]
fn signature_constructors_are_not_suppressed_twice() {
    let loader = loader();
    let outer = load_outer(&loader);
    let generic = outer.find_inner_class("Generic").unwrap();

    let constructor = &generic.constructors[0];
    assert_eq!(constructor.value_parameters.len(), 1);
    let list = constructor.value_parameters[0]
        .ty
        .as_classifier_type()
        .unwrap();
    assert_eq!(list.classifier_qualified_name(), "java.util.List");
    assert_eq!(list.type_arguments.len(), 1);
}

#[test]
fn static_nested_classes_keep_all_constructor_parameters() {
    let loader = loader();
    let outer = load_outer(&loader);
    let nested = outer.find_inner_class("Nested").unwrap();

    // `static` only appears in the enclosing class's `InnerClasses` entry.
    assert!(nested.is_static());
    assert_eq!(nested.constructors[0].value_parameters.len(), 1);
}

#[test]
fn unresolvable_inner_classes_are_none() {
    let loader = loader();
    let outer = load_outer(&loader);
    assert!(outer.find_inner_class("Missing").is_none());
    assert!(outer.find_inner_class("NotRecorded").is_none());
}

#[test]
fn outer_link_does_not_keep_the_outer_class_alive() {
    let loader = loader();
    let outer = load_outer(&loader);
    let inner = outer.find_inner_class("Inner").unwrap();
    drop(outer);
    assert!(inner.outer_class().is_none());
}

#[test]
fn references_resolve_through_the_lookup() {
    let mut known = HashMap::new();
    known.insert(
        "com.example.Base".to_owned(),
        Arc::new(JavaClass::new("com.example.Base", "com/example/Base", PUBLIC)),
    );
    known.insert(
        "java.lang.Deprecated".to_owned(),
        Arc::new(JavaClass::new(
            "java.lang.Deprecated",
            "java/lang/Deprecated",
            PUBLIC | AccessFlags::INTERFACE | AccessFlags::ANNOTATION,
        )),
    );
    let lookup: ClassLookup = Arc::new(move |name: &str| known.get(name).cloned());

    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Derived").with_super_name("com/example/Base"))
        .annotation("Ljava/lang/Deprecated;", true)
        .build();
    let contents = InMemoryClassContents::new().with(content);
    let loader = BinaryClassLoader::new(
        Arc::new(contents),
        ClassifierResolver::new(lookup),
        LoaderConfig::default(),
    );

    let derived = loader.load_class("com/example/Derived").unwrap().unwrap();
    let base = derived.supertypes[0].classifier().unwrap();
    assert_eq!(base.as_class().unwrap().fq_name, "com.example.Base");

    let deprecated = derived.find_annotation("java.lang.Deprecated").unwrap();
    let resolved = deprecated.resolve().unwrap();
    assert!(resolved.is_annotation_type());
    let id = deprecated.class_id();
    assert_eq!(id.package_fq_name, "java.lang");
    assert_eq!(id.relative_class_name, "Deprecated");
}

#[test]
fn broken_content_is_reported() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Twice"))
        .header(ClassHeader::new(PUBLIC, "com/example/Twice"))
        .build();
    let loader = BinaryClassLoader::new(
        Arc::new(InMemoryClassContents::new().with(content)),
        ClassifierResolver::detached(),
        LoaderConfig::default(),
    );
    assert_eq!(
        loader.load_class("com/example/Twice").unwrap_err(),
        LoadError::DuplicateHeader {
            name: "com/example/Twice".to_owned()
        }
    );
}

#[test]
fn loaded_classes_share_the_object_sentinel() {
    let loader = loader();
    let outer = load_outer(&loader);
    let nested = outer.find_inner_class("Nested").unwrap();
    assert!(loader.parser().is_object_type(&outer.supertypes[0]));
    assert!(loader.parser().is_object_type(&nested.supertypes[0]));
}
