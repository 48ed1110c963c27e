use std::sync::Arc;

use binjava_classfiles::{
    BinaryClassBuilder, ClassContent, ClassHeader, FieldRecord, LoadError, MethodRecord,
};
use binjava_config::LoaderConfig;
use binjava_model::{
    AccessFlags, ConstantValue, JavaClass, JavaType, PrimitiveType, NO_NAME_PROVIDED,
};
use binjava_signature::{ClassifierResolver, SignatureParser};
use pretty_assertions::assert_eq;

const PUBLIC: AccessFlags = AccessFlags::PUBLIC;

fn try_build_with(
    content: &ClassContent,
    config: &LoaderConfig,
) -> (Result<JavaClass, LoadError>, SignatureParser) {
    let resolver = ClassifierResolver::detached();
    let parser = SignatureParser::new(&resolver);
    let mut builder = BinaryClassBuilder::new(&parser, config, resolver);
    content.accept(&mut builder);
    let result = builder.finish();
    (result, parser)
}

fn build_with(content: &ClassContent, config: &LoaderConfig) -> JavaClass {
    try_build_with(content, config).0.unwrap()
}

fn build(content: &ClassContent) -> JavaClass {
    build_with(content, &LoaderConfig::default())
}

fn method_names(class: &JavaClass) -> Vec<&str> {
    class.methods.iter().map(|m| m.name.as_str()).collect()
}

fn classifier_name(ty: &JavaType) -> &str {
    ty.as_classifier_type()
        .unwrap_or_else(|| panic!("expected classifier type, got {ty:?}"))
        .classifier_qualified_name()
}

#[test]
fn non_generic_header_uses_super_name_and_interfaces() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC | AccessFlags::SUPER, "com/example/Plain")
                .with_super_name("java/lang/Object")
                .with_interface("java/io/Serializable")
                .with_interface("java/util/Map$Entry"),
        )
        .build();

    let (class, parser) = try_build_with(&content, &LoaderConfig::default());
    let class = class.unwrap();
    assert_eq!(class.fq_name, "com.example.Plain");
    assert_eq!(class.name(), "Plain");
    assert_eq!(class.internal_name, "com/example/Plain");
    assert!(class.type_parameters.is_empty());

    assert_eq!(class.supertypes.len(), 3);
    assert!(parser.is_object_type(&class.supertypes[0]));
    assert_eq!(
        class.supertypes[1].classifier_qualified_name(),
        "java.io.Serializable"
    );
    assert_eq!(
        class.supertypes[2].classifier_qualified_name(),
        "java.util.Map.Entry"
    );
}

#[test]
fn class_type_parameters_are_visible_to_members() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC, "com/example/Box")
                .with_signature(
                    "<T:Ljava/lang/Object;>Ljava/util/AbstractList<TT;>;Ljava/util/RandomAccess;",
                )
                .with_super_name("java/util/AbstractList")
                .with_interface("java/util/RandomAccess"),
        )
        .method(MethodRecord::new(PUBLIC, "get", "(I)Ljava/lang/Object;").signature("(I)TT;"))
        .field(FieldRecord::new(AccessFlags::PRIVATE, "value", "Ljava/lang/Object;").signature("TT;"))
        .build();

    let class = build(&content);
    assert_eq!(class.type_parameters.len(), 1);
    let t = &class.type_parameters[0];
    assert_eq!(t.name, "T");
    assert!(t.bounds.is_empty());

    assert_eq!(class.supertypes.len(), 2);
    let list_arg = class.supertypes[0].type_arguments[0]
        .as_classifier_type()
        .unwrap();
    assert!(Arc::ptr_eq(
        &list_arg.classifier.bound_type_parameter().unwrap(),
        t
    ));

    let get = &class.methods[0];
    assert_eq!(get.value_parameters.len(), 1);
    assert_eq!(
        get.value_parameters[0].ty,
        JavaType::primitive(PrimitiveType::Int)
    );
    let ret = get.return_type.as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(&ret.classifier.bound_type_parameter().unwrap(), t));

    let field = class.fields[0].ty.as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(&field.classifier.bound_type_parameter().unwrap(), t));
}

#[test]
fn method_type_parameters_stay_local_to_the_method() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Util").with_super_name("java/lang/Object"))
        .method(
            MethodRecord::new(
                PUBLIC | AccessFlags::STATIC,
                "first",
                "(Ljava/util/List;)Ljava/lang/Object;",
            )
            .signature("<E:Ljava/lang/Object;>(Ljava/util/List<TE;>;)TE;"),
        )
        .field(FieldRecord::new(PUBLIC, "leaked", "Ljava/lang/Object;").signature("TE;"))
        .build();

    let class = build(&content);
    let first = &class.methods[0];
    assert_eq!(first.type_parameters.len(), 1);
    let e = &first.type_parameters[0];
    let ret = first.return_type.as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(&ret.classifier.bound_type_parameter().unwrap(), e));

    // The field is read in the class scope, where `E` is unknown.
    let leaked = class.fields[0].ty.as_classifier_type().unwrap();
    assert_eq!(leaked.classifier_qualified_name(), "E");
    assert!(leaked.classifier.bound_type_parameter().is_none());
    assert!(leaked.classifier().is_none());
}

#[test]
fn self_bounded_class_parameter_is_visible_in_its_bound_and_members() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC, "com/example/Node")
                .with_signature("<N:Lcom/example/Node<TN;>;>Ljava/lang/Object;")
                .with_super_name("java/lang/Object"),
        )
        .method(
            MethodRecord::new(PUBLIC, "next", "()Lcom/example/Node;").signature("()TN;"),
        )
        .build();

    let class = build(&content);
    let n = &class.type_parameters[0];
    assert_eq!(n.bounds[0].classifier_qualified_name(), "com.example.Node");
    let self_arg = n.bounds[0].type_arguments[0].as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(&self_arg.classifier.bound_type_parameter().unwrap(), n));

    let ret = class.methods[0].return_type.as_classifier_type().unwrap();
    assert!(Arc::ptr_eq(&ret.classifier.bound_type_parameter().unwrap(), n));
}

#[test]
fn malformed_class_signature_falls_back_to_raw_supertypes() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC, "com/example/Broken")
                .with_signature("<T:Ljava/lang/Object;")
                .with_super_name("com/example/Base"),
        )
        .method(MethodRecord::new(PUBLIC, "get", "()Ljava/lang/Object;").signature("()TT;"))
        .build();

    let class = build(&content);
    assert!(class.type_parameters.is_empty());
    assert_eq!(class.supertypes.len(), 1);
    assert_eq!(
        class.supertypes[0].classifier_qualified_name(),
        "com.example.Base"
    );

    // No half-parsed `T` leaked into the class scope.
    let ret = class.methods[0].return_type.as_classifier_type().unwrap();
    assert!(ret.classifier.bound_type_parameter().is_none());
}

fn enum_content() -> ClassContent {
    ClassContent::builder()
        .header(
            ClassHeader::new(
                PUBLIC | AccessFlags::FINAL | AccessFlags::SUPER | AccessFlags::ENUM,
                "com/example/Color",
            )
            .with_signature("Ljava/lang/Enum<Lcom/example/Color;>;")
            .with_super_name("java/lang/Enum"),
        )
        .field(FieldRecord::new(
            PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::ENUM,
            "RED",
            "Lcom/example/Color;",
        ))
        .field(FieldRecord::new(
            AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::SYNTHETIC,
            "$VALUES",
            "[Lcom/example/Color;",
        ))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::STATIC,
            "values",
            "()[Lcom/example/Color;",
        ))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::STATIC,
            "valueOf",
            "(Ljava/lang/String;)Lcom/example/Color;",
        ))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::STATIC,
            "valueOf",
            "(I)Lcom/example/Color;",
        ))
        .method(
            MethodRecord::new(AccessFlags::PRIVATE, "<init>", "(Ljava/lang/String;I)V")
                .signature("()V"),
        )
        .method(MethodRecord::new(AccessFlags::STATIC, "<clinit>", "()V"))
        .method(MethodRecord::new(PUBLIC, "label", "()Ljava/lang/String;"))
        .build()
}

#[test]
fn enum_synthesized_members_are_dropped() {
    let class = build(&enum_content());
    assert!(class.is_enum());
    assert_eq!(method_names(&class), vec!["valueOf", "label"]);
    assert_eq!(
        class.methods[0].value_parameters[0].ty,
        JavaType::primitive(PrimitiveType::Int)
    );
    assert!(class.constructors.is_empty());

    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "RED");
    assert!(class.fields[0].is_enum_entry);
    assert!(class.fields[0].is_static());
}

#[test]
fn enum_synthesized_members_can_be_kept() {
    let config = LoaderConfig {
        skip_enum_synthesized_members: false,
        ..LoaderConfig::default()
    };
    let class = build_with(&enum_content(), &config);
    assert_eq!(method_names(&class), vec!["values", "valueOf", "valueOf", "label"]);
    assert_eq!(class.constructors.len(), 1);
    // `<clinit>` and synthetic fields are dropped regardless.
    assert_eq!(class.fields.len(), 1);
}

#[test]
fn synthetic_bridge_and_static_initializers_are_dropped() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(PUBLIC, "com/example/Name")
                .with_super_name("java/lang/Object")
                .with_interface("java/lang/Comparable"),
        )
        .method(MethodRecord::new(PUBLIC, "compareTo", "(Lcom/example/Name;)I"))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::BRIDGE | AccessFlags::SYNTHETIC,
            "compareTo",
            "(Ljava/lang/Object;)I",
        ))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::BRIDGE,
            "compareTo",
            "(Ljava/lang/Object;)I",
        ))
        .method(MethodRecord::new(
            AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::SYNTHETIC,
            "lambda$sort$0",
            "(II)I",
        ))
        .method(MethodRecord::new(AccessFlags::STATIC, "<clinit>", "()V"))
        .method(MethodRecord::new(PUBLIC, "<init>", "()V"))
        .build();

    let class = build(&content);
    assert_eq!(method_names(&class), vec!["compareTo"]);
    assert_eq!(classifier_name(&class.methods[0].value_parameters[0].ty), "com.example.Name");
    assert_eq!(class.constructors.len(), 1);
    assert_eq!(class.constructors[0].name(), NO_NAME_PROVIDED);
    assert!(class.constructors[0].value_parameters.is_empty());
}

#[test]
fn malformed_member_signatures_degrade_without_affecting_siblings() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Mixed").with_super_name("java/lang/Object"))
        .field(
            FieldRecord::new(PUBLIC, "names", "Ljava/util/List;")
                .signature("Ljava/util/List<Ljava/lang/String;"),
        )
        .method(
            MethodRecord::new(PUBLIC, "broken", "(Ljava/util/List;I)V")
                .signature("(Ljava/util/List<Ljava/lang/String;)V")
                .annotation("Ljava/lang/Deprecated;", true),
        )
        .method(
            MethodRecord::new(PUBLIC, "voidParam", "(I)V").signature("(V)V"),
        )
        .method(
            MethodRecord::new(PUBLIC, "hopeless", "(Ljava/util/List").signature("(Ljava/util/List"),
        )
        .method(
            MethodRecord::new(PUBLIC, "fine", "(Ljava/util/List;)V")
                .signature("(Ljava/util/List<Ljava/lang/String;>;)V"),
        )
        .field(FieldRecord::new(PUBLIC, "count", "I"))
        .build();

    let class = build(&content);
    assert_eq!(
        method_names(&class),
        vec!["broken", "voidParam", "hopeless", "fine"]
    );

    assert!(class.fields[0].ty.is_error());
    assert_eq!(class.fields[1].ty, JavaType::primitive(PrimitiveType::Int));

    let broken = &class.methods[0];
    assert!(broken.return_type.is_error());
    assert!(broken.type_parameters.is_empty());
    assert_eq!(broken.value_parameters.len(), 2);
    assert!(broken.value_parameters.iter().all(|p| p.ty.is_error()));
    // Member annotations still attach to the degraded member.
    assert!(broken.annotations.find("java.lang.Deprecated").is_some());

    let void_param = &class.methods[1];
    assert_eq!(void_param.value_parameters.len(), 1);
    assert!(void_param.value_parameters[0].ty.is_error());

    let hopeless = &class.methods[2];
    assert!(hopeless.value_parameters.is_empty());
    assert!(hopeless.return_type.is_error());

    let fine = &class.methods[3];
    assert!(fine.return_type.is_void());
    let list = fine.value_parameters[0].ty.as_classifier_type().unwrap();
    assert_eq!(list.classifier_qualified_name(), "java.util.List");
    assert_eq!(classifier_name(&list.type_arguments[0]), "java.lang.String");
}

#[test]
fn inner_class_entries_are_filtered_to_direct_named_members() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Outer").with_super_name("java/lang/Object"))
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
            AccessFlags::PRIVATE | AccessFlags::STATIC,
        )
        .inner_class("com/example/Outer$1", None, None, AccessFlags::EMPTY)
        .inner_class("com/example/Outer$1Local", None, Some("Local"), AccessFlags::EMPTY)
        .inner_class("java/util/Map$Entry", Some("java/util/Map"), Some("Entry"), PUBLIC)
        .inner_class(
            "com/example/Outer$Gen",
            Some("com/example/Outer"),
            Some("Gen"),
            AccessFlags::SYNTHETIC,
        )
        .build();

    let class = build(&content);
    let names: Vec<&str> = class.inner_class_names().collect();
    assert_eq!(names, vec!["Inner", "Nested"]);
    assert_eq!(
        class.inner_classes["Nested"],
        AccessFlags::PRIVATE | AccessFlags::STATIC
    );
}

#[test]
fn annotations_attach_to_their_owners() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Service").with_super_name("java/lang/Object"))
        .annotation("Ljava/lang/Deprecated;", true)
        .annotation("Ljavax/annotation/ParametersAreNonnullByDefault;", false)
        .annotation("I", true)
        .field(
            FieldRecord::new(PUBLIC, "name", "Ljava/lang/String;")
                .annotation("Lorg/jetbrains/annotations/Nullable;", false),
        )
        .method(
            MethodRecord::new(PUBLIC, "run", "(Ljava/lang/String;I)V")
                .annotation("Ljava/lang/Override;", true)
                .parameter_annotation(0, "Lorg/jetbrains/annotations/NotNull;", false)
                .parameter_annotation(1, "Lcom/example/Positive;", true)
                .parameter_annotation(7, "Lcom/example/Ignored;", true),
        )
        .build();

    let class = build(&content);
    assert_eq!(class.annotations.len(), 2);
    let deprecated = class.find_annotation("java.lang.Deprecated").unwrap();
    assert_eq!(deprecated.descriptor(), "Ljava/lang/Deprecated;");
    assert!(deprecated.resolve().is_none());
    assert!(class
        .find_annotation("javax.annotation.ParametersAreNonnullByDefault")
        .is_some());

    assert!(class.fields[0]
        .annotations
        .find("org.jetbrains.annotations.Nullable")
        .is_some());

    let run = &class.methods[0];
    assert!(run.annotations.find("java.lang.Override").is_some());
    let params = &run.value_parameters;
    assert!(params[0]
        .annotations
        .find("org.jetbrains.annotations.NotNull")
        .is_some());
    assert!(params[1].annotations.find("com.example.Positive").is_some());
    assert_eq!(params[0].annotations.len() + params[1].annotations.len(), 2);
}

#[test]
fn invisible_annotations_can_be_ignored() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Service"))
        .annotation("Ljava/lang/Deprecated;", true)
        .annotation("Ljavax/annotation/Nonnull;", false)
        .method(
            MethodRecord::new(PUBLIC, "run", "(I)V")
                .parameter_annotation(0, "Lorg/jetbrains/annotations/Range;", false),
        )
        .build();

    let config = LoaderConfig {
        record_invisible_annotations: false,
        ..LoaderConfig::default()
    };
    let class = build_with(&content, &config);
    assert_eq!(class.annotations.len(), 1);
    assert!(class.find_annotation("javax.annotation.Nonnull").is_none());
    assert!(class.methods[0].value_parameters[0].annotations.is_empty());
}

#[test]
fn varargs_marks_only_the_last_parameter() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Format"))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::STATIC | AccessFlags::VARARGS,
            "format",
            "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
        ))
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::STATIC,
            "join",
            "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
        ))
        .build();

    let class = build(&content);
    let flags = |idx: usize| -> Vec<bool> {
        class.methods[idx]
            .value_parameters
            .iter()
            .map(|p| p.is_vararg)
            .collect()
    };
    assert_eq!(flags(0), vec![false, true]);
    assert_eq!(flags(1), vec![false, false]);
}

#[test]
fn annotation_defaults_and_field_constants() {
    let content = ClassContent::builder()
        .header(
            ClassHeader::new(
                PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT | AccessFlags::ANNOTATION,
                "com/example/Retry",
            )
            .with_super_name("java/lang/Object")
            .with_interface("java/lang/annotation/Annotation"),
        )
        .method(
            MethodRecord::new(PUBLIC | AccessFlags::ABSTRACT, "attempts", "()I").annotation_default(),
        )
        .method(MethodRecord::new(
            PUBLIC | AccessFlags::ABSTRACT,
            "reason",
            "()Ljava/lang/String;",
        ))
        .field(
            FieldRecord::new(
                PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
                "MAX",
                "I",
            )
            .value(ConstantValue::Int(5)),
        )
        .build();

    let class = build(&content);
    assert!(class.is_annotation_type());
    assert!(class.is_interface());
    assert!(class.methods[0].has_annotation_parameter_default_value);
    assert!(!class.methods[1].has_annotation_parameter_default_value);
    assert_eq!(class.fields[0].initializer_value, Some(ConstantValue::Int(5)));
    assert!(!class.fields[0].is_enum_entry);
}

#[test]
fn broken_event_streams_fail_the_class() {
    let config = LoaderConfig::default();

    let empty = ClassContent::builder().build();
    assert_eq!(
        try_build_with(&empty, &config).0.unwrap_err(),
        LoadError::MissingHeader
    );

    let early = ClassContent::builder()
        .annotation("Ljava/lang/Deprecated;", true)
        .header(ClassHeader::new(PUBLIC, "com/example/Early"))
        .build();
    assert_eq!(
        try_build_with(&early, &config).0.unwrap_err(),
        LoadError::EventBeforeHeader {
            event: "annotation"
        }
    );

    let twice = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Twice"))
        .header(ClassHeader::new(PUBLIC, "com/example/Again"))
        .build();
    assert_eq!(
        try_build_with(&twice, &config).0.unwrap_err(),
        LoadError::DuplicateHeader {
            name: "com/example/Again".to_owned()
        }
    );
}

#[test]
fn top_level_constructors_keep_all_descriptor_parameters() {
    let content = ClassContent::builder()
        .header(ClassHeader::new(PUBLIC, "com/example/Outer$Inner"))
        .method(MethodRecord::new(PUBLIC, "<init>", "(Lcom/example/Outer;I)V"))
        .build();

    // Without a known outer class there is nothing to suppress.
    let class = build(&content);
    assert_eq!(class.fq_name, "com.example.Outer.Inner");
    assert_eq!(class.constructors[0].value_parameters.len(), 2);
}
