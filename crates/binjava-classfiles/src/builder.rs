//! Builds a [`JavaClass`] from class visitation events.

use std::sync::Arc;

use binjava_config::LoaderConfig;
use binjava_model::{
    descriptor_to_internal_name, AccessFlags, Annotations, JavaAnnotation, JavaClass,
    JavaClassifierType, JavaConstructor, JavaField, JavaMethod, JavaType, JavaValueParameter,
};
use binjava_signature::{ClassifierResolver, MethodSignature, SignatureParser};

use crate::error::{LoadError, MemberTypeError, Result};
use crate::visitor::{
    AnnotationEvent, ClassHeader, ClassVisitor, FieldEvent, InnerClassEvent, MemberSlot,
    MethodEvent, ParameterAnnotationEvent,
};

const OBJECT_INTERNAL_NAME: &str = "java/lang/Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    AwaitingHeader,
    BuildingMembers,
    Done,
}

/// Single-use [`ClassVisitor`] that assembles one class.
///
/// Member-level problems never fail the class: synthetic, bridge and
/// compiler-generated enum members are dropped, and a member whose signature
/// cannot be parsed is kept with [`JavaType::Error`] in place of its types.
/// Only a broken event stream (no header, two headers, events outside the
/// header..end window) makes [`finish`](Self::finish) fail.
pub struct BinaryClassBuilder<'a> {
    parser: &'a SignatureParser,
    config: &'a LoaderConfig,
    resolver: ClassifierResolver,
    outer: Option<Arc<JavaClass>>,
    inherited_access: AccessFlags,
    state: BuildState,
    class: Option<JavaClass>,
    /// Leading descriptor parameters dropped from each constructor.
    constructor_shifts: Vec<usize>,
    error: Option<LoadError>,
}

impl<'a> BinaryClassBuilder<'a> {
    /// `resolver` becomes the class scope; the class's type parameters are
    /// bound into it once the header has been read.
    pub fn new(
        parser: &'a SignatureParser,
        config: &'a LoaderConfig,
        resolver: ClassifierResolver,
    ) -> Self {
        Self {
            parser,
            config,
            resolver,
            outer: None,
            inherited_access: AccessFlags::EMPTY,
            state: BuildState::AwaitingHeader,
            class: None,
            constructor_shifts: Vec::new(),
            error: None,
        }
    }

    /// Builds an inner class of `outer`. `access` comes from the outer class's
    /// `InnerClasses` entry and is combined with the flags in the header,
    /// which never carry `static` or `private` for nested classes.
    pub fn with_outer(mut self, outer: &Arc<JavaClass>, access: AccessFlags) -> Self {
        self.outer = Some(outer.clone());
        self.inherited_access = access;
        self
    }

    pub fn finish(self) -> Result<JavaClass> {
        self.finish_with_scope().map(|(class, _)| class)
    }

    /// Like [`finish`](Self::finish), also returning the class scope with the
    /// class's own type parameters bound.
    pub fn finish_with_scope(self) -> Result<(JavaClass, ClassifierResolver)> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let class = self.class.ok_or(LoadError::MissingHeader)?;
        tracing::trace!(
            target: "binjava.classfiles",
            class = %class.fq_name,
            methods = class.methods.len(),
            constructors = class.constructors.len(),
            fields = class.fields.len(),
            "built class"
        );
        Ok((class, self.resolver))
    }

    fn record_error(&mut self, error: LoadError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// The class under construction, or `None` (with the error recorded) when
    /// `event` arrived outside the header..end window.
    fn building(&mut self, event: &'static str) -> Option<&mut JavaClass> {
        match self.state {
            BuildState::BuildingMembers => self.class.as_mut(),
            BuildState::AwaitingHeader => {
                self.record_error(LoadError::EventBeforeHeader { event });
                None
            }
            BuildState::Done => {
                let name = self
                    .class
                    .as_ref()
                    .map(|class| class.internal_name.clone())
                    .unwrap_or_default();
                self.record_error(LoadError::EventAfterEnd { name, event });
                None
            }
        }
    }

    fn class_name(&self) -> &str {
        self.class.as_ref().map_or("", |class| class.fq_name.as_str())
    }

    fn read_header(&mut self, header: &ClassHeader) {
        let access = self.inherited_access | header.access;
        let fq_name = ClassifierResolver::map_internal_name_to_qualified_name(&header.name);
        let mut class = JavaClass::new(fq_name, header.name.clone(), access);
        if let Some(outer) = &self.outer {
            class.set_outer_class(outer);
        }

        let signature = header.signature.as_deref().and_then(|signature| {
            // Parsed on a fork so a half-read type parameter list never ends
            // up in the class scope.
            let mut scope = self.resolver.fork();
            match self.parser.parse_class_signature(signature, &mut scope) {
                Ok(parsed) => {
                    self.resolver = scope;
                    Some(parsed)
                }
                Err(err) => {
                    tracing::debug!(
                        target: "binjava.classfiles",
                        class = %class.fq_name,
                        error = %err,
                        "malformed class signature; falling back to the raw supertypes"
                    );
                    None
                }
            }
        });

        match signature {
            Some(signature) => {
                class.type_parameters = signature.type_parameters;
                class.supertypes = signature.supertypes;
            }
            None => {
                class.supertypes = header
                    .super_name
                    .iter()
                    .chain(&header.interfaces)
                    .map(|name| self.class_type(name))
                    .collect();
            }
        }

        self.class = Some(class);
        self.state = BuildState::BuildingMembers;
    }

    fn class_type(&self, internal_name: &str) -> Arc<JavaClassifierType> {
        if internal_name == OBJECT_INTERNAL_NAME {
            return self.parser.object_type().clone();
        }
        Arc::new(JavaClassifierType::new(
            self.resolver.resolve_class_by_internal_name(internal_name),
            Vec::new(),
        ))
    }

    fn dropped_method_reason(&self, event: &MethodEvent, is_enum: bool) -> Option<&'static str> {
        if event.access.is_synthetic() {
            return Some("synthetic");
        }
        if event.access.contains(AccessFlags::BRIDGE) {
            return Some("bridge");
        }
        if event.name == "<clinit>" {
            return Some("static initializer");
        }
        // Compiler-generated enum members are not always flagged synthetic.
        if is_enum && self.config.skip_enum_synthesized_members {
            let generated = match event.name.as_str() {
                "<init>" => true,
                "values" => event.descriptor.starts_with("()"),
                "valueOf" => event.descriptor.starts_with("(Ljava/lang/String;)"),
                _ => false,
            };
            if generated {
                return Some("enum synthesized");
            }
        }
        None
    }

    fn method_types(
        &self,
        event: &MethodEvent,
        scope: &mut ClassifierResolver,
    ) -> Result<MethodSignature, MemberTypeError> {
        let types = match event.signature.as_deref() {
            Some(signature) => self.parser.parse_method_signature(signature, scope)?,
            None => self.parser.parse_method_descriptor(&event.descriptor, scope)?,
        };
        if types.parameter_types.iter().any(JavaType::is_void) {
            return Err(MemberTypeError::VoidOutsideReturn);
        }
        Ok(types)
    }

    /// Placeholder types for a method whose declared types are unusable. The
    /// arity comes from the descriptor when that still parses.
    fn erroneous_method_types(&self, event: &MethodEvent) -> MethodSignature {
        let arity = self
            .parser
            .parse_method_descriptor(&event.descriptor, &self.resolver)
            .map_or(0, |descriptor| descriptor.parameter_types.len());
        MethodSignature {
            type_parameters: Vec::new(),
            parameter_types: vec![JavaType::Error; arity],
            return_type: JavaType::Error,
        }
    }

    fn field_type(&self, event: &FieldEvent) -> Result<JavaType, MemberTypeError> {
        let ty = match event.signature.as_deref() {
            Some(signature) => self.parser.parse_type_signature(signature, &self.resolver)?,
            None => self
                .parser
                .parse_field_descriptor(&event.descriptor, &self.resolver)?,
        };
        if ty.is_void() {
            return Err(MemberTypeError::VoidOutsideReturn);
        }
        Ok(ty)
    }

    fn annotation(&self, event: &AnnotationEvent) -> Option<JavaAnnotation> {
        if !event.visible && !self.config.record_invisible_annotations {
            return None;
        }
        let Some(internal_name) = descriptor_to_internal_name(&event.descriptor) else {
            tracing::debug!(
                target: "binjava.classfiles",
                class = %self.class_name(),
                descriptor = %event.descriptor,
                "ignoring annotation with a non-class descriptor"
            );
            return None;
        };
        Some(JavaAnnotation::new(
            event.descriptor.clone(),
            self.resolver.resolve_class_by_internal_name(internal_name),
        ))
    }
}

fn value_parameters(
    access: AccessFlags,
    parameter_types: Vec<JavaType>,
    skip: usize,
) -> Vec<JavaValueParameter> {
    let is_varargs = access.contains(AccessFlags::VARARGS);
    let count = parameter_types.len();
    parameter_types
        .into_iter()
        .enumerate()
        .skip(skip)
        .map(|(idx, ty)| JavaValueParameter::new(ty, is_varargs && idx + 1 == count))
        .collect()
}

impl ClassVisitor for BinaryClassBuilder<'_> {
    fn visit(&mut self, header: &ClassHeader) {
        match self.state {
            BuildState::AwaitingHeader => self.read_header(header),
            BuildState::BuildingMembers | BuildState::Done => {
                self.record_error(LoadError::DuplicateHeader {
                    name: header.name.clone(),
                });
            }
        }
    }

    fn visit_annotation(&mut self, event: &AnnotationEvent) {
        if self.building("annotation").is_none() {
            return;
        }
        let Some(annotation) = self.annotation(event) else {
            return;
        };
        if let Some(class) = self.class.as_mut() {
            class.annotations.push(annotation);
        }
    }

    fn visit_inner_class(&mut self, event: &InnerClassEvent) {
        let Some(class) = self.building("inner class") else {
            return;
        };
        if event.access.is_synthetic() {
            return;
        }
        // Local and anonymous classes have no usable simple name.
        let (Some(outer_name), Some(inner_name)) = (&event.outer_name, &event.inner_name) else {
            return;
        };
        // The attribute also lists the enclosing classes and unrelated nested
        // classes this class refers to.
        if *outer_name != class.internal_name {
            return;
        }
        class.inner_classes.insert(inner_name.clone(), event.access);
    }

    fn visit_field(&mut self, event: &FieldEvent) -> Option<MemberSlot> {
        self.building("field")?;
        if event.access.is_synthetic() {
            tracing::trace!(
                target: "binjava.classfiles",
                class = %self.class_name(),
                field = %event.name,
                "dropping synthetic field"
            );
            return None;
        }

        let ty = match self.field_type(event) {
            Ok(ty) => ty,
            Err(err) => {
                tracing::debug!(
                    target: "binjava.classfiles",
                    class = %self.class_name(),
                    member = %event.name,
                    error = %err,
                    "malformed field type; using an erroneous type"
                );
                JavaType::Error
            }
        };

        let field = JavaField {
            name: event.name.clone(),
            access: event.access,
            ty,
            annotations: Annotations::new(),
            is_enum_entry: event.access.contains(AccessFlags::ENUM),
            initializer_value: event.value.clone(),
        };
        let class = self.class.as_mut()?;
        let index = class.fields.len();
        class.fields.push(field);
        Some(MemberSlot::Field(index))
    }

    fn visit_method(&mut self, event: &MethodEvent) -> Option<MemberSlot> {
        let class = self.building("method")?;
        let is_enum = class.is_enum();
        let is_static = class.is_static();

        if let Some(reason) = self.dropped_method_reason(event, is_enum) {
            tracing::trace!(
                target: "binjava.classfiles",
                class = %self.class_name(),
                method = %event.name,
                descriptor = %event.descriptor,
                reason,
                "dropping method"
            );
            return None;
        }

        let mut scope = self.resolver.fork();
        let (types, from_descriptor) = match self.method_types(event, &mut scope) {
            Ok(types) => (types, event.signature.is_none()),
            Err(err) => {
                tracing::debug!(
                    target: "binjava.classfiles",
                    class = %self.class_name(),
                    member = %event.name,
                    descriptor = %event.descriptor,
                    error = %err,
                    "malformed method signature; using erroneous types"
                );
                (self.erroneous_method_types(event), true)
            }
        };

        let is_constructor = event.name == "<init>";
        // The descriptor of a non-static inner class constructor starts with
        // the enclosing instance; the generic signature already omits it.
        let suppress_outer_instance = is_constructor
            && self.outer.is_some()
            && !is_static
            && from_descriptor
            && !types.parameter_types.is_empty();
        let skip = usize::from(suppress_outer_instance);
        let parameters = value_parameters(event.access, types.parameter_types, skip);

        let class = self.class.as_mut()?;
        if is_constructor {
            let index = class.constructors.len();
            class.constructors.push(JavaConstructor {
                access: event.access,
                type_parameters: types.type_parameters,
                value_parameters: parameters,
                annotations: Annotations::new(),
            });
            self.constructor_shifts.push(skip);
            Some(MemberSlot::Constructor(index))
        } else {
            let index = class.methods.len();
            class.methods.push(JavaMethod {
                name: event.name.clone(),
                access: event.access,
                type_parameters: types.type_parameters,
                value_parameters: parameters,
                return_type: types.return_type,
                annotations: Annotations::new(),
                has_annotation_parameter_default_value: false,
            });
            Some(MemberSlot::Method(index))
        }
    }

    fn visit_member_annotation(&mut self, slot: MemberSlot, event: &AnnotationEvent) {
        if self.building("member annotation").is_none() {
            return;
        }
        let Some(annotation) = self.annotation(event) else {
            return;
        };
        let Some(class) = self.class.as_mut() else {
            return;
        };
        let annotations = match slot {
            MemberSlot::Method(idx) => class.methods.get_mut(idx).map(|m| &mut m.annotations),
            MemberSlot::Constructor(idx) => {
                class.constructors.get_mut(idx).map(|c| &mut c.annotations)
            }
            MemberSlot::Field(idx) => class.fields.get_mut(idx).map(|f| &mut f.annotations),
        };
        if let Some(annotations) = annotations {
            annotations.push(annotation);
        }
    }

    fn visit_parameter_annotation(&mut self, slot: MemberSlot, event: &ParameterAnnotationEvent) {
        if self.building("parameter annotation").is_none() {
            return;
        }
        let shift = match slot {
            MemberSlot::Constructor(idx) => self.constructor_shifts.get(idx).copied().unwrap_or(0),
            MemberSlot::Method(_) | MemberSlot::Field(_) => 0,
        };
        let Some(index) = event.parameter.checked_sub(shift) else {
            return;
        };
        let Some(annotation) = self.annotation(&event.annotation) else {
            return;
        };
        let Some(class) = self.class.as_mut() else {
            return;
        };
        let parameters = match slot {
            MemberSlot::Method(idx) => class.methods.get_mut(idx).map(|m| &mut m.value_parameters),
            MemberSlot::Constructor(idx) => class
                .constructors
                .get_mut(idx)
                .map(|c| &mut c.value_parameters),
            MemberSlot::Field(_) => None,
        };
        if let Some(parameter) = parameters.and_then(|params| params.get_mut(index)) {
            parameter.annotations.push(annotation);
        }
    }

    fn visit_annotation_default(&mut self, slot: MemberSlot) {
        let Some(class) = self.building("annotation default") else {
            return;
        };
        if let MemberSlot::Method(idx) = slot {
            if let Some(method) = class.methods.get_mut(idx) {
                method.has_annotation_parameter_default_value = true;
            }
        }
    }

    fn visit_end(&mut self) {
        match self.state {
            BuildState::BuildingMembers => self.state = BuildState::Done,
            // `finish` reports the missing header.
            BuildState::AwaitingHeader => {}
            BuildState::Done => {
                self.building("end");
            }
        }
    }
}
