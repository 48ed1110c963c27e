use std::collections::HashMap;

use binjava_model::{AccessFlags, ConstantValue};

use crate::visitor::{
    AnnotationEvent, ClassHeader, ClassVisitor, FieldEvent, InnerClassEvent, MethodEvent,
    ParameterAnnotationEvent,
};

/// A top-level event together with the member-scoped events that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassEvent {
    Header(ClassHeader),
    Annotation(AnnotationEvent),
    InnerClass(InnerClassEvent),
    Field(FieldRecord),
    Method(MethodRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub event: FieldEvent,
    pub annotations: Vec<AnnotationEvent>,
}

impl FieldRecord {
    pub fn new(access: AccessFlags, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            event: FieldEvent {
                access,
                name: name.into(),
                descriptor: descriptor.into(),
                signature: None,
                value: None,
            },
            annotations: Vec::new(),
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.event.signature = Some(signature.into());
        self
    }

    pub fn value(mut self, value: ConstantValue) -> Self {
        self.event.value = Some(value);
        self
    }

    pub fn annotation(mut self, descriptor: impl Into<String>, visible: bool) -> Self {
        self.annotations.push(AnnotationEvent::new(descriptor, visible));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodRecord {
    pub event: MethodEvent,
    pub annotations: Vec<AnnotationEvent>,
    pub parameter_annotations: Vec<ParameterAnnotationEvent>,
    pub has_annotation_default: bool,
}

impl MethodRecord {
    pub fn new(access: AccessFlags, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            event: MethodEvent {
                access,
                name: name.into(),
                descriptor: descriptor.into(),
                signature: None,
                exceptions: Vec::new(),
            },
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            has_annotation_default: false,
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.event.signature = Some(signature.into());
        self
    }

    pub fn exception(mut self, internal_name: impl Into<String>) -> Self {
        self.event.exceptions.push(internal_name.into());
        self
    }

    pub fn annotation(mut self, descriptor: impl Into<String>, visible: bool) -> Self {
        self.annotations.push(AnnotationEvent::new(descriptor, visible));
        self
    }

    pub fn parameter_annotation(
        mut self,
        parameter: usize,
        descriptor: impl Into<String>,
        visible: bool,
    ) -> Self {
        self.parameter_annotations.push(ParameterAnnotationEvent {
            parameter,
            annotation: AnnotationEvent::new(descriptor, visible),
        });
        self
    }

    pub fn annotation_default(mut self) -> Self {
        self.has_annotation_default = true;
        self
    }
}

/// The already-decoded content of one class file, kept as a replayable event
/// stream.
///
/// Events are replayed in recording order, so a stream recorded with
/// [`ClassContentBuilder`] can also describe malformed inputs (a missing or
/// repeated header) to exercise a visitor's error handling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassContent {
    events: Vec<ClassEvent>,
}

impl ClassContent {
    pub fn builder() -> ClassContentBuilder {
        ClassContentBuilder::default()
    }

    pub fn from_events(events: Vec<ClassEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[ClassEvent] {
        &self.events
    }

    /// Internal name from the first header event.
    pub fn internal_name(&self) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            ClassEvent::Header(header) => Some(header.name.as_str()),
            _ => None,
        })
    }

    pub fn accept(&self, visitor: &mut dyn ClassVisitor) {
        for event in &self.events {
            match event {
                ClassEvent::Header(header) => visitor.visit(header),
                ClassEvent::Annotation(annotation) => visitor.visit_annotation(annotation),
                ClassEvent::InnerClass(inner) => visitor.visit_inner_class(inner),
                ClassEvent::Field(field) => {
                    let Some(slot) = visitor.visit_field(&field.event) else {
                        continue;
                    };
                    for annotation in &field.annotations {
                        visitor.visit_member_annotation(slot, annotation);
                    }
                }
                ClassEvent::Method(method) => {
                    let Some(slot) = visitor.visit_method(&method.event) else {
                        continue;
                    };
                    if method.has_annotation_default {
                        visitor.visit_annotation_default(slot);
                    }
                    for annotation in &method.annotations {
                        visitor.visit_member_annotation(slot, annotation);
                    }
                    for annotation in &method.parameter_annotations {
                        visitor.visit_parameter_annotation(slot, annotation);
                    }
                }
            }
        }
        visitor.visit_end();
    }
}

#[derive(Debug, Default)]
pub struct ClassContentBuilder {
    events: Vec<ClassEvent>,
}

impl ClassContentBuilder {
    pub fn header(mut self, header: ClassHeader) -> Self {
        self.events.push(ClassEvent::Header(header));
        self
    }

    pub fn annotation(mut self, descriptor: impl Into<String>, visible: bool) -> Self {
        self.events
            .push(ClassEvent::Annotation(AnnotationEvent::new(descriptor, visible)));
        self
    }

    pub fn inner_class(
        mut self,
        name: impl Into<String>,
        outer_name: Option<&str>,
        inner_name: Option<&str>,
        access: AccessFlags,
    ) -> Self {
        self.events.push(ClassEvent::InnerClass(InnerClassEvent {
            name: name.into(),
            outer_name: outer_name.map(str::to_owned),
            inner_name: inner_name.map(str::to_owned),
            access,
        }));
        self
    }

    pub fn field(mut self, field: FieldRecord) -> Self {
        self.events.push(ClassEvent::Field(field));
        self
    }

    pub fn method(mut self, method: MethodRecord) -> Self {
        self.events.push(ClassEvent::Method(method));
        self
    }

    pub fn build(self) -> ClassContent {
        ClassContent {
            events: self.events,
        }
    }
}

/// A source of class content keyed by internal name (`com/example/Outer$Inner`).
pub trait ClassContentProvider: Send + Sync {
    fn class_content(&self, internal_name: &str) -> Option<ClassContent>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryClassContents {
    classes: HashMap<String, ClassContent>,
}

impl InMemoryClassContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` under the name from its header. Content without a
    /// header is ignored and returned.
    pub fn insert(&mut self, content: ClassContent) -> Option<ClassContent> {
        let Some(name) = content.internal_name().map(str::to_owned) else {
            return Some(content);
        };
        self.classes.insert(name, content)
    }

    pub fn with(mut self, content: ClassContent) -> Self {
        self.insert(content);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassContentProvider for InMemoryClassContents {
    fn class_content(&self, internal_name: &str) -> Option<ClassContent> {
        self.classes.get(internal_name).cloned()
    }
}
