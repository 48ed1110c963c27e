use std::sync::{Arc, Weak};

use binjava_model::{
    JavaClassifierType, JavaType, JavaTypeParameter, JavaWildcardType, PrimitiveType,
    JAVA_LANG_OBJECT,
};

use crate::error::{MalformedSignature, Result};
use crate::resolver::ClassifierResolver;

const OBJECT_INTERNAL_NAME: &str = "java/lang/Object";

/// Type parameters and supertypes from a class `Signature` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<Arc<JavaTypeParameter>>,
    /// Superclass first, then interfaces.
    pub supertypes: Vec<Arc<JavaClassifierType>>,
}

/// A parsed method signature or method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<Arc<JavaTypeParameter>>,
    pub parameter_types: Vec<JavaType>,
    pub return_type: JavaType,
}

/// Recursive-descent parser for the JVM generic signature grammar (JVMS 4.7.9.1).
///
/// The parser owns the interned `java.lang.Object` type: every unparameterized
/// `Ljava/lang/Object;` it reads is the same `Arc`, so callers can recognize
/// the root type with [`Arc::ptr_eq`] against [`SignatureParser::object_type`].
#[derive(Debug, Clone)]
pub struct SignatureParser {
    object_type: Arc<JavaClassifierType>,
}

impl SignatureParser {
    pub fn new(resolver: &ClassifierResolver) -> Self {
        Self {
            object_type: Arc::new(JavaClassifierType::new(
                resolver.resolve_class(JAVA_LANG_OBJECT),
                Vec::new(),
            )),
        }
    }

    pub fn object_type(&self) -> &Arc<JavaClassifierType> {
        &self.object_type
    }

    pub fn is_object_type(&self, ty: &Arc<JavaClassifierType>) -> bool {
        Arc::ptr_eq(ty, &self.object_type)
    }

    /// Parses a class signature. Each type parameter is in scope from its own
    /// bounds onwards, so it is visible to later bounds and the supertypes;
    /// forward references resolve to unknown classifiers.
    pub fn parse_class_signature(
        &self,
        signature: &str,
        resolver: &mut ClassifierResolver,
    ) -> Result<ClassSignature> {
        let mut cursor = Cursor::new(signature);
        let type_parameters = self.parse_type_parameters(&mut cursor, resolver)?;

        let mut supertypes = Vec::new();
        loop {
            match self.parse_top_level_class_ref(&mut cursor, resolver)? {
                Some(ty) => supertypes.push(ty),
                None => return Err(cursor.error("expected a class type")),
            }
            if cursor.is_done() {
                break;
            }
        }

        Ok(ClassSignature {
            type_parameters,
            supertypes,
        })
    }

    /// Parses a method signature. The method's own type parameters are bound
    /// into `resolver`; callers pass a fork of the class scope.
    pub fn parse_method_signature(
        &self,
        signature: &str,
        resolver: &mut ClassifierResolver,
    ) -> Result<MethodSignature> {
        let mut cursor = Cursor::new(signature);
        let type_parameters = self.parse_type_parameters(&mut cursor, resolver)?;

        cursor.expect('(', "expected `(`")?;
        let mut parameter_types = Vec::new();
        loop {
            match cursor.current() {
                Some(')') => {
                    cursor.bump();
                    break;
                }
                None => return Err(cursor.error("expected `)`")),
                Some(_) => parameter_types.push(self.parse_type(&mut cursor, resolver)?),
            }
        }

        let return_type = self.parse_type(&mut cursor, resolver)?;

        // Thrown types are validated but not part of the member model.
        while cursor.current() == Some('^') {
            cursor.bump();
            if self.parse_top_level_class_ref(&mut cursor, resolver)?.is_none() {
                return Err(cursor.error("expected a thrown class or type variable"));
            }
        }
        cursor.expect_done()?;

        Ok(MethodSignature {
            type_parameters,
            parameter_types,
            return_type,
        })
    }

    /// Parses a single type (a field signature), rejecting trailing input.
    pub fn parse_type_signature(
        &self,
        signature: &str,
        resolver: &ClassifierResolver,
    ) -> Result<JavaType> {
        let mut cursor = Cursor::new(signature);
        let ty = self.parse_type(&mut cursor, resolver)?;
        cursor.expect_done()?;
        Ok(ty)
    }

    fn parse_type_parameters(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &mut ClassifierResolver,
    ) -> Result<Vec<Arc<JavaTypeParameter>>> {
        if cursor.current() != Some('<') {
            return Ok(Vec::new());
        }
        cursor.bump();

        let mut type_parameters = Vec::new();
        loop {
            match cursor.current() {
                Some('>') => {
                    cursor.bump();
                    break;
                }
                None => return Err(cursor.error("unterminated type parameter list")),
                Some(_) => {
                    let tp = self.parse_type_parameter(cursor, resolver)?;
                    resolver.bind(tp.clone());
                    type_parameters.push(tp);
                }
            }
        }
        Ok(type_parameters)
    }

    fn parse_type_parameter(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &mut ClassifierResolver,
    ) -> Result<Arc<JavaTypeParameter>> {
        let start = cursor.position();
        loop {
            match cursor.current() {
                Some(':') => break,
                None => return Err(cursor.error("expected `:` after type parameter name")),
                Some(_) => cursor.bump(),
            }
        }
        let name = cursor.slice_from(start);
        if name.is_empty() {
            return Err(cursor.error("expected a type parameter name"));
        }

        // Bounds may mention the parameter itself (`<E:Ljava/lang/Enum<TE;>;>`),
        // so it is allocated first and referenced weakly from inside.
        let mut outcome = Ok(());
        let tp = Arc::new_cyclic(|this: &Weak<JavaTypeParameter>| {
            resolver.begin_declaration(name, this.clone());
            let bounds = self.parse_type_parameter_bounds(cursor, resolver);
            resolver.end_declaration();
            let bounds = bounds.unwrap_or_else(|err| {
                outcome = Err(err);
                Vec::new()
            });
            JavaTypeParameter::new(name, bounds)
        });
        outcome.map(|()| tp)
    }

    fn parse_type_parameter_bounds(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<Vec<Arc<JavaClassifierType>>> {
        // The list is only allocated once a bound other than a sole
        // `java.lang.Object` shows up; an elided object bound is re-inserted
        // first when more bounds follow it.
        let mut bounds: Option<Vec<Arc<JavaClassifierType>>> = None;
        let mut saw_object = false;
        while cursor.current() == Some(':') {
            cursor.bump();
            // An empty class bound (`T::Ljava/lang/Runnable;`) is followed
            // directly by the interface bound separator.
            let Some(bound) = self.parse_top_level_class_ref(cursor, resolver)? else {
                continue;
            };
            if bounds.is_none() {
                if self.is_object_type(&bound) {
                    saw_object = true;
                    continue;
                }
                let mut list = Vec::new();
                if saw_object {
                    list.push(self.object_type.clone());
                }
                bounds = Some(list);
            }
            if let Some(list) = bounds.as_mut() {
                list.push(bound);
            }
        }

        Ok(bounds.unwrap_or_default())
    }

    fn parse_top_level_class_ref(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<Option<Arc<JavaClassifierType>>> {
        match cursor.current() {
            Some('L') => self.parse_class_ref(cursor, resolver).map(Some),
            Some('T') => self.parse_type_variable_ref(cursor, resolver).map(Some),
            _ => Ok(None),
        }
    }

    fn parse_type_variable_ref(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<Arc<JavaClassifierType>> {
        cursor.bump();
        let start = cursor.position();
        loop {
            match cursor.current() {
                Some(';') => break,
                None => return Err(cursor.error("expected `;` after type variable name")),
                Some(_) => cursor.bump(),
            }
        }
        let name = cursor.slice_from(start);
        if name.is_empty() {
            return Err(cursor.error("expected a type variable name"));
        }
        cursor.bump();

        Ok(Arc::new(JavaClassifierType::new(
            resolver.resolve(name),
            Vec::new(),
        )))
    }

    fn parse_class_ref(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<Arc<JavaClassifierType>> {
        cursor.bump();

        let mut internal_name = String::new();
        // Argument groups in encounter order: outer class arguments come first
        // in the text but belong after the inner class arguments.
        let mut argument_groups: Vec<Vec<JavaType>> = Vec::new();
        loop {
            match cursor.current() {
                Some(';') => {
                    cursor.bump();
                    break;
                }
                None => return Err(cursor.error("expected `;` after class type")),
                Some('<') => {
                    cursor.bump();
                    argument_groups.push(self.parse_type_arguments(cursor, resolver)?);
                }
                Some(' ') => cursor.bump(),
                Some(c) => {
                    internal_name.push(c);
                    cursor.bump();
                }
            }
        }

        if internal_name.is_empty() {
            return Err(cursor.error("expected a class name"));
        }
        if internal_name == OBJECT_INTERNAL_NAME && argument_groups.is_empty() {
            return Ok(self.object_type.clone());
        }

        let type_arguments = argument_groups.into_iter().rev().flatten().collect();
        Ok(Arc::new(JavaClassifierType::new(
            resolver.resolve_by_internal_name(&internal_name),
            type_arguments,
        )))
    }

    /// Reads arguments up to and including the closing `>`.
    fn parse_type_arguments(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<Vec<JavaType>> {
        let mut arguments = Vec::new();
        loop {
            match cursor.current() {
                Some('>') => {
                    if arguments.is_empty() {
                        return Err(cursor.error("empty type argument list"));
                    }
                    cursor.bump();
                    return Ok(arguments);
                }
                None => return Err(cursor.error("unterminated type argument list")),
                Some(_) => arguments.push(self.parse_type_argument(cursor, resolver)?),
            }
        }
    }

    fn parse_type_argument(
        &self,
        cursor: &mut Cursor<'_>,
        resolver: &ClassifierResolver,
    ) -> Result<JavaType> {
        let is_extends = match cursor.current() {
            Some('*') => {
                cursor.bump();
                return Ok(JavaType::Wildcard(JavaWildcardType::unbounded()));
            }
            Some('+') => true,
            Some('-') => false,
            _ => return self.parse_type(cursor, resolver),
        };
        cursor.bump();
        let bound = Box::new(self.parse_type(cursor, resolver)?);
        Ok(JavaType::Wildcard(JavaWildcardType {
            bound: Some(bound),
            is_extends,
        }))
    }

    /// `[`* followed by a class type, type variable, primitive, or `V`.
    ///
    /// `void` is accepted anywhere; rejecting it outside return position is the
    /// caller's job.
    fn parse_type(&self, cursor: &mut Cursor<'_>, resolver: &ClassifierResolver) -> Result<JavaType> {
        let mut dimensions = 0usize;
        while cursor.current() == Some('[') {
            dimensions += 1;
            cursor.bump();
        }

        let element = match cursor.current() {
            Some('L') => JavaType::Classifier(self.parse_class_ref(cursor, resolver)?),
            Some('T') => JavaType::Classifier(self.parse_type_variable_ref(cursor, resolver)?),
            Some('V') => {
                cursor.bump();
                JavaType::VOID
            }
            Some(c) => match PrimitiveType::from_descriptor_code(c) {
                Some(kind) => {
                    cursor.bump();
                    JavaType::primitive(kind)
                }
                None => return Err(cursor.error("expected a type")),
            },
            None => return Err(cursor.error("expected a type")),
        };

        Ok((0..dimensions).fold(element, |ty, _| JavaType::array(ty)))
    }
}

/// Forward-only position in a signature string.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn current(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    pub(crate) fn bump(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Text between `start` and the current position.
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.text[start..self.pos]
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn expect(&mut self, expected: char, reason: &'static str) -> Result<()> {
        if self.current() != Some(expected) {
            return Err(self.error(reason));
        }
        self.bump();
        Ok(())
    }

    pub(crate) fn expect_done(&self) -> Result<()> {
        if self.is_done() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    pub(crate) fn error(&self, reason: &'static str) -> MalformedSignature {
        MalformedSignature::new(self.text, self.pos, reason)
    }
}

/// Parses a field signature with a fresh [`SignatureParser`].
pub fn parse_signature(signature: &str, resolver: &ClassifierResolver) -> Result<JavaType> {
    SignatureParser::new(resolver).parse_type_signature(signature, resolver)
}

pub fn parse_method_signature(
    signature: &str,
    resolver: &mut ClassifierResolver,
) -> Result<MethodSignature> {
    SignatureParser::new(resolver).parse_method_signature(signature, resolver)
}

pub fn parse_class_signature(
    signature: &str,
    resolver: &mut ClassifierResolver,
) -> Result<ClassSignature> {
    SignatureParser::new(resolver).parse_class_signature(signature, resolver)
}
