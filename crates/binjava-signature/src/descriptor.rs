use binjava_model::{JavaType, PrimitiveType};

use crate::error::{MalformedSignature, Result};
use crate::resolver::ClassifierResolver;
use crate::signature::{MethodSignature, SignatureParser};

impl SignatureParser {
    /// Parses a plain field descriptor such as `[Ljava/lang/String;`.
    pub fn parse_field_descriptor(
        &self,
        desc: &str,
        resolver: &ClassifierResolver,
    ) -> Result<JavaType> {
        let (ty, rest) = self.parse_field_type(desc, desc, resolver)?;
        if !rest.is_empty() {
            return Err(descriptor_error(desc, rest, "unexpected trailing input"));
        }
        Ok(ty)
    }

    /// Parses a plain method descriptor such as `(ILjava/lang/String;)V`.
    ///
    /// Descriptors carry no type parameters and never mention type variables,
    /// so class names skip the type parameter scope entirely.
    pub fn parse_method_descriptor(
        &self,
        desc: &str,
        resolver: &ClassifierResolver,
    ) -> Result<MethodSignature> {
        let Some(mut rest) = desc.strip_prefix('(') else {
            return Err(descriptor_error(desc, desc, "expected `(`"));
        };

        let mut parameter_types = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(descriptor_error(desc, rest, "expected `)`"));
            }
            let (param, after) = self.parse_field_type(desc, rest, resolver)?;
            parameter_types.push(param);
            rest = after;
        }

        if rest.is_empty() {
            return Err(descriptor_error(desc, rest, "missing return type"));
        }
        let (return_type, rest) = match rest.strip_prefix('V') {
            Some(after) => (JavaType::VOID, after),
            None => self.parse_field_type(desc, rest, resolver)?,
        };
        if !rest.is_empty() {
            return Err(descriptor_error(desc, rest, "unexpected trailing input"));
        }

        Ok(MethodSignature {
            type_parameters: Vec::new(),
            parameter_types,
            return_type,
        })
    }

    fn parse_field_type<'a>(
        &self,
        desc: &str,
        input: &'a str,
        resolver: &ClassifierResolver,
    ) -> Result<(JavaType, &'a str)> {
        let Some(first) = input.chars().next() else {
            return Err(descriptor_error(desc, input, "expected a type"));
        };
        if let Some(kind) = PrimitiveType::from_descriptor_code(first) {
            return Ok((JavaType::primitive(kind), &input[1..]));
        }
        match first {
            'L' => {
                let Some(end) = input.find(';') else {
                    return Err(descriptor_error(desc, input, "expected `;` after class type"));
                };
                let internal_name = &input[1..end];
                if internal_name.is_empty() {
                    return Err(descriptor_error(desc, input, "expected a class name"));
                }
                let ty = if internal_name == "java/lang/Object" {
                    JavaType::Classifier(self.object_type().clone())
                } else {
                    JavaType::classifier(
                        resolver.resolve_class_by_internal_name(internal_name),
                        Vec::new(),
                    )
                };
                Ok((ty, &input[end + 1..]))
            }
            '[' => {
                let (component, rest) = self.parse_field_type(desc, &input[1..], resolver)?;
                Ok((JavaType::array(component), rest))
            }
            'V' => Err(descriptor_error(desc, input, "`void` is only valid as a return type")),
            _ => Err(descriptor_error(desc, input, "expected a type")),
        }
    }
}

fn descriptor_error(desc: &str, rest: &str, reason: &'static str) -> MalformedSignature {
    MalformedSignature::new(desc, desc.len() - rest.len(), reason)
}

pub fn parse_field_descriptor(desc: &str, resolver: &ClassifierResolver) -> Result<JavaType> {
    SignatureParser::new(resolver).parse_field_descriptor(desc, resolver)
}

pub fn parse_method_descriptor(
    desc: &str,
    resolver: &ClassifierResolver,
) -> Result<MethodSignature> {
    SignatureParser::new(resolver).parse_method_descriptor(desc, resolver)
}
