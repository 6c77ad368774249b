//! Type mapping from OpenAPI type tokens to TOSCA types
//!
//! Classifies each field of a definition as a primitive, an array of
//! primitives, or a reference to another definition.

use crate::index::Definitions;
use tosca_typegen_common::{Definition, Field, GeneratorError, Result};

/// OpenAPI array type token
pub const SPEC_ARRAY: &str = "array";
/// OpenAPI object type token
pub const SPEC_OBJECT: &str = "object";
/// Separator appended to a base type to mark an array (`"Container array"`)
pub const ARRAY_SEPARATOR: &str = " array";

/// TOSCA list type
pub const TOSCA_LIST: &str = "list";
/// TOSCA map type
pub const TOSCA_MAP: &str = "map";

/// Classification of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldClass<'a> {
    /// Mapped TOSCA primitive
    Primitive(&'static str),
    /// Array whose element is the mapped TOSCA primitive
    PrimitiveArray(&'static str),
    /// Reference to another definition, possibly as array elements
    Reference {
        definition: &'a Definition,
        array: bool,
    },
}

/// Maps OpenAPI type tokens to TOSCA types
pub struct TypeMapper;

impl TypeMapper {
    /// Check if a declared type carries the array marker
    pub fn is_array(declared_type: &str) -> bool {
        declared_type.contains(ARRAY_SEPARATOR)
    }

    /// Declared type with the array marker stripped
    ///
    /// # Examples
    /// ```
    /// use tosca_typegen_parser::TypeMapper;
    ///
    /// assert_eq!(TypeMapper::base_type("Container array"), "Container");
    /// assert_eq!(TypeMapper::base_type("string"), "string");
    /// ```
    pub fn base_type(declared_type: &str) -> &str {
        declared_type
            .split(ARRAY_SEPARATOR)
            .next()
            .unwrap_or(declared_type)
    }

    /// Map an OpenAPI primitive type token to its TOSCA type
    ///
    /// # Examples
    /// ```
    /// use tosca_typegen_parser::TypeMapper;
    ///
    /// assert_eq!(TypeMapper::map_primitive("array"), Some("list"));
    /// assert_eq!(TypeMapper::map_primitive("object"), Some("map"));
    /// assert_eq!(TypeMapper::map_primitive("string"), Some("string"));
    /// assert_eq!(TypeMapper::map_primitive("uuid-blob"), None);
    /// ```
    pub fn map_primitive(token: &str) -> Option<&'static str> {
        match token {
            SPEC_ARRAY => Some(TOSCA_LIST),
            SPEC_OBJECT => Some(TOSCA_MAP),
            "string" => Some("string"),
            "integer" => Some("integer"),
            "boolean" => Some("boolean"),
            // TOSCA has no `number`
            "number" => Some("float"),
            _ => None,
        }
    }

    /// Mapped base type of a wrapper definition
    pub fn map_base_type(definition: &Definition) -> Result<&'static str> {
        Self::map_primitive(&definition.base_type).ok_or_else(|| GeneratorError::UnmappedType {
            field: definition.name.clone(),
            type_token: definition.base_type.clone(),
        })
    }

    /// Classify a field against the definition index.
    ///
    /// A field is a reference when its reference key is indexed or its base
    /// type names an indexed kind; otherwise its base type must map to a
    /// TOSCA primitive.
    pub fn classify<'a>(field: &Field, definitions: &'a Definitions) -> Result<FieldClass<'a>> {
        let array = Self::is_array(&field.declared_type);
        let base = Self::base_type(&field.declared_type);

        let referenced = field
            .reference
            .as_ref()
            .and_then(|id| definitions.get(id))
            .or_else(|| definitions.first_by_kind(base));
        if let Some(definition) = referenced {
            return Ok(FieldClass::Reference { definition, array });
        }

        let mapped = Self::map_primitive(base).ok_or_else(|| GeneratorError::UnmappedType {
            field: field.name.clone(),
            type_token: base.to_string(),
        })?;

        Ok(if array {
            FieldClass::PrimitiveArray(mapped)
        } else {
            FieldClass::Primitive(mapped)
        })
    }

    /// Check if a field resolves to another definition
    pub fn has_complex_type(field: &Field, definitions: &Definitions) -> bool {
        matches!(
            Self::classify(field, definitions),
            Ok(FieldClass::Reference { .. })
        )
    }
}
