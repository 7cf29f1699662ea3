//! Type descriptors for the contract's positional binary encoding.
//!
//! A [`StructSchema`] is an immutable, ordered list of typed fields. Field
//! order is part of the wire format: it must match the contract definition
//! exactly, since every struct is encoded as its fields back to back.

use std::fmt;
use std::sync::Arc;

use crate::SchemaError;

/// How a repeated element is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// `arrayN<T>`: exactly `N` elements, no length prefix.
    Fixed(usize),
    /// `List<T>`: u32 count prefix when nested.
    Unbounded,
    /// `variadic<T>`: one top-level argument per element.
    Variadic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSchema {
    U8,
    U32,
    U64,
    Bool,
    /// Arbitrary-size unsigned integer, limited here to 128 bits.
    BigUint,
    /// UTF-8 text or raw bytes (`bytes` / `ManagedBuffer`).
    Bytes,
    TokenIdentifier,
    Address,
    Struct(Arc<StructSchema>),
    /// `Option<T>`: nested `0x00` / `0x01 + T`, top-level empty when absent.
    Option(Box<TypeSchema>),
    Collection(CollectionKind, Box<TypeSchema>),
    /// `optional<T>`: a trailing argument that may be omitted entirely.
    Optional(Box<TypeSchema>),
}

impl TypeSchema {
    pub fn option(inner: TypeSchema) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn optional(inner: TypeSchema) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn collection(kind: CollectionKind, elem: TypeSchema) -> Self {
        Self::Collection(kind, Box::new(elem))
    }

    pub fn fixed(len: usize, elem: TypeSchema) -> Self {
        Self::collection(CollectionKind::Fixed(len), elem)
    }

    pub fn list(elem: TypeSchema) -> Self {
        Self::collection(CollectionKind::Unbounded, elem)
    }

    pub fn variadic(elem: TypeSchema) -> Self {
        Self::collection(CollectionKind::Variadic, elem)
    }

    /// Multi-value types expand to zero or more arguments and cannot be nested.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Self::Optional(_) | Self::Collection(CollectionKind::Variadic, _)
        )
    }

    /// Structural equality that ignores struct names.
    ///
    /// The contract ABI names structs after Rust types (`DomainName`) while
    /// local schemas may use other names; only layout matters on the wire.
    pub fn matches(&self, other: &TypeSchema) -> bool {
        match (self, other) {
            (Self::Struct(a), Self::Struct(b)) => a.matches(b),
            (Self::Option(a), Self::Option(b)) | (Self::Optional(a), Self::Optional(b)) => {
                a.matches(b)
            }
            (Self::Collection(ka, a), Self::Collection(kb, b)) => ka == kb && a.matches(b),
            // Token identifiers share the buffer encoding.
            (Self::Bytes, Self::TokenIdentifier) | (Self::TokenIdentifier, Self::Bytes) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => f.write_str("u8"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::Bool => f.write_str("bool"),
            Self::BigUint => f.write_str("BigUint"),
            Self::Bytes => f.write_str("bytes"),
            Self::TokenIdentifier => f.write_str("TokenIdentifier"),
            Self::Address => f.write_str("Address"),
            Self::Struct(s) => f.write_str(s.name()),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Collection(CollectionKind::Fixed(n), elem) => write!(f, "array{n}<{elem}>"),
            Self::Collection(CollectionKind::Unbounded, elem) => write!(f, "List<{elem}>"),
            Self::Collection(CollectionKind::Variadic, elem) => write!(f, "variadic<{elem}>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub description: String,
    pub ty: TypeSchema,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: TypeSchema) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ty,
        }
    }
}

/// Named, ordered list of typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSchema {
    name: String,
    fields: Vec<FieldDefinition>,
}

impl StructSchema {
    /// Define a struct type. Field names must be unique and field types must
    /// be nestable.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Result<Arc<Self>, SchemaError> {
        let name = name.into();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    schema: name,
                    field: field.name.clone(),
                });
            }
            if field.ty.is_multi() {
                return Err(SchemaError::MultiValueNotNested(field.ty.to_string()));
            }
        }
        Ok(Arc::new(Self { name, fields }))
    }

    /// Shorthand for [`StructSchema::new`] with undocumented fields.
    pub fn define(
        name: &str,
        fields: impl IntoIterator<Item = (&'static str, TypeSchema)>,
    ) -> Result<Arc<Self>, SchemaError> {
        Self::new(
            name,
            fields
                .into_iter()
                .map(|(n, ty)| FieldDefinition::new(n, ty))
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    pub fn field(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == field)
    }

    pub fn matches(&self, other: &StructSchema) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.ty.matches(&b.ty))
    }
}
