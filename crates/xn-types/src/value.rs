//! Concrete values bound to schemas.

use std::sync::Arc;

use crate::address::Address;
use crate::schema::{CollectionKind, StructSchema, TypeSchema};
use crate::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U32(u32),
    U64(u64),
    Bool(bool),
    BigUint(u128),
    Bytes(Vec<u8>),
    TokenIdentifier(String),
    Address(Address),
    Struct(StructValue),
    Option(Option<Box<Value>>),
    Collection(CollectionValue),
    Optional(Option<Box<Value>>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Bytes(s.into().into_bytes())
    }

    pub fn some(inner: Value) -> Self {
        Self::Option(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Self::Option(None)
    }

    pub fn optional(inner: Option<Value>) -> Self {
        Self::Optional(inner.map(Box::new))
    }

    fn kind_name(&self) -> String {
        match self {
            Self::U8(_) => "u8".into(),
            Self::U32(_) => "u32".into(),
            Self::U64(_) => "u64".into(),
            Self::Bool(_) => "bool".into(),
            Self::BigUint(_) => "BigUint".into(),
            Self::Bytes(_) => "bytes".into(),
            Self::TokenIdentifier(_) => "TokenIdentifier".into(),
            Self::Address(_) => "Address".into(),
            Self::Struct(s) => s.schema.name().to_string(),
            Self::Option(_) => "Option".into(),
            Self::Collection(c) => TypeSchema::collection(c.kind, c.elem.clone()).to_string(),
            Self::Optional(_) => "optional".into(),
        }
    }

    /// Check that this value can be encoded as `ty`.
    pub fn conforms(&self, ty: &TypeSchema) -> Result<(), SchemaError> {
        let ok = match (self, ty) {
            (Self::U8(_), TypeSchema::U8)
            | (Self::U32(_), TypeSchema::U32)
            | (Self::U64(_), TypeSchema::U64)
            | (Self::Bool(_), TypeSchema::Bool)
            | (Self::BigUint(_), TypeSchema::BigUint)
            | (Self::Address(_), TypeSchema::Address)
            | (Self::Bytes(_), TypeSchema::Bytes | TypeSchema::TokenIdentifier)
            | (Self::TokenIdentifier(_), TypeSchema::Bytes | TypeSchema::TokenIdentifier) => true,
            (Self::Struct(v), TypeSchema::Struct(s)) => v.schema.matches(s),
            (Self::Option(None), TypeSchema::Option(_))
            | (Self::Optional(None), TypeSchema::Optional(_)) => true,
            (Self::Option(Some(v)), TypeSchema::Option(inner))
            | (Self::Optional(Some(v)), TypeSchema::Optional(inner)) => {
                return v.conforms(inner);
            }
            (Self::Collection(c), TypeSchema::Collection(kind, elem)) => {
                if let CollectionKind::Fixed(n) = kind {
                    if c.items.len() != *n {
                        return Err(SchemaError::ArityMismatch {
                            expected: *n,
                            found: c.items.len(),
                        });
                    }
                }
                c.kind == *kind && c.elem.matches(elem)
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(SchemaError::TypeMismatch {
                expected: ty.to_string(),
                found: self.kind_name(),
            })
        }
    }

    fn mismatch(self, expected: &str) -> SchemaError {
        SchemaError::TypeMismatch {
            expected: expected.into(),
            found: self.kind_name(),
        }
    }

    pub fn into_text(self) -> Result<String, SchemaError> {
        match self {
            Self::Bytes(b) => String::from_utf8(b).map_err(|_| SchemaError::InvalidUtf8),
            Self::TokenIdentifier(s) => Ok(s),
            other => Err(other.mismatch("bytes")),
        }
    }

    pub fn into_u64(self) -> Result<u64, SchemaError> {
        match self {
            Self::U64(v) => Ok(v),
            Self::U32(v) => Ok(v.into()),
            Self::U8(v) => Ok(v.into()),
            other => Err(other.mismatch("u64")),
        }
    }

    pub fn into_biguint(self) -> Result<u128, SchemaError> {
        match self {
            Self::BigUint(v) => Ok(v),
            Self::U64(v) => Ok(v.into()),
            other => Err(other.mismatch("BigUint")),
        }
    }

    pub fn into_address(self) -> Result<Address, SchemaError> {
        match self {
            Self::Address(a) => Ok(a),
            other => Err(other.mismatch("Address")),
        }
    }

    pub fn into_struct(self) -> Result<StructValue, SchemaError> {
        match self {
            Self::Struct(s) => Ok(s),
            other => Err(other.mismatch("struct")),
        }
    }

    pub fn into_collection(self) -> Result<CollectionValue, SchemaError> {
        match self {
            Self::Collection(c) => Ok(c),
            other => Err(other.mismatch("collection")),
        }
    }

    /// Unwrap an `Option<T>` or `optional<T>` value.
    pub fn into_option(self) -> Result<Option<Value>, SchemaError> {
        match self {
            Self::Option(v) | Self::Optional(v) => Ok(v.map(|b| *b)),
            other => Err(other.mismatch("Option")),
        }
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Self::Struct(v)
    }
}

impl From<CollectionValue> for Value {
    fn from(v: CollectionValue) -> Self {
        Self::Collection(v)
    }
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        Self::Address(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::text(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

/// A struct value whose fields are stored in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructValue {
    schema: Arc<StructSchema>,
    values: Vec<Value>,
}

impl StructValue {
    /// Bind named field values to `schema`, in any order.
    ///
    /// Every declared field must be supplied exactly once and no undeclared
    /// name may appear.
    pub fn new<N: Into<String>>(
        schema: &Arc<StructSchema>,
        fields: impl IntoIterator<Item = (N, Value)>,
    ) -> Result<Self, SchemaError> {
        let mut slots: Vec<Option<Value>> = vec![None; schema.fields().len()];
        for (name, value) in fields {
            let name = name.into();
            let Some(pos) = schema.position(&name) else {
                return Err(SchemaError::UnknownField {
                    schema: schema.name().to_string(),
                    field: name,
                });
            };
            if slots[pos].is_some() {
                return Err(SchemaError::DuplicateField {
                    schema: schema.name().to_string(),
                    field: name,
                });
            }
            value.conforms(&schema.fields()[pos].ty)?;
            slots[pos] = Some(value);
        }

        let mut values = Vec::with_capacity(slots.len());
        for (slot, def) in slots.into_iter().zip(schema.fields()) {
            match slot {
                Some(v) => values.push(v),
                None => {
                    return Err(SchemaError::MissingField {
                        schema: schema.name().to_string(),
                        field: def.name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Build from values already in schema order. Used by the decoder.
    pub(crate) fn from_ordered(schema: Arc<StructSchema>, values: Vec<Value>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<StructSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema.position(field).map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(&self.values)
    }

    pub fn into_fields(self) -> Fields {
        Fields {
            schema: self.schema,
            values: self.values.into_iter().map(Some).collect(),
        }
    }
}

/// Owned field values that can be taken out by name.
pub struct Fields {
    schema: Arc<StructSchema>,
    values: Vec<Option<Value>>,
}

impl Fields {
    pub fn take(&mut self, field: &str) -> Result<Value, SchemaError> {
        self.schema
            .position(field)
            .and_then(|i| self.values[i].take())
            .ok_or_else(|| SchemaError::MissingField {
                schema: self.schema.name().to_string(),
                field: field.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionValue {
    kind: CollectionKind,
    elem: TypeSchema,
    items: Vec<Value>,
}

impl CollectionValue {
    /// Bind elements to a collection schema. Fixed kinds require the exact
    /// declared length.
    pub fn new(
        kind: CollectionKind,
        elem: TypeSchema,
        items: Vec<Value>,
    ) -> Result<Self, SchemaError> {
        if elem.is_multi() {
            return Err(SchemaError::MultiValueNotNested(elem.to_string()));
        }
        if let CollectionKind::Fixed(n) = kind {
            if items.len() != n {
                return Err(SchemaError::ArityMismatch {
                    expected: n,
                    found: items.len(),
                });
            }
        }
        for item in &items {
            item.conforms(&elem)?;
        }
        Ok(Self { kind, elem, items })
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn elem(&self) -> &TypeSchema {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
