//! Positional binary codec.
//!
//! Two encodings exist for every type. *Nested* encoding is used inside
//! structs and collections and is self-delimiting. *Top-level* encoding is
//! used for whole call arguments and query results, where the buffer length
//! is known, so integers drop leading zeros and buffers drop their length
//! prefix.

use std::sync::Arc;

use crate::address::{Address, ADDRESS_LEN};
use crate::schema::{CollectionKind, StructSchema, TypeSchema};
use crate::value::{CollectionValue, StructValue, Value};
use crate::SchemaError;

const OPTION_NONE: u8 = 0;
const OPTION_SOME: u8 = 1;

// --- Encoding ---

pub fn encode_nested(value: &Value, out: &mut Vec<u8>) -> Result<(), SchemaError> {
    match value {
        Value::U8(v) => out.push(*v),
        Value::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::U64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Bool(v) => out.push(u8::from(*v)),
        Value::BigUint(v) => put_buffer(out, &minimal_be(&v.to_be_bytes()))?,
        Value::Bytes(b) => put_buffer(out, b)?,
        Value::TokenIdentifier(s) => put_buffer(out, s.as_bytes())?,
        Value::Address(a) => out.extend_from_slice(a.as_bytes()),
        Value::Struct(s) => {
            for field in s.values() {
                encode_nested(field, out)?;
            }
        }
        Value::Option(None) => out.push(OPTION_NONE),
        Value::Option(Some(inner)) => {
            out.push(OPTION_SOME);
            encode_nested(inner, out)?;
        }
        Value::Collection(c) => match c.kind() {
            CollectionKind::Fixed(_) => encode_items(c, out)?,
            CollectionKind::Unbounded => {
                out.extend_from_slice(&len_prefix(c.len())?);
                encode_items(c, out)?;
            }
            CollectionKind::Variadic => {
                return Err(SchemaError::MultiValueNotNested("variadic".into()));
            }
        },
        Value::Optional(_) => {
            return Err(SchemaError::MultiValueNotNested("optional".into()));
        }
    }
    Ok(())
}

pub fn encode_top(value: &Value) -> Result<Vec<u8>, SchemaError> {
    let mut out = Vec::new();
    match value {
        Value::U8(v) => out.extend(minimal_be(&[*v])),
        Value::U32(v) => out.extend(minimal_be(&v.to_be_bytes())),
        Value::U64(v) => out.extend(minimal_be(&v.to_be_bytes())),
        Value::Bool(v) => {
            if *v {
                out.push(1);
            }
        }
        Value::BigUint(v) => out.extend(minimal_be(&v.to_be_bytes())),
        Value::Bytes(b) => out.extend_from_slice(b),
        Value::TokenIdentifier(s) => out.extend_from_slice(s.as_bytes()),
        Value::Option(None) => {}
        Value::Option(Some(inner)) => {
            out.push(OPTION_SOME);
            encode_nested(inner, &mut out)?;
        }
        Value::Collection(c) if c.kind() != CollectionKind::Variadic => encode_items(c, &mut out)?,
        Value::Collection(_) => {
            return Err(SchemaError::MultiValueNotNested("variadic".into()));
        }
        Value::Optional(_) => {
            return Err(SchemaError::MultiValueNotNested("optional".into()));
        }
        Value::Address(_) | Value::Struct(_) => encode_nested(value, &mut out)?,
    }
    Ok(out)
}

/// Expand call arguments into top-level buffers.
///
/// `variadic<T>` contributes one buffer per element and `optional<T>` zero or
/// one. Once an optional argument is absent nothing may follow it.
pub fn encode_arguments(values: &[Value]) -> Result<Vec<Vec<u8>>, SchemaError> {
    let mut args = Vec::with_capacity(values.len());
    let mut gap = false;
    for value in values {
        match value {
            Value::Optional(None) => {
                gap = true;
                continue;
            }
            _ if gap => return Err(SchemaError::OptionalGap),
            Value::Optional(Some(inner)) => args.push(encode_top(inner)?),
            Value::Collection(c) if c.kind() == CollectionKind::Variadic => {
                for item in c.items() {
                    args.push(encode_top(item)?);
                }
            }
            other => args.push(encode_top(other)?),
        }
    }
    Ok(args)
}

fn encode_items(c: &CollectionValue, out: &mut Vec<u8>) -> Result<(), SchemaError> {
    for item in c.items() {
        encode_nested(item, out)?;
    }
    Ok(())
}

fn put_buffer(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), SchemaError> {
    out.extend_from_slice(&len_prefix(bytes.len())?);
    out.extend_from_slice(bytes);
    Ok(())
}

fn len_prefix(len: usize) -> Result<[u8; 4], SchemaError> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| SchemaError::IntegerOverflow { ty: "u32", len })
}

fn minimal_be(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

// --- Decoding ---

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SchemaError> {
        let end = self.pos.checked_add(n).ok_or(SchemaError::UnexpectedEnd)?;
        let slice = self.buf.get(self.pos..end).ok_or(SchemaError::UnexpectedEnd)?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, SchemaError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SchemaError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    fn buffer(&mut self) -> Result<&'a [u8], SchemaError> {
        let len = u32::from_be_bytes(self.array()?) as usize;
        self.take(len)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn finish(&self) -> Result<(), SchemaError> {
        match self.buf.len() - self.pos {
            0 => Ok(()),
            n => Err(SchemaError::TrailingBytes(n)),
        }
    }
}

fn decode_nested(ty: &TypeSchema, r: &mut Reader<'_>) -> Result<Value, SchemaError> {
    Ok(match ty {
        TypeSchema::U8 => Value::U8(r.byte()?),
        TypeSchema::U32 => Value::U32(u32::from_be_bytes(r.array()?)),
        TypeSchema::U64 => Value::U64(u64::from_be_bytes(r.array()?)),
        TypeSchema::Bool => decode_bool(&[r.byte()?])?,
        TypeSchema::BigUint => Value::BigUint(be_u128(r.buffer()?)?),
        TypeSchema::Bytes => Value::Bytes(r.buffer()?.to_vec()),
        TypeSchema::TokenIdentifier => Value::TokenIdentifier(utf8(r.buffer()?)?),
        TypeSchema::Address => Value::Address(Address::new(r.array::<ADDRESS_LEN>()?)),
        TypeSchema::Struct(s) => decode_struct(s, r)?,
        TypeSchema::Option(inner) => match r.byte()? {
            OPTION_NONE => Value::Option(None),
            OPTION_SOME => Value::some(decode_nested(inner, r)?),
            tag => return Err(SchemaError::InvalidOptionTag(tag)),
        },
        TypeSchema::Collection(kind, elem) => {
            let count = match kind {
                CollectionKind::Fixed(n) => *n,
                CollectionKind::Unbounded => u32::from_be_bytes(r.array()?) as usize,
                CollectionKind::Variadic => {
                    return Err(SchemaError::MultiValueNotNested(ty.to_string()));
                }
            };
            let mut items = Vec::with_capacity(count.min(r.buf.len()));
            for _ in 0..count {
                items.push(decode_nested(elem, r)?);
            }
            Value::Collection(CollectionValue::new(*kind, (**elem).clone(), items)?)
        }
        TypeSchema::Optional(_) => {
            return Err(SchemaError::MultiValueNotNested(ty.to_string()));
        }
    })
}

fn decode_struct(schema: &Arc<StructSchema>, r: &mut Reader<'_>) -> Result<Value, SchemaError> {
    let mut values = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        values.push(decode_nested(&field.ty, r)?);
    }
    Ok(Value::Struct(StructValue::from_ordered(Arc::clone(schema), values)))
}

/// Decode a whole top-level buffer (a query result or call argument).
pub fn decode_top(bytes: &[u8], ty: &TypeSchema) -> Result<Value, SchemaError> {
    let value = match ty {
        TypeSchema::U8 => Value::U8(be_uint::<1>(bytes, "u8")?[0]),
        TypeSchema::U32 => Value::U32(u32::from_be_bytes(be_uint(bytes, "u32")?)),
        TypeSchema::U64 => Value::U64(u64::from_be_bytes(be_uint(bytes, "u64")?)),
        TypeSchema::Bool => decode_bool(bytes)?,
        TypeSchema::BigUint => Value::BigUint(be_u128(bytes)?),
        TypeSchema::Bytes => Value::Bytes(bytes.to_vec()),
        TypeSchema::TokenIdentifier => Value::TokenIdentifier(utf8(bytes)?),
        TypeSchema::Option(_) if bytes.is_empty() => Value::Option(None),
        TypeSchema::Option(inner) => {
            let mut r = Reader::new(bytes);
            match r.byte()? {
                OPTION_SOME => {
                    let v = decode_nested(inner, &mut r)?;
                    r.finish()?;
                    Value::some(v)
                }
                tag => return Err(SchemaError::InvalidOptionTag(tag)),
            }
        }
        TypeSchema::Collection(CollectionKind::Unbounded, elem) => {
            let mut r = Reader::new(bytes);
            let mut items = Vec::new();
            while !r.is_empty() {
                let start = r.pos;
                items.push(decode_nested(elem, &mut r)?);
                if r.pos == start {
                    return Err(SchemaError::ZeroSizedElement(elem.to_string()));
                }
            }
            Value::Collection(CollectionValue::new(
                CollectionKind::Unbounded,
                (**elem).clone(),
                items,
            )?)
        }
        TypeSchema::Address | TypeSchema::Struct(_) | TypeSchema::Collection(..) => {
            let mut r = Reader::new(bytes);
            let v = decode_nested(ty, &mut r)?;
            r.finish()?;
            v
        }
        TypeSchema::Optional(_) => {
            return Err(SchemaError::MultiValueNotNested(ty.to_string()));
        }
    };
    Ok(value)
}

/// Decode a list of top-level buffers against declared result/input types,
/// the inverse of [`encode_arguments`].
pub fn decode_arguments(args: &[Vec<u8>], types: &[TypeSchema]) -> Result<Vec<Value>, SchemaError> {
    let mut out = Vec::with_capacity(types.len());
    let mut rest = args;
    for ty in types {
        match ty {
            TypeSchema::Optional(inner) => match rest.split_first() {
                Some((arg, tail)) => {
                    out.push(Value::optional(Some(decode_top(arg, inner)?)));
                    rest = tail;
                }
                None => out.push(Value::optional(None)),
            },
            TypeSchema::Collection(CollectionKind::Variadic, elem) => {
                let items = rest
                    .iter()
                    .map(|arg| decode_top(arg, elem))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push(Value::Collection(CollectionValue::new(
                    CollectionKind::Variadic,
                    (**elem).clone(),
                    items,
                )?));
                rest = &[];
            }
            other => {
                let (arg, tail) = rest.split_first().ok_or(SchemaError::UnexpectedEnd)?;
                out.push(decode_top(arg, other)?);
                rest = tail;
            }
        }
    }
    if !rest.is_empty() {
        return Err(SchemaError::ArityMismatch {
            expected: args.len() - rest.len(),
            found: args.len(),
        });
    }
    Ok(out)
}

fn decode_bool(bytes: &[u8]) -> Result<Value, SchemaError> {
    match bytes {
        [] | [0] => Ok(Value::Bool(false)),
        [1] => Ok(Value::Bool(true)),
        other => Err(SchemaError::TypeMismatch {
            expected: "bool".into(),
            found: format!("0x{}", hex::encode(other)),
        }),
    }
}

/// Left-pad a minimal big-endian integer to `N` bytes.
fn be_uint<const N: usize>(bytes: &[u8], ty: &'static str) -> Result<[u8; N], SchemaError> {
    if bytes.len() > N {
        return Err(SchemaError::IntegerOverflow {
            ty,
            len: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr[N - bytes.len()..].copy_from_slice(bytes);
    Ok(arr)
}

fn be_u128(bytes: &[u8]) -> Result<u128, SchemaError> {
    let trimmed = minimal_be(bytes);
    be_uint::<16>(&trimmed, "BigUint").map(u128::from_be_bytes)
}

fn utf8(bytes: &[u8]) -> Result<String, SchemaError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| SchemaError::InvalidUtf8)
}
