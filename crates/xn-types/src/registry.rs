//! Named struct schemas and contract endpoints, optionally loaded from the
//! contract's ABI JSON.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::schema::{FieldDefinition, StructSchema, TypeSchema};
use crate::value::Value;
use crate::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Readonly,
    Mutable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub name: String,
    pub ty: TypeSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDefinition {
    pub name: String,
    pub mutability: Mutability,
    pub payable_in_tokens: Vec<String>,
    pub inputs: Vec<ParameterDefinition>,
    pub outputs: Vec<TypeSchema>,
}

impl EndpointDefinition {
    /// Check outbound arguments against the declared inputs, position by position.
    pub fn check_arguments(&self, args: &[Value]) -> Result<(), SchemaError> {
        if args.len() != self.inputs.len() {
            return Err(SchemaError::ArityMismatch {
                expected: self.inputs.len(),
                found: args.len(),
            });
        }
        for (arg, input) in args.iter().zip(&self.inputs) {
            arg.conforms(&input.ty)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    structs: HashMap<String, Arc<StructSchema>>,
    enums: HashSet<String>,
    endpoints: HashMap<String, EndpointDefinition>,
    unsupported: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct schema under its own name, replacing any previous one.
    pub fn register(&mut self, schema: Arc<StructSchema>) {
        self.structs.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StructSchema>> {
        self.structs.get(name)
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointDefinition> {
        self.endpoints.get(name)
    }

    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Endpoints skipped while loading an ABI because a type in their
    /// signature has no client-side representation.
    pub fn unsupported_endpoints(&self) -> &[String] {
        &self.unsupported
    }

    /// Resolve an ABI type expression such as `Option<array1<TextRecord>>`.
    pub fn parse_type(&self, expr: &str) -> Result<TypeSchema, SchemaError> {
        let expr = expr.trim();
        if let Some(ty) = primitive(expr) {
            return Ok(ty);
        }
        if let Some((head, inner)) = split_generic(expr) {
            let inner = self.parse_type(inner)?;
            return generic(head, inner).ok_or_else(|| SchemaError::UnknownType(expr.into()));
        }
        if self.enums.contains(expr) {
            // Fieldless enums travel as their one-byte discriminant.
            return Ok(TypeSchema::U8);
        }
        self.get(expr)
            .map(|s| TypeSchema::Struct(Arc::clone(s)))
            .ok_or_else(|| SchemaError::UnknownType(expr.into()))
    }

    /// Check that a locally declared schema has the same layout as the ABI's
    /// struct named `abi_name`.
    pub fn verify(&self, local: &StructSchema, abi_name: &str) -> Result<(), SchemaError> {
        let remote = self
            .get(abi_name)
            .ok_or_else(|| SchemaError::UnknownType(abi_name.into()))?;
        if local.matches(remote) {
            Ok(())
        } else {
            Err(SchemaError::TypeMismatch {
                expected: describe(remote),
                found: describe(local),
            })
        }
    }

    /// Build a registry from the contract's ABI JSON (`types` and `endpoints`).
    pub fn from_abi_json(json: &str) -> Result<Self, SchemaError> {
        let abi: AbiJson =
            serde_json::from_str(json).map_err(|e| SchemaError::InvalidAbi(e.to_string()))?;

        let mut registry = Self::new();
        let mut resolving = Vec::new();
        for name in abi.types.keys() {
            registry.resolve_struct(name, &abi.types, &mut resolving)?;
        }

        for ep in abi.endpoints {
            match registry.endpoint_definition(&ep) {
                Ok(def) => {
                    registry.endpoints.insert(def.name.clone(), def);
                }
                Err(SchemaError::UnknownType(_)) => registry.unsupported.push(ep.name),
                Err(e) => return Err(e),
            }
        }
        Ok(registry)
    }

    fn endpoint_definition(&self, ep: &AbiEndpoint) -> Result<EndpointDefinition, SchemaError> {
        let mutability = match ep.mutability.as_deref() {
            Some("readonly") => Mutability::Readonly,
            _ => Mutability::Mutable,
        };
        let inputs = ep
            .inputs
            .iter()
            .map(|input| {
                let ty = self.parse_type(&input.ty)?;
                // Older ABIs flag multi-args instead of wrapping the type.
                let ty = if input.multi_arg && !ty.is_multi() {
                    TypeSchema::variadic(ty)
                } else {
                    ty
                };
                Ok(ParameterDefinition {
                    name: input.name.clone(),
                    ty,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        let outputs = ep
            .outputs
            .iter()
            .map(|o| self.parse_type(&o.ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EndpointDefinition {
            name: ep.name.clone(),
            mutability,
            payable_in_tokens: ep.payable_in_tokens.clone(),
            inputs,
            outputs,
        })
    }

    fn resolve_struct(
        &mut self,
        name: &str,
        defs: &BTreeMap<String, AbiTypeDef>,
        resolving: &mut Vec<String>,
    ) -> Result<(), SchemaError> {
        if self.structs.contains_key(name) {
            return Ok(());
        }
        let Some(def) = defs.get(name) else {
            return Err(SchemaError::UnknownType(name.into()));
        };
        if def.kind == "enum" && def.variants.iter().all(|v| v.fields.is_empty()) {
            self.enums.insert(name.to_string());
            return Ok(());
        }
        // Data-carrying and explicit enums are not needed by any client schema.
        if def.kind != "struct" {
            return Ok(());
        }
        if resolving.iter().any(|n| n == name) {
            return Err(SchemaError::InvalidAbi(format!("recursive type `{name}`")));
        }
        resolving.push(name.to_string());

        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            for dep in referenced_names(&field.ty) {
                if defs.contains_key(dep) {
                    self.resolve_struct(dep, defs, resolving)?;
                }
            }
            fields.push(FieldDefinition {
                name: field.name.clone(),
                description: field.docs.join(" "),
                ty: self.parse_type(&field.ty)?,
            });
        }
        resolving.pop();
        self.register(StructSchema::new(name, fields)?);
        Ok(())
    }
}

fn describe(schema: &StructSchema) -> String {
    let fields: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name, f.ty))
        .collect();
    format!("{} {{ {} }}", schema.name(), fields.join(", "))
}

fn primitive(expr: &str) -> Option<TypeSchema> {
    Some(match expr {
        "u8" => TypeSchema::U8,
        "u32" => TypeSchema::U32,
        "u64" => TypeSchema::U64,
        "bool" => TypeSchema::Bool,
        "BigUint" => TypeSchema::BigUint,
        "bytes" | "ManagedBuffer" => TypeSchema::Bytes,
        "TokenIdentifier" | "EgldOrEsdtTokenIdentifier" => TypeSchema::TokenIdentifier,
        "Address" | "ManagedAddress" => TypeSchema::Address,
        _ => return None,
    })
}

fn generic(head: &str, inner: TypeSchema) -> Option<TypeSchema> {
    Some(match head {
        "Option" => TypeSchema::option(inner),
        "List" | "vec" | "ManagedVec" => TypeSchema::list(inner),
        "variadic" | "MultiValueEncoded" => TypeSchema::variadic(inner),
        "optional" | "OptionalValue" => TypeSchema::optional(inner),
        _ => {
            let len = head.strip_prefix("array")?.parse().ok()?;
            TypeSchema::fixed(len, inner)
        }
    })
}

/// `Head<Inner>` → `("Head", "Inner")`.
fn split_generic(expr: &str) -> Option<(&str, &str)> {
    let open = expr.find('<')?;
    let inner = expr.strip_suffix('>')?.get(open + 1..)?;
    Some((&expr[..open], inner))
}

/// Identifiers appearing in a type expression.
fn referenced_names(expr: &str) -> impl Iterator<Item = &str> {
    expr.split(['<', '>', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// --- ABI JSON shape ---

#[derive(Deserialize)]
struct AbiJson {
    #[serde(default)]
    endpoints: Vec<AbiEndpoint>,
    #[serde(default)]
    types: BTreeMap<String, AbiTypeDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbiEndpoint {
    name: String,
    #[serde(default)]
    mutability: Option<String>,
    #[serde(default)]
    payable_in_tokens: Vec<String>,
    #[serde(default)]
    inputs: Vec<AbiInput>,
    #[serde(default)]
    outputs: Vec<AbiOutput>,
}

#[derive(Deserialize)]
struct AbiInput {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    multi_arg: bool,
}

#[derive(Deserialize)]
struct AbiOutput {
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Deserialize)]
struct AbiTypeDef {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    fields: Vec<AbiField>,
    #[serde(default)]
    variants: Vec<AbiVariant>,
}

#[derive(Deserialize)]
struct AbiVariant {
    #[serde(default)]
    fields: Vec<AbiField>,
}

#[derive(Deserialize)]
struct AbiField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    docs: Vec<String>,
}
