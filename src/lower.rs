//! IR builder: walks the schema document and produces linked, ordered
//! [`TypeDecl`]s.
//!
//! Each document-level declaration (definition or schema root) lowers into a
//! group of decls, children first. Inline object/enum schemas at a property
//! are lifted into nested types named `_<key>`; anonymous array items lift
//! as `_sub<k>`. Linking (pruning, alias collapse, topological order) is
//! handed to [`crate::resolve`].

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{GenError, Result};
use crate::ir::{
    EnumBase, EnumMember, FieldDecl, Ir, Literal, Primitive, TypeBody, TypeDecl, TypeRef,
};
use crate::names;
use crate::resolve::{self, Group, LinkOptions, RefSite};
use crate::schema::{self, SchemaDoc};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Root type name when the schema has no usable `title`.
    pub root_name: String,
    /// Emit every definition, not only those reachable from the root.
    pub full_definitions: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { root_name: "RootObject".to_string(), full_definitions: false }
    }
}

/// Lower the whole document and link the result.
pub fn build_ir(doc: &SchemaDoc, opts: &BuildOptions) -> Result<Ir> {
    let mut b = Builder::default();

    let mut groups: Vec<Group> = Vec::new();
    for (name, node) in doc.definitions() {
        let pointer = format!("/definitions/{name}");
        groups.push(b.lower_named(name.clone(), node, &pointer, false)?);
    }

    let root_name = doc
        .title()
        .map(names::type_name_from_title)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| opts.root_name.clone());
    groups.push(b.lower_named(root_name, doc.root_value(), "", true)?);

    resolve::link(groups, &b.sites, &LinkOptions { full_definitions: opts.full_definitions })
}

#[derive(Debug, Default)]
struct Builder {
    sites: Vec<RefSite>,
    /// 1-based ordinal of anonymous array-item lifts, per enclosing type.
    anon_ordinals: HashMap<String, usize>,
}

impl Builder {
    fn lower_named(
        &mut self,
        name: String,
        node: &Value,
        pointer: &str,
        is_schema_root: bool,
    ) -> Result<Group> {
        let mut children = Vec::new();
        let body = self.lower_body(&name, node, pointer, &mut children)?;
        let root = name.clone();
        children.push(TypeDecl { name, parent: None, body });
        Ok(Group { root, decls: children, is_schema_root })
    }

    /// Body of a named declaration. Lifted nested decls land in `out`,
    /// children before their parents.
    fn lower_body(
        &mut self,
        qualified: &str,
        node: &Value,
        pointer: &str,
        out: &mut Vec<TypeDecl>,
    ) -> Result<TypeBody> {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let target = self.record_ref(pointer, reference)?;
            return Ok(TypeBody::Alias { target: TypeRef::Named(target) });
        }
        if node.get("enum").is_some() {
            let (base, members) = self.lower_enum(node, pointer)?;
            return Ok(TypeBody::Enum { base, members });
        }

        match schema::type_of(node) {
            Some("object") | None => {
                let fields = self.lower_properties(qualified, node, pointer, out)?;
                Ok(TypeBody::Object { fields })
            }
            Some("array") => {
                let item = self.lower_items(qualified, node, pointer, out)?;
                let (min_items, max_items) = length_bounds(node);
                match item {
                    // `items` absent: a free-form list, not a typed array
                    None => Ok(TypeBody::Alias {
                        target: TypeRef::Primitive(Primitive::AnyArray),
                    }),
                    Some(item) => Ok(TypeBody::Array { item, min_items, max_items }),
                }
            }
            Some("string") if schema::is_bytes_string(node) => Ok(TypeBody::Bytes),
            Some(other) => {
                let prim = primitive_kind(other).ok_or_else(|| {
                    GenError::schema_invalid(pointer, format!("unsupported type `{other}`"))
                })?;
                // bare primitive definition: transparent alias
                Ok(TypeBody::Alias { target: TypeRef::Primitive(prim) })
            }
        }
    }

    fn lower_properties(
        &mut self,
        parent_qualified: &str,
        node: &Value,
        pointer: &str,
        out: &mut Vec<TypeDecl>,
    ) -> Result<Vec<FieldDecl>> {
        let required = schema::required_names(node);
        let mut fields = Vec::new();
        for (key, prop) in schema::properties(node) {
            let prop_pointer = format!("{pointer}/properties/{key}");
            let ty = self.lower_prop_type(parent_qualified, key, prop, &prop_pointer, out)?;
            let default = match prop.get("default") {
                Some(v) => Some(lower_default(v, &ty, &prop_pointer)?),
                None => None,
            };
            fields.push(FieldDecl {
                name: key.clone(),
                ty,
                default,
                required: required.contains(&key.as_str()),
            });
        }
        Ok(fields)
    }

    /// Type of one property. Inline objects and enums are lifted here.
    fn lower_prop_type(
        &mut self,
        parent_qualified: &str,
        key: &str,
        prop: &Value,
        pointer: &str,
        out: &mut Vec<TypeDecl>,
    ) -> Result<TypeRef> {
        if let Some(reference) = prop.get("$ref").and_then(Value::as_str) {
            let target = self.record_ref(pointer, reference)?;
            return Ok(TypeRef::Named(target));
        }

        if prop.get("enum").is_some() {
            let (base, members) = self.lower_enum(prop, pointer)?;
            let child = self.lift(
                parent_qualified,
                names::nested_field_name(key),
                TypeBody::Enum { base, members },
                out,
            );
            return Ok(TypeRef::Named(child));
        }

        match schema::type_of(prop) {
            Some("object") => {
                if schema::properties(prop).is_empty() {
                    // an object with no declared shape is a free-form mapping
                    return Ok(TypeRef::Primitive(Primitive::AnyObject));
                }
                let child_qualified = format!("{parent_qualified}.{}", names::nested_field_name(key));
                let fields = self.lower_properties(&child_qualified, prop, pointer, out)?;
                let child = self.lift(
                    parent_qualified,
                    names::nested_field_name(key),
                    TypeBody::Object { fields },
                    out,
                );
                Ok(TypeRef::Named(child))
            }
            Some("array") => {
                let item =
                    self.lower_item_type(parent_qualified, Some(key), prop, pointer, out)?;
                match item {
                    None => Ok(TypeRef::Primitive(Primitive::AnyArray)),
                    Some(item) => {
                        let (min_items, max_items) = length_bounds(prop);
                        Ok(TypeRef::List { item: Box::new(item), min_items, max_items })
                    }
                }
            }
            Some("string") if schema::is_bytes_string(prop) => {
                Ok(TypeRef::Primitive(Primitive::Bytes))
            }
            Some(other) => primitive_kind(other)
                .map(TypeRef::Primitive)
                .ok_or_else(|| {
                    GenError::schema_invalid(pointer, format!("unsupported type `{other}`"))
                }),
            // no type, no $ref, no enum: free-form value slot
            None => Ok(TypeRef::Primitive(Primitive::AnyObject)),
        }
    }

    /// Item type of an array at a named declaration. `None` when `items`
    /// is absent (free-form list).
    fn lower_items(
        &mut self,
        parent_qualified: &str,
        node: &Value,
        pointer: &str,
        out: &mut Vec<TypeDecl>,
    ) -> Result<Option<TypeRef>> {
        self.lower_item_type(parent_qualified, None, node, pointer, out)
    }

    fn lower_item_type(
        &mut self,
        parent_qualified: &str,
        key: Option<&str>,
        array_node: &Value,
        pointer: &str,
        out: &mut Vec<TypeDecl>,
    ) -> Result<Option<TypeRef>> {
        let items = match array_node.get("items") {
            Some(i) => i,
            None => return Ok(None),
        };
        // tuple form takes its first entry, matching the reference tool
        let items = match items {
            Value::Array(xs) => match xs.first() {
                Some(first) => first,
                None => return Ok(None),
            },
            other => other,
        };
        let items_pointer = format!("{pointer}/items");

        if let Some(reference) = items.get("$ref").and_then(Value::as_str) {
            let target = self.record_ref(&items_pointer, reference)?;
            return Ok(Some(TypeRef::Named(target)));
        }

        if items.get("enum").is_some() {
            let (base, members) = self.lower_enum(items, &items_pointer)?;
            let name = self.lift_name(parent_qualified, key);
            let child = self.lift(parent_qualified, name, TypeBody::Enum { base, members }, out);
            return Ok(Some(TypeRef::Named(child)));
        }

        match schema::type_of(items) {
            Some("object") => {
                if schema::properties(items).is_empty() {
                    return Ok(Some(TypeRef::Primitive(Primitive::AnyObject)));
                }
                let name = self.lift_name(parent_qualified, key);
                let child_qualified = format!("{parent_qualified}.{name}");
                let fields =
                    self.lower_properties(&child_qualified, items, &items_pointer, out)?;
                let child =
                    self.lift(parent_qualified, name, TypeBody::Object { fields }, out);
                Ok(Some(TypeRef::Named(child)))
            }
            Some("array") => {
                // array-of-array: the inner array is anonymous
                let inner =
                    self.lower_item_type(parent_qualified, None, items, &items_pointer, out)?;
                let (min_items, max_items) = length_bounds(items);
                Ok(Some(match inner {
                    None => TypeRef::Primitive(Primitive::AnyArray),
                    Some(item) => TypeRef::List { item: Box::new(item), min_items, max_items },
                }))
            }
            Some("string") if schema::is_bytes_string(items) => {
                Ok(Some(TypeRef::Primitive(Primitive::Bytes)))
            }
            Some(other) => primitive_kind(other)
                .map(|p| Some(TypeRef::Primitive(p)))
                .ok_or_else(|| {
                    GenError::schema_invalid(
                        &items_pointer,
                        format!("unsupported type `{other}`"),
                    )
                }),
            None => Ok(Some(TypeRef::Primitive(Primitive::AnyObject))),
        }
    }

    fn lower_enum(&mut self, node: &Value, pointer: &str) -> Result<(EnumBase, Vec<EnumMember>)> {
        let values = node
            .get("enum")
            .and_then(Value::as_array)
            .filter(|xs| !xs.is_empty())
            .ok_or_else(|| GenError::schema_invalid(pointer, "enum must be a non-empty array"))?;

        let base = match schema::type_of(node) {
            Some("string") => EnumBase::Str,
            Some("integer") => EnumBase::Int,
            Some(other) => {
                return Err(GenError::schema_invalid(
                    pointer,
                    format!("enum over type `{other}` is not supported"),
                ));
            }
            None => match &values[0] {
                Value::String(_) => EnumBase::Str,
                Value::Number(_) => EnumBase::Int,
                _ => {
                    return Err(GenError::schema_invalid(
                        pointer,
                        "enum members must be strings or integers",
                    ));
                }
            },
        };

        let varnames = schema::enum_varnames(node);
        if let Some(ns) = &varnames {
            if ns.len() != values.len() {
                return Err(GenError::schema_invalid(
                    pointer,
                    "enum member name list does not match the member count",
                ));
            }
        }

        let mut members = Vec::with_capacity(values.len());
        for (i, v) in values.iter().enumerate() {
            let value = match (base, v) {
                (EnumBase::Str, Value::String(s)) => Literal::Str(s.clone()),
                (EnumBase::Int, Value::Number(n)) => Literal::Int(whole_i64(n).ok_or_else(
                    || GenError::schema_invalid(pointer, format!("`{n}` is not an integer")),
                )?),
                _ => {
                    return Err(GenError::schema_invalid(
                        pointer,
                        format!("enum member `{v}` does not match the enum base type"),
                    ));
                }
            };
            let name = match &varnames {
                Some(ns) => names::sanitize_ident(ns[i]),
                None => names::enum_member_name(&value),
            };
            if members.iter().any(|m: &EnumMember| m.name == name) {
                return Err(GenError::schema_invalid(
                    pointer,
                    format!("duplicate enum member name `{name}`"),
                ));
            }
            members.push(EnumMember { name, value });
        }
        Ok((base, members))
    }

    fn lift(
        &mut self,
        parent_qualified: &str,
        name: String,
        body: TypeBody,
        out: &mut Vec<TypeDecl>,
    ) -> String {
        let decl = TypeDecl { name, parent: Some(parent_qualified.to_string()), body };
        let qualified = decl.qualified_name();
        out.push(decl);
        qualified
    }

    /// `_<key>` when the schema gives us a property key, `_sub<k>` for
    /// anonymous array items (k counts lifted siblings, 1-based).
    fn lift_name(&mut self, parent_qualified: &str, key: Option<&str>) -> String {
        match key {
            Some(k) => names::nested_field_name(k),
            None => {
                let n = self.anon_ordinals.entry(parent_qualified.to_string()).or_insert(0);
                *n += 1;
                names::nested_item_name(*n)
            }
        }
    }

    fn record_ref(&mut self, pointer: &str, reference: &str) -> Result<String> {
        let target = resolve::reference_to_qualified(pointer, reference)?;
        self.sites.push(RefSite {
            pointer: pointer.to_string(),
            reference: reference.to_string(),
            target: target.clone(),
        });
        Ok(target)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Internal helpers
// ————————————————————————————————————————————————————————————————————————————

fn primitive_kind(type_name: &str) -> Option<Primitive> {
    match type_name {
        "integer" => Some(Primitive::Integer),
        "number" => Some(Primitive::Number),
        "string" => Some(Primitive::String),
        "boolean" => Some(Primitive::Boolean),
        "null" => Some(Primitive::Null),
        _ => None,
    }
}

fn length_bounds(node: &Value) -> (Option<u64>, Option<u64>) {
    (
        node.get("minItems").and_then(Value::as_u64),
        node.get("maxItems").and_then(Value::as_u64),
    )
}

fn whole_i64(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

/// A default must be a scalar literal compatible with the field kind.
/// Integer fields accept whole-valued floats (the uniform numeric rule).
fn lower_default(value: &Value, ty: &TypeRef, pointer: &str) -> Result<Literal> {
    let bad = |why: &str| GenError::schema_invalid(pointer, format!("invalid default: {why}"));
    let kind = match ty {
        TypeRef::Primitive(p) => *p,
        _ => return Err(bad("defaults are only supported on scalar fields")),
    };
    match (kind, value) {
        (Primitive::Integer, Value::Number(n)) => {
            whole_i64(n).map(Literal::Int).ok_or_else(|| bad("integer field needs a whole number"))
        }
        (Primitive::Number, Value::Number(n)) => n
            .as_f64()
            .map(Literal::Float)
            .ok_or_else(|| bad("number field needs a finite numeric")),
        (Primitive::String, Value::String(s)) => Ok(Literal::Str(s.clone())),
        (Primitive::Boolean, Value::Bool(b)) => Ok(Literal::Bool(*b)),
        (p, v) => Err(bad(&format!("`{v}` does not fit a {p:?} field"))),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————
