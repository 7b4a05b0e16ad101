//! Python back-end.
//!
//! One class per type with nested classes rendered inside. Validation lives
//! in per-field property setters; the constructor assigns through them, so
//! a bad positional argument raises before the instance escapes. Every type
//! carries `from_dict` / `as_dict`, enums subclass `enum.Enum`.

use crate::emit::{CodeWriter, EmitCtx, NestedPlacement, Target};
use crate::error::Result;
use crate::ir::{FieldDecl, Literal, Primitive, TypeBody, TypeDecl, TypeRef};

pub struct PythonTarget;

enum Shape<'a> {
    Class,
    AliasOf(&'a str),
}

fn shape<'a>(ctx: &EmitCtx<'a>, decl: &'a TypeDecl) -> Shape<'a> {
    match ctx.ir.effective_body(decl) {
        TypeBody::Object { .. } | TypeBody::Enum { .. } => Shape::Class,
        TypeBody::Bytes => Shape::AliasOf("bytes"),
        TypeBody::Array { .. } => Shape::AliasOf("list"),
        TypeBody::Alias { target } => match target {
            TypeRef::Primitive(p) => Shape::AliasOf(alias_type(*p)),
            TypeRef::List { .. } => Shape::AliasOf("list"),
            TypeRef::Named(_) => Shape::Class,
        },
    }
}

fn alias_type(p: Primitive) -> &'static str {
    match p {
        Primitive::Integer => "int",
        Primitive::Number => "float",
        Primitive::String => "str",
        Primitive::Boolean => "bool",
        Primitive::Bytes => "bytes",
        Primitive::AnyObject => "dict",
        Primitive::AnyArray => "list",
        Primitive::Null => "type(None)",
    }
}

fn uses_enums(ctx: &EmitCtx) -> bool {
    ctx.ir.types().iter().any(|t| matches!(ctx.ir.effective_body(t), TypeBody::Enum { .. }))
}

impl Target for PythonTarget {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn nested_placement(&self) -> NestedPlacement {
        NestedPlacement::Inside
    }

    fn preamble(&self, ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()> {
        w.line("# Generated by json-popo. Do not edit.");
        if uses_enums(ctx) {
            w.line("from reprlib import repr as limitedRepr");
            w.blank();
            w.line("import enum");
        }
        w.blank();
        w.blank();
        Ok(())
    }

    fn open_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::AliasOf(py) => {
                w.line(format!("{} = {}", decl.name, py));
                w.blank();
                w.blank();
            }
            Shape::Class => {
                if ctx.enum_parts(decl).is_some() {
                    w.line(format!("class {}(enum.Enum):", decl.name));
                } else {
                    w.line(format!("class {}:", decl.name));
                }
                w.push();
            }
        }
        Ok(())
    }

    fn emit_field(
        &self,
        _ctx: &EmitCtx,
        _decl: &TypeDecl,
        field: &FieldDecl,
        w: &mut CodeWriter,
    ) -> Result<()> {
        let name = &field.name;
        w.line(format!("def _get_{name}(self):"));
        w.push();
        w.line(format!("return self.__{name}"));
        w.pop();
        w.blank();
        w.line(format!("def _set_{name}(self, value):"));
        w.push();
        w.line("if value is None:");
        w.push();
        if field.required {
            w.line(format!("raise ValueError(\"{name} is required\")"));
        } else {
            w.line("pass");
        }
        w.pop();
        w.line(format!("elif not ({}):", check_expr("value", &field.ty)));
        w.push();
        w.line(format!(
            "raise TypeError(\"{name} must be {}\")",
            kind_name(&field.ty)
        ));
        w.pop();
        if let TypeRef::List { item, min_items, max_items } = &field.ty {
            w.line(format!(
                "elif not all({} for p in value):",
                elem_expr("p", item, 1)
            ));
            w.push();
            w.line(format!(
                "raise TypeError(\"{name} list values must be {}\")",
                kind_name(item)
            ));
            w.pop();
            if let Some(n) = min_items {
                w.line(format!("elif len(value) < {n}:"));
                w.push();
                w.line(format!(
                    "raise ValueError(\"{name} must contain at least {n} items\")"
                ));
                w.pop();
            }
            if let Some(n) = max_items {
                w.line(format!("elif len(value) > {n}:"));
                w.push();
                w.line(format!(
                    "raise ValueError(\"{name} must contain at most {n} items\")"
                ));
                w.pop();
            }
        }
        w.blank();
        w.line(format!("self.__{name} = value"));
        w.pop();
        w.blank();
        w.line(format!("{name} = property(_get_{name}, _set_{name})"));
        w.blank();
        Ok(())
    }

    fn emit_constructor(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) || ctx.enum_parts(decl).is_some() {
            return Ok(());
        }
        let fields = ctx.object_fields(decl);
        let params: Vec<String> = fields
            .iter()
            .map(|f| match &f.default {
                Some(d) => format!("{}={}", f.name, py_literal(d)),
                None => format!("{}=None", f.name),
            })
            .collect();
        if params.is_empty() {
            w.line("def __init__(self):");
            w.push();
            w.line("pass");
        } else {
            w.line(format!("def __init__(self, {}):", params.join(", ")));
            w.push();
            for f in fields {
                w.line(format!("self.{0} = {0}", f.name));
            }
        }
        w.pop();
        w.blank();
        Ok(())
    }

    fn emit_validators(&self, _ctx: &EmitCtx, _decl: &TypeDecl, _w: &mut CodeWriter) -> Result<()> {
        // validation lives in the property setters emitted per field
        Ok(())
    }

    fn emit_enum_members(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if let Some((_, members)) = ctx.enum_parts(decl) {
            for m in members {
                w.line(format!("{} = {}", m.name, py_literal(&m.value)));
            }
            w.blank();
        }
        Ok(())
    }

    fn emit_from_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) {
            return Ok(());
        }
        let qualified = decl.qualified_name();
        w.line("@staticmethod");
        w.line("def from_dict(d):");
        w.push();
        if ctx.enum_parts(decl).is_some() {
            w.line(format!("return {qualified}(d)"));
        } else {
            w.line("v = {}");
            for f in ctx.object_fields(decl) {
                let name = &f.name;
                w.line(format!("if \"{name}\" in d:"));
                w.push();
                w.line(format!(
                    "v[\"{name}\"] = {}",
                    from_dict_expr(&format!("d[\"{name}\"]"), &f.ty, 1)
                ));
                w.pop();
            }
            w.line(format!("return {qualified}(**v)"));
        }
        w.pop();
        w.blank();
        Ok(())
    }

    fn emit_as_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) {
            return Ok(());
        }
        w.line("def as_dict(self):");
        w.push();
        if ctx.enum_parts(decl).is_some() {
            w.line("return self.value");
        } else {
            w.line("d = {}");
            for f in ctx.object_fields(decl) {
                let name = &f.name;
                w.line(format!("if self.__{name} is not None:"));
                w.push();
                w.line(format!(
                    "d[\"{name}\"] = {}",
                    as_dict_expr(&format!("self.__{name}"), &f.ty, 1)
                ));
                w.pop();
            }
            w.line("return d");
        }
        w.pop();
        w.blank();
        Ok(())
    }

    fn close_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) {
            return Ok(());
        }
        w.line("def __repr__(self):");
        w.push();
        if ctx.enum_parts(decl).is_some() {
            w.line(format!("return \"<Enum {}. {{}}: {{}}>\".format(", decl.name));
            w.push();
            w.line("limitedRepr(self.name), limitedRepr(self.value)");
            w.pop();
            w.line(")");
        } else {
            let fields = ctx.object_fields(decl);
            let pattern: Vec<String> =
                fields.iter().map(|f| format!("{}: {{}}", f.name)).collect();
            let args: Vec<String> = fields.iter().map(|f| format!("self.__{}", f.name)).collect();
            w.line(format!(
                "return \"<Class {}. {}>\".format({})",
                decl.name,
                pattern.join(", "),
                args.join(", ")
            ));
        }
        w.pop();
        w.pop();
        w.blank();
        w.blank();
        Ok(())
    }

    fn epilogue(&self, _ctx: &EmitCtx, _w: &mut CodeWriter) -> Result<()> {
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Expression builders
// ————————————————————————————————————————————————————————————————————————————

fn py_literal(lit: &Literal) -> String {
    match lit {
        Literal::Str(s) => serde_json::Value::from(s.as_str()).to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{f}"),
        Literal::Bool(b) => if *b { "True".into() } else { "False".into() },
    }
}

fn kind_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Integer) => "int".into(),
        TypeRef::Primitive(Primitive::Number) => "float".into(),
        TypeRef::Primitive(Primitive::String) => "str".into(),
        TypeRef::Primitive(Primitive::Boolean) => "bool".into(),
        TypeRef::Primitive(Primitive::Bytes) => "bytes".into(),
        TypeRef::Primitive(Primitive::Null) => "None".into(),
        TypeRef::Primitive(Primitive::AnyObject) => "dict".into(),
        TypeRef::Primitive(Primitive::AnyArray) => "list".into(),
        TypeRef::Named(q) => q.clone(),
        TypeRef::List { .. } => "list".into(),
    }
}

/// Expression that is truthy when `var` satisfies `ty`. For lists only the
/// container is checked here; elements get their own message.
fn check_expr(var: &str, ty: &TypeRef) -> String {
    match ty {
        TypeRef::List { .. } => format!("isinstance({var}, list)"),
        other => elem_expr(var, other, 1),
    }
}

fn elem_expr(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Integer) => format!(
            "isinstance({var}, (int, float)) and not isinstance({var}, bool) and float({var}).is_integer()"
        ),
        TypeRef::Primitive(Primitive::Number) => {
            format!("isinstance({var}, (int, float)) and not isinstance({var}, bool)")
        }
        TypeRef::Primitive(Primitive::String) => format!("isinstance({var}, str)"),
        TypeRef::Primitive(Primitive::Boolean) => format!("isinstance({var}, bool)"),
        TypeRef::Primitive(Primitive::Bytes) => {
            format!("isinstance({var}, (bytes, bytearray))")
        }
        TypeRef::Primitive(Primitive::Null) => format!("{var} is None"),
        TypeRef::Primitive(Primitive::AnyObject) => format!("isinstance({var}, dict)"),
        TypeRef::Primitive(Primitive::AnyArray) => format!("isinstance({var}, list)"),
        TypeRef::Named(q) => format!("isinstance({var}, {q})"),
        TypeRef::List { item, .. } => {
            let inner = format!("p{}", depth + 1);
            format!(
                "isinstance({var}, list) and all({} for {inner} in {var})",
                elem_expr(&inner, item, depth + 1)
            )
        }
    }
}

fn from_dict_expr(expr: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => expr.to_string(),
        TypeRef::Named(q) => {
            format!("None if {expr} is None else {q}.from_dict({expr})")
        }
        TypeRef::List { item, .. } => {
            let var = format!("p{depth}");
            let inner = from_dict_elem(&var, item, depth + 1);
            format!("None if {expr} is None else [{inner} for {var} in {expr}]")
        }
    }
}

fn from_dict_elem(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => var.to_string(),
        TypeRef::Named(q) => format!("{q}.from_dict({var})"),
        TypeRef::List { item, .. } => {
            let inner_var = format!("p{depth}");
            let inner = from_dict_elem(&inner_var, item, depth + 1);
            format!("[{inner} for {inner_var} in {var}]")
        }
    }
}

fn as_dict_expr(expr: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => expr.to_string(),
        TypeRef::Named(_) => format!("{expr}.as_dict()"),
        TypeRef::List { item, .. } => {
            let var = format!("p{depth}");
            let inner = as_dict_elem(&var, item, depth + 1);
            format!("[{inner} for {var} in {expr}]")
        }
    }
}

fn as_dict_elem(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => var.to_string(),
        TypeRef::Named(_) => format!("{var}.as_dict()"),
        TypeRef::List { item, .. } => {
            let inner_var = format!("p{depth}");
            let inner = as_dict_elem(&inner_var, item, depth + 1);
            format!("[{inner} for {inner_var} in {var}]")
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{render, EmitOptions};
    use crate::lower::{build_ir, BuildOptions};
    use crate::schema::SchemaDoc;
    use serde_json::json;

    fn emit(schema: serde_json::Value) -> String {
        let doc = SchemaDoc::from_value(schema).unwrap();
        let ir = build_ir(&doc, &BuildOptions::default()).unwrap();
        render(&ir, &PythonTarget, &EmitOptions::default()).unwrap()
    }

    #[test]
    fn scalar_validators_use_python_kind_names() {
        let src = emit(json!({
            "title": "ABcd",
            "type": "object",
            "properties": {
                "Int": {"type": "integer"},
                "Float": {"type": "number"},
                "ListInt": {"type": "array", "items": {"type": "integer"}},
                "String": {"type": "string"}
            }
        }));
        assert!(src.contains("raise TypeError(\"Int must be int\")"));
        assert!(src.contains("raise TypeError(\"Float must be float\")"));
        assert!(src.contains("raise TypeError(\"String must be str\")"));
        assert!(src.contains("raise TypeError(\"ListInt list values must be int\")"));
    }

    #[test]
    fn construction_assigns_through_validating_properties() {
        let src = emit(json!({
            "title": "P",
            "type": "object",
            "properties": {"a": {"type": "string"}}
        }));
        assert!(src.contains("def __init__(self, a=None):"));
        assert!(src.contains("self.a = a"));
        assert!(src.contains("a = property(_get_a, _set_a)"));
    }

    #[test]
    fn nested_classes_render_inside_the_parent() {
        let src = emit(json!({
            "title": "ABcd",
            "type": "object",
            "properties": {
                "Child1": {
                    "type": "object",
                    "properties": {
                        "IntVal": {"type": "integer"},
                        "Child2": {
                            "type": "object",
                            "properties": {"IntVal": {"type": "integer"}}
                        }
                    }
                }
            }
        }));
        assert!(src.contains("class Abcd:"));
        assert!(src.contains("    class _Child1:"));
        assert!(src.contains("        class _Child2:"));
        assert!(src.contains("isinstance(value, Abcd._Child1)"));
        assert!(src.contains("raise TypeError(\"Child2 must be Abcd._Child1._Child2\")"));
        assert!(src.contains("return Abcd._Child1._Child2(**v)"));
    }

    #[test]
    fn enums_subclass_enum_with_value_access() {
        let src = emit(json!({"title": "ABcd", "type": "string", "enum": ["A", "B", "C"]}));
        assert!(src.contains("import enum"));
        assert!(src.contains("class Abcd(enum.Enum):"));
        assert!(src.contains("A = \"A\""));
        assert!(src.contains("return Abcd(d)"));
        assert!(src.contains("return self.value"));
        assert!(src.contains("limitedRepr(self.name), limitedRepr(self.value)"));
    }

    #[test]
    fn lifted_property_enum_lives_inside_the_class() {
        let src = emit(json!({
            "title": "ABcd",
            "type": "object",
            "properties": {
                "StringEnum": {"type": "string", "enum": ["A", "b", "c"]}
            }
        }));
        assert!(src.contains("class _StringEnum(enum.Enum):"));
        assert!(src.contains("return Abcd._StringEnum(d)"));
    }

    #[test]
    fn plain_objects_skip_the_enum_imports() {
        let src = emit(json!({
            "title": "P",
            "type": "object",
            "properties": {"a": {"type": "string"}}
        }));
        assert!(!src.contains("import enum"));
    }

    #[test]
    fn empty_objects_stay_constructible() {
        let src = emit(json!({"definitions": {}}));
        assert!(src.contains("class RootObject:"));
        assert!(src.contains("def __init__(self):"));
        assert!(src.contains("pass"));
    }

    #[test]
    fn bytes_fields_check_bytes() {
        let src = emit(json!({
            "title": "B",
            "type": "object",
            "properties": {
                "prop1": {"type": "string", "media": {"binaryEncoding": "base64"}}
            }
        }));
        assert!(src.contains("isinstance(value, (bytes, bytearray))"));
        assert!(src.contains("raise TypeError(\"prop1 must be bytes\")"));
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let src = emit(json!({
            "title": "W",
            "type": "object",
            "properties": {"n": {"type": "integer"}}
        }));
        assert!(src.contains("float(value).is_integer()"));
    }

    #[test]
    fn from_dict_only_passes_present_keys() {
        let src = emit(json!({
            "title": "F",
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}}
        }));
        assert!(src.contains("if \"a\" in d:"));
        assert!(src.contains("v[\"a\"] = d[\"a\"]"));
        assert!(src.contains("return F(**v)"));
    }
}
