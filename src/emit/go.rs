//! Go back-end.
//!
//! One exported struct per object with fields in schema order and verbatim
//! `json:` tags; the positional struct literal is the constructor, so the
//! type system covers scalar validation and only the dynamic `FromMap` path
//! validates at runtime. Nested types are flattened to top level with
//! mangled names (`ABcd_Child1_Child2`) and render before their parent.
//! Enums follow the options-singleton pattern: `AbcdOptions.A`.

use crate::emit::{CodeWriter, EmitCtx, NestedPlacement, Target};
use crate::error::Result;
use crate::ir::{EnumBase, FieldDecl, Literal, Primitive, TypeBody, TypeDecl, TypeRef};
use crate::names;

pub struct GoTarget;

enum Shape {
    Struct,
    Enum,
    AliasOf(String),
}

fn shape(ctx: &EmitCtx, decl: &TypeDecl) -> Shape {
    match ctx.ir.effective_body(decl) {
        TypeBody::Object { .. } => Shape::Struct,
        TypeBody::Enum { .. } => Shape::Enum,
        TypeBody::Bytes => Shape::AliasOf("[]byte".to_string()),
        TypeBody::Array { item, .. } => Shape::AliasOf(format!("[]{}", go_type(item))),
        // effective_body resolves named alias chains, so only inline
        // targets can still be aliases here
        TypeBody::Alias { target } => Shape::AliasOf(go_type(target)),
    }
}

fn go_name(decl: &TypeDecl) -> String {
    names::capitalize(&names::flat_ident(&decl.qualified_name()))
}

fn field_name(f: &FieldDecl) -> String {
    names::capitalize(&names::sanitize_ident(&f.name))
}

fn go_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Integer) => "int64".into(),
        TypeRef::Primitive(Primitive::Number) => "float64".into(),
        TypeRef::Primitive(Primitive::String) => "string".into(),
        TypeRef::Primitive(Primitive::Boolean) => "bool".into(),
        TypeRef::Primitive(Primitive::Bytes) => "[]byte".into(),
        TypeRef::Primitive(Primitive::Null) => "interface{}".into(),
        TypeRef::Primitive(Primitive::AnyObject) => "map[string]interface{}".into(),
        TypeRef::Primitive(Primitive::AnyArray) => "[]interface{}".into(),
        TypeRef::Named(q) => names::capitalize(&names::flat_ident(q)),
        TypeRef::List { item, .. } => format!("[]{}", go_type(item)),
    }
}

impl Target for GoTarget {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn indent_unit(&self) -> &'static str {
        "\t"
    }

    fn nested_placement(&self) -> NestedPlacement {
        NestedPlacement::BeforeParent
    }

    fn preamble(&self, ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()> {
        w.line("// Code generated by json-popo. DO NOT EDIT.");
        w.line(format!("package {}", ctx.namespace.unwrap_or("generated")));
        w.blank();
        let imports = scan_imports(ctx);
        if !imports.is_empty() {
            w.line("import (");
            w.push();
            for imp in imports {
                w.line(format!("\"{imp}\""));
            }
            w.pop();
            w.line(")");
            w.blank();
        }
        Ok(())
    }

    fn open_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        let name = go_name(decl);
        match shape(ctx, decl) {
            Shape::Struct => {
                w.line(format!("type {name} struct {{"));
                w.push();
            }
            Shape::Enum => {
                let underlying = match ctx.enum_parts(decl) {
                    Some((EnumBase::Int, _)) => "int64",
                    _ => "string",
                };
                w.line(format!("type {name} {underlying}"));
                w.blank();
            }
            Shape::AliasOf(target) => {
                w.line(format!("type {name} = {target}"));
                w.blank();
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
        w.line(format!(
            "{} {} `json:\"{}\"`",
            field_name(field),
            go_type(&field.ty),
            field.name
        ));
        Ok(())
    }

    fn emit_constructor(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        // the positional struct literal is the constructor; this hook just
        // finishes the declaration the field hooks filled in
        if matches!(shape(ctx, decl), Shape::Struct) {
            w.pop();
            w.line("}");
            w.blank();
        }
        Ok(())
    }

    fn emit_validators(&self, _ctx: &EmitCtx, _decl: &TypeDecl, _w: &mut CodeWriter) -> Result<()> {
        // static types cover scalar validation; FromMap checks the dynamic path
        Ok(())
    }

    fn emit_enum_members(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        let Some((_, members)) = ctx.enum_parts(decl) else {
            return Ok(());
        };
        let name = go_name(decl);
        let options_type = format!("{}OptionsType", names::uncapitalize(&name));
        w.line(format!("type {options_type} struct {{"));
        w.push();
        for m in members {
            w.line(format!("{} {}", m.name, name));
        }
        w.pop();
        w.line("}");
        w.blank();
        w.line(format!("var {name}Options = {options_type}{{"));
        w.push();
        for m in members {
            w.line(format!("{}: {}({}),", m.name, name, go_literal(&m.value)));
        }
        w.pop();
        w.line("}");
        w.blank();
        Ok(())
    }

    fn emit_from_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::Struct => emit_struct_from_map(ctx, decl, w),
            Shape::Enum => emit_enum_from_map(ctx, decl, w),
            _ => Ok(()),
        }
    }

    fn emit_as_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::Struct => emit_struct_as_map(ctx, decl, w),
            Shape::Enum => emit_enum_as_map(ctx, decl, w),
            _ => Ok(()),
        }
    }

    fn close_type(&self, _ctx: &EmitCtx, _decl: &TypeDecl, _w: &mut CodeWriter) -> Result<()> {
        Ok(())
    }

    fn epilogue(&self, _ctx: &EmitCtx, _w: &mut CodeWriter) -> Result<()> {
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FromMap / AsMap bodies
// ————————————————————————————————————————————————————————————————————————————

fn emit_struct_from_map(ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
    let name = go_name(decl);
    w.line(format!(
        "func {name}FromMap(d map[string]interface{{}}) (*{name}, error) {{"
    ));
    w.push();
    w.line(format!("x := &{name}{{}}"));
    for f in ctx.object_fields(decl) {
        let gname = field_name(f);
        w.line(format!("if v, ok := d[\"{}\"]; ok && v != nil {{", f.name));
        w.push();
        let msg = format!("{} must be {}", f.name, go_type(&f.ty));
        emit_conversion(ctx, w, "v", &format!("x.{gname} = "), &f.ty, &f.name, &msg, 1);
        w.pop();
        if let Some(default) = &f.default {
            w.line("} else {");
            w.push();
            w.line(format!("x.{gname} = {}", go_literal(default)));
            w.pop();
            w.line("}");
        } else if f.required {
            w.line("} else {");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{} is required\")", f.name));
            w.pop();
            w.line("}");
        } else {
            w.line("}");
        }
    }
    w.line("return x, nil");
    w.pop();
    w.line("}");
    w.blank();
    Ok(())
}

/// Convert the dynamic value in `src` and hand it to `assign` (a prefix like
/// `x.Int = ` or `out1 = append(out1, `..`)`). Errors return `nil, err` —
/// this only ever runs inside a struct `FromMap`.
fn emit_conversion(
    ctx: &EmitCtx,
    w: &mut CodeWriter,
    src: &str,
    assign_prefix: &str,
    ty: &TypeRef,
    field: &str,
    msg: &str,
    depth: usize,
) {
    // append-style sinks need their call closed
    let assign_suffix = if assign_prefix.contains("append(") { ")" } else { "" };
    let assign = move |w: &mut CodeWriter, value: &str| {
        w.line(format!("{assign_prefix}{value}{assign_suffix}"));
    };
    match ty {
        TypeRef::Primitive(Primitive::Integer) => {
            w.line(format!("switch t := {src}.(type) {{"));
            w.line("case int:");
            w.push();
            assign(w, "int64(t)");
            w.pop();
            w.line("case int64:");
            w.push();
            assign(w, "t");
            w.pop();
            w.line("case float64:");
            w.push();
            w.line("if t != math.Trunc(t) {");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
            assign(w, "int64(t)");
            w.pop();
            w.line("default:");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
        }
        TypeRef::Primitive(Primitive::Number) => {
            w.line(format!("switch t := {src}.(type) {{"));
            w.line("case int:");
            w.push();
            assign(w, "float64(t)");
            w.pop();
            w.line("case int64:");
            w.push();
            assign(w, "float64(t)");
            w.pop();
            w.line("case float64:");
            w.push();
            assign(w, "t");
            w.pop();
            w.line("default:");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
        }
        TypeRef::Primitive(Primitive::String) => {
            emit_assert(w, src, "string", msg, &assign, depth);
        }
        TypeRef::Primitive(Primitive::Boolean) => {
            emit_assert(w, src, "bool", msg, &assign, depth);
        }
        TypeRef::Primitive(Primitive::AnyObject) => {
            emit_assert(w, src, "map[string]interface{}", msg, &assign, depth);
        }
        TypeRef::Primitive(Primitive::AnyArray) => {
            emit_assert(w, src, "[]interface{}", msg, &assign, depth);
        }
        TypeRef::Primitive(Primitive::Null) => {
            w.line(format!("if {src} != nil {{"));
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
            assign(w, "nil");
        }
        TypeRef::Primitive(Primitive::Bytes) => {
            let sv = format!("s{depth}");
            let bv = format!("b{depth}");
            w.line(format!("{sv}, ok := {src}.(string)"));
            w.line("if !ok {");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
            w.line(format!("{bv}, err := base64.StdEncoding.DecodeString({sv})"));
            w.line("if err != nil {");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
            assign(w, &bv);
        }
        TypeRef::Named(q) => {
            let target = ctx.ir.get(q);
            let is_enum =
                target.is_some_and(|t| matches!(ctx.ir.effective_body(t), TypeBody::Enum { .. }));
            let flat = names::capitalize(&names::flat_ident(q));
            let cv = format!("c{depth}");
            if is_enum {
                w.line(format!("{cv}, err := {flat}FromMap({src})"));
                w.line("if err != nil {");
                w.push();
                w.line("return nil, err");
                w.pop();
                w.line("}");
                assign(w, &cv);
            } else {
                let mv = format!("m{depth}");
                w.line(format!("{mv}, ok := {src}.(map[string]interface{{}})"));
                w.line("if !ok {");
                w.push();
                w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
                w.pop();
                w.line("}");
                w.line(format!("{cv}, err := {flat}FromMap({mv})"));
                w.line("if err != nil {");
                w.push();
                w.line("return nil, err");
                w.pop();
                w.line("}");
                assign(w, &format!("*{cv}"));
            }
        }
        TypeRef::List { item, min_items, max_items } => {
            let ys = format!("ys{depth}");
            let out = format!("out{depth}");
            let ev = format!("e{depth}");
            w.line(format!("{ys}, ok := {src}.([]interface{{}})"));
            w.line("if !ok {");
            w.push();
            w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
            w.pop();
            w.line("}");
            if depth == 1 {
                if let Some(n) = min_items {
                    w.line(format!("if len({ys}) < {n} {{"));
                    w.push();
                    w.line(format!(
                        "return nil, fmt.Errorf(\"{field} must contain at least {n} items\")"
                    ));
                    w.pop();
                    w.line("}");
                }
                if let Some(n) = max_items {
                    w.line(format!("if len({ys}) > {n} {{"));
                    w.push();
                    w.line(format!(
                        "return nil, fmt.Errorf(\"{field} must contain at most {n} items\")"
                    ));
                    w.pop();
                    w.line("}");
                }
            }
            w.line(format!("{out} := make({}, 0, len({ys}))", go_type(ty)));
            w.line(format!("for _, {ev} := range {ys} {{"));
            w.push();
            let elem_msg = format!("{field} array values must be {}", go_type(item));
            emit_conversion(
                ctx,
                w,
                &ev,
                &format!("{out} = append({out}, "),
                item,
                field,
                &elem_msg,
                depth + 1,
            );
            w.pop();
            w.line("}");
            assign(w, &out);
        }
    }
}

fn emit_assert(
    w: &mut CodeWriter,
    src: &str,
    go_ty: &str,
    msg: &str,
    assign: &dyn Fn(&mut CodeWriter, &str),
    depth: usize,
) {
    let tv = format!("t{depth}");
    w.line(format!("{tv}, ok := {src}.({go_ty})"));
    w.line("if !ok {");
    w.push();
    w.line(format!("return nil, fmt.Errorf(\"{msg}\")"));
    w.pop();
    w.line("}");
    assign(w, &tv);
}

fn emit_enum_from_map(ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
    let Some((base, members)) = ctx.enum_parts(decl) else {
        return Ok(());
    };
    let name = go_name(decl);
    let zero = match base {
        EnumBase::Str => format!("{name}(\"\")"),
        EnumBase::Int => format!("{name}(0)"),
    };
    w.line(format!("func {name}FromMap(v interface{{}}) ({name}, error) {{"));
    w.push();
    match base {
        EnumBase::Str => {
            w.line("s, ok := v.(string)");
            w.line("if !ok {");
            w.push();
            w.line(format!("return {zero}, fmt.Errorf(\"{name} must be string\")"));
            w.pop();
            w.line("}");
            w.line(format!("switch {name}(s) {{"));
            let cases = members
                .iter()
                .map(|m| format!("{name}Options.{}", m.name))
                .collect::<Vec<_>>()
                .join(", ");
            w.line(format!("case {cases}:"));
            w.push();
            w.line(format!("return {name}(s), nil"));
            w.pop();
            w.line("}");
        }
        EnumBase::Int => {
            w.line("var n int64");
            w.line("switch t := v.(type) {");
            w.line("case int:");
            w.push();
            w.line("n = int64(t)");
            w.pop();
            w.line("case int64:");
            w.push();
            w.line("n = t");
            w.pop();
            w.line("case float64:");
            w.push();
            w.line("if t != math.Trunc(t) {");
            w.push();
            w.line(format!("return {zero}, fmt.Errorf(\"{name} must be int64\")"));
            w.pop();
            w.line("}");
            w.line("n = int64(t)");
            w.pop();
            w.line("default:");
            w.push();
            w.line(format!("return {zero}, fmt.Errorf(\"{name} must be int64\")"));
            w.pop();
            w.line("}");
            w.line(format!("switch {name}(n) {{"));
            let cases = members
                .iter()
                .map(|m| format!("{name}Options.{}", m.name))
                .collect::<Vec<_>>()
                .join(", ");
            w.line(format!("case {cases}:"));
            w.push();
            w.line(format!("return {name}(n), nil"));
            w.pop();
            w.line("}");
        }
    }
    w.line(format!(
        "return {zero}, fmt.Errorf(\"%v is not a valid {name}\", v)"
    ));
    w.pop();
    w.line("}");
    w.blank();
    Ok(())
}

fn emit_struct_as_map(ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
    let name = go_name(decl);
    w.line(format!(
        "func (x *{name}) AsMap() map[string]interface{{}} {{"
    ));
    w.push();
    w.line("d := map[string]interface{}{}");
    for f in ctx.object_fields(decl) {
        let gname = field_name(f);
        emit_as_map_value(w, &format!("x.{gname}"), &f.name, &f.ty, 1);
    }
    w.line("return d");
    w.pop();
    w.line("}");
    w.blank();
    Ok(())
}

/// Emit `d["key"] = <mapping form of src>`, looping for list kinds.
fn emit_as_map_value(w: &mut CodeWriter, src: &str, key: &str, ty: &TypeRef, depth: usize) {
    match ty {
        TypeRef::List { item, .. } => {
            let xs = format!("xs{depth}");
            let ev = format!("e{depth}");
            w.line("{");
            w.push();
            w.line(format!("{xs} := make([]interface{{}}, 0, len({src}))"));
            w.line(format!("for _, {ev} := range {src} {{"));
            w.push();
            emit_as_map_append(w, &xs, &ev, item, depth + 1);
            w.pop();
            w.line("}");
            w.line(format!("d[\"{key}\"] = {xs}"));
            w.pop();
            w.line("}");
        }
        _ => {
            w.line(format!("d[\"{key}\"] = {}", as_map_scalar(src, ty)));
        }
    }
}

fn emit_as_map_append(w: &mut CodeWriter, dst: &str, src: &str, ty: &TypeRef, depth: usize) {
    match ty {
        TypeRef::List { item, .. } => {
            let xs = format!("xs{depth}");
            let ev = format!("e{depth}");
            w.line(format!("{xs} := make([]interface{{}}, 0, len({src}))"));
            w.line(format!("for _, {ev} := range {src} {{"));
            w.push();
            emit_as_map_append(w, &xs, &ev, item, depth + 1);
            w.pop();
            w.line("}");
            w.line(format!("{dst} = append({dst}, {xs})"));
        }
        _ => {
            w.line(format!("{dst} = append({dst}, {})", as_map_scalar(src, ty)));
        }
    }
}

fn as_map_scalar(src: &str, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Bytes) => {
            format!("base64.StdEncoding.EncodeToString({src})")
        }
        TypeRef::Primitive(_) => src.to_string(),
        TypeRef::Named(_) => format!("{src}.AsMap()"),
        TypeRef::List { .. } => src.to_string(), // handled by the loop emitters
    }
}

fn emit_enum_as_map(ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
    let Some((base, _)) = ctx.enum_parts(decl) else {
        return Ok(());
    };
    let name = go_name(decl);
    let cast = match base {
        EnumBase::Str => "string",
        EnumBase::Int => "int64",
    };
    w.line(format!("func (x {name}) AsMap() interface{{}} {{"));
    w.push();
    w.line(format!("return {cast}(x)"));
    w.pop();
    w.line("}");
    w.blank();
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// Imports
// ————————————————————————————————————————————————————————————————————————————

fn scan_imports(ctx: &EmitCtx) -> Vec<&'static str> {
    let mut fmt = false;
    let mut math = false;
    let mut base64 = false;

    fn walk(ty: &TypeRef, math: &mut bool, base64: &mut bool) {
        match ty {
            TypeRef::Primitive(Primitive::Integer) => *math = true,
            TypeRef::Primitive(Primitive::Bytes) => *base64 = true,
            TypeRef::List { item, .. } => walk(item, math, base64),
            _ => {}
        }
    }

    for decl in ctx.ir.types() {
        match ctx.ir.effective_body(decl) {
            TypeBody::Object { fields } => {
                if !fields.is_empty() {
                    fmt = true;
                }
                for f in fields {
                    walk(&f.ty, &mut math, &mut base64);
                }
            }
            TypeBody::Enum { base, .. } => {
                fmt = true;
                if *base == EnumBase::Int {
                    math = true;
                }
            }
            _ => {}
        }
    }

    let mut imports = Vec::new();
    if base64 {
        imports.push("encoding/base64");
    }
    if fmt {
        imports.push("fmt");
    }
    if math {
        imports.push("math");
    }
    imports
}

fn go_literal(lit: &Literal) -> String {
    match lit {
        Literal::Str(s) => serde_json::Value::from(s.as_str()).to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{f}"),
        Literal::Bool(b) => b.to_string(),
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
        emit_ns(schema, None)
    }

    fn emit_ns(schema: serde_json::Value, ns: Option<&str>) -> String {
        let doc = SchemaDoc::from_value(schema).unwrap();
        let ir = build_ir(
            &doc,
            &BuildOptions { full_definitions: true, ..Default::default() },
        )
        .unwrap();
        let opts = EmitOptions { namespace: ns.map(str::to_string) };
        render(&ir, &GoTarget, &opts).unwrap()
    }

    fn basic_schema() -> serde_json::Value {
        json!({
            "title": "Abcd",
            "type": "object",
            "properties": {
                "Int": {"type": "integer"},
                "Float": {"type": "number"},
                "ListInt": {"type": "array", "items": {"type": "integer"}},
                "String": {"type": "string"},
                "Object": {"type": "object"}
            }
        })
    }

    #[test]
    fn structs_carry_typed_fields_with_json_tags() {
        let src = emit(basic_schema());
        assert!(src.contains("type Abcd struct {"));
        assert!(src.contains("Int int64 `json:\"Int\"`"));
        assert!(src.contains("Float float64 `json:\"Float\"`"));
        assert!(src.contains("ListInt []int64 `json:\"ListInt\"`"));
        assert!(src.contains("Object map[string]interface{} `json:\"Object\"`"));
    }

    #[test]
    fn package_name_follows_the_namespace() {
        let src = emit_ns(basic_schema(), Some("models"));
        assert!(src.starts_with("// Code generated"));
        assert!(src.contains("package models"));
        assert!(emit(basic_schema()).contains("package generated"));
    }

    #[test]
    fn from_map_rejects_fractional_integers() {
        let src = emit(basic_schema());
        assert!(src.contains("if t != math.Trunc(t) {"));
        assert!(src.contains("return nil, fmt.Errorf(\"Int must be int64\")"));
        assert!(src.contains("return nil, fmt.Errorf(\"ListInt array values must be int64\")"));
    }

    #[test]
    fn nested_types_flatten_with_mangled_names() {
        let src = emit(json!({
            "definitions": {
                "ABcd": {
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
                }
            }
        }));
        assert!(src.contains("type ABcd_Child1 struct {"));
        assert!(src.contains("type ABcd_Child1_Child2 struct {"));
        assert!(src.contains("Child1 ABcd_Child1 `json:\"Child1\"`"));
        // flattened children precede the parent
        let child = src.find("type ABcd_Child1_Child2 struct").unwrap();
        let parent = src.find("type ABcd struct").unwrap();
        assert!(child < parent);
    }

    #[test]
    fn enums_use_the_options_singleton_pattern() {
        let src = emit(json!({"title": "Abcd", "type": "string", "enum": ["A", "B", "C"]}));
        assert!(src.contains("type Abcd string"));
        assert!(src.contains("type abcdOptionsType struct {"));
        assert!(src.contains("var AbcdOptions = abcdOptionsType{"));
        assert!(src.contains("A: Abcd(\"A\"),"));
        assert!(src.contains("return string(x)"));
    }

    #[test]
    fn integer_enums_carry_integer_values() {
        let src = emit(json!({
            "title": "Abcd",
            "type": "integer",
            "enum": [0, 1, 2, 99],
            "x-enum-varnames": ["A", "B", "C", "D"]
        }));
        assert!(src.contains("type Abcd int64"));
        assert!(src.contains("D: Abcd(99),"));
        assert!(src.contains("is not a valid Abcd"));
    }

    #[test]
    fn bytes_fields_round_trip_base64() {
        let src = emit(json!({
            "title": "B",
            "type": "object",
            "properties": {
                "prop1": {"type": "string", "media": {"binaryEncoding": "base64"}}
            }
        }));
        assert!(src.contains("\"encoding/base64\""));
        assert!(src.contains("Prop1 []byte `json:\"prop1\"`"));
        assert!(src.contains("base64.StdEncoding.DecodeString"));
        assert!(src.contains("base64.StdEncoding.EncodeToString(x.Prop1)"));
    }

    #[test]
    fn lowercase_keys_become_exported_fields() {
        let src = emit(json!({
            "definitions": {
                "A": {
                    "type": "object",
                    "properties": {
                        "sub1": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {"prop1": {"type": "integer"}}
                            }
                        }
                    }
                }
            }
        }));
        assert!(src.contains("type A_sub1 struct {"));
        assert!(src.contains("Sub1 []A_sub1 `json:\"sub1\"`"));
        assert!(src.contains("Prop1 int64 `json:\"prop1\"`"));
    }

    #[test]
    fn imports_stay_minimal() {
        // strings only: no math, no base64
        let src = emit(json!({
            "title": "S",
            "type": "object",
            "properties": {"a": {"type": "string"}}
        }));
        assert!(src.contains("\"fmt\""));
        assert!(!src.contains("\"math\""));
        assert!(!src.contains("encoding/base64"));

        // empty object: no imports at all
        let src = emit(json!({"title": "E", "type": "object", "properties": {}}));
        assert!(!src.contains("import"));
    }

    #[test]
    fn required_fields_error_when_absent() {
        let src = emit(json!({
            "title": "R",
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        }));
        assert!(src.contains("return nil, fmt.Errorf(\"a is required\")"));
    }

    #[test]
    fn defaults_apply_on_absence() {
        let src = emit(json!({
            "title": "D",
            "type": "object",
            "properties": {"n": {"type": "integer", "default": 5}}
        }));
        assert!(src.contains("} else {"));
        assert!(src.contains("x.N = 5"));
    }
}
