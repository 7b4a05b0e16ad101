//! JavaScript back-end.
//!
//! One `class` per type, positional constructor with inline validators,
//! `static fromMap(d)` / `asMap()`, enum members as static singletons.
//! Nested types attach to their parent by qualified assignment
//! (`Abcd._Child1 = class _Child1 { ... };`), so they render after it.

use crate::emit::{CodeWriter, EmitCtx, NestedPlacement, Target};
use crate::error::Result;
use crate::ir::{FieldDecl, Literal, Primitive, TypeBody, TypeDecl, TypeRef};

pub struct JsTarget;

/// How a decl renders in JS: a full class, or a transparent alias binding.
enum Shape<'a> {
    Class,
    AliasOf(&'a str),
}

fn shape<'a>(ctx: &EmitCtx<'a>, decl: &'a TypeDecl) -> Shape<'a> {
    match ctx.ir.effective_body(decl) {
        TypeBody::Object { .. } | TypeBody::Enum { .. } => Shape::Class,
        TypeBody::Bytes => Shape::AliasOf("Buffer"),
        TypeBody::Array { .. } => Shape::AliasOf("Array"),
        TypeBody::Alias { target } => match target {
            TypeRef::Primitive(p) => Shape::AliasOf(alias_constructor(*p)),
            TypeRef::List { .. } => Shape::AliasOf("Array"),
            // named alias chains land on a real body via effective_body
            TypeRef::Named(_) => Shape::Class,
        },
    }
}

fn alias_constructor(p: Primitive) -> &'static str {
    match p {
        Primitive::Integer | Primitive::Number => "Number",
        Primitive::String => "String",
        Primitive::Boolean => "Boolean",
        Primitive::Bytes => "Buffer",
        Primitive::AnyArray => "Array",
        Primitive::AnyObject | Primitive::Null => "Object",
    }
}

impl Target for JsTarget {
    fn name(&self) -> &'static str {
        "js"
    }

    fn extension(&self) -> &'static str {
        "js"
    }

    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn nested_placement(&self) -> NestedPlacement {
        NestedPlacement::AfterParent
    }

    fn preamble(&self, _ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()> {
        w.line("// Generated by json-popo. Do not edit.");
        w.line("\"use strict\";");
        w.blank();
        Ok(())
    }

    fn open_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::AliasOf(ctor) => {
                w.line(format!("const {} = {};", decl.name, ctor));
                w.blank();
            }
            Shape::Class => {
                if let Some(ns) = ctx.namespace {
                    w.line("/**");
                    w.line(format!(" * @memberOf {ns}"));
                    w.line(" */");
                }
                match &decl.parent {
                    None => w.line(format!("class {} {{", decl.name)),
                    Some(parent) => {
                        w.line(format!("{parent}.{0} = class {0} {{", decl.name));
                    }
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
        _field: &FieldDecl,
        _w: &mut CodeWriter,
    ) -> Result<()> {
        // fields are plain instance properties, established in the constructor
        Ok(())
    }

    fn emit_constructor(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::AliasOf(_) => return Ok(()),
            Shape::Class => {}
        }
        if ctx.enum_parts(decl).is_some() {
            w.line("constructor(value = null) {");
            w.push();
            w.line("this.value = value;");
            w.pop();
            w.line("}");
            w.blank();
            return Ok(());
        }
        let params: Vec<String> = ctx
            .object_fields(decl)
            .iter()
            .map(|f| match &f.default {
                Some(d) => format!("{} = {}", f.name, js_literal(d)),
                None => format!("{} = null", f.name),
            })
            .collect();
        w.line(format!("constructor({}) {{", params.join(", ")));
        w.push();
        Ok(())
    }

    fn emit_validators(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) || ctx.enum_parts(decl).is_some() {
            return Ok(());
        }
        let fields = ctx.object_fields(decl);
        for f in fields {
            let name = &f.name;
            if f.required {
                w.line(format!("if ({name} === null || {name} === undefined) {{"));
                w.push();
                w.line(format!("throw new Error(\"{name} is required\");"));
                w.pop();
                w.line("}");
            }
            if let Some((cond, kind)) = valid_cond(name, &f.ty) {
                w.line(format!("if ({name} !== null && {name} !== undefined) {{"));
                w.push();
                w.line(format!("if (!({cond})) {{"));
                w.push();
                w.line(format!("throw new Error(\"{name} must be {kind}\");"));
                w.pop();
                w.line("}");
                if let TypeRef::List { item, min_items, max_items } = &f.ty {
                    let elem = elem_cond("p", item, 1);
                    let elem_kind = kind_name(item);
                    w.line(format!("if (!{name}.every((p) => {elem})) {{"));
                    w.push();
                    w.line(format!(
                        "throw new Error(\"{name} array values must be {elem_kind}\");"
                    ));
                    w.pop();
                    w.line("}");
                    if let Some(n) = min_items {
                        w.line(format!("if ({name}.length < {n}) {{"));
                        w.push();
                        w.line(format!(
                            "throw new Error(\"{name} must contain at least {n} items\");"
                        ));
                        w.pop();
                        w.line("}");
                    }
                    if let Some(n) = max_items {
                        w.line(format!("if ({name}.length > {n}) {{"));
                        w.push();
                        w.line(format!(
                            "throw new Error(\"{name} must contain at most {n} items\");"
                        ));
                        w.pop();
                        w.line("}");
                    }
                }
                w.pop();
                w.line("}");
            }
            w.line(format!("this.{name} = {name};"));
        }
        w.pop();
        w.line("}");
        w.blank();
        Ok(())
    }

    fn emit_enum_members(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if let Some((_, members)) = ctx.enum_parts(decl) {
            for m in members {
                w.line(format!(
                    "static {} = new {}({});",
                    m.name,
                    decl.name,
                    js_literal(&m.value)
                ));
            }
            w.blank();
        }
        Ok(())
    }

    fn emit_from_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::AliasOf(_) => return Ok(()),
            Shape::Class => {}
        }
        if let Some((_, members)) = ctx.enum_parts(decl) {
            let all = members
                .iter()
                .map(|m| format!("{}.{}", decl.name, m.name))
                .collect::<Vec<_>>()
                .join(", ");
            w.line("static fromMap(d) {");
            w.push();
            w.line(format!("const m = [{all}].find((x) => x.value === d);"));
            w.line("if (m === undefined) {");
            w.push();
            w.line(format!(
                "throw new Error(`${{d}} is not a valid {}`);",
                decl.qualified_name()
            ));
            w.pop();
            w.line("}");
            w.line("return m;");
            w.pop();
            w.line("}");
            w.blank();
            return Ok(());
        }

        let args: Vec<String> = ctx
            .object_fields(decl)
            .iter()
            .map(|f| from_map_expr(&format!("d[\"{}\"]", f.name), &f.ty, 1))
            .collect();
        w.line("static fromMap(d) {");
        w.push();
        if args.is_empty() {
            w.line(format!("return new {}();", decl.name));
        } else {
            w.line(format!("return new {}(", decl.name));
            w.push();
            for arg in &args {
                w.line(format!("{arg},"));
            }
            w.pop();
            w.line(");");
        }
        w.pop();
        w.line("}");
        w.blank();
        Ok(())
    }

    fn emit_as_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        match shape(ctx, decl) {
            Shape::AliasOf(_) => return Ok(()),
            Shape::Class => {}
        }
        if ctx.enum_parts(decl).is_some() {
            w.line("asMap() {");
            w.push();
            w.line("return this.value;");
            w.pop();
            w.line("}");
            return Ok(());
        }
        w.line("asMap() {");
        w.push();
        w.line("const d = {};");
        for f in ctx.object_fields(decl) {
            let name = &f.name;
            w.line(format!("if (this.{name} !== null && this.{name} !== undefined) {{"));
            w.push();
            w.line(format!(
                "d[\"{name}\"] = {};",
                as_map_expr(&format!("this.{name}"), &f.ty, 1)
            ));
            w.pop();
            w.line("}");
        }
        w.line("return d;");
        w.pop();
        w.line("}");
        Ok(())
    }

    fn close_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
        if !matches!(shape(ctx, decl), Shape::Class) {
            return Ok(());
        }
        w.pop();
        match decl.parent {
            None => w.line("}"),
            Some(_) => w.line("};"),
        }
        w.blank();
        Ok(())
    }

    fn epilogue(&self, ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()> {
        let roots: Vec<String> = ctx.ir.roots().map(|t| t.name.clone()).collect();
        w.line("module.exports = {");
        w.push();
        for r in roots {
            w.line(format!("{r},"));
        }
        w.pop();
        w.line("};");
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Expression builders
// ————————————————————————————————————————————————————————————————————————————

fn js_literal(lit: &Literal) -> String {
    match lit {
        Literal::Str(s) => serde_json::Value::from(s.as_str()).to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{f}"),
        Literal::Bool(b) => b.to_string(),
    }
}

/// The user-facing kind name in validator messages.
fn kind_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Integer | Primitive::Number) => "Number".into(),
        TypeRef::Primitive(Primitive::String) => "String".into(),
        TypeRef::Primitive(Primitive::Boolean) => "Boolean".into(),
        TypeRef::Primitive(Primitive::Bytes) => "Bytes".into(),
        TypeRef::Primitive(Primitive::Null) => "Null".into(),
        TypeRef::Primitive(Primitive::AnyObject) => "Object".into(),
        TypeRef::Primitive(Primitive::AnyArray) => "Array".into(),
        TypeRef::Named(q) => q.clone(),
        TypeRef::List { .. } => "Array".into(),
    }
}

/// Validity condition for a non-null value, or `None` when every value
/// passes (the `null` kind only ever sees null).
fn valid_cond(var: &str, ty: &TypeRef) -> Option<(String, String)> {
    let cond = match ty {
        TypeRef::Primitive(Primitive::Null) => return None,
        // element validity is checked separately, with its own message
        TypeRef::List { .. } => format!("Array.isArray({var})"),
        other => elem_cond(var, other, 1),
    };
    Some((cond, kind_name(ty)))
}

/// Boolean expression that is true when `var` satisfies `ty`. `depth`
/// freshens the lambda variable for nested lists.
fn elem_cond(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(Primitive::Integer) => {
            format!("typeof {var} === \"number\" && Number.isInteger({var})")
        }
        TypeRef::Primitive(Primitive::Number) => {
            format!("typeof {var} === \"number\" && Number.isFinite({var})")
        }
        TypeRef::Primitive(Primitive::String) => format!("typeof {var} === \"string\""),
        TypeRef::Primitive(Primitive::Boolean) => format!("typeof {var} === \"boolean\""),
        TypeRef::Primitive(Primitive::Bytes) => format!("Buffer.isBuffer({var})"),
        TypeRef::Primitive(Primitive::Null) => format!("{var} === null"),
        TypeRef::Primitive(Primitive::AnyObject) => {
            format!("typeof {var} === \"object\" && !Array.isArray({var})")
        }
        TypeRef::Primitive(Primitive::AnyArray) => format!("Array.isArray({var})"),
        TypeRef::Named(q) => format!("{var} instanceof {q}"),
        TypeRef::List { item, .. } => {
            let inner = format!("p{}", depth + 1);
            format!(
                "Array.isArray({var}) && {var}.every(({inner}) => {})",
                elem_cond(&inner, item, depth + 1)
            )
        }
    }
}

/// Conversion applied to raw mapping values inside `fromMap`.
fn from_map_expr(expr: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => expr.to_string(),
        TypeRef::Named(q) => format!("{expr} == null ? {expr} : {q}.fromMap({expr})"),
        TypeRef::List { item, .. } => {
            let var = format!("p{depth}");
            let inner = from_map_elem(&var, item, depth + 1);
            format!("{expr} == null ? {expr} : {expr}.map(({var}) => {inner})")
        }
    }
}

fn from_map_elem(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => var.to_string(),
        TypeRef::Named(q) => format!("{q}.fromMap({var})"),
        TypeRef::List { item, .. } => {
            let inner_var = format!("p{depth}");
            let inner = from_map_elem(&inner_var, item, depth + 1);
            format!("{var}.map(({inner_var}) => {inner})")
        }
    }
}

/// Conversion back to the mapping form inside `asMap`.
fn as_map_expr(expr: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => expr.to_string(),
        TypeRef::Named(_) => format!("{expr}.asMap()"),
        TypeRef::List { item, .. } => {
            let var = format!("p{depth}");
            let inner = as_map_elem(&var, item, depth + 1);
            format!("{expr}.map(({var}) => {inner})")
        }
    }
}

fn as_map_elem(var: &str, ty: &TypeRef, depth: usize) -> String {
    match ty {
        TypeRef::Primitive(_) => var.to_string(),
        TypeRef::Named(_) => format!("{var}.asMap()"),
        TypeRef::List { item, .. } => {
            let inner_var = format!("p{depth}");
            let inner = as_map_elem(&inner_var, item, depth + 1);
            format!("{var}.map(({inner_var}) => {inner})")
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————
