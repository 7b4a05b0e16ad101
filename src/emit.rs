//! Emitter framework: a visitor over the IR that drives per-target
//! rendering hooks in a fixed order and assembles the output text.
//!
//! Hook order per type: `open_type`, per-field `emit_field`,
//! `emit_constructor`, `emit_validators`, `emit_enum_members` (enums only),
//! `emit_from_map`, `emit_as_map`, `close_type` — with `preamble` and
//! `epilogue` once per file. Nested types render inside their parent when
//! the target supports nested declarations, otherwise at top level with a
//! placement the target picks (before the parent for forward-declaration
//! languages, after it for attach-by-assignment languages).

pub mod go;
pub mod js;
pub mod python;

use crate::error::Result;
use crate::ir::{EnumBase, EnumMember, FieldDecl, Ir, TypeBody, TypeDecl};

/// Where a target wants nested types placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedPlacement {
    /// Textually inside the parent (Python).
    Inside,
    /// Top level, before the parent, mangled name (Go).
    BeforeParent,
    /// Top level, after the parent, attached by qualified assignment (JS).
    AfterParent,
}

#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Root namespace / package name for targets that want one.
    pub namespace: Option<String>,
}

/// Read-only context handed to every hook.
pub struct EmitCtx<'a> {
    pub ir: &'a Ir,
    pub namespace: Option<&'a str>,
}

impl<'a> EmitCtx<'a> {
    /// Fields of an object-shaped decl, chasing aliases. Empty for
    /// non-object shapes.
    pub fn object_fields(&self, decl: &'a TypeDecl) -> &'a [FieldDecl] {
        match self.ir.effective_body(decl) {
            TypeBody::Object { fields } => fields,
            _ => &[],
        }
    }

    pub fn enum_parts(&self, decl: &'a TypeDecl) -> Option<(EnumBase, &'a [EnumMember])> {
        match self.ir.effective_body(decl) {
            TypeBody::Enum { base, members } => Some((*base, members)),
            _ => None,
        }
    }
}

/// A per-language back-end.
pub trait Target: Sync {
    /// Target identifier used in CLI flags and error messages.
    fn name(&self) -> &'static str;

    /// File extension of the emitted source ("js", "py", "go").
    fn extension(&self) -> &'static str;

    fn indent_unit(&self) -> &'static str;

    fn nested_placement(&self) -> NestedPlacement;

    fn preamble(&self, ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()>;
    fn open_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn emit_field(
        &self,
        ctx: &EmitCtx,
        decl: &TypeDecl,
        field: &FieldDecl,
        w: &mut CodeWriter,
    ) -> Result<()>;
    fn emit_constructor(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn emit_validators(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn emit_enum_members(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter)
        -> Result<()>;
    fn emit_from_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn emit_as_map(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn close_type(&self, ctx: &EmitCtx, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()>;
    fn epilogue(&self, ctx: &EmitCtx, w: &mut CodeWriter) -> Result<()>;
}

/// All built-in back-ends, in CLI flag order.
pub fn targets() -> [&'static dyn Target; 3] {
    [&js::JsTarget, &python::PythonTarget, &go::GoTarget]
}

/// Render the whole IR for one target.
pub fn render(ir: &Ir, target: &dyn Target, opts: &EmitOptions) -> Result<String> {
    let ctx = EmitCtx { ir, namespace: opts.namespace.as_deref() };
    let mut w = CodeWriter::new(target.indent_unit());
    target.preamble(&ctx, &mut w)?;
    for decl in ir.roots() {
        emit_decl(&ctx, target, decl, &mut w)?;
    }
    target.epilogue(&ctx, &mut w)?;
    Ok(w.into_string())
}

fn emit_decl(ctx: &EmitCtx, target: &dyn Target, decl: &TypeDecl, w: &mut CodeWriter) -> Result<()> {
    let qualified = decl.qualified_name();
    let children = ctx.ir.children_of(&qualified);
    match target.nested_placement() {
        NestedPlacement::BeforeParent => {
            for child in &children {
                emit_decl(ctx, target, child, w)?;
            }
            emit_one(ctx, target, decl, None, w)
        }
        NestedPlacement::AfterParent => {
            emit_one(ctx, target, decl, None, w)?;
            for child in &children {
                emit_decl(ctx, target, child, w)?;
            }
            Ok(())
        }
        NestedPlacement::Inside => emit_one(ctx, target, decl, Some(&children), w),
    }
}

fn emit_one(
    ctx: &EmitCtx,
    target: &dyn Target,
    decl: &TypeDecl,
    inner: Option<&[&TypeDecl]>,
    w: &mut CodeWriter,
) -> Result<()> {
    target.open_type(ctx, decl, w)?;
    if let Some(children) = inner {
        for child in children {
            emit_decl(ctx, target, child, w)?;
        }
    }
    for field in ctx.object_fields(decl) {
        target.emit_field(ctx, decl, field, w)?;
    }
    target.emit_constructor(ctx, decl, w)?;
    target.emit_validators(ctx, decl, w)?;
    if ctx.enum_parts(decl).is_some() {
        target.emit_enum_members(ctx, decl, w)?;
    }
    target.emit_from_map(ctx, decl, w)?;
    target.emit_as_map(ctx, decl, w)?;
    target.close_type(ctx, decl, w)
}

// ————————————————————————————————————————————————————————————————————————————
// Output buffer
// ————————————————————————————————————————————————————————————————————————————

/// Indentation-aware text sink for emitted source.
pub struct CodeWriter {
    buf: String,
    depth: usize,
    unit: &'static str,
}

impl CodeWriter {
    pub fn new(unit: &'static str) -> Self {
        Self { buf: String::new(), depth: 0, unit }
    }

    /// Write one indented line. An empty string writes a bare newline.
    pub fn line(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if !s.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(s);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn push(&mut self) {
        self.depth += 1;
    }

    pub fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeRef;
    use std::sync::Mutex;

    /// Records hook invocations so ordering is observable.
    struct Probe {
        placement: NestedPlacement,
        calls: Mutex<Vec<String>>,
    }

    impl Probe {
        fn new(placement: NestedPlacement) -> Self {
            Self { placement, calls: Mutex::new(Vec::new()) }
        }
        fn record(&self, what: &str) {
            self.calls.lock().unwrap().push(what.to_string());
        }
    }

    impl Target for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }
        fn extension(&self) -> &'static str {
            "txt"
        }
        fn indent_unit(&self) -> &'static str {
            "    "
        }
        fn nested_placement(&self) -> NestedPlacement {
            self.placement
        }
        fn preamble(&self, _: &EmitCtx, _: &mut CodeWriter) -> Result<()> {
            self.record("preamble");
            Ok(())
        }
        fn open_type(&self, _: &EmitCtx, d: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record(&format!("open {}", d.qualified_name()));
            Ok(())
        }
        fn emit_field(
            &self,
            _: &EmitCtx,
            d: &TypeDecl,
            f: &FieldDecl,
            _: &mut CodeWriter,
        ) -> Result<()> {
            self.record(&format!("field {}.{}", d.qualified_name(), f.name));
            Ok(())
        }
        fn emit_constructor(&self, _: &EmitCtx, d: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record(&format!("ctor {}", d.qualified_name()));
            Ok(())
        }
        fn emit_validators(&self, _: &EmitCtx, _: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record("validators");
            Ok(())
        }
        fn emit_enum_members(&self, _: &EmitCtx, _: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record("enum-members");
            Ok(())
        }
        fn emit_from_map(&self, _: &EmitCtx, _: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record("from-map");
            Ok(())
        }
        fn emit_as_map(&self, _: &EmitCtx, _: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record("as-map");
            Ok(())
        }
        fn close_type(&self, _: &EmitCtx, d: &TypeDecl, _: &mut CodeWriter) -> Result<()> {
            self.record(&format!("close {}", d.qualified_name()));
            Ok(())
        }
        fn epilogue(&self, _: &EmitCtx, _: &mut CodeWriter) -> Result<()> {
            self.record("epilogue");
            Ok(())
        }
    }

    fn sample_ir() -> Ir {
        let child = TypeDecl {
            name: "_Child".into(),
            parent: Some("Root".into()),
            body: TypeBody::Object { fields: vec![] },
        };
        let root = TypeDecl {
            name: "Root".into(),
            parent: None,
            body: TypeBody::Object {
                fields: vec![FieldDecl {
                    name: "Child".into(),
                    ty: TypeRef::Named("Root._Child".into()),
                    default: None,
                    required: false,
                }],
            },
        };
        Ir::new(vec![child, root])
    }

    #[test]
    fn hook_order_is_fixed() {
        let probe = Probe::new(NestedPlacement::BeforeParent);
        render(&sample_ir(), &probe, &EmitOptions::default()).unwrap();
        let calls = probe.calls.lock().unwrap();
        let calls: Vec<&str> = calls.iter().map(String::as_str).collect();
        let expected = [
            "preamble",
            "open Root._Child",
            "ctor Root._Child",
            "validators",
            "from-map",
            "as-map",
            "close Root._Child",
            "open Root",
            "field Root.Child",
            "ctor Root",
            "validators",
            "from-map",
            "as-map",
            "close Root",
            "epilogue",
        ];
        assert_eq!(calls, expected);
    }

    #[test]
    fn after_parent_placement_flips_the_order() {
        let probe = Probe::new(NestedPlacement::AfterParent);
        render(&sample_ir(), &probe, &EmitOptions::default()).unwrap();
        let calls = probe.calls.lock().unwrap();
        let parent = calls.iter().position(|c| c == "open Root").unwrap();
        let child = calls.iter().position(|c| c == "open Root._Child").unwrap();
        assert!(parent < child);
    }

    #[test]
    fn inside_placement_nests_between_open_and_fields() {
        let probe = Probe::new(NestedPlacement::Inside);
        render(&sample_ir(), &probe, &EmitOptions::default()).unwrap();
        let calls = probe.calls.lock().unwrap();
        let open_parent = calls.iter().position(|c| c == "open Root").unwrap();
        let open_child = calls.iter().position(|c| c == "open Root._Child").unwrap();
        let field = calls.iter().position(|c| c == "field Root.Child").unwrap();
        assert!(open_parent < open_child && open_child < field);
    }

    #[test]
    fn writer_indents_by_depth() {
        let mut w = CodeWriter::new("    ");
        w.line("a");
        w.push();
        w.line("b");
        w.pop();
        w.line("");
        assert_eq!(w.into_string(), "a\n    b\n\n");
    }
}
