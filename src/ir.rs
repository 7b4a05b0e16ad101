// Strongly-typed IR for codegen. No serde_json::Value here.

use indexmap::IndexMap;

/// Closed set of schema primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Integer,
    Number,
    String,
    Boolean,
    Bytes,
    Null,
    AnyObject,               // free-form mapping (object with no properties)
    AnyArray,                // list of unknown element type (array with no items)
}

/// A scalar literal carried by enum members and field defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Reference to a type, at field or array-item position.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(Primitive),
    /// Qualified name of another `TypeDecl` in the same IR.
    Named(String),
    List {
        item: Box<TypeRef>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
}

/// One field of an object type. `name` is the schema key verbatim.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<Literal>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBase {
    Str,
    Int,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone)]
pub enum TypeBody {
    Object {
        fields: Vec<FieldDecl>,      // stable order for deterministic codegen
    },
    Enum {
        base: EnumBase,
        members: Vec<EnumMember>,    // source order preserved
    },
    Array {
        item: TypeRef,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Bytes,
    /// `$ref` (or a bare primitive) at type position. Field references to an
    /// alias collapse to its target during linking; a surviving alias decl is
    /// emitted as a copy of the target's shape under its own name.
    Alias { target: TypeRef },
}

/// One emitted type. `parent` is the qualified name of the enclosing type
/// for lifted nested types, `None` for document-level declarations.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub parent: Option<String>,
    pub body: TypeBody,
}

impl TypeDecl {
    /// `Abcd`, `Abcd._Child1`, `Abcd._Child1._Child2`, ...
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(p) => format!("{p}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.body, TypeBody::Enum { .. })
    }
}

/// The finished, ordered IR. Built once, consumed read-only by emitters.
///
/// Order invariants: document-level declarations are topologically sorted so
/// that dependencies precede dependents (ties broken by first appearance in
/// the source schema), and every nested type precedes its enclosing type.
#[derive(Debug, Clone, Default)]
pub struct Ir {
    types: Vec<TypeDecl>,
    index: IndexMap<String, usize>,
}

impl Ir {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.qualified_name(), i))
            .collect();
        Self { types, index }
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeDecl> {
        self.index.get(qualified).map(|&i| &self.types[i])
    }

    /// Document-level declarations, in emission order.
    pub fn roots(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter().filter(|t| t.parent.is_none())
    }

    /// Direct nested children of `qualified`, in IR order.
    pub fn children_of(&self, qualified: &str) -> Vec<&TypeDecl> {
        self.types
            .iter()
            .filter(|t| t.parent.as_deref() == Some(qualified))
            .collect()
    }

    /// Follow alias chains down to a non-alias body. Alias cycles are
    /// rejected during linking, so the chase terminates.
    pub fn effective_body<'a>(&'a self, decl: &'a TypeDecl) -> &'a TypeBody {
        let mut body = &decl.body;
        while let TypeBody::Alias { target: TypeRef::Named(next) } = body {
            match self.get(next) {
                Some(t) => body = &t.body,
                None => break,
            }
        }
        body
    }
}
