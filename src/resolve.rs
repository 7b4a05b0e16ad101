//! Reference resolution and IR linking.
//!
//! Lowering produces one *group* per document-level declaration (the
//! declaration plus its lifted nested types, children first) and a list of
//! every `$ref` site it saw. Linking then:
//!   - rejects duplicate qualified names,
//!   - checks that every reference target exists,
//!   - chases alias chains, rejecting cycles, and collapses references to
//!     primitive/list/bytes aliases into inline kinds,
//!   - prunes groups unreachable from the schema root (unless
//!     full-definitions mode is on),
//!   - orders groups topologically, ties broken by document order.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{GenError, Result};
use crate::ir::{Ir, TypeBody, TypeDecl, TypeRef};

/// One document-level declaration plus its lifted nested types.
#[derive(Debug, Clone)]
pub struct Group {
    /// Qualified name of the document-level declaration (last in `decls`).
    pub root: String,
    /// Children first, the document-level declaration last.
    pub decls: Vec<TypeDecl>,
    /// True for the declaration built from the schema root itself.
    pub is_schema_root: bool,
}

/// Where a `$ref` occurred, for error reporting.
#[derive(Debug, Clone)]
pub struct RefSite {
    pub pointer: String,
    pub reference: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    pub full_definitions: bool,
}

/// Translate an intra-document reference into the qualified name it must
/// resolve to. `#/definitions/A` names a definition; deeper segments walk
/// into lifted nested types: `#/definitions/A/Child1/Child2` names
/// `A._Child1._Child2`. Anything else (external URIs, other fragments) is
/// unresolvable.
pub fn reference_to_qualified(pointer: &str, reference: &str) -> Result<String> {
    let unresolvable = || GenError::ReferenceUnresolvable {
        pointer: pointer.to_string(),
        reference: reference.to_string(),
    };

    let rest = reference.strip_prefix("#/definitions/").ok_or_else(unresolvable)?;
    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let head = segments.next().ok_or_else(unresolvable)?;

    let mut qualified = head.to_string();
    for seg in segments {
        qualified.push_str("._");
        qualified.push_str(seg.trim_start_matches('_'));
    }
    Ok(qualified)
}

pub fn link(groups: Vec<Group>, sites: &[RefSite], opts: &LinkOptions) -> Result<Ir> {
    // Qualified name -> owning group index, rejecting collisions.
    let mut owner: HashMap<String, usize> = HashMap::new();
    for (gi, g) in groups.iter().enumerate() {
        for d in &g.decls {
            let q = d.qualified_name();
            if owner.insert(q.clone(), gi).is_some() {
                return Err(GenError::NameCollision { name: q });
            }
        }
    }

    // Every recorded `$ref` site must land on a declared name.
    for site in sites {
        if !owner.contains_key(&site.target) {
            return Err(GenError::ReferenceUnresolvable {
                pointer: site.pointer.clone(),
                reference: site.reference.clone(),
            });
        }
    }

    // Chase alias chains; references to aliases whose final target is an
    // inline kind (primitive/list/bytes) collapse to that kind.
    let collapsed = collapse_aliases(&groups)?;

    // Rewrite references through the collapse map.
    let mut groups = groups;
    for g in &mut groups {
        for d in &mut g.decls {
            rewrite_body(&mut d.body, &collapsed);
        }
    }

    // Reachability from the schema root, at group granularity.
    let keep: HashSet<usize> = if opts.full_definitions {
        (0..groups.len()).collect()
    } else {
        let mut keep = HashSet::new();
        let mut queue: VecDeque<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_schema_root)
            .map(|(i, _)| i)
            .collect();
        while let Some(gi) = queue.pop_front() {
            if !keep.insert(gi) {
                continue;
            }
            for d in &groups[gi].decls {
                for target in named_refs(&d.body) {
                    if let Some(&ti) = owner.get(&target) {
                        if !keep.contains(&ti) {
                            queue.push_back(ti);
                        }
                    }
                }
            }
        }
        keep
    };

    // Topological order over kept groups: referenced groups come first,
    // ties (and reference cycles) fall back to document order.
    let kept: Vec<usize> = (0..groups.len()).filter(|i| keep.contains(i)).collect();
    let mut deps: HashMap<usize, HashSet<usize>> = HashMap::new();
    for &gi in &kept {
        let mut ds = HashSet::new();
        for d in &groups[gi].decls {
            for target in named_refs(&d.body) {
                if let Some(&ti) = owner.get(&target) {
                    if ti != gi && keep.contains(&ti) {
                        ds.insert(ti);
                    }
                }
            }
        }
        deps.insert(gi, ds);
    }

    let mut ordered: Vec<usize> = Vec::with_capacity(kept.len());
    let mut placed: HashSet<usize> = HashSet::new();
    let mut remaining: Vec<usize> = kept.clone();
    while !remaining.is_empty() {
        // lowest document index whose dependencies are all placed
        let next = remaining
            .iter()
            .position(|gi| deps[gi].iter().all(|d| placed.contains(d)))
            // reference cycle: emit the earliest remaining group as-is
            .unwrap_or(0);
        let gi = remaining.remove(next);
        placed.insert(gi);
        ordered.push(gi);
    }

    let mut types: Vec<TypeDecl> = Vec::new();
    for gi in ordered {
        types.extend(groups[gi].decls.iter().cloned());
    }
    Ok(Ir::new(types))
}

// ————————————————————————————————————————————————————————————————————————————
// Internal helpers
// ————————————————————————————————————————————————————————————————————————————

/// Chase every alias chain once, rejecting cycles. Returns the aliases that
/// bottom out on an inline kind, mapped to that kind.
fn collapse_aliases(groups: &[Group]) -> Result<HashMap<String, TypeRef>> {
    let body_of: HashMap<String, &TypeBody> = groups
        .iter()
        .flat_map(|g| g.decls.iter())
        .map(|d| (d.qualified_name(), &d.body))
        .collect();

    let mut collapsed: HashMap<String, TypeRef> = HashMap::new();
    for (name, body) in &body_of {
        if !matches!(body, TypeBody::Alias { .. }) {
            continue;
        }
        let mut seen: Vec<&str> = vec![name.as_str()];
        let mut cur = *body;
        loop {
            match cur {
                TypeBody::Alias { target: TypeRef::Named(next) } => {
                    if seen.contains(&next.as_str()) {
                        seen.push(next.as_str());
                        return Err(GenError::CyclicDefinition { cycle: seen.join(" -> ") });
                    }
                    seen.push(next.as_str());
                    match body_of.get(next.as_str()) {
                        Some(b) => cur = *b,
                        None => {
                            // dangling names were already reported via the
                            // recorded ref sites
                            return Err(GenError::ReferenceUnresolvable {
                                pointer: String::new(),
                                reference: next.clone(),
                            });
                        }
                    }
                }
                TypeBody::Alias { target } => {
                    collapsed.insert(name.clone(), target.clone());
                    break;
                }
                _ => break, // lands on a real type; references stay named
            }
        }
    }
    Ok(collapsed)
}

fn rewrite_ref(r: &mut TypeRef, collapsed: &HashMap<String, TypeRef>) {
    match r {
        TypeRef::Named(name) => {
            if let Some(inline) = collapsed.get(name.as_str()) {
                *r = inline.clone();
            }
        }
        TypeRef::List { item, .. } => rewrite_ref(item, collapsed),
        TypeRef::Primitive(_) => {}
    }
}

fn rewrite_body(body: &mut TypeBody, collapsed: &HashMap<String, TypeRef>) {
    match body {
        TypeBody::Object { fields } => {
            for f in fields {
                rewrite_ref(&mut f.ty, collapsed);
            }
        }
        TypeBody::Array { item, .. } => rewrite_ref(item, collapsed),
        TypeBody::Alias { target } => rewrite_ref(target, collapsed),
        TypeBody::Enum { .. } | TypeBody::Bytes => {}
    }
}

fn named_refs(body: &TypeBody) -> Vec<String> {
    fn collect(r: &TypeRef, out: &mut Vec<String>) {
        match r {
            TypeRef::Named(n) => out.push(n.clone()),
            TypeRef::List { item, .. } => collect(item, out),
            TypeRef::Primitive(_) => {}
        }
    }
    let mut out = Vec::new();
    match body {
        TypeBody::Object { fields } => {
            for f in fields {
                collect(&f.ty, &mut out);
            }
        }
        TypeBody::Array { item, .. } => collect(item, &mut out),
        TypeBody::Alias { target } => collect(target, &mut out),
        TypeBody::Enum { .. } | TypeBody::Bytes => {}
    }
    out
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldDecl, Primitive};

    fn object(name: &str, fields: Vec<FieldDecl>) -> TypeDecl {
        TypeDecl { name: name.into(), parent: None, body: TypeBody::Object { fields } }
    }

    fn field(name: &str, ty: TypeRef) -> FieldDecl {
        FieldDecl { name: name.into(), ty, default: None, required: false }
    }

    fn group(decl: TypeDecl, is_schema_root: bool) -> Group {
        Group { root: decl.name.clone(), decls: vec![decl], is_schema_root }
    }

    #[test]
    fn reference_syntax_maps_to_qualified_names() {
        assert_eq!(reference_to_qualified("", "#/definitions/ABcd").unwrap(), "ABcd");
        assert_eq!(
            reference_to_qualified("", "#/definitions/ABcd/Child1/Child2").unwrap(),
            "ABcd._Child1._Child2"
        );
    }

    #[test]
    fn external_references_fail() {
        let err = reference_to_qualified("/p", "https://example.com/s.json#/definitions/X")
            .unwrap_err();
        assert!(matches!(err, GenError::ReferenceUnresolvable { .. }));
        assert!(reference_to_qualified("/p", "#/foo/Bar").is_err());
    }

    #[test]
    fn unreachable_definitions_are_pruned_unless_requested() {
        let root = group(object("Root", vec![field("a", TypeRef::Named("Used".into()))]), true);
        let used = group(object("Used", vec![]), false);
        let orphan = group(object("Orphan", vec![]), false);

        let ir = link(
            vec![root.clone(), used.clone(), orphan.clone()],
            &[],
            &LinkOptions { full_definitions: false },
        )
        .unwrap();
        assert!(ir.get("Used").is_some());
        assert!(ir.get("Orphan").is_none());

        let ir = link(vec![root, used, orphan], &[], &LinkOptions { full_definitions: true })
            .unwrap();
        assert!(ir.get("Orphan").is_some());
    }

    #[test]
    fn referenced_groups_precede_referents() {
        // Root appears first in the document but references B, which
        // references C; emission order must be C, B, Root.
        let root = group(object("Root", vec![field("b", TypeRef::Named("B".into()))]), true);
        let b = group(object("B", vec![field("c", TypeRef::Named("C".into()))]), false);
        let c = group(object("C", vec![]), false);
        let ir = link(vec![root, b, c], &[], &LinkOptions::default()).unwrap();
        let order: Vec<_> = ir.roots().map(|t| t.name.as_str()).collect();
        assert_eq!(order, ["C", "B", "Root"]);
    }

    #[test]
    fn reference_cycles_keep_document_order() {
        let a = group(object("A", vec![field("b", TypeRef::Named("B".into()))]), true);
        let b = group(object("B", vec![field("a", TypeRef::Named("A".into()))]), false);
        let ir = link(vec![a, b], &[], &LinkOptions::default()).unwrap();
        let order: Vec<_> = ir.roots().map(|t| t.name.as_str()).collect();
        assert_eq!(order, ["A", "B"]);
    }

    #[test]
    fn alias_cycles_are_fatal() {
        let a = TypeDecl {
            name: "A".into(),
            parent: None,
            body: TypeBody::Alias { target: TypeRef::Named("B".into()) },
        };
        let b = TypeDecl {
            name: "B".into(),
            parent: None,
            body: TypeBody::Alias { target: TypeRef::Named("A".into()) },
        };
        let err = link(
            vec![group(a, true), group(b, false)],
            &[],
            &LinkOptions { full_definitions: true },
        )
        .unwrap_err();
        assert!(matches!(err, GenError::CyclicDefinition { .. }));
    }

    #[test]
    fn primitive_aliases_collapse_at_reference_sites() {
        let alias = TypeDecl {
            name: "Name".into(),
            parent: None,
            body: TypeBody::Alias { target: TypeRef::Primitive(Primitive::String) },
        };
        let root = group(object("Root", vec![field("n", TypeRef::Named("Name".into()))]), true);
        let ir = link(
            vec![root, group(alias, false)],
            &[],
            &LinkOptions { full_definitions: true },
        )
        .unwrap();
        let root = ir.get("Root").unwrap();
        match &root.body {
            TypeBody::Object { fields } => {
                assert_eq!(fields[0].ty, TypeRef::Primitive(Primitive::String));
            }
            _ => panic!("Root must stay an object"),
        }
    }

    #[test]
    fn missing_reference_targets_are_reported_with_location() {
        let root = group(object("Root", vec![field("x", TypeRef::Named("Gone".into()))]), true);
        let sites = vec![RefSite {
            pointer: "/properties/x".into(),
            reference: "#/definitions/Gone".into(),
            target: "Gone".into(),
        }];
        let err = link(vec![root], &sites, &LinkOptions::default()).unwrap_err();
        match err {
            GenError::ReferenceUnresolvable { pointer, reference } => {
                assert_eq!(pointer, "/properties/x");
                assert_eq!(reference, "#/definitions/Gone");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
