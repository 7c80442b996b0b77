//! Deferred import bookkeeping for one compilation unit.
//!
//! Rewrites do not touch the import list directly. They record requests
//! ("add `TestInfo` if it ends up referenced", "remove `TestName` if nothing
//! uses it any more") and the ledger reconciles them against the final tree
//! once every pass has run. A later request for the same entry overrides an
//! earlier one.
//!
//! Reconciliation rules:
//!
//! - a removal only happens when the unit no longer references the import;
//! - an addition only happens when the unit references it, it is not in
//!   `java.lang` or the unit's own package, and no existing import already
//!   covers it;
//! - additions are inserted in sorted position within their group
//!   (non-static before static).

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::tree::{package_of, simple_name, JavaType, NodeId, NodeKind, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportRequest {
    Add,
    Remove,
}

/// `(type_name, member)`; `member` is set for static imports.
pub type ImportKey = (String, Option<String>);

#[derive(Debug, Clone, Default)]
pub struct ImportLedger {
    entries: Vec<(ImportKey, ImportRequest)>,
}

impl ImportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, type_name: &str, member: Option<&str>) {
        self.request(type_name, member, ImportRequest::Add);
    }

    pub fn remove(&mut self, type_name: &str, member: Option<&str>) {
        self.request(type_name, member, ImportRequest::Remove);
    }

    fn request(&mut self, type_name: &str, member: Option<&str>, request: ImportRequest) {
        let key = (type_name.to_string(), member.map(str::to_string));
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = request,
            None => self.entries.push((key, request)),
        }
    }

    pub fn get(&self, type_name: &str, member: Option<&str>) -> Option<ImportRequest> {
        self.entries
            .iter()
            .find(|((t, m), _)| t == type_name && m.as_deref() == member)
            .map(|(_, r)| *r)
    }

    pub fn entries(&self) -> &[(ImportKey, ImportRequest)] {
        &self.entries
    }

    /// Rewrite the import list of the unit at `root`. Returns `root` itself
    /// when nothing changes.
    pub fn apply(&self, tree: &mut Tree, root: NodeId) -> NodeId {
        if self.entries.is_empty() {
            return root;
        }
        let NodeKind::CompilationUnit {
            package,
            imports,
            classes,
        } = tree.kind(root).clone()
        else {
            return root;
        };

        let refs = References::collect(tree, &classes);
        let mut kept: Vec<NodeId> = imports
            .iter()
            .copied()
            .filter(|import| !self.removes(tree, &refs, *import))
            .collect();

        for ((type_name, member), request) in &self.entries {
            if *request != ImportRequest::Add {
                continue;
            }
            match member {
                None => {
                    if !refs.types.contains(type_name) {
                        continue;
                    }
                    let package_name = package_of(type_name);
                    if package_name == "java.lang" || Some(package_name) == package.as_deref() {
                        continue;
                    }
                    if is_type_covered(tree, &kept, type_name) {
                        continue;
                    }
                }
                Some(member) => {
                    if !refs.members.contains(&(type_name.clone(), member.clone())) {
                        continue;
                    }
                    if is_member_covered(tree, &kept, type_name, member) {
                        continue;
                    }
                }
            }
            debug!(import = %type_name, member = ?member, "adding import");
            let import = tree.alloc(
                NodeKind::Import {
                    type_name: type_name.clone(),
                    member: member.clone(),
                    is_static: member.is_some(),
                },
                None,
            );
            insert_sorted(tree, &mut kept, import);
        }

        if kept == imports {
            return root;
        }
        tree.with_kind(
            root,
            NodeKind::CompilationUnit {
                package,
                imports: kept,
                classes,
            },
        )
    }

    /// True if a remove request applies to `import` and nothing references it.
    fn removes(&self, tree: &Tree, refs: &References, import: NodeId) -> bool {
        let NodeKind::Import {
            type_name,
            member,
            is_static,
        } = tree.kind(import)
        else {
            return false;
        };
        let requested = |key_member: Option<&str>| {
            self.get(type_name, key_member) == Some(ImportRequest::Remove)
        };
        let unused = match (is_static, member.as_deref()) {
            (false, _) => requested(None) && !refs.types.contains(type_name),
            (true, Some("*")) => {
                (requested(None) || requested(Some("*"))) && !refs.uses_any_member(type_name)
            }
            (true, Some(member)) => {
                (requested(None) || requested(Some(member)))
                    && !refs.members.contains(&(type_name.clone(), member.to_string()))
            }
            (true, None) => false,
        };
        if unused {
            debug!(import = %type_name, member = ?member, "removing import");
        }
        unused
    }
}

/// What a unit refers to by simple name.
struct References {
    /// Types named by simple name (type refs and type-valued identifiers).
    types: HashSet<String>,
    /// Static members invoked without a receiver.
    members: HashSet<(String, String)>,
}

impl References {
    fn collect(tree: &Tree, classes: &[NodeId]) -> Self {
        let mut types = HashSet::new();
        let mut members = HashSet::new();
        for class in classes {
            for id in tree.descendants(*class) {
                match tree.kind(id) {
                    NodeKind::TypeRef { name } | NodeKind::Identifier { name } => {
                        if let Some(fqn) = tree.ty(id).and_then(JavaType::fully_qualified_name) {
                            if simple_name(fqn) == name {
                                types.insert(fqn.to_string());
                            }
                        }
                    }
                    NodeKind::MethodInvocation { select: None, .. } => {
                        if let Some(method) = tree.ty(id).and_then(JavaType::as_method) {
                            members.insert((method.declaring_type.clone(), method.name.clone()));
                        }
                    }
                    _ => {}
                }
            }
        }
        Self { types, members }
    }

    fn uses_any_member(&self, type_name: &str) -> bool {
        self.members.iter().any(|(t, _)| t == type_name)
    }
}

fn is_type_covered(tree: &Tree, imports: &[NodeId], fqn: &str) -> bool {
    let wildcard = format!("{}.*", package_of(fqn));
    imports.iter().any(|id| match tree.kind(*id) {
        NodeKind::Import {
            type_name,
            is_static: false,
            ..
        } => {
            type_name == fqn
                || *type_name == wildcard
                || simple_name(type_name) == simple_name(fqn)
        }
        _ => false,
    })
}

fn is_member_covered(tree: &Tree, imports: &[NodeId], fqn: &str, member: &str) -> bool {
    imports.iter().any(|id| match tree.kind(*id) {
        NodeKind::Import {
            type_name,
            member: Some(existing),
            is_static: true,
        } => type_name == fqn && (existing == member || existing == "*"),
        _ => false,
    })
}

/// Sort key and group of an import.
fn import_key(tree: &Tree, id: NodeId) -> (bool, String) {
    match tree.kind(id) {
        NodeKind::Import {
            type_name,
            member,
            is_static,
        } => {
            let text = match member {
                Some(member) => format!("{}.{}", type_name, member),
                None => type_name.clone(),
            };
            (*is_static, text)
        }
        _ => (false, String::new()),
    }
}

/// Insert before the first import of the same group that sorts after it,
/// else at the end of the group.
fn insert_sorted(tree: &Tree, imports: &mut Vec<NodeId>, import: NodeId) {
    let (is_static, key) = import_key(tree, import);
    let mut end_of_group = if is_static { imports.len() } else { 0 };
    for (i, existing) in imports.iter().enumerate() {
        let (existing_static, existing_key) = import_key(tree, *existing);
        if existing_static != is_static {
            continue;
        }
        if existing_key > key {
            imports.insert(i, import);
            return;
        }
        end_of_group = i + 1;
    }
    imports.insert(end_of_group, import);
}
