// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binding allocation for synthesized identifiers.
//!
//! Scopes mirror the function nesting of the tree. A name is free in a scope
//! when no identifier in the scope, its ancestors, or its descendants uses it
//! and nothing visible from the scope has claimed it already.

use std::collections::HashSet;

use tracing::debug;

/// Index of a scope inside `Bindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    /// Identifiers written in the source.
    names: HashSet<String>,
    /// Names handed out by `claim_free_binding`.
    claimed: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct Bindings {
    scopes: Vec<Scope>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindings {
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        Self { scopes: vec![Scope::default()] }
    }

    pub fn add_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope { parent: Some(parent), ..Scope::default() });
        self.scopes[parent.0].children.push(id);
        id
    }

    /// Record a name written in the source.
    pub fn declare(&mut self, scope: ScopeId, name: &str) {
        self.scopes[scope.0].names.insert(name.to_string());
    }

    fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(scope), |s| self.scopes[s.0].parent).map(|s| &self.scopes[s.0])
    }

    fn descendants(&self, scope: ScopeId) -> Vec<&Scope> {
        let mut out = Vec::new();
        let mut stack = self.scopes[scope.0].children.clone();
        while let Some(id) = stack.pop() {
            let s = &self.scopes[id.0];
            stack.extend(s.children.iter().copied());
            out.push(s);
        }
        out
    }

    pub fn is_taken(&self, scope: ScopeId, name: &str) -> bool {
        self.ancestors(scope)
            .chain(self.descendants(scope))
            .any(|s| s.names.contains(name) || s.claimed.contains(name))
    }

    /// First of `base`, `base1`, `base2`, ... not taken from `scope`.
    pub fn claim_free_binding(&mut self, scope: ScopeId, base: &str) -> String {
        let name = std::iter::once(base.to_string())
            .chain((1..).map(|n| format!("{base}{n}")))
            .find(|candidate| !self.is_taken(scope, candidate))
            .unwrap_or_else(|| base.to_string());
        debug!(binding = %name, scope = scope.0, "claimed binding");
        self.scopes[scope.0].claimed.insert(name.clone());
        name
    }
}
