//! Parsed type declarations.
//!
//! A [`Declaration`] is the unit the graph builder consumes: one class or
//! interface with its supertype references given as names. Construction goes
//! through [`DeclarationBuilder`], which performs every check that needs no
//! knowledge of other declarations.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ResolveError, ResolveResult};
use crate::logging::Stage;
use crate::types::{MethodDecl, MethodSignature, TypeKind};

/// One class or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    name: String,
    kind: TypeKind,
    superclass: Option<String>,
    interfaces: Vec<String>,
    enclosing_type: Option<String>,
    methods: Vec<MethodDecl>,
    is_final: bool,
}

impl Declaration {
    pub fn builder(name: impl Into<String>, kind: TypeKind) -> DeclarationBuilder {
        DeclarationBuilder::new(name, kind)
    }

    pub fn class(name: impl Into<String>) -> DeclarationBuilder {
        DeclarationBuilder::new(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> DeclarationBuilder {
        DeclarationBuilder::new(name, TypeKind::AbstractClass)
    }

    pub fn interface(name: impl Into<String>) -> DeclarationBuilder {
        DeclarationBuilder::new(name, TypeKind::Interface)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The explicitly declared superclass, if any.
    ///
    /// `None` on a class means the root sentinel; interfaces always return `None`.
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn enclosing_type(&self) -> Option<&str> {
        self.enclosing_type.as_deref()
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Package prefix of the fully-qualified name (`com.example` for `com.example.Foo`).
    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(package, _)| package)
    }

    /// Unqualified name with any outer-type prefix removed.
    pub fn simple_name(&self) -> &str {
        let after_package = self.name.rsplit('.').next().unwrap_or(&self.name);
        after_package.rsplit('$').next().unwrap_or(after_package)
    }

    /// Outer type implied by a `$`-style nested name (`Outer$Inner` -> `Outer`).
    pub fn implied_outer(&self) -> Option<&str> {
        self.name.rsplit_once('$').map(|(outer, _)| outer)
    }

    /// Abstractness of `signature` as declared here, `None` when not declared.
    pub fn declares(&self, signature: &MethodSignature) -> Option<bool> {
        self.methods
            .iter()
            .find(|m| &m.signature == signature)
            .map(|m| m.is_abstract)
    }

    pub fn abstract_methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods
            .iter()
            .filter(|m| m.is_abstract)
            .map(|m| &m.signature)
    }

    pub fn concrete_methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods
            .iter()
            .filter(|m| !m.is_abstract)
            .map(|m| &m.signature)
    }
}

/// Incremental constructor for [`Declaration`].
#[derive(Debug, Clone)]
pub struct DeclarationBuilder {
    name: String,
    kind: TypeKind,
    superclass: Option<String>,
    interfaces: Vec<String>,
    enclosing_type: Option<String>,
    methods: Vec<MethodDecl>,
    is_final: bool,
}

impl DeclarationBuilder {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            enclosing_type: None,
            methods: Vec::new(),
            is_final: false,
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Adds an implemented interface (or a super-interface for interfaces).
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn enclosed_by(mut self, outer: impl Into<String>) -> Self {
        self.enclosing_type = Some(outer.into());
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = MethodDecl>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn concrete(self, name: &str, params: &[&str]) -> Self {
        self.method(MethodDecl::concrete(name, params))
    }

    pub fn abstract_method(self, name: &str, params: &[&str]) -> Self {
        self.method(MethodDecl::abstract_method(name, params))
    }

    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Validate local constraints and produce the declaration.
    pub fn build(self) -> ResolveResult<Declaration> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ResolveError::malformed("", "type name is empty"));
        }

        if self.kind.is_interface() {
            if let Some(superclass) = &self.superclass {
                return Err(ResolveError::malformed(
                    &name,
                    format!("interface cannot extend class '{superclass}'"),
                ));
            }
        }

        if self.superclass.as_deref().is_some_and(|s| s.trim().is_empty())
            || self.interfaces.iter().any(|i| i.trim().is_empty())
        {
            return Err(ResolveError::malformed(&name, "empty supertype reference"));
        }

        let mut seen_interfaces = Vec::with_capacity(self.interfaces.len());
        for interface in &self.interfaces {
            if seen_interfaces.contains(&interface) {
                return Err(ResolveError::malformed(
                    &name,
                    format!("interface '{interface}' listed more than once"),
                ));
            }
            seen_interfaces.push(interface);
        }

        if self.enclosing_type.as_deref() == Some(name.as_str()) {
            return Err(ResolveError::malformed(&name, "type cannot enclose itself"));
        }

        let methods = dedup_methods(&name, self.methods)?;

        Ok(Declaration {
            name,
            kind: self.kind,
            superclass: self.superclass,
            interfaces: self.interfaces,
            enclosing_type: self.enclosing_type,
            methods,
            is_final: self.is_final,
        })
    }
}

/// Collapse exact duplicates; reject a signature declared both abstract and concrete.
fn dedup_methods(owner: &str, methods: Vec<MethodDecl>) -> ResolveResult<Vec<MethodDecl>> {
    let mut seen: HashMap<MethodSignature, bool> = HashMap::with_capacity(methods.len());
    let mut unique = Vec::with_capacity(methods.len());

    for method in methods {
        if method.signature.name.trim().is_empty() {
            return Err(ResolveError::malformed(owner, "method name is empty"));
        }
        match seen.get(&method.signature) {
            Some(&is_abstract) if is_abstract != method.is_abstract => {
                return Err(ResolveError::malformed(
                    owner,
                    format!(
                        "method '{}' declared both abstract and concrete",
                        method.signature
                    ),
                ));
            }
            Some(_) => {
                crate::debug_event!(
                    Stage::Declaration,
                    "collapsed duplicate method",
                    "{} on {owner}",
                    method.signature
                );
            }
            None => {
                seen.insert(method.signature.clone(), method.is_abstract);
                unique.push(method);
            }
        }
    }

    Ok(unique)
}
