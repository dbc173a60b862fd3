//! The scope stack used during static analysis and code generation.

use crate::module::ModulePath;
use std::{
    fmt,
    ops::{Deref, DerefMut},
};
use utility::HashMap;

/// A stack of scopes mapping identifiers to [labels](Label).
///
/// The bottom-most scope is the root scope of the module containing its top-level bindings.
/// It can never be popped.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Label>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::default()],
        }
    }

    /// Push a new scope which is popped once the returned guard is dropped.
    ///
    /// The guard dereferences to the owner of the environment allowing it to be used
    /// for the duration of the scope.
    pub fn enter<T: AsMut<Self>>(owner: &mut T) -> ScopeGuard<'_, T> {
        owner.as_mut().push();
        ScopeGuard { owner }
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::default());
    }

    pub fn pop(&mut self) -> Result<(), ScopeError> {
        if self.scopes.len() == 1 {
            return Err(ScopeError);
        }

        self.scopes.pop();
        Ok(())
    }

    /// The number of scopes including the root scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind an identifier in the innermost scope shadowing any outer binding.
    pub fn declare(&mut self, binder: impl Into<String>, label: Label) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(binder.into(), label);
        }
    }

    /// Bind an identifier in the root scope.
    pub fn declare_global(&mut self, binder: impl Into<String>, label: Label) {
        self.scopes[0].insert(binder.into(), label);
    }

    /// Look up an identifier starting from the innermost scope.
    pub fn look_up(&self, binder: &str) -> Option<&Label> {
        self.scopes.iter().rev().find_map(|scope| scope.get(binder))
    }

    pub fn is_bound(&self, binder: &str) -> bool {
        self.look_up(binder).is_some()
    }

    /// Test if the identifier is bound in the innermost scope.
    pub fn is_bound_locally(&self, binder: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(binder))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl AsMut<Environment> for Environment {
    fn as_mut(&mut self) -> &mut Environment {
        self
    }
}

/// A guard popping the scope it was created for.
pub struct ScopeGuard<'a, T: AsMut<Environment>> {
    owner: &'a mut T,
}

impl<T: AsMut<Environment>> Deref for ScopeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.owner
    }
}

impl<T: AsMut<Environment>> DerefMut for ScopeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.owner
    }
}

impl<T: AsMut<Environment>> Drop for ScopeGuard<'_, T> {
    fn drop(&mut self) {
        let result = self.owner.as_mut().pop();
        debug_assert!(result.is_ok(), "the guard outlived its scope");
    }
}

/// What an identifier was bound to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Label {
    /// A top-level function of the current module or imported from another one.
    Function,
    /// An external command invoked as a subprocess.
    External,
    Parameter { type_: String },
    Variable,
    /// A whole posh module bound by a wildcard import.
    Module(ModulePath),
    /// A whole Go package bound by a wildcard import.
    Package { path: String },
    /// A binding of unknown nature, namely one imported from a module of the Go ecosystem.
    Unknown,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::External => write!(f, "external"),
            Self::Parameter { type_ } => write!(f, "parameter:{type_}"),
            Self::Variable => write!(f, "variable"),
            Self::Module(path) => write!(f, "module:{path}"),
            Self::Package { path } => write!(f, "package:{path}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// An attempt to pop the root scope of an environment.
///
/// This is always a bug in the compiler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScopeError;

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempted to pop the root scope of the environment")
    }
}

impl std::error::Error for ScopeError {}
