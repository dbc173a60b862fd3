//! The state of the compilation of a single module.
//!
//! A [`CompilationUnit`] is created per source file, filled by the static analyzer,
//! read by the code generator and discarded once its exports have been cached.

use environment::{Environment, Label};
use module::{ModulePath, StdModule};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

pub mod environment;
pub mod module;
#[cfg(test)]
mod test;

pub struct CompilationUnit {
    pub environment: Environment,
    pub path: ModulePath,
    /// The name of the Go package the unit is compiled to.
    pub package: String,
    /// The directory of the entry module, the root of all local import paths.
    pub base_directory: PathBuf,
    pub std_modules: BTreeSet<StdModule>,
    /// Top-level bindings synthesized during analysis in the order they were encountered.
    pub bindings: Vec<Binding>,
    /// Local modules referenced by this unit in the order they were encountered.
    pub local_imports: Vec<ModulePath>,
    pub exports: Exports,
}

impl CompilationUnit {
    pub fn new(path: ModulePath, package: impl Into<String>, base_directory: &Path) -> Self {
        Self {
            environment: Environment::new(),
            path,
            package: package.into(),
            base_directory: base_directory.to_owned(),
            std_modules: BTreeSet::new(),
            bindings: Vec::new(),
            local_imports: Vec::new(),
            exports: Exports::default(),
        }
    }

    /// Test if this unit is the entry of the program.
    ///
    /// Only the entry module is compiled to the package `main` since modules of that
    /// name cannot be imported.
    pub fn is_program_entry(&self) -> bool {
        self.package == utility::PROGRAM_ENTRY
    }

    /// The path of the source file of this unit.
    pub fn source_path(&self) -> PathBuf {
        self.base_directory.join(self.path.relative())
    }

    /// The path of the generated Go file relative to the output directory.
    pub fn output_path(&self) -> PathBuf {
        let mut path = PathBuf::new();

        if !self.is_program_entry() {
            path.push(self.path.directory());
            path.push(&self.package);
        }

        path.push("main.go");
        path
    }

    pub fn require(&mut self, module: StdModule) {
        self.std_modules.insert(module);
    }

    /// Bind the given name to an external command unless it already is.
    ///
    /// Returns whether a new binding was synthesized.
    pub fn bind_external(&mut self, name: &str) -> bool {
        self.require(StdModule::Exec);

        let bound = self
            .bindings
            .iter()
            .any(|binding| matches!(binding, Binding::External { name: bound } if bound == name));

        if !bound {
            self.bindings.push(Binding::External {
                name: name.to_owned(),
            });
            self.environment.declare_global(name, Label::External);
        }

        !bound
    }

    /// Record a local module to be compiled unless it already is.
    pub fn discover(&mut self, path: ModulePath) {
        if !self.local_imports.contains(&path) {
            self.local_imports.push(path);
        }
    }

    /// Test if the given name is bound to an external command.
    pub fn is_external(&self, name: &str) -> bool {
        matches!(self.environment.look_up(name), Some(Label::External))
    }
}

impl AsMut<Environment> for CompilationUnit {
    fn as_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }
}

/// A top-level binding synthesized during analysis.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Binding {
    /// `name = exec.ExternalCommand("name")`
    External { name: String },
    /// `binder = qualifier.Item` for an item imported from another module.
    Imported {
        binder: String,
        qualifier: String,
        item: String,
    },
}

/// The table of symbols a module makes available to importers.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Exports(BTreeMap<String, Export>);

impl Exports {
    pub fn insert(&mut self, name: impl Into<String>, export: Export) {
        self.0.insert(name.into(), export);
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.0.iter().map(|(name, export)| (name.as_str(), export))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Export {
    pub label: Label,
    pub is_function: bool,
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Parameter {
    pub name: String,
    pub type_: String,
}
