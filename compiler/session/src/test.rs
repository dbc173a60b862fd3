use crate::{
    environment::{Environment, Label, ScopeError},
    module::{foreign_package_name, ModulePath, StdModule},
    Binding, CompilationUnit,
};
use std::path::{Path, PathBuf};

fn unit() -> CompilationUnit {
    CompilationUnit::new(ModulePath::entry("main.posh"), "main", Path::new("/project"))
}

#[test]
fn inner_scopes_shadow_outer_ones() {
    let mut environment = Environment::new();
    environment.declare("x", Label::Variable);

    {
        let mut scope = Environment::enter(&mut environment);
        scope.declare(
            "x",
            Label::Parameter {
                type_: "int".into(),
            },
        );

        assert_eq!(
            scope.look_up("x"),
            Some(&Label::Parameter {
                type_: "int".into()
            })
        );
        assert!(scope.is_bound_locally("x"));
        assert_eq!(scope.depth(), 2);
    }

    assert_eq!(environment.look_up("x"), Some(&Label::Variable));
    assert_eq!(environment.depth(), 1);
}

#[test]
fn lookup_walks_up_to_the_root_scope() {
    let mut environment = Environment::new();
    environment.declare("helper", Label::Function);

    let mut outer = Environment::enter(&mut environment);
    let inner = Environment::enter(&mut *outer);

    assert_eq!(inner.look_up("helper"), Some(&Label::Function));
    assert!(!inner.is_bound_locally("helper"));
    assert!(!inner.is_bound("missing"));
}

#[test]
fn scope_is_popped_on_early_return() {
    fn declare_and_bail(environment: &mut Environment) -> Result<(), ()> {
        let mut scope = Environment::enter(environment);
        scope.declare("temporary", Label::Variable);
        Err::<(), _>(())?;
        Ok(())
    }

    let mut environment = Environment::new();

    assert_eq!(declare_and_bail(&mut environment), Err(()));
    assert_eq!(environment.depth(), 1);
    assert!(!environment.is_bound("temporary"));
}

#[test]
fn root_scope_cannot_be_popped() {
    let mut environment = Environment::new();

    assert_eq!(environment.pop(), Err(ScopeError));
}

#[test]
fn external_commands_are_bound_once() {
    let mut unit = unit();

    assert!(unit.bind_external("ls"));
    assert!(!unit.bind_external("ls"));
    assert!(unit.bind_external("grep"));

    assert_eq!(
        unit.bindings,
        vec![
            Binding::External { name: "ls".into() },
            Binding::External {
                name: "grep".into()
            },
        ]
    );
    assert!(unit.std_modules.contains(&StdModule::Exec));
    assert!(unit.is_external("ls"));
}

#[test]
fn external_commands_are_global() {
    let mut unit = unit();

    {
        let mut scope = Environment::enter(&mut unit);
        scope.bind_external("lolcat");
    }

    assert_eq!(unit.environment.look_up("lolcat"), Some(&Label::External));
}

#[test]
fn local_module_paths() {
    let path = ModulePath::parse("/lib/./text/../util.posh").unwrap();

    assert_eq!(path.relative(), "lib/util.posh");
    assert_eq!(path.package(), "util");
    assert_eq!(path.directory(), "lib");
    assert_eq!(path.go_import_path(), "main/lib/util");
    assert_eq!(path.to_string(), "/lib/util.posh");
}

#[test]
fn module_in_base_directory() {
    let path = ModulePath::parse("/util.posh").unwrap();

    assert_eq!(path.directory(), "");
    assert_eq!(path.go_import_path(), "main/util");
}

#[test]
fn foreign_imports_are_not_local_modules() {
    assert_eq!(ModulePath::parse("strings"), None);
    assert_eq!(ModulePath::parse("./util.posh"), None);
    assert_eq!(ModulePath::parse("/lib/util.go"), None);
    assert_eq!(ModulePath::parse("/.posh"), None);
    assert_eq!(foreign_package_name("golang.org/x/text"), "text");
}

#[test]
fn output_paths() {
    let mut unit = unit();
    assert_eq!(unit.output_path(), PathBuf::from("main.go"));
    assert_eq!(unit.source_path(), PathBuf::from("/project/main.posh"));

    unit = CompilationUnit::new(
        ModulePath::parse("/lib/util.posh").unwrap(),
        "util",
        Path::new("/project"),
    );
    assert_eq!(unit.output_path(), PathBuf::from("lib/util/main.go"));
    assert!(!unit.is_program_entry());
}

#[test]
fn std_modules_by_name() {
    assert_eq!("io".parse(), Ok(StdModule::Io));
    assert_eq!("os".parse::<StdModule>(), Err(()));
    assert_eq!(StdModule::Std.import_path(), "github.com/pouya-eghbali/posh/pkg/std");
}
