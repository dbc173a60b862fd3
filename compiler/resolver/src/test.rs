use super::{analyze, ModuleLoader, ResolutionError};
use lexer::{lex, Token};
use session::{
    environment::Label,
    module::{ModulePath, StdModule},
    Binding, CompilationUnit, Export, Exports,
};
use std::{collections::BTreeSet, path::Path};

/// A loader serving a single module `/lib/util.posh` exporting `helper`.
#[derive(Default)]
struct Loader {
    loaded: Vec<ModulePath>,
}

impl ModuleLoader for Loader {
    type Error = ResolutionError;

    fn load(&mut self, path: &ModulePath, _: &Token) -> Result<Exports, Self::Error> {
        self.loaded.push(path.clone());

        let mut exports = Exports::default();
        exports.insert(
            "helper",
            Export {
                label: Label::Function,
                is_function: true,
                parameters: Vec::new(),
            },
        );
        Ok(exports)
    }
}

fn analyze_source(source: &str) -> Result<(CompilationUnit, Loader), ResolutionError> {
    let posh = parser::parse(&lex(source).unwrap()).unwrap();
    let mut unit = CompilationUnit::new(ModulePath::entry("main.posh"), "main", Path::new("."));
    let mut loader = Loader::default();

    analyze(&posh, &mut unit, &mut loader)?;

    Ok((unit, loader))
}

fn externals(unit: &CompilationUnit) -> Vec<&str> {
    unit.bindings
        .iter()
        .filter_map(|binding| match binding {
            Binding::External { name } => Some(name.as_str()),
            Binding::Imported { .. } => None,
        })
        .collect()
}

#[test]
fn unresolved_calls_become_external_commands_once() {
    let (unit, _) = analyze_source(
        "fn main() {\n    ls(-l)\n    ls(--all)\n    grep(\"x\")\n}",
    )
    .unwrap();

    assert_eq!(externals(&unit), vec!["ls", "grep"]);
    assert_eq!(unit.std_modules, BTreeSet::from([StdModule::Exec]));
}

#[test]
fn calls_of_functions_and_built_ins_are_not_external() {
    let (unit, _) = analyze_source(
        "fn main() {\n    greet()\n    println(\"done\")\n}\n\
         fn greet() string {\n    return \"hello\"\n}",
    )
    .unwrap();

    assert!(externals(&unit).is_empty());
    assert!(unit.std_modules.is_empty());
}

#[test]
fn functions_are_exported() {
    let (unit, _) = analyze_source("fn add(a int, b int) int {\n    return a + b\n}").unwrap();

    let export = unit.exports.get("add").unwrap();
    assert!(export.is_function);
    assert_eq!(
        export
            .parameters
            .iter()
            .map(|parameter| (parameter.name.as_str(), parameter.type_.as_str()))
            .collect::<Vec<_>>(),
        vec![("a", "int"), ("b", "int")]
    );
}

#[test]
fn plain_pipe_sources_are_fed_through_echo() {
    let (unit, _) = analyze_source(
        "fn main(name string) {\n    result = name | tr(\"a\", \"b\") | lolcat()\n}",
    )
    .unwrap();

    assert_eq!(externals(&unit), vec!["echo", "tr", "lolcat"]);
    assert_eq!(
        unit.std_modules,
        BTreeSet::from([StdModule::Exec, StdModule::Flag])
    );
}

#[test]
fn external_pipe_sources_are_kept() {
    let (unit, _) = analyze_source(
        "fn main() {\n    out = echo(\"hi\") | tr(\"a\", \"b\") | lolcat()\n}",
    )
    .unwrap_or_else(|error| panic!("{error}"));

    assert_eq!(externals(&unit), vec!["echo", "tr", "lolcat"]);
}

#[test]
fn std_modules_are_required_on_use() {
    let (unit, _) = analyze_source(
        "fn main() {\n    for i in 0..3 {\n        io.Line(i)\n    }\n}",
    )
    .unwrap();

    assert_eq!(
        unit.std_modules,
        BTreeSet::from([StdModule::Io, StdModule::Std])
    );
}

#[test]
fn shadowed_std_module_names_are_not_required() {
    let (unit, _) = analyze_source(
        "fn show(io string) string {\n    return io.Line()\n}",
    )
    .unwrap();

    assert!(unit.std_modules.is_empty());
}

#[test]
fn local_imports_are_loaded_and_bound() {
    let (unit, loader) = analyze_source(
        "from \"/lib/util.posh\" import helper as help\nfn main() {\n    help()\n}",
    )
    .unwrap();

    let path = ModulePath::parse("/lib/util.posh").unwrap();

    assert_eq!(loader.loaded, vec![path.clone()]);
    assert_eq!(unit.local_imports, vec![path]);
    assert_eq!(unit.environment.look_up("help"), Some(&Label::Function));
    assert_eq!(
        unit.bindings,
        vec![Binding::Imported {
            binder: "help".into(),
            qualifier: "util".into(),
            item: "Helper".into(),
        }]
    );
}

#[test]
fn undefined_imports_are_errors() {
    let Err(error) = analyze_source("from \"/lib/util.posh\" import helpr\n") else {
        panic!("expected an error");
    };

    let ResolutionError::UndefinedImport {
        name,
        module,
        lookalike,
    } = error
    else {
        panic!("expected an undefined import, got {error:?}");
    };

    assert_eq!(name.image, "helpr");
    assert_eq!(module.to_string(), "/lib/util.posh");
    assert_eq!(lookalike.as_deref(), Some("helper"));
}

#[test]
fn wildcard_imports_are_queued_without_loading() {
    let (unit, loader) = analyze_source("from \"/lib/util.posh\" import * as util\n").unwrap();

    assert!(loader.loaded.is_empty());
    assert_eq!(
        unit.local_imports,
        vec![ModulePath::parse("/lib/util.posh").unwrap()]
    );
    assert_eq!(
        unit.environment.look_up("util"),
        Some(&Label::Module(ModulePath::parse("/lib/util.posh").unwrap()))
    );
}

#[test]
fn modules_named_like_the_entry_cannot_be_imported() {
    for source in [
        "from \"/lib/main.posh\" import helper\n",
        "from \"/lib/main.posh\" import * as library\n",
    ] {
        let Err(error) = analyze_source(source) else {
            panic!("expected an error for {source:?}");
        };

        let ResolutionError::ReservedModuleName { module, import } = error else {
            panic!("expected a reserved module name, got {error:?}");
        };

        assert_eq!(module.to_string(), "/lib/main.posh");
        assert_eq!(import.image, "\"/lib/main.posh\"");
    }
}

#[test]
fn foreign_imports_bind_package_members() {
    let (unit, loader) =
        analyze_source("from \"strings\" import ToUpper as upper\nfn main() {\n    upper(\"x\")\n}")
            .unwrap();

    assert!(loader.loaded.is_empty());
    assert!(unit.local_imports.is_empty());
    assert_eq!(
        unit.bindings,
        vec![Binding::Imported {
            binder: "upper".into(),
            qualifier: "strings".into(),
            item: "ToUpper".into(),
        }]
    );
}

#[test]
fn scopes_are_balanced_after_analysis() {
    let (unit, _) = analyze_source(
        "fn main() {\n    for i in xs {\n        if i > 1 {\n            y = i\n        } else {\n            break\n        }\n    }\n}",
    )
    .unwrap();

    assert_eq!(unit.environment.depth(), 1);
    assert!(!unit.environment.is_bound("y"));
    assert!(unit.environment.is_bound("main"));
}

#[test]
fn main_parameters_need_flag_types() {
    let Err(ResolutionError::UnsupportedFlagType { type_ }) =
        analyze_source("fn main(count int, names list) {\n}")
    else {
        panic!("expected an unsupported flag type");
    };

    assert_eq!(type_.image, "list");
    assert_eq!(type_.position, span::Position::new(0, 25));
}

#[test]
fn other_functions_take_parameters_of_any_type() {
    let (unit, _) = analyze_source("fn sum(values list) int {\n    return 0\n}").unwrap();

    assert!(!unit.std_modules.contains(&StdModule::Flag));
}
