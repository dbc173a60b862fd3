use super::{generate, render, write, CompileError, GeneratedUnit, Options};
use diagnostics::reporter::render_to_string;
use resolver::ResolutionError;
use session::module::ModulePath;
use span::SourceMap;
use std::{
    fs, io,
    path::PathBuf,
    sync::{Arc, RwLock},
};
use utility::default;

/// A program laid out in a temporary directory, removed on drop.
struct Project(PathBuf);

impl Project {
    fn new(name: &str, files: &[(&str, &str)]) -> Self {
        let root = std::env::temp_dir().join(format!(
            "posh-orchestrator-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);

        for (path, content) in files {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        Self(root)
    }

    fn generate(&self) -> Result<Vec<GeneratedUnit>, CompileError> {
        let options = Options {
            quiet: true,
            ..default()
        };
        let map: Arc<RwLock<SourceMap>> = default();

        generate(&self.0.join("main.posh"), &options, &map)
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn paths(units: &[GeneratedUnit]) -> Vec<(String, PathBuf)> {
    units
        .iter()
        .map(|unit| (unit.path.relative().to_owned(), unit.output_path.clone()))
        .collect()
}

#[test]
fn imported_modules_are_compiled_before_their_importers() {
    let project = Project::new(
        "imported",
        &[
            (
                "main.posh",
                "from \"/lib/util.posh\" import helper\nfn main() {\n    helper()\n}\n",
            ),
            (
                "lib/util.posh",
                "fn helper() string {\n    return \"help\"\n}\n",
            ),
        ],
    );

    let units = project.generate().unwrap();

    assert_eq!(
        paths(&units),
        [
            ("lib/util.posh".to_owned(), PathBuf::from("lib/util/main.go")),
            ("main.posh".to_owned(), PathBuf::from("main.go")),
        ]
    );
    assert_eq!(units[0].file.package, "util");
    assert_eq!(units[1].file.package, "main");
}

#[test]
fn wildcard_imports_are_queued() {
    let project = Project::new(
        "wildcard",
        &[
            (
                "main.posh",
                "from \"/lib/text.posh\" import * as text\nfn main() {\n    text.shout(\"hi\")\n}\n",
            ),
            (
                "lib/text.posh",
                "fn shout(message string) string {\n    return message\n}\n",
            ),
        ],
    );

    let units = project.generate().unwrap();

    assert_eq!(
        paths(&units),
        [
            ("main.posh".to_owned(), PathBuf::from("main.go")),
            ("lib/text.posh".to_owned(), PathBuf::from("lib/text/main.go")),
        ]
    );
}

#[test]
fn modules_are_compiled_once() {
    let project = Project::new(
        "once",
        &[
            (
                "main.posh",
                "from \"/a.posh\" import a\nfrom \"/b.posh\" import b\nfn main() {\n    a()\n    b()\n}\n",
            ),
            (
                "a.posh",
                "from \"/common.posh\" import shared\nfn a() int {\n    return shared()\n}\n",
            ),
            (
                "b.posh",
                "from \"/common.posh\" import shared\nfn b() int {\n    return shared()\n}\n",
            ),
            ("common.posh", "fn shared() int {\n    return 1\n}\n"),
        ],
    );

    let units = project.generate().unwrap();
    let modules: Vec<_> = units.iter().map(|unit| unit.path.relative()).collect();

    assert_eq!(modules, ["common.posh", "a.posh", "b.posh", "main.posh"]);
}

#[test]
fn circular_imports_are_rejected() {
    let project = Project::new(
        "circular",
        &[
            (
                "main.posh",
                "from \"/lib/a.posh\" import a\nfn main() {\n    a()\n}\n",
            ),
            (
                "lib/a.posh",
                "from \"/main.posh\" import main\nfn a() int {\n    return 1\n}\n",
            ),
        ],
    );

    match project.generate() {
        Err(CompileError::Resolution {
            file: Some(_),
            error: ResolutionError::CircularImport { module, import },
        }) => {
            assert_eq!(module, ModulePath::entry("main.posh"));
            assert_eq!(import.image, "\"/main.posh\"");
        }
        result => panic!("expected a circular import, got {result:?}"),
    }
}

#[test]
fn imported_modules_may_not_shadow_the_entry_package() {
    let project = Project::new(
        "reserved",
        &[
            (
                "main.posh",
                "from \"/lib/main.posh\" import helper\nfn main() {\n    helper()\n}\n",
            ),
            ("lib/main.posh", "fn helper() int {\n    return 1\n}\n"),
        ],
    );

    match project.generate() {
        Err(CompileError::Resolution {
            file: Some(_),
            error: ResolutionError::ReservedModuleName { module, .. },
        }) => assert_eq!(module.to_string(), "/lib/main.posh"),
        result => panic!("expected a reserved module name, got {result:?}"),
    }
}

#[test]
fn undefined_imports_are_attributed_to_the_importer() {
    let project = Project::new(
        "undefined",
        &[
            (
                "main.posh",
                "from \"/util.posh\" import helpr\nfn main() {\n}\n",
            ),
            ("util.posh", "fn helper() int {\n    return 1\n}\n"),
        ],
    );

    match project.generate() {
        Err(CompileError::Resolution {
            file: Some(_),
            error: ResolutionError::UndefinedImport { lookalike, .. },
        }) => assert_eq!(lookalike.as_deref(), Some("helper")),
        result => panic!("expected an undefined import, got {result:?}"),
    }
}

#[test]
fn missing_modules_point_at_their_import() {
    let project = Project::new(
        "missing",
        &[(
            "main.posh",
            "from \"/lib/missing.posh\" import x\nfn main() {\n}\n",
        )],
    );

    match project.generate() {
        Err(CompileError::Load {
            path,
            import: Some(import),
            ..
        }) => {
            assert!(path.ends_with("lib/missing.posh"));
            assert_eq!(import.width, "\"/lib/missing.posh\"".len() as u32);
        }
        result => panic!("expected a missing module, got {result:?}"),
    }
}

#[test]
fn missing_entry_module() {
    let project = Project::new("no-entry", &[]);

    assert!(matches!(
        project.generate(),
        Err(CompileError::Load { import: None, .. })
    ));
}

#[test]
fn lexical_errors_abort_the_compilation() {
    let project = Project::new(
        "lexical",
        &[(
            "main.posh",
            "fn main() {\n    x = \"unterminated\n}\n",
        )],
    );

    assert!(matches!(project.generate(), Err(CompileError::Lex { .. })));
}

#[test]
fn units_are_written_into_package_directories() {
    let project = Project::new(
        "write",
        &[
            (
                "main.posh",
                "from \"/lib/util.posh\" import helper\nfn main() {\n    helper()\n}\n",
            ),
            (
                "lib/util.posh",
                "fn helper() string {\n    return \"help\"\n}\n",
            ),
        ],
    );
    let output = project.0.join("out");

    for unit in &project.generate().unwrap() {
        write(&output, unit).unwrap();
    }

    let library = fs::read_to_string(output.join("lib/util/main.go")).unwrap();
    assert!(library.starts_with("package util\n"));
    assert!(library.contains("func Helper() string {"));
    assert!(output.join("main.go").is_file());
}

#[test]
fn rendered_units_are_labeled_with_their_path() {
    let project = Project::new(
        "render",
        &[
            (
                "main.posh",
                "from \"/util.posh\" import helper\nfn main() {\n    helper()\n}\n",
            ),
            ("util.posh", "fn helper() int {\n    return 1\n}\n"),
        ],
    );

    let rendered = render(&project.generate().unwrap());

    assert!(rendered.starts_with("// util/main.go\npackage util\n"));
    assert!(rendered.contains("\n\n// main.go\npackage main\n"));
}

#[test]
fn terminal_output_errors_are_reported() {
    let error = CompileError::Print(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));

    assert_eq!(
        render_to_string(&error.diagnostic(), None),
        "error: could not write to the terminal\n note: broken pipe"
    );
}
