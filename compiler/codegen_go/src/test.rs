use super::{
    generate,
    go::{BinaryOperator, Expression, UnaryOperator},
    toolchain::{Step, RUNTIME_MODULE},
};
use lexer::{lex, Token};
use resolver::{analyze, ModuleLoader, ResolutionError};
use session::{
    environment::Label, module::ModulePath, CompilationUnit, Export, Exports,
};
use std::path::Path;
use utility::difference;

/// A loader serving modules which all export a single function `helper`.
struct Loader;

impl ModuleLoader for Loader {
    type Error = ResolutionError;

    fn load(&mut self, _: &ModulePath, _: &Token) -> Result<Exports, Self::Error> {
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

fn compile(source: &str, path: ModulePath, package: &str) -> String {
    let posh = parser::parse(&lex(source).unwrap()).unwrap();
    let mut unit = CompilationUnit::new(path, package, Path::new("."));

    analyze(&posh, &mut unit, &mut Loader).unwrap();

    let file = generate(&posh, &mut unit);
    assert_eq!(unit.environment.depth(), 1, "unbalanced scopes");

    file.to_string()
}

#[track_caller]
fn assert_generates(source: &str, expected: &str) {
    assert_eq(
        compile(source, ModulePath::entry("main.posh"), "main"),
        expected,
    );
}

#[track_caller]
fn assert_eq(actual: String, expected: &str) {
    if actual != expected {
        panic!(
            "the generated Go code does not match the expected one:\n{}",
            difference(expected, &actual, "\n")
        );
    }
}

#[test]
fn main_parameters_and_pipes() {
    assert_generates(
        r#"fn main(name string) {
    message = io.Format("Hello, %s!", name)
    result = message | tr("[:lower:]", "[:upper:]") | lolcat(-f)
    io.Line(result)
}
"#,
        r#"package main

import (
	"flag"

	"github.com/pouya-eghbali/posh/pkg/exec"
	"github.com/pouya-eghbali/posh/pkg/io"
)

var (
	echo   = exec.ExternalCommand("echo")
	tr     = exec.ExternalCommand("tr")
	lolcat = exec.ExternalCommand("lolcat")
)

func main() {
	var name string
	flag.StringVar(&name, "name", "", "")
	flag.Parse()
	message := io.Format("Hello, %s!", name)
	result := lolcat(tr(echo(&exec.RunContext{}, message), "[:lower:]", "[:upper:]"), "-f").Wait().ToString()
	io.Line(result)
}
"#,
    );
}

#[test]
fn main_parameters_of_every_flag_type() {
    assert_generates(
        "fn main(a int, b bool, c float64) {\n}\n",
        r#"package main

import (
	"flag"
)

func main() {
	var a int
	flag.IntVar(&a, "a", 0, "")
	var b bool
	flag.BoolVar(&b, "b", false, "")
	var c float64
	flag.Float64Var(&c, "c", 0, "")
	flag.Parse()
}
"#,
    );
}

#[test]
fn external_pipe_source() {
    assert_generates(
        "fn main() {\n    out = echo(\"hi\") | tr(\"a\", \"b\") | lolcat()\n}\n",
        r#"package main

import (
	"github.com/pouya-eghbali/posh/pkg/exec"
)

var (
	echo   = exec.ExternalCommand("echo")
	tr     = exec.ExternalCommand("tr")
	lolcat = exec.ExternalCommand("lolcat")
)

func main() {
	out := lolcat(tr(echo(&exec.RunContext{}, "hi"), "a", "b")).Wait().ToString()
}
"#,
    );
}

#[test]
fn external_commands_as_statements_and_values() {
    assert_generates(
        "fn main() {\n    ls(-l, --all)\n    files = ls()\n    println(ls())\n}\n",
        r#"package main

import (
	"github.com/pouya-eghbali/posh/pkg/exec"
)

var (
	ls = exec.ExternalCommand("ls")
)

func main() {
	ls(&exec.RunContext{}, "-l", "--all")
	files := ls(&exec.RunContext{}).Wait().ToString()
	println(ls(&exec.RunContext{}).Wait().ToString())
}
"#,
    );
}

#[test]
fn hyphenated_command_names() {
    assert_generates(
        "fn main() {\n    apt-get(\"update\")\n}\n",
        r#"package main

import (
	"github.com/pouya-eghbali/posh/pkg/exec"
)

var (
	apt_get = exec.ExternalCommand("apt-get")
)

func main() {
	apt_get(&exec.RunContext{}, "update")
}
"#,
    );
}

#[test]
fn control_flow() {
    assert_generates(
        "fn count(limit int) int {
    total = 0
    for i in 0, 2..limit {
        if i > 10 {
            break
        } elif 1 < i < 5 {
            total = total + i * 2
        } else {
            continue
        }
    }
    return total
}
",
        r#"package main

import (
	"github.com/pouya-eghbali/posh/pkg/std"
)

func count(limit int) int {
	total := 0
	for i := range std.LazyRange(0, 2, limit) {
		if i > 10 {
			break
		} else if 1 < i && i < 5 {
			total := (total + i) * 2
			_ = total
		} else {
			continue
		}
	}
	return total
}
"#,
    );
}

#[test]
fn unbounded_ranges_step_by_one() {
    assert_generates(
        "fn main() {\n    for index, value in 1.. {\n        println(index, value)\n    }\n}\n",
        r#"package main

import (
	"github.com/pouya-eghbali/posh/pkg/std"
)

func main() {
	for index, value := range std.LazyRange(1, 1) {
		println(index, value)
	}
}
"#,
    );
}

#[test]
fn variables_are_defined_once_per_scope() {
    assert_generates(
        "fn main() {
    x = 1
    if x > 0 {
        x = 2
        y = 3
    } else {
        y = 4
    }
    y = 5
}
",
        r#"package main

func main() {
	x := 1
	if x > 0 {
		x := 2
		_ = x
		y := 3
	} else {
		y := 4
	}
	y := 5
}
"#,
    );
}

#[test]
fn assignments_in_nested_blocks_leave_outer_variables_alone() {
    assert_generates(
        "fn main(count int) {
    x = 1
    if x > 0 {
        x = 2
        x = x + 1
        count = 0
    }
    count = count + x
    println(x)
}
",
        r#"package main

import (
	"flag"
)

func main() {
	var count int
	flag.IntVar(&count, "count", 0, "")
	flag.Parse()
	x := 1
	if x > 0 {
		x := 2
		_ = x
		x = x + 1
		count := 0
		_ = count
	}
	count = count + x
	println(x)
}
"#,
    );
}

#[test]
fn text_literals_become_valid_go_strings() {
    assert_generates(
        r#"fn main() {
    println("tab\t", "\d+", "first
second", "\u00e9 \x41 \101 \uD800", "end\")
}
"#,
        r#"package main

func main() {
	println("tab\t", "\\d+", "first\nsecond", "\u00e9 \x41 \101 \\uD800", "end\\")
}
"#,
    );
}

#[test]
fn logical_connectives_keep_their_grouping() {
    assert_generates(
        "fn check(a bool, b bool, c bool) bool {
    if not a and b or c {
        return true
    }
    return false
}
",
        r#"package main

func check(a bool, b bool, c bool) bool {
	if !a && (b || c) {
		return true
	}
	return false
}
"#,
    );
}

#[test]
fn imports() {
    assert_generates(
        r#"from "/lib/util.posh" import helper as help
from "/lib/text.posh" import * as text
from "strings" import ToUpper as upper
fn main() {
    x = help()
    y = text.shout(x)
    println(upper(y))
}
"#,
        r#"package main

import (
	text "main/lib/text"
	util "main/lib/util"
	"strings"
)

var (
	help  = util.Helper
	upper = strings.ToUpper
)

func main() {
	x := help()
	y := text.Shout(x)
	println(upper(y))
}
"#,
    );
}

#[test]
fn std_modules_and_user_imports_are_deduplicated() {
    assert_generates(
        "from \"flag\" import Args as arguments\nfn main(verbose bool) {\n    println(arguments())\n}\n",
        r#"package main

import (
	"flag"
)

var (
	arguments = flag.Args
)

func main() {
	var verbose bool
	flag.BoolVar(&verbose, "verbose", false, "")
	flag.Parse()
	println(arguments())
}
"#,
    );
}

#[test]
fn functions_of_imported_modules_are_exported() {
    assert_eq(
        compile(
            "fn helper(name string) string {
    return greet(name)
}
fn greet(name string) string {
    return name
}
",
            ModulePath::parse("/lib/util.posh").unwrap(),
            "util",
        ),
        r#"package util

func Helper(name string) string {
	return Greet(name)
}

func Greet(name string) string {
	return name
}
"#,
    );
}

#[test]
fn shadowed_functions_are_not_exported_names() {
    assert_eq(
        compile(
            "fn twice(greet int) int {\n    return greet * 2\n}\nfn greet() int {\n    return 1\n}\n",
            ModulePath::parse("/util.posh").unwrap(),
            "util",
        ),
        r#"package util

func Twice(greet int) int {
	return greet * 2
}

func Greet() int {
	return 1
}
"#,
    );
}

#[test]
fn parentheses_follow_precedence() {
    let identifier = Expression::identifier;

    let expression = Expression::binary(
        identifier("a"),
        BinaryOperator::Sub,
        Expression::binary(identifier("b"), BinaryOperator::Sub, identifier("c")),
    );
    assert_eq!(expression.to_string(), "a - (b - c)");

    let expression = Expression::binary(
        Expression::binary(identifier("a"), BinaryOperator::Sub, identifier("b")),
        BinaryOperator::Sub,
        identifier("c"),
    );
    assert_eq!(expression.to_string(), "a - b - c");

    let expression = Expression::binary(
        Expression::binary(identifier("a"), BinaryOperator::Mul, identifier("b")),
        BinaryOperator::Add,
        identifier("c"),
    );
    assert_eq!(expression.to_string(), "a * b + c");

    let expression = Expression::unary(
        UnaryOperator::Not,
        Expression::binary(identifier("a"), BinaryOperator::LAnd, identifier("b")),
    );
    assert_eq!(expression.to_string(), "!(a && b)");
}

#[test]
fn selectors_and_calls() {
    let expression = Expression::qualified("io", "Line")
        .call(vec![Expression::string("x"), Expression::BasicLiteral("1.5".into())]);

    assert_eq!(expression.to_string(), r#"io.Line("x", 1.5)"#);
}

#[test]
fn toolchain_steps() {
    assert_eq!(Step::Initialize.to_string(), "go mod init main");
    assert_eq!(
        Step::Fetch(format!("{RUNTIME_MODULE}@v0.1.0")).to_string(),
        "go get github.com/pouya-eghbali/posh@v0.1.0"
    );
    assert_eq!(
        Step::Build.to_string(),
        r#"go build -ldflags "-s -w" -o main"#
    );
}
