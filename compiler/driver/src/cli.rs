use clap::{
    builder::{PossibleValue, TypedValueParser, ValueParser},
    Arg, ArgAction, ArgMatches,
};
use orchestrator::Options;
use std::{ffi::OsStr, path::PathBuf};
use utility::paint::ColorChoice;

const RUNTIME_VERSION_VARIABLE: &str = "POSH_RUNTIME_VERSION";

pub(crate) fn arguments() -> Arguments {
    let matches = clap::Command::new("posh")
        .bin_name("posh")
        .version(crate::version())
        .about("Compile posh scripts to native binaries by way of Go")
        .args([
            Arg::new(option::INPUT)
                .long("input")
                .short('i')
                .value_name("PATH")
                .value_parser(ValueParser::path_buf())
                .required(true)
                .help("The posh source file to compile"),
            Arg::new(option::OUTPUT)
                .long("output")
                .short('o')
                .value_name("PATH")
                .value_parser(ValueParser::path_buf())
                .help("Where to put the binary. Defaults to the file stem of the input"),
            Arg::new(option::AST)
                .long("ast")
                .action(ArgAction::SetTrue)
                .help("Print the syntax tree of every module"),
            Arg::new(option::EMIT_GO)
                .long("emit-go")
                .action(ArgAction::SetTrue)
                .help("Print the generated Go code and stop before building"),
            Arg::new(option::RUNTIME_VERSION)
                .long("runtime-version")
                .value_name("VERSION")
                .help(format!(
                    "Set the version of the posh runtime module. \
                     Defaults to ‘{RUNTIME_VERSION_VARIABLE}’ or to the version of the compiler",
                )),
            Arg::new(option::QUIET)
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Suppress status output from being printed to stdout"),
            Arg::new(option::COLOR)
                .long("color")
                .value_name("WHEN")
                .value_parser(ColorChoiceParser)
                .help("Control when to use color"),
            Arg::new(option::TIMING)
                .long("timing")
                .action(ArgAction::SetTrue)
                .help("Print the time spent in each pass"),
        ])
        .get_matches();

    Arguments::deserialize(&matches)
}

mod option {
    pub(super) const AST: &str = "ast";
    pub(super) const COLOR: &str = "color";
    pub(super) const EMIT_GO: &str = "emit_go";
    pub(super) const INPUT: &str = "input";
    pub(super) const OUTPUT: &str = "output";
    pub(super) const QUIET: &str = "quiet";
    pub(super) const RUNTIME_VERSION: &str = "runtime_version";
    pub(super) const TIMING: &str = "timing";
}

pub(crate) struct Arguments {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) options: Options,
}

impl Arguments {
    fn deserialize(matches: &ArgMatches) -> Self {
        let input: PathBuf = matches
            .get_one(option::INPUT)
            .cloned()
            .unwrap_or_default();

        let output = matches
            .get_one(option::OUTPUT)
            .cloned()
            .unwrap_or_else(|| default_output(&input));

        let runtime_version = matches
            .get_one::<String>(option::RUNTIME_VERSION)
            .cloned()
            .or_else(|| std::env::var(RUNTIME_VERSION_VARIABLE).ok())
            .unwrap_or_else(|| env!("VERSION").to_owned());

        Self {
            input,
            output,
            options: Options {
                runtime_version,
                emit_ast: matches.get_flag(option::AST),
                emit_go: matches.get_flag(option::EMIT_GO),
                quiet: matches.get_flag(option::QUIET),
                timing: matches.get_flag(option::TIMING),
                color: matches.get_one(option::COLOR).copied().unwrap_or_default(),
            },
        }
    }
}

/// The file stem of the input in the current directory.
fn default_output(input: &std::path::Path) -> PathBuf {
    input
        .file_stem()
        .map_or_else(|| PathBuf::from(utility::PROGRAM_ENTRY), PathBuf::from)
}

#[derive(Clone)]
struct ColorChoiceParser;

impl TypedValueParser for ColorChoiceParser {
    type Value = ColorChoice;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = source.to_str().ok_or_else(|| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidUtf8,
                "the color choice is not valid UTF-8\n",
            )
        })?;

        source.parse().map_err(|()| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("‘{source}’ is not a valid color choice\n"),
            )
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(
            ColorChoice::ELEMENTS
                .into_iter()
                .map(|choice| PossibleValue::new(choice.name())),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::default_output;
    use std::path::{Path, PathBuf};

    #[test]
    fn output_defaults_to_the_file_stem() {
        assert_eq!(
            default_output(Path::new("scripts/greet.posh")),
            PathBuf::from("greet")
        );
    }

    #[test]
    fn output_without_file_name() {
        assert_eq!(default_output(Path::new("")), PathBuf::from("main"));
    }
}
