use cli::Arguments;
use diagnostics::{error::Result, Diagnostic, Reporter};
use span::SourceMap;
use std::{
    borrow::Cow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};
use utility::{default, has_file_extension, QuoteExt, FILE_EXTENSION};

mod cli;

pub fn main() -> Result {
    set_panic_hook();

    let arguments = cli::arguments();

    let map: Arc<RwLock<SourceMap>> = default();
    let reported_any_errors: Arc<AtomicBool> = default();
    let reporter = Reporter::buffered_stderr(reported_any_errors.clone())
        .with_map(map.clone())
        .with_color(arguments.options.color);

    let result = build(&arguments, &map, reporter);

    if result.is_err() {
        assert!(
            reported_any_errors.load(Ordering::SeqCst),
            "an error occurred but nothing was reported"
        );
    }

    result
}

/// Compile the input and report any error.
///
/// The reporter is consumed since dropping it flushes the buffered diagnostics.
fn build(arguments: &Arguments, map: &Arc<RwLock<SourceMap>>, reporter: Reporter) -> Result {
    if !has_file_extension(&arguments.input, FILE_EXTENSION) {
        Diagnostic::warning()
            .message(format!(
                "the input does not have the file extension {}",
                FILE_EXTENSION.quote()
            ))
            .path(arguments.input.clone())
            .report(&reporter);
    }

    orchestrator::compile(
        &arguments.input,
        &arguments.output,
        &arguments.options,
        map,
    )
    .map_err(|error| error.diagnostic().report(&reporter))
}

fn version() -> String {
    match env!("COMMIT") {
        "" => env!("VERSION").to_owned(),
        commit => format!("{} ({commit})", env!("VERSION")),
    }
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();

        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown cause")
            .to_owned();

        let backtrace = std::env::var("POSH_BACKTRACE")
            .is_ok_and(|variable| variable != "0")
            .then(std::backtrace::Backtrace::force_capture);

        Diagnostic::bug()
            .message(message)
            .with(|it| match info.location() {
                Some(location) => it.note(format!("at ‘{location}’")),
                None => it,
            })
            .note(std::thread::current().name().map_or_else(
                || Cow::from("in an unnamed thread"),
                |name| format!("in thread ‘{name}’").into(),
            ))
            .note("the compiler unexpectedly panicked. this is a bug. we would appreciate a bug report")
            .note(format!("posh {}", version()))
            .with(|it| match backtrace {
                Some(backtrace) => it.note(format!("with the following backtrace:\n{backtrace}")),
                None => it.help(
                    "rerun with the environment variable ‘POSH_BACKTRACE=1’ to display a backtrace",
                ),
            })
            .report(&Reporter::stderr());
    }));
}
