//! BeebIDE shell
//!
//! A terminal front end for building 8-bit projects with an external assembler worker and
//! keeping track of breakpoints across builds.
//! Options supported:
//!   -p/--project   Project manifest to load
//!   -o/--output    Name of the artifact to build, defaults to `output.ssd`
//!
//! The assembler worker command should be specified as an addendum when running the command,
//! e.g.
//! ```text
//! beebide -p starquake.json -- node beebasm-worker.js
//! ```
//! will build `starquake.json` with `node beebasm-worker.js` as the worker. The worker is sent
//! one JSON request per line on its stdin and should answer with one JSON response per line on
//! its stdout.

#[macro_use]
extern crate lazy_static;

use std::process::exit;

use clap::{App, Arg, ArgMatches};
use tokio::runtime;

mod console;
mod shell;
mod worker;

fn get_app_args<'a>() -> ArgMatches<'a> {
    App::new("BeebIDE")
        .version("0.1.0")
        .author("Steven Trotter <stevetrot@gmail.com>")
        .about("Build, breakpoint and boot 8-bit projects")
        .long_about("Drives an assembler worker to build a project, keeps breakpoints set on source lines and addresses in step with each build and reports assembler errors.")
        .arg(Arg::with_name("project")
                 .short("p")
                 .long("project")
                 .takes_value(true)
                 .help("specify project manifest to load"))
        .arg(Arg::with_name("output")
                 .short("o")
                 .long("output")
                 .takes_value(true)
                 .help("specify name of the artifact to build"))
        .arg(Arg::with_name("worker_cmd")
                 .multiple(true)
                 .takes_value(true)
                 .required(true))
        .get_matches()
}

fn main() {
    let args = get_app_args();

    let worker_cmd: Vec<String> = args
        .values_of("worker_cmd")
        .map(|values| values.map(|x| x.to_string()).collect())
        .unwrap_or_default();
    let output = args.value_of("output").unwrap_or("output.ssd").to_string();

    let rt = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Can't start runtime: {}", e);
            exit(1);
        }
    };

    if let Err(e) = rt.block_on(shell::run(args.value_of("project"), output, worker_cmd)) {
        eprintln!("{}", e);
        eprintln!("{}", e.get_debug_string());
        exit(1);
    }
}
