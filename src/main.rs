extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate labasm;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use labasm::assembler::ast::Program;
use labasm::assembler::Parser;

use std::fs;
use std::path::Path;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Debug: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("print-debug"),
        args.value_of("INPUT").unwrap_or("None")
    );

    // INPUT is a required argument, so clap has already rejected a missing one.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    let source = match fs::read_to_string(&ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(source) => source,
    };

    let program = match Parser::new(&source).run() {
        Err(err) => {
            error!("fatal: unable to parse `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(program) => program,
    };

    info!("parsed `{}`: {} constant(s), {} label(s)",
        ipath.display(),
        program.constants.len(),
        program.blocks.len()
    );

    if args.is_present("print-debug") {
        println!("{}", listing(&program));
    }
}

/// Lays the program out as a grid: constants first, then every
/// instruction numbered in order under the label that holds it.
fn listing(program: &Program) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    let mut names: Vec<&String> = program.constants.keys().collect();
    names.sort();
    for name in names {
        grid.add(Cell::from(String::new()));
        grid.add(Cell::from(format!("{}", name)));
        grid.add(Cell::from("=".to_string()));
        grid.add(Cell::from(format!("{}", program.constants[name])));
    }

    let mut idx = 0;
    for label in program.blocks.iter() {
        let mut options: Vec<String> = label.options.iter()
            .map(|(key, value)| format!("{}({})", key, value))
            .collect();
        options.sort();

        grid.add(Cell::from(String::new()));
        grid.add(Cell::from(format!("{}:", label.identifier)));
        grid.add(Cell::from(String::new()));
        grid.add(Cell::from(format!("[{}]", options.join(", "))));

        for ins in label.instructions.iter() {
            grid.add(Cell::from(format!("0x{:04X}:", idx)));
            grid.add(Cell::from(ins.mnemonic.clone()));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(format!("{}", ins)));
            idx += 1;
        }
    }

    grid.fit_into_columns(4).to_string()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap_or("labasm"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"))
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap_or(""))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or(""))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .long("print-debug")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints a listing of the parsed program to STDOUT"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}
