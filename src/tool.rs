// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::error::Error;
use std::fs::File;
use std::process;
use std::str;

use clap::{App, Arg, ArgMatches};
use memmap::Mmap;

use lrscope::analysis::{Analysis, Sets};
use lrscope::grammar::Grammar;
use lrscope::loader;
use lrscope::lr1::{ItemSets, DEFAULT_STATE_LIMIT};
use lrscope::parser::{Parser, Step};
use lrscope::table::{ConflictResolution, ParseTable};

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about("Analyzes a grammar and parses input with its canonical LR(1) table")
        .arg(
            Arg::with_name("GRAMMAR")
                .help("The grammar file, one `LHS -> RHS` production per line")
                .required(true),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Whitespace-separated terminals to parse"),
        )
        .arg(
            Arg::with_name("analysis")
                .long("analysis")
                .help("Print the productions and the first and follow sets"),
        )
        .arg(Arg::with_name("first").long("first").help("Print the first sets"))
        .arg(Arg::with_name("follow").long("follow").help("Print the follow sets"))
        .arg(Arg::with_name("items").long("items").help("Print the LR(1) item sets"))
        .arg(Arg::with_name("table").long("table").help("Print the parse table"))
        .arg(
            Arg::with_name("conflicts")
                .long("conflicts")
                .help("Print the conflicting table cells"),
        )
        .arg(
            Arg::with_name("trace")
                .long("trace")
                .help("Print every parser step"),
        )
        .arg(
            Arg::with_name("resolve")
                .long("resolve")
                .takes_value(true)
                .possible_values(&["first-found", "prefer-shift", "prefer-reduce"])
                .default_value("first-found")
                .help("How to pick an action from a conflicting cell"),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .value_name("SYMBOL")
                .help("The start symbol, instead of the first production's LHS"),
        )
        .arg(
            Arg::with_name("max-states")
                .long("max-states")
                .takes_value(true)
                .value_name("N")
                .help("Give up if the automaton grows beyond this many states"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output but errors"),
        )
        .get_matches();

    stderrlog::new()
        .module(module_path!())
        .quiet(matches.is_present("quiet"))
        .verbosity(matches.occurrences_of("verbosity") as usize + 1)
        .init()
        .expect("unable to initialize logging");

    if let Err(e) = run(&matches) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of("GRAMMAR").unwrap_or_default();
    let grammar = load_grammar(path, matches.value_of("start"))?;

    let analysis = Analysis::compute(&grammar)?;
    if matches.is_present("analysis") {
        print!("{}", analysis.pretty(&grammar));
    }
    if matches.is_present("first") {
        print!("{}", analysis.pretty_sets(&grammar, Sets::First));
    }
    if matches.is_present("follow") {
        print!("{}", analysis.pretty_sets(&grammar, Sets::Follow));
    }

    let limit = match matches.value_of("max-states") {
        Some(n) => n.parse()?,
        None => DEFAULT_STATE_LIMIT,
    };
    let item_sets = ItemSets::compute_with_limit(&grammar, analysis.first(), limit)?;
    if matches.is_present("items") {
        println!("{}", item_sets.pretty(&grammar));
    }

    let table = ParseTable::compute(&grammar, &item_sets);
    if matches.is_present("table") {
        println!("{}", table.pretty(&grammar));
    }
    if matches.is_present("conflicts") {
        for conflict in table.conflicts() {
            println!("{}", conflict.pretty(&grammar));
        }
    }

    if let Some(input) = matches.value_of("INPUT") {
        let resolution: ConflictResolution = matches
            .value_of("resolve")
            .unwrap_or("first-found")
            .parse()?;
        let parser = Parser::new(&grammar, &table).with_resolution(resolution);
        let tokens = parser.tokenize(input)?;
        let tree = if matches.is_present("trace") {
            parser.parse_observed(tokens, &mut |step: &Step| {
                println!("{}", step.pretty(&grammar))
            })?
        } else {
            parser.parse(tokens)?
        };
        println!("{}", tree.pretty(&grammar));
    }
    Ok(())
}

/// Map a grammar file into memory and load the productions from it.
fn load_grammar(path: &str, start: Option<&str>) -> Result<Grammar, Box<dyn Error>> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {}", path, e))?;
    // Mapping an empty file fails on some platforms.
    if file.metadata()?.len() == 0 {
        return Ok(loader::load("", start)?);
    }
    let map = unsafe { Mmap::map(&file)? };
    let text = str::from_utf8(&map)?;
    debug!("loaded {} bytes from {}", text.len(), path);
    Ok(loader::load(text, start)?)
}
