use std::env;
use std::fs;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Error};
use clap::{App, Arg, ArgMatches};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use blocklit::blocking::{BlockingLiteralSelectionHeuristic, CandidateSizeBounds};
use blocklit::pass::{run_bce, run_sbce, EliminatorBackend, PassConfig, PassStats};
use blocklit::select::CandidateSelectionHeuristic;
use blocklit_dimacs::DimacsParser;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("BLOCKLIT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("blocklit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Removes blocked and set-blocked clauses from DIMACS CNF formulas")
        .arg(
            Arg::with_name("cnf")
                .long("cnf")
                .value_name("FILE")
                .help("The DIMACS CNF input file")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("blockedClauseEliminator")
                .long("blockedClauseEliminator")
                .value_name("BACKEND")
                .help("Overlap index the elimination check runs against")
                .possible_values(&["literalOccurrence", "avl"])
                .default_value("literalOccurrence")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("clauseSelectionHeuristic")
                .long("clauseSelectionHeuristic")
                .value_name("HEURISTIC")
                .help("Order in which candidate clauses are checked")
                .possible_values(&[
                    "sequential",
                    "random",
                    "minOverlap",
                    "maxOverlap",
                    "minLength",
                    "maxLength",
                ])
                .default_value("sequential")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("clauseSelectionRngSeed")
                .long("clauseSelectionRngSeed")
                .value_name("SEED")
                .help("Seed for the random clause selection heuristic")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("blockedClauseLiteralCandiateSelectionHeuristic")
                .long("blockedClauseLiteralCandiateSelectionHeuristic")
                .value_name("HEURISTIC")
                .help("Order in which a clause's literals are tried as witnesses")
                .possible_values(&["sequential", "random", "minOverlap", "maxOverlap"])
                .default_value("sequential")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("blockedClauseLiteralCandiateSelectionRngSeed")
                .long("blockedClauseLiteralCandiateSelectionRngSeed")
                .value_name("SEED")
                .help("Seed for the random literal selection heuristic")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("blockingSetMinimumSize")
                .long("blockingSetMinimumSize")
                .value_name("SIZE")
                .help("Minimum blocking set size; enables the set-blocked check")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("blockingSetMaximumSize")
                .long("blockingSetMaximumSize")
                .value_name("SIZE")
                .help("Maximum blocking set size; enables the set-blocked check")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("nCandidates")
                .long("nCandidates")
                .value_name("N")
                .help("Check at most N candidate clauses")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("nMatches")
                .long("nMatches")
                .value_name("N")
                .help("Stop after N clauses were eliminated")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeBudgetMs")
                .long("timeBudgetMs")
                .value_name("MILLIS")
                .help("Stop checking candidates after this much wall-clock time")
                .takes_value(true),
        )
        .get_matches();

    init_logging();
    info!("this is blocklit {}", env!("CARGO_PKG_VERSION"));

    let config = config_from_matches(&matches)?;

    let path = matches.value_of("cnf").expect("required argument");
    info!("reading file '{}'", path);
    let file = fs::File::open(path)?;

    let parsed = DimacsParser::parse(file)?;
    if parsed.determined_any_errors() {
        for parse_error in &parsed.errors {
            error!("{}", parse_error);
        }
        return Err(anyhow!("parsing '{}' failed", path));
    }
    let mut formula = parsed.formula.expect("error-free parse yields a formula");

    info!(
        "formula has {} variables and {} clauses",
        formula.num_variables(),
        formula.len()
    );

    let stats = if config.blocking_set_size_bounds.is_some() {
        run_sbce(&mut formula, &config)?
    } else {
        run_bce(&mut formula, &config)?
    };

    report(&stats, &formula);
    Ok(0)
}

fn config_from_matches(matches: &ArgMatches) -> Result<PassConfig, Error> {
    let clause_selection = match matches.value_of("clauseSelectionHeuristic").unwrap() {
        "sequential" => CandidateSelectionHeuristic::Sequential,
        "random" => CandidateSelectionHeuristic::Random,
        "minOverlap" => CandidateSelectionHeuristic::MinOverlap,
        "maxOverlap" => CandidateSelectionHeuristic::MaxOverlap,
        "minLength" => CandidateSelectionHeuristic::MinLength,
        "maxLength" => CandidateSelectionHeuristic::MaxLength,
        _ => unreachable!(),
    };

    let literal_selection = match matches
        .value_of("blockedClauseLiteralCandiateSelectionHeuristic")
        .unwrap()
    {
        "sequential" => BlockingLiteralSelectionHeuristic::Sequential,
        "random" => BlockingLiteralSelectionHeuristic::Random,
        "minOverlap" => BlockingLiteralSelectionHeuristic::MinClauseOverlap,
        "maxOverlap" => BlockingLiteralSelectionHeuristic::MaxClauseOverlap,
        _ => unreachable!(),
    };

    let backend = match matches.value_of("blockedClauseEliminator").unwrap() {
        "literalOccurrence" => EliminatorBackend::LiteralOccurrence,
        "avl" => EliminatorBackend::AvlIntervalTree,
        _ => unreachable!(),
    };

    let blocking_set_size_bounds = match (
        parse_optional(matches, "blockingSetMinimumSize")?,
        parse_optional(matches, "blockingSetMaximumSize")?,
    ) {
        (None, None) => None,
        (min, max) => {
            let min = min.unwrap_or(1);
            let max = max
                .ok_or_else(|| anyhow!("--blockingSetMaximumSize is required with a minimum size"))?;
            Some(CandidateSizeBounds { min, max })
        }
    };

    Ok(PassConfig {
        backend,
        clause_selection,
        clause_selection_rng_seed: parse_optional(matches, "clauseSelectionRngSeed")?,
        literal_selection,
        literal_selection_rng_seed: parse_optional(
            matches,
            "blockedClauseLiteralCandiateSelectionRngSeed",
        )?,
        num_candidates: parse_optional(matches, "nCandidates")?,
        max_matches: parse_optional(matches, "nMatches")?,
        max_clause_length: None,
        blocking_set_size_bounds,
        time_budget: parse_optional(matches, "timeBudgetMs")?.map(Duration::from_millis),
    })
}

fn parse_optional<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => {
            let parsed = value
                .parse()
                .map_err(|err| anyhow!("invalid value '{}' for --{}: {}", value, name, err))?;
            Ok(Some(parsed))
        }
    }
}

fn report(stats: &PassStats, formula: &blocklit_formula::Formula) {
    info!(
        "checked {} candidates, eliminated {} clauses ({} literals) in {:?}",
        stats.candidates_checked, stats.clauses_removed, stats.literals_removed, stats.elapsed
    );
    info!("{} clauses remain", formula.len());
}
