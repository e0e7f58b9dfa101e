use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

use tern_sat::config::{CcMinMode, Config, PhaseSaving, ReduceMode, RestartMode, SearchMode};
use tern_sat::reports::drat::ProofWriter;
use tern_sat::reports::Report;
use tern_sat::solver::Solver;
use tern_sat::types::err;

fn cli() -> Command {
    Command::new("tern_sat")
        .about("Determines whether a CNF formula is satisfiable")
        .arg(Arg::new("path")
            .required(false)
            .value_parser(value_parser!(PathBuf))
            .help("The DIMACS CNF file to solve; standard input when absent."))

        .arg(Arg::new("model")
            .long("model")
            .action(ArgAction::SetTrue)
            .help("Print the model on a satisfiable outcome."))

        .arg(Arg::new("var-decay")
            .long("var-decay")
            .value_parser(value_parser!(f64))
            .help("The variable activity decay factor. Default: 0.95"))

        .arg(Arg::new("cla-decay")
            .long("cla-decay")
            .value_parser(value_parser!(f64))
            .help("The clause activity decay factor. Default: 0.999"))

        .arg(Arg::new("rnd-freq")
            .long("rnd-freq")
            .value_parser(value_parser!(f64))
            .help("The frequency of random decisions. Default: 0"))

        .arg(Arg::new("rnd-seed")
            .long("rnd-seed")
            .value_parser(value_parser!(u32))
            .help("Seed for the random generator. Default: 91648253"))

        .arg(Arg::new("ccmin-mode")
            .long("ccmin-mode")
            .value_parser(value_parser!(u8).range(0..=2))
            .help("Conflict clause minimisation (0=none, 1=basic, 2=deep). Default: 2"))

        .arg(Arg::new("phase-saving")
            .long("phase-saving")
            .value_parser(value_parser!(u8).range(0..=2))
            .help("Phase saving (0=none, 1=limited, 2=full). Default: 2"))

        .arg(Arg::new("gc-frac")
            .long("gc-frac")
            .value_parser(value_parser!(f64))
            .help("Wasted memory fraction before garbage collection. Default: 0.20"))

        .arg(Arg::new("restart")
            .long("restart")
            .value_parser(value_parser!(u8).range(0..=1))
            .help("Restart mode (0=glucose, 1=luby). Default: 0"))

        .arg(Arg::new("reduce")
            .long("reduce")
            .value_parser(value_parser!(u8).range(0..=1))
            .help("Reduce mode (0=glucose, 1=core/tier2/local). Default: 1"))

        .arg(Arg::new("search")
            .long("search")
            .value_parser(value_parser!(u8).range(0..=2))
            .help("Search mode (0=target, 1=focus, 2=stable). Default: 0"))

        .arg(Arg::new("no-walk")
            .long("no-walk")
            .action(ArgAction::SetTrue)
            .help("Disable the local-search (CCA-NR) rephasing step."))

        .arg(Arg::new("no-lcm")
            .long("no-lcm")
            .action(ArgAction::SetTrue)
            .help("Disable learnt-clause vivification."))

        .arg(Arg::new("savetrail")
            .long("savetrail")
            .action(ArgAction::SetTrue)
            .help("Save and replay trail segments across backjumps."))

        .arg(Arg::new("self-sub")
            .long("self-sub")
            .action(ArgAction::SetTrue)
            .help("Shrink reason clauses by self-subsumption during analysis."))

        .arg(Arg::new("adapt")
            .long("adapt")
            .action(ArgAction::SetTrue)
            .help("Retune strategies once at 100000 conflicts."))

        .arg(Arg::new("certified")
            .long("certified")
            .action(ArgAction::SetTrue)
            .help("Emit a DRAT proof of unsatisfiability."))

        .arg(Arg::new("certified-output")
            .long("certified-output")
            .value_parser(value_parser!(PathBuf))
            .help("Where to write the proof; standard output when absent."))

        .arg(Arg::new("vbyte")
            .long("vbyte")
            .action(ArgAction::SetTrue)
            .help("Emit the proof in the binary (vbyte) encoding."))

        .arg(Arg::new("cpu-lim")
            .long("cpu-lim")
            .value_parser(value_parser!(u64))
            .help("Limit on solving time, in seconds."))
}

fn main() {
    env_logger::init();
    let matches = cli().get_matches();

    let mut config = Config::default();
    if let Some(&decay) = matches.get_one::<f64>("var-decay") {
        config.var_decay = decay;
    }
    if let Some(&decay) = matches.get_one::<f64>("cla-decay") {
        config.clause_decay = decay;
    }
    if let Some(&freq) = matches.get_one::<f64>("rnd-freq") {
        config.random_var_freq = freq;
    }
    if let Some(&seed) = matches.get_one::<u32>("rnd-seed") {
        config.random_seed = seed;
    }
    if let Some(&mode) = matches.get_one::<u8>("ccmin-mode") {
        config.ccmin_mode = match mode {
            0 => CcMinMode::None,
            1 => CcMinMode::Basic,
            _ => CcMinMode::Deep,
        };
    }
    if let Some(&mode) = matches.get_one::<u8>("phase-saving") {
        config.phase_saving = match mode {
            0 => PhaseSaving::None,
            1 => PhaseSaving::Limited,
            _ => PhaseSaving::Full,
        };
    }
    if let Some(&frac) = matches.get_one::<f64>("gc-frac") {
        config.garbage_frac = frac;
    }
    if let Some(&mode) = matches.get_one::<u8>("restart") {
        config.restart_mode = match mode {
            0 => RestartMode::Glucose,
            _ => RestartMode::Luby,
        };
    }
    if let Some(&mode) = matches.get_one::<u8>("reduce") {
        config.reduce_mode = match mode {
            0 => ReduceMode::Glucose,
            _ => ReduceMode::Tiers,
        };
    }
    if let Some(&mode) = matches.get_one::<u8>("search") {
        config.search_mode = match mode {
            0 => SearchMode::Target,
            1 => SearchMode::Focus,
            _ => SearchMode::Stable,
        };
    }
    config.walk = !matches.get_flag("no-walk");
    config.lcm = !matches.get_flag("no-lcm");
    config.save_trail = matches.get_flag("savetrail");
    config.self_subsumption = matches.get_flag("self-sub");
    config.adapt_strategies = matches.get_flag("adapt");

    let mut solver = Solver::new(config);

    if matches.get_flag("certified") {
        let vbyte = matches.get_flag("vbyte");
        match matches.get_one::<PathBuf>("certified-output") {
            Some(path) => {
                let file = match File::create(path) {
                    Ok(file) => file,
                    Err(e) => {
                        eprintln!("c cannot open proof output {path:?}: {e}");
                        std::process::exit(1);
                    }
                };
                println!(
                    "c writing proof to {path:?} in {} format",
                    if vbyte { "binary" } else { "text" }
                );
                solver.set_proof(ProofWriter::new(Box::new(BufWriter::new(file)), vbyte));
            }
            None => {
                // Binary output would corrupt the report stream.
                println!("c writing proof to standard output in text format");
                solver.set_proof(ProofWriter::new(Box::new(std::io::stdout()), false));
            }
        }
    }

    let parse = match matches.get_one::<PathBuf>("path") {
        Some(path) => {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("c cannot open {path:?}: {e}");
                    std::process::exit(1);
                }
            };
            solver.read_dimacs(BufReader::new(file))
        }
        None => {
            println!("c reading from standard input");
            solver.read_dimacs(BufReader::new(std::io::stdin()))
        }
    };

    println!(
        "c {} atoms, {} clauses",
        solver.atom_count(),
        solver.clause_count()
    );

    let report = match parse {
        Err(err::ErrorKind::Build(err::BuildError::Unsatisfiable)) => {
            // Settled during the read; conclude without searching.
            solver.solve()
        }
        Err(e) => {
            eprintln!("c parse failure: {e}");
            std::process::exit(1);
        }
        Ok(()) => {
            if let Some(&seconds) = matches.get_one::<u64>("cpu-lim") {
                let interrupt = solver.interrupt_handle();
                std::thread::spawn(move || {
                    std::thread::sleep(std::time::Duration::from_secs(seconds));
                    interrupt.store(true, std::sync::atomic::Ordering::Relaxed);
                });
            }
            solver.solve()
        }
    };

    solver.log_stats();
    println!("{report}");

    if report == Report::Satisfiable && matches.get_flag("model") {
        let mut line = String::from("v");
        for atom in 0..solver.atom_count() {
            let value = solver.model_value(atom).unwrap_or(false);
            line.push(' ');
            if !value {
                line.push('-');
            }
            line.push_str(&(atom + 1).to_string());
        }
        line.push_str(" 0");
        println!("{line}");
        let _ = std::io::stdout().flush();
    }

    std::process::exit(report.exit_code());
}
