use itc2zimpl::input::read_instance;
use itc2zimpl::*;
use log::*;
use std::time::Instant;

use structopt::*;
#[derive(StructOpt, Debug)]
#[structopt(about = "Write an ITC2021 instance as a Zimpl model to stdout")]
struct Opt {
    /// Instance xml, optionally gzip-compressed (.gz), or - for stdin
    #[structopt(name = "FILE", parse(from_os_str))]
    file: std::path::PathBuf,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(long)]
    quiet: bool,

    /// Leave out soft constraints and the penalty objective
    #[structopt(long)]
    nosoft: bool,

    /// Second half of the season mirrors the first
    #[structopt(long)]
    sym: bool,

    /// Maximize the number of scheduled games instead of minimizing violation
    #[structopt(long)]
    feasopt: bool,

    /// Add odd set inequalities for subsets of three teams
    #[structopt(long, conflicts_with = "oddall")]
    odd3: bool,

    /// Add odd set inequalities for every odd subset size up to half the teams
    #[structopt(long)]
    oddall: bool,

    /// Fix the number of scheduled games
    #[structopt(long)]
    xcount: bool,

    /// Upper bound on the penalty terms after the first --objcut-skip
    #[structopt(long)]
    objcut: Option<i64>,

    #[structopt(long, default_value = "18")]
    objcut_skip: usize,

    /// Give the GA1 minimum rows a penalty variable of their own
    #[structopt(long)]
    ga1_separate_min: bool,
}

impl Opt {
    fn options(&self) -> Options {
        Options {
            soft: !self.nosoft,
            symmetric: self.sym,
            feasibility_objective: self.feasopt,
            odd_sets: if self.odd3 {
                OddSets::Three
            } else if self.oddall {
                OddSets::All
            } else {
                OddSets::None
            },
            fix_match_count: self.xcount,
            objective_cutoff: self.objcut.map(|value| Cutoff {
                value,
                skip: self.objcut_skip,
            }),
            ga1_min_penalty: if self.ga1_separate_min {
                Ga1MinPenalty::Separate
            } else {
                Ga1MinPenalty::Shared
            },
        }
    }
}

fn run(opt: &Opt) -> Result<Model> {
    let xml = read_instance(&opt.file)?;
    let instance = Instance::parse(&xml)?;
    compile(&instance, &opt.options())
}

/// The one line printed for a failed run, whatever the log level.
fn failure(file: &std::path::Path, e: &Error) -> String {
    format!("error: {}: {}", file.display(), e)
}

fn main() {
    let opt = Opt::from_args();

    if let Err(e) = stderrlog::StdErrLog::new()
        .verbosity(usize::from(opt.verbose))
        .quiet(opt.quiet)
        .module(module_path!())
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init()
    {
        eprintln!("could not set up logging: {}", e);
    }

    let start = Instant::now();
    info!("Reading {}", opt.file.display());
    match run(&opt) {
        Ok(model) => {
            print!("{}", model);
            info!("Model written in {:.3}s", start.elapsed().as_secs_f64());
        }
        Err(e) => {
            eprintln!("{}", failure(&opt.file, &e));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_run_still_reports_failure() {
        let opt = Opt::from_iter(&["itc2zimpl", "--quiet", "/nonexistent/instance.xml"]);
        assert!(opt.quiet);
        let e = run(&opt).unwrap_err();
        let line = failure(&opt.file, &e);
        assert!(line.starts_with("error: /nonexistent/instance.xml: could not read instance"));
    }
}
