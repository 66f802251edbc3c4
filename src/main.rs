use boxpush::heuristic::{Distance, HeuristicKind};
use boxpush::levels::Levels;
use boxpush::problem::CostPolicy;
use boxpush::puzzle::Puzzle;
use boxpush::search::{DuplicatePolicy, SearchConfig, SearchOutcome};
use boxpush::solver::{SolveOpts, Solver};
use boxpush::state::Push;
use clap::Parser;
use log::{debug, error};
use std::process;

fn print_solution(puzzle: &Puzzle, solution: &[Push]) {
    println!("\nStarting position:\n{}", puzzle);
    let mut state = puzzle.current().clone();
    let total = solution.len();
    for (count, push) in solution.iter().enumerate() {
        state = match state.apply_push(puzzle.layout(), *push) {
            Ok(next) => next,
            Err(e) => {
                error!("solution push {} is illegal: {}", push, e);
                return;
            }
        };
        println!(
            "Push box {} ({}/{}):\n{}",
            push,
            count + 1,
            total,
            puzzle.render(&state)
        );
    }
}

struct LevelStats {
    solved: bool,
    pushes: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

fn solve_level(puzzle: &Puzzle, level_num: usize, solver: &Solver, print: bool) -> LevelStats {
    let result = solver.solve(puzzle);
    let elapsed_ms = result.elapsed.as_millis();

    let (solved_char, pushes) = match &result.outcome {
        SearchOutcome::Solved(solution) => ('Y', solution.len()),
        SearchOutcome::Cutoff | SearchOutcome::Aborted => ('N', 0),
        SearchOutcome::Impossible => ('X', 0),
    };

    println!(
        "level: {:<3}  solved: {}  pushes: {:<5}  states: {:<12}  elapsed: {} ms",
        level_num, solved_char, pushes, result.nodes_explored, elapsed_ms
    );

    if print {
        if let SearchOutcome::Solved(solution) = &result.outcome {
            print_solution(puzzle, solution);
        }
    }

    LevelStats {
        solved: solved_char == 'Y',
        pushes,
        states_explored: result.nodes_explored,
        elapsed_ms,
    }
}

#[derive(Parser)]
#[command(name = "boxpush")]
#[command(about = "A box-pushing puzzle solver", long_about = None)]
struct Args {
    /// Path to the levels file (XSB format)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution push by push
    #[arg(short, long)]
    print_solution: bool,

    /// Heuristic to guide the search
    #[arg(short = 'H', long, value_enum, default_value_t = HeuristicKind::Hungarian)]
    heuristic: HeuristicKind,

    /// How heuristics measure the distance from a box to a target
    #[arg(short = 'D', long, value_enum, default_value_t = Distance::BoxPath)]
    distance: Distance,

    /// Cost of a push: optimal counts pushes, fast ignores them
    #[arg(short, long, value_enum, default_value_t = CostPolicy::Optimal)]
    cost: CostPolicy,

    /// Maximum number of nodes to expand before giving up
    #[arg(short = 'n', long)]
    max_nodes: Option<usize>,

    /// Disable skipping of previously seen box arrangements
    #[arg(long)]
    no_existence: bool,

    /// Disable pruning of boxes pushed into dead spots
    #[arg(long)]
    no_terminal: bool,

    /// Let a new node replace a queued node with the same key
    #[arg(long)]
    replace_duplicates: bool,
}

impl Args {
    fn solve_opts(&self) -> SolveOpts {
        SolveOpts {
            heuristic: self.heuristic,
            distance: self.distance,
            cost: self.cost,
            existence: !self.no_existence,
            terminal: !self.no_terminal,
            search: SearchConfig {
                max_nodes: self.max_nodes,
                duplicates: if self.replace_duplicates {
                    DuplicatePolicy::Replace
                } else {
                    DuplicatePolicy::Keep
                },
                ..SearchConfig::default()
            },
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => fail(format_args!("loading levels: {}", e)),
    };

    let level_end = args.level_end.unwrap_or(args.level_start);
    if args.level_start == 0 {
        fail("level numbers must be at least 1");
    }
    if level_end < args.level_start {
        fail("level end must be >= level start");
    }
    if level_end > levels.len() {
        fail(format_args!(
            "level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        ));
    }
    let num_levels = level_end - args.level_start + 1;
    if args.print_solution && num_levels > 1 {
        fail("solution printing only supported when solving a single level");
    }

    let solver = Solver::new(args.solve_opts());
    debug!("solving levels {}..={} with {:?}", args.level_start, level_end, solver.opts());

    let mut total_solved = 0;
    let mut total_pushes = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in args.level_start..=level_end {
        let Some(puzzle) = levels.get(level_num - 1) else {
            fail(format_args!("level {} not found", level_num));
        };
        let stats = solve_level(puzzle, level_num, &solver, args.print_solution);

        if stats.solved {
            total_solved += 1;
        }
        total_pushes += stats.pushes;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        pushes: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_pushes, total_states, total_time_ms
        );
    }
}
