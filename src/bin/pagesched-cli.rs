//! pagesched CLI - line-oriented driver for the simulator
//!
//! Run with: cargo run --bin pagesched-cli -- [config.json]
//! Set RUST_LOG=debug to see scheduler and pager decisions on stderr.

use pagesched::kernel::{Pid, Process, SimConfig, SimResult, Simulator};
use std::io::{self, BufRead, Write};
use std::time::Duration;

const HELP: &str = "\
pagesched CLI - Available commands:
  add <pid> <priority> <arrival> <pages...>  Queue a new process
  cpu <fifo|sjf|priority|rr>                 Set CPU scheduling policy
  mem <fifo|lru|opt>                         Set page replacement policy
  quantum <n>                                Set Round-Robin time quantum
  frames <n>                                 Rebuild memory with n frames
  scenario <name>                            Load a built-in workload
  start                                      Reset the clock and begin
  step [n]                                   Advance n time units (default 1)
  run                                        Step until every process finishes
  stop                                       Pause the simulation
  reset                                      Discard all state
  state                                      Print the state snapshot as JSON
  stats                                      Print detailed statistics as JSON
  log [n]                                    Print the n most recent log entries
  help                                       Show this help
  exit                                       Leave the CLI";

fn main() {
    env_logger::init();

    let (mut sim, interval) = match std::env::args().nth(1) {
        Some(path) => match load(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("pagesched: {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => (Simulator::new(), Duration::ZERO),
    };

    println!("pagesched v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for available commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("sim[t={}]> ", sim.current_time());
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    break;
                }
                if let Err(e) = execute(&mut sim, line, interval) {
                    eprintln!("error: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

fn load(path: &str) -> SimResult<(Simulator, Duration)> {
    let config = SimConfig::load(path)?;
    let sim = Simulator::from_config(&config)?;
    Ok((sim, Duration::from_millis(config.interval_ms)))
}

fn execute(sim: &mut Simulator, line: &str, interval: Duration) -> Result<(), String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(());
    };
    let args: Vec<&str> = words.collect();

    match command {
        "help" => println!("{}", HELP),
        "add" => {
            if args.len() < 3 {
                return Err("usage: add <pid> <priority> <arrival> <pages...>".into());
            }
            let pid = parse::<u32>(args[0], "pid")?;
            let priority = parse::<i32>(args[1], "priority")?;
            let arrival = parse::<u64>(args[2], "arrival")?;
            let pages = args[3..]
                .iter()
                .map(|p| parse::<u32>(p, "page"))
                .collect::<Result<Vec<_>, _>>()?;
            if !sim.add_process(Process::new(Pid(pid), pages, priority, arrival)) {
                return Err(format!("{} already exists", Pid(pid)));
            }
        }
        "cpu" => {
            let name = args.first().ok_or("usage: cpu <algorithm>")?;
            sim.set_cpu_scheduling_algorithm(name.parse().map_err(|e| format!("{}", e))?);
        }
        "mem" => {
            let name = args.first().ok_or("usage: mem <algorithm>")?;
            sim.set_page_replacement_algorithm(name.parse().map_err(|e| format!("{}", e))?);
        }
        "quantum" => {
            let n = parse::<u32>(args.first().ok_or("usage: quantum <n>")?, "quantum")?;
            sim.set_time_quantum(n).map_err(|e| e.to_string())?;
        }
        "frames" => {
            let n = parse::<usize>(args.first().ok_or("usage: frames <n>")?, "frames")?;
            sim.set_frame_count(n).map_err(|e| e.to_string())?;
        }
        "scenario" => {
            let name = args.first().ok_or("usage: scenario <name>")?;
            sim.load_test_scenario(name).map_err(|e| e.to_string())?;
        }
        "start" => sim.start(),
        "step" => {
            let n = match args.first() {
                Some(n) => parse::<u64>(n, "count")?,
                None => 1,
            };
            for _ in 0..n {
                let more = sim.step();
                print_last_step(sim);
                if !more {
                    break;
                }
            }
        }
        "run" => {
            let steps = sim.run_automatic(interval);
            println!("ran {} steps, t={}", steps, sim.current_time());
        }
        "stop" => sim.stop(),
        "reset" => sim.reset(),
        "state" => println!("{}", sim.state_json().map_err(|e| e.to_string())?),
        "stats" => {
            let stats = sim.get_detailed_statistics();
            let json = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        "log" => {
            let n = match args.first() {
                Some(n) => parse::<usize>(n, "count")?,
                None => 20,
            };
            for entry in sim.logs().recent(n) {
                println!("{}", entry);
            }
        }
        other => return Err(format!("unknown command: {} (try 'help')", other)),
    }
    Ok(())
}

fn print_last_step(sim: &Simulator) {
    let report = sim.last_step();
    let ran = report.ran.map_or_else(|| "idle".to_string(), |pid| pid.to_string());
    let access = match &report.access {
        Some(a) if a.hit => format!("page {} hit", a.page),
        Some(a) => match a.victim {
            Some(v) => format!("page {} fault (evict {})", a.page, v),
            None => format!("page {} fault", a.page),
        },
        None => "-".to_string(),
    };
    let frames: Vec<String> = sim
        .memory()
        .frames()
        .iter()
        .map(|f| f.map_or_else(|| ".".to_string(), |p| p.to_string()))
        .collect();
    println!(
        "t={:<4} {:<5} {:<26} frames [{}]{}",
        report.time,
        ran,
        access,
        frames.join(" "),
        if sim.is_running() { "" } else { "  (halted)" }
    );
}

fn parse<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid {}: {}", what, s))
}
