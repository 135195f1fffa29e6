use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct Args {
    pub config_path: Option<PathBuf>,
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
    pub seed: Option<u64>,
    pub frames_dir: Option<PathBuf>,
    pub dump_config: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    /// Parse flags (program name already stripped). `None` means exit now.
    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut parsed = Args::default();

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Storm Sentry v{}", env!("APP_VERSION_DISPLAY"));
                return None;
            } else if arg == "--debug" {
                parsed.debug_mode = true;
            } else if arg == "--dump-config" {
                parsed.dump_config = true;
            } else if let Some(val) = arg.strip_prefix("--config=") {
                parsed.config_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--frames=") {
                parsed.frames_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                parsed.timeout_secs = Some(parse_number("timeout", val)?);
            } else if let Some(val) = arg.strip_prefix("--seed=") {
                parsed.seed = Some(parse_number("seed", val)?);
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(parsed)
    }
}

fn parse_number(name: &str, val: &str) -> Option<u64> {
    match val.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            eprintln!("❌ Invalid {} value: {}", name, val);
            None
        }
    }
}

fn print_help() {
    println!("🎯 Storm Sentry - automated base defence targeting");
    println!();
    println!("USAGE:");
    println!("    storm-sentry [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config=PATH       Load settings from a JSON file (defaults otherwise)");
    println!("    --frames=DIR        Replay PNG frames from DIR as the capture source");
    println!("    --seed=N            Fixed seed for target selection");
    println!("    --timeout=N         Auto-exit after N seconds (for testing)");
    println!("    --debug             Enable debug logging");
    println!("    --dump-config       Print the effective configuration as JSON and exit");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("TRIGGERS (stdin):");
    println!("    1 | start           Begin shooting");
    println!("    0 | stop            Stop and release the fire button");
    println!("    2 | hold            Toggle hold-fire");
    println!();
    println!("EXAMPLES:");
    println!("    storm-sentry --frames=recordings/day3 --debug");
    println!("    storm-sentry --config=sentry.json --timeout=60");
}
