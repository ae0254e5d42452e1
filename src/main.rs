//! Warden-0 CLI
//!
//! Usage:
//!   warden0                                  # Watch loop with configured adapters
//!   warden0 --simulate                       # Scripted encounter demo
//!   warden0 --serve                          # Watch loop + HTTP status API
//!   warden0 --secret "open sesame" --json    # Custom passphrase, JSON output

use clap::Parser;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use warden0::core::{
    run_server, ActuatorLink, ConsoleVoice, DetectorHandle, FrameLoop, IncidentLedger,
    InstantPacer, JsonlLedger, LineMic, NullDetector, NullLedger, NullLink, NullOracle, Periphery,
    RunSummary, ScriptedDetector, ScriptedMic, ScriptedOracle, SleepPacer, StatusBoard,
    SyntheticFrames, WardenEngine, WriterLink,
};
use warden0::types::{BoundingBox, Detection, DetectionFrame, Label, PackageVerdict};
use warden0::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "warden0",
    version = VERSION,
    about = "Warden-0 - Perimeter watch controller for unattended deliveries",
    long_about = "Warden-0 watches a camera feed for a courier presenting a package,\n\
                  challenges them for a spoken passphrase, then receives the delivery\n\
                  or guards the perimeter with voice warnings and a hardware deterrent.\n\n\
                  Modes:\n  \
                  (default)   Watch loop with the configured adapters\n  \
                  --simulate  Scripted encounter: delivery, oversized package, prowler\n  \
                  --serve     Watch loop plus HTTP status API\n\n\
                  States:\n  \
                  IDLE       - Scanning for a person with a package\n  \
                  VERIFYING  - Passphrase challenge in progress\n  \
                  RECEIVING  - Hatch open, awaiting placement\n  \
                  GUARDING   - Deterrence active (wrong password or guarded package)"
)]
struct Args {
    /// Secret delivery passphrase (falls back to WARDEN_SECRET, then "open")
    #[arg(short, long)]
    secret: Option<String>,

    /// Run the built-in scripted encounter instead of a live watch
    #[arg(long)]
    simulate: bool,

    /// Run the status API server alongside the watch loop
    #[arg(long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Path to the deterrent hardware link (e.g. a serial device node)
    #[arg(long)]
    link: Option<PathBuf>,

    /// Append incident records to this JSONL file
    #[arg(long, default_value = "./incidents/ledger.jsonl")]
    ledger: PathBuf,

    /// Disable the incident ledger
    #[arg(long)]
    no_ledger: bool,

    /// Stop after this many frames (0 = run until quit signal)
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Output as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Render every tick, not just transitions and actions
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    let secret = resolve_secret(&args);
    print_banner(args.no_color);

    if args.simulate {
        run_simulate(&args, &secret);
    } else if args.serve {
        run_serve(&args, &secret).await;
    } else {
        run_watch(&args, &secret).await;
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warden0=info")),
        )
        .with_target(false)
        .init();
}

/// CLI flag, then environment, then the stock default
fn resolve_secret(args: &Args) -> String {
    let secret = args
        .secret
        .clone()
        .or_else(|| std::env::var("WARDEN_SECRET").ok())
        .unwrap_or_else(|| "open".to_string());

    if secret.trim().is_empty() {
        eprintln!("Secret phrase must not be empty");
        std::process::exit(1);
    }
    secret
}

fn print_banner(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Warden-0 v{} - Perimeter Watch", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m╔══════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║  👁 Warden-0 v{} - Perimeter Watch ║\x1b[0m", VERSION);
        println!("\x1b[1m╚══════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

/// Build the ledger from flags, degrading to none on failure
fn build_ledger(args: &Args) -> Box<dyn IncidentLedger> {
    if args.no_ledger {
        return Box::new(NullLedger);
    }
    match JsonlLedger::open(&args.ledger) {
        Ok(ledger) => Box::new(ledger),
        Err(err) => {
            eprintln!(
                "[LEDGER WARNING] Could not open {}. Running without a ledger. Error: {}",
                args.ledger.display(),
                err
            );
            Box::new(NullLedger)
        }
    }
}

/// Build the hardware link from flags, degrading to a no-op on failure
fn build_link(args: &Args) -> Box<dyn ActuatorLink> {
    match &args.link {
        Some(path) => match std::fs::OpenOptions::new().write(true).open(path) {
            Ok(port) => {
                println!("[HARDWARE] Connected to deterrent link on {}", path.display());
                Box::new(WriterLink::new(port))
            }
            Err(err) => {
                eprintln!(
                    "[HARDWARE WARNING] Could not open {}. Running in software-only mode. Error: {}",
                    path.display(),
                    err
                );
                Box::new(NullLink)
            }
        },
        None => {
            println!("[HARDWARE] No deterrent link configured. Running in software-only mode.");
            Box::new(NullLink)
        }
    }
}

/// Live periphery: console voice, stdin microphone, real sleeps, and
/// whatever detector/oracle backends are wired in. Without backends the
/// controller idles, which is the supported degraded mode.
fn build_live_periphery(args: &Args) -> Periphery {
    println!("[SYSTEM] No detection backend configured; the perimeter will stay quiet.");
    Periphery::new(
        DetectorHandle::new(Box::new(NullDetector)),
        Box::new(NullOracle),
        Box::new(LineMic::new(BufReader::new(io::stdin()))),
        Box::new(ConsoleVoice),
        build_link(args),
        build_ledger(args),
        Box::new(SleepPacer),
    )
}

fn build_frame_source(args: &Args) -> SyntheticFrames {
    let mut source =
        SyntheticFrames::new(640, 480).with_interval(Duration::from_millis(200));
    if args.frames > 0 {
        source = source.with_limit(args.frames);
    }
    source
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "Watch ended. Ticks: {} | Final state: {} | Deterrence episodes: {}",
        summary.ticks, summary.final_state, summary.deterrence_count
    );
}

/// Raise the stop flag on the first quit signal
fn watch_for_quit(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n[SYSTEM] Quit signal received, finishing the current tick...");
            stop.store(true, Ordering::Relaxed);
        }
    });
}

/// Default mode: the watch loop on a blocking thread
async fn run_watch(args: &Args, secret: &str) {
    println!("[SYSTEM] Warden-0 is online and watching the door. Ctrl-C to quit.");
    println!();

    let stop = Arc::new(AtomicBool::new(false));
    watch_for_quit(stop.clone());

    let engine = WardenEngine::new(secret);
    let mut frame_loop =
        FrameLoop::new(engine, build_live_periphery(args), Box::new(build_frame_source(args)))
            .with_stop(stop)
            .with_output(args.json, args.no_color, args.verbose);

    match tokio::task::spawn_blocking(move || frame_loop.run()).await {
        Ok(summary) => print_summary(&summary),
        Err(err) => {
            eprintln!("Watch loop panicked: {}", err);
            std::process::exit(1);
        }
    }
}

/// Watch loop plus the status API
async fn run_serve(args: &Args, secret: &str) {
    println!("[SYSTEM] Warden-0 is online and watching the door. Ctrl-C to quit.");
    println!();

    let stop = Arc::new(AtomicBool::new(false));
    watch_for_quit(stop.clone());

    let board = Arc::new(StatusBoard::new());
    let engine = WardenEngine::new(secret);
    let mut frame_loop =
        FrameLoop::new(engine, build_live_periphery(args), Box::new(build_frame_source(args)))
            .with_board(board.clone())
            .with_stop(stop)
            .with_output(args.json, args.no_color, args.verbose);

    let loop_handle = tokio::task::spawn_blocking(move || frame_loop.run());

    tokio::select! {
        result = run_server(&args.addr, board) => {
            if let Err(err) = result {
                eprintln!("Server error: {}", err);
                std::process::exit(1);
            }
        }
        result = loop_handle => {
            match result {
                Ok(summary) => print_summary(&summary),
                Err(err) => {
                    eprintln!("Watch loop panicked: {}", err);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Scripted encounter: a clean delivery challenge, an oversized package,
/// then a prowler triggering the deterrent. Holds are skipped so the
/// demo plays out immediately.
fn run_simulate(args: &Args, secret: &str) {
    println!("[SYSTEM] Simulated encounter starting.");
    println!();

    let courier_frame = || {
        DetectionFrame::with_detections(
            480.0,
            vec![
                Detection {
                    label: Label::Person,
                    bbox: BoundingBox::new(200.0, 120.0, 320.0, 330.0),
                    confidence: 0.62,
                },
                Detection {
                    label: Label::CardboardBox,
                    bbox: BoundingBox::new(240.0, 260.0, 310.0, 330.0),
                    confidence: 0.48,
                },
            ],
        )
    };
    let prowler_frame = DetectionFrame::with_detections(
        480.0,
        vec![Detection {
            label: Label::Person,
            bbox: BoundingBox::new(180.0, 60.0, 360.0, 420.0),
            confidence: 0.71,
        }],
    );

    // Tick-by-tick script: five sightings to confirm, a correct phrase,
    // an oversized package, a prowler, then a quiet frame
    let detector = ScriptedDetector::new(vec![
        Ok(courier_frame()),
        Ok(courier_frame()),
        Ok(courier_frame()),
        Ok(courier_frame()),
        Ok(courier_frame()),
        Ok(prowler_frame),
        Ok(DetectionFrame::empty(480.0)),
    ]);
    let oracle = ScriptedOracle::new()
        .push_intent(Ok(true))
        .push_verdict(Ok(PackageVerdict::TooBig));
    let mic = ScriptedMic::new([
        format!("the password is {} please", secret),
        "it is way too big to fit inside".to_string(),
    ]);

    let periphery = Periphery::new(
        DetectorHandle::new(Box::new(detector)),
        Box::new(oracle),
        Box::new(mic),
        Box::new(ConsoleVoice),
        build_link(args),
        build_ledger(args),
        Box::new(InstantPacer::new()),
    );

    let engine = WardenEngine::new(secret);
    let source = SyntheticFrames::new(640, 480).with_limit(9);
    let mut frame_loop = FrameLoop::new(engine, periphery, Box::new(source))
        .with_output(args.json, args.no_color, args.verbose);

    let summary = frame_loop.run();
    print_summary(&summary);
}
