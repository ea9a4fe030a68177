//! Preserve heap CLI
//!
//! Inspect, check and render heaps in the JSON wire form.

use preserve::commands::{check, inspect, load_heap, pack, read_file, render, stats, RealmChoice};
use preserve::init_tracing;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    tracing::debug!(command = command.as_str(), "running command");

    match command.as_str() {
        "inspect" => {
            let path = require_path(&args, "Usage: preserve inspect <heap.json>");
            print!("{}", inspect(&load_heap(path)));
        }
        "stats" => {
            let path = require_path(&args, "Usage: preserve stats <heap.json>");
            print!("{}", stats(&load_heap(path)));
        }
        "check" => {
            let usage = "Usage: preserve check <heap.json> [--realm=standard|bare]";
            let (path, realm) = path_and_realm(&args, usage);
            let heap = load_heap(path);
            match check(&heap, &realm.realm()) {
                Ok(report) => print!("{report}"),
                Err(e) => fail(&format!("{path}: {e}")),
            }
        }
        "render" => {
            let usage = "Usage: preserve render <heap.json> [--realm=standard|bare]";
            let (path, realm) = path_and_realm(&args, usage);
            let heap = load_heap(path);
            match render(&heap, &realm.realm()) {
                Ok(text) => print!("{text}"),
                Err(e) => fail(&format!("{path}: {e}")),
            }
        }
        "pack" => {
            let usage = "Usage: preserve pack <value.json> [--realm=standard|bare]";
            let (path, realm) = path_and_realm(&args, usage);
            match pack(&read_file(path), &realm.realm()) {
                Ok(text) => print!("{text}"),
                Err(e) => fail(&format!("{path}: {e}")),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("preserve {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("error: {msg}");
    std::process::exit(1);
}

fn require_path<'a>(args: &'a [String], usage: &str) -> &'a str {
    match args.get(2) {
        Some(path) if !path.starts_with('-') => path.as_str(),
        _ => {
            eprintln!("{usage}");
            std::process::exit(1);
        }
    }
}

/// The file argument plus an optional `--realm=` flag, in either order.
fn path_and_realm<'a>(args: &'a [String], usage: &str) -> (&'a str, RealmChoice) {
    let mut path = None;
    let mut realm = RealmChoice::default();
    for arg in args.iter().skip(2) {
        if let Some(value) = arg.strip_prefix("--realm=") {
            let Some(choice) = RealmChoice::from_flag(value) else {
                eprintln!("error: unknown realm '{value}' (expected 'standard' or 'bare')");
                std::process::exit(1);
            };
            realm = choice;
        } else if !arg.starts_with('-') && path.is_none() {
            path = Some(arg.as_str());
        } else {
            eprintln!("error: unexpected argument '{arg}'");
            eprintln!("{usage}");
            std::process::exit(1);
        }
    }
    let Some(path) = path else {
        eprintln!("error: missing file path");
        eprintln!("{usage}");
        std::process::exit(1);
    };
    (path, realm)
}

fn print_usage() {
    println!("preserve: flat heap encoding for cyclic values");
    println!();
    println!("Usage: preserve <command> [options]");
    println!();
    println!("Commands:");
    println!("  inspect <heap.json>   List every record: slot, type, payload");
    println!("  stats <heap.json>     Count records per type");
    println!("  check <heap.json>     Validate references and decode, reporting fallbacks");
    println!("  render <heap.json>    Decode and print the value");
    println!("  pack <value.json>     Encode a plain JSON document as a heap");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Options:");
    println!("  --realm=<name>        Realm for check/render/pack: standard (default), bare");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=preserve_codec=trace) to trace encode/decode.");
}
