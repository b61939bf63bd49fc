///// Otter: Mini-Entrypoint – Argumente, Muster-Kompilierung, Backend-Wahl, Exit-Codes.
///// Schneefuchs: stdout traegt nur die gefundene ID; alle Diagnose laeuft ueber term/stderr.
///// Maus: Kein process::exit aus der Tiefe; der Lauf liefert ein Ergebnis, main mappt es.
///// Datei: src/main.rs

mod cfgmgr;
mod cli;
#[cfg_attr(not(windows), allow(dead_code))]
mod devtree;
mod pattern;
mod term;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use cli::Cli;
use pattern::IdPattern;
use term::{enable_ansi, out_err, out_info};

const EXIT_OK: i32 = 0;
const EXIT_BAD_ARGUMENTS: i32 = 1;
const EXIT_NO_DEVICES_FOUND: i32 = 2;
const EXIT_NO_DEVICE_INFO: i32 = 3;

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(EXIT_OK);
        }
        Err(_) => {
            // Falsche Argumentform: Usage samt Beispielen nach stdout, Status 1.
            println!("{}", Cli::command().render_long_help());
            std::process::exit(EXIT_BAD_ARGUMENTS);
        }
    }
}

#[cfg(windows)]
fn run(device_id: &str, pattern: &IdPattern) -> i32 {
    use devtree::{find_matching_ancestor, WalkReport};

    match find_matching_ancestor(&cfgmgr::LiveDeviceTree, device_id, pattern) {
        Ok(WalkReport::Matched(id)) => {
            println!("{id}");
            EXIT_OK
        }
        Ok(WalkReport::NoAncestorMatched) => {
            out_info("TREE", "no ancestor matched the pattern");
            EXIT_OK
        }
        Ok(WalkReport::DeviceNotFound) => {
            out_info("TREE", &format!("no device with id {:?}", device_id));
            EXIT_NO_DEVICES_FOUND
        }
        Err(e) => {
            out_err("TREE", &e.to_string());
            EXIT_NO_DEVICE_INFO
        }
    }
}

#[cfg(not(windows))]
fn run(_device_id: &str, _pattern: &IdPattern) -> i32 {
    out_err("TREE", "no live device tree on this platform (Windows only)");
    EXIT_NO_DEVICE_INFO
}

fn main() {
    enable_ansi();
    let cli = parse_args();

    // Muster zuerst: Syntaxfehler muessen vor jeder Enumeration auffallen.
    let pattern = match IdPattern::compile(&cli.pattern) {
        Ok(p) => p,
        Err(msg) => {
            out_err("ARGS", &msg);
            std::process::exit(EXIT_BAD_ARGUMENTS);
        }
    };

    out_info("ARGS", &format!("device_id={:?} pattern={:?}", cli.device_id, cli.pattern));
    std::process::exit(run(&cli.device_id, &pattern));
}
