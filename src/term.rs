///// Otter: Terminal helpers (ANSI enable, pretty tags) – Diagnose NUR auf stderr.
///// Schneefuchs: No external crates; Windows FFI zu kernel32; stdout bleibt maschinenlesbar.
///// Maus: GPD_COLOR=0 -> keine Farben; GPD_LOG=1 -> Info-Zeilen; Warn/Err immer; ASCII-only.
///// Datei: src/term.rs

use std::env;
use std::io::{self, Write};

/// Aktiviert ANSI-Sequenzen fuer stderr – ohne externe Crates.
/// Auf Windows via direktem FFI zu kernel32; auf anderen Plattformen no-op.
pub fn enable_ansi() {
    #[cfg(windows)]
    unsafe {
        // Minimaler FFI-Sockel, keine winapi/windows-Crates.
        use std::ffi::c_void;
        type HANDLE = *mut c_void;
        type DWORD = u32;
        type BOOL = i32;

        const STD_ERROR_HANDLE: i32 = -12; // (DWORD)-12
        const ENABLE_VIRTUAL_TERMINAL_PROCESSING: DWORD = 0x0004;

        #[link(name = "kernel32")]
        extern "system" {
            fn GetStdHandle(nStdHandle: i32) -> HANDLE;
            fn GetConsoleMode(hConsoleHandle: HANDLE, lpMode: *mut DWORD) -> BOOL;
            fn SetConsoleMode(hConsoleHandle: HANDLE, dwMode: DWORD) -> BOOL;
        }

        let h = GetStdHandle(STD_ERROR_HANDLE);
        if !h.is_null() {
            let mut mode: DWORD = 0;
            if GetConsoleMode(h, &mut mode) != 0 {
                let _ = SetConsoleMode(h, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING);
            }
        }
    }
    #[cfg(not(windows))]
    {
        // nix zu tun
    }
}

/// Farben global aktiv?
/// GPD_COLOR=0 -> aus; alles andere -> an (Default).
pub fn color_enabled() -> bool {
    !matches!(env::var("GPD_COLOR"), Ok(v) if v.trim() == "0")
}

/// Info-Zeilen nur auf Wunsch (GPD_LOG=1); Warn/Err laufen immer.
pub fn verbose_enabled() -> bool {
    matches!(env::var("GPD_LOG"), Ok(v) if v.trim() == "1")
}

// ANSI Codes (nur verwenden, wenn color_enabled()).
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

fn paint(s: &str, code: &str) -> String {
    if color_enabled() { format!("{code}{s}{RESET}") } else { s.to_string() }
}

fn tag_colored(s: &str) -> String {
    paint(&format!("[{}]", s), CYAN)
}

pub fn out_info(src: &str, msg: &str) {
    if !verbose_enabled() {
        return;
    }
    let t = tag_colored(src);
    let m = msg.trim_end_matches('\n');
    let _ = writeln!(io::stderr(), "{} {}", t, m);
}

pub fn out_warn(src: &str, msg: &str) {
    let t = tag_colored(src);
    let m = paint(msg.trim_end_matches('\n'), YELLOW);
    let _ = writeln!(io::stderr(), "{} {}", t, m);
}

pub fn out_err(src: &str, msg: &str) {
    let t = tag_colored(src);
    let m = paint(msg.trim_end_matches('\n'), RED);
    let _ = writeln!(io::stderr(), "{} {}", t, m);
}
