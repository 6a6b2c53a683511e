//! Build script for standdesk-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates desk.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest key payload a frame can carry
const MAX_KEY_PAYLOAD: usize = 9;

const BUTTONS: [&str; 7] = [
    "up", "down", "preset1", "preset2", "preset3", "memory", "timer",
];

const TIMING_KEYS: [&str; 6] = [
    "poll_interval_ms",
    "link_timeout_ms",
    "debounce_ms",
    "timer_tick_ms",
    "alarm_retry_ms",
    "malformed_log_interval_ms",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate desk.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=desk.toml");

    let config_path = Path::new("desk.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: desk.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds desk.toml as its configuration.             ║\n\
            ║  Please create one in the standdesk-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read desk.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in desk.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_uart(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_buttons(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in desk.toml                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=desk.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only [uart], [timing] and [buttons] tables are understood
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let table = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (name, value) in table {
        if !["uart", "timing", "buttons"].contains(&name.as_str()) {
            errors.push(format!("Unknown section or key '{}'", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_uart(config: &toml::Value, errors: &mut Vec<String>) {
    let uart = match config.get("uart").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    for key in ["baud", "baud_rate"] {
        if let Some(baud) = uart.get(key) {
            match baud.as_integer() {
                Some(b) if b > 0 && b <= u32::MAX as i64 => {
                    if b != 9600 {
                        println!("cargo:warning=desk.toml: {} {} differs from the 9600 handset bus", key, b);
                    }
                }
                _ => errors.push(format!("[uart] {} must be a positive integer", key)),
            }
        }
    }

    let mut pins = Vec::new();
    for key in ["tx_pin", "rx_pin"] {
        if let Some(value) = uart.get(key) {
            match parse_pin(value) {
                Some(pin) => pins.push(pin),
                None => errors.push(format!("[uart] {} must be \"gpioN\" with N in 0-29", key)),
            }
        }
    }
    if pins.len() == 2 && pins[0] == pins[1] {
        errors.push("[uart] tx_pin and rx_pin must differ".to_string());
    }

    for key in uart.keys() {
        if !["baud", "baud_rate", "tx_pin", "rx_pin"].contains(&key.as_str()) {
            errors.push(format!("[uart] unknown key '{}'", key));
        }
    }
}

/// Parse a pin value like "gpio4" or 4
fn parse_pin(value: &toml::Value) -> Option<u8> {
    let pin = match value {
        toml::Value::Integer(n) => *n,
        toml::Value::String(s) => s.strip_prefix("gpio").unwrap_or(s.as_str()).parse().ok()?,
        _ => return None,
    };
    (0..=29).contains(&pin).then_some(pin as u8)
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let timing = match config.get("timing").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    for (key, value) in timing {
        if !TIMING_KEYS.contains(&key.as_str()) {
            errors.push(format!("[timing] unknown key '{}'", key));
            continue;
        }
        match value.as_integer() {
            Some(ms) if ms >= 0 && ms <= u32::MAX as i64 => {}
            _ => errors.push(format!("[timing] {} must be a non-negative integer", key)),
        }
    }

    let get = |key: &str| timing.get(key).and_then(|v| v.as_integer());
    if get("poll_interval_ms") == Some(0) {
        errors.push("[timing] poll_interval_ms must be greater than 0".to_string());
    }
    if get("timer_tick_ms") == Some(0) {
        errors.push("[timing] timer_tick_ms must be greater than 0".to_string());
    }
    let poll = get("poll_interval_ms").unwrap_or(500);
    let link = get("link_timeout_ms").unwrap_or(1000);
    if link < poll {
        errors.push("[timing] link_timeout_ms must be at least poll_interval_ms".to_string());
    }
}

fn validate_buttons(config: &toml::Value, errors: &mut Vec<String>) {
    let buttons = match config.get("buttons").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    for (name, value) in buttons {
        if !BUTTONS.contains(&name.as_str()) {
            errors.push(format!("[buttons] unknown button '{}'", name));
            continue;
        }

        let payload = match value.as_array() {
            Some(a) => a,
            None => {
                errors.push(format!("[buttons] {} must be an array of bytes", name));
                continue;
            }
        };

        if payload.len() > MAX_KEY_PAYLOAD {
            errors.push(format!(
                "[buttons] {} has {} bytes, max {}",
                name,
                payload.len(),
                MAX_KEY_PAYLOAD
            ));
        }

        let all_bytes = payload
            .iter()
            .all(|b| matches!(b.as_integer(), Some(n) if (0..=255).contains(&n)));
        if !all_bytes {
            errors.push(format!("[buttons] {} values must be 0-255", name));
        }
    }
}
