//! Simple TOML parser for desk configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `desk.toml`. It does NOT handle full TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, hex integer)
//! - [uart], [timing] and [buttons] section headers
//! - Single-line integer arrays for key payloads: up = [0x01, 0x00]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Inline tables
//! - Dotted keys

use heapless::Vec;
use standdesk_protocol::{Button, ButtonCommand, MAX_PAYLOAD_SIZE};

use super::types::DeskConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Unknown key in a section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Key payload longer than a frame can carry
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Uart,
    Timing,
    Buttons,
}

/// Parse TOML configuration into DeskConfig
///
/// Keys that are absent keep their defaults.
pub fn parse_config(input: &str) -> Result<DeskConfig, ParseError> {
    let mut config = DeskConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let end = line.find(']').ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(&line[1..end])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "uart" => Ok(Section::Uart),
        "timing" => Ok(Section::Timing),
        "buttons" => Ok(Section::Buttons),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse a decimal or `0x` hex integer
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let value = value.trim();
    let raw = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    }
    .map_err(|_| ParseError::InvalidValue)?;
    T::try_from(raw).map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio0" or a bare pin number
fn parse_pin(value: &str) -> Result<u8, ParseError> {
    let value = parse_string(value);
    let number = value.strip_prefix("gpio").unwrap_or(value);
    number.parse().map_err(|_| ParseError::InvalidPin)
}

/// Parse a key payload array like `[0x01, 0x00]`
fn parse_payload(value: &str) -> Result<Vec<u8, MAX_PAYLOAD_SIZE>, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut payload = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        payload
            .push(parse_int(item)?)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(payload)
}

/// Apply a key-value pair to the current section
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeskConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Uart => match key {
            "baud" | "baud_rate" => config.uart.baud_rate = parse_int(value)?,
            "tx_pin" => config.uart.tx_pin = parse_pin(value)?,
            "rx_pin" => config.uart.rx_pin = parse_pin(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Timing => {
            let timing = &mut config.timing;
            let slot = match key {
                "poll_interval_ms" => &mut timing.poll_interval_ms,
                "link_timeout_ms" => &mut timing.link_timeout_ms,
                "debounce_ms" => &mut timing.debounce_ms,
                "timer_tick_ms" => &mut timing.timer_tick_ms,
                "alarm_retry_ms" => &mut timing.alarm_retry_ms,
                "malformed_log_interval_ms" => &mut timing.malformed_log_interval_ms,
                _ => return Err(ParseError::UnknownKey),
            };
            *slot = parse_int(value)?;
        }
        Section::Buttons => {
            let button = Button::from_name(key).ok_or(ParseError::UnknownKey)?;
            let payload = parse_payload(value)?;
            if payload.is_empty() {
                // Empty array unbinds the button
                config.buttons.unbind(button);
            } else {
                let command = ButtonCommand::new(button, &payload)
                    .map_err(|_| ParseError::TooManyItems)?;
                config.buttons.bind(command);
            }
        }
        Section::Root => return Err(ParseError::UnknownKey),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("\"gpio4\""), Ok(4));
        assert_eq!(parse_pin("gpio17"), Ok(17));
        assert_eq!(parse_pin("5"), Ok(5));
        assert_eq!(parse_pin("\"pa9\""), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<u8>("0x40"), Ok(0x40));
        assert_eq!(parse_int::<u32>("9600"), Ok(9600));
        assert_eq!(parse_int::<u8>("256"), Err(ParseError::InvalidValue));
        assert_eq!(parse_int::<u8>("-1"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload("[0x01, 0x00]").unwrap().as_slice(), &[0x01, 0x00]);
        assert_eq!(parse_payload("[1, 2,]").unwrap().as_slice(), &[1, 2]);
        assert!(parse_payload("[]").unwrap().is_empty());
        assert_eq!(parse_payload("0x01"), Err(ParseError::InvalidValue));
        assert_eq!(
            parse_payload("[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]"),
            Err(ParseError::TooManyItems)
        );
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), DeskConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Desk on UART1
[uart]
baud_rate = 9600
tx_pin = "gpio4"
rx_pin = "gpio5"   # from the handset

[timing]
poll_interval_ms = 250
link_timeout_ms = 750

[buttons]
memory = [0x20, 0x01]
preset3 = []
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.uart.tx_pin, 4);
        assert_eq!(config.uart.rx_pin, 5);
        assert_eq!(config.timing.poll_interval_ms, 250);
        assert_eq!(config.timing.link_timeout_ms, 750);
        assert_eq!(config.timing.debounce_ms, 1000);
        assert_eq!(
            config.buttons.get(Button::Memory).unwrap().payload.as_slice(),
            &[0x20, 0x01]
        );
        assert!(config.buttons.get(Button::Preset3).is_none());
        assert_eq!(
            config.buttons.get(Button::Up).unwrap().payload.as_slice(),
            &[0x01, 0x00]
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_baud_alias_checked_like_baud_rate() {
        let config = parse_config("[uart]\nbaud = 19200").unwrap();
        assert_eq!(config.uart.baud_rate, 19200);
        assert_eq!(config.validate(), Ok(()));

        let config = parse_config("[uart]\nbaud = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidBaudRate));

        let config = parse_config("[uart]\nbaud_rate = 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidBaudRate));

        assert_eq!(parse_config("[uart]\nbaud = fast"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_config("[display]"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[uart]\nparity = 1"), Err(ParseError::UnknownKey));
        assert_eq!(parse_config("[buttons]\nsit = [1]"), Err(ParseError::UnknownKey));
        assert_eq!(parse_config("baud_rate = 9600"), Err(ParseError::UnknownKey));
        assert_eq!(parse_config("[timing]\ndebounce_ms"), Err(ParseError::InvalidLine));
        assert_eq!(
            parse_config("[timing]\ndebounce_ms = soon"),
            Err(ParseError::InvalidValue)
        );
    }
}
