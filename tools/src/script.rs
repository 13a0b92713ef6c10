//! Replay script parsing.
//!
//! One command per line; blank lines and `#` comments are skipped.

use anyhow::{anyhow, bail, Context, Result};
use imbridge_core::{keysyms, EventType, ModifierType, Rectangle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FocusIn,
    FocusOut,
    Window { x: i32, y: i32 },
    NoWindow,
    Cursor(Rectangle),
    /// Toolkit key event with a resolved keyval
    Key {
        event_type: EventType,
        keyval: u32,
        keycode: u32,
        state: ModifierType,
    },
    /// Raw key event, keycode only
    Raw {
        event_type: EventType,
        keycode: u32,
        state: ModifierType,
    },
    Button(u32),
    Set { key: String, value: bool },
    Reset,
    Preedit,
    UsePreedit(bool),
    Surrounding { text: String, cursor: i32 },
    GetSurrounding,
    /// Engine-side delete-surrounding request
    DeleteSurrounding { offset: i32, n_chars: i32 },
    /// Engine-side retrieve-surrounding request
    RetrieveSurrounding,
}

pub fn parse_script(content: &str) -> Result<Vec<Command>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_line(line).with_context(|| format!("line {}: {}", idx + 1, line)))
            }
        })
        .collect()
}

pub fn parse_line(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let args = &words[1..];

    let cmd = match words[0] {
        "focus-in" => Command::FocusIn,
        "focus-out" => Command::FocusOut,
        "window" => {
            expect_args(args, 2)?;
            Command::Window {
                x: parse_int(args[0])?,
                y: parse_int(args[1])?,
            }
        }
        "no-window" => Command::NoWindow,
        "cursor" => {
            expect_args(args, 4)?;
            Command::Cursor(Rectangle::new(
                parse_int(args[0])?,
                parse_int(args[1])?,
                parse_int(args[2])?,
                parse_int(args[3])?,
            ))
        }
        "key" => {
            if !(3..=4).contains(&args.len()) {
                bail!("usage: key press|release KEYVAL KEYCODE [mods]");
            }
            Command::Key {
                event_type: parse_event_type(args[0])?,
                keyval: parse_keyval(args[1])?,
                keycode: parse_uint(args[2])?,
                state: parse_mods(args.get(3).copied())?,
            }
        }
        "raw" => {
            if !(2..=3).contains(&args.len()) {
                bail!("usage: raw press|release KEYCODE [mods]");
            }
            Command::Raw {
                event_type: parse_event_type(args[0])?,
                keycode: parse_uint(args[1])?,
                state: parse_mods(args.get(2).copied())?,
            }
        }
        "button" => {
            expect_args(args, 1)?;
            Command::Button(parse_uint(args[0])?)
        }
        "set" => {
            expect_args(args, 2)?;
            Command::Set {
                key: args[0].to_string(),
                value: parse_bool(args[1])?,
            }
        }
        "reset" => Command::Reset,
        "preedit" => Command::Preedit,
        "use-preedit" => {
            expect_args(args, 1)?;
            Command::UsePreedit(parse_bool(args[0])?)
        }
        "surrounding" => {
            expect_args(args, 2)?;
            Command::Surrounding {
                text: args[0].to_string(),
                cursor: parse_int(args[1])?,
            }
        }
        "get-surrounding" => Command::GetSurrounding,
        "delete-surrounding" => {
            expect_args(args, 2)?;
            Command::DeleteSurrounding {
                offset: parse_int(args[0])?,
                n_chars: parse_int(args[1])?,
            }
        }
        "retrieve-surrounding" => Command::RetrieveSurrounding,
        other => bail!("unknown command '{}'", other),
    };
    Ok(cmd)
}

fn expect_args(args: &[&str], n: usize) -> Result<()> {
    if args.len() != n {
        bail!("expected {} argument(s), got {}", n, args.len());
    }
    Ok(())
}

fn parse_int(s: &str) -> Result<i32> {
    s.parse().with_context(|| format!("invalid integer '{}'", s))
}

fn parse_uint(s: &str) -> Result<u32> {
    s.parse().with_context(|| format!("invalid keycode/button '{}'", s))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => bail!("invalid boolean '{}'", s),
    }
}

fn parse_event_type(s: &str) -> Result<EventType> {
    match s {
        "press" => Ok(EventType::KeyPress),
        "release" => Ok(EventType::KeyRelease),
        _ => bail!("expected press or release, got '{}'", s),
    }
}

fn parse_mods(s: Option<&str>) -> Result<ModifierType> {
    match s {
        None => Ok(ModifierType::empty()),
        Some(s) => ModifierType::parse(s).ok_or_else(|| anyhow!("invalid modifiers '{}'", s)),
    }
}

/// Keyval as a single character, a `0x` hex value, or a key name.
fn parse_keyval(s: &str) -> Result<u32> {
    let named = match s {
        "space" => Some(keysyms::SPACE),
        "Return" => Some(keysyms::RETURN),
        "BackSpace" => Some(keysyms::BACKSPACE),
        "Escape" => Some(keysyms::ESCAPE),
        "Tab" => Some(keysyms::TAB),
        _ => None,
    };
    if let Some(keyval) = named {
        return Ok(keyval);
    }
    if let Some(hex) = s.strip_prefix("0x") {
        return u32::from_str_radix(hex, 16).with_context(|| format!("invalid keyval '{}'", s));
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(keysyms::from_char(ch)),
        _ => bail!("invalid keyval '{}'", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_commands() {
        assert_eq!(
            parse_line("key press a 38 shift").unwrap(),
            Command::Key {
                event_type: EventType::KeyPress,
                keyval: 'a' as u32,
                keycode: 38,
                state: ModifierType::SHIFT,
            }
        );
        assert_eq!(
            parse_line("raw release 36").unwrap(),
            Command::Raw {
                event_type: EventType::KeyRelease,
                keycode: 36,
                state: ModifierType::empty(),
            }
        );
        assert!(matches!(
            parse_line("key press 가 38").unwrap(),
            Command::Key { keyval: 0x0100_ac00, .. }
        ));
        assert!(matches!(
            parse_line("key press Return 36").unwrap(),
            Command::Key { keyval: keysyms::RETURN, .. }
        ));
    }

    #[test]
    fn skips_comments_and_reports_line_numbers() {
        let cmds = parse_script("# setup\nfocus-in\n\nwindow 10 20\n").unwrap();
        assert_eq!(cmds, vec![Command::FocusIn, Command::Window { x: 10, y: 20 }]);

        let err = parse_script("focus-in\ncursor 1 2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_line("bogus").is_err());
        assert!(parse_line("set hook-gdk-event-key maybe").is_err());
        assert!(parse_line("key press ab 38").is_err());
        assert!(parse_line("raw press 38 shift+nope").is_err());
    }
}
