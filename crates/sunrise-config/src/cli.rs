//! Command-line argument parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser};

use crate::Config;

/// Tick intervals selected by `-s`, `-ss` and `-sss`.
const SPEED_INTERVALS_MS: [u64; 3] = [30, 20, 10];

/// Sunrise command-line arguments.
///
/// The single-letter flags are order-independent and may be clustered
/// (`-dm`). Long options override values loaded from a config file.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "sunrise", about = "Sunrise, stars, milky way and sparks")]
pub struct CliArgs {
    /// Show the debug overlay.
    #[arg(short = 'd')]
    pub debug: bool,

    /// Start in fullscreen.
    #[arg(short = 'f')]
    pub fullscreen: bool,

    /// Run faster: -s, -ss or -sss.
    #[arg(short = 's', action = ArgAction::Count)]
    pub speed: u8,

    /// Hide the moon.
    #[arg(short = 'm')]
    pub no_moon: bool,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Fixed seed for the procedural fields.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to a RON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, dropping anything clap rejects instead of failing.
    ///
    /// Offending tokens are removed one at a time and parsing is retried. If a
    /// rejection cannot be traced back to a token, defaults are returned.
    /// `--help` still prints usage and exits.
    pub fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut tokens: Vec<OsString> = args.into_iter().map(Into::into).collect();
        loop {
            let err = match Self::try_parse_from(&tokens) {
                Ok(parsed) => return parsed,
                Err(err) => err,
            };
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            if !drop_offending(&mut tokens, &err) {
                log::debug!("Ignoring command line: {}", err.kind());
                return Self::default();
            }
        }
    }

    /// Tick interval selected by `-s` flags, if any.
    pub fn speed_interval_ms(&self) -> Option<u64> {
        match self.speed {
            0 => None,
            n => Some(SPEED_INTERVALS_MS[(usize::from(n) - 1).min(SPEED_INTERVALS_MS.len() - 1)]),
        }
    }
}

/// Remove the token clap complained about. Returns `false` if none was found.
fn drop_offending(tokens: &mut Vec<OsString>, err: &clap::Error) -> bool {
    let Some(ContextValue::String(invalid)) = err.get(ContextKind::InvalidArg) else {
        return false;
    };
    // Value errors report the arg as "--width <WIDTH>".
    let name = invalid.split_whitespace().next().unwrap_or(invalid.as_str());
    let with_value = format!("{name}=");

    let Some(index) = tokens.iter().skip(1).position(|t| {
        let t = t.to_string_lossy();
        t == name || t.starts_with(&with_value)
    }) else {
        return drop_from_cluster(tokens, name);
    };
    let index = index + 1;

    let takes_value = matches!(
        err.kind(),
        ErrorKind::ValueValidation | ErrorKind::InvalidValue
    );
    let inline = tokens[index].to_string_lossy().contains('=');
    log::debug!("Ignoring unrecognized argument {name}");
    tokens.remove(index);
    if takes_value && !inline && index < tokens.len() {
        tokens.remove(index);
    }
    true
}

/// Remove an unknown short flag from a cluster such as `-dx`, keeping the
/// other letters. Returns `false` if no cluster holds it.
fn drop_from_cluster(tokens: &mut Vec<OsString>, name: &str) -> bool {
    let mut chars = name.chars();
    let (Some('-'), Some(letter), None) = (chars.next(), chars.next(), chars.next()) else {
        return false;
    };
    let Some(index) = tokens.iter().skip(1).position(|t| {
        let t = t.to_string_lossy();
        t.starts_with('-') && !t.starts_with("--") && t[1..].contains(letter)
    }) else {
        return false;
    };
    let index = index + 1;

    let cluster = tokens[index].to_string_lossy().into_owned();
    let mut rest = String::from("-");
    let mut dropped = false;
    for c in cluster[1..].chars() {
        if c == letter && !dropped {
            dropped = true;
        } else {
            rest.push(c);
        }
    }
    log::debug!("Ignoring unrecognized flag {name} in {cluster}");
    if rest == "-" {
        tokens.remove(index);
    } else {
        tokens[index] = rest.into();
    }
    true
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if args.debug {
            self.debug.overlay = true;
        }
        if args.fullscreen {
            self.window.fullscreen = true;
        }
        if let Some(ms) = args.speed_interval_ms() {
            self.animation.tick_interval_ms = ms;
        }
        if args.no_moon {
            self.animation.moon_enabled = false;
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.field.seed = Some(seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
