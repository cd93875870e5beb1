use ansi_term::{Colour, Style};
use log::Level;
use std::fmt;

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

fn colour_for(level: Level) -> Colour {
    match level {
        Level::Error => Colour::Red,
        Level::Warn => Colour::Yellow,
        Level::Info => Colour::Blue,
        Level::Debug | Level::Trace => Colour::Fixed(244), // grey
    }
}

/// Print an already-timestamped log line; errors go to stderr.
pub fn echo(level: Level, line: &str) {
    let painted = colour_for(level).paint(line);
    if level == Level::Error {
        eprintln!("{painted}");
    } else {
        println!("{painted}");
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", Style::new().bold().fg(Colour::Blue).paint(ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", Style::new().bold().fg(Colour::Green).paint(ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", Style::new().bold().fg(Colour::Yellow).paint(ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", Style::new().bold().fg(Colour::Red).paint(ICON_ERR), msg);
}
