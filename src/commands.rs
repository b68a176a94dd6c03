//! Line-oriented control commands read by the binary.

use std::str::FromStr;

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Capture,
	Exclude(String),
	Reset,
	Status,
	Quit,
}

impl FromStr for Command {
	type Err = Error;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let line = line.trim();
		let (verb, rest) = match line.split_once(char::is_whitespace) {
			Some((verb, rest)) => (verb, rest.trim()),
			None => (line, ""),
		};

		match (verb.to_ascii_lowercase().as_str(), rest) {
			("capture" | "c", "") => Ok(Command::Capture),
			("reset" | "r", "") => Ok(Command::Reset),
			("status" | "s", "") => Ok(Command::Status),
			("quit" | "q", "") => Ok(Command::Quit),
			("exclude" | "x", name) if !name.is_empty() => Ok(Command::Exclude(name.to_string())),
			_ => Err(Error::Command(line.to_string())),
		}
	}
}
