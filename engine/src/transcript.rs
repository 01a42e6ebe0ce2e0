//! Locating command output blocks inside a console transcript.
//!
//! A transcript is the captured text of a console session: prompt lines of
//! the form `<node-id>> <command>` followed by whatever the command printed.
//! A block is every line after one prompt up to the next prompt line.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static PATTERNS: LazyLock<TranscriptPatterns> = LazyLock::new(TranscriptPatterns::new);

struct TranscriptPatterns {
    prompt: Regex,
    command_stamp: Regex,
    log_file_date: Regex,
}

impl TranscriptPatterns {
    fn new() -> Self {
        Self {
            // RNC01> alt, 10.1.2.3> st m3ua, RNC01>  (empty command)
            prompt: Regex::new(r"(?m)^[\w.]+> ?(.*)$").expect("static regex must compile"),
            // 240315-10:22:33 printed by the console at the start of each command
            command_stamp: Regex::new(r"(\d{6})-\d{2}:\d{2}:\d{2}")
                .expect("static regex must compile"),
            log_file_date: Regex::new(r"Logging to file \S*/(\d{4}-\d{2}-\d{2})")
                .expect("static regex must compile"),
        }
    }
}

/// The command (or set of alternative commands) a check looks for.
///
/// Alternatives are tried in declared order; the first one that equals an
/// issued command is reported as the match.
///
/// # Examples
///
/// ```
/// use node_health_engine::transcript::CommandSpec;
///
/// let spec = CommandSpec::alternatives(&["get Synchronization=1", "st tusync"]);
/// assert_eq!(spec.matches("st tusync"), Some("st tusync"));
/// assert_eq!(spec.matches("st m3ua"), None);
/// assert_eq!(spec.to_string(), "get Synchronization=1 | st tusync");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    Single(String),
    Alternatives(Vec<String>),
}

impl CommandSpec {
    pub fn single(command: &str) -> Self {
        Self::Single(command.to_string())
    }

    pub fn alternatives(commands: &[&str]) -> Self {
        Self::Alternatives(commands.iter().map(|c| c.to_string()).collect())
    }

    /// Commands in declared order.
    pub fn commands(&self) -> Vec<&str> {
        match self {
            Self::Single(command) => vec![command.as_str()],
            Self::Alternatives(commands) => commands.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the first declared command equal to `issued` (whitespace-trimmed).
    pub fn matches(&self, issued: &str) -> Option<&str> {
        let issued = issued.trim();
        self.commands().into_iter().find(|command| *command == issued)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.commands().join(" | "))
    }
}

/// Output of one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Command as issued at the prompt.
    pub command: &'a str,
    /// 1-based line number of the prompt line.
    pub line: usize,
    /// Output text without trailing line breaks; empty when the command
    /// printed nothing.
    pub text: &'a str,
}

impl<'a> Block<'a> {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First `YYMMDD` stamp of the form `240315-10:22:33` in the block.
    pub fn date_of(&self) -> Option<&'a str> {
        PATTERNS
            .command_stamp
            .captures(self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Result of looking a command up in a transcript.
///
/// `NotFound` means the command was never issued; `Found` with an empty
/// block means it was issued and printed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockLookup<'a> {
    NotFound,
    Found(Vec<Block<'a>>),
}

impl<'a> BlockLookup<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn blocks(&self) -> &[Block<'a>] {
        match self {
            Self::NotFound => &[],
            Self::Found(blocks) => blocks,
        }
    }
}

#[derive(Debug, Clone)]
struct Prompt {
    line: usize,
    line_start: usize,
    body_start: usize,
    command: String,
}

/// One raw transcript with its prompt lines indexed.
///
/// # Examples
///
/// ```
/// use node_health_engine::transcript::{BlockLookup, CommandSpec, TranscriptStore};
///
/// let store = TranscriptStore::new("RNC01> st m3ua\nsome output\nRNC01> cvls\nRNC01> \n");
///
/// let blocks = store.find_blocks(&CommandSpec::single("st m3ua"));
/// assert_eq!(blocks.blocks()[0].text, "some output");
///
/// // Issued but silent
/// let empty = store.find_blocks(&CommandSpec::single("cvls"));
/// assert!(empty.is_found() && empty.blocks()[0].is_empty());
///
/// // Never issued
/// assert_eq!(store.find_blocks(&CommandSpec::single("std")), BlockLookup::NotFound);
/// ```
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    text: String,
    prompts: Vec<Prompt>,
}

impl TranscriptStore {
    /// CRLF captures are normalised to `\n` so block patterns see one line
    /// ending.
    pub fn new(text: &str) -> Self {
        let text = text.replace("\r\n", "\n");
        let mut prompts = Vec::new();
        let mut line = 1;
        let mut counted_to = 0;

        for caps in PATTERNS.prompt.captures_iter(&text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            line += text[counted_to..whole.start()].matches('\n').count();
            counted_to = whole.start();

            let body_start = text[whole.end()..]
                .find('\n')
                .map_or(text.len(), |offset| whole.end() + offset + 1);
            prompts.push(Prompt {
                line,
                line_start: whole.start(),
                body_start,
                command: caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
            });
        }

        Self { text, prompts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Commands issued in the transcript, in order.
    pub fn issued_commands(&self) -> impl Iterator<Item = &str> {
        self.prompts
            .iter()
            .map(|p| p.command.as_str())
            .filter(|c| !c.is_empty())
    }

    /// Returns every block produced by a command matching `spec`.
    pub fn find_blocks(&self, spec: &CommandSpec) -> BlockLookup<'_> {
        let blocks = self
            .prompts
            .iter()
            .enumerate()
            .filter_map(|(idx, prompt)| {
                spec.matches(&prompt.command)?;
                let end = self
                    .prompts
                    .get(idx + 1)
                    .map_or(self.text.len(), |next| next.line_start);
                let start = prompt.body_start.min(end);
                Some(Block {
                    command: prompt.command.as_str(),
                    line: prompt.line,
                    text: self.text[start..end].trim_end_matches(['\r', '\n']),
                })
            })
            .collect::<Vec<_>>();

        if blocks.is_empty() {
            BlockLookup::NotFound
        } else {
            BlockLookup::Found(blocks)
        }
    }

    /// Raw `YYYY-MM-DD` from a `Logging to file .../<date>` line.
    pub fn log_date_label(&self) -> Option<&str> {
        PATTERNS
            .log_file_date
            .captures(&self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Report date announced by the `Logging to file` line.
    pub fn report_date(&self) -> Option<NaiveDate> {
        self.log_date_label()
            .and_then(|label| NaiveDate::parse_from_str(label, "%Y-%m-%d").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "\
Logging to file /home/ops/moshell_logfiles/logs_moshell/tempfiles/2024-03-15
RNC01> st m3ua
240315-10:22:33 10.1.1.1 9.0k RNC_NODE_MODEL stopfile=/tmp/1
first
RNC01> lgd

RNC01> st m3ua
240316-08:00:00 10.1.1.1 9.0k RNC_NODE_MODEL stopfile=/tmp/1
second
RNC01> q
";

    #[test]
    fn test_finds_repeated_blocks_in_order() {
        let store = TranscriptStore::new(TRANSCRIPT);
        let lookup = store.find_blocks(&CommandSpec::single("st m3ua"));
        let blocks = lookup.blocks();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text.ends_with("first"));
        assert!(blocks[1].text.ends_with("second"));
        assert_eq!(blocks[0].line, 2);
        assert_eq!(blocks[1].line, 7);
        assert_eq!(blocks[0].date_of(), Some("240315"));
        assert_eq!(blocks[1].date_of(), Some("240316"));
    }

    #[test]
    fn test_crlf_transcript_reads_like_lf() {
        let store = TranscriptStore::new(&TRANSCRIPT.replace('\n', "\r\n"));
        let lookup = store.find_blocks(&CommandSpec::single("st m3ua"));
        let blocks = lookup.blocks();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].text.contains('\r'));
        assert!(blocks[0].text.ends_with("\nfirst"));
        assert_eq!(blocks[1].line, 7);
        assert_eq!(blocks[1].date_of(), Some("240316"));
        assert_eq!(store.log_date_label(), Some("2024-03-15"));
    }

    #[test]
    fn test_found_but_empty_block() {
        let store = TranscriptStore::new(TRANSCRIPT);
        let lookup = store.find_blocks(&CommandSpec::single("lgd"));
        assert!(lookup.is_found());
        assert!(lookup.blocks()[0].is_empty());
        assert_eq!(lookup.blocks()[0].date_of(), None);
    }

    #[test]
    fn test_not_found() {
        let store = TranscriptStore::new(TRANSCRIPT);
        assert_eq!(
            store.find_blocks(&CommandSpec::single("alt")),
            BlockLookup::NotFound
        );
    }

    #[test]
    fn test_alternatives_match_any_declared_command() {
        let store = TranscriptStore::new("RNC01> st tusync\nTuSync=1 enabled\n");
        let spec = CommandSpec::alternatives(&["get Synchronization=1", "st tusync"]);
        let lookup = store.find_blocks(&spec);
        assert_eq!(lookup.blocks()[0].command, "st tusync");
        assert_eq!(lookup.blocks()[0].text, "TuSync=1 enabled");
    }

    #[test]
    fn test_command_must_match_exactly() {
        let store = TranscriptStore::new("RNC01> st m3uafoo\nx\n");
        assert!(!store.find_blocks(&CommandSpec::single("st m3ua")).is_found());
    }

    #[test]
    fn test_output_lines_with_angle_brackets_are_not_prompts() {
        let store =
            TranscriptStore::new("RNC01> alt\n>>> Total: 0 Alarms (0 Critical, 0 Major)\n$ lhsh 001400 readclock\n");
        let lookup = store.find_blocks(&CommandSpec::single("alt"));
        assert_eq!(
            lookup.blocks()[0].text,
            ">>> Total: 0 Alarms (0 Critical, 0 Major)\n$ lhsh 001400 readclock"
        );
    }

    #[test]
    fn test_report_date() {
        let store = TranscriptStore::new(TRANSCRIPT);
        assert_eq!(store.log_date_label(), Some("2024-03-15"));
        assert_eq!(
            store.report_date(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(TranscriptStore::new("RNC01> alt\n").report_date(), None);
    }

    #[test]
    fn test_issued_commands_skip_empty_prompts() {
        let store = TranscriptStore::new("RNC01> alt\nRNC01> \nRNC01> std\n");
        assert_eq!(store.issued_commands().collect::<Vec<_>>(), vec!["alt", "std"]);
    }
}
