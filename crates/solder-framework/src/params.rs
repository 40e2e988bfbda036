//! Injected parameter types derived from the event payload.

use std::ops::Deref;

/// Ordered command arguments, ready for injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs(Vec<String>);

impl CommandArgs {
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    /// The argument at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl Deref for CommandArgs {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for CommandArgs {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<'a> IntoIterator for &'a CommandArgs {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The parsed command line of a message.
///
/// `/echo@somebot hello world` parses to `command = "echo"`,
/// `raw_command = "/echo@somebot"`, `args = ["hello", "world"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// Command without the `/` prefix or `@botname` suffix.
    pub command: String,
    /// Whitespace-separated arguments after the command.
    pub args: CommandArgs,
    /// The full original text.
    pub raw_text: String,
    /// The command token as typed, prefix and suffix included.
    pub raw_command: String,
}

impl CommandContext {
    /// Splits `text` on whitespace and interprets the first token as the
    /// command. An empty or blank text yields an empty context with only
    /// `raw_text` set.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let Some(raw_command) = parts.next() else {
            return Self {
                raw_text: text.to_string(),
                ..Self::default()
            };
        };

        let bare = raw_command.strip_prefix('/').unwrap_or(raw_command);
        let command = match bare.find('@') {
            Some(at) => &bare[..at],
            None => bare,
        };

        Self {
            command: command.to_string(),
            args: CommandArgs(parts.map(str::to_string).collect()),
            raw_text: text.to_string(),
            raw_command: raw_command.to_string(),
        }
    }

    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Payload of a callback query, newtyped for unambiguous injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackData(pub String);

impl Deref for CallbackData {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CallbackData {
    fn from(data: String) -> Self {
        Self(data)
    }
}

crate::injectable!(CommandContext, CommandArgs, CallbackData);
