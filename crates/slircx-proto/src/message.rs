//! IRC message and prefix types.
//!
//! [`Message`] is the unit the codec produces and consumes: an optional
//! source prefix, a command key, middle parameters, and an optional
//! trailing free-text parameter. Fields are public; helper constructors
//! cover the messages a client sends in practice.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// The source of a relayed message: `name`, `name@host`, or
/// `name!user@host`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    /// Nickname or server name.
    pub name: String,
    /// Username portion, when present.
    pub user: Option<String>,
    /// Host portion, when present.
    pub host: Option<String>,
}

impl Prefix {
    /// Create a prefix carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: None,
            host: None,
        }
    }

    /// Parse the prefix portion of a line (without the leading `:`).
    ///
    /// Never fails: input that matches none of the separator forms is
    /// treated as a bare name.
    pub fn parse(raw: &str) -> Self {
        if let Some((name, rest)) = raw.split_once('!') {
            let (user, host) = match rest.split_once('@') {
                Some((user, host)) => (user, Some(host)),
                None => (rest, None),
            };
            return Self {
                name: name.to_string(),
                user: Some(user.to_string()),
                host: host.map(str::to_string),
            };
        }
        match raw.split_once('@') {
            Some((name, host)) => Self {
                name: name.to_string(),
                user: None,
                host: Some(host.to_string()),
            },
            None => Self::new(raw),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}

/// A single decoded protocol line.
///
/// Immutable by convention once constructed: the pipeline hands
/// handlers shared references and never mutates a message after decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Source of the message, present on lines relayed by a server.
    pub prefix: Option<Prefix>,
    /// Command or numeric reply key, e.g. `PRIVMSG` or `001`.
    pub command: String,
    /// Ordered middle parameters.
    pub params: Vec<String>,
    /// Trailing free-text parameter. Always rendered after ` :` so the
    /// encoded form is unambiguous regardless of content.
    pub trailing: Option<String>,
}

impl Message {
    /// Create a message with no parameters.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params: Vec::new(),
            trailing: None,
        }
    }

    fn with_params(command: &str, params: Vec<String>, trailing: Option<String>) -> Self {
        Self {
            prefix: None,
            command: command.to_string(),
            params,
            trailing,
        }
    }

    /// `PASS` message carrying the connection password.
    pub fn pass(password: impl Into<String>) -> Self {
        Self::with_params("PASS", vec![password.into()], None)
    }

    /// `NICK` message requesting a nickname.
    pub fn nick(nickname: impl Into<String>) -> Self {
        Self::with_params("NICK", vec![nickname.into()], None)
    }

    /// `USER` registration message: mode `0`, unused `*`, and the
    /// realname as the trailing parameter.
    pub fn user(username: impl Into<String>, realname: impl Into<String>) -> Self {
        Self::with_params(
            "USER",
            vec![username.into(), "0".to_string(), "*".to_string()],
            Some(realname.into()),
        )
    }

    /// `PING` with a token.
    pub fn ping(token: impl Into<String>) -> Self {
        Self::with_params("PING", Vec::new(), Some(token.into()))
    }

    /// `PONG` echoing a token.
    pub fn pong(token: impl Into<String>) -> Self {
        Self::with_params("PONG", Vec::new(), Some(token.into()))
    }

    /// `PRIVMSG` to a channel or nickname.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_params("PRIVMSG", vec![target.into()], Some(text.into()))
    }

    /// `NOTICE` to a channel or nickname.
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_params("NOTICE", vec![target.into()], Some(text.into()))
    }

    /// `JOIN` a channel.
    pub fn join(channel: impl Into<String>) -> Self {
        Self::with_params("JOIN", vec![channel.into()], None)
    }

    /// `QUIT` with a parting reason.
    pub fn quit(reason: impl Into<String>) -> Self {
        Self::with_params("QUIT", Vec::new(), Some(reason.into()))
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_end_matches(&['\r', '\n'][..]);
        if rest.is_empty() {
            return Err(ProtocolError::InvalidMessage("empty line".to_string()));
        }

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (raw, tail) = stripped.split_once(' ').ok_or_else(|| {
                    ProtocolError::InvalidMessage("prefix without a command".to_string())
                })?;
                rest = tail;
                Some(Prefix::parse(raw))
            }
            None => None,
        };

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing.to_string())),
            None => (rest, None),
        };

        let mut words = middle.split_ascii_whitespace();
        let command = words
            .next()
            .ok_or_else(|| ProtocolError::InvalidMessage("missing command".to_string()))?
            .to_string();
        let params = words.map(str::to_string).collect();

        Ok(Self {
            prefix,
            command,
            params,
            trailing,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        if let Some(trailing) = &self.trailing {
            write!(f, " :{trailing}")?;
        }
        Ok(())
    }
}
