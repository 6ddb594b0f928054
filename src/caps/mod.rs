//! # Terminal Capabilities
//!
//! On POSIX systems the sequences a terminal sends for its application
//! keys are described by the terminfo database, keyed by the `TERM`
//! environment variable.  The database is frequently stale or wrong for
//! the terminal actually attached (mosh, tmux and ssh all perturb it),
//! which is why the sequence table layers a literal mixin over whatever
//! terminfo claims; see [`crate::keymap`].
//!
//! `Capabilities` holds the decoder-relevant facts about a terminal.
//! The `new_from_env` constructor implements some heuristics to compute
//! them, and `ProbeHints` lets an embedding application override those
//! choices.
use crate::builder;
use crate::decoder::InputEncoding;
use crate::Result;
use std::env::var;
use std::time::Duration;
use terminfo::{self, Value};

/// How long a lone ESC waits for continuation bytes before being
/// emitted as a bare escape keystroke.  Overridable per terminal via
/// `ProbeHints` or the `ESCDELAY` environment variable (milliseconds),
/// following the ncurses convention.
pub const DEFAULT_ESCDELAY: Duration = Duration::from_millis(35);

builder! {
    /// Use the `ProbeHints` to configure an instance of
    /// the `ProbeHints` struct.  `ProbeHints` are passed to the
    /// `Capabilities` constructor to influence the effective set of
    /// terminal capabilities.
    #[derive(Debug, Default, Clone)]
    pub struct ProbeHints {
        /// The contents of the TERM environment variable
        term: Option<String>,

        /// A loaded terminfo database entry
        terminfo_db: Option<terminfo::Database>,

        /// Whether bracketed paste mode is supported
        bracketed_paste: Option<bool>,

        /// Whether mouse support is present and should be used
        mouse_reporting: Option<bool>,

        /// Escape-delay override
        escdelay: Option<Duration>,

        /// Keyboard input encoding
        encoding: Option<InputEncoding>,
    }
}

impl ProbeHints {
    pub fn new_from_env() -> Self {
        ProbeHints::default()
            .term(var("TERM").ok())
            .escdelay(var("ESCDELAY").ok().and_then(|ms| parse_escdelay(&ms)))
    }
}

/// Parse the `ESCDELAY` convention: integer milliseconds, invalid
/// values ignored.
fn parse_escdelay(ms: &str) -> Option<Duration> {
    ms.trim().parse::<u64>().ok().map(Duration::from_millis)
}

/// Decoder-relevant capabilities of the attached terminal.
#[derive(Debug, Clone)]
pub struct Capabilities {
    terminfo_db: Option<terminfo::Database>,
    bracketed_paste: bool,
    mouse_reporting: bool,
    escdelay: Duration,
    encoding: InputEncoding,
}

impl Capabilities {
    /// Detect the capabilities of the terminal and return the
    /// Capability object holding the outcome.  Inspects the
    /// environment to build up configuration hints.
    pub fn new_from_env() -> Result<Self> {
        Self::new_with_hints(ProbeHints::new_from_env())
    }

    /// Build a `Capabilities` object based on the provided `ProbeHints`
    /// object.
    pub fn new_with_hints(hints: ProbeHints) -> Result<Self> {
        let terminfo_db = hints.terminfo_db.as_ref().cloned();
        let terminfo_db = if cfg!(test) {
            // Don't load from the system terminfo in tests, as it is
            // unpredictable
            terminfo_db
        } else {
            terminfo_db.or_else(|| match hints.term.as_ref() {
                Some(t) => terminfo::Database::from_name(t).ok(),
                None => terminfo::Database::from_env().ok(),
            })
        };

        Ok(Self {
            terminfo_db,
            bracketed_paste: hints.bracketed_paste.unwrap_or(true),
            mouse_reporting: hints.mouse_reporting.unwrap_or(true),
            escdelay: hints.escdelay.unwrap_or(DEFAULT_ESCDELAY),
            encoding: hints.encoding.unwrap_or(InputEncoding::Utf8),
        })
    }

    /// Returns a reference to the loaded terminfo, if any.
    pub fn terminfo_db(&self) -> Option<&terminfo::Database> {
        self.terminfo_db.as_ref()
    }

    /// Whether bracketed paste is supported
    pub fn bracketed_paste(&self) -> bool {
        self.bracketed_paste
    }

    /// Whether mouse reporting is supported
    pub fn mouse_reporting(&self) -> bool {
        self.mouse_reporting
    }

    /// The effective escape delay.
    pub fn escdelay(&self) -> Duration {
        self.escdelay
    }

    /// The keyboard input encoding.
    pub fn encoding(&self) -> InputEncoding {
        self.encoding
    }

    /// Terminfo translation for the sequence-table builder: raw string
    /// capability lookup, decoded byte-for-byte.
    pub fn keyboard_string(&self, capname: &str) -> Option<String> {
        let db = self.terminfo_db.as_ref()?;
        match db.raw(capname) {
            Some(Value::String(bytes)) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_hints() {
        let caps = Capabilities::new_with_hints(ProbeHints::default()).unwrap();
        assert!(caps.bracketed_paste());
        assert!(caps.mouse_reporting());
        assert_eq!(caps.escdelay(), DEFAULT_ESCDELAY);
        assert_eq!(caps.encoding(), InputEncoding::Utf8);
        assert!(caps.keyboard_string("kcuu1").is_none());
    }

    #[test]
    fn escdelay_parsing() {
        assert_eq!(parse_escdelay("350"), Some(Duration::from_millis(350)));
        assert_eq!(parse_escdelay(" 25 "), Some(Duration::from_millis(25)));
        assert_eq!(parse_escdelay("fast"), None);
        assert_eq!(parse_escdelay(""), None);
    }

    #[test]
    fn hint_overrides() {
        let caps = Capabilities::new_with_hints(
            ProbeHints::default()
                .escdelay(Some(Duration::from_millis(100)))
                .encoding(Some(InputEncoding::Latin1))
                .mouse_reporting(Some(false)),
        )
        .unwrap();
        assert_eq!(caps.escdelay(), Duration::from_millis(100));
        assert_eq!(caps.encoding(), InputEncoding::Latin1);
        assert!(!caps.mouse_reporting());
    }
}
