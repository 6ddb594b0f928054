//! # keywiz
//!
//! This is a rust crate that decodes the keyboard side of a terminal:
//! given the raw byte stream produced by a tty in character-at-a-time
//! mode, it yields richly-typed [`Keystroke`] events.
//!
//! Included functionality:
//!
//! * A capability database and sequence table seeded from terminfo and
//!   topped up with the literal sequences most emulators actually send,
//!   organized as a trie for longest-prefix matching.
//! * A battery of event-pattern matchers for out-of-band reports:
//!   bracketed paste, SGR and legacy mouse tracking, focus in/out,
//!   synchronized-output markers, in-band resize, the kitty keyboard
//!   protocol, xterm modifyOtherKeys, legacy CSI modifiers and device
//!   attribute responses.
//! * A pure keystroke resolver implementing the longest-match rule with
//!   escape-delay semantics.
//! * A blocking/timeout read loop (`inkey`, `ungetch`, `flushinp`) over
//!   an abstract byte source, with an incremental decoder so UTF-8
//!   codepoints split across reads survive intact.
//!
//! Emitting output sequences, styling and screen modeling are out of
//! scope; this crate is strictly the input decoder.
//!
//! ```no_run
//! use keywiz::{Capabilities, UnixTerminal};
//!
//! # fn main() -> keywiz::Result<()> {
//! let caps = Capabilities::new_from_env()?;
//! let mut term = UnixTerminal::new_from_stdio(caps)?;
//! term.set_cbreak_mode()?;
//! loop {
//!     let key = term.inkey(None)?;
//!     if key == "q" {
//!         break;
//!     }
//!     if let Some(name) = key.name() {
//!         println!("{}\r", name);
//!     }
//! }
//! term.restore_mode()?;
//! # Ok(())
//! # }
//! ```

pub mod caps;
pub mod decoder;
pub mod error;
pub mod events;
pub mod input;
pub mod keycodes;
pub mod keymap;
mod macros;
pub mod matchers;
pub mod resolver;
pub mod terminal;

pub use anyhow::Context;
pub use caps::{Capabilities, ProbeHints, DEFAULT_ESCDELAY};
pub use decoder::{IncrementalDecoder, InputEncoding};
pub use error::{Error, InternalError, Result};
pub use events::{
    DecMode, DecModeValue, DeviceAttributes, EventPayload, FocusEvent, KittyEventType,
    KittyKeyEvent, ModifyOtherKeysEvent, MouseLegacyEvent, MouseSgrEvent, PasteEvent, Report,
    ResizeEvent, SyncEvent,
};
pub use input::{Keystroke, Modifiers};
pub use keycodes::*;
pub use keymap::{build_tables, KeyMap, SequenceTables};
pub use resolver::{resolve, Resolution};
pub use terminal::{ByteSource, PollStatus, ScreenSize, Terminal};
#[cfg(unix)]
pub use terminal::{TtySource, UnixTerminal};

/// The default escape delay, under the name curses programmers expect.
pub use caps::DEFAULT_ESCDELAY as ESCDELAY;
