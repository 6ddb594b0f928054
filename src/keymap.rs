//! The sequence table: a character trie mapping input sequences to
//! keycodes, built from the terminal's terminfo strings plus a literal
//! mixin of sequences most emulators emit regardless of what their
//! declared `TERM` type promises.
//!
//! The trie yields, in one walk, the longest known sequence at the head
//! of the buffer *and* whether the buffer might still grow into a longer
//! one, which is what the resolver's wait decision needs.
use crate::keycodes::{
    capability_keys, KeyCode, KeycodeRegistry, KEY_BACKSPACE, KEY_DOWN, KEY_END, KEY_ENTER,
    KEY_ESCAPE, KEY_F1, KEY_F2, KEY_F3, KEY_F4, KEY_FIND, KEY_HOME, KEY_KP_0, KEY_KP_1, KEY_KP_2,
    KEY_KP_3, KEY_KP_4, KEY_KP_5, KEY_KP_6, KEY_KP_7, KEY_KP_8, KEY_KP_9, KEY_KP_ADD,
    KEY_KP_DECIMAL, KEY_KP_DIVIDE, KEY_KP_EQUAL, KEY_KP_MULTIPLY, KEY_KP_SEPARATOR,
    KEY_KP_SUBTRACT, KEY_LEFT, KEY_PGDOWN, KEY_PGUP, KEY_RIGHT, KEY_SELECT, KEY_TAB, KEY_UP,
};
use std::collections::HashMap;

/// In a perfect world, terminal emulators would send exactly what the
/// terminfo database plans for them.  Many vt220-derived terminals
/// (rxvt, putty, iTerm and friends) keep sending vt220 codes for
/// backwards compatibility instead, so these literals are matched for
/// any terminal type.  Applied after the terminfo strings, overwriting
/// duplicates.
const DEFAULT_SEQUENCE_MIXIN: &[(&str, KeyCode)] = &[
    // common control characters aliased to application keys
    ("\n", KEY_ENTER),
    ("\r", KEY_ENTER),
    ("\x08", KEY_BACKSPACE),
    ("\t", KEY_TAB),
    ("\x1b", KEY_ESCAPE),
    ("\x7f", KEY_BACKSPACE),
    // CSI cursor and editing keys
    ("\x1b[A", KEY_UP),
    ("\x1b[B", KEY_DOWN),
    ("\x1b[C", KEY_RIGHT),
    ("\x1b[D", KEY_LEFT),
    ("\x1b[F", KEY_END),
    ("\x1b[H", KEY_HOME),
    ("\x1b[K", KEY_END),
    ("\x1b[U", KEY_PGDOWN),
    ("\x1b[V", KEY_PGUP),
    // SS3 arrows sent in application cursor mode
    ("\x1bOA", KEY_UP),
    ("\x1bOB", KEY_DOWN),
    ("\x1bOC", KEY_RIGHT),
    ("\x1bOD", KEY_LEFT),
    // application keypad, numlock on: SS3 forms that do not begin with CSI
    ("\x1bOM", KEY_ENTER),
    ("\x1bOj", KEY_KP_MULTIPLY),
    ("\x1bOk", KEY_KP_ADD),
    ("\x1bOl", KEY_KP_SEPARATOR),
    ("\x1bOm", KEY_KP_SUBTRACT),
    ("\x1bOn", KEY_KP_DECIMAL),
    ("\x1bOo", KEY_KP_DIVIDE),
    ("\x1bOX", KEY_KP_EQUAL),
    ("\x1bOp", KEY_KP_0),
    ("\x1bOq", KEY_KP_1),
    ("\x1bOr", KEY_KP_2),
    ("\x1bOs", KEY_KP_3),
    ("\x1bOt", KEY_KP_4),
    ("\x1bOu", KEY_KP_5),
    ("\x1bOv", KEY_KP_6),
    ("\x1bOw", KEY_KP_7),
    ("\x1bOx", KEY_KP_8),
    ("\x1bOy", KEY_KP_9),
    // DEC VT special keys, transmitted as F1-F4 by most emulators
    ("\x1bOP", KEY_F1),
    ("\x1bOQ", KEY_F2),
    ("\x1bOR", KEY_F3),
    ("\x1bOS", KEY_F4),
    // keypad, numlock off
    ("\x1b[1~", KEY_FIND),
    ("\x1b[2~", crate::keycodes::KEY_INSERT),
    ("\x1b[3~", crate::keycodes::KEY_DELETE),
    ("\x1b[4~", KEY_SELECT),
    ("\x1b[5~", KEY_PGUP),
    ("\x1b[6~", KEY_PGDOWN),
    ("\x1b[7~", KEY_HOME),
    ("\x1b[8~", KEY_END),
    ("\x1b[OA", KEY_UP),
    ("\x1b[OB", KEY_DOWN),
    ("\x1b[OC", KEY_RIGHT),
    ("\x1b[OD", KEY_LEFT),
    ("\x1b[OF", KEY_END),
    ("\x1b[OH", KEY_HOME),
];

/// Sequences whose literal form supersedes whatever terminfo claims,
/// covering observed mis-specifications.
const OVERRIDE_SEQUENCE_MIXIN: &[(&str, KeyCode)] = &[
    // many databases describe kbs as ^H while modern emulators send DEL
    ("\x7f", KEY_BACKSPACE),
    // xterm sends SS3 H/F in application cursor mode even when
    // khome/kend advertise only the CSI forms
    ("\x1bOH", KEY_HOME),
    ("\x1bOF", KEY_END),
];

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, Node>,
    code: Option<KeyCode>,
}

/// Result of walking the trie against the head of the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// Longest sequence found at the head: (consumed bytes, keycode).
    pub best: Option<(usize, KeyCode)>,
    /// The entire input was walked and the final node has descendants:
    /// more bytes could still turn the buffer into a longer match.
    pub could_extend: bool,
}

/// Character trie from input sequences to keycodes.
#[derive(Debug, Default)]
pub struct KeyMap {
    root: Node,
    len: usize,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `seq` -> `code`, replacing any previous binding.
    pub fn insert(&mut self, seq: &str, code: KeyCode) {
        debug_assert!(!seq.is_empty());
        let mut node = &mut self.root;
        for ch in seq.chars() {
            node = node.children.entry(ch).or_default();
        }
        if node.code.replace(code).is_none() {
            self.len += 1;
        }
    }

    /// Walk `text` from its start, reporting the longest bound sequence
    /// and whether a longer one might still arrive.
    pub fn lookup(&self, text: &str) -> Lookup {
        let mut node = &self.root;
        let mut best = None;
        let mut consumed = 0;
        for ch in text.chars() {
            match node.children.get(&ch) {
                Some(next) => {
                    consumed += ch.len_utf8();
                    if let Some(code) = next.code {
                        best = Some((consumed, code));
                    }
                    node = next;
                }
                None => {
                    return Lookup {
                        best,
                        could_extend: false,
                    }
                }
            }
        }
        Lookup {
            best,
            could_extend: !node.children.is_empty(),
        }
    }

    /// Whether `text` is a proper prefix of at least one sequence.
    pub fn is_prefix(&self, text: &str) -> bool {
        self.lookup(text).could_extend
    }

    /// Number of distinct sequences bound.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The immutable artifacts the resolver works from: the sequence trie
/// and the keycode registry.  Built once per terminal.
#[derive(Debug)]
pub struct SequenceTables {
    pub keymap: KeyMap,
    pub registry: KeycodeRegistry,
}

/// Build the tables from a terminfo translation function
/// (`capability name -> raw string`).  Layering order: terminfo strings,
/// the alternative cuf1/cub1 arrows, the default mixin, then the
/// override mixin; later layers overwrite earlier ones.
pub fn build_tables<F>(terminfo: F) -> SequenceTables
where
    F: Fn(&str) -> Option<String>,
{
    let registry = KeycodeRegistry::new();
    let mut keymap = KeyMap::new();

    for cap in capability_keys() {
        if let Some(seq) = terminfo(&cap.cap) {
            if !seq.is_empty() {
                keymap.insert(&seq, cap.code);
            }
        }
    }

    // cuf1/cub1 double as the right/left application keys on terminals
    // that define them as real sequences; `" "` and backspace would
    // swallow ordinary text, so those are skipped.
    if let Some(cuf1) = terminfo("cuf1") {
        if !cuf1.is_empty() && cuf1 != " " {
            keymap.insert(&cuf1, KEY_RIGHT);
        }
    }
    if let Some(cub1) = terminfo("cub1") {
        if !cub1.is_empty() && cub1 != "\x08" {
            keymap.insert(&cub1, KEY_LEFT);
        }
    }

    for &(seq, code) in DEFAULT_SEQUENCE_MIXIN {
        keymap.insert(seq, code);
    }
    for &(seq, code) in OVERRIDE_SEQUENCE_MIXIN {
        keymap.insert(seq, code);
    }

    SequenceTables { keymap, registry }
}
