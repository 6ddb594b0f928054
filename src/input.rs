//! The [`Keystroke`] value type returned by the input loop.
//!
//! A `Keystroke` behaves like the string of characters that produced it
//! (it compares equal to `"q"` when the user typed `q`) while carrying
//! the decoded identity of application keys and terminal events: numeric
//! code, canonical `KEY_*` name, modifier set and parsed event payload.
use crate::events::{DecMode, EventPayload};
use crate::keycodes::{KeyCode, KEY_BACKSPACE, KEY_ENTER, KEY_ESCAPE, KEY_TAB};
use bitflags::bitflags;
#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

bitflags! {
    /// Modifier keys held during a keystroke.
    ///
    /// The bit values follow the xterm wire encoding (the `mods` CSI
    /// field carries `1 + bits`); canonical naming order is CTRL, ALT,
    /// SHIFT regardless of bit order.
    #[cfg_attr(feature="use_serde", derive(Serialize, Deserialize))]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 1;
        const ALT = 2;
        const CTRL = 4;
    }
}

impl Modifiers {
    /// Decode an xterm/kitty `mods` parameter (`1 + bits`).  The SUPER
    /// bit and higher (lock keys) are dropped; they are reported in the
    /// event payload only.
    pub fn from_wire(field: u32) -> Self {
        let bits = field.saturating_sub(1);
        Self::from_bits_truncate((bits & 0x7) as u8)
    }

    /// Encode back to the xterm parameter value.
    pub fn to_wire(self) -> u32 {
        1 + u32::from(self.bits())
    }
}

/// One decoded keyboard or terminal event.
///
/// Equality and ordering against plain strings use the raw [`text`];
/// typed accessors expose the decoded identity.
///
/// [`text`]: Keystroke::text
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keystroke {
    text: String,
    code: Option<KeyCode>,
    name: Option<String>,
    mode: Option<DecMode>,
    modifiers: Modifiers,
    event: Option<EventPayload>,
}

impl Keystroke {
    /// A plain text keystroke: one or more characters, no key identity.
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The empty keystroke returned on timeout or EOF.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An application key with no modifiers.
    pub fn key<T: Into<String>, N: Into<String>>(text: T, code: KeyCode, name: N) -> Self {
        Self::modified(text, code, name, Modifiers::NONE)
    }

    /// An application key with modifiers engaged.
    pub fn modified<T: Into<String>, N: Into<String>>(
        text: T,
        code: KeyCode,
        name: N,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            text: text.into(),
            code: Some(code),
            name: Some(name.into()),
            mode: None,
            modifiers,
            event: None,
        }
    }

    /// A structured terminal event.
    pub fn event<T: Into<String>, N: Into<String>>(
        text: T,
        code: KeyCode,
        name: N,
        mode: DecMode,
        modifiers: Modifiers,
        payload: EventPayload,
    ) -> Self {
        Self {
            text: text.into(),
            code: Some(code),
            name: Some(name.into()),
            mode: Some(mode),
            modifiers,
            event: Some(payload),
        }
    }

    pub(crate) fn with_mode(mut self, mode: DecMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub(crate) fn with_payload(mut self, payload: EventPayload) -> Self {
        self.event = Some(payload);
        self
    }

    /// The raw characters consumed from the input stream.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether this keystroke identifies an application key or event
    /// rather than plain text.
    pub fn is_sequence(&self) -> bool {
        self.code.is_some()
    }

    /// Numeric keycode, present iff this is an application key or event.
    pub fn code(&self) -> Option<KeyCode> {
        self.code
    }

    /// Canonical `KEY_*` name, present iff [`code`](Self::code) is.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Which event protocol produced this keystroke, if any.
    pub fn mode(&self) -> Option<DecMode> {
        self.mode
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Parsed payload for structured events (mouse, paste, focus, ...).
    pub fn event_payload(&self) -> Option<&EventPayload> {
        self.event.as_ref()
    }

    /// The character(s) that would have been typed had no modifiers
    /// been engaged.
    ///
    /// `Ctrl-A` yields `"a"`, `Alt-Shift-Q` yields `"Q"`, `KEY_UP`
    /// yields `""`, plain text yields itself.  The enter, tab,
    /// backspace and escape keys map to their control characters.
    pub fn value(&self) -> String {
        if self.code.is_none() {
            return self.text.clone();
        }

        if let Some(name) = self.name.as_deref() {
            if let Some((mods, base)) = split_name(name) {
                if !mods.is_empty() {
                    let mut chars = base.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        if !c.is_control() {
                            return if mods.contains(Modifiers::SHIFT) {
                                c.to_string()
                            } else {
                                c.to_lowercase().to_string()
                            };
                        }
                    }
                }
            }
        }

        match &self.event {
            Some(EventPayload::Kitty(kitty)) => {
                if !kitty.text_codepoints.is_empty() {
                    let text: Option<String> = kitty
                        .text_codepoints
                        .iter()
                        .map(|&cp| char::from_u32(cp))
                        .collect();
                    if let Some(text) = text {
                        return text;
                    }
                }
                if let Some(c) = char::from_u32(kitty.unicode_key) {
                    if !c.is_control() {
                        return c.to_string();
                    }
                }
            }
            Some(EventPayload::ModifyOtherKeys(mok)) => {
                if let Some(c) = char::from_u32(mok.key) {
                    if !c.is_control() {
                        return c.to_string();
                    }
                }
            }
            _ => {}
        }

        match self.code {
            Some(KEY_ENTER) => "\n".to_string(),
            Some(KEY_TAB) => "\t".to_string(),
            Some(KEY_BACKSPACE) => "\x08".to_string(),
            Some(KEY_ESCAPE) => "\x1b".to_string(),
            _ => String::new(),
        }
    }

    /// Canonical predicate behind the `is_<mods>_<key>` family.
    ///
    /// `spec` follows the grammar `[ctrl_][alt_][shift_](char|appkey)`,
    /// with the modifier tokens in that fixed order; an optional leading
    /// `is_` or `KEY_` is accepted.  The character component is compared
    /// case-insensitively.  Returns true iff this keystroke's name is
    /// exactly `KEY_<MODS>_<KEY>` for the given spec.
    pub fn matches(&self, spec: &str) -> bool {
        self.matches_with(spec, true)
    }

    /// [`matches`](Self::matches) with explicit case handling for the
    /// character component.
    pub fn matches_with(&self, spec: &str, ignore_case: bool) -> bool {
        let name = match self.name.as_deref() {
            Some(name) => name,
            None => return false,
        };
        let (have_mods, have_base) = match split_name(name) {
            Some(parts) => parts,
            None => return false,
        };

        let mut spec = spec;
        for prefix in ["is_", "IS_", "KEY_", "key_"] {
            if let Some(rest) = spec.strip_prefix(prefix) {
                spec = rest;
                break;
            }
        }
        let (want_mods, want_base) = split_components(spec);

        if have_mods != want_mods {
            return false;
        }
        if ignore_case {
            have_base.eq_ignore_ascii_case(want_base)
        } else if have_base.chars().count() == 1 && want_base.chars().count() == 1 {
            // single characters compare exactly when case matters
            have_base == want_base
        } else {
            have_base.eq_ignore_ascii_case(want_base)
        }
    }

    pub fn is_ctrl(&self, key: &str) -> bool {
        self.matches(&format!("ctrl_{}", key))
    }

    pub fn is_alt(&self, key: &str) -> bool {
        self.matches(&format!("alt_{}", key))
    }

    pub fn is_shift(&self, key: &str) -> bool {
        self.matches(&format!("shift_{}", key))
    }

    pub fn is_ctrl_alt(&self, key: &str) -> bool {
        self.matches(&format!("ctrl_alt_{}", key))
    }

    pub fn is_ctrl_shift(&self, key: &str) -> bool {
        self.matches(&format!("ctrl_shift_{}", key))
    }

    pub fn is_alt_shift(&self, key: &str) -> bool {
        self.matches(&format!("alt_shift_{}", key))
    }

    pub fn is_ctrl_alt_shift(&self, key: &str) -> bool {
        self.matches(&format!("ctrl_alt_shift_{}", key))
    }
}

/// Split a canonical name into its modifier set and base component:
/// `KEY_CTRL_SHIFT_UP` -> `(CTRL|SHIFT, "UP")`.  Returns `None` when the
/// `KEY_` prefix is missing.
fn split_name(name: &str) -> Option<(Modifiers, &str)> {
    let rest = name.strip_prefix("KEY_")?;
    Some(split_components(rest))
}

fn split_components(mut rest: &str) -> (Modifiers, &str) {
    let mut mods = Modifiers::NONE;
    if let Some(r) = strip_token(rest, "CTRL_") {
        mods |= Modifiers::CTRL;
        rest = r;
    }
    if let Some(r) = strip_token(rest, "ALT_") {
        mods |= Modifiers::ALT;
        rest = r;
    }
    if let Some(r) = strip_token(rest, "SHIFT_") {
        mods |= Modifiers::SHIFT;
        rest = r;
    }
    (mods, rest)
}

fn strip_token<'a>(s: &'a str, token: &str) -> Option<&'a str> {
    if s.len() > token.len() && s[..token.len()].eq_ignore_ascii_case(token) {
        Some(&s[token.len()..])
    } else {
        None
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.text),
        }
    }
}

impl AsRef<str> for Keystroke {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for Keystroke {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Keystroke {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl PartialEq<String> for Keystroke {
    fn eq(&self, other: &String) -> bool {
        &self.text == other
    }
}

impl PartialEq<Keystroke> for str {
    fn eq(&self, other: &Keystroke) -> bool {
        self == other.text
    }
}

impl PartialEq<Keystroke> for &str {
    fn eq(&self, other: &Keystroke) -> bool {
        *self == other.text
    }
}

impl PartialOrd<str> for Keystroke {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        self.text.as_str().partial_cmp(other)
    }
}

impl PartialOrd<&str> for Keystroke {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.text.as_str().partial_cmp(*other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::keycodes::KEY_UP;

    #[test]
    fn string_identity() {
        let k = Keystroke::text("q");
        assert_eq!(k, "q");
        assert_eq!("q", k);
        assert!(k < "r");
        assert!(!k.is_sequence());
        assert_eq!(k.name(), None);
        assert_eq!(k.code(), None);
        assert_eq!(k.value(), "q");
    }

    #[test]
    fn sequence_identity() {
        let k = Keystroke::key("\x1b[A", KEY_UP, "KEY_UP");
        assert!(k.is_sequence());
        assert_eq!(k.name(), Some("KEY_UP"));
        assert_eq!(k.code(), Some(KEY_UP));
        assert_eq!(k, "\x1b[A");
        assert_eq!(k.value(), "");
    }

    #[test]
    fn value_strips_modifiers() {
        let k = Keystroke::modified("\x01", 2000, "KEY_CTRL_A", Modifiers::CTRL);
        assert_eq!(k.value(), "a");
        let k = Keystroke::modified(
            "\x1bQ",
            2001,
            "KEY_ALT_SHIFT_Q",
            Modifiers::ALT | Modifiers::SHIFT,
        );
        assert_eq!(k.value(), "Q");
    }

    #[test]
    fn matches_round_trips_names() {
        let k = Keystroke::modified("\x1b[1;5A", 2002, "KEY_CTRL_UP", Modifiers::CTRL);
        assert!(k.matches("ctrl_up"));
        assert!(k.matches("is_ctrl_up"));
        assert!(k.matches("KEY_CTRL_UP"));
        assert!(!k.matches("alt_up"));
        assert!(!k.matches("ctrl_shift_up"));
        assert!(!k.matches("up"));
        assert!(k.is_ctrl("up"));
        assert!(!k.is_ctrl_shift("up"));
    }

    #[test]
    fn matches_case_handling() {
        let k = Keystroke::modified("\x01", 2003, "KEY_CTRL_A", Modifiers::CTRL);
        assert!(k.matches("ctrl_a"));
        assert!(k.matches("ctrl_A"));
        assert!(k.matches_with("ctrl_A", false));
        assert!(!k.matches_with("ctrl_a", false));
    }

    #[test]
    fn wire_modifiers() {
        assert_eq!(Modifiers::from_wire(1), Modifiers::NONE);
        assert_eq!(Modifiers::from_wire(5), Modifiers::CTRL);
        assert_eq!(Modifiers::from_wire(8), Modifiers::CTRL | Modifiers::ALT | Modifiers::SHIFT);
        // SUPER (bit 8) is not mapped
        assert_eq!(Modifiers::from_wire(9), Modifiers::NONE);
        assert_eq!((Modifiers::CTRL | Modifiers::SHIFT).to_wire(), 6);
    }
}
