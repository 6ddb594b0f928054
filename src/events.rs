//! Structured payloads for terminal-generated events.
//!
//! Every out-of-band report the decoder understands (bracketed paste,
//! mouse tracking, focus, synchronized output, the kitty keyboard
//! protocol, xterm modifyOtherKeys, in-band resize) is parsed into one of
//! the types here and attached to the resulting [`Keystroke`].
//!
//! [`Keystroke`]: crate::input::Keystroke

#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which input protocol produced a keystroke.
///
/// Variants that correspond to a DEC private mode carry that mode's
/// number via [`DecMode::number`]; the keyboard protocols (kitty,
/// modifyOtherKeys, legacy CSI modifiers) have no mode number.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecMode {
    BracketedPaste,
    MouseSgr,
    MouseLegacy,
    Focus,
    SyncOutput,
    InBandResize,
    Kitty,
    ModifyOtherKeys,
    LegacyCsi,
}

impl DecMode {
    /// The DEC private mode number associated with this event class,
    /// when one exists.
    pub fn number(self) -> Option<u16> {
        match self {
            Self::BracketedPaste => Some(2004),
            Self::MouseSgr => Some(1006),
            Self::MouseLegacy => Some(1000),
            Self::Focus => Some(1004),
            Self::SyncOutput => Some(2026),
            Self::InBandResize => Some(2048),
            Self::Kitty | Self::ModifyOtherKeys | Self::LegacyCsi => None,
        }
    }
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    /// The pasted text, markers excluded.
    pub text: String,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseSgrEvent {
    /// Button number: 0 left, 1 middle, 2 right; 64/65 wheel up/down.
    pub button: u16,
    /// 1-indexed cell (or pixel, for SGR-pixels terminals) coordinates.
    pub x: u16,
    pub y: u16,
    pub is_release: bool,
    pub is_drag: bool,
    pub is_wheel: bool,
    pub shift: bool,
    pub meta: bool,
    pub ctrl: bool,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseLegacyEvent {
    pub button: u16,
    pub x: u16,
    pub y: u16,
    pub is_release: bool,
    pub is_motion: bool,
    pub is_drag: bool,
    pub is_wheel: bool,
    pub shift: bool,
    pub meta: bool,
    pub ctrl: bool,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub gained: bool,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEvent {
    pub begin: bool,
}

/// Key event type reported by the kitty keyboard protocol.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittyEventType {
    Press,
    Repeat,
    Release,
}

impl KittyEventType {
    pub fn from_field(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Press),
            2 => Some(Self::Repeat),
            3 => Some(Self::Release),
            _ => None,
        }
    }
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittyKeyEvent {
    /// Primary key codepoint.
    pub unicode_key: u32,
    /// Shifted form of the key, when the terminal reports alternates.
    pub shifted_key: Option<u32>,
    /// Base layout key, when the terminal reports alternates.
    pub base_key: Option<u32>,
    /// Raw modifier field: 1 + (SHIFT=1 | ALT=2 | CTRL=4 | SUPER=8).
    /// SUPER is preserved here but never mapped into
    /// [`Modifiers`](crate::input::Modifiers).
    pub modifiers: u32,
    pub event_type: KittyEventType,
    /// Text-as-typed codepoints, for composed input.
    pub text_codepoints: Vec<u32>,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyOtherKeysEvent {
    /// Key codepoint.
    pub key: u32,
    /// Raw modifier field, same encoding as kitty.
    pub modifiers: u32,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub rows: usize,
    pub cols: usize,
    pub xpixel: usize,
    pub ypixel: usize,
}

/// Parsed event payload attached to an event [`Keystroke`].
///
/// [`Keystroke`]: crate::input::Keystroke
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Paste(PasteEvent),
    MouseSgr(MouseSgrEvent),
    MouseLegacy(MouseLegacyEvent),
    Focus(FocusEvent),
    Sync(SyncEvent),
    Kitty(KittyKeyEvent),
    ModifyOtherKeys(ModifyOtherKeysEvent),
    Resize(ResizeEvent),
}

/// A terminal's primary device attributes (DA1) response.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAttributes {
    /// Architectural service class, the first response parameter.
    pub service_class: u16,
    /// Advertised extension numbers.
    pub extensions: BTreeSet<u16>,
}

impl DeviceAttributes {
    /// Extension 4 advertises sixel graphics support.
    pub fn supports_sixel(&self) -> bool {
        self.extensions.contains(&4)
    }
}

/// DECRPM: the terminal's answer to a DEC private mode query.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecModeValue {
    NotRecognized,
    Set,
    Reset,
    PermanentlySet,
    PermanentlyReset,
}

impl DecModeValue {
    pub fn from_field(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::NotRecognized),
            1 => Some(Self::Set),
            2 => Some(Self::Reset),
            3 => Some(Self::PermanentlySet),
            4 => Some(Self::PermanentlyReset),
            _ => None,
        }
    }

    /// Whether the mode is currently in effect.
    pub fn is_set(self) -> bool {
        matches!(self, Self::Set | Self::PermanentlySet)
    }
}

/// A report consumed from the input stream that completes a capability
/// query rather than producing a user-visible keystroke.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    DeviceAttributes(DeviceAttributes),
    DecMode { mode: u16, value: DecModeValue },
}
