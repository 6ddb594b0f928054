//! Keycode constants and the capability database.
//!
//! Application keys are identified by small integer codes compatible with
//! the curses `KEY_*` constants, extended with a block of keys that curses
//! never defined (tab, keypad digits, menu), a block of protocol-event
//! codes (paste, mouse, focus, sync, kitty, resize), and a block of
//! synthesized modifier-combined codes generated at registry build time.
//!
//! The [`KeycodeRegistry`] owns the bijection between codes and their
//! canonical `KEY_*` names.  It is built once per terminal and immutable
//! afterwards; generation order is deterministic so that rebuilding from
//! the same capability set yields the same assignment.

use crate::input::Modifiers;
use std::collections::HashMap;

/// Numeric identity of an application key or terminal event.
pub type KeyCode = u16;

pub const KEY_BREAK: KeyCode = 257;
pub const KEY_DOWN: KeyCode = 258;
pub const KEY_UP: KeyCode = 259;
pub const KEY_LEFT: KeyCode = 260;
pub const KEY_RIGHT: KeyCode = 261;
pub const KEY_HOME: KeyCode = 262;
pub const KEY_BACKSPACE: KeyCode = 263;
pub const KEY_F0: KeyCode = 264;
pub const KEY_F1: KeyCode = 265;
pub const KEY_F2: KeyCode = 266;
pub const KEY_F3: KeyCode = 267;
pub const KEY_F4: KeyCode = 268;
pub const KEY_F5: KeyCode = 269;
pub const KEY_F6: KeyCode = 270;
pub const KEY_F7: KeyCode = 271;
pub const KEY_F8: KeyCode = 272;
pub const KEY_F9: KeyCode = 273;
pub const KEY_F10: KeyCode = 274;
pub const KEY_F11: KeyCode = 275;
pub const KEY_F12: KeyCode = 276;
pub const KEY_DL: KeyCode = 328;
pub const KEY_IL: KeyCode = 329;
pub const KEY_DC: KeyCode = 330;
pub const KEY_IC: KeyCode = 331;
pub const KEY_EIC: KeyCode = 332;
pub const KEY_CLEAR: KeyCode = 333;
pub const KEY_EOS: KeyCode = 334;
pub const KEY_EOL: KeyCode = 335;
pub const KEY_SF: KeyCode = 336;
pub const KEY_SR: KeyCode = 337;
pub const KEY_NPAGE: KeyCode = 338;
pub const KEY_PPAGE: KeyCode = 339;
pub const KEY_STAB: KeyCode = 340;
pub const KEY_CTAB: KeyCode = 341;
pub const KEY_CATAB: KeyCode = 342;
pub const KEY_ENTER: KeyCode = 343;
pub const KEY_PRINT: KeyCode = 346;
pub const KEY_LL: KeyCode = 347;
pub const KEY_A1: KeyCode = 348;
pub const KEY_A3: KeyCode = 349;
pub const KEY_B2: KeyCode = 350;
pub const KEY_C1: KeyCode = 351;
pub const KEY_C3: KeyCode = 352;
pub const KEY_BTAB: KeyCode = 353;
pub const KEY_BEG: KeyCode = 354;
pub const KEY_CANCEL: KeyCode = 355;
pub const KEY_CLOSE: KeyCode = 356;
pub const KEY_COMMAND: KeyCode = 357;
pub const KEY_COPY: KeyCode = 358;
pub const KEY_CREATE: KeyCode = 359;
pub const KEY_END: KeyCode = 360;
pub const KEY_EXIT: KeyCode = 361;
pub const KEY_FIND: KeyCode = 362;
pub const KEY_HELP: KeyCode = 363;
pub const KEY_MARK: KeyCode = 364;
pub const KEY_MESSAGE: KeyCode = 365;
pub const KEY_MOVE: KeyCode = 366;
pub const KEY_NEXT: KeyCode = 367;
pub const KEY_OPEN: KeyCode = 368;
pub const KEY_OPTIONS: KeyCode = 369;
pub const KEY_PREVIOUS: KeyCode = 370;
pub const KEY_REDO: KeyCode = 371;
pub const KEY_REFERENCE: KeyCode = 372;
pub const KEY_REFRESH: KeyCode = 373;
pub const KEY_REPLACE: KeyCode = 374;
pub const KEY_RESTART: KeyCode = 375;
pub const KEY_RESUME: KeyCode = 376;
pub const KEY_SAVE: KeyCode = 377;
pub const KEY_SBEG: KeyCode = 378;
pub const KEY_SCANCEL: KeyCode = 379;
pub const KEY_SCOMMAND: KeyCode = 380;
pub const KEY_SCOPY: KeyCode = 381;
pub const KEY_SCREATE: KeyCode = 382;
pub const KEY_SDC: KeyCode = 383;
pub const KEY_SDL: KeyCode = 384;
pub const KEY_SELECT: KeyCode = 385;
pub const KEY_SEND: KeyCode = 386;
pub const KEY_SEOL: KeyCode = 387;
pub const KEY_SEXIT: KeyCode = 388;
pub const KEY_SFIND: KeyCode = 389;
pub const KEY_SHELP: KeyCode = 390;
pub const KEY_SHOME: KeyCode = 391;
pub const KEY_SIC: KeyCode = 392;
pub const KEY_SLEFT: KeyCode = 393;
pub const KEY_SMESSAGE: KeyCode = 394;
pub const KEY_SMOVE: KeyCode = 395;
pub const KEY_SNEXT: KeyCode = 396;
pub const KEY_SOPTIONS: KeyCode = 397;
pub const KEY_SPREVIOUS: KeyCode = 398;
pub const KEY_SPRINT: KeyCode = 399;
pub const KEY_SREDO: KeyCode = 400;
pub const KEY_SREPLACE: KeyCode = 401;
pub const KEY_SRIGHT: KeyCode = 402;
pub const KEY_SRSUME: KeyCode = 403;
pub const KEY_SSAVE: KeyCode = 404;
pub const KEY_SSUSPEND: KeyCode = 405;
pub const KEY_SUNDO: KeyCode = 406;
pub const KEY_SUSPEND: KeyCode = 407;
pub const KEY_UNDO: KeyCode = 408;

// Friendlier mnemonics preferred over the raw curses names.  They share
// the curses numeric value; the registry makes the friendly name the
// canonical one for the code.
pub const KEY_DELETE: KeyCode = KEY_DC;
pub const KEY_INSERT: KeyCode = KEY_IC;
pub const KEY_PGUP: KeyCode = KEY_PPAGE;
pub const KEY_PGDOWN: KeyCode = KEY_NPAGE;
pub const KEY_ESCAPE: KeyCode = KEY_EXIT;
pub const KEY_SUP: KeyCode = KEY_SR;
pub const KEY_SDOWN: KeyCode = KEY_SF;
pub const KEY_UP_LEFT: KeyCode = KEY_A1;
pub const KEY_UP_RIGHT: KeyCode = KEY_A3;
pub const KEY_CENTER: KeyCode = KEY_B2;
pub const KEY_DOWN_LEFT: KeyCode = KEY_C1;
pub const KEY_DOWN_RIGHT: KeyCode = KEY_C3;
pub const KEY_BEGIN: KeyCode = KEY_BEG;

// Keys that curses has no constant for.
pub const KEY_TAB: KeyCode = 512;
pub const KEY_KP_MULTIPLY: KeyCode = 513;
pub const KEY_KP_ADD: KeyCode = 514;
pub const KEY_KP_SEPARATOR: KeyCode = 515;
pub const KEY_KP_SUBTRACT: KeyCode = 516;
pub const KEY_KP_DECIMAL: KeyCode = 517;
pub const KEY_KP_DIVIDE: KeyCode = 518;
pub const KEY_KP_EQUAL: KeyCode = 519;
pub const KEY_KP_0: KeyCode = 520;
pub const KEY_KP_1: KeyCode = 521;
pub const KEY_KP_2: KeyCode = 522;
pub const KEY_KP_3: KeyCode = 523;
pub const KEY_KP_4: KeyCode = 524;
pub const KEY_KP_5: KeyCode = 525;
pub const KEY_KP_6: KeyCode = 526;
pub const KEY_KP_7: KeyCode = 527;
pub const KEY_KP_8: KeyCode = 528;
pub const KEY_KP_9: KeyCode = 529;
pub const KEY_MENU: KeyCode = 530;

// Terminal-generated events surfaced as keystrokes.
pub const KEY_BRACKETED_PASTE: KeyCode = 540;
pub const KEY_FOCUS_IN: KeyCode = 541;
pub const KEY_FOCUS_OUT: KeyCode = 542;
pub const KEY_MOUSE_SGR: KeyCode = 543;
pub const KEY_MOUSE_LEGACY: KeyCode = 544;
pub const KEY_SYNC_BEGIN: KeyCode = 545;
pub const KEY_SYNC_END: KeyCode = 546;
pub const KEY_KITTY_KEY: KeyCode = 547;
pub const KEY_RESIZE_EVENT: KeyCode = 548;
/// Internal: device attribute and DEC mode reports are consumed off the
/// input stream but never surfaced to the caller under this code.
pub const KEY_DEVICE_ATTRIBUTES: KeyCode = 549;

/// First code handed out to synthesized modifier-combined keys.
const SYNTHETIC_BASE: KeyCode = 1024;

/// Return `KEY_Fn` for function key `n` (0..=63).
pub fn key_f(n: u8) -> KeyCode {
    KEY_F0 + KeyCode::from(n)
}

/// One row of the capability database: a terminfo capability name, the
/// canonical key name its sequence resolves to, and the numeric code.
#[derive(Debug, Clone)]
pub struct CapKey {
    pub cap: String,
    pub name: String,
    pub code: KeyCode,
}

// Capabilities that standard terminfo describes.  Ordering is the build
// order of the sequence table, which keeps rebuilds deterministic.
const TERMINFO_KEYS: &[(&str, &str, KeyCode)] = &[
    ("kcuu1", "KEY_UP", KEY_UP),
    ("kcud1", "KEY_DOWN", KEY_DOWN),
    ("kcub1", "KEY_LEFT", KEY_LEFT),
    ("kcuf1", "KEY_RIGHT", KEY_RIGHT),
    ("khome", "KEY_HOME", KEY_HOME),
    ("kend", "KEY_END", KEY_END),
    ("kbs", "KEY_BACKSPACE", KEY_BACKSPACE),
    ("kdch1", "KEY_DELETE", KEY_DELETE),
    ("kich1", "KEY_INSERT", KEY_INSERT),
    ("knp", "KEY_PGDOWN", KEY_PGDOWN),
    ("kpp", "KEY_PGUP", KEY_PGUP),
    ("kent", "KEY_ENTER", KEY_ENTER),
    ("kclr", "KEY_CLEAR", KEY_CLEAR),
    ("kdl1", "KEY_DL", KEY_DL),
    ("kil1", "KEY_IL", KEY_IL),
    ("kel", "KEY_EOL", KEY_EOL),
    ("ked", "KEY_EOS", KEY_EOS),
    ("kind", "KEY_SDOWN", KEY_SDOWN),
    ("kri", "KEY_SUP", KEY_SUP),
    ("khts", "KEY_STAB", KEY_STAB),
    ("kctab", "KEY_CTAB", KEY_CTAB),
    ("ktbc", "KEY_CATAB", KEY_CATAB),
    ("kcbt", "KEY_BTAB", KEY_BTAB),
    ("kbeg", "KEY_BEGIN", KEY_BEGIN),
    ("kcan", "KEY_CANCEL", KEY_CANCEL),
    ("kclo", "KEY_CLOSE", KEY_CLOSE),
    ("kcmd", "KEY_COMMAND", KEY_COMMAND),
    ("kcpy", "KEY_COPY", KEY_COPY),
    ("kcrt", "KEY_CREATE", KEY_CREATE),
    ("kfnd", "KEY_FIND", KEY_FIND),
    ("khlp", "KEY_HELP", KEY_HELP),
    ("kmrk", "KEY_MARK", KEY_MARK),
    ("kmsg", "KEY_MESSAGE", KEY_MESSAGE),
    ("kmov", "KEY_MOVE", KEY_MOVE),
    ("knxt", "KEY_NEXT", KEY_NEXT),
    ("kopn", "KEY_OPEN", KEY_OPEN),
    ("kopt", "KEY_OPTIONS", KEY_OPTIONS),
    ("kprv", "KEY_PREVIOUS", KEY_PREVIOUS),
    ("kprt", "KEY_PRINT", KEY_PRINT),
    ("krdo", "KEY_REDO", KEY_REDO),
    ("kref", "KEY_REFERENCE", KEY_REFERENCE),
    ("krfr", "KEY_REFRESH", KEY_REFRESH),
    ("krpl", "KEY_REPLACE", KEY_REPLACE),
    ("krst", "KEY_RESTART", KEY_RESTART),
    ("kres", "KEY_RESUME", KEY_RESUME),
    ("ksav", "KEY_SAVE", KEY_SAVE),
    ("kslt", "KEY_SELECT", KEY_SELECT),
    ("kspd", "KEY_SUSPEND", KEY_SUSPEND),
    ("kund", "KEY_UNDO", KEY_UNDO),
    ("ka1", "KEY_UP_LEFT", KEY_UP_LEFT),
    ("ka3", "KEY_UP_RIGHT", KEY_UP_RIGHT),
    ("kb2", "KEY_CENTER", KEY_CENTER),
    ("kc1", "KEY_DOWN_LEFT", KEY_DOWN_LEFT),
    ("kc3", "KEY_DOWN_RIGHT", KEY_DOWN_RIGHT),
    ("kBEG", "KEY_SBEG", KEY_SBEG),
    ("kCAN", "KEY_SCANCEL", KEY_SCANCEL),
    ("kCMD", "KEY_SCOMMAND", KEY_SCOMMAND),
    ("kCPY", "KEY_SCOPY", KEY_SCOPY),
    ("kCRT", "KEY_SCREATE", KEY_SCREATE),
    ("kDC", "KEY_SDC", KEY_SDC),
    ("kDL", "KEY_SDL", KEY_SDL),
    ("kEND", "KEY_SEND", KEY_SEND),
    ("kEOL", "KEY_SEOL", KEY_SEOL),
    ("kEXT", "KEY_SEXIT", KEY_SEXIT),
    ("kFND", "KEY_SFIND", KEY_SFIND),
    ("kHLP", "KEY_SHELP", KEY_SHELP),
    ("kHOM", "KEY_SHOME", KEY_SHOME),
    ("kIC", "KEY_SIC", KEY_SIC),
    ("kLFT", "KEY_SLEFT", KEY_SLEFT),
    ("kMSG", "KEY_SMESSAGE", KEY_SMESSAGE),
    ("kMOV", "KEY_SMOVE", KEY_SMOVE),
    ("kNXT", "KEY_SNEXT", KEY_SNEXT),
    ("kOPT", "KEY_SOPTIONS", KEY_SOPTIONS),
    ("kPRV", "KEY_SPREVIOUS", KEY_SPREVIOUS),
    ("kPRT", "KEY_SPRINT", KEY_SPRINT),
    ("kRDO", "KEY_SREDO", KEY_SREDO),
    ("kRPL", "KEY_SREPLACE", KEY_SREPLACE),
    ("kRIT", "KEY_SRIGHT", KEY_SRIGHT),
    ("kRES", "KEY_SRSUME", KEY_SRSUME),
    ("kSAV", "KEY_SSAVE", KEY_SSAVE),
    ("kSPD", "KEY_SSUSPEND", KEY_SSUSPEND),
    ("kUND", "KEY_SUNDO", KEY_SUNDO),
];

// Names that exist only as codes: never looked up in terminfo, but part
// of the base key set and therefore of the modifier permutations.
const EXTENSION_KEYS: &[(&str, KeyCode)] = &[
    ("KEY_TAB", KEY_TAB),
    ("KEY_ESCAPE", KEY_ESCAPE),
    ("KEY_KP_MULTIPLY", KEY_KP_MULTIPLY),
    ("KEY_KP_ADD", KEY_KP_ADD),
    ("KEY_KP_SEPARATOR", KEY_KP_SEPARATOR),
    ("KEY_KP_SUBTRACT", KEY_KP_SUBTRACT),
    ("KEY_KP_DECIMAL", KEY_KP_DECIMAL),
    ("KEY_KP_DIVIDE", KEY_KP_DIVIDE),
    ("KEY_KP_EQUAL", KEY_KP_EQUAL),
    ("KEY_KP_0", KEY_KP_0),
    ("KEY_KP_1", KEY_KP_1),
    ("KEY_KP_2", KEY_KP_2),
    ("KEY_KP_3", KEY_KP_3),
    ("KEY_KP_4", KEY_KP_4),
    ("KEY_KP_5", KEY_KP_5),
    ("KEY_KP_6", KEY_KP_6),
    ("KEY_KP_7", KEY_KP_7),
    ("KEY_KP_8", KEY_KP_8),
    ("KEY_KP_9", KEY_KP_9),
    ("KEY_MENU", KEY_MENU),
];

// Raw curses mnemonics that the friendlier spellings above supersede.
// They are registered first so that the later insert replaces them as
// the canonical name, the same way the original capability tables are
// layered.
const CURSES_MNEMONICS: &[(&str, KeyCode)] = &[
    ("KEY_DC", KEY_DC),
    ("KEY_IC", KEY_IC),
    ("KEY_PPAGE", KEY_PPAGE),
    ("KEY_NPAGE", KEY_NPAGE),
    ("KEY_EXIT", KEY_EXIT),
    ("KEY_SR", KEY_SR),
    ("KEY_SF", KEY_SF),
    ("KEY_A1", KEY_A1),
    ("KEY_A3", KEY_A3),
    ("KEY_B2", KEY_B2),
    ("KEY_C1", KEY_C1),
    ("KEY_C3", KEY_C3),
    ("KEY_BEG", KEY_BEG),
];

const EVENT_KEYS: &[(&str, KeyCode)] = &[
    ("KEY_BRACKETED_PASTE", KEY_BRACKETED_PASTE),
    ("KEY_FOCUS_IN", KEY_FOCUS_IN),
    ("KEY_FOCUS_OUT", KEY_FOCUS_OUT),
    ("KEY_MOUSE_SGR", KEY_MOUSE_SGR),
    ("KEY_MOUSE_LEGACY", KEY_MOUSE_LEGACY),
    ("KEY_SYNC_BEGIN", KEY_SYNC_BEGIN),
    ("KEY_SYNC_END", KEY_SYNC_END),
    ("KEY_KITTY_KEY", KEY_KITTY_KEY),
    ("KEY_RESIZE_EVENT", KEY_RESIZE_EVENT),
    ("KEY_DEVICE_ATTRIBUTES", KEY_DEVICE_ATTRIBUTES),
];

/// The ordered capability database: terminfo rows first, then the 63
/// function keys.
pub fn capability_keys() -> Vec<CapKey> {
    let mut keys: Vec<CapKey> = TERMINFO_KEYS
        .iter()
        .map(|&(cap, name, code)| CapKey {
            cap: cap.to_string(),
            name: name.to_string(),
            code,
        })
        .collect();
    for n in 1..=63u8 {
        keys.push(CapKey {
            cap: format!("kf{}", n),
            name: format!("KEY_F{}", n),
            code: key_f(n),
        });
    }
    keys
}

/// Characters that pair with the control key outside the letter range:
/// `Ctrl-@` is NUL, `Ctrl-[` is ESC and so on.
const CTRL_SYMBOLS: &[(char, u32)] = &[
    ('@', 0),
    ('[', 0x1b),
    ('\\', 0x1c),
    (']', 0x1d),
    ('^', 0x1e),
    ('_', 0x1f),
    ('?', 0x7f),
];

/// Map a C0 control character (or DEL) back to the key it is typed with:
/// `\x01` -> `A`, `\x1f` -> `_`, `\x7f` -> `?`.
pub fn control_char_base(c: char) -> Option<char> {
    let code = c as u32;
    if (1..=26).contains(&code) {
        return char::from_u32(code - 1 + 'A' as u32);
    }
    CTRL_SYMBOLS
        .iter()
        .find(|&&(_, v)| v == code)
        .map(|&(sym, _)| sym)
}

/// Inverse of [`control_char_base`] for the non-letter symbols.
pub fn ctrl_control_char(sym: char) -> Option<char> {
    if sym.is_ascii_alphabetic() {
        return char::from_u32(sym.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    CTRL_SYMBOLS
        .iter()
        .find(|&&(s, _)| s == sym)
        .and_then(|&(_, v)| char::from_u32(v))
}

/// Build the canonical `KEY_*` name for a base key component under the
/// given modifier set.  `base` is the name with its `KEY_` prefix already
/// stripped (`"UP"`, `"F5"`, `"A"`).  Modifier tokens always appear in
/// CTRL, ALT, SHIFT order.
pub fn modified_name(mods: Modifiers, base: &str) -> String {
    if mods.is_empty() {
        return format!("KEY_{}", base);
    }
    let mut name = String::from("KEY_");
    if mods.contains(Modifiers::CTRL) {
        name.push_str("CTRL_");
    }
    if mods.contains(Modifiers::ALT) {
        name.push_str("ALT_");
    }
    if mods.contains(Modifiers::SHIFT) {
        name.push_str("SHIFT_");
    }
    name.push_str(base);
    name
}

// Every non-empty subset of {CTRL, ALT, SHIFT}, in generation order.
pub(crate) const MODIFIER_SUBSETS: &[Modifiers] = &[
    Modifiers::CTRL,
    Modifiers::ALT,
    Modifiers::SHIFT,
    Modifiers::CTRL.union(Modifiers::ALT),
    Modifiers::CTRL.union(Modifiers::SHIFT),
    Modifiers::ALT.union(Modifiers::SHIFT),
    Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SHIFT),
];

/// The bijective code <-> canonical-name registry.
#[derive(Debug, Clone)]
pub struct KeycodeRegistry {
    names: HashMap<KeyCode, String>,
    codes: HashMap<String, KeyCode>,
    next: KeyCode,
}

impl KeycodeRegistry {
    /// Build the full default registry: curses keys with friendly
    /// overrides, extension and event blocks, then the synthetic
    /// modifier permutations over every base application key and every
    /// typeable character.
    pub fn new() -> Self {
        let mut reg = Self {
            names: HashMap::new(),
            codes: HashMap::new(),
            next: SYNTHETIC_BASE,
        };

        for &(name, code) in CURSES_MNEMONICS {
            reg.insert(name, code);
        }

        let mut base_names: Vec<(String, KeyCode)> = Vec::new();
        for key in capability_keys() {
            reg.insert(&key.name, key.code);
            base_names.push((key.name.clone(), key.code));
        }
        for &(name, code) in EXTENSION_KEYS {
            reg.insert(name, code);
            base_names.push((name.to_string(), code));
        }
        for &(name, code) in EVENT_KEYS {
            reg.insert(name, code);
        }

        // Synthetic modifier permutations over application keys.
        for (name, _) in &base_names {
            let base = &name["KEY_".len()..];
            for &mods in MODIFIER_SUBSETS {
                reg.allocate(&modified_name(mods, base));
            }
        }

        // ... and over typeable characters.  Letters are stored
        // uppercase; predicate matching is case-insensitive on the
        // character component.
        for c in ('A'..='Z').chain('0'..='9').chain("!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~".chars()) {
            for &mods in MODIFIER_SUBSETS {
                reg.allocate(&modified_name(mods, &c.to_string()));
            }
        }

        reg
    }

    fn insert(&mut self, name: &str, code: KeyCode) {
        // A later name for an existing code supersedes the earlier one
        // as the canonical spelling; the superseded name is dropped so
        // the mapping stays bijective.
        if let Some(old) = self.names.insert(code, name.to_string()) {
            self.codes.remove(&old);
        }
        self.codes.insert(name.to_string(), code);
    }

    fn allocate(&mut self, name: &str) -> KeyCode {
        if let Some(&code) = self.codes.get(name) {
            return code;
        }
        let code = self.next;
        self.next += 1;
        self.insert(name, code);
        code
    }

    /// Canonical `KEY_*` name for a code.
    pub fn name_of(&self, code: KeyCode) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    /// Code for a canonical `KEY_*` name.
    pub fn code_of(&self, name: &str) -> Option<KeyCode> {
        self.codes.get(name).copied()
    }

    /// Code for a base key component combined with modifiers, e.g.
    /// `(CTRL, "UP")` -> the code whose name is `KEY_CTRL_UP`.
    pub fn modified_code(&self, mods: Modifiers, base: &str) -> Option<KeyCode> {
        self.code_of(&modified_name(mods, base))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for KeycodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
