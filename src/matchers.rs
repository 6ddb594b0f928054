//! Pattern matchers for out-of-band terminal reports.
//!
//! Each matcher is a pure function over the head of the decoded input
//! buffer.  It either misses, reports that the buffer is a prefix of a
//! report still in flight, or yields a finished [`Keystroke`] (or an
//! internal [`Report`]) together with the number of bytes consumed.
//! Matchers never fail: malformed parameter values (zero coordinates,
//! out-of-range fields) are treated as a miss so the resolver can fall
//! through.
//!
//! [`MATCHERS`] lists them in priority order; the resolver tries every
//! one and keeps the longest hit, breaking ties by list position.
use crate::events::{
    DecMode, DecModeValue, DeviceAttributes, EventPayload, FocusEvent, KittyEventType,
    KittyKeyEvent, ModifyOtherKeysEvent, MouseLegacyEvent, MouseSgrEvent, PasteEvent, Report,
    ResizeEvent, SyncEvent,
};
use crate::input::{Keystroke, Modifiers};
use crate::keycodes::{
    modified_name, KeycodeRegistry, KEY_BRACKETED_PASTE, KEY_FOCUS_IN, KEY_FOCUS_OUT,
    KEY_KITTY_KEY, KEY_MOUSE_LEGACY, KEY_MOUSE_SGR, KEY_RESIZE_EVENT, KEY_SYNC_BEGIN,
    KEY_SYNC_END,
};

const PASTE_BEGIN: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// Outcome of one matcher attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The buffer head is not this kind of report.
    Miss,
    /// The buffer is a prefix of this kind of report; more bytes may
    /// complete it.
    Incomplete,
    /// A finished keystroke and the bytes it consumed.
    Key(Keystroke, usize),
    /// A report that completes a capability query and produces no user
    /// keystroke.
    Report(Report, usize),
}

pub(crate) type Matcher = fn(&str, &KeycodeRegistry) -> MatchOutcome;

/// All matchers, in priority order.
pub(crate) const MATCHERS: &[Matcher] = &[
    match_bracketed_paste,
    match_mouse_sgr,
    match_mouse_legacy,
    match_sync_output,
    match_focus,
    match_in_band_resize,
    match_kitty,
    match_modify_other_keys,
    match_legacy_csi,
    match_device_report,
];

/// Minimal scanning cursor over the buffer head.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

enum Lit {
    Matched,
    Partial,
    No,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    fn literal(&mut self, lit: &str) -> Lit {
        let rest = self.rest();
        if rest.len() >= lit.len() {
            if rest.as_bytes()[..lit.len()] == *lit.as_bytes() {
                self.pos += lit.len();
                Lit::Matched
            } else {
                Lit::No
            }
        } else if lit.as_bytes()[..rest.len()] == *rest.as_bytes() {
            Lit::Partial
        } else {
            Lit::No
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume a run of ASCII digits.  `None` when the head is not a
    /// digit or the value overflows u32.
    fn number(&mut self) -> Option<u32> {
        let mut value: u64 = 0;
        let mut any = false;
        while let Some(c) = self.peek() {
            if let Some(d) = c.to_digit(10) {
                value = value * 10 + u64::from(d);
                if value > u64::from(u32::MAX) {
                    return None;
                }
                self.pos += 1;
                any = true;
            } else {
                break;
            }
        }
        if any {
            Some(value as u32)
        } else {
            None
        }
    }
}

fn mouse_modifiers(shift: bool, meta: bool, ctrl: bool) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if shift {
        mods |= Modifiers::SHIFT;
    }
    if meta {
        mods |= Modifiers::ALT;
    }
    if ctrl {
        mods |= Modifiers::CTRL;
    }
    mods
}

fn match_bracketed_paste(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    if !text.starts_with(PASTE_BEGIN) {
        return if PASTE_BEGIN.starts_with(text) {
            MatchOutcome::Incomplete
        } else {
            MatchOutcome::Miss
        };
    }
    let body = &text[PASTE_BEGIN.len()..];
    match body.find(PASTE_END) {
        Some(idx) => {
            let consumed = PASTE_BEGIN.len() + idx + PASTE_END.len();
            let ks = Keystroke::event(
                &text[..consumed],
                KEY_BRACKETED_PASTE,
                "KEY_BRACKETED_PASTE",
                DecMode::BracketedPaste,
                Modifiers::NONE,
                EventPayload::Paste(PasteEvent {
                    text: body[..idx].to_string(),
                }),
            );
            MatchOutcome::Key(ks, consumed)
        }
        // the closing marker has not arrived; the read loop extends its
        // timeout budget once and retries
        None => MatchOutcome::Incomplete,
    }
}

fn match_mouse_sgr(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[<") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let b = match c.number() {
        Some(b) => b,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    if !c.eat(';') {
        return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss };
    }
    let x = match c.number() {
        Some(x) => x,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    if !c.eat(';') {
        return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss };
    }
    let y = match c.number() {
        Some(y) => y,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    let terminator = match c.bump() {
        Some(t @ ('M' | 'm')) => t,
        Some(_) => return MatchOutcome::Miss,
        None => return MatchOutcome::Incomplete,
    };

    // 1-indexed coordinates; zero or oversized values are malformed
    if x == 0 || y == 0 || x > u32::from(u16::MAX) || y > u32::from(u16::MAX) {
        return MatchOutcome::Miss;
    }

    let is_wheel = b & 64 != 0;
    let motion = b & 32 != 0;
    let button = if is_wheel { 64 + (b & 3) } else { b & 3 };
    let shift = b & 4 != 0;
    let meta = b & 8 != 0;
    let ctrl = b & 16 != 0;
    let event = MouseSgrEvent {
        button: button as u16,
        x: x as u16,
        y: y as u16,
        is_release: terminator == 'm',
        is_drag: motion && (b & 3) != 3,
        is_wheel,
        shift,
        meta,
        ctrl,
    };
    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        KEY_MOUSE_SGR,
        "KEY_MOUSE_SGR",
        DecMode::MouseSgr,
        mouse_modifiers(shift, meta, ctrl),
        EventPayload::MouseSgr(event),
    );
    MatchOutcome::Key(ks, consumed)
}

fn match_mouse_legacy(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[M") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let mut raw = [0u32; 3];
    for slot in raw.iter_mut() {
        match c.bump() {
            Some(ch) => *slot = ch as u32,
            None => return MatchOutcome::Incomplete,
        }
    }
    if raw[0] < 32 || raw[1] < 33 || raw[2] < 33 {
        // encoded as value + 32; coordinates are 1-indexed
        return MatchOutcome::Miss;
    }
    let cb = raw[0] - 32;
    let cx = raw[1] - 32;
    let cy = raw[2] - 32;
    if cx > u32::from(u16::MAX) || cy > u32::from(u16::MAX) {
        return MatchOutcome::Miss;
    }

    let mut button = cb & 3;
    let is_release = button == 3;
    if is_release {
        // release does not say which button
        button = 0;
    }
    let shift = cb & 4 != 0;
    let meta = cb & 8 != 0;
    let ctrl = cb & 16 != 0;
    let is_motion = cb & 32 != 0;
    let is_wheel = cb >= 64;
    if is_wheel {
        button = cb - 64;
    }
    let event = MouseLegacyEvent {
        button: button as u16,
        x: cx as u16,
        y: cy as u16,
        is_release,
        is_motion,
        is_drag: is_motion && !is_release,
        is_wheel,
        shift,
        meta,
        ctrl,
    };
    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        KEY_MOUSE_LEGACY,
        "KEY_MOUSE_LEGACY",
        DecMode::MouseLegacy,
        mouse_modifiers(shift, meta, ctrl),
        EventPayload::MouseLegacy(event),
    );
    MatchOutcome::Key(ks, consumed)
}

fn match_sync_output(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[?2026") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let begin = match c.bump() {
        Some('h') => true,
        Some('l') => false,
        Some(_) => return MatchOutcome::Miss,
        None => return MatchOutcome::Incomplete,
    };
    let (code, name) = if begin {
        (KEY_SYNC_BEGIN, "KEY_SYNC_BEGIN")
    } else {
        (KEY_SYNC_END, "KEY_SYNC_END")
    };
    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        code,
        name,
        DecMode::SyncOutput,
        Modifiers::NONE,
        EventPayload::Sync(SyncEvent { begin }),
    );
    MatchOutcome::Key(ks, consumed)
}

fn match_focus(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let gained = match c.bump() {
        Some('I') => true,
        Some('O') => false,
        Some(_) => return MatchOutcome::Miss,
        None => return MatchOutcome::Incomplete,
    };
    let (code, name) = if gained {
        (KEY_FOCUS_IN, "KEY_FOCUS_IN")
    } else {
        (KEY_FOCUS_OUT, "KEY_FOCUS_OUT")
    };
    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        code,
        name,
        DecMode::Focus,
        Modifiers::NONE,
        EventPayload::Focus(FocusEvent { gained }),
    );
    MatchOutcome::Key(ks, consumed)
}

fn match_in_band_resize(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[48;") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let mut fields = Vec::with_capacity(4);
    loop {
        match c.number() {
            Some(n) => fields.push(n),
            None => {
                return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss }
            }
        }
        match c.bump() {
            Some(';') if fields.len() < 4 => continue,
            Some('t') => break,
            Some(_) => return MatchOutcome::Miss,
            None => return MatchOutcome::Incomplete,
        }
    }
    // height and width in cells are required; pixel sizes are optional
    if fields.len() != 2 && fields.len() != 4 {
        return MatchOutcome::Miss;
    }
    let (rows, cols) = (fields[0], fields[1]);
    if rows == 0 || cols == 0 {
        return MatchOutcome::Miss;
    }
    let (ypixel, xpixel) = if fields.len() == 4 {
        (fields[2], fields[3])
    } else {
        (0, 0)
    };
    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        KEY_RESIZE_EVENT,
        "KEY_RESIZE_EVENT",
        DecMode::InBandResize,
        Modifiers::NONE,
        EventPayload::Resize(ResizeEvent {
            rows: rows as usize,
            cols: cols as usize,
            xpixel: xpixel as usize,
            ypixel: ypixel as usize,
        }),
    );
    MatchOutcome::Key(ks, consumed)
}

/// Key component for a codepoint reported by the CSI-u protocols:
/// the well-known control keys by their key name, printable characters
/// by themselves (letters uppercased).
fn codepoint_component(cp: u32) -> Option<String> {
    match cp {
        8 | 127 => Some("BACKSPACE".to_string()),
        9 => Some("TAB".to_string()),
        10 | 13 => Some("ENTER".to_string()),
        27 => Some("ESCAPE".to_string()),
        _ => {
            let c = char::from_u32(cp)?;
            if c.is_control() {
                None
            } else {
                Some(c.to_uppercase().to_string())
            }
        }
    }
}

fn match_kitty(text: &str, reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let unicode_key = match c.number() {
        Some(n) => n,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    let mut shifted_key = None;
    let mut base_key = None;
    if c.eat(':') {
        shifted_key = c.number();
        if c.eat(':') {
            base_key = c.number();
        }
    }
    let mut modifiers = 1;
    let mut event_type = 1;
    let mut text_codepoints = Vec::new();
    if c.eat(';') {
        modifiers = match c.number() {
            Some(n) => n,
            None => {
                return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss }
            }
        };
        if c.eat(':') {
            event_type = match c.number() {
                Some(n) => n,
                None => {
                    return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss }
                }
            };
        }
        if c.eat(';') {
            loop {
                match c.number() {
                    Some(n) => text_codepoints.push(n),
                    None => {
                        return if c.at_end() {
                            MatchOutcome::Incomplete
                        } else {
                            MatchOutcome::Miss
                        }
                    }
                }
                if !c.eat(':') {
                    break;
                }
            }
        }
    }
    if !c.eat('u') {
        return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss };
    }
    let event_type = match KittyEventType::from_field(event_type) {
        Some(t) => t,
        None => return MatchOutcome::Miss,
    };
    if modifiers == 0 {
        return MatchOutcome::Miss;
    }

    let mods = Modifiers::from_wire(modifiers);
    let (code, base_name) = codepoint_component(unicode_key)
        .map(|comp| modified_name(mods, &comp))
        .and_then(|name| reg.code_of(&name).map(|code| (code, name)))
        .unwrap_or((KEY_KITTY_KEY, "KEY_KITTY_KEY".to_string()));
    let name = match event_type {
        KittyEventType::Press => base_name,
        KittyEventType::Repeat => format!("{}_REPEATED", base_name),
        KittyEventType::Release => format!("{}_RELEASED", base_name),
    };

    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        code,
        name,
        DecMode::Kitty,
        mods,
        EventPayload::Kitty(KittyKeyEvent {
            unicode_key,
            shifted_key,
            base_key,
            modifiers,
            event_type,
            text_codepoints,
        }),
    );
    MatchOutcome::Key(ks, consumed)
}

fn match_modify_other_keys(text: &str, reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[27;") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let modifiers = match c.number() {
        Some(n) => n,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    if !c.eat(';') {
        return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss };
    }
    let key = match c.number() {
        Some(n) => n,
        None => return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss },
    };
    if !c.eat('~') {
        // more digits or the tilde may still arrive
        return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss };
    }
    if modifiers == 0 {
        return MatchOutcome::Miss;
    }

    let mods = Modifiers::from_wire(modifiers);
    let (code, name) = match codepoint_component(key)
        .map(|comp| modified_name(mods, &comp))
        .and_then(|name| reg.code_of(&name).map(|code| (code, name)))
    {
        Some(found) => found,
        None => return MatchOutcome::Miss,
    };

    let consumed = c.pos;
    let ks = Keystroke::event(
        &text[..consumed],
        code,
        name,
        DecMode::ModifyOtherKeys,
        mods,
        EventPayload::ModifyOtherKeys(ModifyOtherKeysEvent { key, modifiers }),
    );
    MatchOutcome::Key(ks, consumed)
}

// base key components for the legacy CSI letter finals
fn csi_letter_component(letter: char) -> Option<&'static str> {
    match letter {
        'A' => Some("UP"),
        'B' => Some("DOWN"),
        'C' => Some("RIGHT"),
        'D' => Some("LEFT"),
        'F' => Some("END"),
        'H' => Some("HOME"),
        'P' => Some("F1"),
        'Q' => Some("F2"),
        'R' => Some("F3"),
        'S' => Some("F4"),
        _ => None,
    }
}

// base key components for the legacy CSI tilde numbers
fn csi_tilde_component(num: u32) -> Option<&'static str> {
    match num {
        2 => Some("INSERT"),
        3 => Some("DELETE"),
        5 => Some("PGUP"),
        6 => Some("PGDOWN"),
        7 => Some("HOME"),
        8 => Some("END"),
        13 => Some("F3"),
        15 => Some("F5"),
        17 => Some("F6"),
        18 => Some("F7"),
        19 => Some("F8"),
        20 => Some("F9"),
        21 => Some("F10"),
        23 => Some("F11"),
        24 => Some("F12"),
        29 => Some("MENU"),
        _ => None,
    }
}

fn synthesize_modified(
    reg: &KeycodeRegistry,
    text: &str,
    consumed: usize,
    mods: Modifiers,
    component: &str,
) -> MatchOutcome {
    let name = modified_name(mods, component);
    match reg.code_of(&name) {
        Some(code) => {
            let ks = Keystroke::modified(&text[..consumed], code, name, mods)
                .with_mode(DecMode::LegacyCsi);
            MatchOutcome::Key(ks, consumed)
        }
        None => MatchOutcome::Miss,
    }
}

fn match_legacy_csi(text: &str, reg: &KeycodeRegistry) -> MatchOutcome {
    // letter form: ESC [ 1 ; mods <final>, arrows / home / end / F1-F4
    let mut c = Cursor::new(text);
    match c.literal("\x1b[1;") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::Matched => {
            let mods = match c.number() {
                Some(n) if n >= 1 => n,
                Some(_) => return MatchOutcome::Miss,
                None => {
                    return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss }
                }
            };
            return match c.bump() {
                Some(letter) => match csi_letter_component(letter) {
                    Some(comp) => {
                        synthesize_modified(reg, text, c.pos, Modifiers::from_wire(mods), comp)
                    }
                    None => MatchOutcome::Miss,
                },
                None => MatchOutcome::Incomplete,
            };
        }
        Lit::No => {}
    }

    // tilde form: ESC [ num ; mods ~
    let mut c = Cursor::new(text);
    if let Lit::Matched = c.literal("\x1b[") {
        if let Some(num) = c.number() {
            if c.eat(';') {
                match c.number() {
                    Some(mods) if mods >= 1 => {
                        if c.eat('~') {
                            if let Some(comp) = csi_tilde_component(num) {
                                return synthesize_modified(
                                    reg,
                                    text,
                                    c.pos,
                                    Modifiers::from_wire(mods),
                                    comp,
                                );
                            }
                            return MatchOutcome::Miss;
                        }
                        if c.at_end() {
                            return MatchOutcome::Incomplete;
                        }
                    }
                    Some(_) => return MatchOutcome::Miss,
                    None if c.at_end() => return MatchOutcome::Incomplete,
                    None => {}
                }
            } else if c.at_end() {
                return MatchOutcome::Incomplete;
            }
        }
    }

    // SS3 form with a single modifier digit: ESC O mods <PQRS>
    let mut c = Cursor::new(text);
    match c.literal("\x1bO") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let mods = match c.peek() {
        Some(d @ '1'..='9') => {
            c.bump();
            d.to_digit(10).unwrap()
        }
        Some('0') => return MatchOutcome::Miss,
        Some(_) => return MatchOutcome::Miss,
        None => return MatchOutcome::Incomplete,
    };
    match c.bump() {
        Some(letter @ ('P' | 'Q' | 'R' | 'S')) => {
            let comp = csi_letter_component(letter).unwrap();
            synthesize_modified(reg, text, c.pos, Modifiers::from_wire(mods), comp)
        }
        Some(_) => MatchOutcome::Miss,
        None => MatchOutcome::Incomplete,
    }
}

fn match_device_report(text: &str, _reg: &KeycodeRegistry) -> MatchOutcome {
    let mut c = Cursor::new(text);
    match c.literal("\x1b[?") {
        Lit::Partial => return MatchOutcome::Incomplete,
        Lit::No => return MatchOutcome::Miss,
        Lit::Matched => {}
    }
    let mut fields = Vec::new();
    loop {
        match c.number() {
            Some(n) => fields.push(n),
            None => {
                return if c.at_end() { MatchOutcome::Incomplete } else { MatchOutcome::Miss }
            }
        }
        match c.bump() {
            Some(';') => continue,
            Some('c') => {
                // DA1 response
                let service_class = match u16::try_from(fields[0]) {
                    Ok(v) => v,
                    Err(_) => return MatchOutcome::Miss,
                };
                let extensions = fields[1..]
                    .iter()
                    .filter_map(|&n| u16::try_from(n).ok())
                    .collect();
                return MatchOutcome::Report(
                    Report::DeviceAttributes(DeviceAttributes {
                        service_class,
                        extensions,
                    }),
                    c.pos,
                );
            }
            Some('$') => {
                // DECRPM: exactly mode and value
                return match c.bump() {
                    Some('y') => {
                        if fields.len() != 2 {
                            return MatchOutcome::Miss;
                        }
                        let mode = match u16::try_from(fields[0]) {
                            Ok(v) => v,
                            Err(_) => return MatchOutcome::Miss,
                        };
                        match DecModeValue::from_field(fields[1]) {
                            Some(value) => {
                                MatchOutcome::Report(Report::DecMode { mode, value }, c.pos)
                            }
                            None => MatchOutcome::Miss,
                        }
                    }
                    Some(_) => MatchOutcome::Miss,
                    None => MatchOutcome::Incomplete,
                };
            }
            Some(_) => return MatchOutcome::Miss,
            None => return MatchOutcome::Incomplete,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use k9::assert_equal as assert_eq;

    fn reg() -> KeycodeRegistry {
        KeycodeRegistry::new()
    }

    fn expect_key(outcome: MatchOutcome) -> (Keystroke, usize) {
        match outcome {
            MatchOutcome::Key(ks, n) => (ks, n),
            other => panic!("expected a keystroke, got {:?}", other),
        }
    }

    #[test]
    fn paste_block() {
        let reg = reg();
        let (ks, n) = expect_key(match_bracketed_paste("\x1b[200~hello\nworld\x1b[201~x", &reg));
        assert_eq!(n, 23);
        assert_eq!(ks.name(), Some("KEY_BRACKETED_PASTE"));
        match ks.event_payload() {
            Some(EventPayload::Paste(p)) => { assert_eq!(p.text.as_str(), "hello\nworld"); }
            other => panic!("{:?}", other),
        }

        assert_eq!(
            match_bracketed_paste("\x1b[200~partial", &reg),
            MatchOutcome::Incomplete
        );
        assert_eq!(match_bracketed_paste("\x1b[20", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_bracketed_paste("\x1b[201~", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn sgr_mouse() {
        let reg = reg();
        let (ks, n) = expect_key(match_mouse_sgr("\x1b[<0;10;20M", &reg));
        assert_eq!(n, 11);
        assert_eq!(ks.name(), Some("KEY_MOUSE_SGR"));
        match ks.event_payload() {
            Some(EventPayload::MouseSgr(m)) => {
                assert_eq!(m.button, 0);
                assert_eq!(m.x, 10);
                assert_eq!(m.y, 20);
                assert!(!m.is_release);
                assert!(!m.is_drag);
                assert!(!m.is_wheel);
            }
            other => panic!("{:?}", other),
        }

        // release, ctrl held
        let (ks, _) = expect_key(match_mouse_sgr("\x1b[<16;1;1m", &reg));
        assert!(ks.ctrl());
        match ks.event_payload() {
            Some(EventPayload::MouseSgr(m)) => {
                assert!(m.is_release);
                assert!(m.ctrl);
            }
            other => panic!("{:?}", other),
        }

        // wheel up
        let (ks, _) = expect_key(match_mouse_sgr("\x1b[<64;5;5M", &reg));
        match ks.event_payload() {
            Some(EventPayload::MouseSgr(m)) => {
                assert!(m.is_wheel);
                assert_eq!(m.button, 64);
            }
            other => panic!("{:?}", other),
        }

        // drag: motion with a button held
        let (ks, _) = expect_key(match_mouse_sgr("\x1b[<32;3;4M", &reg));
        match ks.event_payload() {
            Some(EventPayload::MouseSgr(m)) => assert!(m.is_drag),
            other => panic!("{:?}", other),
        }

        // zero coordinates are malformed
        assert_eq!(match_mouse_sgr("\x1b[<0;0;20M", &reg), MatchOutcome::Miss);
        assert_eq!(match_mouse_sgr("\x1b[<0;10;", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_mouse_sgr("\x1b[<0;10;20", &reg), MatchOutcome::Incomplete);
    }

    #[test]
    fn legacy_mouse() {
        let reg = reg();
        // button 0 press at (1, 1): cb=32, cx=33, cy=33
        let (ks, n) = expect_key(match_mouse_legacy("\x1b[M \u{21}\u{21}", &reg));
        assert_eq!(n, 6);
        assert_eq!(ks.name(), Some("KEY_MOUSE_LEGACY"));
        match ks.event_payload() {
            Some(EventPayload::MouseLegacy(m)) => {
                assert_eq!(m.button, 0);
                assert_eq!(m.x, 1);
                assert_eq!(m.y, 1);
                assert!(!m.is_release);
                assert!(!m.is_motion);
            }
            other => panic!("{:?}", other),
        }

        // release: cb = 32 + 3
        let (ks, _) = expect_key(match_mouse_legacy("\x1b[M#\u{21}\u{21}", &reg));
        match ks.event_payload() {
            Some(EventPayload::MouseLegacy(m)) => {
                assert!(m.is_release);
                assert_eq!(m.button, 0);
            }
            other => panic!("{:?}", other),
        }

        assert_eq!(match_mouse_legacy("\x1b[M \u{21}", &reg), MatchOutcome::Incomplete);
        // coordinate byte below the offset is malformed
        assert_eq!(match_mouse_legacy("\x1b[M \u{1}\u{21}", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn sync_reports() {
        let reg = reg();
        let (ks, _) = expect_key(match_sync_output("\x1b[?2026h", &reg));
        assert_eq!(ks.name(), Some("KEY_SYNC_BEGIN"));
        let (ks, _) = expect_key(match_sync_output("\x1b[?2026l", &reg));
        assert_eq!(ks.name(), Some("KEY_SYNC_END"));
        assert_eq!(match_sync_output("\x1b[?202", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_sync_output("\x1b[?2026x", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn focus_reports() {
        let reg = reg();
        let (ks, n) = expect_key(match_focus("\x1b[I", &reg));
        assert_eq!(n, 3);
        assert_eq!(ks.name(), Some("KEY_FOCUS_IN"));
        match ks.event_payload() {
            Some(EventPayload::Focus(f)) => assert!(f.gained),
            other => panic!("{:?}", other),
        }
        let (ks, _) = expect_key(match_focus("\x1b[O", &reg));
        assert_eq!(ks.name(), Some("KEY_FOCUS_OUT"));
        assert_eq!(match_focus("\x1b[", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_focus("\x1b[A", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn in_band_resize() {
        let reg = reg();
        let (ks, _) = expect_key(match_in_band_resize("\x1b[48;50;120;800;1920t", &reg));
        assert_eq!(ks.name(), Some("KEY_RESIZE_EVENT"));
        match ks.event_payload() {
            Some(EventPayload::Resize(r)) => {
                assert_eq!(r.rows, 50);
                assert_eq!(r.cols, 120);
                assert_eq!(r.ypixel, 800);
                assert_eq!(r.xpixel, 1920);
            }
            other => panic!("{:?}", other),
        }

        // pixel fields are optional
        let (ks, _) = expect_key(match_in_band_resize("\x1b[48;24;80t", &reg));
        match ks.event_payload() {
            Some(EventPayload::Resize(r)) => {
                assert_eq!(r.rows, 24);
                assert_eq!(r.cols, 80);
            }
            other => panic!("{:?}", other),
        }

        assert_eq!(match_in_band_resize("\x1b[48;24", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_in_band_resize("\x1b[48;0;80t", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn kitty_protocol() {
        let reg = reg();
        // ctrl+a
        let (ks, _) = expect_key(match_kitty("\x1b[97;5u", &reg));
        assert_eq!(ks.name(), Some("KEY_CTRL_A"));
        assert!(ks.ctrl());
        assert_eq!(ks.mode(), Some(DecMode::Kitty));

        // release of ctrl+a
        let (ks, _) = expect_key(match_kitty("\x1b[97;5:3u", &reg));
        assert_eq!(ks.name(), Some("KEY_CTRL_A_RELEASED"));

        // plain key with associated text
        let (ks, _) = expect_key(match_kitty("\x1b[97;1;97u", &reg));
        match ks.event_payload() {
            Some(EventPayload::Kitty(k)) => {
                assert_eq!(k.unicode_key, 97);
                assert_eq!(k.text_codepoints.clone(), vec![97]);
            }
            other => panic!("{:?}", other),
        }
        assert_eq!(ks.value(), "a".to_string());

        // alternate keys
        let (ks, _) = expect_key(match_kitty("\x1b[97:65:97;2u", &reg));
        match ks.event_payload() {
            Some(EventPayload::Kitty(k)) => {
                assert_eq!(k.shifted_key, Some(65));
                assert_eq!(k.base_key, Some(97));
            }
            other => panic!("{:?}", other),
        }

        // the super bit is not mapped into modifiers
        let (ks, _) = expect_key(match_kitty("\x1b[97;9u", &reg));
        assert_eq!(ks.modifiers(), Modifiers::NONE);
        match ks.event_payload() {
            Some(EventPayload::Kitty(k)) => { assert_eq!(k.modifiers, 9); }
            other => panic!("{:?}", other),
        }

        assert_eq!(match_kitty("\x1b[97;5", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_kitty("\x1b[97;5:9u", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn modify_other_keys() {
        let reg = reg();
        let (ks, _) = expect_key(match_modify_other_keys("\x1b[27;5;97~", &reg));
        assert_eq!(ks.name(), Some("KEY_CTRL_A"));
        assert_eq!(ks.mode(), Some(DecMode::ModifyOtherKeys));
        assert!(ks.ctrl());

        let (ks, _) = expect_key(match_modify_other_keys("\x1b[27;3;9~", &reg));
        assert_eq!(ks.name(), Some("KEY_ALT_TAB"));

        assert_eq!(
            match_modify_other_keys("\x1b[27;5;97", &reg),
            MatchOutcome::Incomplete
        );
        assert_eq!(match_modify_other_keys("\x1b[28;5;97~", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn legacy_csi_modifiers() {
        let reg = reg();
        let (ks, n) = expect_key(match_legacy_csi("\x1b[1;5A", &reg));
        assert_eq!(n, 6);
        assert_eq!(ks.name(), Some("KEY_CTRL_UP"));
        assert_eq!(ks.mode(), Some(DecMode::LegacyCsi));

        let (ks, _) = expect_key(match_legacy_csi("\x1b[1;6H", &reg));
        assert_eq!(ks.name(), Some("KEY_CTRL_SHIFT_HOME"));

        let (ks, _) = expect_key(match_legacy_csi("\x1b[3;3~", &reg));
        assert_eq!(ks.name(), Some("KEY_ALT_DELETE"));

        let (ks, _) = expect_key(match_legacy_csi("\x1bO5P", &reg));
        assert_eq!(ks.name(), Some("KEY_CTRL_F1"));

        assert_eq!(match_legacy_csi("\x1b[1;", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_legacy_csi("\x1b[3;3", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_legacy_csi("\x1bO0P", &reg), MatchOutcome::Miss);
        // unmapped tilde number falls through
        assert_eq!(match_legacy_csi("\x1b[99;5~", &reg), MatchOutcome::Miss);
    }

    #[test]
    fn device_reports() {
        let reg = reg();
        match match_device_report("\x1b[?64;1;2;4;7c", &reg) {
            MatchOutcome::Report(Report::DeviceAttributes(da), n) => {
                assert_eq!(n, 14);
                assert_eq!(da.service_class, 64);
                assert!(da.supports_sixel());
            }
            other => panic!("{:?}", other),
        }

        match match_device_report("\x1b[?2026;1$y", &reg) {
            MatchOutcome::Report(Report::DecMode { mode, value }, _) => {
                assert_eq!(mode, 2026);
                assert_eq!(value, DecModeValue::Set);
            }
            other => panic!("{:?}", other),
        }

        assert_eq!(match_device_report("\x1b[?64;1", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_device_report("\x1b[?2026;1$", &reg), MatchOutcome::Incomplete);
        assert_eq!(match_device_report("\x1b[?2026;9$y", &reg), MatchOutcome::Miss);
    }
}
