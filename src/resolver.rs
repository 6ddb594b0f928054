//! The keystroke resolver: given the decoded input buffer and the
//! immutable tables, pick the longest recognizable keystroke at its
//! head, or report that the buffer might still grow into one.
//!
//! The resolver is pure.  It never reads, sleeps or fails; the read
//! loop owns all timing, including the decision to pass `is_final=true`
//! once the escape delay has elapsed.
use crate::events::Report;
use crate::input::{Keystroke, Modifiers};
use crate::keycodes::{control_char_base, modified_name, KeycodeRegistry, KEY_ESCAPE};
use crate::keymap::SequenceTables;
use crate::matchers::{MatchOutcome, MATCHERS};

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The buffer is empty.
    None,
    /// The buffer may still grow into a longer match; read more bytes
    /// before deciding.  Never returned when `is_final` is set.
    Wait,
    /// A finished keystroke and the bytes it consumed.
    Key(Keystroke, usize),
    /// An internal report (device attributes, DEC mode): consumed and
    /// routed to the capability caches, never surfaced to the caller.
    Report(Report, usize),
}

enum Candidate {
    Key(Keystroke),
    Report(Report),
}

/// Resolve the head of `buffer` against the tables.
///
/// `is_final` signals that the escape delay has expired and no more
/// bytes are coming right now: prefix states stop waiting and resolve
/// to their best available interpretation.
pub fn resolve(buffer: &str, tables: &SequenceTables, is_final: bool) -> Resolution {
    if buffer.is_empty() {
        return Resolution::None;
    }

    // Event matchers, in priority order.  The longest hit wins; list
    // position breaks ties, so only a strictly longer hit replaces an
    // earlier one.
    let mut matcher_best: Option<(usize, Candidate)> = None;
    let mut pattern_pending = false;
    for matcher in MATCHERS {
        match matcher(buffer, &tables.registry) {
            MatchOutcome::Miss => {}
            MatchOutcome::Incomplete => pattern_pending = true,
            MatchOutcome::Key(ks, n) => {
                if matcher_best.as_ref().map_or(true, |&(best, _)| n > best) {
                    matcher_best = Some((n, Candidate::Key(ks)));
                }
            }
            MatchOutcome::Report(report, n) => {
                if matcher_best.as_ref().map_or(true, |&(best, _)| n > best) {
                    matcher_best = Some((n, Candidate::Report(report)));
                }
            }
        }
    }

    let hit = tables.keymap.lookup(buffer);

    // The whole buffer is a proper prefix of a longer sequence or
    // pattern: hold out for more bytes until the delay expires.
    if !is_final && (pattern_pending || hit.could_extend) {
        return Resolution::Wait;
    }

    let trie_best = hit.best;

    match (matcher_best, trie_best) {
        // A pattern hit wins ties against the sequence table.
        (Some((mn, cand)), Some((tn, _))) if mn >= tn => emit(cand, mn),
        (Some(_), Some((tn, code))) => emit_sequence(buffer, tn, code, tables, is_final),
        (Some((mn, cand)), None) => emit(cand, mn),
        (None, Some((tn, code))) => emit_sequence(buffer, tn, code, tables, is_final),
        (None, None) => emit_text(buffer, tables),
    }
}

fn emit(candidate: Candidate, consumed: usize) -> Resolution {
    match candidate {
        Candidate::Key(ks) => Resolution::Key(ks, consumed),
        Candidate::Report(report) => Resolution::Report(report, consumed),
    }
}

fn emit_sequence(
    buffer: &str,
    consumed: usize,
    code: u16,
    tables: &SequenceTables,
    is_final: bool,
) -> Resolution {
    // A bare ESC followed by more input is metaSendsEscape: the pair
    // resolves as an alt-modified key.  Reaching this point means the
    // buffer can no longer extend into a known sequence (or the delay
    // expired), so the two characters are consumed together.
    if code == KEY_ESCAPE && consumed == 1 && buffer.chars().count() >= 2 {
        if let Some((ks, n)) = synthesize_meta(buffer, &tables.registry) {
            return Resolution::Key(ks, n);
        }
        if is_final || !tables.keymap.is_prefix(buffer) {
            // unrecognized alt pairing, emit the two chars as text
            let n = 1 + buffer[1..].chars().next().map_or(0, char::len_utf8);
            return Resolution::Key(Keystroke::text(&buffer[..n]), n);
        }
    }

    let name = tables
        .registry
        .name_of(code)
        .unwrap_or("KEY_UNKNOWN")
        .to_string();
    Resolution::Key(
        Keystroke::key(&buffer[..consumed], code, name),
        consumed,
    )
}

/// ESC + one character, interpreted as an alt (meta) chord.
fn synthesize_meta(buffer: &str, registry: &KeycodeRegistry) -> Option<(Keystroke, usize)> {
    let mut chars = buffer.chars();
    let esc = chars.next()?;
    debug_assert_eq!(esc, '\x1b');
    let c = chars.next()?;
    let consumed = 1 + c.len_utf8();

    let (mods, component) = match c {
        '\x7f' | '\x08' => (Modifiers::ALT, "BACKSPACE".to_string()),
        '\t' => (Modifiers::ALT, "TAB".to_string()),
        '\r' | '\n' => (Modifiers::ALT, "ENTER".to_string()),
        '\x1b' => (Modifiers::ALT, "ESCAPE".to_string()),
        c if c.is_control() => {
            // ESC prefix plus a control char: the control char itself
            // already encodes ctrl, so the chord is ctrl+alt
            let base = control_char_base(c)?;
            (Modifiers::CTRL | Modifiers::ALT, base.to_string())
        }
        c if c.is_uppercase() => (Modifiers::ALT | Modifiers::SHIFT, c.to_string()),
        c => (Modifiers::ALT, c.to_uppercase().to_string()),
    };

    let name = modified_name(mods, &component);
    let code = registry.code_of(&name)?;
    Some((
        Keystroke::modified(&buffer[..consumed], code, name, mods),
        consumed,
    ))
}

/// No sequence and no pattern matched: emit the first codepoint, as a
/// ctrl-synthesized key for bare control characters, plain text
/// otherwise.
fn emit_text(buffer: &str, tables: &SequenceTables) -> Resolution {
    let c = match buffer.chars().next() {
        Some(c) => c,
        None => return Resolution::None,
    };
    let n = c.len_utf8();
    let text = &buffer[..n];

    if c.is_control() {
        if let Some(base) = control_char_base(c) {
            let name = modified_name(Modifiers::CTRL, &base.to_string());
            if let Some(code) = tables.registry.code_of(&name) {
                return Resolution::Key(
                    Keystroke::modified(text, code, name, Modifiers::CTRL),
                    n,
                );
            }
        }
    }

    Resolution::Key(Keystroke::text(text), n)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::{DecMode, EventPayload};
    use crate::keycodes::{KEY_BRACKETED_PASTE, KEY_F1, KEY_FOCUS_IN, KEY_MOUSE_SGR, KEY_UP};
    use crate::keymap::build_tables;

    const FINAL: bool = true;
    const MORE_MAY_COME: bool = false;

    fn tables() -> SequenceTables {
        build_tables(|_| None)
    }

    fn expect_key(res: Resolution) -> (Keystroke, usize) {
        match res {
            Resolution::Key(ks, n) => (ks, n),
            other => panic!("expected a keystroke, got {:?}", other),
        }
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(resolve("", &tables(), MORE_MAY_COME), Resolution::None);
    }

    #[test]
    fn plain_text() {
        let (ks, n) = expect_key(resolve("abc", &tables(), MORE_MAY_COME));
        assert_eq!(n, 1);
        assert_eq!(ks, "a");
        assert!(!ks.is_sequence());
    }

    #[test]
    fn multibyte_text() {
        let (ks, n) = expect_key(resolve("Ωx", &tables(), MORE_MAY_COME));
        assert_eq!(n, 'Ω'.len_utf8());
        assert_eq!(ks, "Ω");
    }

    #[test]
    fn csi_arrow() {
        let (ks, n) = expect_key(resolve("\x1b[A", &tables(), MORE_MAY_COME));
        assert_eq!(n, 3);
        assert_eq!(ks.name(), Some("KEY_UP"));
        assert_eq!(ks.code(), Some(KEY_UP));
        assert_eq!(ks, "\x1b[A");
    }

    #[test]
    fn longer_sequence_beats_its_prefix() {
        // ESC alone is a sequence, but a full arrow in one read must
        // resolve as the arrow
        let tables = tables();
        let (ks, _) = expect_key(resolve("\x1b[A", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_UP"));
        let (ks, _) = expect_key(resolve("\x1bOP", &tables, MORE_MAY_COME));
        assert_eq!(ks.code(), Some(KEY_F1));
    }

    #[test]
    fn lone_escape_waits_then_resolves() {
        let tables = tables();
        assert_eq!(resolve("\x1b", &tables, MORE_MAY_COME), Resolution::Wait);
        let (ks, n) = expect_key(resolve("\x1b", &tables, FINAL));
        assert_eq!(n, 1);
        assert_eq!(ks.name(), Some("KEY_ESCAPE"));
        assert_eq!(ks, "\x1b");
    }

    #[test]
    fn csi_prefix_waits() {
        let tables = tables();
        assert_eq!(resolve("\x1b[", &tables, MORE_MAY_COME), Resolution::Wait);
        assert_eq!(resolve("\x1b[1", &tables, MORE_MAY_COME), Resolution::Wait);
        // after the delay the CSI introducer resolves as alt-[
        let (ks, n) = expect_key(resolve("\x1b[", &tables, FINAL));
        assert_eq!(n, 2);
        assert_eq!(ks.name(), Some("KEY_ALT_["));
    }

    #[test]
    fn meta_sends_escape() {
        let tables = tables();
        // unambiguous alt pairing resolves without waiting
        let (ks, n) = expect_key(resolve("\x1bq", &tables, MORE_MAY_COME));
        assert_eq!(n, 2);
        assert_eq!(ks.name(), Some("KEY_ALT_Q"));
        assert!(ks.alt());
        assert_eq!(ks.value(), "q");

        let (ks, _) = expect_key(resolve("\x1bQ", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_ALT_SHIFT_Q"));

        let (ks, _) = expect_key(resolve("\x1b\x7f", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_ALT_BACKSPACE"));

        // ESC + control char is ctrl+alt
        let (ks, _) = expect_key(resolve("\x1b\x01", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_CTRL_ALT_A"));
    }

    #[test]
    fn bare_control_characters() {
        let tables = tables();
        let (ks, _) = expect_key(resolve("\x01", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_CTRL_A"));
        assert!(ks.ctrl());
        assert_eq!(ks.value(), "a");

        // mixin-mapped control chars keep their key identity
        let (ks, _) = expect_key(resolve("\t", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_TAB"));
        let (ks, _) = expect_key(resolve("\r", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_ENTER"));
        let (ks, _) = expect_key(resolve("\x7f", &tables, MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_BACKSPACE"));
    }

    #[test]
    fn modified_arrow_over_sequence_hit() {
        let (ks, n) = expect_key(resolve("\x1b[1;5A", &tables(), MORE_MAY_COME));
        assert_eq!(n, 6);
        assert_eq!(ks.name(), Some("KEY_CTRL_UP"));
        assert!(ks.ctrl());
    }

    #[test]
    fn sgr_mouse_event() {
        let (ks, n) = expect_key(resolve("\x1b[<0;10;20M", &tables(), MORE_MAY_COME));
        assert_eq!(n, 11);
        assert_eq!(ks.code(), Some(KEY_MOUSE_SGR));
        match ks.event_payload() {
            Some(EventPayload::MouseSgr(m)) => {
                assert_eq!((m.button, m.x, m.y, m.is_release), (0, 10, 20, false));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn paste_event() {
        let (ks, n) = expect_key(resolve(
            "\x1b[200~hello\x1b[201~",
            &tables(),
            MORE_MAY_COME,
        ));
        assert_eq!(n, 17);
        assert_eq!(ks.code(), Some(KEY_BRACKETED_PASTE));
        match ks.event_payload() {
            Some(EventPayload::Paste(p)) => assert_eq!(p.text, "hello"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn unfinished_paste_waits_then_degrades() {
        let tables = tables();
        assert_eq!(
            resolve("\x1b[200~partial", &tables, MORE_MAY_COME),
            Resolution::Wait
        );
        // once final, the introducer resolves as alt-[ and the body as text
        let (ks, _) = expect_key(resolve("\x1b[200~partial", &tables, FINAL));
        assert_eq!(ks.name(), Some("KEY_ALT_["));
    }

    #[test]
    fn focus_event() {
        let (ks, _) = expect_key(resolve("\x1b[I", &tables(), MORE_MAY_COME));
        assert_eq!(ks.code(), Some(KEY_FOCUS_IN));
        assert_eq!(ks.mode(), Some(DecMode::Focus));
    }

    #[test]
    fn keypad_ss3_beats_focus_pattern() {
        // "\x1b[O" looks like focus-out, but with one more byte the
        // longer keypad sequence must win
        let tables = tables();
        assert_eq!(resolve("\x1b[O", &tables, MORE_MAY_COME), Resolution::Wait);
        let (ks, n) = expect_key(resolve("\x1b[OA", &tables, MORE_MAY_COME));
        assert_eq!(n, 4);
        assert_eq!(ks.name(), Some("KEY_UP"));
        // after the delay with no further byte, focus-out it is
        let (ks, n) = expect_key(resolve("\x1b[O", &tables, FINAL));
        assert_eq!(n, 3);
        assert_eq!(ks.name(), Some("KEY_FOCUS_OUT"));
    }

    #[test]
    fn device_attributes_become_reports() {
        match resolve("\x1b[?64;4c", &tables(), MORE_MAY_COME) {
            Resolution::Report(Report::DeviceAttributes(da), n) => {
                assert_eq!(n, 8);
                assert!(da.supports_sixel());
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn trailing_bytes_stay_in_buffer() {
        let (ks, n) = expect_key(resolve("\x1b[Aqq", &tables(), MORE_MAY_COME));
        assert_eq!(ks.name(), Some("KEY_UP"));
        assert_eq!(n, 3);
    }
}
