//! The input side of a terminal device: the blocking/timeout read loop
//! that feeds the resolver and hands out [`Keystroke`]s.
//!
//! [`Terminal`] is generic over a [`ByteSource`], the collaborator that
//! owns the file descriptor and its poll/read plumbing.  The source is
//! assumed to be in character-at-a-time (cbreak or raw) mode; switching
//! modes is the source's business, see [`unix::TtySource`].
use crate::caps::Capabilities;
use crate::decoder::{IncrementalDecoder, InputEncoding};
use crate::events::{DecModeValue, DeviceAttributes, EventPayload, Report, ResizeEvent};
use crate::input::{Keystroke, Modifiers};
use crate::keycodes::{KeycodeRegistry, KEY_RESIZE_EVENT};
use crate::keymap::{build_tables, SequenceTables};
use crate::resolver::{resolve, Resolution};
use crate::{format_err, Result};
use num_traits::NumCast;
use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use self::unix::{TtySource, UnixTerminal};

const BUF_SIZE: usize = 4096;

/// Represents the size of the terminal screen.
/// The number of rows and columns of character cells are expressed.
/// Some implementations populate the size of those cells in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    /// The number of rows of text
    pub rows: usize,
    /// The number of columns per row
    pub cols: usize,
    /// The width of a cell in pixels.  Some implementations never
    /// set this to anything other than zero.
    pub xpixel: usize,
    /// The height of a cell in pixels.  Some implementations never
    /// set this to anything other than zero.
    pub ypixel: usize,
}

/// What a bounded wait on the byte source produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Data is ready to read.
    Ready,
    /// The deadline passed with nothing to read.
    TimedOut,
    /// A window size change was delivered out of band.
    Winch,
}

/// Abstract byte source with deadline semantics.  `poll` returns as
/// soon as *any* data is available (cbreak semantics); `read` must not
/// block after `poll` reported `Ready`, and returns `Ok(0)` at EOF.
pub trait ByteSource {
    fn poll(&mut self, deadline: Option<Instant>) -> Result<PollStatus>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Current window dimensions, for sources that know them.
    fn screen_size(&mut self) -> Result<ScreenSize> {
        Err(format_err!("screen size not available for this byte source"))
    }
}

pub(crate) fn cast<T: NumCast + Display + Copy, U: NumCast>(n: T) -> Result<U> {
    num_traits::cast(n).ok_or_else(|| format_err!("{} is out of bounds for this system", n))
}

enum Filled {
    Data,
    TimedOut,
    Winch,
    Eof,
}

/// A terminal's input side: owns the byte source, the immutable
/// sequence tables, the decode buffer and the capability-report caches.
///
/// One consumer at a time: `inkey` blocks the calling thread and the
/// buffer is mutated only by that call.
pub struct Terminal<S: ByteSource> {
    source: S,
    caps: Capabilities,
    tables: SequenceTables,
    decoder: IncrementalDecoder,
    buffer: String,
    eof: bool,
    dec_modes: HashMap<u16, DecModeValue>,
    device_attributes: Option<DeviceAttributes>,
    screen_size: Option<ScreenSize>,
}

impl<S: ByteSource> Terminal<S> {
    pub fn new(caps: Capabilities, source: S) -> Self {
        let tables = build_tables(|cap| caps.keyboard_string(cap));
        let decoder = IncrementalDecoder::new(caps.encoding());
        Self {
            source,
            caps,
            tables,
            decoder,
            buffer: String::new(),
            eof: false,
            dec_modes: HashMap::new(),
            device_attributes: None,
            screen_size: None,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// The underlying byte source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The keycode registry backing this terminal's tables.
    pub fn registry(&self) -> &KeycodeRegistry {
        &self.tables.registry
    }

    /// Read and return the next keystroke within the given timeout.
    ///
    /// * `None` blocks until a keystroke can be produced.
    /// * `Some(Duration::ZERO)` polls and returns immediately.
    /// * `Some(d)` blocks up to `d`.
    ///
    /// On timeout or EOF the empty keystroke (`""`) is returned.  A
    /// lone ESC waits up to `min(escdelay, remaining)` for continuation
    /// bytes before being emitted bare.
    pub fn inkey(&mut self, timeout: Option<Duration>) -> Result<Keystroke> {
        let deadline = timeout.map(|t| Instant::now() + t);
        // absorb everything already readable before resolving
        self.drain_available()?;

        // the escape delay is granted at most once per buffered ESC
        let mut esc_deadline: Option<Instant> = None;

        loop {
            match resolve(&self.buffer, &self.tables, false) {
                Resolution::Key(ks, n) => return Ok(self.commit(ks, n)),
                Resolution::Report(report, n) => {
                    self.buffer.drain(..n);
                    self.absorb_report(report);
                }
                Resolution::Wait => {
                    let cap = *esc_deadline
                        .get_or_insert_with(|| Instant::now() + self.caps.escdelay());
                    let bounded = Some(match deadline {
                        Some(d) => d.min(cap),
                        None => cap,
                    });
                    match self.wait_and_fill(bounded)? {
                        Filled::Data => {}
                        Filled::Winch => return self.winch_keystroke(),
                        Filled::TimedOut | Filled::Eof => return self.finalize(),
                    }
                }
                Resolution::None => {
                    if self.eof {
                        return Ok(Keystroke::empty());
                    }
                    match self.wait_and_fill(deadline)? {
                        Filled::Data => {}
                        Filled::Winch => return self.winch_keystroke(),
                        Filled::TimedOut | Filled::Eof => return Ok(Keystroke::empty()),
                    }
                }
            }
        }
    }

    /// Buffer input to be discovered by the next call to `inkey`.
    pub fn ungetch(&mut self, text: &str) {
        self.buffer.insert_str(0, text);
    }

    /// Discard the internal buffer and everything currently readable
    /// from the source.  Idempotent.
    pub fn flushinp(&mut self) -> Result<()> {
        self.buffer.clear();
        self.decoder.reset();
        let mut scratch = [0u8; BUF_SIZE];
        while let PollStatus::Ready = self.source.poll(Some(Instant::now()))? {
            match self.source.read(&mut scratch)? {
                0 => {
                    self.eof = true;
                    break;
                }
                _ => continue,
            }
        }
        Ok(())
    }

    /// Whether a keystroke could be read without blocking, waiting up
    /// to `timeout` for one to arrive.
    pub fn kbhit(&mut self, timeout: Option<Duration>) -> Result<bool> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        let deadline = timeout.map(|t| Instant::now() + t);
        Ok(matches!(self.source.poll(deadline)?, PollStatus::Ready))
    }

    /// Pop a single decoded character, pulling in whatever the source
    /// has ready.  Supports tests and the query helpers; `inkey` is the
    /// real interface.
    pub fn getch(&mut self) -> Result<Option<char>> {
        if self.buffer.is_empty() {
            self.drain_available()?;
        }
        match self.buffer.chars().next() {
            Some(c) => {
                self.buffer.drain(..c.len_utf8());
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }

    /// Cached answer for a DEC private mode query (DECRPM reports are
    /// absorbed off the input stream).  Returns `None` until the
    /// terminal has reported the mode.
    pub fn dec_mode(&self, mode: u16) -> Option<DecModeValue> {
        self.dec_modes.get(&mode).copied()
    }

    /// Drop a cached DEC mode answer so the next report refreshes it.
    pub fn forget_dec_mode(&mut self, mode: u16) {
        self.dec_modes.remove(&mode);
    }

    /// The most recent device attributes report, if one was consumed.
    pub fn device_attributes(&self) -> Option<&DeviceAttributes> {
        self.device_attributes.as_ref()
    }

    /// Window dimensions, as last reported in band or via SIGWINCH.
    pub fn screen_size(&self) -> Option<ScreenSize> {
        self.screen_size
    }

    fn commit(&mut self, ks: Keystroke, consumed: usize) -> Keystroke {
        self.buffer.drain(..consumed);
        if let Some(EventPayload::Resize(r)) = ks.event_payload() {
            self.screen_size = Some(ScreenSize {
                rows: r.rows,
                cols: r.cols,
                xpixel: r.xpixel,
                ypixel: r.ypixel,
            });
        }
        ks
    }

    fn absorb_report(&mut self, report: Report) {
        match report {
            Report::DeviceAttributes(da) => {
                log::debug!("device attributes: {:?}", da);
                self.device_attributes = Some(da);
            }
            Report::DecMode { mode, value } => {
                log::debug!("DECRPM: mode {} is {:?}", mode, value);
                self.dec_modes.insert(mode, value);
            }
        }
    }

    /// The escape delay expired (or the caller's budget ran out):
    /// resolve whatever is buffered to its best final interpretation.
    fn finalize(&mut self) -> Result<Keystroke> {
        loop {
            match resolve(&self.buffer, &self.tables, true) {
                Resolution::Key(ks, n) => return Ok(self.commit(ks, n)),
                Resolution::Report(report, n) => {
                    self.buffer.drain(..n);
                    self.absorb_report(report);
                }
                Resolution::None => return Ok(Keystroke::empty()),
                Resolution::Wait => {
                    debug_assert!(false, "resolver must not wait when final");
                    return Ok(Keystroke::empty());
                }
            }
        }
    }

    fn read_some(&mut self) -> Result<usize> {
        let mut buf = [0u8; BUF_SIZE];
        let n = self.source.read(&mut buf)?;
        if n == 0 {
            self.eof = true;
            return Ok(0);
        }
        // X10 mouse coordinate bytes are raw values offset by 32, not
        // valid UTF-8 past 0x7f
        let legacy_mouse = self.buffer.starts_with("\x1b[M")
            || (self.buffer.is_empty() && buf[..n].starts_with(b"\x1b[M"));
        if self.decoder.encoding() == InputEncoding::Utf8 && legacy_mouse {
            self.decoder.decode_latin1(&buf[..n], &mut self.buffer);
        } else {
            self.decoder.decode(&buf[..n], &mut self.buffer);
        }
        Ok(n)
    }

    fn drain_available(&mut self) -> Result<()> {
        while !self.eof
            && matches!(self.source.poll(Some(Instant::now()))?, PollStatus::Ready)
        {
            if self.read_some()? == 0 {
                break;
            }
        }
        Ok(())
    }

    fn wait_and_fill(&mut self, deadline: Option<Instant>) -> Result<Filled> {
        match self.source.poll(deadline)? {
            PollStatus::TimedOut => Ok(Filled::TimedOut),
            PollStatus::Winch => Ok(Filled::Winch),
            PollStatus::Ready => {
                if self.read_some()? == 0 {
                    return Ok(Filled::Eof);
                }
                // opportunistically grab the rest of a burst
                self.drain_available()?;
                Ok(Filled::Data)
            }
        }
    }

    /// SIGWINCH arrived: refresh the cached dimensions and surface the
    /// change as a resize keystroke.
    fn winch_keystroke(&mut self) -> Result<Keystroke> {
        let size = self.source.screen_size()?;
        self.screen_size = Some(size);
        Ok(Keystroke::modified("", KEY_RESIZE_EVENT, "KEY_RESIZE_EVENT", Modifiers::NONE)
            .with_payload(EventPayload::Resize(ResizeEvent {
                rows: size.rows,
                cols: size.cols,
                xpixel: size.xpixel,
                ypixel: size.ypixel,
            })))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::caps::ProbeHints;
    use crate::keycodes::{
        KEY_BRACKETED_PASTE, KEY_ENTER, KEY_ESCAPE, KEY_MOUSE_LEGACY, KEY_MOUSE_SGR,
        KEY_RESIZE_EVENT, KEY_UP,
    };
    use std::collections::VecDeque;

    /// Scripted byte source: pops one chunk per read, reports Ready
    /// while chunks remain, then times out (or EOF).
    #[derive(Default)]
    struct Script {
        chunks: VecDeque<Vec<u8>>,
        eof: bool,
        size: Option<ScreenSize>,
    }

    impl Script {
        fn feed(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                ..Self::default()
            }
        }
    }

    impl ByteSource for Script {
        fn poll(&mut self, _deadline: Option<Instant>) -> Result<PollStatus> {
            if !self.chunks.is_empty() || self.eof {
                Ok(PollStatus::Ready)
            } else {
                Ok(PollStatus::TimedOut)
            }
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }

        fn screen_size(&mut self) -> Result<ScreenSize> {
            self.size
                .ok_or_else(|| format_err!("no size scripted"))
        }
    }

    fn term(chunks: &[&[u8]]) -> Terminal<Script> {
        let caps = Capabilities::new_with_hints(ProbeHints::default()).unwrap();
        Terminal::new(caps, Script::feed(chunks))
    }

    const POLL: Option<Duration> = Some(Duration::ZERO);

    #[test]
    fn single_sequence_consumes_fully() {
        let mut t = term(&[b"\x1b[A"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_UP));
        assert_eq!(ks.name(), Some("KEY_UP"));
        assert_eq!(ks, "\x1b[A");
        assert!(t.buffer.is_empty());
        assert_eq!(t.inkey(POLL).unwrap(), "");
    }

    #[test]
    fn plain_text_keystrokes_in_order() {
        let mut t = term(&[b"abc"]);
        assert_eq!(t.inkey(POLL).unwrap(), "a");
        assert_eq!(t.inkey(POLL).unwrap(), "b");
        assert_eq!(t.inkey(POLL).unwrap(), "c");
        assert_eq!(t.inkey(POLL).unwrap(), "");
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut t = term(&[b"\x1b[", b"A"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_UP));
    }

    #[test]
    fn utf8_split_across_reads() {
        let omega = "Ω".as_bytes();
        let mut t = term(&[&omega[..1], &omega[1..]]);
        assert_eq!(t.inkey(POLL).unwrap(), "Ω");
    }

    #[test]
    fn lone_escape_resolves_after_delay() {
        let mut t = term(&[b"\x1b"]);
        let ks = t.inkey(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(ks.code(), Some(KEY_ESCAPE));
        assert_eq!(ks.name(), Some("KEY_ESCAPE"));
        assert_eq!(ks, "\x1b");
    }

    #[test]
    fn modified_arrow() {
        let mut t = term(&[b"\x1b[1;5A"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.name(), Some("KEY_CTRL_UP"));
        assert!(ks.ctrl());
    }

    #[test]
    fn mouse_then_text() {
        let mut t = term(&[b"\x1b[<0;10;20Mx"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_MOUSE_SGR));
        assert_eq!(t.inkey(POLL).unwrap(), "x");
    }

    #[test]
    fn legacy_mouse_high_coordinates() {
        // X10 report with a coordinate byte above 0x7f arrives whole;
        // the bytes must be taken as latin-1, not UTF-8
        let mut t = term(&[b"\x1b[M \xff!"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_MOUSE_LEGACY));
        match ks.event_payload() {
            Some(EventPayload::MouseLegacy(m)) => {
                assert_eq!(m.x, 0xff - 32);
                assert_eq!(m.y, 1);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn paste_block() {
        let mut t = term(&[b"\x1b[200~hi\x1b[201~"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_BRACKETED_PASTE));
        match ks.event_payload() {
            Some(EventPayload::Paste(p)) => assert_eq!(p.text, "hi"),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn device_attributes_do_not_surface() {
        let mut t = term(&[b"\x1b[?64;4cx"]);
        assert_eq!(t.inkey(POLL).unwrap(), "x");
        assert!(t.device_attributes().unwrap().supports_sixel());
    }

    #[test]
    fn dec_mode_reports_are_cached() {
        let mut t = term(&[b"\x1b[?2026;2$yq"]);
        assert_eq!(t.inkey(POLL).unwrap(), "q");
        assert_eq!(t.dec_mode(2026), Some(DecModeValue::Reset));
        t.forget_dec_mode(2026);
        assert_eq!(t.dec_mode(2026), None);
    }

    #[test]
    fn in_band_resize_updates_cached_size() {
        let mut t = term(&[b"\x1b[48;50;120;800;1920t"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_RESIZE_EVENT));
        assert_eq!(
            t.screen_size(),
            Some(ScreenSize {
                rows: 50,
                cols: 120,
                xpixel: 1920,
                ypixel: 800,
            })
        );
    }

    #[test]
    fn ungetch_round_trip() {
        let mut t = term(&[]);
        t.ungetch("ab");
        assert_eq!(t.inkey(POLL).unwrap(), "a");
        assert_eq!(t.inkey(POLL).unwrap(), "b");
        assert_eq!(t.inkey(POLL).unwrap(), "");
    }

    #[test]
    fn ungetch_resolves_sequences() {
        let mut t = term(&[]);
        t.ungetch("\x1b[A");
        assert_eq!(t.inkey(POLL).unwrap().code(), Some(KEY_UP));
    }

    #[test]
    fn flushinp_is_idempotent() {
        let mut t = term(&[b"junk"]);
        t.flushinp().unwrap();
        t.flushinp().unwrap();
        assert_eq!(t.inkey(POLL).unwrap(), "");
    }

    #[test]
    fn eof_returns_empty_repeatedly() {
        let mut t = term(&[]);
        t.source.eof = true;
        assert_eq!(t.inkey(None).unwrap(), "");
        assert_eq!(t.inkey(None).unwrap(), "");
    }

    #[test]
    fn enter_key_from_mixin() {
        let mut t = term(&[b"\r"]);
        let ks = t.inkey(POLL).unwrap();
        assert_eq!(ks.code(), Some(KEY_ENTER));
    }

    #[test]
    fn kbhit_reflects_buffer_and_source() {
        let mut t = term(&[b"x"]);
        assert!(t.kbhit(POLL).unwrap());
        assert_eq!(t.inkey(POLL).unwrap(), "x");
        assert!(!t.kbhit(POLL).unwrap());
        t.ungetch("y");
        assert!(t.kbhit(POLL).unwrap());
    }

    #[test]
    fn getch_pops_single_chars() {
        let mut t = term(&[b"hi"]);
        assert_eq!(t.getch().unwrap(), Some('h'));
        assert_eq!(t.getch().unwrap(), Some('i'));
        assert_eq!(t.getch().unwrap(), None);
    }
}
