//! Unix TTY byte source: poll(2) with deadline semantics, a SIGWINCH
//! self-pipe, and termios helpers for entering cbreak/raw mode.
use crate::caps::Capabilities;
use crate::terminal::{cast, ByteSource, PollStatus, ScreenSize, Terminal};
use crate::{bail, Context, Result};
use filedescriptor::{poll, pollfd, FileDescriptor, POLLIN};
use libc::winsize;
use signal_hook::SigId;
use std::fs::OpenOptions;
use std::io::{stdin, ErrorKind, Read};
use std::mem;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};
use termios::{
    cfmakeraw, tcsetattr, Termios, ECHO, ICANON, TCSAFLUSH, TCSANOW, VMIN, VTIME,
};

/// A unix tty as a byte source.
///
/// In order to safely hook and process SIGWINCH the self-pipe trick is
/// used to deliver the signal to a pipe, so that poll(2) can wait for
/// events on both the tty and the pipe at the same time.
pub struct TtySource {
    fd: FileDescriptor,
    sigwinch_pipe: UnixStream,
    sigwinch_id: SigId,
    saved_termios: Option<Termios>,
}

impl TtySource {
    /// Build from the stdin of the process.  Fails unless stdin is
    /// attached to a tty.
    pub fn new_from_stdin() -> Result<Self> {
        let stdin = stdin();
        if unsafe { libc::isatty(stdin.as_raw_fd()) } == 0 {
            bail!("stdin is not a tty");
        }
        Self::from_fd(FileDescriptor::dup(&stdin).context("dup stdin failed")?)
    }

    /// Explicitly open `/dev/tty`, yielding a source even when stdio
    /// has been redirected.
    pub fn new() -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
        Self::from_fd(FileDescriptor::dup(&file).context("dup /dev/tty failed")?)
    }

    fn from_fd(fd: FileDescriptor) -> Result<Self> {
        let (sigwinch_pipe, sigwinch_pipe_write) = UnixStream::pair()?;
        let sigwinch_id =
            signal_hook::low_level::pipe::register(libc::SIGWINCH, sigwinch_pipe_write)?;
        sigwinch_pipe.set_nonblocking(true)?;
        Ok(Self {
            fd,
            sigwinch_pipe,
            sigwinch_id,
            saved_termios: None,
        })
    }

    fn save_termios(&mut self) -> Result<Termios> {
        let current = Termios::from_fd(self.fd.as_raw_fd()).context("tcgetattr failed")?;
        if self.saved_termios.is_none() {
            self.saved_termios = Some(current);
        }
        Ok(current)
    }

    /// Enter cbreak mode: byte-at-a-time reads, no echo, signal keys
    /// still interpreted by the driver.
    pub fn set_cbreak(&mut self) -> Result<()> {
        let mut termios = self.save_termios()?;
        termios.c_lflag &= !(ICANON | ECHO);
        termios.c_cc[VMIN] = 1;
        termios.c_cc[VTIME] = 0;
        Ok(tcsetattr(self.fd.as_raw_fd(), TCSANOW, &termios).context("tcsetattr failed")?)
    }

    /// Enter raw mode: cbreak plus no input/output processing at all.
    pub fn set_raw(&mut self) -> Result<()> {
        let mut termios = self.save_termios()?;
        cfmakeraw(&mut termios);
        Ok(tcsetattr(self.fd.as_raw_fd(), TCSANOW, &termios).context("tcsetattr failed")?)
    }

    /// Restore the termios state saved by the first mode change.
    pub fn restore_mode(&mut self) -> Result<()> {
        if let Some(saved) = self.saved_termios.take() {
            tcsetattr(self.fd.as_raw_fd(), TCSAFLUSH, &saved).context("tcsetattr failed")?;
        }
        Ok(())
    }

    /// Test whether we caught delivery of SIGWINCH.
    fn caught_sigwinch(&mut self) -> Result<bool> {
        let mut buf = [0u8; 64];
        match self.sigwinch_pipe.read(&mut buf) {
            Ok(n) => Ok(n > 0),
            Err(ref e)
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted =>
            {
                Ok(false)
            }
            Err(e) => bail!("failed to read sigwinch pipe: {}", e),
        }
    }
}

fn is_interrupted(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return io.kind() == ErrorKind::Interrupted;
        }
        source = err.source();
    }
    false
}

impl ByteSource for TtySource {
    fn poll(&mut self, deadline: Option<Instant>) -> Result<PollStatus> {
        loop {
            let wait = match deadline {
                Some(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        // a zero wait still polls for already-ready data
                        Some(Duration::ZERO)
                    } else {
                        Some(remaining)
                    }
                }
                None => None,
            };

            let mut pfd = [
                pollfd {
                    fd: self.sigwinch_pipe.as_raw_fd(),
                    events: POLLIN,
                    revents: 0,
                },
                pollfd {
                    fd: self.fd.as_raw_fd(),
                    events: POLLIN,
                    revents: 0,
                },
            ];

            if let Err(err) = poll(&mut pfd, wait) {
                if is_interrupted(&err) {
                    // SIGWINCH may have been the source of the
                    // interrupt; check now to reduce resize latency
                    if self.caught_sigwinch()? {
                        return Ok(PollStatus::Winch);
                    }
                    if deadline.map_or(false, |d| Instant::now() >= d) {
                        return Ok(PollStatus::TimedOut);
                    }
                    continue;
                }
                bail!("poll(2) error: {:#}", err);
            }

            if pfd[0].revents != 0 && self.caught_sigwinch()? {
                return Ok(PollStatus::Winch);
            }
            if pfd[1].revents != 0 {
                return Ok(PollStatus::Ready);
            }
            return Ok(PollStatus::TimedOut);
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let size =
                unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr() as *mut _, buf.len()) };
            if size == -1 {
                let err = std::io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                bail!("failed to read input: {}", err);
            }
            return Ok(size as usize);
        }
    }

    fn screen_size(&mut self) -> Result<ScreenSize> {
        let mut size: winsize = unsafe { mem::zeroed() };
        if unsafe { libc::ioctl(self.fd.as_raw_fd(), libc::TIOCGWINSZ as _, &mut size) } != 0 {
            bail!(
                "failed to ioctl(TIOCGWINSZ): {}",
                std::io::Error::last_os_error()
            );
        }
        Ok(ScreenSize {
            rows: cast(size.ws_row)?,
            cols: cast(size.ws_col)?,
            xpixel: cast(size.ws_xpixel)?,
            ypixel: cast(size.ws_ypixel)?,
        })
    }
}

impl Drop for TtySource {
    fn drop(&mut self) {
        self.restore_mode().ok();
        signal_hook::low_level::unregister(self.sigwinch_id);
    }
}

/// A terminal reading from a unix tty.
pub type UnixTerminal = Terminal<TtySource>;

impl Terminal<TtySource> {
    /// Attempt to create an instance from the stdin of the process.
    /// This will fail unless it is associated with a tty.  Note that
    /// this will duplicate the underlying file descriptor and will no
    /// longer participate in the stdin locking provided by the rust
    /// standard library.
    pub fn new_from_stdio(caps: Capabilities) -> Result<Self> {
        Ok(Terminal::new(caps, TtySource::new_from_stdin()?))
    }

    /// Attempt to explicitly open a handle to the terminal device
    /// (/dev/tty).  This will yield a terminal even if the stdio
    /// streams have been redirected, provided that the process has an
    /// associated controlling terminal.
    pub fn new_from_tty(caps: Capabilities) -> Result<Self> {
        Ok(Terminal::new(caps, TtySource::new()?))
    }

    /// Enter cbreak mode on the underlying tty.
    pub fn set_cbreak_mode(&mut self) -> Result<()> {
        self.source_mut().set_cbreak()
    }

    /// Enter raw mode on the underlying tty.
    pub fn set_raw_mode(&mut self) -> Result<()> {
        self.source_mut().set_raw()
    }

    /// Restore the tty mode saved by the first mode change.
    pub fn restore_mode(&mut self) -> Result<()> {
        self.source_mut().restore_mode()
    }
}
