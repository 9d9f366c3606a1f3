//! Line and column bookkeeping for byte sources.

use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};

use super::position;

/// Where something starts in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Byte offset from the start of the document.
    pub offset: u64,
    /// 1-based line.
    pub line: u64,
    /// 1-based column, counted in bytes.
    pub column: u64,
}

impl Location {
    /// The first byte of a document.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Locate byte `offset` of an in-memory `document`.
    ///
    /// Offsets past the end are clamped to the end.
    #[must_use]
    pub fn in_document(document: &[u8], offset: u64) -> Self {
        let end = usize::try_from(offset).map_or(document.len(), |offset| offset.min(document.len()));
        let before = &document[..end];
        let line = before.iter().filter(|&&byte| byte == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |newline| newline + 1);
        Self {
            offset: position(end),
            line: position(line),
            column: position(end - line_start + 1),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::START
    }
}

/// A reader that remembers where the lines of the bytes it passes on start.
///
/// Consumers may read ahead of the tokenizer; [`locate`](Self::locate) only
/// requires the offsets it is asked about to never decrease. Newlines are
/// dropped once an offset past them has been located, so memory is bounded
/// by the read-ahead.
#[derive(Debug)]
pub(crate) struct LineTracker<R> {
    inner: R,
    read: u64,
    newlines: VecDeque<u64>,
    line: u64,
    line_start: u64,
}

impl<R> LineTracker<R> {
    pub(crate) const fn new(inner: R) -> Self {
        Self {
            inner,
            read: 0,
            newlines: VecDeque::new(),
            line: 1,
            line_start: 0,
        }
    }

    fn record(&mut self, bytes: &[u8]) {
        for (index, _) in bytes.iter().enumerate().filter(|(_, byte)| **byte == b'\n') {
            self.newlines.push_back(self.read + position(index));
        }
        self.read += position(bytes.len());
    }

    /// The location of byte `offset`.
    pub(crate) fn locate(&mut self, offset: u64) -> Location {
        while let Some(&newline) = self.newlines.front() {
            if newline >= offset {
                break;
            }
            self.newlines.pop_front();
            self.line += 1;
            self.line_start = newline + 1;
        }
        Location {
            offset,
            line: self.line,
            column: offset.saturating_sub(self.line_start) + 1,
        }
    }
}

impl<R: io::Read> io::Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.record(&buf[..read]);
        Ok(read)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for LineTracker<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) {
            this.record(&buf.filled()[before..]);
        }
        poll
    }
}
