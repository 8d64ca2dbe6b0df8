//! Line boundary helpers for seekable log files.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

/// Default number of bytes read per backward step
pub const DEFAULT_SCAN_BUFFER_SIZE: usize = 4096;

/// Find the start of the line containing `offset`.
///
/// The byte at `offset` belongs to the line being located; a newline found
/// at `offset - 1` therefore means `offset` already starts a line. The
/// backward scan reads at most `buf_size` bytes per step and never looks
/// past `offset`. On return the cursor is positioned at the returned offset.
pub fn align_to_line_start<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    buf_size: usize,
) -> io::Result<u64> {
    let reach = usize::try_from(offset).unwrap_or(usize::MAX);
    let mut buf = vec![0u8; buf_size.min(reach).max(1)];
    let mut end = offset;
    let mut start_of_line = 0;

    while end > 0 {
        let start = end.saturating_sub(buf.len() as u64);
        let chunk = &mut buf[..(end - start) as usize];

        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(chunk)?;

        if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
            start_of_line = start + pos as u64 + 1;
            break;
        }
        end = start;
    }

    reader.seek(SeekFrom::Start(start_of_line))
}

/// Read the line starting at `offset`.
///
/// Returns the line without its terminator and the offset of the following
/// line (which equals the stream length for an unterminated final line).
/// An offset at or past the end yields an empty line.
pub fn read_line_at<R: Read + Seek>(reader: &mut R, offset: u64) -> io::Result<(Vec<u8>, u64)> {
    reader.seek(SeekFrom::Start(offset))?;

    let mut line = Vec::new();
    let consumed = BufReader::new(&mut *reader).read_until(b'\n', &mut line)?;

    if line.last() == Some(&b'\n') {
        line.pop();
    }

    Ok((line, offset + consumed as u64))
}
