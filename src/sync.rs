use crate::error::{Error, Result};
use crate::source::ByteSource;

///
/// Consumes bytes until the last `magic.len()` bytes read equal `magic`.
///
/// Returns the number of bytes discarded before the magic sequence. The stream is left positioned
/// right after it. With `max_scan` set, gives up with [`Error::MagicNotFound`] once that many
/// bytes were discarded.
///
pub fn sync<S: ByteSource>(
    source: &mut S,
    magic: &[u8],
    max_scan: Option<usize>,
) -> Result<usize, S::Error> {
    let mut window = vec![0_u8; magic.len()];
    source.read_exact(&mut window)?;

    let mut discarded = 0usize;
    while window != magic {
        if max_scan.map_or(false, |max| discarded >= max) {
            return Err(Error::MagicNotFound { scanned: discarded });
        }

        window.rotate_left(1);
        let last = window.len() - 1;
        source.read_exact(&mut window[last..])?;
        discarded += 1;
    }

    Ok(discarded)
}
