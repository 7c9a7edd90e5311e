//! JPEG: APP1 (EXIF/XMP), APP2 (ICC), APP12, APP13 (IPTC) and COM segments
//! become zero-filled COM segments of the same length.

use img_parts::jpeg::{Jpeg, JpegSegment};

use super::{Neutralized, ScrubError};

const FORMAT: &str = "jpeg";

const MARKER_COM: u8 = 0xFE;

fn is_metadata(marker: u8) -> bool {
    matches!(marker, 0xE1 | 0xE2 | 0xEC | 0xED | MARKER_COM)
}

pub(super) fn neutralize(data: &[u8]) -> Result<Neutralized, ScrubError> {
    let mut jpeg =
        Jpeg::from_bytes(data.to_vec().into()).map_err(|e| ScrubError::malformed(FORMAT, e))?;

    let mut blocks = 0;
    for segment in jpeg.segments_mut().iter_mut() {
        if is_metadata(segment.marker()) {
            let len = segment.contents().len();
            *segment = JpegSegment::new_with_contents(MARKER_COM, vec![0u8; len].into());
            blocks += 1;
        }
    }

    Ok(Neutralized {
        bytes: jpeg.encoder().bytes().to_vec(),
        blocks,
    })
}
