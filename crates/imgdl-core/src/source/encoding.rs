//! Byte-order-mark sniffing and decoding of the URL source.

use thiserror::Error;

/// Text encoding of the source, as announced by its byte order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// No BOM; decoded as UTF-8.
    Utf8,
    Utf8Bom,
    Utf32Be,
    Utf32Le,
    Utf16Be,
    Utf16Le,
}

// UTF-32 LE must be tested before UTF-16 LE: its BOM starts with FF FE.
const BOMS: [(&[u8], SourceEncoding); 5] = [
    (&[0xEF, 0xBB, 0xBF], SourceEncoding::Utf8Bom),
    (&[0x00, 0x00, 0xFE, 0xFF], SourceEncoding::Utf32Be),
    (&[0xFF, 0xFE, 0x00, 0x00], SourceEncoding::Utf32Le),
    (&[0xFE, 0xFF], SourceEncoding::Utf16Be),
    (&[0xFF, 0xFE], SourceEncoding::Utf16Le),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid {encoding:?} data at byte {offset}")]
    Invalid { encoding: SourceEncoding, offset: usize },
    #[error("{encoding:?} data length {len} is not a multiple of the code unit size")]
    Truncated { encoding: SourceEncoding, len: usize },
}

/// Detect the encoding from the first bytes. Returns the encoding and the BOM length.
pub fn detect_bom(bytes: &[u8]) -> (SourceEncoding, usize) {
    for (bom, encoding) in BOMS {
        if bytes.starts_with(bom) {
            return (encoding, bom.len());
        }
    }
    (SourceEncoding::Utf8, 0)
}

/// Decode the whole source, stripping the BOM.
pub fn decode(bytes: &[u8]) -> Result<(SourceEncoding, String), DecodeError> {
    let (encoding, bom_len) = detect_bom(bytes);
    let body = &bytes[bom_len..];
    let text = match encoding {
        SourceEncoding::Utf8 | SourceEncoding::Utf8Bom => std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|e| DecodeError::Invalid {
                encoding,
                offset: bom_len + e.valid_up_to(),
            })?,
        SourceEncoding::Utf16Be | SourceEncoding::Utf16Le => {
            let units = code_units::<2>(encoding, body)?
                .map(|b| match encoding {
                    SourceEncoding::Utf16Be => u16::from_be_bytes(b),
                    _ => u16::from_le_bytes(b),
                })
                .collect::<Vec<u16>>();
            String::from_utf16(&units).map_err(|_| DecodeError::Invalid {
                encoding,
                offset: bom_len,
            })?
        }
        SourceEncoding::Utf32Be | SourceEncoding::Utf32Le => {
            let mut out = String::with_capacity(body.len() / 4);
            for (i, b) in code_units::<4>(encoding, body)?.enumerate() {
                let scalar = match encoding {
                    SourceEncoding::Utf32Be => u32::from_be_bytes(b),
                    _ => u32::from_le_bytes(b),
                };
                let c = char::from_u32(scalar).ok_or(DecodeError::Invalid {
                    encoding,
                    offset: bom_len + i * 4,
                })?;
                out.push(c);
            }
            out
        }
    };
    Ok((encoding, text))
}

fn code_units<const N: usize>(
    encoding: SourceEncoding,
    body: &[u8],
) -> Result<impl Iterator<Item = [u8; N]> + '_, DecodeError> {
    if body.len() % N != 0 {
        return Err(DecodeError::Truncated {
            encoding,
            len: body.len(),
        });
    }
    Ok(body.chunks_exact(N).map(|c| {
        let mut unit = [0u8; N];
        unit.copy_from_slice(c);
        unit
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bom_is_utf8() {
        assert_eq!(detect_bom(b"http://x/a.png"), (SourceEncoding::Utf8, 0));
        assert_eq!(detect_bom(b""), (SourceEncoding::Utf8, 0));
    }

    #[test]
    fn utf32_le_wins_over_utf16_le() {
        assert_eq!(detect_bom(&[0xFF, 0xFE, 0x00, 0x00, 0x41]), (SourceEncoding::Utf32Le, 4));
        assert_eq!(detect_bom(&[0xFF, 0xFE, 0x41, 0x00]), (SourceEncoding::Utf16Le, 2));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("http://x/é.png\n".as_bytes());
        let (enc, text) = decode(&bytes).unwrap();
        assert_eq!(enc, SourceEncoding::Utf8Bom);
        assert_eq!(text, "http://x/é.png\n");
    }

    #[test]
    fn utf16_both_endians() {
        let s = "http://x/a.png\n";
        let mut le = vec![0xFF, 0xFE];
        let mut be = vec![0xFE, 0xFF];
        for u in s.encode_utf16() {
            le.extend_from_slice(&u.to_le_bytes());
            be.extend_from_slice(&u.to_be_bytes());
        }
        assert_eq!(decode(&le).unwrap(), (SourceEncoding::Utf16Le, s.to_string()));
        assert_eq!(decode(&be).unwrap(), (SourceEncoding::Utf16Be, s.to_string()));
    }

    #[test]
    fn utf32_both_endians() {
        let s = "http://x/ü.gif";
        let mut le = vec![0xFF, 0xFE, 0x00, 0x00];
        let mut be = vec![0x00, 0x00, 0xFE, 0xFF];
        for c in s.chars() {
            le.extend_from_slice(&(c as u32).to_le_bytes());
            be.extend_from_slice(&(c as u32).to_be_bytes());
        }
        assert_eq!(decode(&le).unwrap().1, s);
        assert_eq!(decode(&be).unwrap().1, s);
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let err = decode(b"ab\xFFcd").unwrap_err();
        assert_eq!(
            err,
            DecodeError::Invalid {
                encoding: SourceEncoding::Utf8,
                offset: 2
            }
        );
    }

    #[test]
    fn odd_length_utf16_is_truncated() {
        let err = decode(&[0xFE, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { len: 1, .. }));
    }
}
