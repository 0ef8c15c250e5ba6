//! Minimal NumPy `.npy` codec for one-dimensional `u8` arrays.
//!
//! The counter array is persisted in the NumPy array format so that it can be
//! inspected with `numpy.load` and exchanged with filters written by Python
//! tooling.
//!
//! # Format
//!
//! ```text
//! [Magic: 6 bytes]        "\x93NUMPY"
//! [Version: 2 bytes]      major, minor
//! [Header length]         u16 LE (v1.0) or u32 LE (v2.0, v3.0)
//! [Header]                Python dict literal, space padded, '\n' terminated
//! [Data]                  one byte per counter
//! ```
//!
//! The header written here is
//! `{'descr': '|u1', 'fortran_order': False, 'shape': (N,), }` padded so the
//! data starts on a 64-byte boundary, exactly as NumPy itself writes it.
//!
//! Only what a counter array needs is supported: dtype `u1`, C order, 1-D.
//!
//! # Examples
//!
//! ```
//! use countbloom::serde_support::npy;
//!
//! let bytes = npy::encode(&[0, 1, 2, 255]).unwrap();
//! assert_eq!(&bytes[..6], b"\x93NUMPY");
//! assert_eq!(npy::decode(&bytes).unwrap(), vec![0, 1, 2, 255]);
//! ```

use std::io::{self, Write};

/// Magic prefix of every `.npy` file.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Alignment of the data section.
const ALIGNMENT: usize = 64;

/// Errors in the structure of a `.npy` buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NpyError {
    /// The buffer does not start with `\x93NUMPY`
    #[error("invalid magic bytes (expected '\\x93NUMPY')")]
    InvalidMagic,

    /// Format version other than 1.0, 2.0 or 3.0
    #[error("unsupported format version: {major}.{minor}")]
    UnsupportedVersion {
        /// Major version byte
        major: u8,
        /// Minor version byte
        minor: u8,
    },

    /// The buffer ends before the declared header or data
    #[error("buffer too small: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes needed
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// The header is not valid text
    #[error("header is not valid UTF-8")]
    HeaderEncoding,

    /// The header dict could not be parsed
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Element type other than unsigned bytes
    #[error("unsupported dtype '{0}' (expected '|u1')")]
    UnsupportedDtype(String),

    /// Column-major arrays are not supported
    #[error("fortran_order arrays are not supported")]
    FortranOrder,

    /// Anything but a one-dimensional shape
    #[error("unsupported shape {0:?} (expected a 1-D array)")]
    UnsupportedShape(Vec<usize>),

    /// More data than the shape declares
    #[error("{actual} data bytes follow a header declaring {expected}")]
    TrailingBytes {
        /// Bytes declared by the shape
        expected: usize,
        /// Bytes present
        actual: usize,
    },
}

/// Dict header of a v1.0 file holding `len` bytes, padding and newline included.
fn header_for(len: usize) -> String {
    let mut header = format!("{{'descr': '|u1', 'fortran_order': False, 'shape': ({},), }}", len);
    // Magic + version + u16 length prefix.
    let preamble = MAGIC.len() + 2 + 2;
    let unpadded = preamble + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');
    header
}

/// Write `data` as a version 1.0 `.npy` stream.
///
/// # Errors
///
/// Propagates errors from `writer`.
pub fn write_u8_array<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    let header = header_for(data.len());
    // The header of a 1-D u1 array is always far below u16::MAX.
    let header_len = u16::try_from(header.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "npy header too long"))?;

    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&header_len.to_le_bytes())?;
    writer.write_all(header.as_bytes())?;
    writer.write_all(data)
}

/// Encode `data` as an in-memory version 1.0 `.npy` buffer.
///
/// # Errors
///
/// Same as [`write_u8_array`].
pub fn encode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(ALIGNMENT * 2 + data.len());
    write_u8_array(&mut bytes, data)?;
    Ok(bytes)
}

/// Decode a `.npy` buffer holding a 1-D `u1` array.
///
/// # Errors
///
/// [`NpyError`] describing the first structural problem found.
pub fn decode(bytes: &[u8]) -> Result<Vec<u8>, NpyError> {
    let (len, data_start) = parse_preamble(bytes)?;
    let data = &bytes[data_start..];

    if data.len() < len {
        return Err(NpyError::Truncated {
            expected: data_start.saturating_add(len),
            actual: bytes.len(),
        });
    }
    if data.len() > len {
        return Err(NpyError::TrailingBytes {
            expected: len,
            actual: data.len(),
        });
    }
    Ok(data.to_vec())
}

/// Validate magic, version and header; return `(element_count, data_offset)`.
fn parse_preamble(bytes: &[u8]) -> Result<(usize, usize), NpyError> {
    let need = |expected: usize| {
        if bytes.len() < expected {
            Err(NpyError::Truncated {
                expected,
                actual: bytes.len(),
            })
        } else {
            Ok(())
        }
    };

    need(MAGIC.len() + 2)?;
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(NpyError::InvalidMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (header_len, header_start) = match (major, minor) {
        (1, 0) => {
            need(10)?;
            (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10)
        }
        (2, 0) | (3, 0) => {
            need(12)?;
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        _ => return Err(NpyError::UnsupportedVersion { major, minor }),
    };

    let data_start = header_start + header_len;
    need(data_start)?;

    // v1/v2 headers are latin-1, v3 headers UTF-8; a valid u1 header is ASCII either way.
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| NpyError::HeaderEncoding)?;

    let fields = HeaderParser::new(header).parse()?;
    let len = fields.validate()?;
    Ok((len, data_start))
}

#[derive(Debug, Default)]
struct HeaderFields {
    descr: Option<String>,
    fortran_order: Option<bool>,
    shape: Option<Vec<usize>>,
}

impl HeaderFields {
    fn validate(self) -> Result<usize, NpyError> {
        let descr = self
            .descr
            .ok_or_else(|| NpyError::MalformedHeader("missing 'descr'".into()))?;
        if descr != "|u1" && descr != "u1" {
            return Err(NpyError::UnsupportedDtype(descr));
        }

        match self.fortran_order {
            Some(false) => {}
            Some(true) => return Err(NpyError::FortranOrder),
            None => return Err(NpyError::MalformedHeader("missing 'fortran_order'".into())),
        }

        let shape = self
            .shape
            .ok_or_else(|| NpyError::MalformedHeader("missing 'shape'".into()))?;
        match shape.as_slice() {
            [len] => Ok(*len),
            _ => Err(NpyError::UnsupportedShape(shape)),
        }
    }
}

enum Literal {
    Str(String),
    Bool(bool),
    Tuple(Vec<usize>),
}

/// Parser for the small Python literal subset used in `.npy` headers.
struct HeaderParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> HeaderParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> Result<HeaderFields, NpyError> {
        let mut fields = HeaderFields::default();

        self.expect('{')?;
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                break;
            }

            let key = self.parse_string()?;
            self.expect(':')?;
            let value = self.parse_literal()?;

            match (key.as_str(), value) {
                ("descr", Literal::Str(s)) => fields.descr = Some(s),
                ("fortran_order", Literal::Bool(b)) => fields.fortran_order = Some(b),
                ("shape", Literal::Tuple(t)) => fields.shape = Some(t),
                ("descr" | "fortran_order" | "shape", _) => {
                    return Err(NpyError::MalformedHeader(format!(
                        "unexpected value type for '{}'",
                        key
                    )))
                }
                _ => {}
            }

            self.skip_whitespace();
            if !self.eat(',') {
                self.expect('}')?;
                break;
            }
        }

        self.skip_whitespace();
        if self.pos != self.input.len() {
            return Err(self.error("trailing characters after header dict"));
        }
        Ok(fields)
    }

    fn parse_literal(&mut self) -> Result<Literal, NpyError> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'' | '"') => self.parse_string().map(Literal::Str),
            Some('(') => self.parse_tuple().map(Literal::Tuple),
            Some(_) => {
                let word = self.take_while(|c| c.is_ascii_alphabetic());
                match word {
                    "True" => Ok(Literal::Bool(true)),
                    "False" => Ok(Literal::Bool(false)),
                    _ => Err(self.error("expected a string, a boolean or a tuple")),
                }
            }
            None => Err(self.error("unexpected end of header")),
        }
    }

    fn parse_string(&mut self) -> Result<String, NpyError> {
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.pos += 1;
        let value = self.take_while(|c| c != quote).to_owned();
        self.expect(quote)?;
        Ok(value)
    }

    fn parse_tuple(&mut self) -> Result<Vec<usize>, NpyError> {
        self.expect('(')?;
        let mut dims = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(')') {
                return Ok(dims);
            }

            let digits = self.take_while(|c| c.is_ascii_digit());
            let dim = digits
                .parse::<usize>()
                .map_err(|_| self.error("expected a non-negative integer dimension"))?;
            dims.push(dim);

            self.skip_whitespace();
            if !self.eat(',') {
                self.expect(')')?;
                return Ok(dims);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), NpyError> {
        self.skip_whitespace();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.input[self.pos..];
        let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn error(&self, message: &str) -> NpyError {
        NpyError::MalformedHeader(format!("{} at offset {}", message, self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(major: u8, header: &str, data: &[u8]) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[major, 0]);
        if major == 1 {
            bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        } else {
            bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
        }
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_header_layout_matches_numpy() {
        let bytes = encode(&[7; 100]).unwrap();
        assert_eq!(&bytes[..8], b"\x93NUMPY\x01\x00");

        let header_len = usize::from(u16::from_le_bytes([bytes[8], bytes[9]]));
        assert_eq!((10 + header_len) % 64, 0);

        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '|u1', 'fortran_order': False, 'shape': (100,), }"));
        assert!(header.ends_with('\n'));
        assert_eq!(bytes.len(), 10 + header_len + 100);
    }

    #[test]
    fn test_write_matches_encode() {
        let data: Vec<u8> = (0..=255).collect();
        let mut written = Vec::new();
        write_u8_array(&mut written, &data).unwrap();
        assert_eq!(written, encode(&data).unwrap());
        assert_eq!(decode(&written).unwrap(), data);
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(decode(&encode(&[]).unwrap()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_accepts_version_2_and_3() {
        let header = "{'descr': 'u1', 'fortran_order': False, 'shape': (3,)}\n";
        assert_eq!(decode(&with_header(2, header, &[1, 2, 3])).unwrap(), vec![1, 2, 3]);
        assert_eq!(decode(&with_header(3, header, &[4, 5, 6])).unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn test_accepts_reordered_keys_and_double_quotes() {
        let header = r#"{"shape": (2, ), "fortran_order": False, "descr": "|u1"}"#;
        assert_eq!(decode(&with_header(1, header, &[9, 8])).unwrap(), vec![9, 8]);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = encode(&[1, 2]).unwrap();
        bytes[1] = b'X';
        assert_eq!(decode(&bytes), Err(NpyError::InvalidMagic));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = encode(&[1]).unwrap();
        bytes[6] = 4;
        assert_eq!(
            decode(&bytes),
            Err(NpyError::UnsupportedVersion { major: 4, minor: 0 })
        );
    }

    #[test]
    fn test_rejects_other_dtypes() {
        let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (1,), }\n";
        assert_eq!(
            decode(&with_header(1, header, &[0; 8])),
            Err(NpyError::UnsupportedDtype("<f8".into()))
        );
    }

    #[test]
    fn test_rejects_fortran_order_and_multi_dim() {
        let header = "{'descr': '|u1', 'fortran_order': True, 'shape': (2,), }\n";
        assert_eq!(decode(&with_header(1, header, &[0; 2])), Err(NpyError::FortranOrder));

        let header = "{'descr': '|u1', 'fortran_order': False, 'shape': (2, 2), }\n";
        assert_eq!(
            decode(&with_header(1, header, &[0; 4])),
            Err(NpyError::UnsupportedShape(vec![2, 2]))
        );

        let header = "{'descr': '|u1', 'fortran_order': False, 'shape': (), }\n";
        assert_eq!(
            decode(&with_header(1, header, &[0])),
            Err(NpyError::UnsupportedShape(vec![]))
        );
    }

    #[test]
    fn test_rejects_truncated_and_trailing_data() {
        let bytes = encode(&[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(NpyError::Truncated { .. })
        ));
        assert!(matches!(decode(&bytes[..9]), Err(NpyError::Truncated { .. })));

        let mut longer = bytes.clone();
        longer.push(0);
        assert_eq!(
            decode(&longer),
            Err(NpyError::TrailingBytes { expected: 4, actual: 5 })
        );
    }

    #[test]
    fn test_huge_shape_is_truncated_not_overflow() {
        let header = format!(
            "{{'descr': '|u1', 'fortran_order': False, 'shape': ({},), }}\n",
            usize::MAX
        );
        assert_eq!(
            decode(&with_header(1, &header, &[0; 16])),
            Err(NpyError::Truncated {
                expected: usize::MAX,
                actual: 10 + header.len() + 16,
            })
        );
    }

    #[test]
    fn test_rejects_malformed_header() {
        for header in [
            "not a dict\n",
            "{'descr': '|u1', 'fortran_order': False\n",
            "{'descr': '|u1', 'fortran_order': maybe, 'shape': (1,)}\n",
            "{'descr': '|u1', 'fortran_order': False, 'shape': (-1,)}\n",
            "{'fortran_order': False, 'shape': (1,)}\n",
            "{'descr': 1, 'fortran_order': False, 'shape': (1,)}\n",
        ] {
            assert!(
                matches!(
                    decode(&with_header(1, header, &[0])),
                    Err(NpyError::MalformedHeader(_))
                ),
                "header {header:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_error_messages() {
        assert!(NpyError::InvalidMagic.to_string().contains("magic"));
        assert!(NpyError::UnsupportedDtype("<i4".into()).to_string().contains("<i4"));
    }
}
