//! ROM text decompression for literal strings stored in compressed form.
//!
//! Compressed text starts with the [`MARKER`] byte. Each following byte is
//! either a literal ASCII character (high bit clear) or, with the high bit
//! set, the index (0-127) of a common word in a [`Dictionary`]. A space is
//! inserted before every word except a leading one, and before a literal
//! that directly follows a word:
//!
//! ```text
//! FF  80  'X' 'Y'       dictionary ["cat", "dog"]
//!     │    └───┴── literal "XY"
//!     └── word 0
//! => "cat XY"
//! ```
//!
//! A 0 byte ends the input early. The dictionary data is the concatenation
//! of its words, each marked by setting the high bit of its final byte.

use std::borrow::Cow;
use std::fmt;

use crate::error::{RomTextError, RomTextResult};

/// First byte of every compressed text
pub const MARKER: u8 = 0xFF;

/// Most words a dictionary can index
pub const MAX_WORDS: usize = 128;

const HIGH_BIT: u8 = 0x80;

/// Whether `text` carries the compression marker
#[inline]
pub fn is_compressed(text: &[u8]) -> bool {
    text.first() == Some(&MARKER)
}

/// What the previous token was, for space insertion
#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    AfterWord,
    AfterLiteral,
}

/// One dictionary word, still in its high-bit-terminated encoding
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    encoded: &'a [u8],
}

impl<'a> Word<'a> {
    /// Decoded bytes
    pub fn bytes(&self) -> impl Iterator<Item = u8> + 'a {
        self.encoded.iter().map(|b| b & !HIGH_BIT)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes().collect()
    }
}

impl fmt::Debug for Word<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:?})", String::from_utf8_lossy(&self.to_vec()))
    }
}

/// Table of common words, indexed from 0
///
/// # Examples
///
/// ```
/// use istr::rom_text::Dictionary;
///
/// let data = Dictionary::encode(&[b"cat", b"dog"]).unwrap();
/// let dict = Dictionary::new(&data).unwrap();
///
/// assert_eq!(dict.decompress(&[0xFF, 0x80, b'X', b'Y']).unwrap(), b"cat XY");
/// assert_eq!(dict.decompress(&[0xFF, b'a', 0x81]).unwrap(), b"a dog");
/// ```
#[derive(Clone, Debug)]
pub struct Dictionary<'a> {
    data: &'a [u8],
    /// Start offset of every word; word `n` ends just before `starts[n + 1]`
    starts: Vec<usize>,
}

impl<'a> Dictionary<'a> {
    /// Index the words in `data`
    ///
    /// # Errors
    ///
    /// Returns [`RomTextError::InvalidDictionary`] if `data` is empty, its
    /// last word is unterminated, or it holds more than [`MAX_WORDS`] words.
    pub fn new(data: &'a [u8]) -> RomTextResult<Self> {
        match data.last() {
            None => {
                return Err(RomTextError::InvalidDictionary(
                    "dictionary has no words".to_string(),
                ))
            }
            Some(last) if last & HIGH_BIT == 0 => {
                return Err(RomTextError::InvalidDictionary(
                    "last word is not terminated by a high-bit byte".to_string(),
                ))
            }
            Some(_) => {}
        }

        let mut starts = vec![0];
        for (at, byte) in data.iter().enumerate() {
            if byte & HIGH_BIT != 0 {
                starts.push(at + 1);
            }
        }

        let words = starts.len() - 1;
        if words > MAX_WORDS {
            return Err(RomTextError::InvalidDictionary(format!(
                "{} words, at most {} can be indexed",
                words, MAX_WORDS
            )));
        }

        Ok(Self { data, starts })
    }

    /// Encode `words` in dictionary form
    ///
    /// # Errors
    ///
    /// Returns [`RomTextError::InvalidDictionary`] for an empty word, a word
    /// containing a high-bit byte, or more than [`MAX_WORDS`] words.
    pub fn encode(words: &[&[u8]]) -> RomTextResult<Vec<u8>> {
        if words.len() > MAX_WORDS {
            return Err(RomTextError::InvalidDictionary(format!(
                "{} words, at most {} can be indexed",
                words.len(),
                MAX_WORDS
            )));
        }

        let mut data = Vec::with_capacity(words.iter().map(|w| w.len()).sum());
        for (index, word) in words.iter().enumerate() {
            let Some((&last, head)) = word.split_last() else {
                return Err(RomTextError::InvalidDictionary(format!("word {} is empty", index)));
            };
            if word.iter().any(|b| b & HIGH_BIT != 0) {
                return Err(RomTextError::InvalidDictionary(format!(
                    "word {} is not ASCII",
                    index
                )));
            }
            data.extend_from_slice(head);
            data.push(last | HIGH_BIT);
        }
        Ok(data)
    }

    /// Number of words
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Word `n`, or `None` past the end
    pub fn word(&self, n: usize) -> Option<Word<'a>> {
        let start = *self.starts.get(n)?;
        let end = *self.starts.get(n + 1)?;
        Some(Word {
            encoded: &self.data[start..end],
        })
    }

    /// Feed the decompressed bytes of `src` to `emit`, terminator excluded
    fn expand(&self, src: &[u8], mut emit: impl FnMut(u8)) -> RomTextResult<()> {
        let body = match src.split_first() {
            Some((&MARKER, body)) => body,
            _ => return Err(RomTextError::MissingMarker),
        };

        let mut state = State::Start;
        for &byte in body.iter().take_while(|&&b| b != 0) {
            if byte & HIGH_BIT != 0 {
                let index = byte & !HIGH_BIT;
                let word = self.word(index as usize).ok_or(RomTextError::UnknownWord {
                    index,
                    words: self.len(),
                })?;
                if state != State::Start {
                    emit(b' ');
                }
                state = State::AfterWord;
                word.bytes().for_each(&mut emit);
            } else {
                if state == State::AfterWord {
                    emit(b' ');
                }
                state = State::AfterLiteral;
                emit(byte);
            }
        }
        Ok(())
    }

    /// Length of the decompressed text, terminator excluded
    pub fn decompressed_len(&self, src: &[u8]) -> RomTextResult<usize> {
        let mut len = 0;
        self.expand(src, |_| len += 1)?;
        Ok(len)
    }

    /// Decompress `src` into `dst` followed by a 0 terminator
    ///
    /// Returns the text length, terminator excluded. `dst` is untouched on
    /// error.
    ///
    /// # Errors
    ///
    /// - [`RomTextError::MissingMarker`] if `src` is not compressed
    /// - [`RomTextError::UnknownWord`] for an index past the dictionary
    /// - [`RomTextError::BufferTooSmall`] if `dst` cannot hold the text and
    ///   its terminator
    pub fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> RomTextResult<usize> {
        let len = self.decompressed_len(src)?;
        if dst.len() <= len {
            return Err(RomTextError::BufferTooSmall {
                needed: len + 1,
                available: dst.len(),
            });
        }

        let mut at = 0;
        self.expand(src, |byte| {
            dst[at] = byte;
            at += 1;
        })?;
        dst[at] = 0;
        log::trace!("istr: decompressed {} bytes into {}", src.len(), len);
        Ok(len)
    }

    /// Decompressed text of `src`, without a terminator
    pub fn decompress(&self, src: &[u8]) -> RomTextResult<Vec<u8>> {
        let mut out = Vec::new();
        self.expand(src, |byte| out.push(byte))?;
        Ok(out)
    }

    /// Literal text ready for use: decompressed if marked, borrowed otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use istr::rom_text::Dictionary;
    /// use std::borrow::Cow;
    ///
    /// let data = Dictionary::encode(&[b"error"]).unwrap();
    /// let dict = Dictionary::new(&data).unwrap();
    ///
    /// assert!(matches!(dict.resolve(b"plain").unwrap(), Cow::Borrowed(_)));
    /// assert_eq!(&*dict.resolve(&[0xFF, 0x80, b'!']).unwrap(), b"error !");
    /// ```
    pub fn resolve<'s>(&self, literal: &'s [u8]) -> RomTextResult<Cow<'s, [u8]>> {
        if is_compressed(literal) {
            self.decompress(literal).map(Cow::Owned)
        } else {
            Ok(Cow::Borrowed(literal))
        }
    }
}
