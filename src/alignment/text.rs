use crate::error::AlignmentError;

/// Sentence viewed through the UTF-16 code-unit indexing used by every span in this crate.
#[derive(Debug, Clone)]
pub struct Utf16Text<'a> {
    text: &'a str,
    units: Vec<u16>,
}

impl<'a> Utf16Text<'a> {
    pub fn new(text: &'a str) -> Result<Self, AlignmentError> {
        let units: Vec<u16> = text.encode_utf16().collect();
        if units.len() > usize::from(u16::MAX) {
            return Err(AlignmentError::invalid_input(format!(
                "text is {} code units long; spans are limited to {}",
                units.len(),
                u16::MAX
            )));
        }
        Ok(Self { text, units })
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> u16 {
        // Bounded by the check in `new`.
        self.units.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Text of `[start, end)`. Offsets past the end are clamped.
    pub fn slice(&self, start: u16, end: u16) -> String {
        let end = usize::from(end).min(self.units.len());
        let start = usize::from(start).min(end);
        String::from_utf16_lossy(&self.units[start..end])
    }

    /// True when `[start, end)` holds nothing but whitespace (an empty range counts).
    pub fn is_blank(&self, start: u16, end: u16) -> bool {
        let end = usize::from(end).min(self.units.len());
        let start = usize::from(start).min(end);
        char::decode_utf16(self.units[start..end].iter().copied())
            .all(|c| c.map(char::is_whitespace).unwrap_or(false))
    }

    /// Clamps a signed model offset into `[0, len]`.
    pub fn clamp(&self, offset: i32) -> u16 {
        offset.clamp(0, i32::from(self.len())) as u16
    }
}

/// Maps every byte offset of `text` (including `text.len()`) to its UTF-16 offset.
///
/// Offsets inside a multi-byte scalar map to the start of that scalar.
pub(crate) fn byte_to_utf16_offsets(text: &str) -> Vec<usize> {
    let mut map = Vec::with_capacity(text.len() + 1);
    let mut utf16 = 0usize;
    for c in text.chars() {
        for _ in 0..c.len_utf8() {
            map.push(utf16);
        }
        utf16 += c.len_utf16();
    }
    map.push(utf16);
    map
}
