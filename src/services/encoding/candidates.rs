use crate::types::errors::EncodingError;
use encoding_rs::Encoding;
use std::sync::LazyLock;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// One text encoding the normalizer may try.
///
/// Every variant decodes strictly: malformed input yields `None`, never
/// replacement characters.
#[derive(Debug, Clone, Copy)]
pub enum Candidate {
    /// UTF-8, skipping a leading byte order mark when present.
    Utf8Bom,
    Utf8,
    Ascii,
    /// UTF-16 with a byte order mark (LE or BE).
    Utf16,
    /// UTF-32 with a byte order mark (LE or BE).
    Utf32,
    /// A WHATWG legacy decoder. Output containing C1 control characters is
    /// rejected, which restores the undefined-byte errors of the code pages.
    Legacy(&'static Encoding),
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl Candidate {
    pub fn name(&self) -> &'static str {
        match self {
            Candidate::Utf8Bom => "UTF-8-BOM",
            Candidate::Utf8 => "UTF-8",
            Candidate::Ascii => "ASCII",
            Candidate::Utf16 => "UTF-16",
            Candidate::Utf32 => "UTF-32",
            Candidate::Legacy(encoding) => encoding.name(),
            Candidate::Latin1 => "ISO-8859-1",
        }
    }

    /// Strictly decode `bytes`, returning `None` if this encoding rejects them.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Candidate::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            Candidate::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Candidate::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| b as char).collect()),
            Candidate::Utf16 => decode_utf16_with_bom(bytes),
            Candidate::Utf32 => decode_utf32_with_bom(bytes),
            Candidate::Legacy(encoding) => {
                let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
                if text.chars().any(is_c1_control) {
                    return None;
                }
                Some(text.into_owned())
            }
            Candidate::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Whether this candidate accepts every byte sequence.
    ///
    /// Probed rather than declared: a candidate that decodes each of the 256
    /// single-byte inputs and the full byte range can never fail.
    pub fn is_permissive(&self) -> bool {
        let all: Vec<u8> = (0..=u8::MAX).collect();
        (0..=u8::MAX).all(|b| self.decode(&[b]).is_some()) && self.decode(&all).is_some()
    }
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9F}').contains(&c)
}

fn decode_utf16_with_bom(bytes: &[u8]) -> Option<String> {
    // FF FE 00 00 is the UTF-32LE mark, not UTF-16LE followed by NUL.
    if bytes.starts_with(UTF32_LE_BOM) {
        return None;
    }
    let (encoding, bom_len) = Encoding::for_bom(bytes)?;
    if encoding == encoding_rs::UTF_8 {
        return None;
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
}

fn decode_utf32_with_bom(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(body) = bytes.strip_prefix(UTF32_LE_BOM) {
        (body, true)
    } else if let Some(body) = bytes.strip_prefix(UTF32_BE_BOM) {
        (body, false)
    } else {
        return None;
    };

    if body.len() % 4 != 0 {
        return None;
    }

    body.chunks_exact(4)
        .map(|unit| {
            let raw = [unit[0], unit[1], unit[2], unit[3]];
            let value = if little_endian {
                u32::from_le_bytes(raw)
            } else {
                u32::from_be_bytes(raw)
            };
            char::from_u32(value)
        })
        .collect()
}

/// Ordered candidate encodings, strict ones first.
///
/// A list where a strict candidate follows a permissive one cannot be built:
/// the permissive candidate would always succeed first and mask the strict one.
#[derive(Debug, Clone)]
pub struct EncodingCandidateList {
    candidates: Vec<Candidate>,
}

static DEFAULT_CHAIN: LazyLock<EncodingCandidateList> =
    LazyLock::new(|| EncodingCandidateList::ranked(default_candidates()));

impl EncodingCandidateList {
    /// Build a list from an explicit order, rejecting misordered input.
    pub fn try_new(candidates: Vec<Candidate>) -> Result<Self, EncodingError> {
        let mut first_permissive: Option<&Candidate> = None;
        for candidate in &candidates {
            match (first_permissive, candidate.is_permissive()) {
                (None, true) => first_permissive = Some(candidate),
                (Some(permissive), false) => {
                    return Err(EncodingError::Misordered {
                        strict: candidate.name(),
                        permissive: permissive.name(),
                    })
                }
                _ => {}
            }
        }
        Ok(Self { candidates })
    }

    /// Build a list keeping the given order among strict candidates and among
    /// permissive candidates, with every permissive candidate moved to the end.
    pub fn ranked(candidates: Vec<Candidate>) -> Self {
        let (strict, permissive): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| !c.is_permissive());
        Self {
            candidates: strict.into_iter().chain(permissive).collect(),
        }
    }

    /// The full fallback chain used for extracted submissions.
    pub fn default_chain() -> &'static EncodingCandidateList {
        &DEFAULT_CHAIN
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// True when no strict candidate appears after a permissive one.
    pub fn is_well_ordered(&self) -> bool {
        let first_permissive = self
            .candidates
            .iter()
            .position(Candidate::is_permissive)
            .unwrap_or(self.candidates.len());
        self.candidates[first_permissive..]
            .iter()
            .all(Candidate::is_permissive)
    }
}

impl Default for EncodingCandidateList {
    fn default() -> Self {
        DEFAULT_CHAIN.clone()
    }
}

fn default_candidates() -> Vec<Candidate> {
    use encoding_rs::*;

    let mut list = vec![
        Candidate::Utf8Bom,
        Candidate::Utf8,
        Candidate::Ascii,
        Candidate::Utf16,
        Candidate::Utf32,
    ];

    // Western and Turkish code pages first: most submissions that are not
    // UTF-8 come from these locales.
    let legacy: &[&'static Encoding] = &[
        WINDOWS_1254,
        WINDOWS_1252,
        WINDOWS_1250,
        WINDOWS_1251,
        WINDOWS_1253,
        WINDOWS_1255,
        WINDOWS_1257,
        WINDOWS_1258,
        WINDOWS_874,
        SHIFT_JIS,
        EUC_JP,
        ISO_2022_JP,
        EUC_KR,
        BIG5,
        GBK,
        GB18030,
        ISO_8859_2,
        ISO_8859_3,
        ISO_8859_4,
        ISO_8859_5,
        ISO_8859_6,
        ISO_8859_7,
        ISO_8859_8,
        ISO_8859_10,
        ISO_8859_13,
        ISO_8859_14,
        ISO_8859_15,
        ISO_8859_16,
        WINDOWS_1256,
        KOI8_R,
        KOI8_U,
        IBM866,
        X_MAC_CYRILLIC,
        MACINTOSH,
    ];
    list.extend(legacy.iter().map(|&encoding| Candidate::Legacy(encoding)));

    list.push(Candidate::Latin1);
    list
}
