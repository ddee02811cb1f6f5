//! Lump name handling: short names, name hashing and path normalization.

use std::fmt;

/// Legacy fixed-width lump name: up to 8 uppercase bytes, zero padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShortName([u8; 8]);

impl ShortName {
    /// The all-zero name carried by hidden and unnamed lumps.
    pub const EMPTY: ShortName = ShortName([0; 8]);

    /// Build a short name by uppercasing the first 8 bytes of `name`.
    ///
    /// Copying stops at the first NUL byte; the remainder is zero filled.
    pub fn new(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }

    pub fn from_bytes(name: &[u8]) -> Self {
        let mut out = [0u8; 8];
        for (dst, &src) in out.iter_mut().zip(name.iter().take_while(|&&c| c != 0)) {
            *dst = src.to_ascii_uppercase();
        }
        ShortName(out)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// The name up to its first NUL byte.
    ///
    /// A multi-byte character split by the 8-byte cut is dropped.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&c| c == 0).unwrap_or(8);
        let bytes = &self.0[..len];
        match std::str::from_utf8(bytes) {
            Ok(name) => name,
            Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Case-insensitive comparison against up to 8 bytes of `name`.
    pub fn matches(&self, name: &str) -> bool {
        *self == ShortName::new(name)
    }

    /// Replace every `from` byte with `to`.
    pub(crate) fn replace(&mut self, from: u8, to: u8) {
        for c in self.0.iter_mut() {
            if *c == from {
                *c = to;
            }
        }
    }

    pub(crate) fn hash(&self) -> u32 {
        make_hash(&self.0, 8)
    }
}

impl fmt::Debug for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortName({:?})", self.as_str())
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// djb2 with per-byte case folding (`c | 32`), over at most `len` bytes.
///
/// Hashing stops early at a NUL byte. Upper and lower case ASCII letters hash
/// identically, which is what lets the full name tables serve case-insensitive
/// lookups.
pub fn make_hash(bytes: &[u8], len: usize) -> u32 {
    bytes
        .iter()
        .take(len)
        .take_while(|&&c| c != 0)
        .fold(5381u32, |hash, &c| {
            hash.wrapping_mul(33).wrapping_add(u32::from(c | 32))
        })
}

/// Hash a whole string.
pub fn hash_str(name: &str) -> u32 {
    make_hash(name.as_bytes(), usize::MAX)
}

/// Normalize a container path: backslashes become `/`, everything is lowercased
/// and leading slashes are dropped.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches('/')
        .to_lowercase()
}

/// Strip the extension of the last path segment.
///
/// A dot before the final slash is a directory name character, not an
/// extension boundary.
pub fn strip_extension(name: &str) -> &str {
    let slash = name.rfind('/');
    match name.rfind('.') {
        Some(dot) if slash.map_or(true, |s| dot > s) => &name[..dot],
        _ => name,
    }
}

/// The extension of the last path segment, without the dot.
pub fn extension(name: &str) -> Option<&str> {
    let base = base_name(name);
    base.rfind('.').map(|dot| &base[dot + 1..])
}

/// The last path segment.
pub fn base_name(name: &str) -> &str {
    match name.rfind('/') {
        Some(slash) => &name[slash + 1..],
        None => name,
    }
}

/// Extract a `.{decimal}` resource id tag from a lump name.
///
/// The tag must be closed by `}` followed by a `.` or the end of the name.
/// Returns the name with the tag removed together with the parsed id, or `None`
/// when the name carries no valid tag.
///
/// ```
/// use lumpfs::name::parse_resource_id;
///
/// assert_eq!(
///     parse_resource_id("sounds/mything.{42}.wav"),
///     Some(("sounds/mything.wav".to_string(), 42))
/// );
/// assert_eq!(parse_resource_id("mything.{x}.wav"), None);
/// ```
pub fn parse_resource_id(name: &str) -> Option<(String, u32)> {
    let start = name.rfind(".{")?;
    let rest = &name[start + 2..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after = &rest[digits..];
    let tail = after.strip_prefix('}')?;
    if !(tail.is_empty() || tail.starts_with('.')) {
        return None;
    }
    let id = rest[..digits].parse::<u32>().ok()?;
    let mut stripped = String::with_capacity(name.len());
    stripped.push_str(&name[..start]);
    stripped.push_str(tail);
    Some((stripped, id))
}

/// A short name query is rejected outright when it is obviously a full path.
pub(crate) fn looks_like_full_path(name: &str) -> bool {
    name.len() > 8 && name.contains(['/', '.'])
}

/// A name that can be handed to the short name table.
pub(crate) fn is_short_name_shaped(name: &str) -> bool {
    name.len() <= 8 && !name.contains(['/', '.'])
}

/// Case-insensitive prefix check on raw bytes.
pub(crate) fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
