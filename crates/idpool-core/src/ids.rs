//! Identifier list
//!
//! The list is loaded once by the pool driver and never mutated afterwards.
//! Workers share it read-only through a cheap clone of the inner `Arc`.

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::error::LoadError;
use crate::Identifier;

/// Ordered, immutable sequence of identifiers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierList {
    ids: Arc<[Identifier]>,
}

impl IdentifierList {
    /// Load a whitespace-separated list from `path`.
    ///
    /// A missing or unreadable file is an error; malformed tokens are not
    /// (see [`parse_ids`]).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from(parse_ids(&raw)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Identifier> {
        self.ids.get(index).copied()
    }
}

impl From<Vec<Identifier>> for IdentifierList {
    fn from(ids: Vec<Identifier>) -> Self {
        Self { ids: ids.into() }
    }
}

impl Deref for IdentifierList {
    type Target = [Identifier];

    fn deref(&self) -> &[Identifier] {
        &self.ids
    }
}

/// Parse whitespace-separated signed integers.
///
/// Each token contributes its leading integer (optional `+`/`-` then
/// decimal digits); scanning resumes right after the digits, so `12abc`
/// yields 12 and `5-3` yields 5 and -3. When no integer starts at the
/// current position the rest of that token is skipped. Values beyond the
/// `i64` range saturate at `i64::MIN`/`i64::MAX`.
pub fn parse_ids(raw: &[u8]) -> Vec<Identifier> {
    let mut ids = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        if raw[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        match leading_integer(&raw[pos..]) {
            Some((id, used)) => {
                ids.push(id);
                pos += used;
            }
            None => {
                while pos < raw.len() && !raw[pos].is_ascii_whitespace() {
                    pos += 1;
                }
            }
        }
    }
    ids
}

/// Integer at the start of `tok` and the number of bytes it spans
fn leading_integer(tok: &[u8]) -> Option<(Identifier, usize)> {
    let (negative, sign_len) = match tok.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let digits = tok[sign_len..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    let mut value: Identifier = 0;
    for &b in &tok[sign_len..sign_len + digits] {
        let d = Identifier::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    Some((value, sign_len + digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_whitespace() {
        let ids = parse_ids(b"1 2\n3\t\t4\r\n  5\n");
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_skips_only_bad_tokens() {
        let ids = parse_ids(b"10 abc 20 3.5 -7 +8 \xff\xfe 9");
        assert_eq!(ids, vec![10, 20, 3, -7, 8, 9]);
    }

    #[test]
    fn test_parse_takes_leading_integer() {
        assert_eq!(parse_ids(b"12abc 7 1,2"), vec![12, 7, 1]);
        assert_eq!(parse_ids(b"abc12 4"), vec![4]);
        assert_eq!(parse_ids(b"12abc34 - + -x 6"), vec![12, 6]);
        assert_eq!(parse_ids(b"5-3"), vec![5, -3]);
    }

    #[test]
    fn test_parse_empty_and_overflow() {
        assert!(parse_ids(b"").is_empty());
        assert!(parse_ids(b" \n\t ").is_empty());
        assert_eq!(parse_ids(b"99999999999999999999 1"), vec![i64::MAX, 1]);
        assert_eq!(parse_ids(b"-99999999999999999999"), vec![i64::MIN]);
        assert_eq!(parse_ids(b"9223372036854775807 -9223372036854775808"), vec![i64::MAX, i64::MIN]);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join(format!("idpool-missing-{}.txt", std::process::id()));
        let err = IdentifierList::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("idpool-ids-load-{}.txt", std::process::id()));
        std::fs::write(&path, "3 1 x 2\n").unwrap();
        let list = IdentifierList::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(&*list, &[3, 1, 2]);
        assert_eq!(list.get(1), Some(1));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn test_clone_shares_storage() {
        let list = IdentifierList::from(vec![1, 2, 3]);
        let other = list.clone();
        assert!(std::ptr::eq(list.as_ptr(), other.as_ptr()));
    }
}
