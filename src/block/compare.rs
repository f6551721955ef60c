//! Guarded byte primitives
//!
//! Both functions take optional buffers and a signed size so that every bad
//! argument combination resolves to the safe outcome: compares report
//! `NotEqual` (the caller writes instead of skipping) and copies do nothing.

/// Outcome of a byte comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCompare {
    NotEqual,
    Equal,
}

impl DataCompare {
    pub fn is_equal(self) -> bool {
        self == DataCompare::Equal
    }
}

/// Compare the first `size` bytes of two buffers.
///
/// `Equal` only when both buffers are present, `size > 0`, both are at least
/// `size` bytes long and the bytes match.
pub fn compare_bytes(a: Option<&[u8]>, b: Option<&[u8]>, size: isize) -> DataCompare {
    let (a, b, size) = match (a, b, usize::try_from(size)) {
        (Some(a), Some(b), Ok(size)) if size > 0 && a.len() >= size && b.len() >= size => {
            (a, b, size)
        }
        (a, b, _) => {
            tracing::error!(
                "Invalid compare parameters: a={:?} b={:?} size={}",
                a.map(<[u8]>::len),
                b.map(<[u8]>::len),
                size
            );
            return DataCompare::NotEqual;
        }
    };

    if a[..size] == b[..size] {
        DataCompare::Equal
    } else {
        DataCompare::NotEqual
    }
}

/// Copy `size` bytes from `src` into `dst`.
///
/// Returns false (and copies nothing) when either buffer is absent, `size <= 0`
/// or `size` exceeds either buffer.
pub fn copy_bytes(src: Option<&[u8]>, dst: Option<&mut [u8]>, size: isize) -> bool {
    match (src, dst, usize::try_from(size)) {
        (Some(src), Some(dst), Ok(size)) if size > 0 && src.len() >= size && dst.len() >= size => {
            tracing::trace!("Copy {} bytes", size);
            dst[..size].copy_from_slice(&src[..size]);
            true
        }
        (src, dst, _) => {
            tracing::error!(
                "Invalid copy parameters: src={:?} dst={:?} size={}",
                src.map(<[u8]>::len),
                dst.map(|d| d.len()),
                size
            );
            false
        }
    }
}
