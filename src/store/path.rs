use super::{StoreError, StoreResult};

const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Split a store path into its segments, rejecting empty paths, empty
/// segments and characters the document layout reserves.
pub fn segments(path: &str) -> StoreResult<Vec<&str>> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath("path is empty".into()));
    }
    trimmed
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                Err(StoreError::InvalidPath(format!("empty segment in {:?}", path)))
            } else if segment.contains(&FORBIDDEN[..]) {
                Err(StoreError::InvalidPath(format!("reserved character in {:?}", segment)))
            } else {
                Ok(segment)
            }
        })
        .collect()
}

/// A key that can be used as one path segment.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('/') && !key.contains(&FORBIDDEN[..])
}

/// True when one path is a segment-wise prefix of the other.
pub fn overlaps(a: &[String], b: &[&str]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}
