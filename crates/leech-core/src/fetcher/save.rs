//! Writing downloaded images under unique, timestamp-derived names.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Give up after this many consecutive name collisions.
const MAX_NAME_ATTEMPTS: u32 = 64;

/// `main-<secs>.<micros>.jpg` for the given instant.
pub fn image_file_name(now: SystemTime) -> String {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "main-{}.{:06}.jpg",
        since_epoch.as_secs(),
        since_epoch.subsec_micros()
    )
}

/// Create `dir` (and parents) if missing. Safe to call from many workers at once.
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Write `bytes` to a new file in `dir` and return its path.
///
/// The name is stamped at write time. Files are opened with create-new, so two
/// workers that capture the same timestamp never share a path: the loser
/// re-stamps and tries again. A failed write removes the partial file.
pub fn save_image(dir: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(image_file_name(SystemTime::now()));
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                std::thread::yield_now();
                continue;
            }
            Err(e) => return Err(e),
        };
        if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        return Ok(path);
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free image name in {} after {} attempts", dir.display(), MAX_NAME_ATTEMPTS),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn file_name_from_timestamp() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        assert_eq!(image_file_name(t), "main-1700000000.123456.jpg");
        let t = UNIX_EPOCH + Duration::new(5, 7_000);
        assert_eq!(image_file_name(t), "main-5.000007.jpg");
    }

    #[test]
    fn ensure_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("img").join("nested");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn ensure_output_dir_under_concurrent_callers() {
        let dir = tempfile::tempdir().unwrap();
        let out = Arc::new(dir.path().join("img"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let out = Arc::clone(&out);
                std::thread::spawn(move || ensure_output_dir(&out))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert!(out.is_dir());
    }

    #[test]
    fn save_image_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_image(dir.path(), b"jpeg-bytes").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"jpeg-bytes");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("main-") && name.ends_with(".jpg"));
    }

    #[test]
    fn concurrent_saves_never_share_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Arc::new(dir.path().to_path_buf());
        let handles: Vec<_> = (0..16u8)
            .map(|i| {
                let d = Arc::clone(&dir_path);
                std::thread::spawn(move || save_image(&d, &[i; 32]).unwrap())
            })
            .collect();
        let paths: HashSet<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(paths.len(), 16);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 16);
    }

    #[test]
    fn save_into_missing_dir_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(save_image(&missing, b"x").is_err());
        assert!(!missing.exists());
    }
}
