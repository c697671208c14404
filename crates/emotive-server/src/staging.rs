//! Per-request staging of uploaded bytes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// An uploaded clip staged to disk for the lifetime of one request.
///
/// Each request gets a uniquely named file, so concurrently in-flight
/// requests never collide. Deletion happens in `Drop`, which covers every
/// exit path — success, classified failures, and unwinding panics.
pub struct StagedAudio {
    file: NamedTempFile,
}

impl StagedAudio {
    /// Write `bytes` to a fresh uniquely-named file under `dir`.
    pub fn stage(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("emotive-upload-")
            .suffix(".wav")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path of the staged copy.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn staged_file_holds_the_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedAudio::stage(dir.path(), b"abc123").unwrap();
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"abc123");
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = {
            let staged = StagedAudio::stage(dir.path(), b"payload").unwrap();
            assert!(staged.path().exists());
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_stages_get_unique_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = StagedAudio::stage(dir.path(), b"one").unwrap();
        let b = StagedAudio::stage(dir.path(), b"two").unwrap();
        assert_ne!(a.path(), b.path());
        // Dropping one must not touch the other
        drop(a);
        assert!(b.path().exists());
        assert_eq!(std::fs::read(b.path()).unwrap(), b"two");
    }

    #[test]
    fn panic_mid_pipeline_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let observed = std::sync::Mutex::new(PathBuf::new());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let staged = StagedAudio::stage(dir.path(), b"doomed").unwrap();
            *observed.lock().unwrap() = staged.path().to_path_buf();
            panic!("simulated crash");
        }));
        assert!(result.is_err());
        assert!(!observed.lock().unwrap().exists());
    }
}
