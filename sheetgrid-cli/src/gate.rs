//! Login gate.
//!
//! A marker file records that the user has logged in. It carries no
//! credentials; its presence is read once at startup and handed to the data
//! session as a [`SessionContext`].

use std::fs;
use std::io;
use std::path::Path;

use sheetgrid_lib::SessionContext;

/// Reads the gate state from `marker`.
pub fn context(marker: Option<&Path>) -> SessionContext {
    SessionContext::new(marker.is_some_and(Path::is_file))
}

/// Creates the marker, along with its directory.
pub fn login(marker: &Path) -> io::Result<()> {
    if let Some(dir) = marker.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(marker, chrono::Local::now().to_rfc3339())
}

/// Removes the marker. Returns `false` if there was none.
pub fn logout(marker: &Path) -> io::Result<bool> {
    match fs::remove_file(marker) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("state").join("session");

        assert!(!context(Some(&marker)).is_authenticated());

        login(&marker).unwrap();
        assert!(context(Some(&marker)).is_authenticated());

        assert!(logout(&marker).unwrap());
        assert!(!context(Some(&marker)).is_authenticated());
        assert!(!logout(&marker).unwrap());
    }

    #[test]
    fn test_no_marker_path() {
        assert!(!context(None).is_authenticated());
    }
}
