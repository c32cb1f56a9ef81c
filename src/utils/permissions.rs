use std::fs;
use std::io;
use std::path::Path;

/// Clears the read-only attribute on `path`.
///
/// On Unix this adds the owner write bit and leaves every other bit alone.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the permissions cannot
/// be changed.
pub fn make_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = permissions.mode();
        if mode & 0o200 != 0 {
            return Ok(());
        }
        permissions.set_mode(mode | 0o200);
    }

    #[cfg(not(unix))]
    {
        if !permissions.readonly() {
            return Ok(());
        }
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions)
}
