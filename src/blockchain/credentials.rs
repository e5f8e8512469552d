//! Credential file handling and first-run bootstrap.
//!
//! The credential file holds exactly one secret seed as plain text. It is
//! staged in a temp sibling with owner-only permissions, then renamed into
//! place without overwriting anything.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::{NamedTempFile, PersistError};

use crate::blockchain::faucet::Faucet;
use crate::blockchain::types::{WalletError, WalletResult};
use crate::blockchain::wallet::Identity;

fn credential_io(path: &Path, source: std::io::Error) -> WalletError {
    WalletError::CredentialIo {
        path: path.display().to_string(),
        source,
    }
}

/// Load the identity stored at `path`.
///
/// Surrounding whitespace is ignored. Malformed content is an
/// `InvalidCredential`; the file is left untouched.
pub fn load_identity(path: &Path) -> WalletResult<Identity> {
    let contents = fs::read_to_string(path).map_err(|e| credential_io(path, e))?;
    parse_credential(path, &contents)
}

fn parse_credential(path: &Path, contents: &str) -> WalletResult<Identity> {
    Identity::from_secret_seed(contents.trim()).map_err(|e| WalletError::InvalidCredential {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Write the seed to a temp sibling of `path` (mode 0600 on Unix).
///
/// Nothing is visible at `path` until [`commit`]; dropping the returned file
/// deletes it.
fn stage(path: &Path, identity: &Identity) -> WalletResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| credential_io(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| credential_io(path, e))?;
    }

    staged
        .write_all(identity.secret_seed().as_bytes())
        .and_then(|_| staged.write_all(b"\n"))
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| credential_io(path, e))?;
    Ok(staged)
}

/// Move a staged seed to `path`. Never replaces an existing file.
fn commit(staged: NamedTempFile, path: &Path) -> Result<(), PersistError> {
    staged.persist_noclobber(path)?;
    Ok(())
}

/// Persist `identity`'s seed to a new file at `path` (mode 0600 on Unix).
///
/// Fails if the file already exists.
pub fn store_identity(path: &Path, identity: &Identity) -> WalletResult<()> {
    let staged = stage(path, identity)?;
    commit(staged, path).map_err(|e| credential_io(path, e.error))?;

    tracing::info!(path = %path.display(), address = %identity.address(), "Credential file written");
    Ok(())
}

/// Load the identity at `path`, or create, fund and persist a new one.
///
/// Once the file exists this never generates or funds again. The seed is
/// staged next to `path` before funding, so an unwritable location fails
/// without calling the faucet, and a funding failure leaves no credential
/// file behind. If the final rename fails after funding, the staged file is
/// kept and its location is reported.
pub async fn load_or_create_identity<F>(path: &Path, faucet: &F) -> WalletResult<Identity>
where
    F: Faucet + ?Sized,
{
    match fs::read_to_string(path) {
        Ok(contents) => {
            let identity = parse_credential(path, &contents)?;
            tracing::info!(
                path = %path.display(),
                address = %identity.address(),
                "Loaded existing identity"
            );
            return Ok(identity);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(credential_io(path, e)),
    }

    let identity = Identity::generate()?;
    tracing::info!(
        path = %path.display(),
        address = %identity.address(),
        "No credential file found, bootstrapping new identity"
    );

    let staged = stage(path, &identity)?;
    faucet.request_funding(&identity.address()).await?;

    if let Err(e) = commit(staged, path) {
        let kept = e.file.into_temp_path().keep();
        let location = match &kept {
            Ok(kept) => kept.display().to_string(),
            Err(_) => "<lost>".to_string(),
        };
        tracing::error!(
            path = %path.display(),
            address = %identity.address(),
            staged = %location,
            "Funded identity could not be moved into place"
        );
        return Err(credential_io(
            path,
            std::io::Error::new(
                e.error.kind(),
                format!("{} (funded seed kept at {})", e.error, location),
            ),
        ));
    }

    tracing::info!(path = %path.display(), address = %identity.address(), "Credential file written");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("account.seed");
        let identity = Identity::from_raw_seed([8u8; 32]);

        store_identity(&path, &identity).unwrap();
        let loaded = load_identity(&path).unwrap();
        assert_eq!(loaded.address(), identity.address());
    }

    #[test]
    fn test_store_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("account.seed");
        store_identity(&path, &Identity::from_raw_seed([8u8; 32])).unwrap();

        let err = store_identity(&path, &Identity::from_raw_seed([9u8; 32])).unwrap_err();
        assert!(matches!(err, WalletError::CredentialIo { .. }));
        assert_eq!(
            load_identity(&path).unwrap().address(),
            Identity::from_raw_seed([8u8; 32]).address()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("account.seed");
        store_identity(&path, &Identity::from_raw_seed([8u8; 32])).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_store_into_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("account.seed");

        let err = store_identity(&path, &Identity::from_raw_seed([8u8; 32])).unwrap_err();
        assert!(matches!(err, WalletError::CredentialIo { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_no_staging_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("account.seed");
        store_identity(&path, &Identity::from_raw_seed([8u8; 32])).unwrap();
        let _ = store_identity(&path, &Identity::from_raw_seed([9u8; 32]));

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_malformed_credential() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("account.seed");
        fs::write(&path, "definitely not a seed").unwrap();

        let err = load_identity(&path).unwrap_err();
        assert!(matches!(err, WalletError::InvalidCredential { .. }));
        // not repaired
        assert_eq!(fs::read_to_string(&path).unwrap(), "definitely not a seed");
    }

    #[test]
    fn test_missing_credential() {
        let dir = tempdir().unwrap();
        let err = load_identity(&dir.path().join("missing.seed")).unwrap_err();
        assert!(matches!(err, WalletError::CredentialIo { .. }));
    }
}
