//! Grouped-section inventory artifact.
//!
//! ```text
//! [cisco]
//! 10.0.0.6 ansible_user=admin ansible_password=admin
//!
//! [arista]
//! 10.0.0.7 ansible_user=admin ansible_password=admin
//!
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use ztpinv_common::config::Credentials;
use ztpinv_common::error::{PipelineError, Result};

use crate::lease::resolver::ResolvedDevice;

/// A resolved device and the vendor it was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDevice {
    pub device: ResolvedDevice,
    pub vendor: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorGroup {
    pub vendor: String,
    pub devices: Vec<ClassifiedDevice>,
}

/// Devices grouped by vendor, in first-seen order of vendors and of devices within a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    groups: Vec<VendorGroup>,
}

impl Inventory {
    pub fn build(devices: impl IntoIterator<Item = ClassifiedDevice>) -> Self {
        let mut groups: Vec<VendorGroup> = Vec::new();
        for device in devices {
            match groups.iter_mut().find(|g| g.vendor == device.vendor) {
                Some(group) => group.devices.push(device),
                None => groups.push(VendorGroup {
                    vendor: device.vendor.clone(),
                    devices: vec![device],
                }),
            }
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[VendorGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.groups.iter().map(|g| g.devices.len()).sum()
    }

    /// Renders the artifact. Every section, the last included, ends with a blank line.
    pub fn render(&self, credentials: &Credentials) -> String {
        let mut out = String::new();
        for group in &self.groups {
            out.push_str(&format!("[{}]\n", group.vendor));
            for entry in &group.devices {
                out.push_str(&format!(
                    "{} ansible_user={} ansible_password={}\n",
                    entry.device.ip_address, credentials.user, credentials.password
                ));
            }
            out.push('\n');
        }
        out
    }

    /// Renders and atomically replaces the artifact at `path`.
    pub fn write_to(&self, path: &Path, credentials: &Credentials) -> Result<()> {
        write_atomic(path, self.render(credentials).as_bytes())
    }
}

/// Mode of a freshly created artifact.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Gives the staged file the permissions of the artifact it replaces, or
/// [`NEW_FILE_MODE`] when there is none yet.
fn copy_permissions(staged: &fs::File, target: &Path) -> std::io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) => staged.set_permissions(meta.permissions()),
        Err(_) => default_permissions(staged),
    }
}

#[cfg(unix)]
fn default_permissions(staged: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    staged.set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions(_staged: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Writes `contents` to a temporary file next to `path` and renames it into place.
///
/// Readers of `path` see either the previous file or the new one, never a
/// partial write. On failure the previous file is left untouched. The
/// permissions of the previous file carry over to the new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let failure = |source: std::io::Error| PipelineError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let parent: PathBuf = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(failure)?;

    let mut staged = NamedTempFile::new_in(&parent).map_err(failure)?;
    staged.write_all(contents).map_err(failure)?;
    copy_permissions(staged.as_file(), path).map_err(failure)?;
    staged.as_file().sync_all().map_err(failure)?;
    staged.persist(path).map_err(|e| failure(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    fn classified(ip: [u8; 4], mac: &str, vendor: &str) -> ClassifiedDevice {
        ClassifiedDevice {
            device: ResolvedDevice {
                ip_address: Ipv4Addr::from(ip),
                hardware_address: mac.to_string(),
                client_identifier: None,
                hostname: None,
                lease_timestamp: 0,
            },
            vendor: vendor.to_string(),
        }
    }

    fn sample() -> Inventory {
        Inventory::build([
            classified([10, 0, 0, 6], "00:1a:1e:aa:bb:cc", "cisco"),
            classified([10, 0, 0, 7], "00:1c:73:00:00:01", "arista"),
            classified([10, 0, 0, 8], "00:1a:1e:aa:bb:cd", "cisco"),
            classified([10, 0, 0, 9], "de:ad:be:ef:00:01", "unknown"),
        ])
    }

    #[test]
    fn groups_in_first_seen_order() {
        let inventory = sample();
        let vendors: Vec<&str> = inventory.groups().iter().map(|g| g.vendor.as_str()).collect();

        assert_eq!(vendors, ["cisco", "arista", "unknown"]);
        assert_eq!(inventory.device_count(), 4);
        assert_eq!(inventory.groups()[0].devices[1].device.ip_address, Ipv4Addr::new(10, 0, 0, 8));
    }

    #[test]
    fn renders_sections_with_credentials() {
        let rendered = sample().render(&Credentials {
            user: "ztp".into(),
            password: "secret".into(),
        });

        assert_eq!(
            rendered,
            "[cisco]\n\
             10.0.0.6 ansible_user=ztp ansible_password=secret\n\
             10.0.0.8 ansible_user=ztp ansible_password=secret\n\
             \n\
             [arista]\n\
             10.0.0.7 ansible_user=ztp ansible_password=secret\n\
             \n\
             [unknown]\n\
             10.0.0.9 ansible_user=ztp ansible_password=secret\n\
             \n"
        );
    }

    #[test]
    fn empty_inventory_renders_nothing() {
        assert_eq!(Inventory::default().render(&Credentials::default()), "");
    }

    #[test]
    fn write_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory").join("hosts");

        write_atomic(&path, b"old contents that are longer than the new ones\n").unwrap();
        sample().write_to(&path, &Credentials::default()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[cisco]\n10.0.0.6 ansible_user=admin ansible_password=admin\n"));
        assert!(!written.contains("old contents"));
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the target path makes the final rename fail.
        let path = dir.path().join("hosts");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "previous").unwrap();

        let err = sample().write_to(&path, &Credentials::default()).unwrap_err();
        assert!(matches!(err, PipelineError::WriteFailure { .. }));
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "previous");
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_the_artifact_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "[old]\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"[new]\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[new]\n");
    }

    #[cfg(unix)]
    #[test]
    fn new_artifact_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");

        sample().write_to(&path, &Credentials::default()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
