//! Machine identity
//!
//! A stable per-host string the store key is derived from.

/// Resolve the host identifier, falling back to `hostname:login`.
pub fn machine_id() -> String {
    match platform_machine_id() {
        Some(id) => id,
        None => {
            tracing::warn!("No OS machine identifier found, using host/login fallback");
            fallback_machine_id()
        }
    }
}

fn fallback_machine_id() -> String {
    let host = gethostname::gethostname().to_string_lossy().into_owned();
    let login = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    format!("{}:{}", host, login)
}

#[cfg(windows)]
fn platform_machine_id() -> Option<String> {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
    use winreg::RegKey;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = hklm
        .open_subkey_with_flags(
            "SOFTWARE\\Microsoft\\Cryptography",
            KEY_READ | KEY_WOW64_64KEY,
        )
        .ok()?;
    let guid: String = key.get_value("MachineGuid").ok()?;
    non_empty(&guid)
}

#[cfg(target_os = "macos")]
fn platform_machine_id() -> Option<String> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .ok()?;
    parse_ioreg_uuid(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_machine_id() -> Option<String> {
    ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .find_map(|content| non_empty(&content))
}

#[cfg(not(any(windows, unix)))]
fn platform_machine_id() -> Option<String> {
    None
}

#[cfg(any(windows, all(unix, not(target_os = "macos")), test))]
fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Pull `IOPlatformUUID` out of `ioreg -rd1 -c IOPlatformExpertDevice` output.
#[cfg(any(target_os = "macos", test))]
fn parse_ioreg_uuid(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("\"IOPlatformUUID\""))
        .and_then(|line| line.split('=').nth(1))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ioreg_platform_uuid() {
        let output = r#"+-o J314sAP  <class IOPlatformExpertDevice>
    {
      "IOPlatformSerialNumber" = "C02XXXXX"
      "IOPlatformUUID" = "1A2B3C4D-0000-1111-2222-333344445555"
    }"#;
        assert_eq!(
            parse_ioreg_uuid(output).as_deref(),
            Some("1A2B3C4D-0000-1111-2222-333344445555")
        );
        assert_eq!(parse_ioreg_uuid("nothing here"), None);
    }

    #[test]
    fn machine_id_is_stable_and_non_empty() {
        let first = machine_id();
        assert!(!first.is_empty());
        assert_eq!(first, machine_id());
    }

    #[test]
    fn blank_identifiers_are_ignored() {
        assert_eq!(non_empty("  \n"), None);
        assert_eq!(non_empty("abc\n").as_deref(), Some("abc"));
    }
}
