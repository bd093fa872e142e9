use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;

/// Fixed name of the game executable inside an install directory.
pub const GAME_EXECUTABLE: &str = "KaM_Remake.exe";

/// Sentinel stored when version detection fails.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Matches version identifiers: the letter r followed by 4-5 digits.
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)r\d{4,5}").unwrap());

/// The Inno Setup uninstaller data file; the version string sits near its start.
const UNINSTALLER_DATA_FILE: &str = "unins000.dat";
const UNINSTALLER_SCAN_BYTES: u64 = 0x200;

/// Returns the first version token found in `text`, lowercased.
pub fn extract_version_token(text: &str) -> Option<String> {
    VERSION_REGEX
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// Attempts to detect the game version from the executable's folder.
///
/// Detection methods, in order:
/// 1. A version token in one of the folder path's segments
///    (e.g. `/games/KaM_r10000/KaM_Remake.exe` -> `r10000`)
/// 2. A version token in the first 0x200 bytes of the sibling
///    `unins000.dat` file, decoded as lossy UTF-8
///
/// Returns the lowercased token, or [`UNKNOWN_VERSION`] if nothing matched.
/// I/O errors are swallowed; detection never fails the caller.
pub fn detect_version(executable_path: &Path) -> String {
    try_detect_version(executable_path).unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

fn try_detect_version(executable_path: &Path) -> Option<String> {
    let folder = executable_path.parent()?;

    if let Some(version) = detect_from_folder_name(folder) {
        return Some(version);
    }

    detect_from_uninstaller_file(folder)
}

fn detect_from_folder_name(folder: &Path) -> Option<String> {
    use std::path::Component;

    for component in folder.components() {
        let Component::Normal(segment) = component else {
            continue;
        };
        if let Some(version) = extract_version_token(&segment.to_string_lossy()) {
            return Some(version);
        }
    }

    None
}

fn detect_from_uninstaller_file(folder: &Path) -> Option<String> {
    let file = std::fs::File::open(folder.join(UNINSTALLER_DATA_FILE)).ok()?;

    let mut head = Vec::new();
    file.take(UNINSTALLER_SCAN_BYTES)
        .read_to_end(&mut head)
        .ok()?;

    extract_version_token(&String::from_utf8_lossy(&head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_from_folder_name() {
        let version = detect_version(Path::new("/games/KaM_r10000/KaM_Remake.exe"));
        assert_eq!(version, "r10000");
    }

    #[test]
    fn test_detect_from_folder_name_is_lowercased() {
        let version = detect_version(Path::new("/games/KaM_R12345/KaM_Remake.exe"));
        assert_eq!(version, "r12345");
    }

    #[test]
    fn test_detect_prefers_earlier_path_segments() {
        let version = detect_version(Path::new("/r10000/nested_r20000/KaM_Remake.exe"));
        assert_eq!(version, "r10000");
    }

    #[test]
    fn test_detect_unknown_when_nothing_matches() {
        let version = detect_version(Path::new("/games/knights/KaM_Remake.exe"));
        assert_eq!(version, UNKNOWN_VERSION);
    }

    #[test]
    fn test_detect_from_uninstaller_file() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let folder = tmp_dir.path().join("game");
        fs::create_dir_all(&folder)?;

        let mut data = vec![0u8, 1, 2, 255, 254];
        data.extend_from_slice(b"Inno Setup: KaM Remake R10745");
        data.extend_from_slice(&[0u8; 64]);
        fs::write(folder.join(UNINSTALLER_DATA_FILE), data)?;

        let version = detect_version(&folder.join(GAME_EXECUTABLE));
        assert_eq!(version, "r10745");
        Ok(())
    }

    #[test]
    fn test_detect_ignores_token_past_scan_window() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let folder = tmp_dir.path().join("game");
        fs::create_dir_all(&folder)?;

        let mut data = vec![0u8; UNINSTALLER_SCAN_BYTES as usize];
        data.extend_from_slice(b"r10745");
        fs::write(folder.join(UNINSTALLER_DATA_FILE), data)?;

        let version = detect_version(&folder.join(GAME_EXECUTABLE));
        assert_eq!(version, UNKNOWN_VERSION);
        Ok(())
    }

    #[test]
    fn test_extract_version_token_requires_four_digits() {
        assert_eq!(extract_version_token("KaM_r123"), None);
        assert_eq!(extract_version_token("KaM_r1234"), Some("r1234".to_string()));
        assert_eq!(
            extract_version_token("KaM_r123456"),
            Some("r12345".to_string())
        );
    }
}
