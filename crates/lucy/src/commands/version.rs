//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());
        println!("lucy-image: {}", info.library);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_current_returns_non_empty_version() {
        let info = VersionInfo::current();
        assert!(!info.version.is_empty());
        assert_eq!(info.library, lucy_image::VERSION);
    }

    #[test]
    fn test_version_info_display_trait() {
        let info = VersionInfo::current();
        assert_eq!(format!("{}", info), info.display());
        assert!(info.display().starts_with("lucy "));
    }

    #[test]
    fn test_version_info_display_with_commit() {
        let info = VersionInfo {
            version: "1.2.3".to_string(),
            library: "1.2.3".to_string(),
            commit: Some("abc1234".to_string()),
        };
        assert_eq!(info.display(), "lucy 1.2.3 (abc1234)");
    }

    #[test]
    fn test_version_info_json_serialization() {
        let info = VersionInfo::current();
        let json = serde_json::to_string(&info).expect("should serialize to JSON");

        let deserialized: VersionInfo =
            serde_json::from_str(&json).expect("should deserialize from JSON");
        assert_eq!(deserialized.version, info.version);
    }
}
