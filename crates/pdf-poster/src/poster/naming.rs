use crate::constants::OUTPUT_EXTENSION;
use crate::options::NamingScheme;

/// File name a scheme produces at `unix_seconds`
pub fn base_file_name(scheme: &NamingScheme, unix_seconds: i64) -> String {
    match scheme {
        NamingScheme::Timestamp { prefix } => {
            format!("{}_{}.{}", prefix, unix_seconds, OUTPUT_EXTENSION)
        }
        NamingScheme::Fixed { file_name } => {
            let suffix = format!(".{}", OUTPUT_EXTENSION);
            if file_name.to_ascii_lowercase().ends_with(&suffix) {
                file_name.clone()
            } else {
                format!("{}{}", file_name, suffix)
            }
        }
    }
}

/// The `attempt`-th name tried for `base`: `base` itself, then
/// `<stem>_1.pdf`, `<stem>_2.pdf`, ...
pub fn numbered_file_name(base: &str, attempt: usize) -> String {
    if attempt == 0 {
        return base.to_string();
    }
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, attempt, ext),
        _ => format!("{}_{}", base, attempt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_name() {
        let scheme = NamingScheme::default();
        assert_eq!(base_file_name(&scheme, 1700000000), "gradil_1700000000.pdf");

        let scheme = NamingScheme::Timestamp {
            prefix: "poster".to_string(),
        };
        assert_eq!(base_file_name(&scheme, 42), "poster_42.pdf");
    }

    #[test]
    fn test_fixed_name_gets_extension() {
        let scheme = NamingScheme::Fixed {
            file_name: "wall".to_string(),
        };
        assert_eq!(base_file_name(&scheme, 0), "wall.pdf");

        let scheme = NamingScheme::Fixed {
            file_name: "Wall.PDF".to_string(),
        };
        assert_eq!(base_file_name(&scheme, 0), "Wall.PDF");
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(numbered_file_name("gradil_5.pdf", 0), "gradil_5.pdf");
        assert_eq!(numbered_file_name("gradil_5.pdf", 1), "gradil_5_1.pdf");
        assert_eq!(numbered_file_name("gradil_5.pdf", 12), "gradil_5_12.pdf");
        assert_eq!(numbered_file_name("noext", 2), "noext_2");
    }
}
