//! Importer for the affiliate-platform profile exports. These arrive as
//! well-formed JSON with a root `profiles` array, so no lenient parsing or
//! structure scanning is involved; the work is keyword tagging and handle
//! cleanup.

use crate::utils::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_KEYWORDS: &[&str] = &["beauty", "makeup"];

const INSTAGRAM_PREFIX: &str = "https://www.instagram.com/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    pub name: String,
    pub matched_keywords: String,
    pub instagram_url: String,
}

pub fn import_profiles(raw_text: &str, keywords: &[&str]) -> Result<Vec<ProfileRow>> {
    let document: Value = serde_json::from_str(raw_text)
        .map_err(|e| ImportError::InvalidInput(format!("profile export is not valid JSON: {}", e)))?;

    let profiles = document
        .get("profiles")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ImportError::InvalidInput("no profiles array in document".to_string())
        })?;

    let rows = profiles
        .iter()
        .map(|profile| {
            let bio = profile.get("bio").and_then(Value::as_str).unwrap_or("");
            let instagram_url = profile
                .get("instagram_name")
                .and_then(Value::as_str)
                .map(|name| format!("{}{}", INSTAGRAM_PREFIX, name.replace('@', "")))
                .unwrap_or_default();

            ProfileRow {
                name: profile
                    .get("display_name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                matched_keywords: matching_keywords(bio, keywords),
                instagram_url,
            }
        })
        .collect();

    Ok(rows)
}

fn matching_keywords(bio: &str, keywords: &[&str]) -> String {
    let lower = bio.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| lower.contains(&keyword.to_lowercase()))
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn to_tsv(rows: &[ProfileRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    writer.write_record(["Name", "Matched Keywords", "Instagram URL"])?;
    for row in rows {
        writer.write_record([
            row.name.as_str(),
            row.matched_keywords.as_str(),
            row.instagram_url.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::ProcessingError {
            message: format!("CSV writer flush failed: {}", e),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_mapped() {
        let input = r#"{
            "profiles": [
                {"display_name": "Ana", "bio": "Makeup artist and Beauty lover", "instagram_name": "@ana.mk"},
                {"display_name": "Bo", "bio": "travel"}
            ]
        }"#;

        let rows = import_profiles(input, DEFAULT_KEYWORDS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ana");
        assert_eq!(rows[0].matched_keywords, "beauty, makeup");
        assert_eq!(rows[0].instagram_url, "https://www.instagram.com/ana.mk");
        assert_eq!(rows[1].matched_keywords, "");
        assert_eq!(rows[1].instagram_url, "");
    }

    #[test]
    fn test_missing_profiles_array_rejected() {
        let err = import_profiles(r#"{"creators": []}"#, DEFAULT_KEYWORDS).unwrap_err();
        assert!(matches!(err, ImportError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = import_profiles("{broken", DEFAULT_KEYWORDS).unwrap_err();
        assert!(matches!(err, ImportError::InvalidInput(_)));
    }

    #[test]
    fn test_tsv_rendering() {
        let rows = vec![ProfileRow {
            name: "Ana".to_string(),
            matched_keywords: "beauty".to_string(),
            instagram_url: "https://www.instagram.com/ana".to_string(),
        }];
        let output = to_tsv(&rows).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Name\tMatched Keywords\tInstagram URL");
        assert_eq!(lines[1], "Ana\tbeauty\thttps://www.instagram.com/ana");
    }
}
