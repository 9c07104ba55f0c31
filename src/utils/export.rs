use crate::domain::model::CreatorRecord;
use crate::utils::error::{ImportError, Result};

// Column order follows the spreadsheet the processed records get pasted into.
const HEADERS: [&str; 6] = [
    "name",
    "email",
    "price",
    "engagement",
    "followers",
    "profileUrl",
];

pub fn to_csv(records: &[CreatorRecord]) -> Result<String> {
    render(records, b',')
}

pub fn to_tsv(records: &[CreatorRecord]) -> Result<String> {
    render(records, b'\t')
}

fn render(records: &[CreatorRecord], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for record in records {
        let followers = record.follower_count.to_string();
        writer.write_record([
            record.display_name.as_str(),
            record.email.as_deref().unwrap_or(""),
            record.price.as_deref().unwrap_or(""),
            record.engagement.as_deref().unwrap_or(""),
            followers.as_str(),
            record.profile_url.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::ProcessingError {
            message: format!("CSV writer flush failed: {}", e),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
