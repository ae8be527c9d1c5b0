use crate::types::{DefinitionText, Entry, PictoError, Result};
use std::path::Path;

/// Read an entry list from a CSV file with the columns
/// `image, text[, definition]`.
///
/// The header row is optional: a first row reading `image,text` is skipped.
/// Rows with fewer than two columns are skipped. Relative image paths are
/// resolved against the CSV file's directory.
pub async fn load_entries_from_csv(path: impl AsRef<Path>) -> Result<Vec<Entry>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read_to_string(&path).await?;
    let base_dir = path.parent().map(Path::to_path_buf);

    let entries = tokio::task::spawn_blocking(move || {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        let mut entries = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if row == 0 && is_header(&record) {
                continue;
            }
            if record.len() < 2 {
                log::warn!("Skipping CSV row with {} columns", record.len());
                continue;
            }

            let image = Path::new(&record[0]);
            let image = match &base_dir {
                Some(dir) if image.is_relative() => dir.join(image),
                _ => image.to_path_buf(),
            };
            let mut entry = Entry::new(image, &record[1]);
            if let Some(definition) = record.get(2).filter(|d| !d.is_empty()) {
                entry = entry.with_definition(DefinitionText::new(definition));
            }
            entries.push(entry);
        }
        Ok::<_, PictoError>(entries)
    })
    .await??;

    log::debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

fn is_header(record: &csv::StringRecord) -> bool {
    let column = |i| record.get(i).map(str::to_ascii_lowercase);
    column(0).as_deref() == Some("image") && column(1).as_deref() == Some("text")
}
