use anyhow::{Context, Result};
use chrono::NaiveDate;
use scraper::{Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dates::archive_key;
use crate::models::ArchiveIndexEntry;

pub const LATEST_FILE: &str = "index.html";
pub const ARCHIVE_DIR: &str = "archive";
pub const INDEX_FILE: &str = "archive.html";
pub const LEDGER_FILE: &str = "archive-index.json";
pub const LIST_MARKER: &str = "<!-- ARCHIVE_LIST -->";

/// Paths touched by one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub latest_path: PathBuf,
    pub archive_path: PathBuf,
    pub index_path: PathBuf,
    pub iso_date: String,
    pub entry: ArchiveIndexEntry,
    pub entry_count: usize,
}

pub struct ArchiveManager {
    output_dir: PathBuf,
}

impl ArchiveManager {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the page as today's edition and as a dated copy, then add it to
    /// the history page. Repeated runs for one date add repeated entries.
    pub fn archive(
        &self,
        document: &str,
        display_date: &str,
        today: NaiveDate,
    ) -> Result<ArchiveReport> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        let latest_path = self.output_dir.join(LATEST_FILE);
        fs::write(&latest_path, document)
            .with_context(|| format!("Failed to write {}", latest_path.display()))?;

        let iso_date = archive_key(display_date, today);
        let archive_dir = self.output_dir.join(ARCHIVE_DIR);
        fs::create_dir_all(&archive_dir).context("Failed to create archive directory")?;

        let archive_path = archive_dir.join(format!("{}.html", iso_date));
        fs::write(&archive_path, document)
            .with_context(|| format!("Failed to write {}", archive_path.display()))?;

        let entry = ArchiveIndexEntry {
            date: display_date.to_string(),
            path: format!("{}/{}.html", ARCHIVE_DIR, iso_date),
        };

        let mut entries = self.load_entries();
        entries.insert(0, entry.clone());
        self.save_entries(&entries)?;

        let index_path = self.output_dir.join(INDEX_FILE);
        fs::write(&index_path, render_index(&entries))
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        Ok(ArchiveReport {
            latest_path,
            archive_path,
            index_path,
            iso_date,
            entry,
            entry_count: entries.len(),
        })
    }

    /// Current history entries, newest first. Tries the ledger, then links in
    /// an existing history page, then starts empty. Unreadable sources are
    /// logged and skipped.
    pub fn load_entries(&self) -> Vec<ArchiveIndexEntry> {
        let ledger_path = self.output_dir.join(LEDGER_FILE);
        if ledger_path.exists() {
            match read_ledger(&ledger_path) {
                Ok(entries) => return entries,
                Err(e) => tracing::warn!("{:#}; rebuilding from {}", e, INDEX_FILE),
            }
        }

        let index_path = self.output_dir.join(INDEX_FILE);
        if index_path.exists() {
            match fs::read_to_string(&index_path) {
                Ok(html) => {
                    let entries = entries_from_index_html(&html);
                    tracing::info!(
                        "Imported {} entries from existing {}",
                        entries.len(),
                        index_path.display()
                    );
                    return entries;
                }
                Err(e) => tracing::warn!(
                    "Failed to read {}: {}; starting a new history",
                    index_path.display(),
                    e
                ),
            }
        }

        Vec::new()
    }

    fn save_entries(&self, entries: &[ArchiveIndexEntry]) -> Result<()> {
        let ledger_path = self.output_dir.join(LEDGER_FILE);
        let json =
            serde_json::to_string_pretty(entries).context("Failed to serialize archive ledger")?;
        fs::write(&ledger_path, json)
            .with_context(|| format!("Failed to write {}", ledger_path.display()))
    }
}

fn read_ledger(path: &Path) -> Result<Vec<ArchiveIndexEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse archive ledger {}", path.display()))
}

/// Pull history links out of a history page written before the ledger existed.
pub fn entries_from_index_html(html: &str) -> Vec<ArchiveIndexEntry> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(r#"a[href^="archive/"]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|link| {
            let path = link.value().attr("href")?.to_string();
            let date = link.text().collect::<String>().trim().to_string();
            Some(ArchiveIndexEntry { date, path })
        })
        .collect()
}

pub fn render_index(entries: &[ArchiveIndexEntry]) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("    <title>每日简报 | 归档</title>\n");
    html.push_str("    <style>\n");
    html.push_str("        body { font-family: -apple-system, \"PingFang SC\", sans-serif; background: #f5f0e8; color: #3a3a3a; line-height: 1.8; }\n");
    html.push_str("        .container { max-width: 800px; margin: 0 auto; padding: 40px 20px; }\n");
    html.push_str("        h1 { font-weight: 300; letter-spacing: 8px; text-align: center; margin-bottom: 30px; }\n");
    html.push_str("        .nav { text-align: center; margin-bottom: 30px; }\n");
    html.push_str("        .nav a { color: #8b7355; text-decoration: none; margin: 0 15px; }\n");
    html.push_str("        .archive-list { list-style: none; padding: 0; }\n");
    html.push_str("        .archive-item { padding: 12px 0; border-bottom: 1px dashed #e0d8cd; }\n");
    html.push_str("        .archive-item a { color: #5a4a3a; text-decoration: none; }\n");
    html.push_str("    </style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("    <div class=\"container\">\n");
    html.push_str("        <div class=\"nav\">\n");
    html.push_str("            <a href=\"index.html\">今日</a>\n");
    html.push_str("            <a href=\"archive.html\">归档</a>\n");
    html.push_str("            <a href=\"about.html\">关于</a>\n");
    html.push_str("        </div>\n");
    html.push_str("        <h1>往期简报</h1>\n");
    html.push_str("        <ul class=\"archive-list\">\n");
    html.push_str(&format!("            {}\n", LIST_MARKER));

    for entry in entries {
        html.push_str(&format!(
            "            <li class=\"archive-item\"><a href=\"{}\">{}</a></li>\n",
            escape_html(&entry.path),
            escape_html(&entry.date)
        ));
    }

    html.push_str("        </ul>\n");
    html.push_str("    </div>\n");
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    #[test]
    fn test_archive_writes_latest_copy_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(dir.path());

        let report = manager
            .archive("<p>brief</p>", "2026年2月23日 周一", today())
            .unwrap();

        assert_eq!(report.iso_date, "2026-02-23");
        assert_eq!(fs::read_to_string(&report.latest_path).unwrap(), "<p>brief</p>");
        assert_eq!(fs::read_to_string(&report.archive_path).unwrap(), "<p>brief</p>");
        assert_eq!(
            report.archive_path.file_stem().unwrap().to_str().unwrap(),
            "2026-02-23"
        );
        assert_eq!(report.entry.path, "archive/2026-02-23.html");

        let index = fs::read_to_string(&report.index_path).unwrap();
        assert!(index.contains(LIST_MARKER));
        assert!(index.contains(
            "<a href=\"archive/2026-02-23.html\">2026年2月23日 周一</a>"
        ));
    }

    #[test]
    fn test_same_day_twice_duplicates_entry() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(dir.path());

        manager.archive("v1", "2026年2月23日 周一", today()).unwrap();
        let report = manager.archive("v2", "2026年2月23日 周一", today()).unwrap();

        assert_eq!(report.entry_count, 2);
        let entries = manager.load_entries();
        assert_eq!(entries[0], entries[1]);
        // The dated copy itself is overwritten
        assert_eq!(fs::read_to_string(&report.archive_path).unwrap(), "v2");

        let index = fs::read_to_string(&report.index_path).unwrap();
        assert_eq!(index.matches("archive/2026-02-23.html").count(), 2);
    }

    #[test]
    fn test_newest_entry_first() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(dir.path());

        manager.archive("a", "2026年2月23日 周一", today()).unwrap();
        manager.archive("b", "2026年2月24日 周二", today()).unwrap();

        let entries = manager.load_entries();
        assert_eq!(entries[0].path, "archive/2026-02-24.html");
        assert_eq!(entries[1].path, "archive/2026-02-23.html");
    }

    #[test]
    fn test_unparseable_date_uses_today() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(dir.path());

        let report = manager.archive("x", "someday", today()).unwrap();

        assert_eq!(report.iso_date, "2026-10-15");
        assert!(dir.path().join("archive/2026-10-15.html").exists());
        assert_eq!(report.entry.date, "someday");
    }

    #[test]
    fn test_existing_index_is_imported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(INDEX_FILE),
            r#"<html><body><ul>
<!-- ARCHIVE_LIST -->
<li><a href="archive/2026-02-20.html">2026年2月20日 周五</a></li>
<li><a href="about.html">关于</a></li>
</ul></body></html>"#,
        )
        .unwrap();
        let manager = ArchiveManager::new(dir.path());

        let report = manager.archive("x", "2026年2月23日 周一", today()).unwrap();

        assert_eq!(report.entry_count, 2);
        let entries = manager.load_entries();
        assert_eq!(entries[1].date, "2026年2月20日 周五");
        assert_eq!(entries[1].path, "archive/2026-02-20.html");
        assert!(dir.path().join(LEDGER_FILE).exists());
    }

    #[test]
    fn test_corrupt_ledger_rebuilds_from_index_page() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArchiveManager::new(dir.path());
        manager.archive("a", "2026年2月20日 周五", today()).unwrap();
        fs::write(dir.path().join(LEDGER_FILE), "{ broken").unwrap();

        let report = manager.archive("b", "2026年2月23日 周一", today()).unwrap();

        assert_eq!(report.entry_count, 2);
        let entries = manager.load_entries();
        assert_eq!(entries[0].path, "archive/2026-02-23.html");
        assert_eq!(entries[1].path, "archive/2026-02-20.html");
    }

    #[test]
    fn test_corrupt_ledger_without_index_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LEDGER_FILE), "[{\"date\": 1}]").unwrap();
        let manager = ArchiveManager::new(dir.path());

        let report = manager.archive("x", "2026年2月23日 周一", today()).unwrap();

        assert_eq!(report.entry_count, 1);
        // The ledger is rewritten in a readable form
        assert_eq!(manager.load_entries(), vec![report.entry]);
    }

    #[test]
    fn test_render_index_nav() {
        let html = render_index(&[]);
        assert!(html.contains(LIST_MARKER));
        assert!(html.contains("<a href=\"about.html\">关于</a>"));
    }

    #[test]
    fn test_render_index_escapes() {
        let html = render_index(&[ArchiveIndexEntry {
            date: "<b>".to_string(),
            path: "archive/x.html".to_string(),
        }]);
        assert!(html.contains("&lt;b&gt;"));
    }
}
