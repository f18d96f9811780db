use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::dates::display_date;
use crate::models::{ContentRecord, SectionValue};

/// Where the day's content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrigin {
    File(PathBuf),
    BuiltIn,
}

/// Outcome of walking the content fallback chain.
#[derive(Debug)]
pub struct ContentLoad {
    pub record: ContentRecord,
    pub origin: ContentOrigin,
    /// Problems met on the way, one entry per logged warning.
    pub warnings: Vec<String>,
}

enum Attempt {
    Loaded(ContentRecord),
    Absent,
}

pub struct ContentLoader;

impl ContentLoader {
    /// Produce today's record. Tries the authored document first and ends with
    /// the built-in record, which always succeeds. The date field is always
    /// replaced with `today`.
    pub fn load(path: Option<&Path>, today: NaiveDate) -> ContentLoad {
        let mut warnings = Vec::new();

        let mut chain: Vec<ContentOrigin> = Vec::new();
        if let Some(path) = path {
            chain.push(ContentOrigin::File(path.to_path_buf()));
        }
        chain.push(ContentOrigin::BuiltIn);

        for origin in chain {
            let attempt = match &origin {
                ContentOrigin::File(path) => Self::read_document(path, &mut warnings),
                ContentOrigin::BuiltIn => Ok(Attempt::Loaded(default_record())),
            };

            match attempt {
                Ok(Attempt::Loaded(mut record)) => {
                    record.set_text("date", display_date(today));
                    match &origin {
                        ContentOrigin::File(path) => {
                            tracing::info!("Loaded content from {}", path.display())
                        }
                        ContentOrigin::BuiltIn => tracing::info!("Using built-in content"),
                    }
                    return ContentLoad {
                        record,
                        origin,
                        warnings,
                    };
                }
                Ok(Attempt::Absent) => {
                    if let ContentOrigin::File(path) = &origin {
                        tracing::info!("No content document at {}", path.display());
                    }
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    tracing::warn!("{}; falling back", message);
                    warnings.push(message);
                }
            }
        }

        // BuiltIn is always last in the chain and never fails
        let mut record = default_record();
        record.set_text("date", display_date(today));
        ContentLoad {
            record,
            origin: ContentOrigin::BuiltIn,
            warnings,
        }
    }

    fn read_document(path: &Path, warnings: &mut Vec<String>) -> Result<Attempt> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Attempt::Absent),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read content document: {}", path.display())
                })
            }
        };

        let value: Value = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse content document: {}", path.display())
        })?;

        let Value::Object(map) = value else {
            anyhow::bail!(
                "Content document {} is not a JSON object",
                path.display()
            );
        };

        let mut record = ContentRecord::new();
        for (key, value) in map {
            match section_from_json(value) {
                Some(section) => record.insert(key, section),
                None => {
                    let message = format!(
                        "Ignoring section {:?} in {}: expected a string or a list of strings",
                        key,
                        path.display()
                    );
                    tracing::warn!("{}", message);
                    warnings.push(message);
                }
            }
        }

        Ok(Attempt::Loaded(record))
    }
}

fn section_from_json(value: Value) -> Option<SectionValue> {
    match value {
        Value::String(text) => Some(SectionValue::Text(text)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(SectionValue::List),
        _ => None,
    }
}

/// The sample digest used when no authored document is available.
pub fn default_record() -> ContentRecord {
    let mut record = ContentRecord::new();

    record.set_list(
        "international",
        [
            "特朗普关税新方案今天可能公布，美国继续对全球商品加税10-15%。对A股影响：出口链承压，国产替代概念或受益。",
            "美伊局势紧张，油价上涨到66美元/桶，国内油价可能上调。",
            "美联储暗示可能推迟降息，美元走强，对新兴市场资金流动有影响。",
            "日本1月通胀放缓，央行加息预期降温，亚太股市或受提振。",
        ],
    );
    record.set_list(
        "domestic",
        [
            "明天A股春节后首个交易日，历史数据显示春节后第一周上涨概率约70%，'开门红'可期。",
            "央行近期可能降准降息，资金面有望更宽松，利好股市。",
            "证监会发布新规，加强上市公司质量监管，长期利好A股生态。",
            "春节假期消费数据亮眼，旅游、电影、餐饮收入超预期，消费复苏概念值得关注。",
            "多地出台房地产支持政策，房贷利率下调，地产链或迎修复。",
        ],
    );
    record.set_list(
        "tech",
        [
            "国产AI公司智谱股价暴涨42%，市值破3000亿，AI应用概念持续火热。",
            "小红书内测AI剪辑工具，对着手机说句话就能剪视频。",
            "比亚迪发布新车型，价格再创新低，新能源车竞争白热化。",
        ],
    );
    record.set_text(
        "stock",
        "上周五（节前）A股集体收跌，上证指数跌1.26%报4082点，深成指跌1.28%，创业板指跌1.57%。成交额2万亿，较前日缩量7%。板块方面，海洋捕捞、半导体设备逆势上涨；通信线缆、稀土、有色金属跌幅居前。技术面看，沪指跌破4100点整数关口，短期支撑在4050点附近，压力在4150点。明日节后开市，关注能否'开门红'，建议控制仓位，重点关注AI应用、国产替代、消费复苏三大主线。",
    );
    record.set_list(
        "sectors",
        [
            "领涨：海洋捕捞、半导体设备",
            "领跌：通信线缆、稀土、有色金属",
        ],
    );
    record.set_list(
        "other_markets",
        [
            "美股：道指逼近5万点，科技股领涨",
            "港股：AI概念强势，腾讯阿里承压",
            "比特币：约6.8万美元",
        ],
    );
    record.set_list(
        "today_focus",
        [
            "A股春节后首个交易日，关注'开门红'",
            "1月LPR数据公布，关注利率动向",
            "特朗普关税细节公布，关注市场反应",
        ],
    );
    record.set_text("learn_title", "支撑位和压力位");
    record.set_text(
        "learn_content",
        "就像楼梯的台阶，股价跌到某个位置跌不动了叫支撑（有人买），涨到某个位置涨不动了叫压力（有人卖）。突破压力可能继续上涨，跌破支撑可能继续下跌。",
    );
    record.set_text(
        "reminder",
        "节后开盘别急着追高，先看半小时盘面再决定。祝投资顺利！",
    );

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 23).unwrap()
    }

    #[test]
    fn test_no_path_uses_built_in() {
        let load = ContentLoader::load(None, monday());

        assert_eq!(load.origin, ContentOrigin::BuiltIn);
        assert!(load.warnings.is_empty());
        assert_eq!(
            load.record.get("date"),
            Some(&SectionValue::Text("2026年2月23日 周一".to_string()))
        );
    }

    #[test]
    fn test_missing_file_falls_back_silently() {
        let dir = tempfile::tempdir().unwrap();
        let load = ContentLoader::load(Some(dir.path().join("absent.json").as_path()), monday());

        assert_eq!(load.origin, ContentOrigin::BuiltIn);
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn test_malformed_file_warns_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, "{ not json").unwrap();

        let load = ContentLoader::load(Some(path.as_path()), monday());

        assert_eq!(load.origin, ContentOrigin::BuiltIn);
        assert_eq!(load.warnings.len(), 1);
        assert!(load.warnings[0].contains("Failed to parse content document"));

        let mut expected = default_record();
        expected.set_text("date", "2026年2月23日 周一");
        assert_eq!(load.record, expected);
    }

    #[test]
    fn test_file_fields_used_verbatim_except_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(
            &path,
            r#"{"date": "yesterday", "tech": ["芯片"], "reminder": "早睡"}"#,
        )
        .unwrap();

        let load = ContentLoader::load(Some(path.as_path()), monday());

        assert_eq!(load.origin, ContentOrigin::File(path));
        assert_eq!(
            load.record.get("date"),
            Some(&SectionValue::Text("2026年2月23日 周一".to_string()))
        );
        assert_eq!(
            load.record.get("tech"),
            Some(&SectionValue::List(vec!["芯片".to_string()]))
        );
        // Nothing from the built-in record leaks into an authored one
        assert_eq!(load.record.get("international"), None);
    }

    #[test]
    fn test_non_string_sections_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, r#"{"stock": 42, "tech": ["ok"], "domestic": [1, 2]}"#).unwrap();

        let load = ContentLoader::load(Some(path.as_path()), monday());

        assert_eq!(load.origin, ContentOrigin::File(path));
        assert_eq!(load.warnings.len(), 2);
        assert_eq!(load.record.get("stock"), None);
        assert_eq!(load.record.get("domestic"), None);
        assert!(load.record.get("tech").is_some());
    }

    #[test]
    fn test_non_object_document_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, r#"["just", "a", "list"]"#).unwrap();

        let load = ContentLoader::load(Some(path.as_path()), monday());

        assert_eq!(load.origin, ContentOrigin::BuiltIn);
        assert_eq!(load.warnings.len(), 1);
    }
}
