use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::models::{BreakingNewsItem, BreakingNewsStore, Urgency};

/// Most items kept in the store.
pub const MAX_NEWS: usize = 10;

/// Items taken from each source per poll.
const PER_SOURCE: usize = 5;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Public trending-topic endpoints polled for headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSource {
    Weibo,
    Zhihu,
    Baidu,
}

impl NewsSource {
    pub const ALL: [NewsSource; 3] = [NewsSource::Weibo, NewsSource::Zhihu, NewsSource::Baidu];

    pub fn name(&self) -> &'static str {
        match self {
            NewsSource::Weibo => "weibo",
            NewsSource::Zhihu => "zhihu",
            NewsSource::Baidu => "baidu",
        }
    }

    fn url(&self) -> &'static str {
        match self {
            NewsSource::Weibo => "https://weibo.com/ajax/side/hotSearch",
            NewsSource::Zhihu => "https://www.zhihu.com/api/v3/feed/topstory/hot-lists/total",
            NewsSource::Baidu => "https://top.baidu.com/board?tab=realtime",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            NewsSource::Weibo => "wb",
            NewsSource::Zhihu => "zh",
            NewsSource::Baidu => "bd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "weibo" => Some(NewsSource::Weibo),
            "zhihu" => Some(NewsSource::Zhihu),
            "baidu" => Some(NewsSource::Baidu),
            _ => None,
        }
    }

    /// Turn a response body into items. Unknown shapes yield nothing.
    pub fn parse(&self, body: &str, now: DateTime<Local>) -> Vec<BreakingNewsItem> {
        let headlines = match self {
            NewsSource::Weibo => parse_weibo(body),
            NewsSource::Zhihu => parse_zhihu(body),
            NewsSource::Baidu => parse_baidu(body),
        };

        let time = now.format(TIME_FORMAT).to_string();
        headlines
            .into_iter()
            .take(PER_SOURCE)
            .enumerate()
            .map(|(i, headline)| BreakingNewsItem {
                id: format!("{}_{}", self.id_prefix(), i),
                title: headline.title,
                time: time.clone(),
                category: headline.category.to_string(),
                urgency: headline.urgency,
                url: Some(headline.url.unwrap_or_else(|| "#".to_string())),
            })
            .collect()
    }
}

struct Headline {
    title: String,
    category: &'static str,
    urgency: Urgency,
    url: Option<String>,
}

fn parse_weibo(body: &str) -> Vec<Headline> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    let Some(realtime) = json.pointer("/data/realtime").and_then(Value::as_array) else {
        return Vec::new();
    };

    realtime
        .iter()
        .filter_map(|item| {
            let title = item.get("word")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            let hot = match item.get("is_hot") {
                Some(Value::Bool(b)) => *b,
                Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
                _ => false,
            };
            Some(Headline {
                title: title.to_string(),
                category: "热搜",
                urgency: if hot { Urgency::High } else { Urgency::Medium },
                url: None,
            })
        })
        .collect()
}

fn parse_zhihu(body: &str) -> Vec<Headline> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    let Some(data) = json.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|item| {
            let target = item.get("target")?;
            let title = target.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            Some(Headline {
                title: title.to_string(),
                category: "知乎",
                urgency: Urgency::Medium,
                url: target
                    .get("url")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

fn parse_baidu(body: &str) -> Vec<Headline> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse(".c-single-text-ellipsis") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|node| {
            let title = node.text().collect::<String>().trim().to_string();
            (!title.is_empty()).then_some(Headline {
                title,
                category: "百度",
                urgency: Urgency::Medium,
                url: None,
            })
        })
        .collect()
}

/// Fixed items used when every source comes back empty.
pub fn mock_news(now: DateTime<Local>) -> Vec<BreakingNewsItem> {
    let item = |id: &str, title: &str, ago: Duration, category: &str, urgency| BreakingNewsItem {
        id: id.to_string(),
        title: title.to_string(),
        time: (now - ago).format(TIME_FORMAT).to_string(),
        category: category.to_string(),
        urgency,
        url: None,
    };

    vec![
        item(
            "1",
            "美以联合袭击伊朗，中东局势急剧升级",
            Duration::minutes(30),
            "国际",
            Urgency::High,
        ),
        item(
            "2",
            "比特币跌破8万美元，加密货币市场动荡",
            Duration::hours(2),
            "财经",
            Urgency::Medium,
        ),
        item(
            "3",
            "小米超跑正式亮相，定价引发热议",
            Duration::hours(4),
            "科技",
            Urgency::Low,
        ),
    ]
}

/// Put unseen items in front of the store, one at a time in the order given,
/// then drop the oldest beyond `max`. Returns how many were added.
pub fn merge_news(
    store: &mut BreakingNewsStore,
    fresh: Vec<BreakingNewsItem>,
    max: usize,
) -> usize {
    let mut seen: HashSet<String> = store
        .breaking_news
        .iter()
        .map(|item| item.title.clone())
        .collect();

    let mut added = 0;
    for item in fresh {
        if seen.insert(item.title.clone()) {
            store.breaking_news.insert(0, item);
            added += 1;
        }
    }

    store.breaking_news.truncate(max);
    added
}

/// Read the store, treating a missing or unreadable file as empty.
pub fn load_store(path: &Path) -> BreakingNewsStore {
    if !path.exists() {
        return BreakingNewsStore::default();
    }

    let parsed = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .and_then(|content| {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))
        });

    match parsed {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("{:#}; starting with an empty store", e);
            BreakingNewsStore::default()
        }
    }
}

pub fn save_store(path: &Path, store: &BreakingNewsStore) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(store).context("Failed to serialize news store")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Summary of one poll, for the console report.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub fetched: usize,
    pub used_mock: bool,
    pub added: usize,
    pub total: usize,
}

pub struct NewsPoller {
    client: Client,
    sources: Vec<NewsSource>,
    max_items: usize,
}

impl NewsPoller {
    pub fn new(sources: Vec<NewsSource>, max_items: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            sources,
            max_items,
        })
    }

    /// Items from every source, in source order. A failing source counts as empty.
    pub async fn fetch_all(&self, now: DateTime<Local>) -> Vec<BreakingNewsItem> {
        let mut items = Vec::new();

        for source in &self.sources {
            match self.fetch_source(*source, now).await {
                Ok(found) => {
                    tracing::info!("{}: {} items", source.name(), found.len());
                    items.extend(found);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {:#}", source.name(), e);
                }
            }
        }

        items
    }

    async fn fetch_source(
        &self,
        source: NewsSource,
        now: DateTime<Local>,
    ) -> Result<Vec<BreakingNewsItem>> {
        let response = self
            .client
            .get(source.url())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", source.url()))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{} returned {}", source.name(), status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(source.parse(&body, now))
    }

    /// One full read-merge-write cycle against the store at `path`.
    pub async fn update(&self, path: &Path) -> Result<PollReport> {
        let now = Local::now();
        let mut store = load_store(path);

        let mut fresh = self.fetch_all(now).await;
        let fetched = fresh.len();
        let used_mock = fresh.is_empty();
        if used_mock {
            tracing::warn!("No headlines from any source; using mock items");
            fresh = mock_news(now);
        }

        let added = merge_news(&mut store, fresh, self.max_items);
        store.last_update = now.to_rfc3339();
        save_store(path, &store)?;

        Ok(PollReport {
            fetched,
            used_mock,
            added,
            total: store.breaking_news.len(),
        })
    }
}
