use anyhow::Result;
use chrono::Local;
use clap::Parser;
use shared::news::MAX_NEWS;
use shared::{Config, NewsPoller, NewsSource, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "breaking-news")]
#[command(about = "Fetch trending headlines and update breaking-news.json")]
struct Args {
    /// Store file (defaults to breaking-news.json in the output directory)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory the site is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Sources to poll (weibo, zhihu, baidu); all of them when omitted
    #[arg(short, long, value_delimiter = ',')]
    sources: Vec<String>,

    /// Most items to keep in the store
    #[arg(short, long, default_value_t = MAX_NEWS)]
    max: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    shared::logging::init();
    let args = Args::parse();

    let config = Config::resolve(Overrides {
        output_dir: args.output_dir,
        content_path: None,
        news_file: args.file,
        publish: false,
    })?;

    let sources = if args.sources.is_empty() {
        NewsSource::ALL.to_vec()
    } else {
        args.sources
            .iter()
            .map(|name| {
                NewsSource::from_name(name).ok_or_else(|| {
                    anyhow::anyhow!("Unknown source: {}. Use weibo, zhihu or baidu", name)
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    println!("[{}] 📰 开始更新突发新闻...", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let poller = NewsPoller::new(sources, args.max)?;
    let report = poller.update(&config.news_file).await?;

    if report.used_mock {
        println!("⚠ 未抓取到新闻，使用模拟数据");
    } else {
        println!("✓ 抓取到 {} 条", report.fetched);
    }
    println!(
        "[{}] ✅ 更新完成，新增 {} 条，共 {} 条新闻",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        report.added,
        report.total
    );
    println!("📁 文件位置: {}", config.news_file.display());

    Ok(())
}
