use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use shared::{Config, ContentOrigin, Overrides, PublishOutcome};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daily-brief")]
#[command(about = "Render today's brief to HTML and add it to the archive")]
struct Args {
    /// Content document (JSON); the built-in sample is used when absent or invalid
    #[arg(short, long)]
    content: Option<PathBuf>,

    /// Directory the site is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Render for this date (YYYY-MM-DD) instead of today
    #[arg(short, long)]
    date: Option<String>,

    /// Commit and push the output directory with git afterwards
    #[arg(short, long)]
    publish: bool,
}

fn main() -> Result<()> {
    shared::logging::init();
    let args = Args::parse();

    let config = Config::resolve(Overrides {
        output_dir: args.output_dir,
        content_path: args.content,
        news_file: None,
        publish: args.publish,
    })?;
    config.ensure_output_dir()?;

    let today = match args.date {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date {:?}, expected YYYY-MM-DD", date))?,
        None => Local::now().date_naive(),
    };

    let report = shared::run_daily(&config, today)?;

    match &report.origin {
        ContentOrigin::File(path) => println!("📖 内容来源: {}", path.display()),
        ContentOrigin::BuiltIn => println!("📖 内容来源: 内置示例"),
    }
    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }

    println!("✅ 每日简报已生成: {}", report.display_date);
    println!("📁 文件位置: {}", report.archive.latest_path.display());
    println!("📂 归档位置: {}", report.archive.archive_path.display());
    println!(
        "🗂 归档索引: {} ({} 条)",
        report.archive.index_path.display(),
        report.archive.entry_count
    );

    match report.publish {
        Some(PublishOutcome::Pushed) => println!("🚀 已推送到远程仓库"),
        Some(PublishOutcome::NothingToCommit) => println!("✓ 没有需要提交的更改"),
        Some(PublishOutcome::Stopped { step, reason }) => {
            println!("⚠ 发布在 {} 步骤中止: {}", step, reason)
        }
        None => {}
    }

    Ok(())
}
