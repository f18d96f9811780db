use crate::models::{ContentRecord, SectionValue};

/// How a section is laid out in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Each item becomes one `<li class="news-item">`.
    List,
    /// Substituted as-is.
    Text,
}

/// A named region of the page template.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub name: &'static str,
    pub kind: SectionKind,
    /// Shown when the record has nothing for this section.
    pub default: &'static str,
}

pub const SECTIONS: &[Section] = &[
    Section {
        name: "date",
        kind: SectionKind::Text,
        default: "今日",
    },
    Section {
        name: "hero_image",
        kind: SectionKind::Text,
        default: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800",
    },
    Section {
        name: "international",
        kind: SectionKind::List,
        default: "今日暂无国际热点",
    },
    Section {
        name: "domestic",
        kind: SectionKind::List,
        default: "今日暂无国内动态",
    },
    Section {
        name: "tech",
        kind: SectionKind::List,
        default: "今日暂无科技新闻",
    },
    Section {
        name: "stock",
        kind: SectionKind::Text,
        default: "今日暂无A股点评",
    },
    Section {
        name: "sectors",
        kind: SectionKind::List,
        default: "今日暂无板块数据",
    },
    Section {
        name: "other_markets",
        kind: SectionKind::List,
        default: "今日暂无其他市场数据",
    },
    Section {
        name: "today_focus",
        kind: SectionKind::List,
        default: "今日暂无特别看点",
    },
    Section {
        name: "learn_title",
        kind: SectionKind::Text,
        default: "今日休息",
    },
    Section {
        name: "learn_content",
        kind: SectionKind::Text,
        default: "学习也需要休息，明天继续。",
    },
    Section {
        name: "reminder",
        kind: SectionKind::Text,
        default: "保持耐心，理性投资。",
    },
    Section {
        name: "footer_note",
        kind: SectionKind::Text,
        default: "禅意 · 简约 · 专注",
    },
];

/// Used for a placeholder that has no entry in [`SECTIONS`].
pub const FALLBACK_PHRASE: &str = "暂无内容";

pub fn section(name: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.name == name)
}

pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>每日简报 | {{date}}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", "PingFang SC", sans-serif;
            background: linear-gradient(135deg, #f5f0e8 0%, #e8e0d5 100%);
            min-height: 100vh;
            color: #3a3a3a;
            line-height: 1.8;
        }
        .container { max-width: 800px; margin: 0 auto; padding: 40px 20px; }
        .header { text-align: center; padding: 60px 0 40px; border-bottom: 1px solid #d4c9b8; margin-bottom: 40px; }
        .date { font-size: 14px; color: #8b7355; letter-spacing: 3px; margin-bottom: 10px; }
        .title { font-size: 32px; font-weight: 300; color: #2c2c2c; letter-spacing: 8px; }
        .zen-circle { width: 80px; height: 80px; border: 2px solid #c4b8a8; border-radius: 50%; margin: 30px auto; position: relative; opacity: 0.6; }
        .zen-circle::before { content: ""; position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); width: 40px; height: 40px; border: 1px solid #d4c9b8; border-radius: 50%; }
        .hero { width: 100%; border-radius: 8px; margin-bottom: 25px; opacity: 0.9; }
        .section { background: rgba(255, 255, 255, 0.6); border-radius: 8px; padding: 30px; margin-bottom: 25px; box-shadow: 0 2px 15px rgba(0,0,0,0.03); border: 1px solid rgba(212, 201, 184, 0.3); }
        .section-title { font-size: 18px; color: #5a4a3a; margin-bottom: 20px; padding-bottom: 12px; border-bottom: 1px solid #e0d8cd; display: flex; align-items: center; gap: 10px; }
        .news-list { list-style: none; }
        .news-item { padding: 12px 0; border-bottom: 1px dashed #e0d8cd; position: relative; padding-left: 20px; }
        .news-item:last-child { border-bottom: none; }
        .news-item::before { content: "•"; position: absolute; left: 0; color: #a09080; }
        .highlight-box { background: linear-gradient(135deg, #faf8f5 0%, #f5f2ed 100%); border-left: 3px solid #c4a882; padding: 20px; margin: 15px 0; border-radius: 0 8px 8px 0; }
        .learn-box { background: #f9f7f4; padding: 20px; border-radius: 8px; border: 1px solid #e8e0d5; }
        .learn-title { font-size: 14px; color: #8b7355; margin-bottom: 10px; }
        .reminder { background: linear-gradient(135deg, #f5f0e8 0%, #ebe5dc 100%); padding: 20px; border-radius: 8px; text-align: center; font-size: 15px; color: #5a4a3a; }
        .footer { text-align: center; padding: 40px 0; color: #a09080; font-size: 12px; letter-spacing: 2px; }
        .nav { text-align: center; margin-bottom: 30px; }
        .nav a { color: #8b7355; text-decoration: none; margin: 0 15px; font-size: 14px; }
        .nav a:hover { color: #5a4a3a; }
        @media (max-width: 600px) { .title { font-size: 24px; letter-spacing: 4px; } .section { padding: 20px; } }
    </style>
</head>
<body>
    <div class="container">
        <div class="nav">
            <a href="index.html">今日</a>
            <a href="archive.html">归档</a>
            <a href="about.html">关于</a>
        </div>

        <header class="header">
            <div class="date">{{date}}</div>
            <h1 class="title">每日简报</h1>
            <div class="zen-circle"></div>
            <div class="subtitle">专属信息网 · 禅意生活</div>
        </header>

        <img class="hero" src="{{hero_image}}" alt="">

        <section class="section">
            <h2 class="section-title">🌍 国际热点</h2>
            <ul class="news-list">{{international}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">🇨🇳 国内动态</h2>
            <ul class="news-list">{{domestic}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">💡 科技新鲜事</h2>
            <ul class="news-list">{{tech}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">🔥 A股重点</h2>
            <div class="highlight-box">{{stock}}</div>
            <ul class="news-list">{{sectors}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">📊 其他市场</h2>
            <ul class="news-list">{{other_markets}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">👀 今日看点</h2>
            <ul class="news-list">{{today_focus}}</ul>
        </section>

        <section class="section">
            <h2 class="section-title">📚 每日财经学习</h2>
            <div class="learn-box">
                <div class="learn-title">{{learn_title}}</div>
                <p>{{learn_content}}</p>
            </div>
        </section>

        <section class="section">
            <h2 class="section-title">💡 每日一提醒</h2>
            <div class="reminder">
                <div style="font-size: 24px; margin-bottom: 10px;">☀️</div>
                <p>{{reminder}}</p>
            </div>
        </section>

        <footer class="footer">
            <p>专属信息网 · 每日更新</p>
            <p style="margin-top: 10px; opacity: 0.6;">{{footer_note}}</p>
        </footer>
    </div>
</body>
</html>"#;

pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Fill [`PAGE_TEMPLATE`] from `record`.
    pub fn render(record: &ContentRecord) -> String {
        Self::render_template(PAGE_TEMPLATE, record)
    }

    /// Replace every `{{name}}` in `template`. A name with no usable value in
    /// the record gets its section default; unknown names get [`FALLBACK_PHRASE`].
    pub fn render_template(template: &str, record: &ContentRecord) -> String {
        let mut out = String::with_capacity(template.len() * 2);
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}") {
                Some(end) if is_placeholder_name(&after[..end]) => {
                    out.push_str(&Self::fill(&after[..end], record));
                    rest = &after[end + 2..];
                }
                _ => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn fill(name: &str, record: &ContentRecord) -> String {
        let section = section(name);
        let value = record.get(name).filter(|v| !v.is_blank());

        match (value, section) {
            (Some(SectionValue::List(items)), _) => Self::list_items(items),
            (Some(SectionValue::Text(text)), Some(s)) if s.kind == SectionKind::List => {
                Self::list_items(std::slice::from_ref(text))
            }
            (Some(SectionValue::Text(text)), _) => text.clone(),
            (None, Some(s)) => match s.kind {
                SectionKind::List => Self::list_items(&[s.default.to_string()]),
                SectionKind::Text => s.default.to_string(),
            },
            (None, None) => FALLBACK_PHRASE.to_string(),
        }
    }

    fn list_items(items: &[String]) -> String {
        items
            .iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| format!("<li class=\"news-item\">{}</li>", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
