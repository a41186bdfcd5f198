//! Dubai 房产新闻聚合
//!
//! 后台 worker 定期抓取三个 RSS 源，按关键词切出三个缓存片:
//! general (Dubai 相关, 25 条) / dubailand (土地局监管类, 15 条) /
//! official (官方来源, 20 条)。读取端走内存缓存，超过刷新周期时
//! 懒刷新；抓取失败从不向外抛错，最多退回备用文章。

mod feed;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shared::models::{NewsArticle, NewsSource};

pub use feed::{parse_feed, sanitize_xml, strip_tags};

/// RSS 源定义
pub struct NewsFeed {
    pub name: &'static str,
    pub url: &'static str,
    pub category: &'static str,
}

pub const NEWS_FEEDS: [NewsFeed; 3] = [
    NewsFeed {
        name: "Khaleej Times Real Estate",
        url: "https://feeds.khaleejtimes.com/business/real-estate",
        category: "Real Estate",
    },
    NewsFeed {
        name: "Gulf News Property",
        url: "https://gulfnews.com/business/property/feeds/latest",
        category: "Property",
    },
    NewsFeed {
        name: "Arabian Business",
        url: "https://www.arabianbusiness.com/industries/real-estate/feed",
        category: "Property",
    },
];

pub const DUBAI_KEYWORDS: &[&str] = &[
    "dubai",
    "uae",
    "emirates",
    "property",
    "real estate",
    "investment",
    "downtown dubai",
    "dubai marina",
    "palm jumeirah",
    "jbr",
    "business bay",
    "deira",
    "bur dubai",
];

pub const DUBAI_LAND_KEYWORDS: &[&str] = &[
    "dubai land department",
    "dld",
    "property registration",
    "real estate license",
    "property law",
    "real estate regulation",
    "property transaction",
    "property permit",
    "real estate registration",
    "property title deed",
    "oqood",
    "ejari",
    "property developer license",
    "real estate broker",
    "property valuation",
    "property tax",
    "real estate fee",
    "property ownership",
    "land registration",
    "property transfer",
    "real estate compliance",
    "property documentation",
];

/// 每个源最多取 15 条
const PER_FEED_CAP: usize = 15;
/// 描述截断长度
const DESCRIPTION_CAP: usize = 250;
/// 抓取结果少于 5 条时补备用文章
const BACKUP_THRESHOLD: usize = 5;

#[derive(Default)]
struct NewsCache {
    last_updated: Option<DateTime<Utc>>,
    articles: Vec<NewsArticle>,
    dubai_land_articles: Vec<NewsArticle>,
    official_articles: Vec<NewsArticle>,
}

/// 缓存快照 (响应用)
#[derive(Debug, Clone)]
pub struct NewsSnapshot {
    pub articles: Vec<NewsArticle>,
    pub last_updated: Option<String>,
}

pub struct NewsService {
    http: reqwest::Client,
    cache: RwLock<NewsCache>,
    refresh_minutes: u64,
}

impl NewsService {
    pub fn new(refresh_minutes: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_default();

        Self {
            http,
            cache: RwLock::new(NewsCache::default()),
            refresh_minutes,
        }
    }

    pub fn refresh_minutes(&self) -> u64 {
        self.refresh_minutes
    }

    /// 按类型取文章: "official" | "dubailand" | 其余为 general
    ///
    /// 缓存超龄或为空时先同步刷新一次再返回。
    pub async fn get(&self, kind: &str) -> NewsSnapshot {
        if self.is_stale().await {
            self.refresh().await;
        }

        let cache = self.cache.read().await;
        let articles = match kind {
            "official" => cache.official_articles.clone(),
            "dubailand" => cache.dubai_land_articles.clone(),
            _ => cache.articles.clone(),
        };

        NewsSnapshot {
            articles,
            last_updated: cache.last_updated.map(|t| t.to_rfc3339()),
        }
    }

    async fn is_stale(&self) -> bool {
        let cache = self.cache.read().await;
        match cache.last_updated {
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age.num_minutes() >= self.refresh_minutes as i64 || cache.articles.is_empty()
            }
            None => true,
        }
    }

    /// 抓取全部源并重建缓存片
    pub async fn refresh(&self) {
        let mut all = self.fetch_feeds().await;
        let total_fetched = all.len();

        let has_backup = all.len() < BACKUP_THRESHOLD;
        if has_backup {
            tracing::warn!(fetched = all.len(), "Too few articles, adding backup entry");
            all.push(backup_article());
        }

        let dubai = dedupe_by_title(filter_by_keywords(&all, DUBAI_KEYWORDS));
        let dubai_land = dedupe_by_title(filter_by_keywords(&all, DUBAI_LAND_KEYWORDS));
        let official = dedupe_by_title(
            all.iter()
                .filter(|a| a.is_official == Some(true))
                .cloned()
                .collect(),
        );

        let mut cache = self.cache.write().await;
        cache.last_updated = Some(Utc::now());
        cache.articles = truncated(dubai, 25);
        cache.dubai_land_articles = truncated(dubai_land, 15);
        cache.official_articles = truncated(official, 20);

        tracing::info!(
            total = total_fetched,
            general = cache.articles.len(),
            dubailand = cache.dubai_land_articles.len(),
            "News cache refreshed"
        );
    }

    async fn fetch_feeds(&self) -> Vec<NewsArticle> {
        let mut all = Vec::new();

        for feed in &NEWS_FEEDS {
            match self.fetch_one(feed).await {
                Ok(mut articles) => {
                    tracing::debug!(source = feed.name, count = articles.len(), "Feed fetched");
                    all.append(&mut articles);
                }
                Err(e) => {
                    tracing::warn!(source = feed.name, error = %e, "Failed to fetch RSS feed");
                }
            }
        }

        all
    }

    async fn fetch_one(&self, feed: &NewsFeed) -> Result<Vec<NewsArticle>, String> {
        let body = self
            .http
            .get(feed.url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?
            .text()
            .await
            .map_err(|e| format!("body read failed: {}", e))?;

        // 截断的响应不值得解析
        if body.len() < 100 {
            return Err("response too short".to_string());
        }

        let clean = sanitize_xml(&body);
        let items = parse_feed(&clean)?;
        let fetched_at = Utc::now().to_rfc3339();

        Ok(items
            .into_iter()
            .take(PER_FEED_CAP)
            .filter_map(|item| {
                let title = strip_tags(&item.title);
                if title.is_empty() || item.link.is_empty() {
                    return None;
                }

                let mut description: String =
                    strip_tags(&item.description).chars().take(DESCRIPTION_CAP).collect();
                if description.is_empty() {
                    description = "Click to read full article".to_string();
                }

                Some(NewsArticle {
                    title,
                    description,
                    url: item.link,
                    published_at: item
                        .pub_date
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| fetched_at.clone()),
                    source: NewsSource {
                        name: feed.name.to_string(),
                    },
                    category: feed.category.to_string(),
                    fetched_at: Some(fetched_at.clone()),
                    is_rss: Some(true),
                    is_official: None,
                    is_backup: None,
                })
            })
            .collect())
    }
}

/// 启动后台刷新任务: 5 秒后首刷，之后按刷新周期循环
pub fn spawn_refresh_worker(service: std::sync::Arc<NewsService>) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        service.refresh().await;

        let period = std::time::Duration::from_secs(service.refresh_minutes() * 60);
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // 第一个 tick 立即返回，跳过
        loop {
            ticker.tick().await;
            service.refresh().await;
        }
    });
}

/// 全部源都失败时的兜底文章
fn backup_article() -> NewsArticle {
    NewsArticle {
        title: "Dubai Real Estate Market Analysis - Q4 2025".to_string(),
        description: "Comprehensive analysis of Dubai's property market trends.".to_string(),
        url: "https://www.khaleejtimes.com/business/real-estate".to_string(),
        published_at: Utc::now().to_rfc3339(),
        source: NewsSource {
            name: "Khaleej Times Real Estate".to_string(),
        },
        category: "Market Analysis".to_string(),
        fetched_at: None,
        is_rss: None,
        is_official: None,
        is_backup: Some(true),
    }
}

/// 标题+描述里命中任一关键词即保留
pub fn filter_by_keywords(articles: &[NewsArticle], keywords: &[&str]) -> Vec<NewsArticle> {
    articles
        .iter()
        .filter(|a| {
            let haystack = format!("{} {}", a.title, a.description).to_lowercase();
            keywords.iter().any(|k| haystack.contains(k))
        })
        .cloned()
        .collect()
}

/// 按标题 (小写、去空白) 去重，保留首次出现
pub fn dedupe_by_title(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let mut seen = std::collections::HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(a.title.to_lowercase().trim().to_string()))
        .collect()
}

fn truncated(mut articles: Vec<NewsArticle>, cap: usize) -> Vec<NewsArticle> {
    articles.truncate(cap);
    articles
}
