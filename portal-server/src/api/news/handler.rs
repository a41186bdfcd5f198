//! News API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::models::NewsArticle;

use crate::core::ServerState;

#[derive(Deserialize)]
pub struct NewsQuery {
    /// "general" (默认) | "official" | "dubailand"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPayload {
    pub articles: Vec<NewsArticle>,
    #[serde(rename = "type")]
    pub kind: String,
    pub last_updated: Option<String>,
}

#[derive(Serialize)]
pub struct NewsResponse {
    pub success: bool,
    pub data: NewsPayload,
}

/// POST /api/getNews - 按类型取新闻缓存片
///
/// 聚合层从不抛错 (抓取失败退回缓存/备用文章)，端点恒为 200。
pub async fn get_news(
    State(state): State<ServerState>,
    Json(body): Json<NewsQuery>,
) -> Json<NewsResponse> {
    let kind = body.kind.unwrap_or_else(|| "general".into());
    let snapshot = state.news.get(&kind).await;

    Json(NewsResponse {
        success: true,
        data: NewsPayload {
            articles: snapshot.articles,
            kind,
            last_updated: snapshot.last_updated,
        },
    })
}
