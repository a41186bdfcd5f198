//! Entity models
//!
//! 所有实体与 JSON 存储文件 (investors.json / units.json / documents.json /
//! orders.json) 的历史格式保持字段级兼容 (camelCase)。

pub mod document;
pub mod investor;
pub mod news;
pub mod order;
pub mod unit;

pub use document::{
    Document, DriveFileInfo, ExtractedData, PersistenceMetadata, STATUS_ERROR, STATUS_PROCESSED,
    STATUS_PROCESSING,
};
pub use investor::{Investor, InvestorCreate, InvestorUpdate};
pub use news::{NewsArticle, NewsSource};
pub use order::{Order, OrderCreate, OrderItem};
pub use unit::{Unit, UnitProjection};
