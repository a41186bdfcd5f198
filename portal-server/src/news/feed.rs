//! RSS 2.0 解析
//!
//! 新闻源的 feed 质量参差：裸 `&`、控制字符、CDATA 混用都出现过。
//! 先 [`sanitize_xml`] 清洗再交给 quick-xml，解析只认 item 里的
//! title / link / description (或 content:encoded) / pubDate。

use quick_xml::Reader;
use quick_xml::events::Event;

/// 单条 RSS item 的原始字段 (未去 HTML 标签)
#[derive(Debug, Default, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
}

/// 解析清洗后的 RSS 文本
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" => current = Some(FeedItem::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                // content:encoded 的 local name 是 encoded
                b"description" | b"summary" | b"encoded" => field = Some(Field::Description),
                b"pubDate" => field = Some(Field::PubDate),
                _ => field = None,
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                field = None;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map(|c| c.into_owned()).unwrap_or_default();
                append_field(&mut current, field, &text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                append_field(&mut current, field, &text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {}", e)),
        }
    }

    Ok(items)
}

fn append_field(current: &mut Option<FeedItem>, field: Option<Field>, text: &str) {
    let (Some(item), Some(field)) = (current.as_mut(), field) else {
        return;
    };
    match field {
        Field::Title => item.title.push_str(text),
        Field::Link => item.link.push_str(text.trim()),
        Field::Description => {
            // summary / content:encoded / description 任取首个非空
            if item.description.is_empty() {
                item.description.push_str(text);
            }
        }
        Field::PubDate => item.pub_date = Some(text.trim().to_string()),
    }
}

/// feed 清洗: 转义裸 `&` (五个标准实体除外)、剔除控制字符
pub fn sanitize_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let bytes = raw.as_bytes();
    let mut chars = raw.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '&' => {
                let rest = &bytes[i + 1..];
                let named = [&b"amp;"[..], b"lt;", b"gt;", b"quot;", b"apos;"]
                    .iter()
                    .any(|entity| rest.starts_with(entity));
                if named {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            '\u{09}' | '\u{0A}' | '\u{0D}' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// 去掉 HTML 标签并收紧首尾空白
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.trim().to_string()
}
