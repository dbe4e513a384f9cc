//! Logic lõi của timeline lịch sử: dữ liệu sự kiện, chỉ mục ngày -> panel
//! và bộ điều khiển đồng bộ marker với panel chi tiết.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod controller;
mod headless;

pub use controller::{
    ClickOutcome, ClickTarget, PanelChange, PanelState, TimelineController, TimelineHost,
};
pub use headless::{HeadlessPage, MarkerView, PanelView, RevealRecord};

/// Cấu hình hành vi responsive và hiệu ứng hiển thị panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineConfig {
    /// Chiều rộng (pixel logic) tối đa vẫn coi là mobile.
    pub mobile_breakpoint: f64,
    /// Thời lượng hiệu ứng fade/slide khi mở panel.
    pub transition_ms: u32,
    /// Độ lệch dọc ban đầu (pixel) của panel trước khi trượt về 0.
    pub reveal_offset_px: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            transition_ms: 300,
            reveal_offset_px: 20,
        }
    }
}

impl TimelineConfig {
    pub fn viewport_mode(&self, width: f64) -> ViewportMode {
        ViewportMode::from_width(width, self.mobile_breakpoint)
    }

    pub fn transition(&self) -> PanelTransition {
        PanelTransition {
            duration_ms: self.transition_ms,
            offset_px: self.reveal_offset_px,
        }
    }
}

/// Chế độ hiển thị suy ra từ chiều rộng viewport, không lưu trữ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewportMode {
    Mobile,
    Desktop,
}

impl ViewportMode {
    pub fn from_width(width: f64, breakpoint: f64) -> Self {
        if width <= breakpoint {
            ViewportMode::Mobile
        } else {
            ViewportMode::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == ViewportMode::Mobile
    }
}

/// Mép ngang dùng để neo marker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Tên thuộc tính CSS tương ứng.
    pub fn css_property(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Vị trí ngang của marker: đúng một mép, không bao giờ cả hai.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HorizontalOffset {
    pub side: Side,
    pub value: String,
}

/// Một sự kiện trên timeline. Bất biến sau khi nạp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub date: String,
    pub title: String,
    pub info_id: String,
    pub top_offset: String,
    pub horizontal_offset: HorizontalOffset,
}

/// Chỉ số thứ tự render của marker, dùng để đánh dấu đúng phần tử được click.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

/// Mô tả một marker cần dựng trên host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerLayout<'a> {
    pub id: MarkerId,
    pub date: &'a str,
    pub title: &'a str,
    pub top: &'a str,
    pub horizontal: &'a HorizontalOffset,
}

/// Tham số hiệu ứng fade/slide khi mở panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTransition {
    pub duration_ms: u32,
    pub offset_px: u32,
}

impl PanelTransition {
    /// Giá trị `transition` CSS, ví dụ `opacity 0.3s ease, transform 0.3s ease`.
    pub fn css_transition(&self) -> String {
        let seconds = f64::from(self.duration_ms) / 1000.0;
        format!("opacity {seconds}s ease, transform {seconds}s ease")
    }

    pub fn start_transform(&self) -> String {
        format!("translateY({}px)", self.offset_px)
    }

    pub fn end_transform(&self) -> &'static str {
        "translateY(0)"
    }
}

/// Ánh xạ ngày -> id panel, dựng một lần khi nạp dữ liệu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateIndex {
    entries: HashMap<String, String>,
}

impl DateIndex {
    /// Dựng chỉ mục; ngày trùng lặp thì bản ghi sau ghi đè bản ghi trước.
    pub fn build(events: &[EventRecord]) -> Self {
        let mut entries = HashMap::with_capacity(events.len());
        for event in events {
            if let Some(previous) = entries.insert(event.date.clone(), event.info_id.clone()) {
                tracing::warn!(
                    date = %event.date,
                    previous = %previous,
                    current = %event.info_id,
                    "ngày bị trùng, giữ panel của bản ghi sau"
                );
            }
        }
        Self { entries }
    }

    pub fn get(&self, date: &str) -> Option<&str> {
        self.entries.get(date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Các cặp (ngày, panel) theo thứ tự ngày để in ra ổn định.
    pub fn sorted_entries(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(date, info)| (date.as_str(), info.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

pub fn build_date_index(events: &[EventRecord]) -> DateIndex {
    DateIndex::build(events)
}

/// Lỗi khi nạp danh sách sự kiện.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Không truy cập được tài nguyên sự kiện: {0}")]
    Unreachable(String),
    #[error("Tài nguyên sự kiện trả về HTTP {0}")]
    Status(u16),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Tài nguyên thiếu mảng `events`")]
    MissingEvents,
    #[error("Sự kiện #{index} thiếu trường `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("Sự kiện #{index} phải có đúng một trong hai trường `left` hoặc `right`")]
    HorizontalOffset { index: usize },
}

/// Lỗi chung của timeline. Tất cả đều cục bộ, không làm hỏng trang.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Không có panel với id `{0}`")]
    PanelNotFound(String),
    #[error("Ngày `{0}` không có panel tương ứng")]
    UnmappedDate(String),
    #[error("Trang thiếu vùng hiển thị: {0}")]
    MissingRegion(String),
    #[error("Lỗi host: {0}")]
    Host(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn record(date: &str, info_id: &str) -> EventRecord {
        EventRecord {
            date: date.to_string(),
            title: format!("Title {date}"),
            info_id: info_id.to_string(),
            top_offset: "10%".to_string(),
            horizontal_offset: HorizontalOffset {
                side: Side::Left,
                value: "5%".to_string(),
            },
        }
    }

    #[test]
    fn duplicate_dates_keep_the_later_panel() {
        let events = vec![
            record("1000 BC", "first"),
            record("500 BC", "middle"),
            record("1000 BC", "second"),
        ];
        let index = build_date_index(&events);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("1000 BC"), Some("second"));
        assert_eq!(index.get("500 BC"), Some("middle"));
        assert_eq!(index.get("42 AD"), None);
    }

    #[test]
    fn breakpoint_is_inclusive() {
        let config = TimelineConfig::default();
        assert_eq!(config.viewport_mode(768.0), ViewportMode::Mobile);
        assert_eq!(config.viewport_mode(320.0), ViewportMode::Mobile);
        assert_eq!(config.viewport_mode(768.5), ViewportMode::Desktop);
        assert_eq!(config.viewport_mode(1440.0), ViewportMode::Desktop);
    }

    #[test]
    fn transition_css_matches_defaults() {
        let transition = TimelineConfig::default().transition();
        assert_eq!(
            transition.css_transition(),
            "opacity 0.3s ease, transform 0.3s ease"
        );
        assert_eq!(transition.start_transform(), "translateY(20px)");
        assert_eq!(transition.end_transform(), "translateY(0)");
    }

    #[test]
    fn sorted_entries_are_ordered_by_date() {
        let events = vec![record("b", "2"), record("a", "1")];
        let index = DateIndex::build(&events);
        assert_eq!(index.sorted_entries(), vec![("a", "1"), ("b", "2")]);
    }
}
