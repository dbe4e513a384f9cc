//! Trang giả lập trong bộ nhớ, dùng cho kiểm thử và công cụ dòng lệnh.

use std::collections::BTreeMap;

use crate::{
    EventRecord, MarkerId, MarkerLayout, PanelTransition, Side, TimelineError, TimelineHost,
};

/// Dấu vết lần hiện panel gần nhất.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealRecord {
    pub from_opacity: f32,
    pub to_opacity: f32,
    pub from_transform: String,
    pub to_transform: String,
    pub transition: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelView {
    pub visible: bool,
    pub active: bool,
    pub reveal_count: u32,
    pub last_reveal: Option<RevealRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerView {
    pub id: MarkerId,
    pub date: String,
    pub title: String,
    pub top: String,
    pub side: Side,
    pub offset: String,
    pub highlighted: bool,
}

/// Host không cần trình duyệt: lưu trạng thái hiển thị để đọc lại.
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    width: f64,
    container_visible: bool,
    panels: BTreeMap<String, PanelView>,
    markers: Vec<MarkerView>,
}

impl HeadlessPage {
    pub fn new<I, S>(width: f64, panel_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            width,
            container_visible: true,
            panels: panel_ids
                .into_iter()
                .map(|id| (id.into(), PanelView::default()))
                .collect(),
            markers: Vec::new(),
        }
    }

    /// Tạo trang có sẵn một panel cho mỗi `info_id` xuất hiện trong dữ liệu.
    pub fn with_panels_for(width: f64, events: &[EventRecord]) -> Self {
        Self::new(width, events.iter().map(|event| event.info_id.clone()))
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn container_visible(&self) -> bool {
        self.container_visible
    }

    pub fn panel(&self, info_id: &str) -> Option<&PanelView> {
        self.panels.get(info_id)
    }

    pub fn visible_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|(_, panel)| panel.visible)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn markers(&self) -> &[MarkerView] {
        &self.markers
    }

    pub fn highlighted_markers(&self) -> Vec<MarkerId> {
        self.markers
            .iter()
            .filter(|marker| marker.highlighted)
            .map(|marker| marker.id)
            .collect()
    }

    pub fn total_reveals(&self) -> u32 {
        self.panels.values().map(|panel| panel.reveal_count).sum()
    }
}

impl TimelineHost for HeadlessPage {
    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn render_marker(&mut self, marker: &MarkerLayout<'_>) -> Result<(), TimelineError> {
        self.markers.push(MarkerView {
            id: marker.id,
            date: marker.date.to_string(),
            title: marker.title.to_string(),
            top: marker.top.to_string(),
            side: marker.horizontal.side,
            offset: marker.horizontal.value.clone(),
            highlighted: false,
        });
        Ok(())
    }

    fn has_panel(&self, info_id: &str) -> bool {
        self.panels.contains_key(info_id)
    }

    fn hide_all_panels(&mut self) {
        for panel in self.panels.values_mut() {
            panel.visible = false;
            panel.active = false;
        }
    }

    fn reveal_panel(&mut self, info_id: &str, transition: PanelTransition) {
        let Some(panel) = self.panels.get_mut(info_id) else {
            return;
        };
        // Không có khung hình: trạng thái cuối được áp dụng ngay.
        panel.visible = true;
        panel.active = true;
        panel.reveal_count += 1;
        panel.last_reveal = Some(RevealRecord {
            from_opacity: 0.0,
            to_opacity: 1.0,
            from_transform: transition.start_transform(),
            to_transform: transition.end_transform().to_string(),
            transition: transition.css_transition(),
        });
    }

    fn set_container_visible(&mut self, visible: bool) {
        self.container_visible = visible;
    }

    fn clear_marker_highlights(&mut self) {
        for marker in &mut self.markers {
            marker.highlighted = false;
        }
    }

    fn highlight_marker(&mut self, marker: MarkerId) {
        if let Some(view) = self.markers.iter_mut().find(|view| view.id == marker) {
            view.highlighted = true;
        }
    }
}
