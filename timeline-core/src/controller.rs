//! Bộ điều khiển timeline: dựng marker, xử lý click/resize và giữ đúng một
//! panel chi tiết đang mở.

use crate::{
    DateIndex, EventRecord, MarkerId, MarkerLayout, PanelTransition, TimelineConfig,
    TimelineError,
};

/// Bề mặt hiển thị mà controller điều khiển (DOM thật hoặc trang giả lập).
///
/// Các thao tác hiển thị không trả lỗi: host tự ghi log nếu môi trường từ chối,
/// controller chỉ cần trạng thái logic nhất quán.
pub trait TimelineHost {
    /// Chiều rộng viewport hiện tại, tính bằng pixel logic.
    fn viewport_width(&self) -> f64;

    /// Thêm một marker vào vùng timeline.
    fn render_marker(&mut self, marker: &MarkerLayout<'_>) -> Result<(), TimelineError>;

    fn has_panel(&self, info_id: &str) -> bool;

    fn hide_all_panels(&mut self);

    /// Hiện panel với hiệu ứng opacity 0 -> 1 và trượt dọc về 0.
    fn reveal_panel(&mut self, info_id: &str, transition: PanelTransition);

    fn set_container_visible(&mut self, visible: bool);

    fn clear_marker_highlights(&mut self);

    fn highlight_marker(&mut self, marker: MarkerId);
}

/// Vai trò của phần tử nhận click, đã được host phân loại.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Marker { id: MarkerId, date: String },
    Background,
}

/// Kết quả của `show_panel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelChange {
    Revealed,
    Unchanged,
}

/// Kết quả xử lý một click, phục vụ log và kiểm thử.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Revealed { info_id: String },
    AlreadyActive { info_id: String },
    UnmappedDate { date: String },
    PanelMissing { info_id: String },
    Dismissed,
    Ignored,
}

/// Trạng thái vùng chi tiết nhìn từ ngoài.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    /// Mobile, vùng chi tiết ẩn, không panel nào mở.
    Hidden,
    /// Mobile, vùng chi tiết hiện với đúng một panel.
    Showing(String),
    /// Desktop: vùng chi tiết luôn hiện.
    Desktop { active: Option<String> },
}

pub struct TimelineController<H: TimelineHost> {
    host: H,
    config: TimelineConfig,
    events: Vec<EventRecord>,
    index: DateIndex,
    active: Option<String>,
}

impl<H: TimelineHost> TimelineController<H> {
    /// Khởi tạo controller: ẩn mọi panel, trên mobile ẩn luôn vùng chi tiết.
    pub fn new(host: H, config: TimelineConfig) -> Self {
        let mut controller = Self {
            host,
            config,
            events: Vec::new(),
            index: DateIndex::default(),
            active: None,
        };
        controller.host.hide_all_panels();
        if controller.is_mobile_mode() {
            controller.host.set_container_visible(false);
        }
        controller
    }

    /// Gắn dữ liệu đã nạp: dựng chỉ mục ngày rồi render marker.
    pub fn attach(&mut self, events: Vec<EventRecord>) -> Result<(), TimelineError> {
        if !self.events.is_empty() {
            return Err(TimelineError::Host(
                "Timeline đã được gắn dữ liệu".to_string(),
            ));
        }
        self.index = DateIndex::build(&events);
        self.events = events;
        self.render_dots()?;
        tracing::debug!(
            events = self.events.len(),
            dates = self.index.len(),
            "đã dựng timeline"
        );
        Ok(())
    }

    fn render_dots(&mut self) -> Result<(), TimelineError> {
        for (position, event) in self.events.iter().enumerate() {
            let marker = MarkerLayout {
                id: MarkerId(position),
                date: &event.date,
                title: &event.title,
                top: &event.top_offset,
                horizontal: &event.horizontal_offset,
            };
            self.host.render_marker(&marker)?;
        }
        Ok(())
    }

    /// Mở panel `info_id`; gọi lại với panel đang mở thì không làm gì.
    pub fn show_panel(&mut self, info_id: &str) -> Result<PanelChange, TimelineError> {
        if self.active.as_deref() == Some(info_id) {
            return Ok(PanelChange::Unchanged);
        }
        if !self.host.has_panel(info_id) {
            return Err(TimelineError::PanelNotFound(info_id.to_string()));
        }

        self.host.hide_all_panels();
        self.host.reveal_panel(info_id, self.config.transition());
        self.active = Some(info_id.to_string());
        Ok(PanelChange::Revealed)
    }

    pub fn clear_active_markers(&mut self) {
        self.host.clear_marker_highlights();
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> ClickOutcome {
        match target {
            ClickTarget::Marker { id, date } => self.activate_marker(id, date),
            ClickTarget::Background => {
                if !self.is_mobile_mode() {
                    return ClickOutcome::Ignored;
                }
                self.host.set_container_visible(false);
                self.active = None;
                self.clear_active_markers();
                ClickOutcome::Dismissed
            }
        }
    }

    fn activate_marker(&mut self, id: MarkerId, date: String) -> ClickOutcome {
        let Some(info_id) = self.index.get(&date).map(str::to_string) else {
            let err = TimelineError::UnmappedDate(date.clone());
            tracing::debug!(error = %err, "bỏ qua click");
            return ClickOutcome::UnmappedDate { date };
        };

        self.clear_active_markers();
        self.host.highlight_marker(id);
        if self.is_mobile_mode() {
            self.host.set_container_visible(true);
        }

        match self.show_panel(&info_id) {
            Ok(PanelChange::Revealed) => ClickOutcome::Revealed { info_id },
            Ok(PanelChange::Unchanged) => ClickOutcome::AlreadyActive { info_id },
            Err(err) => {
                tracing::debug!(error = %err, "không mở được panel");
                ClickOutcome::PanelMissing { info_id }
            }
        }
    }

    /// Đánh giá lại ở mọi lần resize, không chỉ khi vượt ngưỡng.
    pub fn handle_resize(&mut self) {
        if !self.is_mobile_mode() {
            self.host.set_container_visible(true);
        } else if self.active.is_none() {
            self.host.set_container_visible(false);
        }
    }

    pub fn is_mobile_mode(&self) -> bool {
        self.config
            .viewport_mode(self.host.viewport_width())
            .is_mobile()
    }

    /// Mô phỏng click vào marker của ngày `date` (marker cuối cùng nếu trùng).
    pub fn select_date(&mut self, date: &str) -> ClickOutcome {
        match self.marker_for_date(date) {
            Some(id) => self.handle_click(ClickTarget::Marker {
                id,
                date: date.to_string(),
            }),
            None => ClickOutcome::UnmappedDate {
                date: date.to_string(),
            },
        }
    }

    pub fn marker_for_date(&self, date: &str) -> Option<MarkerId> {
        self.events
            .iter()
            .rposition(|event| event.date == date)
            .map(MarkerId)
    }

    pub fn state(&self) -> PanelState {
        if !self.is_mobile_mode() {
            return PanelState::Desktop {
                active: self.active.clone(),
            };
        }
        match &self.active {
            Some(info_id) => PanelState::Showing(info_id.clone()),
            None => PanelState::Hidden,
        }
    }

    pub fn active_panel(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
