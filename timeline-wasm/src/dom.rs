#![cfg(target_arch = "wasm32")]

use timeline_core::{
    ClickTarget, EventRecord, LoadError, MarkerId, MarkerLayout, PanelTransition, TimelineError,
    TimelineHost,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlElement, Response, Window};

use crate::MountConfig;

pub const MARKER_CLASS: &str = "timeline-event-dot";
const ACTIVE_CLASS: &str = "active";

/// Host DOM: các vùng của trang được tra cứu một lần lúc gắn timeline.
pub struct DomHost {
    window: Window,
    document: Document,
    timeline: Element,
    info_container: HtmlElement,
    panels: Vec<HtmlElement>,
    markers: Vec<HtmlElement>,
}

impl DomHost {
    pub fn resolve(window: Window, config: &MountConfig) -> Result<Self, TimelineError> {
        let document = window
            .document()
            .ok_or_else(|| TimelineError::MissingRegion("document".to_string()))?;

        let timeline = query(&document, &config.timeline_selector)?;
        let info_container = query(&document, &config.info_selector)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| TimelineError::MissingRegion(config.info_selector.clone()))?;
        let panels = query_all(&document, &config.panel_selector)?;

        Ok(Self {
            window,
            document,
            timeline,
            info_container,
            panels,
            markers: Vec::new(),
        })
    }

    pub fn timeline(&self) -> &Element {
        &self.timeline
    }

    fn create_div(&self, class_name: &str) -> Result<HtmlElement, JsValue> {
        let element = self.document.create_element("div")?;
        element.set_class_name(class_name);
        element.dyn_into::<HtmlElement>().map_err(JsValue::from)
    }

    fn build_marker(&self, marker: &MarkerLayout<'_>) -> Result<HtmlElement, JsValue> {
        let dot = self.create_div(MARKER_CLASS)?;
        dot.set_attribute("data-date", marker.date)?;
        dot.set_attribute("data-marker", &marker.id.0.to_string())?;

        let date_el = self.create_div("dot-date")?;
        date_el.set_text_content(Some(marker.date));
        let title_el = self.create_div("dot-title")?;
        title_el.set_text_content(Some(marker.title));
        dot.append_child(&date_el)?;
        dot.append_child(&title_el)?;

        let style = dot.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", marker.top)?;
        style.set_property(marker.horizontal.side.css_property(), &marker.horizontal.value)?;

        self.timeline.append_child(&dot)?;
        Ok(dot)
    }

    fn find_panel(&self, info_id: &str) -> Option<&HtmlElement> {
        self.panels.iter().find(|panel| panel.id() == info_id)
    }
}

impl TimelineHost for DomHost {
    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or_default()
    }

    fn render_marker(&mut self, marker: &MarkerLayout<'_>) -> Result<(), TimelineError> {
        let dot = self
            .build_marker(marker)
            .map_err(|err| TimelineError::Host(describe(&err)))?;
        self.markers.push(dot);
        Ok(())
    }

    fn has_panel(&self, info_id: &str) -> bool {
        self.find_panel(info_id).is_some()
    }

    fn hide_all_panels(&mut self) {
        for panel in &self.panels {
            set_style(panel, "display", "none");
            toggle_active(panel, false);
        }
    }

    fn reveal_panel(&mut self, info_id: &str, transition: PanelTransition) {
        let Some(panel) = self.find_panel(info_id).cloned() else {
            return;
        };

        set_style(&panel, "display", "block");
        set_style(&panel, "opacity", "0");
        set_style(&panel, "transform", &transition.start_transform());

        // Khung hình kế tiếp mới bật transition để trình duyệt thấy trạng thái đầu.
        let css_transition = transition.css_transition();
        let end_transform = transition.end_transform();
        let animate = Closure::once_into_js(move || {
            set_style(&panel, "transition", &css_transition);
            set_style(&panel, "opacity", "1");
            set_style(&panel, "transform", end_transform);
            toggle_active(&panel, true);
        });
        if let Err(err) = self.window.request_animation_frame(animate.unchecked_ref()) {
            tracing::warn!(error = %describe(&err), "không đặt được requestAnimationFrame");
        }
    }

    fn set_container_visible(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        set_style(&self.info_container, "display", display);
    }

    fn clear_marker_highlights(&mut self) {
        for marker in &self.markers {
            toggle_active(marker, false);
        }
    }

    fn highlight_marker(&mut self, marker: MarkerId) {
        if let Some(element) = self.markers.get(marker.0) {
            toggle_active(element, true);
        }
    }
}

/// Phân loại phần tử nhận click: marker (hoặc phần tử con) hay nền timeline.
///
/// `None` nghĩa là marker không do timeline dựng, click bị bỏ qua.
pub fn classify_click(event: &Event) -> Option<ClickTarget> {
    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return Some(ClickTarget::Background);
    };

    let dot = match target.closest(&format!(".{MARKER_CLASS}")) {
        Ok(Some(dot)) => dot,
        _ => return Some(ClickTarget::Background),
    };

    let date = dot.get_attribute("data-date")?;
    let id = dot.get_attribute("data-marker")?.parse().ok()?;
    Some(ClickTarget::Marker {
        id: MarkerId(id),
        date,
    })
}

/// Tải tài nguyên sự kiện; chỉ dừng ở ranh giới mạng.
pub async fn fetch_events(window: &Window, url: &str) -> Result<Vec<EventRecord>, LoadError> {
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| LoadError::Unreachable(describe(&err)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| LoadError::Unreachable(format!("{url} không trả về Response")))?;

    if !response.ok() {
        return Err(LoadError::Status(response.status()));
    }

    let body = response
        .text()
        .map_err(|err| LoadError::Unreachable(describe(&err)))?;
    let body = JsFuture::from(body)
        .await
        .map_err(|err| LoadError::Unreachable(describe(&err)))?;
    let body = body
        .as_string()
        .ok_or_else(|| LoadError::Parse("nội dung phản hồi không phải chuỗi".to_string()))?;

    timeline_source::parse_events_str(&body)
}

fn query(document: &Document, selector: &str) -> Result<Element, TimelineError> {
    document
        .query_selector(selector)
        .map_err(|err| TimelineError::Host(format!("Selector lỗi: {}", describe(&err))))?
        .ok_or_else(|| TimelineError::MissingRegion(selector.to_string()))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, TimelineError> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(|err| TimelineError::Host(format!("Selector lỗi: {}", describe(&err))))?;

    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        tracing::warn!(property, error = %describe(&err), "không đặt được style");
    }
}

fn toggle_active(element: &HtmlElement, active: bool) {
    let classes = element.class_list();
    let result = if active {
        classes.add_1(ACTIVE_CLASS)
    } else {
        classes.remove_1(ACTIVE_CLASS)
    };
    if let Err(err) = result {
        tracing::warn!(error = %describe(&err), "không đổi được class active");
    }
}

pub fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
