#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use serde_wasm_bindgen::{from_value, to_value};
use timeline_core::{ClickOutcome, EventRecord, LoadError, PanelChange, TimelineController};
use timeline_source::parse_events_value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, Window};

use crate::dom::{self, DomHost};
use crate::{format_timeline_error, read_config, MountConfig};

type SharedController = Rc<RefCell<TimelineController<DomHost>>>;

static DIAGNOSTICS: Once = Once::new();

fn init_diagnostics() {
    console_error_panic_hook::set_once();
    DIAGNOSTICS.call_once(|| {
        // Trang có thể đã tự cài subscriber khác.
        let _ = tracing_wasm::try_set_as_global_default();
    });
}

/// Điều khiển timeline đã gắn, dành cho script của trang.
#[wasm_bindgen]
pub struct TimelineHandle {
    controller: SharedController,
}

#[wasm_bindgen]
impl TimelineHandle {
    /// Mở panel theo id; trả `true` nếu có chuyển trạng thái.
    #[wasm_bindgen(js_name = showPanel)]
    pub fn show_panel(&self, info_id: &str) -> bool {
        match self.controller.borrow_mut().show_panel(info_id) {
            Ok(change) => change == PanelChange::Revealed,
            Err(err) => {
                tracing::debug!(error = %err, "showPanel bị bỏ qua");
                false
            }
        }
    }

    /// Chọn sự kiện theo ngày như khi người dùng click marker.
    #[wasm_bindgen(js_name = selectDate)]
    pub fn select_date(&self, date: &str) -> bool {
        matches!(
            self.controller.borrow_mut().select_date(date),
            ClickOutcome::Revealed { .. } | ClickOutcome::AlreadyActive { .. }
        )
    }

    #[wasm_bindgen(js_name = activePanel)]
    pub fn active_panel(&self) -> Option<String> {
        self.controller.borrow().active_panel().map(str::to_string)
    }

    #[wasm_bindgen(js_name = isMobile)]
    pub fn is_mobile(&self) -> bool {
        self.controller.borrow().is_mobile_mode()
    }

    pub fn events(&self) -> Result<JsValue, JsValue> {
        to_value(self.controller.borrow().events())
            .map_err(|err| JsValue::from_str(&format!("Không serialize danh sách sự kiện: {err}")))
    }
}

/// Gắn timeline, tải dữ liệu từ `eventsUrl`.
///
/// Vùng trang thiếu thì reject; dữ liệu lỗi thì chỉ ghi log và trả `undefined`.
#[wasm_bindgen(js_name = mountTimeline)]
pub async fn mount_timeline(config: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_diagnostics();
    let config = read_config(config)?;
    let (window, controller) = prepare(&config)?;

    let events = dom::fetch_events(&window, &config.events_url).await;
    let handle = finish(&window, controller, events)?;
    Ok(handle.map_or(JsValue::UNDEFINED, JsValue::from))
}

/// Gắn timeline với dữ liệu nhúng sẵn trong trang.
#[wasm_bindgen(js_name = mountTimelineWithEvents)]
pub fn mount_timeline_with_events(
    resource: JsValue,
    config: Option<JsValue>,
) -> Result<Option<TimelineHandle>, JsValue> {
    init_diagnostics();
    let config = read_config(config)?;
    let (window, controller) = prepare(&config)?;

    let events = from_value::<serde_json::Value>(resource)
        .map_err(|err| LoadError::Parse(err.to_string()))
        .and_then(|value| parse_events_value(&value));
    finish(&window, controller, events)
}

fn prepare(config: &MountConfig) -> Result<(Window, TimelineController<DomHost>), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
    let host = DomHost::resolve(window.clone(), config)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;
    Ok((window, TimelineController::new(host, config.timeline.clone())))
}

fn finish(
    window: &Window,
    mut controller: TimelineController<DomHost>,
    events: Result<Vec<EventRecord>, LoadError>,
) -> Result<Option<TimelineHandle>, JsValue> {
    let events = match events {
        Ok(events) => events,
        Err(err) => {
            tracing::error!(error = %err, "Không nạp được dữ liệu sự kiện, timeline sẽ không hoạt động");
            return Ok(None);
        }
    };

    if let Err(err) = controller.attach(events) {
        tracing::error!(error = %err, "Không dựng được marker, timeline sẽ không hoạt động");
        return Ok(None);
    }

    let controller = Rc::new(RefCell::new(controller));
    bind_listeners(window, &controller)?;
    Ok(Some(TimelineHandle { controller }))
}

fn bind_listeners(window: &Window, controller: &SharedController) -> Result<(), JsValue> {
    let on_click = {
        let controller = Rc::clone(controller);
        Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = dom::classify_click(&event) else {
                tracing::debug!("click vào marker lạ, bỏ qua");
                return;
            };
            let outcome = controller.borrow_mut().handle_click(target);
            tracing::trace!(?outcome, "xử lý click");
        })
    };
    controller
        .borrow()
        .host()
        .timeline()
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    // Listener sống suốt phiên trang.
    on_click.forget();

    let on_resize = {
        let controller = Rc::clone(controller);
        Closure::<dyn FnMut()>::new(move || {
            controller.borrow_mut().handle_resize();
        })
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    Ok(())
}
