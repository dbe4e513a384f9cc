//! Bridge WASM <-> JavaScript: gắn timeline vào DOM có sẵn của trang.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use timeline_core::{TimelineConfig, TimelineError};
use timeline_source::parse_events_value;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod mount;

#[cfg(target_arch = "wasm32")]
pub use mount::{mount_timeline, mount_timeline_with_events, TimelineHandle};

/// Cấu hình gắn timeline vào trang.
#[derive(Debug, Clone, PartialEq)]
pub struct MountConfig {
    pub events_url: String,
    pub timeline_selector: String,
    pub info_selector: String,
    pub panel_selector: String,
    pub timeline: TimelineConfig,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            events_url: "events.json".to_string(),
            timeline_selector: ".timeline-container".to_string(),
            info_selector: ".info-container".to_string(),
            panel_selector: ".timeline-info".to_string(),
            timeline: TimelineConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsMountConfig {
    #[serde(default)]
    events_url: Option<String>,
    #[serde(default)]
    timeline_selector: Option<String>,
    #[serde(default)]
    info_selector: Option<String>,
    #[serde(default)]
    panel_selector: Option<String>,
    #[serde(default)]
    mobile_breakpoint: Option<f64>,
    #[serde(default)]
    transition_ms: Option<u32>,
    #[serde(default)]
    reveal_offset_px: Option<u32>,
}

impl From<JsMountConfig> for MountConfig {
    fn from(cfg: JsMountConfig) -> Self {
        let mut base = MountConfig::default();
        if let Some(url) = cfg.events_url {
            base.events_url = url;
        }
        if let Some(selector) = cfg.timeline_selector {
            base.timeline_selector = selector;
        }
        if let Some(selector) = cfg.info_selector {
            base.info_selector = selector;
        }
        if let Some(selector) = cfg.panel_selector {
            base.panel_selector = selector;
        }
        if let Some(width) = cfg.mobile_breakpoint {
            base.timeline.mobile_breakpoint = width;
        }
        if let Some(ms) = cfg.transition_ms {
            base.timeline.transition_ms = ms;
        }
        if let Some(px) = cfg.reveal_offset_px {
            base.timeline.reveal_offset_px = px;
        }
        base
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn read_config(config: Option<JsValue>) -> Result<MountConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsMountConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(MountConfig::from(cfg))
        }
        _ => Ok(MountConfig::default()),
    }
}

/// Kiểm tra tài nguyên sự kiện và trả về danh sách đã chuẩn hóa.
#[wasm_bindgen(js_name = validateEvents)]
pub fn validate_events(resource: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let resource_value = from_value::<serde_json::Value>(resource)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON sự kiện: {err}")))?;

    let events = parse_events_value(&resource_value)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err.into())))?;

    to_value(&events)
        .map_err(|err| JsValue::from_str(&format!("Không serialize danh sách sự kiện: {err}")))
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use timeline_core::LoadError;

    #[test]
    fn partial_js_config_overrides_only_given_fields() {
        let cfg: JsMountConfig = serde_json::from_value(json!({
            "eventsUrl": "data/malifaux.json",
            "mobileBreakpoint": 640.0,
            "transitionMs": 150
        }))
        .expect("config hợp lệ");

        let mount = MountConfig::from(cfg);
        assert_eq!(mount.events_url, "data/malifaux.json");
        assert_eq!(mount.timeline_selector, ".timeline-container");
        assert_eq!(mount.info_selector, ".info-container");
        assert_eq!(mount.panel_selector, ".timeline-info");
        assert_eq!(mount.timeline.mobile_breakpoint, 640.0);
        assert_eq!(mount.timeline.transition_ms, 150);
        assert_eq!(mount.timeline.reveal_offset_px, 20);
    }

    #[test]
    fn empty_js_config_equals_default() {
        let cfg: JsMountConfig = serde_json::from_value(json!({})).expect("config rỗng");
        assert_eq!(MountConfig::from(cfg), MountConfig::default());
    }

    #[test]
    fn load_errors_are_prefixed_for_js() {
        let message = format_timeline_error(LoadError::Status(404).into());
        assert_eq!(message, "Timeline error: Tài nguyên sự kiện trả về HTTP 404");
    }
}
