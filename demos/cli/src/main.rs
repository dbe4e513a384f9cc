use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use timeline_core::{ClickTarget, HeadlessPage, TimelineConfig, TimelineController};
use timeline_source::parse_events_str;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Kiểm tra file sự kiện timeline và mô phỏng thao tác click/resize."
)]
struct Args {
    /// Đường dẫn tới file JSON `{ "events": [...] }`.
    #[arg(short, long)]
    input: PathBuf,

    /// Chiều rộng viewport giả lập (<= 768 là mobile).
    #[arg(short, long, default_value_t = 1024.0)]
    width: f64,

    /// Ngày của marker cần click, `-` là click vào vùng trống. Lặp lại được.
    #[arg(short, long = "click")]
    clicks: Vec<String>,

    /// In danh sách sự kiện đã chuẩn hóa dạng JSON.
    #[arg(long)]
    json: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn main() -> anyhow::Result<()> {
    init_tracing().ok();
    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let events = parse_events_str(&data)
        .with_context(|| format!("File {:?} không hợp lệ", args.input))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let page = HeadlessPage::with_panels_for(args.width, &events);
    let mut controller = TimelineController::new(page, TimelineConfig::default());
    controller.attach(events)?;

    println!("Markers: {}", controller.host().markers().len());
    for marker in controller.host().markers() {
        println!(
            "  [{}] {} | {} (top {}, {} {})",
            marker.id.0,
            marker.date,
            marker.title,
            marker.top,
            marker.side.css_property(),
            marker.offset
        );
    }

    println!("Date index: {}", controller.index().len());
    for (date, info_id) in controller.index().sorted_entries() {
        println!("  {date} -> {info_id}");
    }

    println!("Initial state: {:?}", controller.state());
    for click in &args.clicks {
        let outcome = if click == "-" {
            controller.handle_click(ClickTarget::Background)
        } else {
            controller.select_date(click)
        };
        println!("click {click:?}: {outcome:?} => {:?}", controller.state());
    }

    Ok(())
}
