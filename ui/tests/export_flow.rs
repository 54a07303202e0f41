//! End-to-end export flow: a card built from configuration and results, a
//! coordinator on a virtual clock, and a host that encodes for real but keeps
//! the files in memory.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use ui::core::locale::Locale;
use ui::export::snapshot::svg_markup;
use ui::export::{
    encode_csv, Capabilities, CaptureTicket, ExportCoordinator, ExportError, ExportHost,
    ManualScheduler, MenuItem, MenuLayout, Phase, SnapshotScene, TableSource, CAPTURE_DELAY,
    FOCUS_GRACE,
};
use ui::kpi::{build_card, CardBody, ResultSet, Row};
use ui::{KpiConfig, KpiTheme};

struct MemoryHost {
    current: ResultSet,
    previous: Option<ResultSet>,
    scene: Option<SnapshotScene>,
    csv_files: Vec<String>,
    captures: Vec<CaptureTicket>,
    download_all_calls: usize,
}

impl ExportHost for MemoryHost {
    fn export_table(&mut self) -> Result<(), ExportError> {
        let csv = encode_csv(
            &TableSource::Single(self.current.clone()),
            self.previous.as_ref(),
        )?;
        self.csv_files.push(csv);
        Ok(())
    }

    fn export_all(&mut self) -> Result<(), ExportError> {
        self.download_all_calls += 1;
        Ok(())
    }

    fn begin_capture(&mut self, ticket: CaptureTicket) -> Result<(), ExportError> {
        if self.scene.is_none() {
            return Err(ExportError::RegionUnavailable);
        }
        self.captures.push(ticket);
        Ok(())
    }
}

fn result_set(rows: serde_json::Value) -> ResultSet {
    ResultSet::from_rows(serde_json::from_value::<Vec<Row>>(rows).unwrap())
}

fn config() -> KpiConfig {
    KpiConfig::from_json(
        r#"{
            "title": "Signups",
            "metric": { "name": "signups" },
            "enableDownloadAsCSV": true,
            "enableDownloadAsPNG": true,
            "prevTimeFilter": { "from": "2024-01-01", "to": "2024-01-07", "relativeTimeString": "last week" }
        }"#,
    )
    .unwrap()
}

fn host_for(config: &KpiConfig) -> MemoryHost {
    let current = result_set(json!([{ "signups": "150" }]));
    let previous = result_set(json!([{ "signups": "100" }]));
    let theme = KpiTheme::default();
    let scene = match build_card(config, &theme, &current, Some(&previous), Locale::EN_US) {
        CardBody::Kpi(display) => Some(SnapshotScene::compose(config, &theme, &display, |period| {
            format!("vs {period}")
        })),
        CardBody::Error(_) => None,
    };
    MemoryHost {
        current,
        previous: Some(previous),
        scene,
        csv_files: Vec::new(),
        captures: Vec::new(),
        download_all_calls: 0,
    }
}

#[test]
fn csv_from_the_menu_includes_baseline_columns() {
    let config = config();
    let clock = ManualScheduler::new();
    let mut host = host_for(&config);
    let mut coordinator = ExportCoordinator::new(clock.clone(), config.capabilities(false));
    assert_eq!(coordinator.layout(), MenuLayout::Menu);

    coordinator.trigger(&mut host);
    coordinator.focus_item(MenuItem::Table);
    coordinator.select(MenuItem::Table, &mut host);

    assert_eq!(host.csv_files, vec!["signups,signups_prev\n150,100\n".to_string()]);
    assert_eq!(coordinator.phase(), Phase::Closed);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn png_waits_for_the_menu_to_disappear_then_captures_once() {
    let config = config();
    let clock = ManualScheduler::new();
    let mut host = host_for(&config);
    let mut coordinator = ExportCoordinator::new(clock.clone(), config.capabilities(false));

    coordinator.trigger(&mut host);
    coordinator.focus_item(MenuItem::Snapshot);
    coordinator.select(MenuItem::Snapshot, &mut host);
    assert_eq!(coordinator.phase(), Phase::Preparing);
    assert!(!coordinator.state().menu_open);
    assert!(host.captures.is_empty());

    for timer in clock.advance(CAPTURE_DELAY - Duration::from_millis(1)) {
        coordinator.timer_fired(timer, &mut host);
    }
    assert!(host.captures.is_empty(), "captured before the delay elapsed");

    for timer in clock.advance(Duration::from_millis(1)) {
        coordinator.timer_fired(timer, &mut host);
    }
    assert_eq!(host.captures.len(), 1);

    // Triggering while preparing does nothing.
    coordinator.trigger(&mut host);
    assert_eq!(coordinator.phase(), Phase::Preparing);

    let svg = svg_markup(host.scene.as_ref().unwrap());
    assert!(svg.contains(">150<"));
    assert!(svg.contains("vs last week"));

    let ticket = host.captures[0];
    assert!(coordinator.finish_capture(ticket, Ok(svg.len())));
    assert_eq!(coordinator.phase(), Phase::Closed);
    assert!(!coordinator.finish_capture(ticket, Ok(0usize)));
}

#[test]
fn leaving_the_menu_closes_it_after_the_grace_period() {
    let config = config();
    let clock = ManualScheduler::new();
    let mut host = host_for(&config);
    let mut coordinator = ExportCoordinator::new(clock.clone(), config.capabilities(true));

    coordinator.trigger(&mut host);
    coordinator.focus_item(MenuItem::Table);
    coordinator.blur_item();
    // Focus moves to the next item within the grace period: still open.
    clock.advance(FOCUS_GRACE / 2);
    coordinator.focus_item(MenuItem::TableAll);
    for timer in clock.advance(FOCUS_GRACE) {
        coordinator.timer_fired(timer, &mut host);
    }
    assert_eq!(coordinator.phase(), Phase::Open);

    coordinator.blur_item();
    for timer in clock.advance(FOCUS_GRACE) {
        coordinator.timer_fired(timer, &mut host);
    }
    assert_eq!(coordinator.phase(), Phase::Closed);
    assert_eq!(host.download_all_calls, 0);
}

#[test]
fn single_capability_exports_directly() {
    let config = KpiConfig {
        enable_download_as_png: false,
        ..config()
    };
    let clock = ManualScheduler::new();
    let mut host = host_for(&config);
    let mut coordinator = ExportCoordinator::new(clock.clone(), config.capabilities(false));
    assert_eq!(coordinator.layout(), MenuLayout::Direct(MenuItem::Table));

    coordinator.trigger(&mut host);
    assert_eq!(host.csv_files.len(), 1);
    assert_eq!(coordinator.phase(), Phase::Closed);
}

#[test]
fn nothing_enabled_hides_the_trigger() {
    let caps = Capabilities::default();
    assert_eq!(caps.layout(), MenuLayout::Hidden);
    let clock = ManualScheduler::new();
    let mut host = host_for(&config());
    let mut coordinator = ExportCoordinator::new(clock.clone(), caps);
    coordinator.trigger(&mut host);
    assert_eq!(coordinator.phase(), Phase::Closed);
    assert!(host.csv_files.is_empty());
    assert_eq!(clock.pending(), 0);
}
