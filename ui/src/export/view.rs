use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use futures::future::{abortable, AbortHandle};
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use super::coordinator::{
    Capabilities, CaptureTicket, ExportCoordinator, ExportHost, ExportState, MenuItem, MenuLayout,
    Scheduler, Timer,
};
use super::download::Delivery;
use super::error::ExportError;
use super::snapshot::{export_snapshot, SnapshotRegion};
use super::table::{export_table, TableSource};
use crate::core::{platform, timing};
use crate::kpi::data::ResultSet;
use crate::t;

/// Everything an export needs from the card. The card derives it in a memo,
/// so it only changes when configuration, theme or results do.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportInputs {
    /// Filename seed, usually the card title.
    pub name: String,
    pub table: Option<TableSource>,
    pub baseline: Option<ResultSet>,
    pub region: Option<SnapshotRegion>,
}

#[derive(Debug)]
enum MenuEvent {
    Trigger,
    Select(MenuItem),
    Focus(MenuItem),
    Blur,
    Escape,
    Timer(Timer),
    CaptureFinished(CaptureTicket, Result<Delivery, ExportError>),
    Capabilities(Capabilities),
    Reset,
}

type SenderSlot = Rc<RefCell<Option<UnboundedSender<MenuEvent>>>>;

fn post(slot: &SenderSlot, event: MenuEvent) {
    if let Some(sender) = slot.borrow().as_ref().cloned() {
        let _ = sender.unbounded_send(event);
    }
}

/// Timers as spawned sleeps that post back into the menu's event loop.
struct UiScheduler {
    sender: SenderSlot,
}

impl Scheduler for UiScheduler {
    type Handle = AbortHandle;

    fn schedule(&mut self, timer: Timer, after: Duration) -> AbortHandle {
        let sender = self.sender.clone();
        let ms = timing::duration_ms(after);
        let (task, handle) = abortable(async move {
            timing::sleep_ms(ms).await;
            post(&sender, MenuEvent::Timer(timer));
        });
        platform::spawn_future(async move {
            let _ = task.await;
        });
        handle
    }

    fn cancel(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}

/// Runs the export effects against the card's current inputs.
struct WidgetHost {
    inputs: Memo<ExportInputs>,
    download_all: CopyValue<Option<EventHandler<()>>>,
    sender: SenderSlot,
}

impl ExportHost for WidgetHost {
    fn export_table(&mut self) -> Result<(), ExportError> {
        let inputs = self.inputs.read();
        export_table(inputs.table.as_ref(), inputs.baseline.as_ref(), &inputs.name).map(|_| ())
    }

    fn export_all(&mut self) -> Result<(), ExportError> {
        let handler = self
            .download_all
            .cloned()
            .ok_or(ExportError::NoSecondaryAction)?;
        handler.call(());
        Ok(())
    }

    fn begin_capture(&mut self, ticket: CaptureTicket) -> Result<(), ExportError> {
        let (region, name) = {
            let inputs = self.inputs.read();
            (inputs.region.clone(), inputs.name.clone())
        };
        let region = region.ok_or(ExportError::RegionUnavailable)?;
        let sender = self.sender.clone();
        platform::spawn_future(async move {
            let outcome = export_snapshot(Some(region), name).await;
            post(&sender, MenuEvent::CaptureFinished(ticket, outcome));
        });
        Ok(())
    }
}

/// Download trigger plus the CSV / PNG menu.
///
/// `state` is written only by this component and can be read by the card,
/// e.g. to hide decorations while a snapshot is prepared.
#[component]
pub fn DownloadMenu(
    capabilities: Capabilities,
    inputs: Memo<ExportInputs>,
    state: Signal<ExportState>,
    on_download_all: Option<EventHandler<()>>,
) -> Element {
    let sender_slot: SenderSlot = use_hook(|| Rc::new(RefCell::new(None)));
    let mut download_all_slot = use_hook(|| CopyValue::new(on_download_all));
    let region_id = inputs.read().region.as_ref().map(|region| region.id);
    let mut last_region = use_hook(|| CopyValue::new(region_id));
    let mut last_capabilities = use_hook(|| CopyValue::new(capabilities));

    download_all_slot.set(on_download_all);

    let coroutine = {
        let sender_slot = sender_slot.clone();
        use_coroutine(move |mut rx: UnboundedReceiver<MenuEvent>| {
            let scheduler = UiScheduler {
                sender: sender_slot.clone(),
            };
            let mut host = WidgetHost {
                inputs,
                download_all: download_all_slot,
                sender: sender_slot.clone(),
            };
            let mut state_signal = state;

            async move {
                // Owned by the loop: unmounting drops it, which cancels its timers.
                let mut coordinator = ExportCoordinator::new(scheduler, capabilities);

                while let Some(event) = rx.next().await {
                    match event {
                        MenuEvent::Trigger => coordinator.trigger(&mut host),
                        MenuEvent::Select(item) => coordinator.select(item, &mut host),
                        MenuEvent::Focus(item) => coordinator.focus_item(item),
                        MenuEvent::Blur => coordinator.blur_item(),
                        MenuEvent::Escape => coordinator.escape(),
                        MenuEvent::Timer(timer) => {
                            coordinator.timer_fired(timer, &mut host);
                        }
                        MenuEvent::CaptureFinished(ticket, outcome) => {
                            coordinator.finish_capture(ticket, outcome);
                        }
                        MenuEvent::Capabilities(next) => coordinator.set_capabilities(next),
                        MenuEvent::Reset => coordinator.reset(),
                    }

                    let next = coordinator.state();
                    if *state_signal.peek() != next {
                        state_signal.set(next);
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(coroutine.tx());

    if last_capabilities.cloned() != capabilities {
        last_capabilities.set(capabilities);
        coroutine.send(MenuEvent::Capabilities(capabilities));
    }
    if last_region.cloned() != region_id {
        // A different region: pending captures refer to something no longer on screen.
        last_region.set(region_id);
        coroutine.send(MenuEvent::Reset);
    }

    let current = state();
    let send = move |event: MenuEvent| coroutine.send(event);

    let activate_keys = move |evt: KeyboardEvent, event: fn() -> MenuEvent, escapable: bool| {
        let key = evt.key().to_string().to_lowercase();
        if key == "enter" || key == " " || key == "space" || key == "spacebar" {
            evt.prevent_default();
            send(event());
        } else if escapable && key == "escape" {
            evt.prevent_default();
            send(MenuEvent::Escape);
        }
    };

    match capabilities.layout() {
        MenuLayout::Hidden => rsx! {},
        MenuLayout::Direct(item) => {
            let label = item_label(item);
            rsx! {
                div { class: "kpi-download",
                    if !current.preparing {
                        div {
                            class: "kpi-download__trigger",
                            role: "button",
                            tabindex: 0,
                            aria_label: "{label}",
                            title: "{label}",
                            onclick: move |_| send(MenuEvent::Trigger),
                            onkeydown: move |evt| activate_keys(evt, || MenuEvent::Trigger, false),
                            ItemIcon { item }
                        }
                    }
                }
            }
        }
        MenuLayout::Menu => {
            let trigger_label = t!("menu-trigger-label");
            let entries: Vec<(usize, MenuItem, &'static str, String)> = capabilities
                .menu_items()
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index, item, item.id(), item_label(item)))
                .collect();
            rsx! {
                div { class: "kpi-download",
                    if !current.preparing {
                        div {
                            class: "kpi-download__trigger",
                            role: "button",
                            tabindex: 0,
                            aria_haspopup: "menu",
                            aria_expanded: "{current.menu_open}",
                            aria_label: "{trigger_label}",
                            onclick: move |_| send(MenuEvent::Trigger),
                            onkeydown: move |evt| activate_keys(evt, || MenuEvent::Trigger, true),
                            EllipsisIcon {}
                        }
                    }
                    if current.menu_open {
                        ul { class: "kpi-download__menu", role: "menu",
                            for (index, item, id, label) in entries {
                                li { key: "{id}",
                                    button {
                                        r#type: "button",
                                        role: "menuitem",
                                        id: "kpi-download-{id}",
                                        class: if current.focused_item == Some(item) {
                                            "kpi-download__item kpi-download__item--focused"
                                        } else {
                                            "kpi-download__item"
                                        },
                                        onmounted: move |evt: MountedEvent| async move {
                                            if index == 0 {
                                                let _ = evt.data().set_focus(true).await;
                                            }
                                        },
                                        onfocus: move |_| send(MenuEvent::Focus(item)),
                                        onblur: move |_| send(MenuEvent::Blur),
                                        onclick: move |evt| {
                                            evt.stop_propagation();
                                            send(MenuEvent::Select(item));
                                        },
                                        onkeydown: move |evt: KeyboardEvent| {
                                            let key = evt.key().to_string().to_lowercase();
                                            if key == "escape" {
                                                evt.prevent_default();
                                                send(MenuEvent::Escape);
                                            }
                                        },
                                        ItemIcon { item }
                                        span { "{label}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn item_label(item: MenuItem) -> String {
    match item {
        MenuItem::Table => t!("menu-download-csv"),
        MenuItem::TableAll => t!("menu-download-all-csv"),
        MenuItem::Snapshot => t!("menu-download-png"),
    }
}

#[component]
fn ItemIcon(item: MenuItem) -> Element {
    let label = match item {
        MenuItem::Table | MenuItem::TableAll => "CSV",
        MenuItem::Snapshot => "PNG",
    };
    rsx! {
        svg {
            class: "kpi-download__icon",
            width: "22",
            height: "16",
            view_box: "0 0 22 16",
            fill: "none",
            rect {
                x: "0.5",
                y: "0.5",
                width: "21",
                height: "15",
                rx: "2",
                stroke: "currentColor",
            }
            text {
                x: "11",
                y: "11",
                text_anchor: "middle",
                font_size: "7",
                fill: "currentColor",
                "{label}"
            }
        }
    }
}

#[component]
fn EllipsisIcon() -> Element {
    rsx! {
        svg {
            class: "kpi-download__icon",
            width: "4",
            height: "16",
            view_box: "0 0 4 16",
            fill: "currentColor",
            circle { cx: "2", cy: "2", r: "1.5" }
            circle { cx: "2", cy: "8", r: "1.5" }
            circle { cx: "2", cy: "14", r: "1.5" }
        }
    }
}
