//! Download menu state machine.
//!
//! The coordinator owns the menu's visibility, keyboard focus tracking and
//! the "preparing" flag raised while a snapshot is captured. Every change
//! goes through one of its transition methods; the two deferred steps (the
//! focus grace window and the capture delay) are timers obtained from a
//! [`Scheduler`] and are cancelled whenever a transition supersedes them.
//!
//! ```text
//!            trigger                     select(Snapshot)
//!  Closed ───────────▶ Open ─────────────────────────────▶ Preparing
//!    ▲  ◀─────────────  │  escape / grace / select(Table)      │
//!    │                                                         │
//!    └───────────────── capture finished or failed ◀──────────┘
//! ```

use std::fmt::Debug;
use std::time::Duration;

use tracing::{debug, error, info, warn, Level};

use super::error::ExportError;

/// How long focus may sit outside every menu item before the menu closes.
pub const FOCUS_GRACE: Duration = Duration::from_millis(200);
/// Delay between closing the menu and rasterizing the card, so the closed
/// menu is what gets captured.
pub const CAPTURE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Download the card's rows as CSV.
    Table,
    /// Host-supplied "download all" action.
    TableAll,
    /// Download a PNG of the card.
    Snapshot,
}

impl MenuItem {
    pub fn id(self) -> &'static str {
        match self {
            MenuItem::Table => "csv",
            MenuItem::TableAll => "downloadAll",
            MenuItem::Snapshot => "png",
        }
    }
}

/// Which export actions the widget offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub table: bool,
    pub snapshot: bool,
    /// A secondary "download all" action was supplied by the host.
    pub download_all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuLayout {
    /// Nothing enabled; no trigger is rendered.
    Hidden,
    /// A single action; the trigger fires it without opening a menu.
    Direct(MenuItem),
    Menu,
}

impl Capabilities {
    pub fn layout(&self) -> MenuLayout {
        match (self.table, self.snapshot, self.download_all) {
            (false, false, _) => MenuLayout::Hidden,
            (true, false, false) => MenuLayout::Direct(MenuItem::Table),
            (false, true, _) => MenuLayout::Direct(MenuItem::Snapshot),
            _ => MenuLayout::Menu,
        }
    }

    /// Items listed in the open menu, in display order.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = Vec::with_capacity(3);
        if self.table {
            items.push(MenuItem::Table);
            if self.download_all {
                items.push(MenuItem::TableAll);
            }
        }
        if self.snapshot {
            items.push(MenuItem::Snapshot);
        }
        items
    }

    pub fn offers(&self, item: MenuItem) -> bool {
        match self.layout() {
            MenuLayout::Hidden => false,
            MenuLayout::Direct(only) => only == item,
            MenuLayout::Menu => self.menu_items().contains(&item),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    Open,
    /// A snapshot is scheduled or being captured.
    Preparing,
}

/// Read-only view of the coordinator for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportState {
    pub menu_open: bool,
    pub preparing: bool,
    pub focused_item: Option<MenuItem>,
    /// The capture delay is pending.
    pub download_armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    FocusGrace,
    CaptureDelay,
}

/// A scheduled callback. The token ties it to the arming transition; timers
/// whose token no longer matches are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub kind: TimerKind,
    pub token: u64,
}

/// Identifies one capture so late completions can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket(u64);

/// Source of cancellable one-shot timers. Implementations deliver fired
/// timers back through [`ExportCoordinator::timer_fired`].
pub trait Scheduler {
    type Handle;

    fn schedule(&mut self, timer: Timer, after: Duration) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// The effects a coordinator can request.
pub trait ExportHost {
    fn export_table(&mut self) -> Result<(), ExportError>;
    fn export_all(&mut self) -> Result<(), ExportError>;
    /// Start rasterizing. Completion is reported with
    /// [`ExportCoordinator::finish_capture`].
    fn begin_capture(&mut self, ticket: CaptureTicket) -> Result<(), ExportError>;
}

struct Armed<H> {
    token: u64,
    handle: H,
}

pub struct ExportCoordinator<S: Scheduler> {
    scheduler: S,
    capabilities: Capabilities,
    phase: Phase,
    focused: Option<MenuItem>,
    grace: Option<Armed<S::Handle>>,
    capture_delay: Option<Armed<S::Handle>>,
    in_flight: Option<CaptureTicket>,
    next_token: u64,
}

impl<S: Scheduler> ExportCoordinator<S> {
    pub fn new(scheduler: S, capabilities: Capabilities) -> Self {
        Self {
            scheduler,
            capabilities,
            phase: Phase::Closed,
            focused: None,
            grace: None,
            capture_delay: None,
            in_flight: None,
            next_token: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn layout(&self) -> MenuLayout {
        self.capabilities.layout()
    }

    pub fn state(&self) -> ExportState {
        ExportState {
            menu_open: self.phase == Phase::Open,
            preparing: self.phase == Phase::Preparing,
            focused_item: self.focused,
            download_armed: self.capture_delay.is_some(),
        }
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        if capabilities == self.capabilities {
            return;
        }
        self.capabilities = capabilities;
        if self.phase == Phase::Open && capabilities.layout() != MenuLayout::Menu {
            self.close();
        }
    }

    /// The trigger icon was activated.
    pub fn trigger(&mut self, host: &mut impl ExportHost) {
        if self.phase == Phase::Preparing {
            debug!("export trigger ignored while a snapshot is being prepared");
            return;
        }

        match self.layout() {
            MenuLayout::Hidden => {}
            MenuLayout::Direct(item) => self.run(item, host),
            MenuLayout::Menu => match self.phase {
                Phase::Open => self.close(),
                _ => self.open(),
            },
        }
    }

    /// A menu item was chosen. Only effective while the menu is open.
    pub fn select(&mut self, item: MenuItem, host: &mut impl ExportHost) {
        if self.phase != Phase::Open {
            debug!(item = item.id(), phase = ?self.phase, "menu selection ignored");
            return;
        }
        if !self.capabilities.offers(item) {
            warn!(item = item.id(), "selected export action is not enabled");
            return;
        }
        self.run(item, host);
    }

    pub fn focus_item(&mut self, item: MenuItem) {
        if self.phase != Phase::Open {
            return;
        }
        self.focused = Some(item);
        self.cancel_grace();
    }

    pub fn blur_item(&mut self) {
        if self.phase != Phase::Open {
            return;
        }
        self.focused = None;
        self.arm_grace();
    }

    pub fn escape(&mut self) {
        if self.phase == Phase::Open {
            debug!("menu closed with escape");
            self.close();
        }
    }

    /// Deliver a fired timer. Returns `false` when it was stale.
    pub fn timer_fired(&mut self, timer: Timer, host: &mut impl ExportHost) -> bool {
        match timer.kind {
            TimerKind::FocusGrace => {
                if !take_if_current(&mut self.grace, timer.token) {
                    return false;
                }
                if self.phase == Phase::Open && self.focused.is_none() {
                    debug!("focus left the menu; closing");
                    self.close();
                }
                true
            }
            TimerKind::CaptureDelay => {
                if !take_if_current(&mut self.capture_delay, timer.token) {
                    return false;
                }
                if self.phase != Phase::Preparing {
                    return true;
                }
                let ticket = CaptureTicket(timer.token);
                self.in_flight = Some(ticket);
                if let Err(err) = host.begin_capture(ticket) {
                    report_failure("snapshot capture", &err);
                    self.in_flight = None;
                    self.phase = Phase::Closed;
                }
                true
            }
        }
    }

    /// Report the outcome of a capture. Late reports for a superseded
    /// capture are ignored and `false` is returned.
    pub fn finish_capture<T: Debug>(
        &mut self,
        ticket: CaptureTicket,
        outcome: Result<T, ExportError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(?ticket, "discarding stale capture result");
            return false;
        }
        self.in_flight = None;
        match outcome {
            Ok(delivery) => info!(?delivery, "snapshot export finished"),
            Err(err) => {
                report_failure("snapshot export", &err);
            }
        }
        if self.phase == Phase::Preparing {
            self.phase = Phase::Closed;
        }
        true
    }

    /// Return to `Closed`, cancelling every pending timer and forgetting any
    /// capture in flight.
    pub fn reset(&mut self) {
        self.cancel_grace();
        if let Some(armed) = self.capture_delay.take() {
            self.scheduler.cancel(armed.handle);
        }
        self.in_flight = None;
        self.focused = None;
        self.phase = Phase::Closed;
    }

    fn run(&mut self, item: MenuItem, host: &mut impl ExportHost) {
        match item {
            MenuItem::Table | MenuItem::TableAll => {
                self.close();
                let outcome = if item == MenuItem::Table {
                    host.export_table()
                } else {
                    host.export_all()
                };
                if let Err(err) = outcome {
                    report_failure(item.id(), &err);
                }
            }
            MenuItem::Snapshot => self.prepare_snapshot(),
        }
    }

    fn prepare_snapshot(&mut self) {
        // Close and raise the flag before the delay is armed.
        self.cancel_grace();
        self.focused = None;
        self.phase = Phase::Preparing;

        let token = self.token();
        let handle = self.scheduler.schedule(
            Timer {
                kind: TimerKind::CaptureDelay,
                token,
            },
            CAPTURE_DELAY,
        );
        if let Some(previous) = self.capture_delay.replace(Armed { token, handle }) {
            self.scheduler.cancel(previous.handle);
        }
    }

    fn open(&mut self) {
        self.phase = Phase::Open;
        self.focused = None;
        self.arm_grace();
    }

    fn close(&mut self) {
        self.cancel_grace();
        self.focused = None;
        self.phase = Phase::Closed;
    }

    fn arm_grace(&mut self) {
        self.cancel_grace();
        let token = self.token();
        let handle = self.scheduler.schedule(
            Timer {
                kind: TimerKind::FocusGrace,
                token,
            },
            FOCUS_GRACE,
        );
        self.grace = Some(Armed { token, handle });
    }

    fn cancel_grace(&mut self) {
        if let Some(armed) = self.grace.take() {
            self.scheduler.cancel(armed.handle);
        }
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

impl<S: Scheduler> Drop for ExportCoordinator<S> {
    fn drop(&mut self) {
        self.reset();
    }
}

fn take_if_current<H>(slot: &mut Option<Armed<H>>, token: u64) -> bool {
    if slot.as_ref().is_some_and(|armed| armed.token == token) {
        slot.take();
        true
    } else {
        false
    }
}

/// Wiring mistakes are warnings; anything that broke during the export is an error.
fn report_failure(action: &str, err: &ExportError) -> Level {
    if err.is_configuration() {
        warn!(action, error = %err, "export not possible with this configuration");
        Level::WARN
    } else {
        error!(action, error = %err, "export failed");
        Level::ERROR
    }
}
