#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

#[cfg(feature = "desktop")]
use dioxus::desktop::{tao::window::WindowBuilder, Config};
use dioxus::prelude::*;

use ui::demo::Showcase;

#[cfg(feature = "desktop")]
fn main() {
    ui::logging::init();

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new().with_window(
                WindowBuilder::new()
                    .with_title(format!("Kpicard – v{}", env!("CARGO_PKG_VERSION")))
                    .with_inner_size(dioxus::desktop::tao::dpi::LogicalSize::new(1100.0, 760.0)),
            ),
        )
        .launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    ui::logging::init();
    LaunchBuilder::server().launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    rsx! {
        // Inline so packaged builds need no asset directory.
        document::Style { "{ui::KPI_CSS}" }
        Showcase {}
    }
}
