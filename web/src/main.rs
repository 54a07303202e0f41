use dioxus::prelude::*;

use ui::demo::Showcase;

fn main() {
    ui::logging::init();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    rsx! {
        document::Style { "{ui::KPI_CSS}" }
        Showcase {}
    }
}
