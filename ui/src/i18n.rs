//! Localization for the KPI card.
//!
//! Fluent bundles are embedded from `i18n/<lang>/kpicard-ui.ftl` with
//! `rust-embed` and selected through `i18n-embed`:
//! ```text
//! i18n.toml
//! i18n/
//!   en-US/kpicard-ui.ftl   (fallback/reference)
//!   es-ES/kpicard-ui.ftl
//!   fr-FR/kpicard-ui.ftl
//! ```
//!
//! The selected language also picks the number and date conventions used by
//! the formatter, see [`current_locale`].
//!
//! ```ignore
//! ui::i18n::init(); // idempotent
//! let label = ui::t!("menu-download-csv");
//! let versus = ui::t!("kpi-versus", period = "last week");
//! ```
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{debug, warn};
use unic_langid::{langid, LanguageIdentifier};

use crate::core::locale::Locale;

pub use i18n_embed_fl::fl;

/// Translation lookup through the shared loader.
///
/// ```text
/// t!("menu-download-png")
/// t!("kpi-versus", period = "last month")
/// ```
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; also the `.ftl` file stem in every locale folder.
const DOMAIN: &str = "kpicard-ui";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> =
    Lazy::new(|| FluentLanguageLoader::new(DOMAIN, langid!("en-US")));

static INIT: Once = Once::new();

/// Load bundles for the platform's preferred languages (idempotent).
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match select(&requested) {
            Ok(()) => debug!(?requested, "localization bundles loaded"),
            Err(err) => warn!(error = %err, "language selection failed; using en-US"),
        }
    });
}

/// Switch language at runtime. Unparseable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        debug!(tag, "ignoring unparseable language tag");
        return Ok(());
    };
    select(&[lang])
}

// Values end up in SVG snapshots, where bidi isolation marks would render
// as stray glyphs.
fn select(requested: &[LanguageIdentifier]) -> Result<(), i18n_embed::I18nEmbedError> {
    i18n_embed::select(&*LOADER, &Localizations, requested)?;
    LOADER.set_use_isolating(false);
    Ok(())
}

/// Embedded language tags, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

/// Number/date conventions for the active language.
pub fn current_locale() -> Locale {
    Locale::from_tag(&LOADER.current_language().to_string())
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}
