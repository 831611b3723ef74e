//! Application bootstrap: routing, locale and session wired into one `App`.
//!
//! # Design
//! `App::mount` follows the front end's startup order. It builds the
//! navigator from the current URL, then (when enabled) resolves the locale
//! and stamps it on the document before anything renders, and finally
//! checks that the mount anchor exists. Any failure aborts startup.
//!
//! Locale changes go through `App::set_locale`, which persists the tag and
//! updates the document language in the same step.

use tracing::{debug, info};

use crate::client::PollClient;
use crate::config::AppConfig;
use crate::error::ShellError;
use crate::i18n::{resolve_locale, I18n, Locale};
use crate::router::{Navigator, RouteMatch, View};
use crate::session::{KeyValueStore, Session};

/// The slice of the host document the shell touches.
pub trait Document {
    fn lang(&self) -> &str;
    fn set_lang(&mut self, lang: &str);
    /// Whether an element matching `selector` exists.
    fn contains(&self, selector: &str) -> bool;
}

/// Document stand-in for native hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    lang: String,
    anchors: Vec<String>,
}

impl MemoryDocument {
    pub fn with_anchor(selector: &str) -> Self {
        Self {
            lang: String::new(),
            anchors: vec![selector.to_string()],
        }
    }
}

impl Document for MemoryDocument {
    fn lang(&self) -> &str {
        &self.lang
    }

    fn set_lang(&mut self, lang: &str) {
        self.lang = lang.to_string();
    }

    fn contains(&self, selector: &str) -> bool {
        self.anchors.iter().any(|a| a == selector)
    }
}

/// What the host knows at startup.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap<'a> {
    /// Current location, e.g. `https://polls.example.com/poll/xyz`.
    pub url: &'a str,
    /// Locale preferred by the platform, such as the browser language.
    pub platform_locale: Option<&'a str>,
    /// `(locale tag, JSON catalog)` pairs to load before the first render.
    pub catalogs: Vec<(&'a str, &'a str)>,
}

#[derive(Debug)]
pub struct App<S, D> {
    config: AppConfig,
    client: PollClient,
    session: Session<S>,
    document: D,
    navigator: Navigator<View>,
    i18n: Option<I18n>,
}

impl<S: KeyValueStore, D: Document> App<S, D> {
    pub fn mount(
        config: AppConfig,
        store: S,
        mut document: D,
        boot: Bootstrap<'_>,
    ) -> Result<Self, ShellError> {
        let navigator = Navigator::new(View::routes(), boot.url);
        let session = Session::with_config(store, &config);

        let i18n = if config.i18n {
            let stored = session.locale()?;
            let locale =
                resolve_locale(stored.as_deref(), boot.platform_locale, &config.default_locale)?;
            let mut i18n = I18n::new(locale, Locale::parse(&config.fallback_locale)?);
            for (tag, json) in &boot.catalogs {
                i18n.add_catalog(Locale::parse(tag)?, json)?;
            }
            document.set_lang(i18n.locale().as_str());
            Some(i18n)
        } else {
            None
        };

        if !document.contains(&config.mount_selector) {
            return Err(ShellError::AnchorNotFound(config.mount_selector.clone()));
        }

        info!(
            location = navigator.location(),
            locale = i18n.as_ref().map(|i| i.locale().as_str()),
            anchor = %config.mount_selector,
            "app mounted"
        );

        Ok(Self {
            client: PollClient::from_config(&config),
            config,
            session,
            document,
            navigator,
            i18n,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &PollClient {
        &self.client
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S> {
        &mut self.session
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn route(&self) -> Option<&RouteMatch<View>> {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &Navigator<View> {
        &self.navigator
    }

    /// Client-side navigation; pushes a history entry.
    pub fn navigate(&mut self, url: &str) -> Option<&RouteMatch<View>> {
        self.navigator.push(url)
    }

    pub fn back(&mut self) -> bool {
        self.navigator.back()
    }

    pub fn forward(&mut self) -> bool {
        self.navigator.forward()
    }

    pub fn i18n(&self) -> Option<&I18n> {
        self.i18n.as_ref()
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.i18n.as_ref().map(I18n::locale)
    }

    /// Translate `key`; returns the key unchanged when i18n is off.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        match &self.i18n {
            Some(i18n) => i18n.translate(key),
            None => key,
        }
    }

    /// Switch the active locale. On change, the tag is persisted under the
    /// locale key and the document language follows. Returns whether
    /// anything changed.
    pub fn set_locale(&mut self, tag: &str) -> Result<bool, ShellError> {
        let Some(i18n) = self.i18n.as_mut() else {
            return Err(ShellError::I18nDisabled);
        };
        let locale = Locale::parse(tag)?;
        if &locale == i18n.locale() {
            return Ok(false);
        }
        self.session.set_locale(locale.as_str())?;
        self.document.set_lang(locale.as_str());
        debug!(from = %i18n.locale(), to = %locale, "locale changed");
        i18n.set_locale(locale);
        Ok(true)
    }
}
