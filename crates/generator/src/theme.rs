//! Light/dark theme persistence.
//!
//! The browser side is two scripts: [`initial_theme_script`] is inlined at the
//! top of `<body>` and applies the theme before anything paints, and
//! [`toggle_script`] (served as `theme.js`) wires the toggle buttons once the
//! page has loaded. The types in this module model the same rules so they can
//! be exercised without a browser, and [`root_css`] uses them to produce the
//! stylesheet fallback for visitors without scripts.

use folio_core::{Error, Palettes, Result, Theme, ThemeConfig};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;

/// Prefix of the style variable set for each palette entry
pub const COLOR_VAR_PREFIX: &str = "--color-";

/// Root property recording the theme the page started with
pub const INITIAL_THEME_PROPERTY: &str = "--initial-theme";

/// Value given to variables the active palette does not define
pub const UNSET_VALUE: &str = "initial";

/// Client-local storage holding the chosen theme
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

/// In-memory [`ThemeStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl ThemeStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// The OS/browser color-scheme preference
pub trait ColorSchemeProbe {
    /// `None` when the client cannot report a preference
    fn prefers_dark(&self) -> Option<bool>;
}

/// Probe returning a fixed answer
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPreference(pub Option<bool>);

impl ColorSchemeProbe for FixedPreference {
    fn prefers_dark(&self) -> Option<bool> {
        self.0
    }
}

/// Decide the theme a page starts with.
///
/// A persisted `"light"`/`"dark"` wins; the probe is only consulted when
/// nothing usable was persisted. Without any preference the result is light.
pub fn resolve_initial_theme<S, P>(store: &S, storage_key: &str, probe: &P) -> Theme
where
    S: ThemeStore + ?Sized,
    P: ColorSchemeProbe + ?Sized,
{
    if let Some(theme) = store
        .load(storage_key)
        .and_then(|saved| saved.parse::<Theme>().ok())
    {
        return theme;
    }

    match probe.prefers_dark() {
        Some(true) => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Current theme plus the store it is persisted to.
///
/// Owners hand it to whatever needs the theme instead of looking it up
/// globally; interested parties call [`ThemeState::subscribe`] to hear about
/// changes.
#[derive(Debug)]
pub struct ThemeState<S> {
    storage_key: String,
    current: Theme,
    store: S,
    changes: broadcast::Sender<Theme>,
}

impl<S: ThemeStore> ThemeState<S> {
    pub fn load<P>(store: S, storage_key: impl Into<String>, probe: &P) -> Self
    where
        P: ColorSchemeProbe + ?Sized,
    {
        let storage_key = storage_key.into();
        let current = resolve_initial_theme(&store, &storage_key, probe);
        let (changes, _) = broadcast::channel(16);
        Self {
            storage_key,
            current,
            store,
            changes,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn is_dark(&self) -> bool {
        self.current == Theme::Dark
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Theme> {
        self.changes.subscribe()
    }

    /// Switch to `theme`, persist it, and notify subscribers
    pub fn set(&mut self, theme: Theme) {
        self.current = theme;
        self.store.save(&self.storage_key, theme.as_str());
        // No subscribers is fine
        let _ = self.changes.send(theme);
    }

    pub fn toggle(&mut self) -> Theme {
        let next = self.current.toggled();
        self.set(next);
        next
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Something style variables can be set on, like the document root
pub trait StyleTarget {
    fn set_property(&mut self, name: &str, value: &str);
}

impl StyleTarget for BTreeMap<String, String> {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

pub fn color_var(name: &str) -> String {
    format!("{}{}", COLOR_VAR_PREFIX, name)
}

/// Set one variable per palette entry and record the theme.
///
/// Entries only the other palette defines are reset to [`UNSET_VALUE`].
pub fn apply_theme<T: StyleTarget + ?Sized>(target: &mut T, theme: Theme, palettes: &Palettes) {
    let colors = palettes.get(theme);
    for name in palettes.get(theme.toggled()).keys() {
        if !colors.contains_key(name) {
            target.set_property(&color_var(name), UNSET_VALUE);
        }
    }
    for (name, value) in colors {
        target.set_property(&color_var(name), value);
    }
    target.set_property(INITIAL_THEME_PROPERTY, theme.as_str());
}

/// `:root` rule carrying the variables of `theme`
pub fn root_css(theme: Theme, palettes: &Palettes) -> String {
    let mut vars = BTreeMap::new();
    apply_theme(&mut vars, theme, palettes);

    let mut css = String::from(":root {\n");
    for (name, value) in &vars {
        css.push_str(&format!("    {}: {};\n", name, value));
    }
    css.push_str("}\n");
    css
}

#[derive(Serialize)]
struct ScriptData<'a> {
    key: &'a str,
    palettes: &'a Palettes,
}

/// Serialize a value as a JavaScript literal that is safe inside `<script>`
fn js_literal<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| Error::InvalidData(format!("Cannot serialize theme data: {}", e)))?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn script_data(config: &ThemeConfig) -> Result<String> {
    js_literal(&ScriptData {
        key: &config.storage_key,
        palettes: &config.palettes,
    })
}

/// Script inlined before the page content.
///
/// Resolves the theme the same way as [`resolve_initial_theme`] and applies
/// it the same way as [`apply_theme`], synchronously, so the first paint
/// already uses the right colors.
pub fn initial_theme_script(config: &ThemeConfig) -> Result<String> {
    let data = script_data(config)?;
    let light = Theme::Light.as_str();
    let dark = Theme::Dark.as_str();
    let prefix = COLOR_VAR_PREFIX;
    let initial = INITIAL_THEME_PROPERTY;
    let unset = UNSET_VALUE;

    Ok(format!(
        r#"(function () {{
    var data = {data};
    var root = document.documentElement;
    function initialTheme() {{
        try {{
            var persisted = window.localStorage.getItem(data.key);
            if (persisted === '{light}' || persisted === '{dark}') {{
                return persisted;
            }}
        }} catch (e) {{}}
        if (window.matchMedia) {{
            var query = window.matchMedia('(prefers-color-scheme: dark)');
            if (typeof query.matches === 'boolean') {{
                return query.matches ? '{dark}' : '{light}';
            }}
        }}
        return '{light}';
    }}
    var theme = initialTheme();
    var colors = data.palettes[theme];
    var other = data.palettes[theme === '{dark}' ? '{light}' : '{dark}'];
    Object.keys(other).forEach(function (name) {{
        if (!Object.prototype.hasOwnProperty.call(colors, name)) {{
            root.style.setProperty('{prefix}' + name, '{unset}');
        }}
    }});
    Object.keys(colors).forEach(function (name) {{
        root.style.setProperty('{prefix}' + name, colors[name]);
    }});
    root.style.setProperty('{initial}', theme);
}})();"#
    ))
}

/// `theme.js`: wires every `[data-theme-toggle]` button.
///
/// A click flips the theme recorded on the root, persists it, and re-applies
/// the palette.
pub fn toggle_script(config: &ThemeConfig) -> Result<String> {
    let data = script_data(config)?;
    let light = Theme::Light.as_str();
    let dark = Theme::Dark.as_str();
    let prefix = COLOR_VAR_PREFIX;
    let initial = INITIAL_THEME_PROPERTY;
    let unset = UNSET_VALUE;

    Ok(format!(
        r#"(function () {{
    var data = {data};
    var root = document.documentElement;

    function current() {{
        var theme = root.style.getPropertyValue('{initial}').trim();
        return theme === '{dark}' ? '{dark}' : '{light}';
    }}

    function apply(theme) {{
        var colors = data.palettes[theme];
        var other = data.palettes[theme === '{dark}' ? '{light}' : '{dark}'];
        Object.keys(other).forEach(function (name) {{
            if (!Object.prototype.hasOwnProperty.call(colors, name)) {{
                root.style.setProperty('{prefix}' + name, '{unset}');
            }}
        }});
        Object.keys(colors).forEach(function (name) {{
            root.style.setProperty('{prefix}' + name, colors[name]);
        }});
        root.style.setProperty('{initial}', theme);
        document.querySelectorAll('[data-theme-toggle]').forEach(function (button) {{
            var isDark = theme === '{dark}';
            button.setAttribute('aria-pressed', isDark ? 'true' : 'false');
            button.textContent = isDark ? '☀️' : '🌙';
        }});
    }}

    function persist(theme) {{
        try {{
            window.localStorage.setItem(data.key, theme);
        }} catch (e) {{}}
    }}

    function toggle() {{
        var next = current() === '{dark}' ? '{light}' : '{dark}';
        persist(next);
        apply(next);
    }}

    function init() {{
        apply(current());
        document.querySelectorAll('[data-theme-toggle]').forEach(function (button) {{
            button.addEventListener('click', toggle);
        }});
    }}

    if (document.readyState === 'loading') {{
        document.addEventListener('DOMContentLoaded', init);
    }} else {{
        init();
    }}
}})();
"#
    ))
}
