use gpui::{App, Hsla, rgb};

/// Palette of the built-in controllers and form chrome.
///
/// Install one with [`FormTheme::init`]; forms rendered without it use the
/// default palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormTheme {
    pub border: Hsla,
    pub border_error: Hsla,
    pub text: Hsla,
    pub muted: Hsla,
    pub accent: Hsla,
    /// Text drawn on an accent background.
    pub on_accent: Hsla,
    pub surface: Hsla,
    pub surface_disabled: Hsla,
}

impl Default for FormTheme {
    fn default() -> Self {
        Self {
            border: rgb(0xd0d5dd).into(),
            border_error: rgb(0xf04438).into(),
            text: rgb(0x101828).into(),
            muted: rgb(0x667085).into(),
            accent: rgb(0x228be6).into(),
            on_accent: rgb(0xffffff).into(),
            surface: rgb(0xffffff).into(),
            surface_disabled: rgb(0xf2f4f7).into(),
        }
    }
}

impl gpui::Global for FormTheme {}

impl FormTheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accent(mut self, color: impl Into<Hsla>) -> Self {
        self.accent = color.into();
        self
    }

    pub fn border(mut self, color: impl Into<Hsla>) -> Self {
        self.border = color.into();
        self
    }

    pub fn error(mut self, color: impl Into<Hsla>) -> Self {
        self.border_error = color.into();
        self
    }

    pub fn text(mut self, color: impl Into<Hsla>) -> Self {
        self.text = color.into();
        self
    }

    pub fn muted(mut self, color: impl Into<Hsla>) -> Self {
        self.muted = color.into();
        self
    }

    pub fn surface(mut self, surface: impl Into<Hsla>, disabled: impl Into<Hsla>) -> Self {
        self.surface = surface.into();
        self.surface_disabled = disabled.into();
        self
    }

    pub fn init(self, cx: &mut App) {
        cx.set_global(self);
    }

    pub fn current(cx: &App) -> Self {
        cx.try_global::<FormTheme>().copied().unwrap_or_default()
    }
}
