// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Instrumentation table
//!
//! The set of wrapped APIs is data: each [`Binding`] names an in-page target,
//! the properties to wrap on it and the category its events belong to.

use serde::{Deserialize, Serialize};

use crate::capture::Category;

/// In-page object that can be instrumented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    HtmlCanvasElement,
    CanvasRenderingContext2d,
    AudioContext,
    WebGlRenderingContext,
    LocalStorage,
    SessionStorage,
    Navigator,
    Screen,
}

impl Target {
    /// Expression resolving the object inside the page
    ///
    /// Methods and accessors of interface objects live on the prototype, so
    /// that is what gets wrapped. Storage areas are wrapped per instance to
    /// keep `localStorage` and `sessionStorage` apart in the log.
    pub fn expression(&self) -> &'static str {
        match self {
            Target::HtmlCanvasElement => "window.HTMLCanvasElement.prototype",
            Target::CanvasRenderingContext2d => "window.CanvasRenderingContext2D.prototype",
            Target::AudioContext => "window.AudioContext.prototype",
            Target::WebGlRenderingContext => "window.WebGLRenderingContext.prototype",
            Target::LocalStorage => "window.localStorage",
            Target::SessionStorage => "window.sessionStorage",
            Target::Navigator => "window.Navigator.prototype",
            Target::Screen => "window.Screen.prototype",
        }
    }

    /// Name used as the prefix of logged method names
    pub fn display_name(&self) -> &'static str {
        match self {
            Target::HtmlCanvasElement => "HTMLCanvasElement",
            Target::CanvasRenderingContext2d => "CanvasRenderingContext2D",
            Target::AudioContext => "AudioContext",
            Target::WebGlRenderingContext => "WebGLRenderingContext",
            Target::LocalStorage => "localStorage",
            Target::SessionStorage => "sessionStorage",
            Target::Navigator => "Navigator",
            Target::Screen => "Screen",
        }
    }
}

/// How the properties of a binding are wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Methods are wrapped and logged as `Object.method`; properties that are
    /// not functions fall back to accessor wrapping under the same name
    Object,
    /// Accessors only, logged under the bare property name. The value is never
    /// probed, since reading an interface getter on its prototype throws.
    Accessor,
}

/// One row of the instrumentation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub target: Target,
    pub properties: Vec<String>,
    pub category: Category,
    pub kind: BindingKind,
}

impl Binding {
    /// Wrap methods of `target`
    pub fn object(target: Target, properties: &[&str], category: Category) -> Self {
        Self {
            target,
            properties: properties.iter().map(|p| p.to_string()).collect(),
            category,
            kind: BindingKind::Object,
        }
    }

    /// Wrap accessors of `target`
    pub fn accessor(target: Target, properties: &[&str], category: Category) -> Self {
        Self {
            target,
            properties: properties.iter().map(|p| p.to_string()).collect(),
            category,
            kind: BindingKind::Accessor,
        }
    }

    /// Names this binding's events are logged under
    pub fn log_names(&self) -> Vec<String> {
        self.properties
            .iter()
            .map(|prop| match self.kind {
                BindingKind::Object => format!("{}.{}", self.target.display_name(), prop),
                BindingKind::Accessor => prop.clone(),
            })
            .collect()
    }
}

/// The fixed instrumentation set
pub fn default_bindings() -> Vec<Binding> {
    vec![
        Binding::object(Target::HtmlCanvasElement, &["toDataURL"], Category::Canvas),
        Binding::object(
            Target::CanvasRenderingContext2d,
            &["fillText", "strokeText"],
            Category::Canvas,
        ),
        Binding::object(Target::AudioContext, &["createAnalyser"], Category::Audio),
        Binding::object(
            Target::WebGlRenderingContext,
            &["readPixels", "getParameter"],
            Category::WebGl,
        ),
        Binding::object(Target::LocalStorage, &["setItem", "getItem"], Category::Misc),
        Binding::object(Target::SessionStorage, &["setItem", "getItem"], Category::Misc),
        Binding::accessor(Target::Navigator, &["userAgent"], Category::Misc),
        Binding::accessor(Target::Navigator, &["language"], Category::Misc),
        Binding::accessor(Target::Navigator, &["languages"], Category::Misc),
        Binding::accessor(Target::Screen, &["colorDepth"], Category::Misc),
    ]
}
