// SPDX-License-Identifier: GPL-3.0-only

//! Widget palette and the hide/show registry
//!
//! The view exposes a fixed palette of named widgets. Applications hide the
//! ones they do not use. Only widgets registered as hidable take part in
//! [`VisibilityRegistry::hide_all`]; a slider is always registered together
//! with its label so the pair changes visibility as one unit.

use crate::backends::camera::RenderTarget;
use crate::constants::palette::{self, SLIDER_MAX, SLIDER_MIN, slot_letter};
use crate::errors::ViewError;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Identifier of one widget in the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetId {
    /// Start/stop trigger
    CameraButton,
    CameraDecrease,
    CameraIncrease,
    /// Render enable toggle of a surface
    RenderToggle(RenderTarget),
    /// Display surface
    View(RenderTarget),
    /// Status text surface
    InfoLabel,
    Button(usize),
    Toggle(usize),
    Slider(usize),
    SliderLabel(usize),
}

impl WidgetId {
    /// Stable name used by view descriptions and logs
    pub fn name(&self) -> String {
        match self {
            WidgetId::CameraButton => "cameraButton".to_string(),
            WidgetId::CameraDecrease => "cameraDecrease".to_string(),
            WidgetId::CameraIncrease => "cameraIncrease".to_string(),
            WidgetId::RenderToggle(t) => format!("render{}Toggle", t.display_name()),
            WidgetId::View(t) => format!("imageView{}", t.display_name()),
            WidgetId::InfoLabel => "infoLabel".to_string(),
            WidgetId::Button(i) => format!("button{}", slot_letter(*i)),
            WidgetId::Toggle(i) => format!("toggle{}", slot_letter(*i)),
            WidgetId::Slider(i) => format!("slider{}", slot_letter(*i)),
            WidgetId::SliderLabel(i) => format!("slider{}Label", slot_letter(*i)),
        }
    }

    /// Inverse of [`name`](Self::name)
    pub fn parse(name: &str) -> Option<WidgetId> {
        WidgetId::standard_palette()
            .into_iter()
            .find(|id| id.name() == name)
    }

    /// Every widget of the standard view in declaration order
    pub fn standard_palette() -> Vec<WidgetId> {
        let mut ids = vec![
            WidgetId::View(RenderTarget::Main),
            WidgetId::View(RenderTarget::Alpha),
            WidgetId::View(RenderTarget::Beta),
            WidgetId::CameraDecrease,
            WidgetId::CameraButton,
            WidgetId::CameraIncrease,
        ];
        ids.extend(RenderTarget::ALL.into_iter().map(WidgetId::RenderToggle));
        ids.extend((0..palette::BUTTONS).map(WidgetId::Button));
        ids.extend((0..palette::TOGGLES).map(WidgetId::Toggle));
        for slot in 0..palette::SLIDERS {
            ids.push(WidgetId::Slider(slot));
            ids.push(WidgetId::SliderLabel(slot));
        }
        ids.push(WidgetId::InfoLabel);
        ids
    }

    /// Widgets every view must provide
    pub fn required() -> Vec<WidgetId> {
        vec![
            WidgetId::CameraButton,
            WidgetId::View(RenderTarget::Main),
            WidgetId::View(RenderTarget::Alpha),
            WidgetId::View(RenderTarget::Beta),
            WidgetId::InfoLabel,
        ]
    }

    /// Whether the user can activate this widget directly
    pub fn is_interactive(&self) -> bool {
        !matches!(
            self,
            WidgetId::View(_) | WidgetId::InfoLabel | WidgetId::SliderLabel(_)
        )
    }

    /// The label that is shown and hidden together with a slider
    pub fn paired_label(&self) -> Option<WidgetId> {
        match *self {
            WidgetId::Slider(slot) => Some(WidgetId::SliderLabel(slot)),
            _ => None,
        }
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Description of which widgets a view provides
#[derive(Debug, Clone)]
pub struct ViewLayout {
    widgets: Vec<WidgetId>,
}

#[derive(Deserialize)]
struct ViewLayoutFile {
    widgets: Vec<String>,
}

impl ViewLayout {
    /// The full palette
    pub fn standard() -> Self {
        Self {
            widgets: WidgetId::standard_palette(),
        }
    }

    pub fn from_names<'a, I>(names: I) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut widgets = Vec::new();
        for name in names {
            let id = WidgetId::parse(name).ok_or_else(|| ViewError::UnknownWidget(name.to_string()))?;
            if !widgets.contains(&id) {
                widgets.push(id);
            }
        }
        Ok(Self { widgets })
    }

    /// Parse a JSON view description: `{ "widgets": ["cameraButton", ...] }`
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        let file: ViewLayoutFile = serde_json::from_str(json)
            .map_err(|e| ViewError::UnknownWidget(format!("invalid view description: {}", e)))?;
        Self::from_names(file.widgets.iter().map(String::as_str))
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains(&id)
    }

    pub fn widgets(&self) -> &[WidgetId] {
        &self.widgets
    }

    /// Fail on the first required widget the view lacks
    pub fn validate_required(&self) -> Result<(), ViewError> {
        match WidgetId::required().into_iter().find(|id| !self.contains(*id)) {
            Some(missing) => Err(ViewError::MissingWidget(missing.name())),
            None => Ok(()),
        }
    }
}

/// Mutable UI state of one widget
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub visible: bool,
    pub text: String,
    /// Toggle selection
    pub selected: bool,
    /// Slider value and range
    pub value: f64,
    pub min: f64,
    pub max: f64,
    /// Surface fit width in pixels, 0 when not a surface
    pub fit_width: u32,
}

impl WidgetState {
    fn for_widget(id: WidgetId) -> Self {
        let text = match id {
            WidgetId::CameraDecrease => "<".to_string(),
            WidgetId::CameraIncrease => ">".to_string(),
            WidgetId::RenderToggle(t) => t.display_name().to_string(),
            WidgetId::View(_) | WidgetId::InfoLabel => String::new(),
            other => other.name(),
        };
        Self {
            visible: true,
            text,
            selected: false,
            value: SLIDER_MIN,
            min: SLIDER_MIN,
            max: SLIDER_MAX,
            fit_width: 0,
        }
    }
}

/// State of every widget in the view, owned by the UI thread
#[derive(Debug, Clone)]
pub struct Widgets {
    order: Vec<WidgetId>,
    states: HashMap<WidgetId, WidgetState>,
}

impl Widgets {
    pub fn from_layout(layout: &ViewLayout) -> Self {
        let order = layout.widgets().to_vec();
        let states = order
            .iter()
            .map(|id| (*id, WidgetState::for_widget(*id)))
            .collect();
        Self { order, states }
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetState> {
        self.states.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetState> {
        self.states.get_mut(&id)
    }

    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.states.get(&id).map(|s| s.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        match self.states.get_mut(&id) {
            Some(state) => state.visible = visible,
            None => warn!(target: "controller", widget = %id, "Widget not present in view"),
        }
    }

    pub fn text(&self, id: WidgetId) -> &str {
        self.states.get(&id).map(|s| s.text.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) {
        match self.states.get_mut(&id) {
            Some(state) => state.text = text.into(),
            None => warn!(target: "controller", widget = %id, "Widget not present in view"),
        }
    }

    /// Widgets in view order
    pub fn ids(&self) -> &[WidgetId] {
        &self.order
    }

    /// Visible widgets the user can focus and activate, in view order
    pub fn interactive_visible(&self) -> Vec<WidgetId> {
        self.order
            .iter()
            .copied()
            .filter(|id| id.is_interactive() && self.is_visible(*id))
            .collect()
    }
}

/// One entry of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidableEntry {
    Single(WidgetId),
    /// Slider and its label, toggled together
    Slider { slider: WidgetId, label: WidgetId },
}

impl HidableEntry {
    fn members(&self) -> impl Iterator<Item = WidgetId> {
        let (first, second) = match *self {
            HidableEntry::Single(id) => (id, None),
            HidableEntry::Slider { slider, label } => (slider, Some(label)),
        };
        std::iter::once(first).chain(second)
    }
}

/// Declares which widgets are hidable, then validates against a view
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<HidableEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget. Sliders are registered with their own label.
    pub fn hidable(mut self, id: WidgetId) -> Self {
        let entry = match id.paired_label() {
            Some(label) => HidableEntry::Slider { slider: id, label },
            None => HidableEntry::Single(id),
        };
        self.entries.push(entry);
        self
    }

    pub fn build(self, widgets: &Widgets) -> Result<VisibilityRegistry, ViewError> {
        for entry in &self.entries {
            match *entry {
                HidableEntry::Single(id) => {
                    if matches!(id, WidgetId::CameraButton | WidgetId::View(_) | WidgetId::InfoLabel) {
                        return Err(ViewError::NotHidable(id.name()));
                    }
                    if !widgets.contains(id) {
                        return Err(ViewError::MissingWidget(id.name()));
                    }
                }
                HidableEntry::Slider { slider, label } => {
                    if !widgets.contains(slider) {
                        return Err(ViewError::MissingWidget(slider.name()));
                    }
                    if !widgets.contains(label) {
                        return Err(ViewError::MissingSliderLabel(slider.name()));
                    }
                }
            }
        }

        debug!(target: "controller", entries = self.entries.len(), "Visibility registry built");

        Ok(VisibilityRegistry {
            entries: self.entries,
        })
    }
}

/// Ordered, immutable set of hidable widgets
#[derive(Debug, Clone, Default)]
pub struct VisibilityRegistry {
    entries: Vec<HidableEntry>,
}

impl VisibilityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Buttons, toggles and sliders of the standard palette, in that order
    pub fn standard() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        for slot in 0..palette::BUTTONS {
            builder = builder.hidable(WidgetId::Button(slot));
        }
        for slot in 0..palette::TOGGLES {
            builder = builder.hidable(WidgetId::Toggle(slot));
        }
        for slot in 0..palette::SLIDERS {
            builder = builder.hidable(WidgetId::Slider(slot));
        }
        builder
    }

    pub fn entries(&self) -> &[HidableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sliders carry their label along whether or not they are registered
    fn set_visible(&self, widgets: &mut Widgets, ids: &[WidgetId], visible: bool) {
        for &id in ids {
            widgets.set_visible(id, visible);
            if let Some(label) = id.paired_label() {
                widgets.set_visible(label, visible);
            }
        }
    }

    pub fn show(&self, widgets: &mut Widgets, ids: &[WidgetId]) {
        self.set_visible(widgets, ids, true);
    }

    pub fn hide(&self, widgets: &mut Widgets, ids: &[WidgetId]) {
        self.set_visible(widgets, ids, false);
    }

    /// Hide every registered widget. Unregistered widgets keep their state.
    pub fn hide_all(&self, widgets: &mut Widgets) {
        for entry in &self.entries {
            for id in entry.members() {
                widgets.set_visible(id, false);
            }
        }
    }
}
