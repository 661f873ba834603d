// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for widget visibility as driven by the bundled apps

use cvfx::app::{App, AppSettings, ViewLayout, WidgetId};
use cvfx::backends::camera::RenderTarget;
use cvfx::backends::camera::synthetic::SyntheticBackend;
use cvfx::constants::palette;
use cvfx::errors::ViewError;

fn build(name: &str, layout: &ViewLayout) -> Result<App, ViewError> {
    let resolved = cvfx::demos::registry().resolve(name).unwrap();
    let mut app = App::new(
        resolved,
        layout,
        Box::new(SyntheticBackend::new()),
        AppSettings::default(),
    )?;
    app.initialize()?;
    Ok(app)
}

#[test]
fn test_dev_hides_two_buttons() {
    let app = build("dev", &ViewLayout::standard()).unwrap();
    let widgets = app.widgets();

    assert!(!widgets.is_visible(WidgetId::Button(0)));
    assert!(!widgets.is_visible(WidgetId::Button(1)));
    assert!(widgets.is_visible(WidgetId::Button(2)));
    assert_eq!(widgets.text(WidgetId::Button(0)), "Slider ON");
    assert_eq!(widgets.text(WidgetId::Button(1)), "Slider OFF");
}

#[test]
fn test_mirror_hides_everything_but_toggle_a() {
    let app = build("mirror", &ViewLayout::standard()).unwrap();
    let widgets = app.widgets();

    for slot in 0..palette::BUTTONS {
        assert!(!widgets.is_visible(WidgetId::Button(slot)));
    }
    for slot in 0..palette::SLIDERS {
        assert!(!widgets.is_visible(WidgetId::Slider(slot)));
        assert!(!widgets.is_visible(WidgetId::SliderLabel(slot)));
    }
    assert!(widgets.is_visible(WidgetId::Toggle(0)));
    assert!(!widgets.is_visible(WidgetId::Toggle(1)));

    // Fixed widgets are outside the registry
    assert!(widgets.is_visible(WidgetId::CameraButton));
    assert!(widgets.is_visible(WidgetId::RenderToggle(RenderTarget::Main)));
    assert!(widgets.is_visible(WidgetId::InfoLabel));
}

#[test]
fn test_threshold_shows_slider_with_label() {
    let app = build("threshold", &ViewLayout::standard()).unwrap();
    let widgets = app.widgets();

    assert!(widgets.is_visible(WidgetId::Slider(0)));
    assert!(widgets.is_visible(WidgetId::SliderLabel(0)));
    assert_eq!(widgets.text(WidgetId::SliderLabel(0)), "Threshold");
    assert!(!widgets.is_visible(WidgetId::Slider(1)));
    assert!(!widgets.is_visible(WidgetId::SliderLabel(1)));
    assert!(app.render_flags().is_active(RenderTarget::Beta));
}

#[test]
fn test_view_without_required_widget_is_rejected() {
    let layout = ViewLayout::from_names(["cameraButton", "imageViewMain", "imageViewAlpha", "infoLabel"]).unwrap();
    assert!(matches!(
        build("dev", &layout),
        Err(ViewError::MissingWidget(ref name)) if name == "imageViewBeta"
    ));
}

#[test]
fn test_view_without_slider_label_is_rejected() {
    let names: Vec<String> = WidgetId::standard_palette()
        .into_iter()
        .filter(|id| *id != WidgetId::SliderLabel(6))
        .map(|id| id.name())
        .collect();
    let layout = ViewLayout::from_names(names.iter().map(String::as_str)).unwrap();

    assert!(matches!(
        build("dev", &layout),
        Err(ViewError::MissingSliderLabel(ref name)) if name == "sliderG"
    ));
}
