// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end
//!
//! Draws the three surfaces with Unicode half-block characters, lists the
//! visible palette widgets in a side panel, and maps keys to widget actions.
//! The event loop here is the UI thread: it drains the render marshaler
//! before every repaint.

use crate::app::{App, WidgetId};
use crate::backends::camera::{Frame, RenderTarget};
use crate::constants::surface::{MAIN_FIT_WIDTH, SIDE_FIT_WIDTH};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame as TermFrame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::info;

/// Input poll timeout; also bounds how stale a repaint can be
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Slider movement per arrow key, as a fraction of the range
const SLIDER_STEP: f64 = 0.05;

const CONTROLS_WIDTH: u16 = 34;

const KEY_HINTS: &str = "c camera | [ ] id | 1 2 3 render | Tab focus | Enter activate | ←→ slider | q quit";

/// Run the terminal UI until the user quits, then close the application
pub fn run(app: &mut App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Stop the pump before leaving the alternate screen
    app.close();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Keyboard focus over the visible interactive widgets
#[derive(Debug, Default)]
struct Focus {
    current: Option<WidgetId>,
}

impl Focus {
    /// Focused widget, falling back to the first focusable one
    fn resolve(&mut self, focusable: &[WidgetId]) -> Option<WidgetId> {
        match self.current {
            Some(id) if focusable.contains(&id) => Some(id),
            _ => {
                self.current = focusable.first().copied();
                self.current
            }
        }
    }

    fn step(&mut self, focusable: &[WidgetId], forward: bool) {
        if focusable.is_empty() {
            self.current = None;
            return;
        }
        let len = focusable.len();
        let pos = self
            .current
            .and_then(|id| focusable.iter().position(|f| *f == id))
            .unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.current = Some(focusable[next]);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut focus = Focus::default();
    app.shown();
    info!(target: "app", title = app.window_title(), "Terminal UI running");

    loop {
        app.update_ui();

        let focusable = app.widgets().interactive_visible();
        let focused = focus.resolve(&focusable);
        terminal.draw(|f| draw(f, app, focused))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(app, &mut focus, &focusable, key) == Flow::Quit
        {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, focus: &mut Focus, focusable: &[WidgetId], key: KeyEvent) -> Flow {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('c') => app.toggle_camera(),
        KeyCode::Char('[') => app.decrease_camera(),
        KeyCode::Char(']') => app.increase_camera(),
        KeyCode::Char(digit @ '1'..='3') => {
            let target = RenderTarget::ALL[(digit as u8 - b'1') as usize];
            app.activate(WidgetId::RenderToggle(target));
        }
        KeyCode::Tab | KeyCode::Down => focus.step(focusable, true),
        KeyCode::BackTab | KeyCode::Up => focus.step(focusable, false),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = focus.resolve(focusable) {
                app.activate(id);
            }
        }
        KeyCode::Left | KeyCode::Right => {
            if let Some(WidgetId::Slider(slot)) = focus.resolve(focusable) {
                let step = if key.code == KeyCode::Right { SLIDER_STEP } else { -SLIDER_STEP };
                app.nudge_slider(slot, step);
            }
        }
        _ => {}
    }
    Flow::Continue
}

fn draw(f: &mut TermFrame<'_>, app: &App, focused: Option<WidgetId>) {
    let [title_area, body, status_area, hints_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    f.render_widget(
        StatusBar {
            message: app.window_title(),
            bg: Color::Blue,
        },
        title_area,
    );

    let [surfaces_area, controls_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(CONTROLS_WIDTH)]).areas(body);
    let [main_area, side_area] = Layout::horizontal([
        Constraint::Ratio(MAIN_FIT_WIDTH, MAIN_FIT_WIDTH + SIDE_FIT_WIDTH),
        Constraint::Ratio(SIDE_FIT_WIDTH, MAIN_FIT_WIDTH + SIDE_FIT_WIDTH),
    ])
    .areas(surfaces_area);
    let [alpha_area, beta_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(side_area);

    for (target, area) in [
        (RenderTarget::Main, main_area),
        (RenderTarget::Alpha, alpha_area),
        (RenderTarget::Beta, beta_area),
    ] {
        let mut title = target.display_name().to_string();
        if !app.render_flags().is_active(target) {
            title.push_str(" (off)");
        }
        let block = Block::bordered().title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(FrameWidget::new(app.surfaces().frame(target)), inner);
    }

    let lines: Vec<Line> = app
        .widgets()
        .interactive_visible()
        .into_iter()
        .map(|id| {
            let style = if Some(id) == focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::styled(control_line(app, id), style)
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Controls")),
        controls_area,
    );

    f.render_widget(
        StatusBar {
            message: &app.status_text(),
            bg: Color::DarkGray,
        },
        status_area,
    );
    f.render_widget(
        StatusBar {
            message: KEY_HINTS,
            bg: Color::Black,
        },
        hints_area,
    );
}

/// One line of the controls panel
fn control_line(app: &App, id: WidgetId) -> String {
    let widgets = app.widgets();
    let text = widgets.text(id);
    let selected = widgets.get(id).map(|s| s.selected).unwrap_or(false);
    let check = if selected { 'x' } else { ' ' };

    match id {
        WidgetId::CameraButton | WidgetId::CameraDecrease | WidgetId::CameraIncrease => {
            format!("[ {} ]", text)
        }
        WidgetId::RenderToggle(target) => {
            let on = if app.render_flags().is_active(target) { 'x' } else { ' ' };
            format!("[{}] render {}", on, text)
        }
        WidgetId::Toggle(_) => format!("[{}] {}", check, text),
        WidgetId::Button(_) => format!("( {} )", text),
        WidgetId::Slider(slot) => {
            let label_id = WidgetId::SliderLabel(slot);
            let label = if widgets.is_visible(label_id) {
                widgets.text(label_id)
            } else {
                text
            };
            let (value, min, max) = widgets
                .get(id)
                .map(|s| (s.value, s.min, s.max))
                .unwrap_or((0.0, 0.0, 1.0));
            format!("{} {} {:.0}", label, slider_bar(value, min, max, 10), value)
        }
        WidgetId::SliderLabel(_) | WidgetId::View(_) | WidgetId::InfoLabel => text.to_string(),
    }
}

fn slider_bar(value: f64, min: f64, max: f64, width: usize) -> String {
    let span = (max - min).max(f64::EPSILON);
    let filled = (((value - min) / span) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled))
}

/// Renders a frame using half-block characters, aspect preserved
struct FrameWidget<'a> {
    frame: &'a Frame,
}

impl<'a> FrameWidget<'a> {
    fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        if frame.is_empty() || area.width == 0 || area.height == 0 {
            let msg = "No image";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default().fg(Color::DarkGray));
            }
            return;
        }

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.sample(src_x, src_y_top);
                let (br, bg, bb) = frame.sample(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Single-line bar with a solid background
struct StatusBar<'a> {
    message: &'a str,
    bg: Color,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(self.bg);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, Style::default().fg(Color::White).bg(self.bg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_bar() {
        assert_eq!(slider_bar(0.0, 0.0, 100.0, 4), "[    ]");
        assert_eq!(slider_bar(50.0, 0.0, 100.0, 4), "[==  ]");
        assert_eq!(slider_bar(100.0, 0.0, 100.0, 4), "[====]");
    }

    #[test]
    fn test_focus_wraps() {
        let ids = [WidgetId::CameraButton, WidgetId::Button(0), WidgetId::Slider(0)];
        let mut focus = Focus::default();
        assert_eq!(focus.resolve(&ids), Some(WidgetId::CameraButton));
        focus.step(&ids, false);
        assert_eq!(focus.current, Some(WidgetId::Slider(0)));
        focus.step(&ids, true);
        assert_eq!(focus.current, Some(WidgetId::CameraButton));

        // A focused widget that disappears falls back to the first one
        focus.current = Some(WidgetId::Toggle(3));
        assert_eq!(focus.resolve(&ids), Some(WidgetId::CameraButton));
    }

    #[test]
    fn test_frame_widget_renders_half_blocks() {
        let frame = Frame::from_rgb(image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30])));
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        FrameWidget::new(&frame).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
    }
}
