pub mod dialog;
pub mod grid;
pub mod keybar;
pub mod layout;
pub mod question;
pub mod statusbar;
pub mod titlebar;

use ratatui::Frame;

use crate::app::App;
use crate::state::Phase;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, app);
    match app.presenter.phase() {
        Phase::Idle => grid::draw_grid(f, layout.main, app),
        Phase::Running { .. } | Phase::Judged { .. } => {
            question::draw_question(f, layout.main, app)
        }
    }
    statusbar::draw_statusbar(f, layout.statusbar, app);
    keybar::draw_keybar(f, layout.keybar, app);

    // Draw dialog overlay if any
    if app.has_dialog() {
        dialog::draw_dialog(f, area, app);
    }
}
