use crate::app::AppState;

/// Starts filing the open project's inbox into its map through the
/// configured reorganizer. The outcome shows up later as a session notice.
pub fn reorganize(app: &mut AppState) {
    app.start_reorganize();
}

pub fn next_project(app: &mut AppState) {
    cycle_project(app, 1);
}

pub fn previous_project(app: &mut AppState) {
    cycle_project(app, -1);
}

fn cycle_project(app: &mut AppState, step: isize) {
    let projects = app.projects();
    if projects.len() < 2 {
        app.set_message("No other projects");
        return;
    }

    let current = app
        .session
        .project()
        .and_then(|p| projects.iter().position(|candidate| candidate == p))
        .unwrap_or(0);
    let len = projects.len() as isize;
    let target = (current as isize + step).rem_euclid(len) as usize;

    // A failed load leaves a notice and keeps the current project.
    let _ = app.open_project(&projects[target]);
}
