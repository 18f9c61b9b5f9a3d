//! Interactive dashboard session driven by `dialoguer` prompts
//!
//! Each action is turned into an [`Interaction`] and the terminal dashboard is
//! redrawn from the session after every step.

use std::path::PathBuf;

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{parse_datetime, stdin_is_terminal};
use crate::cli::viz::render_dashboard;
use crate::core::{BrushWindow, EquipmentFilter, Interaction, Outcome, Session};
use crate::views::{BackendKind, ChartBackend, PlotlyBackend, VegaLiteBackend};

use super::dashboard::export_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Equipment,
    Brush,
    Click,
    Positions,
    Clear,
    Export,
    Quit,
}

impl Action {
    const ALL: [Action; 7] = [
        Action::Equipment,
        Action::Brush,
        Action::Click,
        Action::Positions,
        Action::Clear,
        Action::Export,
        Action::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            Action::Equipment => "Change equipment filter",
            Action::Brush => "Brush a date / measurement window",
            Action::Click => "Click a point",
            Action::Positions => "Select points by position",
            Action::Clear => "Clear selection",
            Action::Export => "Export HTML",
            Action::Quit => "Quit",
        }
    }
}

/// Parse a comma/space separated list of point positions
fn parse_positions(input: &str) -> Result<Vec<usize>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("'{}' is not a point position", s))
        })
        .collect()
}

/// Parse an optional bound; blank means unbounded
fn parse_bound<T>(input: &str, parse: impl Fn(&str) -> Result<T, String>) -> Result<Option<T>, String> {
    let input = input.trim();
    if input.is_empty() {
        Ok(None)
    } else {
        parse(input).map(Some)
    }
}

fn parse_measurement(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", s))
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str) -> Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

fn report(outcome: &Outcome) {
    match (&outcome.rejected, outcome.dashboard.rows_selected) {
        (Some(e), _) => println!("{} Selection ignored: {}", style("!").yellow(), e),
        (None, Some(n)) => println!("{} {} point(s) selected", style("✓").green(), n),
        (None, None) => {}
    }
}

fn choose_equipment(session: &mut Session, theme: &ColorfulTheme) -> Result<Outcome> {
    let ids = session.dataset().equipment_ids();
    let current: Vec<bool> = ids.iter().map(|id| session.equipment().matches(id)).collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Equipment (space to toggle, enter to confirm)")
        .items(&ids)
        .defaults(&current)
        .interact()
        .into_diagnostic()?;

    let filter = if chosen.len() == ids.len() {
        EquipmentFilter::All
    } else {
        EquipmentFilter::only(chosen.into_iter().map(|i| ids[i].clone()))
    };
    Ok(session.handle(Interaction::SetEquipment(filter)))
}

fn brush(session: &mut Session, theme: &ColorfulTheme) -> Result<Outcome> {
    println!(
        "{} Leave a bound blank to leave that side open",
        style("◆").cyan()
    );
    let window = BrushWindow {
        from: parse_bound(&prompt_text(theme, "From (YYYY-MM-DD)")?, parse_datetime)
            .map_err(|e| miette::miette!("{}", e))?,
        to: parse_bound(&prompt_text(theme, "To (YYYY-MM-DD)")?, parse_datetime)
            .map_err(|e| miette::miette!("{}", e))?,
        min: parse_bound(&prompt_text(theme, "Min measurement")?, parse_measurement)
            .map_err(|e| miette::miette!("{}", e))?,
        max: parse_bound(&prompt_text(theme, "Max measurement")?, parse_measurement)
            .map_err(|e| miette::miette!("{}", e))?,
    };
    Ok(session.handle(Interaction::BrushWindow(window)))
}

fn export(session: &Session, backend: BackendKind, theme: &ColorfulTheme) -> Result<()> {
    let chart_backend: Box<dyn ChartBackend> = match backend.chart_backend() {
        Some(b) => b,
        None => {
            let choice = Select::with_theme(theme)
                .with_prompt("Chart library")
                .items(&["plotly", "vega"])
                .default(0)
                .interact()
                .into_diagnostic()?;
            if choice == 0 {
                Box::new(PlotlyBackend)
            } else {
                Box::new(VegaLiteBackend)
            }
        }
    };
    let path: String = Input::with_theme(theme)
        .with_prompt("Output file")
        .default("dashboard.html".to_string())
        .interact_text()
        .into_diagnostic()?;

    export_html(
        session,
        &session.render(),
        chart_backend.as_ref(),
        &PathBuf::from(path),
    )
}

/// Run the prompt loop until the user quits
pub fn run(mut session: Session, backend: BackendKind, width: usize) -> Result<()> {
    if !stdin_is_terminal() {
        return Err(miette::miette!(
            help = "run from a terminal, or drop --interactive",
            "interactive mode needs a terminal"
        ));
    }

    let theme = ColorfulTheme::default();
    choose_equipment(&mut session, &theme)?;

    loop {
        println!();
        println!("{}", render_dashboard(&session.render(), width));
        println!();

        let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
        let picked = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match Action::ALL[picked] {
            Action::Equipment => {
                choose_equipment(&mut session, &theme)?;
            }
            Action::Brush => {
                let outcome = brush(&mut session, &theme)?;
                report(&outcome);
            }
            Action::Click => {
                let len = session.view().len();
                let position: usize = Input::with_theme(&theme)
                    .with_prompt(format!("Point position (0-{})", len.saturating_sub(1)))
                    .interact_text()
                    .into_diagnostic()?;
                let outcome = session.handle(Interaction::Click(position));
                report(&outcome);
            }
            Action::Positions => {
                let text = prompt_text(&theme, "Positions (e.g. 0,3,5)")?;
                match parse_positions(&text) {
                    Ok(positions) => report(&session.handle(Interaction::Brush(positions))),
                    Err(e) => println!("{} {}", style("!").yellow(), e),
                }
            }
            Action::Clear => {
                session.handle(Interaction::ClearSelection);
            }
            Action::Export => export(&session, backend, &theme)?,
            Action::Quit => break,
        }
    }

    Ok(())
}
