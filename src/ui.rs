use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Wrap,
};
use ratatui::{Frame, symbols};

use crate::app::{AppState, InputField};

pub fn render_ui(frame: &mut Frame, app: &AppState) {
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(10),
    ];
    if app.shows_pressure_chart() {
        constraints.push(Constraint::Length(8));
    }
    constraints.push(Constraint::Length(3));
    if app.show_diagnostics {
        let lines = app.diagnostics.len().clamp(1, 8);
        let height = u16::try_from(lines + 2).unwrap_or(u16::MAX);
        constraints.push(Constraint::Length(height));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let mut index = 0;
    render_header(frame, chunks[index], app);
    index += 1;
    render_status_bar(frame, chunks[index], app);
    index += 1;
    render_process_chart(frame, chunks[index], app);
    index += 1;
    if app.shows_pressure_chart() {
        render_pressure_chart(frame, chunks[index], app);
        index += 1;
    }
    render_alerts(frame, chunks[index], app);
    index += 1;
    if app.show_diagnostics {
        render_diagnostics(frame, chunks[index], app);
        index += 1;
    }
    render_help(frame, chunks[index], app);

    if app.input_field.is_some() {
        render_input_popup(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &AppState) {
    let title = Line::from(vec![
        Span::styled(
            "Alicat RTU Monitor",
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.device_type.to_string(),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let paragraph = Paragraph::new(title).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &AppState) {
    let gray = Style::default().fg(Color::Gray);
    let (connection_text, connection_style) = if app.connected {
        (
            "Connected",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Disconnected",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    };

    let mut spans = vec![
        Span::styled("Link: ", gray),
        Span::styled(connection_text, connection_style),
        Span::raw("  "),
        Span::styled(format!("{}: ", app.process_label()), gray),
        Span::raw(format_reading(app.current_process_value())),
    ];

    if app.device_type.is_controller() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Setpoint: ", gray));
        spans.push(Span::raw(format!("{:.3}", app.setpoint_target)));
    }
    if app.device_type.is_mass_flow() {
        let telemetry = app.telemetry.as_ref();
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Gas: ", gray));
        spans.push(Span::raw(
            telemetry
                .and_then(|t| t.gas_number)
                .map_or_else(|| "--".to_string(), |gas| gas.to_string()),
        ));
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Total: ", gray));
        spans.push(Span::raw(format_reading(
            telemetry.and_then(|t| t.mass_total),
        )));
    }

    let mode_label = if app.simulate { "SIM" } else { "LIVE" };
    let mode_color = if app.simulate {
        Color::Yellow
    } else {
        Color::Blue
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled("Mode: ", gray));
    spans.push(Span::styled(
        mode_label,
        Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        if app.read_only {
            "Read-only"
        } else {
            "Writable"
        },
        Style::default()
            .fg(if app.read_only {
                Color::Yellow
            } else {
                Color::Green
            })
            .add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Status")
            .border_style(Style::default().fg(Color::LightMagenta)),
    );
    frame.render_widget(paragraph, area);
}

fn render_process_chart(frame: &mut Frame, area: Rect, app: &AppState) {
    let measured: Vec<(f64, f64)> = app.process_history.iter().copied().collect();
    let setpoint: Vec<(f64, f64)> = app.setpoint_history.iter().copied().collect();
    let (min_tick, max_tick) = chart_bounds(&measured, area);
    let max_value = series_max(&measured).max(series_max(&setpoint)).max(1.0);

    let mut datasets = Vec::new();
    if app.device_type.is_controller() {
        datasets.push(
            Dataset::default()
                .name("Setpoint")
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(Color::LightYellow))
                .graph_type(GraphType::Line)
                .data(&setpoint),
        );
    }
    datasets.push(
        Dataset::default()
            .name("Measured")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::LightCyan))
            .graph_type(GraphType::Line)
            .data(&measured),
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.process_label())
                .border_style(Style::default().fg(Color::LightCyan)),
        )
        .x_axis(
            Axis::default()
                .bounds([min_tick, max_tick])
                .labels(vec![Span::from("-"), Span::from("+")]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, max_value])
                .labels(vec![Span::from("0"), Span::from(format!("{max_value:.1}"))]),
        );

    frame.render_widget(chart, area);
}

fn render_pressure_chart(frame: &mut Frame, area: Rect, app: &AppState) {
    let data: Vec<(f64, f64)> = app.pressure_history.iter().copied().collect();
    let (min_tick, max_tick) = chart_bounds(&data, area);
    let max_value = series_max(&data).max(1.0);

    let datasets = vec![
        Dataset::default()
            .name("Pressure")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::LightGreen))
            .graph_type(GraphType::Line)
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pressure")
                .border_style(Style::default().fg(Color::LightGreen)),
        )
        .x_axis(
            Axis::default()
                .bounds([min_tick, max_tick])
                .labels(vec![Span::from("-"), Span::from("+")]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, max_value])
                .labels(vec![Span::from("0"), Span::from(format!("{max_value:.1}"))]),
        );

    frame.render_widget(chart, area);
}

fn render_alerts(frame: &mut Frame, area: Rect, app: &AppState) {
    let line = match app.telemetry.as_ref() {
        Some(telemetry) => {
            let active = telemetry.status.active();
            if active.is_empty() {
                if telemetry.status.any_error {
                    Line::from(Span::styled(
                        "fault bits outside the documented set",
                        Style::default().fg(Color::Yellow),
                    ))
                } else {
                    Line::from(Span::styled(
                        "no active faults",
                        Style::default().fg(Color::Gray),
                    ))
                }
            } else {
                Line::from(Span::styled(
                    active.join("; "),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ))
            }
        }
        None => Line::from(Span::styled(
            "no status yet",
            Style::default().fg(Color::Gray),
        )),
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Device Status")
            .border_style(Style::default().fg(Color::LightRed)),
    );
    frame.render_widget(paragraph, area);
}

fn render_diagnostics(frame: &mut Frame, area: Rect, app: &AppState) {
    let visible = usize::from(area.height.saturating_sub(2)).max(1);
    let lines: Vec<Line> = app
        .diagnostics
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|message| Line::from(message.as_str()))
        .collect();
    let lines = if lines.is_empty() {
        vec![Line::from("no diagnostics yet")]
    } else {
        lines
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Diagnostics")
            .border_style(Style::default().fg(Color::LightGreen)),
    );
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = Vec::new();
    if app.device_type.is_controller() {
        spans.push(Span::styled(
            "←/→",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" nudge setpoint  "));
        spans.push(Span::styled(
            "s",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" type setpoint  "));
    }
    if app.device_type.is_mass_flow() {
        spans.push(Span::styled(
            "g",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" gas  "));
        spans.push(Span::styled(
            "z",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" zero total  "));
    }
    spans.push(Span::styled(
        "t",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" tare  "));
    spans.push(Span::styled(
        "d",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" diagnostics  "));
    spans.push(Span::styled(
        "q",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" quit"));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls")
                .border_style(Style::default().fg(Color::LightMagenta)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_input_popup(frame: &mut Frame, app: &AppState) {
    let area = centered_rect(60, 20, frame.area());
    let (title, prompt) = match app.input_field {
        Some(InputField::GasNumber) => ("Gas Number", "Type a gas table index"),
        _ => ("Setpoint", "Type a setpoint value"),
    };
    let buffer = if app.input_buffer.is_empty() {
        "_".to_string()
    } else {
        app.input_buffer.clone()
    };

    let content = vec![
        Line::from(Span::styled(
            prompt,
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Value: ", Style::default().fg(Color::Gray)),
            Span::styled(
                buffer,
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from("Enter to apply, Esc to cancel"),
    ];

    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::LightMagenta)),
    );
    frame.render_widget(paragraph, area);
}

fn format_reading(value: Option<f32>) -> String {
    value.map_or_else(|| "--".to_string(), |value| format!("{value:.3}"))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn chart_bounds(data: &[(f64, f64)], area: Rect) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 1.0);
    }
    let max_tick = data.last().map_or(0.0, |(x, _)| *x).max(1.0);
    let window = f64::from(area.width.saturating_sub(2).max(1));
    let min_tick = if max_tick > window {
        max_tick - window
    } else {
        0.0
    };
    (min_tick, max_tick)
}

fn series_max(data: &[(f64, f64)]) -> f64 {
    data.iter().map(|(_, value)| *value).fold(0.0, f64::max)
}
