use std::sync::mpsc::Sender;

use alicat_rtu::constants::GAS_INDEX_MAX;
use color_eyre::eyre::{self, WrapErr};
use crossterm::event::KeyCode;

use crate::app::{AppState, InputField, SETPOINT_STEP};
use crate::worker::MonitorCommand;

pub fn handle_key_event(
    code: KeyCode,
    app: &mut AppState,
    command_tx: &Sender<MonitorCommand>,
) -> eyre::Result<bool> {
    if app.input_field.is_some() {
        handle_input_event(code, app, command_tx)?;
        return Ok(false);
    }

    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return Ok(true);
        }
        KeyCode::Left => {
            if app.read_only || !app.device_type.is_controller() {
                return Ok(false);
            }
            if app.setpoint_target > 0.0 {
                let next = (app.setpoint_target - SETPOINT_STEP).max(0.0);
                app.setpoint_target = next;
                send_setpoint(command_tx, next)?;
            }
        }
        KeyCode::Right => {
            if app.read_only || !app.device_type.is_controller() {
                return Ok(false);
            }
            let next = app.setpoint_target + SETPOINT_STEP;
            app.setpoint_target = next;
            send_setpoint(command_tx, next)?;
        }
        KeyCode::Char('s') => {
            if !app.read_only && app.device_type.is_controller() {
                app.input_field = Some(InputField::Setpoint);
                app.input_buffer.clear();
            }
        }
        KeyCode::Char('g') => {
            if !app.read_only && app.device_type.is_mass_flow() {
                app.input_field = Some(InputField::GasNumber);
                app.input_buffer.clear();
            }
        }
        KeyCode::Char('t') => {
            if !app.read_only {
                command_tx.send(MonitorCommand::Tare).wrap_err("send tare")?;
            }
        }
        KeyCode::Char('z') => {
            if !app.read_only
                && (app.device_type.is_mass_flow() || app.device_type.is_liquid())
            {
                command_tx
                    .send(MonitorCommand::ResetTotalizer)
                    .wrap_err("send totalizer reset")?;
            }
        }
        KeyCode::Char('d') => {
            app.show_diagnostics = !app.show_diagnostics;
        }
        _ => {}
    }

    Ok(false)
}

fn handle_input_event(
    code: KeyCode,
    app: &mut AppState,
    command_tx: &Sender<MonitorCommand>,
) -> eyre::Result<()> {
    match code {
        KeyCode::Esc => {
            app.input_field = None;
            app.input_buffer.clear();
        }
        KeyCode::Enter => {
            match app.input_field {
                Some(InputField::Setpoint) => {
                    if let Ok(value) = app.input_buffer.parse::<f32>()
                        && value.is_finite()
                        && value >= 0.0
                    {
                        app.setpoint_target = value;
                        send_setpoint(command_tx, value)?;
                    }
                }
                Some(InputField::GasNumber) => {
                    if let Ok(value) = app.input_buffer.parse::<u16>()
                        && value <= GAS_INDEX_MAX
                    {
                        command_tx
                            .send(MonitorCommand::SetGasNumber(value))
                            .wrap_err("send gas number")?;
                    }
                }
                None => {}
            }
            app.input_field = None;
            app.input_buffer.clear();
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(ch) if accepts_char(app, ch) => {
            if app.input_buffer.len() < 8 {
                app.input_buffer.push(ch);
            }
        }
        _ => {}
    }
    Ok(())
}

fn accepts_char(app: &AppState, ch: char) -> bool {
    ch.is_ascii_digit() || (ch == '.' && app.input_field == Some(InputField::Setpoint))
}

fn send_setpoint(command_tx: &Sender<MonitorCommand>, value: f32) -> eyre::Result<()> {
    command_tx
        .send(MonitorCommand::SetSetpoint(value))
        .wrap_err("send setpoint")
}
