use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tagarela_core::Message;

use crate::app::{App, InputMode};

const USER_LABEL: &str = "Você";
const BOT_LABEL: &str = "Tagarela";

/// Wrap text to fit within a given width, on word boundaries.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

pub fn render(f: &mut Frame, app: &mut App) {
    let [header_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(f.area());

    render_header(f, app, header_area);
    render_chat(f, app, chat_area);
    render_input(f, app, input_area);

    if app.show_clear_confirm {
        render_clear_confirm(f, f.area());
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_typing() {
        Span::styled("digitando...", Style::default().fg(Color::Yellow))
    } else if app.is_connected() {
        Span::styled("online", Style::default().fg(Color::Green))
    } else {
        Span::styled("offline", Style::default().fg(Color::Red))
    };

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            BOT_LABEL,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(status),
    ]);
    f.render_widget(header, area);
}

fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let (label, label_color) = if message.is_bot {
        (BOT_LABEL, Color::Green)
    } else {
        (USER_LABEL, Color::Cyan)
    };

    // Loaded history renders dimmed; only this session's messages are
    // shown at full intensity.
    let text_style = if message.is_new {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{label}:"),
        Style::default()
            .fg(label_color)
            .add_modifier(Modifier::BOLD),
    ))];

    for wrapped in wrap_text_to_width(&message.text, width.saturating_sub(2)) {
        lines.push(Line::from(Span::styled(format!("  {wrapped}"), text_style)));
    }
    lines.push(Line::from(""));

    lines
}

fn render_chat(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(1) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for message in app.messages() {
        lines.extend(message_lines(message, width));
    }

    if app.is_typing() {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("{BOT_LABEL}:"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  digitando{dots}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let total_lines = lines.len() as u16;
    app.max_scroll = total_lines.saturating_sub(area.height);
    if app.stick_to_bottom {
        app.chat_scroll = app.max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(app.max_scroll);
    }

    let chat = Paragraph::new(Text::from(lines)).scroll((app.chat_scroll, 0));
    f.render_widget(chat, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, border_style) = match app.input_mode {
        InputMode::Editing => (
            " Enter envia · Esc navega ",
            Style::default().fg(Color::Green),
        ),
        InputMode::Normal => (
            " i edita · j/k rola · C limpa · q sai ",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let inner_width = area.width.saturating_sub(2) as usize;

    // Keep the cursor visible when the input outgrows the box.
    let start = app.cursor.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = app.input.chars().skip(start).take(inner_width).collect();

    let input = Paragraph::new(visible)
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
    f.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.show_clear_confirm {
        let cursor_x = area.x + 1 + (app.cursor - start) as u16;
        f.set_cursor(cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1);
    }
}

fn render_clear_confirm(f: &mut Frame, area: Rect) {
    let popup = centered_rect(46, 6, area);
    f.render_widget(Clear, popup);

    let dialog = Paragraph::new(vec![
        Line::from("Tem certeza que deseja apagar todas as"),
        Line::from("mensagens? Esta ação não pode ser desfeita."),
        Line::from(""),
        Line::from(Span::styled(
            "[s] limpar    [n] cancelar",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Limpar conversa "),
    );
    f.render_widget(dialog, popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_word_boundaries() {
        let lines = wrap_text_to_width("uma resposta curta e simpática", 12);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, "uma resposta curta e simpática");
    }

    #[test]
    fn wrap_handles_degenerate_widths() {
        assert_eq!(wrap_text_to_width("oi", 0), vec!["oi".to_string()]);
        assert_eq!(wrap_text_to_width("", 10), vec![String::new()]);
    }
}
