// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Viewer, panel, footer, help, and style helpers used by TUI rendering.
fn render_viewer(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    app.viewer_height = area.height.saturating_sub(2);
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(FOCUS_COLOR));

    let Some(view) = app.current_view() else {
        let empty = Paragraph::new(app.messages.text("viewer.empty"))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let title = viewer_title(&app.messages, view, app.current_file, app.files.len());
    let paragraph = Paragraph::new(viewer_lines(view)).block(block.title(title)).scroll((view.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn viewer_title(messages: &Messages, view: &FileView, index: usize, total: usize) -> String {
    let name = messages.format("viewer.title", &[&view.path.display()]);
    if total > 1 {
        format!("─ {name} ({}/{total}) ─", index + 1)
    } else {
        format!("─ {name} ─")
    }
}

/// Numbered lines; the reported error line is tinted and its column reversed.
fn viewer_lines(view: &FileView) -> Vec<Line<'static>> {
    let width = view.lines.len().max(1).to_string().len();
    let gutter_style = Style::default().fg(Color::DarkGray);
    view.lines
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            let number = idx + 1;
            let gutter = Span::styled(format!("{number:>width$} "), gutter_style);
            match view.location {
                Some(location) if location.line as usize == number => {
                    let mut spans = vec![gutter];
                    spans.extend(location_spans(text, location.column));
                    let spans = spans
                        .into_iter()
                        .map(|span| Span { style: span.style.bg(Color::DarkGray), ..span })
                        .collect::<Vec<_>>();
                    Line::from(spans)
                }
                _ => Line::from(vec![gutter, Span::raw(text.clone())]),
            }
        })
        .collect()
}

fn location_spans(text: &str, column: u32) -> Vec<Span<'static>> {
    let column = (column.max(1) - 1) as usize;
    let before = text.chars().take(column).collect::<String>();
    let at = text.chars().nth(column).map(String::from).unwrap_or_else(|| " ".to_owned());
    let after = text.chars().skip(column + 1).collect::<String>();
    vec![
        Span::raw(before),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ]
}

fn render_diagnostics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let text = app.diagnostics.clone().unwrap_or_default();
    let title = format!("─ {} ─", app.messages.text("diagnostics.title"));
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(DIAGNOSTICS_COLOR))
        .wrap(Wrap { trim: false })
        .scroll((app.diagnostics_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(DIAGNOSTICS_COLOR)),
        );
    frame.render_widget(paragraph, area);
}

fn render_quick_panel(frame: &mut Frame<'_>, panel: &mut QuickPanel, messages: &Messages, main_area: Rect) {
    let area = centered_rect(70, 70, main_area);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("─ {} ─", panel.title))
        .border_style(Style::default().fg(FOCUS_COLOR))
        .title_style(Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let filter = messages.format("panel.filter", &[&panel.query]);
    let filter_width = filter.chars().count() as u16;
    frame.render_widget(Paragraph::new(filter).style(Style::default().fg(FOOTER_LABEL_COLOR)), rows[0]);
    frame.set_cursor(
        rows[0].x.saturating_add(filter_width).min(rows[0].right().saturating_sub(1)),
        rows[0].y,
    );

    if panel.visible.is_empty() {
        let empty = Paragraph::new(messages.text("panel.no_matches"))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, rows[1]);
        return;
    }

    let items = panel
        .visible
        .iter()
        .map(|&idx| ListItem::new(panel.items[idx].clone()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Black).bg(FOCUS_COLOR))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, rows[1], &mut panel.state);
}

fn render_input_panel(frame: &mut Frame<'_>, panel: &InputPanel, main_area: Rect) {
    let width = centered_rect(70, 100, main_area);
    let area = Rect { y: main_area.y + main_area.height.saturating_sub(3) / 2, height: 3.min(main_area.height), ..width };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("─ {} ─", panel.caption))
        .border_style(Style::default().fg(FOCUS_COLOR));
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(panel.value.clone()).block(block), area);

    let cursor_x = inner
        .x
        .saturating_add(panel.value.chars().count() as u16)
        .min(inner.right().saturating_sub(1));
    frame.set_cursor(cursor_x, inner.y);
}

fn notice_line(notice: Option<&Notice>) -> Line<'static> {
    let Some(notice) = notice else {
        return Line::from("");
    };
    let color = match notice.level {
        NoticeLevel::Info => FOOTER_LABEL_COLOR,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::LightRed,
    };
    // Multi-line processor messages are flattened onto the single status row.
    let text = notice.text.lines().map(str::trim).collect::<Vec<_>>().join(" ");
    Line::from(Span::styled(text, Style::default().fg(color)))
}

fn footer_help_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();
    let messages = &app.messages;

    if let Some(run) = app.active.as_ref() {
        let watching = messages.format("footer.running", &[&run.job().output.display()]);
        spans.push(Span::styled(watching, Style::default().fg(Color::Yellow)));
    }
    push_footer_entry_maybe_disabled(
        &mut spans,
        &messages.text("footer.run"),
        "r",
        app.active.is_some(),
    );
    push_footer_entry_maybe_disabled(
        &mut spans,
        &messages.text("footer.diagnostics"),
        "d",
        app.diagnostics.is_none(),
    );
    push_footer_entry_maybe_disabled(&mut spans, &messages.text("footer.edit"), "e", app.files.is_empty());
    push_footer_entry(&mut spans, &messages.text("footer.help"), "?");
    push_footer_entry(&mut spans, &messages.text("footer.quit"), "q");

    if let Some(toast_message) = toast_suffix.strip_prefix(" | ") {
        spans.push(Span::styled(" | ".to_owned(), Style::default().fg(FOOTER_LABEL_COLOR)));
        spans.push(Span::raw(toast_message.to_owned()));
    }

    Line::from(spans)
}

fn footer_brand_line() -> Line<'static> {
    Line::from(vec![Span::styled(FOOTER_BRAND.to_owned(), Style::default().fg(FOOTER_BRAND_COLOR))])
}

fn help_key_style() -> Style {
    Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD)
}

fn help_header_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let vertical_margin = (100u16.saturating_sub(height_percent)) / 2;
    let horizontal_margin = (100u16.saturating_sub(width_percent)) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(vertical_margin),
            Constraint::Percentage(height_percent),
            Constraint::Percentage(vertical_margin),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(horizontal_margin),
            Constraint::Percentage(width_percent),
            Constraint::Percentage(horizontal_margin),
        ])
        .split(vertical[1])[1]
}

fn help_kv(key: &str, desc: &str, key_width: usize, key_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>width$}", width = key_width), key_style),
        Span::raw("  "),
        Span::raw(desc.to_owned()),
    ])
}

fn help_lines(messages: &Messages) -> Vec<Line<'static>> {
    let key_style = help_key_style();
    let header_style = help_header_style();
    let global = [
        ("r", "help.run"),
        ("d", "help.diagnostics"),
        ("y", "help.yank"),
        ("e", "help.edit"),
        ("j/k, PgUp/PgDn, Tab", "help.scroll"),
        ("?", "help.title"),
        ("q", "help.quit"),
    ];
    let panel = [("Enter", "help.panel_select"), ("Esc", "help.panel_cancel"), ("Type", "help.panel_filter")];
    let key_col_width = global.iter().chain(panel.iter()).map(|(key, _)| key.chars().count()).max().unwrap_or(0);

    let mut lines = Vec::<Line<'static>>::new();
    lines.push(Line::from(Span::styled("--- Global ---", header_style)));
    lines.extend(global.iter().map(|(key, desc)| help_kv(key, &messages.text(desc), key_col_width, key_style)));
    lines.push(help_kv("J/K", &messages.text("help.diagnostics"), key_col_width, key_style));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("--- Panels ---", header_style)));
    lines.extend(panel.iter().map(|(key, desc)| help_kv(key, &messages.text(desc), key_col_width, key_style)));
    lines
}

fn render_help(frame: &mut Frame<'_>, app: &mut App, main_area: Rect) {
    let area = centered_rect(70, 70, main_area);
    frame.render_widget(Clear, area);

    let lines = help_lines(&app.messages);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("─ {} ─", app.messages.text("help.title")))
        .border_style(Style::default().fg(FOCUS_COLOR))
        .title_style(Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    app.help_viewport_height = inner.height;
    let max_scroll = lines.len().saturating_sub(inner.height.max(1) as usize).min(u16::MAX as usize) as u16;
    app.help_scroll = app.help_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    push_footer_entry_maybe_disabled(spans, label, value, false);
}

fn push_footer_entry_maybe_disabled(
    spans: &mut Vec<Span<'static>>,
    label: &str,
    value: &str,
    disabled: bool,
) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ".to_owned(), Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.extend(footer_value_spans(value, disabled));
}

fn footer_label_ucfirst(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}

fn footer_value_spans(value: &str, disabled: bool) -> Vec<Span<'static>> {
    let color = if disabled { Color::DarkGray } else { FOOTER_KEY_COLOR };
    vec![Span::styled(value.to_owned(), Style::default().fg(color).add_modifier(Modifier::BOLD))]
}
