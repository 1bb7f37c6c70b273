//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};
use resolvenow_core::format::{format_date, format_relative_time};
use resolvenow_core::{Complaint, ComplaintStatus, MenuItem, Priority, Role};

use crate::app::{App, Overlay, Screen, LANDING_OPTIONS};
use crate::form::Form;

// ========== Colors ==========

/// Accent for headers and the app name
const ACCENT: Color = Color::Rgb(0, 180, 180);
/// Border color for the conversation block
const BORDER_MESSAGES: Color = Color::Rgb(80, 160, 80);
/// Border color for the complaint info block
const BORDER_INFO: Color = Color::Rgb(0, 150, 150);
/// Label color for complaint attributes
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Separator color
const SEPARATOR_COLOR: Color = Color::Rgb(60, 60, 60);

fn status_color(status: ComplaintStatus) -> Color {
    match status {
        ComplaintStatus::Pending => Color::Yellow,
        ComplaintStatus::InProgress => Color::Cyan,
        ComplaintStatus::Resolved => Color::Green,
        ComplaintStatus::Closed => Color::DarkGray,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::DarkGray,
        Priority::Medium => Color::White,
        Priority::High => Color::LightRed,
        Priority::Urgent => Color::Red,
    }
}

fn key_span(key: &str) -> Span<'_> {
    Span::styled(key, Style::default().fg(Color::Yellow))
}

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let chunks = Layout::vertical([
        Constraint::Min(5),    // Screen
        Constraint::Length(1), // Notice
        Constraint::Length(1), // Footer
    ])
    .split(area);

    match &app.screen {
        Screen::Landing => render_landing(frame, app, chunks[0]),
        Screen::Login(form) | Screen::SignUp(form) => render_form(frame, form, chunks[0]),
        Screen::Dashboard => render_dashboard(frame, app, chunks[0]),
    }

    render_notice(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    match app.overlay.clone() {
        Overlay::None => {}
        Overlay::Compose(text) => render_compose(frame, &text, area),
        Overlay::StatusPicker(index) => {
            let options: Vec<&str> = ComplaintStatus::ALL.iter().map(|s| s.label()).collect();
            render_picker(frame, " Update Status ", &options, index, area);
        }
        Overlay::AgentPicker(index) => {
            let options: Vec<&str> = app.agents.iter().map(|a| a.name.as_str()).collect();
            render_picker(frame, " Assign to Agent ", &options, index, area);
        }
    }
}

/// Center a fixed-size box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

// ============================================
// Landing and auth forms
// ============================================

fn render_landing(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "ResolveNow",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Customer complaints, tracked to resolution",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    for (i, option) in LANDING_OPTIONS.iter().enumerate() {
        let style = if i == app.landing_index {
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan)
        } else {
            Style::default()
        };
        let marker = if i == app.landing_index { "▶ " } else { "  " };
        lines.push(Line::from(Span::styled(format!("{}{}", marker, option), style)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, centered(area, 48, 9));
}

fn render_form(frame: &mut Frame, form: &Form, area: Rect) {
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let marker = if focused { "▶ " } else { "  " };
            let value_style = if focused {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let cursor = if focused && matches!(field.input, crate::form::Input::Text { .. }) {
                "▏"
            } else {
                ""
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<14}", field.label), Style::default().fg(LABEL_COLOR)),
                Span::styled(field.display_value(), value_style),
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(form.title)
        .title_style(Style::default().fg(ACCENT).bold());
    let height = form.fields.len() as u16 + 2;
    frame.render_widget(
        Paragraph::new(lines).block(block),
        centered(area, 64.min(area.width), height.min(area.height)),
    );
}

// ============================================
// Dashboard
// ============================================

fn render_dashboard(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(5),    // Body
    ])
    .split(area);

    render_header(frame, app, chunks[0]);

    let body = Layout::horizontal([
        Constraint::Length(24), // Sidebar
        Constraint::Min(20),    // Main
    ])
    .split(chunks[1]);

    render_sidebar(frame, app, body[0]);

    match app.view {
        MenuItem::SubmitComplaint => {
            let form = app.submit_form.clone();
            render_form(frame, &form, body[1]);
        }
        MenuItem::ManageUsers => render_users(frame, app, body[1]),
        MenuItem::MyComplaints | MenuItem::AssignedComplaints | MenuItem::AllComplaints => {
            render_complaints_view(frame, app, body[1])
        }
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (name, role) = match &app.user {
        Some(user) => (user.name.as_str(), user.role.display_name()),
        None => ("", ""),
    };
    let header = Line::from(vec![
        Span::styled(" ResolveNow", Style::default().fg(ACCENT).bold()),
        Span::styled("  │  ", Style::default().fg(SEPARATOR_COLOR)),
        Span::styled(name, Style::default().fg(Color::White).bold()),
        Span::styled(format!(" ({})", role), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .menu()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let active = *item == app.view;
            let style = if active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(item.label(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Menu "),
    );
    frame.render_widget(list, area);
}

fn render_complaints_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Stats
        Constraint::Min(5),    // Table + detail
    ])
    .split(area);

    render_stats(frame, app, chunks[0]);

    let panes = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_complaint_table(frame, app, panes[0]);
    render_complaint_detail(frame, app, panes[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let counts = app.counts;
    let mut spans = vec![
        Span::styled(" Total ", Style::default().fg(Color::DarkGray)),
        Span::styled(counts.total.to_string(), Style::default().bold()),
    ];
    for status in ComplaintStatus::ALL {
        spans.push(Span::styled("  │  ", Style::default().fg(SEPARATOR_COLOR)));
        spans.push(Span::styled(
            format!("● {} ", status.label()),
            Style::default().fg(status_color(status)),
        ));
        spans.push(Span::styled(
            counts.get(status).to_string(),
            Style::default().bold(),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", app.view.label()));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_complaint_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let show_customer = app.user.as_ref().map(|u| u.role) != Some(Role::Customer);

    let mut headers = vec!["ID", "Title", "Status", "Priority"];
    if show_customer {
        headers.push("Customer");
    }
    headers.push("Agent");
    headers.push("Created");

    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    )
    .height(1);

    let rows = app.complaints.iter().map(|c| {
        let mut cells = vec![
            Cell::from(c.id.clone()),
            Cell::from(c.title.clone()),
            Cell::from(c.status.label()).style(Style::default().fg(status_color(c.status))),
            Cell::from(c.priority.as_str()).style(Style::default().fg(priority_color(c.priority))),
        ];
        if show_customer {
            cells.push(Cell::from(c.customer_name.clone()));
        }
        cells.push(match &c.assigned_agent {
            Some(agent) => Cell::from(agent.clone()),
            None => Cell::from("unassigned").style(Style::default().fg(Color::DarkGray)),
        });
        cells.push(Cell::from(format_relative_time(c.created_at)));
        Row::new(cells)
    });

    let mut widths = vec![
        Constraint::Length(10), // ID
        Constraint::Fill(1),    // Title (flexible)
        Constraint::Length(12), // Status
        Constraint::Length(8),  // Priority
    ];
    if show_customer {
        widths.push(Constraint::Length(12));
    }
    widths.push(Constraint::Length(12)); // Agent
    widths.push(Constraint::Length(9)); // Created

    let empty = app.complaints.is_empty();
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Complaints "),
        )
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);

    if empty {
        let inner = centered(area, 30, 1);
        frame.render_widget(
            Paragraph::new("No complaints yet")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
    }
}

fn render_complaint_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(complaint) = app.selected_complaint() else {
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Details "),
            area,
        );
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(8), // Info
        Constraint::Min(3),    // Conversation
    ])
    .split(area);

    render_complaint_info(frame, complaint, chunks[0]);
    render_conversation(frame, app, complaint, chunks[1]);
}

fn render_complaint_info(frame: &mut Frame, complaint: &Complaint, area: Rect) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(LABEL_COLOR));
    let contact = if complaint.contact_phone.is_empty() {
        "-".to_string()
    } else {
        complaint.contact_phone.clone()
    };

    let lines = vec![
        Line::from(Span::styled(
            complaint.title.clone(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(vec![
            label("Status    "),
            Span::styled(
                complaint.status.label(),
                Style::default().fg(status_color(complaint.status)),
            ),
            label("   Priority "),
            Span::styled(
                complaint.priority.as_str(),
                Style::default().fg(priority_color(complaint.priority)),
            ),
        ]),
        Line::from(vec![
            label("Category  "),
            Span::raw(complaint.category.display_name()),
        ]),
        Line::from(vec![
            label("Customer  "),
            Span::raw(format!(
                "{} <{}>",
                complaint.customer_name, complaint.customer_email
            )),
        ]),
        Line::from(vec![label("Contact   "), Span::raw(contact)]),
        Line::from(vec![
            label("Created   "),
            Span::raw(format_date(complaint.created_at)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_INFO))
        .title(format!(" {} ", complaint.id));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_conversation(frame: &mut Frame, app: &App, complaint: &Complaint, area: Rect) {
    let me = app.user.as_ref().map(|u| u.name.as_str()).unwrap_or("");

    let mut lines: Vec<Line> = Vec::new();
    for message in &complaint.messages {
        let sender_color = if message.sender == me {
            Color::Cyan
        } else {
            Color::Green
        };
        lines.push(Line::from(vec![
            Span::styled(message.sender.clone(), Style::default().fg(sender_color).bold()),
            Span::styled(
                format!("  {}", message.time),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(message.message.clone()));
        lines.push(Line::from(""));
    }

    // Keep the newest messages in view
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_MESSAGES))
        .title(format!(" Conversation ({}) ", complaint.messages.len()));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn render_users(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let header_style = Style::default().fg(Color::Yellow).bold();

    let agent_rows = app.agents.iter().map(|a| {
        let active = app
            .complaints
            .iter()
            .filter(|c| c.is_assigned_to(&a.name) && c.status == ComplaintStatus::InProgress)
            .count();
        Row::new([
            Cell::from(a.name.clone()),
            Cell::from(a.email.clone()),
            Cell::from(a.mobile.clone()),
            Cell::from(active.to_string()),
        ])
    });
    let agents = Table::new(
        agent_rows,
        [
            Constraint::Length(16),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(["Name", "Email", "Mobile", "Active"].map(|h| Cell::from(h).style(header_style))))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" Agents ({}) ", app.agents.len())),
    );
    frame.render_widget(agents, chunks[0]);

    let customer_rows = app.customers.iter().map(|c| {
        Row::new([
            Cell::from(c.name.clone()),
            Cell::from(c.email.clone()),
            Cell::from(c.phone.clone()),
            Cell::from(c.complaint_count.to_string()),
            Cell::from(format_date(c.joined_at)),
            Cell::from(c.status).style(Style::default().fg(Color::Green)),
        ])
    });
    let customers = Table::new(
        customer_rows,
        [
            Constraint::Length(16),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(
        ["Name", "Email", "Phone", "Complaints", "Joined", "Status"]
            .map(|h| Cell::from(h).style(header_style)),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" Customers ({}) ", app.customers.len())),
    );
    frame.render_widget(customers, chunks[1]);
}

// ============================================
// Overlays, notice, footer
// ============================================

fn render_compose(frame: &mut Frame, text: &str, area: Rect) {
    let popup = centered(area, 70.min(area.width), 5);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Message ");
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(text.to_string()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]))
        .wrap(Wrap { trim: false })
        .block(block),
        popup,
    );
}

fn render_picker(frame: &mut Frame, title: &str, options: &[&str], selected: usize, area: Rect) {
    let popup = centered(area, 32, options.len() as u16 + 2);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            if i == selected {
                ListItem::new(format!("▶ {}", option)).style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                ListItem::new(format!("  {}", option))
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title.to_string()),
    );
    frame.render_widget(list, popup);
}

fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };
    let color = if notice.is_error {
        Color::Red
    } else {
        Color::Green
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", notice.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(notice.body.clone()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    let mut hint = |key: &'static str, action: &'static str| {
        spans.push(key_span(key));
        spans.push(Span::raw(format!(" {}  ", action)));
    };

    match (&app.screen, &app.overlay) {
        (Screen::Landing, _) => {
            hint("j/k", "navigate");
            hint("Enter", "select");
            hint("l", "login");
            hint("s", "sign up");
            hint("q", "quit");
        }
        (Screen::Login(_) | Screen::SignUp(_), _) => {
            hint("Tab", "next field");
            hint("←/→", "change role");
            hint("Enter", "submit");
            hint("Esc", "back");
        }
        (Screen::Dashboard, Overlay::Compose(_)) => {
            hint("Enter", "send");
            hint("Esc", "cancel");
        }
        (Screen::Dashboard, Overlay::StatusPicker(_) | Overlay::AgentPicker(_)) => {
            hint("j/k", "choose");
            hint("Enter", "apply");
            hint("Esc", "cancel");
        }
        (Screen::Dashboard, Overlay::None) => match app.view {
            MenuItem::SubmitComplaint => {
                hint("Tab", "next field");
                hint("←/→", "change option");
                hint("Enter", "submit");
                hint("Esc", "back");
            }
            MenuItem::ManageUsers => {
                hint("Tab", "menu");
                hint("r", "refresh");
                hint("o", "logout");
                hint("q", "quit");
            }
            MenuItem::MyComplaints | MenuItem::AssignedComplaints | MenuItem::AllComplaints => {
                hint("Tab", "menu");
                hint("j/k", "navigate");
                match app.user.as_ref().map(|u| u.role) {
                    Some(Role::Customer) => hint("m", "message"),
                    Some(Role::Agent) => {
                        hint("m", "message");
                        hint("s", "status");
                    }
                    Some(Role::Admin) => hint("a", "assign"),
                    None => {}
                }
                hint("o", "logout");
                hint("q", "quit");
            }
        },
    }

    if app.is_list_view() && !app.complaints.is_empty() {
        let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
        spans.push(Span::raw("│ "));
        spans.push(Span::styled(
            format!("{}/{} complaints", selected, app.complaints.len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
