use crate::chart::SpeedChart;
use crate::form::{EditSpeciesForm, FieldError};
use crate::ingest::AnimalRecord;
use crate::species::{Kingdom, Species};
use crate::store;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Catalogue,
    SpeedChart,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Catalogue => Page::SpeedChart,
            Page::SpeedChart => Page::Catalogue,
        }
    }

    pub fn previous(&self) -> Self {
        // two pages: previous is next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Catalogue => "Catalogue",
            Page::SpeedChart => "Speed Chart",
        }
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// One-shot toast: title + description + severity. Dismissed by the next
/// key press.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: &str, description: &str) -> Self {
        Notification {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Success,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Notification {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Error,
        }
    }
}

// ============================================================================
// EDIT DIALOG STATE
// ============================================================================

pub const EDIT_FIELDS: [&str; 5] = [
    "scientific_name",
    "common_name",
    "kingdom",
    "total_population",
    "description",
];

/// Focus index of the Save control, one past the last field.
pub const SAVE_INDEX: usize = EDIT_FIELDS.len();

fn field_label(field: &str) -> &str {
    match field {
        "scientific_name" => "Scientific name",
        "common_name" => "Common name",
        "kingdom" => "Kingdom",
        "total_population" => "Total population",
        "description" => "Description",
        _ => field,
    }
}

pub struct EditDialog {
    pub species_id: String,
    pub form: EditSpeciesForm,
    pub focus: usize,
    pub errors: Vec<FieldError>,
}

impl EditDialog {
    pub fn new(species: &Species) -> Self {
        EditDialog {
            species_id: species.id.clone(),
            form: EditSpeciesForm::from_species(species),
            focus: 0,
            errors: Vec::new(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = if self.focus >= SAVE_INDEX { 0 } else { self.focus + 1 };
    }

    pub fn focus_previous(&mut self) {
        self.focus = if self.focus == 0 { SAVE_INDEX } else { self.focus - 1 };
    }

    pub fn field_value_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.form.scientific_name),
            1 => Some(&mut self.form.common_name),
            2 => Some(&mut self.form.kingdom),
            3 => Some(&mut self.form.total_population),
            4 => Some(&mut self.form.description),
            _ => None,
        }
    }

    pub fn field_value(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.form.scientific_name),
            1 => Some(&self.form.common_name),
            2 => Some(&self.form.kingdom),
            3 => Some(&self.form.total_population),
            4 => Some(&self.form.description),
            _ => None,
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub species: Vec<Species>,
    pub animals: Vec<AnimalRecord>,
    /// Caller-supplied session identity; gates edit-capability exposure
    pub session_id: Option<String>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub edit: Option<EditDialog>,
    /// True while an update submission is outstanding; the save control is
    /// disabled for the duration (cooperative mutual exclusion, not a lock)
    pub submitting: bool,
    pub notification: Option<Notification>,
}

impl App {
    pub fn new(
        species: Vec<Species>,
        animals: Vec<AnimalRecord>,
        session_id: Option<String>,
    ) -> Self {
        let mut state = TableState::default();
        if !species.is_empty() {
            state.select(Some(0));
        }

        Self {
            species,
            animals,
            session_id,
            state,
            current_page: Page::Catalogue,
            show_detail: false,
            edit: None,
            submitting: false,
            notification: None,
        }
    }

    pub fn selected_species(&self) -> Option<&Species> {
        self.state.selected().and_then(|i| self.species.get(i))
    }

    /// Edit capability is exposed only to the record's author. Equality
    /// check at the UI layer only; a real deployment must re-enforce this
    /// in the store.
    pub fn can_edit(&self, species: &Species) -> bool {
        self.session_id.as_deref() == Some(species.author.as_str())
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// Open the edit dialog for the selected record, if permitted.
    pub fn open_edit(&mut self) {
        let Some(species) = self.selected_species() else {
            return;
        };
        if !self.can_edit(species) {
            return;
        }
        self.edit = Some(EditDialog::new(species));
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validate and submit the edit dialog's form.
    ///
    /// Validation failure: per-field errors stay on the dialog, nothing is
    /// sent. Store failure: error toast with the store's message, dialog
    /// stays open for retry, no refresh. Success: success toast, dialog
    /// closes, and the species list is re-fetched from the store (the
    /// snapshot is never patched locally).
    pub fn submit_edit(&mut self, conn: &Connection) {
        if self.submitting {
            return;
        }

        let (species_id, values) = {
            let Some(edit) = self.edit.as_mut() else {
                return;
            };
            match edit.form.validate() {
                Err(errors) => {
                    edit.errors = errors;
                    return;
                }
                Ok(values) => (edit.species_id.clone(), values),
            }
        };

        self.submitting = true;
        let result = store::update_species(conn, &species_id, &values);
        self.submitting = false;

        match result {
            Ok(()) => {
                self.notification =
                    Some(Notification::success("Saved", "Species updated successfully."));
                self.edit = None;
                self.refresh_species(conn);
            }
            Err(e) => {
                self.notification = Some(Notification::error("Update failed", &e.to_string()));
            }
        }
    }

    /// Re-fetch the catalogue snapshot from the store.
    pub fn refresh_species(&mut self, conn: &Connection) {
        match store::list_species(conn) {
            Ok(species) => {
                self.species = species;
                let len = self.species.len();
                match self.state.selected() {
                    Some(i) if len > 0 => self.state.select(Some(i.min(len - 1))),
                    _ if len > 0 => self.state.select(Some(0)),
                    _ => self.state.select(None),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to refresh species list");
            }
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.species.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.species.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

// ============================================================================
// EVENT LOOP
// ============================================================================

pub fn run_ui(app: &mut App, conn: &Connection) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, conn);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    conn: &Connection,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // toasts are one-shot: any key dismisses, then the key applies
            app.notification = None;

            if app.edit.is_some() {
                handle_edit_key(app, conn, key.code);
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => {
                    if app.show_detail {
                        app.show_detail = false;
                    } else {
                        return Ok(());
                    }
                }
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Enter if app.current_page == Page::Catalogue => app.toggle_detail(),
                KeyCode::Char('e') if app.show_detail => app.open_edit(),
                KeyCode::Char('r') => app.refresh_species(conn),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.species.is_empty() {
                        app.state.select(Some(app.species.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn handle_edit_key(app: &mut App, conn: &Connection, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => {
            let at_save = app
                .edit
                .as_ref()
                .map(|e| e.focus == SAVE_INDEX)
                .unwrap_or(false);
            if at_save {
                app.submit_edit(conn);
            } else if let Some(edit) = app.edit.as_mut() {
                edit.focus_next();
            }
        }
        KeyCode::Up => {
            if let Some(edit) = app.edit.as_mut() {
                edit.focus_previous();
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            if let Some(edit) = app.edit.as_mut() {
                edit.focus_next();
            }
        }
        KeyCode::Backspace => {
            if let Some(edit) = app.edit.as_mut() {
                let focus = edit.focus;
                if let Some(value) = edit.field_value_mut(focus) {
                    value.pop();
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(edit) = app.edit.as_mut() {
                let focus = edit.focus;
                if let Some(value) = edit.field_value_mut(focus) {
                    value.push(c);
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Catalogue => {
            if app.show_detail {
                let content_chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Percentage(60), // Species list
                        Constraint::Percentage(40), // Detail panel
                    ])
                    .split(chunks[1]);

                render_species_table(f, content_chunks[0], app);
                render_detail_panel(f, content_chunks[1], app);
            } else {
                render_species_table(f, chunks[1], app);
            }
        }
        Page::SpeedChart => render_chart_page(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if app.edit.is_some() {
        render_edit_dialog(f, app);
    }

    if let Some(notification) = app.notification.clone() {
        render_notification(f, &notification);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Catalogue, Page::SpeedChart];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Species: {}", app.species.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Ranked animals: {}", app.animals.len()),
        Style::default().fg(Color::White),
    ));
    if let Some(session) = &app.session_id {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Signed in: {}", truncate(session, 12)),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Species Atlas "),
    );

    f.render_widget(header, area);
}

fn kingdom_color(kingdom: Kingdom) -> Color {
    match kingdom {
        Kingdom::Animalia => Color::Yellow,
        Kingdom::Plantae => Color::Green,
        Kingdom::Fungi => Color::Magenta,
        Kingdom::Protista => Color::Cyan,
        Kingdom::Archaea => Color::Red,
        Kingdom::Bacteria => Color::Blue,
    }
}

fn render_species_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Scientific Name", "Common Name", "Kingdom", "Population"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.species.iter().map(|species| {
        let cells = vec![
            Cell::from(truncate(&species.scientific_name, 28)).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::ITALIC),
            ),
            Cell::from(truncate(species.common_name.as_deref().unwrap_or("—"), 24)),
            Cell::from(species.kingdom.as_str())
                .style(Style::default().fg(kingdom_color(species.kingdom))),
            Cell::from(fmt_population(species.total_population)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(26),
            Constraint::Length(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Species "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let species = match app.selected_species() {
        Some(s) => s,
        None => {
            let no_selection = Paragraph::new("No species selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Species Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                species.display_name().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!("({})", species.scientific_name),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Scientific name: ", label),
            Span::raw(species.scientific_name.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Common name: ", label),
            Span::raw(species.common_name.clone().unwrap_or_else(|| "—".to_string())),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total population: ", label),
            Span::raw(fmt_population(species.total_population)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Kingdom: ", label),
            Span::styled(
                species.kingdom.as_str(),
                Style::default().fg(kingdom_color(species.kingdom)),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("  Description:", label)]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                species
                    .description
                    .clone()
                    .unwrap_or_else(|| "—".to_string()),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
    ];

    if app.can_edit(species) {
        content.push(Line::from(vec![Span::styled(
            "  Press e to edit",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )]));
    }

    let detail_panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Species Details "),
    );

    f.render_widget(detail_panel, area);
}

fn render_chart_page(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Top Animal Speeds ");
    let inner = block.inner(area);

    f.render_widget(block, area);
    f.render_widget(SpeedChart::new(&app.animals), inner);
}

fn render_edit_dialog(f: &mut Frame, app: &App) {
    let Some(edit) = &app.edit else {
        return;
    };

    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);

    let mut content = vec![Line::from("")];

    for (i, field) in EDIT_FIELDS.iter().enumerate() {
        let focused = edit.focus == i;
        let value = edit.field_value(i).unwrap_or("");

        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut value_text = value.to_string();
        if focused {
            value_text.push('▏');
        }

        content.push(Line::from(vec![
            Span::styled(format!("  {:<18}", field_label(field)), label_style),
            Span::styled(value_text, Style::default().fg(Color::White)),
        ]));

        if let Some(error) = edit.error_for(field) {
            content.push(Line::from(vec![Span::styled(
                format!("    ↳ {}", error.message),
                Style::default().fg(Color::Red),
            )]));
        }

        content.push(Line::from(""));
    }

    let save_style = if app.submitting {
        Style::default().fg(Color::DarkGray)
    } else if edit.focus == SAVE_INDEX {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Green)
    };

    let save_label = if app.submitting { "[ Saving… ]" } else { "[ Save ]" };
    content.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(save_label, save_style),
        Span::raw("   "),
        Span::styled(
            "Esc to cancel",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ]));

    let dialog = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Edit Species "),
    );

    f.render_widget(dialog, area);
}

fn render_notification(f: &mut Frame, notification: &Notification) {
    let frame = f.size();
    let width = 44u16.min(frame.width.saturating_sub(2));
    let height = 4u16.min(frame.height.saturating_sub(2));
    if width < 10 || height < 3 {
        return;
    }

    let area = Rect {
        x: frame.width - width - 1,
        y: 1,
        width,
        height,
    };
    f.render_widget(Clear, area);

    let border_color = match notification.severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    };

    let toast = Paragraph::new(vec![Line::from(Span::styled(
        notification.description.clone(),
        Style::default().fg(Color::White),
    ))])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(format!(" {} ", notification.title)),
    );

    f.render_widget(toast, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.edit.is_some() {
        if app.submitting {
            status_spans.push(Span::styled(
                " Saving… ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            status_spans.push(Span::raw("| "));
        }
        status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Field | "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Save | "));
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Cancel"));

        let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );
        f.render_widget(status_bar, area);
        return;
    }

    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    status_spans.push(Span::styled(
        format!(" Row: {}/{} ", selected, app.species.len()),
        Style::default().fg(Color::Cyan),
    ));
    status_spans.push(Span::raw("| "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    if app.show_detail {
        status_spans.push(Span::styled("e", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Edit | "));
    }
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Refresh | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

// ============================================================================
// HELPERS
// ============================================================================

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn fmt_population(value: Option<i64>) -> String {
    match value {
        None => "—".to_string(),
        Some(n) => group_digits(n),
    }
}

/// 1234567 -> "1,234,567"
fn group_digits(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Centered overlay rectangle, sized as percentages of the frame.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{insert_species, setup_database};
    use ratatui::backend::TestBackend;

    fn seeded_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let lion = Species {
            id: "lion-id".to_string(),
            scientific_name: "Panthera leo".to_string(),
            common_name: Some("Lion".to_string()),
            kingdom: Kingdom::Animalia,
            total_population: Some(20_000),
            description: None,
            author: "user-1".to_string(),
        };
        let zebra = Species {
            id: "zebra-id".to_string(),
            scientific_name: "Equus quagga".to_string(),
            common_name: Some("Plains zebra".to_string()),
            kingdom: Kingdom::Animalia,
            total_population: None,
            description: None,
            author: "user-2".to_string(),
        };
        assert!(insert_species(&conn, &lion).unwrap());
        assert!(insert_species(&conn, &zebra).unwrap());

        conn
    }

    fn app_for(conn: &Connection, session_id: Option<&str>) -> App {
        let species = store::list_species(conn).unwrap();
        App::new(species, Vec::new(), session_id.map(|s| s.to_string()))
    }

    fn select_by_id(app: &mut App, id: &str) {
        let index = app.species.iter().position(|s| s.id == id).unwrap();
        app.state.select(Some(index));
    }

    #[test]
    fn test_edit_capability_gated_on_author_identity() {
        let conn = seeded_store();

        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        assert!(app.can_edit(app.selected_species().unwrap()));

        select_by_id(&mut app, "zebra-id");
        assert!(!app.can_edit(app.selected_species().unwrap()));

        let anonymous = app_for(&conn, None);
        assert!(!anonymous.can_edit(&anonymous.species[0]));
    }

    #[test]
    fn test_open_edit_refused_for_non_author() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));

        select_by_id(&mut app, "zebra-id");
        app.open_edit();
        assert!(app.edit.is_none());

        select_by_id(&mut app, "lion-id");
        app.open_edit();
        let edit = app.edit.as_ref().unwrap();
        assert_eq!(edit.species_id, "lion-id");
        assert_eq!(edit.form.scientific_name, "Panthera leo");
    }

    #[test]
    fn test_submit_success_notifies_closes_and_refreshes() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        app.open_edit();

        app.edit.as_mut().unwrap().form.common_name = "African lion".to_string();
        app.submit_edit(&conn);

        let toast = app.notification.as_ref().unwrap();
        assert_eq!(toast.severity, Severity::Success);
        assert!(app.edit.is_none(), "edit surface closes on success");
        assert!(!app.submitting);

        // the snapshot was re-fetched from the store, not patched locally
        let lion = app.species.iter().find(|s| s.id == "lion-id").unwrap();
        assert_eq!(lion.common_name, Some("African lion".to_string()));
    }

    #[test]
    fn test_submit_validation_failure_blocks_submission() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        app.open_edit();

        app.edit.as_mut().unwrap().form.scientific_name = "   ".to_string();
        app.submit_edit(&conn);

        let edit = app.edit.as_ref().unwrap();
        assert_eq!(edit.errors.len(), 1);
        assert_eq!(edit.errors[0].field, "scientific_name");
        assert!(app.notification.is_none(), "nothing was sent to the store");

        // store untouched
        let lion = store::get_species(&conn, "lion-id").unwrap().unwrap();
        assert_eq!(lion.scientific_name, "Panthera leo");
    }

    #[test]
    fn test_submit_store_failure_keeps_dialog_open_without_refresh() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        app.open_edit();

        // collides with the zebra's scientific name
        app.edit.as_mut().unwrap().form.scientific_name = "Equus quagga".to_string();
        app.submit_edit(&conn);

        let toast = app.notification.as_ref().unwrap();
        assert_eq!(toast.severity, Severity::Error);
        assert!(toast.description.contains("UNIQUE"));

        // dialog stays open with form state preserved for retry
        let edit = app.edit.as_ref().unwrap();
        assert_eq!(edit.form.scientific_name, "Equus quagga");

        // no refresh was signaled: the snapshot still shows the old name
        let lion = app.species.iter().find(|s| s.id == "lion-id").unwrap();
        assert_eq!(lion.scientific_name, "Panthera leo");
    }

    #[test]
    fn test_submit_disabled_while_submission_outstanding() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        app.open_edit();

        app.edit.as_mut().unwrap().form.common_name = "Changed".to_string();
        app.submitting = true;
        app.submit_edit(&conn);

        assert!(app.edit.is_some(), "submission refused while one is in flight");
        assert!(app.notification.is_none());
        let lion = store::get_species(&conn, "lion-id").unwrap().unwrap();
        assert_eq!(lion.common_name, Some("Lion".to_string()));
    }

    #[test]
    fn test_refresh_clamps_selection() {
        let conn = seeded_store();
        let mut app = app_for(&conn, None);
        app.state.select(Some(5)); // out of range

        app.refresh_species(&conn);
        assert_eq!(app.state.selected(), Some(1));
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Catalogue.next(), Page::SpeedChart);
        assert_eq!(Page::SpeedChart.next(), Page::Catalogue);
        assert_eq!(Page::Catalogue.previous(), Page::SpeedChart);
    }

    #[test]
    fn test_ui_renders_without_panic() {
        let conn = seeded_store();
        let mut app = app_for(&conn, Some("user-1"));
        select_by_id(&mut app, "lion-id");
        app.show_detail = true;
        app.open_edit();
        app.notification = Some(Notification::error("Update failed", "duplicate key"));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        app.cancel_edit();
        app.notification = None;
        app.current_page = Page::SpeedChart;
        terminal.draw(|f| ui(f, &mut app)).unwrap();
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(20_000), "20,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
    }
}
