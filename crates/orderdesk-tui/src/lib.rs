// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use orderdesk_app::{
    CellValue, ColumnKind, DetailPatch, DetailState, GridCommand, GridEvent, GridOptions,
    GridVariant, HeaderCell, InfoCard, Notice, NoticeLevel, OrderDetail, OrderId, OrderStatus,
    OrdersBackend, OrdersGrid, RemoteCompletion, RemoteJob, SortDirection, StatusTone,
    parse_page_input,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;

const NO_RESULTS: &str = "No results.";
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const NAV_HINT: &str =
    "j/k/h/l | enter details | x status | d delete | s/S sort | c/C cols | / search | [ ] pages | : go | ? help | q";
const DASHBOARD_HINT: &str = "j/k/h/l | s sort | [ ] pages | r reload | esc close";

/// Which grid a remote job belongs to; completions are routed back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTarget {
    Orders,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Remote {
        target: GridTarget,
        completion: RemoteCompletion,
    },
}

pub trait GridRuntime: OrdersBackend {
    /// Runs `job` and reports its completion on `tx`. The default runs the
    /// call inline on the UI thread.
    fn spawn_remote(
        &mut self,
        target: GridTarget,
        job: RemoteJob,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let completion = job.run(&*self);
        tx.send(InternalEvent::Remote { target, completion })
            .map_err(|_| anyhow!("remote event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    PaymentMethod,
    PickupTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailForm {
    field: DetailField,
    payment_method: String,
    pickup_time: String,
}

impl DetailForm {
    fn from_detail(detail: &OrderDetail) -> Self {
        Self {
            field: DetailField::PaymentMethod,
            payment_method: detail.payment_method.clone(),
            pickup_time: detail.pickup_time.clone(),
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            DetailField::PaymentMethod => &mut self.payment_method,
            DetailField::PickupTime => &mut self.pickup_time,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            DetailField::PaymentMethod => DetailField::PickupTime,
            DetailField::PickupTime => DetailField::PaymentMethod,
        };
    }

    fn patch(&self) -> DetailPatch {
        DetailPatch {
            payment_method: Some(self.payment_method.trim().to_owned()),
            pickup_time: Some(self.pickup_time.trim().to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum UiMode {
    #[default]
    Nav,
    Search {
        input: String,
    },
    GoToPage {
        input: String,
    },
    StatusPicker {
        id: OrderId,
        cursor: usize,
    },
    ConfirmDelete {
        id: OrderId,
    },
    EditDetail(DetailForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct GridCursor {
    row: usize,
    column: usize,
}

#[derive(Debug)]
struct Screen {
    grid: OrdersGrid,
    cursor: GridCursor,
}

impl Screen {
    fn new(grid: OrdersGrid) -> Self {
        Self {
            grid,
            cursor: GridCursor::default(),
        }
    }

    fn selected_order_id(&self) -> Option<OrderId> {
        let view = self.grid.view();
        view.rows.get(self.cursor.row).map(|order| order.id.clone())
    }

    fn selected_column_key(&self) -> Option<&'static str> {
        let view = self.grid.view();
        view.headers.get(self.cursor.column).map(|header| header.key)
    }

    fn bounds(&self) -> (usize, usize) {
        let view = self.grid.view();
        (view.rows.len(), view.headers.len())
    }

    fn move_row(&mut self, delta: isize) {
        let (rows, _) = self.bounds();
        self.cursor.row = step(self.cursor.row, delta, rows);
    }

    fn move_column(&mut self, delta: isize) {
        let (_, columns) = self.bounds();
        self.cursor.column = step(self.cursor.column, delta, columns);
    }

    fn clamp_cursor(&mut self) {
        let (rows, columns) = self.bounds();
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.column = self.cursor.column.min(columns.saturating_sub(1));
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

#[derive(Debug)]
struct UiState {
    orders: Screen,
    dashboard: Screen,
    dashboard_visible: bool,
    help_visible: bool,
    mode: UiMode,
    status: Option<Notice>,
    status_token: u64,
}

impl UiState {
    fn new(orders: OrdersGrid, dashboard: OrdersGrid) -> Self {
        Self {
            orders: Screen::new(orders),
            dashboard: Screen::new(dashboard),
            dashboard_visible: false,
            help_visible: false,
            mode: UiMode::Nav,
            status: None,
            status_token: 0,
        }
    }

    fn screen_mut(&mut self, target: GridTarget) -> &mut Screen {
        match target {
            GridTarget::Orders => &mut self.orders,
            GridTarget::Dashboard => &mut self.dashboard,
        }
    }
}

/// Runs the terminal UI until the user quits. Orders load on start; with
/// `show_dashboard` the dashboard overlay opens on top of them.
pub fn run_app<R: GridRuntime>(
    runtime: &mut R,
    options: &GridOptions,
    show_dashboard: bool,
) -> Result<()> {
    let orders = OrdersGrid::with_options(GridVariant::Full, options).context("orders grid")?;
    let dashboard =
        OrdersGrid::with_options(GridVariant::Dashboard, options).context("dashboard grid")?;
    let mut ui = UiState::new(orders, dashboard);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    start(&mut ui, runtime, &internal_tx, show_dashboard);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut ui, runtime, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &ui)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(&mut ui, runtime, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    show_dashboard: bool,
) {
    run_command(ui, runtime, tx, GridTarget::Orders, GridCommand::Reload);
    if show_dashboard {
        open_dashboard(ui, runtime, tx);
    }
}

fn process_internal_events<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == ui.status_token => {
                ui.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Remote { target, completion } => {
                let events = ui.screen_mut(target).grid.apply_completion(completion);
                apply_events(ui, runtime, tx, target, events);
            }
        }
    }
}

fn run_command<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    target: GridTarget,
    command: GridCommand,
) {
    let events = ui.screen_mut(target).grid.dispatch(command);
    apply_events(ui, runtime, tx, target, events);
}

fn apply_events<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    target: GridTarget,
    events: Vec<GridEvent>,
) {
    for event in events {
        match event {
            GridEvent::Remote(job) => {
                if let Err(error) = runtime.spawn_remote(target, job, tx.clone()) {
                    warn!(%error, "remote job did not start");
                    emit_status(ui, tx, Notice::error(format!("background call failed: {error}")));
                }
            }
            GridEvent::Notice(notice) => emit_status(ui, tx, notice),
            GridEvent::PageChanged { .. } | GridEvent::QueryChanged => {
                let screen = ui.screen_mut(target);
                screen.cursor.row = 0;
                screen.clamp_cursor();
            }
            GridEvent::RowsChanged | GridEvent::SortChanged | GridEvent::ColumnsChanged => {
                ui.screen_mut(target).clamp_cursor();
            }
            GridEvent::DetailChanged => {
                if matches!(ui.mode, UiMode::EditDetail(_)) && !ui.orders.grid.detail().is_open()
                {
                    ui.mode = UiMode::Nav;
                }
            }
            GridEvent::InfoChanged => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(ui: &mut UiState, internal_tx: &Sender<InternalEvent>, notice: Notice) {
    ui.status = Some(notice);
    ui.status_token = ui.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, ui.status_token);
}

fn handle_key_event<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if ui.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            ui.help_visible = false;
        }
        return false;
    }

    let mode = std::mem::take(&mut ui.mode);
    let next = match mode {
        UiMode::Nav => None,
        UiMode::Search { input } => Some(handle_search_key(ui, runtime, internal_tx, input, key)),
        UiMode::GoToPage { input } => {
            Some(handle_go_to_page_key(ui, runtime, internal_tx, input, key))
        }
        UiMode::StatusPicker { id, cursor } => Some(handle_status_picker_key(
            ui,
            runtime,
            internal_tx,
            id,
            cursor,
            key,
        )),
        UiMode::ConfirmDelete { id } => {
            Some(handle_confirm_delete_key(ui, runtime, internal_tx, id, key))
        }
        UiMode::EditDetail(form) => {
            Some(handle_detail_form_key(ui, runtime, internal_tx, form, key))
        }
    };
    if let Some(next) = next {
        ui.mode = next;
        return false;
    }

    if ui.dashboard_visible {
        return handle_dashboard_key(ui, runtime, internal_tx, key);
    }
    handle_nav_key(ui, runtime, internal_tx, key)
}

fn handle_nav_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let target = GridTarget::Orders;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => ui.help_visible = true,
        KeyCode::Char('D') => open_dashboard(ui, runtime, tx),
        KeyCode::Char('r') => run_command(ui, runtime, tx, target, GridCommand::Reload),
        KeyCode::Char('/') => {
            ui.mode = UiMode::Search {
                input: ui.orders.grid.spec().query.clone(),
            };
        }
        KeyCode::Char(':') => {
            ui.mode = UiMode::GoToPage {
                input: String::new(),
            };
        }
        KeyCode::Enter => match ui.orders.selected_order_id() {
            Some(id) => run_command(ui, runtime, tx, target, GridCommand::ViewDetails(id)),
            None => emit_status(ui, tx, Notice::info("no order selected")),
        },
        KeyCode::Char('x') => open_status_picker(ui, tx),
        KeyCode::Char('d') => match ui.orders.selected_order_id() {
            Some(id) => ui.mode = UiMode::ConfirmDelete { id },
            None => emit_status(ui, tx, Notice::info("no order selected")),
        },
        KeyCode::Char('e') => begin_detail_edit(ui, tx),
        KeyCode::Esc => {
            if ui.orders.grid.detail().is_visible() {
                run_command(ui, runtime, tx, target, GridCommand::CloseDetail);
            } else if !ui.orders.grid.spec().query.is_empty() {
                run_command(ui, runtime, tx, target, GridCommand::ClearQuery);
            }
        }
        _ => {
            handle_grid_key(ui, runtime, tx, target, key);
        }
    }
    false
}

fn handle_dashboard_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let target = GridTarget::Dashboard;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc | KeyCode::Char('D') => ui.dashboard_visible = false,
        KeyCode::Char('?') => ui.help_visible = true,
        KeyCode::Char('r') => {
            run_command(ui, runtime, tx, target, GridCommand::Reload);
            run_command(ui, runtime, tx, target, GridCommand::LoadInfo);
        }
        KeyCode::Char('d') => {
            if let Some(id) = ui.dashboard.selected_order_id() {
                run_command(ui, runtime, tx, target, GridCommand::DeleteOrder(id));
            }
        }
        _ => {
            handle_grid_key(ui, runtime, tx, target, key);
        }
    }
    false
}

/// Cursor, sort, column and paging keys shared by both grids.
fn handle_grid_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    target: GridTarget,
    key: KeyEvent,
) -> bool {
    let screen = ui.screen_mut(target);
    let command = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            screen.move_row(1);
            return true;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            screen.move_row(-1);
            return true;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            screen.move_column(-1);
            return true;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            screen.move_column(1);
            return true;
        }
        KeyCode::Char('s') => match screen.selected_column_key() {
            Some(column) => GridCommand::ToggleSort(column.to_owned()),
            None => return true,
        },
        KeyCode::Char('S') => GridCommand::ClearSort,
        KeyCode::Char('c') => match screen.selected_column_key() {
            Some(column) => GridCommand::ToggleColumn(column.to_owned()),
            None => return true,
        },
        KeyCode::Char('C') => GridCommand::ShowAllColumns,
        KeyCode::Char(']') | KeyCode::PageDown => GridCommand::NextPage,
        KeyCode::Char('[') | KeyCode::PageUp => GridCommand::PreviousPage,
        KeyCode::Char('}') | KeyCode::End => GridCommand::LastPage,
        KeyCode::Char('{') | KeyCode::Home => GridCommand::FirstPage,
        KeyCode::Char('+') => GridCommand::CyclePageSize(1),
        KeyCode::Char('-') => GridCommand::CyclePageSize(-1),
        _ => return false,
    };
    run_command(ui, runtime, tx, target, command);
    true
}

fn open_dashboard<R: GridRuntime>(ui: &mut UiState, runtime: &mut R, tx: &Sender<InternalEvent>) {
    ui.dashboard_visible = true;
    if !ui.dashboard.grid.is_loading() {
        run_command(ui, runtime, tx, GridTarget::Dashboard, GridCommand::Reload);
    }
    run_command(ui, runtime, tx, GridTarget::Dashboard, GridCommand::LoadInfo);
}

fn open_status_picker(ui: &mut UiState, tx: &Sender<InternalEvent>) {
    let Some(id) = ui.orders.selected_order_id() else {
        emit_status(ui, tx, Notice::info("no order selected"));
        return;
    };
    let cursor = ui
        .orders
        .grid
        .store()
        .get(&id)
        .and_then(|order| order.status.known())
        .and_then(|status| OrderStatus::MENU.iter().position(|entry| *entry == status))
        .unwrap_or(0);
    ui.mode = UiMode::StatusPicker { id, cursor };
}

fn begin_detail_edit(ui: &mut UiState, tx: &Sender<InternalEvent>) {
    let form = ui
        .orders
        .grid
        .detail()
        .detail()
        .map(|(_, detail)| DetailForm::from_detail(detail));
    match form {
        Some(form) => ui.mode = UiMode::EditDetail(form),
        None => emit_status(ui, tx, Notice::info("open an order with enter first")),
    }
}

fn handle_search_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    mut input: String,
    key: KeyEvent,
) -> UiMode {
    let target = GridTarget::Orders;
    match key.code {
        KeyCode::Esc => {
            run_command(ui, runtime, tx, target, GridCommand::ClearQuery);
            return UiMode::Nav;
        }
        KeyCode::Enter => return UiMode::Nav,
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(ch) => input.push(ch),
        _ => return UiMode::Search { input },
    }
    run_command(ui, runtime, tx, target, GridCommand::SetQuery(input.clone()));
    UiMode::Search { input }
}

fn handle_go_to_page_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    mut input: String,
    key: KeyEvent,
) -> UiMode {
    match key.code {
        KeyCode::Esc => return UiMode::Nav,
        KeyCode::Enter => {
            match parse_page_input(&input) {
                Ok(page) => {
                    run_command(ui, runtime, tx, GridTarget::Orders, GridCommand::GoToPage(page));
                }
                Err(error) => emit_status(ui, tx, Notice::error(error.to_string())),
            }
            return UiMode::Nav;
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(ch) => input.push(ch),
        _ => {}
    }
    UiMode::GoToPage { input }
}

fn handle_status_picker_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    id: OrderId,
    cursor: usize,
    key: KeyEvent,
) -> UiMode {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => UiMode::StatusPicker {
            id,
            cursor: step(cursor, 1, OrderStatus::MENU.len()),
        },
        KeyCode::Char('k') | KeyCode::Up => UiMode::StatusPicker {
            id,
            cursor: step(cursor, -1, OrderStatus::MENU.len()),
        },
        KeyCode::Enter => {
            if let Some(status) = OrderStatus::MENU.get(cursor).copied() {
                run_command(
                    ui,
                    runtime,
                    tx,
                    GridTarget::Orders,
                    GridCommand::ChangeStatus { id, status },
                );
            }
            UiMode::Nav
        }
        KeyCode::Esc => UiMode::Nav,
        _ => UiMode::StatusPicker { id, cursor },
    }
}

fn handle_confirm_delete_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    id: OrderId,
    key: KeyEvent,
) -> UiMode {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            run_command(ui, runtime, tx, GridTarget::Orders, GridCommand::DeleteOrder(id));
            UiMode::Nav
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            emit_status(ui, tx, Notice::info(format!("kept order {id}")));
            UiMode::Nav
        }
        _ => UiMode::ConfirmDelete { id },
    }
}

fn handle_detail_form_key<R: GridRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    mut form: DetailForm,
    key: KeyEvent,
) -> UiMode {
    match key.code {
        KeyCode::Esc => return UiMode::Nav,
        KeyCode::Enter => {
            run_command(
                ui,
                runtime,
                tx,
                GridTarget::Orders,
                GridCommand::UpdateDetail(form.patch()),
            );
            return UiMode::Nav;
        }
        KeyCode::Tab | KeyCode::BackTab => form.next_field(),
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(ch) => form.focused_mut().push(ch),
        _ => {}
    }
    UiMode::EditDetail(form)
}

fn render(frame: &mut ratatui::Frame<'_>, ui: &UiState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(ui))
        .block(Block::default().title("orderdesk").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    if ui.orders.grid.detail().is_visible() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[1]);
        render_grid(frame, body[0], &ui.orders, "orders", !ui.dashboard_visible);
        let detail = Paragraph::new(detail_text(ui)).block(
            Block::default()
                .title("order details")
                .borders(Borders::ALL),
        );
        frame.render_widget(detail, body[1]);
    } else {
        render_grid(frame, layout[1], &ui.orders, "orders", !ui.dashboard_visible);
    }

    let status_style = match ui.status.as_ref().map(|notice| notice.level) {
        Some(NoticeLevel::Error) => Style::default().fg(Color::Red),
        Some(NoticeLevel::Success) => Style::default().fg(Color::Green),
        Some(NoticeLevel::Info) | None => Style::default().fg(Color::Yellow),
    };
    let status_widget = Paragraph::new(status_text(ui))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if ui.dashboard_visible {
        render_dashboard(frame, centered_rect(90, 84, frame.area()), ui);
    }

    match &ui.mode {
        UiMode::StatusPicker { id, cursor } => {
            let area = centered_rect(40, 45, frame.area());
            frame.render_widget(Clear, area);
            let picker = Paragraph::new(status_picker_text(*cursor)).block(
                Block::default()
                    .title(format!("status for {id}"))
                    .borders(Borders::ALL),
            );
            frame.render_widget(picker, area);
        }
        UiMode::ConfirmDelete { id } => {
            let area = centered_rect(46, 20, frame.area());
            frame.render_widget(Clear, area);
            let confirm = Paragraph::new(format!(
                "Delete order {id}? This cannot be undone.\n\ny delete | n keep"
            ))
            .block(
                Block::default()
                    .title("delete order")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
            frame.render_widget(confirm, area);
        }
        _ => {}
    }

    if ui.help_visible {
        let area = centered_rect(70, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_grid(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    screen: &Screen,
    title: &str,
    focused: bool,
) {
    let view = screen.grid.view();
    let widths = view
        .headers
        .iter()
        .map(|header| column_width(header.kind))
        .collect::<Vec<_>>();

    let header = Row::new(view.headers.iter().enumerate().map(|(index, header)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if focused && index == screen.cursor.column {
            style = style.fg(Color::Cyan);
        }
        Cell::from(header_label(header)).style(style)
    }));

    let rows = if view.is_empty() {
        vec![Row::new(vec![
            Cell::from(NO_RESULTS).style(Style::default().fg(Color::DarkGray)),
        ])]
    } else {
        view.rows
            .iter()
            .enumerate()
            .map(|(row_index, order)| {
                let selected = focused && row_index == screen.cursor.row;
                let pending = screen.grid.pending_operation(&order.id).is_some();
                let cells = view
                    .cells(order)
                    .into_iter()
                    .map(|cell| {
                        let mut style = cell_style(&cell);
                        if pending {
                            style = style.add_modifier(Modifier::DIM);
                        }
                        if selected {
                            style = style.bg(Color::DarkGray);
                        }
                        Cell::from(cell.display()).style(style)
                    })
                    .collect::<Vec<_>>();
                Row::new(cells)
            })
            .collect::<Vec<_>>()
    };

    let mut block_title = format!(
        "{title} | {} | {} of {} orders",
        view.summary(),
        view.matched_rows,
        view.total_rows
    );
    if screen.grid.is_loading() {
        block_title.push_str(" | loading...");
    }

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(block_title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_dashboard(frame: &mut ratatui::Frame<'_>, area: Rect, ui: &UiState) {
    frame.render_widget(Clear, area);
    let outer = Block::default()
        .title("dashboard")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(inner);

    let cards = ui.dashboard.grid.info();
    if cards.is_empty() {
        frame.render_widget(Paragraph::new("loading dashboard..."), layout[0]);
    } else {
        let count = u32::try_from(cards.len()).unwrap_or(u32::MAX);
        let slots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(cards.iter().map(|_| Constraint::Ratio(1, count)))
            .split(layout[0]);
        for (card, slot) in cards.iter().zip(slots.iter()) {
            let widget = Paragraph::new(info_card_text(card)).block(
                Block::default()
                    .title(card.title.clone())
                    .borders(Borders::ALL),
            );
            frame.render_widget(widget, *slot);
        }
    }

    render_grid(frame, layout[1], &ui.dashboard, "recent orders", true);
}

fn info_card_text(card: &InfoCard) -> String {
    format!("{}\n{}", card.value, card.detail)
}

fn column_width(kind: ColumnKind) -> Constraint {
    match kind {
        ColumnKind::Text => Constraint::Min(10),
        ColumnKind::Currency => Constraint::Length(14),
        ColumnKind::Status => Constraint::Length(22),
        ColumnKind::Actions => Constraint::Length(6),
    }
}

fn header_label(header: &HeaderCell) -> String {
    match header.sorted {
        Some(SortDirection::Asc) => format!("{} {SORT_MARK_ASC}", header.label),
        Some(SortDirection::Desc) => format!("{} {SORT_MARK_DESC}", header.label),
        None => header.label.to_owned(),
    }
}

fn cell_style(cell: &CellValue) -> Style {
    match cell {
        CellValue::Status(status) => Style::default().fg(tone_color(status.tone())),
        CellValue::Actions => Style::default().fg(Color::DarkGray),
        CellValue::Text(_) | CellValue::Currency(_) => Style::default(),
    }
}

const fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Warning => Color::Yellow,
        StatusTone::Info => Color::Cyan,
        StatusTone::Success => Color::Green,
        StatusTone::Neutral => Color::Gray,
    }
}

fn header_text(ui: &UiState) -> String {
    let grid = &ui.orders.grid;
    match &ui.mode {
        UiMode::Search { input } => format!("search: {input}_"),
        UiMode::GoToPage { input } => {
            let page_count = grid.view().page_count.max(1);
            format!("go to page (1-{page_count}): {input}_")
        }
        _ => {
            let spec = grid.spec();
            let query = if spec.query.is_empty() {
                "-"
            } else {
                spec.query.as_str()
            };
            format!(
                "{} orders | filter: {query} | {} per page",
                grid.store().len(),
                spec.pagination.page_size()
            )
        }
    }
}

fn detail_text(ui: &UiState) -> String {
    let form = match &ui.mode {
        UiMode::EditDetail(form) => Some(form),
        _ => None,
    };
    match ui.orders.grid.detail().state() {
        DetailState::Closed | DetailState::Failed { .. } => String::new(),
        DetailState::Loading { id, .. } => format!("Order {id}\n\nloading..."),
        DetailState::Open { id, detail } => {
            let mut lines = vec![
                format!("Order {id}"),
                format!("{} items", detail.item_count()),
                String::new(),
            ];
            for item in &detail.items {
                lines.push(format!(
                    "{} x{}  {}  (expires {})",
                    item.name,
                    item.amount,
                    item.line_total(),
                    item.expiry
                ));
            }
            lines.push(String::new());
            lines.push(form_line(
                "payment",
                &detail.payment_method,
                form,
                DetailField::PaymentMethod,
            ));
            lines.push(form_line(
                "pickup",
                &detail.pickup_time,
                form,
                DetailField::PickupTime,
            ));
            lines.push(String::new());
            lines.push(format!("subtotal     {}", detail.subtotal));
            lines.push(format!("service tax  {}", detail.service_tax));
            lines.push(format!("voucher      -{}", detail.voucher_applied));
            lines.push(format!("total        {}", detail.total()));
            if form.is_none() {
                lines.push(String::new());
                lines.push("e edit | esc close".to_owned());
            }
            lines.join("\n")
        }
    }
}

fn form_line(label: &str, current: &str, form: Option<&DetailForm>, field: DetailField) -> String {
    let Some(form) = form else {
        return format!("{label:<12} {current}");
    };
    let value = match field {
        DetailField::PaymentMethod => &form.payment_method,
        DetailField::PickupTime => &form.pickup_time,
    };
    if form.field == field {
        format!("> {label:<10} {value}_")
    } else {
        format!("  {label:<10} {value}")
    }
}

fn status_picker_text(cursor: usize) -> String {
    OrderStatus::MENU
        .iter()
        .enumerate()
        .map(|(index, status)| {
            let marker = if index == cursor { ">" } else { " " };
            format!("{marker} {}", status.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_overlay_text() -> &'static str {
    "Orders\n\
     j/k        move between rows\n\
     h/l        move between columns\n\
     enter      view order details\n\
     e          edit payment method and pickup time\n\
     x          change status\n\
     d          delete order\n\
     s / S      sort by column / clear sort\n\
     c / C      hide column / show all columns\n\
     /          search all visible columns\n\
     [ ]        previous / next page\n\
     { }        first / last page\n\
     :          go to page\n\
     + / -      rows per page\n\
     r          reload orders\n\
     D          dashboard\n\
     esc        close details or clear search\n\
     q          quit\n\
     \n\
     ? or esc closes this help"
}

fn status_text(ui: &UiState) -> String {
    if status_hidden_by_overlay(ui) {
        return String::new();
    }

    let hint = match &ui.mode {
        UiMode::Nav if ui.dashboard_visible => DASHBOARD_HINT,
        UiMode::Nav => NAV_HINT,
        UiMode::Search { .. } => "type to filter | enter keep | esc clear",
        UiMode::GoToPage { .. } => "enter go | esc cancel",
        UiMode::StatusPicker { .. } => "j/k choose | enter apply | esc cancel",
        UiMode::ConfirmDelete { .. } => "y delete | n keep",
        UiMode::EditDetail(_) => "tab next field | enter save | esc cancel",
    };
    match &ui.status {
        Some(notice) => format!("{} | {hint}", notice.message),
        None => hint.to_owned(),
    }
}

fn status_hidden_by_overlay(ui: &UiState) -> bool {
    ui.help_visible
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
