use crate::error::BoardError;
use crate::kanban_board::{Clock, KanbanBoard, Removal};
use crate::schedule::ResetTicker;
use crate::store::KeyValueStore;
use crate::task::Column;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Adding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct BoardView<S, C> {
    pub board: KanbanBoard<S, C>,
    pub selected_status: usize,
    pub selected_task: usize,
    pub mode: Mode,
    pub notice: Option<Notice>,
}

impl<S: KeyValueStore, C: Clock> BoardView<S, C> {
    pub fn new(board: KanbanBoard<S, C>) -> Self {
        Self {
            board,
            selected_status: 0,
            selected_task: 0,
            mode: Mode::Normal,
            notice: None,
        }
    }

    fn column(&self) -> Column {
        Column::from_index(self.selected_status).unwrap_or(Column::Todo)
    }

    fn selected_id(&self) -> Option<String> {
        self.board
            .tasks_in(self.column())
            .get(self.selected_task)
            .map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.board.tasks_in(self.column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn success(&mut self, msg: impl Into<String>) {
        self.notice = Some(Notice::Success(msg.into()));
    }

    fn fail(&mut self, err: BoardError) {
        if matches!(err, BoardError::Store(_) | BoardError::Json(_)) {
            error!("board operation failed: {err}");
        }
        self.notice = Some(Notice::Error(err.to_string()));
    }

    pub fn on_tick(&mut self) {
        match self.board.tick() {
            Ok(true) => {
                self.selected_task = 0;
                self.mode = Mode::Normal;
                self.success("Tasks reset for the new day");
            }
            Ok(false) => {}
            Err(err) => self.fail(err),
        }
    }

    // true means quit
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode {
            Mode::Normal => return self.handle_normal_key(code),
            Mode::Adding => self.handle_input_key(code),
        }
        false
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('a') => {
                self.mode = Mode::Adding;
                self.notice = None;
            }
            KeyCode::Left => {
                if self.selected_status > 0 {
                    self.selected_status -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_status < Column::ALL.len() - 1 {
                    self.selected_status += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down => {
                self.selected_task += 1;
                self.clamp_selection();
            }
            KeyCode::Char('[') => self.shift_selected(-1),
            KeyCode::Char(']') => self.shift_selected(1),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('r') => match self.board.reset() {
                Ok(()) => {
                    self.selected_task = 0;
                    self.success("Tasks restored");
                }
                Err(err) => self.fail(err),
            },
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        let column = self.column();
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let title = self.board.input(column).to_string();
                match self.board.add_task(column, &title) {
                    Ok(_) => {
                        self.mode = Mode::Normal;
                        self.selected_task = self.board.tasks_in(column).len().saturating_sub(1);
                        self.success("Task added");
                    }
                    Err(err) => self.fail(err),
                }
            }
            KeyCode::Backspace => {
                self.board.input_mut(column).pop();
            }
            KeyCode::Char(c) => self.board.input_mut(column).push(c),
            _ => {}
        }
    }

    fn shift_selected(&mut self, direction: isize) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let target = (self.selected_status as isize + direction)
            .clamp(0, Column::ALL.len() as isize - 1) as usize;
        let Some(target) = Column::from_index(target) else {
            return;
        };

        match self.board.move_task(&id, target) {
            Ok(true) => {
                self.clamp_selection();
                self.success(format!("Task moved to {target}"));
            }
            Ok(false) => {}
            Err(err) => self.fail(err),
        }
    }

    fn remove_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.board.remove_task(&id) {
            Ok(Removal::Deleted) => self.success("Task removed"),
            Ok(Removal::ReturnedToTodo) => {
                self.success(format!("Task moved back to {}", Column::Todo))
            }
            Err(err) => self.fail(err),
        }
        self.clamp_selection();
    }
}

pub fn run_app<B: Backend, S: KeyValueStore, C: Clock>(
    terminal: &mut Terminal<B>,
    view: &mut BoardView<S, C>,
    ticker: &mut ResetTicker,
) -> io::Result<()> {
    info!(
        "board view started, reset check every {:?}",
        ticker.interval()
    );
    loop {
        terminal.draw(|f| draw(f, view))?;

        if event::poll(ticker.time_until_due(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && view.handle_key(key.code) {
                    return Ok(());
                }
            }
        }

        if ticker.due(Instant::now()) {
            view.on_tick();
        }
    }
}

fn draw<S: KeyValueStore, C: Clock>(f: &mut Frame, view: &BoardView<S, C>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[0]);

    for (i, column) in Column::ALL.iter().enumerate() {
        let tasks = view.board.tasks_in(*column);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                let marker = if view.board.can_remove(t) { "  " } else { "* " };
                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(t.title.as_str(), Style::default().fg(Color::White)),
                    Span::styled(
                        format!(" ({})", t.time_range),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", column.label(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if view.selected_status == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if view.selected_status == i && !tasks.is_empty() {
            state.select(Some(view.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }

    let footer = match (view.mode, &view.notice) {
        (Mode::Adding, _) => Paragraph::new(format!(
            "New task in {}: {}_",
            view.column(),
            view.board.input(view.column())
        ))
        .style(Style::default().fg(Color::Yellow)),
        (Mode::Normal, Some(Notice::Success(msg))) => {
            Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Green))
        }
        (Mode::Normal, Some(Notice::Error(msg))) => {
            Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Red))
        }
        (Mode::Normal, None) => Paragraph::new(
            "a add  [ ] move  d remove  r restore  q quit   (* default task)",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(
        footer.block(
            Block::default()
                .title(format!(
                    "last reset {}",
                    view.board
                        .last_reset()
                        .with_timezone(&chrono::Local)
                        .format("%d/%m/%Y %H:%M")
                ))
                .borders(Borders::ALL),
        ),
        rows[1],
    );
}
