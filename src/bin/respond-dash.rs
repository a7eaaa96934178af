use anyhow::Result;
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use respond_dash::{
    safe_lock, AnomalyPanel, ChartHandle, DashClient, DashboardState, LogSink, PollConfig, Poller,
    SharedStateSink,
};
use std::{
    io,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal dashboard for the RE:SPOND marketing metrics backend", long_about = None)]
struct Args {
    /// Backend host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Backend port
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 5000)]
    refresh_ms: u64,

    /// How many trailing months of KPI data to request
    #[arg(long, default_value_t = 12)]
    window: usize,

    /// Metric the anomaly detector scores
    #[arg(long, default_value = "cpl")]
    metric: String,

    /// Z-score threshold for flagging a month
    #[arg(long, default_value_t = 2.5)]
    threshold: f64,

    /// Log panel updates to stderr instead of drawing a TUI
    #[arg(long, default_value_t = false)]
    headless: bool,
}

struct App {
    data: Arc<Mutex<DashboardState>>,
    backend: String,
    backend_ok: bool,
    anomalies_scroll: usize,
}

impl App {
    fn new(data: Arc<Mutex<DashboardState>>, backend: String, backend_ok: bool) -> Self {
        Self {
            data,
            backend,
            backend_ok,
            anomalies_scroll: 0,
        }
    }

    fn on_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Up => self.anomalies_scroll = self.anomalies_scroll.saturating_sub(1),
            KeyCode::Down => {
                let data = safe_lock(&self.data);
                let rows = data.anomalies.as_ref().map(|p| p.rows.len()).unwrap_or(0);
                if self.anomalies_scroll < rows.saturating_sub(1) {
                    self.anomalies_scroll += 1;
                }
            }
            KeyCode::Home => self.anomalies_scroll = 0,
            _ => {}
        }
        false
    }
}

fn ui(f: &mut Frame, app: &App) {
    let data = safe_lock(&app.data);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // KPI row
            Constraint::Min(12),   // Chart
            Constraint::Length(9), // Anomalies
            Constraint::Length(3), // Footer
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_kpis(f, chunks[1], &data);
    render_chart(f, chunks[2], &data);
    render_anomalies(f, chunks[3], &data, app.anomalies_scroll);
    render_footer(f, chunks[4], &data);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let (status, status_style) = if app.backend_ok {
        ("● online", Style::default().fg(Color::Green))
    } else {
        ("▼ unreachable", Style::default().fg(Color::Red))
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " RE:SPOND ",
            Style::default()
                .fg(Color::Rgb(255, 0, 128))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("marketing dashboard", Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled(
            app.backend.as_str(),
            Style::default().fg(Color::Rgb(150, 150, 150)),
        ),
        Span::raw("  "),
        Span::styled(status, status_style.add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Left);
    f.render_widget(header, area);
}

fn kpi_box(f: &mut Frame, area: Rect, title: &str, value: String, color: Color) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(widget, area);
}

fn render_kpis(f: &mut Frame, area: Rect, data: &DashboardState) {
    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    match &data.kpis {
        Some(kpis) => {
            kpi_box(
                f,
                boxes[0],
                &format!(" leads ({}) ", kpis.month),
                kpis.leads.to_string(),
                Color::Cyan,
            );
            kpi_box(f, boxes[1], " CPL ", kpis.cpl.clone(), Color::Yellow);
            kpi_box(f, boxes[2], " ROI ", kpis.roi.clone(), Color::Magenta);
        }
        None => {
            kpi_box(f, boxes[0], " leads ", "—".to_string(), Color::DarkGray);
            kpi_box(f, boxes[1], " CPL ", "—".to_string(), Color::DarkGray);
            kpi_box(f, boxes[2], " ROI ", "—".to_string(), Color::DarkGray);
        }
    }
}

fn render_chart(f: &mut Frame, area: Rect, data: &DashboardState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" leads: actual + forecast ");

    let Some(view) = &data.chart else {
        let empty = Paragraph::new("waiting for first successful cycle...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let datasets = vec![
        Dataset::default()
            .name("actual")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&view.actual),
        Dataset::default()
            .name("forecast")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&view.forecast),
    ];

    let last_index = view.labels.len().saturating_sub(1);
    let x_labels: Vec<Span> = if view.labels.is_empty() {
        vec![]
    } else {
        vec![
            Span::raw(view.labels[0].clone()),
            Span::raw(view.labels[last_index / 2].clone()),
            Span::raw(view.labels[last_index].clone()),
        ]
    };

    let (y_min, y_max) = view.y_bounds;
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last_index as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.0}")),
                    Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{y_max:.0}")),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_anomalies(f: &mut Frame, area: Rect, data: &DashboardState, scroll: usize) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let table_block = Block::default().borders(Borders::ALL).title(" anomalies ");
    let notes_block = Block::default()
        .borders(Borders::ALL)
        .title(" recommendation ");

    let Some(panel) = &data.anomalies else {
        f.render_widget(
            Paragraph::new("no data yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(table_block),
            halves[0],
        );
        f.render_widget(Paragraph::new("").block(notes_block), halves[1]);
        return;
    };

    if panel.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "no anomalies found ✔",
                Style::default().fg(Color::Green),
            )))
            .alignment(Alignment::Center)
            .block(table_block),
            halves[0],
        );
    } else {
        let header = Row::new(vec![Cell::from("month"), Cell::from("cpl"), Cell::from("z")])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = panel
            .rows
            .iter()
            .skip(scroll)
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.month.clone()),
                    Cell::from(r.cpl.clone()),
                    Cell::from(r.z_score.clone()),
                ])
                .style(Style::default().fg(Color::Red))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .block(table_block);
        f.render_widget(table, halves[0]);
    }

    render_recommendation(f, halves[1], panel, notes_block);
}

fn render_recommendation(f: &mut Frame, area: Rect, panel: &AnomalyPanel, block: Block<'_>) {
    let tone = if panel.recommendation.is_positive() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let notes = Paragraph::new(vec![
        Line::from(Span::styled(panel.recommendation.headline(), tone)),
        Line::from(""),
        Line::from(Span::styled(
            panel.recommendation.advice(),
            Style::default().fg(Color::White),
        )),
    ])
    .block(block);
    f.render_widget(notes, area);
}

fn render_footer(f: &mut Frame, area: Rect, data: &DashboardState) {
    let mut spans = vec![
        Span::styled(
            format!("[{}] ", Local::now().format("%H:%M:%S")),
            Style::default().fg(Color::Rgb(100, 255, 100)),
        ),
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" quit  ", Style::default().fg(Color::White)),
        Span::styled(
            "[↑↓]",
            Style::default()
                .fg(Color::Rgb(255, 165, 0))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" scroll anomalies  ", Style::default().fg(Color::White)),
        Span::styled(
            format!("cycles: {}", data.cycle_count),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if let Some(err) = &data.last_error {
        spans.push(Span::styled(
            format!("  last error: {err}"),
            Style::default().fg(Color::Red),
        ));
    }
    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(footer, area);
}

fn run_tui(runtime: &tokio::runtime::Runtime, client: DashClient, config: PollConfig) -> Result<()> {
    let backend_addr = client.base_url().to_string();
    let backend_ok = runtime
        .block_on(client.health())
        .map(|h| h.status == "ok")
        .unwrap_or(false);

    let state = Arc::new(Mutex::new(DashboardState::default()));
    let poll_state = Arc::clone(&state);
    runtime.spawn(async move {
        let poller = Poller::new(client, config);
        let mut chart = ChartHandle::new();
        let mut sink = SharedStateSink::new(poll_state);
        poller.run(&mut chart, &mut sink).await;
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(state, backend_addr, backend_ok);
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.on_key(key.code) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let base_url = format!("http://{}:{}", args.host, args.port);
    let config = PollConfig {
        interval: Duration::from_millis(args.refresh_ms),
        window: args.window,
        anomaly_metric: args.metric.clone(),
        anomaly_threshold: args.threshold,
    };
    let client = DashClient::new(base_url.as_str())?;

    let runtime = tokio::runtime::Runtime::new()?;

    if args.headless {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "respond_dash=info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        tracing::info!(%base_url, "starting headless poll loop");
        runtime.block_on(async move {
            let poller = Poller::new(client, config);
            let mut chart = ChartHandle::new();
            let mut sink = LogSink;
            poller.run(&mut chart, &mut sink).await;
        });
        return Ok(());
    }

    run_tui(&runtime, client, config)
}
